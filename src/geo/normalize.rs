use super::{Bounds, LatLon};

/// Shift `lon` onto the same copy of the world as the reference bounds.
///
/// Latitude is never touched and longitude moves by at most one multiple of
/// 360. Without bounds the point is returned as-is.
pub fn normalize(lat: f64, lon: f64, bounds: Option<&Bounds>) -> LatLon {
    let Some(bounds) = bounds else {
        return LatLon::new(lat, lon);
    };

    let center = bounds.center_lon();

    let adjusted = if bounds.crosses_antimeridian() {
        if lon < 0.0 && center > 0.0 {
            lon + 360.0
        } else if lon > 0.0 && center < 0.0 {
            lon - 360.0
        } else {
            lon
        }
    } else {
        let stay = (lon - center).abs();
        let east = (lon + 360.0 - center).abs();
        let west = (lon - 360.0 - center).abs();

        // Shifted candidates must be strictly closer to replace the raw value
        if east < stay && east < west {
            lon + 360.0
        } else if west < stay && west < east {
            lon - 360.0
        } else {
            lon
        }
    };

    LatLon::new(lat, adjusted)
}

/// Normalize every vertex of a line or ring independently
pub fn normalize_all<I>(points: I, bounds: Option<&Bounds>) -> Vec<LatLon>
where
    I: IntoIterator<Item = LatLon>,
{
    points
        .into_iter()
        .map(|p| normalize(p.lat, p.lon, bounds))
        .collect()
}

/// Wrap a longitude into `(-180, 180]`
pub fn wrap_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_on(center: f64) -> Bounds {
        Bounds::new(-10.0, center - 10.0, 10.0, center + 10.0)
    }

    #[test]
    fn test_no_bounds_is_identity() {
        for lon in [-540.0, -180.0, -0.5, 0.0, 42.0, 180.0, 359.0, 720.0] {
            let p = normalize(12.5, lon, None);
            assert_eq!(p.lon, lon);
            assert_eq!(p.lat, 12.5);
        }
    }

    #[test]
    fn test_picks_closest_copy() {
        let bounds = centered_on(170.0);
        assert_eq!(bounds.center_lon(), 170.0);

        // candidates -170, 190, -530 -> distances 340, 20, 700
        let p = normalize(5.0, -170.0, Some(&bounds));
        assert_eq!(p.lon, 190.0);
        assert_eq!(p.lat, 5.0);
    }

    #[test]
    fn test_shifts_west_when_closer() {
        let bounds = centered_on(-170.0);
        let p = normalize(0.0, 175.0, Some(&bounds));
        assert_eq!(p.lon, -185.0);
    }

    #[test]
    fn test_tie_keeps_raw_longitude() {
        let bounds = centered_on(0.0);
        // 180 and -180 are both 180 away from the center
        assert_eq!(normalize(0.0, 180.0, Some(&bounds)).lon, 180.0);
        assert_eq!(normalize(0.0, -180.0, Some(&bounds)).lon, -180.0);
    }

    #[test]
    fn test_nearby_point_unchanged() {
        let bounds = centered_on(30.0);
        assert_eq!(normalize(40.0, 35.5, Some(&bounds)).lon, 35.5);
    }

    #[test]
    fn test_crossing_bounds_shift_east() {
        let bounds = Bounds::new(-5.0, 170.0, 5.0, -170.0);
        assert!(bounds.crosses_antimeridian());
        assert_eq!(bounds.center_lon(), 180.0);

        let p = normalize(1.0, -175.0, Some(&bounds));
        assert_eq!(p.lon, 185.0);
    }

    #[test]
    fn test_crossing_bounds_shift_west() {
        // center wraps to -170
        let bounds = Bounds::new(-5.0, 170.0, 5.0, -150.0);
        assert_eq!(bounds.center_lon(), -170.0);

        assert_eq!(normalize(0.0, 175.0, Some(&bounds)).lon, -185.0);
        assert_eq!(normalize(0.0, -160.0, Some(&bounds)).lon, -160.0);
    }

    #[test]
    fn test_shift_is_single_turn() {
        let bounds = centered_on(100.0);
        for lon in [-400.0, -200.0, -10.0, 90.0, 250.0, 600.0] {
            let p = normalize(0.0, lon, Some(&bounds));
            let delta = p.lon - lon;
            assert!(delta == 0.0 || delta == 360.0 || delta == -360.0);
        }
    }

    #[test]
    fn test_route_across_antimeridian_pulls_disaster() {
        let route = [LatLon::new(50.0, 179.0), LatLon::new(51.0, -179.0)];
        let bounds = Bounds::from_path(route).unwrap();

        let p = normalize(50.5, -178.0, Some(&bounds));
        assert_eq!(p.lon, 182.0);
    }

    #[test]
    fn test_normalize_all_keeps_order() {
        let bounds = centered_on(175.0);
        let ring = normalize_all(
            [LatLon::new(0.0, 170.0), LatLon::new(0.0, -175.0), LatLon::new(1.0, 178.0)],
            Some(&bounds),
        );
        let lons: Vec<f64> = ring.iter().map(|p| p.lon).collect();
        assert_eq!(lons, vec![170.0, 185.0, 178.0]);
    }

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(190.0), -170.0);
        assert_eq!(wrap_lon(180.0), 180.0);
        assert_eq!(wrap_lon(-180.0), 180.0);
        assert_eq!(wrap_lon(-190.0), 170.0);
        assert_eq!(wrap_lon(45.0), 45.0);
    }
}
