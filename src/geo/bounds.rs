use serde::{Deserialize, Serialize};

use super::{wrap_lon, LatLon};

/// Axis-aligned lat/lon rectangle used as the normalization anchor.
///
/// `west > east` marks a rectangle that crosses the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Extent of a path, unwrapping each longitude against its predecessor
    /// so that a track stepping from 179 to -179 is measured as 179 to 181.
    pub fn from_path<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLon>,
    {
        let mut iter = points
            .into_iter()
            .filter(|p| p.lat.is_finite() && p.lon.is_finite());
        let first = iter.next()?;

        let mut bounds = Self::new(first.lat, first.lon, first.lat, first.lon);
        let mut prev_lon = first.lon;

        for point in iter {
            let mut lon = point.lon;
            let step = lon - prev_lon;
            if step.abs() > 180.0 {
                lon -= 360.0 * (step / 360.0).round();
            }
            prev_lon = lon;

            bounds.south = bounds.south.min(point.lat);
            bounds.north = bounds.north.max(point.lat);
            bounds.west = bounds.west.min(lon);
            bounds.east = bounds.east.max(lon);
        }

        Some(bounds)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    pub fn center_lon(&self) -> f64 {
        if self.crosses_antimeridian() {
            wrap_lon((self.west + self.east + 360.0) / 2.0)
        } else {
            (self.west + self.east) / 2.0
        }
    }

    pub fn center_lat(&self) -> f64 {
        (self.south + self.north) / 2.0
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(self.center_lat(), self.center_lon())
    }

    /// Longitude span in degrees, accounting for antimeridian crossing
    pub fn width(&self) -> f64 {
        if self.crosses_antimeridian() {
            self.east + 360.0 - self.west
        } else {
            self.east - self.west
        }
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains(&self, point: LatLon) -> bool {
        if point.lat < self.south || point.lat > self.north {
            return false;
        }
        if self.crosses_antimeridian() {
            let lon = wrap_lon(point.lon);
            lon >= self.west || lon <= self.east
        } else {
            point.lon >= self.west && point.lon <= self.east
        }
    }

    /// Grow the rectangle by `degrees` on every side, clamping latitude
    pub fn padded(&self, degrees: f64) -> Self {
        Self {
            south: (self.south - degrees).max(-90.0),
            west: self.west - degrees,
            north: (self.north + degrees).min(90.0),
            east: self.east + degrees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_empty() {
        assert!(Bounds::from_path(Vec::<LatLon>::new()).is_none());
    }

    #[test]
    fn test_from_path_huge_and_non_finite_longitudes() {
        let bounds = Bounds::from_path([
            LatLon::new(f64::NAN, 5.0),
            LatLon::new(0.0, 0.0),
            LatLon::new(0.0, 1e20),
            LatLon::new(1.0, f64::INFINITY),
        ])
        .unwrap();
        assert_eq!(bounds.south, 0.0);
        assert_eq!(bounds.north, 0.0);
        assert!(bounds.west.is_finite() && bounds.east.is_finite());

        let wound = Bounds::from_path([
            LatLon::new(0.0, 10.0),
            LatLon::new(0.0, 10.0 + 3.0 * 360.0 + 20.0),
        ])
        .unwrap();
        assert_eq!(wound, Bounds::new(0.0, 10.0, 0.0, 30.0));

        assert!(Bounds::from_path([LatLon::new(f64::NAN, 0.0)]).is_none());
    }

    #[test]
    fn test_from_path_plain_extent() {
        let bounds = Bounds::from_path([
            LatLon::new(51.5, 4.0),
            LatLon::new(36.0, -6.0),
            LatLon::new(31.0, 30.0),
        ])
        .unwrap();

        assert_eq!(bounds, Bounds::new(31.0, -6.0, 51.5, 30.0));
        assert!(!bounds.crosses_antimeridian());
        assert_eq!(bounds.center_lon(), 12.0);
    }

    #[test]
    fn test_from_path_unwraps_antimeridian() {
        let bounds = Bounds::from_path([
            LatLon::new(35.0, 170.0),
            LatLon::new(40.0, 179.0),
            LatLon::new(45.0, -175.0),
            LatLon::new(47.0, -160.0),
        ])
        .unwrap();

        assert_eq!(bounds.west, 170.0);
        assert_eq!(bounds.east, 200.0);
        assert_eq!(bounds.center_lon(), 185.0);
        assert_eq!(bounds.width(), 30.0);
    }

    #[test]
    fn test_crossing_center_and_width() {
        let bounds = Bounds::new(-5.0, 170.0, 5.0, -170.0);
        assert_eq!(bounds.center_lon(), 180.0);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.center_lat(), 0.0);
    }

    #[test]
    fn test_contains() {
        let plain = Bounds::new(0.0, 10.0, 20.0, 30.0);
        assert!(plain.contains(LatLon::new(10.0, 20.0)));
        assert!(!plain.contains(LatLon::new(25.0, 20.0)));
        assert!(!plain.contains(LatLon::new(10.0, 35.0)));

        let crossing = Bounds::new(-10.0, 170.0, 10.0, -170.0);
        assert!(crossing.contains(LatLon::new(0.0, 175.0)));
        assert!(crossing.contains(LatLon::new(0.0, -175.0)));
        assert!(!crossing.contains(LatLon::new(0.0, 0.0)));
    }

    #[test]
    fn test_padded_clamps_latitude() {
        let bounds = Bounds::new(-85.0, 0.0, 85.0, 10.0).padded(10.0);
        assert_eq!(bounds.south, -90.0);
        assert_eq!(bounds.north, 90.0);
        assert_eq!(bounds.west, -10.0);
        assert_eq!(bounds.east, 20.0);
    }
}
