use std::sync::atomic::{AtomicU64, Ordering};

use crate::geo::LatLon;

use super::DetailPanel;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique drawable handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(u64);

impl DrawableId {
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const ROUTE: Rgb = Rgb(0x00, 0x66, 0xff);
    pub const ORIGIN: Rgb = Rgb(0x2e, 0xcc, 0x40);
    pub const DESTINATION: Rgb = Rgb(0xff, 0x41, 0x36);
    pub const ALERT_RED: Rgb = Rgb(0xff, 0x44, 0x44);
    pub const ALERT_ORANGE: Rgb = Rgb(0xff, 0x88, 0x00);
    pub const ALERT_GREEN: Rgb = Rgb(0x44, 0xff, 0x44);
    pub const ALERT_UNKNOWN: Rgb = Rgb(0x88, 0x88, 0x88);
    pub const SHIP: Rgb = Rgb(0x21, 0x96, 0xf3);
    pub const CONGESTED: Rgb = Rgb(0xff, 0x00, 0x00);
    pub const CHOKEPOINT: Rgb = Rgb(0xff, 0x00, 0x00);
    pub const COLLISION: Rgb = Rgb(0xff, 0x00, 0x00);
    pub const ECA: Rgb = Rgb(0xff, 0xd7, 0x00);
    pub const MPA: Rgb = Rgb(0xff, 0x8c, 0x00);
    pub const PIRACY: Rgb = Rgb(0x8b, 0x00, 0x00);

    /// Color for a GDACS alert level (`Red`, `Orange`, `Green`)
    pub fn for_alert_level(level: Option<&str>) -> Rgb {
        match level {
            Some("Red") => Rgb::ALERT_RED,
            Some("Orange") => Rgb::ALERT_ORANGE,
            Some("Green") => Rgb::ALERT_GREEN,
            _ => Rgb::ALERT_UNKNOWN,
        }
    }
}

/// Geometry of a drawable
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Marker(LatLon),
    Polyline(Vec<LatLon>),
    Polygon(Vec<LatLon>),
    Circle { center: LatLon, radius_km: f64 },
}

/// A renderable map object owned by exactly one overlay group
#[derive(Debug, Clone)]
pub struct Drawable {
    pub id: DrawableId,
    pub shape: Shape,
    pub color: Rgb,
    pub label: String,
    pub detail: Option<DetailPanel>,
}

impl Drawable {
    pub fn new(shape: Shape, color: Rgb, label: impl Into<String>) -> Self {
        Self {
            id: DrawableId::next(),
            shape,
            color,
            label: label.into(),
            detail: None,
        }
    }

    pub fn marker(point: LatLon, color: Rgb, label: impl Into<String>) -> Self {
        Self::new(Shape::Marker(point), color, label)
    }

    pub fn polyline(points: Vec<LatLon>, color: Rgb, label: impl Into<String>) -> Self {
        Self::new(Shape::Polyline(points), color, label)
    }

    pub fn polygon(points: Vec<LatLon>, color: Rgb, label: impl Into<String>) -> Self {
        Self::new(Shape::Polygon(points), color, label)
    }

    pub fn circle(center: LatLon, radius_km: f64, color: Rgb, label: impl Into<String>) -> Self {
        Self::new(Shape::Circle { center, radius_km }, color, label)
    }

    pub fn with_detail(mut self, detail: DetailPanel) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Geographic anchor (first vertex for lines and polygons)
    pub fn anchor(&self) -> Option<LatLon> {
        match &self.shape {
            Shape::Marker(point) => Some(*point),
            Shape::Circle { center, .. } => Some(*center),
            Shape::Polyline(points) | Shape::Polygon(points) => points.first().copied(),
        }
    }

    /// Every vertex of the shape
    pub fn points(&self) -> Vec<LatLon> {
        match &self.shape {
            Shape::Marker(point) => vec![*point],
            Shape::Circle { center, .. } => vec![*center],
            Shape::Polyline(points) | Shape::Polygon(points) => points.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Drawable::marker(LatLon::new(0.0, 0.0), Rgb::SHIP, "a");
        let b = Drawable::marker(LatLon::new(0.0, 0.0), Rgb::SHIP, "b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_anchor() {
        let line = Drawable::polyline(
            vec![LatLon::new(1.0, 2.0), LatLon::new(3.0, 4.0)],
            Rgb::ROUTE,
            "route",
        );
        assert_eq!(line.anchor(), Some(LatLon::new(1.0, 2.0)));

        let empty = Drawable::polygon(Vec::new(), Rgb::ECA, "empty");
        assert_eq!(empty.anchor(), None);

        let circle = Drawable::circle(LatLon::new(26.5, 56.3), 80.0, Rgb::CHOKEPOINT, "Hormuz");
        assert_eq!(circle.anchor(), Some(LatLon::new(26.5, 56.3)));
    }

    #[test]
    fn test_alert_colors() {
        assert_eq!(Rgb::for_alert_level(Some("Red")), Rgb::ALERT_RED);
        assert_eq!(Rgb::for_alert_level(Some("Purple")), Rgb::ALERT_UNKNOWN);
        assert_eq!(Rgb::for_alert_level(None), Rgb::ALERT_UNKNOWN);
    }
}
