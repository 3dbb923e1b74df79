use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as Segment, Map, MapResolution};
use ratatui::widgets::{Block, Borders};

use crate::geo::{normalize, Bounds, LatLon};
use crate::overlay::{Drawable, DrawableId, OverlayKind, Rgb, Shape};

const KM_PER_DEGREE: f64 = 111.32;

/// Back to front
const PAINT_ORDER: [OverlayKind; OverlayKind::COUNT] = [
    OverlayKind::ProtectedAreas,
    OverlayKind::Disasters,
    OverlayKind::Chokepoints,
    OverlayKind::Route,
    OverlayKind::Piracy,
    OverlayKind::Ships,
    OverlayKind::PortShips,
    OverlayKind::ChokepointShips,
    OverlayKind::Collisions,
    OverlayKind::Ports,
];

/// Region to show: the viewport with some margin, or the whole world
pub fn fit_view(viewport: Option<Bounds>) -> Bounds {
    let Some(mut view) = viewport else {
        return Bounds::new(-90.0, -180.0, 90.0, 180.0);
    };
    if view.crosses_antimeridian() {
        view.east += 360.0;
    }
    let margin = (view.width().max(view.height()) * 0.1).max(2.0);
    view.padded(margin)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Move a vertex onto the copy of the world that the view shows
fn place(point: LatLon, view: &Bounds) -> (f64, f64) {
    let placed = normalize(point.lat, point.lon, Some(view));
    (placed.lon, placed.lat)
}

fn draw_path(ctx: &mut Context, points: &[LatLon], closed: bool, view: &Bounds, color: Color) {
    let placed: Vec<(f64, f64)> = points.iter().map(|p| place(*p, view)).collect();
    let closing = if closed && placed.len() > 2 {
        placed.first().zip(placed.last())
    } else {
        None
    };

    let segments = placed
        .windows(2)
        .map(|w| (w[0], w[1]))
        .chain(closing.map(|(first, last)| (*last, *first)));
    for ((x1, y1), (x2, y2)) in segments {
        ctx.draw(&Segment {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

fn draw_drawable(
    ctx: &mut Context,
    drawable: &Drawable,
    view: &Bounds,
    marker_radius: f64,
    selected: bool,
) {
    let color = if selected {
        Color::White
    } else {
        color(drawable.color)
    };

    match &drawable.shape {
        Shape::Marker(point) => {
            let (x, y) = place(*point, view);
            ctx.draw(&Circle {
                x,
                y,
                radius: marker_radius,
                color,
            });
        }
        Shape::Circle { center, radius_km } => {
            let (x, y) = place(*center, view);
            ctx.draw(&Circle {
                x,
                y,
                radius: radius_km / KM_PER_DEGREE,
                color,
            });
        }
        Shape::Polyline(points) => draw_path(ctx, points, false, view, color),
        Shape::Polygon(points) => draw_path(ctx, points, true, view, color),
    }
}

/// Render the world map with every attached drawable
pub fn render(
    frame: &mut Frame,
    area: Rect,
    view: Bounds,
    drawables: &[(OverlayKind, Arc<Drawable>)],
    selected: Option<DrawableId>,
) {
    let block = Block::default()
        .title(" World Map ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);

    // Coastlines only exist for -180..180; repaint them shifted by a full
    // turn when the view reaches past the antimeridian.
    let shift = if view.east > 180.0 {
        Some(-360.0)
    } else if view.west < -180.0 {
        Some(360.0)
    } else {
        None
    };
    if let Some(shift) = shift {
        let wrapped = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([view.west + shift, view.east + shift])
            .y_bounds([view.south, view.north])
            .paint(|ctx| {
                ctx.draw(&Map {
                    color: Color::DarkGray,
                    resolution: MapResolution::High,
                });
            });
        frame.render_widget(wrapped, inner);
    }

    let marker_radius = (view.width() / 200.0).max(0.05);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([view.west, view.east])
        .y_bounds([view.south, view.north])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for kind in PAINT_ORDER {
                for (_, drawable) in drawables.iter().filter(|(k, _)| *k == kind) {
                    let is_selected = selected == Some(drawable.id);
                    draw_drawable(ctx, drawable, &view, marker_radius, is_selected);
                }
            }

            // Port names and the selection get labels
            for (kind, drawable) in drawables {
                let is_selected = selected == Some(drawable.id);
                if *kind != OverlayKind::Ports && !is_selected {
                    continue;
                }
                let Some(anchor) = drawable.anchor() else {
                    continue;
                };
                let (x, y) = place(anchor, &view);
                let style = if is_selected {
                    Style::default().bold().fg(Color::White)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ctx.print(
                    x,
                    (y + view.height() * 0.03).min(view.north),
                    Span::styled(drawable.label.clone(), style),
                );
            }
        });

    frame.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_view_without_viewport() {
        assert_eq!(fit_view(None), Bounds::new(-90.0, -180.0, 90.0, 180.0));
    }

    #[test]
    fn test_crossing_viewport_is_unwrapped() {
        let view = fit_view(Some(Bounds::new(0.0, 170.0, 20.0, -170.0)));
        assert!(!view.crosses_antimeridian());
        assert_eq!(view.west, 168.0);
        assert_eq!(view.east, 192.0);
        assert_eq!(view.south, -2.0);
    }

    #[test]
    fn test_margin_clamps_latitude() {
        let view = fit_view(Some(Bounds::new(-80.0, -100.0, 80.0, 100.0)));
        assert_eq!(view.south, -90.0);
        assert_eq!(view.north, 90.0);
        assert_eq!(view.west, -120.0);
    }

    #[test]
    fn test_place_uses_view_copy() {
        let view = Bounds::new(0.0, 168.0, 20.0, 192.0);
        assert_eq!(place(LatLon::new(10.0, -175.0), &view), (185.0, 10.0));
        assert_eq!(place(LatLon::new(10.0, 175.0), &view), (175.0, 10.0));
    }
}
