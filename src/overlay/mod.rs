mod detail;
mod drawable;
mod kind;
mod registry;
mod surface;

pub use detail::DetailPanel;
pub use drawable::{Drawable, DrawableId, Rgb, Shape};
pub use kind::OverlayKind;
pub use registry::OverlayRegistry;
pub use surface::{LayerSurface, MapSurface};
