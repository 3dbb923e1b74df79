use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Drawable, DrawableId, OverlayKind};

/// Something drawables can be attached to and detached from
pub trait MapSurface {
    fn attach(&mut self, kind: OverlayKind, drawable: &Arc<Drawable>);
    fn detach(&mut self, id: DrawableId);
    fn is_attached(&self, id: DrawableId) -> bool;
}

/// Live set of attached drawables, in attach order of their ids
#[derive(Debug, Default)]
pub struct LayerSurface {
    attached: BTreeMap<DrawableId, (OverlayKind, Arc<Drawable>)>,
}

impl LayerSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverlayKind, &Arc<Drawable>)> {
        self.attached.values().map(|(kind, drawable)| (*kind, drawable))
    }

    /// Snapshot for painting outside the registry lock
    pub fn snapshot(&self) -> Vec<(OverlayKind, Arc<Drawable>)> {
        self.attached
            .values()
            .map(|(kind, drawable)| (*kind, Arc::clone(drawable)))
            .collect()
    }
}

impl MapSurface for LayerSurface {
    fn attach(&mut self, kind: OverlayKind, drawable: &Arc<Drawable>) {
        self.attached
            .entry(drawable.id)
            .or_insert_with(|| (kind, Arc::clone(drawable)));
    }

    fn detach(&mut self, id: DrawableId) {
        self.attached.remove(&id);
    }

    fn is_attached(&self, id: DrawableId) -> bool {
        self.attached.contains_key(&id)
    }
}
