use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use super::{Drawable, DrawableId, MapSurface, OverlayKind};

/// One overlay group: a visibility flag and the drawables it owns
#[derive(Debug)]
struct Group {
    visible: bool,
    items: Vec<Arc<Drawable>>,
    ids: HashSet<DrawableId>,
}

impl Group {
    fn new(visible: bool) -> Self {
        Self {
            visible,
            items: Vec::new(),
            ids: HashSet::new(),
        }
    }
}

/// Registry of every overlay group and the surface they draw onto.
///
/// Not synchronized; callers sharing it across tasks hold it behind a lock.
pub struct OverlayRegistry<S: MapSurface> {
    surface: S,
    groups: Vec<Group>,
}

impl<S: MapSurface> OverlayRegistry<S> {
    /// Create a registry with every group visible
    pub fn new(surface: S) -> Self {
        Self::with_hidden(surface, &[])
    }

    /// Create a registry with the given groups initially hidden
    pub fn with_hidden(surface: S, hidden: &[OverlayKind]) -> Self {
        let groups = OverlayKind::ALL
            .iter()
            .map(|kind| Group::new(!hidden.contains(kind)))
            .collect();
        Self { surface, groups }
    }

    fn group(&self, kind: OverlayKind) -> &Group {
        &self.groups[kind.index()]
    }

    fn group_mut(&mut self, kind: OverlayKind) -> &mut Group {
        &mut self.groups[kind.index()]
    }

    /// Detach and forget every drawable in the group. No-op when empty.
    pub fn clear_group(&mut self, kind: OverlayKind) {
        let items = {
            let group = self.group_mut(kind);
            group.ids.clear();
            std::mem::take(&mut group.items)
        };
        if items.is_empty() {
            return;
        }

        for drawable in &items {
            self.surface.detach(drawable.id);
        }
        debug!(group = %kind, count = items.len(), "Cleared overlay group");
    }

    pub fn clear_all(&mut self) {
        for kind in OverlayKind::ALL {
            self.clear_group(kind);
        }
    }

    /// Track a drawable in the group, attaching it when the group is visible.
    ///
    /// Returns `false` if the drawable was already tracked.
    pub fn add_drawable(&mut self, kind: OverlayKind, drawable: Drawable) -> bool {
        self.add_shared(kind, Arc::new(drawable))
    }

    pub fn add_shared(&mut self, kind: OverlayKind, drawable: Arc<Drawable>) -> bool {
        let group = self.group_mut(kind);
        if !group.ids.insert(drawable.id) {
            trace!(group = %kind, id = ?drawable.id, "Drawable already tracked");
            return false;
        }
        group.items.push(Arc::clone(&drawable));

        if group.visible {
            self.surface.attach(kind, &drawable);
        }
        true
    }

    /// Show or hide a group without dropping its drawables
    pub fn set_visible(&mut self, kind: OverlayKind, visible: bool) {
        let Self { surface, groups } = self;
        let group = &mut groups[kind.index()];
        group.visible = visible;

        let mut changed = 0usize;
        for drawable in &group.items {
            let attached = surface.is_attached(drawable.id);
            if visible && !attached {
                surface.attach(kind, drawable);
                changed += 1;
            } else if !visible && attached {
                surface.detach(drawable.id);
                changed += 1;
            }
        }

        debug!(group = %kind, visible, changed, "Set overlay visibility");
    }

    /// Flip a group's visibility, returning the new state
    pub fn toggle(&mut self, kind: OverlayKind) -> bool {
        let visible = !self.is_visible(kind);
        self.set_visible(kind, visible);
        visible
    }

    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.group(kind).visible
    }

    pub fn len(&self, kind: OverlayKind) -> usize {
        self.group(kind).items.len()
    }

    pub fn is_empty(&self, kind: OverlayKind) -> bool {
        self.group(kind).items.is_empty()
    }

    pub fn drawables(&self, kind: OverlayKind) -> &[Arc<Drawable>] {
        &self.group(kind).items
    }

    /// Number of the group's drawables currently on the surface
    pub fn attached_count(&self, kind: OverlayKind) -> usize {
        self.group(kind)
            .items
            .iter()
            .filter(|d| self.surface.is_attached(d.id))
            .count()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLon;
    use crate::overlay::{LayerSurface, Rgb};

    /// Surface that counts attach calls to catch duplicate attachment
    #[derive(Default)]
    struct CountingSurface {
        inner: LayerSurface,
        attaches: usize,
        detaches: usize,
    }

    impl MapSurface for CountingSurface {
        fn attach(&mut self, kind: OverlayKind, drawable: &Arc<Drawable>) {
            assert!(!self.inner.is_attached(drawable.id), "attached twice");
            self.attaches += 1;
            self.inner.attach(kind, drawable);
        }

        fn detach(&mut self, id: DrawableId) {
            self.detaches += 1;
            self.inner.detach(id);
        }

        fn is_attached(&self, id: DrawableId) -> bool {
            self.inner.is_attached(id)
        }
    }

    fn marker(lon: f64) -> Drawable {
        Drawable::marker(LatLon::new(10.0, lon), Rgb::ALERT_RED, "disaster")
    }

    fn attached_ids(registry: &OverlayRegistry<CountingSurface>) -> Vec<DrawableId> {
        registry.surface().inner.iter().map(|(_, d)| d.id).collect()
    }

    #[test]
    fn test_add_attaches_when_visible() {
        let mut registry = OverlayRegistry::new(CountingSurface::default());
        assert!(registry.add_drawable(OverlayKind::Disasters, marker(1.0)));

        assert_eq!(registry.len(OverlayKind::Disasters), 1);
        assert_eq!(registry.attached_count(OverlayKind::Disasters), 1);
    }

    #[test]
    fn test_add_while_hidden_tracks_only() {
        let mut registry =
            OverlayRegistry::with_hidden(CountingSurface::default(), &[OverlayKind::Disasters]);
        registry.add_drawable(OverlayKind::Disasters, marker(1.0));

        assert_eq!(registry.len(OverlayKind::Disasters), 1);
        assert_eq!(registry.attached_count(OverlayKind::Disasters), 0);
        assert!(registry.surface().inner.is_empty());

        registry.set_visible(OverlayKind::Disasters, true);
        assert_eq!(registry.attached_count(OverlayKind::Disasters), 1);
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut registry = OverlayRegistry::new(CountingSurface::default());
        let shared = Arc::new(marker(1.0));

        assert!(registry.add_shared(OverlayKind::Ships, Arc::clone(&shared)));
        assert!(!registry.add_shared(OverlayKind::Ships, shared));
        assert_eq!(registry.len(OverlayKind::Ships), 1);
        assert_eq!(registry.surface().attaches, 1);
    }

    #[test]
    fn test_clear_group_twice_is_noop() {
        let mut registry = OverlayRegistry::new(CountingSurface::default());
        for lon in [1.0, 2.0, 3.0] {
            registry.add_drawable(OverlayKind::Collisions, marker(lon));
        }

        registry.clear_group(OverlayKind::Collisions);
        assert_eq!(registry.len(OverlayKind::Collisions), 0);
        assert_eq!(registry.surface().detaches, 3);
        assert!(registry.surface().inner.is_empty());

        registry.clear_group(OverlayKind::Collisions);
        assert_eq!(registry.len(OverlayKind::Collisions), 0);
        assert_eq!(registry.surface().detaches, 3);
    }

    #[test]
    fn test_clear_leaves_other_groups() {
        let mut registry = OverlayRegistry::new(LayerSurface::new());
        registry.add_drawable(OverlayKind::Disasters, marker(1.0));
        registry.add_drawable(OverlayKind::Piracy, marker(2.0));

        registry.clear_group(OverlayKind::Disasters);
        assert_eq!(registry.len(OverlayKind::Piracy), 1);
        assert_eq!(registry.surface().len(), 1);
    }

    #[test]
    fn test_hide_show_restores_same_set() {
        let mut registry = OverlayRegistry::new(CountingSurface::default());
        for lon in 0..5 {
            registry.add_drawable(OverlayKind::Disasters, marker(lon as f64));
        }
        registry.add_drawable(OverlayKind::Ships, marker(50.0));
        let before = attached_ids(&registry);

        registry.set_visible(OverlayKind::Disasters, false);
        assert_eq!(registry.attached_count(OverlayKind::Disasters), 0);
        assert_eq!(registry.len(OverlayKind::Disasters), 5);
        assert_eq!(registry.surface().inner.len(), 1);

        registry.set_visible(OverlayKind::Disasters, true);
        assert_eq!(registry.attached_count(OverlayKind::Disasters), 5);
        assert_eq!(registry.surface().inner.len(), 6);
        assert_eq!(attached_ids(&registry), before);
    }

    #[test]
    fn test_repeated_show_does_not_duplicate() {
        let mut registry = OverlayRegistry::new(CountingSurface::default());
        registry.add_drawable(OverlayKind::Piracy, marker(1.0));

        registry.set_visible(OverlayKind::Piracy, true);
        registry.set_visible(OverlayKind::Piracy, true);
        assert_eq!(registry.surface().attaches, 1);
        assert_eq!(registry.attached_count(OverlayKind::Piracy), 1);
    }

    #[test]
    fn test_clear_hidden_group_then_show() {
        let mut registry = OverlayRegistry::new(LayerSurface::new());
        registry.add_drawable(OverlayKind::ProtectedAreas, marker(1.0));
        registry.set_visible(OverlayKind::ProtectedAreas, false);
        registry.clear_group(OverlayKind::ProtectedAreas);
        registry.set_visible(OverlayKind::ProtectedAreas, true);

        assert!(registry.surface().is_empty());
        assert!(registry.is_empty(OverlayKind::ProtectedAreas));
    }

    #[test]
    fn test_toggle() {
        let mut registry = OverlayRegistry::new(LayerSurface::new());
        registry.add_drawable(OverlayKind::Chokepoints, marker(1.0));

        assert!(!registry.toggle(OverlayKind::Chokepoints));
        assert!(registry.surface().is_empty());
        assert!(registry.toggle(OverlayKind::Chokepoints));
        assert_eq!(registry.surface().len(), 1);
    }
}
