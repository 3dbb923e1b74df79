use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, instrument, warn};

use crate::api::{Backend, Collision};
use crate::overlay::MapSurface;

use super::{Generation, MapController};

/// Result of fanning out collision lookups over several disaster areas
#[derive(Debug, Clone, Default)]
pub struct CollisionAggregate {
    pub issued: usize,
    pub settled: usize,
    pub failed: usize,
    pub collisions: Vec<Collision>,
}

impl CollisionAggregate {
    pub fn critical_count(&self) -> usize {
        self.collisions.iter().filter(|c| c.is_critical()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.settled == self.issued
    }
}

/// Look up collisions for every disaster concurrently.
///
/// `on_settled` runs exactly once, after the last outstanding lookup has
/// settled; it never runs when there is nothing to look up. A failed lookup
/// settles with zero collisions.
pub async fn aggregate_collisions<B, F>(
    backend: &B,
    disaster_ids: &[String],
    on_settled: F,
) -> CollisionAggregate
where
    B: Backend + ?Sized,
    F: FnOnce(&CollisionAggregate),
{
    let mut aggregate = CollisionAggregate {
        issued: disaster_ids.len(),
        ..Default::default()
    };
    if disaster_ids.is_empty() {
        return aggregate;
    }

    let mut pending: FuturesUnordered<_> = disaster_ids
        .iter()
        .map(|id| async move { (id, backend.disaster_collisions(id).await) })
        .collect();

    let mut on_settled = Some(on_settled);
    while let Some((id, result)) = pending.next().await {
        aggregate.settled += 1;
        match result {
            Ok(found) => {
                debug!(disaster = %id, count = found.len(), "Collision lookup settled");
                aggregate.collisions.extend(found);
            }
            Err(e) => {
                warn!(disaster = %id, error = %e, "Collision lookup failed");
                aggregate.failed += 1;
            }
        }

        if aggregate.is_complete() {
            if let Some(render) = on_settled.take() {
                render(&aggregate);
            }
        }
    }

    aggregate
}

impl<S: MapSurface> MapController<S> {
    /// Check the given disaster areas for collisions and draw the result once.
    ///
    /// Returns `None` when a newer calculation replaced this one meanwhile.
    #[instrument(skip(self, backend, disaster_ids), fields(count = disaster_ids.len()))]
    pub async fn check_disaster_collisions<B>(
        &self,
        backend: &B,
        generation: Generation,
        disaster_ids: &[String],
    ) -> Option<CollisionAggregate>
    where
        B: Backend + ?Sized,
    {
        let aggregate = aggregate_collisions(backend, disaster_ids, |aggregate| {
            self.draw_collisions(generation, &aggregate.collisions);
        })
        .await;

        self.is_current(generation).then_some(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::controller::tests::{collision, FakeBackend};

    #[tokio::test]
    async fn test_renders_once_after_all_settle() {
        let backend = FakeBackend::default()
            .with_collisions("1", vec![])
            .with_collisions("2", vec![])
            .with_failed_collisions("3");
        let ids = vec!["1".to_string(), "2".to_string(), "3".to_string()];

        let renders = AtomicUsize::new(0);
        let aggregate = aggregate_collisions(&backend, &ids, |aggregate| {
            assert!(aggregate.is_complete());
            renders.fetch_add(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(renders.load(Ordering::SeqCst), 1);
        assert_eq!(aggregate.settled, 3);
        assert_eq!(aggregate.failed, 1);
        assert!(aggregate.collisions.is_empty());
    }

    #[tokio::test]
    async fn test_collects_across_disasters() {
        let backend = FakeBackend::default()
            .with_collisions("a", vec![collision("CRITICAL", 10.0)])
            .with_collisions("b", vec![collision("HIGH", 20.0), collision("CRITICAL", 30.0)]);
        let ids = vec!["a".to_string(), "b".to_string()];

        let aggregate = aggregate_collisions(&backend, &ids, |_| {}).await;
        assert_eq!(aggregate.collisions.len(), 3);
        assert_eq!(aggregate.critical_count(), 2);
    }

    #[test]
    fn test_nothing_to_check_never_renders() {
        let backend = FakeBackend::default();
        let renders = AtomicUsize::new(0);
        let aggregate = tokio_test::block_on(aggregate_collisions(&backend, &[], |_| {
            renders.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(aggregate.issued, 0);
        assert_eq!(renders.load(Ordering::SeqCst), 0);
    }
}
