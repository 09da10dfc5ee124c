//! Memoization cache behavior through the engine facade.

mod common;

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};

use common::{engine_with, ids, multiplier_relic, percentage_relic};
use relic_core::CombatContext;
use relic_engine::{
    ComposeRequestOptions, InMemoryCompositionCache, InMemoryRelicRepo, ManualClock, RelicEngine,
};

fn engine_with_manual_clock(
    relics: Vec<relic_core::Relic>,
) -> (RelicEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_at(Utc::now()));
    let engine = RelicEngine::builder()
        .with_repository(Arc::new(InMemoryRelicRepo::with_relics(relics)))
        .with_clock(clock.clone())
        .with_cache(Arc::new(InMemoryCompositionCache::new(clock.clone())))
        .build();
    (engine, clock)
}

#[tokio::test]
async fn second_composition_hits_the_cache_with_equal_result() {
    let engine = engine_with([percentage_relic("a", "Alpha", 10.0)]);
    let ctx = CombatContext::default();

    let miss = engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    assert!(!miss.cache_hit);

    let hit = engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    assert!(hit.cache_hit);
    assert_eq!(hit.result, miss.result);

    let stats = engine.cache_statistics().await.unwrap();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.total_hits, 1);
}

#[tokio::test]
async fn force_recalculate_bypasses_lookup_but_still_stores() {
    let engine = engine_with([percentage_relic("a", "Alpha", 10.0)]);
    let ctx = CombatContext::default();

    engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    let forced = engine
        .compose(
            &ids(&["a"]),
            &ctx,
            ComposeRequestOptions {
                force_recalculate: true,
                ..ComposeRequestOptions::default()
            },
        )
        .await
        .unwrap();
    assert!(!forced.cache_hit);

    let stats = engine.cache_statistics().await.unwrap();
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn expired_entries_miss_then_cleanup_removes_them() {
    let (engine, clock) = engine_with_manual_clock(vec![percentage_relic("a", "Alpha", 10.0)]);
    let ctx = CombatContext::default();

    engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();

    // Default TTL is one hour; step past it.
    clock.advance(ChronoDuration::seconds(3601));

    let after_expiry = engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    assert!(!after_expiry.cache_hit, "expired entry must be treated as absent");

    // The recompose overwrote the expired entry in place.
    let stats = engine.cache_statistics().await.unwrap();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.expired_entries, 0);

    clock.advance(ChronoDuration::seconds(3601));
    assert_eq!(engine.cleanup_expired_cache().await.unwrap(), 1);
    assert_eq!(engine.cache_statistics().await.unwrap().entries, 0);
}

#[tokio::test]
async fn different_contexts_key_different_entries() {
    let engine = engine_with([percentage_relic("a", "Alpha", 10.0)]);

    let melee = engine
        .compose(&ids(&["a"]), &CombatContext::default(), ComposeRequestOptions::default())
        .await
        .unwrap();
    let leveled = engine
        .compose(
            &ids(&["a"]),
            &CombatContext::default().with_level(10),
            ComposeRequestOptions::default(),
        )
        .await
        .unwrap();

    assert_ne!(melee.cache_key, leveled.cache_key);
    assert_eq!(engine.cache_statistics().await.unwrap().entries, 2);
}

#[tokio::test]
async fn clear_cache_removes_everything() {
    let engine = engine_with([
        percentage_relic("a", "Alpha", 10.0),
        multiplier_relic("b", "Beta", 1.2),
    ]);
    let ctx = CombatContext::default();

    engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    engine
        .compose(&ids(&["b"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();

    assert_eq!(engine.clear_cache().await.unwrap(), 2);
    assert_eq!(engine.cache_statistics().await.unwrap().entries, 0);
}

#[tokio::test]
async fn statistics_rank_entries_by_hits() {
    let engine = engine_with([
        percentage_relic("a", "Alpha", 10.0),
        multiplier_relic("b", "Beta", 1.2),
    ]);
    let ctx = CombatContext::default();

    let popular = engine
        .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    engine
        .compose(&ids(&["b"]), &ctx, ComposeRequestOptions::default())
        .await
        .unwrap();
    for _ in 0..3 {
        engine
            .compose(&ids(&["a"]), &ctx, ComposeRequestOptions::default())
            .await
            .unwrap();
    }

    let stats = engine.cache_statistics().await.unwrap();
    assert_eq!(stats.total_hits, 3);
    assert_eq!(stats.average_hits, 1.5);
    assert_eq!(stats.top_entries[0].key, popular.cache_key);
    assert_eq!(stats.top_entries[0].hit_count, 3);
    assert!(stats.approx_bytes > 0);
}
