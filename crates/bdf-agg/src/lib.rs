//! Deal aggregation pipeline: concurrent source fan-out, dedup, sorting,
//! the single-slot TTL cache, and the `DealService` facade callers talk to.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bdf_adapters::{
    AmazonStub, CommissionJunctionStub, CuratedSourceAdapter, DealSource, FetchQuery,
    MockDealGenerator, RapidApiStub,
};
use bdf_core::{sort_deals, DealRecord, Platform, SortOrder};
use bdf_store::CuratedDealStore;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const CRATE_NAME: &str = "bdf-agg";

pub const DEFAULT_MAX_DEALS_PER_SOURCE: usize = 10;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);
const DEFAULT_MOCK_SEED: u64 = 20260801;

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("no deal sources are enabled")]
    NoSourcesEnabled,
    #[error("all {attempted} deal sources failed")]
    AllSourcesFailed { attempted: usize },
}

/// Which sources participate in a fan-out and how much each may contribute.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub enable_amazon: bool,
    pub enable_rapid_api: bool,
    pub enable_commission_junction: bool,
    pub enable_mock_data: bool,
    pub max_deals_per_source: usize,
    pub cache_ttl: Duration,
    pub auto_refresh_interval: Duration,
    pub mock_seed: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            enable_amazon: true,
            enable_rapid_api: true,
            enable_commission_junction: true,
            enable_mock_data: true,
            max_deals_per_source: DEFAULT_MAX_DEALS_PER_SOURCE,
            cache_ttl: DEFAULT_CACHE_TTL,
            auto_refresh_interval: DEFAULT_AUTO_REFRESH_INTERVAL,
            mock_seed: DEFAULT_MOCK_SEED,
        }
    }
}

// Only `true/false/1/0` (any case, surrounding whitespace tolerated) count;
// anything else keeps the default rather than silently disabling a source.
fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => true,
            "0" | "false" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AggregatorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enable_amazon: env_flag("BDF_ENABLE_AMAZON", defaults.enable_amazon),
            enable_rapid_api: env_flag("BDF_ENABLE_RAPIDAPI", defaults.enable_rapid_api),
            enable_commission_junction: env_flag(
                "BDF_ENABLE_COMMISSION_JUNCTION",
                defaults.enable_commission_junction,
            ),
            enable_mock_data: env_flag("BDF_ENABLE_MOCK_DATA", defaults.enable_mock_data),
            max_deals_per_source: env_u64(
                "BDF_MAX_DEALS_PER_SOURCE",
                defaults.max_deals_per_source as u64,
            ) as usize,
            cache_ttl: Duration::from_secs(env_u64(
                "BDF_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            auto_refresh_interval: Duration::from_secs(env_u64(
                "BDF_AUTO_REFRESH_SECS",
                defaults.auto_refresh_interval.as_secs(),
            )),
            mock_seed: env_u64("BDF_MOCK_SEED", defaults.mock_seed),
        }
    }

    /// Assemble the enabled sources in fan-out order. Curated deals sit
    /// first, so on a dedup-key collision the curated record wins.
    pub fn build_sources(&self, store: Arc<CuratedDealStore>) -> Vec<Box<dyn DealSource>> {
        let mut sources: Vec<Box<dyn DealSource>> =
            vec![Box::new(CuratedSourceAdapter::new(store))];
        if self.enable_amazon {
            sources.push(Box::new(AmazonStub::new()));
        }
        if self.enable_rapid_api {
            sources.push(Box::new(RapidApiStub::new()));
        }
        if self.enable_commission_junction {
            sources.push(Box::new(CommissionJunctionStub::new()));
        }
        if self.enable_mock_data {
            sources.push(Box::new(MockDealGenerator::new(self.mock_seed)));
        }
        sources
    }
}

/// One merged fan-out result.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregation {
    pub run_id: Uuid,
    pub fetched_at: DateTime<Utc>,
    pub deals: Vec<DealRecord>,
    /// Count after dedup, before any caller-side filtering or limiting.
    pub total_results: usize,
    pub succeeded_sources: usize,
    pub failed_sources: usize,
}

/// Fan out to every source concurrently and merge the survivors.
///
/// Settle-all: every fetch future is created up front and awaited together,
/// so one slow or failing source neither blocks nor cancels the rest. A
/// failed source contributes nothing and is logged; the aggregate itself
/// fails only when every source failed.
///
/// Dedup winner is "first in source order producing that key", not "first to
/// respond": merging happens synchronously over the settled results in the
/// order the sources were configured.
pub async fn aggregate(
    sources: &[Box<dyn DealSource>],
    query: &FetchQuery,
    sort: Option<SortOrder>,
) -> Result<Aggregation, AggregateError> {
    if sources.is_empty() {
        return Err(AggregateError::NoSourcesEnabled);
    }

    let run_id = Uuid::new_v4();
    let span = info_span!("aggregate", %run_id, sources = sources.len());

    async move {
        let results = join_all(sources.iter().map(|source| source.fetch(query))).await;

        let mut merged = Vec::new();
        let mut succeeded = 0usize;
        let mut failed = 0usize;
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(records) => {
                    succeeded += 1;
                    merged.extend(records);
                }
                Err(err) => {
                    failed += 1;
                    warn!(source_id = source.source_id(), error = %err, "source failed, skipping");
                }
            }
        }

        if succeeded == 0 {
            return Err(AggregateError::AllSourcesFailed { attempted: failed });
        }

        let mut seen = HashSet::new();
        merged.retain(|deal| seen.insert(deal.dedup_key()));

        sort_deals(&mut merged, sort.unwrap_or(SortOrder::DiscountHigh));

        let total_results = merged.len();
        info!(total_results, succeeded, failed, "aggregation complete");
        Ok(Aggregation {
            run_id,
            fetched_at: Utc::now(),
            deals: merged,
            total_results,
            succeeded_sources: succeeded,
            failed_sources: failed,
        })
    }
    .instrument(span)
    .await
}

/// Single-slot TTL cache over the last aggregated result set.
///
/// Not keyed by query: a fetch with different parameters simply overwrites
/// the previous entry. The slot is the only shared mutable state in the
/// pipeline and `put` is a single assignment, so callers never observe a
/// partially written entry.
#[derive(Debug)]
pub struct DealCache {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry>>,
}

#[derive(Debug)]
struct CacheEntry {
    deals: Vec<DealRecord>,
    stored_at: Instant,
}

impl DealCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Cached deals while the entry is within its TTL; a stale entry is
    /// evicted on the way out. A miss is normal control flow, not an error.
    pub async fn get(&self) -> Option<Vec<DealRecord>> {
        let mut slot = self.slot.lock().await;
        match slot.as_ref() {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.deals.clone()),
            Some(_) => {
                *slot = None;
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, deals: Vec<DealRecord>) {
        let mut slot = self.slot.lock().await;
        *slot = Some(CacheEntry {
            deals,
            stored_at: Instant::now(),
        });
    }

    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        *slot = None;
    }
}

/// Query shape of the inbound deal interface.
#[derive(Debug, Clone, Default)]
pub struct DealQueryRequest {
    pub query: Option<String>,
    pub category: Option<String>,
    pub platform: Option<Platform>,
    pub limit: Option<usize>,
    /// `false` bypasses the cache read (the result still refills the slot).
    pub use_cache: bool,
}

impl DealQueryRequest {
    pub fn cached() -> Self {
        Self {
            use_cache: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DealPage {
    pub deals: Vec<DealRecord>,
    /// Count after dedup, before the platform filter and `limit` were applied.
    pub total_results: usize,
}

/// Facade over aggregation + cache. One instance per process, shared by
/// reference; tests construct their own with a fresh cache for isolation.
pub struct DealService {
    config: AggregatorConfig,
    sources: Vec<Box<dyn DealSource>>,
    cache: DealCache,
    refresh_lock: Mutex<()>,
    generation: AtomicU64,
}

impl DealService {
    pub fn new(config: AggregatorConfig, store: Arc<CuratedDealStore>) -> Self {
        let sources = config.build_sources(store);
        Self::with_sources(config, sources)
    }

    pub fn with_sources(config: AggregatorConfig, sources: Vec<Box<dyn DealSource>>) -> Self {
        let cache = DealCache::new(config.cache_ttl);
        Self {
            config,
            sources,
            cache,
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    fn fetch_query(&self, query: Option<&str>, category: Option<&str>) -> FetchQuery {
        FetchQuery::new(query, category, self.config.max_deals_per_source)
    }

    /// Serve merged deals, from the cache when the slot is fresh, otherwise
    /// via a fresh fan-out that refills it. Platform and category narrowing
    /// and `limit` are applied over the merged list after `total_results` is
    /// taken, so they hold on cache hits too.
    pub async fn get_deals(&self, request: &DealQueryRequest) -> Result<DealPage, AggregateError> {
        let cached = if request.use_cache {
            self.cache.get().await
        } else {
            None
        };

        let merged = match cached {
            Some(deals) => deals,
            None => {
                let fetch = self.fetch_query(request.query.as_deref(), request.category.as_deref());
                let aggregation = aggregate(&self.sources, &fetch, None).await?;
                self.cache.put(aggregation.deals.clone()).await;
                self.bump_generation();
                aggregation.deals
            }
        };

        let total_results = merged.len();
        let mut deals = merged;
        if let Some(platform) = &request.platform {
            deals.retain(|d| d.platform == *platform);
        }
        let category = request
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(category) = category {
            deals.retain(|d| {
                d.category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            });
        }
        if let Some(limit) = request.limit {
            deals.truncate(limit);
        }

        Ok(DealPage {
            deals,
            total_results,
        })
    }

    /// Invalidate, re-aggregate, re-populate. Single-flight: a caller that
    /// arrives while another refresh is running awaits it and reuses its
    /// result instead of issuing a second fan-out.
    pub async fn force_refresh(&self) -> Result<usize, AggregateError> {
        let generation_before = self.generation.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;

        if self.generation.load(Ordering::Acquire) != generation_before {
            if let Some(deals) = self.cache.get().await {
                return Ok(deals.len());
            }
        }

        self.cache.invalidate().await;
        let fetch = self.fetch_query(None, None);
        let aggregation = aggregate(&self.sources, &fetch, None).await?;
        self.cache.put(aggregation.deals.clone()).await;
        self.bump_generation();
        Ok(aggregation.total_results)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Periodic background refresh. The returned handle aborts the task on
    /// drop, so tearing down the owning context cannot orphan the timer.
    pub fn spawn_auto_refresh(self: &Arc<Self>) -> AutoRefreshHandle {
        let service = Arc::clone(self);
        let interval = self.config.auto_refresh_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // interval fires immediately; the first refresh should wait a
            // full period.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = service.force_refresh().await {
                    warn!(error = %err, "auto refresh failed");
                }
            }
        });
        AutoRefreshHandle { handle }
    }
}

#[derive(Debug)]
pub struct AutoRefreshHandle {
    handle: JoinHandle<()>,
}

impl AutoRefreshHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for AutoRefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bdf_adapters::SourceError;
    use bdf_core::{normalize, RawDeal};
    use std::sync::atomic::AtomicUsize;

    fn record(source: &str, title: &str, original: f64, discounted: f64) -> DealRecord {
        normalize(
            &RawDeal {
                title: Some(title.to_string()),
                original_price: Some(original),
                discounted_price: Some(discounted),
                ..RawDeal::default()
            },
            source,
            1700000000,
            0,
        )
        .unwrap()
    }

    struct StaticSource {
        id: &'static str,
        deals: Vec<DealRecord>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn boxed(id: &'static str, deals: Vec<DealRecord>) -> Box<dyn DealSource> {
            Box::new(Self {
                id,
                deals,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DealSource for StaticSource {
        fn source_id(&self) -> &str {
            self.id
        }

        async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.deals.clone())
        }
    }

    struct FailingSource(&'static str);

    #[async_trait]
    impl DealSource for FailingSource {
        fn source_id(&self) -> &str {
            self.0
        }

        async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
            Err(SourceError::unavailable(self.0, "upstream down"))
        }
    }

    /// Source whose fetch takes simulated time, for overlap tests.
    struct SlowCountingSource {
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DealSource for SlowCountingSource {
        fn source_id(&self) -> &str {
            "slow"
        }

        async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            time::sleep(Duration::from_millis(50)).await;
            Ok(vec![record("slow", "Slow Deal", 100.0, 50.0)])
        }
    }

    fn query() -> FetchQuery {
        FetchQuery::new(None, None, 10)
    }

    #[tokio::test]
    async fn two_of_four_sources_failing_still_succeeds() {
        let sources: Vec<Box<dyn DealSource>> = vec![
            StaticSource::boxed("a", vec![record("a", "Deal A", 100.0, 60.0)]),
            Box::new(FailingSource("b")),
            StaticSource::boxed("c", vec![record("c", "Deal C", 100.0, 40.0)]),
            Box::new(FailingSource("d")),
        ];
        let aggregation = aggregate(&sources, &query(), None).await.unwrap();
        assert_eq!(aggregation.succeeded_sources, 2);
        assert_eq!(aggregation.failed_sources, 2);
        let titles: Vec<_> = aggregation.deals.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Deal C", "Deal A"]);
    }

    #[tokio::test]
    async fn all_sources_failing_is_an_error() {
        let sources: Vec<Box<dyn DealSource>> = vec![
            Box::new(FailingSource("a")),
            Box::new(FailingSource("b")),
            Box::new(FailingSource("c")),
            Box::new(FailingSource("d")),
        ];
        let err = aggregate(&sources, &query(), None).await.unwrap_err();
        assert!(matches!(err, AggregateError::AllSourcesFailed { attempted: 4 }));
    }

    #[tokio::test]
    async fn no_sources_is_an_error() {
        let sources: Vec<Box<dyn DealSource>> = Vec::new();
        let err = aggregate(&sources, &query(), None).await.unwrap_err();
        assert!(matches!(err, AggregateError::NoSourcesEnabled));
    }

    #[tokio::test]
    async fn dedup_first_configured_source_wins() {
        let mut from_first = record("first", "Phone X", 1000.0, 750.0);
        from_first.rating = 4.9;
        let mut from_second = record("second", "phone x", 1000.0, 750.0);
        from_second.rating = 1.0;

        let sources: Vec<Box<dyn DealSource>> = vec![
            StaticSource::boxed("first", vec![from_first.clone()]),
            StaticSource::boxed("second", vec![from_second]),
        ];
        let aggregation = aggregate(&sources, &query(), None).await.unwrap();
        assert_eq!(aggregation.total_results, 1);
        assert_eq!(aggregation.deals[0], from_first);
    }

    #[tokio::test]
    async fn output_never_repeats_a_dedup_key() {
        let sources: Vec<Box<dyn DealSource>> = vec![
            StaticSource::boxed(
                "a",
                vec![
                    record("a", "Phone X", 1000.0, 750.0),
                    record("a", "Phone X", 1000.0, 700.0),
                ],
            ),
            StaticSource::boxed("b", vec![record("b", "PHONE X", 900.0, 750.0)]),
        ];
        let aggregation = aggregate(&sources, &query(), None).await.unwrap();
        let mut keys = HashSet::new();
        for deal in &aggregation.deals {
            assert!(keys.insert(deal.dedup_key()), "repeated key {}", deal.dedup_key());
        }
        // Same title at a different price is a different offer.
        assert_eq!(aggregation.total_results, 2);
    }

    #[tokio::test]
    async fn default_order_is_discount_descending() {
        let sources: Vec<Box<dyn DealSource>> = vec![StaticSource::boxed(
            "a",
            vec![
                record("a", "Small", 100.0, 90.0),
                record("a", "Big", 100.0, 20.0),
                record("a", "Mid", 100.0, 50.0),
            ],
        )];
        let aggregation = aggregate(&sources, &query(), None).await.unwrap();
        let titles: Vec<_> = aggregation.deals.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Big", "Mid", "Small"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_honors_ttl_boundary() {
        let cache = DealCache::new(Duration::from_millis(1000));
        cache.put(vec![record("a", "Cached", 10.0, 5.0)]).await;

        assert!(cache.get().await.is_some());

        time::advance(Duration::from_millis(1001)).await;
        assert!(cache.get().await.is_none());
        // Slot is cleared, not just hidden.
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn cache_invalidate_clears_the_slot() {
        let cache = DealCache::new(Duration::from_secs(60));
        cache.put(vec![record("a", "Cached", 10.0, 5.0)]).await;
        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn get_deals_serves_from_cache_on_the_second_call() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let service = DealService::with_sources(
            AggregatorConfig::default(),
            vec![Box::new(SlowCountingSource {
                fetches: Arc::clone(&fetches),
            })],
        );

        let first = service.get_deals(&DealQueryRequest::cached()).await.unwrap();
        let second = service.get_deals(&DealQueryRequest::cached()).await.unwrap();
        assert_eq!(first.total_results, second.total_results);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn get_deals_applies_platform_filter_and_limit_after_totals() {
        let mut amazon = record("a", "From Amazon", 100.0, 50.0);
        amazon.platform = Platform::Amazon;
        let mut meesho = record("a", "From Meesho", 100.0, 40.0);
        meesho.platform = Platform::Meesho;

        let service = DealService::with_sources(
            AggregatorConfig::default(),
            vec![StaticSource::boxed("a", vec![amazon, meesho])],
        );

        let page = service
            .get_deals(&DealQueryRequest {
                platform: Some(Platform::Meesho),
                limit: Some(1),
                use_cache: false,
                ..DealQueryRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_results, 2);
        assert_eq!(page.deals.len(), 1);
        assert_eq!(page.deals[0].title, "From Meesho");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_refreshes_share_one_fan_out() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let service = Arc::new(DealService::with_sources(
            AggregatorConfig::default(),
            vec![Box::new(SlowCountingSource {
                fetches: Arc::clone(&fetches),
            })],
        ));

        let a = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.force_refresh().await }
        });
        let b = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.force_refresh().await }
        });

        let (ra, rb) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        assert_eq!(ra, rb);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn category_narrowing_applies_on_cache_hits() {
        let mut novel = record("a", "Paperback Novel", 20.0, 10.0);
        novel.category = Some("books".to_string());
        let mut lamp = record("a", "Reading Lamp", 30.0, 15.0);
        lamp.category = Some("home".to_string());

        let service = DealService::with_sources(
            AggregatorConfig::default(),
            vec![StaticSource::boxed("a", vec![novel, lamp])],
        );

        // Warm the slot with an unnarrowed fan-out.
        service.get_deals(&DealQueryRequest::cached()).await.unwrap();

        let page = service
            .get_deals(&DealQueryRequest {
                category: Some("books".to_string()),
                use_cache: true,
                ..DealQueryRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_results, 2);
        assert_eq!(page.deals.len(), 1);
        assert_eq!(page.deals[0].title, "Paperback Novel");
    }

    #[tokio::test]
    async fn end_to_end_stub_aggregation_succeeds() {
        let store = Arc::new(CuratedDealStore::in_memory(
            std::env::temp_dir().join("bdf-agg-e2e.json"),
            vec![record("curated", "Editors' Pick", 50.0, 25.0)],
        ));
        let service = DealService::new(AggregatorConfig::default(), store);
        let page = service.get_deals(&DealQueryRequest::cached()).await.unwrap();
        assert!(page.total_results > 5);
        assert!(page.deals.iter().any(|d| d.title == "Editors' Pick"));
    }

    #[test]
    fn config_from_env_reads_overrides() {
        std::env::set_var("BDF_ENABLE_AMAZON", "false");
        std::env::set_var("BDF_MAX_DEALS_PER_SOURCE", "3");
        std::env::set_var("BDF_CACHE_TTL_SECS", "120");
        let config = AggregatorConfig::from_env();
        assert!(!config.enable_amazon);
        assert_eq!(config.max_deals_per_source, 3);
        assert_eq!(config.cache_ttl, Duration::from_secs(120));
        std::env::remove_var("BDF_ENABLE_AMAZON");
        std::env::remove_var("BDF_MAX_DEALS_PER_SOURCE");
        std::env::remove_var("BDF_CACHE_TTL_SECS");
    }

    #[test]
    fn env_flags_keep_the_default_on_unrecognized_values() {
        std::env::set_var("BDF_ENABLE_RAPIDAPI", "yes");
        std::env::set_var("BDF_ENABLE_MOCK_DATA", " 0 ");
        let config = AggregatorConfig::from_env();
        assert!(config.enable_rapid_api);
        assert!(!config.enable_mock_data);
        std::env::remove_var("BDF_ENABLE_RAPIDAPI");
        std::env::remove_var("BDF_ENABLE_MOCK_DATA");
    }
}
