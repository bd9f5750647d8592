//! Source adapter contract + stub/mock adapter implementations.
//!
//! Every origin (mock generator, affiliate-network stubs, curated store)
//! implements [`DealSource`]: given a query it returns already-normalized
//! [`DealRecord`]s or a [`SourceError`]. Failures never escape an adapter as
//! panics; normalization happens at the adapter boundary, so downstream code
//! can rely on record invariants.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bdf_core::{normalize, DealRecord, RawDeal};
use bdf_store::CuratedDealStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "bdf-adapters";

/// Stamp baked into stub record ids so repeated fetches of the same catalog
/// produce identical ids.
const STUB_CATALOG_STAMP: i64 = 20260801;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source {source_id} unavailable: {reason}")]
    Unavailable { source_id: String, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SourceError {
    pub fn unavailable(source_id: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Upstream request: free-text query, category narrowing, and an upper bound
/// on returned records (a cap, not a guarantee).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    pub query: Option<String>,
    pub category: Option<String>,
    pub limit: usize,
}

impl FetchQuery {
    pub fn new(query: Option<&str>, category: Option<&str>, limit: usize) -> Self {
        Self {
            query: query.map(ToString::to_string),
            category: category.map(ToString::to_string),
            limit,
        }
    }

    fn matches(&self, title: &str, category: &str) -> bool {
        if let Some(wanted) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if !wanted.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(needle) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait DealSource: Send + Sync {
    fn source_id(&self) -> &str;

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError>;
}

// ---------------------------------------------------------------------------
// Mock platform generator
// ---------------------------------------------------------------------------

// title, category, platform, base price
const MOCK_CATALOG: &[(&str, &str, &str, f64)] = &[
    ("Wireless Noise-Cancelling Headphones", "electronics", "amazon", 199.0),
    ("Smart Fitness Band Pro", "electronics", "flipkart", 79.0),
    ("4K Streaming Stick", "electronics", "amazon", 49.0),
    ("Bluetooth Portable Speaker", "electronics", "meesho", 59.0),
    ("Cotton Oversized Hoodie", "fashion", "meesho", 39.0),
    ("Slim Fit Denim Jeans", "fashion", "flipkart", 54.0),
    ("Running Shoes Featherlite", "sports", "amazon", 89.0),
    ("Yoga Mat Non-Slip 6mm", "sports", "meesho", 25.0),
    ("Cast Iron Skillet 12in", "home", "amazon", 45.0),
    ("Aroma Diffuser with Timer", "home", "flipkart", 32.0),
    ("Vitamin C Face Serum", "beauty", "meesho", 22.0),
    ("Building Blocks 500pc Set", "toys", "flipkart", 35.0),
    ("Hardcover Notebook Trio", "books", "amazon", 18.0),
    ("Air Fryer 5L Digital", "appliances", "flipkart", 120.0),
    ("Organic Trail Mix 1kg", "grocery", "meesho", 15.0),
];

/// Deterministic mock platform source: same seed, same records. The seed
/// doubles as the id stamp so a generator instance is reproducible end to end.
#[derive(Debug, Clone, Copy)]
pub struct MockDealGenerator {
    seed: u64,
}

impl MockDealGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl DealSource for MockDealGenerator {
    fn source_id(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::new();

        for (index, &(title, category, platform, base_price)) in
            MOCK_CATALOG.iter().enumerate()
        {
            // Advance the RNG for every product so narrowing the query does
            // not reshuffle the surviving records.
            let discount_factor: f64 = rng.gen_range(0.30..0.75);
            let rating: f64 = rng.gen_range(3.2..5.0);
            let rating_count: u64 = rng.gen_range(40..5000);
            let is_new = rng.gen_bool(0.25);
            let is_trending = rng.gen_bool(0.30);

            if !query.matches(title, category) {
                continue;
            }
            if query.limit > 0 && out.len() >= query.limit {
                continue;
            }

            let discounted = (base_price * (1.0 - discount_factor) * 100.0).round() / 100.0;
            let raw = RawDeal {
                title: Some(title.to_string()),
                description: Some(format!("Limited-time deal on {title}")),
                original_price: Some(base_price),
                discounted_price: Some(discounted),
                platform: Some(platform.to_string()),
                external_url: Some(format!("https://{platform}.example.com/dp/{}", index + 1)),
                rating: Some((rating * 10.0).round() / 10.0),
                rating_count: Some(rating_count),
                category: Some(category.to_string()),
                is_new: Some(is_new),
                is_trending: Some(is_trending),
                ..RawDeal::default()
            };
            if let Some(record) = normalize(&raw, self.source_id(), self.seed as i64, index) {
                out.push(record);
            }
        }

        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Affiliate-network stubs
// ---------------------------------------------------------------------------

/// Failure switch shared by the affiliate stubs; lets tests and demos make an
/// individual source unavailable.
#[derive(Debug, Clone, Default)]
struct FailureMode {
    reason: Option<String>,
}

impl FailureMode {
    fn check(&self, source_id: &str) -> Result<(), SourceError> {
        match &self.reason {
            Some(reason) => Err(SourceError::unavailable(source_id, reason.clone())),
            None => Ok(()),
        }
    }
}

/// Amazon Product Advertising wire shape, as the stub emits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AmazonItem {
    asin: String,
    item_name: String,
    list_price: f64,
    deal_price: f64,
    savings_percent: Option<i64>,
    image: Option<String>,
    detail_page_url: String,
    stars: f64,
    total_reviews: u64,
    node: String,
}

#[derive(Debug, Clone, Default)]
pub struct AmazonStub {
    failure: FailureMode,
}

impl AmazonStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(reason: impl Into<String>) -> Self {
        Self {
            failure: FailureMode {
                reason: Some(reason.into()),
            },
        }
    }

    fn sample_items() -> Vec<AmazonItem> {
        vec![
            AmazonItem {
                asin: "B0DEALP1".into(),
                item_name: "Mechanical Keyboard TKL".into(),
                list_price: 129.0,
                deal_price: 84.0,
                savings_percent: Some(35),
                image: Some("https://images.example.com/keyboard.jpg".into()),
                detail_page_url: "https://amazon.example.com/dp/B0DEALP1".into(),
                stars: 4.6,
                total_reviews: 2841,
                node: "electronics".into(),
            },
            AmazonItem {
                asin: "B0DEALP2".into(),
                item_name: "Stainless Steel Water Bottle 1L".into(),
                list_price: 30.0,
                deal_price: 18.0,
                savings_percent: None,
                image: None,
                detail_page_url: "https://amazon.example.com/dp/B0DEALP2".into(),
                stars: 4.4,
                total_reviews: 910,
                node: "sports".into(),
            },
            AmazonItem {
                asin: "B0DEALP3".into(),
                item_name: "LED Desk Lamp with USB Port".into(),
                list_price: 42.0,
                deal_price: 27.0,
                savings_percent: Some(36),
                image: Some("https://images.example.com/lamp.jpg".into()),
                detail_page_url: "https://amazon.example.com/dp/B0DEALP3".into(),
                stars: 4.2,
                total_reviews: 456,
                node: "home".into(),
            },
        ]
    }
}

#[async_trait]
impl DealSource for AmazonStub {
    fn source_id(&self) -> &str {
        "amazon"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
        self.failure.check(self.source_id())?;

        let mut out = Vec::new();
        for (index, item) in Self::sample_items().into_iter().enumerate() {
            if !query.matches(&item.item_name, &item.node) {
                continue;
            }
            if query.limit > 0 && out.len() >= query.limit {
                break;
            }
            let raw = RawDeal {
                title: Some(item.item_name),
                original_price: Some(item.list_price),
                discounted_price: Some(item.deal_price),
                discount_percentage: item.savings_percent,
                image_url: item.image,
                platform: Some("amazon".into()),
                external_url: Some(item.detail_page_url),
                rating: Some(item.stars),
                rating_count: Some(item.total_reviews),
                category: Some(item.node),
                ..RawDeal::default()
            };
            if let Some(record) = normalize(&raw, self.source_id(), STUB_CATALOG_STAMP, index) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

/// RapidAPI deals wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RapidApiOffer {
    offer_id: String,
    product_title: String,
    retail_price: f64,
    sale_price: f64,
    product_photo: Option<String>,
    product_url: String,
    store_name: String,
    rating: Option<f64>,
    category_path: String,
    trending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RapidApiStub {
    failure: FailureMode,
}

impl RapidApiStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(reason: impl Into<String>) -> Self {
        Self {
            failure: FailureMode {
                reason: Some(reason.into()),
            },
        }
    }

    fn sample_offers() -> Vec<RapidApiOffer> {
        vec![
            RapidApiOffer {
                offer_id: "ra-7001".into(),
                product_title: "Robot Vacuum Cleaner Gen2".into(),
                retail_price: 299.0,
                sale_price: 189.0,
                product_photo: Some("https://cdn.example.com/vacuum.jpg".into()),
                product_url: "https://deals.example.com/ra-7001".into(),
                store_name: "flipkart".into(),
                rating: Some(4.3),
                category_path: "appliances".into(),
                trending: true,
            },
            RapidApiOffer {
                offer_id: "ra-7002".into(),
                product_title: "Graphic Novel Box Set".into(),
                retail_price: 75.0,
                sale_price: 48.0,
                product_photo: None,
                product_url: "https://deals.example.com/ra-7002".into(),
                store_name: "bookbarn".into(),
                rating: None,
                category_path: "books".into(),
                trending: false,
            },
            RapidApiOffer {
                offer_id: "ra-7003".into(),
                product_title: "Wireless Noise-Cancelling Headphones".into(),
                retail_price: 210.0,
                sale_price: 129.0,
                product_photo: Some("https://cdn.example.com/anc.jpg".into()),
                product_url: "https://deals.example.com/ra-7003".into(),
                store_name: "meesho".into(),
                rating: Some(4.7),
                category_path: "electronics".into(),
                trending: true,
            },
        ]
    }
}

#[async_trait]
impl DealSource for RapidApiStub {
    fn source_id(&self) -> &str {
        "rapidapi"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
        self.failure.check(self.source_id())?;

        let mut out = Vec::new();
        for (index, offer) in Self::sample_offers().into_iter().enumerate() {
            if !query.matches(&offer.product_title, &offer.category_path) {
                continue;
            }
            if query.limit > 0 && out.len() >= query.limit {
                break;
            }
            let raw = RawDeal {
                title: Some(offer.product_title),
                original_price: Some(offer.retail_price),
                discounted_price: Some(offer.sale_price),
                image_url: offer.product_photo,
                platform: Some(offer.store_name),
                external_url: Some(offer.product_url),
                rating: offer.rating,
                category: Some(offer.category_path),
                is_trending: Some(offer.trending),
                ..RawDeal::default()
            };
            if let Some(record) = normalize(&raw, self.source_id(), STUB_CATALOG_STAMP, index) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

/// Commission Junction promotion wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CjPromotion {
    promotion_id: String,
    advertiser: String,
    headline: String,
    was_price: f64,
    now_price: f64,
    landing_url: String,
    vertical: String,
    fresh: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CommissionJunctionStub {
    failure: FailureMode,
}

impl CommissionJunctionStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(reason: impl Into<String>) -> Self {
        Self {
            failure: FailureMode {
                reason: Some(reason.into()),
            },
        }
    }

    fn sample_promotions() -> Vec<CjPromotion> {
        vec![
            CjPromotion {
                promotion_id: "cj-3301".into(),
                advertiser: "flipkart".into(),
                headline: "Espresso Machine Compact".into(),
                was_price: 240.0,
                now_price: 156.0,
                landing_url: "https://cj.example.com/click/3301".into(),
                vertical: "appliances".into(),
                fresh: true,
            },
            CjPromotion {
                promotion_id: "cj-3302".into(),
                advertiser: "meesho".into(),
                headline: "Linen Summer Dress".into(),
                was_price: 65.0,
                now_price: 39.0,
                landing_url: "https://cj.example.com/click/3302".into(),
                vertical: "fashion".into(),
                fresh: false,
            },
        ]
    }
}

#[async_trait]
impl DealSource for CommissionJunctionStub {
    fn source_id(&self) -> &str {
        "commission-junction"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
        self.failure.check(self.source_id())?;

        let mut out = Vec::new();
        for (index, promo) in Self::sample_promotions().into_iter().enumerate() {
            if !query.matches(&promo.headline, &promo.vertical) {
                continue;
            }
            if query.limit > 0 && out.len() >= query.limit {
                break;
            }
            let raw = RawDeal {
                title: Some(promo.headline),
                original_price: Some(promo.was_price),
                discounted_price: Some(promo.now_price),
                platform: Some(promo.advertiser),
                external_url: Some(promo.landing_url),
                category: Some(promo.vertical),
                is_new: Some(promo.fresh),
                ..RawDeal::default()
            };
            if let Some(record) = normalize(&raw, self.source_id(), STUB_CATALOG_STAMP, index) {
                out.push(record);
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Curated store adapter
// ---------------------------------------------------------------------------

/// Adapter over the manual-curation store. Curated deals surface no matter
/// what the caller searched for, so query and category are ignored; `limit`
/// still caps the batch.
pub struct CuratedSourceAdapter {
    store: Arc<CuratedDealStore>,
}

impl CuratedSourceAdapter {
    pub fn new(store: Arc<CuratedDealStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DealSource for CuratedSourceAdapter {
    fn source_id(&self) -> &str {
        "curated"
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<DealRecord>, SourceError> {
        let mut records = self.store.list().await;
        if query.limit > 0 && records.len() > query.limit {
            records.truncate(query.limit);
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Source registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source_id: String,
    pub display_name: String,
    pub enabled: bool,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRegistry {
    pub sources: Vec<SourceEntry>,
}

impl Default for SourceRegistry {
    fn default() -> Self {
        let entry = |source_id: &str, display_name: &str, kind: &str| SourceEntry {
            source_id: source_id.to_string(),
            display_name: display_name.to_string(),
            enabled: true,
            kind: kind.to_string(),
        };
        Self {
            sources: vec![
                entry("curated", "Manually Curated", "curated"),
                entry("amazon", "Amazon Associates (stub)", "affiliate"),
                entry("rapidapi", "RapidAPI Deals (stub)", "affiliate"),
                entry("commission-junction", "Commission Junction (stub)", "affiliate"),
                entry("mock", "Mock Platform Generator", "mock"),
            ],
        }
    }
}

impl SourceRegistry {
    /// Load `sources.yaml`; a missing file yields the built-in default
    /// registry, a malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn is_enabled(&self, source_id: &str) -> bool {
        self.sources
            .iter()
            .any(|s| s.source_id == source_id && s.enabled)
    }
}
