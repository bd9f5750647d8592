//! Canonical deal schema, normalization, and the in-memory query engine for BDF.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "bdf-core";

/// Fallback image for upstream entries that ship without one.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/400x300?text=deal";

/// Rating assigned when the upstream payload carries none.
pub const DEFAULT_RATING: f64 = 4.0;

/// Expected category vocabulary. Unmatched categories are tolerated and
/// surfaced as-is, so this list is advisory, not an allowlist.
pub const CATEGORY_TAXONOMY: &[&str] = &[
    "electronics",
    "fashion",
    "home",
    "beauty",
    "toys",
    "books",
    "appliances",
    "sports",
    "grocery",
];

/// Minimum discount for a record to show up under the "offers" tab.
pub const OFFERS_TAB_MIN_DISCOUNT: u8 = 30;

#[derive(Debug, Error)]
#[error("unknown {what}: {value}")]
pub struct VocabularyError {
    pub what: &'static str,
    pub value: String,
}

/// Retail platform a deal originates from. Open enumeration: adapters for
/// platforms outside the fixed set surface as `Other(name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Amazon,
    Flipkart,
    Meesho,
    Other(String),
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Amazon => "amazon",
            Platform::Flipkart => "flipkart",
            Platform::Meesho => "meesho",
            Platform::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "amazon" => Platform::Amazon,
            "flipkart" => Platform::Flipkart,
            "meesho" => Platform::Meesho,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tab segment of the deals listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealTab {
    #[default]
    All,
    Trending,
    New,
    Offers,
}

impl std::str::FromStr for DealTab {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DealTab::All),
            "trending" => Ok(DealTab::Trending),
            "new" => Ok(DealTab::New),
            "offers" => Ok(DealTab::Offers),
            other => Err(VocabularyError {
                what: "tab",
                value: other.to_string(),
            }),
        }
    }
}

/// Total orders over a deal list. Ties keep their prior relative order
/// (all sorts are stable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "discount-high")]
    DiscountHigh,
    #[serde(rename = "price-low")]
    PriceLow,
    #[serde(rename = "price-high")]
    PriceHigh,
    #[serde(rename = "rating-high")]
    RatingHigh,
}

impl std::str::FromStr for SortOrder {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discount-high" => Ok(SortOrder::DiscountHigh),
            "price-low" => Ok(SortOrder::PriceLow),
            "price-high" => Ok(SortOrder::PriceHigh),
            "rating-high" => Ok(SortOrder::RatingHigh),
            other => Err(VocabularyError {
                what: "sort order",
                value: other.to_string(),
            }),
        }
    }
}

/// Canonical normalized deal. Immutable once produced by a source adapter;
/// curation and user actions create new records, they never mutate these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealRecord {
    /// `{source}-{fetch_stamp}-{index}`, unique within a result set.
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub original_price: f64,
    pub discounted_price: f64,
    pub discount_percentage: u8,
    pub image_url: String,
    pub platform: Platform,
    pub external_url: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_out_of_stock: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl DealRecord {
    /// Key used by the aggregator to drop overlapping offers. Intentionally
    /// coarse: case-folded title plus discounted price. Titles differing in
    /// whitespace or wording survive as duplicates, and unrelated products
    /// sharing title text and price collapse into one.
    pub fn dedup_key(&self) -> String {
        format!("{}-{}", self.title.to_lowercase(), self.discounted_price)
    }
}

/// Raw upstream payload as a source hands it over, before normalization.
/// Everything is optional; the normalizer decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeal {
    pub title: Option<String>,
    pub description: Option<String>,
    pub original_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub discount_percentage: Option<i64>,
    pub image_url: Option<String>,
    pub platform: Option<String>,
    pub external_url: Option<String>,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub category: Option<String>,
    pub is_new: Option<bool>,
    pub is_trending: Option<bool>,
    pub is_out_of_stock: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Discount percentage implied by a price pair, rounded to the nearest
/// integer. Zero original price means zero discount by definition.
pub fn discount_percent(original_price: f64, discounted_price: f64) -> u8 {
    if original_price <= 0.0 {
        return 0;
    }
    let pct = ((original_price - discounted_price) / original_price * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Convert one raw upstream entry into a canonical record.
///
/// Pure and deterministic given `source`, `fetch_stamp`, and `index`.
/// Tolerant by policy: missing optionals fall back to placeholders and an
/// inverted price pair is swapped rather than rejected. The only reason a
/// record is dropped is an absent or empty title, and that drops the single
/// record, never the batch.
pub fn normalize(
    raw: &RawDeal,
    source: &str,
    fetch_stamp: i64,
    index: usize,
) -> Option<DealRecord> {
    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let mut original_price = raw.original_price.unwrap_or(0.0).max(0.0);
    let mut discounted_price = raw.discounted_price.unwrap_or(original_price).max(0.0);
    if discounted_price > original_price {
        std::mem::swap(&mut original_price, &mut discounted_price);
    }

    let discount_percentage = match raw.discount_percentage {
        Some(pct) => pct.clamp(0, 100) as u8,
        None => discount_percent(original_price, discounted_price),
    };

    let platform = raw
        .platform
        .clone()
        .map(Platform::from)
        .unwrap_or_else(|| Platform::from(source.to_string()));

    Some(DealRecord {
        id: format!("{source}-{fetch_stamp}-{index}"),
        title: title.to_string(),
        description: raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ToString::to_string),
        original_price,
        discounted_price,
        discount_percentage,
        image_url: raw
            .image_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
        platform,
        external_url: raw.external_url.clone().unwrap_or_default(),
        rating: raw.rating.unwrap_or(DEFAULT_RATING).clamp(0.0, 5.0),
        rating_count: raw.rating_count,
        category: raw
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_lowercase),
        is_new: raw.is_new.unwrap_or(false),
        is_trending: raw.is_trending.unwrap_or(false),
        is_out_of_stock: raw.is_out_of_stock.unwrap_or(false),
        created_at: raw.created_at,
        expires_at: raw.expires_at,
    })
}

/// Client-side view over an already-fetched deal list.
///
/// Empty `platforms`/`categories` selections mean "all", not "none".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealFilter {
    pub search: Option<String>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    #[serde(default)]
    pub tab: DealTab,
    pub sort: Option<SortOrder>,
}

impl DealFilter {
    fn matches(&self, deal: &DealRecord) -> bool {
        // Predicate order: search, platform, category, price, tab.
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            let in_title = deal.title.to_lowercase().contains(&needle);
            let in_description = deal
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_title && !in_description {
                return false;
            }
        }

        if !self.platforms.is_empty() && !self.platforms.contains(&deal.platform) {
            return false;
        }

        if !self.categories.is_empty() {
            let selected = deal
                .category
                .as_deref()
                .map(|c| {
                    self.categories
                        .iter()
                        .any(|wanted| wanted.eq_ignore_ascii_case(c))
                })
                .unwrap_or(false);
            if !selected {
                return false;
            }
        }

        if let Some(min) = self.price_min {
            if deal.discounted_price < min {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if deal.discounted_price > max {
                return false;
            }
        }

        match self.tab {
            DealTab::All => true,
            DealTab::Trending => deal.is_trending,
            DealTab::New => deal.is_new,
            DealTab::Offers => deal.discount_percentage >= OFFERS_TAB_MIN_DISCOUNT,
        }
    }
}

/// Stable in-place sort by the given order.
pub fn sort_deals(deals: &mut [DealRecord], order: SortOrder) {
    match order {
        SortOrder::DiscountHigh => {
            deals.sort_by(|a, b| b.discount_percentage.cmp(&a.discount_percentage))
        }
        SortOrder::PriceLow => {
            deals.sort_by(|a, b| a.discounted_price.total_cmp(&b.discounted_price))
        }
        SortOrder::PriceHigh => {
            deals.sort_by(|a, b| b.discounted_price.total_cmp(&a.discounted_price))
        }
        SortOrder::RatingHigh => deals.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
    }
}

/// Apply all filter predicates as a conjunction, then sort. Synchronous over
/// an in-memory list; independent of the aggregator and the cache.
pub fn apply_filter(deals: &[DealRecord], filter: &DealFilter) -> Vec<DealRecord> {
    let mut out: Vec<DealRecord> = deals
        .iter()
        .filter(|deal| filter.matches(deal))
        .cloned()
        .collect();
    if let Some(order) = filter.sort {
        sort_deals(&mut out, order);
    }
    out
}
