//! Query parameters as carried in a URL query string.
//!
//! Every key is optional and an empty value means "unset". Numeric values that
//! fail to parse are dropped instead of rejected, so a hand-edited URL never
//! turns into an error page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const KEY_QUERY: &str = "query";
pub const KEY_SERVICE: &str = "service";
pub const KEY_LOCATION: &str = "location";
pub const KEY_DATE: &str = "date";
pub const KEY_TIME: &str = "time";
pub const KEY_SORT: &str = "sort";
pub const KEY_MIN_PRICE: &str = "minPrice";
pub const KEY_MAX_PRICE: &str = "maxPrice";
pub const KEY_RATING: &str = "rating";
pub const KEY_DISCOUNT: &str = "discount";
pub const KEY_PAGE: &str = "page";

/// Bounds and step of the price slider on the filter panel.
pub const PRICE_SLIDER_MIN: u32 = 500;
pub const PRICE_SLIDER_MAX: u32 = 5000;
pub const PRICE_SLIDER_STEP: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    Rating,
    PriceAsc,
    PriceDesc,
    Discount,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Rating => "rating",
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::Discount => "discount",
        }
    }

    /// Unknown values fall back to relevance.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(SortKey::Relevance),
            "rating" => Ok(SortKey::Rating),
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            "discount" => Ok(SortKey::Discount),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    pub query: Option<String>,
    pub service: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub discount_only: bool,
    pub sort: SortKey,
    /// 1-based.
    pub page: usize,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            query: None,
            service: None,
            location: None,
            date: None,
            time: None,
            min_price: None,
            max_price: None,
            min_rating: None,
            discount_only: false,
            sort: SortKey::Relevance,
            page: 1,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Any finite number whose integral part is at least 1 names a page; values
/// past `usize::MAX` saturate so they still land beyond the last page.
fn parse_page(value: &str) -> usize {
    match parse_number(value).map(f64::trunc) {
        Some(page) if page >= 1.0 => page as usize,
        _ => 1,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

impl QueryParameters {
    /// Build parameters from string pairs. Later duplicates override earlier ones;
    /// unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                KEY_QUERY => params.query = non_empty(value),
                KEY_SERVICE => params.service = non_empty(value),
                KEY_LOCATION => params.location = non_empty(value),
                KEY_DATE => params.date = non_empty(value),
                KEY_TIME => params.time = non_empty(value),
                KEY_SORT => params.sort = SortKey::parse_lenient(value),
                KEY_MIN_PRICE => params.min_price = parse_number(value),
                KEY_MAX_PRICE => params.max_price = parse_number(value),
                KEY_RATING => params.min_rating = parse_number(value),
                KEY_DISCOUNT => params.discount_only = value == "true",
                KEY_PAGE => params.page = parse_page(value),
                other => tracing::trace!(key = other, "ignoring unknown query parameter"),
            }
        }
        params
    }

    pub fn from_query_string(qs: &str) -> Self {
        let qs = qs.strip_prefix('?').unwrap_or(qs);
        Self::from_pairs(url::form_urlencoded::parse(qs.as_bytes()))
    }

    /// Set keys only, in a stable order. Defaults (relevance sort, page 1,
    /// discount off) are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let text = [
            (KEY_QUERY, &self.query),
            (KEY_SERVICE, &self.service),
            (KEY_LOCATION, &self.location),
            (KEY_DATE, &self.date),
            (KEY_TIME, &self.time),
        ];
        for (key, value) in text {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        }
        if self.sort != SortKey::Relevance {
            pairs.push((KEY_SORT, self.sort.as_str().to_string()));
        }
        let numbers = [
            (KEY_MIN_PRICE, self.min_price),
            (KEY_MAX_PRICE, self.max_price),
            (KEY_RATING, self.min_rating),
        ];
        for (key, value) in numbers {
            if let Some(v) = value {
                pairs.push((key, format_number(v)));
            }
        }
        if self.discount_only {
            pairs.push((KEY_DISCOUNT, "true".to_string()));
        }
        if self.page > 1 {
            pairs.push((KEY_PAGE, self.page.to_string()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_pairs())
            .finish()
    }

    /// Number of filter dimensions set away from their default. The text query
    /// and sort key are not filters; min and max price count as one dimension.
    pub fn active_filter_count(&self) -> usize {
        [
            self.service.is_some(),
            self.location.is_some(),
            self.date.is_some(),
            self.time.is_some(),
            self.min_price.is_some() || self.max_price.is_some(),
            self.min_rating.is_some(),
            self.discount_only,
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// Apply a change set: `Some(value)` sets a key, `None` or an empty value
    /// unsets it. Changing anything other than `page` sends the user back to
    /// page 1.
    pub fn update<I, K, V>(&self, changes: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map: BTreeMap<String, String> = self
            .to_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let mut reset_page = false;
        for (key, value) in changes {
            let key = key.as_ref();
            if key != KEY_PAGE {
                reset_page = true;
            }
            match value.as_ref().map(AsRef::<str>::as_ref) {
                Some(v) if !v.is_empty() => {
                    map.insert(key.to_string(), v.to_string());
                }
                _ => {
                    map.remove(key);
                }
            }
        }
        if reset_page {
            map.remove(KEY_PAGE);
        }
        Self::from_pairs(map)
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Drop every filter dimension; the text query and sort survive.
    pub fn clear_filters(&self) -> Self {
        Self {
            query: self.query.clone(),
            sort: self.sort,
            ..Self::default()
        }
    }
}

/// Draft state of the price slider before the user commits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRangeDraft {
    pub min: u32,
    pub max: u32,
}

impl Default for PriceRangeDraft {
    fn default() -> Self {
        Self {
            min: PRICE_SLIDER_MIN,
            max: PRICE_SLIDER_MAX,
        }
    }
}

impl PriceRangeDraft {
    pub fn from_params(params: &QueryParameters) -> Self {
        let clamp = |v: f64| (v.max(0.0) as u32).clamp(PRICE_SLIDER_MIN, PRICE_SLIDER_MAX);
        Self {
            min: params.min_price.map(clamp).unwrap_or(PRICE_SLIDER_MIN),
            max: params.max_price.map(clamp).unwrap_or(PRICE_SLIDER_MAX),
        }
    }

    /// Move both handles, snapping to the slider step and keeping min <= max.
    pub fn set(&mut self, min: u32, max: u32) {
        let snap = |v: u32| {
            let v = v.clamp(PRICE_SLIDER_MIN, PRICE_SLIDER_MAX);
            PRICE_SLIDER_MIN + (v - PRICE_SLIDER_MIN) / PRICE_SLIDER_STEP * PRICE_SLIDER_STEP
        };
        let (a, b) = (snap(min), snap(max));
        self.min = a.min(b);
        self.max = a.max(b);
    }

    pub fn commit(&self) -> [(&'static str, Option<String>); 2] {
        [
            (KEY_MIN_PRICE, Some(self.min.to_string())),
            (KEY_MAX_PRICE, Some(self.max.to_string())),
        ]
    }
}
