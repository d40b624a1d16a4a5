//! Filtering, ordering and pagination over an in-memory salon catalog.

use crate::model::SalonRecord;
use crate::params::{QueryParameters, SortKey};
use crate::text::contains_folded;
use serde::Serialize;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<'a> {
    pub page: Vec<&'a SalonRecord>,
    /// Matches before pagination.
    pub total_matched: usize,
}

impl QueryResult<'_> {
    pub fn total_pages(&self, page_size: usize) -> usize {
        self.total_matched.div_ceil(page_size.max(1))
    }
}

struct Filter<'p> {
    text: Option<&'p str>,
    service: Option<&'p str>,
    location: Option<&'p str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    min_rating: Option<f64>,
    discount_only: bool,
}

impl<'p> Filter<'p> {
    fn new(params: &'p QueryParameters) -> Self {
        Self {
            text: params.query.as_deref(),
            service: params.service.as_deref(),
            location: params.location.as_deref(),
            min_price: params.min_price,
            max_price: params.max_price,
            min_rating: params.min_rating,
            discount_only: params.discount_only,
        }
    }

    fn matches(&self, salon: &SalonRecord) -> bool {
        if let Some(text) = self.text {
            if !contains_folded(&salon.name, text) && !contains_folded(&salon.description, text) {
                return false;
            }
        }
        if let Some(service) = self.service {
            if !salon.offers(service) {
                return false;
            }
        }
        if let Some(location) = self.location {
            if !contains_folded(&salon.address, location) {
                return false;
            }
        }
        // A salon without services has no price and fails any price bound.
        if let Some(bound) = self.min_price {
            match salon.min_price() {
                Some(p) if p as f64 >= bound => {}
                _ => return false,
            }
        }
        if let Some(bound) = self.max_price {
            match salon.max_price() {
                Some(p) if p as f64 <= bound => {}
                _ => return false,
            }
        }
        if let Some(bound) = self.min_rating {
            if salon.rating < bound {
                return false;
            }
        }
        if self.discount_only && salon.discount == 0 {
            return false;
        }
        true
    }
}

/// Order two optional keys, `None` last regardless of direction.
fn cmp_defined_first<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare(sort: SortKey, a: &SalonRecord, b: &SalonRecord) -> Ordering {
    match sort {
        SortKey::Relevance => cmp_defined_first(a.numeric_id(), b.numeric_id(), false),
        SortKey::Rating => b.rating.total_cmp(&a.rating),
        SortKey::PriceAsc => cmp_defined_first(a.min_price(), b.min_price(), false),
        SortKey::PriceDesc => cmp_defined_first(a.max_price(), b.max_price(), true),
        SortKey::Discount => b.discount.cmp(&a.discount),
    }
}

/// Every record that passes the filters, in sorted order.
pub fn filter_sorted<'a>(catalog: &'a [SalonRecord], params: &QueryParameters) -> Vec<&'a SalonRecord> {
    let filter = Filter::new(params);
    let mut matched: Vec<&SalonRecord> = catalog.iter().filter(|s| filter.matches(s)).collect();
    // sort_by is stable: equal keys keep catalog order
    matched.sort_by(|a, b| compare(params.sort, a, b));
    matched
}

/// Run a catalog query. Pure: the same inputs always give the same page.
pub fn query<'a>(catalog: &'a [SalonRecord], params: &QueryParameters, page_size: usize) -> QueryResult<'a> {
    let page_size = page_size.max(1);
    let matched = filter_sorted(catalog, params);
    let total_matched = matched.len();
    let start = params.page.max(1).saturating_sub(1).saturating_mul(page_size);
    let page: Vec<&SalonRecord> = matched.into_iter().skip(start).take(page_size).collect();
    tracing::debug!(total_matched, returned = page.len(), page = params.page, sort = %params.sort, "catalog query");
    QueryResult { page, total_matched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ServiceOffering, ServiceType};

    fn salon(id: &str, prices: &[u32], discount: u32, rating: f64) -> SalonRecord {
        SalonRecord {
            id: id.to_string(),
            name: format!("Салон {id}"),
            description: "Массаж и спа".into(),
            address: "ул. Примерная".into(),
            phone: String::new(),
            working_hours: "10:00 - 22:00".into(),
            rating,
            review_count: 0,
            discount,
            image: String::new(),
            services: prices
                .iter()
                .enumerate()
                .map(|(i, p)| ServiceOffering {
                    id: i as u32 + 1,
                    name: format!("service {i}"),
                    service_type: ServiceType::Classic,
                    duration: 60,
                    price: p + 500,
                    discount_price: *p,
                })
                .collect(),
            specialists: vec![],
            reviews: vec![],
        }
    }

    fn ids(result: &QueryResult<'_>) -> Vec<String> {
        result.page.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn min_price_bound() {
        let catalog = vec![salon("1", &[1750], 0, 4.0), salon("2", &[2450], 0, 4.0), salon("3", &[3000], 0, 4.0)];
        let params = QueryParameters::from_pairs([("minPrice", "2000")]);
        let result = query(&catalog, &params, DEFAULT_PAGE_SIZE);
        assert_eq!(ids(&result), vec!["2", "3"]);
        assert_eq!(result.total_matched, 2);
    }

    #[test]
    fn sort_by_discount_descending() {
        let catalog = vec![salon("1", &[1000], 30, 4.0), salon("2", &[1000], 50, 4.0), salon("3", &[1000], 10, 4.0)];
        let params = QueryParameters::from_pairs([("sort", "discount")]);
        let result = query(&catalog, &params, DEFAULT_PAGE_SIZE);
        let discounts: Vec<u32> = result.page.iter().map(|s| s.discount).collect();
        assert_eq!(discounts, vec![50, 30, 10]);
    }

    #[test]
    fn discount_only_drops_zero_discount() {
        let catalog = vec![salon("1", &[1000], 0, 4.0), salon("2", &[1000], 15, 4.0)];
        let params = QueryParameters::from_pairs([("discount", "true")]);
        assert_eq!(ids(&query(&catalog, &params, 9)), vec!["2"]);
    }

    #[test]
    fn relevance_orders_by_numeric_id() {
        let catalog = vec![salon("10", &[1000], 0, 4.0), salon("2", &[1000], 0, 4.0), salon("x", &[1000], 0, 4.0), salon("1", &[1000], 0, 4.0)];
        let result = query(&catalog, &QueryParameters::default(), 9);
        assert_eq!(ids(&result), vec!["1", "2", "10", "x"]);
    }

    #[test]
    fn salons_without_services_sort_last_and_fail_price_bounds() {
        let catalog = vec![salon("1", &[], 0, 4.0), salon("2", &[1200, 800], 0, 4.0), salon("3", &[2000], 0, 4.0)];

        let asc = query(&catalog, &QueryParameters::from_pairs([("sort", "price_asc")]), 9);
        assert_eq!(ids(&asc), vec!["2", "3", "1"]);
        let desc = query(&catalog, &QueryParameters::from_pairs([("sort", "price_desc")]), 9);
        assert_eq!(ids(&desc), vec!["3", "2", "1"]);

        let bounded = query(&catalog, &QueryParameters::from_pairs([("maxPrice", "5000")]), 9);
        assert_eq!(ids(&bounded), vec!["2", "3"]);
    }

    #[test]
    fn price_desc_uses_max_price() {
        let catalog = vec![salon("1", &[500, 4000], 0, 4.0), salon("2", &[3000], 0, 4.0)];
        let result = query(&catalog, &QueryParameters::from_pairs([("sort", "price_desc")]), 9);
        assert_eq!(ids(&result), vec!["1", "2"]);
    }

    #[test]
    fn rating_is_inclusive_and_sort_is_stable() {
        let catalog = vec![
            salon("1", &[1000], 0, 4.5),
            salon("2", &[1000], 0, 4.9),
            salon("3", &[1000], 0, 4.5),
            salon("4", &[1000], 0, 3.9),
        ];
        let params = QueryParameters::from_pairs([("rating", "4.5"), ("sort", "rating")]);
        assert_eq!(ids(&query(&catalog, &params, 9)), vec!["2", "1", "3"]);
    }

    #[test]
    fn page_beyond_last_is_empty() {
        let catalog: Vec<SalonRecord> = (1..=5).map(|i| salon(&i.to_string(), &[1000], 0, 4.0)).collect();
        let params = QueryParameters::default().with_page(3);
        let result = query(&catalog, &params, 2);
        assert_eq!(ids(&result), vec!["5"]);
        let past = query(&catalog, &params.with_page(4), 2);
        assert!(past.page.is_empty());
        assert_eq!(past.total_matched, 5);
        assert_eq!(past.total_pages(2), 3);
    }
}
