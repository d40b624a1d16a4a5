use salon_core::catalog::mock_catalog;
use salon_core::query::filter_sorted;
use salon_core::text::contains_folded;
use salon_core::{query, QueryParameters, SalonRecord, DEFAULT_PAGE_SIZE};

fn parameter_sets() -> Vec<QueryParameters> {
    [
        "",
        "query=массаж",
        "query=ТАЙСКИЙ",
        "service=thai",
        "service=classic&sort=price_desc",
        "location=москва&sort=rating",
        "location=Санкт-Петербург&discount=true",
        "minPrice=1000&maxPrice=3000",
        "minPrice=1500&sort=price_asc",
        "maxPrice=2500&sort=discount",
        "rating=4.5&sort=rating",
        "discount=true&sort=discount",
        "query=спа&rating=4&discount=true",
        "sort=unknown&minPrice=abc",
        "service=hot-stone",
    ]
    .iter()
    .map(|qs| QueryParameters::from_query_string(qs))
    .collect()
}

fn satisfies(salon: &SalonRecord, p: &QueryParameters) -> bool {
    let text = p.query.as_deref().map_or(true, |q| contains_folded(&salon.name, q) || contains_folded(&salon.description, q));
    let service = p.service.as_deref().map_or(true, |t| salon.offers(t));
    let location = p.location.as_deref().map_or(true, |l| contains_folded(&salon.address, l));
    let min = p.min_price.map_or(true, |b| salon.min_price().is_some_and(|m| m as f64 >= b));
    let max = p.max_price.map_or(true, |b| salon.max_price().is_some_and(|m| m as f64 <= b));
    let rating = p.min_rating.map_or(true, |r| salon.rating >= r);
    let discount = !p.discount_only || salon.discount > 0;
    text && service && location && min && max && rating && discount
}

fn ids(records: &[&SalonRecord]) -> Vec<String> {
    records.iter().map(|s| s.id.clone()).collect()
}

#[test]
fn every_result_satisfies_every_active_filter() {
    let catalog = mock_catalog().records();
    for params in parameter_sets() {
        let result = query(catalog, &params, 4);
        for salon in &result.page {
            assert!(satisfies(salon, &params), "salon {} escaped {:?}", salon.id, params);
        }
    }
}

#[test]
fn total_matches_filter_count_on_every_page() {
    let catalog = mock_catalog().records();
    for params in parameter_sets() {
        let expected = catalog.iter().filter(|s| satisfies(s, &params)).count();
        for page in 1..=5 {
            let result = query(catalog, &params.with_page(page), 3);
            assert_eq!(result.total_matched, expected, "{:?} page {}", params, page);
        }
    }
}

#[test]
fn pages_concatenate_to_the_full_sequence() {
    let catalog = mock_catalog().records();
    for params in parameter_sets() {
        let full = ids(&filter_sorted(catalog, &params));
        let first = query(catalog, &params, 2);
        let mut stitched = Vec::new();
        for page in 1..=first.total_pages(2) {
            stitched.extend(ids(&query(catalog, &params.with_page(page), 2).page));
        }
        assert_eq!(stitched, full, "{:?}", params);
    }
}

#[test]
fn equal_keys_keep_catalog_order() {
    let catalog = mock_catalog().records();
    // salons 3, 8 and 11 carry no discount
    let params = QueryParameters::from_query_string("sort=discount");
    let tail: Vec<String> = ids(&filter_sorted(catalog, &params)).into_iter().rev().take(3).collect();
    assert_eq!(tail, vec!["11", "8", "3"]);

    // 2 and 8 share a 4.9 rating
    let params = QueryParameters::from_query_string("sort=rating");
    let head = ids(&filter_sorted(catalog, &params))[..2].to_vec();
    assert_eq!(head, vec!["2", "8"]);
}

#[test]
fn identical_calls_return_identical_pages() {
    let catalog = mock_catalog().records();
    for params in parameter_sets() {
        assert_eq!(query(catalog, &params, DEFAULT_PAGE_SIZE), query(catalog, &params, DEFAULT_PAGE_SIZE));
    }
}

#[test]
fn page_past_the_end_is_empty_but_counted() {
    let catalog = mock_catalog().records();
    let params = QueryParameters::from_query_string("page=3");
    let result = query(catalog, &params, DEFAULT_PAGE_SIZE);
    assert!(result.page.is_empty());
    assert_eq!(result.total_matched, 12);
    assert_eq!(query(catalog, &params.with_page(2), DEFAULT_PAGE_SIZE).page.len(), 3);
}

#[test]
fn huge_or_fractional_pages_still_paginate() {
    let catalog = mock_catalog().records();
    let huge = QueryParameters::from_query_string("page=99999999999999999999");
    let result = query(catalog, &huge, DEFAULT_PAGE_SIZE);
    assert!(result.page.is_empty());
    assert_eq!(result.total_matched, 12);

    let second = query(catalog, &QueryParameters::from_query_string("page=2.0"), DEFAULT_PAGE_SIZE);
    assert_eq!(ids(&second.page), vec!["10", "11", "12"]);
}

#[test]
fn mock_catalog_scenarios() {
    let catalog = mock_catalog().records();
    let run = |qs: &str| ids(&query(catalog, &QueryParameters::from_query_string(qs), DEFAULT_PAGE_SIZE).page);

    assert_eq!(run("service=thai"), vec!["2", "7"]);
    assert_eq!(run("query=тайский"), vec!["2", "7"]);
    assert_eq!(run("location=москва"), vec!["1", "2", "3", "5", "8", "10", "12"]);
    assert_eq!(run("service=hot-stone"), Vec::<String>::new());
    assert_eq!(run("sort=discount")[..3], ["5", "12", "10"]);
}
