//! Search state that tolerates overlapping queries.
//!
//! Each [`SearchSession::begin`] hands out a ticket. Only the result of the most
//! recently begun query may become visible; a completion that arrives for an
//! older ticket is dropped, whatever order the completions come back in.

use crate::model::SalonRecord;
use crate::params::QueryParameters;
use crate::query::{query, DEFAULT_PAGE_SIZE};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Owned copy of a result page, ready to display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    pub params: QueryParameters,
    pub results: Vec<SalonRecord>,
    pub total_matched: usize,
}

#[derive(Debug, Default)]
struct Inner {
    params: QueryParameters,
    latest: u64,
    loading: bool,
    view: SearchView,
}

#[derive(Debug)]
pub struct SearchSession {
    page_size: usize,
    inner: Mutex<Inner>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl SearchSession {
    pub fn new(page_size: usize) -> Self {
        Self { page_size: page_size.max(1), inner: Mutex::new(Inner::default()) }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Current parameters, including page resets from [`Self::update`].
    pub fn params(&self) -> QueryParameters {
        self.inner.lock().params.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    pub fn view(&self) -> SearchView {
        self.inner.lock().view.clone()
    }

    /// Register a new query for `params`; any query still in flight is superseded.
    pub fn begin(&self, params: QueryParameters) -> Ticket {
        Self::begin_locked(&mut self.inner.lock(), params)
    }

    fn begin_locked(inner: &mut Inner, params: QueryParameters) -> Ticket {
        inner.latest += 1;
        inner.loading = true;
        inner.params = params;
        Ticket(inner.latest)
    }

    /// Apply a change set to the current parameters and begin a query for them.
    /// The read and the begin happen under one lock.
    pub fn update<I, K, V>(&self, changes: I) -> (Ticket, QueryParameters)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut inner = self.inner.lock();
        let next = inner.params.update(changes);
        (Self::begin_locked(&mut inner, next.clone()), next)
    }

    /// Publish a finished query. Returns `false` and leaves the visible state
    /// alone when `ticket` has been superseded.
    pub fn complete(&self, ticket: Ticket, view: SearchView) -> bool {
        let mut inner = self.inner.lock();
        if ticket.0 != inner.latest {
            tracing::debug!(stale = ticket.0, latest = inner.latest, "discarding superseded search result");
            return false;
        }
        inner.loading = false;
        inner.view = view;
        true
    }

    /// Run `params` against `catalog` and return an owned view; the caller
    /// passes it to [`Self::complete`] with the ticket from [`Self::begin`].
    pub fn execute(&self, catalog: &[SalonRecord], params: &QueryParameters) -> SearchView {
        let result = query(catalog, params, self.page_size);
        SearchView {
            params: params.clone(),
            results: result.page.into_iter().cloned().collect(),
            total_matched: result.total_matched,
        }
    }

    /// Begin, execute and complete in one step.
    pub fn search(&self, catalog: &[SalonRecord], params: QueryParameters) -> SearchView {
        let ticket = self.begin(params.clone());
        let view = self.execute(catalog, &params);
        self.complete(ticket, view.clone());
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock_catalog;
    use std::sync::Arc;

    #[test]
    fn stale_completion_is_discarded() {
        let catalog = mock_catalog().records();
        let session = SearchSession::default();

        let thai = QueryParameters::from_pairs([("service", "thai")]);
        let first = session.begin(thai.clone());
        let face = QueryParameters::from_pairs([("service", "face")]);
        let second = session.begin(face.clone());

        let second_view = session.execute(catalog, &face);
        assert!(session.complete(second, second_view.clone()));
        assert!(!session.is_loading());

        // the older query finishes last and must not overwrite
        let first_view = session.execute(catalog, &thai);
        assert!(!session.complete(first, first_view));
        assert_eq!(session.view(), second_view);
    }

    #[test]
    fn loading_until_latest_completes() {
        let catalog = mock_catalog().records();
        let session = SearchSession::default();
        let a = session.begin(QueryParameters::default());
        let b = session.begin(QueryParameters::default());
        assert!(!session.complete(a, session.execute(catalog, &QueryParameters::default())));
        assert!(session.is_loading());
        assert!(session.complete(b, session.execute(catalog, &QueryParameters::default())));
        assert!(!session.is_loading());
    }

    #[test]
    fn update_resets_page() {
        let session = SearchSession::default();
        session.begin(QueryParameters::default().with_page(2));
        let (_, params) = session.update([("rating", Some("4.5"))]);
        assert_eq!(params.page, 1);
        assert_eq!(session.params().min_rating, Some(4.5));
    }

    #[test]
    fn concurrent_updates_all_land() {
        let session = SearchSession::default();
        let keys = ["service", "location", "rating", "minPrice", "maxPrice", "time", "date", "query"];
        let values = ["thai", "Москва", "4", "1000", "3000", "12:00", "2025-05-01", "спа"];
        std::thread::scope(|scope| {
            for (key, value) in keys.iter().zip(values) {
                let session = &session;
                scope.spawn(move || {
                    session.update([(*key, Some(value))]);
                });
            }
        });
        let params = session.params();
        assert_eq!(params.service.as_deref(), Some("thai"));
        assert_eq!(params.location.as_deref(), Some("Москва"));
        assert_eq!(params.min_rating, Some(4.0));
        assert_eq!(params.min_price, Some(1000.0));
        assert_eq!(params.max_price, Some(3000.0));
        assert_eq!(params.query.as_deref(), Some("спа"));
        assert_eq!(params.active_filter_count(), 6);
    }

    #[test]
    fn last_begun_wins_across_threads() {
        let session = Arc::new(SearchSession::new(3));
        let catalog = mock_catalog().records();
        let tickets: Vec<(Ticket, QueryParameters)> = (1..=4)
            .map(|page| {
                let p = QueryParameters::default().with_page(page);
                (session.begin(p.clone()), p)
            })
            .collect();

        std::thread::scope(|scope| {
            for (ticket, params) in tickets.iter().rev() {
                let session = Arc::clone(&session);
                scope.spawn(move || {
                    let view = session.execute(catalog, params);
                    session.complete(*ticket, view);
                });
            }
        });

        assert_eq!(session.view().params.page, 4);
        assert!(!session.is_loading());
    }
}
