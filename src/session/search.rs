//! Search view: an ad hoc projection of the booking store, kept apart from
//! the repository. Each completed search replaces the result set wholesale.

use crate::error::{BookingError, StoreError};
use crate::models::Booking;
use crate::session::ordering::Tickets;
use crate::store_client::BookingStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    Name(String),
    Range { start_id: i64, end_id: i64 },
}

impl SearchQuery {
    /// Blank input means "no search".
    pub fn by_name(raw: &str) -> Option<Self> {
        let name = raw.trim();
        (!name.is_empty()).then(|| SearchQuery::Name(name.to_string()))
    }

    /// Both bounds must parse as integers. Their order is not checked: an
    /// inverted range is a legal query that may simply match nothing.
    pub fn by_range(start: &str, end: &str) -> Result<Self, BookingError> {
        match (start.trim().parse::<i64>(), end.trim().parse::<i64>()) {
            (Ok(start_id), Ok(end_id)) => Ok(SearchQuery::Range { start_id, end_id }),
            _ => Err(BookingError::validation("Please enter valid ID numbers")),
        }
    }

    pub(crate) async fn run(&self, store: &dyn BookingStore) -> Result<Vec<Booking>, StoreError> {
        match self {
            SearchQuery::Name(name) => store.search_by_name(name).await,
            SearchQuery::Range { start_id, end_id } => {
                store.search_by_range(*start_id, *end_id).await
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchView {
    results: Vec<Booking>,
    query: Option<SearchQuery>,
    tickets: Tickets,
}

impl SearchView {
    pub fn begin(&mut self) -> u64 {
        self.tickets.issue()
    }

    /// Applies the results of search `ticket` unless a later search already
    /// landed or the view was cleared since it started.
    pub fn complete(&mut self, ticket: u64, query: SearchQuery, results: Vec<Booking>) -> bool {
        if !self.tickets.accept(ticket) {
            return false;
        }
        self.results = results;
        self.query = Some(query);
        true
    }

    /// Client-side reset; searches still in flight will be discarded.
    pub fn clear(&mut self) {
        self.results.clear();
        self.query = None;
        self.tickets.invalidate();
    }

    pub fn results(&self) -> &[Booking] {
        &self.results
    }

    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }
}
