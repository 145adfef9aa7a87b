//! Booking session: the state behind the seat map, the booking list and the
//! search results, plus the actions that change it.
//!
//! Every action follows the same shape: validate, call the store, and on
//! success apply the response and its postconditions. A failure leaves the
//! state as it was, is logged, and becomes an error notification.

pub mod notifications;
pub mod ordering;
pub mod projector;
pub mod repository;
pub mod search;
pub mod selection;

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::config::SessionConfig;
use crate::error::{BookingError, StoreError};
use crate::models::{Booking, BookingDraft, BookingPatch, SeatMap};
use crate::store_client::BookingStore;

pub use notifications::{NotificationChannel, Notice, Notifications};
pub use ordering::Tickets;
pub use projector::SeatLayout;
pub use repository::BookingRepository;
pub use search::{SearchQuery, SearchView};
pub use selection::Selection;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct LayoutSlot {
    layout: Option<SeatLayout>,
    tickets: Tickets,
}

/// Read-only view of the whole session, taken at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub bookings: Vec<Booking>,
    pub seat_map: Option<SeatMap>,
    pub selection: Selection,
    pub search_results: Vec<Booking>,
    pub notifications: Notifications,
    pub seat_revision: u64,
}

pub struct BookingSession {
    store: Arc<dyn BookingStore>,
    repository: BookingRepository,
    layout: Mutex<LayoutSlot>,
    selection: Mutex<Selection>,
    search: Mutex<SearchView>,
    notifications: Mutex<NotificationChannel>,
    seat_revision: AtomicU64,
}

impl BookingSession {
    pub fn new(store: Arc<dyn BookingStore>, config: &SessionConfig) -> Self {
        Self {
            repository: BookingRepository::new(store.clone(), config.mutation_policy),
            store,
            layout: Mutex::new(LayoutSlot::default()),
            selection: Mutex::new(Selection::Empty),
            search: Mutex::new(SearchView::default()),
            notifications: Mutex::new(NotificationChannel::new(config.success_notice_ttl())),
            seat_revision: AtomicU64::new(0),
        }
    }

    // === Snapshots ===

    pub fn bookings(&self) -> Vec<Booking> {
        self.repository.snapshot()
    }

    pub fn booking(&self, id: i64) -> Option<Booking> {
        self.repository.get(id)
    }

    /// Seat map derived from the loaded layout and the current bookings.
    pub fn seat_map(&self) -> Option<SeatMap> {
        let slot = locked(&self.layout);
        let layout = slot.layout.as_ref()?;
        Some(self.repository.with_bookings(|b| projector::project(layout, b)))
    }

    /// `Some(is_booked)` for a seat on the map, `None` otherwise.
    pub fn seat_state(&self, seat_code: &str) -> Option<bool> {
        let slot = locked(&self.layout);
        let layout = slot.layout.as_ref()?;
        self.repository
            .with_bookings(|b| projector::seat_state(layout, b, seat_code))
    }

    /// Locally projected free seats.
    pub fn available_seats(&self) -> Vec<String> {
        let slot = locked(&self.layout);
        match slot.layout.as_ref() {
            Some(layout) => self
                .repository
                .with_bookings(|b| projector::available_seats(layout, b)),
            None => Vec::new(),
        }
    }

    pub fn selection(&self) -> Selection {
        locked(&self.selection).clone()
    }

    pub fn search_results(&self) -> Vec<Booking> {
        locked(&self.search).results().to_vec()
    }

    pub fn search_query(&self) -> Option<SearchQuery> {
        locked(&self.search).query().cloned()
    }

    pub fn notifications(&self) -> Notifications {
        locked(&self.notifications).current()
    }

    /// Bumped whenever seat occupancy may have changed; renames never bump it.
    pub fn seat_revision(&self) -> u64 {
        self.seat_revision.load(Ordering::SeqCst)
    }

    pub fn is_pending(&self, id: i64) -> bool {
        self.repository.is_pending(id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            bookings: self.bookings(),
            seat_map: self.seat_map(),
            selection: self.selection(),
            search_results: self.search_results(),
            notifications: self.notifications(),
            seat_revision: self.seat_revision(),
        }
    }

    // === Notifications ===

    pub fn dismiss_error(&self) {
        locked(&self.notifications).dismiss_error();
    }

    pub fn dismiss_success(&self) {
        locked(&self.notifications).dismiss_success();
    }

    pub fn dismiss_all(&self) {
        locked(&self.notifications).dismiss_all();
    }

    fn notify_success(&self, message: &str) {
        locked(&self.notifications).success(message);
    }

    /// Logs a failed action and turns it into an error notification.
    fn report<T>(&self, action: &str, result: Result<T, BookingError>) -> Result<T, BookingError> {
        if let Err(err) = &result {
            match err {
                BookingError::Validation(_) | BookingError::ConcurrentMutation(_) => {
                    warn!("{} refused: {}", action, err)
                }
                _ => error!("{} failed: {:?}", action, err),
            }
            locked(&self.notifications).error(err.user_message());
        }
        result
    }

    // === Seat map & selection ===

    fn seats_changed(&self) {
        self.seat_revision.fetch_add(1, Ordering::SeqCst);
        self.reconcile_selection();
    }

    fn reconcile_selection(&self) {
        let seat = match self.selection().seat() {
            Some(seat) => seat.to_string(),
            None => return,
        };
        let state = self.seat_state(&seat);
        if locked(&self.selection).reconcile(|_| state) {
            info!("Selected seat {} is no longer available, selection cleared", seat);
        }
    }

    /// Fetches the seat geometry. The latest-issued load wins; a failed load
    /// keeps the previous layout.
    pub async fn load_seat_map(&self) -> Result<SeatMap, BookingError> {
        let ticket = locked(&self.layout).tickets.issue();
        let result = async {
            let map = self
                .store
                .get_seat_map()
                .await
                .map_err(BookingError::SeatMapLoad)?;
            SeatLayout::from_seat_map(map)
                .map_err(|reason| BookingError::SeatMapLoad(StoreError::Malformed(reason)))
        }
        .await;
        let layout = self.report("Loading seat map", result)?;

        {
            let mut slot = locked(&self.layout);
            if slot.tickets.accept(ticket) {
                info!(
                    "Seat map loaded: {} rows x {} columns",
                    layout.rows(),
                    layout.columns()
                );
                slot.layout = Some(layout);
            } else {
                debug!("Discarding seat map load {} superseded by a later one", ticket);
            }
        }
        self.seats_changed();
        self.seat_map()
            .ok_or_else(|| BookingError::SeatMapLoad(StoreError::Malformed("no seat layout".into())))
    }

    /// Remote list of free seats; does not touch any session state.
    pub async fn fetch_available_seats(&self) -> Result<Vec<String>, BookingError> {
        let result = self
            .store
            .get_available_seats()
            .await
            .map(|seats| seats.available_seats)
            .map_err(BookingError::SeatMapLoad);
        self.report("Fetching available seats", result)
    }

    /// Seat-map click. Booked or unknown seats leave the selection unchanged.
    pub fn click_seat(&self, seat_code: &str) -> bool {
        let state = self.seat_state(seat_code);
        let changed = locked(&self.selection).click(seat_code, state);
        if !changed {
            debug!("Ignoring click on seat {} ({:?})", seat_code, state);
        }
        changed
    }

    pub fn clear_selection(&self) -> bool {
        locked(&self.selection).clear()
    }

    // === Bookings ===

    /// Initial load: bookings and seat map side by side.
    pub async fn refresh(&self) -> Result<(), BookingError> {
        let (bookings, seats) = futures::join!(self.load_all(), self.load_seat_map());
        bookings?;
        seats?;
        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<Booking>, BookingError> {
        let result = self.repository.load_all().await;
        let bookings = self.report("Loading bookings", result)?;
        self.seats_changed();
        Ok(bookings)
    }

    /// Books `draft` as given. On success the seat map is recomputed and the
    /// selection is cleared, whatever seat it points at by then.
    pub async fn create(&self, draft: BookingDraft) -> Result<Booking, BookingError> {
        let result = self.repository.create(&draft).await;
        let booking = self.report("Creating booking", result)?;

        locked(&self.selection).clear();
        self.seats_changed();
        self.notify_success("Booking created successfully!");
        Ok(booking)
    }

    /// Booking form submission. With a seat selected the free-text field is
    /// ignored. Selections on seats that got booked are already gone: every
    /// booking-set change reconciles the selection.
    pub async fn submit_booking(&self, name: &str, seat_text: &str) -> Result<Booking, BookingError> {
        let seat = self.selection().effective_seat(seat_text).unwrap_or_default();
        self.create(BookingDraft::new(name, &seat)).await
    }

    /// Renames a booking. Seat status is unaffected, so the seat map is not touched.
    pub async fn update(&self, id: i64, name: &str) -> Result<Booking, BookingError> {
        let result = self.repository.update(id, &BookingPatch::new(name)).await;
        let booking = self.report("Updating booking", result)?;
        self.notify_success("Booking updated successfully!");
        Ok(booking)
    }

    pub async fn delete(&self, id: i64) -> Result<(), BookingError> {
        let result = self.repository.delete(id).await;
        let removed = self.report("Deleting booking", result)?;
        if let Some(booking) = removed {
            debug!("Seat {} freed", booking.seat);
        }
        self.seats_changed();
        self.notify_success("Booking deleted successfully!");
        Ok(())
    }

    /// Deletes every booking; search results and the selection go with them.
    pub async fn delete_all(&self) -> Result<(), BookingError> {
        let result = self.repository.delete_all().await;
        self.report("Deleting all bookings", result)?;

        locked(&self.search).clear();
        locked(&self.selection).clear();
        self.seats_changed();
        self.notify_success("All bookings deleted successfully!");
        Ok(())
    }

    pub async fn refresh_booking(&self, id: i64) -> Result<Option<Booking>, BookingError> {
        let result = self.repository.refresh_booking(id).await;
        let booking = self.report("Refreshing booking", result)?;
        self.seats_changed();
        Ok(booking)
    }

    // === Search ===

    /// Blank queries clear the results without calling the store.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Booking>, BookingError> {
        match SearchQuery::by_name(query) {
            Some(query) => self.search(query).await,
            None => {
                self.clear_search();
                Ok(Vec::new())
            }
        }
    }

    pub async fn search_by_range(&self, start_id: &str, end_id: &str) -> Result<Vec<Booking>, BookingError> {
        let query = self.report("Searching bookings", SearchQuery::by_range(start_id, end_id))?;
        self.search(query).await
    }

    pub async fn search(&self, query: SearchQuery) -> Result<Vec<Booking>, BookingError> {
        let ticket = locked(&self.search).begin();
        let result = query
            .run(self.store.as_ref())
            .await
            .map_err(BookingError::Search);
        let results = self.report("Searching bookings", result)?;

        if !locked(&self.search).complete(ticket, query, results.clone()) {
            debug!("Discarding search {} superseded or cleared", ticket);
        }
        Ok(results)
    }

    pub fn clear_search(&self) {
        locked(&self.search).clear();
    }
}
