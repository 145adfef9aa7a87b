//! Booking repository: the client-held copy of the booking collection.
//!
//! The collection only changes after the store confirms a call. Ordering:
//! - `load_all` / `delete_all` hold the collection gate exclusively;
//! - single-booking changes hold it shared, then the lock of their booking id.
//!
//! Both locks are FIFO, so responses for the same booking (or for the whole
//! collection) are applied in the order the calls were issued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::{debug, info};
use validator::Validate;

use crate::config::MutationPolicy;
use crate::error::BookingError;
use crate::models::{Booking, BookingDraft, BookingPatch};
use crate::session::ordering::{KeyGuard, KeyedLocks};
use crate::store_client::BookingStore;

pub struct BookingRepository {
    store: Arc<dyn BookingStore>,
    bookings: Mutex<Vec<Booking>>,
    collection_gate: RwLock<()>,
    in_flight: KeyedLocks,
    policy: MutationPolicy,
}

impl BookingRepository {
    pub fn new(store: Arc<dyn BookingStore>, policy: MutationPolicy) -> Self {
        Self {
            store,
            bookings: Mutex::new(Vec::new()),
            collection_gate: RwLock::new(()),
            in_flight: KeyedLocks::new(),
            policy,
        }
    }

    fn held(&self) -> MutexGuard<'_, Vec<Booking>> {
        self.bookings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Vec<Booking> {
        self.held().clone()
    }

    pub fn with_bookings<R>(&self, f: impl FnOnce(&[Booking]) -> R) -> R {
        f(&self.held())
    }

    pub fn get(&self, id: i64) -> Option<Booking> {
        self.held().iter().find(|b| b.id == id).cloned()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.held().iter().any(|b| b.id == id)
    }

    /// Whether a change for `id` is currently in flight.
    pub fn is_pending(&self, id: i64) -> bool {
        self.in_flight.is_locked(id)
    }

    async fn claim(&self, id: i64) -> Result<KeyGuard<'_>, BookingError> {
        match self.policy {
            MutationPolicy::Queue => Ok(self.in_flight.lock(id).await),
            MutationPolicy::Reject => self
                .in_flight
                .try_lock(id)
                .ok_or(BookingError::ConcurrentMutation(id)),
        }
    }

    fn require(&self, id: i64) -> Result<(), BookingError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(BookingError::validation(format!("Booking {} not found", id)))
        }
    }

    /// Replaces the whole collection. On failure the previous collection stays.
    pub async fn load_all(&self) -> Result<Vec<Booking>, BookingError> {
        let _gate = self.collection_gate.write().await;
        let bookings = self
            .store
            .list_bookings()
            .await
            .map_err(BookingError::Load)?;

        *self.held() = bookings.clone();
        info!("Loaded {} bookings", bookings.len());
        Ok(bookings)
    }

    pub async fn create(&self, draft: &BookingDraft) -> Result<Booking, BookingError> {
        draft.validate()?;

        let _gate = self.collection_gate.read().await;
        let booking = self
            .store
            .create_booking(draft)
            .await
            .map_err(BookingError::Create)?;

        let mut held = self.held();
        match held.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking.clone(),
            None => held.push(booking.clone()),
        }
        info!("Created booking {} for seat {}", booking.id, booking.seat);
        Ok(booking)
    }

    /// Renames booking `id`. Seat is immutable once booked.
    pub async fn update(&self, id: i64, patch: &BookingPatch) -> Result<Booking, BookingError> {
        patch.validate()?;
        self.require(id)?;

        let _gate = self.collection_gate.read().await;
        let _claim = self.claim(id).await?;
        // an earlier change for this id may have removed it while we waited
        self.require(id)?;

        let updated = self
            .store
            .update_booking(id, patch)
            .await
            .map_err(|source| BookingError::Update { id, source })?;

        let mut held = self.held();
        if let Some(existing) = held.iter_mut().find(|b| b.id == id) {
            *existing = updated.clone();
        }
        info!("Updated booking {}", id);
        Ok(updated)
    }

    /// Returns the removed entry, if the collection held it.
    pub async fn delete(&self, id: i64) -> Result<Option<Booking>, BookingError> {
        let _gate = self.collection_gate.read().await;
        let _claim = self.claim(id).await?;

        self.store
            .delete_booking(id)
            .await
            .map_err(|source| BookingError::Delete { id, source })?;

        let mut held = self.held();
        let removed = held
            .iter()
            .position(|b| b.id == id)
            .map(|index| held.remove(index));
        info!("Deleted booking {}", id);
        Ok(removed)
    }

    pub async fn delete_all(&self) -> Result<(), BookingError> {
        let _gate = self.collection_gate.write().await;
        self.store
            .delete_all_bookings()
            .await
            .map_err(BookingError::DeleteAll)?;

        let mut held = self.held();
        info!("Deleted all bookings ({} held locally)", held.len());
        held.clear();
        Ok(())
    }

    /// Re-reads one booking. A not-found answer removes it locally and yields `None`.
    pub async fn refresh_booking(&self, id: i64) -> Result<Option<Booking>, BookingError> {
        let _gate = self.collection_gate.read().await;
        let _claim = self.claim(id).await?;

        match self.store.get_booking(id).await {
            Ok(booking) => {
                let mut held = self.held();
                match held.iter_mut().find(|b| b.id == id) {
                    Some(existing) => *existing = booking.clone(),
                    None => held.push(booking.clone()),
                }
                Ok(Some(booking))
            }
            Err(e) if e.is_not_found() => {
                debug!("Booking {} no longer exists, dropping it", id);
                self.held().retain(|b| b.id != id);
                Ok(None)
            }
            Err(e) => Err(BookingError::Load(e)),
        }
    }
}
