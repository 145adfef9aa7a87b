#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flight_booking_client::config::{MutationPolicy, SessionConfig};
use flight_booking_client::error::StoreError;
use flight_booking_client::models::{
    AvailableSeats, Booking, BookingDraft, BookingPatch, SeatMap, SeatStatus,
};
use flight_booking_client::session::BookingSession;
use flight_booking_client::store_client::BookingStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
    DeleteAll,
    SearchName,
    SearchRange,
    SeatMap,
    Available,
}

#[derive(Default)]
struct Inner {
    bookings: Vec<Booking>,
    next_id: i64,
    calls: HashMap<Op, usize>,
    delays: HashMap<Op, VecDeque<Duration>>,
    failures: HashMap<Op, VecDeque<(u16, Option<String>)>>,
}

/// In-memory booking backend: sequential ids, seat codes checked against the
/// layout, one booking per seat.
pub struct FakeStore {
    labels: Vec<String>,
    codes: Vec<Vec<String>>,
    inner: Mutex<Inner>,
}

impl FakeStore {
    pub fn with_codes(labels: &[&str], codes: Vec<Vec<String>>) -> Arc<Self> {
        Arc::new(Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            codes,
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        })
    }

    /// Codes like `01A`, `01B`, ...
    pub fn new(rows: usize, labels: &[&str]) -> Arc<Self> {
        let codes = (1..=rows)
            .map(|row| labels.iter().map(|l| format!("{:02}{}", row, l)).collect())
            .collect();
        Self::with_codes(labels, codes)
    }

    /// One row whose seat codes are the bare labels.
    pub fn single_row(labels: &[&str]) -> Arc<Self> {
        Self::with_codes(labels, vec![labels.iter().map(|l| l.to_string()).collect()])
    }

    /// 20 rows x A-D, as the real backend.
    pub fn standard() -> Arc<Self> {
        Self::new(20, &["A", "B", "C", "D"])
    }

    pub fn calls(&self, op: Op) -> usize {
        self.inner.lock().unwrap().calls.get(&op).copied().unwrap_or(0)
    }

    /// The next call of `op` sleeps for `delay` before answering.
    pub fn delay_next(&self, op: Op, delay: Duration) {
        self.inner
            .lock()
            .unwrap()
            .delays
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    /// The next call of `op` fails with `status` and an optional detail.
    pub fn fail_next(&self, op: Op, status: u16, detail: Option<&str>) {
        self.inner
            .lock()
            .unwrap()
            .failures
            .entry(op)
            .or_default()
            .push_back((status, detail.map(str::to_string)));
    }

    pub fn stored(&self) -> Vec<Booking> {
        self.inner.lock().unwrap().bookings.clone()
    }

    /// Books directly on the backend, bypassing any client.
    pub fn seed(&self, name: &str, seat: &str) -> Booking {
        let mut inner = self.inner.lock().unwrap();
        let booking = Booking {
            id: inner.next_id,
            name: name.to_string(),
            seat: seat.to_string(),
        };
        inner.next_id += 1;
        inner.bookings.push(booking.clone());
        booking
    }

    fn seat_codes(&self) -> Vec<String> {
        self.codes.iter().flatten().cloned().collect()
    }

    /// Records the call, then applies any injected delay or failure.
    async fn enter(&self, op: Op) -> Result<(), StoreError> {
        let (delay, failure) = {
            let mut inner = self.inner.lock().unwrap();
            *inner.calls.entry(op).or_default() += 1;
            let delay = inner.delays.get_mut(&op).and_then(VecDeque::pop_front);
            let failure = inner.failures.get_mut(&op).and_then(VecDeque::pop_front);
            (delay, failure)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some((status, reason)) => Err(StoreError::Rejected { status, reason }),
            None => Ok(()),
        }
    }
}

fn not_found() -> StoreError {
    StoreError::rejected(404, "Booking not found")
}

#[async_trait]
impl BookingStore for FakeStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        self.enter(Op::List).await?;
        Ok(self.stored())
    }

    async fn get_booking(&self, id: i64) -> Result<Booking, StoreError> {
        self.enter(Op::Get).await?;
        self.stored()
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(not_found)
    }

    async fn create_booking(&self, draft: &BookingDraft) -> Result<Booking, StoreError> {
        self.enter(Op::Create).await?;
        if !self.seat_codes().contains(&draft.seat) {
            return Err(StoreError::rejected(400, "Invalid seat code"));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.bookings.iter().any(|b| b.seat == draft.seat) {
            return Err(StoreError::rejected(400, "Seat is already booked"));
        }
        let booking = Booking {
            id: inner.next_id,
            name: draft.name.clone(),
            seat: draft.seat.clone(),
        };
        inner.next_id += 1;
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking(&self, id: i64, patch: &BookingPatch) -> Result<Booking, StoreError> {
        self.enter(Op::Update).await?;
        let mut inner = self.inner.lock().unwrap();
        let booking = inner
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(not_found)?;
        booking.name = patch.name.clone();
        Ok(booking.clone())
    }

    async fn delete_booking(&self, id: i64) -> Result<(), StoreError> {
        self.enter(Op::Delete).await?;
        let mut inner = self.inner.lock().unwrap();
        let before = inner.bookings.len();
        inner.bookings.retain(|b| b.id != id);
        if inner.bookings.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn delete_all_bookings(&self) -> Result<(), StoreError> {
        self.enter(Op::DeleteAll).await?;
        self.inner.lock().unwrap().bookings.clear();
        Ok(())
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<Booking>, StoreError> {
        self.enter(Op::SearchName).await?;
        let needle = query.to_lowercase();
        Ok(self
            .stored()
            .into_iter()
            .filter(|b| b.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn search_by_range(&self, start_id: i64, end_id: i64) -> Result<Vec<Booking>, StoreError> {
        self.enter(Op::SearchRange).await?;
        Ok(self
            .stored()
            .into_iter()
            .filter(|b| start_id <= b.id && b.id <= end_id)
            .collect())
    }

    async fn get_seat_map(&self) -> Result<SeatMap, StoreError> {
        self.enter(Op::SeatMap).await?;
        let booked: Vec<String> = self.stored().into_iter().map(|b| b.seat).collect();
        Ok(SeatMap {
            rows: self.codes.len(),
            columns: self.labels.len(),
            seat_labels: self.labels.clone(),
            seat_status: self
                .codes
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|code| SeatStatus {
                            seat_code: code.clone(),
                            is_booked: booked.contains(code),
                        })
                        .collect()
                })
                .collect(),
        })
    }

    async fn get_available_seats(&self) -> Result<AvailableSeats, StoreError> {
        self.enter(Op::Available).await?;
        let booked: Vec<String> = self.stored().into_iter().map(|b| b.seat).collect();
        Ok(AvailableSeats {
            available_seats: self
                .seat_codes()
                .into_iter()
                .filter(|code| !booked.contains(code))
                .collect(),
        })
    }
}

pub fn session_with(store: Arc<FakeStore>, policy: MutationPolicy) -> BookingSession {
    let config = SessionConfig {
        mutation_policy: policy,
        ..SessionConfig::default()
    };
    BookingSession::new(store, &config)
}

/// Session over `store` with the seat map and bookings already loaded.
pub async fn loaded_session(store: Arc<FakeStore>) -> BookingSession {
    let session = session_with(store, MutationPolicy::Queue);
    session.refresh().await.expect("initial load");
    session
}
