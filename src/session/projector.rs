//! Seat availability projection.
//!
//! The layout only carries geometry. Whether a seat is booked is always derived
//! from the bookings currently held by the repository, so the seat map can never
//! disagree with the booking list.

use std::collections::HashSet;

use crate::models::{Booking, SeatMap, SeatStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatLayout {
    rows: usize,
    columns: usize,
    seat_labels: Vec<String>,
    seat_codes: Vec<Vec<String>>,
}

impl SeatLayout {
    /// Row-major grid with codes like `01A`, `01B`, ... as the booking store numbers them.
    pub fn grid(rows: usize, labels: &[&str]) -> Self {
        let seat_codes = (1..=rows)
            .map(|row| {
                labels
                    .iter()
                    .map(|label| format!("{:02}{}", row, label))
                    .collect()
            })
            .collect();
        Self {
            rows,
            columns: labels.len(),
            seat_labels: labels.iter().map(|l| l.to_string()).collect(),
            seat_codes,
        }
    }

    /// Takes the geometry out of a fetched seat map, checking that it is well formed.
    pub fn from_seat_map(map: SeatMap) -> Result<Self, String> {
        if map.seat_labels.len() != map.columns {
            return Err(format!(
                "{} seat labels for {} columns",
                map.seat_labels.len(),
                map.columns
            ));
        }
        if map.seat_status.len() != map.rows {
            return Err(format!(
                "{} seat rows for {} declared rows",
                map.seat_status.len(),
                map.rows
            ));
        }

        let mut seen = HashSet::new();
        let mut seat_codes = Vec::with_capacity(map.rows);
        for (index, row) in map.seat_status.into_iter().enumerate() {
            if row.len() != map.columns {
                return Err(format!(
                    "row {} has {} seats, expected {}",
                    index + 1,
                    row.len(),
                    map.columns
                ));
            }
            let mut codes = Vec::with_capacity(row.len());
            for seat in row {
                if seat.seat_code.is_empty() {
                    return Err(format!("row {} has a seat without a code", index + 1));
                }
                if !seen.insert(seat.seat_code.clone()) {
                    return Err(format!("seat code {} appears twice", seat.seat_code));
                }
                codes.push(seat.seat_code);
            }
            seat_codes.push(codes);
        }

        Ok(Self {
            rows: map.rows,
            columns: map.columns,
            seat_labels: map.seat_labels,
            seat_codes,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn seat_labels(&self) -> &[String] {
        &self.seat_labels
    }

    pub fn contains(&self, seat_code: &str) -> bool {
        self.seat_codes.iter().flatten().any(|code| code == seat_code)
    }

    pub fn seat_codes(&self) -> impl Iterator<Item = &str> {
        self.seat_codes.iter().flatten().map(String::as_str)
    }
}

fn booked_set(bookings: &[Booking]) -> HashSet<&str> {
    bookings.iter().map(|b| b.seat.as_str()).collect()
}

/// `is_booked` for a seat is true exactly when some booking holds that seat.
pub fn project(layout: &SeatLayout, bookings: &[Booking]) -> SeatMap {
    let booked = booked_set(bookings);
    SeatMap {
        rows: layout.rows,
        columns: layout.columns,
        seat_labels: layout.seat_labels.clone(),
        seat_status: layout
            .seat_codes
            .iter()
            .map(|row| {
                row.iter()
                    .map(|code| SeatStatus {
                        seat_code: code.clone(),
                        is_booked: booked.contains(code.as_str()),
                    })
                    .collect()
            })
            .collect(),
    }
}

/// `None` when the seat is not part of the layout.
pub fn seat_state(layout: &SeatLayout, bookings: &[Booking], seat_code: &str) -> Option<bool> {
    if !layout.contains(seat_code) {
        return None;
    }
    Some(bookings.iter().any(|b| b.seat == seat_code))
}

pub fn available_seats(layout: &SeatLayout, bookings: &[Booking]) -> Vec<String> {
    let booked = booked_set(bookings);
    layout
        .seat_codes()
        .filter(|code| !booked.contains(code))
        .map(str::to_string)
        .collect()
}
