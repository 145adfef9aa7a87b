use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatus {
    pub seat_code: String,
    pub is_booked: bool,
}

/// Seat map as returned by `GET /seats` and as projected by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatMap {
    pub rows: usize,
    pub columns: usize,
    pub seat_labels: Vec<String>,
    pub seat_status: Vec<Vec<SeatStatus>>,
}

impl SeatMap {
    pub fn seat(&self, seat_code: &str) -> Option<&SeatStatus> {
        self.seat_status
            .iter()
            .flatten()
            .find(|s| s.seat_code == seat_code)
    }

    pub fn booked_seats(&self) -> Vec<&str> {
        self.seat_status
            .iter()
            .flatten()
            .filter(|s| s.is_booked)
            .map(|s| s.seat_code.as_str())
            .collect()
    }
}

/// Body of `GET /seats/available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSeats {
    pub available_seats: Vec<String>,
}
