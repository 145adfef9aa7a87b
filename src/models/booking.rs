use serde::{Deserialize, Serialize};
use validator::Validate;

/// Подтверждённая бронь: пассажир + место, id выдаёт сервер.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub name: String,
    pub seat: String,
}

/// Body of `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingDraft {
    #[validate(length(min = 1, message = "Please enter a passenger name"))]
    pub name: String,
    #[validate(length(min = 1, message = "Please select a seat or enter a seat code"))]
    pub seat: String,
}

impl BookingDraft {
    /// Normalises form input: the name is trimmed, the seat code trimmed and upper-cased.
    pub fn new(name: &str, seat: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            seat: seat.trim().to_uppercase(),
        }
    }
}

/// Body of `PUT /bookings/{id}`. Only the name is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingPatch {
    #[validate(length(min = 1, message = "Please enter a passenger name"))]
    pub name: String,
}

impl BookingPatch {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }
}
