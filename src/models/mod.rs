pub mod booking;
pub mod seat;

pub use booking::{Booking, BookingDraft, BookingPatch};
pub use seat::{AvailableSeats, SeatMap, SeatStatus};
