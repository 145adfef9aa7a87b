use std::fmt::Write;

use crate::models::{Booking, SeatMap};
use crate::session::{BookingSession, Notifications, Selection};

/// Seat grid: label header, two-digit row numbers, `X` for booked seats,
/// `*` for the selected one, otherwise the seat's column letter.
pub fn seat_grid(map: &SeatMap, selection: &Selection) -> String {
    let mut out = String::from("   ");
    for label in &map.seat_labels {
        let _ = write!(out, " {}", label);
    }
    for (index, row) in map.seat_status.iter().enumerate() {
        let _ = write!(out, "\n{:02} ", index + 1);
        for seat in row {
            let mark = if seat.is_booked {
                'X'
            } else if selection.is_selected(&seat.seat_code) {
                '*'
            } else {
                seat.seat_code.chars().last().unwrap_or('?')
            };
            let _ = write!(out, " {}", mark);
        }
    }
    out
}

pub fn seat_view(session: &BookingSession) -> String {
    let Some(map) = session.seat_map() else {
        return "Seat map not loaded yet, try `refresh`".to_string();
    };
    let selection = session.selection();
    let mut out = seat_grid(&map, &selection);
    match selection.seat() {
        Some(seat) => {
            let _ = write!(out, "\nSelected: {}", seat);
        }
        None => out.push_str("\nNo seat selected"),
    }
    out
}

pub fn booking_table(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "No bookings".to_string();
    }
    let width = bookings
        .iter()
        .map(|b| b.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut out = format!("{:>5}  {:<width$}  Seat", "ID", "Name", width = width);
    for b in bookings {
        let _ = write!(out, "\n{:>5}  {:<width$}  {}", b.id, b.name, b.seat, width = width);
    }
    out
}

pub fn seat_list(seats: &[String]) -> String {
    if seats.is_empty() {
        "No seats available".to_string()
    } else {
        format!("{} seats available: {}", seats.len(), seats.join(", "))
    }
}

pub fn notifications(current: &Notifications) -> String {
    let mut lines = Vec::new();
    if let Some(message) = current.success_message() {
        lines.push(format!("✔ {}", message));
    }
    if let Some(message) = current.error_message() {
        lines.push(format!("✘ {}", message));
    }
    lines.join("\n")
}
