//! Selection coordinator: at most one seat the user intends to book next.
//!
//! The booking form's free-text seat field only matters while nothing is
//! selected; with a selection the effective seat is always the selected one.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "seat_code", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Empty,
    Selected(String),
}

impl Selection {
    pub fn seat(&self) -> Option<&str> {
        match self {
            Selection::Empty => None,
            Selection::Selected(code) => Some(code.as_str()),
        }
    }

    pub fn is_selected(&self, seat_code: &str) -> bool {
        self.seat() == Some(seat_code)
    }

    /// Whether the form's free-text seat field accepts input.
    pub fn seat_field_enabled(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    /// Seat-map click. `seat_state` is the seat's `is_booked`, or `None` when
    /// the seat is not on the map. Booked and unknown seats are no-ops.
    /// Returns whether the selection changed.
    pub fn click(&mut self, seat_code: &str, seat_state: Option<bool>) -> bool {
        if seat_state != Some(false) {
            return false;
        }
        *self = if self.is_selected(seat_code) {
            Selection::Empty
        } else {
            Selection::Selected(seat_code.to_string())
        };
        true
    }

    pub fn clear(&mut self) -> bool {
        let changed = !matches!(self, Selection::Empty);
        *self = Selection::Empty;
        changed
    }

    /// Drops a selection whose seat got booked or left the map.
    pub fn reconcile<F>(&mut self, seat_state: F) -> bool
    where
        F: FnOnce(&str) -> Option<bool>,
    {
        let stale = match &*self {
            Selection::Selected(code) => seat_state(code.as_str()) != Some(false),
            Selection::Empty => false,
        };
        if stale {
            *self = Selection::Empty;
        }
        stale
    }

    /// Seat a form submission would book: the selection, else the trimmed,
    /// upper-cased free text. `None` when both are empty.
    pub fn effective_seat(&self, free_text: &str) -> Option<String> {
        match self {
            Selection::Selected(code) => Some(code.clone()),
            Selection::Empty => {
                let typed = free_text.trim().to_uppercase();
                (!typed.is_empty()).then_some(typed)
            }
        }
    }
}
