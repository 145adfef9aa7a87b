use thiserror::Error;
use validator::ValidationErrors;

/// Ошибки удалённого хранилища броней.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("booking store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("booking store rejected the request with status {status}: {}", reason.as_deref().unwrap_or("no detail"))]
    Rejected { status: u16, reason: Option<String> },
    #[error("circuit breaker is open - booking store temporarily unavailable")]
    CircuitOpen,
    #[error("booking store returned a malformed payload: {0}")]
    Malformed(String),
    #[error("invalid booking store url {0:?}")]
    InvalidUrl(String),
}

impl StoreError {
    pub fn rejected(status: u16, reason: impl Into<String>) -> Self {
        StoreError::Rejected {
            status,
            reason: Some(reason.into()),
        }
    }

    /// Server-supplied detail, if the store sent one.
    pub fn reason(&self) -> Option<&str> {
        match self {
            StoreError::Rejected { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Rejected { status: 404, .. })
    }
}

/// Failures surfaced by the booking session. Remote failures keep the store
/// error as their source so the full chain reaches the logs.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("failed to load bookings")]
    Load(#[source] StoreError),
    #[error("failed to create booking")]
    Create(#[source] StoreError),
    #[error("failed to update booking {id}")]
    Update {
        id: i64,
        #[source]
        source: StoreError,
    },
    #[error("failed to delete booking {id}")]
    Delete {
        id: i64,
        #[source]
        source: StoreError,
    },
    #[error("failed to delete all bookings")]
    DeleteAll(#[source] StoreError),
    #[error("failed to search bookings")]
    Search(#[source] StoreError),
    #[error("failed to load seat map")]
    SeatMapLoad(#[source] StoreError),
    #[error("booking {0} already has a change in flight")]
    ConcurrentMutation(i64),
    #[error("{0}")]
    Validation(String),
}

impl BookingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BookingError::Validation(message.into())
    }

    /// Text for the error notification: the server detail when there is one,
    /// otherwise a fixed per-operation fallback.
    pub fn user_message(&self) -> String {
        let (source, fallback) = match self {
            BookingError::Load(e) => (e, "Failed to load bookings"),
            BookingError::Create(e) => (e, "Failed to create booking"),
            BookingError::Update { source, .. } => (source, "Failed to update booking"),
            BookingError::Delete { source, .. } => (source, "Failed to delete booking"),
            BookingError::DeleteAll(e) => (e, "Failed to delete all bookings"),
            BookingError::Search(e) => (e, "Failed to search bookings"),
            BookingError::SeatMapLoad(e) => (e, "Failed to load seat map"),
            BookingError::ConcurrentMutation(id) => {
                return format!("Booking {} is still being saved, try again in a moment", id)
            }
            BookingError::Validation(msg) => return msg.clone(),
        };
        source.reason().unwrap_or(fallback).to_string()
    }

    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            BookingError::Load(e)
            | BookingError::Create(e)
            | BookingError::DeleteAll(e)
            | BookingError::Search(e)
            | BookingError::SeatMapLoad(e) => Some(e),
            BookingError::Update { source, .. } | BookingError::Delete { source, .. } => {
                Some(source)
            }
            BookingError::ConcurrentMutation(_) | BookingError::Validation(_) => None,
        }
    }
}

impl From<ValidationErrors> for BookingError {
    fn from(errors: ValidationErrors) -> Self {
        // поля сортируем, чтобы сообщение было детерминированным
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let message = fields
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid input".to_string());
        BookingError::Validation(message)
    }
}
