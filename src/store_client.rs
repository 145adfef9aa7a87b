use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{AvailableSeats, Booking, BookingDraft, BookingPatch, SeatMap};
use crate::services::circuit_breaker::CircuitBreaker;

/// Remote booking store. The store is authoritative for id assignment and
/// seat uniqueness; every call either returns the payload or a `StoreError`
/// carrying the server's reason.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    async fn get_booking(&self, id: i64) -> Result<Booking, StoreError>;

    async fn create_booking(&self, draft: &BookingDraft) -> Result<Booking, StoreError>;

    async fn update_booking(&self, id: i64, patch: &BookingPatch) -> Result<Booking, StoreError>;

    async fn delete_booking(&self, id: i64) -> Result<(), StoreError>;

    async fn delete_all_bookings(&self) -> Result<(), StoreError>;

    async fn search_by_name(&self, query: &str) -> Result<Vec<Booking>, StoreError>;

    async fn search_by_range(&self, start_id: i64, end_id: i64) -> Result<Vec<Booking>, StoreError>;

    async fn get_seat_map(&self) -> Result<SeatMap, StoreError>;

    async fn get_available_seats(&self) -> Result<AvailableSeats, StoreError>;
}

/// Клиент хранилища броней поверх HTTP/JSON.
#[derive(Clone)]
pub struct HttpBookingStore {
    base_url: Url,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl HttpBookingStore {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        circuit_breaker: CircuitBreaker,
    ) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|_| StoreError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            http_client,
            circuit_breaker: Arc::new(circuit_breaker),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(
            &config.store.base_url,
            config.store.timeout(),
            CircuitBreaker::from_config(&config.circuit_breaker),
        )
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Appends percent-encoded path segments to the base url.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the request through the circuit breaker. Transport failures and
    /// 5xx answers count as failures; 4xx answers are the store doing its job.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking booking store request");
            return Err(StoreError::CircuitOpen);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Booking store request failed: {:?}", e);
                self.circuit_breaker.record_failure();
                return Err(StoreError::Transport(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            self.circuit_breaker.record_success();
            debug!("Booking store answered {} for {}", status, response.url());
            return Ok(response);
        }

        if status.is_server_error() {
            self.circuit_breaker.record_failure();
        } else {
            self.circuit_breaker.record_success();
        }

        let reason = Self::detail(response).await;
        warn!(status = status.as_u16(), reason = ?reason, "Booking store rejected request");
        Err(StoreError::Rejected {
            status: status.as_u16(),
            reason,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = self.dispatch(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }

    // FastAPI кладёт причину в {"detail": "..."}
    async fn detail(response: Response) -> Option<String> {
        let body: serde_json::Value = response.json().await.ok()?;
        body.get("detail")
            .or_else(|| body.get("error"))
            .and_then(|detail| detail.as_str())
            .map(str::to_string)
    }
}

#[async_trait]
impl BookingStore for HttpBookingStore {
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        self.fetch(self.http_client.get(self.url(&["bookings"]))).await
    }

    async fn get_booking(&self, id: i64) -> Result<Booking, StoreError> {
        let id = id.to_string();
        self.fetch(self.http_client.get(self.url(&["bookings", &id]))).await
    }

    async fn create_booking(&self, draft: &BookingDraft) -> Result<Booking, StoreError> {
        self.fetch(self.http_client.post(self.url(&["bookings"])).json(draft))
            .await
    }

    async fn update_booking(&self, id: i64, patch: &BookingPatch) -> Result<Booking, StoreError> {
        let id = id.to_string();
        self.fetch(self.http_client.put(self.url(&["bookings", &id])).json(patch))
            .await
    }

    async fn delete_booking(&self, id: i64) -> Result<(), StoreError> {
        let id = id.to_string();
        self.dispatch(self.http_client.delete(self.url(&["bookings", &id])))
            .await
            .map(|_| ())
    }

    async fn delete_all_bookings(&self) -> Result<(), StoreError> {
        self.dispatch(self.http_client.delete(self.url(&["bookings"])))
            .await
            .map(|_| ())
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<Booking>, StoreError> {
        self.fetch(
            self.http_client
                .get(self.url(&["bookings", "search", "name", query])),
        )
        .await
    }

    async fn search_by_range(&self, start_id: i64, end_id: i64) -> Result<Vec<Booking>, StoreError> {
        let (start, end) = (start_id.to_string(), end_id.to_string());
        self.fetch(
            self.http_client
                .get(self.url(&["bookings", "range", &start, &end])),
        )
        .await
    }

    async fn get_seat_map(&self) -> Result<SeatMap, StoreError> {
        self.fetch(self.http_client.get(self.url(&["seats"]))).await
    }

    async fn get_available_seats(&self) -> Result<AvailableSeats, StoreError> {
        self.fetch(self.http_client.get(self.url(&["seats", "available"])))
            .await
    }
}
