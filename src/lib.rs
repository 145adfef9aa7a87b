pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod store_client;

use std::sync::Arc;

use session::BookingSession;
use store_client::HttpBookingStore;

// Shared state для всего приложения
pub struct AppState {
    pub config: config::Config,
    pub session: BookingSession,
}

impl AppState {
    pub fn new(config: config::Config) -> Result<Arc<Self>, error::StoreError> {
        let store = HttpBookingStore::from_config(&config)?;
        let session = BookingSession::new(Arc::new(store), &config.session);

        Ok(Arc::new(Self { config, session }))
    }
}
