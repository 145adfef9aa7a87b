//! circuit_breaker.rs
//!
//! Автоматический выключатель для вызовов удалённого хранилища броней.
//! После серии сбоев запросы временно блокируются, чтобы не нагружать
//! неработающий сервис; по истечении таймаута пропускается пробный запрос.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::CircuitBreakerConfig;

/// Состояния выключателя.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation, requests pass through.
    Closed,
    /// Requests are refused until the timeout elapses.
    Open,
    /// One probe request is allowed to test recovery.
    HalfOpen,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    /// Счетчик последовательных сбоев.
    failure_count: AtomicU32,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                opened_at: None,
            }),
            failure_count: AtomicU32::new(0),
            failure_threshold: failure_threshold.max(1),
            timeout_duration: timeout,
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(
            config.failure_threshold,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Проверяет, можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(self.timeout_duration);
                if elapsed >= self.timeout_duration {
                    inner.state = CircuitState::HalfOpen;
                    info!("Circuit breaker transitioning to HalfOpen state");
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        self.failure_count.store(0, Ordering::Relaxed);
        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Closed;
            inner.opened_at = None;
            info!("Circuit breaker recovered - transitioning to Closed state");
        }
    }

    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        match inner.state {
            CircuitState::Closed if failure_count >= self.failure_threshold => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                error!(
                    "Circuit breaker OPENED - {} failures reached threshold {}",
                    failure_count, self.failure_threshold
                );
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!("Circuit breaker probe failed - returning to Open state");
            }
            _ => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }
}
