//! Circuit breaker in front of the market-data HTTP client.
//!
//! A ban (HTTP 403) opens the breaker at once. Throttling and server errors
//! (429/5xx) count as strikes; `failure_threshold` strikes in a row open it.
//! An open breaker refuses every call until its deadline passes, then closes
//! with a clean strike count.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::MarketDataConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Closed { strikes: u32 },
    Open { until: Instant },
}

#[derive(Debug)]
pub struct CircuitBreaker {
    phase: Mutex<Phase>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            phase: Mutex::new(Phase::Closed { strikes: 0 }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn from_config(market: &MarketDataConfig) -> Self {
        Self::new(
            Duration::from_secs(market.breaker_cooldown_secs),
            market.breaker_failure_threshold,
        )
    }

    /// Whether a request may go out now. Closes an open breaker whose
    /// deadline has passed.
    pub fn is_allowed(&self) -> bool {
        let mut phase = self.phase();
        match *phase {
            Phase::Closed { .. } => true,
            Phase::Open { until } if Instant::now() >= until => {
                info!("market data breaker closed after cooldown");
                *phase = Phase::Closed { strikes: 0 };
                true
            }
            Phase::Open { .. } => false,
        }
    }

    pub fn record_success(&self) {
        let mut phase = self.phase();
        if let Phase::Closed { strikes } = &mut *phase {
            *strikes = 0;
        }
    }

    /// Count a throttled or failed response.
    pub fn record_failure(&self) {
        let mut phase = self.phase();
        if let Phase::Closed { strikes } = *phase {
            let strikes = strikes + 1;
            if strikes >= self.failure_threshold {
                warn!(
                    strikes,
                    cooldown_secs = self.cooldown.as_secs(),
                    "market data breaker opened"
                );
                *phase = self.open_phase();
            } else {
                *phase = Phase::Closed { strikes };
            }
        }
    }

    /// Open immediately (provider ban).
    pub fn trip(&self) {
        warn!(
            cooldown_secs = self.cooldown.as_secs(),
            "market data breaker opened by provider ban"
        );
        *self.phase() = self.open_phase();
    }

    /// Time until requests are allowed again; zero when closed.
    pub fn remaining_cooldown(&self) -> Duration {
        match *self.phase() {
            Phase::Closed { .. } => Duration::ZERO,
            Phase::Open { until } => until.saturating_duration_since(Instant::now()),
        }
    }

    fn open_phase(&self) -> Phase {
        Phase::Open {
            until: Instant::now() + self.cooldown,
        }
    }

    fn phase(&self) -> MutexGuard<'_, Phase> {
        // A poisoned guard still holds a valid phase.
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }
}
