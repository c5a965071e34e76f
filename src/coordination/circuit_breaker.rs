//! API Error Circuit Breaker
//!
//! Counts upstream API errors in a sliding window and pauses order submission
//! once the count reaches the configured threshold. The pause lifts on its own
//! after the cooldown; there is no half-open probing.
//!
//! The breaker is advisory: submission paths call [`CircuitBreaker::is_paused`]
//! and answer "trading paused" themselves.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::BreakerConfig;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation - orders allowed
    Closed,
    /// Error threshold reached - orders paused
    Open,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
        }
    }
}

/// Trip reasons for the circuit breaker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripReason {
    ErrorThreshold { errors: usize, window: Duration },
}

impl std::fmt::Display for TripReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripReason::ErrorThreshold { errors, window } => write!(
                f,
                "API error threshold exceeded: {} errors within {}s",
                errors,
                window.as_secs()
            ),
        }
    }
}

/// Monotonic time source
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }

    /// Jump to `at` past the origin. Moving backwards is ignored.
    pub fn set(&self, at: Duration) {
        let mut elapsed = self.elapsed.lock();
        if at > *elapsed {
            *elapsed = at;
        }
    }

    pub fn set_secs(&self, secs: u64) {
        self.set(Duration::from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.elapsed.lock()
    }
}

/// Observer notified on every trip
pub type AlertCallback = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Default)]
struct BreakerState {
    errors: VecDeque<Instant>,
    paused_until: Option<Instant>,
    last_trip_reason: Option<TripReason>,
    total_trips: u64,
}

impl BreakerState {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.errors.front() {
            if now.saturating_duration_since(oldest) > window {
                self.errors.pop_front();
            } else {
                break;
            }
        }
    }

    fn paused_at(&self, now: Instant) -> bool {
        self.paused_until.is_some_and(|until| now < until)
    }
}

/// Sliding-window breaker for upstream API errors
pub struct CircuitBreaker {
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<BreakerState>,
    alert: Mutex<Option<AlertCallback>>,
}

impl CircuitBreaker {
    /// Create a breaker on the system clock
    pub fn new(config: BreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            state: Mutex::new(BreakerState::default()),
            alert: Mutex::new(None),
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(BreakerConfig::default())
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Register the trip observer, replacing any previous one.
    pub fn set_alert_callback<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.alert.lock() = Some(Arc::new(callback));
    }

    /// Stop alerting; trips still pause trading.
    pub fn clear_alert_callback(&self) {
        *self.alert.lock() = None;
    }

    /// Record one upstream API error and trip if the window is full.
    ///
    /// Errors arriving while already paused are kept in the window but never
    /// extend the pause or fire a second alert.
    pub fn record_api_error(&self) {
        let now = self.clock.now();
        let window = self.config.window();

        let tripped = {
            let mut state = self.state.lock();
            state.errors.push_back(now);
            state.prune(now, window);

            let errors = state.errors.len();
            debug!(errors, "API error recorded");

            if !state.paused_at(now) && errors >= self.config.error_threshold as usize {
                let reason = TripReason::ErrorThreshold { errors, window };
                state.paused_until = Some(now + self.config.cooldown());
                state.errors.clear();
                state.last_trip_reason = Some(reason.clone());
                state.total_trips += 1;
                Some(reason)
            } else {
                None
            }
        };

        // The callback runs outside the state lock so it may query the breaker.
        if let Some(reason) = tripped {
            warn!(
                cooldown_secs = self.config.cooldown_secs,
                "Circuit breaker TRIPPED: {}", reason
            );
            let callback = self.alert.lock().clone();
            if let Some(callback) = callback {
                let message = format!(
                    "{}; trading paused for {}s",
                    reason, self.config.cooldown_secs
                );
                callback(&message);
            }
        }
    }

    /// Whether order submission is currently paused
    pub fn is_paused(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.prune(now, self.config.window());

        match state.paused_until {
            Some(until) if now < until => true,
            Some(_) => {
                state.paused_until = None;
                info!("Circuit breaker CLOSED - trading resumed");
                false
            }
            None => false,
        }
    }

    pub fn state(&self) -> CircuitState {
        if self.is_paused() {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// Clear error history and pause (administrative recovery)
    #[doc(alias = "reset_breaker")]
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.errors.clear();
        state.paused_until = None;
        state.last_trip_reason = None;
        warn!("Circuit breaker reset");
    }

    /// Get circuit breaker statistics
    pub fn stats(&self) -> BreakerStats {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.prune(now, self.config.window());

        let resume_in = state
            .paused_until
            .filter(|until| now < *until)
            .map(|until| until - now);

        BreakerStats {
            state: if resume_in.is_some() {
                CircuitState::Open
            } else {
                CircuitState::Closed
            },
            errors_in_window: state.errors.len(),
            resume_in,
            last_trip_reason: state.last_trip_reason.clone(),
            total_trips: state.total_trips,
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

/// Statistics for monitoring
#[derive(Debug, Clone)]
pub struct BreakerStats {
    pub state: CircuitState,
    pub errors_in_window: usize,
    pub resume_in: Option<Duration>,
    pub last_trip_reason: Option<TripReason>,
    pub total_trips: u64,
}
