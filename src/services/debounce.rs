//! Quiet-period scheduling for recompute requests.
//!
//! [`DebounceScheduler`] is a plain state machine; the session worker feeds
//! it the current time and sleeps until [`DebounceScheduler::deadline`].

use std::time::Duration;
use tokio::time::Instant;

use crate::models::{QuantizationRequest, MAX_QUIET_PERIOD_MS};

/// Upper bound for the quiet period
pub const MAX_QUIET_PERIOD: Duration = Duration::from_millis(MAX_QUIET_PERIOD_MS);

/// A computation the scheduler asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    /// Generation of the latest submission when the ticket was issued
    pub generation: u64,
    pub request: QuantizationRequest,
}

/// Whether a finished computation may be published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Still matches the latest desired request
    Fresh,
    /// Superseded; the result is discarded and the latest request is due now
    Stale,
}

/// Coalesces bursts of requests into single computations.
///
/// - `submit` records the request and restarts the quiet period
/// - `fire` hands out one [`Ticket`] once the quiet period has elapsed and
///   nothing is running
/// - `complete` decides whether the result is still wanted
#[derive(Debug)]
pub struct DebounceScheduler {
    quiet_period: Duration,
    desired: QuantizationRequest,
    generation: u64,
    deadline: Option<Instant>,
    running: Option<Ticket>,
}

impl DebounceScheduler {
    /// Quiet periods longer than [`MAX_QUIET_PERIOD`] are shortened to it
    pub fn new(quiet_period: Duration, initial: QuantizationRequest) -> Self {
        Self {
            quiet_period: quiet_period.min(MAX_QUIET_PERIOD),
            desired: initial,
            generation: 0,
            deadline: None,
            running: None,
        }
    }

    /// Latest submitted request
    pub fn desired(&self) -> QuantizationRequest {
        self.desired
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the pending request becomes due, if one is pending
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Record `request` and restart the quiet period
    pub fn submit(&mut self, request: QuantizationRequest, now: Instant) {
        self.record(request, now + self.quiet_period);
    }

    /// Record `request` and make it due immediately
    pub fn submit_now(&mut self, request: QuantizationRequest, now: Instant) {
        self.record(request, now);
    }

    fn record(&mut self, request: QuantizationRequest, due: Instant) {
        self.desired = request;
        self.generation += 1;
        self.deadline = Some(due);
    }

    /// Start the pending computation if it is due and nothing is running
    pub fn fire(&mut self, now: Instant) -> Option<Ticket> {
        if self.running.is_some() {
            return None;
        }
        match self.deadline {
            Some(due) if due <= now => {
                self.deadline = None;
                let ticket = Ticket {
                    generation: self.generation,
                    request: self.desired,
                };
                self.running = Some(ticket);
                Some(ticket)
            }
            _ => None,
        }
    }

    /// Mark `ticket` finished
    ///
    /// A result for the same request as the latest submission counts as
    /// fresh even if other requests came in between; anything else is
    /// stale and the latest request is scheduled without another quiet
    /// period.
    pub fn complete(&mut self, ticket: Ticket, now: Instant) -> Completion {
        if self.running == Some(ticket) {
            self.running = None;
        }

        if ticket.generation == self.generation || ticket.request == self.desired {
            if ticket.request == self.desired {
                self.deadline = None;
            }
            Completion::Fresh
        } else {
            self.deadline = Some(now);
            Completion::Stale
        }
    }

    /// Adopt `request` as computed, e.g. after a new image was loaded
    pub fn reset(&mut self, request: QuantizationRequest) {
        self.desired = request;
        self.generation += 1;
        self.deadline = None;
        self.running = None;
    }
}
