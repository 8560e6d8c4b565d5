use std::time::Duration;

use foundation::token::{RequestToken, TokenIssuer};

/// An explicit, owned handle for at most one pending timer.
///
/// Arming replaces (and thereby cancels) whatever was pending. The executor
/// that actually sleeps reports back with the token it was armed with, and
/// only the token that is still armed is accepted by [`TimerSlot::fire`].
#[derive(Debug, Clone)]
pub struct TimerSlot {
    delay: Duration,
    tokens: TokenIssuer,
}

impl TimerSlot {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            tokens: TokenIssuer::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the slot, superseding any pending timer.
    pub fn arm(&mut self) -> RequestToken {
        self.tokens.issue()
    }

    /// Returns `true` if a timer was pending.
    pub fn cancel(&mut self) -> bool {
        self.tokens.invalidate()
    }

    pub fn is_armed(&self) -> bool {
        self.tokens.current().is_some()
    }

    /// Accepts an elapsed notification.
    ///
    /// Returns `true` exactly once, for the armed token. Superseded or
    /// cancelled timers are rejected.
    pub fn fire(&mut self, token: RequestToken) -> bool {
        self.tokens.settle(token)
    }
}
