/// Identity captured when a request (or timer) is dispatched.
///
/// Tokens are issued from a monotonically increasing counter, so two tokens
/// from the same issuer compare by dispatch order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Latest-wins token issuer for one logical request key.
///
/// Only the most recently issued token is current. Issuing a new token or
/// calling [`TokenIssuer::invalidate`] makes every earlier token stale, which
/// is how completions that arrive out of order get discarded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenIssuer {
    next: u64,
    current: Option<RequestToken>,
}

impl TokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh token and makes it the only current one.
    pub fn issue(&mut self) -> RequestToken {
        self.next = self.next.wrapping_add(1);
        let token = RequestToken(self.next);
        self.current = Some(token);
        token
    }

    /// Marks every issued token as stale without issuing a new one.
    ///
    /// Returns `true` if a token was current.
    pub fn invalidate(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<RequestToken> {
        self.current
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current == Some(token)
    }

    /// Consumes the current token if it equals `token`.
    ///
    /// Used for one-shot completions (timers): the first matching completion
    /// wins, duplicates and stale ones are rejected.
    pub fn settle(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.current = None;
            return true;
        }
        false
    }
}
