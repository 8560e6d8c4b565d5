use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never produced a response (connect, timeout, body read).
    Transport,
    /// The service answered with a non-2xx status.
    Status(u16),
    /// The body could not be decoded into the expected shape.
    Decode,
}

/// A failed call against the biodiversity service.
///
/// `Display` yields the raw message, which is what the dashboard shows in
/// its error banner.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Status(code), message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiError, ApiErrorKind};
    use std::error::Error as _;

    #[test]
    fn display_is_the_raw_message() {
        let e = ApiError::status(502, "Failed to fetch timeline data");
        assert_eq!(e.to_string(), "Failed to fetch timeline data");
        assert_eq!(e.kind, ApiErrorKind::Status(502));
    }

    #[test]
    fn keeps_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let e = ApiError::transport("Search failed").with_source(io);
        assert_eq!(e.source().map(|s| s.to_string()).as_deref(), Some("timed out"));
    }
}
