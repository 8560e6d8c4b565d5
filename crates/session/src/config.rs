use std::time::Duration;

use catalog::api::MIN_QUERY_CHARS;

/// Shortest grace period between blur and hiding the result panel. Anything
/// shorter can swallow a click on a result.
pub const MIN_BLUR_GRACE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Input quiet period before a search is issued.
    pub debounce: Duration,
    /// Delay between blur and hiding the result panel.
    pub blur_grace: Duration,
    /// Country filter for timeline requests (ISO 3166-1 alpha-2).
    pub country: String,
    /// Upper bound on the popular species list.
    pub popular_limit: usize,
    pub min_query_chars: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            blur_grace: Duration::from_millis(200),
            country: "PL".to_string(),
            popular_limit: 6,
            min_query_chars: MIN_QUERY_CHARS,
        }
    }
}

impl SessionConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the blur grace delay, never going below [`MIN_BLUR_GRACE`].
    pub fn with_blur_grace(mut self, grace: Duration) -> Self {
        self.blur_grace = grace.max(MIN_BLUR_GRACE);
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_popular_limit(mut self, limit: usize) -> Self {
        self.popular_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{MIN_BLUR_GRACE, SessionConfig};
    use std::time::Duration;

    #[test]
    fn defaults_match_the_dashboard() {
        let c = SessionConfig::default();
        assert_eq!(c.debounce, Duration::from_millis(300));
        assert_eq!(c.blur_grace, Duration::from_millis(200));
        assert_eq!(c.country, "PL");
        assert_eq!(c.min_query_chars, 2);
    }

    #[test]
    fn blur_grace_is_clamped() {
        let c = SessionConfig::default().with_blur_grace(Duration::from_millis(10));
        assert_eq!(c.blur_grace, MIN_BLUR_GRACE);
    }
}
