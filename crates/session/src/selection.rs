use catalog::api::Endpoint;
use catalog::error::ApiError;
use catalog::species::{Species, SpeciesKey};
use catalog::timeline::TimelineData;
use foundation::token::{RequestToken, TokenIssuer};
use runtime::event_bus::EventBus;
use tracing::{debug, error};

use crate::command::Command;

/// The chosen species and its timeline.
///
/// Transition contract:
/// - `timeline` is only ever the response for the species currently held;
///   a response for a replaced selection is dropped on arrival.
/// - `select` and `clear` each move the whole state in one step, so no
///   reader can observe a species paired with another species' timeline.
#[derive(Debug)]
pub struct SelectionState {
    species: Option<Species>,
    timeline: Option<TimelineData>,
    loading: bool,
    error: Option<String>,
    country: String,
    requests: TokenIssuer,
}

impl SelectionState {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            species: None,
            timeline: None,
            loading: false,
            error: None,
            country: country.into(),
            requests: TokenIssuer::new(),
        }
    }

    pub fn species(&self) -> Option<&Species> {
        self.species.as_ref()
    }

    pub fn timeline(&self) -> Option<&TimelineData> {
        self.timeline.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_none()
    }

    /// Makes `species` current and requests its timeline.
    ///
    /// Selecting the same species again refetches, which is how the user
    /// retries after a failure.
    pub fn select(&mut self, species: Species, bus: &mut EventBus) -> Command {
        let token = self.requests.issue();
        let endpoint = Endpoint::SpeciesTimeline {
            key: species.key,
            country: self.country.clone(),
        };
        bus.emit("selection.select", species.key.to_string());
        debug!(key = %species.key, %token, "selected species");

        self.species = Some(species);
        self.timeline = None;
        self.error = None;
        self.loading = true;
        Command::Fetch { token, endpoint }
    }

    /// Applies a timeline response. Returns `false` if it was stale.
    pub fn on_timeline(
        &mut self,
        token: RequestToken,
        key: SpeciesKey,
        result: Result<TimelineData, ApiError>,
        bus: &mut EventBus,
    ) -> bool {
        let matches_species = self.species.as_ref().is_some_and(|s| s.key == key);
        if !matches_species || !self.requests.settle(token) {
            debug!(%key, %token, "dropping stale timeline response");
            bus.emit("timeline.stale", key.to_string());
            return false;
        }

        self.loading = false;
        match result {
            Ok(timeline) => {
                bus.emit("timeline.applied", key.to_string());
                self.timeline = Some(timeline);
            }
            Err(err) => {
                error!(%key, "timeline fetch failed: {err}");
                bus.emit("timeline.failed", err.to_string());
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Drops the selection; any in-flight timeline becomes stale.
    pub fn clear(&mut self, bus: &mut EventBus) {
        self.requests.invalidate();
        let country = std::mem::take(&mut self.country);
        let requests = std::mem::take(&mut self.requests);
        *self = Self {
            country,
            requests,
            ..Self::new("")
        };
        bus.emit("selection.clear", "");
    }
}
