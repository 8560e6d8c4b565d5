use catalog::api::Endpoint;
use catalog::error::ApiError;
use catalog::species::PopularSpecies;
use foundation::token::{RequestToken, TokenIssuer};
use runtime::event_bus::EventBus;
use tracing::{debug, error};

use crate::command::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopularState {
    Idle,
    Loading,
    Ready(Vec<PopularSpecies>),
    /// Rendered in place of the list. There is no retry.
    Failed(String),
}

/// One-shot loader for the landing page's default species list.
#[derive(Debug)]
pub struct PopularSpeciesLoader {
    state: PopularState,
    limit: usize,
    mounted: bool,
    request: TokenIssuer,
}

impl PopularSpeciesLoader {
    pub fn new(limit: usize) -> Self {
        Self {
            state: PopularState::Idle,
            limit,
            mounted: false,
            request: TokenIssuer::new(),
        }
    }

    pub fn state(&self) -> &PopularState {
        &self.state
    }

    pub fn species(&self) -> &[PopularSpecies] {
        match &self.state {
            PopularState::Ready(list) => list,
            _ => &[],
        }
    }

    /// Starts the fetch the first time the list is mounted; later mounts are
    /// no-ops.
    pub fn mount(&mut self, bus: &mut EventBus) -> Vec<Command> {
        if self.mounted {
            return Vec::new();
        }
        self.mounted = true;
        self.state = PopularState::Loading;
        let token = self.request.issue();
        bus.emit("popular.dispatch", "");
        vec![Command::Fetch {
            token,
            endpoint: Endpoint::PopularSpecies,
        }]
    }

    pub fn on_result(
        &mut self,
        token: RequestToken,
        result: Result<Vec<PopularSpecies>, ApiError>,
        bus: &mut EventBus,
    ) -> bool {
        if !self.request.settle(token) {
            debug!(%token, "dropping stale popular species response");
            return false;
        }
        match result {
            Ok(mut list) => {
                list.truncate(self.limit);
                bus.emit("popular.applied", format!("{} species", list.len()));
                self.state = PopularState::Ready(list);
            }
            Err(err) => {
                error!("failed to load popular species: {err}");
                bus.emit("popular.failed", err.to_string());
                self.state = PopularState::Failed(err.to_string());
            }
        }
        true
    }
}
