use catalog::api::Endpoint;
use catalog::error::ApiError;
use catalog::species::Species;
use foundation::token::{RequestToken, TokenIssuer};
use runtime::event_bus::EventBus;
use runtime::timer::TimerSlot;
use tracing::{debug, warn};

use crate::command::{Command, TimerKind};
use crate::config::SessionConfig;

/// What the result panel under the search box currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelView<'a> {
    Hidden,
    Results(&'a [Species]),
    /// The last search came back empty.
    NoMatches { query: &'a str },
}

/// Incremental species search behind a debounced text input.
///
/// Two identities guard the state:
/// - the debounce [`TimerSlot`]: every keystroke re-arms it, so only the
///   timer that survived the quiet period can dispatch a search;
/// - the request [`TokenIssuer`]: every input change invalidates in-flight
///   searches, so a response is applied only if it carries the latest token
///   and was issued for the query that is still in the box.
#[derive(Debug)]
pub struct SearchController {
    query: String,
    results: Vec<Species>,
    panel_visible: bool,
    is_loading: bool,
    min_query_chars: usize,
    debounce: TimerSlot,
    blur_grace: TimerSlot,
    requests: TokenIssuer,
}

impl SearchController {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            panel_visible: false,
            is_loading: false,
            min_query_chars: config.min_query_chars,
            debounce: TimerSlot::new(config.debounce),
            blur_grace: TimerSlot::new(config.blur_grace),
            requests: TokenIssuer::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Species] {
        &self.results
    }

    pub fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn panel(&self) -> PanelView<'_> {
        if !self.panel_visible {
            return PanelView::Hidden;
        }
        if !self.results.is_empty() {
            return PanelView::Results(&self.results);
        }
        if self.is_searchable() && !self.is_loading {
            return PanelView::NoMatches { query: &self.query };
        }
        PanelView::Hidden
    }

    fn is_searchable(&self) -> bool {
        self.query.chars().count() >= self.min_query_chars
    }

    pub fn on_input_change(&mut self, text: impl Into<String>, bus: &mut EventBus) -> Vec<Command> {
        self.query = text.into();
        self.is_loading = false;
        if self.requests.invalidate() {
            bus.emit("search.invalidate", self.query.clone());
        }

        if !self.is_searchable() {
            self.results.clear();
            self.panel_visible = false;
            if self.debounce.cancel() {
                return vec![Command::CancelTimer {
                    timer: TimerKind::SearchDebounce,
                }];
            }
            return Vec::new();
        }

        let token = self.debounce.arm();
        vec![Command::ArmTimer {
            timer: TimerKind::SearchDebounce,
            token,
            delay: self.debounce.delay(),
        }]
    }

    /// The quiet period passed: issue the search for the current query.
    pub fn on_debounce_elapsed(&mut self, token: RequestToken, bus: &mut EventBus) -> Vec<Command> {
        if !self.debounce.fire(token) || !self.is_searchable() {
            return Vec::new();
        }
        let token = self.requests.issue();
        self.is_loading = true;
        bus.emit("search.dispatch", self.query.clone());
        debug!(query = %self.query, %token, "dispatching species search");
        vec![Command::Fetch {
            token,
            endpoint: Endpoint::SearchSpecies {
                query: self.query.clone(),
            },
        }]
    }

    /// Applies a search response. Returns `false` if it was stale and dropped.
    pub fn on_search_result(
        &mut self,
        token: RequestToken,
        query: &str,
        result: Result<Vec<Species>, ApiError>,
        bus: &mut EventBus,
    ) -> bool {
        if !self.requests.is_current(token) || query != self.query {
            debug!(query, %token, current = %self.query, "dropping stale search response");
            bus.emit("search.stale", query.to_string());
            return false;
        }
        self.requests.invalidate();
        self.is_loading = false;

        match result {
            Ok(results) => {
                bus.emit("search.applied", format!("{query}: {} results", results.len()));
                self.results = results;
                self.panel_visible = true;
            }
            Err(err) => {
                warn!(query, "species search failed: {err}");
                bus.emit("search.failed", err.to_string());
                self.results.clear();
                self.panel_visible = false;
            }
        }
        true
    }

    /// Takes the result at `index` as the user's pick.
    ///
    /// Hides the panel and puts the species' display name in the box without
    /// scheduling another search.
    pub fn pick(&mut self, index: usize) -> Option<(Species, Vec<Command>)> {
        let species = self.results.get(index)?.clone();
        self.query = species.display_name().to_string();
        self.panel_visible = false;
        self.is_loading = false;
        self.requests.invalidate();

        let mut commands = Vec::new();
        if self.debounce.cancel() {
            commands.push(Command::CancelTimer {
                timer: TimerKind::SearchDebounce,
            });
        }
        Some((species, commands))
    }

    pub fn on_focus(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.blur_grace.cancel() {
            commands.push(Command::CancelTimer {
                timer: TimerKind::PanelBlurGrace,
            });
        }
        if !self.results.is_empty() {
            self.panel_visible = true;
        }
        commands
    }

    /// Hides the panel after the grace delay, so a click on a result that
    /// caused the blur still lands.
    pub fn on_blur(&mut self) -> Vec<Command> {
        let token = self.blur_grace.arm();
        vec![Command::ArmTimer {
            timer: TimerKind::PanelBlurGrace,
            token,
            delay: self.blur_grace.delay(),
        }]
    }

    pub fn on_blur_elapsed(&mut self, token: RequestToken) {
        if self.blur_grace.fire(token) {
            self.panel_visible = false;
        }
    }
}
