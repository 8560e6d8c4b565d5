use catalog::species::Species;
use compute::analysis::temporal::{TimelineAggregator, TimelineChart};
use runtime::event_bus::{Event, EventBus};
use streaming::compositor::{MapTileCompositor, MosaicUpdate, TileLoad};
use streaming::tile::TileGrid;
use tracing::debug;

use crate::command::{Command, Completion, TimerKind};
use crate::config::SessionConfig;
use crate::popular::PopularSpeciesLoader;
use crate::search::SearchController;
use crate::selection::SelectionState;

/// Something the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// The dashboard was first shown.
    Mount,
    /// The search box text changed.
    Input(String),
    Focus,
    Blur,
    /// Clicked the search result at this index.
    PickResult(usize),
    /// Clicked "View Observations" on the popular species at this index.
    PickPopular(usize),
    ClearSelection,
}

/// What the timeline card shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelinePanel {
    NothingSelected,
    Loading,
    /// The fetch failed; the banner carries the message.
    Unavailable,
    Chart(TimelineChart),
}

impl TimelinePanel {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            TimelinePanel::NothingSelected => Some("No species selected"),
            TimelinePanel::Loading => Some("Loading timeline data..."),
            TimelinePanel::Unavailable => Some("Timeline data unavailable"),
            TimelinePanel::Chart(TimelineChart::NoData) => Some("No timeline data available"),
            TimelinePanel::Chart(TimelineChart::Series(_)) => None,
        }
    }
}

/// Root of the dashboard state.
///
/// Every transition goes through [`Dashboard::apply`] (user input) or
/// [`Dashboard::complete`] (finished I/O) on a single owner, and returns the
/// commands an executor must run next. Search picks and popular picks both
/// end in the same selection path.
#[derive(Debug)]
pub struct Dashboard {
    search: SearchController,
    popular: PopularSpeciesLoader,
    selection: SelectionState,
    map: MapTileCompositor,
    bus: EventBus,
}

impl Dashboard {
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_grid(config, TileGrid::default())
    }

    pub fn with_grid(config: &SessionConfig, grid: TileGrid) -> Self {
        Self {
            search: SearchController::new(config),
            popular: PopularSpeciesLoader::new(config.popular_limit),
            selection: SelectionState::new(config.country.clone()),
            map: MapTileCompositor::new(grid),
            bus: EventBus::new(),
        }
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn popular(&self) -> &PopularSpeciesLoader {
        &self.popular
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn map(&self) -> &MapTileCompositor {
        &self.map
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    /// The popular list is only offered while nothing is selected.
    pub fn popular_visible(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn timeline_panel(&self) -> TimelinePanel {
        if self.selection.is_empty() {
            return TimelinePanel::NothingSelected;
        }
        match self.selection.timeline() {
            Some(data) => TimelinePanel::Chart(TimelineAggregator::aggregate(data)),
            None if self.selection.error().is_some() => TimelinePanel::Unavailable,
            None => TimelinePanel::Loading,
        }
    }

    pub fn apply(&mut self, action: UserAction) -> Vec<Command> {
        debug!(?action, "user action");
        match action {
            UserAction::Mount => self.popular.mount(&mut self.bus),
            UserAction::Input(text) => self.search.on_input_change(text, &mut self.bus),
            UserAction::Focus => self.search.on_focus(),
            UserAction::Blur => self.search.on_blur(),
            UserAction::PickResult(index) => {
                let Some((species, mut commands)) = self.search.pick(index) else {
                    return Vec::new();
                };
                commands.extend(self.select(species));
                commands
            }
            UserAction::PickPopular(index) => {
                let Some(species) = self.popular.species().get(index) else {
                    return Vec::new();
                };
                let species = species.species.clone();
                self.select(species)
            }
            UserAction::ClearSelection => {
                self.selection.clear(&mut self.bus);
                self.map.show(None);
                Vec::new()
            }
        }
    }

    pub fn complete(&mut self, completion: Completion) -> Vec<Command> {
        match completion {
            Completion::TimerElapsed {
                timer: TimerKind::SearchDebounce,
                token,
            } => self.search.on_debounce_elapsed(token, &mut self.bus),
            Completion::TimerElapsed {
                timer: TimerKind::PanelBlurGrace,
                token,
            } => {
                self.search.on_blur_elapsed(token);
                Vec::new()
            }
            Completion::Search {
                token,
                query,
                result,
            } => {
                self.search
                    .on_search_result(token, &query, result, &mut self.bus);
                Vec::new()
            }
            Completion::Timeline { token, key, result } => {
                self.selection
                    .on_timeline(token, key, result, &mut self.bus);
                Vec::new()
            }
            Completion::PopularSpecies { token, result } => {
                self.popular.on_result(token, result, &mut self.bus);
                Vec::new()
            }
            Completion::Image { load, outcome } => {
                let failed = outcome.is_err();
                match self.map.on_image(load.epoch, &load.request, outcome) {
                    MosaicUpdate::Stale => {
                        self.bus.emit("tile.stale", load.request.to_string());
                        Vec::new()
                    }
                    MosaicUpdate::Settled => {
                        if failed {
                            self.bus.emit("tile.failed", load.request.to_string());
                        }
                        Vec::new()
                    }
                    MosaicUpdate::Fallback(next) => {
                        self.bus.emit("tile.fallback", next.request.to_string());
                        vec![Command::LoadImage(next)]
                    }
                }
            }
        }
    }

    fn select(&mut self, species: Species) -> Vec<Command> {
        let loads = self.map.show(Some(&species));
        let mut commands = Vec::with_capacity(loads.len() + 1);
        commands.push(self.selection.select(species, &mut self.bus));
        commands.extend(loads.into_iter().map(Command::LoadImage));
        commands
    }
}

/// Image loads in a command batch, in order.
pub fn image_loads(commands: &[Command]) -> impl Iterator<Item = &TileLoad> {
    commands.iter().filter_map(|c| match c {
        Command::LoadImage(load) => Some(load),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::{Dashboard, TimelinePanel, UserAction, image_loads};
    use crate::command::{Command, Completion, TimerKind};
    use crate::config::SessionConfig;
    use catalog::api::Endpoint;
    use catalog::error::ApiError;
    use catalog::species::{PopularSpecies, Species, SpeciesKey};
    use catalog::timeline::{MonthCount, TimelineData, YearCount};
    use compute::analysis::temporal::{ChartPoint, TimelineChart};
    use foundation::token::RequestToken;
    use pretty_assertions::assert_eq;
    use streaming::compositor::{MapView, Placeholder};
    use streaming::image::ImageLoadFailure;
    use streaming::source::{TileLayer, TileSource};

    fn dashboard() -> Dashboard {
        Dashboard::new(&SessionConfig::default())
    }

    fn sparrow() -> Species {
        Species::new(2492010, "Passer domesticus")
            .with_vernacular_name("House Sparrow")
            .with_dataset_key("d7dddbf4-2cf0-4f39-9b2a-bb099caae36c")
    }

    fn fetch_token(commands: &[Command]) -> RequestToken {
        commands
            .iter()
            .find_map(|c| match c {
                Command::Fetch { token, .. } => Some(*token),
                _ => None,
            })
            .expect("fetch command")
    }

    fn search_for(d: &mut Dashboard, text: &str, results: Vec<Species>) {
        let armed = d.apply(UserAction::Input(text.to_string()));
        let Some(Command::ArmTimer { token, .. }) = armed.first() else {
            panic!("expected debounce timer");
        };
        let fetch = d.complete(Completion::TimerElapsed {
            timer: TimerKind::SearchDebounce,
            token: *token,
        });
        d.complete(Completion::Search {
            token: fetch_token(&fetch),
            query: text.to_string(),
            result: Ok(results),
        });
    }

    #[test]
    fn picking_a_search_result_drives_timeline_and_map() {
        let mut d = dashboard();
        search_for(&mut d, "passer", vec![sparrow()]);

        let commands = d.apply(UserAction::PickResult(0));
        assert!(commands.iter().any(|c| matches!(
            c,
            Command::Fetch {
                endpoint: Endpoint::SpeciesTimeline { .. },
                ..
            }
        )));
        assert_eq!(image_loads(&commands).count(), 24);
        assert_eq!(d.search().query(), "House Sparrow");
        assert!(!d.search().panel_visible());
        assert_eq!(d.timeline_panel(), TimelinePanel::Loading);
        assert!(!d.popular_visible());

        d.complete(Completion::Timeline {
            token: fetch_token(&commands),
            key: SpeciesKey(2492010),
            result: Ok(TimelineData {
                yearly: vec![YearCount { year: 2020, count: 3 }],
                monthly: vec![MonthCount {
                    month: "Jan".into(),
                    count: 3,
                }],
                total_observations: 3,
                ..TimelineData::default()
            }),
        });
        let TimelinePanel::Chart(TimelineChart::Series(series)) = d.timeline_panel() else {
            panic!("expected chart");
        };
        assert_eq!(series.monthly, vec![ChartPoint::new("Jan", 3)]);
    }

    #[test]
    fn popular_pick_uses_the_same_selection_path() {
        let mut d = dashboard();
        let mount = d.apply(UserAction::Mount);
        d.complete(Completion::PopularSpecies {
            token: fetch_token(&mount),
            result: Ok(vec![PopularSpecies {
                species: sparrow(),
                observation_count: 12,
            }]),
        });
        assert!(d.popular_visible());

        let commands = d.apply(UserAction::PickPopular(0));
        assert_eq!(d.selection().species(), Some(&sparrow()));
        assert_eq!(image_loads(&commands).count(), 24);
        assert!(d.apply(UserAction::PickPopular(5)).is_empty());
    }

    #[test]
    fn clear_restores_placeholders() {
        let mut d = dashboard();
        search_for(&mut d, "passer", vec![sparrow()]);
        d.apply(UserAction::PickResult(0));
        d.apply(UserAction::ClearSelection);

        assert_eq!(d.timeline_panel(), TimelinePanel::NothingSelected);
        assert_eq!(
            d.map().view(),
            &MapView::Placeholder(Placeholder::NothingSelected)
        );
        assert!(d.popular_visible());
    }

    #[test]
    fn species_without_dataset_key_gets_placeholder_not_tiles() {
        let mut d = dashboard();
        search_for(&mut d, "quercus", vec![Species::new(1, "Quercus robur")]);
        let commands = d.apply(UserAction::PickResult(0));
        assert_eq!(image_loads(&commands).count(), 0);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            d.map().view(),
            &MapView::Placeholder(Placeholder::NoDatasetKey)
        );
    }

    #[test]
    fn failed_base_tile_requests_one_fallback() {
        let mut d = dashboard();
        search_for(&mut d, "passer", vec![sparrow()]);
        let commands = d.apply(UserAction::PickResult(0));
        let base = image_loads(&commands)
            .find(|l| l.request.layer == TileLayer::Base)
            .cloned()
            .expect("base load");

        let next = d.complete(Completion::Image {
            load: base,
            outcome: Err(ImageLoadFailure::Undecodable),
        });
        let [Command::LoadImage(fallback)] = next.as_slice() else {
            panic!("expected one fallback load, got {next:?}");
        };
        assert_eq!(fallback.request.source, TileSource::UnfilteredBase);

        let after = d.complete(Completion::Image {
            load: fallback.clone(),
            outcome: Err(ImageLoadFailure::Undecodable),
        });
        assert!(after.is_empty());
        assert_eq!(d.events().count("tile.fallback"), 1);
        assert_eq!(d.events().count("tile.failed"), 1);
    }

    #[test]
    fn timeline_error_shows_banner_state() {
        let mut d = dashboard();
        search_for(&mut d, "passer", vec![sparrow()]);
        let commands = d.apply(UserAction::PickResult(0));
        d.complete(Completion::Timeline {
            token: fetch_token(&commands),
            key: SpeciesKey(2492010),
            result: Err(ApiError::status(500, "Failed to fetch timeline data")),
        });
        assert_eq!(d.selection().error(), Some("Failed to fetch timeline data"));
        assert_eq!(d.timeline_panel(), TimelinePanel::Unavailable);
    }
}
