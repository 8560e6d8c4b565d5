use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use catalog::api::Endpoint;
use foundation::token::RequestToken;
use runtime::event_bus::Event;
use service::SpeciesService;
use session::command::{Command, Completion, TimerKind};
use session::dashboard::{Dashboard, UserAction};
use streaming::compositor::TileLoad;
use streaming::image::{check_image, ImageLoadFailure};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Dashboard events kept for [`Driver::take_events`]; older ones are dropped.
pub const EVENT_HISTORY: usize = 256;

/// Runs a [`Dashboard`] against a [`SpeciesService`].
///
/// All state changes happen on the task that owns the driver; spawned tasks
/// only perform I/O or sleep, then post a [`Completion`] back through the
/// channel. Re-arming a timer aborts the task of the previous one.
pub struct Driver<S> {
    dashboard: Dashboard,
    service: Arc<S>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    timers: HashMap<TimerKind, (RequestToken, AbortHandle)>,
    in_flight: usize,
    history: VecDeque<Event>,
}

impl<S: SpeciesService + 'static> Driver<S> {
    pub fn new(dashboard: Dashboard, service: Arc<S>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            dashboard,
            service,
            tx,
            rx,
            timers: HashMap::new(),
            in_flight: 0,
            history: VecDeque::new(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// No request is outstanding and no timer is armed.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.timers.is_empty()
    }

    pub fn dispatch(&mut self, action: UserAction) {
        let commands = self.dashboard.apply(action);
        self.execute(commands);
        self.log_events();
    }

    /// Processes completions until nothing is outstanding.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            let Some(completion) = self.rx.recv().await else {
                break;
            };
            self.complete(completion);
        }
    }

    /// Processes completions that arrive within `duration`.
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while let Ok(Some(completion)) = tokio::time::timeout_at(deadline, self.rx.recv()).await {
            self.complete(completion);
        }
    }

    /// Takes the most recent dashboard events, at most [`EVENT_HISTORY`].
    pub fn take_events(&mut self) -> Vec<Event> {
        self.history.drain(..).collect()
    }

    fn complete(&mut self, completion: Completion) {
        match &completion {
            Completion::TimerElapsed { timer, token } => {
                if self.timers.get(timer).is_some_and(|(armed, _)| armed == token) {
                    self.timers.remove(timer);
                }
            }
            _ => self.in_flight = self.in_flight.saturating_sub(1),
        }
        let commands = self.dashboard.complete(completion);
        self.execute(commands);
        self.log_events();
    }

    fn execute(&mut self, commands: Vec<Command>) {
        for command in commands {
            trace!(?command, "execute");
            match command {
                Command::ArmTimer {
                    timer,
                    token,
                    delay,
                } => self.arm(timer, token, delay),
                Command::CancelTimer { timer } => {
                    if let Some((_, handle)) = self.timers.remove(&timer) {
                        handle.abort();
                    }
                }
                Command::Fetch { token, endpoint } => self.fetch(token, endpoint),
                Command::LoadImage(load) => self.load_image(load),
            }
        }
    }

    fn arm(&mut self, timer: TimerKind, token: RequestToken, delay: Duration) {
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Completion::TimerElapsed { timer, token });
        })
        .abort_handle();
        if let Some((_, previous)) = self.timers.insert(timer, (token, handle)) {
            previous.abort();
        }
    }

    fn fetch(&mut self, token: RequestToken, endpoint: Endpoint) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let completion = match endpoint {
                Endpoint::SearchSpecies { query } => {
                    let result = service.search_species(query.clone()).await;
                    Completion::Search {
                        token,
                        query,
                        result,
                    }
                }
                Endpoint::SpeciesTimeline { key, country } => Completion::Timeline {
                    token,
                    key,
                    result: service.species_timeline(key, country).await,
                },
                Endpoint::PopularSpecies => Completion::PopularSpecies {
                    token,
                    result: service.popular_species().await,
                },
            };
            let _ = tx.send(completion);
        });
    }

    fn load_image(&mut self, load: TileLoad) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = match service.tile_image(load.request.clone()).await {
                Ok(bytes) => check_image(&bytes).map(|_| ()),
                Err(err) => Err(ImageLoadFailure::Fetch(err.to_string())),
            };
            let _ = tx.send(Completion::Image { load, outcome });
        });
    }

    fn log_events(&mut self) {
        for event in self.dashboard.drain_events() {
            debug!(seq = event.seq, kind = event.kind, "{}", event.message);
            if self.history.len() == EVENT_HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Driver, EVENT_HISTORY};
    use catalog::species::{PopularSpecies, Species, SpeciesKey};
    use catalog::timeline::{TimelineData, YearCount};
    use pretty_assertions::assert_eq;
    use service::MemoryService;
    use session::config::SessionConfig;
    use session::dashboard::{Dashboard, UserAction};
    use std::sync::Arc;
    use std::time::Duration;
    use streaming::compositor::MapView;
    use streaming::residency::LayerState;
    use streaming::tile::TileGrid;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn driver(svc: &Arc<MemoryService>) -> Driver<MemoryService> {
        Driver::new(Dashboard::new(&SessionConfig::default()), Arc::clone(svc))
    }

    fn popular(species: Species) -> PopularSpecies {
        PopularSpecies {
            species,
            observation_count: 100,
        }
    }

    fn timeline(year: i32, count: u64) -> TimelineData {
        TimelineData {
            yearly: vec![YearCount { year, count }],
            total_observations: count,
            ..TimelineData::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn keystrokes_collapse_into_one_search() {
        let svc = Arc::new(MemoryService::new());
        svc.set_search(
            "pass",
            Ok(vec![Species::new(1, "Passer domesticus")]),
            Duration::from_millis(50),
        )
        .await;

        let mut d = driver(&svc);
        d.dispatch(UserAction::Focus);
        for text in ["p", "pa", "pas", "pass"] {
            d.dispatch(UserAction::Input(text.into()));
            d.run_for(Duration::from_millis(100)).await;
        }
        d.settle().await;

        assert_eq!(svc.calls().await, vec!["/species/search?q=pass".to_string()]);
        assert_eq!(d.dashboard().search().results().len(), 1);
        assert!(d.dashboard().search().panel_visible());
        assert!(d.take_events().iter().any(|e| e.kind == "search.applied"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_for_an_old_query_is_dropped() {
        let svc = Arc::new(MemoryService::new());
        svc.set_search(
            "pa",
            Ok(vec![Species::new(1, "Parus major")]),
            Duration::from_secs(2),
        )
        .await;
        svc.set_search(
            "par",
            Ok(vec![Species::new(2, "Cyanistes caeruleus")]),
            Duration::from_millis(100),
        )
        .await;

        let mut d = driver(&svc);
        d.dispatch(UserAction::Input("pa".into()));
        d.run_for(Duration::from_millis(400)).await;
        d.dispatch(UserAction::Input("par".into()));
        d.settle().await;

        assert_eq!(svc.call_count("/species/search").await, 2);
        let keys: Vec<_> = d
            .dashboard()
            .search()
            .results()
            .iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(keys, vec![SpeciesKey(2)]);
        assert_eq!(
            d.take_events()
                .iter()
                .filter(|e| e.kind == "search.stale")
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn blur_hides_panel_after_grace() {
        let svc = Arc::new(MemoryService::new());
        svc.set_search("pa", Ok(vec![Species::new(1, "Parus major")]), Duration::ZERO)
            .await;

        let mut d = driver(&svc);
        d.dispatch(UserAction::Input("pa".into()));
        d.settle().await;
        assert!(d.dashboard().search().panel_visible());

        d.dispatch(UserAction::Blur);
        d.run_for(Duration::from_millis(100)).await;
        assert!(d.dashboard().search().panel_visible());

        d.dispatch(UserAction::Focus);
        d.settle().await;
        assert!(d.dashboard().search().panel_visible());

        d.dispatch(UserAction::Blur);
        d.settle().await;
        assert!(!d.dashboard().search().panel_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn late_timeline_for_replaced_species_is_ignored() {
        let svc = Arc::new(MemoryService::new());
        svc.set_popular(
            Ok(vec![
                popular(Species::new(10, "Parus major")),
                popular(Species::new(20, "Pica pica")),
            ]),
            Duration::ZERO,
        )
        .await;
        svc.set_timeline(SpeciesKey(10), Ok(timeline(2019, 5)), Duration::from_secs(2))
            .await;
        svc.set_timeline(
            SpeciesKey(20),
            Ok(timeline(2021, 9)),
            Duration::from_millis(100),
        )
        .await;

        let mut d = driver(&svc);
        d.dispatch(UserAction::Mount);
        d.settle().await;
        assert_eq!(d.dashboard().popular().species().len(), 2);

        d.dispatch(UserAction::PickPopular(0));
        d.run_for(Duration::from_millis(10)).await;
        d.dispatch(UserAction::PickPopular(1));
        d.settle().await;

        let selection = d.dashboard().selection();
        assert_eq!(selection.species().map(|s| s.key), Some(SpeciesKey(20)));
        assert_eq!(selection.timeline(), Some(&timeline(2021, 9)));
        assert!(!selection.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn base_tile_falls_back_once() {
        let svc = Arc::new(MemoryService::new());
        let species = Species::new(7, "Ciconia ciconia").with_dataset_key("k");
        svc.set_popular(Ok(vec![popular(species)]), Duration::ZERO)
            .await;
        // 6/70/13: filtered base is not an image, unfiltered base works.
        svc.set_tile("/map/tile/6/70/13?dataset_key=k", Ok(b"<html>".to_vec()), Duration::ZERO)
            .await;
        svc.set_tile("/map/tile/6/70/13", Ok(PNG.to_vec()), Duration::ZERO)
            .await;
        svc.set_tile("/map/6/70/13?dataset_key=k", Ok(PNG.to_vec()), Duration::ZERO)
            .await;
        // 6/71/13: nothing scripted, every layer 404s.

        let grid = TileGrid::new(6, 70..=71, 13..=13);
        let dashboard = Dashboard::with_grid(&SessionConfig::default(), grid);
        let mut d = Driver::new(dashboard, Arc::clone(&svc));
        d.dispatch(UserAction::Mount);
        d.settle().await;
        d.dispatch(UserAction::PickPopular(0));
        d.settle().await;

        let MapView::Mosaic(mosaic) = d.dashboard().map().view() else {
            panic!("expected a mosaic");
        };
        assert!(mosaic.is_complete());
        let states: Vec<_> = mosaic.tiles.iter().map(|t| (t.base, t.overlay)).collect();
        assert_eq!(
            states,
            vec![
                (LayerState::FallbackLoaded, LayerState::Loaded),
                (LayerState::FallbackFailed, LayerState::Failed),
            ]
        );
        assert_eq!(svc.call_count("/map/tile/6/70/13").await, 2);
        assert_eq!(svc.call_count("/map/tile/6/71/13").await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn event_history_is_drained_and_bounded() {
        let svc = Arc::new(MemoryService::new());
        svc.set_popular(Ok(vec![popular(Species::new(10, "Parus major"))]), Duration::ZERO)
            .await;

        let mut d = driver(&svc);
        d.dispatch(UserAction::Mount);
        d.settle().await;
        for _ in 0..EVENT_HISTORY {
            d.dispatch(UserAction::PickPopular(0));
        }
        d.settle().await;

        assert!(d.dashboard().events().events().is_empty());
        let events = d.take_events();
        assert_eq!(events.len(), EVENT_HISTORY);
        // The selects were pushed out by the timeline responses that followed.
        assert!(events.iter().all(|e| e.kind.starts_with("timeline.")));
        assert_eq!(
            events.iter().filter(|e| e.kind == "timeline.failed").count(),
            1
        );
        assert!(d.take_events().is_empty());
    }
}
