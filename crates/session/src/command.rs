use std::time::Duration;

use catalog::api::Endpoint;
use catalog::error::ApiError;
use catalog::species::{PopularSpecies, Species, SpeciesKey};
use catalog::timeline::TimelineData;
use foundation::token::RequestToken;
use streaming::compositor::TileLoad;
use streaming::image::ImageLoadFailure;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TimerKind {
    SearchDebounce,
    PanelBlurGrace,
}

/// Side effects requested by the dashboard state machines.
///
/// The state never performs I/O itself; an executor runs these and reports
/// back with a [`Completion`] carrying the same token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start (or restart) the timer; a previous one of the same kind is void.
    ArmTimer {
        timer: TimerKind,
        token: RequestToken,
        delay: Duration,
    },
    CancelTimer {
        timer: TimerKind,
    },
    Fetch {
        token: RequestToken,
        endpoint: Endpoint,
    },
    LoadImage(TileLoad),
}

#[derive(Debug, Clone)]
pub enum Completion {
    TimerElapsed {
        timer: TimerKind,
        token: RequestToken,
    },
    Search {
        token: RequestToken,
        query: String,
        result: Result<Vec<Species>, ApiError>,
    },
    Timeline {
        token: RequestToken,
        key: SpeciesKey,
        result: Result<TimelineData, ApiError>,
    },
    PopularSpecies {
        token: RequestToken,
        result: Result<Vec<PopularSpecies>, ApiError>,
    },
    Image {
        load: TileLoad,
        outcome: Result<(), ImageLoadFailure>,
    },
}
