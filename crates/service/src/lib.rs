//! Access to the biodiversity service.
//!
//! [`SpeciesService`] is the seam between the dashboard and the network:
//! [`HttpService`] talks to the real service, [`MemoryService`] serves
//! scripted responses with scripted latency.

pub mod http;
pub mod memory;

use std::future::Future;
use std::pin::Pin;

use catalog::error::ApiError;
use catalog::species::{PopularSpecies, Species, SpeciesKey};
use catalog::timeline::TimelineData;
use streaming::source::TileImageRequest;

pub use http::*;
pub use memory::*;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Client side of the service contract.
///
/// Implementations must be `Send + Sync` so an executor can share one
/// instance across spawned tasks. Methods return boxed futures for
/// dyn-compatibility.
pub trait SpeciesService: Send + Sync {
    /// `GET /species/search?q=<query>`
    fn search_species(&self, query: String) -> BoxFuture<'_, Result<Vec<Species>, ApiError>>;

    /// `GET /species/{key}/timeline?country=<country>`
    fn species_timeline(
        &self,
        key: SpeciesKey,
        country: String,
    ) -> BoxFuture<'_, Result<TimelineData, ApiError>>;

    /// `GET /popular-species`
    fn popular_species(&self) -> BoxFuture<'_, Result<Vec<PopularSpecies>, ApiError>>;

    /// Raw bytes of a map tile image. Not validated as an image here.
    fn tile_image(&self, request: TileImageRequest) -> BoxFuture<'_, Result<Vec<u8>, ApiError>>;
}
