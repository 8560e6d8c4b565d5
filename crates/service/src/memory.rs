use std::collections::HashMap;
use std::time::Duration;

use catalog::api::Endpoint;
use catalog::error::ApiError;
use catalog::species::{PopularSpecies, Species, SpeciesKey};
use catalog::timeline::TimelineData;
use streaming::source::TileImageRequest;
use tokio::sync::{Mutex, RwLock};

use crate::{BoxFuture, SpeciesService};

#[derive(Debug, Clone)]
struct Scripted<T> {
    result: Result<T, ApiError>,
    latency: Duration,
}

impl<T: Clone> Scripted<T> {
    async fn play(&self) -> Result<T, ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.result.clone()
    }
}

/// In-memory service with scripted responses and latency.
///
/// Unscripted searches and the popular list answer with empty lists;
/// unscripted timelines and tiles answer `404`. Every call is recorded in
/// [`MemoryService::calls`] as the path it would have requested.
#[derive(Debug, Default)]
pub struct MemoryService {
    searches: RwLock<HashMap<String, Scripted<Vec<Species>>>>,
    timelines: RwLock<HashMap<SpeciesKey, Scripted<TimelineData>>>,
    popular: RwLock<Option<Scripted<Vec<PopularSpecies>>>>,
    tiles: RwLock<HashMap<String, Scripted<Vec<u8>>>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_search(
        &self,
        query: impl Into<String>,
        result: Result<Vec<Species>, ApiError>,
        latency: Duration,
    ) {
        self.searches
            .write()
            .await
            .insert(query.into(), Scripted { result, latency });
    }

    pub async fn set_timeline(
        &self,
        key: SpeciesKey,
        result: Result<TimelineData, ApiError>,
        latency: Duration,
    ) {
        self.timelines
            .write()
            .await
            .insert(key, Scripted { result, latency });
    }

    pub async fn set_popular(&self, result: Result<Vec<PopularSpecies>, ApiError>, latency: Duration) {
        *self.popular.write().await = Some(Scripted { result, latency });
    }

    /// Scripts the response for one tile URL, as rendered by
    /// `TileImageRequest`'s `Display` (e.g. `/map/tile/6/70/13`).
    pub async fn set_tile(
        &self,
        url: impl Into<String>,
        result: Result<Vec<u8>, ApiError>,
        latency: Duration,
    ) {
        self.tiles
            .write()
            .await
            .insert(url.into(), Scripted { result, latency });
    }

    /// Every request made so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Number of recorded requests whose URL starts with `prefix`.
    pub async fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    async fn record(&self, url: String) {
        self.calls.lock().await.push(url);
    }
}

impl SpeciesService for MemoryService {
    fn search_species(&self, query: String) -> BoxFuture<'_, Result<Vec<Species>, ApiError>> {
        Box::pin(async move {
            self.record(Endpoint::SearchSpecies { query: query.clone() }.to_string())
                .await;
            let scripted = self.searches.read().await.get(&query).cloned();
            match scripted {
                Some(s) => s.play().await,
                None => Ok(Vec::new()),
            }
        })
    }

    fn species_timeline(
        &self,
        key: SpeciesKey,
        country: String,
    ) -> BoxFuture<'_, Result<TimelineData, ApiError>> {
        Box::pin(async move {
            let endpoint = Endpoint::SpeciesTimeline { key, country };
            self.record(endpoint.to_string()).await;
            let scripted = self.timelines.read().await.get(&key).cloned();
            match scripted {
                Some(s) => s.play().await,
                None => Err(ApiError::status(404, endpoint.failure_message())),
            }
        })
    }

    fn popular_species(&self) -> BoxFuture<'_, Result<Vec<PopularSpecies>, ApiError>> {
        Box::pin(async move {
            self.record(Endpoint::PopularSpecies.to_string()).await;
            let scripted = self.popular.read().await.clone();
            match scripted {
                Some(s) => s.play().await,
                None => Ok(Vec::new()),
            }
        })
    }

    fn tile_image(&self, request: TileImageRequest) -> BoxFuture<'_, Result<Vec<u8>, ApiError>> {
        Box::pin(async move {
            let url = request.to_string();
            self.record(url.clone()).await;
            let scripted = self.tiles.read().await.get(&url).cloned();
            match scripted {
                Some(s) => s.play().await,
                None => Err(ApiError::status(404, "Failed to fetch map tile")),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryService;
    use crate::SpeciesService;
    use catalog::error::ApiErrorKind;
    use catalog::species::{Species, SpeciesKey};
    use std::time::Duration;

    #[tokio::test]
    async fn serves_scripted_and_default_responses() {
        let svc = MemoryService::new();
        svc.set_search("passer", Ok(vec![Species::new(1, "Passer")]), Duration::ZERO)
            .await;

        assert_eq!(svc.search_species("passer".into()).await.map(|r| r.len()), Ok(1));
        assert_eq!(svc.search_species("other".into()).await.map(|r| r.len()), Ok(0));

        let err = svc
            .species_timeline(SpeciesKey(5), "PL".into())
            .await
            .expect_err("unscripted timeline");
        assert_eq!(err.kind, ApiErrorKind::Status(404));

        assert_eq!(
            svc.calls().await,
            vec![
                "/species/search?q=passer".to_string(),
                "/species/search?q=other".to_string(),
                "/species/5/timeline?country=PL".to_string(),
            ]
        );
        assert_eq!(svc.call_count("/species/search").await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_applied() {
        let svc = MemoryService::new();
        svc.set_search("slow", Ok(Vec::new()), Duration::from_secs(5))
            .await;
        let start = tokio::time::Instant::now();
        svc.search_species("slow".into()).await.expect("search");
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
