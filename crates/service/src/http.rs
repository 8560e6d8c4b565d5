use std::time::Duration;

use catalog::api::{Endpoint, PopularSpeciesResponse, SearchResponse};
use catalog::error::ApiError;
use catalog::species::{PopularSpecies, Species, SpeciesKey};
use catalog::timeline::TimelineData;
use serde::de::DeserializeOwned;
use streaming::source::TileImageRequest;
use tracing::{debug, warn};

use crate::{BoxFuture, SpeciesService};

/// The real biodiversity service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Like [`HttpService::new`] with a per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport("failed to build HTTP client").with_source(e))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        failure: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::transport(failure).with_source(e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "service returned an error status");
            return Err(ApiError::status(status.as_u16(), failure));
        }
        Ok(resp)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ApiError> {
        let failure = endpoint.failure_message();
        let resp = self
            .get(&endpoint.path(), &endpoint.query(), failure)
            .await?;
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::decode(failure).with_source(e))
    }
}

impl SpeciesService for HttpService {
    fn search_species(&self, query: String) -> BoxFuture<'_, Result<Vec<Species>, ApiError>> {
        Box::pin(async move {
            let endpoint = Endpoint::SearchSpecies { query };
            let body: SearchResponse = self.get_json(&endpoint).await?;
            Ok(body.results)
        })
    }

    fn species_timeline(
        &self,
        key: SpeciesKey,
        country: String,
    ) -> BoxFuture<'_, Result<TimelineData, ApiError>> {
        Box::pin(async move {
            let endpoint = Endpoint::SpeciesTimeline { key, country };
            self.get_json(&endpoint).await
        })
    }

    fn popular_species(&self) -> BoxFuture<'_, Result<Vec<PopularSpecies>, ApiError>> {
        Box::pin(async move {
            let body: PopularSpeciesResponse = self.get_json(&Endpoint::PopularSpecies).await?;
            Ok(body.species)
        })
    }

    fn tile_image(&self, request: TileImageRequest) -> BoxFuture<'_, Result<Vec<u8>, ApiError>> {
        Box::pin(async move {
            let failure = "Failed to fetch map tile";
            let resp = self
                .get(&request.path(), &request.source.query(), failure)
                .await?;
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| ApiError::transport(failure).with_source(e))?;
            Ok(bytes.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HttpService;
    use crate::SpeciesService;
    use catalog::error::ApiErrorKind;
    use catalog::species::SpeciesKey;
    use serde_json::json;
    use streaming::source::{TileImageRequest, TileLayer, TileSource};
    use streaming::tile::TileCoord;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_decodes_results_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/species/search"))
            .and(query_param("q", "house sparrow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"key": 2492010, "scientificName": "Passer domesticus", "vernacularName": "House Sparrow"}
                ]
            })))
            .mount(&server)
            .await;

        let svc = HttpService::new(format!("{}/api/", server.uri()));
        let results = svc
            .search_species("house sparrow".into())
            .await
            .expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].display_name(), "House Sparrow");
    }

    #[tokio::test]
    async fn timeline_sends_country() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/species/2492010/timeline"))
            .and(query_param("country", "PL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "yearly": [{"year": 2020, "count": 3}],
                "monthly": [],
                "total_observations": 3,
                "date_range": {"earliest": 2020, "latest": 2020}
            })))
            .mount(&server)
            .await;

        let svc = HttpService::new(server.uri());
        let t = svc
            .species_timeline(SpeciesKey(2492010), "PL".into())
            .await
            .expect("timeline");
        assert_eq!(t.total_observations, 3);
    }

    #[tokio::test]
    async fn error_status_maps_to_endpoint_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/species/1/timeline"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let svc = HttpService::new(server.uri());
        let err = svc
            .species_timeline(SpeciesKey(1), "PL".into())
            .await
            .expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Status(500));
        assert_eq!(err.to_string(), "Failed to fetch timeline data");
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/popular-species"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let svc = HttpService::new(server.uri());
        let err = svc.popular_species().await.expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn tile_image_uses_dataset_key_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/map/tile/6/70/13"))
            .and(query_param("dataset_key", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG\r\n\x1a\n".to_vec()))
            .mount(&server)
            .await;

        let svc = HttpService::new(server.uri());
        let bytes = svc
            .tile_image(TileImageRequest {
                coord: TileCoord::new(6, 70, 13),
                layer: TileLayer::Base,
                source: TileSource::FilteredBase {
                    dataset_key: "abc".into(),
                },
            })
            .await
            .expect("tile");
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let svc = HttpService::new("http://127.0.0.1:9");
        let err = svc.popular_species().await.expect_err("should fail");
        assert_eq!(err.kind, ApiErrorKind::Transport);
        assert_eq!(err.to_string(), "Failed to fetch popular species");
    }
}
