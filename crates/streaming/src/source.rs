use crate::tile::TileCoord;

/// The two stacked image layers of a map tile, back to front.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TileLayer {
    Base,
    Overlay,
}

/// Which image endpoint a tile layer is drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TileSource {
    /// `/map/tile/{z}/{x}/{y}?dataset_key=<key>`
    FilteredBase { dataset_key: String },
    /// `/map/tile/{z}/{x}/{y}`, the fallback for a failed filtered base.
    UnfilteredBase,
    /// `/map/{z}/{x}/{y}?dataset_key=<key>`
    DensityOverlay { dataset_key: String },
}

impl TileSource {
    pub fn path(&self, coord: TileCoord) -> String {
        match self {
            TileSource::FilteredBase { .. } | TileSource::UnfilteredBase => {
                format!("/map/tile/{coord}")
            }
            TileSource::DensityOverlay { .. } => format!("/map/{coord}"),
        }
    }

    /// Query parameters, unencoded.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            TileSource::FilteredBase { dataset_key } | TileSource::DensityOverlay { dataset_key } => {
                vec![("dataset_key", dataset_key.clone())]
            }
            TileSource::UnfilteredBase => Vec::new(),
        }
    }
}

/// One image the compositor wants loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileImageRequest {
    pub coord: TileCoord,
    pub layer: TileLayer,
    pub source: TileSource,
}

impl TileImageRequest {
    pub fn path(&self) -> String {
        self.source.path(self.coord)
    }
}

impl std::fmt::Display for TileImageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())?;
        for (k, v) in self.source.query() {
            write!(f, "?{k}={v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{TileImageRequest, TileLayer, TileSource};
    use crate::tile::TileCoord;

    #[test]
    fn urls_match_the_service_contract() {
        let coord = TileCoord::new(6, 70, 13);
        let key = "50c9509d".to_string();

        let base = TileImageRequest {
            coord,
            layer: TileLayer::Base,
            source: TileSource::FilteredBase {
                dataset_key: key.clone(),
            },
        };
        assert_eq!(base.to_string(), "/map/tile/6/70/13?dataset_key=50c9509d");

        let fallback = TileImageRequest {
            source: TileSource::UnfilteredBase,
            ..base
        };
        assert_eq!(fallback.to_string(), "/map/tile/6/70/13");

        let overlay = TileImageRequest {
            coord,
            layer: TileLayer::Overlay,
            source: TileSource::DensityOverlay { dataset_key: key },
        };
        assert_eq!(overlay.to_string(), "/map/6/70/13?dataset_key=50c9509d");
    }
}
