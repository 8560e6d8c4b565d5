use catalog::species::Species;
use foundation::token::{RequestToken, TokenIssuer};

use crate::image::ImageLoadFailure;
use crate::residency::{LayerState, LayerTransition};
use crate::source::{TileImageRequest, TileLayer, TileSource};
use crate::tile::{TileCoord, TileGrid};

/// Why the map shows a placeholder instead of tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placeholder {
    NothingSelected,
    NoDatasetKey,
}

impl Placeholder {
    pub fn message(&self) -> &'static str {
        match self {
            Placeholder::NothingSelected => "Select a species to view observation locations",
            Placeholder::NoDatasetKey => "No dataset key available for this species",
        }
    }
}

/// One cell of the mosaic: a base image with the density overlay on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeTile {
    pub coord: TileCoord,
    pub base: LayerState,
    pub overlay: LayerState,
}

impl CompositeTile {
    fn new(coord: TileCoord) -> Self {
        Self {
            coord,
            base: LayerState::Loading,
            overlay: LayerState::Loading,
        }
    }

    /// The base image failed once, so the cell gets a neutral background.
    pub fn neutral_fill(&self) -> bool {
        self.base.is_degraded()
    }

    pub fn is_settled(&self) -> bool {
        self.base.is_settled() && self.overlay.is_settled()
    }

    fn layer_mut(&mut self, layer: TileLayer) -> &mut LayerState {
        match layer {
            TileLayer::Base => &mut self.base,
            TileLayer::Overlay => &mut self.overlay,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mosaic {
    pub dataset_key: String,
    pub zoom: u8,
    pub columns: usize,
    pub epoch: RequestToken,
    pub tiles: Vec<CompositeTile>,
}

impl Mosaic {
    pub fn settled_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_settled()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.tiles.iter().all(CompositeTile::is_settled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapView {
    Placeholder(Placeholder),
    Mosaic(Mosaic),
}

/// An image load tagged with the mosaic it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLoad {
    pub epoch: RequestToken,
    pub request: TileImageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MosaicUpdate {
    /// The result belongs to a mosaic (or a load stage) that is gone.
    Stale,
    Settled,
    Fallback(TileLoad),
}

/// Builds the two-layer tile mosaic for the selected species.
///
/// Each (tile, layer) pair runs its own [`LayerState`] machine. Only the base
/// layer has a fallback (the unfiltered base tile); a failed overlay simply
/// leaves the base showing through.
#[derive(Debug)]
pub struct MapTileCompositor {
    grid: TileGrid,
    epochs: TokenIssuer,
    view: MapView,
}

impl MapTileCompositor {
    pub fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            epochs: TokenIssuer::new(),
            view: MapView::Placeholder(Placeholder::NothingSelected),
        }
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn mosaic(&self) -> Option<&Mosaic> {
        match &self.view {
            MapView::Mosaic(m) => Some(m),
            MapView::Placeholder(_) => None,
        }
    }

    /// Points the map at `species` and returns the image loads to start.
    ///
    /// Showing the dataset key that is already on screen keeps the current
    /// mosaic and returns no loads.
    pub fn show(&mut self, species: Option<&Species>) -> Vec<TileLoad> {
        let placeholder = match species {
            None => Some(Placeholder::NothingSelected),
            Some(s) if !s.has_dataset_key() => Some(Placeholder::NoDatasetKey),
            Some(_) => None,
        };
        if let Some(p) = placeholder {
            self.epochs.invalidate();
            self.view = MapView::Placeholder(p);
            return Vec::new();
        }

        let Some(species) = species else {
            return Vec::new();
        };
        if self
            .mosaic()
            .is_some_and(|m| m.dataset_key == species.dataset_key)
        {
            return Vec::new();
        }

        let epoch = self.epochs.issue();
        let dataset_key = species.dataset_key.clone();
        let coords = self.grid.coords();
        let mut loads = Vec::with_capacity(coords.len() * 2);
        for &coord in &coords {
            loads.push(TileLoad {
                epoch,
                request: TileImageRequest {
                    coord,
                    layer: TileLayer::Base,
                    source: TileSource::FilteredBase {
                        dataset_key: dataset_key.clone(),
                    },
                },
            });
            loads.push(TileLoad {
                epoch,
                request: TileImageRequest {
                    coord,
                    layer: TileLayer::Overlay,
                    source: TileSource::DensityOverlay {
                        dataset_key: dataset_key.clone(),
                    },
                },
            });
        }

        self.view = MapView::Mosaic(Mosaic {
            dataset_key,
            zoom: self.grid.zoom(),
            columns: self.grid.columns(),
            epoch,
            tiles: coords.into_iter().map(CompositeTile::new).collect(),
        });
        loads
    }

    /// Applies the outcome of an image load.
    pub fn on_image(
        &mut self,
        epoch: RequestToken,
        request: &TileImageRequest,
        outcome: Result<(), ImageLoadFailure>,
    ) -> MosaicUpdate {
        if !self.epochs.is_current(epoch) {
            return MosaicUpdate::Stale;
        }
        let MapView::Mosaic(mosaic) = &mut self.view else {
            return MosaicUpdate::Stale;
        };
        let Some(tile) = mosaic.tiles.iter_mut().find(|t| t.coord == request.coord) else {
            return MosaicUpdate::Stale;
        };

        let state = tile.layer_mut(request.layer);
        let is_fallback = matches!(request.source, TileSource::UnfilteredBase);
        let expected = if is_fallback {
            LayerState::FallbackLoading
        } else {
            LayerState::Loading
        };
        if *state != expected {
            return MosaicUpdate::Stale;
        }

        let has_fallback = request.layer == TileLayer::Base;
        let transition = match outcome {
            Ok(()) => state.on_loaded(),
            Err(_) => state.on_failed(has_fallback),
        };
        match transition {
            LayerTransition::Settled => MosaicUpdate::Settled,
            LayerTransition::Ignored => MosaicUpdate::Stale,
            LayerTransition::LoadFallback => MosaicUpdate::Fallback(TileLoad {
                epoch,
                request: TileImageRequest {
                    coord: request.coord,
                    layer: TileLayer::Base,
                    source: TileSource::UnfilteredBase,
                },
            }),
        }
    }
}

impl Default for MapTileCompositor {
    fn default() -> Self {
        Self::new(TileGrid::default())
    }
}
