/// Load lifecycle of one image layer of one tile.
///
/// ```text
/// Loading → Loaded
///         → Failed                       (no fallback: renders nothing)
///         → FallbackLoading → FallbackLoaded
///                           → FallbackFailed
/// ```
///
/// A layer substitutes its fallback at most once; a failed fallback is
/// terminal.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LayerState {
    #[default]
    Loading,
    Loaded,
    Failed,
    FallbackLoading,
    FallbackLoaded,
    FallbackFailed,
}

/// What a layer should do after a load attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerTransition {
    /// Nothing further to load.
    Settled,
    /// Fetch the fallback image now.
    LoadFallback,
    /// The result did not apply to the current state and was ignored.
    Ignored,
}

impl LayerState {
    pub fn on_loaded(&mut self) -> LayerTransition {
        match *self {
            LayerState::Loading => *self = LayerState::Loaded,
            LayerState::FallbackLoading => *self = LayerState::FallbackLoaded,
            _ => return LayerTransition::Ignored,
        }
        LayerTransition::Settled
    }

    pub fn on_failed(&mut self, has_fallback: bool) -> LayerTransition {
        match *self {
            LayerState::Loading if has_fallback => {
                *self = LayerState::FallbackLoading;
                LayerTransition::LoadFallback
            }
            LayerState::Loading => {
                *self = LayerState::Failed;
                LayerTransition::Settled
            }
            LayerState::FallbackLoading => {
                *self = LayerState::FallbackFailed;
                LayerTransition::Settled
            }
            _ => LayerTransition::Ignored,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, LayerState::Loading | LayerState::FallbackLoading)
    }

    /// Whether the primary image failed and the layer degraded.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, LayerState::Loading | LayerState::Loaded)
    }

    pub fn has_image(&self) -> bool {
        matches!(self, LayerState::Loaded | LayerState::FallbackLoaded)
    }
}
