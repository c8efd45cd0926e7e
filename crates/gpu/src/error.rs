use crate::renderer::RendererState;

/// Recoverable renderer failures. None of these leave the renderer in a
/// broken state; callers log and carry on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("no point clouds to frame")]
    NoGeometryToFrame,
    #[error("`{operation}` needs an active renderer, current state is {state:?}")]
    NotActive {
        operation: &'static str,
        state: RendererState,
    },
    #[error("renderer was already initialized")]
    AlreadyInitialized,
    #[error("invalid point size {size}")]
    InvalidPointSize { size: f64 },
    #[error("altitude range [{min}, {max}] must be ordered and within ±{limit}")]
    InvalidAltitudeRange { min: f64, max: f64, limit: f64 },
}
