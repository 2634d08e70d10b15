//! Errors surfaced to the host application.
//!
//! Only misconfiguration is reported here. Per-sample numerical edge cases
//! (zero pdf, grazing refraction, depth exhaustion) resolve to sentinel
//! values inside the integrator and never become errors.

use thiserror::Error;

/// Errors that can occur while setting up or driving a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Light sampling is enabled but the scene has no lights")]
    EmptyLights,

    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("No scene has been set on the renderer")]
    SceneNotBuilt,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for renderer setup operations.
pub type RenderResult<T> = Result<T, RenderError>;
