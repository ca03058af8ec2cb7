// Error taxonomy for the renderer.
//
// Failures are detected once and surfaced to the caller; there are no
// retries anywhere in the core. Load and geometry problems abort before
// any rendering starts, per-frame write failures are reported by the
// worker that hit them.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Missing or malformed field container (absent named value, wrong
    // sample count, bad manifest)
    #[error("field container: {0}")]
    Field(String),

    #[error("i/o on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Zero-length direction or rotation axis, out-of-range vision angle.
    // Rejected eagerly so NaNs never reach the projection loop.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    // The reference frame accumulated no positive intensity: the
    // configured camera sees no part of the field.
    #[error("maximum value of reference image is {0:e}")]
    NoVisibleSignal(f64),

    #[error("frame encode/write: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
