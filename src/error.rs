use thiserror::Error;

/// Per-card failures while resolving an image. None of these abort the run:
/// the card is logged and omitted, and layout continues with the rest of the
/// sheet.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not find card: {name}")]
    NotFound { name: String },
    #[error("image download failed for {name}: {reason}")]
    Download { name: String, reason: String },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to produce the output document. Fatal: the run aborts with a
/// non-zero exit and no cleanup of partial output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("pdf error: {0}")]
    Pdf(String),
}
