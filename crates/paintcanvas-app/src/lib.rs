//! PaintCanvas host adapter.
//!
//! Wraps a drawing surface for a host application: tracks history
//! notifications, exports the raster as a PNG with the right density and
//! hands it to an uploader. Also replays scripted sessions.

mod panel;
mod session;
mod upload;

pub use panel::{Attachment, PaintPanel, PanelConfig};
pub use session::{Action, Session, SessionReport};
pub use upload::{DirectoryUploader, MemoryUploader, Uploader};

use paintcanvas_dpi::DpiError;
use thiserror::Error;

/// Adapter errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Nothing drawn yet")]
    NothingToUpload,
    #[error("Raster has no pixels")]
    EmptyRaster,
    #[error("PNG encoding error: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("DPI error: {0}")]
    Dpi(#[from] DpiError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session error: {0}")]
    Session(#[from] serde_json::Error),
}

/// Result type for adapter operations.
pub type AppResult<T> = Result<T, AppError>;
