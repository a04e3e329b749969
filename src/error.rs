//! Error types shared by the session model and the I/O helpers

use std::path::PathBuf;

/// Everything that can go wrong while browsing, masking or saving images
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error outside of a specific decode/save/delete step
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An image processing error (encode, resample)
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The image at `path` could not be opened or decoded
    #[error("Failed to load image: {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Writing the masked PNG failed
    #[error("Failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Removing the file from disk failed
    #[error("Could not delete file {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings JSON could not be parsed or produced
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// A mask color string that is not `#RRGGBB` or `#RRGGBBAA`
    #[error("invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    /// Navigation or deletion on an empty image set
    #[error("No images loaded.")]
    Empty,

    /// A background load failed; carries the user-facing message
    #[error("{0}")]
    Load(String),

    /// A folder or dropped list had no supported images
    #[error("No valid images found in the {0}.")]
    NoImagesFound(&'static str),

    /// A flush was needed but the user declined to pick an output folder
    #[error("Output folder not set. Cannot save modified image.")]
    OutputFolderNotSet,

    /// Delete was requested while safe mode is on
    #[error("Safe Mode is enabled. Delete operations are disabled.")]
    SafeMode,

    /// An operation that needs a decoded image ran without one
    #[error("Please load an image first.")]
    NoImage,

    /// A background task panicked or was cancelled
    #[error("task join error: {0}")]
    Task(String),
}

impl Error {
    /// Mistakes the user can fix, as opposed to failures
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Error::Empty
                | Error::NoImage
                | Error::NoImagesFound(_)
                | Error::OutputFolderNotSet
                | Error::InvalidColor(_)
                | Error::SafeMode
        )
    }
}

/// A specialized `Result` type for this crate
pub type Result<T> = std::result::Result<T, Error>;
