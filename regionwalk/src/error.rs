//! Error type for loading and saving images.
//!
//! The walk itself never fails; everything that can go wrong happens at the file boundary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The file could not be opened, created or written (missing, permission denied, ...)
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file was read but is not a raster image the decoder understands
    #[error("could not decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    /// The encoder rejected the canvas
    #[error("could not encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
