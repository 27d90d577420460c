use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use image::{
    codecs::jpeg::JpegEncoder, ColorType, DynamicImage, ImageError, Pixel, RgbImage, RgbaImage,
};

use crate::{Error, Result};

/// Quality used when nothing else is asked for
pub const DEFAULT_QUALITY: u8 = 75;

/// Decode the image at `path`, in any format the `image` crate was built with
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();

    image::open(path).map_err(|source| match source {
        ImageError::IoError(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        source => Error::Decode {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Encode the canvas as a JPEG at `path`. JPEG has no alpha, transparent pixels come out black.
pub fn save_jpeg<P: AsRef<Path>>(canvas: &RgbaImage, path: P, quality: u8) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let flat = RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        canvas.get_pixel(x, y).to_rgb()
    });

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode(flat.as_raw(), flat.width(), flat.height(), ColorType::Rgb8)
        .map_err(|source| Error::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    writer.flush().map_err(io_error)
}
