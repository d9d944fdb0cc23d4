//! PNG encoding of image resources.

use crate::error::{PackageError, Result};
use fairypack_core::RasterImage;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Encode raw RGBA pixels as a PNG file.
pub fn encode_png(raster: &RasterImage) -> Result<Vec<u8>> {
    let image = RgbaImage::from_raw(raster.width, raster.height, raster.pixels.clone())
        .filter(|_| raster.is_well_formed())
        .ok_or_else(|| {
            PackageError::InvalidData(format!(
                "pixel buffer of {} bytes does not match {}x{} RGBA",
                raster.pixels.len(),
                raster.width,
                raster.height
            ))
        })?;

    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageFormat::Png)?;
    Ok(cursor.into_inner())
}
