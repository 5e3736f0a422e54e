use std::path::Path;

use crate::AssetError;

/// RGBA8 pixels ready for upload. Row 0 is the bottom row of the image.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// A single-color image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Number of levels in a full mip chain down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        32 - self.width.max(self.height).max(1).leading_zeros()
    }
}

/// Decode an image file, forcing four channels.
///
/// The rows are flipped so texture coordinate `v = 0` samples the bottom of
/// the picture.
pub fn decode_rgba(path: impl AsRef<Path>) -> Result<DecodedImage, AssetError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }

    let decoded = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rgba = decoded.to_rgba8();
    image::imageops::flip_vertical_in_place(&mut rgba);
    let (width, height) = rgba.dimensions();

    tracing::debug!("decoded {} ({width}x{height} -> RGBA)", path.display());

    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}
