//! Turning request bytes into the input tensor the face classifier expects

use crate::config::PreprocessSettings;
use image::imageops::{self, FilterType};
use image::RgbImage;
use tch::{Kind, Tensor};
use thiserror::Error;

/// The request bytes could not be decoded as an image
#[derive(Debug, Error)]
#[error("invalid image file: {0}")]
pub struct InvalidImage(#[from] image::ImageError);

/// Decode an encoded image (any format the `image` crate recognizes) and
/// flatten it to 8-bit RGB, dropping alpha and palette modes
pub fn decode(bytes: &[u8]) -> Result<RgbImage, InvalidImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

/// Resizes and normalizes decoded images. The geometry and channel statistics
/// must match the ones the deployed weights were trained with
#[derive(Debug, Clone)]
pub struct Preprocessor {
    width: u32,
    height: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl From<&PreprocessSettings> for Preprocessor {
    fn from(settings: &PreprocessSettings) -> Self {
        Preprocessor {
            width: settings.width,
            height: settings.height,
            mean: settings.mean,
            std: settings.std,
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        (&PreprocessSettings::default()).into()
    }
}

impl Preprocessor {
    /// Produce a `[1, 3, height, width]` float tensor: bilinear resize, scale
    /// to `[0, 1]`, then `(x - mean) / std` per channel
    pub fn to_tensor(&self, image: &RgbImage) -> Tensor {
        let resized = imageops::resize(image, self.width, self.height, FilterType::Triangle);
        let (width, height) = (self.width as i64, self.height as i64);

        // HWC bytes -> CHW floats
        let pixels = Tensor::from_slice(resized.as_raw())
            .view([height, width, 3])
            .permute([2, 0, 1])
            .to_kind(Kind::Float)
            / 255.;

        let mean = Tensor::from_slice(&self.mean).view([3, 1, 1]);
        let std = Tensor::from_slice(&self.std).view([3, 1, 1]);

        ((pixels - mean) / std).unsqueeze(0)
    }

    #[cfg(test)]
    pub fn input_shape(&self) -> [i64; 4] {
        [1, 3, self.height as i64, self.width as i64]
    }
}
