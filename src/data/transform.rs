// ============================================================
// Layer 4 — Image Transform
// ============================================================
// Loads one image from disk and prepares it for the model:
//
//   1. Decode (PNG/JPEG) and convert to 8-bit RGB
//   2. Resize so the SHORTER edge equals `size` (224 by default),
//      keeping aspect ratio: long' = floor(size * long / short)
//   3. Lay pixels out channel-first (CHW) as f32 in [0, 1]
//
// CHW is what Burn's Conv2d expects: [batch, channels, height, width].

use anyhow::{ensure, Context, Result};
use image::imageops::{self, FilterType};
use std::path::Path;

pub const DEFAULT_IMAGE_SIZE: u32 = 224;

/// A decoded, resized image in CHW order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedImage {
    pub height: usize,
    pub width:  usize,
    /// `3 * height * width` values, channel-major
    pub chw:    Vec<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageTransform {
    size: u32,
}

impl ImageTransform {
    pub fn new(size: u32) -> Self {
        assert!(size > 0, "image size must be positive");
        Self { size }
    }

    /// Open `path` and run the full pipeline.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<TransformedImage> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("Cannot open image '{}'", path.display()))?;
        self.apply(decoded.to_rgb8())
    }

    /// Resize and convert an already-decoded RGB image.
    pub fn apply(&self, rgb: image::RgbImage) -> Result<TransformedImage> {
        let (w, h) = rgb.dimensions();
        ensure!(w > 0 && h > 0, "cannot transform an empty image");

        let (new_w, new_h) = self.target_dims(w, h);
        let resized = if (new_w, new_h) == (w, h) {
            rgb
        } else {
            imageops::resize(&rgb, new_w, new_h, FilterType::Triangle)
        };

        Ok(to_chw(&resized))
    }

    /// Shorter edge → `size`, longer edge scaled and truncated.
    pub fn target_dims(&self, w: u32, h: u32) -> (u32, u32) {
        let size = u64::from(self.size);
        if w <= h {
            let long = (size * u64::from(h) / u64::from(w)) as u32;
            (self.size, long)
        } else {
            let long = (size * u64::from(w) / u64::from(h)) as u32;
            (long, self.size)
        }
    }
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_SIZE)
    }
}

/// HWC u8 → CHW f32 / 255
fn to_chw(rgb: &image::RgbImage) -> TransformedImage {
    let (w, h) = rgb.dimensions();
    let (w, h) = (w as usize, h as usize);
    let plane  = w * h;
    let mut chw = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let offset = y as usize * w + x as usize;
        for c in 0..3 {
            chw[c * plane + offset] = f32::from(pixel[c]) / 255.0;
        }
    }

    TransformedImage { height: h, width: w, chw }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_target_dims_keep_aspect() {
        let t = ImageTransform::new(224);
        assert_eq!(t.target_dims(448, 448), (224, 224));
        assert_eq!(t.target_dims(300, 600), (224, 448));
        // 224 * 500 / 300 = 373.33 → truncated
        assert_eq!(t.target_dims(500, 300), (373, 224));
    }

    #[test]
    fn test_chw_layout_and_scaling() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, Rgb([255, 0, 51]));

        let out = ImageTransform::new(2).apply(img).unwrap();
        assert_eq!((out.height, out.width), (2, 2));
        assert_eq!(out.chw.len(), 12);

        // pixel (x=1, y=0) is offset 1 in each 4-value plane
        assert_eq!(out.chw[1], 1.0);
        assert_eq!(out.chw[4 + 1], 0.0);
        assert!((out.chw[8 + 1] - 0.2).abs() < 1e-6);
        assert!(out.chw.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_load_resizes_from_disk() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join("img_D01.png");
        RgbImage::from_pixel(40, 20, Rgb([10, 20, 30])).save(&path).unwrap();

        let out = ImageTransform::new(8).load(&path).unwrap();
        assert_eq!((out.height, out.width), (8, 16));
        assert_eq!(out.chw.len(), 3 * 8 * 16);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(ImageTransform::default().load("/definitely/not/here.png").is_err());
    }
}
