//! Avatar fetching and circular masking.
//!
//! Any fetch or decode failure is recovered by substituting a generated
//! default avatar; the overall render never fails because of an avatar.
//! Output is always exactly the requested square size with full
//! transparency outside the circle.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut};
use tracing::{debug, warn};

use crate::fetch::ImageFetcher;

/// Crops, scales, and masks avatar images to a fixed circular size.
#[derive(Debug, Clone, Copy)]
pub struct AvatarProcessor {
    size: u32,
}

impl AvatarProcessor {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    /// Load and mask the avatar at `url`. Falls back to the default avatar
    /// on empty URL, fetch failure, or decode failure.
    pub fn load(&self, url: &str, fetcher: &dyn ImageFetcher) -> RgbaImage {
        let source = self.fetch_source(url, fetcher);
        let square = match source {
            Some(img) => self.square_crop(img),
            None => self.default_avatar(),
        };
        self.circular_mask(square)
    }

    fn fetch_source(&self, url: &str, fetcher: &dyn ImageFetcher) -> Option<DynamicImage> {
        if url.is_empty() {
            debug!("No avatar URL, using default avatar");
            return None;
        }
        let bytes = match fetcher.fetch(url) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(url = %url, error = %e.format_for_log(), "Avatar fetch failed, using default");
                return None;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(img) if img.width() > 0 && img.height() > 0 => Some(img),
            Ok(_) => {
                warn!(url = %url, "Avatar image has zero dimension, using default");
                None
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Avatar decode failed, using default");
                None
            }
        }
    }

    /// Center-crop to a square, then scale to the target size. Crop first so
    /// non-square sources are never distorted.
    fn square_crop(&self, img: DynamicImage) -> RgbaImage {
        let (w, h) = img.dimensions();
        let side = w.min(h);
        let x = (w - side) / 2;
        let y = (h - side) / 2;
        let cropped = img.crop_imm(x, y, side, side).to_rgba8();
        image::imageops::resize(&cropped, self.size, self.size, FilterType::Lanczos3)
    }

    /// Flat placeholder silhouette, generated rather than shipped so it is
    /// always available and always matches the requested size.
    fn default_avatar(&self) -> RgbaImage {
        let s = self.size as i32;
        let mut img = RgbaImage::from_pixel(self.size, self.size, Rgba([58, 61, 63, 255]));
        let silhouette = Rgba([136, 140, 142, 255]);
        // head
        draw_filled_circle_mut(&mut img, (s / 2, s * 2 / 5), s / 6, silhouette);
        // shoulders
        draw_filled_ellipse_mut(
            &mut img,
            (s / 2, s - s / 8),
            s * 3 / 8,
            s / 4,
            silhouette,
        );
        img
    }

    /// Zero the alpha channel outside the inscribed circle, with a one-pixel
    /// soft edge.
    fn circular_mask(&self, mut img: RgbaImage) -> RgbaImage {
        let radius = self.size as f32 / 2.0;
        let center = radius - 0.5;
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let dist = (dx * dx + dy * dy).sqrt();
            let coverage = (radius - dist + 0.5).clamp(0.0, 1.0);
            pixel[3] = (pixel[3] as f32 * coverage) as u8;
        }
        img
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use std::io::Cursor;

    struct FailingFetcher;

    impl ImageFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            Err(Error::fetch_failed(url, "connection refused"))
        }
    }

    struct StaticFetcher(Vec<u8>);

    impl ImageFetcher for StaticFetcher {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 50, 50, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_fallback_on_fetch_failure() {
        let processor = AvatarProcessor::new(64);
        let avatar = processor.load("https://example.com/a.png", &FailingFetcher);
        assert_eq!(avatar.dimensions(), (64, 64));
    }

    #[test]
    fn test_fallback_on_decode_failure() {
        let processor = AvatarProcessor::new(48);
        let avatar = processor.load(
            "https://example.com/a.png",
            &StaticFetcher(b"not an image".to_vec()),
        );
        assert_eq!(avatar.dimensions(), (48, 48));
    }

    #[test]
    fn test_exact_size_for_non_square_source() {
        let processor = AvatarProcessor::new(50);
        let avatar = processor.load("https://example.com/a.png", &StaticFetcher(png_bytes(300, 120)));
        assert_eq!(avatar.dimensions(), (50, 50));
    }

    #[test]
    fn test_corners_fully_transparent() {
        let processor = AvatarProcessor::new(64);
        let avatar = processor.load("https://example.com/a.png", &StaticFetcher(png_bytes(64, 64)));
        assert_eq!(avatar.get_pixel(0, 0)[3], 0);
        assert_eq!(avatar.get_pixel(63, 0)[3], 0);
        assert_eq!(avatar.get_pixel(0, 63)[3], 0);
        assert_eq!(avatar.get_pixel(63, 63)[3], 0);
        // center remains opaque
        assert_eq!(avatar.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn test_empty_url_skips_fetch() {
        struct PanicFetcher;
        impl ImageFetcher for PanicFetcher {
            fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
                panic!("fetch must not be called for empty URL");
            }
        }
        let processor = AvatarProcessor::new(32);
        let avatar = processor.load("", &PanicFetcher);
        assert_eq!(avatar.dimensions(), (32, 32));
    }
}
