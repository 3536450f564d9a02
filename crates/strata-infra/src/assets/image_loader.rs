// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Image decoding for terrain textures.

use anyhow::Context;
use image::{ImageFormat, ImageReader};
use std::path::Path;
use strata_core::renderer::api::{CpuTexture, ImageFormatHint, TextureFormat};
use strata_core::renderer::TextureLoader;

/// A [`TextureLoader`] that decodes files with the `image` crate and converts
/// them to tightly packed RGBA8.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTextureLoader;

impl ImageTextureLoader {
    /// Creates a new loader.
    pub fn new() -> Self {
        Self
    }
}

fn image_format(hint: ImageFormatHint) -> Option<ImageFormat> {
    match hint {
        ImageFormatHint::Auto => None,
        ImageFormatHint::Png => Some(ImageFormat::Png),
        ImageFormatHint::Jpeg => Some(ImageFormat::Jpeg),
        ImageFormatHint::Bmp => Some(ImageFormat::Bmp),
        ImageFormatHint::Tga => Some(ImageFormat::Tga),
    }
}

impl TextureLoader for ImageTextureLoader {
    fn load(
        &self,
        path: &Path,
        hint: ImageFormatHint,
    ) -> Result<CpuTexture, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let mut reader = ImageReader::open(path)
            .with_context(|| format!("Failed to open image '{}'", path.display()))?;
        reader = match image_format(hint) {
            Some(format) => {
                reader.set_format(format);
                reader
            }
            None => reader
                .with_guessed_format()
                .with_context(|| format!("Failed to sniff format of '{}'", path.display()))?,
        };

        let img = reader
            .decode()
            .with_context(|| format!("Failed to decode image '{}' as {hint:?}", path.display()))?;

        // Terrain shaders sample straight RGBA.
        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();
        log::debug!(
            "Decoded {} ({}x{}, {:?})",
            path.display(),
            width,
            height,
            hint
        );

        Ok(CpuTexture {
            pixels: rgba_img.into_raw(),
            width,
            height,
            format: TextureFormat::Rgba8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_checker(path: &Path, format: ImageFormat) {
        let img = RgbImage::from_fn(3, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        img.save_with_format(path, format).unwrap();
    }

    #[test]
    fn test_png_is_decoded_to_rgba8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.png");
        write_checker(&path, ImageFormat::Png);

        let texture = ImageTextureLoader::new()
            .load(&path, ImageFormatHint::Png)
            .unwrap();

        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.format, TextureFormat::Rgba8);
        assert_eq!(texture.pixels.len(), texture.expected_len());
        assert_eq!(&texture.pixels[0..4], &[255, 0, 0, 255]);
        assert_eq!(&texture.pixels[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_auto_hint_sniffs_contents_not_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("actually_a_bmp.dat");
        write_checker(&path, ImageFormat::Bmp);

        let texture = ImageTextureLoader::new()
            .load(&path, ImageFormatHint::Auto)
            .unwrap();

        assert_eq!((texture.width, texture.height), (3, 2));
    }

    #[test]
    fn test_wrong_hint_fails_to_decode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checker.png");
        write_checker(&path, ImageFormat::Png);

        let err = ImageTextureLoader::new()
            .load(&path, ImageFormatHint::Bmp)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to decode image"));
    }

    #[test]
    fn test_missing_file_reports_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nowhere.png");

        let err = ImageTextureLoader::new()
            .load(&path, ImageFormatHint::Auto)
            .unwrap_err();
        assert!(err.to_string().contains("nowhere.png"));
    }

    #[test]
    fn test_hint_mapping() {
        assert_eq!(image_format(ImageFormatHint::Auto), None);
        assert_eq!(image_format(ImageFormatHint::Jpeg), Some(ImageFormat::Jpeg));
        assert_eq!(image_format(ImageFormatHint::Tga), Some(ImageFormat::Tga));
    }
}
