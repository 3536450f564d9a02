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

//! Texture resources and the CPU-side image data they are created from.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The pixel layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// Four 8-bit channels, red first.
    #[default]
    Rgba8,
}

impl TextureFormat {
    /// Size of one pixel in bytes.
    pub const fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::Rgba8 => 4,
        }
    }
}

/// Describes a 2D texture to be created by the `GraphicsDevice`.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label, usually the image path.
    pub label: Option<Cow<'a, str>>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout of the uploaded data.
    pub format: TextureFormat,
}

/// An opaque handle to a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// The encoding a texture loader should expect when decoding an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormatHint {
    /// Guess the format from the file contents.
    #[default]
    Auto,
    /// Portable Network Graphics.
    Png,
    /// JPEG, accepted as `jpg` or `jpeg`.
    #[serde(alias = "jpg")]
    Jpeg,
    /// Windows bitmap.
    Bmp,
    /// Truevision TGA.
    Tga,
}

/// Decoded image data living in CPU memory, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTexture {
    /// The raw pixel data, row by row, in `format` layout.
    pub pixels: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// The format of the pixel data.
    pub format: TextureFormat,
}

impl CpuTexture {
    /// Creates a texture descriptor matching this CPU texture.
    pub fn to_descriptor<'a>(&self, label: Option<Cow<'a, str>>) -> TextureDescriptor<'a> {
        TextureDescriptor {
            label,
            width: self.width,
            height: self.height,
            format: self.format,
        }
    }

    /// Number of bytes the pixel buffer must hold for the declared size.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }
}
