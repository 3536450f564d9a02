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

use crate::renderer::api::{CpuTexture, ImageFormatHint};
use std::path::Path;

/// Decodes image files into [`CpuTexture`]s.
///
/// This is the image-decoding collaborator of the renderer: the terrain only
/// needs something that turns a path and a format hint into pixels.
pub trait TextureLoader {
    /// Reads and decodes the image at `path`.
    fn load(
        &self,
        path: &Path,
        hint: ImageFormatHint,
    ) -> Result<CpuTexture, Box<dyn std::error::Error + Send + Sync + 'static>>;
}
