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

//! GPU textures owned through a [`GraphicsDevice`].

use crate::renderer::api::{CpuTexture, ImageFormatHint, TextureId};
use crate::renderer::error::{ResourceError, TextureError};
use crate::renderer::traits::{GraphicsDevice, TextureLoader};
use std::path::Path;
use std::rc::Rc;

/// A 2D texture living on the GPU.
///
/// The texture is destroyed when the value is dropped. Consumers that need to
/// share one texture (several terrains, a material and a terrain...) hold it
/// through an `Rc<Texture>`.
#[derive(Debug)]
pub struct Texture {
    device: Rc<dyn GraphicsDevice>,
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    /// Uploads already decoded pixels.
    pub fn upload(
        device: Rc<dyn GraphicsDevice>,
        cpu: &CpuTexture,
        label: Option<&str>,
    ) -> Result<Self, ResourceError> {
        if cpu.pixels.len() != cpu.expected_len() {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture {:?} is {}x{} but carries {} bytes (expected {})",
                label,
                cpu.width,
                cpu.height,
                cpu.pixels.len(),
                cpu.expected_len()
            )));
        }

        let descriptor = cpu.to_descriptor(label.map(Into::into));
        let id = device.create_texture(&descriptor, &cpu.pixels)?;
        log::debug!(
            "Uploaded texture {:?} ({}x{}) as {:?}",
            label.unwrap_or_default(),
            cpu.width,
            cpu.height,
            id
        );

        Ok(Self {
            device,
            id,
            width: cpu.width,
            height: cpu.height,
        })
    }

    /// Decodes the image at `path` with `loader` and uploads it.
    pub fn load(
        device: Rc<dyn GraphicsDevice>,
        loader: &dyn TextureLoader,
        path: &Path,
        hint: ImageFormatHint,
    ) -> Result<Self, TextureError> {
        let cpu = loader.load(path, hint).map_err(|source| TextureError::Decode {
            path: path.display().to_string(),
            source,
        })?;
        let label = path.to_string_lossy();
        Ok(Self::upload(device, &cpu, Some(&label))?)
    }

    /// The backend handle of this texture.
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Width and height in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Err(e) = self.device.destroy_texture(self.id) {
            log::warn!("Failed to destroy texture {:?}: {e}", self.id);
        }
    }
}
