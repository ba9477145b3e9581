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

use khora_gfx_core::renderer::api::target::{RenderSurface, RenderSurfaceId, RenderTargetSetup};
use std::collections::HashMap;

/// Identifies one memoized framebuffer object.
///
/// Two keys are equal when they name the same surfaces with the same
/// subresource selectors and the same sample count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FramebufferKey {
    setup: RenderTargetSetup,
    samples: u32,
}

impl FramebufferKey {
    /// Builds the key of `setup`, reading sample counts from `surfaces`.
    ///
    /// Unknown surfaces count as single-sampled; callers validate the setup first.
    pub fn new(
        setup: &RenderTargetSetup,
        surfaces: &HashMap<RenderSurfaceId, RenderSurface>,
    ) -> Self {
        let samples = setup
            .surfaces()
            .filter_map(|id| surfaces.get(&id))
            .filter(|surface| !surface.is_dummy())
            .map(|surface| surface.samples)
            .max()
            .unwrap_or(1);
        Self {
            setup: setup.clone(),
            samples,
        }
    }

    /// The setup this key was built from.
    pub fn setup(&self) -> &RenderTargetSetup {
        &self.setup
    }

    /// The sample count of the attachments.
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khora_gfx_core::renderer::api::target::SurfaceBacking;

    fn registry(surfaces: Vec<RenderSurface>) -> HashMap<RenderSurfaceId, RenderSurface> {
        surfaces.into_iter().map(|s| (s.id, s)).collect()
    }

    #[test]
    fn test_key_takes_highest_sample_count() {
        let texture = SurfaceBacking::Texture(10);
        let color = RenderSurface::color(RenderSurfaceId(1), texture, 64, 64).with_samples(4);
        let renderbuffer = SurfaceBacking::Renderbuffer(11);
        let depth = RenderSurface::depth(RenderSurfaceId(2), renderbuffer, 64, 64, true);
        let surfaces = registry(vec![color, depth]);
        let setup = RenderTargetSetup::new(vec![RenderSurfaceId(1)], Some(RenderSurfaceId(2)));

        let key = FramebufferKey::new(&setup, &surfaces);
        assert_eq!(key.samples(), 4);
        assert_eq!(key.setup(), &setup);
    }

    #[test]
    fn test_dummy_surfaces_do_not_affect_samples() {
        let color = RenderSurface::color(RenderSurfaceId(1), SurfaceBacking::Texture(10), 64, 64)
            .with_samples(8)
            .never_used();
        let surfaces = registry(vec![color]);
        let setup = RenderTargetSetup::new(vec![RenderSurfaceId(1)], None);
        assert_eq!(FramebufferKey::new(&setup, &surfaces).samples(), 1);
    }

    #[test]
    fn test_keys_differ_by_subresource() {
        let surfaces = HashMap::new();
        let setup = RenderTargetSetup::new(vec![RenderSurfaceId(1)], None);
        assert_ne!(
            FramebufferKey::new(&setup, &surfaces),
            FramebufferKey::new(&setup.clone().with_cube_face(2), &surfaces)
        );
    }
}
