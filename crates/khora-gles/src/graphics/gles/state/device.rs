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

//! Canonical device states: a descriptor plus the native values derived from it.

use crate::graphics::gles::gl::GLenum;
use crate::graphics::gles::translate::{self, IntoGl};
use bitflags::bitflags;
use khora_gfx_core::renderer::api::pipeline::enums::CompareFunction;
use khora_gfx_core::renderer::api::pipeline::state::{
    BlendStateDescriptor, DepthStateDescriptor, RasterStateDescriptor, StencilFaceState,
    StencilStateDescriptor,
};

bitflags! {
    /// Properties of a blend state that gate how its equation is applied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlendFlags: u8 {
        /// Uses a KHR advanced blend equation.
        const ADVANCED = 1 << 0;
        /// Uses `MIN` or `MAX`.
        const MIN_MAX = 1 << 1;
        /// Has an operation with no native equation.
        const UNSUPPORTED = 1 << 2;
    }
}

/// A canonical blend state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceBlendState {
    /// The interned descriptor.
    pub desc: BlendStateDescriptor,
    /// `[src_rgb, dst_rgb, src_alpha, dst_alpha]`
    pub factors: [GLenum; 4],
    /// `[rgb, alpha]`; zero where the operation has no native equation.
    pub equations: [GLenum; 2],
    /// Equation properties.
    pub flags: BlendFlags,
}

impl DeviceBlendState {
    pub(super) fn new(desc: BlendStateDescriptor) -> Self {
        let mut flags = BlendFlags::empty();
        if desc.color.operation.is_advanced() {
            flags |= BlendFlags::ADVANCED;
        }
        if desc.color.operation.is_min_max() || desc.alpha.operation.is_min_max() {
            flags |= BlendFlags::MIN_MAX;
        }
        let rgb = translate::blend_equation(desc.color.operation);
        let alpha = translate::blend_equation(desc.alpha.operation);
        if rgb.is_none() || alpha.is_none() {
            flags |= BlendFlags::UNSUPPORTED;
        }
        Self {
            desc,
            factors: [
                desc.color.src_factor.into_gl(),
                desc.color.dst_factor.into_gl(),
                desc.alpha.src_factor.into_gl(),
                desc.alpha.dst_factor.into_gl(),
            ],
            equations: [rgb.unwrap_or(0), alpha.unwrap_or(0)],
            flags,
        }
    }

    /// Blending is off when every factor pair is `One`/`Zero`.
    pub fn is_blending_disabled(&self) -> bool {
        self.desc.is_blending_disabled()
    }
}

/// A canonical depth state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDepthState {
    /// The interned descriptor.
    pub desc: DepthStateDescriptor,
    /// Native depth function.
    pub func: GLenum,
}

impl DeviceDepthState {
    pub(super) fn new(desc: DepthStateDescriptor) -> Self {
        Self {
            desc,
            func: desc.compare.into_gl(),
        }
    }

    /// Whether the depth test is on.
    pub fn test_enabled(&self) -> bool {
        self.desc.compare != CompareFunction::Disabled
    }
}

/// Native values of one stencil face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceGl {
    /// Compare function.
    pub func: GLenum,
    /// `[stencil_fail, depth_fail, depth_pass]`
    pub ops: [GLenum; 3],
}

impl From<StencilFaceState> for StencilFaceGl {
    fn from(face: StencilFaceState) -> Self {
        Self {
            func: face.compare.into_gl(),
            ops: [
                face.fail_op.into_gl(),
                face.depth_fail_op.into_gl(),
                face.depth_pass_op.into_gl(),
            ],
        }
    }
}

/// A canonical stencil state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStencilState {
    /// The interned descriptor.
    pub desc: StencilStateDescriptor,
    /// Front face.
    pub front: StencilFaceGl,
    /// Back face.
    pub back: StencilFaceGl,
}

impl DeviceStencilState {
    pub(super) fn new(desc: StencilStateDescriptor) -> Self {
        Self {
            desc,
            front: desc.front.into(),
            back: desc.back.into(),
        }
    }
}

/// A canonical raster state.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRasterState {
    /// The interned descriptor.
    pub desc: RasterStateDescriptor,
    /// Culled face, `None` when culling is off.
    pub cull_face: Option<GLenum>,
}

impl DeviceRasterState {
    pub(super) fn new(desc: RasterStateDescriptor) -> Self {
        Self {
            desc,
            cull_face: translate::cull_face(desc.cull_mode),
        }
    }

    /// `(factor, units)` for `glPolygonOffset`.
    pub fn polygon_offset(&self, offset_bug: bool) -> (f32, f32) {
        let factor = self.desc.slope_scaled_depth_bias;
        let factor = if offset_bug { factor * 16.0 } else { factor };
        (factor, self.desc.depth_bias as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::gl;
    use khora_gfx_core::renderer::api::pipeline::enums::{
        BlendFactor, BlendOperation, LogicOperation,
    };
    use khora_gfx_core::renderer::api::pipeline::state::BlendComponentDescriptor;

    #[test]
    fn test_blend_flags() {
        let mut desc = BlendStateDescriptor::default();
        desc.color.operation = BlendOperation::Multiply;
        let flags = DeviceBlendState::new(desc).flags;
        assert!(flags.contains(BlendFlags::ADVANCED));

        desc.color.operation = BlendOperation::Add;
        desc.alpha.operation = BlendOperation::Max;
        let state = DeviceBlendState::new(desc);
        assert_eq!(state.flags, BlendFlags::MIN_MAX);
        assert_eq!(state.equations, [gl::FUNC_ADD, gl::MAX]);

        desc.alpha.operation = BlendOperation::Logical(LogicOperation::Xor);
        let flags = DeviceBlendState::new(desc).flags;
        assert!(flags.contains(BlendFlags::UNSUPPORTED));
    }

    #[test]
    fn test_blend_factors_translate() {
        let desc = BlendStateDescriptor {
            color: BlendComponentDescriptor {
                src_factor: BlendFactor::SrcAlpha,
                dst_factor: BlendFactor::OneMinusSrcAlpha,
                operation: BlendOperation::Add,
            },
            ..Default::default()
        };
        let state = DeviceBlendState::new(desc);
        let expected = [gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA, gl::ONE, gl::ZERO];
        assert_eq!(state.factors, expected);
        assert!(!state.is_blending_disabled());
    }

    #[test]
    fn test_polygon_offset_bug_scales_factor() {
        let state = DeviceRasterState::new(RasterStateDescriptor {
            depth_bias: 2,
            slope_scaled_depth_bias: 0.5,
            ..Default::default()
        });
        assert_eq!(state.polygon_offset(false), (0.5, 2.0));
        assert_eq!(state.polygon_offset(true), (8.0, 2.0));
    }
}
