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

//! State descriptors for the fixed-function pipeline.
//!
//! Equality and hashing are structural over the named fields, so two
//! descriptors built independently with the same values always intern to the
//! same canonical state object.

use super::enums::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ColorWrites: u8 {
        /// Enable writes to the Red channel.
        const R = 0b0001;
        /// Enable writes to the Green channel.
        const G = 0b0010;
        /// Enable writes to the Blue channel.
        const B = 0b0100;
        /// Enable writes to the Alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// Describes a complete blend equation for the color or the alpha components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlendComponentDescriptor {
    /// The blend factor for the source color (from the fragment shader).
    pub src_factor: BlendFactor,
    /// The blend factor for the destination color (already in the framebuffer).
    pub dst_factor: BlendFactor,
    /// The operation to combine the source and destination factors.
    pub operation: BlendOperation,
}

impl BlendComponentDescriptor {
    /// `src * 1 + dst * 0`, i.e. the source replaces the destination.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };

    /// Returns `true` if this component leaves the source value untouched.
    pub fn is_replace(&self) -> bool {
        self.src_factor == BlendFactor::One && self.dst_factor == BlendFactor::Zero
    }
}

impl Default for BlendComponentDescriptor {
    fn default() -> Self {
        Self::REPLACE
    }
}

/// Describes the blend state of the render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlendStateDescriptor {
    /// A bitmask controlling which color channels are written to.
    pub write_mask: ColorWrites,
    /// The blend equation for the RGB color components.
    pub color: BlendComponentDescriptor,
    /// The blend equation for the Alpha component.
    pub alpha: BlendComponentDescriptor,
    /// Derive a coverage mask from the fragment alpha.
    pub alpha_to_coverage: bool,
}

impl Default for ColorWrites {
    fn default() -> Self {
        ColorWrites::ALL
    }
}

impl BlendStateDescriptor {
    /// Blending is off when both components use `One`/`Zero` factors.
    /// The operation is irrelevant in that case.
    pub fn is_blending_disabled(&self) -> bool {
        self.color.is_replace() && self.alpha.is_replace()
    }
}

/// Describes the depth test and depth writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepthStateDescriptor {
    /// If `true`, depth values will be written to the depth buffer.
    pub write_enabled: bool,
    /// The comparison function used for the depth test.
    pub compare: CompareFunction,
}

impl Default for DepthStateDescriptor {
    fn default() -> Self {
        Self {
            write_enabled: true,
            compare: CompareFunction::Less,
        }
    }
}

impl DepthStateDescriptor {
    /// A depth state that neither tests nor writes depth.
    pub const NO_DEPTH_ACCESS: Self = Self {
        write_enabled: false,
        compare: CompareFunction::Disabled,
    };
}

/// Describes the stencil test and operations for a single face of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StencilFaceState {
    /// The comparison function used for the stencil test.
    pub compare: CompareFunction,
    /// The operation to perform if the stencil test fails.
    pub fail_op: StencilOperation,
    /// The operation to perform if the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// The operation to perform if both the stencil and depth tests pass.
    pub depth_pass_op: StencilOperation,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            compare: CompareFunction::Always,
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            depth_pass_op: StencilOperation::Keep,
        }
    }
}

/// Describes the stencil test of both faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StencilStateDescriptor {
    /// Whether the stencil test is enabled.
    pub enabled: bool,
    /// A bitmask for reading from the stencil buffer.
    pub read_mask: u8,
    /// A bitmask for writing to the stencil buffer.
    pub write_mask: u8,
    /// The stencil state for front-facing primitives.
    pub front: StencilFaceState,
    /// The stencil state for back-facing primitives.
    pub back: StencilFaceState,
}

impl Default for StencilStateDescriptor {
    fn default() -> Self {
        Self {
            enabled: false,
            read_mask: 0xFF,
            write_mask: 0xFF,
            front: StencilFaceState::default(),
            back: StencilFaceState::default(),
        }
    }
}

/// Describes face culling and depth biasing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RasterStateDescriptor {
    /// The face culling mode.
    pub cull_mode: CullMode,
    /// A constant value added to the depth of each fragment.
    pub depth_bias: i32,
    /// A factor that scales with the fragment's depth slope.
    pub slope_scaled_depth_bias: f32,
}

impl RasterStateDescriptor {
    fn slope_bits(&self) -> u32 {
        // -0.0 and 0.0 produce the same offset.
        if self.slope_scaled_depth_bias == 0.0 {
            0
        } else {
            self.slope_scaled_depth_bias.to_bits()
        }
    }

    /// Returns `true` if either bias term is non-zero.
    pub fn has_depth_bias(&self) -> bool {
        self.depth_bias != 0 || self.slope_scaled_depth_bias != 0.0
    }
}

impl PartialEq for RasterStateDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.cull_mode == other.cull_mode
            && self.depth_bias == other.depth_bias
            && self.slope_bits() == other.slope_bits()
    }
}

impl Eq for RasterStateDescriptor {}

impl Hash for RasterStateDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cull_mode.hash(state);
        self.depth_bias.hash(state);
        self.slope_bits().hash(state);
    }
}
