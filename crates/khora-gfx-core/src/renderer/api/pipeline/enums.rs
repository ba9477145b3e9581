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

//! Enums for pipeline configuration.

use serde::{Deserialize, Serialize};

/// A comparison function used by depth and stencil tests.
///
/// `Disabled` switches the test off entirely, which is not the same as
/// `Always` on drivers that skip depth writes when the test is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// The test is disabled.
    Disabled,
    /// The test never passes.
    Never,
    /// Passes if the new value is less than the existing value.
    #[default]
    Less,
    /// Passes if the new value is equal to the existing value.
    Equal,
    /// Passes if the new value is less than or equal to the existing value.
    LessEqual,
    /// Passes if the new value is greater than the existing value.
    Greater,
    /// Passes if the new value is not equal to the existing value.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing value.
    GreaterEqual,
    /// The test always passes.
    Always,
}

/// Defines which face of a triangle to cull (not render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// No culling is performed.
    Off,
    /// Cull front-facing triangles.
    Front,
    /// Cull back-facing triangles.
    #[default]
    Back,
}

/// A multiplier applied to the source or destination color in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendFactor {
    /// `0.0`
    Zero,
    /// `1.0`
    One,
    /// The destination color.
    DstColor,
    /// The source color.
    SrcColor,
    /// `1.0 - destination color`
    OneMinusDstColor,
    /// The source alpha.
    SrcAlpha,
    /// `1.0 - source color`
    OneMinusSrcColor,
    /// The destination alpha.
    DstAlpha,
    /// `1.0 - destination alpha`
    OneMinusDstAlpha,
    /// `min(source alpha, 1.0 - destination alpha)`
    SrcAlphaSaturate,
    /// `1.0 - source alpha`
    OneMinusSrcAlpha,
}

/// A framebuffer logic operation.
///
/// Listed for completeness of the blend model; no GL ES backend translates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum LogicOperation {
    Clear,
    Set,
    Copy,
    CopyInverted,
    Noop,
    Invert,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Equiv,
    AndReverse,
    AndInverted,
    OrReverse,
    OrInverted,
}

/// The operation combining source and destination in a blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlendOperation {
    /// `src + dst`
    #[default]
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
    /// A logic operation.
    Logical(LogicOperation),
    /// Advanced blend: multiply.
    Multiply,
    /// Advanced blend: screen.
    Screen,
    /// Advanced blend: overlay.
    Overlay,
    /// Advanced blend: darken.
    Darken,
    /// Advanced blend: lighten.
    Lighten,
    /// Advanced blend: color dodge.
    ColorDodge,
    /// Advanced blend: color burn.
    ColorBurn,
    /// Advanced blend: hard light.
    HardLight,
    /// Advanced blend: soft light.
    SoftLight,
    /// Advanced blend: difference.
    Difference,
    /// Advanced blend: exclusion.
    Exclusion,
    /// Advanced blend: HSL hue.
    HslHue,
    /// Advanced blend: HSL saturation.
    HslSaturation,
    /// Advanced blend: HSL color.
    HslColor,
    /// Advanced blend: HSL luminosity.
    HslLuminosity,
}

impl BlendOperation {
    /// Returns `true` for the advanced (KHR_blend_equation_advanced) operations.
    pub fn is_advanced(self) -> bool {
        !matches!(
            self,
            BlendOperation::Add
                | BlendOperation::Subtract
                | BlendOperation::ReverseSubtract
                | BlendOperation::Min
                | BlendOperation::Max
                | BlendOperation::Logical(_)
        )
    }

    /// Returns `true` for `Min` and `Max`.
    pub fn is_min_max(self) -> bool {
        matches!(self, BlendOperation::Min | BlendOperation::Max)
    }

    /// Returns `true` for logic operations.
    pub fn is_logical(self) -> bool {
        matches!(self, BlendOperation::Logical(_))
    }
}

/// An operation performed on the stencil buffer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set the value to `0`.
    Zero,
    /// Replace the value with the reference value.
    Replace,
    /// Increment, clamping to the maximum.
    IncrementClamp,
    /// Decrement, clamping to `0`.
    DecrementClamp,
    /// Bitwise invert.
    Invert,
    /// Increment, wrapping to `0`.
    IncrementWrap,
    /// Decrement, wrapping to the maximum.
    DecrementWrap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advanced_blend_classification() {
        assert!(!BlendOperation::Add.is_advanced());
        assert!(!BlendOperation::Max.is_advanced());
        assert!(!BlendOperation::Logical(LogicOperation::Xor).is_advanced());
        assert!(BlendOperation::Multiply.is_advanced());
        assert!(BlendOperation::HslLuminosity.is_advanced());
        assert!(BlendOperation::Min.is_min_max());
        assert!(BlendOperation::Logical(LogicOperation::Copy).is_logical());
    }

    #[test]
    fn defaults_match_fixed_function_defaults() {
        assert_eq!(CompareFunction::default(), CompareFunction::Less);
        assert_eq!(CullMode::default(), CullMode::Back);
        assert_eq!(StencilOperation::default(), StencilOperation::Keep);
        assert_eq!(BlendOperation::default(), BlendOperation::Add);
    }
}
