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

//! Translation of backend-agnostic enums to native GL values.

use super::caps::GraphicsCaps;
use super::gl::{self, GLenum};
use khora_gfx_core::renderer::api::buffer::{BufferUsage, MapAccess};
use khora_gfx_core::renderer::api::pipeline::enums::{
    BlendFactor, BlendOperation, CompareFunction, CullMode, StencilOperation,
};

/// A local extension trait to convert engine enums into GL enumerants.
pub trait IntoGl {
    /// Consumes self and returns the matching GL value.
    fn into_gl(self) -> GLenum;
}

impl IntoGl for CompareFunction {
    fn into_gl(self) -> GLenum {
        match self {
            // The test itself is switched off; the function is never read.
            CompareFunction::Disabled => gl::ALWAYS,
            CompareFunction::Never => gl::NEVER,
            CompareFunction::Less => gl::LESS,
            CompareFunction::Equal => gl::EQUAL,
            CompareFunction::LessEqual => gl::LEQUAL,
            CompareFunction::Greater => gl::GREATER,
            CompareFunction::NotEqual => gl::NOTEQUAL,
            CompareFunction::GreaterEqual => gl::GEQUAL,
            CompareFunction::Always => gl::ALWAYS,
        }
    }
}

impl IntoGl for StencilOperation {
    fn into_gl(self) -> GLenum {
        match self {
            StencilOperation::Keep => gl::KEEP,
            StencilOperation::Zero => gl::ZERO,
            StencilOperation::Replace => gl::REPLACE,
            StencilOperation::IncrementClamp => gl::INCR,
            StencilOperation::DecrementClamp => gl::DECR,
            StencilOperation::Invert => gl::INVERT,
            StencilOperation::IncrementWrap => gl::INCR_WRAP,
            StencilOperation::DecrementWrap => gl::DECR_WRAP,
        }
    }
}

impl IntoGl for BlendFactor {
    fn into_gl(self) -> GLenum {
        match self {
            BlendFactor::Zero => gl::ZERO,
            BlendFactor::One => gl::ONE,
            BlendFactor::DstColor => gl::DST_COLOR,
            BlendFactor::SrcColor => gl::SRC_COLOR,
            BlendFactor::OneMinusDstColor => gl::ONE_MINUS_DST_COLOR,
            BlendFactor::SrcAlpha => gl::SRC_ALPHA,
            BlendFactor::OneMinusSrcColor => gl::ONE_MINUS_SRC_COLOR,
            BlendFactor::DstAlpha => gl::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
            BlendFactor::SrcAlphaSaturate => gl::SRC_ALPHA_SATURATE,
            BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        }
    }
}

impl IntoGl for MapAccess {
    fn into_gl(self) -> GLenum {
        const BITS: [(MapAccess, GLenum); 6] = [
            (MapAccess::READ, gl::MAP_READ_BIT),
            (MapAccess::WRITE, gl::MAP_WRITE_BIT),
            (MapAccess::INVALIDATE_RANGE, gl::MAP_INVALIDATE_RANGE_BIT),
            (MapAccess::INVALIDATE_BUFFER, gl::MAP_INVALIDATE_BUFFER_BIT),
            (MapAccess::FLUSH_EXPLICIT, gl::MAP_FLUSH_EXPLICIT_BIT),
            (MapAccess::UNSYNCHRONIZED, gl::MAP_UNSYNCHRONIZED_BIT),
        ];
        BITS.iter()
            .filter(|(flag, _)| self.contains(*flag))
            .fold(0, |bits, (_, bit)| bits | bit)
    }
}

/// The blend equation for an operation, or `None` for logic operations.
pub fn blend_equation(operation: BlendOperation) -> Option<GLenum> {
    Some(match operation {
        BlendOperation::Add => gl::FUNC_ADD,
        BlendOperation::Subtract => gl::FUNC_SUBTRACT,
        BlendOperation::ReverseSubtract => gl::FUNC_REVERSE_SUBTRACT,
        BlendOperation::Min => gl::MIN,
        BlendOperation::Max => gl::MAX,
        BlendOperation::Logical(_) => return None,
        BlendOperation::Multiply => gl::MULTIPLY_KHR,
        BlendOperation::Screen => gl::SCREEN_KHR,
        BlendOperation::Overlay => gl::OVERLAY_KHR,
        BlendOperation::Darken => gl::DARKEN_KHR,
        BlendOperation::Lighten => gl::LIGHTEN_KHR,
        BlendOperation::ColorDodge => gl::COLORDODGE_KHR,
        BlendOperation::ColorBurn => gl::COLORBURN_KHR,
        BlendOperation::HardLight => gl::HARDLIGHT_KHR,
        BlendOperation::SoftLight => gl::SOFTLIGHT_KHR,
        BlendOperation::Difference => gl::DIFFERENCE_KHR,
        BlendOperation::Exclusion => gl::EXCLUSION_KHR,
        BlendOperation::HslHue => gl::HSL_HUE_KHR,
        BlendOperation::HslSaturation => gl::HSL_SATURATION_KHR,
        BlendOperation::HslColor => gl::HSL_COLOR_KHR,
        BlendOperation::HslLuminosity => gl::HSL_LUMINOSITY_KHR,
    })
}

/// The face culled for a mode, or `None` when culling is off.
pub fn cull_face(mode: CullMode) -> Option<GLenum> {
    match mode {
        CullMode::Off => None,
        CullMode::Front => Some(gl::FRONT),
        CullMode::Back => Some(gl::BACK),
    }
}

/// Every buffer binding point the backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BufferTarget {
    /// Vertex attributes.
    Array,
    /// Indices.
    ElementArray,
    /// Source of buffer copies.
    CopyRead,
    /// Destination of buffer copies and the neutral upload point.
    CopyWrite,
    /// Pixel readback.
    PixelPack,
    /// Pixel upload.
    PixelUnpack,
    /// Compute dispatch arguments.
    DispatchIndirect,
    /// Draw arguments.
    DrawIndirect,
    /// Indirect draw count parameters.
    Parameter,
    /// Query results.
    Query,
    /// Uniform blocks.
    Uniform,
    /// Transform feedback output.
    TransformFeedback,
    /// Shader storage.
    ShaderStorage,
    /// Atomic counters.
    AtomicCounter,
}

impl BufferTarget {
    /// Number of binding points.
    pub const COUNT: usize = 14;

    /// Dense index in `0..COUNT`.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Draw or read framebuffer binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// Destination of rendering.
    Draw,
    /// Source of reads and blits.
    Read,
}

/// Capability-dependent translations, built once per [`GraphicsCaps`].
#[derive(Debug, Clone)]
pub struct Translate {
    buffer_targets: [GLenum; BufferTarget::COUNT],
    draw_framebuffer: GLenum,
    read_framebuffer: GLenum,
    has_buffer_copy: bool,
    use_actual_target_for_uploads: bool,
}

impl Translate {
    /// Builds the tables for `caps`.
    pub fn new(caps: &GraphicsCaps) -> Self {
        // Without copy buffers the copy points alias the array buffer.
        let (copy_read, copy_write) = if caps.has_buffer_copy {
            (gl::COPY_READ_BUFFER, gl::COPY_WRITE_BUFFER)
        } else {
            (gl::ARRAY_BUFFER, gl::ARRAY_BUFFER)
        };
        let (draw_framebuffer, read_framebuffer) = if caps.has_read_draw_framebuffer {
            (gl::DRAW_FRAMEBUFFER, gl::READ_FRAMEBUFFER)
        } else {
            (gl::FRAMEBUFFER, gl::FRAMEBUFFER)
        };
        Self {
            buffer_targets: [
                gl::ARRAY_BUFFER,
                gl::ELEMENT_ARRAY_BUFFER,
                copy_read,
                copy_write,
                gl::PIXEL_PACK_BUFFER,
                gl::PIXEL_UNPACK_BUFFER,
                gl::DISPATCH_INDIRECT_BUFFER,
                gl::DRAW_INDIRECT_BUFFER,
                gl::PARAMETER_BUFFER,
                gl::QUERY_BUFFER,
                gl::UNIFORM_BUFFER,
                gl::TRANSFORM_FEEDBACK_BUFFER,
                gl::SHADER_STORAGE_BUFFER,
                gl::ATOMIC_COUNTER_BUFFER,
            ],
            draw_framebuffer,
            read_framebuffer,
            has_buffer_copy: caps.has_buffer_copy,
            use_actual_target_for_uploads: caps.use_actual_buffer_target_for_uploads,
        }
    }

    /// Native enum of a buffer binding point.
    pub fn buffer_target(&self, target: BufferTarget) -> GLenum {
        self.buffer_targets[target.index()]
    }

    /// Native enum of a framebuffer binding point.
    pub fn framebuffer_target(&self, target: FramebufferTarget) -> GLenum {
        match target {
            FramebufferTarget::Draw => self.draw_framebuffer,
            FramebufferTarget::Read => self.read_framebuffer,
        }
    }

    /// The binding point a buffer of `usage` is uploaded through.
    ///
    /// Uploading through the copy-write point avoids disturbing vertex and
    /// index bindings; some drivers need the real target instead.
    pub fn upload_target(&self, usage: BufferUsage) -> BufferTarget {
        let neutral = if self.has_buffer_copy {
            BufferTarget::CopyWrite
        } else {
            BufferTarget::Array
        };
        let actual = self.use_actual_target_for_uploads || !self.has_buffer_copy;
        if usage.is_vertex() && actual {
            BufferTarget::Array
        } else if usage.is_index() && actual {
            BufferTarget::ElementArray
        } else {
            neutral
        }
    }

    /// The usage hint passed to `glBufferData`.
    pub fn usage_hint(&self, usage: BufferUsage) -> GLenum {
        match usage {
            BufferUsage::StaticVertex | BufferUsage::StaticIndex | BufferUsage::StaticUniform => {
                gl::STATIC_DRAW
            }
            BufferUsage::DynamicVertex
            | BufferUsage::DynamicIndex
            | BufferUsage::DynamicUniform
            | BufferUsage::DynamicStorage
            | BufferUsage::DynamicAtomicCounter => gl::DYNAMIC_DRAW,
            BufferUsage::CircularVertex | BufferUsage::CircularIndex => gl::STREAM_DRAW,
            BufferUsage::TransformFeedbackDestination => gl::STATIC_COPY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::caps::FeatureLevel;
    use crate::graphics::gles::recorder::RecordingGl;

    fn translate(version: &str, renderer: &str) -> Translate {
        let mut gl = RecordingGl::new()
            .with_version(version)
            .with_renderer(renderer);
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Core45, false).unwrap();
        Translate::new(&caps)
    }

    #[test]
    fn test_compare_function_conversion() {
        assert_eq!(CompareFunction::LessEqual.into_gl(), gl::LEQUAL);
        assert_eq!(CompareFunction::Disabled.into_gl(), gl::ALWAYS);
        assert_eq!(StencilOperation::IncrementWrap.into_gl(), gl::INCR_WRAP);
        assert_eq!(
            BlendFactor::OneMinusSrcAlpha.into_gl(),
            gl::ONE_MINUS_SRC_ALPHA
        );
        assert_eq!(
            (MapAccess::WRITE | MapAccess::INVALIDATE_RANGE).into_gl(),
            gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_RANGE_BIT
        );
    }

    #[test]
    fn test_unsupported_translations_are_none() {
        use khora_gfx_core::renderer::api::pipeline::enums::LogicOperation;
        let xor = BlendOperation::Logical(LogicOperation::Xor);
        assert_eq!(blend_equation(xor), None);
        assert_eq!(blend_equation(BlendOperation::Screen), Some(gl::SCREEN_KHR));
        assert_eq!(cull_face(CullMode::Off), None);
    }

    #[test]
    fn test_es3_uploads_through_copy_write() {
        let table = translate("OpenGL ES 3.0", "Adreno (TM) 640");
        for usage in [BufferUsage::DynamicVertex, BufferUsage::StaticUniform] {
            assert_eq!(table.upload_target(usage), BufferTarget::CopyWrite);
        }
        let copy_write = table.buffer_target(BufferTarget::CopyWrite);
        assert_eq!(copy_write, gl::COPY_WRITE_BUFFER);
        let read = table.framebuffer_target(FramebufferTarget::Read);
        assert_eq!(read, gl::READ_FRAMEBUFFER);
    }

    #[test]
    fn test_mali_uploads_through_actual_target() {
        let table = translate("OpenGL ES 3.0", "Mali-T880");
        let expected = [
            (BufferUsage::DynamicVertex, BufferTarget::Array),
            (BufferUsage::CircularIndex, BufferTarget::ElementArray),
            (BufferUsage::DynamicUniform, BufferTarget::CopyWrite),
        ];
        for (usage, target) in expected {
            assert_eq!(table.upload_target(usage), target, "{usage:?}");
        }
    }

    #[test]
    fn test_es2_aliases_copy_targets() {
        let table = translate("OpenGL ES 2.0", "PowerVR SGX");
        let copy_write = table.buffer_target(BufferTarget::CopyWrite);
        assert_eq!(copy_write, gl::ARRAY_BUFFER);
        let upload = table.upload_target(BufferUsage::DynamicUniform);
        assert_eq!(upload, BufferTarget::Array);
        let draw = table.framebuffer_target(FramebufferTarget::Draw);
        assert_eq!(draw, gl::FRAMEBUFFER);
    }

    #[test]
    fn test_usage_hints() {
        let table = translate("4.5.0", "NVIDIA");
        let expected = [
            (BufferUsage::StaticVertex, gl::STATIC_DRAW),
            (BufferUsage::DynamicStorage, gl::DYNAMIC_DRAW),
            (BufferUsage::CircularVertex, gl::STREAM_DRAW),
            (BufferUsage::TransformFeedbackDestination, gl::STATIC_COPY),
        ];
        for (usage, hint) in expected {
            assert_eq!(table.usage_hint(usage), hint, "{usage:?}");
        }
    }
}
