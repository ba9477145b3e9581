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

//! Native OpenGL / OpenGL ES enum values emitted by the backend core.
//!
//! Only the subset the core actually passes to the driver is listed here.

#![allow(missing_docs)]

/// A GL enumerant.
pub type GLenum = u32;
/// A GL object name. `0` is the default object in every context.
pub type GLuint = u32;
/// A GL bitfield.
pub type GLbitfield = u32;
/// An opaque sync object. `0` is the null sync.
pub type GLsync = u64;

pub const NONE: GLenum = 0;
pub const ZERO: GLenum = 0;
pub const ONE: GLenum = 1;

// --- Buffer targets ---
pub const ARRAY_BUFFER: GLenum = 0x8892;
pub const ELEMENT_ARRAY_BUFFER: GLenum = 0x8893;
pub const COPY_READ_BUFFER: GLenum = 0x8F36;
pub const COPY_WRITE_BUFFER: GLenum = 0x8F37;
pub const PIXEL_PACK_BUFFER: GLenum = 0x88EB;
pub const PIXEL_UNPACK_BUFFER: GLenum = 0x88EC;
pub const DISPATCH_INDIRECT_BUFFER: GLenum = 0x90EE;
pub const DRAW_INDIRECT_BUFFER: GLenum = 0x8F3F;
pub const PARAMETER_BUFFER: GLenum = 0x80EE;
pub const QUERY_BUFFER: GLenum = 0x9192;
pub const UNIFORM_BUFFER: GLenum = 0x8A11;
pub const TRANSFORM_FEEDBACK_BUFFER: GLenum = 0x8C8E;
pub const SHADER_STORAGE_BUFFER: GLenum = 0x90D2;
pub const ATOMIC_COUNTER_BUFFER: GLenum = 0x92C0;

// --- Buffer usage hints ---
pub const STREAM_DRAW: GLenum = 0x88E0;
pub const STATIC_DRAW: GLenum = 0x88E4;
pub const STATIC_COPY: GLenum = 0x88E6;
pub const DYNAMIC_DRAW: GLenum = 0x88E8;

// --- Map access bits ---
pub const MAP_READ_BIT: GLbitfield = 0x0001;
pub const MAP_WRITE_BIT: GLbitfield = 0x0002;
pub const MAP_INVALIDATE_RANGE_BIT: GLbitfield = 0x0004;
pub const MAP_INVALIDATE_BUFFER_BIT: GLbitfield = 0x0008;
pub const MAP_FLUSH_EXPLICIT_BIT: GLbitfield = 0x0010;
pub const MAP_UNSYNCHRONIZED_BIT: GLbitfield = 0x0020;

// --- Compare functions ---
pub const NEVER: GLenum = 0x0200;
pub const LESS: GLenum = 0x0201;
pub const EQUAL: GLenum = 0x0202;
pub const LEQUAL: GLenum = 0x0203;
pub const GREATER: GLenum = 0x0204;
pub const NOTEQUAL: GLenum = 0x0205;
pub const GEQUAL: GLenum = 0x0206;
pub const ALWAYS: GLenum = 0x0207;

// --- Blend factors ---
pub const SRC_COLOR: GLenum = 0x0300;
pub const ONE_MINUS_SRC_COLOR: GLenum = 0x0301;
pub const SRC_ALPHA: GLenum = 0x0302;
pub const ONE_MINUS_SRC_ALPHA: GLenum = 0x0303;
pub const DST_ALPHA: GLenum = 0x0304;
pub const ONE_MINUS_DST_ALPHA: GLenum = 0x0305;
pub const DST_COLOR: GLenum = 0x0306;
pub const ONE_MINUS_DST_COLOR: GLenum = 0x0307;
pub const SRC_ALPHA_SATURATE: GLenum = 0x0308;

// --- Blend equations ---
pub const FUNC_ADD: GLenum = 0x8006;
pub const MIN: GLenum = 0x8007;
pub const MAX: GLenum = 0x8008;
pub const FUNC_SUBTRACT: GLenum = 0x800A;
pub const FUNC_REVERSE_SUBTRACT: GLenum = 0x800B;

// --- KHR_blend_equation_advanced ---
pub const MULTIPLY_KHR: GLenum = 0x9294;
pub const SCREEN_KHR: GLenum = 0x9295;
pub const OVERLAY_KHR: GLenum = 0x9296;
pub const DARKEN_KHR: GLenum = 0x9297;
pub const LIGHTEN_KHR: GLenum = 0x9298;
pub const COLORDODGE_KHR: GLenum = 0x9299;
pub const COLORBURN_KHR: GLenum = 0x929A;
pub const HARDLIGHT_KHR: GLenum = 0x929B;
pub const SOFTLIGHT_KHR: GLenum = 0x929C;
pub const DIFFERENCE_KHR: GLenum = 0x929E;
pub const EXCLUSION_KHR: GLenum = 0x92A0;
pub const HSL_HUE_KHR: GLenum = 0x92AD;
pub const HSL_SATURATION_KHR: GLenum = 0x92AE;
pub const HSL_COLOR_KHR: GLenum = 0x92AF;
pub const HSL_LUMINOSITY_KHR: GLenum = 0x92B0;

// --- Stencil operations ---
pub const KEEP: GLenum = 0x1E00;
pub const REPLACE: GLenum = 0x1E01;
pub const INCR: GLenum = 0x1E02;
pub const DECR: GLenum = 0x1E03;
pub const INVERT: GLenum = 0x150A;
pub const INCR_WRAP: GLenum = 0x8507;
pub const DECR_WRAP: GLenum = 0x8508;

// --- Faces ---
pub const FRONT: GLenum = 0x0404;
pub const BACK: GLenum = 0x0405;
pub const FRONT_AND_BACK: GLenum = 0x0408;

// --- Capabilities ---
pub const CULL_FACE: GLenum = 0x0B44;
pub const DEPTH_TEST: GLenum = 0x0B71;
pub const STENCIL_TEST: GLenum = 0x0B90;
pub const BLEND: GLenum = 0x0BE2;
pub const SCISSOR_TEST: GLenum = 0x0C11;
pub const POLYGON_OFFSET_FILL: GLenum = 0x8037;
pub const SAMPLE_ALPHA_TO_COVERAGE: GLenum = 0x809E;

// --- Framebuffers ---
pub const FRAMEBUFFER: GLenum = 0x8D40;
pub const READ_FRAMEBUFFER: GLenum = 0x8CA8;
pub const DRAW_FRAMEBUFFER: GLenum = 0x8CA9;
pub const FRAMEBUFFER_BINDING: GLenum = 0x8CA6;
pub const DRAW_FRAMEBUFFER_BINDING: GLenum = 0x8CA6;
pub const READ_FRAMEBUFFER_BINDING: GLenum = 0x8CAA;
pub const RENDERBUFFER: GLenum = 0x8D41;

pub const COLOR_ATTACHMENT0: GLenum = 0x8CE0;
pub const DEPTH_ATTACHMENT: GLenum = 0x8D00;
pub const STENCIL_ATTACHMENT: GLenum = 0x8D20;
pub const DEPTH_STENCIL_ATTACHMENT: GLenum = 0x821A;
/// Color of the default framebuffer, for invalidation.
pub const COLOR: GLenum = 0x1800;
/// Depth of the default framebuffer, for invalidation.
pub const DEPTH: GLenum = 0x1801;
/// Stencil of the default framebuffer, for invalidation.
pub const STENCIL: GLenum = 0x1802;

pub const TEXTURE_2D: GLenum = 0x0DE1;
pub const TEXTURE_CUBE_MAP_POSITIVE_X: GLenum = 0x8515;

pub const FRAMEBUFFER_COMPLETE: GLenum = 0x8CD5;
pub const FRAMEBUFFER_INCOMPLETE_ATTACHMENT: GLenum = 0x8CD6;
pub const FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT: GLenum = 0x8CD7;
pub const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: GLenum = 0x8CD9;
pub const FRAMEBUFFER_UNSUPPORTED: GLenum = 0x8CDD;
pub const FRAMEBUFFER_INCOMPLETE_MULTISAMPLE: GLenum = 0x8D56;
pub const FRAMEBUFFER_UNDEFINED: GLenum = 0x8219;
pub const FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS: GLenum = 0x8DA8;

// --- Object label identifiers (KHR_debug) ---
pub const FRAMEBUFFER_LABEL: GLenum = 0x8D40;
pub const BUFFER_OBJECT_LABEL: GLenum = 0x82E0;

// --- Clear bits ---
pub const DEPTH_BUFFER_BIT: GLbitfield = 0x0100;
pub const STENCIL_BUFFER_BIT: GLbitfield = 0x0400;
pub const COLOR_BUFFER_BIT: GLbitfield = 0x4000;

// --- String queries ---
pub const VENDOR: GLenum = 0x1F00;
pub const RENDERER: GLenum = 0x1F01;
pub const VERSION: GLenum = 0x1F02;
pub const EXTENSIONS: GLenum = 0x1F03;

// --- Integer queries ---
pub const MAJOR_VERSION: GLenum = 0x821B;
pub const MINOR_VERSION: GLenum = 0x821C;
pub const NUM_EXTENSIONS: GLenum = 0x821D;
pub const MAX_COLOR_ATTACHMENTS: GLenum = 0x8CDF;
pub const MAX_DRAW_BUFFERS: GLenum = 0x8824;
pub const MAX_VERTEX_ATTRIBS: GLenum = 0x8869;
pub const MAX_UNIFORM_BUFFER_BINDINGS: GLenum = 0x8A2F;
pub const MAX_SAMPLES: GLenum = 0x8D57;

// --- Sync ---
pub const SYNC_GPU_COMMANDS_COMPLETE: GLenum = 0x9117;
pub const ALREADY_SIGNALED: GLenum = 0x911A;
pub const TIMEOUT_EXPIRED: GLenum = 0x911B;
pub const CONDITION_SATISFIED: GLenum = 0x911C;
pub const WAIT_FAILED: GLenum = 0x911D;

/// A readable name for a framebuffer status code.
pub fn framebuffer_status_name(status: GLenum) -> &'static str {
    match status {
        FRAMEBUFFER_COMPLETE => "FRAMEBUFFER_COMPLETE",
        FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "FRAMEBUFFER_INCOMPLETE_ATTACHMENT",
        FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT",
        FRAMEBUFFER_INCOMPLETE_DIMENSIONS => "FRAMEBUFFER_INCOMPLETE_DIMENSIONS",
        FRAMEBUFFER_UNSUPPORTED => "FRAMEBUFFER_UNSUPPORTED",
        FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "FRAMEBUFFER_INCOMPLETE_MULTISAMPLE",
        FRAMEBUFFER_UNDEFINED => "FRAMEBUFFER_UNDEFINED",
        FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS",
        _ => "FRAMEBUFFER_STATUS_UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!(
            framebuffer_status_name(FRAMEBUFFER_COMPLETE),
            "FRAMEBUFFER_COMPLETE"
        );
        assert_eq!(
            framebuffer_status_name(FRAMEBUFFER_INCOMPLETE_MULTISAMPLE),
            "FRAMEBUFFER_INCOMPLETE_MULTISAMPLE"
        );
        assert_eq!(
            framebuffer_status_name(0xDEAD),
            "FRAMEBUFFER_STATUS_UNKNOWN"
        );
    }
}
