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

//! Entry-point resolution.
//!
//! A driver may expose the same functionality through a core entry point or
//! one of several vendor extensions. [`EntryPoints::resolve`] picks the best
//! tier once from the detected [`GraphicsCaps`]; callers hand the chosen tier to
//! the [`NativeGl`](super::native::NativeGl) seam so a concrete loader can call
//! the right symbol. `None` means the feature is absent and callers must take
//! their fallback path.

use super::caps::{FeatureLevel, GraphicsCaps};

/// `glGenVertexArrays` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexArrayEntry {
    /// Core / ES 3.0.
    Core,
    /// `GL_OES_vertex_array_object`.
    Oes,
}

/// `glDrawBuffers` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawBuffersEntry {
    /// Core / ES 3.0.
    Core,
    /// `WEBGL_draw_buffers` / `GL_EXT_draw_buffers`.
    Ext,
    /// `GL_NV_draw_buffers`.
    Nv,
}

/// `glInvalidateFramebuffer` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidateEntry {
    /// Core 4.3 / ES 3.0 / `GL_ARB_invalidate_subdata`.
    Core,
    /// `GL_EXT_discard_framebuffer`.
    DiscardExt,
}

/// `glMapBufferRange` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapRangeEntry {
    /// Core / ES 3.0 / `GL_ARB_map_buffer_range`.
    Core,
    /// `GL_EXT_map_buffer_range`.
    Ext,
}

/// How buffer storage is zero-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferClearEntry {
    /// `glClearBufferSubData`.
    ClearBufferData,
    /// Upload a zeroed block through `glBufferSubData`.
    UploadZeros,
}

/// How GPU completion is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenceEntry {
    /// `glFenceSync` / `glClientWaitSync`.
    FenceSync,
    /// No sync objects: assume the GPU is one frame behind.
    FrameDelay,
}

/// `glObjectLabel` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugLabelEntry {
    /// `GL_KHR_debug` / core 4.3.
    Khr,
    /// `GL_EXT_debug_label`.
    Ext,
}

/// `glGenQueries` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryEntry {
    /// Core timer queries.
    Core,
    /// `GL_EXT_disjoint_timer_query`.
    Ext,
}

/// `glBlendEquation` with advanced modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendAdvancedEntry {
    /// `GL_KHR_blend_equation_advanced`.
    Khr,
    /// `GL_NV_blend_equation_advanced`.
    Nv,
}

/// The resolved entry-point table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoints {
    /// Vertex array objects, `None` without them.
    pub vertex_array: Option<VertexArrayEntry>,
    /// Multiple draw buffers.
    pub draw_buffers: Option<DrawBuffersEntry>,
    /// Attachment invalidation or discard.
    pub invalidate_framebuffer: Option<InvalidateEntry>,
    /// Range mapping.
    pub map_buffer_range: Option<MapRangeEntry>,
    /// How buffer ranges are zeroed.
    pub buffer_clear: BufferClearEntry,
    /// How frame completion is tracked.
    pub fence: FenceEntry,
    /// Object labels.
    pub debug_label: Option<DebugLabelEntry>,
    /// Timer queries.
    pub query: Option<QueryEntry>,
    /// Advanced blend equations.
    pub blend_advanced: Option<BlendAdvancedEntry>,
}

impl EntryPoints {
    /// Selects the best available tier for each feature.
    pub fn resolve(caps: &GraphicsCaps) -> Self {
        let level = caps.level;
        let ext = &caps.extensions;
        let native = level.is_core() || !level.is_es2();

        let vertex_array = match (caps.has_vertex_array_object, native) {
            (false, _) => None,
            (true, true) => Some(VertexArrayEntry::Core),
            (true, false) => Some(VertexArrayEntry::Oes),
        };

        let draw_buffers = if !caps.has_draw_buffers {
            None
        } else if native {
            Some(DrawBuffersEntry::Core)
        } else if ext.has_any(&["WEBGL_draw_buffers", "GL_EXT_draw_buffers"]) {
            Some(DrawBuffersEntry::Ext)
        } else {
            Some(DrawBuffersEntry::Nv)
        };

        let invalidate_framebuffer = if !caps.has_invalidate_framebuffer {
            None
        } else if level.is_core_at_least(FeatureLevel::Core43)
            || level.is_es_at_least(FeatureLevel::Es3)
            || ext.has("GL_ARB_invalidate_subdata")
        {
            Some(InvalidateEntry::Core)
        } else {
            Some(InvalidateEntry::DiscardExt)
        };

        let map_buffer_range = match (caps.has_map_buffer_range, native) {
            (false, _) => None,
            (true, true) => Some(MapRangeEntry::Core),
            (true, false) => Some(MapRangeEntry::Ext),
        };

        let buffer_clear = if caps.has_buffer_clear {
            BufferClearEntry::ClearBufferData
        } else {
            BufferClearEntry::UploadZeros
        };

        let fence = if caps.has_fence_sync {
            FenceEntry::FenceSync
        } else {
            FenceEntry::FrameDelay
        };

        let debug_label = if !caps.has_debug_label {
            None
        } else if level.is_core_at_least(FeatureLevel::Core43) || ext.has("GL_KHR_debug")
        {
            Some(DebugLabelEntry::Khr)
        } else {
            Some(DebugLabelEntry::Ext)
        };

        let query = if !caps.has_timer_query {
            None
        } else if level.is_core() {
            Some(QueryEntry::Core)
        } else {
            Some(QueryEntry::Ext)
        };

        let blend_advanced = if !caps.has_blend_advanced {
            None
        } else if ext.has("GL_KHR_blend_equation_advanced") {
            Some(BlendAdvancedEntry::Khr)
        } else {
            Some(BlendAdvancedEntry::Nv)
        };

        let entries = Self {
            vertex_array,
            draw_buffers,
            invalidate_framebuffer,
            map_buffer_range,
            buffer_clear,
            fence,
            debug_label,
            query,
            blend_advanced,
        };
        log::debug!("EntryPoints: resolved {entries:?}");
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::recorder::RecordingGl;

    fn resolve(version: &str, extensions: &[&str]) -> EntryPoints {
        let mut gl = RecordingGl::new()
            .with_version(version)
            .with_extensions(extensions);
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Core45, false).unwrap();
        EntryPoints::resolve(&caps)
    }

    #[test]
    fn test_es2_uses_extension_tiers() {
        let entries = resolve(
            "OpenGL ES 2.0",
            &[
                "GL_OES_vertex_array_object",
                "GL_EXT_discard_framebuffer",
                "GL_EXT_map_buffer_range",
                "GL_NV_draw_buffers",
                "GL_NV_fbo_color_attachments",
            ],
        );
        assert_eq!(entries.vertex_array, Some(VertexArrayEntry::Oes));
        assert_eq!(
            entries.invalidate_framebuffer,
            Some(InvalidateEntry::DiscardExt)
        );
        assert_eq!(entries.map_buffer_range, Some(MapRangeEntry::Ext));
        assert_eq!(entries.draw_buffers, Some(DrawBuffersEntry::Nv));
        assert_eq!(entries.fence, FenceEntry::FrameDelay);
        assert_eq!(entries.buffer_clear, BufferClearEntry::UploadZeros);
    }

    #[test]
    fn test_bare_es2_has_no_optional_entries() {
        let entries = resolve("OpenGL ES 2.0", &[]);
        assert_eq!(entries.vertex_array, None);
        assert_eq!(entries.invalidate_framebuffer, None);
        assert_eq!(entries.draw_buffers, None);
        assert_eq!(entries.debug_label, None);
    }

    #[test]
    fn test_core45_uses_core_tiers() {
        let entries = resolve("4.5.0", &["GL_KHR_blend_equation_advanced"]);
        assert_eq!(entries.vertex_array, Some(VertexArrayEntry::Core));
        assert_eq!(entries.invalidate_framebuffer, Some(InvalidateEntry::Core));
        assert_eq!(entries.fence, FenceEntry::FenceSync);
        assert_eq!(entries.buffer_clear, BufferClearEntry::ClearBufferData);
        assert_eq!(entries.debug_label, Some(DebugLabelEntry::Khr));
        assert_eq!(entries.query, Some(QueryEntry::Core));
        assert_eq!(entries.blend_advanced, Some(BlendAdvancedEntry::Khr));
    }
}
