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

//! The native API seam.
//!
//! [`NativeGl`] is the only surface that changes per backend: a loader over
//! real GL function pointers implements it for a live context, and
//! [`RecordingGl`](super::recorder::RecordingGl) implements it headlessly.
//! Methods whose symbol differs between core and extension drivers take the
//! tier resolved by [`EntryPoints`](super::dispatch::EntryPoints).
//!
//! Callers never invoke this trait directly outside of [`GlesApi`](super::api::GlesApi),
//! which owns the binding shadow state.

use super::dispatch::{
    BlendAdvancedEntry, DebugLabelEntry, DrawBuffersEntry, InvalidateEntry, MapRangeEntry,
    QueryEntry, VertexArrayEntry,
};
use super::gl::{GLbitfield, GLenum, GLsync, GLuint};
use std::ptr::NonNull;

/// Raw access to one GL / GLES context.
pub trait NativeGl {
    // --- Context queries ---

    /// `glGetString`.
    fn get_string(&mut self, name: GLenum) -> Option<String>;
    /// `glGetStringi`.
    fn get_string_i(&mut self, name: GLenum, index: u32) -> Option<String>;
    /// `glGetIntegerv` for a single value.
    fn get_integer(&mut self, name: GLenum) -> i32;

    // --- Buffers ---

    /// `glGenBuffers` for one name; `0` on failure.
    fn gen_buffer(&mut self) -> GLuint;
    /// `glDeleteBuffers` for one name.
    fn delete_buffer(&mut self, buffer: GLuint);
    /// `glBindBuffer`.
    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint);
    /// `glBufferData`. `data` of `None` allocates uninitialized storage.
    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    /// `glBufferSubData`.
    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]);
    /// `glMapBufferRange`. The pointer stays valid for `length` bytes until unmap.
    fn map_buffer_range(
        &mut self,
        entry: MapRangeEntry,
        target: GLenum,
        offset: usize,
        length: usize,
        access: GLbitfield,
    ) -> Option<NonNull<u8>>;
    /// `glUnmapBuffer`. Returns `false` if the contents were lost.
    fn unmap_buffer(&mut self, target: GLenum) -> bool;
    /// `glFlushMappedBufferRange`.
    fn flush_mapped_buffer_range(
        &mut self,
        entry: MapRangeEntry,
        target: GLenum,
        offset: usize,
        length: usize,
    );
    /// `glCopyBufferSubData`.
    fn copy_buffer_sub_data(
        &mut self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: usize,
        write_offset: usize,
        size: usize,
    );
    /// `glClearBufferSubData` with a zero pattern.
    fn clear_buffer_sub_data(&mut self, target: GLenum, offset: usize, size: usize);

    // --- Sync ---

    /// `glFenceSync(GL_SYNC_GPU_COMMANDS_COMPLETE, 0)`; `0` on failure.
    fn fence_sync(&mut self) -> GLsync;
    /// `glClientWaitSync`, returning the wait status.
    fn client_wait_sync(&mut self, sync: GLsync, flags: GLbitfield, timeout_ns: u64) -> GLenum;
    /// `glDeleteSync`.
    fn delete_sync(&mut self, sync: GLsync);

    // --- Framebuffers ---

    /// `glGenFramebuffers` for one name; `0` on failure.
    fn gen_framebuffer(&mut self) -> GLuint;
    /// `glDeleteFramebuffers` for one name.
    fn delete_framebuffer(&mut self, framebuffer: GLuint);
    /// `glBindFramebuffer`.
    fn bind_framebuffer(&mut self, target: GLenum, framebuffer: GLuint);
    /// `glFramebufferTexture2D`.
    fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture: GLuint,
        level: i32,
    );
    /// `glFramebufferTextureLayer`.
    fn framebuffer_texture_layer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
        layer: i32,
    );
    /// `glFramebufferTexture`, attaching every layer.
    fn framebuffer_texture(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
    );
    /// `glFramebufferTexture2DMultisampleEXT`.
    fn framebuffer_texture_2d_multisample(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture: GLuint,
        level: i32,
        samples: i32,
    );
    /// `glFramebufferRenderbuffer`.
    fn framebuffer_renderbuffer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer: GLuint,
    );
    /// `glDrawBuffers`.
    fn draw_buffers(&mut self, entry: DrawBuffersEntry, buffers: &[GLenum]);
    /// `glCheckFramebufferStatus`.
    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum;
    /// `glInvalidateFramebuffer` / `glDiscardFramebufferEXT`.
    fn invalidate_framebuffer(
        &mut self,
        entry: InvalidateEntry,
        target: GLenum,
        attachments: &[GLenum],
    );
    /// `glObjectLabel` / `glLabelObjectEXT`.
    fn object_label(
        &mut self,
        entry: DebugLabelEntry,
        identifier: GLenum,
        name: GLuint,
        label: &str,
    );

    // --- Vertex arrays ---

    /// `glGenVertexArrays` for one name; `0` on failure.
    fn gen_vertex_array(&mut self, entry: VertexArrayEntry) -> GLuint;
    /// `glDeleteVertexArrays` for one name.
    fn delete_vertex_array(&mut self, entry: VertexArrayEntry, vertex_array: GLuint);
    /// `glBindVertexArray`.
    fn bind_vertex_array(&mut self, entry: VertexArrayEntry, vertex_array: GLuint);
    /// `glIsVertexArray`.
    fn is_vertex_array(&mut self, entry: VertexArrayEntry, vertex_array: GLuint) -> bool;

    // --- Queries ---

    /// `glGenQueries` for one name; `0` on failure.
    fn gen_query(&mut self, entry: QueryEntry) -> GLuint;
    /// `glDeleteQueries` for one name.
    fn delete_query(&mut self, entry: QueryEntry, query: GLuint);

    // --- Fixed-function state ---

    /// `glEnable`.
    fn enable(&mut self, capability: GLenum);
    /// `glDisable`.
    fn disable(&mut self, capability: GLenum);
    /// `glBlendFuncSeparate`.
    fn blend_func_separate(
        &mut self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    );
    /// `glBlendEquationSeparate`.
    fn blend_equation_separate(&mut self, mode_rgb: GLenum, mode_alpha: GLenum);
    /// `glBlendEquation` with an advanced mode.
    fn blend_equation_advanced(&mut self, entry: BlendAdvancedEntry, mode: GLenum);
    /// `glColorMask`.
    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);
    /// `glDepthFunc`.
    fn depth_func(&mut self, func: GLenum);
    /// `glDepthMask`.
    fn depth_mask(&mut self, write: bool);
    /// `glStencilFuncSeparate`.
    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32);
    /// `glStencilOpSeparate`.
    fn stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    );
    /// `glStencilMask`.
    fn stencil_mask(&mut self, mask: u32);
    /// `glCullFace`.
    fn cull_face(&mut self, face: GLenum);
    /// `glPolygonOffset`.
    fn polygon_offset(&mut self, factor: f32, units: f32);
    /// `glViewport`.
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    /// `glScissor`.
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);

    // --- Clears ---

    /// `glClearColor`.
    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32);
    /// `glClearDepthf`.
    fn clear_depth(&mut self, depth: f32);
    /// `glClearStencil`.
    fn clear_stencil(&mut self, stencil: i32);
    /// `glClear`.
    fn clear(&mut self, mask: GLbitfield);
}
