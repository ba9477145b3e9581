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

//! The checked native API used by every manager.
//!
//! [`GlesApi`] wraps the raw [`NativeGl`] seam with the detected capabilities,
//! the resolved entry points and a shadow of the binding and enable state so
//! redundant driver calls are dropped. The shadow mirrors the driver only as
//! long as nobody else touches the context; [`GlesApi::invalidate`] forgets it.

use super::caps::GraphicsCaps;
use super::dispatch::{BufferClearEntry, EntryPoints, FenceEntry};
use super::gl::{self, GLbitfield, GLenum, GLsync, GLuint};
use super::handle::{ContextId, FramebufferHandle, QueryHandle, VertexArrayHandle};
use super::native::NativeGl;
use super::settings::GlesSettings;
use super::translate::{self, BufferTarget, FramebufferTarget, IntoGl, Translate};
use bitflags::bitflags;
use khora_gfx_core::renderer::api::buffer::MapAccess;
use khora_gfx_core::renderer::api::pipeline::enums::CullMode;
use khora_gfx_core::renderer::api::pipeline::state::ColorWrites;
use khora_gfx_core::renderer::api::target::RectInt;
use khora_gfx_core::renderer::DriverError;
use std::collections::HashMap;
use std::ptr::NonNull;

bitflags! {
    /// Server-side capabilities tracked by the enable shadow.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EnableCaps: u32 {
        /// `GL_CULL_FACE`
        const CULL_FACE = 1 << 0;
        /// `GL_DEPTH_TEST`
        const DEPTH_TEST = 1 << 1;
        /// `GL_STENCIL_TEST`
        const STENCIL_TEST = 1 << 2;
        /// `GL_BLEND`
        const BLEND = 1 << 3;
        /// `GL_SCISSOR_TEST`
        const SCISSOR_TEST = 1 << 4;
        /// `GL_POLYGON_OFFSET_FILL`
        const POLYGON_OFFSET_FILL = 1 << 5;
        /// `GL_SAMPLE_ALPHA_TO_COVERAGE`
        const SAMPLE_ALPHA_TO_COVERAGE = 1 << 6;
    }
}

impl EnableCaps {
    const NATIVE: [(EnableCaps, GLenum); 7] = [
        (EnableCaps::CULL_FACE, gl::CULL_FACE),
        (EnableCaps::DEPTH_TEST, gl::DEPTH_TEST),
        (EnableCaps::STENCIL_TEST, gl::STENCIL_TEST),
        (EnableCaps::BLEND, gl::BLEND),
        (EnableCaps::SCISSOR_TEST, gl::SCISSOR_TEST),
        (EnableCaps::POLYGON_OFFSET_FILL, gl::POLYGON_OFFSET_FILL),
        (
            EnableCaps::SAMPLE_ALPHA_TO_COVERAGE,
            gl::SAMPLE_ALPHA_TO_COVERAGE,
        ),
    ];

    /// The native enum of a single capability.
    fn native(self) -> GLenum {
        Self::NATIVE
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or(gl::NONE, |(_, native)| *native)
    }
}

/// What the backend believes is bound. `None` / unknown bits force the next call.
#[derive(Debug, Default)]
struct BindingShadow {
    buffers: HashMap<GLenum, GLuint>,
    draw_framebuffer: Option<GLuint>,
    read_framebuffer: Option<GLuint>,
    vertex_array: Option<GLuint>,
    enabled: EnableCaps,
    known: EnableCaps,
    cull_face: Option<GLenum>,
}

/// The checked, shadow-cached native API of one device.
pub struct GlesApi {
    native: Box<dyn NativeGl>,
    caps: GraphicsCaps,
    translate: Translate,
    entries: EntryPoints,
    context: ContextId,
    caching: bool,
    shadow: BindingShadow,
}

impl GlesApi {
    /// Queries the current context of `native` and resolves its entry points.
    pub fn new(
        mut native: Box<dyn NativeGl>,
        settings: &GlesSettings,
    ) -> Result<Self, DriverError> {
        let mut caps = GraphicsCaps::detect(
            native.as_mut(),
            settings.requested_level,
            settings.clamp_features,
        )?;
        caps.buggy_disable_color_write |= settings.emulate_color_write_disable;
        if !settings.debug_labels {
            caps.has_debug_label = false;
        }
        let translate = Translate::new(&caps);
        let entries = EntryPoints::resolve(&caps);
        Ok(Self {
            native,
            caps,
            translate,
            entries,
            context: ContextId::default(),
            caching: settings.state_caching,
            shadow: BindingShadow::default(),
        })
    }

    /// The detected capabilities.
    pub fn caps(&self) -> &GraphicsCaps {
        &self.caps
    }

    /// The translation tables.
    pub fn translate(&self) -> &Translate {
        &self.translate
    }

    /// The resolved entry points.
    pub fn entry_points(&self) -> &EntryPoints {
        &self.entries
    }

    /// The context native calls currently go to.
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Routes following calls to `context`. The shadow is forgotten.
    pub fn set_context(&mut self, context: ContextId) {
        self.context = context;
        self.invalidate();
    }

    /// Forgets the binding shadow; the next call of every kind reaches the driver.
    pub fn invalidate(&mut self) {
        self.shadow = BindingShadow::default();
    }

    fn skip(&self, cached: bool) -> bool {
        self.caching && cached
    }

    // --- Buffers ---

    /// Creates a buffer name.
    pub fn gen_buffer(&mut self) -> Result<GLuint, DriverError> {
        match self.native.gen_buffer() {
            0 => Err(DriverError::ObjectCreationFailed { object: "buffer" }),
            name => Ok(name),
        }
    }

    /// Deletes a buffer, forgetting any shadowed binding of its name first.
    pub fn delete_buffer(&mut self, buffer: GLuint) {
        if buffer == 0 {
            return;
        }
        self.shadow.buffers.retain(|_, bound| *bound != buffer);
        self.native.delete_buffer(buffer);
    }

    /// Binds `buffer` to `target` unless it already is.
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: GLuint) {
        let native_target = self.translate.buffer_target(target);
        if self.skip(self.shadow.buffers.get(&native_target) == Some(&buffer)) {
            return;
        }
        self.shadow.buffers.insert(native_target, buffer);
        self.native.bind_buffer(native_target, buffer);
    }

    /// Binds `buffer` and (re)allocates its storage.
    pub fn buffer_data(
        &mut self,
        target: BufferTarget,
        buffer: GLuint,
        size: usize,
        data: Option<&[u8]>,
        usage_hint: GLenum,
    ) {
        self.bind_buffer(target, buffer);
        let native_target = self.translate.buffer_target(target);
        self.native
            .buffer_data(native_target, size, data, usage_hint);
    }

    /// Binds `buffer` and uploads `data` at `offset`.
    pub fn buffer_sub_data(
        &mut self,
        target: BufferTarget,
        buffer: GLuint,
        offset: usize,
        data: &[u8],
    ) {
        self.bind_buffer(target, buffer);
        let native_target = self.translate.buffer_target(target);
        self.native.buffer_sub_data(native_target, offset, data);
    }

    /// Binds `buffer` and maps a range of it.
    pub fn map_buffer_range(
        &mut self,
        target: BufferTarget,
        buffer: GLuint,
        offset: usize,
        length: usize,
        access: MapAccess,
    ) -> Result<NonNull<u8>, DriverError> {
        let entry = self
            .entries
            .map_buffer_range
            .ok_or(DriverError::Unsupported {
                feature: "glMapBufferRange",
            })?;
        self.bind_buffer(target, buffer);
        let native_target = self.translate.buffer_target(target);
        self.native
            .map_buffer_range(entry, native_target, offset, length, access.into_gl())
            .ok_or(DriverError::MapFailed { buffer })
    }

    /// Binds `buffer` and unmaps it. Returns `false` if the driver lost the contents.
    pub fn unmap_buffer(&mut self, target: BufferTarget, buffer: GLuint) -> bool {
        self.bind_buffer(target, buffer);
        let native_target = self.translate.buffer_target(target);
        self.native.unmap_buffer(native_target)
    }

    /// Flushes a range of an explicitly flushed mapping. No-op without map-range support.
    pub fn flush_mapped_buffer_range(
        &mut self,
        target: BufferTarget,
        buffer: GLuint,
        offset: usize,
        length: usize,
    ) {
        let Some(entry) = self.entries.map_buffer_range else {
            return;
        };
        self.bind_buffer(target, buffer);
        let native_target = self.translate.buffer_target(target);
        self.native
            .flush_mapped_buffer_range(entry, native_target, offset, length);
    }

    /// Copies `size` bytes between two buffers through the copy binding points.
    pub fn copy_buffer_sub_data(
        &mut self,
        source: GLuint,
        destination: GLuint,
        read_offset: usize,
        write_offset: usize,
        size: usize,
    ) -> Result<(), DriverError> {
        if !self.caps.has_buffer_copy {
            return Err(DriverError::Unsupported {
                feature: "glCopyBufferSubData",
            });
        }
        self.bind_buffer(BufferTarget::CopyRead, source);
        self.bind_buffer(BufferTarget::CopyWrite, destination);
        self.native.copy_buffer_sub_data(
            self.translate.buffer_target(BufferTarget::CopyRead),
            self.translate.buffer_target(BufferTarget::CopyWrite),
            read_offset,
            write_offset,
            size,
        );
        Ok(())
    }

    /// Zero-fills a range of `buffer`.
    pub fn clear_buffer_sub_data(
        &mut self,
        target: BufferTarget,
        buffer: GLuint,
        offset: usize,
        size: usize,
    ) {
        self.bind_buffer(target, buffer);
        let native_target = self.translate.buffer_target(target);
        match self.entries.buffer_clear {
            BufferClearEntry::ClearBufferData => {
                self.native
                    .clear_buffer_sub_data(native_target, offset, size);
            }
            BufferClearEntry::UploadZeros => {
                let zeros = vec![0u8; size];
                self.native.buffer_sub_data(native_target, offset, &zeros);
            }
        }
    }

    // --- Sync ---

    /// Inserts a fence after every command submitted so far.
    ///
    /// Returns `Ok(None)` when the driver has no sync objects.
    pub fn fence_sync(&mut self) -> Result<Option<GLsync>, DriverError> {
        match self.entries.fence {
            FenceEntry::FrameDelay => Ok(None),
            FenceEntry::FenceSync => match self.native.fence_sync() {
                0 => Err(DriverError::FenceCreationFailed),
                sync => Ok(Some(sync)),
            },
        }
    }

    /// Polls a fence without blocking.
    pub fn is_fence_signaled(&mut self, sync: GLsync) -> bool {
        matches!(
            self.native.client_wait_sync(sync, 0, 0),
            gl::ALREADY_SIGNALED | gl::CONDITION_SATISFIED
        )
    }

    /// Deletes a fence.
    pub fn delete_sync(&mut self, sync: GLsync) {
        self.native.delete_sync(sync);
    }

    // --- Framebuffers ---

    /// Creates a framebuffer in the current context.
    pub fn gen_framebuffer(&mut self) -> Result<FramebufferHandle, DriverError> {
        match self.native.gen_framebuffer() {
            0 => Err(DriverError::ObjectCreationFailed {
                object: "framebuffer",
            }),
            name => Ok(FramebufferHandle::new(self.context, name)),
        }
    }

    /// Deletes a framebuffer, rebinding `default` first if it is bound.
    pub fn delete_framebuffer(
        &mut self,
        framebuffer: FramebufferHandle,
        default: FramebufferHandle,
    ) {
        if framebuffer.is_zero() || !framebuffer.is_valid() {
            return;
        }
        let name = framebuffer.name_in(self.context);
        if self.shadow.draw_framebuffer == Some(name) {
            self.bind_framebuffer(FramebufferTarget::Draw, default);
        }
        if self.shadow.read_framebuffer == Some(name) {
            self.bind_framebuffer(FramebufferTarget::Read, default);
        }
        self.native.delete_framebuffer(name);
    }

    /// Binds a framebuffer unless it already is.
    pub fn bind_framebuffer(&mut self, target: FramebufferTarget, framebuffer: FramebufferHandle) {
        let name = framebuffer.name_in(self.context);
        let native_target = self.translate.framebuffer_target(target);
        let aliased = native_target == gl::FRAMEBUFFER;
        let bound_both = self.shadow.draw_framebuffer == Some(name)
            && self.shadow.read_framebuffer == Some(name);
        let cached = match target {
            FramebufferTarget::Draw => self.shadow.draw_framebuffer == Some(name),
            FramebufferTarget::Read => self.shadow.read_framebuffer == Some(name),
        } && (!aliased || bound_both);
        if self.skip(cached) {
            return;
        }
        if aliased || target == FramebufferTarget::Draw {
            self.shadow.draw_framebuffer = Some(name);
        }
        if aliased || target == FramebufferTarget::Read {
            self.shadow.read_framebuffer = Some(name);
        }
        self.native.bind_framebuffer(native_target, name);
    }

    /// The framebuffer bound to `target`, asking the driver when the shadow is unknown.
    pub fn framebuffer_binding(&mut self, target: FramebufferTarget) -> FramebufferHandle {
        let shadowed = match target {
            FramebufferTarget::Draw => self.shadow.draw_framebuffer,
            FramebufferTarget::Read => self.shadow.read_framebuffer,
        };
        let name = shadowed.unwrap_or_else(|| {
            let query = match target {
                FramebufferTarget::Draw => gl::DRAW_FRAMEBUFFER_BINDING,
                FramebufferTarget::Read if self.caps.has_read_draw_framebuffer => {
                    gl::READ_FRAMEBUFFER_BINDING
                }
                FramebufferTarget::Read => gl::FRAMEBUFFER_BINDING,
            };
            let name = self.native.get_integer(query).max(0) as GLuint;
            match target {
                FramebufferTarget::Draw => self.shadow.draw_framebuffer = Some(name),
                FramebufferTarget::Read => self.shadow.read_framebuffer = Some(name),
            }
            name
        });
        FramebufferHandle::new(self.context, name)
    }

    fn attachment_target(&self) -> GLenum {
        self.caps.framebuffer_target_for_attachments
    }

    /// Attaches a 2D texture (or cube face) level to the bound draw framebuffer.
    pub fn attach_texture_2d(
        &mut self,
        attachment: GLenum,
        texture_target: GLenum,
        texture: GLuint,
        level: i32,
    ) {
        let target = self.attachment_target();
        self.native
            .framebuffer_texture_2d(target, attachment, texture_target, texture, level);
    }

    /// Attaches one layer of a layered texture.
    pub fn attach_texture_layer(
        &mut self,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
        layer: i32,
    ) {
        let target = self.attachment_target();
        self.native
            .framebuffer_texture_layer(target, attachment, texture, level, layer);
    }

    /// Attaches every layer of a layered texture.
    pub fn attach_texture(&mut self, attachment: GLenum, texture: GLuint, level: i32) {
        let target = self.attachment_target();
        self.native
            .framebuffer_texture(target, attachment, texture, level);
    }

    /// Attaches a texture with implicit multisample resolve.
    pub fn attach_texture_2d_multisample(
        &mut self,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
        samples: u32,
    ) {
        let target = self.attachment_target();
        self.native.framebuffer_texture_2d_multisample(
            target,
            attachment,
            gl::TEXTURE_2D,
            texture,
            level,
            samples as i32,
        );
    }

    /// Attaches a renderbuffer; `0` detaches.
    pub fn attach_renderbuffer(&mut self, attachment: GLenum, renderbuffer: GLuint) {
        let target = self.attachment_target();
        self.native
            .framebuffer_renderbuffer(target, attachment, renderbuffer);
    }

    /// Selects the draw buffers of the bound framebuffer. No-op without draw buffers.
    pub fn draw_buffers(&mut self, buffers: &[GLenum]) {
        if let Some(entry) = self.entries.draw_buffers {
            self.native.draw_buffers(entry, buffers);
        }
    }

    /// Completeness status of the bound draw framebuffer.
    pub fn check_framebuffer_status(&mut self) -> GLenum {
        let target = self.translate.framebuffer_target(FramebufferTarget::Draw);
        self.native.check_framebuffer_status(target)
    }

    /// Tells the driver the contents of `attachments` are no longer needed.
    ///
    /// Returns `false` when the driver has no invalidation entry point.
    pub fn invalidate_framebuffer(&mut self, attachments: &[GLenum]) -> bool {
        let Some(entry) = self.entries.invalidate_framebuffer else {
            return false;
        };
        if !attachments.is_empty() {
            self.native
                .invalidate_framebuffer(entry, gl::FRAMEBUFFER, attachments);
        }
        true
    }

    /// Labels a framebuffer for debuggers. No-op without label support.
    pub fn label_framebuffer(&mut self, framebuffer: FramebufferHandle, label: &str) {
        if let Some(entry) = self.entries.debug_label {
            let name = framebuffer.name_in(self.context);
            self.native
                .object_label(entry, gl::FRAMEBUFFER_LABEL, name, label);
        }
    }

    // --- Vertex arrays ---

    /// Creates a vertex array in the current context.
    pub fn create_vertex_array(&mut self) -> Result<VertexArrayHandle, DriverError> {
        let entry = self
            .entries
            .vertex_array
            .ok_or(DriverError::Unsupported {
                feature: "vertex array objects",
            })?;
        match self.native.gen_vertex_array(entry) {
            0 => Err(DriverError::ObjectCreationFailed {
                object: "vertex array",
            }),
            name => Ok(VertexArrayHandle::new(self.context, name)),
        }
    }

    /// Deletes a vertex array.
    pub fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        let Some(entry) = self.entries.vertex_array else {
            return;
        };
        if vertex_array.is_zero() {
            return;
        }
        let name = vertex_array.name_in(self.context);
        if self.shadow.vertex_array == Some(name) {
            self.shadow.vertex_array = Some(0);
        }
        self.native.delete_vertex_array(entry, name);
    }

    /// Binds a vertex array unless it already is.
    pub fn bind_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        let Some(entry) = self.entries.vertex_array else {
            return;
        };
        let name = vertex_array.name_in(self.context);
        if self.skip(self.shadow.vertex_array == Some(name)) {
            return;
        }
        self.shadow.vertex_array = Some(name);
        self.native.bind_vertex_array(entry, name);
    }

    /// Asks the driver whether `vertex_array` still names a vertex array.
    pub fn is_vertex_array(&mut self, vertex_array: VertexArrayHandle) -> bool {
        let Some(entry) = self.entries.vertex_array else {
            return false;
        };
        let name = vertex_array.name_in(self.context);
        self.native.is_vertex_array(entry, name)
    }

    // --- Queries ---

    /// Creates a timer query object.
    pub fn create_query(&mut self) -> Result<QueryHandle, DriverError> {
        let entry = self
            .entries
            .query
            .ok_or(DriverError::Unsupported {
                feature: "timer queries",
            })?;
        match self.native.gen_query(entry) {
            0 => Err(DriverError::ObjectCreationFailed { object: "query" }),
            name => Ok(QueryHandle::new(self.context, name)),
        }
    }

    /// Deletes a query object.
    pub fn delete_query(&mut self, query: QueryHandle) {
        if let Some(entry) = self.entries.query {
            self.native.delete_query(entry, query.name_in(self.context));
        }
    }

    // --- Fixed-function state ---

    /// Enables or disables a capability unless it already is.
    pub fn set_enabled(&mut self, capability: EnableCaps, enabled: bool) {
        let known = self.shadow.known.contains(capability);
        let current = self.shadow.enabled.contains(capability);
        if self.skip(known && current == enabled) {
            return;
        }
        self.shadow.known |= capability;
        self.shadow.enabled.set(capability, enabled);
        if enabled {
            self.native.enable(capability.native());
        } else {
            self.native.disable(capability.native());
        }
    }

    /// `glEnable` through the shadow.
    pub fn enable(&mut self, capability: EnableCaps) {
        self.set_enabled(capability, true);
    }

    /// `glDisable` through the shadow.
    pub fn disable(&mut self, capability: EnableCaps) {
        self.set_enabled(capability, false);
    }

    /// Applies a cull mode: toggles face culling and selects the culled face.
    pub fn set_cull_mode(&mut self, mode: CullMode) {
        match translate::cull_face(mode) {
            None => self.disable(EnableCaps::CULL_FACE),
            Some(face) => {
                self.enable(EnableCaps::CULL_FACE);
                if self.skip(self.shadow.cull_face == Some(face)) {
                    return;
                }
                self.shadow.cull_face = Some(face);
                self.native.cull_face(face);
            }
        }
    }

    /// `glBlendFuncSeparate`.
    pub fn blend_func_separate(
        &mut self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        self.native
            .blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    /// `glBlendEquationSeparate`.
    pub fn blend_equation_separate(&mut self, rgb: GLenum, alpha: GLenum) {
        self.native.blend_equation_separate(rgb, alpha);
    }

    /// Single advanced blend equation. Returns `false` without driver support.
    pub fn blend_equation_advanced(&mut self, mode: GLenum) -> bool {
        match self.entries.blend_advanced {
            Some(entry) => {
                self.native.blend_equation_advanced(entry, mode);
                true
            }
            None => false,
        }
    }

    /// `glColorMask`.
    pub fn color_mask(&mut self, mask: ColorWrites) {
        self.native.color_mask(
            mask.contains(ColorWrites::R),
            mask.contains(ColorWrites::G),
            mask.contains(ColorWrites::B),
            mask.contains(ColorWrites::A),
        );
    }

    /// `glDepthFunc`.
    pub fn depth_func(&mut self, func: GLenum) {
        self.native.depth_func(func);
    }

    /// `glDepthMask`.
    pub fn depth_mask(&mut self, write: bool) {
        self.native.depth_mask(write);
    }

    /// `glStencilFuncSeparate`.
    pub fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32) {
        self.native
            .stencil_func_separate(face, func, reference, mask);
    }

    /// `glStencilOpSeparate`.
    pub fn stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    ) {
        self.native
            .stencil_op_separate(face, stencil_fail, depth_fail, depth_pass);
    }

    /// `glStencilMask`.
    pub fn stencil_mask(&mut self, mask: u32) {
        self.native.stencil_mask(mask);
    }

    /// `glPolygonOffset`.
    pub fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.native.polygon_offset(factor, units);
    }

    /// `glViewport`.
    pub fn viewport(&mut self, rect: RectInt) {
        self.native
            .viewport(rect.x, rect.y, rect.width, rect.height);
    }

    /// `glScissor`.
    pub fn scissor(&mut self, rect: RectInt) {
        self.native.scissor(rect.x, rect.y, rect.width, rect.height);
    }

    /// Sets the clear values of the aspects in `mask` and clears them.
    pub fn clear(&mut self, mask: GLbitfield, color: [f32; 4], depth: f32, stencil: i32) {
        if mask & gl::COLOR_BUFFER_BIT != 0 {
            let [r, g, b, a] = color;
            self.native.clear_color(r, g, b, a);
        }
        if mask & gl::DEPTH_BUFFER_BIT != 0 {
            self.native.clear_depth(depth);
        }
        if mask & gl::STENCIL_BUFFER_BIT != 0 {
            self.native.clear_stencil(stencil);
        }
        if mask != 0 {
            self.native.clear(mask);
        }
    }
}

impl std::fmt::Debug for GlesApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlesApi")
            .field("level", &self.caps.level)
            .field("renderer", &self.caps.renderer_string)
            .field("context", &self.context)
            .field("caching", &self.caching)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::recorder::{CallLog, GlCall, RecordingGl};

    fn api_with(gl: RecordingGl, settings: &GlesSettings) -> (GlesApi, CallLog) {
        let log = gl.log();
        let api = GlesApi::new(Box::new(gl), settings).unwrap();
        log.clear();
        (api, log)
    }

    fn api() -> (GlesApi, CallLog) {
        api_with(RecordingGl::new(), &GlesSettings::default())
    }

    #[test]
    fn test_redundant_binds_are_dropped() {
        let (mut api, log) = api();
        let buffer = api.gen_buffer().unwrap();
        api.bind_buffer(BufferTarget::Array, buffer);
        api.bind_buffer(BufferTarget::Array, buffer);
        assert_eq!(log.count(|c| matches!(c, GlCall::BindBuffer { .. })), 1);

        api.invalidate();
        api.bind_buffer(BufferTarget::Array, buffer);
        assert_eq!(log.count(|c| matches!(c, GlCall::BindBuffer { .. })), 2);
    }

    #[test]
    fn test_caching_disabled_reissues_everything() {
        let settings = GlesSettings {
            state_caching: false,
            ..GlesSettings::default()
        };
        let (mut api, log) = api_with(RecordingGl::new(), &settings);
        api.enable(EnableCaps::BLEND);
        api.enable(EnableCaps::BLEND);
        assert_eq!(log.count(|c| *c == GlCall::Enable(gl::BLEND)), 2);
    }

    #[test]
    fn test_deleted_buffer_name_is_not_considered_bound() {
        let (mut api, log) = api();
        let buffer = api.gen_buffer().unwrap();
        api.bind_buffer(BufferTarget::CopyWrite, buffer);
        api.delete_buffer(buffer);
        api.bind_buffer(BufferTarget::CopyWrite, buffer);
        assert_eq!(log.count(|c| matches!(c, GlCall::BindBuffer { .. })), 2);
    }

    #[test]
    fn test_deleting_bound_framebuffer_rebinds_default() {
        let (mut api, log) = api();
        let framebuffer = api.gen_framebuffer().unwrap();
        api.bind_framebuffer(FramebufferTarget::Draw, framebuffer);
        api.delete_framebuffer(framebuffer, FramebufferHandle::ZERO);
        let rebind_default = GlCall::BindFramebuffer {
            target: gl::DRAW_FRAMEBUFFER,
            framebuffer: 0,
        };
        assert!(log.contains(&rebind_default));
        let bound = api.framebuffer_binding(FramebufferTarget::Draw);
        assert_eq!(bound, FramebufferHandle::ZERO);
    }

    #[test]
    fn test_framebuffer_binding_queries_driver_when_unknown() {
        let (mut api, log) = api();
        log.rebind_draw_framebuffer_externally(12);
        api.invalidate();
        assert_eq!(api.framebuffer_binding(FramebufferTarget::Draw).raw(), 12);
    }

    #[test]
    fn test_cull_mode_toggles_and_selects_face() {
        let (mut api, log) = api();
        api.set_cull_mode(CullMode::Back);
        api.set_cull_mode(CullMode::Back);
        api.set_cull_mode(CullMode::Off);
        assert_eq!(
            log.calls(),
            vec![
                GlCall::Enable(gl::CULL_FACE),
                GlCall::CullFace(gl::BACK),
                GlCall::Disable(gl::CULL_FACE),
            ]
        );
    }

    #[test]
    fn test_es2_buffer_clear_uploads_zeros() {
        let gl = RecordingGl::new().with_version("OpenGL ES 2.0");
        let (mut api, log) = api_with(gl, &GlesSettings::default());
        let buffer = api.gen_buffer().unwrap();
        api.buffer_data(BufferTarget::Array, buffer, 8, None, gl::DYNAMIC_DRAW);
        api.clear_buffer_sub_data(BufferTarget::Array, buffer, 0, 8);
        let zeros = GlCall::BufferSubData {
            target: gl::ARRAY_BUFFER,
            offset: 0,
            size: 8,
        };
        assert!(log.contains(&zeros));
        let clears = log.count(|c| matches!(c, GlCall::ClearBufferSubData { .. }));
        assert_eq!(clears, 0);
    }

    #[test]
    fn test_frame_delay_without_fences() {
        let gl = RecordingGl::new().with_version("OpenGL ES 2.0");
        let (mut api, _log) = api_with(gl, &GlesSettings::default());
        assert_eq!(api.fence_sync(), Ok(None));
        let vertex_array = api.create_vertex_array();
        assert!(matches!(vertex_array, Err(DriverError::Unsupported { .. })));
    }

    #[test]
    fn test_clear_sets_only_requested_values() {
        let (mut api, log) = api();
        api.clear(gl::DEPTH_BUFFER_BIT, [0.0; 4], 1.0, 0);
        let expected = vec![GlCall::ClearDepth(1.0), GlCall::Clear(gl::DEPTH_BUFFER_BIT)];
        assert_eq!(log.calls(), expected);
    }
}
