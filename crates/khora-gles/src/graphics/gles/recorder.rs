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

//! A headless [`NativeGl`] that records every call.
//!
//! `RecordingGl` behaves like a minimal driver: it hands out monotonically
//! increasing object names, keeps buffer storage in memory so mapped ranges
//! are real, tracks framebuffer and vertex array bindings, and lets the owner
//! decide when fences signal. The shared [`CallLog`] handle stays with the
//! test after the recorder has been boxed into a backend.

use super::caps::DriverVersion;
use super::dispatch::{
    BlendAdvancedEntry, DebugLabelEntry, DrawBuffersEntry, InvalidateEntry, MapRangeEntry,
    QueryEntry, VertexArrayEntry,
};
use super::gl::{self, GLbitfield, GLenum, GLsync, GLuint};
use super::native::NativeGl;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ptr::NonNull;
use std::rc::Rc;

/// One recorded native call.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum GlCall {
    GenBuffer(GLuint),
    DeleteBuffer(GLuint),
    BindBuffer { target: GLenum, buffer: GLuint },
    BufferData {
        target: GLenum,
        size: usize,
        with_data: bool,
        usage: GLenum,
    },
    BufferSubData {
        target: GLenum,
        offset: usize,
        size: usize,
    },
    MapBufferRange {
        target: GLenum,
        offset: usize,
        length: usize,
        access: GLbitfield,
    },
    UnmapBuffer { target: GLenum },
    FlushMappedBufferRange {
        target: GLenum,
        offset: usize,
        length: usize,
    },
    CopyBufferSubData {
        read_target: GLenum,
        write_target: GLenum,
        read_offset: usize,
        write_offset: usize,
        size: usize,
    },
    ClearBufferSubData {
        target: GLenum,
        offset: usize,
        size: usize,
    },
    FenceSync(GLsync),
    ClientWaitSync(GLsync),
    DeleteSync(GLsync),
    GenFramebuffer(GLuint),
    DeleteFramebuffer(GLuint),
    BindFramebuffer { target: GLenum, framebuffer: GLuint },
    FramebufferTexture2D {
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture: GLuint,
        level: i32,
    },
    FramebufferTextureLayer {
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
        layer: i32,
    },
    FramebufferTexture {
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
    },
    FramebufferTexture2DMultisample {
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
        samples: i32,
    },
    FramebufferRenderbuffer {
        target: GLenum,
        attachment: GLenum,
        renderbuffer: GLuint,
    },
    DrawBuffers(Vec<GLenum>),
    CheckFramebufferStatus(GLenum),
    InvalidateFramebuffer {
        target: GLenum,
        attachments: Vec<GLenum>,
    },
    ObjectLabel {
        identifier: GLenum,
        name: GLuint,
        label: String,
    },
    GenVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    BindVertexArray(GLuint),
    IsVertexArray(GLuint),
    GenQuery(GLuint),
    DeleteQuery(GLuint),
    Enable(GLenum),
    Disable(GLenum),
    BlendFuncSeparate {
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    },
    BlendEquationSeparate { rgb: GLenum, alpha: GLenum },
    BlendEquation(GLenum),
    ColorMask([bool; 4]),
    DepthFunc(GLenum),
    DepthMask(bool),
    StencilFuncSeparate {
        face: GLenum,
        func: GLenum,
        reference: i32,
        mask: u32,
    },
    StencilOpSeparate {
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    },
    StencilMask(u32),
    CullFace(GLenum),
    PolygonOffset { factor: f32, units: f32 },
    Viewport([i32; 4]),
    Scissor([i32; 4]),
    ClearColor([f32; 4]),
    ClearDepth(f32),
    ClearStencil(i32),
    Clear(GLbitfield),
}

#[derive(Debug)]
struct RecorderState {
    calls: Vec<GlCall>,
    next_name: GLuint,
    next_sync: GLsync,

    version: String,
    vendor: String,
    renderer: String,
    extensions: Vec<String>,
    integers: HashMap<GLenum, i32>,

    buffer_bindings: HashMap<GLenum, GLuint>,
    buffers: HashMap<GLuint, Vec<u8>>,
    mapped: HashSet<GLuint>,
    framebuffers: HashSet<GLuint>,
    draw_framebuffer: GLuint,
    read_framebuffer: GLuint,
    vertex_arrays: HashSet<GLuint>,
    vertex_array: GLuint,
    queries: HashSet<GLuint>,
    fences: BTreeMap<GLsync, bool>,

    auto_signal_fences: bool,
    framebuffer_status: GLenum,
    fail_object_creation: bool,
}

impl Default for RecorderState {
    fn default() -> Self {
        let integers = HashMap::from([
            (gl::MAX_COLOR_ATTACHMENTS, 8),
            (gl::MAX_DRAW_BUFFERS, 8),
            (gl::MAX_VERTEX_ATTRIBS, 16),
            (gl::MAX_UNIFORM_BUFFER_BINDINGS, 72),
            (gl::MAX_SAMPLES, 4),
        ]);
        Self {
            calls: Vec::new(),
            next_name: 1,
            next_sync: 1,
            version: "OpenGL ES 3.2 Khora Recorder".to_owned(),
            vendor: "Khora".to_owned(),
            renderer: "Khora Recording Device".to_owned(),
            extensions: Vec::new(),
            integers,
            buffer_bindings: HashMap::new(),
            buffers: HashMap::new(),
            mapped: HashSet::new(),
            framebuffers: HashSet::new(),
            draw_framebuffer: 0,
            read_framebuffer: 0,
            vertex_arrays: HashSet::new(),
            vertex_array: 0,
            queries: HashSet::new(),
            fences: BTreeMap::new(),
            auto_signal_fences: true,
            framebuffer_status: gl::FRAMEBUFFER_COMPLETE,
            fail_object_creation: false,
        }
    }
}

impl RecorderState {
    fn record(&mut self, call: GlCall) {
        self.calls.push(call);
    }

    fn allocate_name(&mut self) -> GLuint {
        if self.fail_object_creation {
            return 0;
        }
        let name = self.next_name;
        self.next_name += 1;
        name
    }

    fn bound_buffer(&self, target: GLenum) -> GLuint {
        self.buffer_bindings.get(&target).copied().unwrap_or(0)
    }

    fn bound_storage(&mut self, target: GLenum) -> Option<&mut Vec<u8>> {
        let buffer = self.bound_buffer(target);
        self.buffers.get_mut(&buffer)
    }
}

/// Shared view of a [`RecordingGl`]'s log and controls.
#[derive(Debug, Clone)]
pub struct CallLog(Rc<RefCell<RecorderState>>);

impl CallLog {
    /// Every call recorded so far.
    pub fn calls(&self) -> Vec<GlCall> {
        self.0.borrow().calls.clone()
    }

    /// Number of calls recorded so far.
    pub fn len(&self) -> usize {
        self.0.borrow().calls.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().calls.is_empty()
    }

    /// Forgets recorded calls; object state is kept.
    pub fn clear(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        let state = self.0.borrow();
        state.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Returns `true` if `call` was recorded.
    pub fn contains(&self, call: &GlCall) -> bool {
        self.0.borrow().calls.contains(call)
    }

    /// Signals every outstanding fence.
    pub fn signal_all_fences(&self) {
        for signaled in self.0.borrow_mut().fences.values_mut() {
            *signaled = true;
        }
    }

    /// Signals the `count` oldest unsignaled fences.
    pub fn signal_oldest_fences(&self, count: usize) {
        let mut state = self.0.borrow_mut();
        state
            .fences
            .values_mut()
            .filter(|signaled| !**signaled)
            .take(count)
            .for_each(|signaled| *signaled = true);
    }

    /// Number of fences not yet deleted.
    pub fn live_fence_count(&self) -> usize {
        self.0.borrow().fences.len()
    }

    /// Status returned by the next completeness checks.
    pub fn set_framebuffer_status(&self, status: GLenum) {
        self.0.borrow_mut().framebuffer_status = status;
    }

    /// Makes every following object creation return the null name.
    pub fn set_fail_object_creation(&self, fail: bool) {
        self.0.borrow_mut().fail_object_creation = fail;
    }

    /// Buffers currently alive in the driver.
    pub fn live_buffer_count(&self) -> usize {
        self.0.borrow().buffers.len()
    }

    /// Framebuffers currently alive in the driver.
    pub fn live_framebuffer_count(&self) -> usize {
        self.0.borrow().framebuffers.len()
    }

    /// Contents of a buffer's storage.
    pub fn buffer_contents(&self, buffer: GLuint) -> Option<Vec<u8>> {
        self.0.borrow().buffers.get(&buffer).cloned()
    }

    /// The draw framebuffer binding as the driver sees it.
    pub fn bound_draw_framebuffer(&self) -> GLuint {
        self.0.borrow().draw_framebuffer
    }

    /// The vertex array binding as the driver sees it.
    pub fn bound_vertex_array(&self) -> GLuint {
        self.0.borrow().vertex_array
    }

    /// Simulates a driver silently dropping a vertex array object.
    pub fn lose_vertex_array(&self, vertex_array: GLuint) {
        self.0.borrow_mut().vertex_arrays.remove(&vertex_array);
    }

    /// Simulates another agent binding a framebuffer behind the backend's back.
    pub fn rebind_draw_framebuffer_externally(&self, framebuffer: GLuint) {
        self.0.borrow_mut().draw_framebuffer = framebuffer;
    }
}

/// A recording, in-memory implementation of [`NativeGl`].
#[derive(Debug, Default)]
pub struct RecordingGl {
    state: Rc<RefCell<RecorderState>>,
}

impl RecordingGl {
    /// An OpenGL ES 3.2 context without extensions whose fences signal at once.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `GL_VERSION` string.
    pub fn with_version(self, version: &str) -> Self {
        self.state.borrow_mut().version = version.to_owned();
        self
    }

    /// Sets the `GL_VENDOR` string.
    pub fn with_vendor(self, vendor: &str) -> Self {
        self.state.borrow_mut().vendor = vendor.to_owned();
        self
    }

    /// Sets the `GL_RENDERER` string.
    pub fn with_renderer(self, renderer: &str) -> Self {
        self.state.borrow_mut().renderer = renderer.to_owned();
        self
    }

    /// Sets the exposed extensions.
    pub fn with_extensions(self, extensions: &[&str]) -> Self {
        self.state.borrow_mut().extensions = extensions.iter().map(|e| (*e).to_owned()).collect();
        self
    }

    /// Overrides an integer query.
    pub fn with_integer(self, name: GLenum, value: i32) -> Self {
        self.state.borrow_mut().integers.insert(name, value);
        self
    }

    /// Fences stay unsignaled until the log signals them.
    pub fn with_manual_fences(self) -> Self {
        self.state.borrow_mut().auto_signal_fences = false;
        self
    }

    /// A handle on the shared log.
    pub fn log(&self) -> CallLog {
        CallLog(Rc::clone(&self.state))
    }

    fn with_state<R>(&mut self, f: impl FnOnce(&mut RecorderState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }
}

impl NativeGl for RecordingGl {
    fn get_string(&mut self, name: GLenum) -> Option<String> {
        self.with_state(|s| match name {
            gl::VERSION => Some(s.version.clone()),
            gl::VENDOR => Some(s.vendor.clone()),
            gl::RENDERER => Some(s.renderer.clone()),
            gl::EXTENSIONS => Some(s.extensions.join(" ")),
            _ => None,
        })
    }

    fn get_string_i(&mut self, name: GLenum, index: u32) -> Option<String> {
        self.with_state(|s| match name {
            gl::EXTENSIONS => s.extensions.get(index as usize).cloned(),
            _ => None,
        })
    }

    fn get_integer(&mut self, name: GLenum) -> i32 {
        self.with_state(|s| {
            let version = DriverVersion::parse(&s.version);
            match name {
                gl::MAJOR_VERSION => version.map_or(0, |v| v.major as i32),
                gl::MINOR_VERSION => version.map_or(0, |v| v.minor as i32),
                gl::NUM_EXTENSIONS => s.extensions.len() as i32,
                gl::DRAW_FRAMEBUFFER_BINDING => s.draw_framebuffer as i32,
                gl::READ_FRAMEBUFFER_BINDING => s.read_framebuffer as i32,
                _ => s.integers.get(&name).copied().unwrap_or(0),
            }
        })
    }

    fn gen_buffer(&mut self) -> GLuint {
        self.with_state(|s| {
            let name = s.allocate_name();
            if name != 0 {
                s.buffers.insert(name, Vec::new());
            }
            s.record(GlCall::GenBuffer(name));
            name
        })
    }

    fn delete_buffer(&mut self, buffer: GLuint) {
        self.with_state(|s| {
            s.buffers.remove(&buffer);
            s.mapped.remove(&buffer);
            s.buffer_bindings.retain(|_, bound| *bound != buffer);
            s.record(GlCall::DeleteBuffer(buffer));
        })
    }

    fn bind_buffer(&mut self, target: GLenum, buffer: GLuint) {
        self.with_state(|s| {
            s.buffer_bindings.insert(target, buffer);
            s.record(GlCall::BindBuffer { target, buffer });
        })
    }

    fn buffer_data(&mut self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        self.with_state(|s| {
            if let Some(storage) = s.bound_storage(target) {
                storage.clear();
                storage.resize(size, 0);
                if let Some(data) = data {
                    let len = data.len().min(size);
                    storage[..len].copy_from_slice(&data[..len]);
                }
            }
            s.record(GlCall::BufferData {
                target,
                size,
                with_data: data.is_some(),
                usage,
            });
        })
    }

    fn buffer_sub_data(&mut self, target: GLenum, offset: usize, data: &[u8]) {
        self.with_state(|s| {
            if let Some(storage) = s.bound_storage(target) {
                if let Some(range) = storage.get_mut(offset..offset + data.len()) {
                    range.copy_from_slice(data);
                }
            }
            s.record(GlCall::BufferSubData {
                target,
                offset,
                size: data.len(),
            });
        })
    }

    fn map_buffer_range(
        &mut self,
        _entry: MapRangeEntry,
        target: GLenum,
        offset: usize,
        length: usize,
        access: GLbitfield,
    ) -> Option<NonNull<u8>> {
        self.with_state(|s| {
            s.record(GlCall::MapBufferRange {
                target,
                offset,
                length,
                access,
            });
            let buffer = s.bound_buffer(target);
            if length == 0 || s.mapped.contains(&buffer) {
                return None;
            }
            let storage = s.buffers.get_mut(&buffer)?;
            let pointer = storage.get_mut(offset..offset + length)?.as_mut_ptr();
            s.mapped.insert(buffer);
            NonNull::new(pointer)
        })
    }

    fn unmap_buffer(&mut self, target: GLenum) -> bool {
        self.with_state(|s| {
            let buffer = s.bound_buffer(target);
            s.record(GlCall::UnmapBuffer { target });
            s.mapped.remove(&buffer)
        })
    }

    fn flush_mapped_buffer_range(
        &mut self,
        _entry: MapRangeEntry,
        target: GLenum,
        offset: usize,
        length: usize,
    ) {
        self.with_state(|s| {
            s.record(GlCall::FlushMappedBufferRange {
                target,
                offset,
                length,
            })
        })
    }

    fn copy_buffer_sub_data(
        &mut self,
        read_target: GLenum,
        write_target: GLenum,
        read_offset: usize,
        write_offset: usize,
        size: usize,
    ) {
        self.with_state(|s| {
            let source = s
                .bound_storage(read_target)
                .and_then(|storage| storage.get(read_offset..read_offset + size))
                .map(<[u8]>::to_vec);
            if let (Some(source), Some(destination)) = (source, s.bound_storage(write_target)) {
                if let Some(range) = destination.get_mut(write_offset..write_offset + size) {
                    range.copy_from_slice(&source);
                }
            }
            s.record(GlCall::CopyBufferSubData {
                read_target,
                write_target,
                read_offset,
                write_offset,
                size,
            });
        })
    }

    fn clear_buffer_sub_data(&mut self, target: GLenum, offset: usize, size: usize) {
        self.with_state(|s| {
            if let Some(range) = s
                .bound_storage(target)
                .and_then(|storage| storage.get_mut(offset..offset + size))
            {
                range.fill(0);
            }
            s.record(GlCall::ClearBufferSubData {
                target,
                offset,
                size,
            });
        })
    }

    fn fence_sync(&mut self) -> GLsync {
        self.with_state(|s| {
            if s.fail_object_creation {
                s.record(GlCall::FenceSync(0));
                return 0;
            }
            let sync = s.next_sync;
            s.next_sync += 1;
            let signaled = s.auto_signal_fences;
            s.fences.insert(sync, signaled);
            s.record(GlCall::FenceSync(sync));
            sync
        })
    }

    fn client_wait_sync(&mut self, sync: GLsync, _flags: GLbitfield, _timeout_ns: u64) -> GLenum {
        self.with_state(|s| {
            s.record(GlCall::ClientWaitSync(sync));
            match s.fences.get(&sync) {
                Some(true) => gl::ALREADY_SIGNALED,
                Some(false) => gl::TIMEOUT_EXPIRED,
                None => gl::WAIT_FAILED,
            }
        })
    }

    fn delete_sync(&mut self, sync: GLsync) {
        self.with_state(|s| {
            s.fences.remove(&sync);
            s.record(GlCall::DeleteSync(sync));
        })
    }

    fn gen_framebuffer(&mut self) -> GLuint {
        self.with_state(|s| {
            let name = s.allocate_name();
            if name != 0 {
                s.framebuffers.insert(name);
            }
            s.record(GlCall::GenFramebuffer(name));
            name
        })
    }

    fn delete_framebuffer(&mut self, framebuffer: GLuint) {
        self.with_state(|s| {
            s.framebuffers.remove(&framebuffer);
            if s.draw_framebuffer == framebuffer {
                s.draw_framebuffer = 0;
            }
            if s.read_framebuffer == framebuffer {
                s.read_framebuffer = 0;
            }
            s.record(GlCall::DeleteFramebuffer(framebuffer));
        })
    }

    fn bind_framebuffer(&mut self, target: GLenum, framebuffer: GLuint) {
        self.with_state(|s| {
            match target {
                gl::DRAW_FRAMEBUFFER => s.draw_framebuffer = framebuffer,
                gl::READ_FRAMEBUFFER => s.read_framebuffer = framebuffer,
                _ => {
                    s.draw_framebuffer = framebuffer;
                    s.read_framebuffer = framebuffer;
                }
            }
            s.record(GlCall::BindFramebuffer {
                target,
                framebuffer,
            });
        })
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture_target: GLenum,
        texture: GLuint,
        level: i32,
    ) {
        self.with_state(|s| {
            s.record(GlCall::FramebufferTexture2D {
                target,
                attachment,
                texture_target,
                texture,
                level,
            })
        })
    }

    fn framebuffer_texture_layer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
        layer: i32,
    ) {
        self.with_state(|s| {
            s.record(GlCall::FramebufferTextureLayer {
                target,
                attachment,
                texture,
                level,
                layer,
            })
        })
    }

    fn framebuffer_texture(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: GLuint,
        level: i32,
    ) {
        self.with_state(|s| {
            s.record(GlCall::FramebufferTexture {
                target,
                attachment,
                texture,
                level,
            })
        })
    }

    fn framebuffer_texture_2d_multisample(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        _texture_target: GLenum,
        texture: GLuint,
        level: i32,
        samples: i32,
    ) {
        self.with_state(|s| {
            s.record(GlCall::FramebufferTexture2DMultisample {
                target,
                attachment,
                texture,
                level,
                samples,
            })
        })
    }

    fn framebuffer_renderbuffer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer: GLuint,
    ) {
        self.with_state(|s| {
            s.record(GlCall::FramebufferRenderbuffer {
                target,
                attachment,
                renderbuffer,
            })
        })
    }

    fn draw_buffers(&mut self, _entry: DrawBuffersEntry, buffers: &[GLenum]) {
        self.with_state(|s| s.record(GlCall::DrawBuffers(buffers.to_vec())))
    }

    fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum {
        self.with_state(|s| {
            s.record(GlCall::CheckFramebufferStatus(target));
            s.framebuffer_status
        })
    }

    fn invalidate_framebuffer(
        &mut self,
        _entry: InvalidateEntry,
        target: GLenum,
        attachments: &[GLenum],
    ) {
        self.with_state(|s| {
            s.record(GlCall::InvalidateFramebuffer {
                target,
                attachments: attachments.to_vec(),
            })
        })
    }

    fn object_label(
        &mut self,
        _entry: DebugLabelEntry,
        identifier: GLenum,
        name: GLuint,
        label: &str,
    ) {
        self.with_state(|s| {
            s.record(GlCall::ObjectLabel {
                identifier,
                name,
                label: label.to_owned(),
            })
        })
    }

    fn gen_vertex_array(&mut self, _entry: VertexArrayEntry) -> GLuint {
        self.with_state(|s| {
            let name = s.allocate_name();
            if name != 0 {
                s.vertex_arrays.insert(name);
            }
            s.record(GlCall::GenVertexArray(name));
            name
        })
    }

    fn delete_vertex_array(&mut self, _entry: VertexArrayEntry, vertex_array: GLuint) {
        self.with_state(|s| {
            s.vertex_arrays.remove(&vertex_array);
            if s.vertex_array == vertex_array {
                s.vertex_array = 0;
            }
            s.record(GlCall::DeleteVertexArray(vertex_array));
        })
    }

    fn bind_vertex_array(&mut self, _entry: VertexArrayEntry, vertex_array: GLuint) {
        self.with_state(|s| {
            s.vertex_array = vertex_array;
            s.record(GlCall::BindVertexArray(vertex_array));
        })
    }

    fn is_vertex_array(&mut self, _entry: VertexArrayEntry, vertex_array: GLuint) -> bool {
        self.with_state(|s| {
            s.record(GlCall::IsVertexArray(vertex_array));
            s.vertex_arrays.contains(&vertex_array)
        })
    }

    fn gen_query(&mut self, _entry: QueryEntry) -> GLuint {
        self.with_state(|s| {
            let name = s.allocate_name();
            if name != 0 {
                s.queries.insert(name);
            }
            s.record(GlCall::GenQuery(name));
            name
        })
    }

    fn delete_query(&mut self, _entry: QueryEntry, query: GLuint) {
        self.with_state(|s| {
            s.queries.remove(&query);
            s.record(GlCall::DeleteQuery(query));
        })
    }

    fn enable(&mut self, capability: GLenum) {
        self.with_state(|s| s.record(GlCall::Enable(capability)))
    }

    fn disable(&mut self, capability: GLenum) {
        self.with_state(|s| s.record(GlCall::Disable(capability)))
    }

    fn blend_func_separate(
        &mut self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        self.with_state(|s| {
            s.record(GlCall::BlendFuncSeparate {
                src_rgb,
                dst_rgb,
                src_alpha,
                dst_alpha,
            })
        })
    }

    fn blend_equation_separate(&mut self, mode_rgb: GLenum, mode_alpha: GLenum) {
        self.with_state(|s| {
            s.record(GlCall::BlendEquationSeparate {
                rgb: mode_rgb,
                alpha: mode_alpha,
            })
        })
    }

    fn blend_equation_advanced(&mut self, _entry: BlendAdvancedEntry, mode: GLenum) {
        self.with_state(|s| s.record(GlCall::BlendEquation(mode)))
    }

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.with_state(|s| s.record(GlCall::ColorMask([red, green, blue, alpha])))
    }

    fn depth_func(&mut self, func: GLenum) {
        self.with_state(|s| s.record(GlCall::DepthFunc(func)))
    }

    fn depth_mask(&mut self, write: bool) {
        self.with_state(|s| s.record(GlCall::DepthMask(write)))
    }

    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32) {
        self.with_state(|s| {
            s.record(GlCall::StencilFuncSeparate {
                face,
                func,
                reference,
                mask,
            })
        })
    }

    fn stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    ) {
        self.with_state(|s| {
            s.record(GlCall::StencilOpSeparate {
                face,
                stencil_fail,
                depth_fail,
                depth_pass,
            })
        })
    }

    fn stencil_mask(&mut self, mask: u32) {
        self.with_state(|s| s.record(GlCall::StencilMask(mask)))
    }

    fn cull_face(&mut self, face: GLenum) {
        self.with_state(|s| s.record(GlCall::CullFace(face)))
    }

    fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.with_state(|s| s.record(GlCall::PolygonOffset { factor, units }))
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.with_state(|s| s.record(GlCall::Viewport([x, y, width, height])))
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.with_state(|s| s.record(GlCall::Scissor([x, y, width, height])))
    }

    fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.with_state(|s| s.record(GlCall::ClearColor([red, green, blue, alpha])))
    }

    fn clear_depth(&mut self, depth: f32) {
        self.with_state(|s| s.record(GlCall::ClearDepth(depth)))
    }

    fn clear_stencil(&mut self, stencil: i32) {
        self.with_state(|s| s.record(GlCall::ClearStencil(stencil)))
    }

    fn clear(&mut self, mask: GLbitfield) {
        self.with_state(|s| s.record(GlCall::Clear(mask)))
    }
}
