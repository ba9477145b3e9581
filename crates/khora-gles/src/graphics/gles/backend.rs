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

//! The device object of the GL / GLES backend.

use super::api::GlesApi;
use super::buffer::{BufferManager, DataBuffer, FrameClock};
use super::caps::GraphicsCaps;
use super::context::{ContextInstance, ContextRegistry, ContextState, NativeContext};
use super::framebuffer::{BuiltinTarget, FramebufferManager};
use super::handle::{ContextId, FramebufferHandle, VertexArrayHandle};
use super::native::NativeGl;
use super::settings::GlesSettings;
use super::state::{
    BlendStateId, ClearFlags, ClearValues, DepthStateId, PipelineStateCache, RasterStateId,
    StencilStateId,
};
use anyhow::{Context, Result};
use khora_gfx_core::renderer::api::pipeline::state::{
    BlendStateDescriptor, DepthStateDescriptor, RasterStateDescriptor, StencilStateDescriptor,
};
use khora_gfx_core::renderer::api::target::{
    RectInt, RenderSurface, RenderSurfaceId, RenderTargetSetup,
};
use khora_gfx_core::renderer::{BufferError, BufferUsage, DriverError, FramebufferError, GfxError};
use std::collections::HashMap;

/// Owns the checked API, the buffer pool, the pipeline state cache and the
/// per-context framebuffer bookkeeping.
///
/// Every call must come from the thread the native contexts are current on.
#[derive(Debug)]
pub struct GlesBackend {
    api: GlesApi,
    buffers: BufferManager,
    states: PipelineStateCache,
    contexts: ContextRegistry,
    surfaces: HashMap<RenderSurfaceId, RenderSurface>,
    settings: GlesSettings,
}

impl GlesBackend {
    /// Queries the live context behind `native` and builds the backend on top of it.
    pub fn new(native: Box<dyn NativeGl>, settings: GlesSettings) -> Result<Self> {
        log::info!("Initializing GL backend...");

        // --- 1. Detect Capabilities and Resolve Entry Points ---
        let api = GlesApi::new(native, &settings).context("Failed to initialize the GL API")?;
        let caps = api.caps();
        log::info!(
            "Using GL driver: \"{}\" by \"{}\" (Level: {:?}, Version: \"{}\")",
            caps.renderer_string,
            caps.vendor_string,
            caps.level,
            caps.version_string
        );
        log::info!(
            "{} extensions, {} color attachments, {} vertex attributes, {} uniform buffer bindings",
            caps.extensions.len(),
            caps.max_color_attachments,
            caps.max_attributes,
            caps.max_uniform_buffer_bindings
        );
        if caps.clamped {
            log::info!("Extension-only code paths are disabled (clamped features).");
        }

        // --- 2. Create Managers ---
        let buffers = BufferManager::new(settings.buffer_pool.clone());
        let states = PipelineStateCache::new(api.caps());
        log::debug!("Buffer pool and pipeline state cache created.");

        Ok(Self {
            api,
            buffers,
            states,
            contexts: ContextRegistry::new(),
            surfaces: HashMap::new(),
            settings,
        })
    }

    /// The checked GL API.
    pub fn api(&self) -> &GlesApi {
        &self.api
    }

    /// Mutable access to the checked GL API.
    pub fn api_mut(&mut self) -> &mut GlesApi {
        &mut self.api
    }

    /// Capabilities detected at creation.
    pub fn caps(&self) -> &GraphicsCaps {
        self.api.caps()
    }

    /// The settings the backend was created with.
    pub fn settings(&self) -> &GlesSettings {
        &self.settings
    }

    /// The transient buffer pool.
    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    /// The pipeline state cache.
    pub fn states(&self) -> &PipelineStateCache {
        &self.states
    }

    /// Every context registered so far.
    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    // --- Contexts ---

    /// Routes every following call to `native`, registering it on first use.
    ///
    /// The pipeline state cache is invalidated since another context may have
    /// changed the driver state.
    pub fn make_current(&mut self, native: NativeContext) -> Result<ContextId, GfxError> {
        let is_new = self.contexts.state_of(native) == ContextState::Uninitialized;
        let instance = self.contexts.make_current(&mut self.api, native)?;
        if is_new {
            let framebuffers = instance.framebuffers_mut();
            for surface in self.surfaces.values() {
                framebuffers.register_surface(surface.clone());
            }
        }
        self.states.invalidate();
        Ok(instance.id())
    }

    /// Framebuffer bookkeeping of the current context.
    pub fn framebuffers(&self) -> Option<&FramebufferManager> {
        self.contexts.current().map(ContextInstance::framebuffers)
    }

    /// The default vertex array of the current context.
    pub fn default_vertex_array(&mut self) -> Result<VertexArrayHandle, DriverError> {
        self.contexts.default_vertex_array(&mut self.api)
    }

    /// Describes the window framebuffer of the current context.
    pub fn setup_default_framebuffer(
        &mut self,
        color: RenderSurface,
        depth: RenderSurface,
        fbo: FramebufferHandle,
    ) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.setup_default_framebuffer(color, depth, fbo);
        Ok(())
    }

    // --- Buffers ---

    /// Frame counters used by [`DataBuffer`] operations.
    pub fn buffer_clock(&self) -> FrameClock {
        self.buffers.clock()
    }

    /// Checks a buffer out of the pool, creating one if no free buffer fits.
    pub fn acquire_buffer(
        &mut self,
        size: usize,
        usage: BufferUsage,
        clear: bool,
    ) -> Result<DataBuffer, BufferError> {
        self.buffers
            .acquire_buffer(&mut self.api, size, usage, clear)
    }

    /// Hands a buffer back to the pool.
    pub fn release_buffer(&mut self, buffer: DataBuffer) {
        self.buffers.release_buffer(buffer);
    }

    /// Uploads `data` into a checked-out buffer.
    pub fn upload_buffer(
        &mut self,
        buffer: &mut DataBuffer,
        offset: usize,
        data: &[u8],
    ) -> Result<(), BufferError> {
        buffer.upload(&mut self.api, self.buffers.clock(), offset, data)
    }

    /// Marks `buffer` as read by the frame being recorded.
    pub fn record_buffer_render(&self, buffer: &mut DataBuffer) {
        buffer.record_render(self.buffers.clock());
    }

    /// Closes the current frame: retires fences, recycles and prunes buffers.
    pub fn advance_frame(&mut self) -> Result<(), DriverError> {
        self.buffers.advance_frame(&mut self.api)
    }

    /// Abandons every pooled buffer without deleting it.
    pub fn invalidate_all_buffers(&mut self) {
        self.buffers.invalidate_all();
    }

    // --- Pipeline state ---

    /// Interns a blend state.
    pub fn create_blend_state(&mut self, desc: BlendStateDescriptor) -> BlendStateId {
        self.states.create_blend_state(desc)
    }

    /// Interns a depth state.
    pub fn create_depth_state(&mut self, desc: DepthStateDescriptor) -> DepthStateId {
        self.states.create_depth_state(desc)
    }

    /// Interns a stencil state.
    pub fn create_stencil_state(&mut self, desc: StencilStateDescriptor) -> StencilStateId {
        self.states.create_stencil_state(desc)
    }

    /// Interns a raster state.
    pub fn create_raster_state(&mut self, desc: RasterStateDescriptor) -> RasterStateId {
        self.states.create_raster_state(desc)
    }

    /// Applies a blend state, issuing only the calls that differ.
    pub fn set_blend_state(&mut self, id: BlendStateId) {
        self.states.set_blend_state(&mut self.api, id);
    }

    /// Applies a depth state, issuing only the calls that differ.
    pub fn set_depth_state(&mut self, id: DepthStateId) {
        self.states.set_depth_state(&mut self.api, id);
    }

    /// Applies a stencil state with its reference value.
    pub fn set_stencil_state(&mut self, id: StencilStateId, reference: i32) {
        self.states.set_stencil_state(&mut self.api, id, reference);
    }

    /// Applies a raster state, issuing only the calls that differ.
    pub fn set_raster_state(&mut self, id: RasterStateId) {
        self.states.set_raster_state(&mut self.api, id);
    }

    // --- Render targets ---

    /// Registers a surface with every context, present and future.
    pub fn register_surface(&mut self, surface: RenderSurface) {
        for instance in self.contexts.iter_mut() {
            let framebuffers = instance.framebuffers_mut();
            framebuffers.register_surface(surface.clone());
        }
        self.surfaces.insert(surface.id, surface);
    }

    /// Makes `setup` the pending render target of the current context.
    pub fn activate(&mut self, setup: &RenderTargetSetup) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.activate(&mut self.api, setup)?;
        Ok(())
    }

    /// Activates a built-in slot of the current context.
    pub fn activate_builtin(&mut self, target: BuiltinTarget, clear: bool) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.activate_builtin(&mut self.api, target, clear)?;
        Ok(())
    }

    /// Binds the pending render target if it changed. Call before every draw.
    pub fn prepare(&mut self) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.prepare(&mut self.api, &mut self.states);
        Ok(())
    }

    /// Clears the pending render target.
    pub fn clear(&mut self, flags: ClearFlags, values: ClearValues) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.clear(&mut self.api, &mut self.states, flags, values);
        Ok(())
    }

    /// Sets the viewport, flipping it for the window framebuffer.
    pub fn set_viewport(&mut self, rect: RectInt) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.set_viewport(&mut self.api, rect);
        Ok(())
    }

    /// Sets the scissor box, flipping it for the window framebuffer.
    pub fn set_scissor(&mut self, rect: RectInt) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.set_scissor(&mut self.api, rect);
        Ok(())
    }

    /// The framebuffer object of `setup` on the current context.
    pub fn get_framebuffer_name(
        &mut self,
        setup: &RenderTargetSetup,
    ) -> Result<FramebufferHandle, GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        Ok(framebuffers.get_framebuffer_name(&mut self.api, setup)?)
    }

    /// Declares the contents of `surface` as no longer needed.
    pub fn discard_contents(&mut self, surface: RenderSurfaceId) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        framebuffers.discard_contents(&self.api, surface);
        Ok(())
    }

    /// Releases the framebuffers of a destroyed surface.
    ///
    /// The current context deletes its objects now; every other context
    /// does so the next time it becomes current. A rejected release leaves
    /// every context untouched.
    pub fn destroy_render_surface(&mut self, surface: RenderSurfaceId) -> Result<(), GfxError> {
        let framebuffers = framebuffers_of(&mut self.contexts)?;
        match framebuffers.release_framebuffer(&mut self.api, surface) {
            Err(err @ FramebufferError::DefaultSurfaceRelease { .. }) => Err(err.into()),
            released => {
                self.contexts
                    .add_render_surface_to_deferred_invalidate_list(surface);
                self.surfaces.remove(&surface);
                released.map_err(GfxError::from)
            }
        }
    }

    // --- Lifetime ---

    /// Forgets every native object after the driver lost its contexts.
    ///
    /// Nothing is deleted: the names died with the contexts.
    pub fn on_context_lost(&mut self) {
        log::warn!("GL context lost, abandoning every native object.");
        self.buffers.invalidate_all();
        self.contexts.invalidate(&mut self.api);
        self.states.invalidate();
        self.api.invalidate();
    }

    /// Deletes the pooled buffers and the objects of the current context.
    pub fn shutdown(&mut self) {
        log::info!("Shutting down the GL backend...");
        self.buffers.clear(&mut self.api);
        if let Some(native) = self.contexts.current().map(ContextInstance::native) {
            self.contexts.destroy_context(&mut self.api, native);
        }
        self.surfaces.clear();
    }
}

fn framebuffers_of(contexts: &mut ContextRegistry) -> Result<&mut FramebufferManager, GfxError> {
    contexts
        .current_mut()
        .map(ContextInstance::framebuffers_mut)
        .ok_or(GfxError::NoCurrentContext)
}
