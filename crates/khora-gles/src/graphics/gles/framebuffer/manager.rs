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

use super::FramebufferKey;
use crate::graphics::gles::api::GlesApi;
use crate::graphics::gles::gl::{self, GLenum};
use crate::graphics::gles::handle::{ContextId, FramebufferHandle};
use crate::graphics::gles::state::{ClearFlags, ClearValues, PipelineStateCache};
use crate::graphics::gles::translate::FramebufferTarget;
use khora_gfx_core::renderer::api::target::{
    LoadAction, RectInt, RenderSurface, RenderSurfaceId, RenderTargetSetup, StoreAction,
    SurfaceBacking, TextureDimension,
};
use khora_gfx_core::renderer::FramebufferError;
use std::collections::{HashMap, HashSet};

/// One of the three render target slots of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTarget {
    /// The window framebuffer.
    Default,
    /// The target the next draw will render into.
    Pending,
    /// The target actually bound on the context.
    Current,
}

/// Memoizes framebuffer objects per render target setup and tracks which
/// setup is pending and which one is bound.
///
/// Activation is lazy: [`activate`](Self::activate) only records the pending
/// setup, [`prepare`](Self::prepare) binds it right before drawing.
#[derive(Debug)]
pub struct FramebufferManager {
    context: ContextId,
    surfaces: HashMap<RenderSurfaceId, RenderSurface>,
    framebuffers: HashMap<FramebufferKey, FramebufferHandle>,
    dependents: HashMap<RenderSurfaceId, HashSet<FramebufferKey>>,
    external: HashSet<FramebufferKey>,
    invalidated: Vec<RenderSurfaceId>,

    default_setup: RenderTargetSetup,
    default_fbo: FramebufferHandle,

    pending_setup: RenderTargetSetup,
    pending_fbo: FramebufferHandle,
    pending_viewport: RectInt,
    pending_scissor: RectInt,
    pending_valid: bool,

    current_setup: RenderTargetSetup,
    current_fbo: FramebufferHandle,
    current_viewport: Option<RectInt>,
    current_scissor: Option<RectInt>,
    current_valid: bool,

    requires_setup: bool,
    samples_count: u32,
}

impl FramebufferManager {
    /// Creates the manager of `context`, with the window framebuffer on every slot.
    pub fn new(context: ContextId) -> Self {
        let default_setup = RenderTargetSetup::back_buffer();
        let color = RenderSurface::back_buffer_color(0, 0);
        let depth = RenderSurface::back_buffer_depth(0, 0);
        let surfaces = HashMap::from([(color.id, color), (depth.id, depth)]);
        let mut manager = Self {
            context,
            surfaces,
            framebuffers: HashMap::new(),
            dependents: HashMap::new(),
            external: HashSet::new(),
            invalidated: Vec::new(),
            default_setup: default_setup.clone(),
            default_fbo: FramebufferHandle::ZERO,
            pending_setup: default_setup.clone(),
            pending_fbo: FramebufferHandle::ZERO,
            pending_viewport: RectInt::default(),
            pending_scissor: RectInt::default(),
            pending_valid: true,
            current_setup: default_setup,
            current_fbo: FramebufferHandle::ZERO,
            current_viewport: None,
            current_scissor: None,
            current_valid: true,
            requires_setup: true,
            samples_count: 1,
        };
        manager.register_default_entry();
        manager
    }

    /// The context owning every framebuffer of this manager.
    pub fn context(&self) -> ContextId {
        self.context
    }

    // --- Surfaces ---

    /// Makes a surface known to the manager. Re-registering replaces the old description.
    pub fn register_surface(&mut self, surface: RenderSurface) {
        self.surfaces.insert(surface.id, surface);
    }

    /// The registered description of `id`.
    pub fn surface(&self, id: RenderSurfaceId) -> Option<&RenderSurface> {
        self.surfaces.get(&id)
    }

    /// Mutable access to a registered surface, for load and store hints.
    pub fn surface_mut(&mut self, id: RenderSurfaceId) -> Option<&mut RenderSurface> {
        self.surfaces.get_mut(&id)
    }

    /// Describes the window framebuffer: its two surfaces and the object backing them.
    ///
    /// Usually `fbo` is the zero framebuffer, but some platforms render the
    /// window through an FBO of their own.
    pub fn setup_default_framebuffer(
        &mut self,
        color: RenderSurface,
        depth: RenderSurface,
        fbo: FramebufferHandle,
    ) {
        let old_key = FramebufferKey::new(&self.default_setup, &self.surfaces);
        self.forget_key(&old_key);
        self.default_setup = RenderTargetSetup::new(vec![color.id], Some(depth.id));
        for mut surface in [color, depth] {
            surface.back_buffer = true;
            self.surfaces.insert(surface.id, surface);
        }
        self.default_fbo = fbo;
        self.register_default_entry();
        log::debug!("Default framebuffer of {:?} set to {:?}", self.context, fbo);
    }

    /// Registers a framebuffer object created outside the manager for `setup`.
    ///
    /// The object is reused when the setup is activated but never deleted by the manager.
    pub fn register_external_fbo(&mut self, setup: RenderTargetSetup, fbo: FramebufferHandle) {
        let key = FramebufferKey::new(&setup, &self.surfaces);
        self.external.insert(key.clone());
        self.insert_entry(key, fbo);
    }

    fn register_default_entry(&mut self) {
        let key = FramebufferKey::new(&self.default_setup, &self.surfaces);
        self.external.insert(key.clone());
        self.insert_entry(key, self.default_fbo);
    }

    fn insert_entry(&mut self, key: FramebufferKey, fbo: FramebufferHandle) {
        for surface in key.setup().surfaces() {
            self.dependents
                .entry(surface)
                .or_default()
                .insert(key.clone());
        }
        self.framebuffers.insert(key, fbo);
    }

    fn forget_key(&mut self, key: &FramebufferKey) -> Option<FramebufferHandle> {
        for surface in key.setup().surfaces() {
            if let Some(keys) = self.dependents.get_mut(&surface) {
                keys.remove(key);
                if keys.is_empty() {
                    self.dependents.remove(&surface);
                }
            }
        }
        self.external.remove(key);
        self.framebuffers.remove(key)
    }

    fn validate(
        &self,
        setup: &RenderTargetSetup,
        max_colors: usize,
    ) -> Result<(), FramebufferError> {
        if setup.is_empty() {
            return Err(FramebufferError::EmptyAttachmentSet);
        }
        if setup.colors.len() > max_colors {
            return Err(FramebufferError::TooManyColorAttachments {
                count: setup.colors.len(),
                max: max_colors,
            });
        }
        match setup.surfaces().find(|id| !self.surfaces.contains_key(id)) {
            Some(surface) => Err(FramebufferError::UnknownSurface { surface }),
            None => Ok(()),
        }
    }

    // --- Framebuffer objects ---

    /// The framebuffer object of `setup`, creating it on first use.
    pub fn get_framebuffer_name(
        &mut self,
        api: &mut GlesApi,
        setup: &RenderTargetSetup,
    ) -> Result<FramebufferHandle, FramebufferError> {
        self.validate(setup, api.caps().max_color_attachments as usize)?;
        let key = FramebufferKey::new(setup, &self.surfaces);
        if let Some(&fbo) = self.framebuffers.get(&key) {
            return Ok(fbo);
        }
        let fbo = self.create_framebuffer(api, setup)?;
        self.insert_entry(key, fbo);
        Ok(fbo)
    }

    fn create_framebuffer(
        &self,
        api: &mut GlesApi,
        setup: &RenderTargetSetup,
    ) -> Result<FramebufferHandle, FramebufferError> {
        let fbo = api.gen_framebuffer()?;
        let restore = api.framebuffer_binding(FramebufferTarget::Draw);
        api.bind_framebuffer(FramebufferTarget::Draw, fbo);

        let level = setup.mip_level as i32;
        for (index, id) in setup.colors.iter().enumerate() {
            let Some(surface) = self.surfaces.get(id) else {
                continue;
            };
            if surface.is_dummy() {
                continue;
            }
            let attachment = gl::COLOR_ATTACHMENT0 + index as GLenum;
            self.attach_color(api, surface, setup, attachment, level);
        }

        if let Some(surface) = setup.depth.and_then(|id| self.surfaces.get(&id)) {
            if !surface.is_dummy() {
                Self::attach_depth(api, surface);
            }
        }

        if setup.colors.is_empty() {
            if api.caps().require_draw_buffer_none {
                api.draw_buffers(&[gl::NONE]);
            }
        } else if api.caps().has_draw_buffers {
            let buffers: Vec<GLenum> = setup
                .colors
                .iter()
                .enumerate()
                .map(|(index, id)| match self.surfaces.get(id) {
                    Some(surface) if !surface.is_dummy() => gl::COLOR_ATTACHMENT0 + index as GLenum,
                    _ => gl::NONE,
                })
                .collect();
            api.draw_buffers(&buffers);
        }

        let status = api.check_framebuffer_status();
        if status != gl::FRAMEBUFFER_COMPLETE {
            api.bind_framebuffer(FramebufferTarget::Draw, restore);
            api.delete_framebuffer(fbo, self.default_fbo);
            let description = gl::framebuffer_status_name(status);
            log::error!("Framebuffer for {:?} is incomplete: {}", setup, description);
            return Err(FramebufferError::Incomplete {
                status,
                description,
            });
        }

        if api.caps().has_debug_label {
            if let Some(label) = self.shared_label(setup) {
                api.label_framebuffer(fbo, label);
            }
        }

        api.bind_framebuffer(FramebufferTarget::Draw, restore);
        log::debug!("Created framebuffer {:?} for {:?}", fbo, setup);
        Ok(fbo)
    }

    fn attach_color(
        &self,
        api: &mut GlesApi,
        surface: &RenderSurface,
        setup: &RenderTargetSetup,
        attachment: GLenum,
        level: i32,
    ) {
        match surface.backing {
            SurfaceBacking::Texture(texture) => match surface.dimension {
                TextureDimension::Cube => {
                    let face = gl::TEXTURE_CUBE_MAP_POSITIVE_X + setup.cube_face.min(5);
                    api.attach_texture_2d(attachment, face, texture, level);
                }
                TextureDimension::D3 | TextureDimension::D2Array => match setup.depth_slice {
                    None if api.caps().has_framebuffer_texture_layer_whole => {
                        api.attach_texture(attachment, texture, level);
                    }
                    slice => {
                        let layer = slice.unwrap_or(0) as i32;
                        api.attach_texture_layer(attachment, texture, level, layer);
                    }
                },
                TextureDimension::D2 => {
                    let samples = surface.samples;
                    if samples > 1 && api.caps().has_multisample_auto_resolve {
                        api.attach_texture_2d_multisample(attachment, texture, level, samples);
                    } else {
                        api.attach_texture_2d(attachment, gl::TEXTURE_2D, texture, level);
                    }
                }
            },
            SurfaceBacking::Renderbuffer(renderbuffer) => {
                api.attach_renderbuffer(attachment, renderbuffer);
            }
            SurfaceBacking::System => {
                log::error!(
                    "Window surface {:?} cannot be attached to a framebuffer object",
                    surface.id
                );
            }
        }
    }

    fn attach_depth(api: &mut GlesApi, surface: &RenderSurface) {
        let with_stencil = surface.has_stencil() && api.caps().has_render_target_stencil;
        match surface.backing {
            SurfaceBacking::Texture(texture) => {
                api.attach_texture_2d(gl::DEPTH_ATTACHMENT, gl::TEXTURE_2D, texture, 0);
                let attachment = gl::STENCIL_ATTACHMENT;
                match (with_stencil, surface.stencil_renderbuffer) {
                    (true, Some(stencil)) => api.attach_renderbuffer(attachment, stencil),
                    (true, None) => api.attach_texture_2d(attachment, gl::TEXTURE_2D, texture, 0),
                    (false, _) => api.attach_texture_2d(attachment, gl::TEXTURE_2D, 0, 0),
                }
            }
            SurfaceBacking::Renderbuffer(renderbuffer) => {
                api.attach_renderbuffer(gl::DEPTH_ATTACHMENT, renderbuffer);
                let stencil = if with_stencil {
                    surface.stencil_renderbuffer.unwrap_or(renderbuffer)
                } else {
                    0
                };
                api.attach_renderbuffer(gl::STENCIL_ATTACHMENT, stencil);
            }
            SurfaceBacking::System => {
                log::error!(
                    "Window surface {:?} cannot be attached to a framebuffer object",
                    surface.id
                );
            }
        }
    }

    /// The label shared by every used attachment, if they all carry the same one.
    fn shared_label(&self, setup: &RenderTargetSetup) -> Option<&str> {
        let mut labels = setup
            .surfaces()
            .filter_map(|id| self.surfaces.get(&id))
            .filter(|surface| !surface.is_dummy())
            .map(|surface| surface.label.as_deref());
        let first = labels.next()??;
        labels.all(|label| label == Some(first)).then_some(first)
    }

    // --- Slots ---

    /// Makes `setup` the pending target. Nothing is bound until [`prepare`](Self::prepare).
    pub fn activate(
        &mut self,
        api: &mut GlesApi,
        setup: &RenderTargetSetup,
    ) -> Result<(), FramebufferError> {
        self.validate(setup, api.caps().max_color_attachments as usize)?;
        self.invalidate_discarded_stores(api);

        let fbo = self.get_framebuffer_name(api, setup)?;
        self.pending_setup = setup.clone();
        self.pending_fbo = fbo;
        self.pending_valid = true;
        self.requires_setup = true;

        let size = setup
            .colors
            .first()
            .or(setup.depth.as_ref())
            .and_then(|id| self.surfaces.get(id))
            .map(|surface| RectInt::from_size(surface.width, surface.height))
            .unwrap_or_default();
        self.pending_viewport = size;
        self.pending_scissor = size;
        Ok(())
    }

    /// Activates a slot. With `clear`, the first color and the depth surface
    /// drop their previous contents on promotion.
    pub fn activate_builtin(
        &mut self,
        api: &mut GlesApi,
        target: BuiltinTarget,
        clear: bool,
    ) -> Result<(), FramebufferError> {
        let setup = self.setup_of(target).clone();
        if clear {
            for id in setup.colors.first().copied().into_iter().chain(setup.depth) {
                if let Some(surface) = self.surfaces.get_mut(&id) {
                    surface.load_action = LoadAction::DontCare;
                }
            }
        }
        self.activate(api, &setup)
    }

    fn setup_of(&self, target: BuiltinTarget) -> &RenderTargetSetup {
        match target {
            BuiltinTarget::Default => &self.default_setup,
            BuiltinTarget::Pending => &self.pending_setup,
            BuiltinTarget::Current => &self.current_setup,
        }
    }

    /// Binds the default or pending slot as the current one.
    ///
    /// `Current` re-applies the bound setup.
    pub fn make_current(&mut self, api: &mut GlesApi, target: BuiltinTarget) {
        let (viewport, scissor) = match target {
            BuiltinTarget::Default => {
                self.current_setup = self.default_setup.clone();
                self.current_fbo = self.default_fbo;
                let size = self.default_size();
                (size, size)
            }
            BuiltinTarget::Pending => {
                self.current_setup = self.pending_setup.clone();
                self.current_fbo = self.pending_fbo;
                (self.pending_viewport, self.pending_scissor)
            }
            BuiltinTarget::Current => (
                self.current_viewport.unwrap_or(self.pending_viewport),
                self.current_scissor.unwrap_or(self.pending_scissor),
            ),
        };
        self.current_valid = true;
        self.samples_count = FramebufferKey::new(&self.current_setup, &self.surfaces).samples();
        api.bind_framebuffer(FramebufferTarget::Draw, self.current_fbo);
        self.apply_viewport(api, viewport);
        self.apply_scissor(api, scissor);
    }

    fn default_size(&self) -> RectInt {
        self.default_setup
            .colors
            .first()
            .and_then(|id| self.surfaces.get(id))
            .map(|surface| RectInt::from_size(surface.width, surface.height))
            .unwrap_or_default()
    }

    fn apply_viewport(&mut self, api: &mut GlesApi, rect: RectInt) {
        if self.current_viewport != Some(rect) {
            api.viewport(rect);
            self.current_viewport = Some(rect);
        }
    }

    fn apply_scissor(&mut self, api: &mut GlesApi, rect: RectInt) {
        if self.current_scissor != Some(rect) {
            api.scissor(rect);
            self.current_scissor = Some(rect);
        }
    }

    /// Promotes the pending target to current if it changed since the last draw.
    ///
    /// Surfaces whose previous contents are not needed are invalidated or
    /// cleared, depending on what the GPU prefers.
    pub fn prepare(&mut self, api: &mut GlesApi, states: &mut PipelineStateCache) {
        if !self.requires_setup {
            return;
        }
        self.make_current(api, BuiltinTarget::Pending);

        let setup = self.current_setup.clone();
        let discard_colors: Vec<bool> = setup
            .colors
            .iter()
            .map(|id| self.take_dont_care_load(*id))
            .collect();
        let discard_depth = setup.depth.is_some_and(|id| self.take_dont_care_load(id));

        if api.caps().use_discard_to_avoid_restore {
            self.invalidate_attachments(api, &discard_colors, discard_depth);
        }
        if api.caps().use_clear_to_avoid_restore {
            let mut flags = ClearFlags::empty();
            if discard_colors.first().copied().unwrap_or(false) {
                flags |= ClearFlags::COLOR;
            }
            if discard_depth {
                flags |= ClearFlags::DEPTH | ClearFlags::STENCIL;
            }
            if !flags.is_empty() {
                let values = ClearValues {
                    color: [0.0, 0.0, 0.0, 1.0],
                    ..ClearValues::default()
                };
                states.clear_current_framebuffer(api, flags, values);
            }
        }
        self.requires_setup = false;
    }

    /// Resets a `DontCare` load action to `Load`, returning whether it was `DontCare`.
    fn take_dont_care_load(&mut self, id: RenderSurfaceId) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(surface) if surface.load_action == LoadAction::DontCare => {
                surface.load_action = LoadAction::Load;
                true
            }
            _ => false,
        }
    }

    // --- Invalidation hints ---

    /// Invalidates selected attachments of the current framebuffer.
    ///
    /// `colors[i]` selects color attachment `i`; `depth` selects depth and stencil.
    pub fn invalidate_attachments(&mut self, api: &mut GlesApi, colors: &[bool], depth: bool) {
        if !api.caps().has_invalidate_framebuffer {
            return;
        }
        let system = self.current_fbo.is_zero();
        let mut attachments = Vec::with_capacity(colors.len() + 2);
        for (index, _) in self.current_setup.colors.iter().enumerate() {
            if colors.get(index).copied().unwrap_or(false) {
                let attachment = if system {
                    gl::COLOR
                } else {
                    gl::COLOR_ATTACHMENT0 + index as GLenum
                };
                attachments.push(attachment);
            }
        }
        if depth && self.current_setup.depth.is_some() {
            if system {
                attachments.extend([gl::DEPTH, gl::STENCIL]);
            } else {
                attachments.extend([gl::DEPTH_ATTACHMENT, gl::STENCIL_ATTACHMENT]);
            }
        }
        if !attachments.is_empty() {
            api.invalidate_framebuffer(&attachments);
        }
    }

    /// Invalidates the attachments of the current target whose store action is
    /// `DontCare`, resetting them to `Store`.
    fn invalidate_discarded_stores(&mut self, api: &mut GlesApi) {
        let setup = self.current_setup.clone();
        let mut take = |id: RenderSurfaceId| match self.surfaces.get_mut(&id) {
            Some(surface) if surface.store_action == StoreAction::DontCare => {
                surface.store_action = StoreAction::Store;
                true
            }
            _ => false,
        };
        let colors: Vec<bool> = setup.colors.iter().map(|id| take(*id)).collect();
        let depth = setup.depth.is_some_and(take);
        if depth || colors.contains(&true) {
            self.invalidate_attachments(api, &colors, depth);
        }
    }

    /// Invalidates the window depth buffer when the window framebuffer is bound.
    pub fn try_invalidate_default_depth(&mut self, api: &mut GlesApi) {
        if api.caps().has_invalidate_framebuffer && self.current_fbo == self.default_fbo {
            self.invalidate_attachments(api, &[], true);
        }
    }

    /// Declares the contents of `surface` as no longer needed.
    ///
    /// Only the store hint of a pending surface can be honored; the load hint
    /// only pays off on tiled GPUs.
    pub fn discard_contents(&mut self, api: &GlesApi, id: RenderSurfaceId) {
        let in_pending = self.pending_setup.contains(id);
        let caps = api.caps();
        let Some(surface) = self.surfaces.get_mut(&id) else {
            log::warn!("Discarding the contents of unknown surface {:?}", id);
            return;
        };
        surface.store_action = if caps.has_invalidate_framebuffer && in_pending {
            StoreAction::DontCare
        } else {
            StoreAction::Store
        };
        surface.load_action = if caps.tiled_gpu {
            LoadAction::DontCare
        } else {
            LoadAction::Load
        };
    }

    // --- Viewport, scissor, clears ---

    /// Sets the viewport of the pending target, applied at once if it is already bound.
    pub fn set_viewport(&mut self, api: &mut GlesApi, rect: RectInt) {
        self.pending_viewport = rect;
        if !self.requires_setup {
            self.apply_viewport(api, rect);
        }
    }

    /// Sets the scissor rectangle of the pending target, applied at once if it is already bound.
    pub fn set_scissor(&mut self, api: &mut GlesApi, rect: RectInt) {
        self.pending_scissor = rect;
        if !self.requires_setup {
            self.apply_scissor(api, rect);
        }
    }

    /// Clears the pending target after promoting it.
    ///
    /// Placeholder attachments are never cleared and stencil is only cleared
    /// when the depth surface has a stencil channel.
    pub fn clear(
        &mut self,
        api: &mut GlesApi,
        states: &mut PipelineStateCache,
        flags: ClearFlags,
        values: ClearValues,
    ) {
        if api.caps().use_clear_to_avoid_restore && self.requires_setup {
            let color0 = self.pending_setup.colors.first().copied();
            let covers = color0
                .and_then(|id| self.surfaces.get(&id))
                .is_some_and(|s| self.pending_viewport.covers(s.width, s.height));
            if covers {
                // The user clear replaces the restore clear.
                for id in color0.into_iter().chain(self.pending_setup.depth) {
                    if let Some(surface) = self.surfaces.get_mut(&id) {
                        surface.load_action = LoadAction::Load;
                    }
                }
            }
        }
        self.prepare(api, states);

        let mut flags = flags;
        let color0 = self.current_setup.colors.first();
        let color0 = color0.and_then(|id| self.surfaces.get(id));
        if color0.map_or(true, RenderSurface::is_dummy) {
            flags.remove(ClearFlags::COLOR);
        }
        let depth = self.current_setup.depth;
        match depth.and_then(|id| self.surfaces.get(&id)) {
            Some(depth) if !depth.is_dummy() => {
                if !depth.back_buffer && !depth.has_stencil() {
                    flags.remove(ClearFlags::STENCIL);
                }
            }
            _ => flags.remove(ClearFlags::DEPTH | ClearFlags::STENCIL),
        }
        if !flags.is_empty() {
            states.clear_current_framebuffer(api, flags, values);
        }
    }

    // --- Surface lifetime ---

    /// Deletes every framebuffer built on `surface` and forgets the surface.
    ///
    /// If the pending or current target used it, the manager falls back to
    /// the window framebuffer.
    pub fn release_framebuffer(
        &mut self,
        api: &mut GlesApi,
        surface: RenderSurfaceId,
    ) -> Result<(), FramebufferError> {
        if self.default_setup.contains(surface) {
            return Err(FramebufferError::DefaultSurfaceRelease { surface });
        }
        self.cleanup_for_surface(api, surface);
        self.current_fbo = api.framebuffer_binding(FramebufferTarget::Draw);

        self.pending_valid &= !self.pending_setup.contains(surface);
        self.current_valid &= !self.current_setup.contains(surface);
        if !self.pending_valid {
            log::warn!(
                "Render surface {:?} released while active; falling back to the window framebuffer",
                surface
            );
        }
        let result = self.fall_back_to_valid_state(api);
        self.surfaces.remove(&surface);
        result
    }

    /// Deletes every framebuffer object that has `surface` attached.
    ///
    /// The draw binding is restored unless the bound object was one of them.
    pub fn cleanup_for_surface(&mut self, api: &mut GlesApi, surface: RenderSurfaceId) {
        let Some(keys) = self.dependents.remove(&surface) else {
            return;
        };
        let bound = api.framebuffer_binding(FramebufferTarget::Draw);
        let mut restore = true;
        for key in keys {
            let external = self.external.contains(&key);
            let Some(fbo) = self.forget_key(&key) else {
                continue;
            };
            if external || fbo.is_zero() {
                continue;
            }
            if fbo == bound {
                restore = false;
            }
            Self::detach_and_delete(api, &key, fbo, self.default_fbo);
        }
        if restore {
            api.bind_framebuffer(FramebufferTarget::Draw, bound);
        }
    }

    fn detach_and_delete(
        api: &mut GlesApi,
        key: &FramebufferKey,
        fbo: FramebufferHandle,
        default: FramebufferHandle,
    ) {
        api.bind_framebuffer(FramebufferTarget::Draw, fbo);
        for index in 0..key.setup().colors.len() {
            let attachment = gl::COLOR_ATTACHMENT0 + index as GLenum;
            api.attach_texture_2d(attachment, gl::TEXTURE_2D, 0, 0);
        }
        if key.setup().depth.is_some() {
            api.attach_renderbuffer(gl::DEPTH_ATTACHMENT, 0);
            api.attach_renderbuffer(gl::STENCIL_ATTACHMENT, 0);
        }
        api.delete_framebuffer(fbo, default);
    }

    fn fall_back_to_valid_state(&mut self, api: &mut GlesApi) -> Result<(), FramebufferError> {
        match (self.pending_valid, self.current_valid) {
            (false, false) => {
                self.make_current(api, BuiltinTarget::Default);
                self.activate_builtin(api, BuiltinTarget::Default, false)
            }
            (false, true) => self.activate_builtin(api, BuiltinTarget::Default, false),
            (true, false) => {
                self.make_current(api, BuiltinTarget::Pending);
                Ok(())
            }
            (true, true) => Ok(()),
        }
    }

    /// Schedules the framebuffers of a surface destroyed on another context
    /// for deletion the next time this one becomes current.
    pub fn queue_surface_invalidation(&mut self, surface: RenderSurfaceId) {
        self.pending_valid &= !self.pending_setup.remove_surface(surface);
        self.current_valid &= !self.current_setup.remove_surface(surface);
        if !self.invalidated.contains(&surface) {
            self.invalidated.push(surface);
        }
    }

    /// Deletes the framebuffers of every queued surface. The context must be current.
    pub fn process_invalidated_surfaces(&mut self, api: &mut GlesApi) {
        for surface in std::mem::take(&mut self.invalidated) {
            self.cleanup_for_surface(api, surface);
            self.surfaces.remove(&surface);
        }
    }

    /// Number of surfaces waiting for deferred cleanup.
    pub fn queued_invalidations(&self) -> usize {
        self.invalidated.len()
    }

    // --- Context events ---

    /// Forgets every framebuffer object without deleting it, after a context loss.
    pub fn invalidate(&mut self) {
        self.framebuffers.clear();
        self.dependents.clear();
        self.external.clear();
        self.register_default_entry();
    }

    /// Forgets what is bound on the context; the next [`prepare`](Self::prepare) rebinds.
    pub fn invalidate_active_state(&mut self, api: &mut GlesApi) {
        self.requires_setup = true;
        self.current_fbo = api.framebuffer_binding(FramebufferTarget::Draw);
        self.current_viewport = None;
        self.current_scissor = None;
    }

    /// Resynchronizes with the context after it became current again.
    pub fn active_context_changed(&mut self, api: &mut GlesApi) -> Result<(), FramebufferError> {
        self.register_default_entry();
        self.invalidate_active_state(api);
        let result = self.fall_back_to_valid_state(api);
        self.process_invalidated_surfaces(api);
        result
    }

    /// Deletes every framebuffer object owned by the manager. The context must be current.
    pub fn destroy(&mut self, api: &mut GlesApi) {
        let mut deleted = 0;
        for (key, fbo) in self.framebuffers.drain() {
            if self.external.contains(&key) || fbo.is_zero() {
                continue;
            }
            api.delete_framebuffer(fbo, self.default_fbo);
            deleted += 1;
        }
        self.dependents.clear();
        self.external.clear();
        self.invalidated.clear();
        self.register_default_entry();
        log::debug!("Deleted {} framebuffers of {:?}", deleted, self.context);
    }

    // --- Accessors ---

    /// The object bound by the last promotion.
    pub fn current_framebuffer_name(&self) -> FramebufferHandle {
        self.current_fbo
    }

    /// The object of the pending target.
    pub fn pending_framebuffer_name(&self) -> FramebufferHandle {
        self.pending_fbo
    }

    /// The window framebuffer object.
    pub fn default_framebuffer_name(&self) -> FramebufferHandle {
        self.default_fbo
    }

    /// The setup bound by the last promotion.
    pub fn current_setup(&self) -> &RenderTargetSetup {
        &self.current_setup
    }

    /// The setup the next draw will render into.
    pub fn pending_setup(&self) -> &RenderTargetSetup {
        &self.pending_setup
    }

    /// The window framebuffer setup.
    pub fn default_setup(&self) -> &RenderTargetSetup {
        &self.default_setup
    }

    /// Sample count of the current target.
    pub fn samples_count(&self) -> u32 {
        self.samples_count
    }

    /// Returns `true` until the pending target has been promoted.
    pub fn requires_setup(&self) -> bool {
        self.requires_setup
    }

    /// Viewport of the pending target.
    pub fn pending_viewport(&self) -> RectInt {
        self.pending_viewport
    }

    /// Scissor rectangle of the pending target.
    pub fn pending_scissor(&self) -> RectInt {
        self.pending_scissor
    }

    /// Number of memoized framebuffers, the window framebuffer included.
    pub fn len(&self) -> usize {
        self.framebuffers.len()
    }

    /// Returns `true` if no framebuffer is memoized.
    pub fn is_empty(&self) -> bool {
        self.framebuffers.is_empty()
    }

    /// Number of memoized framebuffers that have `surface` attached.
    pub fn dependents_of(&self, surface: RenderSurfaceId) -> usize {
        self.dependents.get(&surface).map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::recorder::{CallLog, GlCall, RecordingGl};
    use crate::graphics::gles::settings::GlesSettings;

    const COLOR: RenderSurfaceId = RenderSurfaceId(1);
    const DEPTH: RenderSurfaceId = RenderSurfaceId(2);
    const OTHER: RenderSurfaceId = RenderSurfaceId(3);

    fn fixture(gl: RecordingGl) -> (GlesApi, PipelineStateCache, FramebufferManager, CallLog) {
        let log = gl.log();
        let api = GlesApi::new(Box::new(gl), &GlesSettings::default()).unwrap();
        let states = PipelineStateCache::new(api.caps());
        let mut manager = FramebufferManager::new(api.context());
        manager.setup_default_framebuffer(
            RenderSurface::back_buffer_color(320, 240),
            RenderSurface::back_buffer_depth(320, 240),
            FramebufferHandle::ZERO,
        );
        manager.register_surface(color_surface(COLOR, 10));
        manager.register_surface(depth_surface(DEPTH, 20, true));
        manager.register_surface(color_surface(OTHER, 30));
        log.clear();
        (api, states, manager, log)
    }

    fn color_surface(id: RenderSurfaceId, texture: u32) -> RenderSurface {
        RenderSurface::color(id, SurfaceBacking::Texture(texture), 256, 128)
    }

    fn depth_surface(id: RenderSurfaceId, renderbuffer: u32, stencil: bool) -> RenderSurface {
        let backing = SurfaceBacking::Renderbuffer(renderbuffer);
        RenderSurface::depth(id, backing, 256, 128, stencil)
    }

    fn tiled_gpu() -> RecordingGl {
        RecordingGl::new().with_renderer("Mali-G78 MP14")
    }

    fn color_and_depth() -> RenderTargetSetup {
        RenderTargetSetup::new(vec![COLOR], Some(DEPTH))
    }

    fn count_gen(log: &CallLog) -> usize {
        log.count(|c| matches!(c, GlCall::GenFramebuffer(_)))
    }

    #[test]
    fn test_setups_are_memoized() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let setup = color_and_depth();
        let first = manager.get_framebuffer_name(&mut api, &setup).unwrap();
        let again = manager.get_framebuffer_name(&mut api, &setup).unwrap();
        assert_eq!(first, again);
        assert_eq!(count_gen(&log), 1);

        let other = RenderTargetSetup::new(vec![OTHER], Some(DEPTH));
        let other = manager.get_framebuffer_name(&mut api, &other).unwrap();
        assert_ne!(first, other);
        assert_eq!(count_gen(&log), 2);
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.dependents_of(DEPTH), 2);
    }

    #[test]
    fn test_creation_attaches_and_restores_binding() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let fbo = manager.get_framebuffer_name(&mut api, &color_and_depth());
        let fbo = fbo.unwrap();

        let calls = log.calls();
        assert!(calls.contains(&GlCall::FramebufferTexture2D {
            target: gl::FRAMEBUFFER,
            attachment: gl::COLOR_ATTACHMENT0,
            texture_target: gl::TEXTURE_2D,
            texture: 10,
            level: 0,
        }));
        assert!(calls.contains(&GlCall::FramebufferRenderbuffer {
            target: gl::FRAMEBUFFER,
            attachment: gl::DEPTH_ATTACHMENT,
            renderbuffer: 20,
        }));
        assert!(calls.contains(&GlCall::FramebufferRenderbuffer {
            target: gl::FRAMEBUFFER,
            attachment: gl::STENCIL_ATTACHMENT,
            renderbuffer: 20,
        }));
        assert!(calls.contains(&GlCall::DrawBuffers(vec![gl::COLOR_ATTACHMENT0])));
        let restore = GlCall::BindFramebuffer {
            target: gl::DRAW_FRAMEBUFFER,
            framebuffer: 0,
        };
        assert_eq!(calls.last(), Some(&restore));
        assert!(fbo.is_valid() && !fbo.is_zero());
        assert_eq!(manager.current_framebuffer_name(), FramebufferHandle::ZERO);
    }

    #[test]
    fn test_incomplete_framebuffer_is_deleted() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        log.set_framebuffer_status(gl::FRAMEBUFFER_UNSUPPORTED);

        let err = manager.get_framebuffer_name(&mut api, &color_and_depth());
        assert_eq!(
            err.unwrap_err(),
            FramebufferError::Incomplete {
                status: gl::FRAMEBUFFER_UNSUPPORTED,
                description: "FRAMEBUFFER_UNSUPPORTED",
            }
        );
        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteFramebuffer(_))), 1);
        assert_eq!(log.live_framebuffer_count(), 0);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_invalid_setups_are_rejected() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        assert_eq!(
            manager.activate(&mut api, &RenderTargetSetup::default()),
            Err(FramebufferError::EmptyAttachmentSet)
        );
        let unknown = RenderTargetSetup::new(vec![RenderSurfaceId(99)], None);
        assert_eq!(
            manager.activate(&mut api, &unknown),
            Err(FramebufferError::UnknownSurface {
                surface: RenderSurfaceId(99),
            })
        );
        let wide = RenderTargetSetup::new(vec![COLOR; 9], None);
        assert_eq!(
            manager.activate(&mut api, &wide),
            Err(FramebufferError::TooManyColorAttachments { count: 9, max: 8 })
        );
        assert!(log.is_empty());
    }

    #[test]
    fn test_activation_is_lazy() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        manager.activate(&mut api, &color_and_depth()).unwrap();
        assert!(manager.requires_setup());
        assert_eq!(manager.current_framebuffer_name(), FramebufferHandle::ZERO);
        assert_eq!(manager.pending_viewport(), RectInt::from_size(256, 128));

        log.clear();
        manager.prepare(&mut api, &mut states);
        let pending = manager.pending_framebuffer_name();
        assert_eq!(manager.current_framebuffer_name(), pending);
        assert_eq!(manager.current_setup(), &color_and_depth());
        assert!(log.contains(&GlCall::Viewport([0, 0, 256, 128])));
        assert!(log.contains(&GlCall::Scissor([0, 0, 256, 128])));

        log.clear();
        manager.prepare(&mut api, &mut states);
        assert!(log.is_empty());
    }

    #[test]
    fn test_viewport_applies_at_once_when_bound() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        manager.activate(&mut api, &color_and_depth()).unwrap();
        manager.set_viewport(&mut api, RectInt::new(0, 0, 64, 64));
        assert!(!log.contains(&GlCall::Viewport([0, 0, 64, 64])));

        manager.prepare(&mut api, &mut states);
        assert!(log.contains(&GlCall::Viewport([0, 0, 64, 64])));

        log.clear();
        manager.set_viewport(&mut api, RectInt::new(8, 8, 32, 32));
        assert_eq!(log.calls(), vec![GlCall::Viewport([8, 8, 32, 32])]);
        manager.set_viewport(&mut api, RectInt::new(8, 8, 32, 32));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_releasing_active_surface_falls_back_to_default() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        manager.activate(&mut api, &color_and_depth()).unwrap();
        manager.prepare(&mut api, &mut states);

        manager.release_framebuffer(&mut api, COLOR).unwrap();
        assert_eq!(manager.pending_setup(), manager.default_setup());
        assert_eq!(manager.current_setup(), manager.default_setup());
        assert_eq!(manager.current_framebuffer_name(), FramebufferHandle::ZERO);
        assert_eq!(log.live_framebuffer_count(), 0);
        assert_eq!(log.bound_draw_framebuffer(), 0);
        assert!(manager.surface(COLOR).is_none());
        assert_eq!(manager.dependents_of(DEPTH), 0);
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_releasing_inactive_surface_keeps_binding() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        let unused = RenderTargetSetup::new(vec![OTHER], None);
        manager.get_framebuffer_name(&mut api, &unused).unwrap();
        manager.activate(&mut api, &color_and_depth()).unwrap();
        manager.prepare(&mut api, &mut states);
        let bound = manager.current_framebuffer_name();

        manager.release_framebuffer(&mut api, OTHER).unwrap();
        assert_eq!(manager.current_framebuffer_name(), bound);
        assert_eq!(log.bound_draw_framebuffer(), bound.raw());
        assert_eq!(log.live_framebuffer_count(), 1);
    }

    #[test]
    fn test_window_surfaces_cannot_be_released() {
        let (mut api, _, mut manager, _) = fixture(RecordingGl::new());
        let surface = RenderSurfaceId::BACK_BUFFER_DEPTH;
        assert_eq!(
            manager.release_framebuffer(&mut api, surface),
            Err(FramebufferError::DefaultSurfaceRelease { surface })
        );
    }

    #[test]
    fn test_cube_face_and_layers() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let cube = RenderSurfaceId(40);
        let volume = RenderSurfaceId(41);
        let cube_surface = color_surface(cube, 50);
        manager.register_surface(cube_surface.with_dimension(TextureDimension::Cube));
        let volume_surface = color_surface(volume, 51);
        manager.register_surface(volume_surface.with_dimension(TextureDimension::D3));

        let setup = RenderTargetSetup::new(vec![cube], None);
        let setup = setup.with_cube_face(9).with_mip_level(2);
        manager.get_framebuffer_name(&mut api, &setup).unwrap();
        assert!(log.contains(&GlCall::FramebufferTexture2D {
            target: gl::FRAMEBUFFER,
            attachment: gl::COLOR_ATTACHMENT0,
            texture_target: gl::TEXTURE_CUBE_MAP_POSITIVE_X + 5,
            texture: 50,
            level: 2,
        }));

        let layered = RenderTargetSetup::new(vec![volume], None).with_depth_slice(3);
        manager.get_framebuffer_name(&mut api, &layered).unwrap();
        assert!(log.contains(&GlCall::FramebufferTextureLayer {
            target: gl::FRAMEBUFFER,
            attachment: gl::COLOR_ATTACHMENT0,
            texture: 51,
            level: 0,
            layer: 3,
        }));

        let whole = RenderTargetSetup::new(vec![volume], None);
        manager.get_framebuffer_name(&mut api, &whole).unwrap();
        assert!(log.contains(&GlCall::FramebufferTexture {
            target: gl::FRAMEBUFFER,
            attachment: gl::COLOR_ATTACHMENT0,
            texture: 51,
            level: 0,
        }));
    }

    #[test]
    fn test_placeholder_colors_get_no_draw_buffer() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let dummy = RenderSurfaceId(42);
        manager.register_surface(color_surface(dummy, 52).never_used());

        let setup = RenderTargetSetup::new(vec![dummy, COLOR], None);
        manager.get_framebuffer_name(&mut api, &setup).unwrap();
        let draw_buffers = vec![gl::NONE, gl::COLOR_ATTACHMENT0 + 1];
        assert!(log.contains(&GlCall::DrawBuffers(draw_buffers)));
        assert!(!log.contains(&GlCall::FramebufferTexture2D {
            target: gl::FRAMEBUFFER,
            attachment: gl::COLOR_ATTACHMENT0,
            texture_target: gl::TEXTURE_2D,
            texture: 52,
            level: 0,
        }));
    }

    #[test]
    fn test_depth_only_setup_on_es_skips_draw_buffers() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let setup = RenderTargetSetup::new(vec![], Some(DEPTH));
        manager.get_framebuffer_name(&mut api, &setup).unwrap();
        assert_eq!(log.count(|c| matches!(c, GlCall::DrawBuffers(_))), 0);
    }

    #[test]
    fn test_depth_only_setup_on_core_selects_none() {
        let gl = RecordingGl::new().with_version("4.5.0 NVIDIA 535.0");
        let (mut api, _, mut manager, log) = fixture(gl);
        let setup = RenderTargetSetup::new(vec![], Some(DEPTH));
        manager.get_framebuffer_name(&mut api, &setup).unwrap();
        assert!(log.contains(&GlCall::DrawBuffers(vec![gl::NONE])));
    }

    #[test]
    fn test_shared_label_is_applied() {
        let gl = RecordingGl::new().with_extensions(&["GL_KHR_debug"]);
        let (mut api, _, mut manager, log) = fixture(gl);
        manager.register_surface(color_surface(COLOR, 10).with_label("Shadow"));
        manager.register_surface(depth_surface(DEPTH, 20, true).with_label("Shadow"));
        let fbo = manager.get_framebuffer_name(&mut api, &color_and_depth());
        let fbo = fbo.unwrap();
        assert!(log.contains(&GlCall::ObjectLabel {
            identifier: gl::FRAMEBUFFER_LABEL,
            name: fbo.raw(),
            label: "Shadow".to_owned(),
        }));

        let unlabeled = RenderTargetSetup::new(vec![OTHER], Some(DEPTH));
        manager.get_framebuffer_name(&mut api, &unlabeled).unwrap();
        assert_eq!(log.count(|c| matches!(c, GlCall::ObjectLabel { .. })), 1);
    }

    #[test]
    fn test_clear_drops_missing_aspects() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        let depth_only = RenderSurfaceId(43);
        manager.register_surface(depth_surface(depth_only, 53, false));
        let setup = RenderTargetSetup::new(vec![COLOR], Some(depth_only));
        manager.activate(&mut api, &setup).unwrap();
        let values = ClearValues::default();

        manager.clear(&mut api, &mut states, ClearFlags::ALL, values);
        let mask = gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT;
        assert!(log.contains(&GlCall::Clear(mask)));

        log.clear();
        let setup = RenderTargetSetup::new(vec![], Some(DEPTH));
        manager.activate(&mut api, &setup).unwrap();
        manager.clear(&mut api, &mut states, ClearFlags::ALL, values);
        let mask = gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT;
        assert!(log.contains(&GlCall::Clear(mask)));
    }

    #[test]
    fn test_discarded_store_is_invalidated_on_switch() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        manager.activate(&mut api, &color_and_depth()).unwrap();
        manager.prepare(&mut api, &mut states);
        manager.discard_contents(&api, COLOR);
        let surface = manager.surface(COLOR).unwrap();
        assert_eq!(surface.store_action, StoreAction::DontCare);
        assert_eq!(surface.load_action, LoadAction::Load);

        log.clear();
        let window = BuiltinTarget::Default;
        manager.activate_builtin(&mut api, window, false).unwrap();
        assert!(log.contains(&GlCall::InvalidateFramebuffer {
            target: gl::FRAMEBUFFER,
            attachments: vec![gl::COLOR_ATTACHMENT0],
        }));
        let surface = manager.surface(COLOR).unwrap();
        assert_eq!(surface.store_action, StoreAction::Store);
    }

    #[test]
    fn test_discard_outside_pending_keeps_store() {
        let (api, _, mut manager, _) = fixture(RecordingGl::new());
        manager.discard_contents(&api, OTHER);
        let surface = manager.surface(OTHER).unwrap();
        assert_eq!(surface.store_action, StoreAction::Store);
    }

    #[test]
    fn test_default_depth_invalidation_uses_window_names() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        let window = BuiltinTarget::Default;
        manager.activate_builtin(&mut api, window, false).unwrap();
        manager.prepare(&mut api, &mut states);
        log.clear();

        manager.try_invalidate_default_depth(&mut api);
        let invalidate = GlCall::InvalidateFramebuffer {
            target: gl::FRAMEBUFFER,
            attachments: vec![gl::DEPTH, gl::STENCIL],
        };
        assert_eq!(log.calls(), vec![invalidate]);

        manager.activate(&mut api, &color_and_depth()).unwrap();
        manager.prepare(&mut api, &mut states);
        log.clear();
        manager.try_invalidate_default_depth(&mut api);
        assert!(log.is_empty());
    }

    #[test]
    fn test_tiled_gpu_clears_instead_of_restoring() {
        let (mut api, mut states, mut manager, log) = fixture(tiled_gpu());
        assert!(api.caps().use_clear_to_avoid_restore);

        let window = BuiltinTarget::Default;
        manager.activate_builtin(&mut api, window, true).unwrap();
        manager.prepare(&mut api, &mut states);
        assert!(log.contains(&GlCall::ClearColor([0.0, 0.0, 0.0, 1.0])));
        let mask = gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT;
        assert!(log.contains(&GlCall::Clear(mask)));
        let back_buffer = manager.surface(RenderSurfaceId::BACK_BUFFER_COLOR);
        assert_eq!(back_buffer.unwrap().load_action, LoadAction::Load);
    }

    #[test]
    fn test_full_clear_replaces_restore_clear() {
        let (mut api, mut states, mut manager, log) = fixture(tiled_gpu());
        let window = BuiltinTarget::Default;
        manager.activate_builtin(&mut api, window, true).unwrap();
        log.clear();

        let values = ClearValues::default();
        manager.clear(&mut api, &mut states, ClearFlags::COLOR, values);
        assert_eq!(log.count(|c| matches!(c, GlCall::Clear(_))), 1);
        assert!(log.contains(&GlCall::Clear(gl::COLOR_BUFFER_BIT)));
    }

    #[test]
    fn test_queued_invalidation_runs_on_next_activation() {
        let (mut api, mut states, mut manager, log) = fixture(RecordingGl::new());
        manager.activate(&mut api, &color_and_depth()).unwrap();
        manager.prepare(&mut api, &mut states);

        manager.queue_surface_invalidation(COLOR);
        let depth_only = RenderTargetSetup::new(vec![], Some(DEPTH));
        assert_eq!(manager.pending_setup(), &depth_only);
        assert_eq!(manager.queued_invalidations(), 1);
        assert_eq!(log.live_framebuffer_count(), 1);

        manager.active_context_changed(&mut api).unwrap();
        assert_eq!(manager.queued_invalidations(), 0);
        assert_eq!(log.live_framebuffer_count(), 0);
        assert_eq!(manager.pending_setup(), manager.default_setup());
        assert!(manager.surface(COLOR).is_none());
    }

    #[test]
    fn test_invalidate_forgets_without_deleting() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let setup = color_and_depth();
        manager.get_framebuffer_name(&mut api, &setup).unwrap();
        manager.invalidate();
        assert_eq!(manager.len(), 1);
        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteFramebuffer(_))), 0);

        manager.get_framebuffer_name(&mut api, &setup).unwrap();
        assert_eq!(count_gen(&log), 2);
    }

    #[test]
    fn test_external_framebuffers_are_never_deleted() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let external = FramebufferHandle::new(api.context(), 77);
        manager.register_external_fbo(color_and_depth(), external);
        let fbo = manager.get_framebuffer_name(&mut api, &color_and_depth());
        assert_eq!(fbo, Ok(external));
        assert_eq!(count_gen(&log), 0);

        manager.release_framebuffer(&mut api, COLOR).unwrap();
        assert_eq!(log.count(|c| *c == GlCall::DeleteFramebuffer(77)), 0);
    }

    #[test]
    fn test_destroy_deletes_owned_framebuffers() {
        let (mut api, _, mut manager, log) = fixture(RecordingGl::new());
        let other = RenderTargetSetup::new(vec![OTHER], None);
        manager.get_framebuffer_name(&mut api, &other).unwrap();
        let setup = color_and_depth();
        manager.get_framebuffer_name(&mut api, &setup).unwrap();

        manager.destroy(&mut api);
        assert_eq!(log.live_framebuffer_count(), 0);
        assert_eq!(log.count(|c| matches!(c, GlCall::DeleteFramebuffer(_))), 2);
        assert_eq!(manager.len(), 1);
    }
}
