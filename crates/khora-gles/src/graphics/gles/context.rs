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

//! Per-native-context bookkeeping.
//!
//! Framebuffer and vertex array objects cannot be shared between contexts, so
//! every native context gets its own [`ContextInstance`]. The registry knows
//! which one is current and resynchronizes it on every switch, since another
//! context may have changed the driver state in the meantime.

use super::api::GlesApi;
use super::framebuffer::FramebufferManager;
use super::handle::{ContextId, VertexArrayHandle};
use khora_gfx_core::renderer::api::target::RenderSurfaceId;
use khora_gfx_core::renderer::{DriverError, GfxError};
use std::collections::BTreeMap;

/// Opaque identity of a native context, as handed out by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeContext(pub u64);

impl NativeContext {
    /// Alias for the first context ever registered.
    pub const MASTER: Self = Self(u64::MAX);
}

/// Where a native context stands in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Never made current.
    Uninitialized,
    /// Registered, but another context (or none) is current.
    Registered,
    /// The context every call is routed to.
    Current,
}

/// The objects owned by one native context.
#[derive(Debug)]
pub struct ContextInstance {
    id: ContextId,
    native: NativeContext,
    framebuffers: FramebufferManager,
    default_vertex_array: VertexArrayHandle,
}

impl ContextInstance {
    fn new(api: &mut GlesApi, id: ContextId, native: NativeContext) -> Result<Self, DriverError> {
        // Core profiles and indirect draws need a vertex array other than 0.
        let default_vertex_array = if api.caps().has_vertex_array_object {
            api.create_vertex_array()?
        } else {
            VertexArrayHandle::ZERO
        };
        Ok(Self {
            id,
            native,
            framebuffers: FramebufferManager::new(id),
            default_vertex_array,
        })
    }

    /// Backend-side identity, used to tag per-context GL objects.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The native context this instance belongs to.
    pub fn native(&self) -> NativeContext {
        self.native
    }

    /// Framebuffer bookkeeping of this context.
    pub fn framebuffers(&self) -> &FramebufferManager {
        &self.framebuffers
    }

    /// Mutable framebuffer bookkeeping of this context.
    pub fn framebuffers_mut(&mut self) -> &mut FramebufferManager {
        &mut self.framebuffers
    }

    /// The vertex array bound when no other is, as last created.
    pub fn default_vertex_array(&self) -> VertexArrayHandle {
        self.default_vertex_array
    }
}

/// Tracks every native context and the one that is current.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    instances: BTreeMap<NativeContext, ContextInstance>,
    current: Option<NativeContext>,
    master: Option<NativeContext>,
    next_id: u32,
}

impl ContextRegistry {
    /// An empty registry with no current context.
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, native: NativeContext) -> NativeContext {
        match (native, self.master) {
            (NativeContext::MASTER, Some(master)) => master,
            _ => native,
        }
    }

    /// Makes `native` the current context, registering it on first use.
    ///
    /// The native context must already be current on the calling thread. The
    /// binding shadow of `api` is always dropped, and `GlesBackend::make_current`
    /// invalidates the pipeline state cache on top of this call.
    pub fn make_current(
        &mut self,
        api: &mut GlesApi,
        native: NativeContext,
    ) -> Result<&mut ContextInstance, GfxError> {
        let native = self.resolve(native);

        if !self.instances.contains_key(&native) {
            let id = ContextId(self.next_id);
            api.set_context(id);
            let instance = ContextInstance::new(api, id, native)?;
            self.next_id += 1;
            self.instances.insert(native, instance);
            if self.master.is_none() {
                self.master = Some(native);
            }
            log::info!("Registered native context {:?} as {:?}", native, id);
        }

        self.current = Some(native);
        let instance = self
            .instances
            .get_mut(&native)
            .ok_or(DriverError::Unsupported {
                feature: "native context",
            })?;
        api.set_context(instance.id);
        instance.framebuffers.active_context_changed(api)?;
        api.bind_vertex_array(instance.default_vertex_array);
        Ok(instance)
    }

    /// Forgets the framebuffer objects of every context, after a device reset.
    ///
    /// No context is current afterwards.
    pub fn invalidate(&mut self, api: &mut GlesApi) {
        for (native, instance) in self.instances.iter_mut() {
            instance.framebuffers.invalidate();
            if self.current == Some(*native) {
                api.bind_vertex_array(instance.default_vertex_array);
            }
        }
        self.current = None;
    }

    /// Queues `surface` on every context but the current one; the current
    /// context releases it directly.
    pub fn add_render_surface_to_deferred_invalidate_list(&mut self, surface: RenderSurfaceId) {
        for (native, instance) in self.instances.iter_mut() {
            if self.current == Some(*native) {
                continue;
            }
            instance.framebuffers.queue_surface_invalidation(surface);
        }
    }

    /// The default vertex array of the current context, recreated if the driver lost it.
    pub fn default_vertex_array(
        &mut self,
        api: &mut GlesApi,
    ) -> Result<VertexArrayHandle, DriverError> {
        let Some(instance) = self.current_mut() else {
            return Ok(VertexArrayHandle::ZERO);
        };
        let vao = instance.default_vertex_array;
        if api.caps().has_vertex_array_object && !api.is_vertex_array(vao) {
            log::warn!(
                "Default vertex array of {:?} was lost by the driver, recreating it",
                instance.id
            );
            instance.default_vertex_array = api.create_vertex_array()?;
        }
        Ok(instance.default_vertex_array)
    }

    /// Unregisters `native`.
    ///
    /// The objects of the current context are deleted; those of any other are
    /// abandoned since its names cannot be used from here.
    pub fn destroy_context(&mut self, api: &mut GlesApi, native: NativeContext) {
        let native = self.resolve(native);
        let Some(mut instance) = self.instances.remove(&native) else {
            return;
        };
        if self.current == Some(native) {
            instance.framebuffers.destroy(api);
            api.delete_vertex_array(instance.default_vertex_array);
            self.current = None;
        } else {
            log::debug!(
                "Abandoning the objects of non-current context {:?}",
                instance.id
            );
        }
        if self.master == Some(native) {
            self.master = None;
        }
        log::info!("Destroyed native context {:?}", native);
    }

    /// The current context, if any.
    pub fn current(&self) -> Option<&ContextInstance> {
        self.current.and_then(|native| self.instances.get(&native))
    }

    /// The current context, mutably.
    pub fn current_mut(&mut self) -> Option<&mut ContextInstance> {
        let native = self.current?;
        self.instances.get_mut(&native)
    }

    /// The instance of `native`, resolving the master alias.
    pub fn get(&self, native: NativeContext) -> Option<&ContextInstance> {
        self.instances.get(&self.resolve(native))
    }

    /// The instance of `native` mutably, resolving the master alias.
    pub fn get_mut(&mut self, native: NativeContext) -> Option<&mut ContextInstance> {
        let native = self.resolve(native);
        self.instances.get_mut(&native)
    }

    /// Every registered instance, in native context order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ContextInstance> {
        self.instances.values_mut()
    }

    /// Where `native` stands in the registry.
    pub fn state_of(&self, native: NativeContext) -> ContextState {
        let native = self.resolve(native);
        if self.current == Some(native) {
            ContextState::Current
        } else if self.instances.contains_key(&native) {
            ContextState::Registered
        } else {
            ContextState::Uninitialized
        }
    }

    /// Number of registered contexts.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether no context was registered yet.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::recorder::{CallLog, GlCall, RecordingGl};
    use crate::graphics::gles::settings::GlesSettings;
    use khora_gfx_core::renderer::api::target::{RenderSurface, RenderTargetSetup, SurfaceBacking};

    fn api() -> (GlesApi, CallLog) {
        let gl = RecordingGl::new();
        let log = gl.log();
        let api = GlesApi::new(Box::new(gl), &GlesSettings::default()).unwrap();
        log.clear();
        (api, log)
    }

    #[test]
    fn test_first_context_is_master() {
        let (mut api, _) = api();
        let mut registry = ContextRegistry::new();
        let (first, second) = (NativeContext(7), NativeContext(8));
        assert_eq!(registry.state_of(first), ContextState::Uninitialized);

        registry.make_current(&mut api, first).unwrap();
        registry.make_current(&mut api, second).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.state_of(first), ContextState::Registered);
        assert_eq!(registry.state_of(second), ContextState::Current);

        let master = registry.make_current(&mut api, NativeContext::MASTER);
        assert_eq!(master.unwrap().native(), first);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_each_context_gets_its_own_ids_and_vertex_array() {
        let (mut api, log) = api();
        let mut registry = ContextRegistry::new();
        let first = registry.make_current(&mut api, NativeContext(1)).unwrap();
        let first = first.id();
        let second = registry.make_current(&mut api, NativeContext(2)).unwrap();
        let second = second.id();
        assert_ne!(first, second);
        assert_eq!(api.context(), second);
        assert_eq!(log.count(|c| matches!(c, GlCall::GenVertexArray(_))), 2);
        let vao = registry.current().unwrap().default_vertex_array();
        assert_eq!(log.bound_vertex_array(), vao.raw());
    }

    #[test]
    fn test_switching_always_resyncs() {
        let (mut api, log) = api();
        let mut registry = ContextRegistry::new();
        registry.make_current(&mut api, NativeContext(1)).unwrap();
        log.clear();

        registry.make_current(&mut api, NativeContext(1)).unwrap();
        // The shadow was dropped, so the default vertex array is rebound.
        assert_eq!(log.count(|c| matches!(c, GlCall::BindVertexArray(_))), 1);
    }

    #[test]
    fn test_deferred_invalidation_skips_current_context() {
        let (mut api, log) = api();
        let mut registry = ContextRegistry::new();
        let surface = RenderSurface::color(RenderSurfaceId(5), SurfaceBacking::Texture(9), 16, 16);
        let setup = RenderTargetSetup::new(vec![surface.id], None);

        for native in [NativeContext(1), NativeContext(2)] {
            let instance = registry.make_current(&mut api, native).unwrap();
            let framebuffers = instance.framebuffers_mut();
            framebuffers.register_surface(surface.clone());
            framebuffers.get_framebuffer_name(&mut api, &setup).unwrap();
        }
        assert_eq!(log.live_framebuffer_count(), 2);

        registry.add_render_surface_to_deferred_invalidate_list(surface.id);
        let queued = |instance: &ContextInstance| instance.framebuffers().queued_invalidations();
        assert_eq!(queued(registry.current().unwrap()), 0);
        assert_eq!(queued(registry.get(NativeContext(1)).unwrap()), 1);

        let instance = registry.make_current(&mut api, NativeContext(1)).unwrap();
        assert_eq!(log.live_framebuffer_count(), 1);
        assert_eq!(instance.framebuffers().dependents_of(surface.id), 0);
    }

    #[test]
    fn test_invalidate_leaves_no_current_context() {
        let (mut api, _) = api();
        let mut registry = ContextRegistry::new();
        registry.make_current(&mut api, NativeContext(1)).unwrap();
        registry.invalidate(&mut api);
        assert!(registry.current().is_none());
        assert_eq!(
            registry.state_of(NativeContext(1)),
            ContextState::Registered
        );
    }

    #[test]
    fn test_lost_vertex_array_is_recreated() {
        let (mut api, log) = api();
        let mut registry = ContextRegistry::new();
        let instance = registry.make_current(&mut api, NativeContext(1)).unwrap();
        let old = instance.default_vertex_array();
        log.lose_vertex_array(old.raw());

        let new = registry.default_vertex_array(&mut api).unwrap();
        assert_ne!(old, new);
        assert_eq!(registry.default_vertex_array(&mut api).unwrap(), new);
    }

    #[test]
    fn test_destroying_current_context_deletes_its_objects() {
        let (mut api, log) = api();
        let mut registry = ContextRegistry::new();
        let instance = registry.make_current(&mut api, NativeContext(1)).unwrap();
        let vao = instance.default_vertex_array();

        registry.destroy_context(&mut api, NativeContext(1));
        assert!(registry.is_empty());
        assert!(log.contains(&GlCall::DeleteVertexArray(vao.raw())));
        assert_eq!(
            registry.state_of(NativeContext(1)),
            ContextState::Uninitialized
        );
    }

    #[test]
    fn test_destroying_other_context_abandons_objects() {
        let (mut api, log) = api();
        let mut registry = ContextRegistry::new();
        registry.make_current(&mut api, NativeContext(1)).unwrap();
        registry.make_current(&mut api, NativeContext(2)).unwrap();
        log.clear();

        registry.destroy_context(&mut api, NativeContext(1));
        assert!(log.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
