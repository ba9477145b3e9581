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

use super::device::{
    BlendFlags, DeviceBlendState, DeviceDepthState, DeviceRasterState, DeviceStencilState,
};
use super::{
    BlendStateId, ClearFlags, ClearValues, DepthStateId, Interner, RasterStateId, StencilStateId,
};
use crate::graphics::gles::api::{EnableCaps, GlesApi};
use crate::graphics::gles::caps::GraphicsCaps;
use crate::graphics::gles::gl;
use khora_gfx_core::renderer::api::pipeline::enums::{BlendFactor, CullMode};
use khora_gfx_core::renderer::api::pipeline::state::{
    BlendComponentDescriptor, BlendStateDescriptor, ColorWrites, DepthStateDescriptor,
    RasterStateDescriptor, StencilStateDescriptor,
};

/// Interns pipeline states and tracks which one of each kind is bound.
///
/// A bound slot of `None` means the live context is unknown; the next `set_*`
/// then applies every field.
#[derive(Debug)]
pub struct PipelineStateCache {
    blend: Interner<BlendStateDescriptor, DeviceBlendState>,
    depth: Interner<DepthStateDescriptor, DeviceDepthState>,
    stencil: Interner<StencilStateDescriptor, DeviceStencilState>,
    raster: Interner<RasterStateDescriptor, DeviceRasterState>,
    bound_blend: Option<BlendStateId>,
    bound_depth: Option<DepthStateId>,
    bound_stencil: Option<(StencilStateId, i32)>,
    bound_raster: Option<RasterStateId>,
    no_depth_access: DepthStateId,
    no_color_write: BlendStateId,
}

impl PipelineStateCache {
    /// Creates a cache with the default states and the two shared override
    /// states (no depth access, no color writes) already interned.
    pub fn new(caps: &GraphicsCaps) -> Self {
        let mut cache = Self {
            blend: Interner::new(),
            depth: Interner::new(),
            stencil: Interner::new(),
            raster: Interner::new(),
            bound_blend: None,
            bound_depth: None,
            bound_stencil: None,
            bound_raster: None,
            no_depth_access: DepthStateId(0),
            no_color_write: BlendStateId(0),
        };
        cache.create_blend_state(BlendStateDescriptor::default());
        cache.create_depth_state(DepthStateDescriptor::default());
        cache.create_stencil_state(StencilStateDescriptor::default());
        cache.create_raster_state(RasterStateDescriptor::default());
        cache.no_depth_access = cache.create_depth_state(DepthStateDescriptor::NO_DEPTH_ACCESS);
        let no_color_write = no_color_write_desc(caps.buggy_disable_color_write);
        cache.no_color_write = cache.create_blend_state(no_color_write);
        cache
    }

    // --- Interning ---

    /// The canonical blend state for `desc`.
    pub fn create_blend_state(&mut self, desc: BlendStateDescriptor) -> BlendStateId {
        BlendStateId(self.blend.intern(desc, DeviceBlendState::new))
    }

    /// The canonical depth state for `desc`.
    pub fn create_depth_state(&mut self, desc: DepthStateDescriptor) -> DepthStateId {
        DepthStateId(self.depth.intern(desc, DeviceDepthState::new))
    }

    /// The canonical stencil state for `desc`.
    pub fn create_stencil_state(&mut self, desc: StencilStateDescriptor) -> StencilStateId {
        StencilStateId(self.stencil.intern(desc, DeviceStencilState::new))
    }

    /// The canonical raster state for `desc`.
    pub fn create_raster_state(&mut self, desc: RasterStateDescriptor) -> RasterStateId {
        RasterStateId(self.raster.intern(desc, DeviceRasterState::new))
    }

    /// A blend state that writes no color. Drivers that ignore a zero color
    /// mask get `Zero`/`One` blending instead.
    pub fn create_blend_state_no_color_write(&self) -> BlendStateId {
        self.no_color_write
    }

    /// A depth state that neither tests nor writes.
    pub fn no_depth_access(&self) -> DepthStateId {
        self.no_depth_access
    }

    /// Looks up a blend state.
    pub fn blend_state(&self, id: BlendStateId) -> &DeviceBlendState {
        self.blend.get(id.0)
    }

    /// Looks up a depth state.
    pub fn depth_state(&self, id: DepthStateId) -> &DeviceDepthState {
        self.depth.get(id.0)
    }

    /// Looks up a stencil state.
    pub fn stencil_state(&self, id: StencilStateId) -> &DeviceStencilState {
        self.stencil.get(id.0)
    }

    /// Looks up a raster state.
    pub fn raster_state(&self, id: RasterStateId) -> &DeviceRasterState {
        self.raster.get(id.0)
    }

    /// Number of distinct blend states.
    pub fn blend_state_count(&self) -> usize {
        self.blend.len()
    }

    /// Number of distinct depth states.
    pub fn depth_state_count(&self) -> usize {
        self.depth.len()
    }

    /// Number of distinct stencil states.
    pub fn stencil_state_count(&self) -> usize {
        self.stencil.len()
    }

    /// Number of distinct raster states.
    pub fn raster_state_count(&self) -> usize {
        self.raster.len()
    }

    /// The bound blend state, if known.
    pub fn bound_blend_state(&self) -> Option<BlendStateId> {
        self.bound_blend
    }

    /// The bound depth state, if known.
    pub fn bound_depth_state(&self) -> Option<DepthStateId> {
        self.bound_depth
    }

    /// The bound stencil state and reference, if known.
    pub fn bound_stencil_state(&self) -> Option<(StencilStateId, i32)> {
        self.bound_stencil
    }

    /// The bound raster state, if known.
    pub fn bound_raster_state(&self) -> Option<RasterStateId> {
        self.bound_raster
    }

    /// Forgets every bound state. The next `set_*` of each kind applies all fields.
    pub fn invalidate(&mut self) {
        self.bound_blend = None;
        self.bound_depth = None;
        self.bound_stencil = None;
        self.bound_raster = None;
    }

    // --- Derived states ---

    /// `base` (or the bound blend state) with another color write mask.
    pub fn update_color_mask(
        &mut self,
        base: Option<BlendStateId>,
        mask: ColorWrites,
    ) -> BlendStateId {
        let id = base.or(self.bound_blend).unwrap_or(BlendStateId(0));
        let mut desc = self.blend_state(id).desc;
        if desc.write_mask == mask {
            return id;
        }
        desc.write_mask = mask;
        self.create_blend_state(desc)
    }

    /// `base` (or the bound stencil state) with another stencil write mask.
    pub fn update_stencil_mask(
        &mut self,
        base: Option<StencilStateId>,
        mask: u8,
    ) -> StencilStateId {
        let id = base
            .or(self.bound_stencil.map(|(id, _)| id))
            .unwrap_or(StencilStateId(0));
        let mut desc = self.stencil_state(id).desc;
        if desc.write_mask == mask {
            return id;
        }
        desc.write_mask = mask;
        self.create_stencil_state(desc)
    }

    /// `base` (or the bound depth state) with depth writes switched on or off.
    pub fn update_depth_test(&mut self, base: Option<DepthStateId>, write: bool) -> DepthStateId {
        let id = base.or(self.bound_depth).unwrap_or(DepthStateId(0));
        let mut desc = self.depth_state(id).desc;
        if desc.write_enabled == write {
            return id;
        }
        desc.write_enabled = write;
        self.create_depth_state(desc)
    }

    /// `base` (or the bound raster state) with extra depth bias.
    pub fn add_depth_bias(
        &mut self,
        base: Option<RasterStateId>,
        depth_bias: i32,
        slope_scaled: f32,
    ) -> RasterStateId {
        let id = base.or(self.bound_raster).unwrap_or(RasterStateId(0));
        let mut desc = self.raster_state(id).desc;
        desc.depth_bias = desc.depth_bias.saturating_add(depth_bias);
        desc.slope_scaled_depth_bias += slope_scaled;
        self.create_raster_state(desc)
    }

    /// `base` (or the bound raster state) with a forced cull mode.
    pub fn add_force_cull_mode(
        &mut self,
        base: Option<RasterStateId>,
        cull_mode: CullMode,
    ) -> RasterStateId {
        let id = base.or(self.bound_raster).unwrap_or(RasterStateId(0));
        let mut desc = self.raster_state(id).desc;
        desc.cull_mode = cull_mode;
        self.create_raster_state(desc)
    }

    // --- Application ---

    /// Binds a blend state, issuing only the calls for fields that changed.
    pub fn set_blend_state(&mut self, api: &mut GlesApi, id: BlendStateId) {
        if self.bound_blend == Some(id) {
            return;
        }
        let current = self.bound_blend.map(|bound| self.blend.get(bound.0));
        let new = self.blend.get(id.0);

        if current.map(|c| c.desc.write_mask) != Some(new.desc.write_mask) {
            api.color_mask(new.desc.write_mask);
        }

        let was_disabled = current.map(DeviceBlendState::is_blending_disabled);
        if new.is_blending_disabled() {
            if was_disabled != Some(true) {
                api.disable(EnableCaps::BLEND);
            }
        } else {
            // Func and equation are stale whenever blending was off.
            let force = was_disabled != Some(false);
            if force {
                api.enable(EnableCaps::BLEND);
            }
            if force || current.map(|c| c.factors) != Some(new.factors) {
                let [src_rgb, dst_rgb, src_alpha, dst_alpha] = new.factors;
                api.blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
            }
            if force || current.map(|c| c.equations) != Some(new.equations) {
                apply_blend_equation(api, new);
            }
        }

        let alpha_to_coverage = new.desc.alpha_to_coverage;
        if current.map(|c| c.desc.alpha_to_coverage) != Some(alpha_to_coverage) {
            api.set_enabled(EnableCaps::SAMPLE_ALPHA_TO_COVERAGE, alpha_to_coverage);
        }
        self.bound_blend = Some(id);
    }

    /// Binds a depth state. A `Disabled` compare function switches the test off.
    pub fn set_depth_state(&mut self, api: &mut GlesApi, id: DepthStateId) {
        if self.bound_depth == Some(id) {
            return;
        }
        let current = self.bound_depth.map(|bound| self.depth.get(bound.0));
        let new = self.depth.get(id.0);

        if current.map(|c| c.desc.compare) != Some(new.desc.compare) {
            if new.test_enabled() {
                if current.map(DeviceDepthState::test_enabled) != Some(true) {
                    api.enable(EnableCaps::DEPTH_TEST);
                }
                api.depth_func(new.func);
            } else {
                api.disable(EnableCaps::DEPTH_TEST);
            }
        }
        if current.map(|c| c.desc.write_enabled) != Some(new.desc.write_enabled) {
            api.depth_mask(new.desc.write_enabled);
        }
        self.bound_depth = Some(id);
    }

    /// Binds a stencil state with a reference value.
    pub fn set_stencil_state(&mut self, api: &mut GlesApi, id: StencilStateId, reference: i32) {
        if self.bound_stencil == Some((id, reference)) {
            return;
        }
        let current = self
            .bound_stencil
            .map(|(bound, reference)| (self.stencil.get(bound.0), reference));
        let new = self.stencil.get(id.0);

        if current.map(|(c, _)| c.desc.enabled) != Some(new.desc.enabled) {
            api.set_enabled(EnableCaps::STENCIL_TEST, new.desc.enabled);
        }

        let (front_changed, back_changed) = match current {
            Some((c, old_reference)) => {
                let shared = c.desc.read_mask != new.desc.read_mask || old_reference != reference;
                (
                    shared || c.front.func != new.front.func,
                    shared || c.back.func != new.back.func,
                )
            }
            None => (true, true),
        };
        let read_mask = u32::from(new.desc.read_mask);
        if front_changed {
            api.stencil_func_separate(gl::FRONT, new.front.func, reference, read_mask);
        }
        if back_changed {
            api.stencil_func_separate(gl::BACK, new.back.func, reference, read_mask);
        }

        if current.map(|(c, _)| c.front.ops) != Some(new.front.ops) {
            let [fail, depth_fail, pass] = new.front.ops;
            api.stencil_op_separate(gl::FRONT, fail, depth_fail, pass);
        }
        if current.map(|(c, _)| c.back.ops) != Some(new.back.ops) {
            let [fail, depth_fail, pass] = new.back.ops;
            api.stencil_op_separate(gl::BACK, fail, depth_fail, pass);
        }

        if current.map(|(c, _)| c.desc.write_mask) != Some(new.desc.write_mask) {
            api.stencil_mask(u32::from(new.desc.write_mask));
        }
        self.bound_stencil = Some((id, reference));
    }

    /// Binds a raster state: cull mode and polygon offset.
    pub fn set_raster_state(&mut self, api: &mut GlesApi, id: RasterStateId) {
        if self.bound_raster == Some(id) {
            return;
        }
        let current = self.bound_raster.map(|bound| self.raster.get(bound.0));
        let new = self.raster.get(id.0);

        if current.map(|c| c.desc.cull_mode) != Some(new.desc.cull_mode) {
            api.set_cull_mode(new.desc.cull_mode);
        }

        let bias_changed = match current {
            Some(c) => {
                c.desc.depth_bias != new.desc.depth_bias
                    || c.desc.slope_scaled_depth_bias != new.desc.slope_scaled_depth_bias
            }
            None => true,
        };
        if bias_changed {
            let (factor, units) = new.polygon_offset(api.caps().has_polygon_offset_bug);
            api.polygon_offset(factor, units);
            api.set_enabled(EnableCaps::POLYGON_OFFSET_FILL, new.desc.has_depth_bias());
        }
        self.bound_raster = Some(id);
    }

    /// Clears the aspects in `flags` of whatever framebuffer is bound.
    ///
    /// Color writes, depth writes and the stencil write mask are opened up
    /// first for the aspects being cleared. The bound states change to those
    /// derived states; the next regular `set_*` restores the caller's.
    pub fn clear_current_framebuffer(
        &mut self,
        api: &mut GlesApi,
        flags: ClearFlags,
        values: ClearValues,
    ) {
        if flags.contains(ClearFlags::COLOR) {
            let blend = self.update_color_mask(None, ColorWrites::ALL);
            self.set_blend_state(api, blend);
        }
        if flags.contains(ClearFlags::DEPTH) {
            let depth = self.update_depth_test(None, true);
            self.set_depth_state(api, depth);
        }
        if flags.contains(ClearFlags::STENCIL) {
            let stencil = self.update_stencil_mask(None, 0xFF);
            let reference = self.bound_stencil.map_or(0, |(_, reference)| reference);
            self.set_stencil_state(api, stencil, reference);
        }
        api.clear(flags.gl_mask(), values.color, values.depth, values.stencil);
    }
}

fn no_color_write_desc(buggy_disable_color_write: bool) -> BlendStateDescriptor {
    if buggy_disable_color_write {
        let keep_destination = BlendComponentDescriptor {
            src_factor: BlendFactor::Zero,
            dst_factor: BlendFactor::One,
            ..BlendComponentDescriptor::REPLACE
        };
        BlendStateDescriptor {
            color: keep_destination,
            alpha: keep_destination,
            ..BlendStateDescriptor::default()
        }
    } else {
        BlendStateDescriptor {
            write_mask: ColorWrites::empty(),
            ..BlendStateDescriptor::default()
        }
    }
}

fn apply_blend_equation(api: &mut GlesApi, state: &DeviceBlendState) {
    let caps = api.caps();
    let supported = !state.flags.contains(BlendFlags::UNSUPPORTED)
        && (!state.flags.contains(BlendFlags::ADVANCED) || caps.has_blend_advanced)
        && (!state.flags.contains(BlendFlags::MIN_MAX) || caps.has_blend_min_max);
    if !supported {
        log::warn!(
            "PipelineStateCache: keeping the previous equation, {:?}/{:?} is unsupported",
            state.desc.color.operation,
            state.desc.alpha.operation
        );
        return;
    }
    if state.flags.contains(BlendFlags::ADVANCED) {
        // Advanced equations only exist as a single combined equation.
        api.blend_equation_advanced(state.equations[0]);
    } else {
        api.blend_equation_separate(state.equations[0], state.equations[1]);
    }
}
