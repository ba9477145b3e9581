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

use khora_gfx_core::renderer::api::buffer::BufferUsage;
use khora_gfx_core::renderer::api::pipeline::state::BlendStateDescriptor;
use khora_gfx_core::renderer::api::target::{
    RenderSurface, RenderSurfaceId, RenderTargetSetup, SurfaceBacking,
};
use khora_gfx_core::renderer::{FramebufferError, GfxError};
use khora_gles::graphics::gles::{
    BuiltinTarget, FeatureLevel, GlCall, GlesBackend, GlesSettings, NativeContext, RecordingGl,
};

fn color_surface(id: u64) -> RenderSurface {
    RenderSurface::color(RenderSurfaceId(id), SurfaceBacking::Texture(70), 64, 64)
}

#[test]
fn test_settings_from_json_drive_the_backend() {
    // --- 1. ARRANGE ---
    let _ = env_logger::builder().is_test(true).try_init();
    let json = r#"{ "requested_level": "Es3", "debug_labels": false }"#;
    let settings = GlesSettings::from_json(json).unwrap();

    // --- 2. ACT ---
    let backend = GlesBackend::new(Box::new(RecordingGl::new()), settings).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(backend.caps().level, FeatureLevel::Es3);
    assert!(!backend.settings().debug_labels);
    assert!(
        backend.settings().state_caching,
        "missing fields keep their default"
    );
}

#[test]
fn test_unsupported_driver_fails_to_initialize() {
    let _ = env_logger::builder().is_test(true).try_init();
    let gl = RecordingGl::new().with_version("2.1 Mesa 23.0");
    assert!(GlesBackend::new(Box::new(gl), GlesSettings::default()).is_err());
}

#[test]
fn test_context_loss_abandons_every_object() {
    // --- 1. ARRANGE ---
    let _ = env_logger::builder().is_test(true).try_init();
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut backend = GlesBackend::new(Box::new(gl), GlesSettings::default()).unwrap();
    backend.register_surface(color_surface(7));
    backend.make_current(NativeContext(1)).unwrap();
    let setup = RenderTargetSetup::new(vec![RenderSurfaceId(7)], None);
    backend.get_framebuffer_name(&setup).unwrap();
    let buffer = backend.acquire_buffer(256, BufferUsage::DynamicVertex, false);
    backend.release_buffer(buffer.unwrap());
    log.clear();

    // --- 2. ACT ---
    backend.on_context_lost();

    // --- 3. ASSERT ---
    assert!(backend.contexts().current().is_none());
    assert_eq!(backend.prepare(), Err(GfxError::NoCurrentContext));
    assert_eq!(log.count(|c| matches!(c, GlCall::DeleteFramebuffer(_))), 0);
    assert_eq!(log.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 0);
}

#[test]
fn test_shutdown_deletes_owned_objects() {
    // --- 1. ARRANGE ---
    let _ = env_logger::builder().is_test(true).try_init();
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut backend = GlesBackend::new(Box::new(gl), GlesSettings::default()).unwrap();
    backend.register_surface(color_surface(7));
    backend.make_current(NativeContext(1)).unwrap();
    let setup = RenderTargetSetup::new(vec![RenderSurfaceId(7)], None);
    backend.get_framebuffer_name(&setup).unwrap();
    let buffer = backend.acquire_buffer(256, BufferUsage::StaticIndex, false);
    backend.release_buffer(buffer.unwrap());

    // --- 2. ACT ---
    backend.shutdown();

    // --- 3. ASSERT ---
    assert_eq!(log.live_framebuffer_count(), 0);
    assert_eq!(log.live_buffer_count(), 0);
}

#[test]
fn test_rejected_back_buffer_destroy_leaves_other_contexts_intact() {
    // --- 1. ARRANGE ---
    let _ = env_logger::builder().is_test(true).try_init();
    let gl = RecordingGl::new();
    let mut backend = GlesBackend::new(Box::new(gl), GlesSettings::default()).unwrap();
    backend.make_current(NativeContext(1)).unwrap();
    backend.make_current(NativeContext(2)).unwrap();
    let back_buffer = RenderSurfaceId::BACK_BUFFER_COLOR;

    // --- 2. ACT ---
    let result = backend.destroy_render_surface(back_buffer);
    backend.make_current(NativeContext(1)).unwrap();

    // --- 3. ASSERT ---
    let rejected = FramebufferError::DefaultSurfaceRelease {
        surface: back_buffer,
    };
    assert_eq!(result, Err(GfxError::Framebuffer(rejected)));
    let framebuffers = backend.framebuffers().unwrap();
    assert!(framebuffers.surface(back_buffer).is_some());
    assert_eq!(framebuffers.queued_invalidations(), 0);
    assert_eq!(framebuffers.len(), 1, "window framebuffer stays memoized");
    let activated = backend.activate_builtin(BuiltinTarget::Default, false);
    assert_eq!(activated, Ok(()));
}

#[test]
fn test_destroy_without_current_context_keeps_the_surface() {
    // --- 1. ARRANGE ---
    let _ = env_logger::builder().is_test(true).try_init();
    let gl = RecordingGl::new();
    let mut backend = GlesBackend::new(Box::new(gl), GlesSettings::default()).unwrap();
    backend.make_current(NativeContext(1)).unwrap();
    backend.on_context_lost();
    backend.register_surface(color_surface(7));

    // --- 2. ACT ---
    let result = backend.destroy_render_surface(RenderSurfaceId(7));

    // --- 3. ASSERT ---
    assert_eq!(result, Err(GfxError::NoCurrentContext));
    backend.make_current(NativeContext(1)).unwrap();
    let framebuffers = backend.framebuffers().unwrap();
    assert_eq!(framebuffers.queued_invalidations(), 0);
    assert!(framebuffers.surface(RenderSurfaceId(7)).is_some());
    backend.make_current(NativeContext(2)).unwrap();
    let framebuffers = backend.framebuffers().unwrap();
    assert!(framebuffers.surface(RenderSurfaceId(7)).is_some());
}

#[test]
fn test_context_switch_reapplies_pipeline_state() {
    // --- 1. ARRANGE ---
    let _ = env_logger::builder().is_test(true).try_init();
    let gl = RecordingGl::new();
    let log = gl.log();
    let mut backend = GlesBackend::new(Box::new(gl), GlesSettings::default()).unwrap();
    backend.make_current(NativeContext(1)).unwrap();
    let blend = backend.create_blend_state(BlendStateDescriptor::default());
    backend.set_blend_state(blend);
    log.clear();

    // --- 2. ACT ---
    backend.set_blend_state(blend);
    let cached = log.len();
    backend.make_current(NativeContext(1)).unwrap();
    log.clear();
    backend.set_blend_state(blend);

    // --- 3. ASSERT ---
    assert_eq!(cached, 0, "an unchanged state issues no calls");
    assert!(!log.is_empty(), "switching contexts drops the cached state");
}
