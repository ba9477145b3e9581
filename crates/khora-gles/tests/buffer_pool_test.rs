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

use khora_gfx_core::renderer::BufferUsage;
use khora_gles::graphics::gles::{CallLog, GlCall, GlesBackend, GlesSettings, RecordingGl};

fn backend_with(gl: RecordingGl) -> (GlesBackend, CallLog) {
    let _ = env_logger::builder().is_test(true).try_init();
    let log = gl.log();
    let settings = GlesSettings::default();
    let backend = GlesBackend::new(Box::new(gl), settings).expect("backend should initialize");
    log.clear();
    (backend, log)
}

fn gen_buffer_calls(log: &CallLog) -> usize {
    log.count(|c| matches!(c, GlCall::GenBuffer(_)))
}

#[test]
fn test_released_idle_buffer_is_reused() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicVertex;
    let mut buffer = backend.acquire_buffer(1000, usage, false).unwrap();
    backend.upload_buffer(&mut buffer, 0, &[7u8; 1000]).unwrap();
    let name = buffer.name();

    // --- 2. ACT ---
    // No draw read the buffer, so the GPU cannot be using it.
    backend.release_buffer(buffer);
    let again = backend.acquire_buffer(1000, usage, false).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(again.name(), name, "idle buffer should be reused");
    assert_eq!(gen_buffer_calls(&log), 1, "no second native buffer");
    backend.release_buffer(again);
    backend.shutdown();
}

#[test]
fn test_buffer_in_flight_is_not_reused() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicVertex;
    let mut buffer = backend.acquire_buffer(1000, usage, false).unwrap();
    let name = buffer.name();
    backend.record_buffer_render(&mut buffer);

    // --- 2. ACT ---
    backend.release_buffer(buffer);
    let fresh = backend.acquire_buffer(1000, usage, false).unwrap();

    // --- 3. ASSERT ---
    assert_ne!(fresh.name(), name, "buffer read this frame was recycled");
    assert_eq!(gen_buffer_calls(&log), 2);
    assert_eq!(backend.buffers().pending_count(), 1);
    backend.release_buffer(fresh);
    backend.shutdown();
}

#[test]
fn test_pending_buffer_becomes_free_once_its_fence_signals() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new().with_manual_fences());
    let usage = BufferUsage::DynamicIndex;
    let mut buffer = backend.acquire_buffer(512, usage, false).unwrap();
    backend.record_buffer_render(&mut buffer);
    backend.release_buffer(buffer);

    // --- 2. ACT ---
    backend.advance_frame().unwrap();
    backend.advance_frame().unwrap();
    let still_pending = backend.buffers().pending_count();
    log.signal_all_fences();
    backend.advance_frame().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(still_pending, 1, "unsignaled fences keep it pending");
    assert_eq!(backend.buffers().pending_count(), 0);
    assert_eq!(backend.buffers().free_count(), 1);
    backend.shutdown();
}

#[test]
fn test_idle_buffers_are_pruned_after_59_frames() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicVertex;
    let mut buffer = backend.acquire_buffer(1000, usage, false).unwrap();
    backend.record_buffer_render(&mut buffer);
    let name = buffer.name();
    backend.release_buffer(buffer);
    let rendered_at = backend.buffers().frame_index();

    // --- 2. ACT ---
    // Advance to the last pruning pass before the buffer reaches the threshold.
    while backend.buffers().frame_index() < rendered_at + 56 {
        backend.advance_frame().unwrap();
    }
    let survived = !log.contains(&GlCall::DeleteBuffer(name));
    while backend.buffers().frame_index() < rendered_at + 70 {
        backend.advance_frame().unwrap();
    }

    // --- 3. ASSERT ---
    assert!(survived, "idle for fewer than 59 frames");
    assert!(log.contains(&GlCall::DeleteBuffer(name)));
    assert_eq!(backend.buffers().free_count(), 0);
    backend.shutdown();
}

#[test]
fn test_recently_used_buffer_is_never_pruned() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicVertex;

    // --- 2. ACT ---
    // Use the buffer every five frames for 200 frames: 20 pruning passes.
    for frame in 0..200 {
        if frame % 5 == 0 {
            let mut buffer = backend.acquire_buffer(1000, usage, false).unwrap();
            backend.record_buffer_render(&mut buffer);
            backend.release_buffer(buffer);
        }
        backend.advance_frame().unwrap();
    }

    // --- 3. ASSERT ---
    assert_eq!(log.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 0);
    assert_eq!(gen_buffer_calls(&log), 1, "one buffer serves every request");
    backend.shutdown();
}

#[test]
fn test_large_buffers_are_pruned_sooner() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::StaticVertex;
    let buffer = backend.acquire_buffer(4_000_000, usage, false).unwrap();
    let name = buffer.name();
    backend.release_buffer(buffer);

    // --- 2. ACT ---
    // Render age starts at the initial frame index, so the first pass sees 10 idle frames.
    for _ in 0..10 {
        backend.advance_frame().unwrap();
    }

    // --- 3. ASSERT ---
    assert!(log.contains(&GlCall::DeleteBuffer(name)));
    backend.shutdown();
}

#[test]
fn test_reused_capacity_stays_within_ratio() {
    // --- 1. ARRANGE ---
    let (mut backend, _log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicUniform;
    let capacities = [1000usize, 1400, 1600, 3000];
    let buffers: Vec<_> = capacities
        .iter()
        .map(|&size| backend.acquire_buffer(size, usage, false).unwrap())
        .collect();
    for buffer in buffers {
        backend.release_buffer(buffer);
    }

    // --- 2. ACT ---
    let first = backend.acquire_buffer(1000, usage, false).unwrap();
    let second = backend.acquire_buffer(1000, usage, false).unwrap();
    let third = backend.acquire_buffer(1000, usage, false).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(first.capacity(), 1000);
    assert_eq!(second.capacity(), 1400);
    assert_eq!(third.capacity(), 1000, "1600 is outside the window");
    for buffer in [&first, &second, &third] {
        assert!(buffer.capacity() >= 1000 && (buffer.capacity() as f64) < 1500.0);
    }
    assert_eq!(backend.buffers().free_count(), 2);
    for buffer in [first, second, third] {
        backend.release_buffer(buffer);
    }
    backend.shutdown();
}

#[test]
fn test_usage_classes_do_not_share_buffers() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicVertex;
    let vertex = backend.acquire_buffer(256, usage, false).unwrap();
    backend.release_buffer(vertex);

    // --- 2. ACT ---
    let usage = BufferUsage::DynamicIndex;
    let index = backend.acquire_buffer(256, usage, false).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(gen_buffer_calls(&log), 2);
    backend.release_buffer(index);
    backend.shutdown();
}

#[test]
fn test_completion_frontier_is_monotonic() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new().with_manual_fences());
    let mut frontier = backend.buffers().last_completed_frame_index();
    let mut inserted = 0;

    // --- 2. ACT / 3. ASSERT ---
    for frame in 0..30 {
        backend.advance_frame().unwrap();
        inserted += 1;
        if frame % 4 == 3 {
            log.signal_oldest_fences(3);
        }
        let completed = backend.buffers().last_completed_frame_index();
        assert!(completed >= frontier, "completion frontier went back");
        assert!(completed < backend.buffers().frame_index());
        frontier = completed;
    }
    assert_eq!(log.count(|c| matches!(c, GlCall::FenceSync(_))), inserted);
    assert!(backend.buffers().outstanding_fences() > 0);
    assert_eq!(
        backend.buffers().outstanding_fences(),
        log.live_fence_count(),
        "every retired fence should be deleted"
    );
    backend.shutdown();
}

#[test]
fn test_context_loss_abandons_buffers_without_deleting() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::StaticIndex;
    for size in [128, 256, 512] {
        let buffer = backend.acquire_buffer(size, usage, false).unwrap();
        backend.release_buffer(buffer);
    }
    backend.advance_frame().unwrap();

    // --- 2. ACT ---
    backend.on_context_lost();

    // --- 3. ASSERT ---
    assert_eq!(backend.buffers().free_count(), 0);
    assert_eq!(backend.buffers().outstanding_fences(), 0);
    assert_eq!(log.count(|c| matches!(c, GlCall::DeleteBuffer(_))), 0);
    assert_eq!(log.count(|c| matches!(c, GlCall::DeleteSync(_))), 0);
}

#[test]
fn test_acquire_with_clear_zeroes_contents() {
    // --- 1. ARRANGE ---
    let (mut backend, log) = backend_with(RecordingGl::new());
    let usage = BufferUsage::DynamicStorage;
    let mut buffer = backend.acquire_buffer(64, usage, false).unwrap();
    backend.upload_buffer(&mut buffer, 0, &[0xAB; 64]).unwrap();
    backend.release_buffer(buffer);

    // --- 2. ACT ---
    let cleared = backend.acquire_buffer(64, usage, true).unwrap();

    // --- 3. ASSERT ---
    assert_eq!(log.buffer_contents(cleared.name()), Some(vec![0u8; 64]));
    backend.release_buffer(cleared);
    backend.shutdown();
}
