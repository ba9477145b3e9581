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

use super::FrameClock;
use crate::graphics::gles::api::GlesApi;
use crate::graphics::gles::gl::{GLenum, GLuint};
use crate::graphics::gles::translate::BufferTarget;
use khora_gfx_core::renderer::{BufferError, BufferUsage, MapAccess};
use std::ptr::NonNull;

/// Identifies a buffer issued by a [`BufferManager`](super::BufferManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferTicket(pub(super) u64);

/// One native buffer object and its frame bookkeeping.
///
/// A `DataBuffer` is owned either by the manager's pool or by the caller that
/// acquired it. Storage is allocated lazily by
/// the first upload, map or copy.
#[derive(Debug)]
pub struct DataBuffer {
    ticket: BufferTicket,
    name: GLuint,
    capacity: usize,
    usage: BufferUsage,
    target: BufferTarget,
    usage_hint: GLenum,
    storage_allocated: bool,
    mapped: Option<MapAccess>,
    last_recreated: u32,
    last_updated: u32,
    last_rendered: u32,
}

impl DataBuffer {
    pub(super) fn new(
        api: &mut GlesApi,
        ticket: BufferTicket,
        capacity: usize,
        usage: BufferUsage,
    ) -> Result<Self, BufferError> {
        let name = api.gen_buffer()?;
        Ok(Self {
            ticket,
            name,
            capacity,
            usage,
            target: api.translate().upload_target(usage),
            usage_hint: api.translate().usage_hint(usage),
            storage_allocated: false,
            mapped: None,
            last_recreated: 0,
            last_updated: 0,
            last_rendered: 0,
        })
    }

    /// The ticket the manager issued this buffer under.
    pub fn ticket(&self) -> BufferTicket {
        self.ticket
    }

    /// Native buffer name; `0` once abandoned.
    pub fn name(&self) -> GLuint {
        self.name
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Usage class.
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Binding point used for uploads.
    pub fn upload_target(&self) -> BufferTarget {
        self.target
    }

    /// Whether native storage has been allocated.
    pub fn is_storage_allocated(&self) -> bool {
        self.storage_allocated
    }

    /// Whether the buffer is currently mapped.
    pub fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    /// Frame the buffer was last drawn from.
    pub fn last_rendered_frame(&self) -> u32 {
        self.last_rendered
    }

    fn check_range(&self, offset: usize, size: usize) -> Result<(), BufferError> {
        match offset.checked_add(size) {
            Some(end) if end <= self.capacity => Ok(()),
            _ => Err(BufferError::OutOfBounds {
                offset,
                size,
                capacity: self.capacity,
            }),
        }
    }

    /// Writes `data` at `offset`.
    ///
    /// A whole-buffer upload into unallocated storage allocates and fills in a
    /// single call.
    pub fn upload(
        &mut self,
        api: &mut GlesApi,
        clock: FrameClock,
        offset: usize,
        data: &[u8],
    ) -> Result<(), BufferError> {
        self.check_range(offset, data.len())?;
        if !self.storage_allocated {
            if offset == 0 && data.len() == self.capacity {
                self.recreate_with_data(api, clock, self.capacity, Some(data));
                return Ok(());
            }
            self.recreate_storage(api, clock, self.capacity);
        }
        if !data.is_empty() {
            api.buffer_sub_data(self.target, self.name, offset, data);
        }
        self.record_update(clock);
        Ok(())
    }

    /// Reallocates the storage with `size` bytes of undefined content.
    pub fn recreate_storage(&mut self, api: &mut GlesApi, clock: FrameClock, size: usize) {
        self.recreate_with_data(api, clock, size, None);
    }

    /// Allocates storage if there is none or it holds fewer than `size` bytes.
    pub fn ensure_storage(&mut self, api: &mut GlesApi, clock: FrameClock, size: usize) {
        if !self.storage_allocated || self.capacity < size {
            self.recreate_storage(api, clock, size);
        }
    }

    fn recreate_with_data(
        &mut self,
        api: &mut GlesApi,
        clock: FrameClock,
        size: usize,
        data: Option<&[u8]>,
    ) {
        if self.update_causes_stall(clock) {
            log::debug!(
                "DataBuffer: buffer {} recreated with render age {}",
                self.name,
                self.render_age(clock)
            );
        }
        api.buffer_data(self.target, self.name, size, data, self.usage_hint);
        self.capacity = size;
        self.last_recreated = clock.frame_index;
        self.storage_allocated = true;
    }

    /// Maps `size` bytes at `offset`. Read-only maps do not count as updates.
    pub fn map(
        &mut self,
        api: &mut GlesApi,
        clock: FrameClock,
        offset: usize,
        size: usize,
        access: MapAccess,
    ) -> Result<NonNull<u8>, BufferError> {
        if self.mapped.is_some() {
            return Err(BufferError::AlreadyMapped);
        }
        self.check_range(offset, size)?;
        if !self.storage_allocated {
            self.recreate_storage(api, clock, self.capacity);
        }
        let pointer = api.map_buffer_range(self.target, self.name, offset, size, access)?;
        self.mapped = Some(access);
        Ok(pointer)
    }

    /// Flushes a written range of an explicitly flushed mapping.
    pub fn flush_mapped_range(
        &mut self,
        api: &mut GlesApi,
        offset: usize,
        size: usize,
    ) -> Result<(), BufferError> {
        if self.mapped.is_none() {
            return Err(BufferError::NotMapped);
        }
        self.check_range(offset, size)?;
        api.flush_mapped_buffer_range(self.target, self.name, offset, size);
        Ok(())
    }

    /// Unmaps the buffer. Returns `false` if the driver reports lost contents.
    pub fn unmap(&mut self, api: &mut GlesApi, clock: FrameClock) -> Result<bool, BufferError> {
        let access = self.mapped.take().ok_or(BufferError::NotMapped)?;
        let intact = api.unmap_buffer(self.target, self.name);
        if !access.is_read_only() {
            self.record_update(clock);
        }
        Ok(intact)
    }

    /// Copies `size` bytes from `source` at `source_offset` into this buffer at `offset`.
    pub fn copy_sub_data(
        &mut self,
        api: &mut GlesApi,
        clock: FrameClock,
        source: &DataBuffer,
        source_offset: usize,
        offset: usize,
        size: usize,
    ) -> Result<(), BufferError> {
        source.check_range(source_offset, size)?;
        self.check_range(offset, size)?;
        self.ensure_storage(api, clock, self.capacity);
        api.copy_buffer_sub_data(source.name, self.name, source_offset, offset, size)?;
        self.record_update(clock);
        Ok(())
    }

    /// Zero-fills the whole buffer, allocating storage first if needed.
    pub fn clear(&mut self, api: &mut GlesApi, clock: FrameClock) {
        self.ensure_storage(api, clock, self.capacity);
        api.clear_buffer_sub_data(self.target, self.name, 0, self.capacity);
        self.record_update(clock);
    }

    fn record_update(&mut self, clock: FrameClock) {
        if self.update_causes_stall(clock) {
            log::debug!(
                "DataBuffer: buffer {} updated with render age {}",
                self.name,
                self.render_age(clock)
            );
        }
        self.last_updated = clock.frame_index;
    }

    /// Marks the buffer as read by a draw submitted this frame.
    pub fn record_render(&mut self, clock: FrameClock) {
        self.last_rendered = clock.frame_index;
    }

    /// Frames since the storage was last recreated.
    pub fn recreate_age(&self, clock: FrameClock) -> u32 {
        clock.frame_index.wrapping_sub(self.last_recreated)
    }

    /// Frames since the contents were last written.
    pub fn update_age(&self, clock: FrameClock) -> u32 {
        clock.frame_index.wrapping_sub(self.last_updated)
    }

    /// Frames since the buffer was last drawn from.
    pub fn render_age(&self, clock: FrameClock) -> u32 {
        clock.frame_index.wrapping_sub(self.last_rendered)
    }

    /// Returns `true` if the GPU may still be reading the buffer.
    pub fn update_causes_stall(&self, clock: FrameClock) -> bool {
        clock.is_in_flight(self.last_rendered)
    }

    /// Deletes the native buffer.
    pub(super) fn delete(self, api: &mut GlesApi) {
        api.delete_buffer(self.name);
    }

    /// Forgets the native name without deleting it; its context is gone.
    pub(super) fn abandon(self) {
        log::trace!("DataBuffer: abandoning buffer {}", self.name);
    }
}
