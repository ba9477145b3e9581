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

use super::{BufferTicket, DataBuffer};
use crate::graphics::gles::api::GlesApi;
use crate::graphics::gles::dispatch::FenceEntry;
use crate::graphics::gles::gl::GLsync;
use khora_gfx_core::renderer::{BufferError, BufferPoolConfig, BufferUsage, DriverError};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// A snapshot of the manager's frame counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClock {
    /// Index of the frame being recorded.
    pub frame_index: u32,
    /// Newest frame the GPU is known to have finished.
    pub last_completed: u32,
}

impl FrameClock {
    /// Returns `true` if work recorded in `frame` may still be executing.
    ///
    /// A frame ahead of the current index can only come from counter wrap and
    /// is treated as complete.
    pub fn is_in_flight(self, frame: u32) -> bool {
        if frame > self.frame_index {
            return false;
        }
        self.last_completed < frame
    }
}

#[derive(Debug)]
struct SyncFence {
    sync: GLsync,
    frame_index: u32,
}

/// Free buffers of one usage class, keyed by capacity.
type SizeBuckets = BTreeMap<usize, Vec<DataBuffer>>;

/// Pools native buffers across frames.
///
/// Every buffer is in exactly one place: a free bucket, the pending list
/// (released while the GPU may still read it) or the caller's hands.
pub struct BufferManager {
    config: BufferPoolConfig,
    frame_index: u32,
    last_completed: u32,
    free: Vec<SizeBuckets>,
    pending: Vec<DataBuffer>,
    fences: VecDeque<SyncFence>,
    checked_out: HashSet<BufferTicket>,
    next_ticket: u64,
}

impl BufferManager {
    /// Creates an empty manager.
    pub fn new(config: BufferPoolConfig) -> Self {
        Self {
            frame_index: config.min_update_age,
            last_completed: 0,
            free: (0..BufferUsage::COUNT).map(|_| SizeBuckets::new()).collect(),
            pending: Vec::new(),
            fences: VecDeque::new(),
            checked_out: HashSet::new(),
            next_ticket: 1,
            config,
        }
    }

    /// The pool tuning.
    pub fn config(&self) -> &BufferPoolConfig {
        &self.config
    }

    /// The current frame counters.
    pub fn clock(&self) -> FrameClock {
        FrameClock {
            frame_index: self.frame_index,
            last_completed: self.last_completed,
        }
    }

    /// Index of the frame being recorded.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Newest frame the GPU is known to have finished.
    pub fn last_completed_frame_index(&self) -> u32 {
        self.last_completed
    }

    /// Hands out a buffer of at least `size` bytes.
    ///
    /// The smallest free buffer of the class whose capacity lies within the
    /// reuse window is taken; otherwise a new native buffer is created. With
    /// `clear` the contents are zeroed.
    pub fn acquire_buffer(
        &mut self,
        api: &mut GlesApi,
        size: usize,
        usage: BufferUsage,
        clear: bool,
    ) -> Result<DataBuffer, BufferError> {
        let clock = self.clock();
        let buckets = &mut self.free[usage.index()];
        let reusable = buckets
            .range(size..)
            .next()
            .map(|(&capacity, _)| capacity)
            .filter(|&capacity| self.config.accepts_for_reuse(capacity, size));

        let mut buffer = match reusable.and_then(|capacity| take_from_bucket(buckets, capacity)) {
            Some(buffer) => {
                debug_assert!(
                    !buffer.update_causes_stall(clock),
                    "free buffer still in flight"
                );
                log::trace!(
                    "BufferManager: reusing buffer {} ({} bytes) for {} bytes of {:?}",
                    buffer.name(),
                    buffer.capacity(),
                    size,
                    usage
                );
                buffer
            }
            None => {
                let ticket = BufferTicket(self.next_ticket);
                self.next_ticket += 1;
                log::trace!(
                    "BufferManager: no free {:?} buffer for {} bytes, creating one",
                    usage,
                    size
                );
                let mut buffer = DataBuffer::new(api, ticket, size, usage)?;
                if clear {
                    buffer.recreate_storage(api, clock, size);
                }
                buffer
            }
        };

        if clear {
            buffer.clear(api, clock);
        }
        self.checked_out.insert(buffer.ticket());
        Ok(buffer)
    }

    /// Takes a buffer back.
    ///
    /// It becomes free at once if the GPU is done with it, pending otherwise.
    pub fn release_buffer(&mut self, buffer: DataBuffer) {
        if !self.checked_out.remove(&buffer.ticket()) {
            debug_assert!(
                false,
                "buffer {:?} released twice or not issued by this manager",
                buffer.ticket()
            );
            log::error!(
                "BufferManager: ignoring release of buffer {} not checked out from this manager",
                buffer.name()
            );
            return;
        }
        if buffer.is_mapped() {
            log::error!(
                "BufferManager: buffer {} released while mapped",
                buffer.name()
            );
        }
        if buffer.update_causes_stall(self.clock()) {
            self.pending.push(buffer);
        } else {
            self.insert_free(buffer);
        }
    }

    /// Closes the current frame.
    ///
    /// Signalled fences are retired oldest first, a fence is inserted for the
    /// frame just recorded, pending buffers the GPU has finished with become
    /// free and every `prune_interval` frames old free buffers are deleted.
    pub fn advance_frame(&mut self, api: &mut GlesApi) -> Result<(), DriverError> {
        let mut result = Ok(());
        match api.entry_points().fence {
            FenceEntry::FenceSync => {
                while let Some(oldest) = self.fences.front() {
                    if !api.is_fence_signaled(oldest.sync) {
                        break;
                    }
                    self.last_completed = oldest.frame_index;
                    api.delete_sync(oldest.sync);
                    self.fences.pop_front();
                }
                match api.fence_sync() {
                    Ok(Some(sync)) => {
                        let frame_index = self.frame_index;
                        self.fences.push_back(SyncFence { sync, frame_index });
                    }
                    Ok(None) => self.last_completed = self.last_completed.wrapping_add(1),
                    Err(err) => {
                        log::warn!(
                            "BufferManager: failed to insert fence for frame {}",
                            self.frame_index
                        );
                        result = Err(err);
                    }
                }
            }
            FenceEntry::FrameDelay => self.last_completed = self.last_completed.wrapping_add(1),
        }

        self.frame_index = self.frame_index.wrapping_add(1);
        self.update_free_from_pending();

        if self.config.prune_interval != 0 && self.frame_index % self.config.prune_interval == 0 {
            self.prune_free_buffers(api);
        }
        result
    }

    fn update_free_from_pending(&mut self) {
        let clock = self.clock();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].update_causes_stall(clock) {
                index += 1;
            } else {
                let buffer = self.pending.swap_remove(index);
                self.insert_free(buffer);
            }
        }
    }

    fn insert_free(&mut self, buffer: DataBuffer) {
        self.free[buffer.usage().index()]
            .entry(buffer.capacity())
            .or_default()
            .push(buffer);
    }

    /// Deletion weight of `buffer` at the current frame.
    pub fn delete_weight(&self, buffer: &DataBuffer) -> f32 {
        let age = buffer.render_age(self.clock());
        self.config.delete_weight(age, buffer.capacity())
    }

    /// Deletes free buffers whose weight reached the threshold and that the
    /// GPU is done with. Pending buffers are left alone.
    pub fn prune_free_buffers(&mut self, api: &mut GlesApi) {
        let clock = self.clock();
        let config = &self.config;
        let mut deleted = 0usize;
        let mut freed_bytes = 0usize;

        for buckets in &mut self.free {
            for bucket in buckets.values_mut() {
                let mut index = 0;
                while index < bucket.len() {
                    let buffer = &bucket[index];
                    let weight = config.delete_weight(buffer.render_age(clock), buffer.capacity());
                    if weight >= config.delete_threshold && !buffer.update_causes_stall(clock) {
                        let buffer = bucket.swap_remove(index);
                        freed_bytes += buffer.capacity();
                        deleted += 1;
                        buffer.delete(api);
                    } else {
                        index += 1;
                    }
                }
            }
            buckets.retain(|_, bucket| !bucket.is_empty());
        }

        if deleted > 0 {
            log::debug!(
                "BufferManager: pruned {} buffers ({} bytes)",
                deleted,
                freed_bytes
            );
        }
    }

    /// Forgets every pooled buffer without deleting it. Used after context loss.
    pub fn invalidate_all(&mut self) {
        let count = self.pending_count() + self.free_count();
        for buffer in self.drain_pooled() {
            buffer.abandon();
        }
        self.fences.clear();
        log::debug!("BufferManager: abandoned {} pooled buffers", count);
    }

    /// Deletes every pooled buffer and outstanding fence.
    pub fn clear(&mut self, api: &mut GlesApi) {
        for buffer in self.drain_pooled() {
            buffer.delete(api);
        }
        for fence in self.fences.drain(..) {
            api.delete_sync(fence.sync);
        }
    }

    fn drain_pooled(&mut self) -> Vec<DataBuffer> {
        let mut drained: Vec<DataBuffer> = self.pending.drain(..).collect();
        for buckets in &mut self.free {
            drained.extend(std::mem::take(buckets).into_values().flatten());
        }
        drained
    }

    /// Bytes held by free and pending buffers.
    pub fn total_free_size(&self) -> usize {
        let pending: usize = self.pending.iter().map(DataBuffer::capacity).sum();
        let free: usize = self
            .free
            .iter()
            .flat_map(|buckets| buckets.values().flatten())
            .map(DataBuffer::capacity)
            .sum();
        pending + free
    }

    /// Buffers waiting for the GPU before they can be reused.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Buffers ready for reuse.
    pub fn free_count(&self) -> usize {
        self.free
            .iter()
            .flat_map(|buckets| buckets.values())
            .map(Vec::len)
            .sum()
    }

    /// Buffers currently held by callers.
    pub fn checked_out_count(&self) -> usize {
        self.checked_out.len()
    }

    /// Fences not yet retired.
    pub fn outstanding_fences(&self) -> usize {
        self.fences.len()
    }
}

fn take_from_bucket(buckets: &mut SizeBuckets, capacity: usize) -> Option<DataBuffer> {
    let bucket = buckets.get_mut(&capacity)?;
    let buffer = bucket.pop();
    if bucket.is_empty() {
        buckets.remove(&capacity);
    }
    buffer
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        let pooled = self.pending_count() + self.free_count();
        if pooled > 0 {
            log::warn!(
                "BufferManager: dropped with {} pooled buffers still alive",
                pooled
            );
        }
    }
}

impl std::fmt::Debug for BufferManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferManager")
            .field("frame_index", &self.frame_index)
            .field("last_completed", &self.last_completed)
            .field("free", &self.free_count())
            .field("pending", &self.pending_count())
            .field("checked_out", &self.checked_out.len())
            .field("fences", &self.fences.len())
            .finish()
    }
}
