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

//! Tuning settings for backend resource pooling.

use super::BUFFER_UPDATE_MIN_AGE;
use serde::{Deserialize, Serialize};

/// Tuning of the pooled buffer manager.
///
/// The defaults keep a small idle buffer alive for 59 unused frames and let a
/// buffer of `large_buffer_size` bytes or more go after as few as
/// `large_buffer_min_frames` frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferPoolConfig {
    /// A reused buffer must satisfy `capacity < requested * reuse_size_ratio`.
    pub reuse_size_ratio: f64,
    /// Idle buffers whose deletion weight reaches this value are deleted.
    pub delete_threshold: f32,
    /// Lifetime floor, in frames, of the largest buffers.
    pub large_buffer_min_frames: f32,
    /// Size in bytes from which a buffer receives the full size weight.
    pub large_buffer_size: u32,
    /// Idle buffers are pruned once every this many frames.
    pub prune_interval: u32,
    /// Initial frame index, and frame delay used when fences are unavailable.
    pub min_update_age: u32,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            reuse_size_ratio: 1.5,
            delete_threshold: 59.0,
            large_buffer_min_frames: 9.0,
            large_buffer_size: 300_000,
            prune_interval: 10,
            min_update_age: BUFFER_UPDATE_MIN_AGE,
        }
    }
}

impl BufferPoolConfig {
    /// The largest contribution the buffer size can make to its deletion weight.
    pub fn max_size_weight(&self) -> f32 {
        self.delete_threshold - self.large_buffer_min_frames
    }

    /// Weight contributed by each byte of a buffer.
    pub fn weight_per_byte(&self) -> f32 {
        self.max_size_weight() / self.large_buffer_size as f32
    }

    /// Deletion weight of an idle buffer: its render age plus a size term
    /// capped at [`max_size_weight`](Self::max_size_weight).
    pub fn delete_weight(&self, render_age: u32, size: usize) -> f32 {
        render_age as f32 + (size as f32 * self.weight_per_byte()).min(self.max_size_weight())
    }

    /// Returns `true` if a free buffer of `capacity` bytes may serve a request of `size` bytes.
    pub fn accepts_for_reuse(&self, capacity: usize, size: usize) -> bool {
        capacity >= size && (capacity as f64) < size as f64 * self.reuse_size_ratio
    }

    /// Parses a configuration from JSON. Missing fields keep their default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_weights() {
        let config = BufferPoolConfig::default();
        assert_relative_eq!(config.max_size_weight(), 50.0);
        assert_relative_eq!(config.delete_weight(10, 0), 10.0);
        // A large buffer is capped at the maximum size weight.
        assert_relative_eq!(config.delete_weight(9, 10_000_000), 59.0);
        assert_relative_eq!(config.delete_weight(0, 150_000), 25.0, epsilon = 1e-3);
    }

    #[test]
    fn reuse_window_is_half_open() {
        let config = BufferPoolConfig::default();
        assert!(config.accepts_for_reuse(1000, 1000));
        assert!(config.accepts_for_reuse(1499, 1000));
        assert!(!config.accepts_for_reuse(1500, 1000));
        assert!(!config.accepts_for_reuse(999, 1000));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = BufferPoolConfig::from_json(r#"{ "prune_interval": 5 }"#).unwrap();
        assert_eq!(config.prune_interval, 5);
        assert_eq!(config.min_update_age, BUFFER_UPDATE_MIN_AGE);
        assert_relative_eq!(config.reuse_size_ratio, 1.5);
    }
}
