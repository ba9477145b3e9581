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

//! Defines data structures related to pooled GPU buffer resources.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// The usage class of a pooled GPU buffer.
///
/// A buffer keeps its class for its whole life; the buffer manager pools idle
/// buffers per class so that a vertex buffer is never recycled as a uniform
/// buffer. The class also decides the usage hint handed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BufferUsage {
    /// Vertex data written once and drawn many times.
    StaticVertex,
    /// Vertex data rewritten every few frames.
    DynamicVertex,
    /// Vertex data streamed through a ring buffer.
    CircularVertex,
    /// Destination of transform feedback.
    TransformFeedbackDestination,
    /// Index data written once and drawn many times.
    StaticIndex,
    /// Index data rewritten every few frames.
    DynamicIndex,
    /// Index data streamed through a ring buffer.
    CircularIndex,
    /// Constant uniform block data.
    StaticUniform,
    /// Uniform block data updated per frame.
    DynamicUniform,
    /// Shader storage buffer.
    DynamicStorage,
    /// Atomic counter buffer.
    DynamicAtomicCounter,
}

impl BufferUsage {
    /// The number of usage classes.
    pub const COUNT: usize = 11;

    /// Every usage class, in declaration order.
    pub const ALL: [BufferUsage; Self::COUNT] = [
        BufferUsage::StaticVertex,
        BufferUsage::DynamicVertex,
        BufferUsage::CircularVertex,
        BufferUsage::TransformFeedbackDestination,
        BufferUsage::StaticIndex,
        BufferUsage::DynamicIndex,
        BufferUsage::CircularIndex,
        BufferUsage::StaticUniform,
        BufferUsage::DynamicUniform,
        BufferUsage::DynamicStorage,
        BufferUsage::DynamicAtomicCounter,
    ];

    /// Returns a dense index in `0..COUNT`, suitable for per-class tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for the three vertex classes.
    pub fn is_vertex(self) -> bool {
        matches!(
            self,
            BufferUsage::StaticVertex | BufferUsage::DynamicVertex | BufferUsage::CircularVertex
        )
    }

    /// Returns `true` for the three index classes.
    pub fn is_index(self) -> bool {
        matches!(
            self,
            BufferUsage::StaticIndex | BufferUsage::DynamicIndex | BufferUsage::CircularIndex
        )
    }

    /// Returns `true` for classes whose contents are expected to stay constant.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            BufferUsage::StaticVertex | BufferUsage::StaticIndex | BufferUsage::StaticUniform
        )
    }

    /// Returns `true` for ring-buffer classes.
    pub fn is_circular(self) -> bool {
        matches!(self, Self::CircularVertex | Self::CircularIndex)
    }
}

bitflags! {
    /// Access flags used when mapping a range of a buffer into CPU memory.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MapAccess: u32 {
        /// The mapped range will be read.
        const READ = 1 << 0;
        /// The mapped range will be written.
        const WRITE = 1 << 1;
        /// Previous contents of the range may be discarded.
        const INVALIDATE_RANGE = 1 << 2;
        /// Previous contents of the whole buffer may be discarded.
        const INVALIDATE_BUFFER = 1 << 3;
        /// Writes are made visible through explicit flushes.
        const FLUSH_EXPLICIT = 1 << 4;
        /// The driver must not synchronize with pending GPU work.
        const UNSYNCHRONIZED = 1 << 5;
    }
}

impl MapAccess {
    /// A read mapping without write access does not count as an update.
    pub fn is_read_only(self) -> bool {
        self.contains(MapAccess::READ) && !self.contains(MapAccess::WRITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_indices_are_dense() {
        for (i, usage) in BufferUsage::ALL.iter().enumerate() {
            assert_eq!(usage.index(), i);
        }
    }

    #[test]
    fn usage_groups() {
        assert!(BufferUsage::CircularVertex.is_vertex());
        assert!(BufferUsage::CircularVertex.is_circular());
        assert!(!BufferUsage::DynamicUniform.is_vertex());
        assert!(BufferUsage::StaticIndex.is_index());
        assert!(BufferUsage::StaticIndex.is_static());
        assert!(!BufferUsage::TransformFeedbackDestination.is_static());
    }

    #[test]
    fn read_only_mapping() {
        assert!(MapAccess::READ.is_read_only());
        assert!(!(MapAccess::READ | MapAccess::WRITE).is_read_only());
        assert!(!MapAccess::WRITE.is_read_only());
    }
}
