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

//! Interned fixed-function pipeline state.
//!
//! Blend, depth, stencil and raster descriptors are interned into canonical
//! device states identified by small copyable ids: equal descriptors always
//! yield the same id, so "is this already bound" is an id comparison. Binding
//! a new state issues only the native calls for the fields that differ from
//! the bound one.

mod cache;
mod device;

pub use cache::PipelineStateCache;
pub use device::{
    BlendFlags, DeviceBlendState, DeviceDepthState, DeviceRasterState, DeviceStencilState,
    StencilFaceGl,
};

use super::gl::{self, GLbitfield};
use bitflags::bitflags;
use std::collections::HashMap;
use std::hash::Hash;

macro_rules! state_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Position of the state in its interning table.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

state_id!(
    /// Canonical blend state.
    BlendStateId
);
state_id!(
    /// Canonical depth state.
    DepthStateId
);
state_id!(
    /// Canonical stencil state.
    StencilStateId
);
state_id!(
    /// Canonical raster state.
    RasterStateId
);

bitflags! {
    /// Aspects of a framebuffer to clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u8 {
        /// Every color attachment.
        const COLOR = 1 << 0;
        /// The depth attachment.
        const DEPTH = 1 << 1;
        /// The stencil attachment.
        const STENCIL = 1 << 2;
        /// Everything.
        const ALL = Self::COLOR.bits() | Self::DEPTH.bits() | Self::STENCIL.bits();
    }
}

impl ClearFlags {
    /// The matching `glClear` mask.
    pub fn gl_mask(self) -> GLbitfield {
        let mut mask = 0;
        if self.contains(ClearFlags::COLOR) {
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if self.contains(ClearFlags::DEPTH) {
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        if self.contains(ClearFlags::STENCIL) {
            mask |= gl::STENCIL_BUFFER_BIT;
        }
        mask
    }
}

/// Values written by a clear.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    /// RGBA color.
    pub color: [f32; 4],
    /// Depth value.
    pub depth: f32,
    /// Stencil value.
    pub stencil: i32,
}

impl Default for ClearValues {
    fn default() -> Self {
        Self {
            color: [0.0; 4],
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// Value-keyed interning table. Entries are never removed.
#[derive(Debug)]
struct Interner<D, S> {
    states: Vec<S>,
    lookup: HashMap<D, u32>,
}

impl<D: Copy + Eq + Hash, S> Interner<D, S> {
    fn new() -> Self {
        Self {
            states: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Index of the canonical state for `desc`, building it on first sight.
    fn intern(&mut self, desc: D, build: impl FnOnce(D) -> S) -> u32 {
        if let Some(&index) = self.lookup.get(&desc) {
            return index;
        }
        let index = self.states.len() as u32;
        self.states.push(build(desc));
        self.lookup.insert(desc, index);
        index
    }

    fn get(&self, index: u32) -> &S {
        &self.states[index as usize]
    }

    fn len(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_flags_mask() {
        assert_eq!(ClearFlags::empty().gl_mask(), 0);
        assert_eq!(
            ClearFlags::ALL.gl_mask(),
            gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT | gl::STENCIL_BUFFER_BIT
        );
    }

    #[test]
    fn test_interner_deduplicates() {
        let mut interner: Interner<u8, String> = Interner::new();
        let a = interner.intern(1, |d| d.to_string());
        let b = interner.intern(2, |d| d.to_string());
        let c = interner.intern(1, |_| unreachable!());
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.get(b), "2");
    }
}
