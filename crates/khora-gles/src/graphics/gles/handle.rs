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

//! Context-scoped native object handles.
//!
//! Framebuffers, vertex arrays and queries are container objects: their names
//! are only meaningful inside the context that created them. A [`Handle`]
//! remembers its owning context in debug builds and asserts on misuse.

use super::gl::GLuint;
use std::fmt;
use std::marker::PhantomData;

/// Identifies one registered native context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ContextId(pub u32);

/// Marker for framebuffer objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferKind {}
/// Marker for vertex array objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexArrayKind {}
/// Marker for query objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {}

/// A native object name tagged with its kind and, in debug builds, its context.
pub struct Handle<K> {
    name: GLuint,
    #[cfg(debug_assertions)]
    context: ContextId,
    _kind: PhantomData<K>,
}

/// A framebuffer object.
pub type FramebufferHandle = Handle<FramebufferKind>;
/// A vertex array object.
pub type VertexArrayHandle = Handle<VertexArrayKind>;
/// A query object.
pub type QueryHandle = Handle<QueryKind>;

impl<K> Handle<K> {
    /// The default object (name `0`), valid in every context.
    pub const ZERO: Self = Self {
        name: 0,
        #[cfg(debug_assertions)]
        context: ContextId(0),
        _kind: PhantomData,
    };

    /// A name no driver hands out.
    pub const INVALID: Self = Self {
        name: GLuint::MAX,
        #[cfg(debug_assertions)]
        context: ContextId(0),
        _kind: PhantomData,
    };

    /// Wraps a name created in `context`.
    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub fn new(context: ContextId, name: GLuint) -> Self {
        Self {
            name,
            #[cfg(debug_assertions)]
            context,
            _kind: PhantomData,
        }
    }

    /// The name for use in `context`.
    ///
    /// Debug builds assert that `context` created the object; the default
    /// object is exempt.
    #[cfg_attr(not(debug_assertions), allow(unused_variables))]
    pub fn name_in(&self, context: ContextId) -> GLuint {
        #[cfg(debug_assertions)]
        debug_assert!(
            self.name == 0 || self.name == GLuint::MAX || self.context == context,
            "object {} of context {:?} used in context {:?}",
            self.name,
            self.context,
            context
        );
        self.name
    }

    /// The raw name, without any context check.
    pub fn raw(&self) -> GLuint {
        self.name
    }

    /// Returns `true` for the default object.
    pub fn is_zero(&self) -> bool {
        self.name == 0
    }

    /// Returns `true` unless this is [`INVALID`](Self::INVALID).
    pub fn is_valid(&self) -> bool {
        self.name != GLuint::MAX
    }
}

impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

// Identity is the name alone: the default object compares equal across contexts.
impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<K> Eq for Handle<K> {}

impl<K> std::hash::Hash for Handle<K> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<K> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.name)
    }
}

impl<K> Default for Handle<K> {
    fn default() -> Self {
        Self::ZERO
    }
}
