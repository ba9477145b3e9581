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

//! # Khora GLES
//!
//! The OpenGL / OpenGL ES backend core of the Khora renderer.
//!
//! This crate owns the state-tracking and resource-lifetime layer that sits
//! between the backend-agnostic contracts of `khora-gfx-core` and a live GL
//! driver: capability probing, pooled buffers with fence-based reuse, an
//! interning pipeline-state cache, memoized framebuffer objects and the
//! per-context registry tying them together.

pub mod graphics;
