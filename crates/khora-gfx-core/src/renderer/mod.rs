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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! This module defines the "common language" spoken between the device facade
//! and a native backend: what a buffer is used for, what a blend or depth
//! configuration looks like, which surfaces make up a render target, and how
//! failures are reported. The 'how' lives in a concrete backend crate (e.g.
//! `khora-gles`) which consumes these types.

pub mod api;
pub mod error;

// Re-export the most important types for easier use.
pub use self::api::*;
pub use self::error::{BufferError, DriverError, FramebufferError, GfxError};
