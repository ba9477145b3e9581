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

//! Framebuffer objects and the render target slots of a context.
//!
//! Framebuffer objects are container objects, so every context owns its own
//! [`FramebufferManager`]. The manager builds one object per distinct
//! [`RenderTargetSetup`](khora_gfx_core::renderer::api::target::RenderTargetSetup)
//! and keeps a reverse index from surfaces to the objects using them, so that
//! destroying a surface deletes exactly the affected objects.

mod key;
mod manager;

pub use key::FramebufferKey;
pub use manager::{BuiltinTarget, FramebufferManager};
