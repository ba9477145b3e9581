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

//! The GL / GLES backend.
//!
//! Everything here is render-thread confined: no type is `Send` across a live
//! context and nothing locks internally. A [`GlesBackend`] is the explicit
//! device object threaded through every call in place of process globals.

pub mod api;
pub mod backend;
pub mod buffer;
pub mod caps;
pub mod context;
pub mod dispatch;
pub mod framebuffer;
pub mod gl;
pub mod handle;
pub mod native;
pub mod recorder;
pub mod settings;
pub mod state;
pub mod translate;

pub use self::api::GlesApi;
pub use self::backend::GlesBackend;
pub use self::buffer::{BufferManager, BufferTicket, DataBuffer, FrameClock};
pub use self::caps::{FeatureLevel, GpuVendor, GraphicsCaps};
pub use self::context::{ContextInstance, ContextRegistry, ContextState, NativeContext};
pub use self::framebuffer::{BuiltinTarget, FramebufferKey, FramebufferManager};
pub use self::handle::{ContextId, FramebufferHandle, QueryHandle, VertexArrayHandle};
pub use self::native::NativeGl;
pub use self::recorder::{CallLog, GlCall, RecordingGl};
pub use self::settings::GlesSettings;
pub use self::state::{
    BlendStateId, ClearFlags, ClearValues, DepthStateId, PipelineStateCache, RasterStateId,
    StencilStateId,
};
