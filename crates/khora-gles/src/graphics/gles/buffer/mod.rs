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

//! Pooled GPU buffers.
//!
//! [`BufferManager`] hands out [`DataBuffer`]s bucketed by usage class and
//! size, and takes them back once the GPU is done reading them. Completion is
//! tracked with one fence per frame; drivers without sync objects fall back to
//! a fixed frame delay.

mod data_buffer;
mod manager;

pub use data_buffer::{BufferTicket, DataBuffer};
pub use manager::{BufferManager, FrameClock};
