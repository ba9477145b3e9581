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

//! Infrastructure shared by every backend.
//!
//! This module contains the tuning configuration consumed by backend
//! resource managers.

/// Number of frames that must elapse between the last render of a buffer and
/// its next update when no fence says otherwise. Frame indices start at this
/// value so that the completion frontier can start at zero.
pub const BUFFER_UPDATE_MIN_AGE: u32 = 4;

pub mod settings;

pub use self::settings::*;
