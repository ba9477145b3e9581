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

//! Backend configuration.

use super::caps::FeatureLevel;
use khora_gfx_core::renderer::api::core::BufferPoolConfig;
use serde::{Deserialize, Serialize};

/// Settings of a [`GlesBackend`](super::backend::GlesBackend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlesSettings {
    /// Buffer pool tuning.
    pub buffer_pool: BufferPoolConfig,
    /// Highest feature level to use; clamped down to what the context reports.
    pub requested_level: FeatureLevel,
    /// Ignore extension-only code paths.
    pub clamp_features: bool,
    /// Drop redundant binds and enables. Turn off to chase driver desyncs.
    pub state_caching: bool,
    /// Label framebuffers when the driver supports object labels.
    pub debug_labels: bool,
    /// Emulate a zero color mask with blending, for drivers that ignore `glColorMask`.
    pub emulate_color_write_disable: bool,
}

impl Default for GlesSettings {
    fn default() -> Self {
        Self {
            buffer_pool: BufferPoolConfig::default(),
            requested_level: FeatureLevel::Core45,
            clamp_features: false,
            state_caching: true,
            debug_labels: true,
            emulate_color_write_disable: false,
        }
    }
}

impl GlesSettings {
    /// Parses settings from JSON. Missing fields keep their default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
