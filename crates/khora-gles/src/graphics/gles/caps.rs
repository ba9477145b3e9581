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

//! Capability probing.
//!
//! [`GraphicsCaps::detect`] queries a live context once and folds its version,
//! renderer string and extension list into a flat, immutable feature table.
//! Every other component reads the table to choose a code path; nothing
//! re-queries the driver afterwards.

use super::gl::{self, GLenum};
use super::native::NativeGl;
use bitflags::bitflags;
use khora_gfx_core::renderer::api::target::MAX_COLOR_ATTACHMENTS;
use khora_gfx_core::renderer::DriverError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Highest vertex attribute count the backend tracks.
pub const MAX_VERTEX_ATTRIBUTES: u32 = 16;
/// Highest uniform buffer binding count the backend tracks.
pub const MAX_UNIFORM_BUFFER_BINDINGS: u32 = 32;

/// A normalized OpenGL / OpenGL ES feature level.
///
/// ES levels order before core levels; comparisons are only meaningful inside
/// one family, see [`is_es_at_least`](Self::is_es_at_least) and
/// [`is_core_at_least`](Self::is_core_at_least).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureLevel {
    /// OpenGL ES 2.0.
    Es2,
    /// OpenGL ES 3.0.
    Es3,
    /// OpenGL ES 3.1.
    Es31,
    /// OpenGL ES 3.1 with the Android extension pack, or ES 3.2.
    Es31Aep,
    /// OpenGL 3.2 core profile.
    Core32,
    /// OpenGL 3.3 core profile.
    Core33,
    /// OpenGL 4.0 core profile.
    Core40,
    /// OpenGL 4.1 core profile.
    Core41,
    /// OpenGL 4.2 core profile.
    Core42,
    /// OpenGL 4.3 core profile.
    Core43,
    /// OpenGL 4.4 core profile.
    Core44,
    /// OpenGL 4.5 core profile.
    Core45,
}

impl FeatureLevel {
    /// Returns `true` for the OpenGL ES family.
    pub fn is_es(self) -> bool {
        self <= FeatureLevel::Es31Aep
    }

    /// Returns `true` for the desktop core family.
    pub fn is_core(self) -> bool {
        !self.is_es()
    }

    /// Returns `true` for exactly OpenGL ES 2.0.
    pub fn is_es2(self) -> bool {
        self == FeatureLevel::Es2
    }

    /// Returns `true` if this is an ES level at or above `level`.
    pub fn is_es_at_least(self, level: FeatureLevel) -> bool {
        self.is_es() && self >= level
    }

    /// Returns `true` if this is a core level at or above `level`.
    pub fn is_core_at_least(self, level: FeatureLevel) -> bool {
        self.is_core() && self >= level
    }

    fn core_from_version(major: u32, minor: u32) -> Option<Self> {
        const CORE4: [FeatureLevel; 6] = [
            FeatureLevel::Core40,
            FeatureLevel::Core41,
            FeatureLevel::Core42,
            FeatureLevel::Core43,
            FeatureLevel::Core44,
            FeatureLevel::Core45,
        ];
        match (major, minor) {
            (3, 0..=1) | (0..=2, _) => None,
            (3, 2) => Some(FeatureLevel::Core32),
            (3, _) => Some(FeatureLevel::Core33),
            (4, minor) => Some(CORE4[(minor as usize).min(CORE4.len() - 1)]),
            _ => Some(FeatureLevel::Core45),
        }
    }

    fn es_from_version(major: u32, minor: u32, extension_pack: bool) -> Option<Self> {
        match (major, minor) {
            (0..=1, _) => None,
            (2, _) => Some(FeatureLevel::Es2),
            (3, 0) => Some(FeatureLevel::Es3),
            (3, 1) if extension_pack => Some(FeatureLevel::Es31Aep),
            (3, 1) => Some(FeatureLevel::Es31),
            _ => Some(FeatureLevel::Es31Aep),
        }
    }
}

/// A parsed `GL_VERSION` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverVersion {
    /// `true` for an OpenGL ES context.
    pub es: bool,
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl DriverVersion {
    /// Parses strings such as `"OpenGL ES 3.1 v1.r12"`, `"OpenGL ES-CM 1.1"`
    /// or `"4.5.0 NVIDIA 390.1"`.
    pub fn parse(version: &str) -> Option<Self> {
        let trimmed = version.trim();
        let (es, rest) = match trimmed.strip_prefix("OpenGL ES") {
            Some(rest) => {
                // Profile suffixes of ES 1.x ("-CM", "-CL") precede the number.
                let rest = rest.trim_start_matches(|c: char| c == '-' || c.is_ascii_alphabetic());
                (true, rest.trim_start())
            }
            None => (false, trimmed),
        };

        let number = rest.split_whitespace().next()?;
        let mut parts = number.split('.');
        let major = parse_leading_digits(parts.next()?)?;
        let minor = parts.next().and_then(parse_leading_digits).unwrap_or(0);
        Some(Self { es, major, minor })
    }
}

fn parse_leading_digits(text: &str) -> Option<u32> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

bitflags! {
    /// GPU families that need vendor specific handling, detected from `GL_RENDERER`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GpuVendor: u32 {
        /// Imagination PowerVR.
        const POWERVR = 1 << 0;
        /// ARM Mali.
        const MALI    = 1 << 1;
        /// Qualcomm Adreno.
        const ADRENO  = 1 << 2;
        /// NVIDIA Tegra.
        const TEGRA   = 1 << 3;
        /// Intel.
        const INTEL   = 1 << 4;
        /// NVIDIA desktop.
        const NVIDIA  = 1 << 5;
        /// AMD / ATI.
        const AMD     = 1 << 6;
        /// Vivante.
        const VIVANTE = 1 << 7;
    }
}

impl GpuVendor {
    /// Detects vendor families from a renderer string.
    pub fn from_renderer(renderer: &str) -> Self {
        const PATTERNS: [(&str, GpuVendor); 9] = [
            ("PowerVR", GpuVendor::POWERVR),
            ("Mali", GpuVendor::MALI),
            ("Adreno", GpuVendor::ADRENO),
            ("Tegra", GpuVendor::TEGRA),
            ("Intel", GpuVendor::INTEL),
            ("NVIDIA", GpuVendor::NVIDIA),
            ("AMD", GpuVendor::AMD),
            ("ATI", GpuVendor::AMD),
            ("Vivante", GpuVendor::VIVANTE),
        ];
        PATTERNS
            .iter()
            .filter(|(pattern, _)| renderer.contains(pattern))
            .fold(GpuVendor::empty(), |acc, (_, vendor)| acc | *vendor)
    }

    /// Tile-based deferred renderers, where load/store actions matter for bandwidth.
    pub fn is_tiled(self) -> bool {
        let tiled = GpuVendor::POWERVR | GpuVendor::ADRENO | GpuVendor::MALI | GpuVendor::VIVANTE;
        self.intersects(tiled)
    }
}

/// The extensions exposed by a context, queried once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionSet {
    names: HashSet<String>,
}

impl ExtensionSet {
    /// Builds the set from a space separated `GL_EXTENSIONS` string.
    pub fn from_list(list: &str) -> Self {
        Self {
            names: list.split_whitespace().map(str::to_owned).collect(),
        }
    }

    /// Queries the extensions of the current context.
    ///
    /// ES 2.0 only exposes the joined string; later versions enumerate
    /// `GL_NUM_EXTENSIONS` indexed strings.
    pub fn query(native: &mut dyn NativeGl, indexed: bool) -> Self {
        if !indexed {
            return Self::from_list(&native.get_string(gl::EXTENSIONS).unwrap_or_default());
        }
        let count = native.get_integer(gl::NUM_EXTENSIONS).max(0) as u32;
        let names = (0..count)
            .filter_map(|index| native.get_string_i(gl::EXTENSIONS, index))
            .collect();
        Self { names }
    }

    /// Exact-token lookup.
    pub fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns `true` if any of `names` is present.
    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has(name))
    }

    /// Number of extensions.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when the context exposes no extension.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Feature rule helper: "core ≥ X or ES ≥ Y, else the extensions unless clamped".
struct FeatureRules<'a> {
    level: FeatureLevel,
    clamped: bool,
    extensions: &'a ExtensionSet,
}

impl FeatureRules<'_> {
    fn core(&self, min: FeatureLevel) -> bool {
        self.level.is_core_at_least(min)
    }

    fn es(&self, min: FeatureLevel) -> bool {
        self.level.is_es_at_least(min)
    }

    fn ext(&self, names: &[&str]) -> bool {
        !self.clamped && self.extensions.has_any(names)
    }

    fn core_or_es(&self, core: FeatureLevel, es: FeatureLevel) -> bool {
        self.core(core) || self.es(es)
    }
}

/// The normalized feature table of a live context.
///
/// Immutable after [`detect`](Self::detect) for the lifetime of a context generation.
#[derive(Debug, Clone)]
pub struct GraphicsCaps {
    /// Effective feature level after clamping the request to the context.
    pub level: FeatureLevel,
    /// Parsed driver version.
    pub version: DriverVersion,
    /// `true` when extension-only paths are ignored.
    pub clamped: bool,
    /// Detected vendor families.
    pub gpu: GpuVendor,
    /// `GL_VENDOR`.
    pub vendor_string: String,
    /// `GL_RENDERER`.
    pub renderer_string: String,
    /// `GL_VERSION`.
    pub version_string: String,
    /// Extensions exposed by the context.
    pub extensions: ExtensionSet,

    /// Vertex array objects exist.
    pub has_vertex_array_object: bool,
    /// Uniform buffers exist.
    pub has_uniform_buffer: bool,
    /// More than one color attachment can be drawn to.
    pub has_draw_buffers: bool,
    /// Unused draw buffer slots must be set to `GL_NONE`.
    pub require_draw_buffer_none: bool,
    /// Attachments can be invalidated or discarded.
    pub has_invalidate_framebuffer: bool,
    /// `glBlitFramebuffer` is available.
    pub has_blit_framebuffer: bool,
    /// Separate read and draw framebuffer binding points.
    pub has_read_draw_framebuffer: bool,
    /// Packed depth-stencil formats.
    pub has_packed_depth_stencil: bool,
    /// Stencil attachments on render targets work.
    pub has_render_target_stencil: bool,
    /// Multisampled renderbuffers.
    pub has_multisample: bool,
    /// Render-to-texture with implicit multisample resolve.
    pub has_multisample_auto_resolve: bool,
    /// Multisampled textures.
    pub has_texture_multisample: bool,
    /// Every layer of a layered texture can be attached at once.
    pub has_framebuffer_texture_layer_whole: bool,
    /// Fence sync objects.
    pub has_fence_sync: bool,
    /// `glCopyBufferSubData` and the copy binding points.
    pub has_buffer_copy: bool,
    /// `glClearBufferSubData`.
    pub has_buffer_clear: bool,
    /// Whole-buffer mapping.
    pub has_map_buffer: bool,
    /// Range mapping.
    pub has_map_buffer_range: bool,
    /// Immutable buffer storage.
    pub has_buffer_storage: bool,
    /// Direct state access entry points.
    pub has_direct_state_access: bool,
    /// Indirect draws.
    pub has_indirect_draw: bool,
    /// Draws with a base vertex.
    pub has_draw_base_vertex: bool,
    /// Instanced draws.
    pub has_instanced_draw: bool,
    /// Separate shader objects.
    pub has_separate_shader_object: bool,
    /// Sampler objects.
    pub has_sampler_object: bool,
    /// Object labels for debuggers.
    pub has_debug_label: bool,
    /// Timer queries.
    pub has_timer_query: bool,
    /// Advanced blend equations.
    pub has_blend_advanced: bool,
    /// Advanced blending without explicit barriers.
    pub has_blend_advanced_coherent: bool,
    /// `MIN` and `MAX` blend equations.
    pub has_blend_min_max: bool,

    /// Tiled GPU: prefer "don't care" load actions.
    pub tiled_gpu: bool,
    /// Discard attachments with "don't care" loads instead of restoring them.
    pub use_discard_to_avoid_restore: bool,
    /// Clear attachments with "don't care" loads instead of restoring them.
    pub use_clear_to_avoid_restore: bool,
    /// The polygon offset factor needs scaling on this driver.
    pub has_polygon_offset_bug: bool,
    /// Color masks are ignored; emulate a zero mask with blending.
    pub buggy_disable_color_write: bool,
    /// Upload through the real buffer target instead of the copy-write target.
    pub use_actual_buffer_target_for_uploads: bool,
    /// Target used when attaching surfaces to a framebuffer.
    pub framebuffer_target_for_attachments: GLenum,

    /// Color attachments per framebuffer, clamped to the tracked slots.
    pub max_color_attachments: u32,
    /// Vertex attributes, clamped to the tracked slots.
    pub max_attributes: u32,
    /// Uniform buffer binding points.
    pub max_uniform_buffer_bindings: u32,
    /// Highest sample count.
    pub max_samples: u32,
}

impl GraphicsCaps {
    /// Queries the current context.
    ///
    /// `requested` is clamped down to what the context reports; `clamped`
    /// ignores every extension-only code path.
    pub fn detect(
        native: &mut dyn NativeGl,
        requested: FeatureLevel,
        clamped: bool,
    ) -> Result<Self, DriverError> {
        let version_string = native
            .get_string(gl::VERSION)
            .ok_or(DriverError::Unsupported {
                feature: "GL_VERSION query",
            })?;
        let vendor_string = native.get_string(gl::VENDOR).unwrap_or_default();
        let renderer_string = native.get_string(gl::RENDERER).unwrap_or_default();

        let mut version = DriverVersion::parse(&version_string)
            .ok_or(DriverError::Unsupported {
                feature: "GL_VERSION format",
            })?;
        let es2 = version.es && version.major < 3;
        if !es2 {
            // The integer queries are authoritative when they exist.
            let major = native.get_integer(gl::MAJOR_VERSION);
            let minor = native.get_integer(gl::MINOR_VERSION);
            if major > 0 {
                version.major = major as u32;
                version.minor = minor.max(0) as u32;
            }
        }

        let extensions = ExtensionSet::query(native, !es2);
        let context_level = if version.es {
            FeatureLevel::es_from_version(
                version.major,
                version.minor,
                extensions.has("GL_ANDROID_extension_pack_es31a"),
            )
            .ok_or(DriverError::Unsupported {
                feature: "OpenGL ES 2.0",
            })?
        } else {
            FeatureLevel::core_from_version(version.major, version.minor)
                .ok_or(DriverError::Unsupported {
                    feature: "OpenGL 3.2 core profile",
                })?
        };
        let level = if requested.is_es() == context_level.is_es() {
            requested.min(context_level)
        } else {
            context_level
        };

        let gpu = GpuVendor::from_renderer(&renderer_string);
        let p = FeatureRules {
            level,
            clamped,
            extensions: &extensions,
        };
        use FeatureLevel::*;

        let has_draw_buffers = level.is_core()
            || p.es(Es3)
            || (level.is_es2()
                && (extensions.has("WEBGL_draw_buffers")
                    || (extensions.has("GL_NV_draw_buffers")
                        && extensions.has("GL_NV_fbo_color_attachments"))));
        let require_draw_buffer_none = level.is_core()
            && (!extensions.has("GL_ARB_ES2_compatibility")
                || gpu.intersects(GpuVendor::INTEL | GpuVendor::AMD));
        let has_blit_framebuffer = p.core_or_es(Core32, Es3)
            || p.ext(&["GL_ARB_framebuffer_blit"])
            || (p.ext(&["GL_NV_framebuffer_blit"]) && p.ext(&["GL_NV_read_buffer"]));
        let has_read_draw_framebuffer =
            has_blit_framebuffer || extensions.has("GL_APPLE_framebuffer_multisample");
        let has_multisample_auto_resolve = p.ext(&[
            "GL_EXT_multisampled_render_to_texture",
            "GL_IMG_multisampled_render_to_texture",
        ]);
        let has_multisample = p.core_or_es(Core32, Es3)
            || has_multisample_auto_resolve
            || p.ext(&[
                "GL_ARB_framebuffer_object",
                "GL_APPLE_framebuffer_multisample",
            ])
            || (p.ext(&["GL_NV_framebuffer_multisample"]) && p.ext(&["GL_NV_framebuffer_blit"]));
        let has_uniform_buffer =
            p.core_or_es(Core32, Es3) || p.ext(&["GL_ARB_uniform_buffer_object"]);

        let max_color_attachments = if has_draw_buffers {
            (native.get_integer(gl::MAX_COLOR_ATTACHMENTS).max(1) as u32)
                .min(MAX_COLOR_ATTACHMENTS as u32)
        } else {
            1
        };
        let max_attributes =
            (native.get_integer(gl::MAX_VERTEX_ATTRIBS).max(0) as u32).min(MAX_VERTEX_ATTRIBUTES);
        let max_uniform_buffer_bindings = if has_uniform_buffer {
            (native.get_integer(gl::MAX_UNIFORM_BUFFER_BINDINGS).max(0) as u32)
                .min(MAX_UNIFORM_BUFFER_BINDINGS)
        } else {
            0
        };
        let max_samples = if has_multisample {
            native.get_integer(gl::MAX_SAMPLES).max(1) as u32
        } else {
            1
        };

        let caps = Self {
            level,
            version,
            clamped,
            gpu,
            has_vertex_array_object: level.is_core()
                || p.es(Es3)
                || p.ext(&["GL_ARB_vertex_array_object", "GL_OES_vertex_array_object"]),
            has_uniform_buffer,
            has_draw_buffers,
            require_draw_buffer_none,
            has_invalidate_framebuffer: p.core_or_es(Core43, Es3)
                || p.ext(&["GL_ARB_invalidate_subdata", "GL_EXT_discard_framebuffer"]),
            has_blit_framebuffer,
            has_read_draw_framebuffer,
            has_packed_depth_stencil: p.core_or_es(Core32, Es3)
                || (level.is_es2()
                    && extensions
                        .has_any(&["GL_OES_packed_depth_stencil", "GL_EXT_packed_depth_stencil"])),
            has_render_target_stencil: p.core_or_es(Core32, Es3)
                || (level.is_es2()
                    && !(gpu.contains(GpuVendor::ADRENO)
                        && !extensions.has("GL_OES_depth_texture_cube_map"))),
            has_multisample,
            has_multisample_auto_resolve,
            has_texture_multisample: p.core_or_es(Core32, Es31)
                || p.ext(&["GL_ARB_texture_multisample"]),
            has_framebuffer_texture_layer_whole: p.core_or_es(Core32, Es31Aep)
                || p.ext(&["GL_EXT_geometry_shader", "GL_OES_geometry_shader"]),
            has_fence_sync: p.core_or_es(Core32, Es3),
            has_buffer_copy: p.core_or_es(Core32, Es3) || p.ext(&["GL_ARB_copy_buffer"]),
            has_buffer_clear: p.core(Core44) || p.ext(&["GL_ARB_clear_buffer_object"]),
            has_map_buffer: level.is_core()
                || p.ext(&["GL_OES_mapbuffer", "GL_ARB_vertex_buffer_object"]),
            has_map_buffer_range: p.core_or_es(Core32, Es3)
                || p.ext(&["GL_EXT_map_buffer_range", "GL_ARB_map_buffer_range"]),
            has_buffer_storage: p.core(Core44)
                || p.ext(&["GL_ARB_buffer_storage", "GL_EXT_buffer_storage"]),
            has_direct_state_access: p.core(Core45) || p.ext(&["GL_ARB_direct_state_access"]),
            has_indirect_draw: p.core_or_es(Core40, Es31) || p.ext(&["GL_ARB_draw_indirect"]),
            has_draw_base_vertex: p.core(Core32)
                || p.ext(&[
                    "GL_EXT_draw_elements_base_vertex",
                    "GL_OES_draw_elements_base_vertex",
                    "GL_ARB_draw_elements_base_vertex",
                ]),
            has_instanced_draw: p.core_or_es(Core32, Es3)
                || p.ext(&[
                    "GL_NV_draw_instanced",
                    "GL_EXT_draw_instanced",
                    "GL_ARB_draw_instanced",
                ]),
            has_separate_shader_object: p.core_or_es(Core41, Es31)
                || p.ext(&[
                    "GL_ARB_separate_shader_objects",
                    "GL_EXT_separate_shader_objects",
                ]),
            has_sampler_object: p.core_or_es(Core33, Es3) || p.ext(&["GL_ARB_sampler_objects"]),
            has_debug_label: p.core(Core43)
                || extensions.has_any(&["GL_KHR_debug", "GL_EXT_debug_label"]),
            has_timer_query: p.core(Core33)
                || p.ext(&["GL_ARB_timer_query", "GL_NV_timer_query"])
                || (!gpu.intersects(GpuVendor::NVIDIA | GpuVendor::TEGRA | GpuVendor::ADRENO)
                    && p.ext(&["GL_EXT_disjoint_timer_query"])),
            has_blend_advanced: (!clamped || level == Es31Aep)
                && extensions.has_any(&[
                    "GL_KHR_blend_equation_advanced",
                    "GL_NV_blend_equation_advanced",
                ]),
            has_blend_advanced_coherent: p.ext(&[
                "GL_KHR_blend_equation_advanced_coherent",
                "GL_NV_blend_equation_advanced_coherent",
            ]),
            has_blend_min_max: !level.is_es2() || extensions.has("GL_EXT_blend_minmax"),

            tiled_gpu: gpu.is_tiled(),
            use_discard_to_avoid_restore: gpu.contains(GpuVendor::ADRENO),
            use_clear_to_avoid_restore: gpu.intersects(GpuVendor::POWERVR | GpuVendor::MALI),
            has_polygon_offset_bug: version.es
                && version.major == 2
                && gpu.intersects(GpuVendor::MALI | GpuVendor::POWERVR),
            buggy_disable_color_write: false,
            use_actual_buffer_target_for_uploads: gpu.contains(GpuVendor::MALI),
            framebuffer_target_for_attachments: if has_read_draw_framebuffer
                && gpu.contains(GpuVendor::VIVANTE)
            {
                gl::DRAW_FRAMEBUFFER
            } else {
                gl::FRAMEBUFFER
            },

            max_color_attachments,
            max_attributes,
            max_uniform_buffer_bindings,
            max_samples,

            vendor_string,
            renderer_string,
            version_string,
            extensions,
        };

        log::debug!(
            "GraphicsCaps: level {:?} (requested {:?}), {} extensions, vendors {:?}",
            caps.level,
            requested,
            caps.extensions.len(),
            caps.gpu
        );
        Ok(caps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::gles::recorder::RecordingGl;

    fn detect(version: &str, renderer: &str, extensions: &[&str]) -> GraphicsCaps {
        let mut gl = RecordingGl::new()
            .with_version(version)
            .with_renderer(renderer)
            .with_extensions(extensions);
        GraphicsCaps::detect(&mut gl, FeatureLevel::Core45, false).unwrap()
    }

    fn parsed(version: &str) -> Option<(bool, u32, u32)> {
        DriverVersion::parse(version).map(|v| (v.es, v.major, v.minor))
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!(parsed("OpenGL ES 3.1 v1.r12p0"), Some((true, 3, 1)));
        assert_eq!(parsed("4.5.0 NVIDIA 390.1"), Some((false, 4, 5)));
        assert_eq!(parsed("OpenGL ES 2.0 (WebGL 1.0)"), Some((true, 2, 0)));
        assert_eq!(parsed("OpenGL ES-CM 1.1"), Some((true, 1, 1)));
        assert_eq!(parsed("garbage"), None);
    }

    #[test]
    fn test_level_ordering() {
        assert!(FeatureLevel::Es31.is_es_at_least(FeatureLevel::Es3));
        assert!(!FeatureLevel::Core45.is_es_at_least(FeatureLevel::Es3));
        assert!(FeatureLevel::Core43.is_core_at_least(FeatureLevel::Core32));
        assert!(!FeatureLevel::Es31Aep.is_core_at_least(FeatureLevel::Core32));
    }

    #[test]
    fn test_vendor_detection() {
        let vendors = GpuVendor::from_renderer("Mali-G78 MP14");
        assert_eq!(vendors, GpuVendor::MALI);
        assert!(vendors.is_tiled());
        assert_eq!(GpuVendor::from_renderer("ATI Radeon HD"), GpuVendor::AMD);
        assert!(!GpuVendor::from_renderer("NVIDIA GeForce").is_tiled());
    }

    #[test]
    fn test_extension_tokens_are_exact() {
        let set = ExtensionSet::from_list("GL_EXT_map_buffer_range GL_OES_vertex_array_object");
        assert!(set.has("GL_OES_vertex_array_object"));
        assert!(!set.has("GL_OES_vertex_array"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_es2_relies_on_extensions() {
        let extensions = ["GL_OES_vertex_array_object"];
        let caps = detect("OpenGL ES 2.0", "PowerVR SGX 540", &extensions);
        assert_eq!(caps.level, FeatureLevel::Es2);
        assert!(caps.has_vertex_array_object);
        assert!(!caps.has_fence_sync);
        assert!(!caps.has_draw_buffers);
        assert_eq!(caps.max_color_attachments, 1);
        assert!(caps.has_polygon_offset_bug);
        assert!(caps.use_clear_to_avoid_restore);
        assert!(caps.tiled_gpu);
    }

    #[test]
    fn test_clamped_ignores_extensions() {
        let mut gl = RecordingGl::new()
            .with_version("OpenGL ES 2.0")
            .with_extensions(&["GL_EXT_map_buffer_range"]);
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Es31Aep, true).unwrap();
        assert!(!caps.has_map_buffer_range);

        let mut gl = RecordingGl::new()
            .with_version("OpenGL ES 2.0")
            .with_extensions(&["GL_EXT_map_buffer_range"]);
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Es31Aep, false).unwrap();
        assert!(caps.has_map_buffer_range);
    }

    #[test]
    fn test_request_is_clamped_to_context() {
        let mut gl = RecordingGl::new().with_version("4.1 Metal - 76.3");
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Core45, false).unwrap();
        assert_eq!(caps.level, FeatureLevel::Core41);
        assert!(!caps.has_buffer_clear);

        let mut gl = RecordingGl::new().with_version("4.5.0 NVIDIA");
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Core33, false).unwrap();
        assert_eq!(caps.level, FeatureLevel::Core33);
    }

    #[test]
    fn test_unsupported_context_is_rejected() {
        let mut gl = RecordingGl::new().with_version("3.0 Mesa");
        let result = GraphicsCaps::detect(&mut gl, FeatureLevel::Core45, false);
        assert!(matches!(result, Err(DriverError::Unsupported { .. })));
    }

    #[test]
    fn test_limits_are_clamped_to_tracked_slots() {
        let mut gl = RecordingGl::new()
            .with_vendor("Qualcomm")
            .with_integer(gl::MAX_COLOR_ATTACHMENTS, 16)
            .with_integer(gl::MAX_VERTEX_ATTRIBS, 32);
        let caps = GraphicsCaps::detect(&mut gl, FeatureLevel::Es31Aep, false).unwrap();
        assert_eq!(caps.vendor_string, "Qualcomm");
        assert_eq!(caps.max_color_attachments, 8);
        assert_eq!(caps.max_attributes, 16);
        assert_eq!(caps.max_uniform_buffer_bindings, 32);
    }

    #[test]
    fn test_vivante_attaches_through_draw_target() {
        let caps = detect("OpenGL ES 3.0", "Vivante GC7000", &[]);
        assert_eq!(
            caps.framebuffer_target_for_attachments,
            gl::DRAW_FRAMEBUFFER
        );
        let caps = detect("OpenGL ES 3.0", "Adreno (TM) 540", &[]);
        assert_eq!(caps.framebuffer_target_for_attachments, gl::FRAMEBUFFER);
        assert!(caps.use_discard_to_avoid_restore);
    }

    #[test]
    fn test_core_requires_draw_buffer_none_without_es2_compat() {
        let es2_compat = ["GL_ARB_ES2_compatibility"];
        let caps = detect("4.5.0 NVIDIA", "NVIDIA GeForce GTX", &es2_compat);
        assert!(!caps.require_draw_buffer_none);
        let caps = detect("4.5.0", "Intel HD 4000", &es2_compat);
        assert!(caps.require_draw_buffer_none);
    }
}
