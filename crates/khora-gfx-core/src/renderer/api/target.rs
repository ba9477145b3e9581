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

//! Render surfaces and render target setups.
//!
//! A [`RenderSurface`] is an abstract color or depth/stencil image backed by a
//! native texture or renderbuffer. A [`RenderTargetSetup`] names the surfaces
//! that make up one framebuffer by identity only, which makes it usable as a
//! memoization key.

use serde::{Deserialize, Serialize};

/// The maximum number of simultaneous color attachments.
pub const MAX_COLOR_ATTACHMENTS: usize = 8;

/// A stable identity for a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderSurfaceId(pub u64);

impl RenderSurfaceId {
    /// The color surface of the window framebuffer.
    pub const BACK_BUFFER_COLOR: Self = Self(u64::MAX - 1);
    /// The depth surface of the window framebuffer.
    pub const BACK_BUFFER_DEPTH: Self = Self(u64::MAX);

    /// Returns `true` for the two reserved back buffer identities.
    pub fn is_back_buffer(self) -> bool {
        self == Self::BACK_BUFFER_COLOR || self == Self::BACK_BUFFER_DEPTH
    }
}

/// The native object storing the pixels of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceBacking {
    /// A texture object, by native name.
    Texture(u32),
    /// A renderbuffer object, by native name.
    Renderbuffer(u32),
    /// Owned by the windowing system (the back buffer).
    System,
}

/// What a surface stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    /// A color image.
    Color,
    /// A depth image, optionally with a stencil channel.
    Depth {
        /// The depth format also carries stencil bits.
        has_stencil: bool,
    },
}

/// The shape of a texture-backed surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextureDimension {
    /// A plain 2D texture.
    #[default]
    D2,
    /// A cube map; one face is attached at a time.
    Cube,
    /// A volume texture.
    D3,
    /// A 2D array texture.
    D2Array,
}

/// What happens to the existing contents of an attachment when rendering starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LoadAction {
    /// Preserve the existing contents.
    #[default]
    Load,
    /// Clear to a known value.
    Clear,
    /// The existing contents are not needed.
    DontCare,
}

/// What happens to the rendered contents of an attachment when rendering ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoreAction {
    /// Write the results back to memory.
    #[default]
    Store,
    /// Resolve multisampled contents.
    Resolve,
    /// The results are not needed after rendering.
    DontCare,
}

/// An abstract color or depth/stencil image that can be attached to a framebuffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSurface {
    /// Identity of the surface.
    pub id: RenderSurfaceId,
    /// Native backing object.
    pub backing: SurfaceBacking,
    /// Separate stencil renderbuffer, when the depth format is not packed.
    pub stencil_renderbuffer: Option<u32>,
    /// Color or depth.
    pub kind: SurfaceKind,
    /// Shape of the backing texture.
    pub dimension: TextureDimension,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of samples per pixel (1 when not multisampled).
    pub samples: u32,
    /// A placeholder surface that is never rendered to.
    pub never_used: bool,
    /// Part of the window framebuffer.
    pub back_buffer: bool,
    /// Current load action, consumed by the next promotion.
    pub load_action: LoadAction,
    /// Current store action, consumed by the next invalidation.
    pub store_action: StoreAction,
    /// Debug label of the backing object.
    pub label: Option<String>,
}

impl RenderSurface {
    fn new(
        id: RenderSurfaceId,
        backing: SurfaceBacking,
        kind: SurfaceKind,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id,
            backing,
            stencil_renderbuffer: None,
            kind,
            dimension: TextureDimension::D2,
            width,
            height,
            samples: 1,
            never_used: false,
            back_buffer: false,
            load_action: LoadAction::Load,
            store_action: StoreAction::Store,
            label: None,
        }
    }

    /// Creates a color surface.
    pub fn color(id: RenderSurfaceId, backing: SurfaceBacking, width: u32, height: u32) -> Self {
        Self::new(id, backing, SurfaceKind::Color, width, height)
    }

    /// Creates a depth surface, with or without a stencil channel.
    pub fn depth(
        id: RenderSurfaceId,
        backing: SurfaceBacking,
        width: u32,
        height: u32,
        has_stencil: bool,
    ) -> Self {
        let kind = SurfaceKind::Depth { has_stencil };
        Self::new(id, backing, kind, width, height)
    }

    /// The color surface of the window framebuffer.
    pub fn back_buffer_color(width: u32, height: u32) -> Self {
        let mut surface = Self::color(
            RenderSurfaceId::BACK_BUFFER_COLOR,
            SurfaceBacking::System,
            width,
            height,
        );
        surface.back_buffer = true;
        surface
    }

    /// The depth surface of the window framebuffer. Always assumed to have stencil.
    pub fn back_buffer_depth(width: u32, height: u32) -> Self {
        let mut surface = Self::depth(
            RenderSurfaceId::BACK_BUFFER_DEPTH,
            SurfaceBacking::System,
            width,
            height,
            true,
        );
        surface.back_buffer = true;
        surface
    }

    /// Sets the sample count.
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    /// Sets the texture dimension.
    pub fn with_dimension(mut self, dimension: TextureDimension) -> Self {
        self.dimension = dimension;
        self
    }

    /// Attaches a separate stencil renderbuffer.
    pub fn with_stencil_renderbuffer(mut self, renderbuffer: u32) -> Self {
        self.stencil_renderbuffer = Some(renderbuffer);
        self
    }

    /// Sets the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks the surface as a placeholder that is never drawn to.
    pub fn never_used(mut self) -> Self {
        self.never_used = true;
        self
    }

    /// Returns `true` for placeholder surfaces.
    pub fn is_dummy(&self) -> bool {
        self.never_used
    }

    /// Returns `true` for color surfaces.
    pub fn is_color(&self) -> bool {
        self.kind == SurfaceKind::Color
    }

    /// Returns `true` if the surface carries stencil bits.
    pub fn has_stencil(&self) -> bool {
        matches!(self.kind, SurfaceKind::Depth { has_stencil: true })
    }
}

/// The set of surfaces one framebuffer renders into.
///
/// Two setups compare equal when they name the same surfaces in the same order
/// with the same subresource selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RenderTargetSetup {
    /// Color surfaces, bound to consecutive color attachment points.
    pub colors: Vec<RenderSurfaceId>,
    /// Depth (and stencil) surface.
    pub depth: Option<RenderSurfaceId>,
    /// Mip level rendered to.
    pub mip_level: u32,
    /// Cube face (`0..6`) rendered to, for cube surfaces.
    pub cube_face: u32,
    /// Layer rendered to for volume and array surfaces; `None` binds every layer.
    pub depth_slice: Option<u32>,
}

impl RenderTargetSetup {
    /// A setup with the given color surfaces and optional depth surface.
    pub fn new(colors: Vec<RenderSurfaceId>, depth: Option<RenderSurfaceId>) -> Self {
        Self {
            colors,
            depth,
            ..Default::default()
        }
    }

    /// The window framebuffer.
    pub fn back_buffer() -> Self {
        Self::new(
            vec![RenderSurfaceId::BACK_BUFFER_COLOR],
            Some(RenderSurfaceId::BACK_BUFFER_DEPTH),
        )
    }

    /// Sets the mip level.
    pub fn with_mip_level(mut self, mip_level: u32) -> Self {
        self.mip_level = mip_level;
        self
    }

    /// Sets the cube face.
    pub fn with_cube_face(mut self, face: u32) -> Self {
        self.cube_face = face;
        self
    }

    /// Sets the layer for volume and array surfaces.
    pub fn with_depth_slice(mut self, slice: u32) -> Self {
        self.depth_slice = Some(slice);
        self
    }

    /// Returns `true` if no surface is attached.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty() && self.depth.is_none()
    }

    /// Returns `true` if `surface` is one of the attachments.
    pub fn contains(&self, surface: RenderSurfaceId) -> bool {
        self.depth == Some(surface) || self.colors.contains(&surface)
    }

    /// Every attached surface, colors first.
    pub fn surfaces(&self) -> impl Iterator<Item = RenderSurfaceId> + '_ {
        self.colors.iter().copied().chain(self.depth)
    }

    /// Strips every occurrence of `surface`. Returns `true` if the setup changed.
    pub fn remove_surface(&mut self, surface: RenderSurfaceId) -> bool {
        let before = self.colors.len();
        self.colors.retain(|&id| id != surface);
        let mut changed = before != self.colors.len();
        if self.depth == Some(surface) {
            self.depth = None;
            changed = true;
        }
        changed
    }
}

/// An integer rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectInt {
    /// Left edge.
    pub x: i32,
    /// Bottom edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl RectInt {
    /// Creates a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Returns `true` if the rectangle covers exactly `width` x `height` from the origin.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        *self == Self::from_size(width, height)
    }
}
