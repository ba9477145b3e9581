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

//! Defines the hierarchy of error types for the graphics backends.

use crate::renderer::api::target::RenderSurfaceId;
use std::fmt;

/// A native driver call failed or handed back an unusable object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The driver returned the null name for a newly generated object.
    ObjectCreationFailed {
        /// The kind of object that was requested (e.g. `"buffer"`).
        object: &'static str,
    },
    /// Inserting a GPU fence returned an invalid sync object.
    FenceCreationFailed,
    /// Mapping a buffer range returned no pointer.
    MapFailed {
        /// The native name of the buffer that failed to map.
        buffer: u32,
    },
    /// A required entry point is not exposed by the current driver.
    Unsupported {
        /// The feature or entry point that is missing.
        feature: &'static str,
    },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::ObjectCreationFailed { object } => {
                write!(f, "The driver failed to create a {object} object")
            }
            DriverError::FenceCreationFailed => write!(f, "The driver failed to insert a fence"),
            DriverError::MapFailed { buffer } => {
                write!(f, "Failed to map buffer {buffer}")
            }
            DriverError::Unsupported { feature } => {
                write!(f, "Feature not supported by the driver: {feature}")
            }
        }
    }
}

impl std::error::Error for DriverError {}

/// An error related to a pooled GPU buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The driver refused a buffer operation.
    Driver(DriverError),
    /// A range lies outside of the buffer storage.
    OutOfBounds {
        /// First byte of the requested range.
        offset: usize,
        /// Length of the requested range in bytes.
        size: usize,
        /// Capacity of the buffer in bytes.
        capacity: usize,
    },
    /// `unmap` or a flush was requested on a buffer that is not mapped.
    NotMapped,
    /// `map` was requested on a buffer that is already mapped.
    AlreadyMapped,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::Driver(err) => write!(f, "Buffer driver error: {err}"),
            BufferError::OutOfBounds {
                offset,
                size,
                capacity,
            } => write!(
                f,
                "Buffer range {offset}..{} is out of bounds (capacity {capacity})",
                offset + size
            ),
            BufferError::NotMapped => write!(f, "The buffer is not mapped."),
            BufferError::AlreadyMapped => write!(f, "The buffer is already mapped."),
        }
    }
}

impl std::error::Error for BufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferError::Driver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DriverError> for BufferError {
    fn from(err: DriverError) -> Self {
        BufferError::Driver(err)
    }
}

/// An error raised while building or using a framebuffer object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramebufferError {
    /// The driver refused a framebuffer operation.
    Driver(DriverError),
    /// The attachment combination failed the completeness check.
    Incomplete {
        /// The raw status returned by the completeness query.
        status: u32,
        /// A readable name for `status`.
        description: &'static str,
    },
    /// A render target setup without any color or depth surface.
    EmptyAttachmentSet,
    /// More color attachments than the device exposes.
    TooManyColorAttachments {
        /// Number of color surfaces in the setup.
        count: usize,
        /// Maximum number of color attachments of the device.
        max: usize,
    },
    /// The setup references a surface that was never registered.
    UnknownSurface {
        /// The unknown surface.
        surface: RenderSurfaceId,
    },
    /// A surface of the default (window) framebuffer cannot be released.
    DefaultSurfaceRelease {
        /// The back buffer surface that was about to be released.
        surface: RenderSurfaceId,
    },
}

impl fmt::Display for FramebufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramebufferError::Driver(err) => write!(f, "Framebuffer driver error: {err}"),
            FramebufferError::Incomplete {
                status,
                description,
            } => write!(
                f,
                "The framebuffer is not complete: {description} (0x{status:04X})"
            ),
            FramebufferError::EmptyAttachmentSet => write!(
                f,
                "A render target needs at least one color or depth surface"
            ),
            FramebufferError::TooManyColorAttachments { count, max } => write!(
                f,
                "{count} color attachments requested but the device supports {max}"
            ),
            FramebufferError::UnknownSurface { surface } => {
                write!(f, "Unknown render surface: {surface:?}")
            }
            FramebufferError::DefaultSurfaceRelease { surface } => write!(
                f,
                "Cannot release {surface:?}, it belongs to the default framebuffer"
            ),
        }
    }
}

impl std::error::Error for FramebufferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FramebufferError::Driver(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DriverError> for FramebufferError {
    fn from(err: DriverError) -> Self {
        FramebufferError::Driver(err)
    }
}

/// The top-level error of a graphics backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GfxError {
    /// A driver-level failure outside of buffers and framebuffers.
    Driver(DriverError),
    /// A buffer operation failed.
    Buffer(BufferError),
    /// A framebuffer operation failed.
    Framebuffer(FramebufferError),
    /// A context-scoped operation was requested while no context is current.
    NoCurrentContext,
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GfxError::Driver(err) => write!(f, "Graphics driver error: {err}"),
            GfxError::Buffer(err) => write!(f, "Graphics buffer error: {err}"),
            GfxError::Framebuffer(err) => write!(f, "Graphics framebuffer error: {err}"),
            GfxError::NoCurrentContext => write!(f, "No graphics context is current"),
        }
    }
}

impl std::error::Error for GfxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GfxError::Driver(err) => Some(err),
            GfxError::Buffer(err) => Some(err),
            GfxError::Framebuffer(err) => Some(err),
            GfxError::NoCurrentContext => None,
        }
    }
}

impl From<DriverError> for GfxError {
    fn from(err: DriverError) -> Self {
        GfxError::Driver(err)
    }
}

impl From<BufferError> for GfxError {
    fn from(err: BufferError) -> Self {
        GfxError::Buffer(err)
    }
}

impl From<FramebufferError> for GfxError {
    fn from(err: FramebufferError) -> Self {
        GfxError::Framebuffer(err)
    }
}
