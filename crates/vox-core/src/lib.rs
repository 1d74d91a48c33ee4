//! # vox-core
//!
//! Core types for runtime-dispatched N-dimensional image processing.
//!
//! This crate provides the foundational types used throughout the VOX-RS
//! workspace:
//!
//! - [`ElementType`] - Closed catalog of supported scalar element types
//! - [`Element`] - Trait bridging runtime element tags and compile-time types
//! - [`ScalarBuffer`], [`ScalarSlice`] - Untyped owned/borrowed voxel buffers
//! - [`ArrayView`], [`Array`] - Borrowed input and owned output arrays
//! - [`HostValue`] - One caller-supplied filter argument
//! - [`HostImage`] - Adapter interface to the host environment's arrays
//!
//! ## Design Philosophy
//!
//! The element type and rank of an image are only known at run time, while
//! the filter implementations are generic code monomorphized per type and
//! rank. Everything in this crate exists to carry values across that
//! boundary safely: [`ElementType`] is the runtime tag, [`Element`] is the
//! compile-time side, and the buffer enums are the meeting point.
//!
//! ## Crate Structure
//!
//! This crate is the foundation of VOX-RS and has no internal dependencies.
//! All other VOX-RS crates depend on `vox-core`:
//!
//! ```text
//! vox-core (this crate)
//!    ^
//!    |
//!    +-- vox-filters (generic algorithm library)
//!    +-- vox-dispatch (descriptor catalog, binder, dispatch table)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod element;
pub mod error;
pub mod host;
pub mod value;
pub mod view;

pub use buffer::{ScalarBuffer, ScalarSlice};
pub use element::{Element, ElementType};
pub use error::{CoreError, CoreResult};
pub use host::{HostImage, ImageDesc};
pub use value::HostValue;
pub use view::{Array, ArrayView, Geometry, MAX_RANK, MIN_RANK};
