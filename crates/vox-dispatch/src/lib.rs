//! # vox-dispatch
//!
//! The dispatch core of VOX-RS: routes a runtime `(filter name, element
//! type, rank)` triple to exactly one compile-time specialization of the
//! generic algorithm library.
//!
//! # Components
//!
//! - [`FilterId`] and the [`Catalog`] - the closed set of thirteen
//!   algorithms, their aliases, parameter lists, output rules and
//!   compatibility predicates
//! - [`binder`] - positional argument resolution, defaults (including
//!   cross-parameter defaults) and coercions
//! - [`DispatchTable`] - the `(filter, rank, element type)` cell table
//!   holding one monomorphized kernel per valid combination
//! - [`invoke`] - the public entry point tying it all together
//!
//! # Example
//!
//! ```rust
//! use vox_core::{ArrayView, HostValue, ScalarSlice};
//! use vox_dispatch::invoke;
//!
//! // A 5x5 mask with a single foreground voxel.
//! let mut mask = vec![0u8; 25];
//! mask[12] = 1;
//! let view = ArrayView::new(ScalarSlice::U8(&mask), &[5, 5], None).unwrap();
//!
//! // Dilate by one voxel.
//! let results = invoke("dilate", &view, &[HostValue::Scalar(1.0)]).unwrap();
//! assert_eq!(results[0].shape(), &[5, 5]);
//! ```
//!
//! # Failure model
//!
//! Every error is terminal for the invocation and names the offending
//! filter, rank, element type or parameter; see [`DispatchError`]. The
//! catalog and dispatch table are immutable after startup and safely
//! shared between threads; everything per-call lives on the caller's
//! stack.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod binder;
pub mod catalog;
mod error;
mod id;
mod invoke;
mod kernels;
mod output;
mod table;

pub use catalog::{Catalog, FilterDescriptor};
pub use error::{DispatchError, DispatchResult};
pub use id::FilterId;
pub use invoke::{invoke, invoke_on};
pub use table::DispatchTable;
