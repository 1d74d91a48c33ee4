//! # vox-filters
//!
//! Generic N-dimensional image filters for the VOX-RS workspace.
//!
//! Every algorithm here is generic over the element type `T: Element` and,
//! where the algorithm is rank-generic, the array rank `const D: usize`.
//! The dispatch core monomorphizes one specialization per supported
//! `(element type, rank)` cell; nothing in this crate inspects runtime
//! type tags.
//!
//! # Modules
//!
//! - [`distance`] - Euclidean and chamfer distance maps
//! - [`morphology`] - Binary dilation and erosion with a ball element
//! - [`median`] - Box-neighborhood median
//! - [`thinning`] - 3-D binary skeletonization
//! - [`vesselness`] - Multiscale Hessian vesselness measure
//! - [`diffusion`] - Vessel-enhancing anisotropic diffusion
//! - [`mrf`] - Markov-random-field relabeling
//! - [`voting`] - Iterative hole filling by majority voting
//! - [`canny`] - N-dimensional Canny edge detection
//!
//! Buffers are flat, row-major, last axis fastest. All numeric work runs
//! in f64 through the [`Element`](vox_core::Element) bridge; results are
//! narrowed back to the caller's element type at the boundary.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod canny;
pub mod diffusion;
pub mod distance;
pub mod eigen;
pub mod grid;
pub mod kernel;
pub mod median;
pub mod morphology;
pub mod mrf;
pub mod thinning;
pub mod vesselness;
pub mod voting;

pub use error::{FilterError, FilterResult};
pub use vesselness::ScaleSpace;
