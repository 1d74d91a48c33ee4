//! Adapter interface to the host environment's array representation.
//!
//! The dispatch core never touches the host's memory layout directly. A
//! host binding implements [`HostImage`] for its native array handle:
//! `describe` extracts the runtime metadata the dispatcher routes on,
//! `borrow` yields the flat buffer view an invocation reads, and
//! `materialize` allocates a fresh handle for a result. Axis reordering to
//! the host's convention is the adapter's job; the core only ever produces
//! buffers in canonical row-major order plus an explicit shape.
//!
//! [`Array`] implements the trait so the workspace is self-hosting in
//! tests and in pure-Rust callers.

use crate::element::ElementType;
use crate::error::CoreResult;
use crate::view::{Array, ArrayView, Geometry};

/// Runtime description of a host array: everything the dispatcher needs
/// before any generic code is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDesc {
    /// Scalar element type.
    pub element: ElementType,
    /// Extents in canonical axis order; the rank is `shape.len()`.
    pub shape: Vec<usize>,
    /// Physical grid geometry, when the host carries one.
    pub geometry: Option<Geometry>,
}

impl ImageDesc {
    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

/// Host array adapter: conversion between the host representation and the
/// core's flat buffer + shape + element tag.
pub trait HostImage {
    /// Extracts element type, shape and optional geometry.
    fn describe(&self) -> ImageDesc;

    /// Borrows the host buffer as an input view. The core holds this only
    /// for the duration of one invocation.
    fn borrow(&self) -> CoreResult<ArrayView<'_>>;

    /// Allocates a fresh host array for a result of the given type and
    /// shape.
    fn materialize(elem: ElementType, shape: &[usize]) -> CoreResult<Self>
    where
        Self: Sized;
}

impl HostImage for Array {
    fn describe(&self) -> ImageDesc {
        ImageDesc {
            element: self.element_type(),
            shape: self.shape().to_vec(),
            geometry: self.geometry().cloned(),
        }
    }

    fn borrow(&self) -> CoreResult<ArrayView<'_>> {
        self.as_view()
    }

    fn materialize(elem: ElementType, shape: &[usize]) -> CoreResult<Self> {
        Array::zeros(elem, shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_is_its_own_adapter() {
        let arr = Array::materialize(ElementType::U16, &[4, 5]).unwrap();
        let desc = arr.describe();
        assert_eq!(desc.element, ElementType::U16);
        assert_eq!(desc.shape, vec![4, 5]);
        assert_eq!(desc.rank(), 2);
        let view = arr.borrow().unwrap();
        assert_eq!(view.len(), 20);
    }
}
