//! Borrowed input and owned output arrays.
//!
//! [`ArrayView`] borrows the host's buffer for the duration of one
//! invocation; the dispatch core never takes ownership of an input.
//! [`Array`] owns the buffers a filter produces. Both carry a shape in the
//! algorithm library's canonical row-major axis order and, optionally, the
//! physical [`Geometry`] of the sampling grid.

use crate::buffer::{ScalarBuffer, ScalarSlice};
use crate::element::ElementType;
use crate::error::{CoreError, CoreResult};

/// Smallest supported array rank.
pub const MIN_RANK: usize = 2;

/// Largest supported array rank.
pub const MAX_RANK: usize = 4;

/// Physical spacing and origin of the sampling grid, one entry per axis.
///
/// Distances computed by real-world-scaled filters are expressed in these
/// units; all other filters ignore geometry and work in index units.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Voxel size along each axis.
    pub spacing: Vec<f64>,
    /// Real-world coordinate of the first voxel along each axis.
    pub origin: Vec<f64>,
}

impl Geometry {
    /// Unit spacing at the coordinate origin for the given rank.
    pub fn unit(rank: usize) -> Self {
        Self {
            spacing: vec![1.0; rank],
            origin: vec![0.0; rank],
        }
    }
}

fn validate_shape(shape: &[usize], len: usize) -> CoreResult<()> {
    let rank = shape.len();
    if !(MIN_RANK..=MAX_RANK).contains(&rank) {
        return Err(CoreError::RankOutOfRange(rank));
    }
    for (axis, &extent) in shape.iter().enumerate() {
        if extent == 0 {
            return Err(CoreError::EmptyAxis {
                axis,
                shape: shape.to_vec(),
            });
        }
    }
    let expected: usize = shape.iter().product();
    if expected != len {
        return Err(CoreError::ShapeMismatch {
            shape: shape.to_vec(),
            expected,
            actual: len,
        });
    }
    Ok(())
}

fn validate_geometry(geometry: Option<&Geometry>, rank: usize) -> CoreResult<()> {
    if let Some(g) = geometry {
        if g.spacing.len() != rank || g.origin.len() != rank {
            return Err(CoreError::GeometryMismatch {
                rank,
                actual: g.spacing.len().max(g.origin.len()),
            });
        }
    }
    Ok(())
}

/// Borrowed view of the caller's primary input array.
///
/// Owned by the caller for the duration of one invocation; the dispatch
/// core only borrows it.
#[derive(Debug, Clone)]
pub struct ArrayView<'a> {
    data: ScalarSlice<'a>,
    shape: Vec<usize>,
    geometry: Option<Geometry>,
}

impl<'a> ArrayView<'a> {
    /// Wraps a borrowed buffer with its shape.
    ///
    /// Fails with [`CoreError::RankOutOfRange`] outside rank 2..=4, and with
    /// shape/geometry errors when the descriptors disagree with the buffer.
    pub fn new(
        data: ScalarSlice<'a>,
        shape: &[usize],
        geometry: Option<Geometry>,
    ) -> CoreResult<Self> {
        validate_shape(shape, data.len())?;
        validate_geometry(geometry.as_ref(), shape.len())?;
        Ok(Self {
            data,
            shape: shape.to_vec(),
            geometry,
        })
    }

    /// The borrowed voxels.
    pub fn data(&self) -> ScalarSlice<'a> {
        self.data
    }

    /// Element type tag of the borrowed buffer.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Extents in canonical axis order.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of voxels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the view holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Physical geometry, if the host attached one.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }
}

/// Owned result array produced by a filter invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    data: ScalarBuffer,
    shape: Vec<usize>,
    geometry: Option<Geometry>,
}

impl Array {
    /// Wraps an owned buffer with its shape.
    ///
    /// Unlike [`ArrayView::new`] this accepts any rank of at least 1, since
    /// vector-field outputs carry one extra leading axis beyond the input
    /// rank.
    pub fn new(
        data: ScalarBuffer,
        shape: &[usize],
        geometry: Option<Geometry>,
    ) -> CoreResult<Self> {
        for (axis, &extent) in shape.iter().enumerate() {
            if extent == 0 {
                return Err(CoreError::EmptyAxis {
                    axis,
                    shape: shape.to_vec(),
                });
            }
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(CoreError::ShapeMismatch {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            geometry,
        })
    }

    /// Allocates a zero-filled array.
    pub fn zeros(elem: ElementType, shape: &[usize]) -> CoreResult<Self> {
        let len = shape.iter().product();
        Self::new(ScalarBuffer::zeros(elem, len), shape, None)
    }

    /// The owned voxels.
    pub fn data(&self) -> &ScalarBuffer {
        &self.data
    }

    /// Consumes the array, yielding its buffer.
    pub fn into_data(self) -> ScalarBuffer {
        self.data
    }

    /// Element type tag of the buffer.
    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Extents in canonical axis order.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Total number of voxels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the array holds no voxels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Physical geometry, if any.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Attaches geometry, replacing any present.
    pub fn with_geometry(mut self, geometry: Geometry) -> CoreResult<Self> {
        validate_geometry(Some(&geometry), self.rank())?;
        self.geometry = Some(geometry);
        Ok(self)
    }

    /// Borrows the array as an input view. Fails for ranks outside 2..=4.
    pub fn as_view(&self) -> CoreResult<ArrayView<'_>> {
        ArrayView::new(self.data.as_slice(), &self.shape, self.geometry.clone())
    }
}
