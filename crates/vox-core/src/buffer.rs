//! Untyped voxel buffers.
//!
//! [`ScalarBuffer`] owns the voxels of one array; [`ScalarSlice`] borrows
//! them. Both are closed enums with one arm per catalog element type, so
//! moving between the untyped dispatch world and typed generic code never
//! involves transmutes: the [`Element`](crate::Element) trait pattern-matches
//! its own arm out.

use crate::element::ElementType;

/// Owned untyped buffer, one arm per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarBuffer {
    /// Boolean voxels.
    Bool(Vec<bool>),
    /// f64 voxels.
    F64(Vec<f64>),
    /// f32 voxels.
    F32(Vec<f32>),
    /// i8 voxels.
    I8(Vec<i8>),
    /// u8 voxels.
    U8(Vec<u8>),
    /// i16 voxels.
    I16(Vec<i16>),
    /// u16 voxels.
    U16(Vec<u16>),
    /// i32 voxels.
    I32(Vec<i32>),
    /// i64 voxels.
    I64(Vec<i64>),
}

impl ScalarBuffer {
    /// Runtime tag of the stored element type.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::F64(_) => ElementType::F64,
            Self::F32(_) => ElementType::F32,
            Self::I8(_) => ElementType::I8,
            Self::U8(_) => ElementType::U8,
            Self::I16(_) => ElementType::I16,
            Self::U16(_) => ElementType::U16,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocates a zero-initialized buffer of the given type and length.
    pub fn zeros(elem: ElementType, len: usize) -> Self {
        match elem {
            ElementType::Bool => Self::Bool(vec![false; len]),
            ElementType::F64 => Self::F64(vec![0.0; len]),
            ElementType::F32 => Self::F32(vec![0.0; len]),
            ElementType::I8 => Self::I8(vec![0; len]),
            ElementType::U8 => Self::U8(vec![0; len]),
            ElementType::I16 => Self::I16(vec![0; len]),
            ElementType::U16 => Self::U16(vec![0; len]),
            ElementType::I32 => Self::I32(vec![0; len]),
            ElementType::I64 => Self::I64(vec![0; len]),
        }
    }

    /// Borrows the buffer as an untyped slice.
    pub fn as_slice(&self) -> ScalarSlice<'_> {
        match self {
            Self::Bool(v) => ScalarSlice::Bool(v),
            Self::F64(v) => ScalarSlice::F64(v),
            Self::F32(v) => ScalarSlice::F32(v),
            Self::I8(v) => ScalarSlice::I8(v),
            Self::U8(v) => ScalarSlice::U8(v),
            Self::I16(v) => ScalarSlice::I16(v),
            Self::U16(v) => ScalarSlice::U16(v),
            Self::I32(v) => ScalarSlice::I32(v),
            Self::I64(v) => ScalarSlice::I64(v),
        }
    }

    /// Reads element `i` widened to f64, regardless of stored type.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        self.as_slice().get_f64(i)
    }
}

/// Borrowed untyped buffer, one arm per element type.
#[derive(Debug, Clone, Copy)]
pub enum ScalarSlice<'a> {
    /// Boolean voxels.
    Bool(&'a [bool]),
    /// f64 voxels.
    F64(&'a [f64]),
    /// f32 voxels.
    F32(&'a [f32]),
    /// i8 voxels.
    I8(&'a [i8]),
    /// u8 voxels.
    U8(&'a [u8]),
    /// i16 voxels.
    I16(&'a [i16]),
    /// u16 voxels.
    U16(&'a [u16]),
    /// i32 voxels.
    I32(&'a [i32]),
    /// i64 voxels.
    I64(&'a [i64]),
}

impl<'a> ScalarSlice<'a> {
    /// Runtime tag of the borrowed element type.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Bool(_) => ElementType::Bool,
            Self::F64(_) => ElementType::F64,
            Self::F32(_) => ElementType::F32,
            Self::I8(_) => ElementType::I8,
            Self::U8(_) => ElementType::U8,
            Self::I16(_) => ElementType::I16,
            Self::U16(_) => ElementType::U16,
            Self::I32(_) => ElementType::I32,
            Self::I64(_) => ElementType::I64,
        }
    }

    /// Number of borrowed elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// Whether the slice is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads element `i` widened to f64, regardless of borrowed type.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            Self::Bool(v) => v.get(i).map(|&b| if b { 1.0 } else { 0.0 }),
            Self::F64(v) => v.get(i).copied(),
            Self::F32(v) => v.get(i).map(|&x| x as f64),
            Self::I8(v) => v.get(i).map(|&x| x as f64),
            Self::U8(v) => v.get(i).map(|&x| x as f64),
            Self::I16(v) => v.get(i).map(|&x| x as f64),
            Self::U16(v) => v.get(i).map(|&x| x as f64),
            Self::I32(v) => v.get(i).map(|&x| x as f64),
            Self::I64(v) => v.get(i).map(|&x| x as f64),
        }
    }
}
