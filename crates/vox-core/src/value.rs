//! Caller-supplied filter arguments.

/// One extra argument supplied by the host caller, after the filter name
/// and the primary input array.
///
/// The host environment does not distinguish scalars from 1x1 arrays, so
/// the parameter binder treats these loosely: a scalar coercion accepts any
/// variant with at least one numeric element and takes the first.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// A single number.
    Scalar(f64),
    /// A flat row vector.
    Vector(Vec<f64>),
    /// A full N-dimensional array with its shape.
    Array {
        /// Extents in canonical axis order.
        shape: Vec<usize>,
        /// Row-major values.
        data: Vec<f64>,
    },
    /// A text argument.
    Text(String),
}

impl HostValue {
    /// First numeric element of the value, if it has one.
    pub fn first_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(v) => v.first().copied(),
            Self::Array { data, .. } => data.first().copied(),
            Self::Text(_) => None,
        }
    }

    /// All numeric elements of the value, flattened, if numeric.
    pub fn as_numbers(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(v) => Some(std::slice::from_ref(v)),
            Self::Vector(v) => Some(v),
            Self::Array { data, .. } => Some(data),
            Self::Text(_) => None,
        }
    }

    /// Short description of the value for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar(v) => format!("scalar {v}"),
            Self::Vector(v) => format!("vector of {} elements", v.len()),
            Self::Array { shape, .. } => format!("array of shape {shape:?}"),
            Self::Text(s) => format!("text {s:?}"),
        }
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        Self::Scalar(v)
    }
}

impl From<Vec<f64>> for HostValue {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
