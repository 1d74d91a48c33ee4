//! The parameter binder.
//!
//! Resolves the caller's positional arguments against a descriptor's
//! parameter list: arity checks, positional binding, defaults (including
//! defaults computed from parameters bound earlier in the list), and
//! coercion into the parameter's kind. Binding happens before the
//! selected specialization runs and after the rank/type compatibility
//! check, so a kernel only ever sees a fully bound invocation.

use crate::catalog::{Coerce, DefaultRule, FilterDescriptor, ParameterSpec};
use crate::error::{DispatchError, DispatchResult};
use tracing::trace;
use vox_core::{ArrayView, ElementType, HostValue};

/// One coerced parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// A single number.
    Scalar(f64),
    /// A flat vector.
    Vector(Vec<f64>),
    /// A full array with its shape.
    Array {
        /// Extents in canonical axis order.
        shape: Vec<usize>,
        /// Row-major values.
        data: Vec<f64>,
    },
}

/// Read-only context handed to derived defaults.
pub struct BindCtx<'a> {
    /// Element type of the primary input.
    pub element: ElementType,
    /// Rank of the primary input.
    pub rank: usize,
    bound: &'a [(&'static str, BoundValue)],
}

impl BindCtx<'_> {
    /// A previously bound scalar, by parameter name.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.bound.iter().find_map(|(n, v)| match v {
            BoundValue::Scalar(s) if *n == name => Some(*s),
            _ => None,
        })
    }
}

/// The fully bound parameters of one invocation.
#[derive(Debug, Clone)]
pub struct BoundParams {
    entries: Vec<(&'static str, BoundValue)>,
}

impl BoundParams {
    fn unbound(parameter: &'static str) -> DispatchError {
        DispatchError::Coercion {
            parameter,
            expected: "a bound value".into(),
            actual: "nothing (parameter was never bound)".into(),
        }
    }

    fn get(&self, name: &'static str) -> DispatchResult<&BoundValue> {
        self.entries
            .iter()
            .find_map(|(n, v)| (*n == name).then_some(v))
            .ok_or_else(|| Self::unbound(name))
    }

    /// A bound scalar, by name.
    pub fn scalar(&self, name: &'static str) -> DispatchResult<f64> {
        match self.get(name)? {
            BoundValue::Scalar(v) => Ok(*v),
            other => Err(DispatchError::Coercion {
                parameter: name,
                expected: "a numeric scalar".into(),
                actual: format!("{other:?}"),
            }),
        }
    }

    /// A bound vector, by name.
    pub fn vector(&self, name: &'static str) -> DispatchResult<&[f64]> {
        match self.get(name)? {
            BoundValue::Vector(v) => Ok(v),
            other => Err(DispatchError::Coercion {
                parameter: name,
                expected: "a row vector".into(),
                actual: format!("{other:?}"),
            }),
        }
    }

    /// A bound array with its shape, by name.
    pub fn array(&self, name: &'static str) -> DispatchResult<(&[usize], &[f64])> {
        match self.get(name)? {
            BoundValue::Array { shape, data } => Ok((shape.as_slice(), data.as_slice())),
            other => Err(DispatchError::Coercion {
                parameter: name,
                expected: "an array".into(),
                actual: format!("{other:?}"),
            }),
        }
    }
}

/// A descriptor bound to one concrete call: the input view plus every
/// resolved parameter. Valid only for the duration of the call.
pub struct BoundInvocation<'a> {
    /// The selected descriptor.
    pub descriptor: &'static FilterDescriptor,
    /// The caller's primary input, borrowed.
    pub input: &'a ArrayView<'a>,
    /// The resolved parameters.
    pub params: BoundParams,
}

/// Binds the caller's extra arguments against the descriptor.
///
/// `args` excludes the filter name and the primary array; both are
/// accounted for in the arity arithmetic since callers count them.
pub fn bind(
    desc: &'static FilterDescriptor,
    element: ElementType,
    rank: usize,
    args: &[HostValue],
) -> DispatchResult<BoundParams> {
    let extras = desc.extras();
    let actual = 2 + args.len();
    if actual < desc.min_args() || actual > desc.max_args() {
        return Err(DispatchError::Arity {
            filter: desc.id,
            min_expected: desc.min_args(),
            max_expected: desc.max_args(),
            actual,
        });
    }

    let mut entries: Vec<(&'static str, BoundValue)> = Vec::with_capacity(extras.len());
    for (position, spec) in extras.iter().enumerate() {
        let value = match args.get(position) {
            Some(supplied) => coerce(spec, supplied, rank)?,
            None => default(spec, element, rank, &entries)?,
        };
        trace!(parameter = spec.name, ?value, "bound");
        entries.push((spec.name, value));
    }
    Ok(BoundParams { entries })
}

fn coerce(spec: &ParameterSpec, value: &HostValue, rank: usize) -> DispatchResult<BoundValue> {
    let mismatch = || DispatchError::Coercion {
        parameter: spec.name,
        expected: spec.coerce.describe(rank),
        actual: value.describe(),
    };
    match spec.coerce {
        Coerce::FilterName | Coerce::PrimaryImage => Err(mismatch()),
        Coerce::Scalar => value
            .first_scalar()
            .map(BoundValue::Scalar)
            .ok_or_else(mismatch),
        Coerce::RankVector => match value {
            HostValue::Scalar(s) => Ok(BoundValue::Vector(vec![*s; rank])),
            HostValue::Vector(v) if v.len() == rank => Ok(BoundValue::Vector(v.clone())),
            HostValue::Vector(v) if v.len() == 1 => Ok(BoundValue::Vector(vec![v[0]; rank])),
            _ => Err(mismatch()),
        },
        Coerce::AnyVector => match value {
            HostValue::Scalar(s) => Ok(BoundValue::Vector(vec![*s])),
            HostValue::Vector(v) if !v.is_empty() => Ok(BoundValue::Vector(v.clone())),
            _ => Err(mismatch()),
        },
        Coerce::SameRankArray => match value {
            HostValue::Array { shape, data } if shape.len() == rank => Ok(BoundValue::Array {
                shape: shape.clone(),
                data: data.clone(),
            }),
            _ => Err(mismatch()),
        },
    }
}

fn default(
    spec: &ParameterSpec,
    element: ElementType,
    rank: usize,
    bound: &[(&'static str, BoundValue)],
) -> DispatchResult<BoundValue> {
    match spec.default {
        DefaultRule::Literal(v) => Ok(BoundValue::Scalar(v)),
        DefaultRule::Fill(v) => Ok(BoundValue::Vector(vec![v; rank])),
        DefaultRule::Derived(f) => {
            let ctx = BindCtx {
                element,
                rank,
                bound,
            };
            Ok(f(&ctx))
        }
        // The arity check runs first, so a required position can only be
        // unsupplied if optional parameters were declared ahead of it.
        DefaultRule::Required => Err(DispatchError::Coercion {
            parameter: spec.name,
            expected: "a caller-supplied value".into(),
            actual: "nothing".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::id::FilterId;
    use approx::assert_relative_eq;

    fn descriptor(id: FilterId) -> &'static FilterDescriptor {
        Catalog::global().get(id)
    }

    #[test]
    fn test_defaults_fill_everything() {
        let desc = descriptor(FilterId::VotingHoleFill);
        let params = bind(desc, ElementType::U8, 3, &[]).unwrap();
        assert_eq!(params.vector("radius").unwrap(), &[1.0, 1.0, 1.0]);
        assert_eq!(params.scalar("iterations").unwrap(), 1.0);
        assert_eq!(params.scalar("majority").unwrap(), 2.0);
        assert_eq!(params.scalar("background").unwrap(), 0.0);
        assert_eq!(params.scalar("foreground").unwrap(), 1.0);
    }

    #[test]
    fn test_arity_too_few() {
        let desc = descriptor(FilterId::MrfRelabel);
        let err = bind(desc, ElementType::F64, 2, &[]).unwrap_err();
        match err {
            DispatchError::Arity {
                min_expected,
                actual,
                ..
            } => {
                assert_eq!(min_expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected arity error, got {other:?}"),
        }
    }

    #[test]
    fn test_arity_too_many() {
        let desc = descriptor(FilterId::Median);
        let args = vec![HostValue::Scalar(1.0), HostValue::Scalar(2.0)];
        let err = bind(desc, ElementType::U8, 2, &args).unwrap_err();
        assert!(matches!(err, DispatchError::Arity { max_expected: 3, actual: 4, .. }));
    }

    #[test]
    fn test_scalar_takes_first_element_of_container() {
        let desc = descriptor(FilterId::BinaryDilate);
        let args = vec![HostValue::Vector(vec![4.0, 9.0])];
        let params = bind(desc, ElementType::Bool, 2, &args).unwrap();
        assert_eq!(params.scalar("radius").unwrap(), 4.0);
    }

    #[test]
    fn test_rank_vector_scalar_fill_and_length_check() {
        let desc = descriptor(FilterId::Median);
        let params = bind(desc, ElementType::I16, 3, &[HostValue::Scalar(2.0)]).unwrap();
        assert_eq!(params.vector("radius").unwrap(), &[2.0, 2.0, 2.0]);

        let bad = bind(
            desc,
            ElementType::I16,
            3,
            &[HostValue::Vector(vec![1.0, 2.0])],
        );
        assert!(matches!(
            bad.unwrap_err(),
            DispatchError::Coercion { parameter: "radius", .. }
        ));
    }

    #[test]
    fn test_cross_parameter_default_lower_is_half_upper() {
        let desc = descriptor(FilterId::CannyEdge);
        // Only the upper threshold supplied.
        let args = vec![HostValue::Vector(vec![0.0, 0.0]), HostValue::Scalar(80.0)];
        let params = bind(desc, ElementType::F32, 2, &args).unwrap();
        assert_relative_eq!(params.scalar("lower").unwrap(), 40.0);

        // Nothing supplied: upper defaults to the type ceiling and lower
        // to half of it.
        let params = bind(desc, ElementType::F32, 2, &[]).unwrap();
        let upper = params.scalar("upper").unwrap();
        let lower = params.scalar("lower").unwrap();
        assert_relative_eq!(upper, f32::MAX as f64);
        assert_relative_eq!(lower, upper / 2.0);
    }

    #[test]
    fn test_mrf_default_weights_box() {
        let desc = descriptor(FilterId::MrfRelabel);
        let args = vec![HostValue::Vector(vec![10.0, 50.0])];
        let params = bind(desc, ElementType::U8, 3, &args).unwrap();
        let (shape, data) = params.array("weights").unwrap();
        assert_eq!(shape, &[3, 3, 3]);
        assert_eq!(data.len(), 27);
        assert_eq!(data[13], 0.0);
        assert_relative_eq!(data.iter().sum::<f64>(), 26.0);
    }

    #[test]
    fn test_same_rank_array_rejects_wrong_rank() {
        let desc = descriptor(FilterId::MrfRelabel);
        let args = vec![
            HostValue::Vector(vec![10.0, 50.0]),
            HostValue::Array {
                shape: vec![3, 3],
                data: vec![1.0; 9],
            },
        ];
        let err = bind(desc, ElementType::U8, 3, &args).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Coercion { parameter: "weights", .. }
        ));
    }
}
