//! The output binder.
//!
//! Maps the buffers a kernel produced through the descriptor's output
//! specs: infers each slot's element type and shape, validates that the
//! kernel honored them, and moves (never copies) the buffers into the
//! caller-visible result arrays. Same-shape outputs inherit the input's
//! physical geometry; vector-field outputs do not, since their leading
//! axis is synthetic.

use crate::catalog::{ElemRule, FilterDescriptor, ShapeRule};
use crate::error::{DispatchError, DispatchResult};
use vox_core::{Array, ArrayView, ScalarBuffer};

/// Assembles the result sequence from the kernel's raw buffers.
pub(crate) fn bind_outputs(
    desc: &FilterDescriptor,
    input: &ArrayView<'_>,
    produced: Vec<ScalarBuffer>,
) -> DispatchResult<Vec<Array>> {
    if produced.len() != desc.outputs.len() {
        return Err(DispatchError::Algorithm(format!(
            "filter '{}' produced {} buffers, catalog declares {}",
            desc.id,
            produced.len(),
            desc.outputs.len()
        )));
    }

    let mut results = Vec::with_capacity(produced.len());
    for (spec, buffer) in desc.outputs.iter().zip(produced) {
        let element = match spec.element {
            ElemRule::SameAsInput => input.element_type(),
            ElemRule::Fixed(t) => t,
        };
        if buffer.element_type() != element {
            return Err(DispatchError::Algorithm(format!(
                "output '{}' of filter '{}' is {}, catalog declares {}",
                spec.name,
                desc.id,
                buffer.element_type(),
                element
            )));
        }
        let shape: Vec<usize> = match spec.shape {
            ShapeRule::SameAsInput => input.shape().to_vec(),
            ShapeRule::VectorField => {
                let mut s = Vec::with_capacity(input.rank() + 1);
                s.push(input.rank());
                s.extend_from_slice(input.shape());
                s
            }
        };
        let mut array = Array::new(buffer, &shape, None).map_err(|e| {
            DispatchError::Algorithm(format!(
                "output '{}' of filter '{}': {e}",
                spec.name, desc.id
            ))
        })?;
        if matches!(spec.shape, ShapeRule::SameAsInput) {
            if let Some(geometry) = input.geometry() {
                array = array.with_geometry(geometry.clone())?;
            }
        }
        results.push(array);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::id::FilterId;
    use vox_core::{ElementType, Geometry, ScalarSlice};

    fn u8_view<'a>(data: &'a [u8], shape: &[usize]) -> ArrayView<'a> {
        ArrayView::new(ScalarSlice::U8(data), shape, None).unwrap()
    }

    #[test]
    fn test_vector_field_gains_leading_axis() {
        let desc = Catalog::global().get(FilterId::DanielssonDistance);
        let data = vec![1u8; 24];
        let view = u8_view(&data, &[2, 3, 4]);
        let produced = vec![
            ScalarBuffer::F64(vec![0.0; 24]),
            ScalarBuffer::U8(vec![0; 24]),
            ScalarBuffer::I64(vec![0; 3 * 24]),
        ];
        let out = bind_outputs(desc, &view, produced).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].shape(), &[2, 3, 4]);
        assert_eq!(out[0].element_type(), ElementType::F64);
        assert_eq!(out[1].element_type(), ElementType::U8);
        assert_eq!(out[2].shape(), &[3, 2, 3, 4]);
        assert_eq!(out[2].element_type(), ElementType::I64);
    }

    #[test]
    fn test_type_mismatch_is_reported() {
        let desc = Catalog::global().get(FilterId::MaurerDistance);
        let data = vec![1u8; 4];
        let view = u8_view(&data, &[2, 2]);
        // Kernel is declared to produce f32; hand it f64 instead.
        let produced = vec![ScalarBuffer::F64(vec![0.0; 4])];
        assert!(bind_outputs(desc, &view, produced).is_err());
    }

    #[test]
    fn test_geometry_passthrough_on_same_shape_outputs() {
        let desc = Catalog::global().get(FilterId::Median);
        let data = vec![1u8; 6];
        let geometry = Geometry {
            spacing: vec![0.5, 2.0],
            origin: vec![10.0, -3.0],
        };
        let view = ArrayView::new(ScalarSlice::U8(&data), &[2, 3], Some(geometry.clone())).unwrap();
        let out = bind_outputs(desc, &view, vec![ScalarBuffer::U8(vec![0; 6])]).unwrap();
        assert_eq!(out[0].geometry(), Some(&geometry));
    }
}
