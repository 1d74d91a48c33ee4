//! End-to-end tests of the invocation surface.

use vox_core::{Array, ArrayView, ElementType, Geometry, HostValue, ScalarBuffer, ScalarSlice};
use vox_dispatch::{invoke, invoke_on, DispatchError, FilterId};

fn view<'a>(data: &'a [u8], shape: &[usize]) -> ArrayView<'a> {
    ArrayView::new(ScalarSlice::U8(data), shape, None).unwrap()
}

#[test]
fn test_unknown_filter_name() {
    let data = vec![0u8; 4];
    let v = view(&data, &[2, 2]);
    let err = invoke("no-such-filter", &v, &[]).unwrap_err();
    match err {
        DispatchError::UnknownFilter(name) => assert_eq!(name, "no-such-filter"),
        other => panic!("expected UnknownFilter, got {other:?}"),
    }
}

#[test]
fn test_name_matching_is_case_sensitive() {
    let data = vec![0u8; 4];
    let v = view(&data, &[2, 2]);
    assert!(matches!(
        invoke("Median", &v, &[]).unwrap_err(),
        DispatchError::UnknownFilter(_)
    ));
}

#[test]
fn test_aliases_reach_the_same_filter() {
    let mut data = vec![0u8; 25];
    data[12] = 1;
    let v = view(&data, &[5, 5]);
    let canonical = invoke("dilate", &v, &[HostValue::Scalar(1.0)]).unwrap();
    let aliased = invoke("bwdilate", &v, &[HostValue::Scalar(1.0)]).unwrap();
    assert_eq!(canonical, aliased);
}

#[test]
fn test_median_smokes_on_every_supported_element_type() {
    for elem in ElementType::ALL {
        let arr = Array::zeros(elem, &[3, 3]).unwrap();
        let out = invoke_on("median", &arr, &[HostValue::Scalar(1.0)]).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].element_type(), elem);
        assert_eq!(out[0].shape(), &[3, 3]);
    }
}

#[test]
fn test_volume_only_filter_rejects_planar_input() {
    let data = vec![1u8; 9];
    let v = view(&data, &[3, 3]);
    let err = invoke("skeletonize", &v, &[]).unwrap_err();
    match err {
        DispatchError::UnsupportedCombination {
            filter,
            rank,
            reason,
            ..
        } => {
            assert_eq!(filter, FilterId::Skeletonize);
            assert_eq!(rank, 2);
            assert!(reason.contains("rank 3"), "reason was {reason:?}");
        }
        other => panic!("expected UnsupportedCombination, got {other:?}"),
    }
}

#[test]
fn test_float_only_filter_names_the_type_constraint() {
    let data = vec![1u8; 9];
    let v = view(&data, &[3, 3]);
    let err = invoke("canny", &v, &[]).unwrap_err();
    match err {
        DispatchError::UnsupportedCombination {
            element, reason, ..
        } => {
            assert_eq!(element, ElementType::U8);
            assert!(reason.contains("floating"), "reason was {reason:?}");
        }
        other => panic!("expected UnsupportedCombination, got {other:?}"),
    }
}

#[test]
fn test_compatibility_is_checked_before_arity() {
    // The extra argument would be an arity error, but the rank/type gate
    // runs before the binder ever sees the call.
    let data = vec![1u8; 9];
    let v = view(&data, &[3, 3]);
    let err = invoke("skeletonize", &v, &[HostValue::Scalar(1.0)]).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::UnsupportedCombination { .. }
    ));
}

#[test]
fn test_canny_returns_edges_and_suppressed() {
    // Vertical step in an f32 image.
    let mut data = vec![0.0f32; 64];
    for r in 0..8 {
        for c in 4..8 {
            data[r * 8 + c] = 10.0;
        }
    }
    let v = ArrayView::new(ScalarSlice::F32(&data), &[8, 8], None).unwrap();
    let args = vec![
        HostValue::Vector(vec![0.0, 0.0]),
        HostValue::Scalar(4.0),
        HostValue::Scalar(2.0),
    ];
    let out = invoke("canny", &v, &args).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].element_type(), ElementType::F32);
    assert_eq!(out[1].element_type(), ElementType::F32);
    let edges = match out[0].data() {
        ScalarBuffer::F32(v) => v,
        other => panic!("unexpected buffer {other:?}"),
    };
    assert!(edges.iter().any(|&e| e != 0.0));
}

#[test]
fn test_mrf_labels_are_u8_and_follow_centroid_order() {
    let data: Vec<f64> = vec![10.0, 10.0, 50.0, 50.0, 10.0, 10.0, 50.0, 50.0];
    let v = ArrayView::new(ScalarSlice::F64(&data), &[2, 4], None).unwrap();
    let out = invoke("mrf", &v, &[HostValue::Vector(vec![10.0, 50.0])]).unwrap();
    assert_eq!(out[0].element_type(), ElementType::U8);
    let labels = match out[0].data() {
        ScalarBuffer::U8(v) => v.clone(),
        other => panic!("unexpected buffer {other:?}"),
    };
    assert_eq!(labels, vec![0, 0, 1, 1, 0, 0, 1, 1]);
}

#[test]
fn test_geometry_scales_real_world_distances() {
    let mut data = vec![0u8; 3 * 4];
    for r in 0..3 {
        data[r * 4] = 1;
    }
    let geometry = Geometry {
        spacing: vec![1.0, 2.0],
        origin: vec![0.0, 0.0],
    };
    let scaled_view =
        ArrayView::new(ScalarSlice::U8(&data), &[3, 4], Some(geometry)).unwrap();
    let plain_view = view(&data, &[3, 4]);

    let scaled = invoke("maurer-distance", &scaled_view, &[]).unwrap();
    let plain = invoke("maurer-distance", &plain_view, &[]).unwrap();
    let (s, p) = match (scaled[0].data(), plain[0].data()) {
        (ScalarBuffer::F32(s), ScalarBuffer::F32(p)) => (s.clone(), p.clone()),
        other => panic!("unexpected buffers {other:?}"),
    };
    assert_eq!(p[3], 3.0);
    assert_eq!(s[3], 6.0);

    // The index-unit transform ignores spacing entirely.
    let a = invoke("danielsson-distance", &scaled_view, &[]).unwrap();
    let b = invoke("danielsson-distance", &plain_view, &[]).unwrap();
    assert_eq!(a[0].data(), b[0].data());
}

#[test]
fn test_algorithm_failure_is_opaque() {
    // A uniform mask makes the signed distance undefined; the filter's
    // own error comes back wrapped, not translated.
    let data = vec![1u8; 16];
    let v = view(&data, &[4, 4]);
    let err = invoke("maurer-distance", &v, &[]).unwrap_err();
    assert!(matches!(err, DispatchError::Algorithm(_)));
}

#[test]
fn test_invoke_on_host_array() {
    let arr = Array::new(
        ScalarBuffer::U8(vec![0, 1, 0, 1, 0, 1, 0, 1, 0]),
        &[3, 3],
        None,
    )
    .unwrap();
    let out = invoke_on("hole-fill", &arr, &[]).unwrap();
    assert_eq!(out[0].shape(), &[3, 3]);
    assert_eq!(out[0].element_type(), ElementType::U8);
}
