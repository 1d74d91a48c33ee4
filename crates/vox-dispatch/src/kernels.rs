//! Kernel glue: one generic function per filter.
//!
//! Each kernel extracts the typed input slice and the bound parameters,
//! calls the algorithm library, and returns the produced buffers in
//! catalog output order. The dispatch table monomorphizes these per
//! supported `(element type, rank)` cell; a kernel never checks
//! compatibility itself.

use crate::binder::BoundInvocation;
use crate::error::{DispatchError, DispatchResult};
use vox_core::{Element, ScalarBuffer};
use vox_filters::canny::CannyParams;
use vox_filters::diffusion::DiffusionParams;
use vox_filters::mrf::MrfParams;
use vox_filters::{canny, diffusion, distance, median, morphology, mrf, thinning, vesselness, voting};
use vox_filters::{FilterError, ScaleSpace};

pub(crate) type KernelOutput = DispatchResult<Vec<ScalarBuffer>>;

fn algorithm(e: FilterError) -> DispatchError {
    DispatchError::Algorithm(e.to_string())
}

fn typed_input<'a, T: Element>(inv: &'a BoundInvocation<'a>) -> DispatchResult<&'a [T]> {
    let data = inv.input.data();
    T::slice_of_view(&data).ok_or_else(|| {
        DispatchError::Algorithm(format!(
            "specialization for {} received a {} buffer",
            T::TYPE.name(),
            data.element_type()
        ))
    })
}

fn shape_of<const D: usize>(inv: &BoundInvocation<'_>) -> DispatchResult<[usize; D]> {
    inv.input.shape().try_into().map_err(|_| {
        DispatchError::Algorithm(format!(
            "rank-{D} specialization received a rank-{} input",
            inv.input.rank()
        ))
    })
}

/// A bound rank-length vector as per-axis non-negative integers.
fn axis_radii<const D: usize>(
    inv: &BoundInvocation<'_>,
    name: &'static str,
) -> DispatchResult<[usize; D]> {
    let v = inv.params.vector(name)?;
    let mut out = [0usize; D];
    for (a, &x) in v.iter().enumerate().take(D) {
        if !x.is_finite() || x < 0.0 {
            return Err(DispatchError::Coercion {
                parameter: name,
                expected: "non-negative extents".into(),
                actual: format!("{x}"),
            });
        }
        out[a] = x.floor() as usize;
    }
    Ok(out)
}

fn axis_values<const D: usize>(
    inv: &BoundInvocation<'_>,
    name: &'static str,
) -> DispatchResult<[f64; D]> {
    let v = inv.params.vector(name)?;
    let mut out = [0.0f64; D];
    for (a, &x) in v.iter().enumerate().take(D) {
        out[a] = x;
    }
    Ok(out)
}

fn count(inv: &BoundInvocation<'_>, name: &'static str) -> DispatchResult<usize> {
    let v = inv.params.scalar(name)?;
    if !v.is_finite() || v < 0.0 {
        return Err(DispatchError::Coercion {
            parameter: name,
            expected: "a non-negative count".into(),
            actual: format!("{v}"),
        });
    }
    // Fractional counts and radii truncate, matching the documented
    // floor(radius) behavior.
    Ok(v.floor() as usize)
}

fn scale_space(inv: &BoundInvocation<'_>) -> DispatchResult<ScaleSpace> {
    Ok(ScaleSpace {
        sigma_min: inv.params.scalar("sigma_min")?,
        sigma_max: inv.params.scalar("sigma_max")?,
        steps: count(inv, "sigma_steps")?,
        logarithmic: inv.params.scalar("sigma_step_log")? != 0.0,
    })
}

pub(crate) fn skeletonize<T: Element>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<3>(inv)?;
    let out = thinning::skeletonize(src, shape).map_err(algorithm)?;
    Ok(vec![T::buffer_from(out)])
}

pub(crate) fn danielsson<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let dm = distance::danielsson(src, shape).map_err(algorithm)?;
    Ok(vec![
        ScalarBuffer::F64(dm.distance),
        T::buffer_from(dm.voronoi),
        ScalarBuffer::I64(dm.offsets),
    ])
}

pub(crate) fn signed_danielsson<T: Element, const D: usize>(
    inv: &BoundInvocation<'_>,
) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let dm = distance::signed_danielsson(src, shape).map_err(algorithm)?;
    let distance: Vec<f32> = dm.distance.into_iter().map(|v| v as f32).collect();
    Ok(vec![
        ScalarBuffer::F32(distance),
        T::buffer_from(dm.voronoi),
        ScalarBuffer::I64(dm.offsets),
    ])
}

pub(crate) fn maurer<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    // The one distance filter that works in real-world units.
    let spacing: [f64; D] = match inv.input.geometry() {
        Some(g) => g
            .spacing
            .as_slice()
            .try_into()
            .map_err(|_| DispatchError::Algorithm("geometry rank mismatch".into()))?,
        None => [1.0; D],
    };
    let d = distance::maurer(src, shape, spacing).map_err(algorithm)?;
    Ok(vec![ScalarBuffer::F32(
        d.into_iter().map(|v| v as f32).collect(),
    )])
}

pub(crate) fn chamfer<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let d = distance::chamfer_signed(src, shape).map_err(algorithm)?;
    Ok(vec![ScalarBuffer::F32(
        d.into_iter().map(|v| v as f32).collect(),
    )])
}

pub(crate) fn dilate<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let radius = count(inv, "radius")?;
    let foreground = T::from_f64(inv.params.scalar("foreground")?);
    let out = morphology::dilate(src, shape, radius, foreground).map_err(algorithm)?;
    Ok(vec![T::buffer_from(out)])
}

pub(crate) fn erode<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let radius = count(inv, "radius")?;
    let foreground = T::from_f64(inv.params.scalar("foreground")?);
    let out = morphology::erode(src, shape, radius, foreground).map_err(algorithm)?;
    Ok(vec![T::buffer_from(out)])
}

pub(crate) fn vessel_diffusion<T: Element>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<3>(inv)?;
    let params = DiffusionParams {
        scales: scale_space(inv)?,
        iterations: count(inv, "iterations")?,
        wstrength: inv.params.scalar("wstrength")?,
        sensitivity: inv.params.scalar("sensitivity")?,
        time_step: inv.params.scalar("time_step")?,
        epsilon: inv.params.scalar("epsilon")?,
    };
    let out = diffusion::vessel_diffusion(src, shape, &params).map_err(algorithm)?;
    Ok(vec![T::buffer_from(out)])
}

pub(crate) fn hessian_vesselness<T: Element>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<3>(inv)?;
    let scales = scale_space(inv)?;
    let out = vesselness::vesselness(src, shape, &scales).map_err(algorithm)?;
    Ok(vec![ScalarBuffer::F64(out)])
}

pub(crate) fn median<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let radius = axis_radii::<D>(inv, "radius")?;
    let out = median::median(src, shape, radius).map_err(algorithm)?;
    Ok(vec![T::buffer_from(out)])
}

pub(crate) fn mrf_relabel<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let centroids = inv.params.vector("centroids")?.to_vec();
    let (w_shape, w_data) = inv.params.array("weights")?;

    // The neighborhood half-size comes from the weights array's shape.
    let mut half_size = [0usize; D];
    for a in 0..D {
        let extent = w_shape[a];
        if extent % 2 == 0 {
            return Err(DispatchError::Coercion {
                parameter: "weights",
                expected: "an array with odd extents".into(),
                actual: format!("shape {w_shape:?}"),
            });
        }
        half_size[a] = (extent - 1) / 2;
    }

    let params = MrfParams {
        centroids: &centroids,
        weights: w_data,
        half_size,
        smoothing: inv.params.scalar("smoothing")?,
        iterations: count(inv, "iterations")?,
        tolerance: inv.params.scalar("tolerance")?,
    };
    let labels = mrf::relabel(src, shape, &params).map_err(algorithm)?;
    Ok(vec![ScalarBuffer::U8(labels)])
}

pub(crate) fn hole_fill<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let radius = axis_radii::<D>(inv, "radius")?;
    let iterations = count(inv, "iterations")?;
    let majority = count(inv, "majority")?;
    let background = T::from_f64(inv.params.scalar("background")?);
    let foreground = T::from_f64(inv.params.scalar("foreground")?);
    let out = voting::fill_holes(src, shape, radius, iterations, majority, background, foreground)
        .map_err(algorithm)?;
    Ok(vec![T::buffer_from(out)])
}

pub(crate) fn canny_edge<T: Element, const D: usize>(inv: &BoundInvocation<'_>) -> KernelOutput {
    let src = typed_input::<T>(inv)?;
    let shape = shape_of::<D>(inv)?;
    let params = CannyParams {
        variance: axis_values::<D>(inv, "variance")?,
        upper: inv.params.scalar("upper")?,
        lower: inv.params.scalar("lower")?,
        max_error: axis_values::<D>(inv, "max_error")?,
    };
    let out = canny::canny(src, shape, &params).map_err(algorithm)?;
    Ok(vec![T::buffer_from(out.edges), T::buffer_from(out.suppressed)])
}
