//! The public invocation entry point.

use crate::binder::{self, BoundInvocation};
use crate::catalog::Catalog;
use crate::error::{DispatchError, DispatchResult};
use crate::output;
use crate::table::DispatchTable;
use tracing::debug;
use vox_core::{Array, ArrayView, HostImage, HostValue};

/// Runs one filter invocation.
///
/// `name` is matched case-sensitively against the canonical name or any
/// alias of a catalog entry. `args` are the extra positional arguments
/// after the filter name and the primary array. The `(filter, rank,
/// element type)` triple is resolved against the static dispatch table
/// before any parameter is bound; when a call is rejected for both its
/// element type and its rank, the element type rejection is the one
/// reported.
///
/// The call is synchronous and self-contained: parameters are bound, the
/// unique specialization for the input's `(rank, element type)` runs to
/// completion, and the produced arrays come back with their inferred
/// element types and shapes. No state persists across invocations.
pub fn invoke(
    name: &str,
    input: &ArrayView<'_>,
    args: &[HostValue],
) -> DispatchResult<Vec<Array>> {
    let desc = Catalog::global()
        .find(name)
        .ok_or_else(|| DispatchError::UnknownFilter(name.to_owned()))?;
    let rank = input.rank();
    let element = input.element_type();
    debug!(filter = %desc.id, rank, %element, "dispatch");

    let Some(kernel) = DispatchTable::global().get(desc.id, rank, element) else {
        // No cell for the triple. Derive the reason from the descriptor
        // predicates; the element type check precedes the rank check.
        let reason = if !desc.elements.allows(element) {
            desc.elements.reason()
        } else if !desc.ranks.allows(rank) {
            desc.ranks.reason()
        } else {
            "no specialization registered for this combination"
        };
        return Err(DispatchError::UnsupportedCombination {
            filter: desc.id,
            rank,
            element,
            reason,
        });
    };

    let params = binder::bind(desc, element, rank, args)?;
    let invocation = BoundInvocation {
        descriptor: desc,
        input,
        params,
    };
    let produced = kernel(&invocation)?;
    output::bind_outputs(desc, input, produced)
}

/// Convenience wrapper over [`invoke`] for host array handles.
pub fn invoke_on<H: HostImage>(
    name: &str,
    image: &H,
    args: &[HostValue],
) -> DispatchResult<Vec<Array>> {
    let view = image.borrow()?;
    invoke(name, &view, args)
}
