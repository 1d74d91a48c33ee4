//! The rank/type dispatch table.
//!
//! One cell per valid `(filter, rank, element type)` triple, holding the
//! monomorphized kernel for that specialization. The table is built once
//! at startup by static registration; a triple whose descriptor predicates
//! reject it never gets a cell, so no generic code is ever entered for an
//! unsupported combination — lookup misses short-circuit to a typed
//! failure in the caller.

use crate::binder::BoundInvocation;
use crate::catalog::Catalog;
use crate::error::DispatchError;
use crate::id::FilterId;
use crate::kernels;
use std::collections::HashMap;
use std::sync::OnceLock;
use vox_core::{Element, ElementType, ScalarBuffer};

/// A bound specialization: one monomorphized kernel entry point.
pub type Kernel = fn(&BoundInvocation<'_>) -> Result<Vec<ScalarBuffer>, DispatchError>;

/// The dispatch table.
pub struct DispatchTable {
    cells: HashMap<(FilterId, usize, ElementType), Kernel>,
}

impl DispatchTable {
    /// The process-wide table, built once.
    pub fn global() -> &'static DispatchTable {
        static INSTANCE: OnceLock<DispatchTable> = OnceLock::new();
        INSTANCE.get_or_init(DispatchTable::build)
    }

    fn build() -> Self {
        let mut cells = HashMap::new();
        macro_rules! register_element {
            ($($t:ty),*) => {
                $(
                    register_rank_generic::<$t, 2>(&mut cells);
                    register_rank_generic::<$t, 3>(&mut cells);
                    register_rank_generic::<$t, 4>(&mut cells);
                    register_volume_only::<$t>(&mut cells);
                )*
            };
        }
        register_element!(bool, f64, f32, i8, u8, i16, u16, i32, i64);
        DispatchTable { cells }
    }

    /// The kernel for a triple, if the cell exists.
    pub(crate) fn get(&self, id: FilterId, rank: usize, elem: ElementType) -> Option<Kernel> {
        self.cells.get(&(id, rank, elem)).copied()
    }

    /// Whether a triple has a registered specialization.
    pub fn is_supported(&self, id: FilterId, rank: usize, elem: ElementType) -> bool {
        self.cells.contains_key(&(id, rank, elem))
    }

    /// Number of registered specializations.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the table is empty (it never is after startup).
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

type Cells = HashMap<(FilterId, usize, ElementType), Kernel>;

/// Inserts one cell if the descriptor's predicates admit the triple.
fn insert<T: Element>(cells: &mut Cells, id: FilterId, rank: usize, kernel: Kernel) {
    let desc = Catalog::global().get(id);
    if desc.ranks.allows(rank) && desc.elements.allows(T::TYPE) {
        cells.insert((id, rank, T::TYPE), kernel);
    }
}

/// Registers the rank-generic filters for one `(element, rank)` pair.
fn register_rank_generic<T: Element, const D: usize>(cells: &mut Cells) {
    insert::<T>(
        cells,
        FilterId::DanielssonDistance,
        D,
        kernels::danielsson::<T, D>,
    );
    insert::<T>(
        cells,
        FilterId::SignedDanielssonDistance,
        D,
        kernels::signed_danielsson::<T, D>,
    );
    insert::<T>(cells, FilterId::MaurerDistance, D, kernels::maurer::<T, D>);
    insert::<T>(
        cells,
        FilterId::ApproximateSignedDistance,
        D,
        kernels::chamfer::<T, D>,
    );
    insert::<T>(cells, FilterId::BinaryDilate, D, kernels::dilate::<T, D>);
    insert::<T>(cells, FilterId::BinaryErode, D, kernels::erode::<T, D>);
    insert::<T>(cells, FilterId::Median, D, kernels::median::<T, D>);
    insert::<T>(cells, FilterId::MrfRelabel, D, kernels::mrf_relabel::<T, D>);
    insert::<T>(
        cells,
        FilterId::VotingHoleFill,
        D,
        kernels::hole_fill::<T, D>,
    );
    insert::<T>(cells, FilterId::CannyEdge, D, kernels::canny_edge::<T, D>);
}

/// Registers the 3-D-only filters; their kernels are written against a
/// fixed rank, so no rank-2 or rank-4 specialization ever exists.
fn register_volume_only<T: Element>(cells: &mut Cells) {
    insert::<T>(cells, FilterId::Skeletonize, 3, kernels::skeletonize::<T>);
    insert::<T>(
        cells,
        FilterId::VesselDiffusion,
        3,
        kernels::vessel_diffusion::<T>,
    );
    insert::<T>(
        cells,
        FilterId::HessianVesselness,
        3,
        kernels::hessian_vesselness::<T>,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_cell_count() {
        // Rank-generic: 8 unrestricted filters x 3 ranks x 9 types, plus
        // maurer (8 types x 3 ranks) and canny (2 types x 3 ranks).
        // Volume-only: 3 filters x 9 types at rank 3.
        let expected = 8 * 3 * 9 + 8 * 3 + 2 * 3 + 3 * 9;
        assert_eq!(DispatchTable::global().len(), expected);
    }

    #[test]
    fn test_volume_only_filters_have_no_planar_cells() {
        let table = DispatchTable::global();
        for id in [
            FilterId::Skeletonize,
            FilterId::VesselDiffusion,
            FilterId::HessianVesselness,
        ] {
            for elem in ElementType::ALL {
                assert!(!table.is_supported(id, 2, elem));
                assert!(table.is_supported(id, 3, elem));
                assert!(!table.is_supported(id, 4, elem));
            }
        }
    }

    #[test]
    fn test_canny_cells_are_float_only() {
        let table = DispatchTable::global();
        for rank in 2..=4 {
            assert!(table.is_supported(FilterId::CannyEdge, rank, ElementType::F32));
            assert!(table.is_supported(FilterId::CannyEdge, rank, ElementType::F64));
            for elem in ElementType::ALL {
                if !elem.is_float() {
                    assert!(!table.is_supported(FilterId::CannyEdge, rank, elem));
                }
            }
        }
    }

    #[test]
    fn test_maurer_rejects_bool() {
        let table = DispatchTable::global();
        for rank in 2..=4 {
            assert!(!table.is_supported(FilterId::MaurerDistance, rank, ElementType::Bool));
            assert!(table.is_supported(FilterId::MaurerDistance, rank, ElementType::U16));
        }
    }

    #[test]
    fn test_ranks_outside_range_have_no_cells() {
        let table = DispatchTable::global();
        for id in FilterId::ALL {
            for elem in ElementType::ALL {
                assert!(!table.is_supported(id, 1, elem));
                assert!(!table.is_supported(id, 5, elem));
            }
        }
    }
}
