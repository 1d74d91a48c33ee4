//! The static filter descriptor catalog.
//!
//! Thirteen entries of pure data: parameter lists with defaults and
//! coercion kinds, output lists with element/shape inference rules, and
//! the rank/element compatibility predicates the dispatcher consults
//! before any generic code is chosen. Adding a fourteenth algorithm means
//! adding one entry here and one registration in the dispatch table;
//! nothing else changes.
//!
//! Built once at startup behind [`Catalog::global`] and shared read-only
//! by every invocation.

use crate::binder::{BindCtx, BoundValue};
use crate::id::FilterId;
use std::collections::HashMap;
use std::sync::OnceLock;
use vox_core::ElementType;

/// How a caller-supplied value is coerced into a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerce {
    /// Position 0: the filter name string. Never bound from `args`.
    FilterName,
    /// Position 1: the primary input array. Never bound from `args`.
    PrimaryImage,
    /// A single number; the first element of any supplied container.
    Scalar,
    /// A vector of length `rank`, or a scalar replicated `rank` times.
    RankVector,
    /// A vector of any length, taken verbatim.
    AnyVector,
    /// A full array of the same rank as the input.
    SameRankArray,
}

impl Coerce {
    /// Human description used in coercion errors.
    pub fn describe(&self, rank: usize) -> String {
        match self {
            Self::FilterName => "the filter name".into(),
            Self::PrimaryImage => "the primary input array".into(),
            Self::Scalar => "a numeric scalar".into(),
            Self::RankVector => format!("a row vector of length {rank} (or a scalar)"),
            Self::AnyVector => "a row vector".into(),
            Self::SameRankArray => format!("an array of rank {rank}"),
        }
    }
}

/// Where a missing optional argument takes its value from.
///
/// Derived defaults run after every earlier parameter of the same
/// descriptor is bound; evaluation order is the declaration order, and
/// that ordering is part of the descriptor contract.
#[derive(Clone, Copy)]
pub enum DefaultRule {
    /// No default: the caller must supply the argument.
    Required,
    /// A literal scalar.
    Literal(f64),
    /// A rank-length vector filled with a literal.
    Fill(f64),
    /// Computed from the input description and previously bound values.
    Derived(fn(&BindCtx<'_>) -> BoundValue),
}

impl std::fmt::Debug for DefaultRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::Literal(v) => write!(f, "Literal({v})"),
            Self::Fill(v) => write!(f, "Fill({v})"),
            Self::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

/// One parameter of a filter, at a fixed position.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    /// Internal name, used for defaulting and error messages.
    pub name: &'static str,
    /// Coercion applied to the supplied value.
    pub coerce: Coerce,
    /// Default applied when the position is not supplied.
    pub default: DefaultRule,
}

impl ParameterSpec {
    /// Whether the caller must supply this position.
    pub fn required(&self) -> bool {
        matches!(self.default, DefaultRule::Required)
    }
}

/// Element type inference rule for one output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemRule {
    /// Same element type as the primary input.
    SameAsInput,
    /// A fixed type mandated by the algorithm.
    Fixed(ElementType),
}

/// Shape inference rule for one output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRule {
    /// Same shape as the primary input.
    SameAsInput,
    /// Input shape with one extra leading axis of size `rank`.
    VectorField,
}

/// One output slot of a filter, at a fixed position.
#[derive(Debug, Clone, Copy)]
pub struct OutputSpec {
    /// Name of the output, for documentation and errors.
    pub name: &'static str,
    /// Element type rule.
    pub element: ElemRule,
    /// Shape rule.
    pub shape: ShapeRule,
}

/// Rank compatibility predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankRule {
    /// Every supported rank (2 through 4).
    Any,
    /// Exactly one rank.
    Only(usize),
}

impl RankRule {
    /// Whether the rank passes.
    pub fn allows(&self, rank: usize) -> bool {
        match self {
            Self::Any => (2..=4).contains(&rank),
            Self::Only(r) => rank == *r,
        }
    }

    /// Rejection reason for error reporting.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Any => "requires rank 2, 3 or 4",
            Self::Only(2) => "requires rank 2",
            Self::Only(3) => "requires rank 3",
            Self::Only(4) => "requires rank 4",
            Self::Only(_) => "requires a rank outside the supported range",
        }
    }
}

/// Element type compatibility predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRule {
    /// Every catalog element type.
    Any,
    /// Floating-point input only.
    FloatOnly,
    /// Everything except boolean masks.
    NoBool,
}

impl ElementRule {
    /// Whether the element type passes.
    pub fn allows(&self, elem: ElementType) -> bool {
        match self {
            Self::Any => true,
            Self::FloatOnly => elem.is_float(),
            Self::NoBool => elem != ElementType::Bool,
        }
    }

    /// Rejection reason for error reporting.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Any => "accepts every element type",
            Self::FloatOnly => "requires floating element type (f32 or f64)",
            Self::NoBool => "does not accept bool input",
        }
    }
}

/// Static metadata describing one algorithm's contract.
#[derive(Debug)]
pub struct FilterDescriptor {
    /// Identity of the filter.
    pub id: FilterId,
    /// Ordered parameter list. The first two entries are always the
    /// filter name and the primary input array; they are bound from the
    /// invocation itself, never from the extra arguments.
    pub params: &'static [ParameterSpec],
    /// Ordered output list.
    pub outputs: &'static [OutputSpec],
    /// Rank compatibility.
    pub ranks: RankRule,
    /// Element type compatibility.
    pub elements: ElementRule,
    /// Whether distances consume the input's physical spacing.
    pub real_world_scaled: bool,
}

impl FilterDescriptor {
    /// Extra parameters after the implicit name and image positions.
    pub fn extras(&self) -> &'static [ParameterSpec] {
        &self.params[2..]
    }

    /// Minimum argument count, counting the name and image positions.
    pub fn min_args(&self) -> usize {
        2 + self.extras().iter().filter(|p| p.required()).count()
    }

    /// Maximum argument count, counting the name and image positions.
    pub fn max_args(&self) -> usize {
        self.params.len()
    }
}

const NAME_PARAM: ParameterSpec = ParameterSpec {
    name: "filter",
    coerce: Coerce::FilterName,
    default: DefaultRule::Required,
};

const IMAGE_PARAM: ParameterSpec = ParameterSpec {
    name: "image",
    coerce: Coerce::PrimaryImage,
    default: DefaultRule::Required,
};

const fn scalar(name: &'static str, default: f64) -> ParameterSpec {
    ParameterSpec {
        name,
        coerce: Coerce::Scalar,
        default: DefaultRule::Literal(default),
    }
}

const fn rank_vector(name: &'static str, fill: f64) -> ParameterSpec {
    ParameterSpec {
        name,
        coerce: Coerce::RankVector,
        default: DefaultRule::Fill(fill),
    }
}

const fn same_output(name: &'static str) -> OutputSpec {
    OutputSpec {
        name,
        element: ElemRule::SameAsInput,
        shape: ShapeRule::SameAsInput,
    }
}

// Derived defaults. Evaluation order is the parameter declaration order,
// so `upper` is already bound when `lower` runs.

fn default_canny_upper(ctx: &BindCtx<'_>) -> BoundValue {
    BoundValue::Scalar(ctx.element.max_value())
}

fn default_canny_lower(ctx: &BindCtx<'_>) -> BoundValue {
    BoundValue::Scalar(ctx.scalar("upper").unwrap_or(0.0) / 2.0)
}

fn default_mrf_weights(ctx: &BindCtx<'_>) -> BoundValue {
    // Unit hypercube neighborhood of side 3 with a zeroed center.
    let len = 3usize.pow(ctx.rank as u32);
    let mut data = vec![1.0; len];
    data[(len - 1) / 2] = 0.0;
    BoundValue::Array {
        shape: vec![3; ctx.rank],
        data,
    }
}

static NO_EXTRAS: [ParameterSpec; 2] = [NAME_PARAM, IMAGE_PARAM];

static MORPHOLOGY_PARAMS: [ParameterSpec; 4] = [
    NAME_PARAM,
    IMAGE_PARAM,
    scalar("radius", 0.0),
    scalar("foreground", 1.0),
];

static DIFFUSION_PARAMS: [ParameterSpec; 11] = [
    NAME_PARAM,
    IMAGE_PARAM,
    scalar("sigma_min", 0.2),
    scalar("sigma_max", 2.0),
    scalar("sigma_steps", 10.0),
    scalar("sigma_step_log", 1.0),
    scalar("iterations", 1.0),
    scalar("wstrength", 25.0),
    scalar("sensitivity", 5.0),
    scalar("time_step", 1e-3),
    scalar("epsilon", 1e-2),
];

static VESSELNESS_PARAMS: [ParameterSpec; 6] = [
    NAME_PARAM,
    IMAGE_PARAM,
    scalar("sigma_min", 0.2),
    scalar("sigma_max", 2.0),
    scalar("sigma_steps", 10.0),
    scalar("sigma_step_log", 1.0),
];

static MEDIAN_PARAMS: [ParameterSpec; 3] = [NAME_PARAM, IMAGE_PARAM, rank_vector("radius", 0.0)];

static MRF_PARAMS: [ParameterSpec; 7] = [
    NAME_PARAM,
    IMAGE_PARAM,
    ParameterSpec {
        name: "centroids",
        coerce: Coerce::AnyVector,
        default: DefaultRule::Required,
    },
    ParameterSpec {
        name: "weights",
        coerce: Coerce::SameRankArray,
        default: DefaultRule::Derived(default_mrf_weights),
    },
    scalar("smoothing", 1e-7),
    scalar("iterations", 100.0),
    scalar("tolerance", 1e-7),
];

static VOTING_PARAMS: [ParameterSpec; 7] = [
    NAME_PARAM,
    IMAGE_PARAM,
    rank_vector("radius", 1.0),
    scalar("iterations", 1.0),
    scalar("majority", 2.0),
    scalar("background", 0.0),
    scalar("foreground", 1.0),
];

static CANNY_PARAMS: [ParameterSpec; 6] = [
    NAME_PARAM,
    IMAGE_PARAM,
    rank_vector("variance", 0.0),
    ParameterSpec {
        name: "upper",
        coerce: Coerce::Scalar,
        default: DefaultRule::Derived(default_canny_upper),
    },
    ParameterSpec {
        name: "lower",
        coerce: Coerce::Scalar,
        default: DefaultRule::Derived(default_canny_lower),
    },
    rank_vector("max_error", 0.01),
];

static ONE_SAME_OUTPUT: [OutputSpec; 1] = [same_output("filtered")];

static DANIELSSON_OUTPUTS: [OutputSpec; 3] = [
    OutputSpec {
        name: "distance",
        element: ElemRule::Fixed(ElementType::F64),
        shape: ShapeRule::SameAsInput,
    },
    OutputSpec {
        name: "voronoi",
        element: ElemRule::SameAsInput,
        shape: ShapeRule::SameAsInput,
    },
    OutputSpec {
        name: "offsets",
        element: ElemRule::Fixed(ElementType::I64),
        shape: ShapeRule::VectorField,
    },
];

static SIGNED_DANIELSSON_OUTPUTS: [OutputSpec; 3] = [
    OutputSpec {
        name: "distance",
        element: ElemRule::Fixed(ElementType::F32),
        shape: ShapeRule::SameAsInput,
    },
    OutputSpec {
        name: "voronoi",
        element: ElemRule::SameAsInput,
        shape: ShapeRule::SameAsInput,
    },
    OutputSpec {
        name: "offsets",
        element: ElemRule::Fixed(ElementType::I64),
        shape: ShapeRule::VectorField,
    },
];

static F32_DISTANCE_OUTPUT: [OutputSpec; 1] = [OutputSpec {
    name: "distance",
    element: ElemRule::Fixed(ElementType::F32),
    shape: ShapeRule::SameAsInput,
}];

static VESSELNESS_OUTPUT: [OutputSpec; 1] = [OutputSpec {
    name: "vesselness",
    element: ElemRule::Fixed(ElementType::F64),
    shape: ShapeRule::SameAsInput,
}];

static MRF_OUTPUT: [OutputSpec; 1] = [OutputSpec {
    name: "labels",
    element: ElemRule::Fixed(ElementType::U8),
    shape: ShapeRule::SameAsInput,
}];

static CANNY_OUTPUTS: [OutputSpec; 2] = [same_output("edges"), same_output("suppressed")];

/// The thirteen descriptors, indexed by `FilterId as usize`.
static DESCRIPTORS: [FilterDescriptor; 13] = [
    FilterDescriptor {
        id: FilterId::Skeletonize,
        params: &NO_EXTRAS,
        outputs: &ONE_SAME_OUTPUT,
        ranks: RankRule::Only(3),
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::DanielssonDistance,
        params: &NO_EXTRAS,
        outputs: &DANIELSSON_OUTPUTS,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::SignedDanielssonDistance,
        params: &NO_EXTRAS,
        outputs: &SIGNED_DANIELSSON_OUTPUTS,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::MaurerDistance,
        params: &NO_EXTRAS,
        outputs: &F32_DISTANCE_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::NoBool,
        real_world_scaled: true,
    },
    FilterDescriptor {
        id: FilterId::ApproximateSignedDistance,
        params: &NO_EXTRAS,
        outputs: &F32_DISTANCE_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::BinaryDilate,
        params: &MORPHOLOGY_PARAMS,
        outputs: &ONE_SAME_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::BinaryErode,
        params: &MORPHOLOGY_PARAMS,
        outputs: &ONE_SAME_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::VesselDiffusion,
        params: &DIFFUSION_PARAMS,
        outputs: &ONE_SAME_OUTPUT,
        ranks: RankRule::Only(3),
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::HessianVesselness,
        params: &VESSELNESS_PARAMS,
        outputs: &VESSELNESS_OUTPUT,
        ranks: RankRule::Only(3),
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::Median,
        params: &MEDIAN_PARAMS,
        outputs: &ONE_SAME_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::MrfRelabel,
        params: &MRF_PARAMS,
        outputs: &MRF_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::VotingHoleFill,
        params: &VOTING_PARAMS,
        outputs: &ONE_SAME_OUTPUT,
        ranks: RankRule::Any,
        elements: ElementRule::Any,
        real_world_scaled: false,
    },
    FilterDescriptor {
        id: FilterId::CannyEdge,
        params: &CANNY_PARAMS,
        outputs: &CANNY_OUTPUTS,
        ranks: RankRule::Any,
        elements: ElementRule::FloatOnly,
        real_world_scaled: false,
    },
];

/// Name registry over the descriptor catalog.
///
/// Lookup is case-sensitive over canonical names and aliases.
pub struct Catalog {
    by_name: HashMap<&'static str, &'static FilterDescriptor>,
}

impl Catalog {
    /// The process-wide catalog, built once.
    pub fn global() -> &'static Catalog {
        static INSTANCE: OnceLock<Catalog> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let mut by_name = HashMap::new();
            for desc in &DESCRIPTORS {
                by_name.insert(desc.id.canonical_name(), desc);
                for alias in desc.id.aliases() {
                    by_name.insert(*alias, desc);
                }
            }
            Catalog { by_name }
        })
    }

    /// Descriptor for a canonical name or alias, case-sensitive.
    pub fn find(&self, name: &str) -> Option<&'static FilterDescriptor> {
        self.by_name.get(name).copied()
    }

    /// Descriptor by identity.
    pub fn get(&self, id: FilterId) -> &'static FilterDescriptor {
        &DESCRIPTORS[id as usize]
    }

    /// Every descriptor, in catalog order.
    pub fn descriptors(&self) -> &'static [FilterDescriptor; 13] {
        &DESCRIPTORS
    }
}
