//! The closed catalog of filter identities.

/// One of the thirteen supported algorithms.
///
/// The discriminant doubles as the index into the descriptor catalog, so
/// the two must stay in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum FilterId {
    /// 3-D binary skeletonization.
    Skeletonize = 0,
    /// Unsigned vector distance transform with Voronoi and offset outputs.
    DanielssonDistance = 1,
    /// Signed vector distance transform with Voronoi and offset outputs.
    SignedDanielssonDistance = 2,
    /// Exact signed Euclidean distance, real-world scaled.
    MaurerDistance = 3,
    /// Approximate (chamfer) signed distance.
    ApproximateSignedDistance = 4,
    /// Binary dilation with a ball element.
    BinaryDilate = 5,
    /// Binary erosion with a ball element.
    BinaryErode = 6,
    /// Vessel-enhancing anisotropic diffusion.
    VesselDiffusion = 7,
    /// Multiscale Hessian vesselness measure.
    HessianVesselness = 8,
    /// Box-neighborhood median.
    Median = 9,
    /// Markov-random-field relabeling.
    MrfRelabel = 10,
    /// Iterative hole filling by majority voting.
    VotingHoleFill = 11,
    /// Canny edge detection.
    CannyEdge = 12,
}

impl FilterId {
    /// Every filter, in catalog order.
    pub const ALL: [FilterId; 13] = [
        Self::Skeletonize,
        Self::DanielssonDistance,
        Self::SignedDanielssonDistance,
        Self::MaurerDistance,
        Self::ApproximateSignedDistance,
        Self::BinaryDilate,
        Self::BinaryErode,
        Self::VesselDiffusion,
        Self::HessianVesselness,
        Self::Median,
        Self::MrfRelabel,
        Self::VotingHoleFill,
        Self::CannyEdge,
    ];

    /// The canonical name callers select the filter by.
    pub const fn canonical_name(&self) -> &'static str {
        match self {
            Self::Skeletonize => "skeletonize",
            Self::DanielssonDistance => "danielsson-distance",
            Self::SignedDanielssonDistance => "signed-danielsson-distance",
            Self::MaurerDistance => "maurer-distance",
            Self::ApproximateSignedDistance => "approximate-signed-distance",
            Self::BinaryDilate => "dilate",
            Self::BinaryErode => "erode",
            Self::VesselDiffusion => "vessel-diffusion",
            Self::HessianVesselness => "vesselness",
            Self::Median => "median",
            Self::MrfRelabel => "mrf",
            Self::VotingHoleFill => "hole-fill",
            Self::CannyEdge => "canny",
        }
    }

    /// Accepted alternative names.
    pub const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Skeletonize => &["skel", "thinning"],
            Self::DanielssonDistance => &["dandist"],
            Self::SignedDanielssonDistance => &["signdandist"],
            Self::MaurerDistance => &["maudist", "signed-distance"],
            Self::ApproximateSignedDistance => &["appsigndist", "chamfer-distance"],
            Self::BinaryDilate => &["bwdilate"],
            Self::BinaryErode => &["bwerode"],
            Self::VesselDiffusion => &["advess"],
            Self::HessianVesselness => &["hesves"],
            Self::Median => &[],
            Self::MrfRelabel => &["relabel"],
            Self::VotingHoleFill => &["voteholefill"],
            Self::CannyEdge => &["edge"],
        }
    }
}

impl std::fmt::Display for FilterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_index_in_catalog_order() {
        for (i, id) in FilterId::ALL.into_iter().enumerate() {
            assert_eq!(id as usize, i);
        }
    }

    #[test]
    fn test_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for id in FilterId::ALL {
            assert!(seen.insert(id.canonical_name()));
            for &alias in id.aliases() {
                assert!(seen.insert(alias), "duplicate name {alias}");
            }
        }
    }
}
