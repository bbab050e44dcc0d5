//! Classification, dof scoping and restricted assembly algorithms.

pub mod assembly;
pub mod classify;
pub mod cut_info;
pub mod cut_ratio;
pub mod dofs;
pub mod enrichment;
pub mod facet_marker;

pub use assembly::{
    AssembledSystem, ElementContext, ElementIntegrator, FacetContext, FacetIntegrator,
    LocalContribution, NoFacetIntegrator, RestrictedAssembler,
};
pub use classify::Classification;
pub use cut_info::{CutInfo, SharedCutInfo};
pub use cut_ratio::CutRatios;
pub use dofs::{CompressedSpace, compress, dofs_of_elements, dofs_of_facets};
pub use enrichment::EnrichedSpace;
pub use facet_marker::{
    RingExpansion, elements_with_neighbor_facets, facets_with_neighbor_types,
    ghost_penalty_facets, grow_elements,
};

use crate::cut_error::CutError;

/// Maps `f` over `0..n` into disjoint output slots.
///
/// Runs on the rayon pool when the `rayon` feature is enabled; the output is
/// identical to the serial path either way, and the first error in index
/// order is not guaranteed under rayon, only that some error is returned.
pub(crate) fn map_indexed<T, F>(n: usize, f: F) -> Result<Vec<T>, CutError>
where
    T: Send,
    F: Fn(usize) -> Result<T, CutError> + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (0..n).map(f).collect()
    }
}
