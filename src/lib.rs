#![cfg_attr(docsrs, feature(doc_cfg))]
//! # cut-sieve
//!
//! cut-sieve classifies the elements and facets of a mesh against the zero
//! level of a scalar field and restricts dof sets and assembly to the parts of
//! the mesh that matter for unfitted (cut) finite element methods.
//!
//! ## Features
//! - Element and facet classification into `NEG`, `POS` and `IF` (cut)
//! - Per-element cut ratios from exact sub-simplex decomposition
//! - Dof selection and compression by element/facet masks
//! - Facet marking by neighbor types, patch growth, ghost-penalty facet sets
//! - Assembly restricted to element/facet subsets with a rebuilt sparsity pattern
//! - Sign-filtered enrichment of vertex-based spaces on cut elements
//!
//! ## Usage
//!
//! ```rust
//! use cut_sieve::prelude::*;
//!
//! let mesh = UnstructuredMesh::from_planar(
//!     CellType::Triangle,
//!     &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
//!     vec![vec![0, 1, 2], vec![0, 2, 3]],
//! )?;
//! let field = LevelSetField::interpolate(&mesh, |p| p[0] - 0.5);
//! let info = CutInfo::new(&mesh, &field, &CutConfig::default())?;
//! assert_eq!(info.elements_of_type(CombinedDomainType::If).count_ones(), 2);
//! assert!((info.kappa_neg(0) - 0.25).abs() < 1e-14);
//! # Ok::<(), CutError>(())
//! ```
//!
//! ## Versioning
//!
//! Derived data (classification, cut ratios, assembled systems) records the
//! [`FieldStamp`](data::level_set::FieldStamp) of the level-set field it was
//! computed from. Mutating the field bumps its generation, and consumers fail
//! with [`CutError::StaleClassification`](cut_error::CutError) instead of
//! mixing generations.
//!
//! ## Parallelism
//!
//! With the `rayon` feature, classification, cut ratios and local assembly run
//! on the rayon pool; results are identical to the serial path.

pub mod algs;
pub mod config;
pub mod cut_error;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::assembly::{
        AssembledSystem, ElementContext, ElementIntegrator, FacetContext, FacetIntegrator,
        LocalContribution, NoFacetIntegrator, RestrictedAssembler,
    };
    pub use crate::algs::classify::Classification;
    pub use crate::algs::cut_info::{CutInfo, SharedCutInfo};
    pub use crate::algs::cut_ratio::CutRatios;
    pub use crate::algs::dofs::{CompressedSpace, compress, dofs_of_elements, dofs_of_facets};
    pub use crate::algs::enrichment::EnrichedSpace;
    pub use crate::algs::facet_marker::{
        RingExpansion, elements_with_neighbor_facets, facets_with_neighbor_types,
        ghost_penalty_facets, grow_elements,
    };
    pub use crate::config::{CutConfig, DegeneratePolicy};
    pub use crate::cut_error::CutError;
    pub use crate::data::bitset::BitSet;
    pub use crate::data::level_set::{FieldStamp, LevelSetField};
    pub use crate::data::space::{DofMapSpace, FeSpace};
    pub use crate::data::sparse::{CsrMatrix, SparsityPattern};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::decomposition::{SubSimplex, decompose, side_measure};
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::domain_type::{CombinedDomainType, DomainType};
    pub use crate::topology::mesh::{FacetNeighbors, MeshId, MeshTopology, UnstructuredMesh};
}
