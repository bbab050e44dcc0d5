//! Top-level module for mesh topology abstractions.
//!
//! This module provides the narrow mesh interface the engine consumes and the
//! classification vocabulary shared by every algorithm:
//! - [`MeshTopology`] and the in-memory [`UnstructuredMesh`]
//! - [`CellType`] with local facet tables
//! - [`DomainType`] and [`CombinedDomainType`] for sign-based queries

pub mod cell_type;
pub mod domain_type;
pub mod mesh;

pub use cell_type::CellType;
pub use domain_type::{CombinedDomainType, DomainType};
pub use mesh::{FacetNeighbors, MeshId, MeshTopology, UnstructuredMesh};
