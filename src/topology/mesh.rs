//! Mesh provider interface and an in-memory implementation.
//!
//! The engine consumes meshes only through [`MeshTopology`]: element-to-vertex
//! connectivity, facet-to-element adjacency and vertex coordinates. Elements,
//! facets and vertices are identified by dense `usize` indices so that
//! per-entity data can live in flat vectors and [`BitSet`](crate::data::bitset::BitSet)s.
//!
//! [`UnstructuredMesh`] derives facets from element connectivity and rejects
//! non-manifold input.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use itertools::Itertools;

use crate::cut_error::CutError;
use crate::topology::cell_type::CellType;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mesh, used to detect spaces and masks built
/// on a different mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    /// Allocates a fresh identity.
    pub fn fresh() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// Elements incident to a facet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FacetNeighbors {
    /// Boundary facet with its single element.
    Boundary(usize),
    /// Interior facet with its left and right element.
    Interior(usize, usize),
}

impl FacetNeighbors {
    /// The first incident element.
    #[inline]
    pub fn left(self) -> usize {
        match self {
            FacetNeighbors::Boundary(l) | FacetNeighbors::Interior(l, _) => l,
        }
    }

    /// The second incident element, if any.
    #[inline]
    pub fn right(self) -> Option<usize> {
        match self {
            FacetNeighbors::Boundary(_) => None,
            FacetNeighbors::Interior(_, r) => Some(r),
        }
    }

    #[inline]
    pub fn is_boundary(self) -> bool {
        matches!(self, FacetNeighbors::Boundary(_))
    }

    /// Iterates over the one or two incident elements.
    pub fn elements(self) -> impl Iterator<Item = usize> {
        std::iter::once(self.left()).chain(self.right())
    }
}

/// Narrow mesh interface consumed by the engine.
pub trait MeshTopology: Sync {
    /// Identity used for consistency checks.
    fn mesh_id(&self) -> MeshId;
    fn num_vertices(&self) -> usize;
    fn num_elements(&self) -> usize;
    fn num_facets(&self) -> usize;
    /// Shape of `element`.
    fn cell_type(&self, element: usize) -> CellType;
    /// Vertex indices of `element` in reference order.
    fn element_vertices(&self, element: usize) -> &[usize];
    /// Vertex indices of `facet`.
    fn facet_vertices(&self, facet: usize) -> &[usize];
    /// Incident elements of `facet`.
    fn facet_neighbors(&self, facet: usize) -> FacetNeighbors;
    /// Coordinates of `vertex`; unused trailing components are zero.
    fn vertex_coordinates(&self, vertex: usize) -> [f64; 3];

    /// Gathers the vertex coordinates of `element`.
    fn element_coordinates(&self, element: usize) -> Vec<[f64; 3]> {
        self.element_vertices(element)
            .iter()
            .map(|&v| self.vertex_coordinates(v))
            .collect()
    }
}

/// In-memory mesh with a single cell type and derived facets.
#[derive(Clone, Debug)]
pub struct UnstructuredMesh {
    id: MeshId,
    cell_type: CellType,
    coordinates: Vec<[f64; 3]>,
    cells: Vec<usize>,
    facet_offsets: Vec<usize>,
    facet_vertex_ids: Vec<usize>,
    facet_neighbors: Vec<FacetNeighbors>,
    element_facets: Vec<usize>,
}

impl UnstructuredMesh {
    /// Builds a mesh from vertex coordinates and per-cell vertex lists.
    ///
    /// Facets are numbered in order of first appearance while walking cells in
    /// order and local facets in reference order, so numbering is deterministic.
    pub fn new(
        cell_type: CellType,
        coordinates: Vec<[f64; 3]>,
        cells: Vec<Vec<usize>>,
    ) -> Result<Self, CutError> {
        let nv = coordinates.len();
        let nvc = cell_type.vertex_count();
        let mut flat = Vec::with_capacity(cells.len() * nvc);
        for (e, cell) in cells.iter().enumerate() {
            if cell.len() != nvc {
                return Err(CutError::InvalidMesh(format!(
                    "element {e}: expected {nvc} vertices, got {}",
                    cell.len()
                )));
            }
            if let Some(&v) = cell.iter().find(|&&v| v >= nv) {
                return Err(CutError::IndexOutOfBounds {
                    what: "vertex",
                    index: v,
                    len: nv,
                });
            }
            if !cell.iter().all_unique() {
                return Err(CutError::InvalidMesh(format!(
                    "element {e} repeats a vertex: {cell:?}"
                )));
            }
            flat.extend_from_slice(cell);
        }

        let local = cell_type.local_facets();
        let mut lookup: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut facet_offsets = vec![0];
        let mut facet_vertex_ids = Vec::new();
        let mut facet_neighbors: Vec<FacetNeighbors> = Vec::new();
        let mut element_facets = Vec::with_capacity(cells.len() * local.len());

        for (e, cell) in cells.iter().enumerate() {
            for lf in local {
                let verts: Vec<usize> = lf.iter().map(|&i| cell[i]).collect();
                let key: Vec<usize> = verts.iter().copied().sorted_unstable().collect();
                let facet = match lookup.get(&key) {
                    Some(&f) => {
                        facet_neighbors[f] = match facet_neighbors[f] {
                            FacetNeighbors::Boundary(l) => FacetNeighbors::Interior(l, e),
                            FacetNeighbors::Interior(..) => {
                                return Err(CutError::InvalidMesh(format!(
                                    "facet {key:?} has more than two incident elements"
                                )));
                            }
                        };
                        f
                    }
                    None => {
                        let f = facet_neighbors.len();
                        lookup.insert(key, f);
                        facet_vertex_ids.extend_from_slice(&verts);
                        facet_offsets.push(facet_vertex_ids.len());
                        facet_neighbors.push(FacetNeighbors::Boundary(e));
                        f
                    }
                };
                element_facets.push(facet);
            }
        }

        log::debug!(
            "built {:?} mesh: {} vertices, {} elements, {} facets",
            cell_type,
            nv,
            cells.len(),
            facet_neighbors.len()
        );

        Ok(Self {
            id: MeshId::fresh(),
            cell_type,
            coordinates,
            cells: flat,
            facet_offsets,
            facet_vertex_ids,
            facet_neighbors,
            element_facets,
        })
    }

    /// Convenience constructor for 2D coordinates.
    pub fn from_planar(
        cell_type: CellType,
        coordinates: &[[f64; 2]],
        cells: Vec<Vec<usize>>,
    ) -> Result<Self, CutError> {
        let coords = coordinates.iter().map(|&[x, y]| [x, y, 0.0]).collect();
        Self::new(cell_type, coords, cells)
    }

    /// The common cell type.
    pub fn uniform_cell_type(&self) -> CellType {
        self.cell_type
    }

    /// Facets of `element`, in the order of [`CellType::local_facets`].
    pub fn element_facets(&self, element: usize) -> &[usize] {
        let n = self.cell_type.local_facets().len();
        &self.element_facets[element * n..(element + 1) * n]
    }

    /// Facets with a single incident element.
    pub fn boundary_facets(&self) -> impl Iterator<Item = usize> + '_ {
        self.facet_neighbors
            .iter()
            .positions(|nb| nb.is_boundary())
    }
}

impl MeshTopology for UnstructuredMesh {
    fn mesh_id(&self) -> MeshId {
        self.id
    }

    fn num_vertices(&self) -> usize {
        self.coordinates.len()
    }

    fn num_elements(&self) -> usize {
        self.cells.len() / self.cell_type.vertex_count()
    }

    fn num_facets(&self) -> usize {
        self.facet_neighbors.len()
    }

    fn cell_type(&self, _element: usize) -> CellType {
        self.cell_type
    }

    fn element_vertices(&self, element: usize) -> &[usize] {
        let n = self.cell_type.vertex_count();
        &self.cells[element * n..(element + 1) * n]
    }

    fn facet_vertices(&self, facet: usize) -> &[usize] {
        &self.facet_vertex_ids[self.facet_offsets[facet]..self.facet_offsets[facet + 1]]
    }

    fn facet_neighbors(&self, facet: usize) -> FacetNeighbors {
        self.facet_neighbors[facet]
    }

    fn vertex_coordinates(&self, vertex: usize) -> [f64; 3] {
        self.coordinates[vertex]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> UnstructuredMesh {
        UnstructuredMesh::from_planar(
            CellType::Triangle,
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![vec![0, 1, 2], vec![0, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn facets_are_shared_once() {
        let mesh = two_triangles();
        assert_eq!(mesh.num_elements(), 2);
        assert_eq!(mesh.num_facets(), 5);
        let interior: Vec<_> = (0..mesh.num_facets())
            .filter(|&f| !mesh.facet_neighbors(f).is_boundary())
            .collect();
        assert_eq!(interior.len(), 1);
        let f = interior[0];
        assert_eq!(mesh.facet_neighbors(f), FacetNeighbors::Interior(0, 1));
        let mut verts = mesh.facet_vertices(f).to_vec();
        verts.sort_unstable();
        assert_eq!(verts, vec![0, 2]);
        assert_eq!(mesh.boundary_facets().count(), 4);
    }

    #[test]
    fn element_facets_follow_local_order() {
        let mesh = two_triangles();
        let f = mesh.element_facets(0);
        assert_eq!(f.len(), 3);
        // facet opposite vertex 1 of element 0 is the diagonal 0-2
        assert_eq!(mesh.facet_neighbors(f[1]), FacetNeighbors::Interior(0, 1));
    }

    #[test]
    fn non_manifold_facet_is_rejected() {
        let err = UnstructuredMesh::from_planar(
            CellType::Triangle,
            &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, -1.0], [-1.0, 0.0]],
            vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 1, 4]],
        )
        .unwrap_err();
        assert!(matches!(err, CutError::InvalidMesh(_)));
    }

    #[test]
    fn bad_connectivity_is_rejected() {
        let coords = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let err = UnstructuredMesh::from_planar(CellType::Triangle, &coords, vec![vec![0, 1, 5]])
            .unwrap_err();
        assert_eq!(
            err,
            CutError::IndexOutOfBounds {
                what: "vertex",
                index: 5,
                len: 3
            }
        );
        let err = UnstructuredMesh::from_planar(CellType::Triangle, &coords, vec![vec![0, 1]])
            .unwrap_err();
        assert!(matches!(err, CutError::InvalidMesh(_)));
        let err = UnstructuredMesh::from_planar(CellType::Triangle, &coords, vec![vec![0, 1, 1]])
            .unwrap_err();
        assert!(matches!(err, CutError::InvalidMesh(_)));
    }

    #[test]
    fn mesh_ids_are_unique() {
        assert_ne!(two_triangles().mesh_id(), two_triangles().mesh_id());
    }

    #[test]
    fn facet_neighbors_iterate_in_order() {
        assert_eq!(
            FacetNeighbors::Interior(3, 1).elements().collect::<Vec<_>>(),
            vec![3, 1]
        );
        assert_eq!(FacetNeighbors::Boundary(2).elements().collect::<Vec<_>>(), vec![2]);
    }
}
