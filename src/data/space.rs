//! Finite-element space provider interface.
//!
//! The engine needs very little from a space: per-element local-to-global dof
//! maps, the total dof count, a free-dof (non-Dirichlet) mask, and, for the
//! enrichment builder, the vertex a dof is attached to. [`DofMapSpace`] is a
//! plain table-backed implementation that covers P1 and element-wise (P0)
//! layouts and any externally numbered space.

use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::topology::mesh::{MeshId, MeshTopology};

/// Narrow FE-space interface consumed by the engine.
pub trait FeSpace: Sync {
    /// Mesh the space is defined on.
    fn mesh_id(&self) -> MeshId;
    /// Number of global dofs.
    fn ndof(&self) -> usize;
    /// Number of elements covered by the dof map.
    fn num_elements(&self) -> usize;
    /// Global dofs of `element`.
    fn element_dofs(&self, element: usize) -> &[usize];
    /// Dofs that are not constrained (Dirichlet).
    fn free_dofs(&self) -> &BitSet;
    /// The vertex a dof is attached to, for vertex-based spaces.
    fn dof_vertex(&self, _dof: usize) -> Option<usize> {
        None
    }

    /// Fails with `InconsistentSpace` unless the space lives on `mesh`.
    fn check_mesh<M: MeshTopology + ?Sized>(&self, mesh: &M) -> Result<(), CutError>
    where
        Self: Sized,
    {
        if self.mesh_id() != mesh.mesh_id() || self.num_elements() != mesh.num_elements() {
            return Err(CutError::InconsistentSpace(format!(
                "space on {} with {} elements used with {} with {} elements",
                self.mesh_id(),
                self.num_elements(),
                mesh.mesh_id(),
                mesh.num_elements()
            )));
        }
        Ok(())
    }
}

/// Table-backed dof map.
#[derive(Clone, Debug)]
pub struct DofMapSpace {
    mesh_id: MeshId,
    ndof: usize,
    offsets: Vec<usize>,
    dofs: Vec<usize>,
    free: BitSet,
    dof_vertices: Option<Vec<usize>>,
}

impl DofMapSpace {
    /// Continuous piecewise-linear space: one dof per vertex, dof `i` on vertex `i`.
    pub fn p1<M: MeshTopology + ?Sized>(mesh: &M) -> Self {
        let element_dofs = (0..mesh.num_elements())
            .map(|e| mesh.element_vertices(e).to_vec())
            .collect();
        let n = mesh.num_vertices();
        Self::build(mesh.mesh_id(), n, element_dofs, Some((0..n).collect()))
    }

    /// Element-wise constant space: one dof per element.
    pub fn p0<M: MeshTopology + ?Sized>(mesh: &M) -> Self {
        let n = mesh.num_elements();
        Self::build(mesh.mesh_id(), n, (0..n).map(|e| vec![e]).collect(), None)
    }

    /// Space from explicit per-element dof lists.
    pub fn from_element_dofs<M: MeshTopology + ?Sized>(
        mesh: &M,
        ndof: usize,
        element_dofs: Vec<Vec<usize>>,
    ) -> Result<Self, CutError> {
        if element_dofs.len() != mesh.num_elements() {
            return Err(CutError::SizeMismatch {
                what: "element dof lists",
                expected: mesh.num_elements(),
                found: element_dofs.len(),
            });
        }
        if let Some(&d) = element_dofs.iter().flatten().find(|&&d| d >= ndof) {
            return Err(CutError::IndexOutOfBounds {
                what: "dof",
                index: d,
                len: ndof,
            });
        }
        Ok(Self::build(mesh.mesh_id(), ndof, element_dofs, None))
    }

    /// Marks the dofs of all boundary-facet vertices as constrained.
    ///
    /// Requires a vertex-based space.
    pub fn with_boundary_dirichlet<M: MeshTopology + ?Sized>(
        mut self,
        mesh: &M,
    ) -> Result<Self, CutError> {
        let Some(dof_vertices) = &self.dof_vertices else {
            return Err(CutError::InconsistentSpace(
                "boundary Dirichlet marking needs a vertex-based space".into(),
            ));
        };
        let mut on_boundary = BitSet::new(mesh.num_vertices());
        for f in (0..mesh.num_facets()).filter(|&f| mesh.facet_neighbors(f).is_boundary()) {
            for &v in mesh.facet_vertices(f) {
                on_boundary.set(v);
            }
        }
        for (dof, &v) in dof_vertices.iter().enumerate() {
            if on_boundary.get(v) {
                self.free.unset(dof);
            }
        }
        Ok(self)
    }

    /// Marks the given dofs as constrained.
    pub fn with_dirichlet_dofs<I>(mut self, dofs: I) -> Result<Self, CutError>
    where
        I: IntoIterator<Item = usize>,
    {
        for d in dofs {
            if d >= self.ndof {
                return Err(CutError::IndexOutOfBounds {
                    what: "dof",
                    index: d,
                    len: self.ndof,
                });
            }
            self.free.unset(d);
        }
        Ok(self)
    }

    fn build(
        mesh_id: MeshId,
        ndof: usize,
        element_dofs: Vec<Vec<usize>>,
        dof_vertices: Option<Vec<usize>>,
    ) -> Self {
        let mut offsets = Vec::with_capacity(element_dofs.len() + 1);
        offsets.push(0);
        let mut dofs = Vec::new();
        for list in element_dofs {
            dofs.extend(list);
            offsets.push(dofs.len());
        }
        Self {
            mesh_id,
            ndof,
            offsets,
            dofs,
            free: BitSet::full(ndof),
            dof_vertices,
        }
    }
}

impl FeSpace for DofMapSpace {
    fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    fn ndof(&self) -> usize {
        self.ndof
    }

    fn num_elements(&self) -> usize {
        self.offsets.len() - 1
    }

    fn element_dofs(&self, element: usize) -> &[usize] {
        &self.dofs[self.offsets[element]..self.offsets[element + 1]]
    }

    fn free_dofs(&self) -> &BitSet {
        &self.free
    }

    fn dof_vertex(&self, dof: usize) -> Option<usize> {
        self.dof_vertices.as_ref().and_then(|v| v.get(dof).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::cell_type::CellType;
    use crate::topology::mesh::UnstructuredMesh;

    fn square() -> UnstructuredMesh {
        UnstructuredMesh::from_planar(
            CellType::Triangle,
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]],
            vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![3, 0, 4]],
        )
        .unwrap()
    }

    #[test]
    fn p1_dofs_are_vertices() {
        let mesh = square();
        let space = DofMapSpace::p1(&mesh);
        assert_eq!(space.ndof(), 5);
        assert_eq!(space.element_dofs(2), &[2, 3, 4]);
        assert_eq!(space.dof_vertex(4), Some(4));
        assert!(space.free_dofs().all());
        space.check_mesh(&mesh).unwrap();
    }

    #[test]
    fn boundary_dirichlet_frees_only_center() {
        let mesh = square();
        let space = DofMapSpace::p1(&mesh).with_boundary_dirichlet(&mesh).unwrap();
        assert_eq!(space.free_dofs().iter_ones().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn p0_has_no_vertex_attachment() {
        let mesh = square();
        let space = DofMapSpace::p0(&mesh);
        assert_eq!(space.ndof(), 4);
        assert_eq!(space.dof_vertex(0), None);
        assert!(space.with_boundary_dirichlet(&mesh).is_err());
    }

    #[test]
    fn foreign_mesh_is_inconsistent() {
        let space = DofMapSpace::p1(&square());
        let err = space.check_mesh(&square()).unwrap_err();
        assert!(matches!(err, CutError::InconsistentSpace(_)));
    }

    #[test]
    fn explicit_dofs_are_validated() {
        let mesh = square();
        assert!(DofMapSpace::from_element_dofs(&mesh, 3, vec![vec![0]; 3]).is_err());
        assert!(DofMapSpace::from_element_dofs(&mesh, 3, vec![vec![0], vec![1], vec![2], vec![3]]).is_err());
        let s = DofMapSpace::from_element_dofs(&mesh, 4, vec![vec![0], vec![1], vec![2], vec![3]])
            .unwrap()
            .with_dirichlet_dofs([1])
            .unwrap();
        assert!(!s.free_dofs().get(1));
        assert_eq!(s.free_dofs().count_ones(), 3);
    }
}
