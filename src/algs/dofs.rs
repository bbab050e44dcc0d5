//! Dof selection by element/facet masks and compression onto active dofs.

use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::data::space::FeSpace;
use crate::topology::mesh::{MeshId, MeshTopology};

/// Dofs touched by at least one element in `elements`.
///
/// Constrained dofs are included; intersect with
/// [`FeSpace::free_dofs`] to drop them.
///
/// A [`BitSet`] carries no mesh identity, so only its length is checked
/// against the space; a mask built for another mesh with the same element
/// count is not detected.
pub fn dofs_of_elements<S>(space: &S, elements: &BitSet) -> Result<BitSet, CutError>
where
    S: FeSpace + ?Sized,
{
    if elements.len() != space.num_elements() {
        return Err(CutError::InconsistentSpace(format!(
            "element mask of length {} for a space on {} elements",
            elements.len(),
            space.num_elements()
        )));
    }
    let mut out = BitSet::new(space.ndof());
    for e in elements.iter_ones() {
        for &d in space.element_dofs(e) {
            out.try_set(d)?;
        }
    }
    Ok(out)
}

/// Dofs of all elements incident to a facet in `facets`.
pub fn dofs_of_facets<S, M>(space: &S, mesh: &M, facets: &BitSet) -> Result<BitSet, CutError>
where
    S: FeSpace,
    M: MeshTopology + ?Sized,
{
    space.check_mesh(mesh)?;
    if facets.len() != mesh.num_facets() {
        return Err(CutError::InconsistentSpace(format!(
            "facet mask of length {} for a mesh with {} facets",
            facets.len(),
            mesh.num_facets()
        )));
    }
    let mut elements = BitSet::new(mesh.num_elements());
    for f in facets.iter_ones() {
        for e in mesh.facet_neighbors(f).elements() {
            elements.set(e);
        }
    }
    dofs_of_elements(space, &elements)
}

/// Renumbers the dofs of `space` marked in `active` as `0..popcount(active)`,
/// preserving their relative order.
///
/// Fails with `InconsistentSpace` when `active` does not have one bit per dof;
/// as with [`dofs_of_elements`], the mask itself is not tied to a mesh.
pub fn compress<S>(space: &S, active: &BitSet) -> Result<CompressedSpace, CutError>
where
    S: FeSpace + ?Sized,
{
    if active.len() != space.ndof() {
        return Err(CutError::InconsistentSpace(format!(
            "active mask of length {} for a space with {} dofs",
            active.len(),
            space.ndof()
        )));
    }
    let mut old_to_new = vec![None; space.ndof()];
    let new_to_old: Vec<usize> = active.iter_ones().collect();
    for (new, &old) in new_to_old.iter().enumerate() {
        old_to_new[old] = Some(new);
    }

    let ne = space.num_elements();
    let mut offsets = Vec::with_capacity(ne + 1);
    let mut local_offsets = Vec::with_capacity(ne + 1);
    offsets.push(0);
    local_offsets.push(0);
    let mut dofs = Vec::new();
    let mut local_maps = Vec::new();
    for e in 0..ne {
        for &d in space.element_dofs(e) {
            let mapped = old_to_new[d];
            local_maps.push(mapped);
            dofs.extend(mapped);
        }
        offsets.push(dofs.len());
        local_offsets.push(local_maps.len());
    }

    let free_full = space.free_dofs();
    let free = BitSet::from_bools(
        &new_to_old
            .iter()
            .map(|&old| free_full.get(old))
            .collect::<Vec<_>>(),
    );
    let dof_vertices = new_to_old.iter().map(|&old| space.dof_vertex(old)).collect();

    log::debug!(
        "compressed {} dofs to {} active",
        space.ndof(),
        new_to_old.len()
    );
    Ok(CompressedSpace {
        mesh_id: space.mesh_id(),
        full_ndof: space.ndof(),
        old_to_new,
        new_to_old,
        offsets,
        dofs,
        local_offsets,
        local_maps,
        free,
        dof_vertices,
    })
}

/// A space restricted to a subset of the dofs of another space.
#[derive(Clone, Debug)]
pub struct CompressedSpace {
    mesh_id: MeshId,
    full_ndof: usize,
    old_to_new: Vec<Option<usize>>,
    new_to_old: Vec<usize>,
    offsets: Vec<usize>,
    dofs: Vec<usize>,
    local_offsets: Vec<usize>,
    local_maps: Vec<Option<usize>>,
    free: BitSet,
    dof_vertices: Vec<Option<usize>>,
}

impl CompressedSpace {
    /// Compressed index of a dof of the original space; `None` if inactive.
    #[inline]
    pub fn old_to_new(&self, old: usize) -> Option<usize> {
        self.old_to_new.get(old).copied().flatten()
    }

    /// Original index of a compressed dof.
    ///
    /// # Panics
    /// Panics if `new >= self.ndof()`.
    #[inline]
    pub fn new_to_old(&self, new: usize) -> usize {
        self.new_to_old[new]
    }

    /// Dof count of the original space.
    #[inline]
    pub fn full_ndof(&self) -> usize {
        self.full_ndof
    }

    /// Compressed indices aligned with the original element dofs of `element`;
    /// inactive positions are `None`.
    pub fn local_map(&self, element: usize) -> &[Option<usize>] {
        &self.local_maps[self.local_offsets[element]..self.local_offsets[element + 1]]
    }

    /// Picks the active entries of a full-length vector.
    pub fn restrict_vector(&self, full: &[f64]) -> Result<Vec<f64>, CutError> {
        if full.len() != self.full_ndof {
            return Err(CutError::SizeMismatch {
                what: "full vector",
                expected: self.full_ndof,
                found: full.len(),
            });
        }
        Ok(self.new_to_old.iter().map(|&old| full[old]).collect())
    }

    /// Scatters a compressed vector into a full-length one; inactive entries are zero.
    pub fn extend_vector(&self, compressed: &[f64]) -> Result<Vec<f64>, CutError> {
        if compressed.len() != self.new_to_old.len() {
            return Err(CutError::SizeMismatch {
                what: "compressed vector",
                expected: self.new_to_old.len(),
                found: compressed.len(),
            });
        }
        let mut full = vec![0.0; self.full_ndof];
        for (&old, &v) in self.new_to_old.iter().zip(compressed) {
            full[old] = v;
        }
        Ok(full)
    }
}

impl FeSpace for CompressedSpace {
    fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    fn ndof(&self) -> usize {
        self.new_to_old.len()
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
        self.dof_vertices.get(dof).copied().flatten()
    }
}
