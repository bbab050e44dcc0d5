//! Sign-filtered enrichment of a vertex-based space on cut elements.
//!
//! Every standard dof supported on at least one cut element gets exactly one
//! enrichment dof. Its basis function is the standard one restricted to the
//! side of the interface *opposite* to the dof's own vertex: a vertex with
//! `φ >= 0` lies on the positive side, so its enrichment lives on the negative
//! side, and vice versa. With this tagging the sided fields are
//!
//! ```text
//! u₋ = u_std + neg(u_x)
//! u₊ = u_std + pos(u_x)
//! ```
//!
//! where `neg`/`pos` zero the enrichment coefficients tagged for the other side.

use crate::algs::cut_info::CutInfo;
use crate::algs::dofs::dofs_of_elements;
use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::data::level_set::LevelSetField;
use crate::data::space::FeSpace;
use crate::topology::domain_type::{CombinedDomainType, DomainType};
use crate::topology::mesh::MeshTopology;

/// Enrichment dofs attached to a standard space.
#[derive(Clone, Debug)]
pub struct EnrichedSpace {
    standard_ndof: usize,
    active: BitSet,
    std_to_x: Vec<Option<usize>>,
    x_to_std: Vec<usize>,
    sides: Vec<DomainType>,
    elem_offsets: Vec<usize>,
    elem_xdofs: Vec<usize>,
}

impl EnrichedSpace {
    /// Builds the enrichment of `space` for the cut elements in `info`.
    ///
    /// `space` must attach its dofs to vertices; `info` must be current
    /// for `field`.
    pub fn build<M, S>(
        mesh: &M,
        space: &S,
        info: &CutInfo,
        field: &LevelSetField,
    ) -> Result<Self, CutError>
    where
        M: MeshTopology + ?Sized,
        S: FeSpace,
    {
        space.check_mesh(mesh)?;
        info.ensure_current(field)?;
        info.classification().check_mesh(mesh)?;

        let cut = info.elements_of_type(CombinedDomainType::If);
        let active = dofs_of_elements(space, &cut)?;

        let mut std_to_x = vec![None; space.ndof()];
        let mut x_to_std = Vec::with_capacity(active.count_ones());
        let mut sides = Vec::with_capacity(active.count_ones());
        for d in active.iter_ones() {
            let vertex = space.dof_vertex(d).ok_or_else(|| {
                CutError::InconsistentSpace(format!("dof {d} is not attached to a vertex"))
            })?;
            let side = if field.value(vertex)? >= 0.0 {
                DomainType::Neg
            } else {
                DomainType::Pos
            };
            std_to_x[d] = Some(x_to_std.len());
            x_to_std.push(d);
            sides.push(side);
        }

        let mut elem_offsets = Vec::with_capacity(mesh.num_elements() + 1);
        elem_offsets.push(0);
        let mut elem_xdofs = Vec::new();
        for e in 0..mesh.num_elements() {
            if cut.get(e) {
                elem_xdofs.extend(space.element_dofs(e).iter().filter_map(|&d| std_to_x[d]));
            }
            elem_offsets.push(elem_xdofs.len());
        }

        log::debug!(
            "enriched {} of {} dofs on {} cut elements",
            x_to_std.len(),
            space.ndof(),
            cut.count_ones()
        );
        Ok(Self {
            standard_ndof: space.ndof(),
            active,
            std_to_x,
            x_to_std,
            sides,
            elem_offsets,
            elem_xdofs,
        })
    }

    /// Number of enrichment dofs.
    #[inline]
    pub fn ndof(&self) -> usize {
        self.x_to_std.len()
    }

    #[inline]
    pub fn standard_ndof(&self) -> usize {
        self.standard_ndof
    }

    /// Enrichment dof of a standard dof, if it is enriched.
    pub fn xdof_of(&self, std_dof: usize) -> Option<usize> {
        self.std_to_x.get(std_dof).copied().flatten()
    }

    /// Standard dof an enrichment dof duplicates.
    ///
    /// # Panics
    /// Panics if `xdof >= self.ndof()`.
    pub fn std_dof_of(&self, xdof: usize) -> usize {
        self.x_to_std[xdof]
    }

    /// Side on which the basis function of `xdof` lives.
    ///
    /// # Panics
    /// Panics if `xdof >= self.ndof()`.
    pub fn side_of(&self, xdof: usize) -> DomainType {
        self.sides[xdof]
    }

    /// Enrichment dofs of `element`; empty unless the element is cut.
    pub fn element_xdofs(&self, element: usize) -> &[usize] {
        &self.elem_xdofs[self.elem_offsets[element]..self.elem_offsets[element + 1]]
    }

    /// Standard dofs that carry an enrichment.
    pub fn active_std_dofs(&self) -> &BitSet {
        &self.active
    }

    /// Keeps only the coefficients whose basis lives on the negative side.
    pub fn neg(&self, u_x: &[f64]) -> Result<Vec<f64>, CutError> {
        self.filter(u_x, DomainType::Neg)
    }

    /// Keeps only the coefficients whose basis lives on the positive side.
    pub fn pos(&self, u_x: &[f64]) -> Result<Vec<f64>, CutError> {
        self.filter(u_x, DomainType::Pos)
    }

    /// Standard-numbered coefficients of the field on `side`:
    /// `u_std + filter(u_x)` with each enrichment added to its standard dof.
    pub fn side_coefficients(
        &self,
        u_std: &[f64],
        u_x: &[f64],
        side: DomainType,
    ) -> Result<Vec<f64>, CutError> {
        if u_std.len() != self.standard_ndof {
            return Err(CutError::SizeMismatch {
                what: "standard coefficients",
                expected: self.standard_ndof,
                found: u_std.len(),
            });
        }
        let filtered = self.filter(u_x, side)?;
        let mut out = u_std.to_vec();
        for (x, v) in filtered.into_iter().enumerate() {
            out[self.x_to_std[x]] += v;
        }
        Ok(out)
    }

    fn filter(&self, u_x: &[f64], side: DomainType) -> Result<Vec<f64>, CutError> {
        if !side.is_side() {
            return Err(CutError::InconsistentSpace(
                "enrichment coefficients exist only for NEG and POS".into(),
            ));
        }
        if u_x.len() != self.ndof() {
            return Err(CutError::SizeMismatch {
                what: "enrichment coefficients",
                expected: self.ndof(),
                found: u_x.len(),
            });
        }
        Ok(u_x
            .iter()
            .zip(&self.sides)
            .map(|(&v, &s)| if s == side { v } else { 0.0 })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CutConfig;
    use crate::data::space::DofMapSpace;
    use crate::topology::cell_type::CellType;
    use crate::topology::mesh::UnstructuredMesh;

    fn setup() -> (UnstructuredMesh, DofMapSpace, LevelSetField, CutInfo) {
        let coords = (0..5).map(|i| [i as f64, 0.0, 0.0]).collect();
        let cells = (0..4).map(|i| vec![i, i + 1]).collect();
        let mesh = UnstructuredMesh::new(CellType::Segment, coords, cells).unwrap();
        let space = DofMapSpace::p1(&mesh);
        let field = LevelSetField::interpolate(&mesh, |p| p[0] - 1.5);
        let info = CutInfo::new(&mesh, &field, &CutConfig::default()).unwrap();
        (mesh, space, field, info)
    }

    #[test]
    fn one_cut_element_enriches_its_dofs() {
        let (mesh, space, field, info) = setup();
        let x = EnrichedSpace::build(&mesh, &space, &info, &field).unwrap();
        assert_eq!(x.ndof(), 2);
        assert_eq!(x.standard_ndof(), 5);
        assert_eq!(x.active_std_dofs().iter_ones().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(x.xdof_of(0), None);
        assert_eq!(x.std_dof_of(x.xdof_of(2).unwrap()), 2);
        // vertex 1 is negative, its enrichment lives on the positive side
        assert_eq!(x.side_of(0), DomainType::Pos);
        assert_eq!(x.side_of(1), DomainType::Neg);
        assert_eq!(x.element_xdofs(1), &[0, 1]);
        assert!(x.element_xdofs(0).is_empty());
    }

    #[test]
    fn side_fields() {
        let (mesh, space, field, info) = setup();
        let x = EnrichedSpace::build(&mesh, &space, &info, &field).unwrap();
        let u_std = [1.0, 1.0, 1.0, 1.0, 1.0];
        let u_x = [10.0, 20.0];
        assert_eq!(x.neg(&u_x).unwrap(), vec![0.0, 20.0]);
        assert_eq!(x.pos(&u_x).unwrap(), vec![10.0, 0.0]);
        assert_eq!(
            x.side_coefficients(&u_std, &u_x, DomainType::Neg).unwrap(),
            vec![1.0, 1.0, 21.0, 1.0, 1.0]
        );
        assert_eq!(
            x.side_coefficients(&u_std, &u_x, DomainType::Pos).unwrap(),
            vec![1.0, 11.0, 1.0, 1.0, 1.0]
        );
        assert!(x.neg(&[1.0]).is_err());
        assert!(x.side_coefficients(&u_std, &u_x, DomainType::If).is_err());
    }

    #[test]
    fn element_space_is_rejected() {
        let (mesh, _, field, info) = setup();
        let p0 = DofMapSpace::p0(&mesh);
        let err = EnrichedSpace::build(&mesh, &p0, &info, &field).unwrap_err();
        assert!(matches!(err, CutError::InconsistentSpace(_)));
    }

    #[test]
    fn uncut_field_has_no_enrichment() {
        let (mesh, space, _, _) = setup();
        let field = LevelSetField::new(vec![-1.0; 5]);
        let info = CutInfo::new(&mesh, &field, &CutConfig::default()).unwrap();
        let x = EnrichedSpace::build(&mesh, &space, &info, &field).unwrap();
        assert_eq!(x.ndof(), 0);
        assert!(x.active_std_dofs().none());
    }
}
