//! Element and facet classification relative to the zero level of a field.
//!
//! An element is classified from the strict signs of the field at its
//! vertices:
//!
//! | some vertex `< 0` | some vertex `> 0` | type |
//! |---|---|---|
//! | yes | yes | `If` |
//! | yes | no  | `Neg` |
//! | no  | yes | `Pos` |
//! | no  | no  | degenerate, resolved to `Pos` |
//!
//! Exact zeros are neutral: an element whose values are `(-1, 0, -2)` is
//! `Neg` and merely touches the interface. An all-zero element lies inside the
//! interface; it is classified `Pos`, reported through `log::warn!` and
//! [`Classification::degenerate_elements`], or rejected under
//! [`DegeneratePolicy::Reject`].
//!
//! Facets combine the types of their incident elements: equal types are
//! inherited, mixed types give `If`, boundary facets inherit their single
//! neighbor's type.

use crate::algs::map_indexed;
use crate::config::{CutConfig, DegeneratePolicy};
use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::data::level_set::{FieldStamp, LevelSetField};
use crate::topology::domain_type::{CombinedDomainType, DomainType};
use crate::topology::mesh::{FacetNeighbors, MeshId, MeshTopology};

/// Classifies one element from its vertex values.
///
/// Returns `None` when every value is exactly zero.
pub fn classify_values<I>(values: I) -> Option<DomainType>
where
    I: IntoIterator<Item = f64>,
{
    let (mut has_neg, mut has_pos) = (false, false);
    for v in values {
        has_neg |= v < 0.0;
        has_pos |= v > 0.0;
    }
    match (has_neg, has_pos) {
        (true, true) => Some(DomainType::If),
        (true, false) => Some(DomainType::Neg),
        (false, true) => Some(DomainType::Pos),
        (false, false) => None,
    }
}

/// Type of a facet from the types of its incident elements.
pub fn combine_facet(left: DomainType, right: Option<DomainType>) -> DomainType {
    match right {
        None => left,
        Some(r) if r == left => left,
        Some(_) => DomainType::If,
    }
}

/// Type of `element` and whether it needed the all-zero tie-break.
pub(crate) fn classify_element<M>(
    mesh: &M,
    values: &[f64],
    element: usize,
    policy: DegeneratePolicy,
) -> Result<(DomainType, bool), CutError>
where
    M: MeshTopology + ?Sized,
{
    let verts = mesh.element_vertices(element);
    if let Some(&v) = verts.iter().find(|&&v| !values[v].is_finite()) {
        return Err(CutError::GeometryDegenerate {
            element,
            reason: format!("non-finite level-set value at vertex {v}"),
        });
    }
    match classify_values(verts.iter().map(|&v| values[v])) {
        Some(dt) => Ok((dt, false)),
        None if policy == DegeneratePolicy::Reject => Err(CutError::GeometryDegenerate {
            element,
            reason: "level set vanishes at every vertex".into(),
        }),
        None => Ok((DomainType::Pos, true)),
    }
}

/// Per-element and per-facet domain types derived from one field generation.
#[derive(Clone, Debug)]
pub struct Classification {
    elements: Vec<DomainType>,
    facets: Vec<DomainType>,
    degenerate: Vec<usize>,
    field_stamp: FieldStamp,
    mesh_id: MeshId,
    revision: u64,
}

impl Classification {
    /// Classifies all elements and facets of `mesh` under `field`.
    pub fn compute<M>(mesh: &M, field: &LevelSetField, config: &CutConfig) -> Result<Self, CutError>
    where
        M: MeshTopology + ?Sized,
    {
        field.check_mesh(mesh)?;
        let values = field.values();

        let per_element = map_indexed(mesh.num_elements(), |e| {
            classify_element(mesh, values, e, config.degenerate_policy)
        })?;

        let degenerate: Vec<usize> = per_element
            .iter()
            .enumerate()
            .filter_map(|(e, &(_, d))| d.then_some(e))
            .collect();
        if !degenerate.is_empty() {
            log::warn!(
                "{} element(s) with an all-zero level set classified POS by tie-break: {:?}",
                degenerate.len(),
                degenerate
            );
        }
        let elements: Vec<DomainType> = per_element.into_iter().map(|(dt, _)| dt).collect();

        let facets = (0..mesh.num_facets())
            .map(|f| match mesh.facet_neighbors(f) {
                FacetNeighbors::Boundary(l) => combine_facet(elements[l], None),
                FacetNeighbors::Interior(l, r) => combine_facet(elements[l], Some(elements[r])),
            })
            .collect();

        let out = Self {
            elements,
            facets,
            degenerate,
            field_stamp: field.stamp(),
            mesh_id: mesh.mesh_id(),
            revision: 0,
        };
        log::debug!(
            "classified {} elements from {}: {} NEG, {} POS, {} IF",
            out.num_elements(),
            out.field_stamp,
            out.count(CombinedDomainType::Neg),
            out.count(CombinedDomainType::Pos),
            out.count(CombinedDomainType::If),
        );
        Ok(out)
    }

    /// Recomputes everything from `field` and bumps [`revision`](Self::revision).
    ///
    /// On error `self` is left unchanged.
    pub fn update<M>(&mut self, mesh: &M, field: &LevelSetField, config: &CutConfig) -> Result<(), CutError>
    where
        M: MeshTopology + ?Sized,
    {
        let fresh = Self::compute(mesh, field, config)?;
        let revision = self.revision + 1;
        *self = Self { revision, ..fresh };
        Ok(())
    }

    /// Elements whose type matches `dt`.
    pub fn elements_of_type(&self, dt: CombinedDomainType) -> BitSet {
        mask_of(&self.elements, dt)
    }

    /// Facets whose type matches `dt`.
    pub fn facets_of_type(&self, dt: CombinedDomainType) -> BitSet {
        mask_of(&self.facets, dt)
    }

    /// Number of elements matching `dt`.
    pub fn count(&self, dt: CombinedDomainType) -> usize {
        self.elements.iter().filter(|&&t| dt.contains(t)).count()
    }

    /// Type of `element`.
    ///
    /// # Panics
    /// Panics if `element` is out of range.
    #[inline]
    pub fn element_type(&self, element: usize) -> DomainType {
        self.elements[element]
    }

    /// Type of `facet`.
    ///
    /// # Panics
    /// Panics if `facet` is out of range.
    #[inline]
    pub fn facet_type(&self, facet: usize) -> DomainType {
        self.facets[facet]
    }

    pub fn element_types(&self) -> &[DomainType] {
        &self.elements
    }

    pub fn facet_types(&self) -> &[DomainType] {
        &self.facets
    }

    #[inline]
    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn num_facets(&self) -> usize {
        self.facets.len()
    }

    /// Elements resolved by the all-zero tie-break.
    pub fn degenerate_elements(&self) -> &[usize] {
        &self.degenerate
    }

    /// Stamp of the field this classification was computed from.
    #[inline]
    pub fn field_stamp(&self) -> FieldStamp {
        self.field_stamp
    }

    /// Number of updates since construction.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }

    /// Fails with `StaleClassification` if `field` changed since classification.
    pub fn ensure_current(&self, field: &LevelSetField) -> Result<(), CutError> {
        self.field_stamp.ensure_matches(field.stamp())
    }

    /// Fails with `InconsistentSpace` if this classification belongs to another mesh.
    pub fn check_mesh<M: MeshTopology + ?Sized>(&self, mesh: &M) -> Result<(), CutError> {
        if self.mesh_id != mesh.mesh_id() {
            return Err(CutError::InconsistentSpace(format!(
                "classification of {} used with {}",
                self.mesh_id,
                mesh.mesh_id()
            )));
        }
        Ok(())
    }
}

fn mask_of(types: &[DomainType], dt: CombinedDomainType) -> BitSet {
    let mut out = BitSet::new(types.len());
    for (i, _) in types.iter().enumerate().filter(|(_, t)| dt.contains(**t)) {
        out.set(i);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::cell_type::CellType;
    use crate::topology::mesh::UnstructuredMesh;

    /// Four triangles in a fan around the center vertex 4.
    fn fan() -> UnstructuredMesh {
        UnstructuredMesh::from_planar(
            CellType::Triangle,
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.5, 0.5]],
            vec![vec![0, 1, 4], vec![1, 2, 4], vec![2, 3, 4], vec![3, 0, 4]],
        )
        .unwrap()
    }

    #[test]
    fn sign_table() {
        assert_eq!(classify_values([-1.0, -2.0, -0.5]), Some(DomainType::Neg));
        assert_eq!(classify_values([1.0, 2.0, 0.5]), Some(DomainType::Pos));
        assert_eq!(classify_values([-1.0, 2.0, 0.5]), Some(DomainType::If));
        assert_eq!(classify_values([-1.0, 0.0, -0.5]), Some(DomainType::Neg));
        assert_eq!(classify_values([0.0, 0.0, 0.5]), Some(DomainType::Pos));
        assert_eq!(classify_values([0.0, 0.0, 0.0]), None);
    }

    #[test]
    fn facet_combination() {
        use DomainType::*;
        assert_eq!(combine_facet(Neg, Some(Neg)), Neg);
        assert_eq!(combine_facet(Neg, Some(Pos)), If);
        assert_eq!(combine_facet(If, Some(Neg)), If);
        assert_eq!(combine_facet(Pos, None), Pos);
    }

    #[test]
    fn classify_fan_with_one_cut_element() {
        let mesh = fan();
        // only vertex 1 positive: elements 0 and 1 contain it
        let field = LevelSetField::new(vec![-1.0, 1.0, -1.0, -1.0, -1.0]);
        let c = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap();
        assert_eq!(c.element_types(), &[DomainType::If, DomainType::If, DomainType::Neg, DomainType::Neg]);
        assert_eq!(c.elements_of_type(CombinedDomainType::If).count_ones(), 2);
        assert_eq!(c.elements_of_type(CombinedDomainType::HasNeg).count_ones(), 4);
        assert!(c.elements_of_type(CombinedDomainType::Pos).none());
        assert!(c.degenerate_elements().is_empty());
        c.ensure_current(&field).unwrap();
    }

    #[test]
    fn facets_follow_neighbors() {
        let mesh = fan();
        let field = LevelSetField::new(vec![-1.0, 1.0, -1.0, -1.0, -1.0]);
        let c = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap();
        for f in 0..mesh.num_facets() {
            let nb = mesh.facet_neighbors(f);
            let expected = match nb {
                FacetNeighbors::Boundary(l) => c.element_type(l),
                FacetNeighbors::Interior(l, r) if c.element_type(l) == c.element_type(r) => {
                    c.element_type(l)
                }
                FacetNeighbors::Interior(..) => DomainType::If,
            };
            assert_eq!(c.facet_type(f), expected);
        }
        let if_facets = c.facets_of_type(CombinedDomainType::If);
        assert!(if_facets.count_ones() > 0);
    }

    #[test]
    fn all_zero_element_is_reported() {
        let mesh = fan();
        let field = LevelSetField::new(vec![0.0, 0.0, 1.0, 1.0, 0.0]);
        let c = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap();
        assert_eq!(c.degenerate_elements(), &[0]);
        assert_eq!(c.element_type(0), DomainType::Pos);

        let strict = CutConfig {
            degenerate_policy: DegeneratePolicy::Reject,
            ..Default::default()
        };
        let err = Classification::compute(&mesh, &field, &strict).unwrap_err();
        assert!(matches!(err, CutError::GeometryDegenerate { element: 0, .. }));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mesh = fan();
        let field = LevelSetField::new(vec![f64::NAN, 1.0, 1.0, 1.0, 1.0]);
        let err = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn update_bumps_revision_and_stamp() {
        let mesh = fan();
        let mut field = LevelSetField::new(vec![1.0; 5]);
        let cfg = CutConfig::default();
        let mut c = Classification::compute(&mesh, &field, &cfg).unwrap();
        assert_eq!(c.count(CombinedDomainType::Pos), 4);

        field.set_value(4, -1.0).unwrap();
        assert!(c.ensure_current(&field).is_err());
        c.update(&mesh, &field, &cfg).unwrap();
        assert_eq!(c.revision(), 1);
        assert_eq!(c.count(CombinedDomainType::If), 4);
        c.ensure_current(&field).unwrap();
    }

    #[test]
    fn wrong_field_length_fails() {
        let mesh = fan();
        let field = LevelSetField::new(vec![1.0; 3]);
        let err = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap_err();
        assert!(matches!(err, CutError::SizeMismatch { .. }));
    }

    #[test]
    fn repeated_classification_is_deterministic() {
        let mesh = fan();
        let field = LevelSetField::new(vec![0.0, -0.0, 1.0, -1.0, 0.0]);
        let a = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap();
        let b = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap();
        assert_eq!(a.element_types(), b.element_types());
        assert_eq!(a.facet_types(), b.facet_types());
        assert_eq!(a.degenerate_elements(), b.degenerate_elements());
    }
}
