//! Facet selection from neighbor element masks, and element-patch growth.
//!
//! For an interior facet with neighbors `(L, R)` and element masks `A`, `B`:
//!
//! ```text
//! use_and:  (A[L] ∧ B[R]) ∨ (B[L] ∧ A[R])
//! use_or:    A[L] ∨ B[R] ∨ B[L] ∨ A[R]
//! ```
//!
//! A boundary facet has no `R`; the caller supplies `A[R]` and `B[R]` as
//! `bnd_val_a` and `bnd_val_b`.

use crate::algs::classify::Classification;
use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::topology::domain_type::{CombinedDomainType, DomainType};
use crate::topology::mesh::{FacetNeighbors, MeshTopology};

/// Marks facets by the masks of their two neighbors.
pub fn facets_with_neighbor_types<M>(
    mesh: &M,
    a: &BitSet,
    b: &BitSet,
    use_and: bool,
    bnd_val_a: bool,
    bnd_val_b: bool,
) -> Result<BitSet, CutError>
where
    M: MeshTopology + ?Sized,
{
    a.expect_len("element mask A", mesh.num_elements())?;
    b.expect_len("element mask B", mesh.num_elements())?;
    let mut out = BitSet::new(mesh.num_facets());
    for f in 0..mesh.num_facets() {
        let (al, bl, ar, br) = match mesh.facet_neighbors(f) {
            FacetNeighbors::Interior(l, r) => (a.get(l), b.get(l), a.get(r), b.get(r)),
            FacetNeighbors::Boundary(l) => (a.get(l), b.get(l), bnd_val_a, bnd_val_b),
        };
        let marked = if use_and {
            (al && br) || (bl && ar)
        } else {
            al || br || bl || ar
        };
        out.assign(f, marked);
    }
    Ok(out)
}

/// Every element incident to at least one facet in `facets`.
pub fn elements_with_neighbor_facets<M>(mesh: &M, facets: &BitSet) -> Result<BitSet, CutError>
where
    M: MeshTopology + ?Sized,
{
    facets.expect_len("facet mask", mesh.num_facets())?;
    let mut out = BitSet::new(mesh.num_elements());
    for f in facets.iter_ones() {
        for e in mesh.facet_neighbors(f).elements() {
            out.set(e);
        }
    }
    Ok(out)
}

/// Result of [`grow_elements`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RingExpansion {
    /// Seed plus every element reached.
    pub elements: BitSet,
    /// Rings that added at least one element.
    pub rings: usize,
}

/// Grows `seed` by facet neighbors, one ring at a time.
///
/// Stops after `max_rings` rings or when a ring adds nothing. With
/// `admissible`, only admissible elements are added.
pub fn grow_elements<M>(
    mesh: &M,
    seed: &BitSet,
    admissible: Option<&BitSet>,
    max_rings: usize,
) -> Result<RingExpansion, CutError>
where
    M: MeshTopology + ?Sized,
{
    seed.expect_len("seed mask", mesh.num_elements())?;
    if let Some(adm) = admissible {
        adm.expect_len("admissible mask", mesh.num_elements())?;
    }
    let mut current = seed.clone();
    let mut rings = 0;
    while rings < max_rings {
        let touching = facets_with_neighbor_types(mesh, &current, &current, false, false, false)?;
        let mut reached = elements_with_neighbor_facets(mesh, &touching)?;
        if let Some(adm) = admissible {
            reached &= adm;
        }
        reached |= &current;
        if reached == current {
            break;
        }
        rings += 1;
        log::trace!(
            "ring {rings}: {} -> {} elements",
            current.count_ones(),
            reached.count_ones()
        );
        current = reached;
    }
    Ok(RingExpansion {
        elements: current,
        rings,
    })
}

/// Interior facets between a cut element and an element with a `side` part.
///
/// These are the facets that carry ghost-penalty stabilization for `side`.
/// With `side = If`, only facets between two cut elements are marked.
pub fn ghost_penalty_facets<M>(
    mesh: &M,
    classification: &Classification,
    side: DomainType,
) -> Result<BitSet, CutError>
where
    M: MeshTopology + ?Sized,
{
    classification.check_mesh(mesh)?;
    let has_side = classification.elements_of_type(CombinedDomainType::has(side));
    let cut = classification.elements_of_type(CombinedDomainType::If);
    facets_with_neighbor_types(mesh, &has_side, &cut, true, false, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CutConfig;
    use crate::data::level_set::LevelSetField;
    use crate::topology::cell_type::CellType;
    use crate::topology::mesh::UnstructuredMesh;

    /// Four segments in a row: elements 0..4, facets are the 5 points.
    fn line() -> UnstructuredMesh {
        let coords = (0..5).map(|i| [i as f64, 0.0, 0.0]).collect();
        let cells = (0..4).map(|i| vec![i, i + 1]).collect();
        UnstructuredMesh::new(CellType::Segment, coords, cells).unwrap()
    }

    fn mask(n: usize, ids: &[usize]) -> BitSet {
        BitSet::from_indices(n, ids.iter().copied()).unwrap()
    }

    fn interior(mesh: &UnstructuredMesh, l: usize, r: usize) -> usize {
        (0..mesh.num_facets())
            .find(|&f| {
                let mut els: Vec<usize> = mesh.facet_neighbors(f).elements().collect();
                els.sort_unstable();
                els == [l.min(r), l.max(r)]
            })
            .unwrap()
    }

    #[test]
    fn and_marks_only_mixed_pairs() {
        let mesh = line();
        let a = mask(4, &[0, 1]);
        let b = mask(4, &[2, 3]);
        let f = facets_with_neighbor_types(&mesh, &a, &b, true, false, false).unwrap();
        assert_eq!(f.iter_ones().collect::<Vec<_>>(), vec![interior(&mesh, 1, 2)]);
    }

    #[test]
    fn or_marks_everything_touching() {
        let mesh = line();
        let a = mask(4, &[0]);
        let f = facets_with_neighbor_types(&mesh, &a, &BitSet::new(4), false, false, false).unwrap();
        // both endpoints of element 0
        assert_eq!(f.count_ones(), 2);
    }

    #[test]
    fn boundary_values_are_used() {
        let mesh = line();
        let a = mask(4, &[0, 3]);
        let none = BitSet::new(4);
        // A[L] and B[R] := true marks the two boundary points only
        let f = facets_with_neighbor_types(&mesh, &a, &none, true, false, true).unwrap();
        assert_eq!(f.count_ones(), 2);
        assert!(f.iter_ones().all(|x| mesh.facet_neighbors(x).is_boundary()));
    }

    #[test]
    fn swap_symmetry() {
        let mesh = line();
        let a = mask(4, &[0, 2]);
        let b = mask(4, &[1]);
        for use_and in [true, false] {
            let ab = facets_with_neighbor_types(&mesh, &a, &b, use_and, true, false).unwrap();
            let ba = facets_with_neighbor_types(&mesh, &b, &a, use_and, false, true).unwrap();
            assert_eq!(ab, ba);
        }
    }

    #[test]
    fn elements_of_facets() {
        let mesh = line();
        let f = mask(mesh.num_facets(), &[interior(&mesh, 1, 2)]);
        let e = elements_with_neighbor_facets(&mesh, &f).unwrap();
        assert_eq!(e.iter_ones().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn growth_saturates_and_respects_admissible() {
        let mesh = line();
        let seed = mask(4, &[0]);
        let one = grow_elements(&mesh, &seed, None, 1).unwrap();
        assert_eq!(one.elements, mask(4, &[0, 1]));
        assert_eq!(one.rings, 1);

        let all = grow_elements(&mesh, &seed, None, 10).unwrap();
        assert!(all.elements.all());
        assert_eq!(all.rings, 3);

        let adm = mask(4, &[1, 3]);
        let bounded = grow_elements(&mesh, &seed, Some(&adm), 10).unwrap();
        assert_eq!(bounded.elements, mask(4, &[0, 1]));

        let again = grow_elements(&mesh, &all.elements, None, 10).unwrap();
        assert_eq!(again.rings, 0);
    }

    #[test]
    fn ghost_penalty_on_cut_boundary() {
        let mesh = line();
        // interface inside element 1
        let field = LevelSetField::interpolate(&mesh, |p| p[0] - 1.5);
        let c = Classification::compute(&mesh, &field, &CutConfig::default()).unwrap();
        let neg = ghost_penalty_facets(&mesh, &c, DomainType::Neg).unwrap();
        assert_eq!(neg.iter_ones().collect::<Vec<_>>(), vec![interior(&mesh, 0, 1)]);
        let pos = ghost_penalty_facets(&mesh, &c, DomainType::Pos).unwrap();
        assert_eq!(pos.iter_ones().collect::<Vec<_>>(), vec![interior(&mesh, 1, 2)]);
    }

    #[test]
    fn mask_length_is_checked() {
        let mesh = line();
        assert!(facets_with_neighbor_types(&mesh, &BitSet::new(3), &BitSet::new(4), true, false, false).is_err());
        assert!(elements_with_neighbor_facets(&mesh, &BitSet::new(2)).is_err());
    }
}
