//! Cell type metadata and local facet tables.
//!
//! Reference vertex orderings follow the usual conventions:
//! - Segment: `[v0, v1]`.
//! - Triangle: `[v0, v1, v2]`.
//! - Quadrilateral: `[v0, v1, v2, v3]`, counter-clockwise.
//! - Tetrahedron: `[v0, v1, v2, v3]`.

use serde::{Deserialize, Serialize};

/// Element shapes understood by the classifier and the cut-ratio engine.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
}

const SEGMENT_FACETS: &[&[usize]] = &[&[0], &[1]];
const TRIANGLE_FACETS: &[&[usize]] = &[&[1, 2], &[0, 2], &[0, 1]];
const QUAD_FACETS: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]];
const TET_FACETS: &[&[usize]] = &[&[1, 2, 3], &[0, 2, 3], &[0, 1, 3], &[0, 1, 2]];

impl CellType {
    /// Returns the topological dimension of the cell.
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Segment => 1,
            CellType::Triangle | CellType::Quadrilateral => 2,
            CellType::Tetrahedron => 3,
        }
    }

    /// Number of vertices of the cell.
    pub fn vertex_count(self) -> usize {
        match self {
            CellType::Segment => 2,
            CellType::Triangle => 3,
            CellType::Quadrilateral | CellType::Tetrahedron => 4,
        }
    }

    /// Whether the cell is a simplex.
    pub fn is_simplex(self) -> bool {
        !matches!(self, CellType::Quadrilateral)
    }

    /// Local vertex indices of each facet (codimension-1 entity).
    ///
    /// For simplices, facet `i` is the one opposite to vertex `i`.
    pub fn local_facets(self) -> &'static [&'static [usize]] {
        match self {
            CellType::Segment => SEGMENT_FACETS,
            CellType::Triangle => TRIANGLE_FACETS,
            CellType::Quadrilateral => QUAD_FACETS,
            CellType::Tetrahedron => TET_FACETS,
        }
    }

    /// Splits the cell into simplices, as local vertex index tuples.
    ///
    /// Simplices map to themselves; a quadrilateral is split along `v0-v2`.
    pub fn simplex_split(self) -> &'static [&'static [usize]] {
        match self {
            CellType::Segment => &[&[0, 1]],
            CellType::Triangle => &[&[0, 1, 2]],
            CellType::Quadrilateral => &[&[0, 1, 2], &[0, 2, 3]],
            CellType::Tetrahedron => &[&[0, 1, 2, 3]],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facet_tables_match_vertex_counts() {
        for ct in [
            CellType::Segment,
            CellType::Triangle,
            CellType::Quadrilateral,
            CellType::Tetrahedron,
        ] {
            for facet in ct.local_facets() {
                assert_eq!(facet.len(), ct.dimension() as usize);
                assert!(facet.iter().all(|&v| v < ct.vertex_count()));
            }
        }
    }

    #[test]
    fn simplex_facets_are_opposite_vertex() {
        for ct in [CellType::Triangle, CellType::Tetrahedron] {
            for (i, facet) in ct.local_facets().iter().enumerate() {
                assert!(!facet.contains(&i));
            }
        }
    }

    #[test]
    fn quad_split_covers_all_vertices() {
        let split = CellType::Quadrilateral.simplex_split();
        assert_eq!(split.len(), 2);
        let mut seen = [false; 4];
        for tri in split {
            for &v in tri.iter() {
                seen[v] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
