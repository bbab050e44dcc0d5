//! Decomposition of cut cells into sub-simplices.
//!
//! For a cell with a linear level-set interpolant, the part of the cell on one
//! side of the interface is a convex polytope. It is split here into simplices
//! whose measures sum to the measure of that part:
//!
//! | dim | vertices inside | pieces |
//! |-----|-----------------|--------|
//! | 1   | 1               | 1 segment |
//! | 2   | 1               | 1 triangle |
//! | 2   | 2               | 2 triangles (quadrilateral) |
//! | 3   | 1               | 1 tetrahedron |
//! | 3   | 2 or 3          | 3 tetrahedra (prism) |
//!
//! "Inside" means strictly negative for [`DomainType::Neg`] and strictly
//! positive for [`DomainType::Pos`]. Vertices with value exactly zero count
//! as outside; the crossing point on an edge towards such a vertex is the vertex
//! itself, so tangential cuts produce degenerate (zero-measure) pieces rather
//! than divisions by zero.
//!
//! [`DomainType::If`] requests the interface itself: a point in 1D, a segment
//! in 2D, one or two triangles in 3D.
//!
//! Quadrilaterals are split along `v0-v2` and the level set is treated as
//! linear on each half.

use crate::cut_error::CutError;
use crate::geometry::metrics::{simplex_measure, zero_crossing};
use crate::topology::cell_type::CellType;
use crate::topology::domain_type::DomainType;

/// One simplex of a decomposition: 1 to 4 points.
#[derive(Clone, Debug, PartialEq)]
pub struct SubSimplex {
    pub points: Vec<[f64; 3]>,
}

impl SubSimplex {
    /// Length/area/volume; a single point (1D interface) has counting measure 1.
    pub fn measure(&self) -> Result<f64, CutError> {
        if self.points.len() == 1 {
            return Ok(1.0);
        }
        simplex_measure(&self.points)
    }
}

/// Splits the `side` part of a cell into simplices.
pub fn decompose(
    cell_type: CellType,
    vertices: &[[f64; 3]],
    values: &[f64],
    side: DomainType,
) -> Result<Vec<SubSimplex>, CutError> {
    let n = cell_type.vertex_count();
    if vertices.len() != n {
        return Err(CutError::SizeMismatch {
            what: "cell vertices",
            expected: n,
            found: vertices.len(),
        });
    }
    if values.len() != n {
        return Err(CutError::SizeMismatch {
            what: "cell level-set values",
            expected: n,
            found: values.len(),
        });
    }
    let mut out = Vec::new();
    for local in cell_type.simplex_split() {
        let pts: Vec<[f64; 3]> = local.iter().map(|&i| vertices[i]).collect();
        let phi: Vec<f64> = local
            .iter()
            .map(|&i| match side {
                DomainType::Pos => -values[i],
                DomainType::Neg | DomainType::If => values[i],
            })
            .collect();
        match side {
            DomainType::If => interface_pieces(&pts, &phi, &mut out),
            DomainType::Neg | DomainType::Pos => inside_pieces(&pts, &phi, &mut out),
        }
    }
    Ok(out)
}

/// Total measure of the `side` part of a cell.
pub fn side_measure(
    cell_type: CellType,
    vertices: &[[f64; 3]],
    values: &[f64],
    side: DomainType,
) -> Result<f64, CutError> {
    decompose(cell_type, vertices, values, side)?
        .iter()
        .try_fold(0.0, |acc, s| Ok(acc + s.measure()?))
}

fn partition(phi: &[f64]) -> (Vec<usize>, Vec<usize>) {
    (0..phi.len()).partition(|&i| phi[i] < 0.0)
}

fn inside_pieces(pts: &[[f64; 3]], phi: &[f64], out: &mut Vec<SubSimplex>) {
    let (inside, outside) = partition(phi);
    if inside.is_empty() {
        return;
    }
    if outside.is_empty() {
        out.push(SubSimplex {
            points: pts.to_vec(),
        });
        return;
    }
    let x = |i: usize, o: usize| zero_crossing(pts[i], pts[o], phi[i], phi[o]);
    let dim = pts.len() - 1;
    match (dim, inside.as_slice(), outside.as_slice()) {
        (1, &[i], &[o]) => out.push(SubSimplex {
            points: vec![pts[i], x(i, o)],
        }),
        (2, &[i], &[o1, o2]) => out.push(SubSimplex {
            points: vec![pts[i], x(i, o1), x(i, o2)],
        }),
        (2, &[i1, i2], &[o]) => {
            let (p1, p2) = (x(i1, o), x(i2, o));
            out.push(SubSimplex {
                points: vec![pts[i1], pts[i2], p2],
            });
            out.push(SubSimplex {
                points: vec![pts[i1], p2, p1],
            });
        }
        (3, &[i], &[o1, o2, o3]) => out.push(SubSimplex {
            points: vec![pts[i], x(i, o1), x(i, o2), x(i, o3)],
        }),
        (3, &[i1, i2], &[o1, o2]) => push_prism(
            [pts[i1], x(i1, o1), x(i1, o2)],
            [pts[i2], x(i2, o1), x(i2, o2)],
            out,
        ),
        (3, &[i1, i2, i3], &[o]) => push_prism(
            [pts[i1], pts[i2], pts[i3]],
            [x(i1, o), x(i2, o), x(i3, o)],
            out,
        ),
        _ => unreachable!("simplex of dimension {dim} with {} inside vertices", inside.len()),
    }
}

fn interface_pieces(pts: &[[f64; 3]], phi: &[f64], out: &mut Vec<SubSimplex>) {
    let (inside, outside) = partition(phi);
    if inside.is_empty() || outside.is_empty() {
        return;
    }
    let x = |i: usize, o: usize| zero_crossing(pts[i], pts[o], phi[i], phi[o]);
    let dim = pts.len() - 1;
    match (dim, inside.as_slice(), outside.as_slice()) {
        (1, &[i], &[o]) => out.push(SubSimplex {
            points: vec![x(i, o)],
        }),
        (2, &[i], &[o1, o2]) => out.push(SubSimplex {
            points: vec![x(i, o1), x(i, o2)],
        }),
        (2, &[i1, i2], &[o]) => out.push(SubSimplex {
            points: vec![x(i1, o), x(i2, o)],
        }),
        (3, &[i], &[o1, o2, o3]) => out.push(SubSimplex {
            points: vec![x(i, o1), x(i, o2), x(i, o3)],
        }),
        (3, &[i1, i2, i3], &[o]) => out.push(SubSimplex {
            points: vec![x(i1, o), x(i2, o), x(i3, o)],
        }),
        (3, &[i1, i2], &[o1, o2]) => {
            let q = [x(i1, o1), x(i1, o2), x(i2, o2), x(i2, o1)];
            out.push(SubSimplex {
                points: vec![q[0], q[1], q[2]],
            });
            out.push(SubSimplex {
                points: vec![q[0], q[2], q[3]],
            });
        }
        _ => unreachable!("simplex of dimension {dim} with {} inside vertices", inside.len()),
    }
}

/// Prism with bottom `a` and top `b`, lateral edges `a[i]-b[i]`.
fn push_prism(a: [[f64; 3]; 3], b: [[f64; 3]; 3], out: &mut Vec<SubSimplex>) {
    out.push(SubSimplex {
        points: vec![a[0], a[1], a[2], b[2]],
    });
    out.push(SubSimplex {
        points: vec![a[0], a[1], b[1], b[2]],
    });
    out.push(SubSimplex {
        points: vec![a[0], b[0], b[1], b[2]],
    });
}
