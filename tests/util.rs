#![allow(dead_code)]
use cut_sieve::prelude::*;

/// `n x n` squares on `[lo, hi]^2`, each split along its `(0,0)-(1,1)` diagonal.
///
/// Vertex `(i, j)` has index `j * (n + 1) + i`; square `(i, j)` owns elements
/// `2 * (j * n + i)` and `2 * (j * n + i) + 1`.
pub fn square_mesh(n: usize, lo: f64, hi: f64) -> UnstructuredMesh {
    let h = (hi - lo) / n as f64;
    let mut coords = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            coords.push([lo + h * i as f64, lo + h * j as f64]);
        }
    }
    let vid = |i: usize, j: usize| j * (n + 1) + i;
    let mut cells = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let (a, b, c, d) = (vid(i, j), vid(i + 1, j), vid(i + 1, j + 1), vid(i, j + 1));
            cells.push(vec![a, b, c]);
            cells.push(vec![a, c, d]);
        }
    }
    UnstructuredMesh::from_planar(CellType::Triangle, &coords, cells).unwrap()
}

/// `n x n` quadrilaterals on `[lo, hi]^2`.
pub fn quad_mesh(n: usize, lo: f64, hi: f64) -> UnstructuredMesh {
    let h = (hi - lo) / n as f64;
    let mut coords = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            coords.push([lo + h * i as f64, lo + h * j as f64]);
        }
    }
    let vid = |i: usize, j: usize| j * (n + 1) + i;
    let mut cells = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            cells.push(vec![vid(i, j), vid(i + 1, j), vid(i + 1, j + 1), vid(i, j + 1)]);
        }
    }
    UnstructuredMesh::from_planar(CellType::Quadrilateral, &coords, cells).unwrap()
}

/// Unit cube split into `n^3` subcubes of six Kuhn tetrahedra each.
pub fn cube_tet_mesh(n: usize) -> UnstructuredMesh {
    let h = 1.0 / n as f64;
    let mut coords = Vec::with_capacity((n + 1).pow(3));
    for k in 0..=n {
        for j in 0..=n {
            for i in 0..=n {
                coords.push([h * i as f64, h * j as f64, h * k as f64]);
            }
        }
    }
    let vid = |p: [usize; 3]| (p[2] * (n + 1) + p[1]) * (n + 1) + p[0];
    const PERMS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let mut cells = Vec::with_capacity(6 * n * n * n);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                for perm in PERMS {
                    let mut p = [i, j, k];
                    let mut tet = vec![vid(p)];
                    for axis in perm {
                        p[axis] += 1;
                        tet.push(vid(p));
                    }
                    cells.push(tet);
                }
            }
        }
    }
    UnstructuredMesh::new(CellType::Tetrahedron, coords, cells).unwrap()
}

/// Signed distance to the circle of radius `r` around the origin.
pub fn circle(r: f64) -> impl Fn([f64; 3]) -> f64 {
    move |p| (p[0] * p[0] + p[1] * p[1]).sqrt() - r
}

/// Measures of all elements of `mesh`.
pub fn element_measures(mesh: &UnstructuredMesh) -> Vec<f64> {
    (0..mesh.num_elements())
        .map(|e| {
            cut_sieve::geometry::metrics::cell_measure(
                mesh.cell_type(e),
                &mesh.element_coordinates(e),
            )
            .unwrap()
        })
        .collect()
}

/// Total measure of the negative side according to `info`.
pub fn negative_measure(mesh: &UnstructuredMesh, info: &CutInfo) -> f64 {
    element_measures(mesh)
        .iter()
        .enumerate()
        .map(|(e, m)| info.kappa_neg(e) * m)
        .sum()
}

/// Assert `a ⊆ b` with a readable message.
pub fn assert_subset(a: &BitSet, b: &BitSet) {
    assert!(a.is_subset_of(b), "not a subset\n a={a}\n b={b}");
}
