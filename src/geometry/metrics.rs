//! Measures of cells and simplices.
//!
//! All routines take vertex coordinates as `[f64; 3]`; planar meshes use a zero
//! third component. Measures are unsigned: length for segments, area for
//! triangles and quadrilaterals (also when embedded in 3D), volume for
//! tetrahedra.

use crate::cut_error::CutError;
use crate::topology::cell_type::CellType;

/// Measure of the simplex spanned by `points` (2, 3 or 4 points).
pub fn simplex_measure(points: &[[f64; 3]]) -> Result<f64, CutError> {
    match points {
        [a, b] => Ok(norm(sub(*b, *a))),
        [a, b, c] => Ok(0.5 * norm(cross(sub(*b, *a), sub(*c, *a)))),
        [a, b, c, d] => Ok(signed_volume(*a, *b, *c, *d).abs()),
        _ => Err(CutError::SizeMismatch {
            what: "simplex vertices",
            expected: 4,
            found: points.len(),
        }),
    }
}

/// Measure of a cell of the given type.
pub fn cell_measure(cell_type: CellType, vertices: &[[f64; 3]]) -> Result<f64, CutError> {
    let expected = cell_type.vertex_count();
    if vertices.len() != expected {
        return Err(CutError::SizeMismatch {
            what: "cell vertices",
            expected,
            found: vertices.len(),
        });
    }
    let mut total = 0.0;
    for local in cell_type.simplex_split() {
        let pts: Vec<[f64; 3]> = local.iter().map(|&i| vertices[i]).collect();
        total += simplex_measure(&pts)?;
    }
    Ok(total)
}

/// Point on segment `a-b` where the linear interpolant of `(fa, fb)` vanishes.
///
/// Callers guarantee `fa` and `fb` are on different sides (one `< 0`, the
/// other `>= 0`), so the denominator is nonzero.
#[inline]
pub fn zero_crossing(a: [f64; 3], b: [f64; 3], fa: f64, fb: f64) -> [f64; 3] {
    let t = fa / (fa - fb);
    lerp(a, b, t)
}

#[inline]
pub fn lerp(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        a[0] + t * (b[0] - a[0]),
        a[1] + t * (b[1] - a[1]),
        a[2] + t * (b[2] - a[2]),
    ]
}

pub(crate) fn signed_volume(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> f64 {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ad = sub(d, a);
    dot(ab, cross(ac, ad)) / 6.0
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const O: [f64; 3] = [0.0, 0.0, 0.0];
    const X: [f64; 3] = [1.0, 0.0, 0.0];
    const Y: [f64; 3] = [0.0, 1.0, 0.0];
    const Z: [f64; 3] = [0.0, 0.0, 1.0];

    #[test]
    fn simplex_measures() {
        assert_eq!(simplex_measure(&[O, [3.0, 4.0, 0.0]]).unwrap(), 5.0);
        assert_eq!(simplex_measure(&[O, X, Y]).unwrap(), 0.5);
        assert!((simplex_measure(&[O, X, Y, Z]).unwrap() - 1.0 / 6.0).abs() < 1e-15);
        // orientation does not matter
        assert!((simplex_measure(&[O, Y, X, Z]).unwrap() - 1.0 / 6.0).abs() < 1e-15);
        assert!(simplex_measure(&[O]).is_err());
    }

    #[test]
    fn quad_measure_is_sum_of_halves() {
        let q = [O, X, [1.0, 2.0, 0.0], [0.0, 2.0, 0.0]];
        assert!((cell_measure(CellType::Quadrilateral, &q).unwrap() - 2.0).abs() < 1e-15);
        assert!(cell_measure(CellType::Quadrilateral, &q[..3]).is_err());
    }

    #[test]
    fn zero_crossing_interpolates_linearly() {
        let p = zero_crossing(O, [4.0, 0.0, 0.0], -1.0, 3.0);
        assert_eq!(p, [1.0, 0.0, 0.0]);
        // crossing at an exact zero lands on that vertex
        assert_eq!(zero_crossing(O, X, -2.0, 0.0), X);
    }
}
