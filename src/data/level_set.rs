//! Nodal piecewise-linear level-set field.
//!
//! A [`LevelSetField`] stores one value per mesh vertex. Its sign partitions
//! the mesh into the negative and positive subdomains; its zero set is the
//! interface. Every mutation bumps the field's generation, and derived data
//! (classification, cut ratios, restricted patterns) records the
//! [`FieldStamp`] it was computed from so staleness is detectable.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cut_error::CutError;
use crate::topology::domain_type::DomainType;
use crate::topology::mesh::MeshTopology;

static NEXT_FIELD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity and generation of a field at one point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldStamp {
    /// Process-unique field identity.
    pub id: u64,
    /// Mutation counter, starting at zero.
    pub generation: u64,
}

impl fmt::Display for FieldStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}@{}", self.id, self.generation)
    }
}

impl FieldStamp {
    /// Fails with `StaleClassification` unless `self` matches the field's current stamp.
    pub fn ensure_matches(self, current: FieldStamp) -> Result<(), CutError> {
        if self != current {
            return Err(CutError::StaleClassification {
                expected: current,
                found: self,
            });
        }
        Ok(())
    }
}

/// Vertex values of a level-set function.
#[derive(Debug)]
pub struct LevelSetField {
    values: Vec<f64>,
    id: u64,
    generation: u64,
}

impl Clone for LevelSetField {
    /// A clone is an independent field with its own identity.
    fn clone(&self) -> Self {
        Self::new(self.values.clone())
    }
}

impl LevelSetField {
    /// Wraps per-vertex values.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            id: NEXT_FIELD_ID.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    /// Samples `f` at every mesh vertex.
    pub fn interpolate<M, F>(mesh: &M, f: F) -> Self
    where
        M: MeshTopology + ?Sized,
        F: Fn([f64; 3]) -> f64,
    {
        let values = (0..mesh.num_vertices())
            .map(|v| f(mesh.vertex_coordinates(v)))
            .collect();
        Self::new(values)
    }

    /// Current stamp.
    #[inline]
    pub fn stamp(&self) -> FieldStamp {
        FieldStamp {
            id: self.id,
            generation: self.generation,
        }
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `vertex`.
    pub fn value(&self, vertex: usize) -> Result<f64, CutError> {
        self.values
            .get(vertex)
            .copied()
            .ok_or(CutError::IndexOutOfBounds {
                what: "vertex",
                index: vertex,
                len: self.values.len(),
            })
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Side of `vertex` under the strict-sign convention: `Some(Neg)` for
    /// negative values, `Some(Pos)` for positive values, `None` for exact zeros.
    pub fn strict_sign(&self, vertex: usize) -> Result<Option<DomainType>, CutError> {
        let v = self.value(vertex)?;
        Ok(if v < 0.0 {
            Some(DomainType::Neg)
        } else if v > 0.0 {
            Some(DomainType::Pos)
        } else {
            None
        })
    }

    /// Replaces all values; bumps the generation.
    pub fn update(&mut self, values: Vec<f64>) -> Result<(), CutError> {
        if values.len() != self.values.len() {
            return Err(CutError::SizeMismatch {
                what: "level-set values",
                expected: self.values.len(),
                found: values.len(),
            });
        }
        self.values = values;
        self.bump();
        Ok(())
    }

    /// Re-samples `f` at every vertex; bumps the generation.
    pub fn reinterpolate<M, F>(&mut self, mesh: &M, f: F) -> Result<(), CutError>
    where
        M: MeshTopology + ?Sized,
        F: Fn([f64; 3]) -> f64,
    {
        let values = (0..mesh.num_vertices())
            .map(|v| f(mesh.vertex_coordinates(v)))
            .collect();
        self.update(values)
    }

    /// Sets one vertex value; bumps the generation.
    pub fn set_value(&mut self, vertex: usize, value: f64) -> Result<(), CutError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(vertex)
            .ok_or(CutError::IndexOutOfBounds {
                what: "vertex",
                index: vertex,
                len,
            })?;
        *slot = value;
        self.bump();
        Ok(())
    }

    /// Checks that the field has one value per mesh vertex.
    pub fn check_mesh<M: MeshTopology + ?Sized>(&self, mesh: &M) -> Result<(), CutError> {
        if self.values.len() != mesh.num_vertices() {
            return Err(CutError::SizeMismatch {
                what: "level-set values",
                expected: mesh.num_vertices(),
                found: self.values.len(),
            });
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.generation += 1;
    }
}
