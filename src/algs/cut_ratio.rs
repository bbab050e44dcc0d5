//! Volume fractions of each element on the negative side of the interface.
//!
//! `kappa_neg(e) = |e ∩ {φ < 0}| / |e|` and `kappa_pos(e) = 1 - kappa_neg(e)`.
//! Uncut elements get exact 0 or 1 without touching geometry; cut elements are
//! decomposed with [`geometry::decomposition`](crate::geometry::decomposition).

use crate::algs::classify::Classification;
use crate::algs::map_indexed;
use crate::config::CutConfig;
use crate::cut_error::CutError;
use crate::data::level_set::{FieldStamp, LevelSetField};
use crate::debug_invariants::DebugInvariants;
use crate::geometry::decomposition::side_measure;
use crate::geometry::metrics::cell_measure;
use crate::topology::domain_type::DomainType;
use crate::topology::mesh::{MeshId, MeshTopology};

/// Per-element negative-side volume fractions.
#[derive(Clone, Debug)]
pub struct CutRatios {
    kappa_neg: Vec<f64>,
    field_stamp: FieldStamp,
    mesh_id: MeshId,
}

impl CutRatios {
    /// Computes cut ratios for every element.
    ///
    /// `classification` must have been computed from the current state of
    /// `field`, otherwise `StaleClassification` is returned.
    pub fn compute<M>(
        mesh: &M,
        field: &LevelSetField,
        classification: &Classification,
        config: &CutConfig,
    ) -> Result<Self, CutError>
    where
        M: MeshTopology + ?Sized,
    {
        classification.ensure_current(field)?;
        classification.check_mesh(mesh)?;
        let tol = config.kappa_tolerance;
        let values = field.values();

        let kappa_neg = map_indexed(mesh.num_elements(), |e| {
            element_ratio(mesh, values, classification.element_type(e), e, tol)
        })?;

        let out = Self {
            kappa_neg,
            field_stamp: field.stamp(),
            mesh_id: mesh.mesh_id(),
        };
        crate::debug_invariants!(out.validate_invariants(), "cut ratios out of range");
        Ok(out)
    }

    /// Fraction of `element` on the negative side.
    ///
    /// # Panics
    /// Panics if `element` is out of range.
    #[inline]
    pub fn kappa_neg(&self, element: usize) -> f64 {
        self.kappa_neg[element]
    }

    /// Fraction of `element` on the positive side.
    #[inline]
    pub fn kappa_pos(&self, element: usize) -> f64 {
        1.0 - self.kappa_neg[element]
    }

    /// Fraction on `side`; the interface itself has zero volume.
    pub fn kappa(&self, element: usize, side: DomainType) -> f64 {
        match side {
            DomainType::Neg => self.kappa_neg(element),
            DomainType::Pos => self.kappa_pos(element),
            DomainType::If => 0.0,
        }
    }

    /// Negative-side fractions of all elements.
    pub fn as_slice(&self) -> &[f64] {
        &self.kappa_neg
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.kappa_neg.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kappa_neg.is_empty()
    }

    #[inline]
    pub fn field_stamp(&self) -> FieldStamp {
        self.field_stamp
    }

    #[inline]
    pub fn mesh_id(&self) -> MeshId {
        self.mesh_id
    }
}

/// Negative-side fraction of one element of type `domain_type`.
pub(crate) fn element_ratio<M>(
    mesh: &M,
    values: &[f64],
    domain_type: DomainType,
    element: usize,
    tol: f64,
) -> Result<f64, CutError>
where
    M: MeshTopology + ?Sized,
{
    match domain_type {
        DomainType::Neg => Ok(1.0),
        DomainType::Pos => Ok(0.0),
        DomainType::If => {
            let cell_type = mesh.cell_type(element);
            let coords = mesh.element_coordinates(element);
            let local: Vec<f64> = mesh.element_vertices(element).iter().map(|&v| values[v]).collect();
            let total = cell_measure(cell_type, &coords)?;
            if total <= 0.0 || !total.is_finite() {
                return Err(CutError::GeometryDegenerate {
                    element,
                    reason: format!("cut element has measure {total}"),
                });
            }
            let neg = side_measure(cell_type, &coords, &local, DomainType::Neg)?;
            clamp_ratio(element, neg / total, tol)
        }
    }
}

fn clamp_ratio(element: usize, kappa: f64, tol: f64) -> Result<f64, CutError> {
    if !(-tol..=1.0 + tol).contains(&kappa) {
        return Err(CutError::GeometryDegenerate {
            element,
            reason: format!("cut ratio {kappa} outside [0, 1] beyond tolerance {tol}"),
        });
    }
    Ok(kappa.clamp(0.0, 1.0))
}

impl DebugInvariants for CutRatios {
    fn validate_invariants(&self) -> Result<(), CutError> {
        match self
            .kappa_neg
            .iter()
            .position(|k| !(0.0..=1.0).contains(k))
        {
            Some(e) => Err(CutError::GeometryDegenerate {
                element: e,
                reason: format!("stored cut ratio {} outside [0, 1]", self.kappa_neg[e]),
            }),
            None => Ok(()),
        }
    }
}
