//! Classification and cut ratios bundled as one consistent batch.
//!
//! A [`CutInfo`] is always derived from a single field generation. For moving
//! interfaces, [`SharedCutInfo`] publishes complete snapshots: readers holding
//! an `Arc<CutInfo>` keep a consistent view while a new one is being built.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::algs::classify::Classification;
use crate::algs::cut_ratio::CutRatios;
use crate::config::CutConfig;
use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::data::level_set::{FieldStamp, LevelSetField};
use crate::topology::domain_type::{CombinedDomainType, DomainType};
use crate::topology::mesh::{MeshId, MeshTopology};

/// Element/facet types and cut ratios of one field generation.
#[derive(Clone, Debug)]
pub struct CutInfo {
    classification: Classification,
    ratios: CutRatios,
    config: CutConfig,
}

impl CutInfo {
    pub fn new<M>(mesh: &M, field: &LevelSetField, config: &CutConfig) -> Result<Self, CutError>
    where
        M: MeshTopology + ?Sized,
    {
        let classification = Classification::compute(mesh, field, config)?;
        let ratios = CutRatios::compute(mesh, field, &classification, config)?;
        Ok(Self {
            classification,
            ratios,
            config: *config,
        })
    }

    /// Recomputes both parts from `field`; on error `self` is unchanged.
    pub fn update<M>(&mut self, mesh: &M, field: &LevelSetField) -> Result<(), CutError>
    where
        M: MeshTopology + ?Sized,
    {
        let mut classification = self.classification.clone();
        classification.update(mesh, field, &self.config)?;
        let ratios = CutRatios::compute(mesh, field, &classification, &self.config)?;
        self.classification = classification;
        self.ratios = ratios;
        Ok(())
    }

    /// Fails with `StaleClassification` if `field` changed since this batch was built.
    pub fn ensure_current(&self, field: &LevelSetField) -> Result<(), CutError> {
        self.classification.ensure_current(field)
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn ratios(&self) -> &CutRatios {
        &self.ratios
    }

    pub fn config(&self) -> &CutConfig {
        &self.config
    }

    pub fn elements_of_type(&self, dt: CombinedDomainType) -> BitSet {
        self.classification.elements_of_type(dt)
    }

    pub fn facets_of_type(&self, dt: CombinedDomainType) -> BitSet {
        self.classification.facets_of_type(dt)
    }

    pub fn element_type(&self, element: usize) -> DomainType {
        self.classification.element_type(element)
    }

    pub fn facet_type(&self, facet: usize) -> DomainType {
        self.classification.facet_type(facet)
    }

    pub fn kappa_neg(&self, element: usize) -> f64 {
        self.ratios.kappa_neg(element)
    }

    pub fn kappa_pos(&self, element: usize) -> f64 {
        self.ratios.kappa_pos(element)
    }

    pub fn kappa(&self, element: usize, side: DomainType) -> f64 {
        self.ratios.kappa(element, side)
    }

    pub fn field_stamp(&self) -> FieldStamp {
        self.classification.field_stamp()
    }

    pub fn revision(&self) -> u64 {
        self.classification.revision()
    }

    pub fn mesh_id(&self) -> MeshId {
        self.classification.mesh_id()
    }

    pub fn num_elements(&self) -> usize {
        self.classification.num_elements()
    }
}

/// Atomically replaceable [`CutInfo`] for moving-domain loops.
#[derive(Debug)]
pub struct SharedCutInfo {
    current: RwLock<Arc<CutInfo>>,
}

impl SharedCutInfo {
    pub fn new(info: CutInfo) -> Self {
        Self {
            current: RwLock::new(Arc::new(info)),
        }
    }

    /// Current batch; never mixes generations.
    pub fn snapshot(&self) -> Arc<CutInfo> {
        Arc::clone(&self.current.read())
    }

    /// Builds a new batch from `field` without holding the lock, then swaps it in.
    ///
    /// On error the published batch stays in place.
    pub fn refresh<M>(&self, mesh: &M, field: &LevelSetField) -> Result<Arc<CutInfo>, CutError>
    where
        M: MeshTopology + ?Sized,
    {
        let mut next = (*self.snapshot()).clone();
        next.update(mesh, field)?;
        let next = Arc::new(next);
        *self.current.write() = Arc::clone(&next);
        log::debug!(
            "published cut info revision {} for {}",
            next.revision(),
            next.field_stamp()
        );
        Ok(next)
    }
}
