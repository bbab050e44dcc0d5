//! Assembly restricted to a subset of elements and facets.
//!
//! The assembler owns the restriction, not the integrals: local matrices and
//! vectors come from externally supplied [`ElementIntegrator`] and
//! [`FacetIntegrator`] implementations. The global matrix always has the full
//! dof dimension of the space, but its sparsity pattern is rebuilt from the
//! current restriction on every call, so entries that no restricted entity
//! touches are structurally absent.
//!
//! A restriction taken from a [`CutInfo`] (see
//! [`RestrictedAssembler::from_cut_info`]) remembers the field generation it
//! was derived from, and assembly against any other generation fails with
//! `StaleClassification`. Restrictions passed in as plain masks carry no
//! generation and are the caller's to keep in step.
//!
//! # Steps
//! 1. Check that the cut information matches the current level-set field and
//!    the generation of the restriction.
//! 2. Build the pattern from the dof blocks of restricted elements and facets.
//! 3. Compute local contributions (on the rayon pool with the `rayon` feature).
//! 4. Scatter them serially into the matrix and right-hand side.

use crate::algs::cut_info::CutInfo;
use crate::algs::map_indexed;
use crate::cut_error::CutError;
use crate::data::bitset::BitSet;
use crate::data::level_set::{FieldStamp, LevelSetField};
use crate::data::space::FeSpace;
use crate::data::sparse::{CsrMatrix, SparsityPattern};
use crate::topology::cell_type::CellType;
use crate::topology::domain_type::{CombinedDomainType, DomainType};
use crate::topology::mesh::{FacetNeighbors, MeshTopology};

/// Everything an element integrator may need about one element.
#[derive(Clone, Copy, Debug)]
pub struct ElementContext<'a> {
    pub element: usize,
    pub cell_type: CellType,
    /// Vertex coordinates in reference order.
    pub vertices: &'a [[f64; 3]],
    /// Level-set values at `vertices`.
    pub level_set: &'a [f64],
    pub domain_type: DomainType,
    /// Fraction of the element on the negative side.
    pub kappa_neg: f64,
    /// Global dofs; local matrices are indexed in this order.
    pub dofs: &'a [usize],
}

/// Everything a facet integrator may need about one facet.
#[derive(Clone, Copy, Debug)]
pub struct FacetContext<'a> {
    pub facet: usize,
    pub neighbors: FacetNeighbors,
    pub vertices: &'a [[f64; 3]],
    pub facet_type: DomainType,
    /// Dofs of the left element followed by the dofs of the right element
    /// not already present; local matrices are indexed in this order.
    pub dofs: &'a [usize],
}

/// Dense local matrix (row-major, `n x n`) and vector (`n`, or empty for none).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalContribution {
    pub matrix: Vec<f64>,
    pub vector: Vec<f64>,
}

impl LocalContribution {
    pub fn zeros(n: usize) -> Self {
        Self {
            matrix: vec![0.0; n * n],
            vector: vec![0.0; n],
        }
    }

    /// Matrix without a right-hand-side part.
    pub fn matrix_only(matrix: Vec<f64>) -> Self {
        Self {
            matrix,
            vector: Vec::new(),
        }
    }

    fn check_size(&self, n: usize) -> Result<(), CutError> {
        if self.matrix.len() != n * n {
            return Err(CutError::SizeMismatch {
                what: "local matrix",
                expected: n * n,
                found: self.matrix.len(),
            });
        }
        if !self.vector.is_empty() && self.vector.len() != n {
            return Err(CutError::SizeMismatch {
                what: "local vector",
                expected: n,
                found: self.vector.len(),
            });
        }
        Ok(())
    }
}

/// Computes the local contribution of one element.
pub trait ElementIntegrator: Sync {
    fn integrate(&self, ctx: &ElementContext<'_>) -> Result<LocalContribution, CutError>;
}

impl<F> ElementIntegrator for F
where
    F: Fn(&ElementContext<'_>) -> Result<LocalContribution, CutError> + Sync,
{
    fn integrate(&self, ctx: &ElementContext<'_>) -> Result<LocalContribution, CutError> {
        self(ctx)
    }
}

/// Computes the local contribution of one facet.
pub trait FacetIntegrator: Sync {
    fn integrate(&self, ctx: &FacetContext<'_>) -> Result<LocalContribution, CutError>;
}

impl<F> FacetIntegrator for F
where
    F: Fn(&FacetContext<'_>) -> Result<LocalContribution, CutError> + Sync,
{
    fn integrate(&self, ctx: &FacetContext<'_>) -> Result<LocalContribution, CutError> {
        self(ctx)
    }
}

/// Facet integrator contributing nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoFacetIntegrator;

impl FacetIntegrator for NoFacetIntegrator {
    fn integrate(&self, ctx: &FacetContext<'_>) -> Result<LocalContribution, CutError> {
        Ok(LocalContribution::matrix_only(vec![0.0; ctx.dofs.len() * ctx.dofs.len()]))
    }
}

/// Global matrix and right-hand side of one assembly.
#[derive(Clone, Debug)]
pub struct AssembledSystem {
    pub matrix: CsrMatrix,
    pub rhs: Vec<f64>,
    /// Field generation the system was assembled for.
    pub field_stamp: FieldStamp,
}

/// Assembler over a mesh and space with an element/facet restriction.
#[derive(Debug)]
pub struct RestrictedAssembler<'a, M: ?Sized, S> {
    mesh: &'a M,
    space: &'a S,
    elements: BitSet,
    facets: Option<BitSet>,
    /// Field generation the restriction was derived from.
    source: Option<FieldStamp>,
}

impl<'a, M, S> RestrictedAssembler<'a, M, S>
where
    M: MeshTopology + ?Sized,
    S: FeSpace,
{
    /// Assembler restricted to `elements` and, optionally, `facets`.
    ///
    /// Every restricted facet must have at least one incident element in
    /// `elements`, otherwise `RestrictionMismatch` is returned. A facet on the
    /// border of the restriction still assembles over the dofs of both its
    /// neighbors.
    ///
    /// The masks are not tied to a field generation; prefer
    /// [`from_cut_info`](Self::from_cut_info) when they come from a [`CutInfo`].
    pub fn new(
        mesh: &'a M,
        space: &'a S,
        elements: BitSet,
        facets: Option<BitSet>,
    ) -> Result<Self, CutError> {
        space.check_mesh(mesh)?;
        validate_restriction(mesh, &elements, facets.as_ref())?;
        Ok(Self {
            mesh,
            space,
            elements,
            facets,
            source: None,
        })
    }

    /// Assembler restricted to the elements of `info` matching `domain`.
    ///
    /// `facets` is expected to come from the same classification, for example
    /// [`ghost_penalty_facets`](crate::algs::ghost_penalty_facets). Assembling
    /// against a `CutInfo` of another field generation fails with
    /// `StaleClassification`.
    pub fn from_cut_info(
        mesh: &'a M,
        space: &'a S,
        info: &CutInfo,
        domain: CombinedDomainType,
        facets: Option<BitSet>,
    ) -> Result<Self, CutError> {
        info.classification().check_mesh(mesh)?;
        let mut asm = Self::new(mesh, space, info.elements_of_type(domain), facets)?;
        asm.source = Some(info.field_stamp());
        Ok(asm)
    }

    /// Assembler over all elements and no facets.
    pub fn unrestricted(mesh: &'a M, space: &'a S) -> Result<Self, CutError> {
        Self::new(mesh, space, BitSet::full(mesh.num_elements()), None)
    }

    /// Replaces the restriction with plain masks; on error the old one is kept.
    pub fn set_restriction(&mut self, elements: BitSet, facets: Option<BitSet>) -> Result<(), CutError> {
        validate_restriction(self.mesh, &elements, facets.as_ref())?;
        self.elements = elements;
        self.facets = facets;
        self.source = None;
        Ok(())
    }

    /// Replaces the restriction with the elements of `info` matching `domain`
    /// and records its field generation; on error the old one is kept.
    pub fn restrict_to(
        &mut self,
        info: &CutInfo,
        domain: CombinedDomainType,
        facets: Option<BitSet>,
    ) -> Result<(), CutError> {
        info.classification().check_mesh(self.mesh)?;
        self.set_restriction(info.elements_of_type(domain), facets)?;
        self.source = Some(info.field_stamp());
        Ok(())
    }

    /// Field generation the restriction was derived from, if it was taken
    /// from a [`CutInfo`].
    pub fn source_stamp(&self) -> Option<FieldStamp> {
        self.source
    }

    pub fn element_restriction(&self) -> &BitSet {
        &self.elements
    }

    pub fn facet_restriction(&self) -> Option<&BitSet> {
        self.facets.as_ref()
    }

    /// Number of rows and columns of assembled matrices.
    pub fn ndof(&self) -> usize {
        self.space.ndof()
    }

    /// Sparsity pattern touched by the current restriction.
    pub fn pattern(&self) -> Result<SparsityPattern, CutError> {
        let facet_dofs: Vec<Vec<usize>> = self
            .restricted_facets()
            .map(|f| self.facet_dofs(f))
            .collect();
        let element_blocks = self
            .elements
            .iter_ones()
            .map(|e| self.space.element_dofs(e));
        let facet_blocks = facet_dofs.iter().map(Vec::as_slice);
        SparsityPattern::from_blocks(self.space.ndof(), element_blocks.chain(facet_blocks))
    }

    /// Assembles the restricted system.
    ///
    /// `info` must have been computed from the current state of `field`, and a
    /// restriction taken from a [`CutInfo`] must come from that same generation.
    pub fn assemble<E, F>(
        &self,
        info: &CutInfo,
        field: &LevelSetField,
        element_integrator: &E,
        facet_integrator: &F,
    ) -> Result<AssembledSystem, CutError>
    where
        E: ElementIntegrator + ?Sized,
        F: FacetIntegrator + ?Sized,
    {
        info.ensure_current(field)?;
        if let Some(found) = self.source {
            if found != info.field_stamp() {
                return Err(CutError::StaleClassification {
                    expected: info.field_stamp(),
                    found,
                });
            }
        }
        info.classification().check_mesh(self.mesh)?;
        field.check_mesh(self.mesh)?;
        let values = field.values();

        let mut matrix = CsrMatrix::zeros(self.pattern()?);
        let mut rhs = vec![0.0; self.space.ndof()];

        let elements: Vec<usize> = self.elements.iter_ones().collect();
        let element_parts = map_indexed(elements.len(), |i| {
            let e = elements[i];
            let vertices = self.mesh.element_coordinates(e);
            let level_set: Vec<f64> = self
                .mesh
                .element_vertices(e)
                .iter()
                .map(|&v| values[v])
                .collect();
            let dofs = self.space.element_dofs(e);
            let ctx = ElementContext {
                element: e,
                cell_type: self.mesh.cell_type(e),
                vertices: &vertices,
                level_set: &level_set,
                domain_type: info.element_type(e),
                kappa_neg: info.kappa_neg(e),
                dofs,
            };
            let part = element_integrator.integrate(&ctx)?;
            part.check_size(dofs.len())?;
            Ok(part)
        })?;
        for (&e, part) in elements.iter().zip(&element_parts) {
            scatter(&mut matrix, &mut rhs, self.space.element_dofs(e), part)?;
        }

        let facets: Vec<usize> = self.restricted_facets().collect();
        let facet_parts = map_indexed(facets.len(), |i| {
            let f = facets[i];
            let vertices: Vec<[f64; 3]> = self
                .mesh
                .facet_vertices(f)
                .iter()
                .map(|&v| self.mesh.vertex_coordinates(v))
                .collect();
            let dofs = self.facet_dofs(f);
            let ctx = FacetContext {
                facet: f,
                neighbors: self.mesh.facet_neighbors(f),
                vertices: &vertices,
                facet_type: info.facet_type(f),
                dofs: &dofs,
            };
            let part = facet_integrator.integrate(&ctx)?;
            part.check_size(dofs.len())?;
            Ok((dofs, part))
        })?;
        for (dofs, part) in &facet_parts {
            scatter(&mut matrix, &mut rhs, dofs, part)?;
        }

        log::debug!(
            "assembled {} elements and {} facets into {}x{} matrix with {} entries",
            elements.len(),
            facets.len(),
            matrix.nrows(),
            matrix.ncols(),
            matrix.nnz()
        );
        Ok(AssembledSystem {
            matrix,
            rhs,
            field_stamp: field.stamp(),
        })
    }

    fn restricted_facets(&self) -> impl Iterator<Item = usize> + '_ {
        self.facets.iter().flat_map(|f| f.iter_ones())
    }

    fn facet_dofs(&self, facet: usize) -> Vec<usize> {
        let mut dofs = Vec::new();
        for e in self.mesh.facet_neighbors(facet).elements() {
            for &d in self.space.element_dofs(e) {
                if !dofs.contains(&d) {
                    dofs.push(d);
                }
            }
        }
        dofs
    }
}

fn validate_restriction<M>(mesh: &M, elements: &BitSet, facets: Option<&BitSet>) -> Result<(), CutError>
where
    M: MeshTopology + ?Sized,
{
    if elements.len() != mesh.num_elements() {
        return Err(CutError::InconsistentSpace(format!(
            "element restriction of length {} for a mesh with {} elements",
            elements.len(),
            mesh.num_elements()
        )));
    }
    let Some(facets) = facets else {
        return Ok(());
    };
    if facets.len() != mesh.num_facets() {
        return Err(CutError::InconsistentSpace(format!(
            "facet restriction of length {} for a mesh with {} facets",
            facets.len(),
            mesh.num_facets()
        )));
    }
    match facets
        .iter_ones()
        .find(|&f| !mesh.facet_neighbors(f).elements().any(|e| elements.get(e)))
    {
        Some(facet) => Err(CutError::RestrictionMismatch { facet }),
        None => Ok(()),
    }
}

fn scatter(
    matrix: &mut CsrMatrix,
    rhs: &mut [f64],
    dofs: &[usize],
    part: &LocalContribution,
) -> Result<(), CutError> {
    matrix.add_block(dofs, &part.matrix)?;
    for (&d, &v) in dofs.iter().zip(&part.vector) {
        rhs[d] += v;
    }
    Ok(())
}
