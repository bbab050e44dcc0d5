use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use cut_sieve::prelude::*;

fn square_mesh(n: usize) -> UnstructuredMesh {
    let h = 2.0 / n as f64;
    let mut coords = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            coords.push([-1.0 + h * i as f64, -1.0 + h * j as f64]);
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

/// Circle with a seeded radius perturbation, so no two runs cut the same vertices.
fn wobbly_circle(mesh: &UnstructuredMesh, seed: u64) -> LevelSetField {
    let mut rng = SmallRng::seed_from_u64(seed);
    let r = 0.5 + 0.1 * rng.r#gen::<f64>();
    LevelSetField::interpolate(mesh, |p| (p[0] * p[0] + p[1] * p[1]).sqrt() - r)
}

fn bench_cut_info(c: &mut Criterion) {
    let mut group = c.benchmark_group("cut_info");
    for &n in &[32usize, 64, 128] {
        let mesh = square_mesh(n);
        let field = wobbly_circle(&mesh, 42);
        let cfg = CutConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(2 * n * n), &n, |b, _| {
            b.iter(|| CutInfo::new(&mesh, &field, &cfg).unwrap())
        });
    }
    group.finish();
}

fn bench_restricted_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("restricted_assembly");
    for &n in &[32usize, 64] {
        let mesh = square_mesh(n);
        let field = wobbly_circle(&mesh, 7);
        let info = CutInfo::new(&mesh, &field, &CutConfig::default()).unwrap();
        let space = DofMapSpace::p1(&mesh);
        let asm = RestrictedAssembler::from_cut_info(&mesh, &space, &info, CombinedDomainType::HasNeg, None)
            .unwrap();
        let integrator = |ctx: &ElementContext<'_>| -> Result<LocalContribution, CutError> {
            let mut out = LocalContribution::zeros(ctx.dofs.len());
            for v in &mut out.vector {
                *v = ctx.kappa_neg;
            }
            Ok(out)
        };
        group.bench_with_input(BenchmarkId::from_parameter(2 * n * n), &n, |b, _| {
            b.iter(|| asm.assemble(&info, &field, &integrator, &NoFacetIntegrator).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cut_info, bench_restricted_assembly);
criterion_main!(benches);
