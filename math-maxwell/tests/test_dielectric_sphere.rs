//! Dielectric sphere in the quasi-static regime
//!
//! A unit sphere with k·a = 0.3 and ε_r = 2.1 is compared against the
//! Rayleigh (dipole) solution. Generates JSON output for the validation runs.

use std::sync::Arc;

use math_audio_maxwell::core::mesh::icosphere;
use math_audio_maxwell::core::postprocess::PointLocation;
use math_audio_maxwell::core::vector::intensity;
use math_audio_maxwell::core::{
    Device, MaxwellSolver, PhysicsParams, ScatteringProblem, ScatteringSolution,
};
use math_audio_maxwell::testing::{RayleighSphere, ValidationReport, output_dir};
use ndarray::{Array2, array};
use num_complex::Complex64;

const K: f64 = 0.3;
const EPS_R: f64 = 2.1;

fn solve_sphere(eps_r: f64, device: Device) -> ScatteringSolution {
    let mesh = Arc::new(icosphere(1.0, 1).unwrap());
    let physics = PhysicsParams::with_wavenumber(K, eps_r, 1.0).unwrap();
    let problem = ScatteringProblem::plane_wave(mesh, physics, 0.0).unwrap();
    MaxwellSolver::new()
        .with_device(device)
        .solve(&problem)
        .unwrap()
}

fn row(field: &Array2<Complex64>, i: usize) -> [Complex64; 3] {
    [field[[i, 0]], field[[i, 1]], field[[i, 2]]]
}

#[test]
fn test_centre_reports_interior_field() {
    let solution = solve_sphere(EPS_R, Device::Parallel);
    let samples = solution.evaluate(&array![[0.0, 0.0, 0.0]]).unwrap();

    assert_eq!(samples.locations[0], PointLocation::Interior);
    assert!(samples.report.is_clean());
    // Interior points take the interior path, never the sentinel
    let total = samples.total_intensity()[0];
    assert!(total.is_finite());
    assert!(samples.scattered_intensity()[0].is_nan());

    // Rayleigh: |3/(ε+2)|² ≈ 0.54
    println!(
        "centre intensity {:.4}, Rayleigh {:.4}",
        total,
        RayleighSphere::new(K, 1.0, EPS_R).interior_factor().powi(2)
    );
    assert!((0.25..=1.0).contains(&total), "centre intensity {total}");
}

#[test]
fn test_far_field_below_rayleigh_bound() {
    let solution = solve_sphere(EPS_R, Device::Parallel);
    let reference = RayleighSphere::new(K, 1.0, EPS_R);
    let positions = vec![[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [-6.0, 8.0, 0.0]];
    let points = Array2::from_shape_fn((positions.len(), 3), |(i, c)| positions[i][c]);
    let samples = solution.evaluate(&points).unwrap();
    assert!(samples.report.is_clean());

    let computed: Vec<_> = (0..positions.len())
        .map(|i| row(&samples.scattered, i))
        .collect();
    let expected: Vec<_> = positions
        .iter()
        .map(|x| reference.scattered_field(solution.incident(), x))
        .collect();

    for (i, x) in positions.iter().enumerate() {
        let r = (x[0] * x[0] + x[1] * x[1] + x[2] * x[2]).sqrt();
        let bem = intensity(&computed[i]);
        let dipole = intensity(&expected[i]);
        println!("r = {r}: scattered {bem:.3e}, dipole {dipole:.3e}");
        assert!(bem < reference.scattered_intensity_bound(r));
        assert!(bem > 0.0);
    }

    // The coarse icosphere encloses less volume than the sphere; the dipole
    // estimate still holds within a factor of a few
    let ratio = intensity(&computed[0]) / intensity(&expected[0]);
    assert!((0.3..2.0).contains(&ratio), "BEM / dipole = {ratio}");

    let report = ValidationReport::new(
        "Dielectric sphere (Rayleigh, ka=0.3)",
        reference,
        80,
        positions,
        &expected,
        &computed,
    );
    if let Ok(dir) = output_dir("rayleigh") {
        report.save_json(dir.join("dielectric_sphere_rayleigh.json")).unwrap();
    }
}

#[test]
fn test_total_is_scattered_plus_incident_outside() {
    let solution = solve_sphere(EPS_R, Device::Parallel);
    let points = array![[2.0, 0.5, 0.0], [-1.5, -1.5, 0.3], [0.0, 0.0, 4.0]];
    let samples = solution.evaluate(&points).unwrap();
    let incident = solution.incident().evaluate_field(&points);
    for i in 0..points.nrows() {
        assert_eq!(samples.locations[i], PointLocation::Exterior);
        assert!(samples.interior[[i, 0]].re.is_nan());
        for c in 0..3 {
            let expected = samples.scattered[[i, c]] + incident[[i, c]];
            assert!((samples.total[[i, c]] - expected).norm() < 1e-14);
        }
    }
}

#[test]
fn test_axial_symmetry() {
    // Incidence along x, polarization along z: mirror symmetry y → −y
    let solution = solve_sphere(EPS_R, Device::Parallel);
    let points = array![
        [2.0, 1.0, 0.0],
        [2.0, -1.0, 0.0],
        [-1.5, 2.5, 0.0],
        [-1.5, -2.5, 0.0],
        [0.3, 0.4, 0.0],
        [0.3, -0.4, 0.0],
    ];
    let total = solution.evaluate(&points).unwrap().total_intensity();
    for pair in 0..3 {
        let (a, b) = (total[2 * pair], total[2 * pair + 1]);
        assert!(
            (a - b).abs() <= 1e-6 * a.abs().max(b.abs()),
            "pair {pair}: {a} vs {b}"
        );
    }
}

#[test]
fn test_sequential_and_parallel_agree_bitwise() {
    let points = array![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.5, 3.0, -1.0]];
    let seq = solve_sphere(EPS_R, Device::Sequential)
        .evaluate(&points)
        .unwrap();
    let par = solve_sphere(EPS_R, Device::Parallel)
        .evaluate(&points)
        .unwrap();
    for (a, b) in seq.total.iter().zip(par.total.iter()) {
        assert_eq!(a.re.to_bits(), b.re.to_bits());
        assert_eq!(a.im.to_bits(), b.im.to_bits());
    }
}
