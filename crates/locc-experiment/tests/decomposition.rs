//! Statevector checks of the controlled-RY decomposition.

use num_complex::Complex64;
use proptest::prelude::*;

use locc_adapter_sim::Statevector;
use locc_experiment::{Angle, GateDecomposer};
use locc_ir::{GateOp, GateSet, QubitId};

const CONTROL: QubitId = QubitId(0);
const TARGET: QubitId = QubitId(1);

fn decompose(degrees: f64) -> Vec<GateOp> {
    GateDecomposer::new(&GateSet::erasure_native())
        .unwrap()
        .decompose_controlled_rotation(CONTROL, TARGET, Angle::from_degrees(degrees))
        .unwrap()
        .to_vec()
}

fn run(mut state: Statevector, ops: &[GateOp]) -> Statevector {
    for op in ops {
        state.apply_op(op);
    }
    state
}

fn assert_same_state(a: &Statevector, b: &Statevector) {
    for (x, y) in a.amplitudes().iter().zip(b.amplitudes()) {
        assert!((x - y).norm() < 1e-10, "{x} != {y}");
    }
}

/// Basis index with control in bit 0 and target in bit 1.
fn basis(control: usize, target: usize) -> Statevector {
    Statevector::from_basis(2, control | (target << 1))
}

#[test]
fn forward_then_reverse_is_identity_on_all_basis_states() {
    for degrees in [0.0, 30.0, 90.0, 137.5, 180.0, -45.0] {
        let mut ops = decompose(degrees);
        ops.extend(decompose(-degrees));
        for index in 0..4 {
            let input = Statevector::from_basis(2, index);
            let output = run(input.clone(), &ops);
            assert_same_state(&output, &input);
        }
    }
}

#[test]
fn control_zero_leaves_target_unchanged() {
    for degrees in [30.0, 90.0, 180.0, 270.0] {
        let ops = decompose(degrees);
        for target in 0..2 {
            let input = basis(0, target);
            assert_same_state(&run(input.clone(), &ops), &input);
        }
    }
}

#[test]
fn control_one_applies_ry() {
    for degrees in [30.0, 60.0, 90.0, 150.0, 180.0] {
        let ops = decompose(degrees);
        let ry = [GateOp::ry(Angle::from_degrees(degrees).radians(), TARGET)];
        for target in 0..2 {
            let input = basis(1, target);
            assert_same_state(&run(input.clone(), &ops), &run(input, &ry));
        }
    }
}

#[test]
fn superposed_control_matches_controlled_ry() {
    // (|0⟩ + |1⟩)/√2 ⊗ |0⟩ → (|0⟩|0⟩ + |1⟩ RY(θ)|0⟩)/√2
    let theta = Angle::from_degrees(90.0).radians();
    let h = GateOp::h(CONTROL);
    let state = run(Statevector::new(2), &[h]);
    let output = run(state, &decompose(90.0));

    let s = std::f64::consts::FRAC_1_SQRT_2;
    let expected = [
        Complex64::new(s, 0.0),
        Complex64::new(s * (theta / 2.0).cos(), 0.0),
        Complex64::new(0.0, 0.0),
        Complex64::new(s * (theta / 2.0).sin(), 0.0),
    ];
    for (x, y) in output.amplitudes().iter().zip(&expected) {
        assert!((x - y).norm() < 1e-10);
    }
}

proptest! {
    #[test]
    fn prop_reverse_restores_any_input(degrees in -720.0f64..720.0, index in 0usize..4) {
        let mut ops = decompose(degrees);
        ops.extend(decompose(-degrees));
        let input = Statevector::from_basis(2, index);
        let output = run(input.clone(), &ops);
        prop_assert!((output.fidelity(&input) - 1.0).abs() < 1e-10);
    }
}
