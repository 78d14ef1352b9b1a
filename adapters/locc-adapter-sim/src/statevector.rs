//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use locc_ir::{Circuit, Gate, GateOp};

/// A statevector over `n` qubits.
///
/// Basis index bit `k` holds the value of qubit `k`.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        Self::from_basis(num_qubits, 0)
    }

    /// Create the computational basis state with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in `num_qubits` bits.
    pub fn from_basis(num_qubits: usize, index: usize) -> Self {
        let size = 1 << num_qubits;
        assert!(index < size, "basis index {index} out of range for {num_qubits} qubits");
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[index] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The state amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Apply every operation of a circuit in order.
    pub fn apply_circuit(&mut self, circuit: &Circuit) {
        for op in circuit.ops() {
            self.apply_op(op);
        }
    }

    /// Apply a single operation.
    pub fn apply_op(&mut self, op: &GateOp) {
        let q = |i: usize| op.qubits[i].index();
        match op.gate {
            Gate::H => self.apply_h(q(0)),
            Gate::Rx(theta) => self.apply_rx(q(0), theta),
            Gate::Ry(theta) => self.apply_ry(q(0), theta),
            Gate::Rz(theta) => self.apply_rz(q(0), theta),
            Gate::Cx => self.apply_cx(q(0), q(1)),
        }
    }

    /// Fidelity |⟨self|other⟩|² with another state of the same width.
    pub fn fidelity(&self, other: &Statevector) -> f64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum::<Complex64>()
            .norm_sqr()
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    /// Apply a real or complex 2x2 matrix `[[m00, m01], [m10, m11]]`.
    fn apply_single(&mut self, qubit: usize, m: [[Complex64; 2]; 2]) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let s = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        self.apply_single(qubit, [[s, s], [s, -s]]);
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        self.apply_single(qubit, [[c, neg_i_s], [neg_i_s, c]]);
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let c = Complex64::new((theta / 2.0).cos(), 0.0);
        let s = Complex64::new((theta / 2.0).sin(), 0.0);
        self.apply_single(qubit, [[c, -s], [s, c]]);
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let zero = Complex64::new(0.0, 0.0);
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        self.apply_single(qubit, [[phase_0, zero], [zero, phase_1]]);
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Sample one basis index from the measurement distribution.
    pub fn sample<R: Rng + ?Sized>(probabilities: &[f64], rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        for (i, p) in probabilities.iter().enumerate() {
            cumulative += p;
            if r < cumulative {
                return i;
            }
        }
        // Rounding can leave the cumulative sum just under 1.
        probabilities
            .iter()
            .rposition(|&p| p > 0.0)
            .unwrap_or(probabilities.len() - 1)
    }
}

/// Render the measured qubits of a basis index, lowest qubit first.
pub fn outcome_to_bitstring(outcome: usize, measured: &[usize]) -> String {
    measured
        .iter()
        .map(|&q| if outcome >> q & 1 == 1 { '1' } else { '0' })
        .collect()
}
