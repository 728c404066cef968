use crate::prelude::{StageError, StageResult};
use std::collections::VecDeque;

/// Parks-McClellan low-pass FIR kernel: 0-1 Hz pass band, 0.001 ripple deviation, designed
/// for telemetry sampled at roughly 30 Hz. Symmetric, 100 taps.
pub const PM_LPF_COEFFS: [f64; 100] = [
    0.0001, 0.0001, 0.0001, 0.0001, 0.0002, 0.0003, 0.0003, 0.0004, 0.0006, 0.0007, 0.0009, 0.0011,
    0.0013, 0.0016, 0.0019, 0.0022, 0.0026, 0.0030, 0.0035, 0.0040, 0.0045, 0.0051, 0.0058, 0.0065,
    0.0072, 0.0079, 0.0087, 0.0096, 0.0104, 0.0113, 0.0123, 0.0132, 0.0141, 0.0151, 0.0160, 0.0169,
    0.0178, 0.0187, 0.0195, 0.0203, 0.0211, 0.0218, 0.0224, 0.0230, 0.0235, 0.0239, 0.0243, 0.0246,
    0.0247, 0.0248, 0.0248, 0.0247, 0.0246, 0.0243, 0.0239, 0.0235, 0.0230, 0.0224, 0.0218, 0.0211,
    0.0203, 0.0195, 0.0187, 0.0178, 0.0169, 0.0160, 0.0151, 0.0141, 0.0132, 0.0123, 0.0113, 0.0104,
    0.0096, 0.0087, 0.0079, 0.0072, 0.0065, 0.0058, 0.0051, 0.0045, 0.0040, 0.0035, 0.0030, 0.0026,
    0.0022, 0.0019, 0.0016, 0.0013, 0.0011, 0.0009, 0.0007, 0.0006, 0.0004, 0.0003, 0.0003, 0.0002,
    0.0001, 0.0001, 0.0001, 0.0001,
];

/// Discrete transfer function `B(z) / A(z)` evaluated in direct form.
///
/// For every input sample `x[n]`:
///
/// ```text
/// y[n] = (sum_{i=0}^{M-1} b[i] x[n-i] - sum_{i=1}^{N-1} a[i] y[n-i]) / a[0]
/// ```
///
/// with zero initial state. A leading denominator coefficient of zero has no meaning for this
/// recurrence, so construction rejects it instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFilter {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl TransferFilter {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> StageResult<Self> {
        if b.is_empty() {
            return Err(StageError::InvalidInput(
                "filter numerator has no coefficients".into(),
            ));
        }
        match a.first() {
            None => {
                return Err(StageError::InvalidInput(
                    "filter denominator has no coefficients".into(),
                ))
            }
            Some(&a0) if a0 == 0.0 => {
                return Err(StageError::InvalidInput(
                    "leading denominator coefficient must be non-zero".into(),
                ))
            }
            Some(_) => {}
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(StageError::InvalidInput(
                "filter coefficients must be finite".into(),
            ));
        }
        Ok(Self { b, a })
    }

    /// FIR filter: denominator fixed to `[1]`.
    pub fn fir(b: Vec<f64>) -> StageResult<Self> {
        Self::new(b, vec![1.0])
    }

    /// Constant lag of a symmetric FIR kernel, in samples.
    pub fn group_delay(&self) -> usize {
        self.b.len() / 2
    }

    /// Filters `signal`; the output has the same length as the input.
    pub fn transform(&self, signal: &[f64]) -> Vec<f64> {
        let mut x_hist: VecDeque<f64> = VecDeque::from(vec![0.0; self.b.len()]);
        let mut y_hist: VecDeque<f64> = VecDeque::from(vec![0.0; self.a.len()]);
        let a0 = self.a[0];

        signal
            .iter()
            .map(|&x| {
                x_hist.pop_back();
                x_hist.push_front(x);

                let feedforward: f64 = self.b.iter().zip(&x_hist).map(|(b, x)| b * x).sum();
                // y_hist[0] holds y[n-1] until the new output is pushed.
                let feedback: f64 = self
                    .a
                    .iter()
                    .skip(1)
                    .zip(&y_hist)
                    .map(|(a, y)| a * y)
                    .sum();

                let y = (feedforward - feedback) / a0;
                y_hist.pop_back();
                y_hist.push_front(y);
                y
            })
            .collect()
    }
}
