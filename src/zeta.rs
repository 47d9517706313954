// src/zeta.rs

//! Truncated-series evaluation of the Riemann zeta function for the
//! trajectory view. Not an analytic continuation: zeta is recovered from
//! the alternating Dirichlet eta series, `zeta(s) = eta(s) / (1 - 2^(1-s))`,
//! with both series cut off at a fixed term count.

use std::f64::consts::LN_2;

/// Minimal complex pair; the only consumer is this module and the zeta
/// trajectory view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    #[inline]
    #[must_use]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline]
    #[must_use]
    pub fn abs(self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }
}

/// `zeta(s_re + i*s_im)` via `eta_terms` terms of the eta series.
///
/// Each term `n^(-s)` is evaluated in polar form: magnitude `n^(-s_re)`,
/// angle `-s_im * ln n`.
#[must_use]
pub fn zeta(s_re: f64, s_im: f64, eta_terms: u32) -> Complex {
    let mut eta = Complex::ZERO;
    for n in 1..=eta_terms {
        let nf = f64::from(n);
        let magn = nf.powf(-s_re);
        let angle = -s_im * nf.ln();
        let term_re = magn * angle.cos();
        let term_im = magn * angle.sin();
        if n % 2 == 1 {
            eta.re += term_re;
            eta.im += term_im;
        } else {
            eta.re -= term_re;
            eta.im -= term_im;
        }
    }

    // 1 - 2^(1-s), with 2^(1-s) in polar form.
    let factor_magn = 2f64.powf(1.0 - s_re);
    let factor_angle = -s_im * LN_2;
    let den_re = 1.0 - factor_magn * factor_angle.cos();
    let den_im = -factor_magn * factor_angle.sin();
    let den_sq = den_re * den_re + den_im * den_im;

    Complex::new(
        (eta.re * den_re + eta.im * den_im) / den_sq,
        (eta.im * den_re - eta.re * den_im) / den_sq,
    )
}

/// `zeta(1/2 + it)`: the critical-line point the trajectory traces.
#[inline]
#[must_use]
pub fn zeta_half_line(t: f64, eta_terms: u32) -> Complex {
    zeta(0.5, t, eta_terms)
}

/// Running partial sums of `sum_{n=1}^{terms} n^(-s)` for `s = s_re + it`.
/// The view draws these as a polyline from the origin.
#[must_use]
pub fn partial_sums(s_re: f64, t: f64, terms: u32) -> Vec<Complex> {
    let mut out = Vec::with_capacity(terms as usize);
    let mut sum = Complex::ZERO;
    for n in 1..=terms {
        let nf = f64::from(n);
        let magn = nf.powf(-s_re);
        let angle = -t * nf.ln();
        sum.re += magn * angle.cos();
        sum.im += magn * angle.sin();
        out.push(sum);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn zeta_two_matches_basel() {
        let z = zeta(2.0, 0.0, 500);
        assert!((z.re - PI * PI / 6.0).abs() < 1e-4, "got {}", z.re);
        assert!(z.im.abs() < 1e-12);
    }

    #[test]
    fn zeta_half_at_zero_is_real_and_negative() {
        // zeta(1/2) = -1.4603545..., known to the truncation error of the
        // alternating series (first omitted term ~ 0.045 / |1 - sqrt(2)|).
        let z = zeta_half_line(0.0, 500);
        assert!((z.re + 1.4603545).abs() < 0.15, "got {}", z.re);
        assert!(z.im.abs() < 1e-12);
    }

    #[test]
    fn zeta_is_deterministic() {
        let a = zeta_half_line(14.134725, 500);
        let b = zeta_half_line(14.134725, 500);
        assert_eq!(a, b);
    }

    #[test]
    fn partial_sums_walk_starts_at_one() {
        let sums = partial_sums(0.5, 21.022, 50);
        assert_eq!(sums.len(), 50);
        assert_eq!(sums[0].re, 1.0);
        assert!(sums[0].im.abs() < 1e-12);
    }

    #[test]
    fn complex_abs() {
        assert_eq!(Complex::new(3.0, 4.0).abs(), 5.0);
    }
}
