//! Band-stop coefficient design
//!
//! Order-2 Butterworth band-stop via the bilinear transform:
//!
//! 1. Band edges `center ± bandwidth / 2` are mapped to rad/sample and
//!    clamped into `(0, π)`.
//! 2. Edges are pre-warped (`Ω = tan(ω / 2)`), giving the analog notch
//!    center `Ω0 = sqrt(Ω1·Ω2)` and width `B = Ω2 − Ω1`.
//! 3. Each prototype pole `p` yields two band-stop poles, the roots of
//!    `s² − (B/p)·s + Ω0² = 0`. Zeros sit at `±jΩ0`.
//! 4. Poles are mapped with `z = (1 + s) / (1 − s)`; every conjugate pole
//!    pair becomes one biquad with its zeros on the unit circle at the
//!    warped notch center.
//!
//! The analog band-stop transform keeps poles in the left half plane and
//! the bilinear map keeps them inside the unit circle, so any valid input
//! produces a stable filter. The explicit stability check only guards
//! against floating-point breakdown.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use nf_core::{
    validate_frequency, validate_sample_rate, NotchError, NotchParam, NotchParams, NotchResult,
};
use num_complex::Complex64;

use crate::biquad::BiquadCoeffs;

/// Order of the analog low-pass prototype
pub const NOTCH_ORDER: usize = 2;

/// Number of biquad sections produced by the band transform
pub const NOTCH_SECTIONS: usize = NOTCH_ORDER;

/// Edge clamp keeping band edges strictly inside `(0, π)`
const EDGE_EPSILON: f64 = 1e-8;

/// Coefficients of one notch: a cascade of biquad sections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotchCoeffs {
    pub sections: [BiquadCoeffs; NOTCH_SECTIONS],
}

impl NotchCoeffs {
    /// Pass-through cascade
    pub fn bypass() -> Self {
        Self {
            sections: [BiquadCoeffs::bypass(); NOTCH_SECTIONS],
        }
    }

    /// Magnitude response at `freq_hz` for the given sample rate
    pub fn magnitude_at(&self, freq_hz: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq_hz / sample_rate;
        self.sections
            .iter()
            .map(|section| section.magnitude_at(omega))
            .product()
    }

    /// Every section finite with its conjugate pole pair inside the unit
    /// circle (`a2` is the squared pole radius)
    pub fn is_stable(&self) -> bool {
        self.sections
            .iter()
            .all(|section| section.is_finite() && section.a2 < 1.0)
    }
}

/// Design a band-stop filter for `params` at `sample_rate`.
///
/// Fails with `InvalidParameter` when an input is outside its domain and
/// with `DesignFailure` when the band collapses (center at or above
/// Nyquist) or the result is not stable.
pub fn design(sample_rate: f64, params: NotchParams) -> NotchResult<NotchCoeffs> {
    validate_sample_rate(sample_rate)?;
    validate_frequency(NotchParam::CenterFrequency, params.center_frequency_hz)?;
    validate_frequency(NotchParam::Bandwidth, params.bandwidth_hz)?;

    let to_omega = |hz: f64| 2.0 * PI * hz / sample_rate;
    let omega_low = to_omega(params.low_edge_hz()).max(EDGE_EPSILON);
    let omega_high = to_omega(params.high_edge_hz()).min(PI - EDGE_EPSILON);

    if omega_low >= omega_high {
        return Err(NotchError::design(format!(
            "notch {} Hz / {} Hz does not fit below Nyquist at {} Hz",
            params.center_frequency_hz, params.bandwidth_hz, sample_rate
        )));
    }

    let warped_low = (omega_low * 0.5).tan();
    let warped_high = (omega_high * 0.5).tan();
    let center_sq = warped_low * warped_high;
    let width = warped_high - warped_low;
    let zero_angle = 2.0 * center_sq.sqrt().atan();

    let reference = if zero_angle < PI * 0.5 {
        GainReference::Dc
    } else {
        GainReference::Nyquist
    };

    let mut sections = [BiquadCoeffs::bypass(); NOTCH_SECTIONS];
    for (k, s) in prototype_poles()
        .iter()
        .flat_map(|&pole| band_stop_poles(pole, width, center_sq))
        .enumerate()
    {
        let z = bilinear(s);
        if !(z.re.is_finite() && z.im.is_finite()) || z.norm() >= 1.0 {
            return Err(NotchError::design(format!(
                "unstable notch {} Hz / {} Hz at {} Hz",
                params.center_frequency_hz, params.bandwidth_hz, sample_rate
            )));
        }
        let gain = reference.section_gain(s, zero_angle);
        sections[k] = BiquadCoeffs::from_pole_zero(z, zero_angle).with_gain(1.0 / gain);
    }

    let coeffs = NotchCoeffs { sections };
    if !coeffs.is_stable() {
        return Err(NotchError::design(format!(
            "non-finite coefficients for {} Hz / {} Hz at {} Hz",
            params.center_frequency_hz, params.bandwidth_hz, sample_rate
        )));
    }

    Ok(coeffs)
}

/// Upper-half-plane Butterworth prototype poles (conjugates implied)
fn prototype_poles() -> [Complex64; NOTCH_ORDER / 2] {
    [Complex64::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2)]
}

/// Low-pass → band-stop pole mapping.
///
/// The smaller root is recovered from the product of roots (`Ω0²`) since
/// the direct difference cancels badly for wide bands.
fn band_stop_poles(pole: Complex64, width: f64, center_sq: f64) -> [Complex64; 2] {
    let half = Complex64::new(width, 0.0) / (pole * 2.0);
    let root = (half * half - center_sq).sqrt();
    let (plus, minus) = (half + root, half - root);
    let large = if plus.norm_sqr() >= minus.norm_sqr() { plus } else { minus };
    [large, center_sq / large]
}

/// Frequency at which each section is scaled to unity gain: whichever end
/// of the spectrum lies farther from the notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GainReference {
    Dc,
    Nyquist,
}

impl GainReference {
    /// Section gain at the reference point, evaluated in pole/zero form.
    ///
    /// With `z = (1 + s) / (1 − s)`: `|1 − z| = 2|s| / |1 − s|` and
    /// `|1 + z| = 2 / |1 − s|`, which stays accurate when poles crowd the
    /// unit circle.
    fn section_gain(self, s: Complex64, zero_angle: f64) -> f64 {
        let one_minus_s = (1.0 - s).norm_sqr();
        match self {
            Self::Dc => (zero_angle * 0.5).sin().powi(2) * one_minus_s / s.norm_sqr(),
            Self::Nyquist => (zero_angle * 0.5).cos().powi(2) * one_minus_s,
        }
    }
}

#[inline]
fn bilinear(s: Complex64) -> Complex64 {
    (1.0 + s) / (1.0 - s)
}
