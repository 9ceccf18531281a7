//! Adaptive Gauss–Kronrod quadrature.
//!
//! A 15-point Kronrod rule with its embedded 7-point Gauss rule is applied to
//! the whole interval and then recursively to its halves. A sub-interval is
//! accepted once the Gauss/Kronrod difference falls below `tolerance` times the
//! L1 norm of the integrand over the *whole* interval, or once the recursion
//! depth is exhausted. Tying acceptance to the global norm keeps tails with a
//! negligible contribution from being refined to the depth limit.

/// Kronrod abscissae on `[0, 1]`, descending. Odd indices are the Gauss nodes.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Outcome of an adaptive integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integral {
    pub value: f64,
    /// Sum of `|K - G|` over the accepted sub-intervals.
    pub error_estimate: f64,
    /// Number of integrand evaluations performed.
    pub evaluations: usize,
}

impl Integral {
    fn empty() -> Self {
        Self {
            value: 0.0,
            error_estimate: 0.0,
            evaluations: 0,
        }
    }
}

struct Estimate {
    kronrod: f64,
    gauss: f64,
    l1: f64,
}

fn gauss_kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> Estimate {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let fc = f(center);
    let mut kronrod = WGK[7] * fc;
    let mut gauss = WG[3] * fc;
    let mut l1 = WGK[7] * fc.abs();

    for j in 0..7 {
        let dx = half * XGK[j];
        let f1 = f(center - dx);
        let f2 = f(center + dx);
        kronrod += WGK[j] * (f1 + f2);
        l1 += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            gauss += WG[j / 2] * (f1 + f2);
        }
    }

    Estimate {
        kronrod: kronrod * half,
        gauss: gauss * half,
        l1: l1 * half.abs(),
    }
}

/// Integrates `f` over `[a, b]`.
///
/// Empty or reversed intervals (and non-finite bounds) yield zero rather than a
/// signed result; every caller in this crate integrates over a physical
/// window where a reversed window means "no phase space".
pub fn integrate<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    max_depth: u32,
    tolerance: f64,
) -> Integral {
    if !(a.is_finite() && b.is_finite() && b > a) {
        return Integral::empty();
    }

    let whole = gauss_kronrod_15(&f, a, b);
    let threshold = tolerance * whole.l1;
    let mut result = Integral {
        evaluations: 15,
        ..Integral::empty()
    };
    refine(&f, a, b, whole, max_depth, threshold, &mut result);
    result
}

fn refine<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    estimate: Estimate,
    depth: u32,
    threshold: f64,
    result: &mut Integral,
) {
    let error = (estimate.kronrod - estimate.gauss).abs();
    if depth == 0 || error <= threshold || !error.is_finite() {
        result.value += estimate.kronrod;
        result.error_estimate += error;
        return;
    }

    let mid = 0.5 * (a + b);
    let left = gauss_kronrod_15(f, a, mid);
    let right = gauss_kronrod_15(f, mid, b);
    result.evaluations += 30;
    refine(f, a, mid, left, depth - 1, threshold, result);
    refine(f, mid, b, right, depth - 1, threshold, result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * b.abs().max(1e-300)
    }

    #[test]
    fn integrates_polynomial_exactly_in_a_single_pass() {
        let result = integrate(|x| 3.0 * x * x, 0.0, 2.0, 20, 1e-9);
        assert!(approx(result.value, 8.0, 1e-14));
        assert_eq!(result.evaluations, 15);
    }

    #[test]
    fn integrates_sine_over_half_period() {
        let result = integrate(f64::sin, 0.0, PI, 20, 1e-9);
        assert!(approx(result.value, 2.0, 1e-12));
    }

    #[test]
    fn refines_sharply_peaked_integrand() {
        let width: f64 = 1e-2;
        let exact = 2.0 / width * (1.0 / width).atan();
        let result = integrate(|x| 1.0 / (width * width + x * x), -1.0, 1.0, 20, 1e-9);
        assert!(approx(result.value, exact, 1e-8));
        assert!(result.evaluations > 15);
    }

    #[test]
    fn reversed_or_empty_interval_integrates_to_zero() {
        assert_eq!(integrate(|_| 1.0, 1.0, 0.0, 20, 1e-9).value, 0.0);
        assert_eq!(integrate(|_| 1.0, 1.0, 1.0, 20, 1e-9).value, 0.0);
        assert_eq!(integrate(|_| 1.0, 0.0, f64::NAN, 20, 1e-9).value, 0.0);
    }

    #[test]
    fn zero_depth_returns_single_rule_estimate() {
        let result = integrate(|x| (10.0 * x).sin(), 0.0, 3.0, 0, 1e-12);
        assert_eq!(result.evaluations, 15);
        assert!(result.error_estimate > 0.0);
    }

    #[test]
    fn odd_integrand_over_symmetric_interval_vanishes() {
        let result = integrate(|x| x * x * x, -1.0, 1.0, 20, 1e-9);
        assert!(result.value.abs() < 1e-15);
    }
}
