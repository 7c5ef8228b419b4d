//! Numeric helpers for combinatorics in log space.
//!
//! Abundance totals of realistic repertoires run into the millions, so binomial coefficients
//! are never formed directly. Everything here works with logarithms of factorials, which are
//! looked up for small arguments and evaluated by a Lanczos approximation of ln Γ otherwise.
//!
//! The Lanczos coefficients are those used by statrs.

pub use factorial::ln_factorial;
pub use gamma::ln_gamma;

/// Returns the natural logarithm of the binomial coefficient C(n, k).
///
/// Returns negative infinity if `k > n`, since the coefficient is then zero.
pub fn ln_binomial(n: u64, k: u64) -> f64 {
    if k > n {
        f64::NEG_INFINITY
    } else {
        ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
    }
}

/// Returns the probability that a category is absent from a sample.
///
/// A category with `successes` individuals among `size` individuals is missed by a simple random
/// sample of `draws` individuals without replacement with probability
/// C(size - successes, draws) / C(size, draws), which is the hypergeometric probability of
/// observing zero successes.
///
/// The category cannot be missed when `draws > size - successes`, and the probability is then
/// zero. Drawing more than `size` individuals is clamped to `size`.
pub fn miss_probability(size: u64, successes: u64, draws: u64) -> f64 {
    let draws = draws.min(size);
    let failures = size.saturating_sub(successes);

    if draws == 0 {
        1.0
    } else if draws > failures {
        0.0
    } else {
        (ln_factorial(failures) - ln_factorial(failures - draws) - ln_factorial(size)
            + ln_factorial(size - draws))
        .exp()
    }
}

mod factorial {
    use std::sync::OnceLock;

    use super::gamma::ln_gamma;

    const MAX: usize = 170;
    const PRECOMPUTED_LEN: usize = MAX + 1;

    fn precomputed() -> &'static [f64; PRECOMPUTED_LEN] {
        static PRECOMPUTED: OnceLock<[f64; PRECOMPUTED_LEN]> = OnceLock::new();

        PRECOMPUTED.get_or_init(|| {
            let mut precomputed = [0.0; PRECOMPUTED_LEN];

            precomputed
                .iter_mut()
                .enumerate()
                .skip(1)
                .fold(1.0f64, |acc, (i, x)| {
                    let factorial = acc * i as f64;
                    *x = factorial.ln();
                    factorial
                });

            precomputed
        })
    }

    /// Returns ln(x!).
    pub fn ln_factorial(x: u64) -> f64 {
        usize::try_from(x)
            .ok()
            .and_then(|x| precomputed().get(x))
            .copied()
            .unwrap_or_else(|| ln_gamma(x as f64 + 1.0))
    }
}

mod gamma {
    use std::f64::consts::{E, PI};

    const LN_2_SQRT_E_OVER_PI: f64 = 0.620_782_237_635_245_2;
    const LN_PI: f64 = 1.144_729_885_849_400_2;
    const R: f64 = 10.900511;
    const DK: &[f64] = &[
        2.485_740_891_387_535_5e-5,
        1.051_423_785_817_219_7,
        -3.456_870_972_220_162_5,
        4.512_277_094_668_948,
        -2.982_852_253_235_766_4,
        1.056_397_115_771_267,
        -1.954_287_731_916_458_7e-1,
        1.709_705_434_044_412e-2,
        -5.719_261_174_043_057e-4,
        4.633_994_733_599_057e-6,
        -2.719_949_084_886_077_2e-9,
    ];

    /// Returns ln Γ(x).
    pub fn ln_gamma(x: f64) -> f64 {
        let series = |shift: f64| {
            DK.iter()
                .enumerate()
                .skip(1)
                .fold(DK[0], |s, (k, d)| s + d / (k as f64 + shift))
        };

        if x < 0.5 {
            // Reflection
            LN_PI
                - (PI * x).sin().ln()
                - series(-x).ln()
                - LN_2_SQRT_E_OVER_PI
                - (0.5 - x) * ((0.5 - x + R) / E).ln()
        } else {
            series(x - 1.0).ln() + LN_2_SQRT_E_OVER_PI + (x - 0.5) * ((x - 0.5 + R) / E).ln()
        }
    }
}
