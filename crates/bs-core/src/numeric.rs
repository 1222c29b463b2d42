use crate::BsError;

/// Floating point type of every variable value.
pub type Real = f64;

/// Convergence tolerance used when a component compares the value it
/// computed in this iteration pass against the previous pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-6,
        }
    }
}

/// Whether `a` and `b` agree within either the absolute or the relative
/// tolerance. NaN never agrees with anything.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(value: Real, what: &'static str) -> Result<Real, BsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(BsError::NonFinite { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pass_to_pass_changes() {
        let tol = Tolerances::default();
        assert!(nearly_equal(21.0, 21.0 + 1e-10, tol));
        assert!(nearly_equal(1e6, 1e6 + 0.5, tol));
        assert!(!nearly_equal(21.0, 21.1, tol));
        assert!(!nearly_equal(Real::NAN, Real::NAN, tol));
    }

    #[test]
    fn ensure_finite_rejects_infinity() {
        let err = ensure_finite(Real::INFINITY, "temperature").unwrap_err();
        assert_eq!(err.to_string(), "temperature must be finite, got inf");
        assert_eq!(ensure_finite(2.5, "temperature"), Ok(2.5));
    }

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6_f64..1e6, b in -1e6_f64..1e6) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}
