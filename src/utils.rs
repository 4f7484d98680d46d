use std::f64;
use conv::ValueInto;

/// Shorthand for casting numbers.  Panics if out of range.
pub fn cast<T: ValueInto<U>, U>(x: T) -> U {
    x.value_into().expect("integer conversion failure")
}

/// Relative and absolute tolerance for comparing floating-point numbers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Toler {
    pub relerr: f64,
    pub abserr: f64,
}

impl Default for Toler {
    fn default() -> Self {
        Self {
            relerr: 1e-8,
            abserr: 1e-8,
        }
    }
}

impl Toler {
    /// Whether `x` and `y` agree within `abserr + relerr * max(|x|, |y|)`.
    pub fn is_eq(&self, x: f64, y: f64) -> bool {
        (x - y).abs() <= self.abserr + self.relerr * f64::max(x.abs(), y.abs())
    }
}
