//! Vector-space operations shared by all the block matrices.

/// An element of a real inner-product space.
pub trait Vector: Clone {
    /// Inner product.
    fn ddot(&self, other: &Self) -> f64;
}

pub trait VectorMut: Vector {
    fn set_zero(&mut self);

    /// `self ← alpha * self`
    fn dscal(&mut self, alpha: f64);

    /// `self ← self + alpha * x`
    fn daxpy(&mut self, alpha: f64, x: &Self);
}

impl Vector for Vec<f64> {
    fn ddot(&self, other: &Self) -> f64 {
        assert_eq!(self.len(), other.len());
        self.iter().zip(other).map(|(x, y)| x * y).sum()
    }
}

impl VectorMut for Vec<f64> {
    fn set_zero(&mut self) {
        for x in self {
            *x = 0.0;
        }
    }

    fn dscal(&mut self, alpha: f64) {
        for x in self {
            *x *= alpha;
        }
    }

    fn daxpy(&mut self, alpha: f64, x: &Self) {
        assert_eq!(self.len(), x.len());
        for (y, x) in self.iter_mut().zip(x) {
            *y += alpha * x;
        }
    }
}
