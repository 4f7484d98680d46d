//! Half-integers for spin quantities.
use std::ops::Add;

/// A spin quantum number, stored as twice its value: `Half(3)` is `3/2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Half<T>(pub T);

impl<T: Add<Output = T> + Clone> From<T> for Half<T> {
    /// Integer spin.
    #[inline]
    fn from(t: T) -> Self {
        Half(t.clone() + t)
    }
}

impl<T> Half<T> {
    #[inline]
    pub fn twice(self) -> T {
        self.0
    }
}

impl Half<i32> {
    /// Spin multiplicity `2 s + 1`.
    #[inline]
    pub fn multiplicity(self) -> f64 {
        (self.0 + 1) as f64
    }
}
