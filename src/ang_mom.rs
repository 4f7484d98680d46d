//! Spin coupling.
use super::half::Half;

/// Returns `(-1)^φ`
#[inline]
pub fn phase(phi: i32) -> f64 {
    if phi % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Returns `(2 * j + 1)^(e / 2)`.
#[inline]
pub fn jweight(j: Half<i32>, e: i32) -> f64 {
    ((j.twice() + 1) as f64).powf(e as f64 / 2.0)
}

/// `SIX_J[s][z] == {1/2 1/2 s; 1/2 1/2 z}` for `s, z ∈ {0, 1}`.  These are
/// the only 6-j symbols needed to recouple three spin-1/2 particles to a
/// total spin of 1/2.
pub const SIX_J: [[f64; 2]; 2] = [
    [-0.5, 0.5],
    [0.5, 1.0 / 6.0],
];

/// Shorthand for `SIX_J[s][z]`.
#[inline]
pub fn six_j(s: usize, z: usize) -> f64 {
    SIX_J[s][z]
}

/// Coefficient for moving the third spin of a spin-1/2 triple into the
/// pair: `|(1 2)_j 3⟩ = ∑[k] R[j k] |(1 3)_k 2⟩`, including the sign of the
/// fermion exchange `2 ↔ 3`.
#[inline]
pub fn recouple(j: usize, k: usize) -> f64 {
    phase((j + k) as i32)
        * jweight(Half::from(j as i32), 1)
        * jweight(Half::from(k as i32), 1)
        * six_j(j, k)
}
