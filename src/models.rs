//! Model Hamiltonians, reduced to two-particle matrices so that
//! `Tr(H Γ)` is the energy.
use super::basis::{pair_sign, Pair};
use super::tpm::{pair_norm, Tpm};

impl Tpm {
    /// One-dimensional Hubbard model on a periodic ring of `M / 2` sites:
    /// hopping `−1` between neighboring sites and on-site repulsion `u`.
    pub fn hubbard(&mut self, u: f64) {
        let l = self.scheme().num_spatial();
        let n = self.num_particles() as f64;
        let hop = 1.0 / (n - 1.0);
        let adjacent = |x: usize, y: usize| (x + 1) % l == y || x == (y + 1) % l;
        self.fill_upper(|s, i, j, Pair(a, b), Pair(c, d)| {
            let sign = pair_sign(s);
            let mut x = 0.0;
            if a == c && adjacent(b, d) {
                x -= hop;
            }
            if b == c && adjacent(a, d) {
                x -= sign * hop;
            }
            if a == d && adjacent(b, c) {
                x -= sign * hop;
            }
            if b == d && adjacent(a, c) {
                x -= hop;
            }
            if s == 0 && i == j && a == b {
                x += 2.0 * u;
            }
            x * pair_norm(a, b) * pair_norm(c, d)
        });
    }

    /// Reduced BCS pairing model: single-particle energies `a − M/2` for
    /// `a ∈ 0 .. M/2` and a uniform pairing interaction of strength `g`
    /// between doubly occupied orbitals.
    pub fn sp_pairing(&mut self, g: f64) {
        let l = self.scheme().num_spatial();
        let n = self.num_particles() as f64;
        let energy = |a: usize| a as f64 - l as f64;
        // form factor, normalized such that 2 ∑ x² = 1
        let x = 1.0 / (2.0 * l as f64).sqrt();
        self.fill_upper(|_, i, j, Pair(a, b), Pair(c, d)| {
            if i == j {
                let mut h = (energy(a) + energy(b)) / (n - 1.0);
                if a == b {
                    h -= 2.0 * g * x * x;
                }
                h
            } else if a == b && c == d {
                -2.0 * g * x * x
            } else {
                0.0
            }
        });
    }
}
