//! Three-particle matrices: the image of the T1 condition.
//!
//! The matrix lives on the antisymmetric three-particle states of
//! [`DpTable`](../basis/struct.DpTable.html): block 0 has total spin 1/2
//! (degeneracy 2) and block 1 has total spin 3/2 (degeneracy 4).  The T1 map
//! is the lift `hat` of the Q-like image
//! `Q(1, 1 / (3 N (N − 1)), 1 / (2 (N − 1)))(Γ)`, where `hat` represents a
//! two-particle operator on three-particle states.  Its adjoint is the
//! partial trace [`Tpm::bar_dpm`](../tpm/struct.Tpm.html#method.bar_dpm),
//! and the two compose to `bar(hat(Γ)) = Q(M − 4, 0, −1)(Γ)`.
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use super::basis::{self, Scheme};
use super::block_mat::BlockMat;
use super::op::{Vector, VectorMut};
use super::pphm::fmt_triples;
use super::tpm::{MapDir, Tpm};

#[derive(Clone, Debug)]
pub struct Dpm {
    scheme: Arc<Scheme>,
    num_particles: usize,
    data: BlockMat,
}

impl Deref for Dpm {
    type Target = BlockMat;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Dpm {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Vector for Dpm {
    fn ddot(&self, other: &Self) -> f64 {
        self.data.ddot(&other.data)
    }
}

impl VectorMut for Dpm {
    fn set_zero(&mut self) {
        self.data.set_zero();
    }

    fn dscal(&mut self, alpha: f64) {
        self.data.dscal(alpha);
    }

    fn daxpy(&mut self, alpha: f64, x: &Self) {
        self.data.daxpy(alpha, &x.data);
    }
}

impl fmt::Display for Dpm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dp = self.scheme.dp();
        fmt_triples(f, |s, i| dp.decode(s, i), &self.data)
    }
}

impl Dpm {
    pub fn new(scheme: &Arc<Scheme>, num_particles: usize)
               -> Result<Self, basis::Error> {
        basis::check_particles(num_particles)?;
        Ok(Self::zero(scheme.clone(), num_particles))
    }

    pub(crate) fn zero(scheme: Arc<Scheme>, num_particles: usize) -> Self {
        let data = BlockMat::new(&[
            (scheme.dp().dim(0), 2),
            (scheme.dp().dim(1), 4),
        ]);
        Self { scheme, num_particles, data }
    }

    pub fn zeros_like(&self) -> Self {
        Self::zero(self.scheme.clone(), self.num_particles)
    }

    pub fn scheme(&self) -> &Arc<Scheme> {
        &self.scheme
    }

    pub fn num_particles(&self) -> usize {
        self.num_particles
    }

    /// Element `D^block[s_ab a b c; s_de d e z]` between antisymmetrized
    /// pair-coupled states, in any orbital order.  Vanishes for states
    /// that are forbidden by the Pauli principle or do not reach the block's
    /// total spin.
    #[inline]
    pub fn at(&self, block: usize, s_ab: usize, a: usize, b: usize, c: usize,
              s_de: usize, d: usize, e: usize, z: usize) -> f64 {
        let dp = self.scheme.dp();
        let ket = dp.expand(block, s_de, d, e, z);
        let mut sum = 0.0;
        for &(i, x) in dp.expand(block, s_ab, a, b, c).iter() {
            for &(j, y) in ket.iter() {
                sum += x * y * self.data[(block, i, j)];
            }
        }
        sum
    }

    /// Represent the two-particle operator `tpm` on the three-particle
    /// states: `D[i j] = ∑ ⟨i|(a b)_S c⟩ Γ^S[a b; d e] ⟨(d e)_S c|j⟩`.
    pub fn hat(&mut self, tpm: &Tpm) {
        let scheme = self.scheme.clone();
        let (tp, dp) = (scheme.tp(), scheme.dp());
        // components[block][i]: (S, pair, c, ⟨i|(pair)_S c⟩)
        let mut components = [
            vec![Vec::new(); dp.dim(0)],
            vec![Vec::new(); dp.dim(1)],
        ];
        for (block, components) in components.iter_mut().enumerate() {
            for s in block .. 2 {
                for p in 0 .. tp.dim(s) {
                    let pair = tp.decode(s, p);
                    for c in 0 .. scheme.num_spatial() {
                        for &(i, x) in dp.expand(block, s, pair.0, pair.1, c)
                            .iter()
                        {
                            components[i].push((s, p, c, x));
                        }
                    }
                }
            }
        }
        self.data.fill_upper(|block, i, j| {
            let mut sum = 0.0;
            for &(s, p, c, x) in &components[block][i] {
                for &(s_de, q, z, y) in &components[block][j] {
                    if s == s_de && c == z {
                        sum += x * y * tpm[(s, p, q)];
                    }
                }
            }
            sum
        });
    }

    /// T1 map: two-particle matrix → three-particle matrix.
    pub fn t1(&mut self, tpm: &Tpm) {
        let n = self.num_particles as f64;
        let mut q = tpm.zeros_like();
        q.q_with(MapDir::Forward, 1.0, 1.0 / (3.0 * n * (n - 1.0)),
                 0.5 / (n - 1.0), tpm);
        self.hat(&q);
    }
}
