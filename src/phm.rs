//! Particle-hole matrices: the image of the G condition.
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use super::ang_mom::{jweight, six_j};
use super::basis::{self, Scheme};
use super::block_mat::BlockMat;
use super::half::Half;
use super::op::{Vector, VectorMut};
use super::pphm::Pphm;
use super::spm::Spm;
use super::tpm::Tpm;

/// Particle-hole matrix.  Both spin blocks (`S = 0` with degeneracy 1 and
/// `S = 1` with degeneracy 3) run over all ordered pairs `(a, b)`.
#[derive(Clone, Debug)]
pub struct Phm {
    scheme: Arc<Scheme>,
    num_particles: usize,
    data: BlockMat,
}

impl Deref for Phm {
    type Target = BlockMat;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Phm {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Vector for Phm {
    fn ddot(&self, other: &Self) -> f64 {
        self.data.ddot(&other.data)
    }
}

impl VectorMut for Phm {
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

impl fmt::Display for Phm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ph = self.scheme.ph();
        for s in 0 .. 2 {
            writeln!(f, "{}\t{}\t{}", s, self.dim(s), self.deg(s))?;
            writeln!(f)?;
            for i in 0 .. self.dim(s) {
                for j in 0 .. self.dim(s) {
                    writeln!(f, "{}\t{}\t{}\t|\t{}\t{}\t{}", s, i, j,
                             ph.decode(i), ph.decode(j), self.data[(s, i, j)])?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Phm {
    pub fn new(scheme: &Arc<Scheme>, num_particles: usize)
               -> Result<Self, basis::Error> {
        basis::check_particles(num_particles)?;
        Ok(Self::zero(scheme.clone(), num_particles))
    }

    pub(crate) fn zero(scheme: Arc<Scheme>, num_particles: usize) -> Self {
        let dim = scheme.ph().dim();
        Self {
            scheme,
            num_particles,
            data: BlockMat::new(&[(dim, 1), (dim, 3)]),
        }
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

    /// Element `G^s[a b; c d]`.
    #[inline]
    pub fn at(&self, s: usize, a: usize, b: usize, c: usize, d: usize) -> f64 {
        let ph = self.scheme.ph();
        self.data[(s, ph.index(a, b), ph.index(c, d))]
    }

    /// G map:
    /// `G^S[a b; c d] = δ[b d] ρ[a c] − ∑[Z] (2 Z + 1) {½ ½ S; ½ ½ Z} Γ̃^Z[a d; c b]`
    /// with `ρ` the one-body density matrix of `tpm`.
    pub fn g(&mut self, tpm: &Tpm) {
        let n = self.num_particles as f64;
        let rho = Spm::from_tpm(1.0 / (n - 1.0), tpm);
        let scheme = self.scheme.clone();
        let ph = scheme.ph();
        self.data.fill_upper(|s, i, j| {
            let (bra, ket) = (ph.decode(i), ph.decode(j));
            let (a, b, c, d) = (bra.0, bra.1, ket.0, ket.1);
            let mut x = 0.0;
            for z in 0 .. 2 {
                x -= Half::from(z as i32).multiplicity() * six_j(s, z)
                    * tpm.at_unnorm(z, a, d, c, b);
            }
            if b == d {
                x += rho[(a, c)];
            }
            x
        });
    }

    /// Trace out the first particle of a particle-particle-hole matrix,
    /// recoupling the remaining particle-hole pair to total spin `J`.
    pub fn bar(&mut self, pphm: &Pphm) {
        let scheme = self.scheme.clone();
        let ph = scheme.ph();
        let l = scheme.num_spatial();
        self.data.fill_upper(|j_tot, i, j| {
            let (bra, ket) = (ph.decode(i), ph.decode(j));
            let (p, q, r, s) = (bra.0, bra.1, ket.0, ket.1);
            let mut sum = 0.0;
            for a in 0 .. l {
                for s_ab in 0 .. 2 {
                    for s_de in 0 .. 2 {
                        sum += 2.0
                            * jweight(Half::from(s_ab as i32), 1)
                            * jweight(Half::from(s_de as i32), 1)
                            * six_j(j_tot, s_ab) * six_j(j_tot, s_de)
                            * pphm.at_unnorm(0, s_ab, a, p, q, s_de, a, r, s);
                    }
                }
                if j_tot == 1 {
                    sum += 4.0 / 3.0 * pphm.at(1, 1, a, p, q, 1, a, r, s);
                }
            }
            sum
        });
    }
}
