//! Spin-coupled two-particle matrices (2-RDMs).
//!
//! A `Tpm` has a singlet block (`S = 0`, pairs `a ≤ b`, degeneracy 1) and a
//! triplet block (`S = 1`, pairs `a < b`, degeneracy 3).  Singlet states with
//! `a == b` are normalized, so element access through [`Tpm::at`] divides
//! nothing out; [`Tpm::at_unnorm`] restores the factor `√2` per coinciding
//! pair, which is what the partial traces and the recouplings need.
//!
//! Besides the matrix itself this module hosts the "down" parts of the
//! N-representability maps (the adjoints of the maps from a `Tpm` into the
//! larger matrices), the overlap map `S`, the Hessian `H` of the barrier
//! problem and its conjugate-gradient inversion.
use std::{fmt, io};
use std::f64::consts::SQRT_2;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::Arc;
use super::ang_mom::six_j;
use super::basis::{self, pair_sign, Pair, Scheme};
use super::block_mat::BlockMat;
use super::cg;
use super::dpm::Dpm;
use super::half::Half;
use super::io::{open_compressed, read_text, Fields};
use super::op::{Vector, VectorMut};
use super::phm::Phm;
use super::pphm::Pphm;
use super::spm::Spm;
use super::sup::{Conds, Sup};

/// Direction of an invertible map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapDir {
    Forward,
    Inverse,
}

/// `1/√2` if the two orbitals coincide.
#[inline]
pub fn pair_norm(a: usize, b: usize) -> f64 {
    if a == b { 1.0 / SQRT_2 } else { 1.0 }
}

#[derive(Clone, Debug)]
pub struct Tpm {
    scheme: Arc<Scheme>,
    num_particles: usize,
    data: BlockMat,
}

impl Deref for Tpm {
    type Target = BlockMat;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Tpm {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Vector for Tpm {
    fn ddot(&self, other: &Self) -> f64 {
        self.data.ddot(&other.data)
    }
}

impl VectorMut for Tpm {
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

impl fmt::Display for Tpm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tp = self.scheme.tp();
        for s in 0 .. 2 {
            writeln!(f, "{}\t{}\t{}", s, self.dim(s), self.deg(s))?;
            writeln!(f)?;
            for i in 0 .. self.dim(s) {
                for j in 0 .. self.dim(s) {
                    writeln!(f, "{}\t{}\t{}\t|\t{}\t{}\t{}", s, i, j,
                             tp.decode(s, i), tp.decode(s, j),
                             self.data[(s, i, j)])?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Tpm {
    /// Create a zero matrix for `num_particles` particles.
    pub fn new(scheme: &Arc<Scheme>, num_particles: usize)
               -> Result<Self, basis::Error> {
        basis::check_particles(num_particles)?;
        Ok(Self::zero(scheme.clone(), num_particles))
    }

    pub(crate) fn zero(scheme: Arc<Scheme>, num_particles: usize) -> Self {
        let data = BlockMat::new(&[
            (scheme.tp().dim(0), 1),
            (scheme.tp().dim(1), 3),
        ]);
        Self { scheme, num_particles, data }
    }

    /// Zero matrix of the same shape and particle number.
    pub fn zeros_like(&self) -> Self {
        Self::zero(self.scheme.clone(), self.num_particles)
    }

    pub fn scheme(&self) -> &Arc<Scheme> {
        &self.scheme
    }

    /// Number of single-particle states, spin included (`M`).
    pub fn num_orbs(&self) -> usize {
        self.scheme.num_orbs()
    }

    /// Number of particles (`N`).
    pub fn num_particles(&self) -> usize {
        self.num_particles
    }

    /// Element `Γ^s[a b; c d]`, with the exchange phases applied.  Vanishes
    /// for triplet pairs with coinciding orbitals.
    #[inline]
    pub fn at(&self, s: usize, a: usize, b: usize, c: usize, d: usize) -> f64 {
        let tp = self.scheme.tp();
        match (tp.get_inco(s, a, b), tp.get_inco(s, c, d)) {
            (Some((i, p)), Some((j, q))) => p * q * self.data[(s, i, j)],
            _ => 0.0,
        }
    }

    /// Like `at`, but with the factor `√2` restored for each coinciding pair.
    #[inline]
    pub fn at_unnorm(&self, s: usize, a: usize, b: usize, c: usize, d: usize)
                     -> f64 {
        self.at(s, a, b, c, d) / (pair_norm(a, b) * pair_norm(c, d))
    }

    /// Compute the upper triangle of each block from `f(s, i, j, bra, ket)`
    /// and mirror it into the lower triangle.
    pub(crate) fn fill_upper<F>(&mut self, mut f: F)
        where F: FnMut(usize, usize, usize, Pair, Pair) -> f64
    {
        let scheme = self.scheme.clone();
        let tp = scheme.tp();
        self.data.fill_upper(|s, i, j| {
            f(s, i, j, tp.decode(s, i), tp.decode(s, j))
        });
    }

    /// Generalized Q-like map:
    ///
    /// ```text
    /// Q(A, B, C)(Γ) = A Γ + 2 B Tr(Γ) 1 − C (1-body terms of ρ(Γ))
    /// ```
    ///
    /// With `MapDir::Inverse` the inverse of the forward map is applied,
    /// using the closed-form inverse coefficients.
    pub fn q_with(&mut self, dir: MapDir, a: f64, b: f64, c: f64, src: &Tpm) {
        let (ca, cb, cc) = match dir {
            MapDir::Forward => (a, b, c),
            MapDir::Inverse => {
                let m = self.num_orbs() as f64;
                let cb = (b * a + b * c * m - 2.0 * c * c)
                    / (a * (c * (m - 2.0) - a)
                       * (a + b * m * (m - 1.0) - 2.0 * c * (m - 1.0)));
                let cc = c / (a * (c * (m - 2.0) - a));
                (1.0 / a, cb, cc)
            }
        };
        let spm = Spm::from_tpm(cc, src);
        let ward = 2.0 * cb * src.trace();
        self.fill_upper(|s, i, j, Pair(a, b), Pair(c, d)| {
            let sign = pair_sign(s);
            let norm = pair_norm(a, b) * pair_norm(c, d);
            let mut x = ca * src.data[(s, i, j)];
            if i == j {
                x += ward;
            }
            if a == c {
                x -= norm * spm[(b, d)];
            }
            if b == c {
                x -= sign * norm * spm[(a, d)];
            }
            if a == d {
                x -= sign * norm * spm[(b, c)];
            }
            if b == d {
                x -= norm * spm[(a, c)];
            }
            x
        });
    }

    /// The Q map, `Q(1, 1 / (N (N − 1)), 1 / (N − 1))`, or its inverse.
    pub fn q(&mut self, dir: MapDir, src: &Tpm) {
        let n = self.num_particles as f64;
        self.q_with(dir, 1.0, 1.0 / (n * (n - 1.0)), 1.0 / (n - 1.0), src);
    }

    /// Adjoint of the G map: particle-hole matrix → two-particle matrix.
    pub fn g(&mut self, phm: &Phm) {
        let n = self.num_particles as f64;
        let spm = Spm::from_phm(1.0 / (n - 1.0), phm);
        self.fill_upper(|s, _, _, Pair(a, b), Pair(c, d)| {
            let sign = pair_sign(s);
            let mut x = 0.0;
            for z in 0 .. 2 {
                x -= Half::from(z as i32).multiplicity() * six_j(s, z)
                    * (phm.at(z, a, d, c, b) + phm.at(z, b, c, d, a)
                       + sign * phm.at(z, b, d, c, a)
                       + sign * phm.at(z, a, c, d, b));
            }
            if b == d {
                x += spm[(a, c)];
            }
            if a == c {
                x += spm[(b, d)];
            }
            if a == d {
                x += sign * spm[(b, c)];
            }
            if b == c {
                x += sign * spm[(a, d)];
            }
            x * pair_norm(a, b) * pair_norm(c, d)
        });
    }

    /// Partial trace of a three-particle matrix over its third orbital:
    /// `Γ^S[ab; cd] = ∑[S₃] (2 S₃ + 1) / (2 S + 1) ∑[l] D^S₃[S a b l; S c d l]`.
    /// A singlet pair only reaches total spin 1/2, so its weight is 2; a
    /// triplet pair collects `2/3` and `4/3` from the two blocks.
    pub fn bar_dpm(&mut self, dpm: &Dpm) {
        let l = self.scheme.num_spatial();
        self.fill_upper(|s, _, _, Pair(a, b), Pair(c, d)| {
            let mut sum = 0.0;
            for block in s .. 2 {
                let weight = Half(2 * block as i32 + 1).multiplicity()
                    / Half::from(s as i32).multiplicity();
                for k in 0 .. l {
                    sum += weight * dpm.at(block, s, a, b, k, s, c, d, k);
                }
            }
            sum
        });
    }

    /// Adjoint of the T1 map: `Q(1, 1 / (3 N (N − 1)), 1 / (2 (N − 1)))`
    /// applied to the partial trace.
    pub fn t1(&mut self, dpm: &Dpm) {
        let n = self.num_particles as f64;
        let mut bar = self.zeros_like();
        bar.bar_dpm(dpm);
        self.q_with(MapDir::Forward, 1.0, 1.0 / (3.0 * n * (n - 1.0)),
                    0.5 / (n - 1.0), &bar);
    }

    /// Partial trace of a particle-particle-hole matrix over the hole:
    /// `Γ^S[ab; cd] = ∑[S₃] (2 S₃ + 1) / (2 S + 1) ∑[l] P^S₃[S a b l; S c d l]`.
    pub fn bar_pphm(&mut self, pphm: &Pphm) {
        let l = self.scheme.num_spatial();
        self.fill_upper(|s, _, _, Pair(a, b), Pair(c, d)| {
            let mut sum = 0.0;
            for block in 0 .. 2 {
                let weight = Half(2 * block as i32 + 1).multiplicity()
                    / Half::from(s as i32).multiplicity();
                for k in 0 .. l {
                    sum += weight * pphm.at(block, s, a, b, k, s, c, d, k);
                }
            }
            sum
        });
    }

    /// Adjoint of the T2 map: particle-particle-hole → two-particle matrix.
    pub fn t2(&mut self, pphm: &Pphm) {
        let n = self.num_particles as f64;
        let mut bar = self.zeros_like();
        bar.bar_pphm(pphm);
        let mut phm = Phm::zero(self.scheme.clone(), self.num_particles);
        phm.bar(pphm);
        let spm = Spm::bar_pphm(0.5 / (n - 1.0), pphm);
        self.fill_upper(|s, i, j, Pair(a, b), Pair(c, d)| {
            let sign = pair_sign(s);
            let norm = pair_norm(a, b) * pair_norm(c, d);
            let mut x = bar.data[(s, i, j)];
            if b == d {
                x += norm * spm[(a, c)];
            }
            if a == d {
                x += sign * norm * spm[(b, c)];
            }
            if b == c {
                x += sign * norm * spm[(a, d)];
            }
            if a == c {
                x += norm * spm[(b, d)];
            }
            for z in 0 .. 2 {
                x -= norm * Half::from(z as i32).multiplicity() * six_j(s, z)
                    * (phm.at(z, d, a, b, c) + sign * phm.at(z, d, b, a, c)
                       + sign * phm.at(z, c, a, b, d) + phm.at(z, c, b, a, d));
            }
            x
        });
    }

    /// Overlap map: the Q-like map whose coefficients sum the contributions
    /// of every active condition, so that `S(x) = ∑ L†(L(x))` over the
    /// conditions `L`.
    pub fn s_map(&mut self, dir: MapDir, src: &Tpm, conds: &Conds) {
        let m = self.num_orbs() as f64;
        let n = self.num_particles as f64;
        let n1 = n - 1.0;
        let mut a = 1.0;
        let mut b = 0.0;
        let mut c = 0.0;
        if conds.q {
            a += 1.0;
            b += (4.0 * n * n + 2.0 * n - 4.0 * n * m + m * m - m)
                / (n * n * n1 * n1);
            c += (2.0 * n - m) / (n1 * n1);
        }
        if conds.g {
            a += 4.0;
            c += (2.0 * n - m - 2.0) / (n1 * n1);
        }
        if conds.t1 {
            a += m - 4.0;
            b += (m * m * m - 6.0 * m * m * n - 3.0 * m * m
                  + 12.0 * m * n * n + 12.0 * m * n + 2.0 * m
                  - 18.0 * n * n - 6.0 * n * n * n)
                / (3.0 * n * n * n1 * n1);
            c -= (m * m + 2.0 * n * n - 4.0 * m * n - m + 8.0 * n - 4.0)
                / (2.0 * n1 * n1);
        }
        if conds.t2 {
            a += 5.0 * m - 8.0;
            b += 2.0 / n1;
            c += (2.0 * n * n + (m - 2.0) * (4.0 * n - 3.0) - m * m)
                / (2.0 * n1 * n1);
        }
        self.q_with(dir, a, b, c, src);
    }

    /// Hessian of the barrier function along `b`:
    /// `H(b) = D_P b D_P + ∑ L†(D_L L(b) D_L)` over the active conditions
    /// `L`, projected onto the traceless space.
    pub fn hessian(&mut self, b: &Tpm, sup: &Sup) {
        self.data.l_map(sup.p(), b);
        let mut hulp = self.zeros_like();
        if let Some(dq) = sup.q() {
            let mut qb = self.zeros_like();
            qb.q(MapDir::Forward, b);
            let mut dqd = self.zeros_like();
            dqd.l_map(dq, &qb);
            hulp.q(MapDir::Forward, &dqd);
            self.data += &hulp.data;
        }
        if let Some(dg) = sup.g() {
            let mut gb = dg.zeros_like();
            gb.g(b);
            let mut dgd = dg.zeros_like();
            dgd.l_map(dg, &gb);
            hulp.g(&dgd);
            self.data += &hulp.data;
        }
        if let Some(dt1) = sup.t1() {
            let mut t1b = dt1.zeros_like();
            t1b.t1(b);
            let mut dtd = dt1.zeros_like();
            dtd.l_map(dt1, &t1b);
            hulp.t1(&dtd);
            self.data += &hulp.data;
        }
        if let Some(dt2) = sup.t2() {
            let mut t2b = dt2.zeros_like();
            t2b.t2(b);
            let mut dtd = dt2.zeros_like();
            dtd.l_map(dt2, &t2b);
            hulp.t2(&dtd);
            self.data += &hulp.data;
        }
        self.proj_tr();
    }

    /// Solve `H(x) = rhs` by conjugate gradients, storing `x` in `self`.
    /// Returns the number of iterations.  `rhs` should be traceless.
    pub fn solve(&mut self, rhs: &Tpm, sup: &Sup, conf: &cg::Conf)
                 -> Result<usize, cg::Error> {
        cg::solve(conf, rhs, self, |p, hp| hp.hessian(p, sup))
    }

    /// Sum of the P block and the adjoint images of the active dual blocks.
    /// If `traceless`, the result is projected onto the traceless space.
    pub fn collaps(&mut self, sup: &Sup, traceless: bool) {
        self.data.clone_from(&sup.p().data);
        let mut hulp = self.zeros_like();
        if let Some(q) = sup.q() {
            hulp.q(MapDir::Forward, q);
            self.data += &hulp.data;
        }
        if let Some(g) = sup.g() {
            hulp.g(g);
            self.data += &hulp.data;
        }
        if let Some(t1) = sup.t1() {
            hulp.t1(t1);
            self.data += &hulp.data;
        }
        if let Some(t2) = sup.t2() {
            hulp.t2(t2);
            self.data += &hulp.data;
        }
        if traceless {
            self.proj_tr();
        }
    }

    /// Scaled unit matrix with the trace `N (N − 1) / 2` of a 2-RDM.
    pub fn init(&mut self) {
        let m = self.num_orbs() as f64;
        let n = self.num_particles as f64;
        self.data.set_unit();
        self.data.dscal(n * (n - 1.0) / (m * (m - 1.0)));
    }

    /// Remove the trace: `Γ − 2 Tr(Γ) / (M (M − 1)) 1`.
    pub fn proj_tr(&mut self) {
        let m = self.num_orbs() as f64;
        let ward = 2.0 * self.data.trace() / (m * (m - 1.0));
        self.data.add_diag(-ward);
    }

    /// Two-body reduction of the total spin operator `S²`.
    pub fn set_s_2(&mut self) {
        let n = self.num_particles as f64;
        let ward = -1.5 * (n - 2.0) / (n - 1.0);
        self.data.fill(0.0);
        for i in 0 .. self.dim(0) {
            self.data[(0, i, i)] = ward;
        }
        for i in 0 .. self.dim(1) {
            self.data[(1, i, i)] = ward + 2.0;
        }
    }

    /// Expectation value of `S²`.
    pub fn spin(&self) -> f64 {
        let mut s2 = self.zeros_like();
        s2.set_s_2();
        s2.ddot(self)
    }

    /// Write the matrix in the uncoupled spin-orbital basis, one
    /// `α β γ δ value` line per element with `α < β`, `α ≤ γ < δ`.  Spin
    /// orbital `α` is spatial orbital `α / 2` with spin down for even `α`.
    pub fn uncouple<W: io::Write>(&self, mut w: W) -> io::Result<()> {
        let m = self.num_orbs();
        for alpha in 0 .. m {
            for beta in alpha + 1 .. m {
                let (a, s_a) = (alpha / 2, alpha % 2);
                let (b, s_b) = (beta / 2, beta % 2);
                for gamma in alpha .. m {
                    for delta in gamma + 1 .. m {
                        let (c, s_c) = (gamma / 2, gamma % 2);
                        let (d, s_d) = (delta / 2, delta % 2);
                        let mixed = s_a != s_b && s_c != s_d;
                        let singlet = if mixed {
                            let sign = if s_a == s_c { 0.5 } else { -0.5 };
                            sign * self.at_unnorm(0, a, b, c, d)
                        } else {
                            0.0
                        };
                        let triplet = if s_a == s_b && s_c == s_d
                            && s_a == s_c
                        {
                            self.at(1, a, b, c, d)
                        } else if mixed {
                            0.5 * self.at(1, a, b, c, d)
                        } else {
                            0.0
                        };
                        writeln!(w, "{}\t{}\t{}\t{}\t{}", alpha, beta,
                                 gamma, delta, singlet + triplet)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Read `S a b c d value` records.  The matrix is cleared first, every
    /// record overwrites its element, and reading stops silently at the
    /// first field that fails to parse.
    pub fn read_sp<R: io::Read>(&mut self, r: R) -> io::Result<()> {
        let text = read_text(r)?;
        let mut fields = Fields::new(&text);
        let scheme = self.scheme.clone();
        let tp = scheme.tp();
        self.data.fill(0.0);
        loop {
            let record = (|| -> Option<_> {
                Some((fields.next::<usize>()?, fields.next::<usize>()?,
                      fields.next::<usize>()?, fields.next::<usize>()?,
                      fields.next::<usize>()?, fields.next::<f64>()?))
            })();
            let (s, a, b, c, d, value) = match record {
                Some(record) => record,
                None => break,
            };
            let ij = if s < 2 {
                tp.index(s, a, b).and_then(|i| Some((i, tp.index(s, c, d)?)))
            } else {
                None
            };
            match ij {
                Some((i, j)) => self.data[(s, i, j)] = value,
                None => warn!("skipping record with no basis state: \
                               {} {} {} {} {}", s, a, b, c, d),
            }
        }
        self.data.symmetrize();
        Ok(())
    }

    /// Like `read_sp`, from a possibly compressed file.
    pub fn load_sp(&mut self, path: &Path) -> io::Result<()> {
        self.read_sp(open_compressed(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        let scheme = Scheme::new(8).unwrap();
        let tpm = Tpm::new(&scheme, 3).unwrap();
        assert_eq!(tpm.dim(0), 8 * 10 / 8);
        assert_eq!(tpm.dim(1), 8 * 6 / 8);
        assert_eq!((tpm.deg(0), tpm.deg(1)), (1, 3));
        assert!(Tpm::new(&scheme, 1).is_err());
    }

    #[test]
    fn test_init_trace() {
        let scheme = Scheme::new(10).unwrap();
        let mut tpm = Tpm::new(&scheme, 4).unwrap();
        tpm.init();
        assert!((tpm.trace() - 6.0).abs() < 1e-12);
        let rho = Spm::from_tpm(1.0 / 3.0, &tpm);
        assert!((rho.trace() - 4.0).abs() < 1e-12);
        tpm.proj_tr();
        assert!(tpm.trace().abs() < 1e-12);
    }
}
