//! Particle-particle-hole matrices: the image of the T2 condition.
//!
//! Rows and columns are triples `(S_ab, a, b, c)`: the particle pair `(a, b)`
//! coupled to `S_ab`, plus the hole `c`, coupled to a total spin of 1/2
//! (block 0, degeneracy 2) or 3/2 (block 1, degeneracy 4).
use std::{fmt, io};
use std::f64::consts::SQRT_2;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::Arc;
use super::ang_mom::{jweight, six_j};
use super::basis::{self, pair_sign, PphTable, Scheme, Triple};
use super::block_mat::BlockMat;
use super::half::Half;
use super::io::{open_compressed, read_text, reflect_hole, Fields};
use super::op::{Vector, VectorMut};
use super::spm::Spm;
use super::tpm::{pair_norm, Tpm};

/// Element of a matrix over the pair ⊗ particle basis, with the exchange
/// phases of both pairs applied.
#[inline]
fn triple_at(
    pph: &PphTable,
    x: &BlockMat,
    block: usize,
    bra: (usize, usize, usize, usize),
    ket: (usize, usize, usize, usize),
) -> f64 {
    let (s_ab, a, b, c) = bra;
    let (s_de, d, e, z) = ket;
    match (pph.get_inco(block, s_ab, a, b, c),
           pph.get_inco(block, s_de, d, e, z)) {
        (Some((i, p)), Some((j, q))) => p * q * x[(block, i, j)],
        _ => 0.0,
    }
}

/// Text dump of a matrix whose states are triples, with `decode(block, i)`
/// naming the `i`-th state of a block.
pub(crate) fn fmt_triples<F>(f: &mut fmt::Formatter, decode: F,
                             x: &BlockMat) -> fmt::Result
    where F: Fn(usize, usize) -> Triple
{
    for s in 0 .. x.num_blocks() {
        writeln!(f, "{}\t{}\t{}", s, x.dim(s), x.deg(s))?;
        writeln!(f)?;
        for i in 0 .. x.dim(s) {
            for j in 0 .. x.dim(s) {
                writeln!(f, "{}\t{}\t{}\t|\t{}\t{}\t{}", s, i, j,
                         decode(s, i), decode(s, j), x[(s, i, j)])?;
            }
        }
        writeln!(f)?;
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct Pphm {
    scheme: Arc<Scheme>,
    num_particles: usize,
    data: BlockMat,
}

impl Deref for Pphm {
    type Target = BlockMat;
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Pphm {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Vector for Pphm {
    fn ddot(&self, other: &Self) -> f64 {
        self.data.ddot(&other.data)
    }
}

impl VectorMut for Pphm {
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

impl fmt::Display for Pphm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pph = self.scheme.pph();
        fmt_triples(f, |s, i| pph.decode(s, i), &self.data)
    }
}

impl Pphm {
    pub fn new(scheme: &Arc<Scheme>, num_particles: usize)
               -> Result<Self, basis::Error> {
        basis::check_particles(num_particles)?;
        Ok(Self::zero(scheme.clone(), num_particles))
    }

    pub(crate) fn zero(scheme: Arc<Scheme>, num_particles: usize) -> Self {
        let data = BlockMat::new(&[
            (scheme.pph().dim(0), 2),
            (scheme.pph().dim(1), 4),
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

    /// Element `P^block[s_ab a b c; s_de d e z]`.  Vanishes for states that
    /// do not exist in the block.
    #[inline]
    pub fn at(&self, block: usize, s_ab: usize, a: usize, b: usize, c: usize,
              s_de: usize, d: usize, e: usize, z: usize) -> f64 {
        triple_at(self.scheme.pph(), &self.data, block,
                  (s_ab, a, b, c), (s_de, d, e, z))
    }

    /// Like `at`, but with the factor `√2` restored for each coinciding
    /// singlet pair.
    #[inline]
    pub fn at_unnorm(&self, block: usize, s_ab: usize, a: usize, b: usize,
                     c: usize, s_de: usize, d: usize, e: usize, z: usize)
                     -> f64 {
        let mut x = self.at(block, s_ab, a, b, c, s_de, d, e, z);
        if s_ab == 0 && a == b {
            x *= SQRT_2;
        }
        if s_de == 0 && d == e {
            x *= SQRT_2;
        }
        x
    }

    /// T2 map: two-particle matrix → particle-particle-hole matrix.
    pub fn t2(&mut self, tpm: &Tpm) {
        let n = self.num_particles as f64;
        let spm = Spm::from_tpm(1.0 / (n - 1.0), tpm);

        // recoupling coefficients of the exchange terms, per block:
        // block 0: √((2 S_ab + 1) (2 S_de + 1)) ∑[J] (2 J + 1) (2 Z + 1)
        //          {S_ab J} {S_de J} {Z J}
        // block 1: (2 Z + 1) {1 Z}
        let mut recoup = [[[[0.0; 2]; 2]; 2]; 2];
        for s_ab in 0 .. 2 {
            for s_de in 0 .. 2 {
                for z in 0 .. 2 {
                    let mut sum = 0.0;
                    for j in 0 .. 2 {
                        sum += Half::from(j as i32).multiplicity()
                            * Half::from(z as i32).multiplicity()
                            * six_j(j, s_ab) * six_j(j, s_de) * six_j(j, z);
                    }
                    recoup[0][s_ab][s_de][z] = sum
                        * jweight(Half::from(s_ab as i32), 1)
                        * jweight(Half::from(s_de as i32), 1);
                    recoup[1][s_ab][s_de][z] =
                        Half::from(z as i32).multiplicity() * six_j(1, z);
                }
            }
        }

        let scheme = self.scheme.clone();
        let pph = scheme.pph();
        self.data.fill_upper(|block, i, j| {
            let Triple { s_ab, a, b, c } = pph.decode(block, i);
            let Triple { s_ab: s_de, a: d, b: e, c: z } = pph.decode(block, j);
            let sign_ab = pair_sign(s_ab);
            let sign_de = pair_sign(s_de);
            let norm = pair_norm(a, b) * pair_norm(d, e);
            let coef = &recoup[block][s_ab][s_de];

            // ∑[Z] coef[Z] Γ̃^Z[p q; r s]
            let exchange = |p, q, r, s| -> f64 {
                (0 .. 2).map(|y| coef[y] * tpm.at_unnorm(y, p, q, r, s)).sum()
            };

            let mut x = 0.0;
            if s_ab == s_de {
                if c == z {
                    x += tpm.at(s_ab, a, b, d, e);
                }
                if a == d && b == e {
                    x += norm * spm[(c, z)];
                }
                if b == d && a == e {
                    x += sign_ab * norm * spm[(c, z)];
                }
            }
            if a == d {
                x -= norm * exchange(c, e, z, b);
            }
            if b == d {
                x -= sign_ab * norm * exchange(c, e, z, a);
            }
            if a == e {
                x -= sign_de * norm * exchange(c, d, z, b);
            }
            if b == e {
                x -= sign_ab * sign_de * norm * exchange(c, d, z, a);
            }
            x
        });
    }

    /// Read `S S_ab a b c S_de d e z value` records.  Hole orbitals in the
    /// file are reflected (`c → (L − c) mod L`) before lookup, and the
    /// spin-3/2 block ignores the `S_ab` fields.  Every record overwrites
    /// its element, and reading stops silently at the first field that
    /// fails to parse.
    pub fn read_sp<R: io::Read>(&mut self, r: R) -> io::Result<()> {
        let text = read_text(r)?;
        let mut fields = Fields::new(&text);
        let scheme = self.scheme.clone();
        let pph = scheme.pph();
        let l = scheme.num_spatial();
        self.data.fill(0.0);
        loop {
            let record = (|| -> Option<_> {
                let block = fields.next::<usize>()?;
                let bra = (fields.next::<usize>()?, fields.next::<usize>()?,
                           fields.next::<usize>()?, fields.next::<i64>()?);
                let ket = (fields.next::<usize>()?, fields.next::<usize>()?,
                           fields.next::<usize>()?, fields.next::<i64>()?);
                Some((block, bra, ket, fields.next::<f64>()?))
            })();
            let (block, bra, ket, value) = match record {
                Some(record) => record,
                None => break,
            };
            let lookup = |(s_ab, a, b, c): (usize, usize, usize, i64)| {
                let s_ab = if block == 1 { 1 } else { s_ab };
                let c = reflect_hole(c, l)?;
                pph.index(block, &Triple { s_ab, a, b, c })
            };
            let ij = if block < 2 {
                lookup(bra).and_then(|i| Some((i, lookup(ket)?)))
            } else {
                None
            };
            match ij {
                Some((i, j)) => self.data[(block, i, j)] = value,
                None => warn!("skipping record with no basis state: \
                               {} {:?} {:?}", block, bra, ket),
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
