//! Index tables for the spin-coupled basis states.
//!
//! Single-particle states are spatial orbitals `0 .. num_orbs() / 2`, each
//! carrying spin 1/2.  Three families of coupled states appear:
//!
//!   - pairs `(a, b)` coupled to total spin `S ∈ {0, 1}` (two-particle
//!     matrix),
//!   - ordered particle-hole pairs `(a, b)` coupled to `S ∈ {0, 1}`
//!     (particle-hole matrix),
//!   - triples `(S_ab, a, b, c)`: a pair coupled to `S_ab` plus a third
//!     orbital, coupled to total spin 1/2 (block 0) or 3/2 (block 1).  The
//!     particle-particle-hole table keeps every such product state; the
//!     three-particle table keeps only an orthonormal basis of their
//!     antisymmetrized images.
//!
//! The tables are immutable once built and are shared between all the
//! matrices of a calculation through an `Arc<Scheme>`.
use std::{fmt, slice};
use std::borrow::Borrow;
use std::f64::consts::SQRT_2;
use std::hash::Hash;
use std::sync::Arc;
use fnv::FnvHashMap;
use super::ang_mom::recouple;

quick_error! {
    /// Invalid system size.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Error {
        OddOrbitals(num_orbs: usize) {
            display("number of orbitals must be even (got {})", num_orbs)
        }
        TooFewOrbitals(num_orbs: usize) {
            display("number of orbitals must exceed 2 (got {})", num_orbs)
        }
        TooFewParticles(num_particles: usize) {
            display("number of particles must exceed 1 (got {})",
                    num_particles)
        }
    }
}

/// Check that the number of particles is usable in the reduced maps, which
/// divide by `N - 1`.
pub fn check_particles(num_particles: usize) -> Result<(), Error> {
    if num_particles <= 1 {
        return Err(Error::TooFewParticles(num_particles));
    }
    Ok(())
}

/// A pair of spatial orbitals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair(pub usize, pub usize);

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}", self.0, self.1)
    }
}

/// A pair `(a, b)` with intermediate spin `s_ab`, plus a third orbital `c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub s_ab: usize,
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.s_ab, self.a, self.b, self.c)
    }
}

/// Phase for exchanging the two members of a pair coupled to spin `s`.
#[inline]
pub fn pair_sign(s: usize) -> f64 {
    1.0 - 2.0 * s as f64
}

/// A bijection between the natural numbers `0 .. len()` and an arbitrary
/// set of objects of type `T`.
#[derive(Clone)]
pub struct HashChart<T> {
    pub encoder: FnvHashMap<T, usize>,
    pub decoder: Vec<T>,
}

impl<T> Default for HashChart<T> {
    fn default() -> Self {
        Self {
            encoder: Default::default(),
            decoder: Default::default(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HashChart<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("HashChart").field(&self.decoder).finish()
    }
}

impl<T> HashChart<T> {
    pub fn len(&self) -> usize {
        self.decoder.len()
    }

    pub fn decode(&self, i: usize) -> Option<&T> {
        self.decoder.get(i)
    }
}

impl<T: Hash + Eq> HashChart<T> {
    pub fn encode<Q>(&self, q: &Q) -> Option<usize>
        where Q: Hash + Eq,
              T: Borrow<Q>,
    {
        self.encoder.get(q).cloned()
    }
}

impl<T: Hash + Eq + Clone> HashChart<T> {
    /// Append `t` unless it is already present.  Returns its index.
    pub fn insert(&mut self, t: T) -> usize {
        let query = t.clone();
        let decoder = &mut self.decoder;
        *self.encoder.entry(query).or_insert_with(|| {
            let index = decoder.len();
            decoder.push(t);
            index
        })
    }
}

const VOID: usize = usize::MAX;

/// Two-particle table.  Singlet states are `a ≤ b`, triplet states `a < b`.
#[derive(Clone, Debug)]
pub struct TpTable {
    num_spatial: usize,
    /// `decoders[s][i] == Pair(a, b)`
    decoders: [Vec<Pair>; 2],
    /// `encoders[s][a * L + b] == encoders[s][b * L + a] == i`
    encoders: [Vec<usize>; 2],
}

impl TpTable {
    fn new(num_spatial: usize) -> Self {
        let l = num_spatial;
        let mut decoders = [Vec::new(), Vec::new()];
        let mut encoders = [vec![VOID; l * l], vec![VOID; l * l]];
        for s in 0 .. 2 {
            for a in 0 .. l {
                for b in a + s .. l {
                    let i = decoders[s].len();
                    decoders[s].push(Pair(a, b));
                    encoders[s][a * l + b] = i;
                    encoders[s][b * l + a] = i;
                }
            }
        }
        Self { num_spatial, decoders, encoders }
    }

    pub fn dim(&self, s: usize) -> usize {
        self.decoders[s].len()
    }

    pub fn decode(&self, s: usize, i: usize) -> Pair {
        self.decoders[s][i]
    }

    /// Index of the unordered pair `{a, b}`, ignoring the exchange phase.
    pub fn index(&self, s: usize, a: usize, b: usize) -> Option<usize> {
        if a >= self.num_spatial || b >= self.num_spatial {
            return None;
        }
        match self.encoders[s][a * self.num_spatial + b] {
            VOID => None,
            i => Some(i),
        }
    }

    /// Index and phase of the pair `(a, b)` coupled to `s`.  Returns `None`
    /// if the state vanishes by antisymmetry.
    #[inline]
    pub fn get_inco(&self, s: usize, a: usize, b: usize)
                    -> Option<(usize, f64)> {
        let i = self.index(s, a, b)?;
        let phase = if a > b { pair_sign(s) } else { 1.0 };
        Some((i, phase))
    }
}

/// Particle-hole table: every ordered pair `(a, b)`, in both spin blocks.
#[derive(Clone, Copy, Debug)]
pub struct PhTable {
    num_spatial: usize,
}

impl PhTable {
    pub fn dim(&self) -> usize {
        self.num_spatial * self.num_spatial
    }

    pub fn decode(&self, i: usize) -> Pair {
        Pair(i / self.num_spatial, i % self.num_spatial)
    }

    #[inline]
    pub fn index(&self, a: usize, b: usize) -> usize {
        debug_assert!(a < self.num_spatial && b < self.num_spatial);
        a * self.num_spatial + b
    }
}

/// Three-particle table (pair ⊗ particle).  Block 0 has total spin 1/2 and
/// lists all the `s_ab = 0` triples before the `s_ab = 1` triples; block 1
/// has total spin 3/2 and only `s_ab = 1`.
#[derive(Clone, Debug)]
pub struct PphTable {
    charts: [HashChart<Triple>; 2],
}

impl PphTable {
    fn new(num_spatial: usize) -> Self {
        let l = num_spatial;
        let mut charts: [HashChart<Triple>; 2] = Default::default();
        for (block, chart) in charts.iter_mut().enumerate() {
            for s_ab in block .. 2 {
                for a in 0 .. l {
                    for b in a + s_ab .. l {
                        for c in 0 .. l {
                            chart.insert(Triple { s_ab, a, b, c });
                        }
                    }
                }
            }
        }
        Self { charts }
    }

    pub fn dim(&self, block: usize) -> usize {
        self.charts[block].len()
    }

    pub fn decode(&self, block: usize, i: usize) -> Triple {
        self.charts[block].decoder[i]
    }

    /// Index of a canonically ordered triple.
    pub fn index(&self, block: usize, t: &Triple) -> Option<usize> {
        self.charts[block].encode(t)
    }

    /// Index and phase of `(s_ab, a, b, c)` in `block`.  Returns `None` if
    /// the state vanishes (`a == b` with `s_ab == 1`) or cannot couple to
    /// the block's total spin (`s_ab == 0` in the spin-3/2 block).
    pub fn get_inco(&self, block: usize, s_ab: usize,
                    a: usize, b: usize, c: usize) -> Option<(usize, f64)> {
        if block == 1 && s_ab == 0 {
            return None;
        }
        let (a, b, phase) = if a > b {
            (b, a, pair_sign(s_ab))
        } else {
            (a, b, 1.0)
        };
        let i = self.index(block, &Triple { s_ab, a, b, c })?;
        Some((i, phase))
    }
}

/// At most two basis states with their coefficients.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Expansion {
    terms: [(usize, f64); 2],
    len: usize,
}

impl Expansion {
    fn push(&mut self, term: Option<(usize, f64)>) {
        if let Some(term) = term {
            self.terms[self.len] = term;
            self.len += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> slice::Iter<(usize, f64)> {
        self.terms[.. self.len].iter()
    }
}

/// Antisymmetric three-particle table.  Block 0 has total spin 1/2 and lists
/// `(s_ab, a, b, c)` with `a < b < c` and `s_ab ∈ {0, 1}`, followed by the
/// doubly occupied states `(0, a, a, c)` with `c ≠ a`; block 1 has total
/// spin 3/2 and lists `(1, a, b, c)` with `a < b < c`.
///
/// The states are orthonormal.  Any other pair ⊗ particle state
/// `|(a b)_s_ab c⟩` (with the pair normalized) is antisymmetrized and
/// expanded in them by [`DpTable::expand`].
#[derive(Clone, Debug)]
pub struct DpTable {
    charts: [HashChart<Triple>; 2],
}

impl DpTable {
    fn new(num_spatial: usize) -> Self {
        let l = num_spatial;
        let mut charts: [HashChart<Triple>; 2] = Default::default();
        for (block, chart) in charts.iter_mut().enumerate() {
            for a in 0 .. l {
                for b in a + 1 .. l {
                    for c in b + 1 .. l {
                        for s_ab in block .. 2 {
                            chart.insert(Triple { s_ab, a, b, c });
                        }
                    }
                }
            }
        }
        for a in 0 .. l {
            for c in (0 .. l).filter(|&c| c != a) {
                charts[0].insert(Triple { s_ab: 0, a, b: a, c });
            }
        }
        Self { charts }
    }

    pub fn dim(&self, block: usize) -> usize {
        self.charts[block].len()
    }

    pub fn decode(&self, block: usize, i: usize) -> Triple {
        self.charts[block].decoder[i]
    }

    pub fn index(&self, block: usize, t: &Triple) -> Option<usize> {
        self.charts[block].encode(t)
    }

    fn term(&self, block: usize, s_ab: usize, a: usize, b: usize, c: usize,
            coef: f64) -> Option<(usize, f64)> {
        Some((self.index(block, &Triple { s_ab, a, b, c })?, coef))
    }

    /// Expansion of the antisymmetrized `|(a b)_s_ab c⟩` in `block`.  Empty
    /// if the state vanishes.
    pub fn expand(&self, block: usize, s_ab: usize,
                  a: usize, b: usize, c: usize) -> Expansion {
        let mut e = Expansion::default();
        if block == 1 && s_ab == 0 {
            return e;
        }
        if a == b {
            if s_ab == 0 && c != a {
                e.push(self.term(block, 0, a, a, c, 1.0));
            }
            return e;
        }
        if c == a || c == b {
            // the coinciding orbitals can only form a singlet
            if block == 0 {
                let (x, y, sign) = if c == b {
                    (b, a, pair_sign(s_ab))
                } else {
                    (a, b, 1.0)
                };
                e.push(self.term(0, 0, x, x, y,
                                 sign * SQRT_2 * recouple(s_ab, 0)));
            }
            return e;
        }
        let (p, q, sign) = if a < b {
            (a, b, 1.0)
        } else {
            (b, a, pair_sign(s_ab))
        };
        if c > q {
            e.push(self.term(block, s_ab, p, q, c, sign));
            return e;
        }
        // move the largest orbital q to the third place
        for k in block .. 2 {
            let r = if block == 0 { recouple(s_ab, k) } else { -1.0 };
            let (x, y, sign_k) = if p < c {
                (p, c, 1.0)
            } else {
                (c, p, pair_sign(k))
            };
            e.push(self.term(block, k, x, y, q, sign * r * sign_k));
        }
        e
    }
}

/// All index tables for a given number of orbitals.
#[derive(Clone, Debug)]
pub struct Scheme {
    num_orbs: usize,
    tp: TpTable,
    ph: PhTable,
    pph: PphTable,
    dp: DpTable,
}

impl Scheme {
    /// Build the tables for `num_orbs` single-particle states (spin
    /// included).  `num_orbs` must be even and larger than 2.
    pub fn new(num_orbs: usize) -> Result<Arc<Self>, Error> {
        if num_orbs % 2 != 0 {
            return Err(Error::OddOrbitals(num_orbs));
        }
        if num_orbs <= 2 {
            return Err(Error::TooFewOrbitals(num_orbs));
        }
        let l = num_orbs / 2;
        Ok(Arc::new(Self {
            num_orbs,
            tp: TpTable::new(l),
            ph: PhTable { num_spatial: l },
            pph: PphTable::new(l),
            dp: DpTable::new(l),
        }))
    }

    /// Number of single-particle states, spin included (`M`).
    pub fn num_orbs(&self) -> usize {
        self.num_orbs
    }

    /// Number of spatial orbitals (`M / 2`).
    pub fn num_spatial(&self) -> usize {
        self.num_orbs / 2
    }

    pub fn tp(&self) -> &TpTable {
        &self.tp
    }

    pub fn ph(&self) -> &PhTable {
        &self.ph
    }

    pub fn pph(&self) -> &PphTable {
        &self.pph
    }

    pub fn dp(&self) -> &DpTable {
        &self.dp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preconditions() {
        assert_eq!(Scheme::new(5).unwrap_err(), Error::OddOrbitals(5));
        assert_eq!(Scheme::new(2).unwrap_err(), Error::TooFewOrbitals(2));
        assert_eq!(check_particles(1), Err(Error::TooFewParticles(1)));
        assert!(check_particles(2).is_ok());
    }

    #[test]
    fn test_dp_expand() {
        let scheme = Scheme::new(6).unwrap();
        let dp = scheme.dp();
        assert_eq!((dp.dim(0), dp.dim(1)), (8, 1));
        let coefs = |block, s_ab, a, b, c| -> Vec<(Triple, f64)> {
            dp.expand(block, s_ab, a, b, c).iter()
                .map(|&(i, x)| (dp.decode(block, i), x))
                .collect()
        };
        let t = |s_ab, a, b, c| Triple { s_ab, a, b, c };
        let h = 0.75f64.sqrt();
        assert_eq!(coefs(0, 1, 0, 1, 2), vec![(t(1, 0, 1, 2), 1.0)]);
        assert_eq!(coefs(0, 1, 1, 0, 2), vec![(t(1, 0, 1, 2), -1.0)]);
        assert_eq!(coefs(1, 1, 2, 1, 0), vec![(t(1, 0, 1, 2), -1.0)]);
        assert_eq!(coefs(0, 0, 1, 1, 0), vec![(t(0, 1, 1, 0), 1.0)]);
        assert!(dp.expand(0, 1, 1, 1, 0).is_empty());
        assert!(dp.expand(0, 0, 1, 1, 1).is_empty());
        assert!(dp.expand(1, 1, 0, 1, 1).is_empty());

        let close = |x: &[(Triple, f64)], y: &[(Triple, f64)]| {
            assert_eq!(x.len(), y.len());
            for (x, y) in x.iter().zip(y) {
                assert_eq!(x.0, y.0);
                assert!((x.1 - y.1).abs() < 1e-14, "{:?} {:?}", x, y);
            }
        };
        close(&coefs(0, 0, 2, 0, 1),
              &[(t(0, 0, 1, 2), -0.5), (t(1, 0, 1, 2), -h)]);
        close(&coefs(0, 1, 1, 2, 0),
              &[(t(0, 0, 1, 2), -h), (t(1, 0, 1, 2), -0.5)]);
        close(&coefs(0, 0, 0, 1, 1), &[(t(0, 1, 1, 0), -0.5f64.sqrt())]);
        close(&coefs(0, 1, 1, 0, 1), &[(t(0, 1, 1, 0), -1.5f64.sqrt())]);

        // antisymmetrized states of three distinct orbitals keep their norm
        for block in 0 .. 2 {
            for s_ab in block .. 2 {
                let norm: f64 = dp.expand(block, s_ab, 2, 0, 1).iter()
                    .map(|&(_, x)| x * x)
                    .sum();
                assert!((norm - 1.0).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_hash_chart() {
        let mut chart = HashChart::default();
        assert_eq!(chart.insert("x"), 0);
        assert_eq!(chart.insert("y"), 1);
        assert_eq!(chart.insert("x"), 0);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart.encode(&"y"), Some(1));
        assert_eq!(chart.decode(1), Some(&"y"));
    }
}
