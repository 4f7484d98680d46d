//! Single-particle matrices: partial traces of the larger matrices.
use std::ops::Index;
use ndarray::Array2;
use super::basis::Triple;
use super::half::Half;
use super::phm::Phm;
use super::pphm::Pphm;
use super::tpm::Tpm;

/// Spin-independent single-particle matrix over the spatial orbitals.
#[derive(Clone, Debug, PartialEq)]
pub struct Spm {
    data: Array2<f64>,
}

impl Index<(usize, usize)> for Spm {
    type Output = f64;
    #[inline]
    fn index(&self, ij: (usize, usize)) -> &Self::Output {
        &self.data[ij]
    }
}

impl Spm {
    pub fn zero(num_spatial: usize) -> Self {
        Self { data: Array2::zeros((num_spatial, num_spatial)) }
    }

    pub fn num_spatial(&self) -> usize {
        self.data.nrows()
    }

    /// `ρ[a c] = scale / 2 ∑[S l] (2 S + 1) Γ̃^S[a l; c l]`, where `Γ̃`
    /// includes the `√2` of coinciding orbitals.  With `scale = 1 / (N - 1)`
    /// this is the one-body density matrix of one spin projection.
    pub fn from_tpm(scale: f64, tpm: &Tpm) -> Self {
        let l = tpm.scheme().num_spatial();
        let mut spm = Self::zero(l);
        for a in 0 .. l {
            for c in a .. l {
                let mut sum = 0.0;
                for k in 0 .. l {
                    sum += tpm.at_unnorm(0, a, k, c, k)
                        + 3.0 * tpm.at(1, a, k, c, k);
                }
                spm.set_sym(a, c, 0.5 * scale * sum);
            }
        }
        spm
    }

    /// `ρ[a c] = scale / 2 ∑[S b] (2 S + 1) G^S[a b; c b]`
    pub fn from_phm(scale: f64, phm: &Phm) -> Self {
        let l = phm.scheme().num_spatial();
        let mut spm = Self::zero(l);
        for a in 0 .. l {
            for c in a .. l {
                let mut sum = 0.0;
                for b in 0 .. l {
                    sum += phm.at(0, a, b, c, b) + 3.0 * phm.at(1, a, b, c, b);
                }
                spm.set_sym(a, c, 0.5 * scale * sum);
            }
        }
        spm
    }

    /// Trace over the pair of a particle-particle-hole matrix, keeping the
    /// third orbital:
    /// `ρ[c z] = scale ∑[S] (2 S + 1) ∑[S_ab, a ≤ b] P^S[S_ab a b c; S_ab a b z]`
    pub fn bar_pphm(scale: f64, pphm: &Pphm) -> Self {
        let scheme = pphm.scheme();
        let pph = scheme.pph();
        let mut spm = Self::zero(scheme.num_spatial());
        for block in 0 .. 2 {
            let weight = Half(2 * block as i32 + 1).multiplicity();
            for i in 0 .. pph.dim(block) {
                let t = pph.decode(block, i);
                for z in 0 .. scheme.num_spatial() {
                    if let Some(j) = pph.index(block, &Triple { c: z, .. t }) {
                        spm.data[(t.c, z)] += scale * weight * pphm[(block, i, j)];
                    }
                }
            }
        }
        spm
    }

    /// Number of particles, i.e. the trace summed over both spin
    /// projections.
    pub fn trace(&self) -> f64 {
        2.0 * self.data.diag().sum()
    }

    fn set_sym(&mut self, a: usize, c: usize, value: f64) {
        self.data[(a, c)] = value;
        self.data[(c, a)] = value;
    }
}
