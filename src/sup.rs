//! Aggregate of the per-condition blocks of the semidefinite program.
use std::sync::Arc;
use super::basis::{self, Scheme};
use super::dpm::Dpm;
use super::op::{Vector, VectorMut};
use super::phm::Phm;
use super::pphm::Pphm;
use super::tpm::{MapDir, Tpm};

/// Which N-representability conditions besides P are imposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Conds {
    pub q: bool,
    pub g: bool,
    pub t1: bool,
    pub t2: bool,
}

impl Default for Conds {
    fn default() -> Self {
        Self {
            q: true,
            g: true,
            t1: true,
            t2: true,
        }
    }
}

impl Conds {
    /// Only the P condition.
    pub fn none() -> Self {
        Self { q: false, g: false, t1: false, t2: false }
    }
}

/// One block per active condition: P and Q are two-particle matrices, G a
/// particle-hole matrix, T1 a three-particle matrix and T2 a
/// particle-particle-hole matrix.
#[derive(Clone, Debug)]
pub struct Sup {
    conds: Conds,
    p: Tpm,
    q: Option<Tpm>,
    g: Option<Phm>,
    t1: Option<Dpm>,
    t2: Option<Pphm>,
}

fn ddot_opt<T: Vector>(x: &Option<T>, y: &Option<T>) -> f64 {
    match (x, y) {
        (Some(x), Some(y)) => x.ddot(y),
        (None, None) => 0.0,
        _ => panic!("SUPs with different conditions"),
    }
}

fn daxpy_opt<T: VectorMut>(alpha: f64, x: &Option<T>, y: &mut Option<T>) {
    match (x, y) {
        (Some(x), Some(y)) => y.daxpy(alpha, x),
        (None, None) => {}
        _ => panic!("SUPs with different conditions"),
    }
}

impl Vector for Sup {
    fn ddot(&self, other: &Self) -> f64 {
        self.p.ddot(&other.p)
            + ddot_opt(&self.q, &other.q)
            + ddot_opt(&self.g, &other.g)
            + ddot_opt(&self.t1, &other.t1)
            + ddot_opt(&self.t2, &other.t2)
    }
}

impl VectorMut for Sup {
    fn set_zero(&mut self) {
        self.dscal(0.0);
    }

    fn dscal(&mut self, alpha: f64) {
        self.p.dscal(alpha);
        if let Some(q) = &mut self.q {
            q.dscal(alpha);
        }
        if let Some(g) = &mut self.g {
            g.dscal(alpha);
        }
        if let Some(t1) = &mut self.t1 {
            t1.dscal(alpha);
        }
        if let Some(t2) = &mut self.t2 {
            t2.dscal(alpha);
        }
    }

    fn daxpy(&mut self, alpha: f64, x: &Self) {
        self.p.daxpy(alpha, &x.p);
        daxpy_opt(alpha, &x.q, &mut self.q);
        daxpy_opt(alpha, &x.g, &mut self.g);
        daxpy_opt(alpha, &x.t1, &mut self.t1);
        daxpy_opt(alpha, &x.t2, &mut self.t2);
    }
}

impl Sup {
    /// All blocks zero.
    pub fn new(scheme: &Arc<Scheme>, num_particles: usize, conds: Conds)
               -> Result<Self, basis::Error> {
        let p = Tpm::new(scheme, num_particles)?;
        let scheme = scheme.clone();
        let n = num_particles;
        Ok(Self {
            conds,
            q: if conds.q { Some(p.zeros_like()) } else { None },
            g: if conds.g { Some(Phm::zero(scheme.clone(), n)) } else { None },
            t1: if conds.t1 { Some(Dpm::zero(scheme.clone(), n)) } else { None },
            t2: if conds.t2 { Some(Pphm::zero(scheme, n)) } else { None },
            p,
        })
    }

    pub fn conds(&self) -> &Conds {
        &self.conds
    }

    pub fn p(&self) -> &Tpm {
        &self.p
    }

    pub fn p_mut(&mut self) -> &mut Tpm {
        &mut self.p
    }

    pub fn q(&self) -> Option<&Tpm> {
        self.q.as_ref()
    }

    pub fn q_mut(&mut self) -> Option<&mut Tpm> {
        self.q.as_mut()
    }

    pub fn g(&self) -> Option<&Phm> {
        self.g.as_ref()
    }

    pub fn g_mut(&mut self) -> Option<&mut Phm> {
        self.g.as_mut()
    }

    pub fn t1(&self) -> Option<&Dpm> {
        self.t1.as_ref()
    }

    pub fn t1_mut(&mut self) -> Option<&mut Dpm> {
        self.t1.as_mut()
    }

    pub fn t2(&self) -> Option<&Pphm> {
        self.t2.as_ref()
    }

    pub fn t2_mut(&mut self) -> Option<&mut Pphm> {
        self.t2.as_mut()
    }

    /// Set every block to the image of `tpm` under its condition.
    pub fn fill(&mut self, tpm: &Tpm) {
        self.p.clone_from(tpm);
        if let Some(q) = &mut self.q {
            q.q(MapDir::Forward, tpm);
        }
        if let Some(g) = &mut self.g {
            g.g(tpm);
        }
        if let Some(t1) = &mut self.t1 {
            t1.t1(tpm);
        }
        if let Some(t2) = &mut self.t2 {
            t2.t2(tpm);
        }
    }

    /// Set every block to the identity.
    pub fn set_unit(&mut self) {
        self.p.set_unit();
        if let Some(q) = &mut self.q {
            q.set_unit();
        }
        if let Some(g) = &mut self.g {
            g.set_unit();
        }
        if let Some(t1) = &mut self.t1 {
            t1.set_unit();
        }
        if let Some(t2) = &mut self.t2 {
            t2.set_unit();
        }
    }
}
