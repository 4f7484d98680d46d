#[macro_use]
extern crate spinrdm;
extern crate rand;
extern crate rand_xorshift;

use std::sync::Arc;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use spinrdm::basis::Scheme;
use spinrdm::cg;
use spinrdm::op::{Vector, VectorMut};
use spinrdm::sup::{Conds, Sup};
use spinrdm::tpm::{MapDir, Tpm};
use spinrdm::utils::Toler;

const TOLER: Toler = Toler { relerr: 1e-10, abserr: 1e-10 };

fn all_conds() -> Vec<Conds> {
    vec![
        Conds::none(),
        Conds { q: true, .. Conds::none() },
        Conds { g: true, .. Conds::none() },
        Conds { t1: true, .. Conds::none() },
        Conds { t2: true, .. Conds::none() },
        Conds { q: true, g: true, .. Conds::none() },
        Conds::default(),
    ]
}

fn assert_tpm_eq(toler: Toler, x: &Tpm, y: &Tpm) {
    for s in 0 .. 2 {
        for i in 0 .. x.dim(s) {
            for j in 0 .. x.dim(s) {
                toler_assert_eq!(toler, x[(s, i, j)], y[(s, i, j)]);
            }
        }
    }
}

fn random_traceless(scheme: &Arc<Scheme>, num_particles: usize,
                    rng: &mut XorShiftRng) -> Tpm {
    let mut tpm = Tpm::new(scheme, num_particles).unwrap();
    tpm.rand_sym(rng);
    tpm.proj_tr();
    tpm
}

fn random_sup(scheme: &Arc<Scheme>, num_particles: usize, conds: Conds,
              rng: &mut XorShiftRng) -> Sup {
    let mut sup = Sup::new(scheme, num_particles, conds).unwrap();
    sup.p_mut().rand_pos_def(rng);
    if let Some(q) = sup.q_mut() {
        q.rand_pos_def(rng);
    }
    if let Some(g) = sup.g_mut() {
        g.rand_pos_def(rng);
    }
    if let Some(t1) = sup.t1_mut() {
        t1.rand_pos_def(rng);
    }
    if let Some(t2) = sup.t2_mut() {
        t2.rand_pos_def(rng);
    }
    sup
}

#[test]
fn test_sup_shape() {
    let scheme = Scheme::new(6).unwrap();
    let sup = Sup::new(&scheme, 3, Conds { g: true, .. Conds::none() })
        .unwrap();
    assert!(sup.q().is_none());
    assert!(sup.g().is_some());
    assert!(sup.t1().is_none());
    assert!(sup.t2().is_none());
    let sup = Sup::new(&scheme, 3, Conds::default()).unwrap();
    assert_eq!(sup.t2().unwrap().dim(0), 27);
    assert_eq!(sup.t1().unwrap().dim(0), 8);
    assert_eq!(sup.t1().unwrap().dim(1), 1);
    assert!(Sup::new(&scheme, 0, Conds::default()).is_err());
}

#[test]
fn test_unit_hessian_is_overlap() {
    // with unit dual blocks, H(x) = proj_tr(S(x))
    let mut rng = XorShiftRng::from_seed([21; 16]);
    let scheme = Scheme::new(6).unwrap();
    for conds in all_conds() {
        let x = random_traceless(&scheme, 3, &mut rng);
        let mut sup = Sup::new(&scheme, 3, conds).unwrap();
        sup.set_unit();
        let mut h = x.zeros_like();
        h.hessian(&x, &sup);
        let mut s = x.zeros_like();
        s.s_map(MapDir::Forward, &x, &conds);
        s.proj_tr();
        assert_tpm_eq(TOLER, &h, &s);
    }
}

#[test]
fn test_collaps_of_fill_is_overlap() {
    let mut rng = XorShiftRng::from_seed([22; 16]);
    let scheme = Scheme::new(8).unwrap();
    for conds in all_conds() {
        let mut x = Tpm::new(&scheme, 4).unwrap();
        x.rand_sym(&mut rng);
        let mut sup = Sup::new(&scheme, 4, conds).unwrap();
        sup.fill(&x);
        let mut c = x.zeros_like();
        c.collaps(&sup, false);
        let mut s = x.zeros_like();
        s.s_map(MapDir::Forward, &x, &conds);
        assert_tpm_eq(TOLER, &c, &s);

        c.collaps(&sup, true);
        s.proj_tr();
        assert_tpm_eq(TOLER, &c, &s);
        toler_assert_eq!(TOLER, c.trace(), 0.0);
    }
}

#[test]
fn test_hessian_symmetric() {
    let mut rng = XorShiftRng::from_seed([23; 16]);
    let scheme = Scheme::new(6).unwrap();
    for conds in all_conds() {
        let sup = random_sup(&scheme, 2, conds, &mut rng);
        let x = random_traceless(&scheme, 2, &mut rng);
        let y = random_traceless(&scheme, 2, &mut rng);
        let mut hx = x.zeros_like();
        hx.hessian(&x, &sup);
        let mut hy = x.zeros_like();
        hy.hessian(&y, &sup);
        toler_assert_eq!(TOLER, hx.ddot(&y), x.ddot(&hy));
        assert!(hx.ddot(&x) > 0.0);
        toler_assert_eq!(TOLER, hx.trace(), 0.0);
    }
}

#[test]
fn test_solve() {
    let mut rng = XorShiftRng::from_seed([24; 16]);
    let scheme = Scheme::new(6).unwrap();
    let conf = cg::Conf { toler: 1e-18, max_iter: 1000 };
    for conds in all_conds() {
        let sup = random_sup(&scheme, 3, conds, &mut rng);
        let rhs = random_traceless(&scheme, 3, &mut rng);
        let mut x = rhs.zeros_like();
        let iter = x.solve(&rhs, &sup, &conf).unwrap();
        assert!(iter > 0);
        let mut hx = x.zeros_like();
        hx.hessian(&x, &sup);
        assert_tpm_eq(Toler { relerr: 1e-6, abserr: 1e-6 }, &hx, &rhs);
    }
}

#[test]
fn test_solve_from_initial_guess() {
    let scheme = Scheme::new(8).unwrap();
    let mut ham = Tpm::new(&scheme, 4).unwrap();
    ham.sp_pairing(1.0);
    let mut tpm = ham.zeros_like();
    tpm.init();
    let mut sup = Sup::new(&scheme, 4, Conds::default()).unwrap();
    sup.fill(&tpm);
    let mut rhs = ham.clone();
    rhs.proj_tr();
    let mut x = ham.zeros_like();
    x.solve(&rhs, &sup, &Default::default()).unwrap();
    let mut residual = x.zeros_like();
    residual.hessian(&x, &sup);
    residual.daxpy(-1.0, &rhs);
    assert!(residual.ddot(&residual) < 1e-8);
}

#[test]
fn test_solve_limits() {
    let mut rng = XorShiftRng::from_seed([25; 16]);
    let scheme = Scheme::new(6).unwrap();
    let sup = random_sup(&scheme, 3, Conds::default(), &mut rng);
    let rhs = random_traceless(&scheme, 3, &mut rng);
    let mut x = rhs.zeros_like();
    let conf = cg::Conf { max_iter: 2, .. Default::default() };
    match x.solve(&rhs, &sup, &conf) {
        Err(cg::Error::NotConverged { iterations, .. }) =>
            assert_eq!(iterations, 2),
        r => panic!("unexpected result: {:?}", r),
    }

    // an indefinite dual block breaks the iteration
    let mut sup = Sup::new(&scheme, 3, Conds::none()).unwrap();
    sup.set_unit();
    sup.p_mut().set_zero();
    let mut x = rhs.zeros_like();
    match x.solve(&rhs, &sup, &Default::default()) {
        Err(cg::Error::Breakdown { iterations, .. }) =>
            assert_eq!(iterations, 1),
        r => panic!("unexpected result: {:?}", r),
    }
}
