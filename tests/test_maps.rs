#[macro_use]
extern crate spinrdm;
extern crate rand;
extern crate rand_xorshift;

use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use spinrdm::basis::{Scheme, Triple};
use spinrdm::dpm::Dpm;
use spinrdm::op::Vector;
use spinrdm::phm::Phm;
use spinrdm::pphm::Pphm;
use spinrdm::tpm::{MapDir, Tpm};
use spinrdm::utils::Toler;

const TOLER: Toler = Toler { relerr: 1e-10, abserr: 1e-10 };

const SYSTEMS: &[(usize, usize)] = &[(6, 3), (8, 2), (8, 5)];

fn random_tpm(num_orbs: usize, num_particles: usize, rng: &mut XorShiftRng)
              -> Tpm {
    let scheme = Scheme::new(num_orbs).unwrap();
    let mut tpm = Tpm::new(&scheme, num_particles).unwrap();
    tpm.rand_sym(rng);
    tpm
}

#[test]
fn test_q_self_adjoint() {
    let mut rng = XorShiftRng::from_seed([11; 16]);
    for &(m, n) in SYSTEMS {
        let x = random_tpm(m, n, &mut rng);
        let mut y = x.zeros_like();
        y.rand_sym(&mut rng);
        let mut qx = x.zeros_like();
        qx.q(MapDir::Forward, &x);
        let mut qy = x.zeros_like();
        qy.q(MapDir::Forward, &y);
        toler_assert_eq!(TOLER, qx.ddot(&y), x.ddot(&qy));
    }
}

#[test]
fn test_g_adjoint() {
    let mut rng = XorShiftRng::from_seed([12; 16]);
    for &(m, n) in SYSTEMS {
        let tpm = random_tpm(m, n, &mut rng);
        let mut phm = Phm::new(tpm.scheme(), n).unwrap();
        phm.rand_sym(&mut rng);

        let mut up = phm.zeros_like();
        up.g(&tpm);
        assert_eq!(up.asymmetry(), 0.0);
        let mut down = tpm.zeros_like();
        down.g(&phm);
        toler_assert_eq!(TOLER, up.ddot(&phm), tpm.ddot(&down));
    }
}

#[test]
fn test_t1_adjoint() {
    let mut rng = XorShiftRng::from_seed([13; 16]);
    for &(m, n) in SYSTEMS {
        let tpm = random_tpm(m, n, &mut rng);
        let mut dpm = Dpm::new(tpm.scheme(), n).unwrap();
        dpm.rand_sym(&mut rng);

        let mut up = dpm.zeros_like();
        up.t1(&tpm);
        let mut down = tpm.zeros_like();
        down.t1(&dpm);
        toler_assert_eq!(TOLER, up.ddot(&dpm), tpm.ddot(&down));
    }
}

#[test]
fn test_bar_of_hat() {
    // tracing out the third particle of a represented two-particle operator
    // gives Q(M − 4, 0, −1)
    let mut rng = XorShiftRng::from_seed([15; 16]);
    for &(m, n) in SYSTEMS {
        let tpm = random_tpm(m, n, &mut rng);
        let mut dpm = Dpm::new(tpm.scheme(), n).unwrap();
        dpm.hat(&tpm);
        assert_eq!(dpm.asymmetry(), 0.0);
        let mut bar = tpm.zeros_like();
        bar.bar_dpm(&dpm);
        let mut expected = tpm.zeros_like();
        expected.q_with(MapDir::Forward, m as f64 - 4.0, 0.0, -1.0, &tpm);
        for s in 0 .. 2 {
            for i in 0 .. tpm.dim(s) {
                for j in 0 .. tpm.dim(s) {
                    toler_assert_eq!(TOLER, bar[(s, i, j)],
                                     expected[(s, i, j)]);
                }
            }
        }
    }
}

#[test]
fn test_t1_of_unit() {
    // the uniform ensemble has uniform three-particle and three-hole
    // matrices, so its T1 image is a multiple of the unit matrix
    for &(m, n) in SYSTEMS {
        let scheme = Scheme::new(m).unwrap();
        let mut tpm = Tpm::new(&scheme, n).unwrap();
        tpm.init();
        let mut dpm = Dpm::new(&scheme, n).unwrap();
        dpm.t1(&tpm);
        let (m, n) = (m as f64, n as f64);
        let expected = ((m - n) * (m - n - 1.0) * (m - n - 2.0)
                        + n * (n - 1.0) * (n - 2.0))
            / (m * (m - 1.0) * (m - 2.0));
        for block in 0 .. 2 {
            for i in 0 .. dpm.dim(block) {
                for j in 0 .. dpm.dim(block) {
                    let x = if i == j { expected } else { 0.0 };
                    toler_assert_eq!(TOLER, dpm[(block, i, j)], x);
                }
            }
        }
    }
}

#[test]
fn test_t2_adjoint() {
    let mut rng = XorShiftRng::from_seed([14; 16]);
    for &(m, n) in SYSTEMS {
        let tpm = random_tpm(m, n, &mut rng);
        let mut pphm = Pphm::new(tpm.scheme(), n).unwrap();
        pphm.rand_sym(&mut rng);

        let mut up = pphm.zeros_like();
        up.t2(&tpm);
        assert_eq!(up.asymmetry(), 0.0);
        let mut down = tpm.zeros_like();
        down.t2(&pphm);
        toler_assert_eq!(TOLER, up.ddot(&pphm), tpm.ddot(&down));
    }
}

#[test]
fn test_g_of_unit() {
    // the particle-hole matrix of the uniform ensemble is positive
    let scheme = Scheme::new(6).unwrap();
    let mut tpm = Tpm::new(&scheme, 3).unwrap();
    tpm.init();
    let mut phm = Phm::new(&scheme, 3).unwrap();
    phm.g(&tpm);
    for s in 0 .. 2 {
        for i in 0 .. phm.dim(s) {
            assert!(phm[(s, i, i)] > 0.0);
        }
    }
    // G[a a; c c] of the singlet block is independent of a and c
    let ph = scheme.ph();
    toler_assert_eq!(TOLER, phm[(0, ph.index(0, 0), ph.index(1, 1))],
                     phm[(0, ph.index(2, 2), ph.index(0, 0))]);
}

#[test]
fn test_pphm_read_sp() {
    let scheme = Scheme::new(6).unwrap();
    let pph = scheme.pph();
    let mut pphm = Pphm::new(&scheme, 3).unwrap();
    // holes 1 and 3 are reflected to orbitals 2 and 0
    pphm.read_sp(&b"\
        0 0 0 1 1 1 0 2 3 0.5\n\
        1 0 0 1 2 1 1 2 0 -2.0\n\
        0 1 1 1 0 1 1 2 0 7.0\n\
        0 0 0 1 4 0 0 1 0 1.0\n"[..]).unwrap();
    let i = pph.index(0, &Triple { s_ab: 0, a: 0, b: 1, c: 2 }).unwrap();
    let j = pph.index(0, &Triple { s_ab: 1, a: 0, b: 2, c: 0 }).unwrap();
    assert_eq!(pphm[(0, i, j)], 0.5);
    assert_eq!(pphm[(0, j, i)], 0.5);
    // the spin-3/2 block forces S_ab = 1
    let i = pph.index(1, &Triple { s_ab: 1, a: 0, b: 1, c: 1 }).unwrap();
    let j = pph.index(1, &Triple { s_ab: 1, a: 1, b: 2, c: 0 }).unwrap();
    assert_eq!(pphm[(1, i, j)], -2.0);
    toler_assert_eq!(TOLER, pphm.trace(), 0.0);
}
