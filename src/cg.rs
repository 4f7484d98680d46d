//! Linear conjugate gradients for symmetric positive-definite operators.
//!
//! ```
//! use spinrdm::cg;
//!
//! // solve [[4 1] [1 3]] x = [1 2]
//! let mut x = vec![0.0; 2];
//! let iter = cg::solve(&Default::default(), &vec![1.0, 2.0], &mut x,
//!                      |p, ap| {
//!     ap[0] = 4.0 * p[0] + p[1];
//!     ap[1] = p[0] + 3.0 * p[1];
//! }).unwrap();
//! assert!(iter <= 2);
//! assert!((x[0] - 1.0 / 11.0).abs() < 1e-6);
//! assert!((x[1] - 7.0 / 11.0).abs() < 1e-6);
//! ```
use super::op::VectorMut;

quick_error! {
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum Error {
        /// The residual did not drop below the tolerance within the allowed
        /// number of iterations.
        NotConverged { iterations: usize, residual: f64 } {
            display("conjugate gradients did not converge after {} \
                     iterations (r·r = {})", iterations, residual)
        }
        /// Encountered a direction with `p·A p ≤ 0`: the operator is not
        /// positive definite.
        Breakdown { iterations: usize, curvature: f64 } {
            display("conjugate gradients broke down at iteration {} \
                     (p·A p = {})", iterations, curvature)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conf {
    /// Convergence threshold on the squared residual `r·r`.
    pub toler: f64,
    pub max_iter: usize,
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            toler: 1e-10,
            max_iter: 10000,
        }
    }
}

/// Solve `A x = rhs` starting from `x = 0`, where `apply(p, ap)` computes
/// `ap ← A p`.  Returns the number of iterations (equal to the number of
/// calls to `apply`).
pub fn solve<V, F>(conf: &Conf, rhs: &V, x: &mut V, mut apply: F)
                   -> Result<usize, Error>
    where V: VectorMut,
          F: FnMut(&V, &mut V),
{
    x.set_zero();
    let mut r = rhs.clone();
    let mut p = rhs.clone();
    let mut ap = rhs.clone();
    let mut rr = r.ddot(&r);
    let mut iter = 0;
    while rr > conf.toler {
        if iter == conf.max_iter {
            return Err(Error::NotConverged { iterations: iter, residual: rr });
        }
        apply(&p, &mut ap);
        iter += 1;
        let pap = p.ddot(&ap);
        if !(pap > 0.0) {
            return Err(Error::Breakdown { iterations: iter, curvature: pap });
        }
        let alpha = rr / pap;
        x.daxpy(alpha, &p);
        r.daxpy(-alpha, &ap);
        let rr_old = rr;
        rr = r.ddot(&r);
        debug!("cg: {{iter: {}, rr: {:e}}}", iter, rr);
        p.dscal(rr / rr_old);
        p.daxpy(1.0, &r);
    }
    info!("cg: converged in {} iterations (r·r = {:e})", iter, rr);
    Ok(iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations() {
        let mut calls = 0;
        let mut x = vec![0.0; 3];
        let iter = solve(&Default::default(), &vec![1.0, 1.0, 1.0], &mut x,
                         |p, ap| {
            calls += 1;
            for i in 0 .. 3 {
                ap[i] = (i + 1) as f64 * p[i];
            }
        }).unwrap();
        assert_eq!(iter, calls);
        assert!(iter <= 3);
        for i in 0 .. 3 {
            assert!((x[i] - 1.0 / (i + 1) as f64).abs() < 1e-6);
        }
    }

    #[test]
    fn test_not_positive_definite() {
        let mut x = vec![0.0];
        let err = solve(&Default::default(), &vec![1.0], &mut x,
                        |p, ap| ap[0] = -p[0]).unwrap_err();
        assert_eq!(err, Error::Breakdown { iterations: 1, curvature: -1.0 });
    }

    #[test]
    fn test_max_iter() {
        let conf = Conf { max_iter: 1, .. Default::default() };
        let mut x = vec![0.0; 3];
        let result = solve(&conf, &vec![1.0, 1.0, 1.0], &mut x, |p, ap| {
            ap[0] = 1.0 * p[0];
            ap[1] = 2.0 * p[1];
            ap[2] = 3.0 * p[2];
        });
        match result {
            Err(Error::NotConverged { iterations, .. }) =>
                assert_eq!(iterations, 1),
            r => panic!("unexpected result: {:?}", r),
        }
    }
}
