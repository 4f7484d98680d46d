//! Block-diagonal symmetric matrices whose blocks carry an integer
//! degeneracy.
//!
//! Every n-particle matrix in this crate is a `BlockMat` in disguise: the
//! blocks correspond to the total-spin channels and the degeneracy of a block
//! is its spin multiplicity.  The inner product and the trace are weighted
//! by the degeneracies, so that they agree with the corresponding quantities
//! in the uncoupled single-particle basis.
use std::ops::{AddAssign, Index, IndexMut, SubAssign};
use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;
use super::op::{Vector, VectorMut};

#[derive(Clone, Debug, PartialEq)]
pub struct BlockMat {
    blocks: Vec<Array2<f64>>,
    degs: Vec<u32>,
}

impl Index<(usize, usize, usize)> for BlockMat {
    type Output = f64;
    #[inline]
    fn index(&self, (l, i, j): (usize, usize, usize)) -> &Self::Output {
        &self.blocks[l][(i, j)]
    }
}

impl IndexMut<(usize, usize, usize)> for BlockMat {
    #[inline]
    fn index_mut(&mut self, (l, i, j): (usize, usize, usize))
                 -> &mut Self::Output {
        &mut self.blocks[l][(i, j)]
    }
}

impl<'a> AddAssign<&'a BlockMat> for BlockMat {
    fn add_assign(&mut self, other: &'a BlockMat) {
        self.daxpy(1.0, other);
    }
}

impl<'a> SubAssign<&'a BlockMat> for BlockMat {
    fn sub_assign(&mut self, other: &'a BlockMat) {
        self.daxpy(-1.0, other);
    }
}

impl Vector for BlockMat {
    /// Sum of the block-wise Frobenius products, weighted by degeneracy.
    fn ddot(&self, other: &Self) -> f64 {
        self.assert_same_shape(other);
        self.blocks.iter().zip(&other.blocks).zip(&self.degs)
            .map(|((a, b), &deg)| {
                deg as f64 * a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>()
            })
            .sum()
    }
}

impl VectorMut for BlockMat {
    fn set_zero(&mut self) {
        self.fill(0.0);
    }

    fn dscal(&mut self, alpha: f64) {
        for block in &mut self.blocks {
            *block *= alpha;
        }
    }

    fn daxpy(&mut self, alpha: f64, x: &Self) {
        self.assert_same_shape(x);
        for (y, x) in self.blocks.iter_mut().zip(&x.blocks) {
            y.scaled_add(alpha, x);
        }
    }
}

impl BlockMat {
    /// Create a zero matrix with the given `(dimension, degeneracy)` of each
    /// block.
    pub fn new(shape: &[(usize, u32)]) -> Self {
        Self {
            blocks: shape.iter()
                .map(|&(dim, _)| Array2::zeros((dim, dim)))
                .collect(),
            degs: shape.iter().map(|&(_, deg)| deg).collect(),
        }
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn dim(&self, l: usize) -> usize {
        self.blocks[l].nrows()
    }

    pub fn deg(&self, l: usize) -> u32 {
        self.degs[l]
    }

    pub fn fill(&mut self, value: f64) {
        for block in &mut self.blocks {
            block.fill(value);
        }
    }

    /// Set to the identity matrix.
    pub fn set_unit(&mut self) {
        for block in &mut self.blocks {
            block.fill(0.0);
            block.diag_mut().fill(1.0);
        }
    }

    /// Trace weighted by the degeneracy of each block.
    pub fn trace(&self) -> f64 {
        self.blocks.iter().zip(&self.degs).map(|(block, &deg)| {
            deg as f64 * block.diag().sum()
        }).sum()
    }

    /// Add `alpha` to every diagonal element.
    pub fn add_diag(&mut self, alpha: f64) {
        for block in &mut self.blocks {
            block.diag_mut().map_inplace(|x| *x += alpha);
        }
    }

    /// Set every upper-triangle element `(l, i, j)`, `i ≤ j`, to `f(l, i, j)`
    /// and mirror it into the lower triangle.
    pub fn fill_upper<F>(&mut self, mut f: F)
        where F: FnMut(usize, usize, usize) -> f64
    {
        for (l, block) in self.blocks.iter_mut().enumerate() {
            for i in 0 .. block.nrows() {
                for j in i .. block.ncols() {
                    block[(i, j)] = f(l, i, j);
                }
            }
            symmetrize(block);
        }
    }

    /// Copy the upper triangle of every block into its lower triangle.
    pub fn symmetrize(&mut self) {
        for block in &mut self.blocks {
            symmetrize(block);
        }
    }

    /// Congruence transform: `self ← d x d`, block by block.
    pub fn l_map(&mut self, d: &BlockMat, x: &BlockMat) {
        self.assert_same_shape(d);
        self.assert_same_shape(x);
        for ((y, d), x) in self.blocks.iter_mut().zip(&d.blocks)
            .zip(&x.blocks)
        {
            *y = d.dot(x).dot(d);
        }
        // remove rounding asymmetry
        self.symmetrize();
    }

    /// Fill with a random symmetric matrix with normally distributed
    /// elements.
    pub fn rand_sym<R: Rng>(&mut self, rng: &mut R) {
        for block in &mut self.blocks {
            for i in 0 .. block.nrows() {
                for j in i .. block.ncols() {
                    block[(i, j)] = rng.sample(StandardNormal);
                }
            }
        }
        self.symmetrize();
    }

    /// Fill with a random positive-definite matrix `a aᵀ + 1`.
    pub fn rand_pos_def<R: Rng>(&mut self, rng: &mut R) {
        for block in &mut self.blocks {
            let n = block.nrows();
            let a: Array2<f64> =
                Array2::from_shape_fn((n, n), |_| rng.sample(StandardNormal));
            *block = a.dot(&a.t()) / n as f64;
        }
        self.add_diag(1.0);
        self.symmetrize();
    }

    /// Largest deviation from symmetry over all blocks.
    pub fn asymmetry(&self) -> f64 {
        let mut max = 0.0f64;
        for block in &self.blocks {
            for i in 0 .. block.nrows() {
                for j in 0 .. i {
                    max = max.max((block[(i, j)] - block[(j, i)]).abs());
                }
            }
        }
        max
    }

    fn assert_same_shape(&self, other: &Self) {
        assert_eq!(self.degs, other.degs);
        assert!(self.blocks.iter().zip(&other.blocks)
                .all(|(a, b)| a.dim() == b.dim()),
                "block matrices have different shapes");
    }
}

/// Copy the upper triangle into the lower triangle.
fn symmetrize(a: &mut Array2<f64>) {
    for i in 0 .. a.nrows() {
        for j in i + 1 .. a.ncols() {
            a[(j, i)] = a[(i, j)];
        }
    }
}
