extern crate conv;
extern crate flate2;
extern crate fnv;
#[macro_use]
extern crate log;
extern crate ndarray;
#[macro_use]
extern crate quick_error;
extern crate rand;
extern crate rand_distr;
#[cfg(test)]
extern crate rand_xorshift;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate xz2;

#[macro_use]
mod macros;

pub mod ang_mom;
pub mod basis;
pub mod block_mat;
pub mod cg;
pub mod dpm;
pub mod half;
pub mod io;
pub mod models;
pub mod op;
pub mod phm;
pub mod pphm;
pub mod spm;
pub mod sup;
pub mod tpm;
pub mod utils;
