//! Free constructors: `zeros`, `ones`, `full`, and pseudo-random tensors
//! drawing from a process-wide reseedable generator.

use std::sync::{Mutex, OnceLock};

use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scalar::Scalar;
use crate::tensor::Tensor;

static RNG: OnceLock<Mutex<StdRng>> = OnceLock::new();

fn global_rng() -> &'static Mutex<StdRng> {
    RNG.get_or_init(|| Mutex::new(StdRng::seed_from_u64(0)))
}

/// Reseed the process-wide random generator.
pub fn seed(s: u64) {
    *global_rng().lock().unwrap() = StdRng::seed_from_u64(s);
}

/// Tensor of the given extents filled with zeros.
pub fn zeros<T: Scalar, const D: usize>(extents: [usize; D]) -> Tensor<T, D> {
    Tensor::new(extents)
}

/// Tensor of the given extents filled with ones.
pub fn ones<T: Scalar, const D: usize>(extents: [usize; D]) -> Tensor<T, D> {
    full(extents, T::one())
}

/// Tensor of the given extents filled with `value`.
pub fn full<T: Scalar, const D: usize>(extents: [usize; D], value: T) -> Tensor<T, D> {
    let mut t = Tensor::new(extents);
    t.fill(value);
    t
}

/// Tensor of the given extents drawn from the process-wide generator:
/// uniform on `[0, 1)` for floating-point elements, the full bit range for
/// integers.
pub fn rand<T, const D: usize>(extents: [usize; D]) -> Tensor<T, D>
where
    T: Scalar,
    Standard: Distribution<T>,
{
    let mut rng = global_rng().lock().unwrap();
    Tensor::from_fn(extents, |_| rng.gen())
}
