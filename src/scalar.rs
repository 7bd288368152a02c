//! Element-type bound shared by tensors, views, and lazy expressions.

use std::ops::{Add, Div, Mul, Sub};

use num_complex::{Complex32, Complex64};
use num_traits::{One, Zero};

/// Trait bound for tensor element types.
///
/// Covers the arithmetic the lazy operators need plus `Zero`/`One` for
/// value-initialized buffers and the `zeros`/`ones` constructors. The trait
/// is implemented explicitly for the primitive numeric types and for
/// `num_complex` types rather than as a blanket, so that element types and
/// nd-objects stay disjoint in operator and operand dispatch.
pub trait Scalar:
    Copy
    + Send
    + Sync
    + PartialEq
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Zero
    + One
{
}

macro_rules! impl_scalar {
    ($($t:ty),* $(,)?) => {
        $(impl Scalar for $t {})*
    };
}

impl_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, Complex32, Complex64);
