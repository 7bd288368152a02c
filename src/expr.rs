//! Lazy element-wise expressions.
//!
//! Arithmetic over tensors, views, and scalars builds a tree of value-type
//! nodes instead of computing eagerly; the whole compound expression runs
//! as a single element-wise pass when it is materialized into a tensor or
//! view. Scalars and sub-nodes are captured by value, tensors by reference,
//! views by (cheap) copy — the borrow checker guarantees every captured
//! operand outlives the node.
//!
//! Each node caches its result shape and a `broadcasted` flag at
//! construction. Materialization picks between a flat loop over contiguous
//! storage (all operands contiguous, nothing broadcast) and a row-major
//! multi-index walk using extended element access.
//!
//! The expression rank is part of the [`Operand`] trait, so rank mismatches
//! are compile errors. Operands of lower rank join an expression after
//! explicit trailing-axis alignment with `NewAxis` slicing; scalars join
//! any expression and always force the broadcasting path.

use std::marker::PhantomData;
use std::ops::{Add, Div, Mul, Sub};

use num_complex::{Complex32, Complex64};
use num_traits::Float;

use crate::broadcast::for_each_index;
use crate::scalar::Scalar;
use crate::shape::align_shapes;
use crate::tensor::Tensor;
use crate::view::{View, ViewMut};

/// An operand of a rank-`D` lazy element-wise expression: a scalar, a
/// view, a borrowed tensor, or another expression node.
///
/// The associated constants are the compile-time capability tags the
/// materializers dispatch on: `RANK` (0 for scalars, `D` otherwise) and
/// `CONTIGUOUS` (flat access by linear index is valid).
pub trait Operand<T, const D: usize> {
    /// Rank of this operand; scalars have rank 0.
    const RANK: usize;

    /// Whether the operand supports flat access over a dense row-major
    /// layout. Scalars and tensors do; strided views never do.
    const CONTIGUOUS: bool;

    /// Align this operand's shape into `target` from the trailing axis.
    fn fold_shape(&self, target: &mut [usize; D]);

    /// Whether evaluating this operand over `target` requires stretching:
    /// it is a scalar, was itself built by broadcasting, or has an axis
    /// smaller than the target's.
    fn is_broadcast_with(&self, target: &[usize; D]) -> bool;

    /// Flat access into a contiguous layout. Only called when
    /// `CONTIGUOUS` holds and nothing is broadcast.
    fn get_flat(&self, i: usize) -> T {
        let _ = i;
        unreachable!("flat access on a non-contiguous operand")
    }

    /// Plain multi-index access; only called when shapes match exactly.
    fn get_index(&self, index: [usize; D]) -> T;

    /// Broadcasting access: axes of extent 1 accept any index value.
    fn get_extended(&self, index: [usize; D]) -> T;
}

macro_rules! impl_scalar_operand {
    ($($t:ty),* $(,)?) => {
        $(impl<const D: usize> Operand<$t, D> for $t {
            const RANK: usize = 0;
            const CONTIGUOUS: bool = true;

            fn fold_shape(&self, _target: &mut [usize; D]) {}

            fn is_broadcast_with(&self, _target: &[usize; D]) -> bool {
                // A scalar is stretched over every cell of the result.
                true
            }

            fn get_flat(&self, _i: usize) -> $t {
                *self
            }

            fn get_index(&self, _index: [usize; D]) -> $t {
                *self
            }

            fn get_extended(&self, _index: [usize; D]) -> $t {
                *self
            }
        })*
    };
}

impl_scalar_operand!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, Complex32, Complex64);

impl<T: Scalar, const D: usize> Operand<T, D> for View<'_, T, D> {
    const RANK: usize = D;
    const CONTIGUOUS: bool = false;

    fn fold_shape(&self, target: &mut [usize; D]) {
        align_shapes(target, &self.shape());
    }

    fn is_broadcast_with(&self, target: &[usize; D]) -> bool {
        self.shape() != *target
    }

    fn get_index(&self, index: [usize; D]) -> T {
        self.get(index)
    }

    fn get_extended(&self, index: [usize; D]) -> T {
        *self.extended_element(index)
    }
}

impl<'t, T: Scalar, const D: usize> Operand<T, D> for &'t Tensor<T, D> {
    const RANK: usize = D;
    const CONTIGUOUS: bool = true;

    fn fold_shape(&self, target: &mut [usize; D]) {
        align_shapes(target, &self.shape());
    }

    fn is_broadcast_with(&self, target: &[usize; D]) -> bool {
        self.shape() != *target
    }

    fn get_flat(&self, i: usize) -> T {
        self.data()[i]
    }

    fn get_index(&self, index: [usize; D]) -> T {
        self.get(index)
    }

    fn get_extended(&self, index: [usize; D]) -> T {
        *self.extended_element(index)
    }
}

/// Lazy unary node: `f` applied to each element of `arg`.
pub struct MapExpr<T, F, A, const D: usize> {
    f: F,
    arg: A,
    shape: [usize; D],
    broadcasted: bool,
    _marker: PhantomData<T>,
}

/// Lazy binary node: `f` applied to aligned element pairs of `lhs`/`rhs`.
pub struct ZipExpr<T, F, A, B, const D: usize> {
    f: F,
    lhs: A,
    rhs: B,
    shape: [usize; D],
    broadcasted: bool,
    _marker: PhantomData<T>,
}

impl<T, F, A, const D: usize> MapExpr<T, F, A, D>
where
    T: Scalar,
    F: Fn(T) -> T,
    A: Operand<T, D>,
{
    pub(crate) fn new(f: F, arg: A) -> Self {
        assert!(D >= 1, "expression rank must be at least 1");
        let mut shape = [0usize; D];
        arg.fold_shape(&mut shape);
        let broadcasted = arg.is_broadcast_with(&shape);
        Self {
            f,
            arg,
            shape,
            broadcasted,
            _marker: PhantomData,
        }
    }

    /// Cached result extents.
    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    /// Whether materialization must take the broadcasting path.
    pub fn broadcasted(&self) -> bool {
        self.broadcasted
    }
}

impl<T, F, A, B, const D: usize> ZipExpr<T, F, A, B, D>
where
    T: Scalar,
    F: Fn(T, T) -> T,
    A: Operand<T, D>,
    B: Operand<T, D>,
{
    pub(crate) fn new(f: F, lhs: A, rhs: B) -> Self {
        assert!(D >= 1, "expression rank must be at least 1");
        let mut shape = [0usize; D];
        lhs.fold_shape(&mut shape);
        rhs.fold_shape(&mut shape);
        let broadcasted = lhs.is_broadcast_with(&shape) || rhs.is_broadcast_with(&shape);
        Self {
            f,
            lhs,
            rhs,
            shape,
            broadcasted,
            _marker: PhantomData,
        }
    }

    /// Cached result extents.
    pub fn shape(&self) -> [usize; D] {
        self.shape
    }

    /// Whether materialization must take the broadcasting path.
    pub fn broadcasted(&self) -> bool {
        self.broadcasted
    }
}

impl<T, F, A, const D: usize> Operand<T, D> for MapExpr<T, F, A, D>
where
    T: Scalar,
    F: Fn(T) -> T,
    A: Operand<T, D>,
{
    const RANK: usize = D;
    const CONTIGUOUS: bool = A::CONTIGUOUS;

    fn fold_shape(&self, target: &mut [usize; D]) {
        align_shapes(target, &self.shape);
    }

    fn is_broadcast_with(&self, target: &[usize; D]) -> bool {
        self.broadcasted || self.shape != *target
    }

    fn get_flat(&self, i: usize) -> T {
        (self.f)(self.arg.get_flat(i))
    }

    fn get_index(&self, index: [usize; D]) -> T {
        (self.f)(self.arg.get_index(index))
    }

    fn get_extended(&self, index: [usize; D]) -> T {
        (self.f)(self.arg.get_extended(index))
    }
}

impl<T, F, A, B, const D: usize> Operand<T, D> for ZipExpr<T, F, A, B, D>
where
    T: Scalar,
    F: Fn(T, T) -> T,
    A: Operand<T, D>,
    B: Operand<T, D>,
{
    const RANK: usize = D;
    const CONTIGUOUS: bool = A::CONTIGUOUS && B::CONTIGUOUS;

    fn fold_shape(&self, target: &mut [usize; D]) {
        align_shapes(target, &self.shape);
    }

    fn is_broadcast_with(&self, target: &[usize; D]) -> bool {
        self.broadcasted || self.shape != *target
    }

    fn get_flat(&self, i: usize) -> T {
        (self.f)(self.lhs.get_flat(i), self.rhs.get_flat(i))
    }

    fn get_index(&self, index: [usize; D]) -> T {
        (self.f)(self.lhs.get_index(index), self.rhs.get_index(index))
    }

    fn get_extended(&self, index: [usize; D]) -> T {
        (self.f)(self.lhs.get_extended(index), self.rhs.get_extended(index))
    }
}

// ============================================================================
// Factories
// ============================================================================

/// Lazy unary application of `f` over every element of `arg`.
pub fn map<T, F, A, const D: usize>(f: F, arg: A) -> MapExpr<T, F, A, D>
where
    T: Scalar,
    F: Fn(T) -> T,
    A: Operand<T, D>,
{
    MapExpr::new(f, arg)
}

/// Lazy binary application of `f` over aligned elements of `lhs` and
/// `rhs`.
pub fn apply<T, F, A, B, const D: usize>(f: F, lhs: A, rhs: B) -> ZipExpr<T, F, A, B, D>
where
    T: Scalar,
    F: Fn(T, T) -> T,
    A: Operand<T, D>,
    B: Operand<T, D>,
{
    ZipExpr::new(f, lhs, rhs)
}

/// Lazy element-wise square root.
pub fn sqrt<T, A, const D: usize>(arg: A) -> MapExpr<T, fn(T) -> T, A, D>
where
    T: Scalar + Float,
    A: Operand<T, D>,
{
    MapExpr::new(<T as Float>::sqrt as fn(T) -> T, arg)
}

/// Lazy element-wise exponential.
pub fn exp<T, A, const D: usize>(arg: A) -> MapExpr<T, fn(T) -> T, A, D>
where
    T: Scalar + Float,
    A: Operand<T, D>,
{
    MapExpr::new(<T as Float>::exp as fn(T) -> T, arg)
}

/// Lazy element-wise natural logarithm.
pub fn log<T, A, const D: usize>(arg: A) -> MapExpr<T, fn(T) -> T, A, D>
where
    T: Scalar + Float,
    A: Operand<T, D>,
{
    MapExpr::new(<T as Float>::ln as fn(T) -> T, arg)
}

/// Lazy element-wise power with a fixed exponent.
pub fn pow<T, A, const D: usize>(arg: A, exponent: T) -> MapExpr<T, impl Fn(T) -> T, A, D>
where
    T: Scalar + Float,
    A: Operand<T, D>,
{
    MapExpr::new(move |x: T| x.powf(exponent), arg)
}

// ============================================================================
// Operator overloads
// ============================================================================

macro_rules! impl_nd_lhs_op {
    ($trait:ident, $method:ident) => {
        impl<'a, T, R, const D: usize> $trait<R> for View<'a, T, D>
        where
            T: Scalar,
            R: Operand<T, D>,
        {
            type Output = ZipExpr<T, fn(T, T) -> T, View<'a, T, D>, R, D>;

            fn $method(self, rhs: R) -> Self::Output {
                ZipExpr::new(<T as $trait>::$method as fn(T, T) -> T, self, rhs)
            }
        }

        impl<'t, T, R, const D: usize> $trait<R> for &'t Tensor<T, D>
        where
            T: Scalar,
            R: Operand<T, D>,
        {
            type Output = ZipExpr<T, fn(T, T) -> T, &'t Tensor<T, D>, R, D>;

            fn $method(self, rhs: R) -> Self::Output {
                ZipExpr::new(<T as $trait>::$method as fn(T, T) -> T, self, rhs)
            }
        }

        impl<T, F, A, R, const D: usize> $trait<R> for MapExpr<T, F, A, D>
        where
            T: Scalar,
            F: Fn(T) -> T,
            A: Operand<T, D>,
            R: Operand<T, D>,
        {
            type Output = ZipExpr<T, fn(T, T) -> T, MapExpr<T, F, A, D>, R, D>;

            fn $method(self, rhs: R) -> Self::Output {
                ZipExpr::new(<T as $trait>::$method as fn(T, T) -> T, self, rhs)
            }
        }

        impl<T, F, A, B, R, const D: usize> $trait<R> for ZipExpr<T, F, A, B, D>
        where
            T: Scalar,
            F: Fn(T, T) -> T,
            A: Operand<T, D>,
            B: Operand<T, D>,
            R: Operand<T, D>,
        {
            type Output = ZipExpr<T, fn(T, T) -> T, ZipExpr<T, F, A, B, D>, R, D>;

            fn $method(self, rhs: R) -> Self::Output {
                ZipExpr::new(<T as $trait>::$method as fn(T, T) -> T, self, rhs)
            }
        }
    };
}

impl_nd_lhs_op!(Add, add);
impl_nd_lhs_op!(Sub, sub);
impl_nd_lhs_op!(Mul, mul);
impl_nd_lhs_op!(Div, div);

// Scalar-on-the-left operators have to be spelled per scalar type: a
// foreign type can only implement a std operator trait when the right-hand
// side is a crate-local type.
macro_rules! impl_scalar_lhs_op {
    ($t:ty, $trait:ident, $method:ident) => {
        impl<'a, const D: usize> $trait<View<'a, $t, D>> for $t {
            type Output = ZipExpr<$t, fn($t, $t) -> $t, $t, View<'a, $t, D>, D>;

            fn $method(self, rhs: View<'a, $t, D>) -> Self::Output {
                ZipExpr::new(<$t as $trait>::$method as fn($t, $t) -> $t, self, rhs)
            }
        }

        impl<'t, const D: usize> $trait<&'t Tensor<$t, D>> for $t {
            type Output = ZipExpr<$t, fn($t, $t) -> $t, $t, &'t Tensor<$t, D>, D>;

            fn $method(self, rhs: &'t Tensor<$t, D>) -> Self::Output {
                ZipExpr::new(<$t as $trait>::$method as fn($t, $t) -> $t, self, rhs)
            }
        }

        impl<F, A, const D: usize> $trait<MapExpr<$t, F, A, D>> for $t
        where
            F: Fn($t) -> $t,
            A: Operand<$t, D>,
        {
            type Output = ZipExpr<$t, fn($t, $t) -> $t, $t, MapExpr<$t, F, A, D>, D>;

            fn $method(self, rhs: MapExpr<$t, F, A, D>) -> Self::Output {
                ZipExpr::new(<$t as $trait>::$method as fn($t, $t) -> $t, self, rhs)
            }
        }

        impl<F, A, B, const D: usize> $trait<ZipExpr<$t, F, A, B, D>> for $t
        where
            F: Fn($t, $t) -> $t,
            A: Operand<$t, D>,
            B: Operand<$t, D>,
        {
            type Output = ZipExpr<$t, fn($t, $t) -> $t, $t, ZipExpr<$t, F, A, B, D>, D>;

            fn $method(self, rhs: ZipExpr<$t, F, A, B, D>) -> Self::Output {
                ZipExpr::new(<$t as $trait>::$method as fn($t, $t) -> $t, self, rhs)
            }
        }
    };
    ($($t:ty),* $(,)?) => {
        $(
            impl_scalar_lhs_op!($t, Add, add);
            impl_scalar_lhs_op!($t, Sub, sub);
            impl_scalar_lhs_op!($t, Mul, mul);
            impl_scalar_lhs_op!($t, Div, div);
        )*
    };
}

impl_scalar_lhs_op!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64, Complex32, Complex64);

// ============================================================================
// Materializers
// ============================================================================

impl<T: Scalar, const D: usize> Tensor<T, D> {
    /// Materialize a lazy expression into a freshly allocated tensor.
    pub fn from_expr<E: Operand<T, D>>(expr: E) -> Self {
        let mut out = Self::default();
        out.assign_expr(expr);
        out
    }

    /// Materialize a lazy expression into this tensor, reshaping to the
    /// expression's shape if necessary.
    ///
    /// When every operand is contiguous and nothing is broadcast, the
    /// expression is evaluated with a single flat loop; otherwise every
    /// cell is computed by multi-index (extended) access in row-major
    /// order.
    pub fn assign_expr<E: Operand<T, D>>(&mut self, expr: E) {
        let mut shape = [0usize; D];
        expr.fold_shape(&mut shape);
        if self.shape() != shape {
            self.reshape(shape);
        }
        let broadcasted = expr.is_broadcast_with(&shape);
        if E::CONTIGUOUS && !broadcasted {
            let data = self.data_mut();
            for (i, slot) in data.iter_mut().enumerate() {
                *slot = expr.get_flat(i);
            }
        } else if broadcasted {
            let data = self.data_mut();
            let mut flat = 0;
            for_each_index(shape, |idx| {
                data[flat] = expr.get_extended(idx);
                flat += 1;
            });
        } else {
            let data = self.data_mut();
            let mut flat = 0;
            for_each_index(shape, |idx| {
                data[flat] = expr.get_index(idx);
                flat += 1;
            });
        }
    }
}

impl<T: Scalar, const D: usize> ViewMut<'_, T, D> {
    /// Materialize a lazy expression into this view.
    ///
    /// The expression's shape must equal the view's shape — views cannot
    /// grow. Evaluation is a row-major multi-index walk; extended access is
    /// used when the expression involves broadcasting.
    pub fn assign_expr<E: Operand<T, D>>(&mut self, expr: E) {
        let mut shape = [0usize; D];
        expr.fold_shape(&mut shape);
        assert_eq!(
            shape,
            self.shape(),
            "shape mismatch: a view cannot grow to the expression's shape"
        );
        let broadcasted = expr.is_broadcast_with(&shape);
        if broadcasted {
            for_each_index(shape, |idx| self.set(idx, expr.get_extended(idx)));
        } else {
            for_each_index(shape, |idx| self.set(idx, expr.get_index(idx)));
        }
    }
}
