//! Dense N-dimensional tensors with strided views, broadcasting, and lazy
//! element-wise expressions.
//!
//! The rank of every tensor and view is a const-generic parameter; extents
//! are runtime values. Storage is always row-major (last axis fastest).
//!
//! # Core Types
//!
//! - [`Tensor`]: Owned dense tensor over a contiguous buffer
//! - [`View`] / [`ViewMut`]: Non-owning strided views into tensor storage
//! - [`Span`], [`NewAxis`], [`ALL`], [`END`]: slice specifiers
//! - [`MapExpr`] / [`ZipExpr`]: lazy element-wise expression nodes
//!
//! # Slicing
//!
//! Views are produced by calling [`Tensor::slice`] (or [`View::slice`]) with
//! a tuple of specifiers: an integer collapses an axis, a [`Span`] selects a
//! half-open subrange, and [`NewAxis`] inserts an axis of extent 1. Axes not
//! named by any specifier are kept in full. The resulting rank is stated by
//! the caller and checked at runtime:
//!
//! ```rust
//! use ndtensor::{Tensor, span, ALL, END};
//!
//! let t = Tensor::<i32, 4>::new([5, 5, 5, 10]);
//! let v = t.slice::<3, _>((span(2, END), 2, ALL, span(1, 2)));
//! assert_eq!(v.shape(), [3, 5, 1]);
//! ```
//!
//! # Lazy expressions
//!
//! Arithmetic on tensors, views, and scalars builds an expression node
//! instead of computing immediately; the whole compound expression is
//! evaluated in a single element-wise pass when it is materialized:
//!
//! ```rust
//! use ndtensor::Tensor;
//!
//! let a = Tensor::<i32, 2>::from_fn([2, 3], |idx| (idx[0] * 3 + idx[1]) as i32);
//! let b = Tensor::<i32, 2>::from_fn([2, 3], |idx| 2 * (idx[0] * 3 + idx[1]) as i32);
//! let c = Tensor::from_expr(3 * &a + &b);
//! assert_eq!(c[[1, 2]], 25);
//! ```
//!
//! # Broadcasting
//!
//! Shapes align from the trailing axis; axes of extent 1 stretch to match.
//! Expressions over mismatched (but compatible) shapes evaluate through
//! extended element access, and the [`broadcast2_into`] family walks several
//! views at once in row-major order.

mod broadcast;
mod expr;
mod init;
mod iter;
mod scalar;
mod shape;
mod slicing;
mod tensor;
mod view;

pub use broadcast::{
    broadcast2_into, broadcast3_into, broadcast_index_into, broadcast_into, for_each_index,
};
pub use expr::{apply, exp, log, map, pow, sqrt, MapExpr, Operand, ZipExpr};
pub use init::{full, ones, rand, seed, zeros};
pub use iter::{Iter, IterMut};
pub use scalar::Scalar;
pub use shape::{align_shapes, broadcast_shape, is_contiguous, row_major_strides};
pub use slicing::{span, AxisSpec, NewAxis, SliceArgs, Span, ALL, END, MAX_SPECS};
pub use tensor::{NestedList, Tensor};
pub use view::{View, ViewMut};

/// Errors surfaced by fallible operations.
///
/// Contract violations (out-of-range indices, inconsistent slice ranges,
/// shape mismatches in bulk assignment) are assertions, not errors; the only
/// recoverable failure is constructing a tensor from a non-rectangular
/// nested list, because that depends on user data rather than on caller
/// contract.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// Nested-list initialization encountered a list whose length differs
    /// from the length first seen at the same depth.
    #[error("ragged nested list: expected {expected} elements at depth {depth}, got {got}")]
    RaggedInitializer {
        depth: usize,
        expected: usize,
        got: usize,
    },
}

/// Result type for tensor operations.
pub type Result<T> = std::result::Result<T, TensorError>;
