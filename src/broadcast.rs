//! Row-major walks over one or several views with NumPy-style shape
//! alignment.
//!
//! All entry points take equal-rank views; shapes may still differ where an
//! axis has extent 1, in which case that axis is stretched and the view is
//! read through extended element access. Rank alignment from the trailing
//! axis is expressed with `NewAxis` slicing before the call.

use crate::scalar::Scalar;
use crate::shape::broadcast_shape;
use crate::view::{View, ViewMut};

/// Invoke `f` with every multi-index of `shape`, in row-major order
/// (outermost axis slowest, last axis fastest). An empty shape (any extent
/// zero) makes no calls.
pub fn for_each_index<const D: usize>(shape: [usize; D], mut f: impl FnMut([usize; D])) {
    if D == 0 || shape.iter().any(|&e| e == 0) {
        return;
    }
    let mut index = [0usize; D];
    loop {
        f(index);
        let mut axis = D - 1;
        loop {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
            if axis == 0 {
                return;
            }
            axis -= 1;
        }
    }
}

/// The combined shape of destination and sources; asserts the destination
/// covers it (views cannot grow).
fn combined_shape<const D: usize>(dst: [usize; D], srcs: &[[usize; D]]) -> ([usize; D], bool) {
    let mut shapes = Vec::with_capacity(srcs.len() + 1);
    shapes.push(dst);
    shapes.extend_from_slice(srcs);
    let (shape, broadcasted) = broadcast_shape(&shapes);
    assert_eq!(
        shape, dst,
        "destination shape must cover the broadcast shape"
    );
    (shape, broadcasted)
}

/// For every cell of `dst`, store `f(src)` with `src` aligned to `dst`.
pub fn broadcast_into<T: Scalar, const D: usize>(
    dst: &mut ViewMut<'_, T, D>,
    src: &View<'_, T, D>,
    f: impl Fn(T) -> T,
) {
    let (shape, broadcasted) = combined_shape(dst.shape(), &[src.shape()]);
    if broadcasted {
        for_each_index(shape, |idx| dst.set(idx, f(*src.extended_element(idx))));
    } else {
        for_each_index(shape, |idx| dst.set(idx, f(src.get(idx))));
    }
}

/// For every cell of `dst`, store `f(a, b)` with both sources aligned to
/// `dst`.
pub fn broadcast2_into<T: Scalar, const D: usize>(
    dst: &mut ViewMut<'_, T, D>,
    a: &View<'_, T, D>,
    b: &View<'_, T, D>,
    f: impl Fn(T, T) -> T,
) {
    let (shape, broadcasted) = combined_shape(dst.shape(), &[a.shape(), b.shape()]);
    if broadcasted {
        for_each_index(shape, |idx| {
            dst.set(idx, f(*a.extended_element(idx), *b.extended_element(idx)));
        });
    } else {
        for_each_index(shape, |idx| dst.set(idx, f(a.get(idx), b.get(idx))));
    }
}

/// Three-source variant of [`broadcast2_into`].
pub fn broadcast3_into<T: Scalar, const D: usize>(
    dst: &mut ViewMut<'_, T, D>,
    a: &View<'_, T, D>,
    b: &View<'_, T, D>,
    c: &View<'_, T, D>,
    f: impl Fn(T, T, T) -> T,
) {
    let (shape, broadcasted) = combined_shape(dst.shape(), &[a.shape(), b.shape(), c.shape()]);
    if broadcasted {
        for_each_index(shape, |idx| {
            dst.set(
                idx,
                f(
                    *a.extended_element(idx),
                    *b.extended_element(idx),
                    *c.extended_element(idx),
                ),
            );
        });
    } else {
        for_each_index(shape, |idx| {
            dst.set(idx, f(a.get(idx), b.get(idx), c.get(idx)));
        });
    }
}

/// For every cell of `dst`, store `f(current, index)` — the element plus its
/// multi-index. Used to fill or rewrite a view as a function of position.
pub fn broadcast_index_into<T: Scalar, const D: usize>(
    dst: &mut ViewMut<'_, T, D>,
    f: impl Fn(T, [usize; D]) -> T,
) {
    for_each_index(dst.shape(), |idx| {
        let current = dst.get(idx);
        dst.set(idx, f(current, idx));
    });
}
