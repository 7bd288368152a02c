//! Owned dense tensors.
//!
//! A tensor is a contiguous row-major buffer plus its extents and canonical
//! strides. All strided access goes through views minted on demand by
//! [`Tensor::view`] / [`Tensor::view_mut`], so moving or cloning a tensor
//! can never leave a view pointing at freed storage.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::broadcast::for_each_index;
use crate::scalar::Scalar;
use crate::shape::{row_major_strides, total_len};
use crate::slicing::{sliced_layout, AxisSpec, SliceArgs, MAX_SPECS};
use crate::view::{format_nested, View, ViewMut};
use crate::{Result, TensorError};

/// Owned dense tensor of rank `D`.
///
/// Invariants: the buffer length equals the product of the extents and the
/// strides are canonical row-major at all times.
#[derive(Clone)]
pub struct Tensor<T, const D: usize> {
    data: Vec<T>,
    extents: [usize; D],
    strides: [usize; D],
}

impl<T: Scalar, const D: usize> Tensor<T, D> {
    /// Tensor of the given extents with value-initialized (zero) elements.
    pub fn new(extents: [usize; D]) -> Self {
        assert!(D >= 1, "rank must be at least 1");
        Self {
            data: vec![T::zero(); total_len(&extents)],
            extents,
            strides: row_major_strides(extents),
        }
    }

    /// Adopt a row-major buffer whose length matches the extents product.
    pub fn from_parts(data: Vec<T>, extents: [usize; D]) -> Self {
        assert!(D >= 1, "rank must be at least 1");
        assert_eq!(
            data.len(),
            total_len(&extents),
            "buffer length must equal the product of the extents"
        );
        Self {
            data,
            extents,
            strides: row_major_strides(extents),
        }
    }

    /// Fill a new tensor by calling `f` with every multi-index in row-major
    /// order.
    pub fn from_fn(extents: [usize; D], mut f: impl FnMut([usize; D]) -> T) -> Self {
        let mut data = Vec::with_capacity(total_len(&extents));
        for_each_index(extents, |idx| data.push(f(idx)));
        Self::from_parts(data, extents)
    }

    /// Build a rank-`D` tensor from a nested list, adopting the length of
    /// the first list seen at each depth as that axis's extent.
    ///
    /// Fails with [`TensorError::RaggedInitializer`] if a later list at the
    /// same depth has a different length; nothing is observable from the
    /// partial walk.
    pub fn from_nested<L: NestedList<T>>(list: L) -> Result<Self> {
        assert!(D >= 1, "rank must be at least 1");
        assert_eq!(
            L::DEPTH,
            D,
            "nested list depth {} must match tensor rank {D}",
            L::DEPTH
        );
        let mut extents = [0usize; D];
        let mut data = Vec::new();
        list.walk(&mut data, &mut extents, 0)?;
        Ok(Self::from_parts(data, extents))
    }

    /// Discard the contents and adopt new extents with a value-initialized
    /// buffer.
    pub fn reshape(&mut self, extents: [usize; D]) {
        self.data.clear();
        self.data.resize(total_len(&extents), T::zero());
        self.extents = extents;
        self.strides = row_major_strides(extents);
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T: Scalar, const D: usize> Default for Tensor<T, D> {
    /// Empty tensor (every extent zero); [`Tensor::reshape`] before use.
    fn default() -> Self {
        Self::new([0; D])
    }
}

impl<T, const D: usize> Tensor<T, D> {
    /// The extents tuple.
    #[inline]
    pub fn shape(&self) -> [usize; D] {
        self.extents
    }

    /// Canonical row-major strides.
    #[inline]
    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The contiguous buffer in row-major order.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the contiguous buffer.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// A view of the whole tensor.
    pub fn view(&self) -> View<'_, T, D> {
        View::from_parts(&self.data, self.extents, self.strides, 0)
    }

    /// A mutable view of the whole tensor.
    pub fn view_mut(&mut self) -> ViewMut<'_, T, D> {
        ViewMut::from_parts(&mut self.data, self.extents, self.strides, 0)
    }

    /// Slice with a tuple of specifiers; see [`View::slice`].
    pub fn slice<const E: usize, S: SliceArgs>(&self, specs: S) -> View<'_, T, E> {
        self.view().slice(specs)
    }

    /// Mutable slice with a tuple of specifiers.
    pub fn slice_mut<const E: usize, S: SliceArgs>(&mut self, specs: S) -> ViewMut<'_, T, E> {
        let mut buf = [AxisSpec::Index(0); MAX_SPECS];
        let n = specs.write(&mut buf);
        let (offset, extents, strides) = sliced_layout::<D, E>(&buf[..n], &self.extents, &self.strides);
        ViewMut::from_parts(&mut self.data, extents, strides, offset)
    }

    /// Iterate the buffer in row-major (memory) order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Mutable iteration over the buffer in memory order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }

    /// Copy out the element at `index`.
    #[inline]
    pub fn get(&self, index: [usize; D]) -> T
    where
        T: Copy,
    {
        self.view().get(index)
    }

    /// Overwrite the element at `index`.
    #[inline]
    pub fn set(&mut self, index: [usize; D], value: T)
    where
        T: Copy,
    {
        self.view_mut().set(index, value);
    }

    /// Element access for broadcasting reads; see [`View::extended_element`].
    pub fn extended_element<const M: usize>(&self, index: [usize; M]) -> &T {
        self.view().extended_element(index)
    }
}

impl<T, const D: usize> Index<[usize; D]> for Tensor<T, D> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; D]) -> &T {
        let off = self.view().linear_index(index);
        &self.data[off]
    }
}

impl<T, const D: usize> IndexMut<[usize; D]> for Tensor<T, D> {
    #[inline]
    fn index_mut(&mut self, index: [usize; D]) -> &mut T {
        let off = self.view().linear_index(index);
        &mut self.data[off]
    }
}

impl<T, const D: usize> Index<usize> for Tensor<T, D> {
    type Output = T;

    /// Flat subscript into the contiguous row-major buffer.
    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T, const D: usize> IndexMut<usize> for Tensor<T, D> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<'a, T, const D: usize> IntoIterator for &'a Tensor<T, D> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'a, T, const D: usize> IntoIterator for &'a mut Tensor<T, D> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter_mut()
    }
}

impl<T: Scalar, const D: usize> From<View<'_, T, D>> for Tensor<T, D> {
    fn from(view: View<'_, T, D>) -> Self {
        view.to_tensor()
    }
}

impl<T: fmt::Display, const D: usize> fmt::Display for Tensor<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_nested(f, &self.data, 0, &self.extents, &self.strides)
    }
}

impl<T: fmt::Debug, const D: usize> fmt::Debug for Tensor<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("extents", &self.extents)
            .field("strides", &self.strides)
            .finish()
    }
}

/// Nested-list sources for [`Tensor::from_nested`].
///
/// Leaves are the scalar types themselves (depth 0); `Vec`s and arrays of
/// nested lists add one depth each.
pub trait NestedList<T> {
    /// Nesting depth; must equal the rank of the tensor being built.
    const DEPTH: usize;

    /// Append elements in row-major order, recording and checking the
    /// extent at each depth.
    fn walk(&self, data: &mut Vec<T>, extents: &mut [usize], depth: usize) -> Result<()>;
}

fn walk_list<T, L: NestedList<T>>(
    items: &[L],
    data: &mut Vec<T>,
    extents: &mut [usize],
    depth: usize,
) -> Result<()> {
    if extents[depth] == 0 {
        extents[depth] = items.len();
    } else if extents[depth] != items.len() {
        return Err(TensorError::RaggedInitializer {
            depth,
            expected: extents[depth],
            got: items.len(),
        });
    }
    for item in items {
        item.walk(data, extents, depth + 1)?;
    }
    Ok(())
}

impl<T, L: NestedList<T>> NestedList<T> for Vec<L> {
    const DEPTH: usize = L::DEPTH + 1;

    fn walk(&self, data: &mut Vec<T>, extents: &mut [usize], depth: usize) -> Result<()> {
        walk_list(self, data, extents, depth)
    }
}

impl<T, L: NestedList<T>, const N: usize> NestedList<T> for [L; N] {
    const DEPTH: usize = L::DEPTH + 1;

    fn walk(&self, data: &mut Vec<T>, extents: &mut [usize], depth: usize) -> Result<()> {
        walk_list(self, data, extents, depth)
    }
}

macro_rules! impl_nested_leaf {
    ($($t:ty),* $(,)?) => {
        $(impl NestedList<$t> for $t {
            const DEPTH: usize = 0;

            fn walk(&self, data: &mut Vec<$t>, _extents: &mut [usize], _depth: usize) -> Result<()> {
                data.push(*self);
                Ok(())
            }
        })*
    };
}

impl_nested_leaf!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    isize,
    f32,
    f64,
    num_complex::Complex32,
    num_complex::Complex64
);
