//! Non-owning strided views over tensor storage.
//!
//! A view is a descriptor `{data, offset, extents, strides}` into storage
//! owned by someone else. [`View`] is the shared (read-only) flavor and is
//! freely copyable; [`ViewMut`] is unique and supports in-place writes.
//! Slicing produces further views without touching the data; the borrow
//! checker keeps every view within the lifetime of its backing storage.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::broadcast::for_each_index;
use crate::iter::{Iter, IterMut};
use crate::scalar::Scalar;
use crate::shape::{is_contiguous, row_major_strides, total_len};
use crate::slicing::{sliced_layout, AxisSpec, SliceArgs, MAX_SPECS};
use crate::tensor::Tensor;

/// Immutable strided view over borrowed storage.
///
/// # Type Parameters
/// - `'a`: lifetime of the backing storage
/// - `T`: element type
/// - `D`: rank (const generic)
pub struct View<'a, T, const D: usize> {
    data: &'a [T],
    offset: usize,
    extents: [usize; D],
    strides: [usize; D],
}

/// Mutable strided view over borrowed storage.
///
/// Same layout as [`View`], but unique: it borrows its storage mutably and
/// is the target of every bulk-assignment path (scalar fill, elementwise
/// copy, lazy-expression materialization).
pub struct ViewMut<'a, T, const D: usize> {
    data: &'a mut [T],
    offset: usize,
    extents: [usize; D],
    strides: [usize; D],
}

impl<T, const D: usize> Clone for View<'_, T, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const D: usize> Copy for View<'_, T, D> {}

impl<T, const D: usize> fmt::Debug for View<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("extents", &self.extents)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T, const D: usize> fmt::Debug for ViewMut<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewMut")
            .field("extents", &self.extents)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

/// Greatest address reachable by the layout, plus one; 0 for empty layouts.
fn required_len(offset: usize, extents: &[usize], strides: &[usize]) -> usize {
    if extents.iter().any(|&e| e == 0) {
        return 0;
    }
    let mut last = offset;
    for (&e, &s) in extents.iter().zip(strides) {
        last += (e - 1) * s;
    }
    last + 1
}

impl<'a, T, const D: usize> View<'a, T, D> {
    /// Create a view from raw parts.
    ///
    /// Every address reachable through `extents`/`strides` from `offset`
    /// must lie inside `data`; violations are asserted.
    pub fn from_parts(
        data: &'a [T],
        extents: [usize; D],
        strides: [usize; D],
        offset: usize,
    ) -> Self {
        assert!(D >= 1, "rank must be at least 1");
        assert!(
            required_len(offset, &extents, &strides) <= data.len(),
            "view layout reaches past the backing storage"
        );
        Self {
            data,
            offset,
            extents,
            strides,
        }
    }

    /// The extents tuple.
    #[inline]
    pub fn shape(&self) -> [usize; D] {
        self.extents
    }

    /// Strides in elements per axis.
    #[inline]
    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Number of elements addressed by the view.
    #[inline]
    pub fn len(&self) -> usize {
        total_len(&self.extents)
    }

    /// True if any extent is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.extents.iter().any(|&e| e == 0)
    }

    /// Whether the view addresses a dense row-major block.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.extents, &self.strides)
    }

    /// The backing storage as a slice, if the view is contiguous.
    pub fn as_slice(&self) -> Option<&'a [T]> {
        if self.is_contiguous() {
            Some(&self.data[self.offset..self.offset + self.len()])
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn linear_index(&self, index: [usize; D]) -> usize {
        let mut off = self.offset;
        for i in 0..D {
            assert!(
                index[i] < self.extents[i],
                "index {} out of bounds for axis {i} of extent {}",
                index[i],
                self.extents[i]
            );
            off += index[i] * self.strides[i];
        }
        off
    }

    /// Address computation for broadcasting reads: axes of extent 1 are
    /// ignored, as are leading entries of an index longer than the rank.
    pub(crate) fn extended_offset(&self, index: &[usize]) -> usize {
        debug_assert!(index.len() >= D, "extended index shorter than rank");
        let skip = index.len() - D;
        let mut off = self.offset;
        for i in 0..D {
            if self.extents[i] != 1 {
                off += index[skip + i] * self.strides[i];
            }
        }
        off
    }

    /// Copy out the element at `index`.
    #[inline]
    pub fn get(&self, index: [usize; D]) -> T
    where
        T: Copy,
    {
        self.data[self.linear_index(index)]
    }

    /// Element access for broadcasting: `index` may be longer than the
    /// rank (leading entries are ignored) and axes of extent 1 accept any
    /// index value.
    pub fn extended_element<const M: usize>(&self, index: [usize; M]) -> &'a T {
        &self.data[self.extended_offset(&index)]
    }

    /// Slice-indexed variant of [`View::extended_element`] used by the
    /// expression evaluator.
    pub(crate) fn get_extended_slice(&self, index: &[usize]) -> T
    where
        T: Copy,
    {
        self.data[self.extended_offset(index)]
    }

    /// Slice the view with a tuple of specifiers, producing a rank-`E`
    /// child view. `E` must equal the parent rank minus the number of
    /// integer specifiers plus the number of new axes; it is stated by the
    /// caller and checked at runtime.
    pub fn slice<const E: usize, S: SliceArgs>(&self, specs: S) -> View<'a, T, E> {
        let mut buf = [AxisSpec::Index(0); MAX_SPECS];
        let n = specs.write(&mut buf);
        let (advance, extents, strides) = sliced_layout::<D, E>(&buf[..n], &self.extents, &self.strides);
        View {
            data: self.data,
            offset: self.offset + advance,
            extents,
            strides,
        }
    }

    /// Row-major iterator over the elements.
    pub fn iter(&self) -> Iter<'a, T, D> {
        Iter::new(self.data, self.offset, self.extents, self.strides)
    }

    /// Gather the elements into a `Vec` in row-major order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Copy,
    {
        if let Some(s) = self.as_slice() {
            return s.to_vec();
        }
        self.iter().copied().collect()
    }

    /// Copy the viewed elements into a freshly owned tensor.
    pub fn to_tensor(&self) -> Tensor<T, D>
    where
        T: Scalar,
    {
        Tensor::from_parts(self.to_vec(), self.extents)
    }
}

impl<'a, T, const D: usize> IntoIterator for View<'a, T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, D>;

    fn into_iter(self) -> Iter<'a, T, D> {
        self.iter()
    }
}

impl<T, const D: usize> Index<[usize; D]> for View<'_, T, D> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; D]) -> &T {
        &self.data[self.linear_index(index)]
    }
}

impl<'a, T, const D: usize> ViewMut<'a, T, D> {
    /// Create a mutable view from raw parts; same contract as
    /// [`View::from_parts`].
    pub fn from_parts(
        data: &'a mut [T],
        extents: [usize; D],
        strides: [usize; D],
        offset: usize,
    ) -> Self {
        assert!(D >= 1, "rank must be at least 1");
        assert!(
            required_len(offset, &extents, &strides) <= data.len(),
            "view layout reaches past the backing storage"
        );
        Self {
            data,
            offset,
            extents,
            strides,
        }
    }

    /// The extents tuple.
    #[inline]
    pub fn shape(&self) -> [usize; D] {
        self.extents
    }

    /// Strides in elements per axis.
    #[inline]
    pub fn strides(&self) -> [usize; D] {
        self.strides
    }

    /// Number of elements addressed by the view.
    #[inline]
    pub fn len(&self) -> usize {
        total_len(&self.extents)
    }

    /// True if any extent is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.extents.iter().any(|&e| e == 0)
    }

    /// Whether the view addresses a dense row-major block.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.extents, &self.strides)
    }

    /// The backing storage as a mutable slice, if the view is contiguous.
    pub fn as_mut_slice(&mut self) -> Option<&mut [T]> {
        if self.is_contiguous() {
            let len = self.len();
            Some(&mut self.data[self.offset..self.offset + len])
        } else {
            None
        }
    }

    /// Rebind as a shared view of the same storage, shape, and strides
    /// (the covariant-const projection).
    pub fn as_view(&self) -> View<'_, T, D> {
        View {
            data: &*self.data,
            offset: self.offset,
            extents: self.extents,
            strides: self.strides,
        }
    }

    #[inline]
    fn linear_index(&self, index: [usize; D]) -> usize {
        let mut off = self.offset;
        for i in 0..D {
            assert!(
                index[i] < self.extents[i],
                "index {} out of bounds for axis {i} of extent {}",
                index[i],
                self.extents[i]
            );
            off += index[i] * self.strides[i];
        }
        off
    }

    /// Copy out the element at `index`.
    #[inline]
    pub fn get(&self, index: [usize; D]) -> T
    where
        T: Copy,
    {
        self.data[self.linear_index(index)]
    }

    /// Overwrite the element at `index`.
    #[inline]
    pub fn set(&mut self, index: [usize; D], value: T) {
        let off = self.linear_index(index);
        self.data[off] = value;
    }

    /// Mutable element access for broadcasting writes; see
    /// [`View::extended_element`].
    pub fn extended_element_mut<const M: usize>(&mut self, index: [usize; M]) -> &mut T {
        let off = self.as_view().extended_offset(&index);
        &mut self.data[off]
    }

    /// Slice immutably; see [`View::slice`].
    pub fn slice<const E: usize, S: SliceArgs>(&self, specs: S) -> View<'_, T, E> {
        self.as_view().slice(specs)
    }

    /// Slice mutably, reborrowing the storage for the child view.
    pub fn slice_mut<const E: usize, S: SliceArgs>(&mut self, specs: S) -> ViewMut<'_, T, E> {
        let mut buf = [AxisSpec::Index(0); MAX_SPECS];
        let n = specs.write(&mut buf);
        let (advance, extents, strides) = sliced_layout::<D, E>(&buf[..n], &self.extents, &self.strides);
        ViewMut {
            data: &mut *self.data,
            offset: self.offset + advance,
            extents,
            strides,
        }
    }

    /// Row-major iterator over the elements.
    pub fn iter(&self) -> Iter<'_, T, D> {
        Iter::new(&*self.data, self.offset, self.extents, self.strides)
    }

    /// Row-major iterator yielding mutable references.
    pub fn iter_mut(&mut self) -> IterMut<'_, T, D> {
        let offset = self.offset;
        // Safety: the base pointer stays within the borrowed slice; the
        // iterator visits each in-range multi-index exactly once.
        let ptr = unsafe { self.data.as_mut_ptr().add(offset) };
        IterMut::new(ptr, self.extents, self.strides)
    }

    /// Set every element of the view to `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Copy,
    {
        if let Some(s) = self.as_mut_slice() {
            s.fill(value);
            return;
        }
        for x in self.iter_mut() {
            *x = value;
        }
    }

    /// Elementwise copy from a view of identical shape.
    pub fn assign(&mut self, src: &View<'_, T, D>)
    where
        T: Copy,
    {
        assert_eq!(
            self.extents,
            src.shape(),
            "shape mismatch in bulk assignment"
        );
        for_each_index(self.extents, |idx| {
            self.set(idx, src.get(idx));
        });
    }

    /// Gather the elements into a `Vec` in row-major order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Copy,
    {
        self.as_view().to_vec()
    }

    /// Sort the viewed elements in place, in row-major element order.
    ///
    /// Contiguous views sort the underlying slice directly; strided views
    /// gather, sort, and scatter back.
    pub fn sort_unstable(&mut self)
    where
        T: Copy + Ord,
    {
        if let Some(s) = self.as_mut_slice() {
            s.sort_unstable();
            return;
        }
        let mut values = self.to_vec();
        values.sort_unstable();
        for (dst, v) in self.iter_mut().zip(values) {
            *dst = v;
        }
    }
}

impl<'a, T, const D: usize> From<ViewMut<'a, T, D>> for View<'a, T, D> {
    fn from(v: ViewMut<'a, T, D>) -> Self {
        View {
            data: v.data,
            offset: v.offset,
            extents: v.extents,
            strides: v.strides,
        }
    }
}

impl<T, const D: usize> Index<[usize; D]> for ViewMut<'_, T, D> {
    type Output = T;

    #[inline]
    fn index(&self, index: [usize; D]) -> &T {
        &self.data[self.linear_index(index)]
    }
}

impl<T, const D: usize> IndexMut<[usize; D]> for ViewMut<'_, T, D> {
    #[inline]
    fn index_mut(&mut self, index: [usize; D]) -> &mut T {
        let off = self.linear_index(index);
        &mut self.data[off]
    }
}

/// Render one axis level as a bracketed, comma-separated list.
pub(crate) fn format_nested<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    data: &[T],
    offset: usize,
    extents: &[usize],
    strides: &[usize],
) -> fmt::Result {
    write!(f, "[")?;
    for i in 0..extents[0] {
        if i > 0 {
            write!(f, ", ")?;
        }
        let child = offset + i * strides[0];
        if extents.len() == 1 {
            write!(f, "{}", data[child])?;
        } else {
            format_nested(f, data, child, &extents[1..], &strides[1..])?;
        }
    }
    write!(f, "]")
}

impl<T: fmt::Display, const D: usize> fmt::Display for View<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_nested(f, self.data, self.offset, &self.extents, &self.strides)
    }
}

impl<T: fmt::Display, const D: usize> fmt::Display for ViewMut<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_nested(f, &*self.data, self.offset, &self.extents, &self.strides)
    }
}

impl<'a, T, const D: usize> View<'a, T, D> {
    /// Canonical row-major view over a whole slice.
    pub fn from_shape(data: &'a [T], extents: [usize; D]) -> Self {
        let strides = row_major_strides(extents);
        Self::from_parts(data, extents, strides, 0)
    }
}
