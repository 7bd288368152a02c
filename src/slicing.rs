//! Slice specifiers and the layout algebra that turns them into views.
//!
//! A specifier is one of:
//! - an integer, which selects one position and collapses the axis
//!   (negative values count from the end of the axis);
//! - a [`Span`], which selects a half-open `[start, end)` subrange;
//! - [`NewAxis`], which inserts an axis of extent 1 without consuming a
//!   parent axis.
//!
//! Axes not named by any specifier are kept in full.

/// Half-open `[start, end)` subrange of one axis.
///
/// Negative values count from the end of the axis. An `end` of [`END`]
/// (zero) means "up to the axis length", so `span(0, END)` — available as
/// the constant [`ALL`] — selects the whole axis. A consequence of the
/// sentinel is that an explicitly empty span is not expressible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: isize,
    pub end: isize,
}

/// Build a [`Span`] selecting `[start, end)` of an axis.
#[inline]
pub const fn span(start: isize, end: isize) -> Span {
    Span { start, end }
}

/// Sentinel for "up to the axis length" in a [`Span`]'s `end` field.
pub const END: isize = 0;

/// Specifier selecting a whole axis.
pub const ALL: Span = span(0, END);

/// Specifier inserting an axis of extent 1 without consuming a parent axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAxis;

/// A resolved slice specifier for one axis.
#[derive(Debug, Clone, Copy)]
pub enum AxisSpec {
    /// Select a single position; the axis collapses.
    Index(isize),
    /// Select a subrange; the axis is kept (possibly shortened).
    Span(Span),
    /// Insert an axis of extent 1.
    NewAxis,
}

impl From<Span> for AxisSpec {
    #[inline]
    fn from(s: Span) -> Self {
        AxisSpec::Span(s)
    }
}

impl From<NewAxis> for AxisSpec {
    #[inline]
    fn from(_: NewAxis) -> Self {
        AxisSpec::NewAxis
    }
}

macro_rules! impl_axis_spec_from_int {
    ($($t:ty),* $(,)?) => {
        $(impl From<$t> for AxisSpec {
            #[inline]
            fn from(i: $t) -> Self {
                AxisSpec::Index(i as isize)
            }
        })*
    };
}

impl_axis_spec_from_int!(i32, i64, isize, usize);

/// Maximum number of specifiers accepted by a single slicing call.
pub const MAX_SPECS: usize = 8;

/// Tuples of specifiers accepted by the slicing methods.
pub trait SliceArgs: Copy {
    /// Write the specifiers into `out`, returning how many were written.
    fn write(self, out: &mut [AxisSpec; MAX_SPECS]) -> usize;
}

macro_rules! impl_slice_args_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Into<AxisSpec> + Copy),+> SliceArgs for ($($name,)+) {
            fn write(self, out: &mut [AxisSpec; MAX_SPECS]) -> usize {
                let mut n = 0;
                $(
                    out[n] = self.$idx.into();
                    n += 1;
                )+
                n
            }
        }
    };
}

impl_slice_args_tuple!(A: 0);
impl_slice_args_tuple!(A: 0, B: 1);
impl_slice_args_tuple!(A: 0, B: 1, C: 2);
impl_slice_args_tuple!(A: 0, B: 1, C: 2, E: 3);
impl_slice_args_tuple!(A: 0, B: 1, C: 2, E: 3, F: 4);
impl_slice_args_tuple!(A: 0, B: 1, C: 2, E: 3, F: 4, G: 5);
impl_slice_args_tuple!(A: 0, B: 1, C: 2, E: 3, F: 4, G: 5, H: 6);
impl_slice_args_tuple!(A: 0, B: 1, C: 2, E: 3, F: 4, G: 5, H: 6, I: 7);

macro_rules! impl_slice_args_single {
    ($($t:ty),* $(,)?) => {
        $(impl SliceArgs for $t {
            fn write(self, out: &mut [AxisSpec; MAX_SPECS]) -> usize {
                out[0] = self.into();
                1
            }
        })*
    };
}

impl_slice_args_single!(i32, i64, isize, usize, Span, NewAxis);

/// Resolve a possibly negative position against an axis extent.
#[inline]
pub(crate) fn resolve_index(i: isize, extent: usize) -> usize {
    let resolved = if i >= 0 { i } else { extent as isize + i };
    assert!(
        resolved >= 0 && (resolved as usize) < extent,
        "index {i} out of range for axis of extent {extent}"
    );
    resolved as usize
}

/// Resolve a span to `(start, extent)` against an axis extent.
#[inline]
pub(crate) fn resolve_span(r: Span, extent: usize) -> (usize, usize) {
    let start = if r.start >= 0 {
        r.start
    } else {
        extent as isize + r.start
    };
    let stop = if r.end > 0 {
        r.end
    } else {
        extent as isize + r.end
    };
    assert!(
        start >= 0 && start < stop && stop as usize <= extent,
        "inconsistent range [{}, {}) for axis of extent {extent}",
        r.start,
        r.end
    );
    (start as usize, (stop - start) as usize)
}

/// Number of axes the specifiers leave free: the parent rank, minus one per
/// integer specifier, plus one per new axis.
pub(crate) fn free_dims(parent_rank: usize, specs: &[AxisSpec]) -> usize {
    let ints = specs
        .iter()
        .filter(|s| matches!(s, AxisSpec::Index(_)))
        .count();
    let new_axes = specs
        .iter()
        .filter(|s| matches!(s, AxisSpec::NewAxis))
        .count();
    let consumed = specs.len() - new_axes;
    assert!(
        consumed <= parent_rank,
        "slicing consumes {consumed} axes but the view has only {parent_rank}"
    );
    parent_rank - ints + new_axes
}

/// Apply the specifiers to a parent layout, producing the child layout.
///
/// Returns the offset advance (in elements) plus the child's extents and
/// strides. Integer specifiers advance the offset and collapse their axis;
/// spans advance the offset and keep a (shortened) axis; new axes push an
/// extent-1 axis with stride 0 (extent-1 axes never contribute to an
/// address). Remaining parent axes are copied through in order.
pub(crate) fn sliced_layout<const D: usize, const E: usize>(
    specs: &[AxisSpec],
    extents: &[usize; D],
    strides: &[usize; D],
) -> (usize, [usize; E], [usize; E]) {
    assert!(E >= 1, "a slice must keep at least one axis");
    let produced = free_dims(D, specs);
    assert_eq!(
        produced, E,
        "slice specifiers produce rank {produced}, expected {E}"
    );

    let mut out_extents = [0usize; E];
    let mut out_strides = [0usize; E];
    let mut offset = 0usize;
    let mut old_axis = 0usize;
    let mut new_axis = 0usize;

    for spec in specs {
        match *spec {
            AxisSpec::Index(i) => {
                offset += strides[old_axis] * resolve_index(i, extents[old_axis]);
                old_axis += 1;
            }
            AxisSpec::Span(r) => {
                let (start, extent) = resolve_span(r, extents[old_axis]);
                offset += strides[old_axis] * start;
                out_extents[new_axis] = extent;
                out_strides[new_axis] = strides[old_axis];
                new_axis += 1;
                old_axis += 1;
            }
            AxisSpec::NewAxis => {
                out_extents[new_axis] = 1;
                out_strides[new_axis] = 0;
                new_axis += 1;
            }
        }
    }

    // Trailing axes not named by any specifier are kept in full.
    for axis in old_axis..D {
        out_extents[new_axis] = extents[axis];
        out_strides[new_axis] = strides[axis];
        new_axis += 1;
    }

    (offset, out_extents, out_strides)
}
