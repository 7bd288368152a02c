//! Integration coverage for tensors, views, slicing, and iteration.

use ndtensor::{
    broadcast2_into, broadcast_index_into, span, NewAxis, Tensor, TensorError, ALL, END,
};

#[test]
fn shape_of_sliced_tensor() {
    let arr = Tensor::<i32, 4>::new([5, 5, 5, 10]);
    assert_eq!(arr.shape(), [5, 5, 5, 10]);
    assert_eq!(arr.len(), 5 * 5 * 5 * 10);

    let arr_view = arr.slice::<3, _>((span(2, END), 2, ALL, span(1, 2)));
    assert_eq!(arr_view.shape(), [3, 5, 1]);
}

#[test]
fn indexing_and_flat_access() {
    let mut arr = Tensor::<i32, 3>::new([3, 2, 4]);
    assert_eq!(arr[[0, 0, 1]], 0);
    arr[[0, 0, 0]] = 1;
    assert_eq!(arr[0], 1);
    assert_eq!(arr.slice::<1, _>((span(0, 2), 0, 0)).len(), 2);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn indexing_past_extent_panics() {
    let arr = Tensor::<i32, 3>::new([3, 2, 4]);
    let _ = arr[[3, 0, 0]];
}

#[test]
#[should_panic(expected = "inconsistent range")]
fn span_past_extent_panics() {
    let arr = Tensor::<i32, 3>::new([3, 2, 4]);
    let _ = arr.slice::<1, _>((0, span(0, 3), 0));
}

#[test]
fn row_assignment_and_printing() {
    let mut m = Tensor::<i32, 2>::new([2, 2]);
    m.fill(1);

    let mut m2 = Tensor::<i32, 2>::new([2, 2]);
    m2.fill(2);

    m.slice_mut::<1, _>((0, ALL)).assign(&m2.slice::<1, _>((0, ALL)));
    assert_eq!(format!("{m}"), "[[2, 2], [1, 1]]");

    m.slice_mut::<1, _>((ALL, 1)).fill(3);
    assert_eq!(format!("{}", m.slice::<1, _>((ALL, 1))), "[3, 3]");
}

#[test]
fn negative_indices_count_from_the_end() {
    let t = Tensor::<i32, 4>::new([4, 2, 5, 6]);
    let t2 = t.slice::<3, _>((span(0, -1), -1, ALL, span(2, END)));
    assert_eq!(t2.shape(), [3, 5, 4]);

    let m = Tensor::<i32, 2>::from_fn([3, 4], |idx| (idx[0] * 4 + idx[1]) as i32);
    assert_eq!(
        m.slice::<1, _>((ALL, -1)).to_vec(),
        m.slice::<1, _>((ALL, 3)).to_vec()
    );
}

#[test]
fn broadcasting_engine() {
    let a = ndtensor::full([1, 2, 5], 1);
    let b = ndtensor::full([1, 2, 5], 2);
    let mut c = Tensor::<i32, 3>::new([1, 2, 5]);

    broadcast2_into(&mut c.view_mut(), &a.view(), &b.view(), |x, y| x + y);
    assert!(c.iter().all(|&x| x == 3));

    let mut a = a;
    broadcast_index_into(&mut a.view_mut(), |_, idx| {
        idx[0] as i32 + (idx[1] * idx[1]) as i32 - idx[2] as i32
    });
    for i in 0..1 {
        for j in 0..2 {
            for k in 0..5 {
                assert_eq!(a[[i, j, k]], i as i32 + (j * j) as i32 - k as i32);
            }
        }
    }
}

#[test]
fn reshape_after_default_construction() {
    let mut arr = Tensor::<f32, 3>::default();
    arr.reshape([2, 4, 1]);
    assert_eq!(arr.shape(), [2, 4, 1]);
}

#[test]
fn one_dimensional_view_write() {
    let mut arr = Tensor::<i32, 2>::from_fn([4, 4], |idx| (idx[0] * 4 + idx[1]) as i32);

    arr.slice_mut::<1, _>((ALL, 1)).fill(0);

    let mut linindex = 0;
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(arr[[i, j]], if j == 1 { 0 } else { linindex });
            linindex += 1;
        }
    }
}

#[test]
fn plane_view_write_and_reverse_fill() {
    let mut arr = Tensor::<i32, 3>::new([5, 5, 5]);
    for (i, x) in arr.iter_mut().rev().enumerate() {
        *x = i as i32;
    }

    arr.slice_mut::<2, _>((ALL, 2, ALL)).fill(0);

    let last = *arr.iter().next_back().unwrap();
    assert_eq!(last, 0);

    let mut val = arr[0];
    for i in 0..5 {
        for j in 0..5 {
            for k in 0..5 {
                assert_eq!(arr[[i, j, k]], if j == 2 { 0 } else { val });
                val -= 1;
            }
        }
    }
}

#[test]
fn sorting_a_plane_view() {
    let mut arr = Tensor::<i32, 3>::new([4, 5, 5]);
    for (i, x) in arr.iter_mut().rev().enumerate() {
        *x = i as i32;
    }

    let mut view = arr.slice_mut::<2, _>((ALL, 2, ALL));
    assert_eq!(view.iter().len(), 4 * 5);

    let before: Vec<i32> = {
        let mut v = view.to_vec();
        v.sort_unstable();
        v
    };
    view.sort_unstable();
    assert_eq!(view.to_vec(), before);

    let mut values = Vec::new();
    for i in 0..4 {
        for j in 0..5 {
            values.push(arr[[i, 2, j]]);
        }
    }
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn iterator_distance_matches_length() {
    let arr = Tensor::<i32, 3>::new([4, 5, 5]);
    let v = arr.slice::<2, _>((ALL, 2, ALL));
    assert_eq!(v.iter().len(), v.len());
    let v1 = arr.slice::<1, _>((0, 0, ALL));
    assert_eq!(v1.iter().len(), 5);
}

#[test]
fn slicing_composes_like_a_single_slice() {
    let t = Tensor::<i32, 3>::from_fn([4, 5, 6], |idx| (idx[0] * 30 + idx[1] * 6 + idx[2]) as i32);
    let composed = t
        .slice::<3, _>((span(1, 4), span(0, 4), span(2, 6)))
        .slice::<2, _>((2, span(1, 3), ALL));
    let direct = t.slice::<2, _>((3, span(1, 3), span(2, 6)));
    assert_eq!(composed.shape(), direct.shape());
    assert_eq!(composed.to_vec(), direct.to_vec());
}

#[test]
fn outer_product_by_broadcasting() {
    let a = Tensor::<i32, 2>::from_fn([3, 3], |idx| (idx[0] * 3 + idx[1] + 1) as i32);
    let b = Tensor::<i32, 2>::from_fn([3, 3], |idx| (2 * idx[0] + idx[1] + 1) as i32);
    let mut ab = Tensor::<i32, 4>::new([3, 3, 3, 3]);

    broadcast2_into(
        &mut ab.view_mut(),
        &a.slice::<4, _>((ALL, ALL, NewAxis, NewAxis)),
        &b.slice::<4, _>((NewAxis, NewAxis, ALL, ALL)),
        |x, y| x * y,
    );

    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                for l in 0..3 {
                    assert_eq!(ab[[i, j, k, l]], a[[i, j]] * b[[k, l]]);
                }
            }
        }
    }
}

#[test]
fn nested_list_construction() {
    let arr = Tensor::<i32, 3>::from_nested([[[1, 2], [3, 4], [5, 6]]]).unwrap();
    assert_eq!(arr.shape(), [1, 3, 2]);
    let elements: Vec<i32> = arr.iter().copied().collect();
    assert_eq!(elements, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn ragged_nested_list_is_rejected() {
    let result = Tensor::<i32, 2>::from_nested(vec![vec![1, 2, 3], vec![3, 4]]);
    assert!(matches!(
        result,
        Err(TensorError::RaggedInitializer { .. })
    ));
}

#[test]
fn view_covariance_shares_storage() {
    let mut t = Tensor::<i32, 2>::from_fn([2, 3], |idx| (idx[0] * 3 + idx[1]) as i32);
    let mut vm = t.slice_mut::<1, _>((1, ALL));
    vm.set([0], 99);
    let v = vm.as_view();
    assert_eq!(v.shape(), [3]);
    assert_eq!(v[[0]], 99);
    assert_eq!(v[[2]], 5);
}

#[test]
fn generic_algorithms_over_view_iterators() {
    let t = Tensor::<i32, 2>::from_fn([4, 4], |idx| (idx[0] * 4 + idx[1]) as i32);
    let col = t.slice::<1, _>((ALL, 2));
    let sum: i32 = col.iter().sum();
    assert_eq!(sum, 2 + 6 + 10 + 14);
    let max = col.iter().max();
    assert_eq!(max, Some(&14));
}
