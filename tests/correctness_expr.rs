//! Integration coverage for lazy expression evaluation.

use approx::assert_relative_eq;
use ndtensor::{apply, pow, rand, seed, sqrt, zeros, Tensor, ALL};

#[test]
fn compound_expression_over_whole_arrays() {
    let mut a = Tensor::<i32, 3>::new([5, 5, 5]);
    for (val, x) in a.iter_mut().enumerate() {
        *x = val as i32;
    }

    let mut b = Tensor::<i32, 3>::new([5, 5, 5]);
    for (val, x) in b.iter_mut().enumerate() {
        *x = 2 * val as i32;
    }

    let c = Tensor::from_expr(3 * &a + &b);

    for (val, x) in c.iter().enumerate() {
        assert_eq!(*x, 5 * val as i32);
    }
}

#[test]
fn expression_into_existing_tensor_reshapes() {
    let a = ndtensor::full([2, 3], 4);
    let b = ndtensor::full([2, 3], 1);
    let mut c = Tensor::<i32, 2>::new([1, 1]);
    c.assign_expr(&a - &b);
    assert_eq!(c.shape(), [2, 3]);
    assert!(c.iter().all(|&x| x == 3));
}

#[test]
fn slice_destination_with_scaled_slice_source() {
    let mut a = zeros::<i32, 3>([5, 5, 5]);
    let b = ndtensor::ones::<i32, 3>([5, 5, 5]);

    a.slice_mut::<2, _>((0,))
        .assign_expr(2 * b.slice::<2, _>((ALL, ALL, 2)));

    for i in 0..5 {
        for j in 0..5 {
            for k in 0..5 {
                assert_eq!(a[[i, j, k]], if i == 0 { 2 } else { 0 });
            }
        }
    }
}

#[test]
fn division_and_subtraction_chain() {
    seed(0);
    let a = rand::<f64, 3>([6, 6, 6]);
    let b = rand::<f64, 3>([6, 6, 6]);
    let c = rand::<f64, 3>([6, 6, 6]);

    let fused = Tensor::from_expr(&c - &a / (2.0 * &b));

    for i in 0..fused.len() {
        assert_relative_eq!(fused[i], c[i] - a[i] / (2.0 * b[i]), epsilon = 1e-12);
    }
}

#[test]
fn non_contiguous_compound_expression() {
    seed(1);
    let a = rand::<f64, 3>([8, 8, 8]);
    let b = rand::<f64, 3>([8, 8, 8]);
    let mut c = rand::<f64, 3>([8, 8, 8]);
    let reference = c.clone();

    // Aliased in-place updates are rejected by the borrow checker, so the
    // plane is computed into an owned tensor first.
    let update = Tensor::from_expr(
        c.slice::<2, _>((ALL, 0, ALL))
            - a.slice::<2, _>((ALL, 0, ALL)) / (2.0 * b.slice::<2, _>((ALL, 0, ALL))),
    );
    c.slice_mut::<2, _>((ALL, 0, ALL)).assign(&update.view());

    for i in 0..8 {
        for j in 0..8 {
            for k in 0..8 {
                let expected = if j == 0 {
                    reference[[i, j, k]] - a[[i, j, k]] / (2.0 * b[[i, j, k]])
                } else {
                    reference[[i, j, k]]
                };
                assert_relative_eq!(c[[i, j, k]], expected, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn size_one_axis_mixed_with_full_shape() {
    // Pinning test: a formally contiguous (1, n) operand stretched against
    // (m, n) must evaluate by multi-index, not by flat index.
    let row = Tensor::<i32, 2>::from_fn([1, 4], |idx| (idx[1] + 1) as i32);
    let grid = Tensor::<i32, 2>::from_fn([3, 4], |idx| 100 * (idx[0] + 1) as i32);

    let sum = Tensor::from_expr(&grid + &row);
    assert_eq!(sum.shape(), [3, 4]);
    for i in 0..3 {
        for j in 0..4 {
            assert_eq!(sum[[i, j]], 100 * (i as i32 + 1) + j as i32 + 1);
        }
    }
}

#[test]
fn equal_shapes_match_plain_loop() {
    seed(5);
    let a = rand::<f64, 2>([7, 5]);
    let b = rand::<f64, 2>([7, 5]);

    let lazy = Tensor::from_expr(&a * &b + &a);

    for i in 0..7 {
        for j in 0..5 {
            assert_relative_eq!(
                lazy[[i, j]],
                a[[i, j]] * b[[i, j]] + a[[i, j]],
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn expression_node_outlives_its_statement() {
    let a = ndtensor::full([2, 2], 5);
    let b = ndtensor::full([2, 2], 7);
    let node = &a + &b;
    // The node holds borrows of a and b; both outlive it.
    let c = Tensor::from_expr(node);
    assert!(c.iter().all(|&x| x == 12));
}

#[test]
fn generic_apply_with_closure() {
    let a = Tensor::<i32, 2>::from_fn([2, 3], |idx| (idx[0] * 3 + idx[1]) as i32);
    let b = ndtensor::full([2, 3], 2);
    let c: Tensor<i32, 2> = Tensor::from_expr(apply(|x, y| x * y + 1, &a, &b));
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(c[[i, j]], a[[i, j]] * 2 + 1);
        }
    }
}

#[test]
fn float_functions_compose() {
    let a = Tensor::<f64, 1>::from_fn([5], |idx| (idx[0] + 1) as f64);
    let r = Tensor::from_expr(sqrt(pow(a.view(), 2.0)));
    for i in 0..5 {
        assert_relative_eq!(r[i], (i + 1) as f64, epsilon = 1e-12);
    }
}

#[test]
fn scalar_only_scaling() {
    let mut m = Tensor::<f32, 2>::new([3, 3]);
    m.fill(1.5);
    let doubled = Tensor::from_expr(2.0f32 * &m);
    assert!(doubled.iter().all(|&x| x == 3.0));
    let halved = Tensor::from_expr(&m / 2.0f32);
    assert!(halved.iter().all(|&x| x == 0.75));
}
