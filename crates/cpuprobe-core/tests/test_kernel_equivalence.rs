//! The lane kernels must agree with the scalar reference kernels.

use approx::assert_ulps_eq;
use cpuprobe_core::compute::bits::{deposit, extract};
use cpuprobe_core::compute::{get_dispatcher, ScalarKernels, VectorKernels, WideKernels};
use cpuprobe_core::ProbeError;
use proptest::prelude::*;

fn float_pair(max_len: usize) -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (0..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(-1.0e6_f32..1.0e6, len),
            prop::collection::vec(-1.0e6_f32..1.0e6, len),
        )
    })
}

fn int_pair(max_len: usize) -> impl Strategy<Value = (Vec<i32>, Vec<i32>)> {
    (0..max_len).prop_flat_map(|len| {
        (
            prop::collection::vec(any::<i32>(), len),
            prop::collection::vec(any::<i32>(), len),
        )
    })
}

proptest! {
    #[test]
    fn prop_add_mul_match_scalar((a, b) in float_pair(100)) {
        let scalar = ScalarKernels::new();
        let wide = WideKernels::new();
        let mut expected = vec![0.0; a.len()];
        let mut actual = vec![0.0; a.len()];

        scalar.add_f32(&a, &b, &mut expected).unwrap();
        wide.add_f32(&a, &b, &mut actual).unwrap();
        for (e, r) in expected.iter().zip(&actual) {
            assert_ulps_eq!(*e, *r, max_ulps = 1);
        }

        scalar.mul_f32(&a, &b, &mut expected).unwrap();
        wide.mul_f32(&a, &b, &mut actual).unwrap();
        for (e, r) in expected.iter().zip(&actual) {
            assert_ulps_eq!(*e, *r, max_ulps = 1);
        }
    }

    #[test]
    fn prop_div_matches_scalar((a, b) in float_pair(100)) {
        let b: Vec<f32> = b.into_iter().map(|v| if v.abs() < 1.0 { 1.0 } else { v }).collect();
        let mut expected = vec![0.0; a.len()];
        let mut actual = vec![0.0; a.len()];
        ScalarKernels::new().div_f32(&a, &b, &mut expected).unwrap();
        WideKernels::new().div_f32(&a, &b, &mut actual).unwrap();
        for (e, r) in expected.iter().zip(&actual) {
            assert_ulps_eq!(*e, *r, max_ulps = 1);
        }
    }

    #[test]
    fn prop_add_i32_wraps_like_scalar((a, b) in int_pair(100)) {
        let mut expected = vec![0; a.len()];
        let mut actual = vec![0; a.len()];
        ScalarKernels::new().add_i32(&a, &b, &mut expected).unwrap();
        WideKernels::new().add_i32(&a, &b, &mut actual).unwrap();
        prop_assert_eq!(&expected, &actual);
        for ((x, y), r) in a.iter().zip(&b).zip(&actual) {
            prop_assert_eq!(x.wrapping_add(*y), *r);
        }
    }

    #[test]
    fn prop_xor_fold_matches_scalar(data in prop::collection::vec(any::<u8>(), 0..300)) {
        prop_assert_eq!(
            ScalarKernels::new().xor_fold(&data),
            WideKernels::new().xor_fold(&data)
        );
        prop_assert_eq!(
            ScalarKernels::new().xor_fold(&data),
            get_dispatcher().xor_fold(&data)
        );
    }

    #[test]
    fn prop_extract_inverts_deposit(value in any::<u64>(), mask in any::<u64>()) {
        let packed = extract(value, mask);
        prop_assert_eq!(deposit(packed, mask), value & mask);
        if mask.count_ones() < 64 {
            prop_assert!(packed < 1u64 << mask.count_ones());
        }
    }
}

#[test]
fn test_length_mismatch_is_reported() {
    let scalar = ScalarKernels::new();
    let wide = WideKernels::new();
    let all: [&dyn VectorKernels; 3] = [&scalar, &wide, get_dispatcher()];
    let mut out = [0.0_f32; 4];
    for kernels in all {
        let err = kernels
            .add_f32(&[1.0; 4], &[1.0; 3], &mut out)
            .unwrap_err();
        assert!(matches!(err, ProbeError::DimensionMismatch { .. }));
    }
}
