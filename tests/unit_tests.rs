use approx::assert_abs_diff_eq;
use deg_statistics::testing::effect::calculate_log2_fold_change;
use deg_statistics::testing::inference::parametric::{t_test_from_moments, t_test_matrix_groups, welch_t_test};
use deg_statistics::testing::inference::MatrixStatTests;
use deg_statistics::testing::significance::{classify, Significance};
use deg_statistics::testing::utils::round_half_even;
use deg_statistics::visualization::zscore_row;
use ndarray::{array, Array2};

#[cfg(test)]
mod quick_test {
    use super::*;

    #[test]
    fn check_if_ttest_works() {
        // Two clearly separated groups with the same spread:
        // stress [7, 8, 9] -> mean 8, control [1, 2, 3] -> mean 2
        let result = welch_t_test(&[7.0, 8.0, 9.0], &[1.0, 2.0, 3.0]);

        println!("t={}, df={:?}, p={:?}", result.statistic, result.degrees_of_freedom, result.p_value);

        assert_abs_diff_eq!(result.statistic, 7.348469228349534, epsilon = 1e-9);
        let p = result.p_value.unwrap();
        assert!(p < 0.01);
        assert!(result.is_significant(0.05));
    }

    #[test]
    fn check_identical_groups() {
        // Identical non-constant groups: statistic 0, p-value 1
        let result = welch_t_test(&[4.0, 5.0, 6.0], &[4.0, 5.0, 6.0]);
        assert_abs_diff_eq!(result.statistic, 0.0);
        assert_abs_diff_eq!(result.p_value.unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn check_constant_identical_groups() {
        // [5, 5, 5] vs [5, 5, 5] is 0/0, the p-value is undefined
        let result = welch_t_test(&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]);
        assert!(result.statistic.is_nan());
        assert_eq!(result.p_value, None);
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn check_constant_different_groups() {
        // Zero variance on both sides with different means gives an infinite statistic
        let result = welch_t_test(&[20.0, 20.0], &[10.0, 10.0]);
        assert!(result.statistic.is_infinite());
        assert_eq!(result.p_value, Some(0.0));
    }

    #[test]
    fn test_single_replicate_is_undefined() {
        let result = welch_t_test(&[3.0], &[1.0, 2.0, 3.0]);
        assert_eq!(result.p_value, None);
        let result = welch_t_test(&[1.0, 2.0, 3.0], &[3.0]);
        assert_eq!(result.p_value, None);
    }

    #[test]
    fn test_swapping_groups_negates_statistic() {
        let x = [12.0, 15.0, 11.0, 18.0];
        let y = [3.0, 6.0, 4.0];
        let forward = welch_t_test(&x, &y);
        let backward = welch_t_test(&y, &x);
        assert_abs_diff_eq!(forward.statistic, -backward.statistic, epsilon = 1e-12);
        assert_abs_diff_eq!(forward.p_value.unwrap(), backward.p_value.unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn test_moments_match_raw_values() {
        // [7, 8, 9]: mean 8, var 1; [1, 2, 3]: mean 2, var 1
        let from_values = welch_t_test(&[7.0, 8.0, 9.0], &[1.0, 2.0, 3.0]);
        let from_moments = t_test_from_moments(8.0, 1.0, 3.0, 2.0, 1.0, 3.0);
        assert_abs_diff_eq!(from_values.statistic, from_moments.statistic, epsilon = 1e-12);
        assert_abs_diff_eq!(
            from_values.p_value.unwrap(),
            from_moments.p_value.unwrap(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(from_moments.standard_error.unwrap(), (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_p_value_bounds() {
        let cases: [(&[f64], &[f64]); 4] = [
            (&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]),
            (&[100.0, 0.0, 50.0], &[1.0, 2.0]),
            (&[0.0, 0.0, 1.0], &[0.0, 1.0, 1.0]),
            (&[10.0, 11.0], &[10.5, 10.6, 10.4, 10.5]),
        ];
        for (x, y) in cases {
            let p = welch_t_test(x, y).p_value.unwrap();
            assert!((0.0..=1.0).contains(&p), "p-value {p} out of range");
        }
    }

    #[test]
    fn test_fold_change_uses_pseudo_count() {
        // Control mean 10, stress mean 20: log2(21 / 11)
        let fc = calculate_log2_fold_change(&[10.0, 10.0], &[20.0, 20.0]).unwrap();
        assert_abs_diff_eq!(fc, (21.0f64 / 11.0).log2(), epsilon = 1e-12);
        assert_abs_diff_eq!(round_half_even(fc, 3), 0.933);

        // Unexpressed control stays finite
        let fc = calculate_log2_fold_change(&[0.0, 0.0], &[3.0, 3.0]).unwrap();
        assert_abs_diff_eq!(fc, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fold_change_antisymmetry() {
        let a = [3.0, 7.5, 4.0];
        let b = [12.0, 9.0];
        let forward = calculate_log2_fold_change(&a, &b).unwrap();
        let backward = calculate_log2_fold_change(&b, &a).unwrap();
        assert_abs_diff_eq!(forward, -backward, epsilon = 1e-12);
    }

    #[test]
    fn test_fold_change_empty_group() {
        let empty: [f64; 0] = [];
        assert!(calculate_log2_fold_change(&empty, &[1.0]).is_err());
        assert!(calculate_log2_fold_change(&[1.0], &empty).is_err());
    }

    #[test]
    fn test_classification_thresholds() {
        assert_eq!(classify(Some(0.01), 1.5), Significance::Significant);
        assert_eq!(classify(Some(0.01), -2.0), Significance::Significant);
        assert_eq!(classify(Some(0.01), 1.0), Significance::Significant);
        assert_eq!(classify(Some(0.05), 3.0), Significance::NotSignificant);
        assert_eq!(classify(Some(0.01), 0.999), Significance::NotSignificant);
        assert_eq!(classify(None, 5.0), Significance::NotSignificant);
        assert_eq!(Significance::NotSignificant.to_string(), "Not Significant");
    }

    #[test]
    fn test_round_half_even() {
        assert_abs_diff_eq!(round_half_even(2.5, 0), 2.0);
        assert_abs_diff_eq!(round_half_even(3.5, 0), 4.0);
        assert_abs_diff_eq!(round_half_even(0.125, 2), 0.12);
        assert_abs_diff_eq!(round_half_even(0.00183, 4), 0.0018);
    }

    #[test]
    fn test_zscore_row_properties() {
        let row = array![2.0, 4.0, 6.0, 8.0];
        let z = zscore_row(row.view()).unwrap();
        assert_abs_diff_eq!(z.sum(), 0.0, epsilon = 1e-12);

        let n = z.len() as f64;
        let var = z.iter().map(|v| v * v).sum::<f64>() / (n - 1.0);
        assert_abs_diff_eq!(var, 1.0, epsilon = 1e-12);

        assert!(zscore_row(array![3.0, 3.0, 3.0].view()).is_none());
    }

    #[test]
    fn test_matrix_based_workflow() {
        // 3 genes x 6 samples, control in columns 0..3 and stress in 3..6
        // Gene 0: [1,1,1 | 5,5,5] - perfect separation
        // Gene 1: [3,3,3 | 3,3,3] - no change, undefined p-value
        // Gene 2: [0,0,1 | 2,3,4] - moderate induction
        let matrix: Array2<f64> = array![
            [1.0, 1.0, 1.0, 5.0, 5.0, 5.0],
            [3.0, 3.0, 3.0, 3.0, 3.0, 3.0],
            [0.0, 0.0, 1.0, 2.0, 3.0, 4.0],
        ];
        let control = vec![0, 1, 2];
        let stress = vec![3, 4, 5];

        let results = t_test_matrix_groups(&matrix, &control, &stress, false).unwrap();
        for (gene_idx, result) in results.iter().enumerate() {
            println!("Gene {}: t={:.3}, p={:?}", gene_idx, result.statistic, result.p_value);
        }

        assert_eq!(results[0].p_value, Some(0.0));
        assert!(results[0].statistic > 0.0);
        assert_eq!(results[1].p_value, None);

        let manual = welch_t_test(&[2.0, 3.0, 4.0], &[0.0, 0.0, 1.0]);
        assert_abs_diff_eq!(results[2].statistic, manual.statistic, epsilon = 1e-12);
        assert!(results[2].p_value.unwrap() < 0.05);

        let fold_changes = matrix.log2_fold_changes(&control, &stress, true).unwrap();
        assert_abs_diff_eq!(fold_changes[0], 3.0f64.log2(), epsilon = 1e-12);
        assert_abs_diff_eq!(fold_changes[1], 0.0);

        let parallel = matrix.t_test(&control, &stress, true).unwrap();
        let p_values: Vec<Option<f64>> = results.iter().map(|r| r.p_value).collect();
        let parallel_p_values: Vec<Option<f64>> = parallel.iter().map(|r| r.p_value).collect();
        assert_eq!(parallel_p_values, p_values);
    }

    #[test]
    fn test_out_of_bounds_column() {
        let matrix: Array2<f64> = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(t_test_matrix_groups(&matrix, &[0], &[7], false).is_err());
        assert!(t_test_matrix_groups(&matrix, &[], &[1], false).is_err());
    }
}
