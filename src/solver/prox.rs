use ndarray::Array1;

use crate::groups::GroupLayout;

/// v ← sign(v)·max(|v| − t, 0)
pub fn soft_threshold(v: &mut Array1<f64>, t: f64) {
    v.mapv_inplace(|x| {
        if x > t {
            x - t
        } else if x < -t {
            x + t
        } else {
            0.0
        }
    });
}

/// Closed-form group shrinkage for disjoint groups: each group is scaled by
/// max(0, 1 − t·w_g/‖v_g‖).
pub fn shrink_disjoint_groups(v: &mut Array1<f64>, layout: &GroupLayout, t: f64) {
    for group in layout.groups() {
        let radius = t * group.weight;
        let norm = GroupLayout::group_norm(group, v.view());
        let scale = if norm <= radius { 0.0 } else { 1.0 - radius / norm };
        for &j in &group.members {
            v[j] *= scale;
        }
    }
}

/// Proximal operator of t·Σ_g w_g‖v_g‖₂ for overlapping groups.
///
/// Solved on the dual: v − Σ_g Y_g with each Y_g supported on its group and
/// constrained to the ball of radius t·w_g. Block coordinate ascent updates
/// one Y_g at a time by projecting its partial residual onto that ball.
/// Returns the number of sweeps used.
pub fn shrink_overlapping_groups(
    v: &mut Array1<f64>,
    layout: &GroupLayout,
    t: f64,
    max_sweeps: usize,
) -> usize {
    let scale = v.iter().fold(1.0_f64, |m, x| m.max(x.abs()));
    let zero_tol = 1e-12 * scale;
    let origin = v.clone();

    let mut duals: Vec<Vec<f64>> = layout
        .groups()
        .iter()
        .map(|g| vec![0.0; g.members.len()])
        .collect();
    let mut partial = Vec::new();

    let mut sweeps = 0;
    while sweeps < max_sweeps {
        sweeps += 1;
        let mut max_change = 0.0_f64;
        for (group, dual) in layout.groups().iter().zip(duals.iter_mut()) {
            let radius = t * group.weight;
            partial.clear();
            partial.extend(group.members.iter().zip(dual.iter()).map(|(&j, &y)| v[j] + y));
            let norm = partial.iter().map(|w| w * w).sum::<f64>().sqrt();
            let shrink = if norm <= radius { 1.0 } else { radius / norm };
            for ((&j, y), &w) in group.members.iter().zip(dual.iter_mut()).zip(&partial) {
                let updated = w * shrink;
                max_change = max_change.max((updated - *y).abs());
                *y = updated;
                v[j] = w - updated;
            }
        }
        if max_change <= zero_tol {
            break;
        }
    }

    // Residue of the dual iteration on coordinates every group drove to zero.
    for (x, &u) in v.iter_mut().zip(origin.iter()) {
        if u == 0.0 || x.abs() <= zero_tol {
            *x = 0.0;
        }
    }
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn soft_threshold_shrinks_toward_zero() {
        let mut v = array![3.0, -0.5, 0.2, -2.0];
        soft_threshold(&mut v, 1.0);
        assert_eq!(v, array![2.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn disjoint_shrinkage_zeroes_small_groups_and_scales_large_ones() {
        let layout = GroupLayout::disjoint(&array![[1.0, 3.0], [2.0, 4.0], [1.0, 1.0]], 4).unwrap();
        let mut v = array![3.0, 4.0, 0.3, 0.4];
        shrink_disjoint_groups(&mut v, &layout, 1.0);
        assert_abs_diff_eq!(v[0], 3.0 * 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(v[1], 4.0 * 0.8, epsilon = 1e-12);
        assert_eq!(v[2], 0.0);
        assert_eq!(v[3], 0.0);
    }

    #[test]
    fn overlapping_prox_matches_disjoint_when_groups_do_not_share_features() {
        let index = array![[1.0, 3.0], [2.0, 4.0], [1.0, 2.0]];
        let field = array![1.0, 2.0, 3.0, 4.0];
        let disjoint = GroupLayout::disjoint(&index, 4).unwrap();
        let overlapping = GroupLayout::overlapping(&index, &field, 4).unwrap();

        let mut a = array![1.5, -2.0, 0.7, 2.5];
        let mut b = a.clone();
        shrink_disjoint_groups(&mut a, &disjoint, 0.5);
        shrink_overlapping_groups(&mut b, &overlapping, 0.5, 100);
        for j in 0..4 {
            assert_abs_diff_eq!(a[j], b[j], epsilon = 1e-10);
        }
    }

    #[test]
    fn overlapping_prox_zeroes_a_fully_covered_small_vector() {
        let index = array![[1.0, 3.0], [2.0, 4.0], [1.0, 1.0]];
        let field = array![1.0, 2.0, 2.0, 3.0];
        let layout = GroupLayout::overlapping(&index, &field, 3).unwrap();
        let mut v = array![0.1, 0.1, 0.1];
        shrink_overlapping_groups(&mut v, &layout, 1.0, 200);
        assert_eq!(v, array![0.0, 0.0, 0.0]);
    }

    #[test]
    fn overlapping_prox_is_non_expansive_on_shared_features() {
        let index = array![[1.0, 3.0], [2.0, 4.0], [1.0, 1.0]];
        let field = array![1.0, 2.0, 2.0, 3.0];
        let layout = GroupLayout::overlapping(&index, &field, 3).unwrap();
        let original = array![4.0, 3.0, -2.0];
        let mut v = original.clone();
        shrink_overlapping_groups(&mut v, &layout, 0.5, 500);
        let norm_in = original.dot(&original).sqrt();
        let norm_out = v.dot(&v).sqrt();
        assert!(norm_out < norm_in);
        for j in 0..3 {
            assert!(v[j] * original[j] >= 0.0, "sign flipped at {j}");
        }
    }
}
