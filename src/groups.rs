use ndarray::{Array1, Array2, ArrayView1};

use crate::error::SglError;

/// One penalized group: 0-based feature indices and its ℓ2 weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub members: Vec<usize>,
    pub weight: f64,
}

/// Validated group structure resolved against the feature count.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    groups: Vec<Group>,
    n_features: usize,
    overlapping: bool,
}

struct IndexEntry {
    start: usize,
    end: usize,
    weight: f64,
}

/// Reads the fields × groups index matrix: rows `start`, `end` and optional
/// `weight`; `start`/`end` are 1-based and inclusive.
fn index_entries(index: &Array2<f64>) -> Result<Vec<IndexEntry>, SglError> {
    let rows = index.nrows();
    if !(rows == 2 || rows == 3) {
        return Err(SglError::InvalidGroups(format!(
            "each group needs 'start,end[,weight]', found {rows} fields"
        )));
    }
    let mut entries = Vec::with_capacity(index.ncols());
    for (g, col) in index.columns().into_iter().enumerate() {
        let start = one_based(col[0], "start", g)?;
        let end = one_based(col[1], "end", g)?;
        if start > end {
            return Err(SglError::InvalidGroups(format!(
                "group {}: start {} exceeds end {}",
                g + 1,
                start + 1,
                end + 1
            )));
        }
        let weight = if rows == 3 { col[2] } else { 1.0 };
        if !weight.is_finite() || weight < 0.0 {
            return Err(SglError::InvalidGroups(format!(
                "group {}: weight {weight} must be finite and non-negative",
                g + 1
            )));
        }
        entries.push(IndexEntry { start, end, weight });
    }
    Ok(entries)
}

/// 1-based integral value to 0-based index.
fn one_based(value: f64, what: &str, g: usize) -> Result<usize, SglError> {
    if value < 1.0 || value.fract() != 0.0 {
        return Err(SglError::InvalidGroups(format!(
            "group {}: {what} index {value} is not a positive integer",
            g + 1
        )));
    }
    Ok(value as usize - 1)
}

impl GroupLayout {
    /// Contiguous feature ranges that may not intersect.
    pub fn disjoint(index: &Array2<f64>, n_features: usize) -> Result<Self, SglError> {
        let entries = index_entries(index)?;
        let mut spans: Vec<(usize, usize, usize)> = Vec::with_capacity(entries.len());
        for (g, e) in entries.iter().enumerate() {
            if e.end >= n_features {
                return Err(SglError::InvalidGroups(format!(
                    "group {} ends at feature {} but there are only {n_features} features",
                    g + 1,
                    e.end + 1
                )));
            }
            spans.push((e.start, e.end, g));
        }
        spans.sort_unstable();
        for w in spans.windows(2) {
            if w[1].0 <= w[0].1 {
                return Err(SglError::InvalidGroups(format!(
                    "groups {} and {} overlap; use the overlapping-group variant",
                    w[0].2 + 1,
                    w[1].2 + 1
                )));
            }
        }
        let groups = entries
            .into_iter()
            .map(|e| Group {
                members: (e.start..=e.end).collect(),
                weight: e.weight,
            })
            .collect();
        Ok(Self {
            groups,
            n_features,
            overlapping: false,
        })
    }

    /// Groups are slices `field[start..=end]` of 1-based feature indices.
    pub fn overlapping(
        index: &Array2<f64>,
        field: &Array1<f64>,
        n_features: usize,
    ) -> Result<Self, SglError> {
        let features = field
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if v < 1.0 || v.fract() != 0.0 || v as usize > n_features {
                    Err(SglError::InvalidField(format!(
                        "entry {} is {v}; expected a feature index in 1..={n_features}",
                        i + 1
                    )))
                } else {
                    Ok(v as usize - 1)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entries = index_entries(index)?;
        let mut groups = Vec::with_capacity(entries.len());
        for (g, e) in entries.into_iter().enumerate() {
            if e.end >= features.len() {
                return Err(SglError::InvalidGroups(format!(
                    "group {} ends at field position {} but the field vector has {} entries",
                    g + 1,
                    e.end + 1,
                    features.len()
                )));
            }
            let members = features[e.start..=e.end].to_vec();
            let mut sorted = members.clone();
            sorted.sort_unstable();
            if sorted.windows(2).any(|w| w[0] == w[1]) {
                return Err(SglError::InvalidGroups(format!(
                    "group {} lists a feature more than once",
                    g + 1
                )));
            }
            groups.push(Group {
                members,
                weight: e.weight,
            });
        }
        Ok(Self {
            groups,
            n_features,
            overlapping: true,
        })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_overlapping(&self) -> bool {
        self.overlapping
    }

    pub fn group_norm(group: &Group, beta: ArrayView1<'_, f64>) -> f64 {
        group
            .members
            .iter()
            .map(|&j| beta[j] * beta[j])
            .sum::<f64>()
            .sqrt()
    }

    /// Σ_g w_g ‖β_g‖₂
    pub fn penalty(&self, beta: ArrayView1<'_, f64>) -> f64 {
        self.groups
            .iter()
            .map(|g| g.weight * Self::group_norm(g, beta))
            .sum()
    }

    pub fn non_zero_groups(&self, beta: ArrayView1<'_, f64>) -> usize {
        self.groups
            .iter()
            .filter(|g| g.members.iter().any(|&j| beta[j] != 0.0))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn disjoint_groups_resolve_to_ranges() {
        let index = array![[1.0, 3.0], [2.0, 5.0], [1.0, 2.0]];
        let layout = GroupLayout::disjoint(&index, 6).unwrap();
        assert_eq!(layout.groups().len(), 2);
        assert_eq!(layout.groups()[0].members, vec![0, 1]);
        assert_eq!(layout.groups()[1].members, vec![2, 3, 4]);
        assert_eq!(layout.groups()[1].weight, 2.0);
        assert!(!layout.is_overlapping());
    }

    #[test]
    fn two_row_index_defaults_weights() {
        let index = array![[1.0], [3.0]];
        let layout = GroupLayout::disjoint(&index, 3).unwrap();
        assert_eq!(layout.groups()[0].weight, 1.0);
    }

    #[test]
    fn disjoint_rejects_overlap_and_out_of_range() {
        let overlap = array![[1.0, 2.0], [3.0, 4.0], [1.0, 1.0]];
        assert!(matches!(
            GroupLayout::disjoint(&overlap, 5),
            Err(SglError::InvalidGroups(_))
        ));
        let too_far = array![[1.0], [7.0], [1.0]];
        assert!(GroupLayout::disjoint(&too_far, 6).is_err());
        let zero_start = array![[0.0], [2.0], [1.0]];
        assert!(GroupLayout::disjoint(&zero_start, 6).is_err());
        let reversed = array![[3.0], [2.0], [1.0]];
        assert!(GroupLayout::disjoint(&reversed, 6).is_err());
        let negative_weight = array![[1.0], [2.0], [-1.0]];
        assert!(GroupLayout::disjoint(&negative_weight, 6).is_err());
    }

    #[test]
    fn overlapping_groups_read_through_field() {
        let field = array![1.0, 2.0, 2.0, 3.0, 4.0];
        let index = array![[1.0, 3.0], [2.0, 5.0], [1.0, 1.0]];
        let layout = GroupLayout::overlapping(&index, &field, 4).unwrap();
        assert_eq!(layout.groups()[0].members, vec![0, 1]);
        assert_eq!(layout.groups()[1].members, vec![1, 2, 3]);
        assert!(layout.is_overlapping());
    }

    #[test]
    fn overlapping_rejects_bad_field_entries() {
        let index = array![[1.0], [2.0], [1.0]];
        assert!(matches!(
            GroupLayout::overlapping(&index, &array![1.0, 9.0], 4),
            Err(SglError::InvalidField(_))
        ));
        assert!(matches!(
            GroupLayout::overlapping(&index, &array![2.0, 2.0], 4),
            Err(SglError::InvalidGroups(_))
        ));
        let past_field = array![[1.0], [3.0], [1.0]];
        assert!(GroupLayout::overlapping(&past_field, &array![1.0, 2.0], 4).is_err());
    }

    #[test]
    fn penalty_and_group_counts() {
        let index = array![[1.0, 3.0], [2.0, 4.0], [1.0, 2.0]];
        let layout = GroupLayout::disjoint(&index, 5).unwrap();
        let beta = array![3.0, 4.0, 0.0, 0.0, 7.0];
        assert_abs_diff_eq!(layout.penalty(beta.view()), 5.0, epsilon = 1e-12);
        assert_eq!(layout.non_zero_groups(beta.view()), 1);
    }
}
