//! Column-wise feature standardization.
//!
//! The backtest standardizes covariates using statistics computed from the
//! train split only; the same transform is then applied to the test split.
//! Letting test rows influence the scaling would leak held-out information
//! into model selection.

/// Per-column mean/scale fitted on a train matrix (rows = observations).
#[derive(Debug, Clone)]
pub struct Standardizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    /// Fit means and population standard deviations on `rows`.
    ///
    /// Zero-variance columns get scale 1.0, so constant features pass
    /// through as zeros instead of producing NaNs.
    ///
    /// Returns `None` for an empty train split or inconsistent row widths.
    pub fn fit(rows: &[Vec<f64>]) -> Option<Self> {
        let n = rows.len();
        if n == 0 {
            return None;
        }
        let width = rows[0].len();
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }

        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n as f64;
        }

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in scales.iter_mut().zip(row).zip(&means) {
                let d = v - m;
                *s += d * d;
            }
        }
        for s in &mut scales {
            *s = (*s / n as f64).sqrt();
            if *s < 1e-12 {
                *s = 1.0;
            }
        }

        Some(Self { means, scales })
    }

    /// Standardize one row in place order, returning the transformed copy.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_uses_population_std() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let std = Standardizer::fit(&rows).unwrap();

        // mean 2.5, population std sqrt(1.25)
        let z = std.transform_row(&[2.5]);
        assert!(z[0].abs() < 1e-12);
        let z = std.transform_row(&[4.0]);
        assert!((z[0] - 1.5 / 1.25_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn constant_column_passes_through_as_zero() {
        let rows = vec![vec![7.0, 1.0], vec![7.0, 3.0]];
        let std = Standardizer::fit(&rows).unwrap();
        let z = std.transform_row(&[7.0, 2.0]);
        assert_eq!(z[0], 0.0);
        assert!(z[1].abs() < 1e-12);
    }

    #[test]
    fn empty_train_split_is_rejected() {
        assert!(Standardizer::fit(&[]).is_none());
    }
}
