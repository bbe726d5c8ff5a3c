//! Small numeric kernels behind the derived views: Pearson correlation,
//! ordinary least squares and box-plot summaries.
//!
//! Every function skips non-finite inputs (missing measurements load as NaN)
//! and reports "not enough data" explicitly instead of returning a degenerate
//! number.

use serde::{Serialize, Serializer};

use super::model::{Metric, Observation};

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// One cell of a correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correlation {
    Defined(f64),
    /// Fewer than two complete pairs, or a constant column.
    Undefined,
}

impl Correlation {
    pub fn value(self) -> Option<f64> {
        match self {
            Correlation::Defined(v) => Some(v),
            Correlation::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Correlation::Defined(_))
    }
}

/// Serialized as a number, or `null` when undefined.
impl Serialize for Correlation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Correlation::Defined(v) => serializer.serialize_some(v),
            Correlation::Undefined => serializer.serialize_none(),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Finite (x, y) pairs only.
fn complete_pairs(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect()
}

/// Centered sums `(sxx, syy, sxy)` and means over complete pairs.
fn moments(pairs: &[(f64, f64)]) -> Option<(f64, f64, f64, f64, f64)> {
    let mx = mean(pairs.iter().map(|p| p.0))?;
    let my = mean(pairs.iter().map(|p| p.1))?;
    let (sxx, syy, sxy) = pairs.iter().fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), &(x, y)| {
        let (dx, dy) = (x - mx, y - my);
        (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
    });
    Some((mx, my, sxx, syy, sxy))
}

/// Pearson correlation coefficient over pairwise-complete values.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Correlation {
    let pairs = complete_pairs(xs, ys);
    if pairs.len() < 2 {
        return Correlation::Undefined;
    }
    match moments(&pairs) {
        Some((_, _, sxx, syy, sxy)) if sxx > 0.0 && syy > 0.0 => {
            Correlation::Defined((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
        }
        _ => Correlation::Undefined,
    }
}

/// Square matrix over [`Metric::ALL`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: [Metric; 4],
    pub cells: [[Correlation; 4]; 4],
}

impl CorrelationMatrix {
    /// A matrix with every cell undefined.
    pub fn undefined() -> Self {
        Self {
            metrics: Metric::ALL,
            cells: [[Correlation::Undefined; 4]; 4],
        }
    }

    /// Pairwise correlations over `rows`. With fewer than two rows every cell
    /// is undefined; otherwise the diagonal is 1.0, even for a metric whose
    /// values are all missing.
    pub fn from_rows(rows: &[&Observation]) -> Self {
        let mut matrix = Self::undefined();
        if rows.len() < 2 {
            return matrix;
        }

        let columns: Vec<Vec<f64>> = Metric::ALL
            .iter()
            .map(|&m| rows.iter().map(|o| o.metric(m)).collect())
            .collect();

        for i in 0..4 {
            matrix.cells[i][i] = Correlation::Defined(1.0);
            for j in (i + 1)..4 {
                let r = pearson(&columns[i], &columns[j]);
                matrix.cells[i][j] = r;
                matrix.cells[j][i] = r;
            }
        }
        matrix
    }

    pub fn get(&self, a: Metric, b: Metric) -> Correlation {
        self.cells[a.index()][b.index()]
    }

    pub fn is_all_undefined(&self) -> bool {
        self.cells.iter().flatten().all(|c| !c.is_defined())
    }
}

// ---------------------------------------------------------------------------
// Ordinary least squares
// ---------------------------------------------------------------------------

/// Result of fitting `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Trendline {
    Fit {
        slope: f64,
        intercept: f64,
        r_squared: f64,
    },
    /// Fewer than two usable points, or all x values identical.
    InsufficientData,
}

impl Trendline {
    /// Ordinary least squares fit over the finite pairs of `xs`/`ys`.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Self {
        let pairs = complete_pairs(xs, ys);
        if pairs.len() < 2 {
            return Trendline::InsufficientData;
        }
        match moments(&pairs) {
            Some((mx, my, sxx, syy, sxy)) if sxx > 0.0 => {
                let slope = sxy / sxx;
                let r_squared = if syy > 0.0 {
                    (sxy * sxy) / (sxx * syy)
                } else {
                    1.0
                };
                Trendline::Fit {
                    slope,
                    intercept: my - slope * mx,
                    r_squared,
                }
            }
            _ => Trendline::InsufficientData,
        }
    }

    /// Fitted y at `x`, `None` when there is no fit.
    pub fn predict(&self, x: f64) -> Option<f64> {
        match *self {
            Trendline::Fit {
                slope, intercept, ..
            } => Some(slope * x + intercept),
            Trendline::InsufficientData => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Box plot summary
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Linear-interpolated quantile of an ascending slice, `p` in `[0, 1]`.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

impl BoxSummary {
    /// Summarise the finite values, `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let within = |v: f64| v >= lo_fence && v <= hi_fence;
        let lower_whisker = sorted.iter().copied().find(|&v| within(v)).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|&v| within(v)).unwrap_or(q3);
        let outliers = sorted.iter().copied().filter(|&v| !within(v)).collect();

        Some(BoxSummary {
            count: sorted.len(),
            mean: mean(sorted.iter().copied())?,
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::obs;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pearson_perfect_positive_and_negative() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(pearson(&xs, &[2.0, 4.0, 6.0, 8.0]), Correlation::Defined(1.0));
        assert_eq!(pearson(&xs, &[8.0, 6.0, 4.0, 2.0]), Correlation::Defined(-1.0));
    }

    #[test]
    fn pearson_known_value() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 4.0, 5.0, 4.0, 5.0];
        let r = pearson(&xs, &ys).value().unwrap();
        assert!(close(r, 0.7745966692414834), "r = {r}");
    }

    #[test]
    fn pearson_undefined_cases() {
        assert_eq!(pearson(&[1.0], &[2.0]), Correlation::Undefined);
        assert_eq!(pearson(&[], &[]), Correlation::Undefined);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), Correlation::Undefined);
        assert_eq!(
            pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, f64::NAN]),
            Correlation::Undefined
        );
    }

    #[test]
    fn pearson_drops_missing_pairwise() {
        let r = pearson(&[1.0, 2.0, f64::NAN, 3.0], &[2.0, 4.0, 100.0, 6.0]);
        assert_eq!(r, Correlation::Defined(1.0));
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let rows = [
            obs("Punjab", "Wheat", 2020, 3.1, 22.0, 120.0, 400.0),
            obs("Punjab", "Wheat", 2020, 2.9, 23.0, 100.0, 410.0),
            obs("Punjab", "Wheat", 2020, 3.4, 21.0, 130.0, 395.0),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let m = CorrelationMatrix::from_rows(&refs);

        for a in Metric::ALL {
            assert_eq!(m.get(a, a), Correlation::Defined(1.0));
            for b in Metric::ALL {
                assert_eq!(m.get(a, b), m.get(b, a));
            }
        }
        let r = m.get(Metric::Yield, Metric::Temperature).value().unwrap();
        assert!(r < -0.9);
    }

    #[test]
    fn diagonal_set_by_row_count_alone() {
        let rows = [
            obs("Punjab", "Wheat", 2020, 3.1, 22.0, f64::NAN, 400.0),
            obs("Punjab", "Wheat", 2020, 2.9, 23.0, f64::NAN, 410.0),
        ];
        let refs: Vec<&Observation> = rows.iter().collect();
        let m = CorrelationMatrix::from_rows(&refs);

        assert_eq!(
            m.get(Metric::Precipitation, Metric::Precipitation),
            Correlation::Defined(1.0)
        );
        assert_eq!(
            m.get(Metric::Precipitation, Metric::Yield),
            Correlation::Undefined
        );
    }

    #[test]
    fn matrix_with_single_row_is_undefined() {
        let row = obs("Punjab", "Wheat", 2020, 3.1, 22.0, 120.0, 400.0);
        let m = CorrelationMatrix::from_rows(&[&row]);
        assert!(m.is_all_undefined());
        assert!(CorrelationMatrix::from_rows(&[]).is_all_undefined());
    }

    #[test]
    fn undefined_serializes_as_null() {
        let json = serde_json::to_string(&[Correlation::Defined(0.5), Correlation::Undefined])
            .unwrap();
        assert_eq!(json, "[0.5,null]");
    }

    #[test]
    fn ols_fit() {
        let fit = Trendline::fit(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]);
        match fit {
            Trendline::Fit {
                slope,
                intercept,
                r_squared,
            } => {
                assert!(close(slope, 2.0));
                assert!(close(intercept, 1.0));
                assert!(close(r_squared, 1.0));
            }
            Trendline::InsufficientData => panic!("expected a fit"),
        }
        assert!(close(fit.predict(10.0).unwrap(), 21.0));
    }

    #[test]
    fn ols_insufficient_data() {
        assert_eq!(Trendline::fit(&[22.0], &[3.1]), Trendline::InsufficientData);
        assert_eq!(
            Trendline::fit(&[22.0, 22.0], &[3.1, 3.3]),
            Trendline::InsufficientData
        );
        assert_eq!(Trendline::InsufficientData.predict(1.0), None);
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn box_summary_flags_outliers() {
        let s = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(s.count, 6);
        assert_eq!(s.median, 3.5);
        assert_eq!(s.lower_whisker, 1.0);
        assert_eq!(s.upper_whisker, 5.0);
        assert_eq!(s.outliers, vec![100.0]);
    }

    #[test]
    fn box_summary_ignores_missing() {
        let s = BoxSummary::from_values(&[f64::NAN, 2.0]).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.q3, 2.0);
        assert!(BoxSummary::from_values(&[f64::NAN]).is_none());
    }
}
