//! Ordinary Least Squares (OLS) on a named, column-major design matrix.
//!
//! The TOWT design carries an exhaustive set of calendar indicators, so no
//! intercept is added here: the indicators span the constant. Leading columns
//! may be marked as required; a rank deficiency among them is reported as
//! [`TowtError::SingularDesign`]. Trailing columns that add nothing to the
//! span of the columns before them are dropped and keep a zero coefficient.

use crate::error::{Result, TowtError};

/// Relative pivot tolerance for the Cholesky factorization.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Design matrix stored as named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesignMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl DesignMatrix {
    /// Empty design with a fixed number of rows.
    pub fn new(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows,
        }
    }

    /// Append a column; its length must match the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if values.len() != self.n_rows {
            return Err(TowtError::DimensionMismatch {
                expected: self.n_rows,
                got: values.len(),
            });
        }
        self.names.push(name.into());
        self.columns.push(values);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// Keep only the rows where `mask` is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.n_rows {
            return Err(TowtError::DimensionMismatch {
                expected: self.n_rows,
                got: mask.len(),
            });
        }
        let columns: Vec<Vec<f64>> = self
            .columns
            .iter()
            .map(|col| {
                col.iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(&v, _)| v)
                    .collect()
            })
            .collect();
        Ok(Self {
            names: self.names.clone(),
            columns,
            n_rows: mask.iter().filter(|&&keep| keep).count(),
        })
    }
}

/// Fitted OLS coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    /// One coefficient per design column; zero for dropped columns.
    pub coefficients: Vec<f64>,
    /// Names of design columns in order.
    pub column_names: Vec<String>,
    /// Columns left out of the solve as linearly dependent.
    pub dropped: Vec<String>,
}

impl OlsFit {
    /// Predict values for a design with the same columns as the fit.
    pub fn predict(&self, design: &DesignMatrix) -> Result<Vec<f64>> {
        if design.names() != self.column_names.as_slice() {
            return Err(TowtError::InvalidParameter(format!(
                "prediction design columns {:?} do not match fitted columns {:?}",
                design.names(),
                self.column_names
            )));
        }

        let mut predictions = vec![0.0; design.n_rows()];
        for (coef, col) in self.coefficients.iter().zip(&design.columns) {
            for (pred, x) in predictions.iter_mut().zip(col) {
                *pred += coef * x;
            }
        }

        if let Some(i) = predictions.iter().position(|p| !p.is_finite()) {
            return Err(TowtError::ComputationError(format!(
                "non-finite prediction at row {}",
                i
            )));
        }

        Ok(predictions)
    }

    /// Coefficient for a named column.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.column_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.coefficients[i])
    }

    pub fn num_columns(&self) -> usize {
        self.coefficients.len()
    }
}

/// Fit `y = X @ beta` without an intercept; every column is required.
///
/// # Errors
/// * [`TowtError::InsufficientBaseline`] when there are fewer rows than columns.
/// * [`TowtError::SingularDesign`] when `X'X` is not positive definite; the
///   first column found to be linearly dependent on earlier ones is named.
pub fn ols_fit(y: &[f64], design: &DesignMatrix) -> Result<OlsFit> {
    ols_fit_with_required(y, design, design.n_cols())
}

/// Fit `y = X @ beta` where only the first `required` columns must be
/// linearly independent.
///
/// Solves the normal equations by Cholesky decomposition. When a later
/// column is (numerically) a combination of the columns kept before it, it
/// is removed and the solve restarts; its coefficient is zero.
///
/// # Errors
/// * [`TowtError::InsufficientBaseline`] when there are fewer rows than columns.
/// * [`TowtError::SingularDesign`] naming the first dependent required column.
pub fn ols_fit_with_required(y: &[f64], design: &DesignMatrix, required: usize) -> Result<OlsFit> {
    let n = y.len();
    let k = design.n_cols();

    if n == 0 {
        return Err(TowtError::InsufficientData { needed: 1, got: 0 });
    }
    if design.n_rows() != n {
        return Err(TowtError::DimensionMismatch {
            expected: n,
            got: design.n_rows(),
        });
    }
    if k == 0 {
        return Err(TowtError::InvalidParameter(
            "design matrix has no columns".into(),
        ));
    }
    if n < k {
        return Err(TowtError::InsufficientBaseline {
            rows: n,
            columns: k,
        });
    }

    let mut active: Vec<usize> = (0..k).collect();
    let mut dropped = Vec::new();
    let beta = loop {
        let (xtx, xty) = normal_equations(&design.columns, &active, y);
        match solve_symmetric(&xtx, &xty) {
            Ok(beta) => break beta,
            Err(pivot) => {
                let col = active[pivot];
                if col < required {
                    return Err(TowtError::SingularDesign {
                        column: design.names[col].clone(),
                    });
                }
                dropped.push(design.names[col].clone());
                active.remove(pivot);
                if active.is_empty() {
                    break Vec::new();
                }
            }
        }
    };

    let mut coefficients = vec![0.0; k];
    for (&col, b) in active.iter().zip(beta) {
        coefficients[col] = b;
    }

    Ok(OlsFit {
        coefficients,
        column_names: design.names.clone(),
        dropped,
    })
}

/// `X'X` and `X'y` restricted to the `active` columns.
fn normal_equations(cols: &[Vec<f64>], active: &[usize], y: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let k = active.len();
    // X'X is symmetric; fill the lower triangle and mirror it.
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        let ci = &cols[active[i]];
        for j in 0..=i {
            let s: f64 = ci.iter().zip(&cols[active[j]]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = ci.iter().zip(y).map(|(a, b)| a * b).sum();
    }
    (xtx, xty)
}

/// Solve a symmetric positive definite system using Cholesky decomposition.
///
/// Returns the index of the offending pivot when `a` is not (numerically)
/// positive definite.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> std::result::Result<Vec<f64>, usize> {
    let n = b.len();

    // Cholesky decomposition A = L @ L'
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if a[i][i] <= 0.0 || sum <= a[i][i] * PIVOT_TOLERANCE {
                    return Err(i);
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Ok(x)
}

/// Residuals `y - X @ beta` for a fitted model.
pub fn ols_residuals(y: &[f64], fit: &OlsFit, design: &DesignMatrix) -> Result<Vec<f64>> {
    let predictions = fit.predict(design)?;

    if predictions.len() != y.len() {
        return Err(TowtError::DimensionMismatch {
            expected: y.len(),
            got: predictions.len(),
        });
    }

    Ok(y.iter()
        .zip(predictions.iter())
        .map(|(yi, pi)| yi - pi)
        .collect())
}
