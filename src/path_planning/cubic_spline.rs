// Cubic spline interpolation used to smooth the anchor points of a trajectory
//
// Natural boundary conditions (zero second derivative at both ends); the
// tridiagonal system for the second-order coefficients is solved with nalgebra.
// Outside the sample range the curve continues along its end tangents.

extern crate nalgebra as na;

use crate::common::{InterpolatingCurve, RoboticsError, RoboticsResult};

fn check_samples(x: &[f64], y: &[f64], min_len: usize) -> RoboticsResult<()> {
    if x.len() != y.len() {
        return Err(RoboticsError::CurveFit(format!(
            "x and y differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    if x.len() < min_len {
        return Err(RoboticsError::CurveFit(format!(
            "need at least {} samples, got {}",
            min_len,
            x.len()
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(RoboticsError::CurveFit("non-finite sample".to_string()));
    }
    if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
        return Err(RoboticsError::CurveFit(format!(
            "x must be strictly increasing (x[{}] = {} >= x[{}] = {})",
            i,
            x[i],
            i + 1,
            x[i + 1]
        )));
    }
    Ok(())
}

/// Piecewise cubic `a + b·dx + c·dx² + d·dx³` per interval
#[derive(Debug, Clone)]
pub struct CubicSpline {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
    x: Vec<f64>,
}

impl CubicSpline {
    fn calc_a(h: &[f64]) -> na::DMatrix<f64> {
        let nx = h.len() + 1;
        let mut a = na::DMatrix::zeros(nx, nx);
        a[(0, 0)] = 1.0;
        for i in 0..nx - 1 {
            if i != nx - 2 {
                a[(i + 1, i + 1)] = 2.0 * (h[i] + h[i + 1]);
            }
            a[(i + 1, i)] = h[i];
            a[(i, i + 1)] = h[i];
        }
        a[(0, 1)] = 0.0;
        a[(nx - 1, nx - 2)] = 0.0;
        a[(nx - 1, nx - 1)] = 1.0;
        a
    }

    fn calc_b(h: &[f64], a: &[f64]) -> na::DVector<f64> {
        let nx = h.len() + 1;
        let mut b = na::DVector::zeros(nx);
        for i in 0..nx - 2 {
            b[i + 1] = 3.0 * (a[i + 2] - a[i + 1]) / h[i + 1] - 3.0 * (a[i + 1] - a[i]) / h[i];
        }
        b
    }

    fn search_index(&self, t: f64) -> usize {
        // Last interval start not greater than t, clamped to a valid interval
        let i = self.x.partition_point(|&xi| xi <= t);
        i.saturating_sub(1).min(self.x.len() - 2)
    }

    /// First derivative at `t`
    pub fn derivative(&self, t: f64) -> f64 {
        let t = t.max(self.x[0]).min(self.x[self.x.len() - 1]);
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.b[i] + 2.0 * self.c[i] * dx + 3.0 * self.d[i] * dx.powi(2)
    }

    /// Second derivative at `t` (zero outside the sample range)
    pub fn second_derivative(&self, t: f64) -> f64 {
        if t < self.x[0] || t > self.x[self.x.len() - 1] {
            return 0.0;
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        2.0 * self.c[i] + 6.0 * self.d[i] * dx
    }
}

impl InterpolatingCurve for CubicSpline {
    fn fit(x: &[f64], y: &[f64]) -> RoboticsResult<Self> {
        check_samples(x, y, 2)?;

        let nx = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let a = y.to_vec();

        let c_na = Self::calc_a(&h)
            .lu()
            .solve(&Self::calc_b(&h, &a))
            .ok_or_else(|| RoboticsError::CurveFit("singular spline system".to_string()))?;
        let c: Vec<f64> = c_na.iter().cloned().collect();

        let mut b = Vec::with_capacity(nx - 1);
        let mut d = Vec::with_capacity(nx - 1);
        for i in 0..nx - 1 {
            d.push((c[i + 1] - c[i]) / (3.0 * h[i]));
            b.push((a[i + 1] - a[i]) / h[i] - h[i] * (c[i + 1] + 2.0 * c[i]) / 3.0);
        }

        Ok(CubicSpline { a, b, c, d, x: x.to_vec() })
    }

    fn eval(&self, t: f64) -> f64 {
        let first = self.x[0];
        let last = self.x[self.x.len() - 1];
        if t < first {
            return self.a[0] + self.b[0] * (t - first);
        }
        if t > last {
            return self.a[self.a.len() - 1] + self.derivative(last) * (t - last);
        }
        let i = self.search_index(t);
        let dx = t - self.x[i];
        self.a[i] + self.b[i] * dx + self.c[i] * dx.powi(2) + self.d[i] * dx.powi(3)
    }
}

/// Piecewise-linear interpolation through the samples
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl InterpolatingCurve for LinearInterpolation {
    fn fit(x: &[f64], y: &[f64]) -> RoboticsResult<Self> {
        check_samples(x, y, 2)?;
        Ok(LinearInterpolation { x: x.to_vec(), y: y.to_vec() })
    }

    fn eval(&self, t: f64) -> f64 {
        let i = self.x.partition_point(|&xi| xi <= t).saturating_sub(1).min(self.x.len() - 2);
        let ratio = (t - self.x[i]) / (self.x[i + 1] - self.x[i]);
        self.y[i] + ratio * (self.y[i + 1] - self.y[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spline_passes_through_samples() {
        let x = [-1.0, 0.0, 30.0, 60.0, 90.0];
        let y = [0.1, 0.0, 1.5, 3.8, 4.0];
        let spline = CubicSpline::fit(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert!((spline.eval(*xi) - yi).abs() < 1e-9);
        }
    }

    #[test]
    fn test_spline_reproduces_line() {
        let x = [0.0, 1.0, 2.5, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v - 1.0).collect();
        let spline = CubicSpline::fit(&x, &y).unwrap();
        for t in &[0.3, 1.7, 3.9, 5.0, -1.0] {
            assert!((spline.eval(*t) - (2.0 * t - 1.0)).abs() < 1e-9);
        }
        assert!((spline.derivative(2.0) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_spline_natural_boundary() {
        let spline = CubicSpline::fit(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0]).unwrap();
        assert!(spline.second_derivative(0.0).abs() < 1e-9);
        assert!(spline.second_derivative(3.0).abs() < 1e-9);
    }

    #[test]
    fn test_spline_two_points_is_linear() {
        let spline = CubicSpline::fit(&[0.0, 10.0], &[0.0, 5.0]).unwrap();
        assert!((spline.eval(4.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_spline_rejects_non_monotonic_x() {
        let err = CubicSpline::fit(&[0.0, 2.0, 2.0], &[0.0, 1.0, 2.0]).unwrap_err();
        assert!(matches!(err, RoboticsError::CurveFit(_)));
        assert!(CubicSpline::fit(&[0.0], &[1.0]).is_err());
        assert!(CubicSpline::fit(&[0.0, 1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_linear_interpolation() {
        let line = LinearInterpolation::fit(&[0.0, 2.0, 4.0], &[0.0, 2.0, 0.0]).unwrap();
        assert!((line.eval(1.0) - 1.0).abs() < 1e-12);
        assert!((line.eval(3.0) - 1.0).abs() < 1e-12);
        assert!((line.eval(5.0) + 1.0).abs() < 1e-12);
    }
}
