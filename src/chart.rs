//! Sampled quadratic curves ready for any plotting surface.

use serde::Serialize;

use crate::catalog::QuadraticSpec;
use crate::Error;

/// Number of samples per chart.
pub const SAMPLE_COUNT: usize = 100;
/// Closed sampling domain.
pub const DOMAIN: (f64, f64) = (-10.0, 10.0);

/// y = a·x² + b·x + c with finite coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quadratic {
    spec: QuadraticSpec,
}

impl Quadratic {
    /// Fails with [`Error::InvalidInput`] if any coefficient is NaN or infinite.
    pub fn new(spec: QuadraticSpec) -> Result<Self, Error> {
        for (name, value) in [("a", spec.a), ("b", spec.b), ("c", spec.c)] {
            if !value.is_finite() {
                return Err(Error::invalid_input(format!(
                    "coefficient {name} must be finite, got {value}"
                )));
            }
        }
        Ok(Self { spec })
    }

    pub fn spec(&self) -> QuadraticSpec {
        self.spec
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let QuadraticSpec { a, b, c } = self.spec;
        a * x * x + b * x + c
    }

    /// Turning point, or `None` for a straight line.
    pub fn vertex(&self) -> Option<(f64, f64)> {
        if self.spec.a == 0.0 {
            return None;
        }
        let x = -self.spec.b / (2.0 * self.spec.a);
        Some((x, self.evaluate(x)))
    }

    /// Real roots in ascending order.
    ///
    /// A double root is reported once. A constant curve yields no roots,
    /// including the degenerate y = 0.
    pub fn real_roots(&self) -> Vec<f64> {
        let QuadraticSpec { a, b, c } = self.spec;
        if a == 0.0 {
            return if b == 0.0 { Vec::new() } else { vec![-c / b] };
        }

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            Vec::new()
        } else if discriminant == 0.0 {
            vec![-b / (2.0 * a)]
        } else {
            let root = discriminant.sqrt();
            let mut roots = vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)];
            roots.sort_by(f64::total_cmp);
            roots
        }
    }

    /// Title naming the three coefficients.
    pub fn title(&self) -> String {
        let QuadraticSpec { a, b, c } = self.spec;
        format!("Quadratic Function: y = {a}x² + {b}x + {c}")
    }
}

/// A titled, labelled sequence of (x, y) samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub curve: Quadratic,
    pub points: Vec<(f64, f64)>,
}

impl Chart {
    /// Replace the generated title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sample with the largest y (first one on ties).
    pub fn max_point(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .copied()
            .reduce(|best, point| if point.1 > best.1 { point } else { best })
    }

    /// Sample with the smallest y (first one on ties).
    pub fn min_point(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .copied()
            .reduce(|best, point| if point.1 < best.1 { point } else { best })
    }
}

/// `count` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Sample the curve for `spec` over the fixed domain.
pub fn render(spec: QuadraticSpec) -> Result<Chart, Error> {
    let curve = Quadratic::new(spec)?;
    let points = linspace(DOMAIN.0, DOMAIN.1, SAMPLE_COUNT)
        .into_iter()
        .map(|x| (x, curve.evaluate(x)))
        .collect();

    Ok(Chart {
        title: curve.title(),
        x_label: "x".to_string(),
        y_label: "y".to_string(),
        curve,
        points,
    })
}
