use super::{Attribution, AttributionModel};

/// `intercept + Σ coefficient_i · x_i`, attributed against background means.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
    feature_means: Vec<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>, feature_means: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            feature_means,
        }
    }
}

impl AttributionModel for LinearModel {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn accepts_width(&self, width: usize) -> bool {
        self.coefficients.len() == width && self.feature_means.len() == width
    }

    fn explain(&self, inputs: &[f64]) -> Attribution {
        let base_value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(&self.feature_means)
                .map(|(coefficient, mean)| coefficient * mean)
                .sum::<f64>();
        let contributions: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.feature_means)
            .zip(inputs)
            .map(|((coefficient, mean), value)| coefficient * (value - mean))
            .collect();
        let raw_value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(inputs)
                .map(|(coefficient, value)| coefficient * value)
                .sum::<f64>();

        Attribution {
            raw_value,
            base_value,
            contributions,
        }
    }
}
