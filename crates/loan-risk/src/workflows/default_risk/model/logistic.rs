use super::{
    check_row, default_threshold, probability_pair, validate_common, Classifier, InferenceError,
    ModelValidationError,
};
use crate::workflows::default_risk::features::EncodedFeatureVector;

/// Fitted logistic regression over raw (unscaled) encoded features.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegressionModel {
    feature_names: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
    threshold: f64,
}

impl LogisticRegressionModel {
    pub fn new(
        feature_names: Vec<String>,
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, ModelValidationError> {
        let model = Self {
            feature_names,
            coefficients,
            intercept,
            threshold: default_threshold(),
        };
        model.validate()?;
        Ok(model)
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ModelValidationError> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_common(&self.feature_names, self.threshold)?;
        if self.coefficients.len() != self.feature_names.len() {
            return Err(ModelValidationError::CoefficientCount {
                coefficients: self.coefficients.len(),
                features: self.feature_names.len(),
            });
        }
        if let Some(index) = self.coefficients.iter().position(|c| !c.is_finite()) {
            return Err(ModelValidationError::NonFiniteParameter {
                name: format!("coefficient for {}", self.feature_names[index]),
            });
        }
        if !self.intercept.is_finite() {
            return Err(ModelValidationError::NonFiniteParameter {
                name: "intercept".to_string(),
            });
        }
        Ok(())
    }

    pub fn decision_function(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .fold(self.intercept, |acc, (weight, value)| acc + weight * value)
    }
}

/// Logistic sigmoid without overflow for large |z|.
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegressionModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn decision_threshold(&self) -> f64 {
        self.threshold
    }

    fn predict_proba(&self, row: &EncodedFeatureVector) -> Result<[f64; 2], InferenceError> {
        check_row(&self.feature_names, row)?;
        let z = self.decision_function(row.values());
        probability_pair(sigmoid(z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(sigmoid(-1_000.0), 0.0);
        assert_eq!(sigmoid(1_000.0), 1.0);
        assert!(sigmoid(-1_000.0).is_finite());
        assert!(sigmoid(2.0) > sigmoid(1.0));
    }

    #[test]
    fn rejects_coefficient_count_mismatch() {
        let err = LogisticRegressionModel::new(
            vec!["a".to_string(), "b".to_string()],
            vec![0.5],
            0.0,
        )
        .expect_err("one coefficient for two features");
        assert_eq!(
            err,
            ModelValidationError::CoefficientCount {
                coefficients: 1,
                features: 2
            }
        );
    }

    #[test]
    fn rejects_non_finite_parameters_and_bad_threshold() {
        let names = vec!["a".to_string()];
        assert!(matches!(
            LogisticRegressionModel::new(names.clone(), vec![f64::NAN], 0.0),
            Err(ModelValidationError::NonFiniteParameter { .. })
        ));
        assert!(matches!(
            LogisticRegressionModel::new(names.clone(), vec![1.0], f64::INFINITY),
            Err(ModelValidationError::NonFiniteParameter { .. })
        ));

        let model = LogisticRegressionModel::new(names, vec![1.0], 0.0).expect("valid");
        assert_eq!(
            model.with_threshold(1.5),
            Err(ModelValidationError::Threshold(1.5))
        );
    }

    #[test]
    fn decision_function_is_affine() {
        let model = LogisticRegressionModel::new(
            vec!["a".to_string(), "b".to_string()],
            vec![2.0, -1.0],
            0.5,
        )
        .expect("valid");
        assert_eq!(model.decision_function(&[1.0, 3.0]), 0.5 + 2.0 - 3.0);
    }
}
