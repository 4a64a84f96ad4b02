use crate::frame::{Cell, FeatureFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A fitted rental-price regressor together with its preprocessing.
///
/// The artifact is a JSON document; see `model.json` at the repository root
/// for a complete example. Prediction is
/// `intercept + sum(transform contribution)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceModel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub intercept: f64,
    pub features: Vec<FeatureTransform>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureTransform {
    /// Standardised numeric column: `(x - mean) / scale * coefficient`.
    Numeric {
        column: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
        coefficient: f64,
    },
    /// One-hot encoded column folded into a weight per category.
    Categorical {
        column: String,
        weights: BTreeMap<String, f64>,
        #[serde(default)]
        unknown: UnknownCategory,
    },
}

fn unit_scale() -> f64 {
    1.0
}

/// What to do with a category the encoder never saw during fitting.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategory {
    #[default]
    Error,
    /// Encode as all zeros, so the column contributes nothing.
    Ignore,
}

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("Column {0} is missing from the input frame")]
    MissingColumn(String),
    #[error("Column {column} expects {expected} values, got {actual}")]
    ColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Found unknown category {value:?} in column {column} during transform")]
    UnknownCategory { column: String, value: String },
    #[error("Model produced a non-finite prediction")]
    NonFinite,
}

impl FeatureTransform {
    pub fn column(&self) -> &str {
        match self {
            FeatureTransform::Numeric { column, .. } => column,
            FeatureTransform::Categorical { column, .. } => column,
        }
    }

    fn contribution(&self, frame: &FeatureFrame) -> Result<f64, InferenceError> {
        let column = self.column();
        let cell = frame
            .get(column)
            .ok_or_else(|| InferenceError::MissingColumn(column.to_string()))?;

        match self {
            FeatureTransform::Numeric {
                mean,
                scale,
                coefficient,
                ..
            } => {
                let x = cell.as_f64().ok_or_else(|| InferenceError::ColumnType {
                    column: column.to_string(),
                    expected: "numeric",
                    actual: cell.type_name(),
                })?;
                Ok((x - mean) / scale * coefficient)
            }
            FeatureTransform::Categorical {
                weights, unknown, ..
            } => {
                let Cell::Text(value) = cell else {
                    return Err(InferenceError::ColumnType {
                        column: column.to_string(),
                        expected: "text",
                        actual: cell.type_name(),
                    });
                };
                match (weights.get(value), unknown) {
                    (Some(weight), _) => Ok(*weight),
                    (None, UnknownCategory::Ignore) => Ok(0.0),
                    (None, UnknownCategory::Error) => Err(InferenceError::UnknownCategory {
                        column: column.to_string(),
                        value: value.clone(),
                    }),
                }
            }
        }
    }
}

impl PriceModel {
    pub fn predict(&self, frame: &FeatureFrame) -> Result<f64, InferenceError> {
        let mut prediction = self.intercept;
        for transform in &self.features {
            prediction += transform.contribution(frame)?;
        }

        if prediction.is_finite() {
            Ok(prediction)
        } else {
            Err(InferenceError::NonFinite)
        }
    }

    /// Checks the fitted parameters, returning a description of the first problem.
    pub fn check(&self) -> Result<(), String> {
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }

        for transform in &self.features {
            match transform {
                FeatureTransform::Numeric {
                    column,
                    mean,
                    scale,
                    coefficient,
                } => {
                    if *scale == 0.0 || !scale.is_finite() {
                        return Err(format!("column {} has an invalid scale {}", column, scale));
                    }
                    if !mean.is_finite() || !coefficient.is_finite() {
                        return Err(format!("column {} has non-finite parameters", column));
                    }
                }
                FeatureTransform::Categorical {
                    column, weights, ..
                } => {
                    if let Some((category, _)) = weights.iter().find(|(_, w)| !w.is_finite()) {
                        return Err(format!(
                            "column {} has a non-finite weight for {:?}",
                            column, category
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::PredictionFeatures;
    use serde_json::json;

    fn sample_model() -> PriceModel {
        serde_json::from_value(json!({
            "name": "test",
            "intercept": 100.0,
            "features": [
                {"kind": "numeric", "column": "mileage", "mean": 10000.0, "scale": 1000.0, "coefficient": -2.0},
                {"kind": "numeric", "column": "has_gps", "coefficient": 5.0},
                {"kind": "categorical", "column": "fuel", "weights": {"diesel": 1.5, "petrol": -1.5}},
                {"kind": "categorical", "column": "paint_color", "weights": {"grey": 0.25}, "unknown": "ignore"}
            ]
        }))
        .unwrap()
    }

    fn frame(features: &PredictionFeatures) -> FeatureFrame {
        FeatureFrame::from_record(features).unwrap()
    }

    #[test]
    fn sums_intercept_and_contributions() {
        let model = sample_model();
        let features = PredictionFeatures {
            mileage: 12000,
            ..Default::default()
        };

        // 100 + (12000 - 10000) / 1000 * -2 + 5 + 1.5 + 0.25
        let prediction = model.predict(&frame(&features)).unwrap();
        assert!((prediction - 102.75).abs() < 1e-9);
    }

    #[test]
    fn unknown_category_follows_policy() {
        let model = sample_model();

        let ignored = PredictionFeatures {
            mileage: 10000,
            paint_color: "purple".to_string(),
            ..Default::default()
        };
        let prediction = model.predict(&frame(&ignored)).unwrap();
        assert!((prediction - 106.5).abs() < 1e-9);

        let rejected = PredictionFeatures {
            fuel: "hydrogen".to_string(),
            ..Default::default()
        };
        assert_eq!(
            model.predict(&frame(&rejected)),
            Err(InferenceError::UnknownCategory {
                column: "fuel".to_string(),
                value: "hydrogen".to_string(),
            })
        );
    }

    #[test]
    fn frame_shape_mismatches_are_errors() {
        let mut model = sample_model();
        model.features.push(FeatureTransform::Numeric {
            column: "seats".to_string(),
            mean: 0.0,
            scale: 1.0,
            coefficient: 1.0,
        });
        assert_eq!(
            model.predict(&frame(&PredictionFeatures::default())),
            Err(InferenceError::MissingColumn("seats".to_string()))
        );

        let model = PriceModel {
            name: String::new(),
            version: String::new(),
            intercept: 0.0,
            features: vec![FeatureTransform::Numeric {
                column: "fuel".to_string(),
                mean: 0.0,
                scale: 1.0,
                coefficient: 1.0,
            }],
        };
        assert!(matches!(
            model.predict(&frame(&PredictionFeatures::default())),
            Err(InferenceError::ColumnType { expected: "numeric", actual: "text", .. })
        ));
    }

    #[test]
    fn check_rejects_degenerate_parameters() {
        assert!(sample_model().check().is_ok());

        let mut model = sample_model();
        model.features[0] = FeatureTransform::Numeric {
            column: "mileage".to_string(),
            mean: 0.0,
            scale: 0.0,
            coefficient: 1.0,
        };
        assert!(model.check().unwrap_err().contains("mileage"));

        let mut model = sample_model();
        model.intercept = f64::NAN;
        assert!(model.check().is_err());
    }
}
