use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A single scalar in a [`FeatureFrame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Cell {
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Text(_) => "text",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Boolean(_) => "boolean",
        }
    }

    /// Numeric view of the cell; booleans count as 0 or 1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            Cell::Text(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("record must serialize to an object")]
    NotAnObject,
    #[error("column {0} holds a value that is not a scalar")]
    UnsupportedValue(String),
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Single-row table keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<(String, Cell)>,
}

impl FeatureFrame {
    /// Builds a row from any record that serializes to a flat object;
    /// each field becomes a column of the same name.
    pub fn from_record<T: Serialize>(record: &T) -> Result<Self, FrameError> {
        let Value::Object(fields) = serde_json::to_value(record)? else {
            return Err(FrameError::NotAnObject);
        };

        let columns = fields
            .into_iter()
            .map(|(name, value)| {
                let cell = match value {
                    Value::String(s) => Cell::Text(s),
                    Value::Bool(b) => Cell::Boolean(b),
                    Value::Number(n) => match n.as_i64() {
                        Some(i) => Cell::Integer(i),
                        None => Cell::Float(
                            n.as_f64()
                                .ok_or_else(|| FrameError::UnsupportedValue(name.clone()))?,
                        ),
                    },
                    _ => return Err(FrameError::UnsupportedValue(name)),
                };
                Ok((name, cell))
            })
            .collect::<Result<Vec<_>, FrameError>>()?;

        Ok(Self { columns })
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::PredictionFeatures;

    #[test]
    fn one_column_per_feature() {
        let frame = FeatureFrame::from_record(&PredictionFeatures::default()).unwrap();

        assert_eq!(frame.width(), 13);
        assert_eq!(frame.get("model_key"), Some(&Cell::Text("Peugeot".to_string())));
        assert_eq!(frame.get("mileage"), Some(&Cell::Integer(13131)));
        assert_eq!(frame.get("winter_tires"), Some(&Cell::Boolean(true)));
        assert!(frame.get("price").is_none());
        assert_eq!(frame.get("has_getaround_connect"), Some(&Cell::Boolean(true)));
    }

    #[test]
    fn numeric_view_of_cells() {
        assert_eq!(Cell::Boolean(true).as_f64(), Some(1.0));
        assert_eq!(Cell::Integer(-3).as_f64(), Some(-3.0));
        assert_eq!(Cell::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(Cell::Text("diesel".to_string()).as_f64(), None);
    }

    #[test]
    fn rejects_nested_and_non_object_records() {
        #[derive(Serialize)]
        struct Nested {
            tags: Vec<String>,
        }

        let err = FeatureFrame::from_record(&Nested { tags: vec![] }).unwrap_err();
        assert!(matches!(err, FrameError::UnsupportedValue(column) if column == "tags"));
        assert!(matches!(
            FeatureFrame::from_record(&42).unwrap_err(),
            FrameError::NotAnObject
        ));
    }
}
