use crate::coerce;
use serde::{Deserialize, Serialize};

/// One car listing as accepted by `POST /predict`.
///
/// Every field is optional on the wire; missing ones fall back to the
/// values in [`Default`]. Field names double as the model's column names.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PredictionFeatures {
    #[serde(deserialize_with = "coerce::text")]
    pub model_key: String,
    #[serde(deserialize_with = "coerce::integer")]
    pub mileage: i64,
    #[serde(deserialize_with = "coerce::integer")]
    pub engine_power: i64,
    #[serde(deserialize_with = "coerce::text")]
    pub fuel: String,
    #[serde(deserialize_with = "coerce::text")]
    pub paint_color: String,
    #[serde(deserialize_with = "coerce::text")]
    pub car_type: String,
    #[serde(deserialize_with = "coerce::boolean")]
    pub private_parking_available: bool,
    #[serde(deserialize_with = "coerce::boolean")]
    pub has_gps: bool,
    #[serde(deserialize_with = "coerce::boolean")]
    pub has_air_conditioning: bool,
    #[serde(deserialize_with = "coerce::boolean")]
    pub automatic_car: bool,
    #[serde(deserialize_with = "coerce::boolean")]
    pub has_getaround_connect: bool,
    #[serde(deserialize_with = "coerce::boolean")]
    pub has_speed_regulator: bool,
    #[serde(deserialize_with = "coerce::boolean")]
    pub winter_tires: bool,
}

impl Default for PredictionFeatures {
    fn default() -> Self {
        Self {
            model_key: "Peugeot".to_string(),
            mileage: 13131,
            engine_power: 110,
            fuel: "diesel".to_string(),
            paint_color: "grey".to_string(),
            car_type: "convertible".to_string(),
            private_parking_available: false,
            has_gps: true,
            has_air_conditioning: true,
            automatic_car: false,
            has_getaround_connect: true,
            has_speed_regulator: false,
            winter_tires: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_documented_defaults() {
        let features: PredictionFeatures = serde_json::from_value(json!({})).unwrap();
        assert_eq!(features, PredictionFeatures::default());
        assert_eq!(features.model_key, "Peugeot");
        assert_eq!(features.mileage, 13131);
        assert_eq!(features.engine_power, 110);
        assert!(features.winter_tires);
        assert!(!features.automatic_car);
    }

    #[test]
    fn provided_fields_override_only_themselves() {
        let features: PredictionFeatures = serde_json::from_value(json!({
            "model_key": "Citroën",
            "mileage": 50000,
            "fuel": "petrol",
            "not_a_feature": 3
        }))
        .unwrap();

        assert_eq!(features.model_key, "Citroën");
        assert_eq!(features.mileage, 50000);
        assert_eq!(features.fuel, "petrol");
        assert_eq!(features.engine_power, 110);
        assert_eq!(features.car_type, "convertible");
        assert!(features.has_gps);
    }

    #[test]
    fn rejects_type_errors() {
        let result = serde_json::from_value::<PredictionFeatures>(json!({"mileage": "far"}));
        assert!(result.is_err());
        let result = serde_json::from_value::<PredictionFeatures>(json!({"has_gps": null}));
        assert!(result.is_err());
    }
}
