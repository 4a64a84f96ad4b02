pub mod delay_analytics;
pub mod prediction_service;
pub mod price_model;
