pub mod dashboard;
pub mod predict;
