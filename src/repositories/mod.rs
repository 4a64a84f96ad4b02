pub mod model_repository;
pub mod rental_repository;
