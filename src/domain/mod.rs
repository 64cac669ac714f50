pub mod message;
pub mod repository;
