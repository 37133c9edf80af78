pub mod application;
pub mod upload;
