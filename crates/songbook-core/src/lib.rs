pub mod domain;
pub mod errors;
pub mod memory;
pub mod ports;
pub mod services;

pub use errors::CoreError;
