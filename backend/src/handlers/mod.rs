//! HTTP request handlers

pub mod predictions;
pub mod recommendations;
pub mod weather;

pub use predictions::get_predictions;
pub use recommendations::get_recommendations;
pub use weather::{get_current_weather, get_provider_forecast};
