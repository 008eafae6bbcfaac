//! Business logic services for the Weather Insights Platform

pub mod forecast;
pub mod history;
pub mod model;
pub mod recommendation;

pub use forecast::ForecastService;
pub use history::HistoryService;
pub use recommendation::RecommendationService;
