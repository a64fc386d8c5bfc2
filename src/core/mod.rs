pub mod services;
pub mod time;
pub mod tracker;
pub mod utils;

pub use tracker::{DesireTracker, LoadMetadata};
