//! Services - simulation logic
//!
//! This module contains the moving parts of the simulation:
//! - `interpolator` - pure densification of route polylines
//! - `feed` - timer-driven position emission with cooperative cancellation
//! - `fare_meter` - running fare synced to simulated progress

pub mod fare_meter;
pub mod feed;
pub mod interpolator;

// Re-export commonly used types
pub use fare_meter::FareMeter;
pub use feed::{FeedConfig, FeedHandle, PositionFeed, PositionUpdate};
pub use interpolator::{densify, SubdivisionPolicy};
