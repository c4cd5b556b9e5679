//! Clustering of candidate tile locations.
//!
//! A level usually has far more cells of interest than anyone wants routes
//! to. [`kmeans`] groups their coordinates into a requested number of
//! clusters, and [`representatives`] picks one walkable cell per cluster to
//! use as a pathfinding target.

mod error;
mod kmeans;
mod representative;
mod vec2;

pub use error::ClusterError;
pub use kmeans::{kmeans, lloyd_step};
pub use representative::{nearest_walkable, representatives};
pub use vec2::Vec2;
