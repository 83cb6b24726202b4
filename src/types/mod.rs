//! Core types used throughout the svclust library.
//!
//! - [`Point`] / [`LabeledPoint`] - Raw and labeled points of the underlying cloud
//! - [`Labeling`] - A point-to-label assignment over a whole cloud
//! - [`Region`] - A clustering unit with aggregate color/geometry descriptors
//! - [`PerformanceRecord`] - Partition comparison metrics

mod core;
mod performance;
mod region;

pub use self::core::{LabeledPoint, Labeling, Point, RegionId};
pub use performance::PerformanceRecord;
pub use region::{Region, VIEWPOINT};
