//! Data models for orcrview.

mod college;
mod counseling;
mod profile;
mod review;

pub use college::{College, CollegeType};
pub use counseling::{CounselingResult, CounselingType, Exam};
pub use profile::{CounselingProfile, RoundMarker, SortField};
pub use review::{CollegeImage, Review};
