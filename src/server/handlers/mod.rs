//! Request handlers for the web API.

mod colleges;
mod results;
mod reviews;

pub use colleges::{bonk_college, college_detail, counseling_profile, list_colleges};
pub use results::{college_results, health, round_listing, round_results};
pub use reviews::{add_image, add_review};
