//! Clinic branches and their operating hours.

pub mod model;
pub mod routes;
