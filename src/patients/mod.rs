//! Patients under the clinic's care.

pub mod model;
pub mod routes;
