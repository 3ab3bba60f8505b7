//! Clinic staff: therapists, supervisors, doctors and administrators.

pub mod model;
pub mod routes;
