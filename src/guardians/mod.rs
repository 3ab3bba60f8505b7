//! Parents and legal guardians of patients.

pub mod model;
pub mod routes;
