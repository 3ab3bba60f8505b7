//! Activities recorded during a session.

pub mod model;
pub mod routes;
