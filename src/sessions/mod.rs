//! Sessions between staff and patients, and the rule that keeps a staff
//! member from being double-booked.

pub mod model;
pub mod overlap;
pub mod routes;
pub mod scheduler;

pub use scheduler::SessionScheduler;
