//! Palaam: clinic management backend.

pub mod activities;
pub mod api;
pub mod branches;
pub mod clock;
pub mod config;
pub mod error;
pub mod guardians;
pub mod medicines;
pub mod onboarding;
pub mod patients;
pub mod sessions;
pub mod staff;
pub mod store;
