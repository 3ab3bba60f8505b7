//! Onboarding assessments: the question catalog, intake batches, and answers.

pub mod catalog;
pub mod manager;
pub mod model;
pub mod routes;

pub use manager::{OnboardingManager, SeedReport};
