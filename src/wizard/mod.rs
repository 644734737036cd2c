// src/wizard/mod.rs
//! Step wizard controller

pub mod controller;
pub mod draft;
pub mod fields;
pub mod lists;
pub mod steps;

pub use controller::{step_complete, Wizard};
pub use draft::StepDraft;
pub use fields::FieldRef;
pub use steps::{Navigator, Route, WizardStep};
