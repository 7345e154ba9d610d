//! Helpers shared by the conversion steps.

pub mod fs;
