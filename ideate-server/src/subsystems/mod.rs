pub mod sessions;
pub mod workflow;
