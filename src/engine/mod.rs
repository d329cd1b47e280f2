// Engine module - request assembly, result cache, job control

pub mod cache;
pub mod controller;
pub mod request;

pub use cache::ResultCache;
pub use controller::{JobController, JobEvent, JobId, JobState};
pub use request::{SimRequest, Sensitivity};
