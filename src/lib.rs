//
// lib.rs
// Orthanc-Client-rs
//
// Exposes the crate's modules and re-exports the resource tree, client seam, and shared helpers.
//
// Thales Matheus Mendonça Santos - August 2026

// Public surface of the library: the entity proxies, the wire seam they talk
// through, and the supporting value types.
pub mod anonymize;
pub mod client;
pub mod error;
pub mod instance;
pub mod job;
pub mod patient;
pub mod resource;
pub mod series;
pub mod study;
pub mod util;

pub use anonymize::{Anonymized, AnonymizeRequest};
pub use client::{ApiClient, ModuleFormat, OrthancClient};
pub use error::{Error, Result};
pub use instance::Instance;
pub use job::{Job, JobState};
pub use patient::Patient;
pub use resource::{EntityKind, RemoteEntity, Resource};
pub use series::Series;
pub use study::Study;
