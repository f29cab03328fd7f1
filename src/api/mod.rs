// REST backend access: one rate-limited client, one file per resource family,
// and trait seams the workflow services are written against.

pub mod certificates;
pub mod client;
pub mod confined_space;
pub mod directory;
pub mod equipment;
pub mod errors;
pub mod incidents;
/// In-memory backend for tests and offline demos.
pub mod mocks;
pub mod observations;
pub mod permits;
pub mod traits;
pub mod training;

pub use client::ApiClient;
pub use errors::ApiError;
pub use traits::{
    CertificateApi, DirectoryApi, EquipmentApi, IncidentApi, ObservationApi, PermitApi, RosterApi,
    TrainingApi,
};
