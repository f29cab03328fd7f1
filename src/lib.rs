// SafetyOS Library - permit-to-work and site safety client
// This exposes the core components for the CLI, testing and integration

pub mod api;
pub mod cli;
pub mod config;
pub mod inspection;
pub mod models;
pub mod notify;
pub mod roster;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod training;
pub mod workflows;

// Re-export key types for easy access
pub use api::{ApiClient, ApiError};
pub use config::{config, init_config, SafetyOsConfig};
pub use inspection::InspectionService;
pub use notify::{ConsoleNotifier, Notifier, RecordingNotifier};
pub use roster::{RosterBoard, RosterPoller, RosterService};
pub use session::{AppContext, SessionStore};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
pub use training::TrainingService;
pub use workflows::{ApprovalService, CertificateService, IncidentService, ObservationService, PermitAction};
