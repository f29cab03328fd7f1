use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::store::SessionStore;
use crate::api::{ApiClient, ApiError, DirectoryApi};
use crate::config::SafetyOsConfig;
use crate::inspection::InspectionService;
use crate::models::{Credentials, User};
use crate::notify::Notifier;
use crate::roster::RosterService;
use crate::storage::{self, ObjectStore};
use crate::training::TrainingService;
use crate::workflows::{ApprovalService, CertificateService, IncidentService, ObservationService};

/// Everything a command needs, built once and passed in explicitly.
///
/// The current user is read from the session file at startup (or absent),
/// replaced on login and cleared on logout.
pub struct AppContext {
    pub config: SafetyOsConfig,
    pub client: Arc<ApiClient>,
    pub store: Arc<dyn ObjectStore>,
    pub notifier: Arc<dyn Notifier>,
    session: SessionStore,
    user: Option<User>,
}

impl AppContext {
    pub fn init(config: SafetyOsConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let client = Arc::new(ApiClient::new(&config.api)?);
        let store = storage::from_config(&config.storage)?;
        let session = SessionStore::new(&config.session.path);
        let user = session.load()?;

        Ok(Self {
            config,
            client,
            store,
            notifier,
            session,
            user,
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&User, ApiError> {
        self.user.as_ref().ok_or(ApiError::NotLoggedIn)
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, ApiError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let user = self.client.login(&credentials).await?;
        self.session.save(&user)?;
        info!(user_id = %user.id, role = %user.role, "Logged in");
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session.clear()?;
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "Logged out");
        }
        Ok(())
    }

    pub fn approvals(&self) -> ApprovalService {
        ApprovalService::new(
            self.client.clone(),
            self.store.clone(),
            self.notifier.clone(),
            &self.config.storage.bucket,
        )
    }

    pub fn roster(&self) -> RosterService {
        RosterService::new(
            self.client.clone(),
            self.notifier.clone(),
            self.config.roster.overdue_after_minutes,
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.roster.poll_interval_seconds.max(1))
    }

    pub fn certificates(&self) -> CertificateService {
        CertificateService::new(
            self.client.clone(),
            self.store.clone(),
            self.notifier.clone(),
            &self.config.storage.bucket,
        )
    }

    pub fn incidents(&self) -> IncidentService {
        IncidentService::new(
            self.client.clone(),
            self.store.clone(),
            self.notifier.clone(),
            &self.config.storage.bucket,
        )
    }

    pub fn observations(&self) -> ObservationService {
        ObservationService::new(self.client.clone(), self.notifier.clone())
    }

    pub fn training(&self) -> TrainingService {
        TrainingService::new(self.client.clone(), self.notifier.clone())
    }

    pub fn inspections(&self) -> InspectionService {
        InspectionService::new(self.client.clone(), self.notifier.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(dir: &TempDir, base_url: &str) -> SafetyOsConfig {
        let mut config = SafetyOsConfig::default();
        config.api.base_url = base_url.to_string();
        config.session.path = dir.path().join("session.json");
        config
    }

    #[tokio::test]
    async fn login_persists_and_logout_clears() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({"username": "owner1", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": "u-2", "full_name": "Area Owner", "department": "Utilities", "role": "AREA_OWNER"}
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut ctx = AppContext::init(config(&dir, &server.uri()), Arc::new(RecordingNotifier::new())).unwrap();
        assert!(ctx.current_user().is_none());

        ctx.login("owner1", "pw").await.unwrap();
        assert_eq!(ctx.require_user().unwrap().id, "u-2");

        let restored = AppContext::init(config(&dir, &server.uri()), Arc::new(RecordingNotifier::new())).unwrap();
        assert_eq!(restored.current_user().map(|u| u.full_name.as_str()), Some("Area Owner"));

        ctx.logout().unwrap();
        assert!(matches!(ctx.require_user(), Err(ApiError::NotLoggedIn)));
        let after = AppContext::init(config(&dir, &server.uri()), Arc::new(RecordingNotifier::new())).unwrap();
        assert!(after.current_user().is_none());
    }

    #[tokio::test]
    async fn failed_login_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid password"})))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let mut ctx = AppContext::init(config(&dir, &server.uri()), Arc::new(RecordingNotifier::new())).unwrap();
        let err = ctx.login("x", "y").await.unwrap_err();
        assert!(matches!(err, ApiError::Server { status: 401, ref message } if message == "Invalid password"));
        assert!(ctx.current_user().is_none());
    }
}
