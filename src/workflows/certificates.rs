use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use super::permissions::{can_upload_certificate, can_verify_certificate};
use super::state_machine::verify_certificate;
use crate::api::{ApiError, CertificateApi};
use crate::models::{Certificate, CertificateStatus, NewCertificate, User};
use crate::notify::Notifier;
use crate::storage::{upload_attachment, Attachment, ObjectStore, CERTIFICATE_PREFIX};

#[derive(Debug, Clone)]
pub struct CertificateDraft {
    pub cert_name: String,
    pub issued_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub document: Attachment,
}

/// Contractor certificate uploads and safety-engineer verification.
pub struct CertificateService {
    api: Arc<dyn CertificateApi>,
    store: Arc<dyn ObjectStore>,
    notifier: Arc<dyn Notifier>,
    bucket: String,
}

impl CertificateService {
    pub fn new(
        api: Arc<dyn CertificateApi>,
        store: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            bucket: bucket.into(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Certificate>, ApiError> {
        self.api.list_certificates().await.inspect_err(|e| {
            self.notifier.error(&format!("Could not load certificates: {e}"));
        })
    }

    pub async fn upload(&self, actor: Option<&User>, draft: CertificateDraft) -> Result<(), ApiError> {
        let result = self.try_upload(actor, draft).await;
        match &result {
            Ok(()) => self.notifier.success("Certificate uploaded; waiting for verification"),
            Err(e) => self.notifier.error(&format!("Certificate upload failed: {e}")),
        }
        result
    }

    async fn try_upload(&self, actor: Option<&User>, draft: CertificateDraft) -> Result<(), ApiError> {
        let actor = actor.ok_or(ApiError::NotLoggedIn)?;
        if !can_upload_certificate(actor.role) {
            return Err(ApiError::not_permitted(actor.role, "upload certificates"));
        }
        if draft.cert_name.trim().is_empty() {
            return Err(ApiError::validation("a certificate needs a name"));
        }
        if draft.expiry_date < draft.issued_date {
            return Err(ApiError::validation("expiry date is before the issue date"));
        }

        let file_url =
            upload_attachment(self.store.as_ref(), &self.bucket, CERTIFICATE_PREFIX, &draft.document).await?;
        self.api
            .create_certificate(&NewCertificate {
                user_id: actor.id.clone(),
                cert_name: draft.cert_name.trim().to_string(),
                file_url,
                issued_date: draft.issued_date,
                expiry_date: draft.expiry_date,
            })
            .await?;
        info!(user_id = %actor.id, cert_name = %draft.cert_name, "Certificate uploaded");
        Ok(())
    }

    pub async fn verify(
        &self,
        actor: &User,
        certificate: &Certificate,
        verdict: CertificateStatus,
    ) -> Result<CertificateStatus, ApiError> {
        let result = self.try_verify(actor, certificate, verdict).await;
        match &result {
            Ok(status) => self
                .notifier
                .success(&format!("Certificate {} marked {status:?}", certificate.cert_name)),
            Err(e) => self.notifier.error(&format!("Could not verify certificate: {e}")),
        }
        result
    }

    async fn try_verify(
        &self,
        actor: &User,
        certificate: &Certificate,
        verdict: CertificateStatus,
    ) -> Result<CertificateStatus, ApiError> {
        let next = verify_certificate(certificate.status, verdict)?;
        if !can_verify_certificate(actor.role, certificate.status) {
            return Err(ApiError::not_permitted(actor.role, "verify certificates"));
        }
        self.api.verify_certificate(&certificate.id, next).await?;
        info!(certificate_id = %certificate.id, status = ?next, verifier_id = %actor.id, "Certificate verified");
        Ok(next)
    }
}
