use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::client::ApiClient;
use super::errors::ApiError;
use super::traits::CertificateApi;
use crate::models::{Certificate, CertificateStatus, NewCertificate};

#[async_trait]
impl CertificateApi for ApiClient {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError> {
        self.get_json("/certificates").await
    }

    async fn create_certificate(&self, certificate: &NewCertificate) -> Result<(), ApiError> {
        self.send_discard(Method::POST, "/certificates", Some(certificate))
            .await
    }

    async fn verify_certificate(&self, certificate_id: &str, status: CertificateStatus) -> Result<(), ApiError> {
        self.send_discard(
            Method::PUT,
            &format!("/certificates/{certificate_id}/verify"),
            Some(&json!({ "status": status })),
        )
        .await
    }
}
