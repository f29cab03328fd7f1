use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};

use crate::cli::CertCommand;
use crate::models::{CertificateStatus, ExpiryStatus};
use crate::session::AppContext;
use crate::storage::Attachment;
use crate::workflows::CertificateDraft;

use super::{or_dash, require_user};

impl CertCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let service = ctx.certificates();
        match self {
            CertCommand::List => {
                let now = Utc::now();
                let certificates = service.list().await?;
                println!("🎓 {} certificates", certificates.len());
                for cert in certificates {
                    let expiry = match cert.expiry_status(now) {
                        ExpiryStatus::Expired => "🔴 expired".to_string(),
                        ExpiryStatus::ExpiringSoon { days_left } => format!("🟠 {days_left} days left"),
                        ExpiryStatus::Valid { .. } => "🟢 valid".to_string(),
                    };
                    let holder = cert.user.as_ref().and_then(|u| u.full_name.as_deref());
                    println!(
                        "   {:<10} {:<26} {:<20} {:<10?} {:<16} {}",
                        cert.id,
                        cert.cert_name,
                        or_dash(holder),
                        cert.status,
                        expiry,
                        cert.expiry_date.format("%Y-%m-%d")
                    );
                }
                Ok(())
            }
            CertCommand::Upload {
                name,
                issued,
                expires,
                file,
            } => {
                let user = require_user(ctx)?;
                let document = Attachment::read(&file).await.inspect_err(|e| ctx.notifier.error(&e.to_string()))?;
                let draft = CertificateDraft {
                    cert_name: name,
                    issued_date: start_of_day(issued),
                    expiry_date: start_of_day(expires),
                    document,
                };
                service.upload(Some(&user), draft).await?;
                Ok(())
            }
            CertCommand::Verify { certificate, verdict } => {
                let user = require_user(ctx)?;
                let certificates = service.list().await?;
                let Some(cert) = certificates.iter().find(|c| c.id == certificate) else {
                    ctx.notifier.error(&format!("No certificate with id {certificate}"));
                    return Err(anyhow!("certificate {certificate} not found"));
                };
                let verdict: CertificateStatus = verdict.into();
                service.verify(&user, cert, verdict).await?;
                Ok(())
            }
        }
    }
}

fn start_of_day(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
