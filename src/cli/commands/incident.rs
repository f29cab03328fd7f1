use anyhow::{anyhow, Result};

use crate::cli::IncidentCommand;
use crate::models::IncidentStatus;
use crate::session::AppContext;
use crate::storage::Attachment;
use crate::workflows::IncidentDraft;

use super::{require_user, short_time};

impl IncidentCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let service = ctx.incidents();
        match self {
            IncidentCommand::List => {
                let incidents = service.list().await?;
                println!("🚨 {} incidents", incidents.len());
                for incident in incidents {
                    let status = match incident.status {
                        IncidentStatus::Open => "🔴 open",
                        IncidentStatus::InProgress => "🟠 in progress",
                        IncidentStatus::Resolved => "🟢 resolved",
                    };
                    println!(
                        "   {:<10} {:<30} {:<17} {:<14} {}",
                        incident.id,
                        incident.title,
                        incident.incident_type.label(),
                        status,
                        incident.created_at.map(short_time).unwrap_or_default()
                    );
                    if let Some(link) = incident.map_link() {
                        println!("              📍 {link}");
                    }
                }
                Ok(())
            }
            IncidentCommand::Report {
                title,
                description,
                incident_type,
                lat,
                lng,
                photo,
            } => {
                let user = require_user(ctx)?;
                let photo = match photo {
                    Some(path) => Some(Attachment::read(&path).await.inspect_err(|e| ctx.notifier.error(&e.to_string()))?),
                    None => None,
                };
                let draft = IncidentDraft {
                    title,
                    description,
                    incident_type: incident_type.into(),
                    lat,
                    lng,
                    photo,
                };
                service.report(Some(&user), draft).await?;
                Ok(())
            }
            IncidentCommand::Advance { incident } => {
                let user = require_user(ctx)?;
                let incidents = service.list().await?;
                let Some(found) = incidents.iter().find(|i| i.id == incident) else {
                    ctx.notifier.error(&format!("No incident with id {incident}"));
                    return Err(anyhow!("incident {incident} not found"));
                };
                service.advance(&user, found).await?;
                Ok(())
            }
        }
    }
}
