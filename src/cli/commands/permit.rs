use anyhow::{anyhow, Result};

use crate::cli::{PermitCommand, SubmitArgs};
use crate::models::{Permit, PermitDescription, User};
use crate::session::AppContext;
use crate::storage::Attachment;
use crate::workflows::permissions::allowed_permit_actions;
use crate::workflows::{ApprovalService, PermitAction, PermitDraft};

use super::{or_dash, require_user, short_time};

impl PermitCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let service = ctx.approvals();
        match self {
            PermitCommand::List { mine } => list(ctx, &service, mine).await,
            PermitCommand::Show { permit } => show(&service, ctx, &permit).await,
            PermitCommand::Submit(args) => submit(ctx, &service, args).await,
            PermitCommand::Approve { permit } => act(ctx, &service, &permit, PermitAction::Approve).await,
            PermitCommand::Reject { permit } => act(ctx, &service, &permit, PermitAction::Reject).await,
        }
    }
}

async fn list(ctx: &AppContext, service: &ApprovalService, mine: bool) -> Result<()> {
    service.refresh().await?;
    let user = ctx.current_user();
    let permits = match (mine, user) {
        (true, Some(user)) => service.actionable_for(user).await,
        (true, None) => return require_user(ctx).map(|_| ()),
        (false, _) => service.permits().await,
    };

    if permits.is_empty() {
        println!("📋 No permits to show");
        return Ok(());
    }

    println!("📋 {} permits", permits.len());
    for permit in &permits {
        let waiting_on_you = user.is_some_and(|u| !allowed_permit_actions(u.role, permit.status).is_empty());
        println!(
            "   {} {:<10} {:<24} {:<15} {:<26} {}",
            if waiting_on_you { "👉" } else { "  " },
            permit.display_number(),
            truncate(&permit.title, 24),
            permit.permit_type.label(),
            permit.status.label(),
            permit.applicant_name()
        );
    }
    Ok(())
}

async fn show(service: &ApprovalService, ctx: &AppContext, id: &str) -> Result<()> {
    service.refresh().await?;
    let permit = find(service, ctx, id).await?;
    let description = PermitDescription::parse(permit.description.as_deref().unwrap_or_default());

    println!("📄 {} {}", permit.display_number(), permit.title);
    println!("   Type:      {}", permit.permit_type.label());
    println!("   Status:    {} ({})", permit.status.label(), permit.status);
    println!("   Location:  {}", or_dash(permit.location_detail.as_deref()));
    println!("   Window:    {} to {}", short_time(permit.start_time), short_time(permit.end_time));
    println!("   Applicant: {}", permit.applicant_name());
    println!("   Details:   {}", description.details);
    if let Some(workers) = description.workers {
        println!("   Workers:   {workers}");
    }
    if !description.ppe.is_empty() {
        println!("   PPE:       {}", description.ppe.join(", "));
    }
    if !description.safety_measures.is_empty() {
        println!("   Measures:  {}", description.safety_measures.join(", "));
    }
    if let Some(url) = &permit.attachment_url {
        println!("   JSA:       {} ({url})", or_dash(permit.attachment_name.as_deref()));
    }

    if let Some(user) = ctx.current_user() {
        let actions = allowed_permit_actions(user.role, permit.status);
        if !actions.is_empty() {
            let hints: Vec<String> = actions
                .iter()
                .map(|a| format!("safetyos permit {a} {}", permit.id))
                .collect();
            println!();
            println!("💡 Waiting on you: {}", hints.join("  |  "));
        }
    }
    Ok(())
}

async fn submit(ctx: &AppContext, service: &ApprovalService, args: SubmitArgs) -> Result<()> {
    let user = require_user(ctx)?;

    let mut attachments = Vec::with_capacity(args.attachments.len());
    for path in &args.attachments {
        match Attachment::read(path).await {
            Ok(attachment) => attachments.push(attachment),
            Err(e) => {
                ctx.notifier.error(&e.to_string());
                return Err(e.into());
            }
        }
    }

    let mut description = PermitDescription::new(args.details)
        .with_ppe(args.ppe)
        .with_safety_measures(args.measures);
    if let Some(workers) = args.workers {
        description = description.with_workers(workers);
    }

    let draft = PermitDraft {
        title: args.title,
        description,
        permit_type: args.permit_type.into(),
        location_detail: args.location,
        start_time: args.start,
        end_time: args.end,
        attachments,
    };
    service.submit(Some(&user), draft).await?;
    Ok(())
}

async fn act(ctx: &AppContext, service: &ApprovalService, id: &str, action: PermitAction) -> Result<()> {
    let user: User = require_user(ctx)?;
    service.refresh().await?;
    let permit = find(service, ctx, id).await?;

    let next = service.transition(&user, &permit.id, permit.status, action).await?;
    println!("   {} → {}", permit.status.label(), next.label());
    Ok(())
}

async fn find(service: &ApprovalService, ctx: &AppContext, id: &str) -> Result<Permit> {
    match service.find(id).await {
        Some(permit) => Ok(permit),
        None => {
            ctx.notifier.error(&format!("No permit with id or number {id}"));
            Err(anyhow!("permit {id} not found"))
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{cut}…")
}
