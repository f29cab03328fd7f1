use anyhow::Result;

use crate::api::DirectoryApi;
use crate::models::IncidentStatus;
use crate::session::AppContext;

use super::{or_dash, require_user, short_time};

pub async fn login(ctx: &mut AppContext, username: &str, password: &str) -> Result<()> {
    match ctx.login(username, password).await {
        Ok(user) => {
            ctx.notifier.success(&format!(
                "Logged in as {} ({}, {})",
                user.full_name,
                user.role,
                or_dash(user.department.as_deref())
            ));
            Ok(())
        }
        Err(e) => {
            ctx.notifier.error(&format!("Login failed: {e}"));
            Err(e.into())
        }
    }
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    ctx.logout()?;
    ctx.notifier.success("Logged out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let user = require_user(ctx)?;
    println!("👤 {}", user.full_name);
    println!("   Role: {}", user.role);
    println!("   Department: {}", or_dash(user.department.as_deref()));
    println!("   Id: {}", user.id);
    Ok(())
}

pub async fn users(ctx: &AppContext) -> Result<()> {
    let users = ctx.client.list_users().await.inspect_err(|e| {
        ctx.notifier.error(&format!("Could not load users: {e}"));
    })?;

    println!("👥 {} users", users.len());
    for user in users {
        println!(
            "   {:<28} {:<16} {}",
            user.full_name,
            user.role.as_str(),
            or_dash(user.department.as_deref())
        );
    }
    Ok(())
}

pub async fn dashboard(ctx: &AppContext) -> Result<()> {
    let dashboard = ctx.client.dashboard().await.inspect_err(|e| {
        ctx.notifier.error(&format!("Could not load the dashboard: {e}"));
    })?;
    let stats = &dashboard.stats;

    println!("📊 SITE OVERVIEW");
    println!("   Permits:            {}", stats.total_permits);
    println!(
        "   Awaiting approval:  {} ({}%)",
        stats.pending_permits,
        stats.pending_percent()
    );
    println!("   Open incidents:     {}", stats.open_incidents);
    println!("   Defective equipment:{:>3}", stats.defective_equip);
    println!("   Users:              {}", stats.total_users);

    if !dashboard.recent_incidents.is_empty() {
        println!();
        println!("🚨 RECENT INCIDENTS");
        for incident in &dashboard.recent_incidents {
            let marker = if incident.status == IncidentStatus::Resolved { "✅" } else { "⚠️ " };
            println!(
                "   {marker} {} [{}] {}",
                incident.title,
                incident.incident_type.label(),
                incident.created_at.map(short_time).unwrap_or_default()
            );
        }
    }
    Ok(())
}
