use anyhow::{anyhow, Result};
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;

use crate::cli::ConfinedCommand;
use crate::roster::{RosterBoard, RosterPoller, RosterService};
use crate::session::AppContext;

use super::{or_dash, require_user, short_time};

impl ConfinedCommand {
    pub async fn execute(self, ctx: &mut AppContext) -> Result<()> {
        let roster = Arc::new(ctx.roster());
        match self {
            ConfinedCommand::Active => active(&roster).await,
            ConfinedCommand::Board { permit } => {
                let permit_id = resolve_permit(ctx, &roster, permit).await?;
                let board = roster.board(&permit_id, Utc::now()).await.inspect_err(|e| {
                    ctx.notifier.error(&format!("Could not load entries: {e}"));
                })?;
                render(&permit_id, &board);
                Ok(())
            }
            ConfinedCommand::CheckIn { permit, worker, role } => {
                let permit_id = resolve_permit(ctx, &roster, permit).await?;
                roster.check_in(&permit_id, &worker, role.into()).await?;
                Ok(())
            }
            ConfinedCommand::CheckOut { entry } => {
                roster.check_out(&entry).await?;
                Ok(())
            }
            ConfinedCommand::Evacuate { permit, yes } => {
                let user = require_user(ctx)?;
                let permit_id = resolve_permit(ctx, &roster, permit).await?;
                if !yes {
                    ctx.notifier
                        .warning(&format!("This orders everyone out of {permit_id}. Re-run with --yes to confirm."));
                    return Err(anyhow!("evacuation not confirmed"));
                }
                roster.evacuate_all(&user, &permit_id).await?;
                Ok(())
            }
            ConfinedCommand::Watch { permit, ticks } => {
                let permit_id = resolve_permit(ctx, &roster, permit).await?;
                watch(roster, permit_id, ctx.poll_interval(), ticks).await
            }
        }
    }
}

async fn active(roster: &RosterService) -> Result<()> {
    let permits = roster.active_permits().await?;
    if permits.is_empty() {
        println!("🕳️  No active confined-space permits");
        return Ok(());
    }
    let selected = roster.selected().await;
    for permit in permits {
        let marker = if selected.as_deref() == Some(permit.id.as_str()) { "👉" } else { "  " };
        println!(
            "   {marker} {:<10} {:<12} {}",
            or_dash(permit.permit_number.as_deref()),
            permit.id,
            or_dash(permit.location_detail.as_deref())
        );
    }
    Ok(())
}

/// Use the given permit, or fall back to the first active one.
async fn resolve_permit(ctx: &AppContext, roster: &RosterService, permit: Option<String>) -> Result<String> {
    if let Some(permit) = permit {
        roster.select(permit.clone()).await;
        return Ok(permit);
    }
    roster.active_permits().await?;
    match roster.selected().await {
        Some(permit) => Ok(permit),
        None => {
            ctx.notifier.warning("No active confined-space permit to work with");
            Err(anyhow!("no active confined-space permit"))
        }
    }
}

async fn watch(
    roster: Arc<RosterService>,
    permit_id: String,
    every: std::time::Duration,
    ticks: Option<u32>,
) -> Result<()> {
    let poller = RosterPoller::spawn(roster, permit_id.clone(), every);
    println!("👀 Watching {permit_id} every {}s (Ctrl-C to stop)", every.as_secs());
    follow(poller.subscribe(), permit_id, ticks, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;
    drop(poller);
    Ok(())
}

/// Render every board update until `stop` resolves, the poller goes away,
/// or `ticks` updates have been shown. Returns the number of updates seen.
async fn follow(
    mut updates: tokio::sync::watch::Receiver<Option<RosterBoard>>,
    permit_id: String,
    ticks: Option<u32>,
    stop: impl Future<Output = ()>,
) -> u32 {
    // One stop future for the whole loop, so a signal between updates is not lost.
    tokio::pin!(stop);
    let mut seen = 0u32;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(board) = updates.borrow_and_update().clone() {
                    render(&permit_id, &board);
                }
                seen += 1;
                if ticks.is_some_and(|limit| seen >= limit) {
                    break;
                }
            }
            _ = &mut stop => break,
        }
    }
    seen
}

fn render(permit_id: &str, board: &RosterBoard) {
    println!();
    println!("🕳️  {permit_id} as of {}", short_time(board.as_of));

    println!("   🧍 Standby ({})", board.standby.len());
    for inside in &board.standby {
        println!(
            "      {:<24} in {:>3} min   [{}]",
            inside.entry.worker_name, inside.minutes_inside, inside.entry.id
        );
    }

    println!("   ⛑️  Entrants inside ({})", board.entrants.len());
    for inside in &board.entrants {
        println!(
            "      {:<24} in {:>3} min {} [{}]",
            inside.entry.worker_name,
            inside.minutes_inside,
            if inside.overdue { "⏰ OVERDUE" } else { "         " },
            inside.entry.id
        );
    }

    println!("   🚪 Logged out ({})", board.logged_out.len());
    for entry in &board.logged_out {
        println!(
            "      {:<24} {:?} out {}",
            entry.worker_name,
            entry.role,
            entry.time_out.map(short_time).unwrap_or_default()
        );
    }

    if board.missing_standby() {
        println!("   ⚠️  Entrants are inside with no standby attendant");
    }
}
