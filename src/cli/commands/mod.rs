use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use crate::models::User;
use crate::session::AppContext;

pub mod account;
pub mod bbs;
pub mod cert;
pub mod confined;
pub mod course;
pub mod equipment;
pub mod incident;
pub mod permit;

/// The logged-in user, or a notification telling them to log in.
pub(crate) fn require_user(ctx: &AppContext) -> Result<User> {
    match ctx.require_user() {
        Ok(user) => Ok(user.clone()),
        Err(e) => {
            ctx.notifier.error("Not logged in. Run 'safetyos login' first.");
            Err(e.into())
        }
    }
}

/// Local wall-clock time for tables.
pub(crate) fn short_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d %b %H:%M").to_string()
}

pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
