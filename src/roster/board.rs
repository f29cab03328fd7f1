use chrono::{DateTime, Utc};

use crate::models::{ConfinedSpaceEntry, EntryRole};

/// Whole minutes since `time_in`, rounded down and never negative.
pub fn minutes_inside(now: DateTime<Utc>, time_in: DateTime<Utc>) -> i64 {
    (now - time_in).num_minutes().max(0)
}

/// An entrant still inside after `overdue_after` minutes needs attention.
/// Standby attendants are never overdue.
pub fn is_overdue(entry: &ConfinedSpaceEntry, now: DateTime<Utc>, overdue_after: i64) -> bool {
    entry.role == EntryRole::Entrant && entry.is_inside() && minutes_inside(now, entry.time_in) >= overdue_after
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsideEntry {
    pub entry: ConfinedSpaceEntry,
    pub minutes_inside: i64,
    pub overdue: bool,
}

/// Entry board for one permit as of `now`. Derived on every refresh and never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterBoard {
    pub as_of: DateTime<Utc>,
    pub standby: Vec<InsideEntry>,
    pub entrants: Vec<InsideEntry>,
    pub logged_out: Vec<ConfinedSpaceEntry>,
}

impl RosterBoard {
    pub fn from_entries(entries: Vec<ConfinedSpaceEntry>, now: DateTime<Utc>, overdue_after: i64) -> Self {
        let mut board = RosterBoard {
            as_of: now,
            standby: Vec::new(),
            entrants: Vec::new(),
            logged_out: Vec::new(),
        };

        for entry in entries {
            if !entry.is_inside() {
                board.logged_out.push(entry);
                continue;
            }
            let inside = InsideEntry {
                minutes_inside: minutes_inside(now, entry.time_in),
                overdue: is_overdue(&entry, now, overdue_after),
                entry,
            };
            match inside.entry.role {
                EntryRole::Standby => board.standby.push(inside),
                EntryRole::Entrant => board.entrants.push(inside),
            }
        }

        board.logged_out.sort_by(|a, b| b.time_out.cmp(&a.time_out));
        board
    }

    pub fn inside_count(&self) -> usize {
        self.standby.len() + self.entrants.len()
    }

    pub fn overdue(&self) -> impl Iterator<Item = &InsideEntry> {
        self.entrants.iter().filter(|e| e.overdue)
    }

    /// Entrants are inside with nobody watching the opening.
    pub fn missing_standby(&self) -> bool {
        !self.entrants.is_empty() && self.standby.is_empty()
    }
}
