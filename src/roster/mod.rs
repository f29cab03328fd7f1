//! Confined-space entry tracking: who is inside which permit, for how long.

pub mod board;
pub mod poller;
pub mod service;

pub use board::{is_overdue, minutes_inside, InsideEntry, RosterBoard};
pub use poller::RosterPoller;
pub use service::RosterService;
