//! Who is logged in, and the explicit context handed to every command.

pub mod context;
pub mod store;

pub use context::AppContext;
pub use store::{SessionStore, SESSION_KEY};
