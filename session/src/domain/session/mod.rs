//! Session lifecycle: the manager that owns it and the views that read it.

mod manager;
mod state;
mod view;

pub use manager::SessionManager;
pub use state::{SessionPhase, SessionSnapshot};
pub use view::SessionView;
