mod events;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use events::{CompletionReport, SessionEvent, SessionUpdate};
pub use timer::{CountdownTimer, DelayedAdvance};
pub use view::SessionView;
pub use workflow::SessionLoop;
