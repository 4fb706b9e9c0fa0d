pub mod notice;
pub mod session;
pub mod state;

pub use notice::Notice;
pub use session::{Progress, Session};
pub use state::SessionState;
