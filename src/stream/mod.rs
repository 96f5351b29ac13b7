pub mod frame;
pub mod payload;
pub mod session;

pub use payload::OutgoingPayload;
pub use session::{SessionHandle, SessionState, StreamSession};
