pub mod avatar;
pub mod credential;
pub mod enricher;
pub mod store;
pub mod tailer;
