pub mod code;
pub mod message;

pub use code::ErrorCode;
pub use message::{InboundMessage, OutboundMessage};
