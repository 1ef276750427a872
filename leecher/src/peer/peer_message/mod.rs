pub mod bitfield;
pub mod message;
pub mod request;

pub use bitfield::Bitfield;
pub use message::{Message, MessageId};
pub use request::Request;
