//! LINE Messaging API: webhook signature checks, webhook event decoding,
//! Flex message documents and the reply call.

pub mod client;
pub mod events;
pub mod flex;
pub mod signature;

pub use client::{LineClient, ReplySender};
pub use events::{Event, EventSource, Events, MessageContent, MessageEvent, decode};
pub use flex::{ReplyMessage, build};
pub use signature::{SIGNATURE_HEADER, verify};
