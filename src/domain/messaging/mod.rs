//! Member-to-member messaging.

mod message;

pub use message::{Folder, Message, MessageStatus, MAX_BODY_CHARS};
