//! Messaging handlers.

mod list_messages;
mod send_message;
mod update_message;

#[cfg(test)]
mod test_support;

pub use list_messages::{
    GetThreadHandler, GetThreadQuery, ListMessagesHandler, ListMessagesQuery, UnreadCountHandler,
    UnreadCountQuery,
};
pub use send_message::{SendMessageCommand, SendMessageHandler};
pub use update_message::{MessageAction, UpdateMessageCommand, UpdateMessageHandler};
