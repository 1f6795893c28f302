pub mod permissions;
pub mod sender;

pub use permissions::{PermissionGate, PermissionsService, TelegramPermissionGate};
pub use sender::{
    MessageSender, OutgoingMessage, PollRequest, SenderError, SentMessage, SentPoll, TelegramSender,
};
