//! Domain entities - Core business objects with no external dependencies

pub mod activation;
pub mod message;
pub mod turn;
pub mod user;

pub use activation::{ActivationRule, ChatMode};
pub use message::{Content, Message, MessageType};
pub use turn::TurnContext;
pub use user::User;
