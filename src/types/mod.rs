//! Wire types shared by the client and higher-level operations.

pub mod completion;
pub mod message;

pub use completion::{ChatCompletion, Choice, ChoiceMessage};
pub use message::{Message, MessageRole};
