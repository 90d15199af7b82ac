pub mod types;
pub mod classification;
pub mod messages;

pub use types::{FieldErrors, RoofdeskError};
pub use classification::ErrorClassification;
pub use messages::{user_message, Locale, MessageKind, UserMessage};
