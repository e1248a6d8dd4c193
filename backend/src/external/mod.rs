//! External API integrations

pub mod document_library;
pub mod mailer;

pub use document_library::DocumentLibraryClient;
pub use mailer::{EmailAttachment, MailerClient, OutgoingEmail};
