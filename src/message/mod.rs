//! Message builder
//!
//! Assembles an outgoing email and its attachments into a single RFC 5322
//! message, base64-encoded for the `raw` field of the send call.
//!
//! All field and attachment checks run before any attachment is read or
//! fetched.

mod builder;
mod types;

pub use builder::MessageBuilder;
pub use types::{
    AttachmentDescriptor, AttachmentSource, Disposition, MessageFields, ValidatedAttachment,
    ValidatedMessage,
};

#[cfg(test)]
mod tests;
