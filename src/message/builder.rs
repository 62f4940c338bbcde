//! MIME composition

use super::types::{
    AttachmentSource, Disposition, MessageFields, ValidatedAttachment, ValidatedMessage,
};
use crate::error::{Error, Result};
use base64::Engine;
use bytes::Bytes;
use lettre::message::{Attachment, Mailbox, Mailboxes, MultiPart, SinglePart};
use lettre::Message;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

/// Builds encoded messages for the send call
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    http: Client,
}

impl MessageBuilder {
    /// Create a builder with its own HTTP client for remote attachments
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Create a builder that fetches remote attachments with `client`
    pub fn with_client(client: Client) -> Self {
        Self { http: client }
    }

    /// Compose and serialize a message, returning it base64-encoded
    pub async fn build(&self, fields: &MessageFields) -> Result<String> {
        let message = self.compose(fields).await?;
        let raw = message.formatted();
        debug!(bytes = raw.len(), "Built message");
        Ok(base64::engine::general_purpose::STANDARD.encode(raw))
    }

    /// Validate `fields`, load attachments and compose the message
    pub async fn compose(&self, fields: &MessageFields) -> Result<Message> {
        let validated = fields.validate()?;

        let mut parts = Vec::with_capacity(validated.attachments.len());
        for (index, attachment) in validated.attachments.iter().enumerate() {
            let body = self.load(index, attachment).await?;
            parts.push(attachment_part(attachment, body));
        }

        assemble(&validated, parts)
    }

    /// Read an attachment's bytes from its source
    async fn load(&self, index: usize, attachment: &ValidatedAttachment) -> Result<Bytes> {
        match &attachment.source {
            AttachmentSource::Inline(bytes) => Ok(bytes.clone()),
            AttachmentSource::File(path) => tokio::fs::read(path).await.map(Bytes::from).map_err(|e| {
                Error::attachment(index, format!("cannot read {}: {e}", path.display()))
            }),
            AttachmentSource::Remote(url) => {
                debug!(url, "Fetching attachment");
                let mut req = self.http.get(url);
                if let Some(agent) = &attachment.user_agent {
                    req = req.header(USER_AGENT, agent);
                }
                let response = req.send().await?.error_for_status()?;
                Ok(response.bytes().await?)
            }
        }
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn attachment_part(attachment: &ValidatedAttachment, body: Bytes) -> SinglePart {
    let builder = match attachment.disposition {
        Disposition::Attachment => Attachment::new(attachment.file_name.clone()),
        Disposition::Inline => Attachment::new_inline(attachment.file_name.clone()),
    };
    builder.body(body.to_vec(), attachment.content_type.clone())
}

fn assemble(message: &ValidatedMessage, attachments: Vec<SinglePart>) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mailbox("from", &message.from)?)
        .to(mailbox("to", &message.to)?);

    if let Some(subject) = &message.subject {
        builder = builder.subject(subject.clone());
    }
    if let Some(cc) = &message.cc {
        for addr in mailboxes("cc", cc)? {
            builder = builder.cc(addr);
        }
    }
    if let Some(bcc) = &message.bcc {
        for addr in mailboxes("bcc", bcc)? {
            builder = builder.bcc(addr);
        }
        // Bcc stays in the serialized message
        builder = builder.keep_bcc();
    }
    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(mailbox("replyTo", reply_to)?);
    }
    if let Some(id) = &message.in_reply_to {
        builder = builder.in_reply_to(id.clone());
    }

    let html = message.html.clone();
    let result = match (&message.text, attachments.is_empty()) {
        (None, true) => builder.singlepart(SinglePart::html(html)),
        (Some(text), true) => {
            builder.multipart(MultiPart::alternative_plain_html(text.clone(), html))
        }
        (text, false) => {
            let mut mixed = match text {
                Some(text) => MultiPart::mixed()
                    .multipart(MultiPart::alternative_plain_html(text.clone(), html)),
                None => MultiPart::mixed().singlepart(SinglePart::html(html)),
            };
            for part in attachments {
                mixed = mixed.singlepart(part);
            }
            builder.multipart(mixed)
        }
    };

    result.map_err(|e| Error::message_build(e.to_string()))
}

fn mailbox(field: &str, value: &str) -> Result<Mailbox> {
    value.trim().parse::<Mailbox>().map_err(|e| Error::InvalidAddress {
        field: field.to_string(),
        message: format!("'{value}': {e}"),
    })
}

fn mailboxes(field: &str, value: &str) -> Result<Mailboxes> {
    value.trim().parse::<Mailboxes>().map_err(|e| Error::InvalidAddress {
        field: field.to_string(),
        message: format!("'{value}': {e}"),
    })
}
