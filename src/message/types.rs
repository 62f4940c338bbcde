//! Message field and attachment types

use crate::error::{Error, Result};
use bytes::Bytes;
use lettre::message::header::ContentType;
use lettre::message::Mailboxes;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Content type used when an attachment does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Fields of an outgoing message.
///
/// Deserializes from the camelCase JSON shape (`replyTo`, `inReplyTo`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFields {
    /// Sender address (required)
    pub from: Option<String>,
    /// Single recipient address (required)
    pub to: Option<String>,
    /// HTML body (required)
    pub html: Option<String>,
    /// Plain-text alternative body
    pub text: Option<String>,
    /// Subject line
    pub subject: Option<String>,
    /// Carbon copy addresses, comma separated
    pub cc: Option<String>,
    /// Blind carbon copy addresses, comma separated
    pub bcc: Option<String>,
    /// Reply-To address
    pub reply_to: Option<String>,
    /// Message-ID this message replies to
    pub in_reply_to: Option<String>,
    /// Attachments
    pub attachments: Option<Vec<AttachmentDescriptor>>,
}

impl MessageFields {
    /// Create fields with the three required values
    pub fn new(from: impl Into<String>, to: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            html: Some(html.into()),
            ..Self::default()
        }
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the plain-text body
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the cc list
    #[must_use]
    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Set the bcc list
    #[must_use]
    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    /// Set the Reply-To address
    #[must_use]
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Set the In-Reply-To message id
    #[must_use]
    pub fn in_reply_to(mut self, id: impl Into<String>) -> Self {
        self.in_reply_to = Some(id.into());
        self
    }

    /// Add an attachment
    #[must_use]
    pub fn attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    /// Check required fields, the recipient count and every attachment
    pub fn validate(&self) -> Result<ValidatedMessage> {
        let from = required("from", self.from.as_deref())?;
        let to = required("to", self.to.as_deref())?;
        let html = required("html", self.html.as_deref())?;

        let to = to.trim_matches(|c: char| c == ',' || c.is_whitespace());
        if to.is_empty() {
            return Err(Error::missing_field("to"));
        }
        let recipients = to.parse::<Mailboxes>().map_err(|e| Error::InvalidAddress {
            field: "to".to_string(),
            message: format!("'{to}': {e}"),
        })?;
        match recipients.iter().count() {
            0 => return Err(Error::missing_field("to")),
            1 => {}
            count => return Err(Error::TooManyRecipients { count }),
        }

        let attachments = self
            .attachments
            .iter()
            .flatten()
            .enumerate()
            .map(|(index, attachment)| attachment.validate(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidatedMessage {
            from: from.to_string(),
            to: to.to_string(),
            html: html.to_string(),
            text: present(self.text.as_deref()),
            subject: present(self.subject.as_deref()),
            cc: present(self.cc.as_deref()),
            bcc: present(self.bcc.as_deref()),
            reply_to: present(self.reply_to.as_deref()),
            in_reply_to: present(self.in_reply_to.as_deref()),
            attachments,
        })
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::missing_field(field))
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(ToString::to_string)
}

/// Message fields after validation
#[derive(Debug, Clone)]
pub struct ValidatedMessage {
    /// Sender address
    pub from: String,
    /// The single recipient
    pub to: String,
    /// HTML body
    pub html: String,
    /// Plain-text alternative body
    pub text: Option<String>,
    /// Subject line
    pub subject: Option<String>,
    /// Carbon-copy addresses, comma separated
    pub cc: Option<String>,
    /// Blind carbon-copy addresses, comma separated
    pub bcc: Option<String>,
    /// Reply-To address
    pub reply_to: Option<String>,
    /// Message-ID this message replies to
    pub in_reply_to: Option<String>,
    /// Attachments in declaration order
    pub attachments: Vec<ValidatedAttachment>,
}

// ============================================================================
// Attachments
// ============================================================================

/// An attachment as supplied by the caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    /// File name shown to the recipient (required)
    pub file_name: Option<String>,
    /// Inline contents
    #[serde(default, deserialize_with = "string_bytes")]
    pub contents: Option<Bytes>,
    /// Local path or `http(s)://` URL of the contents
    pub file_path: Option<String>,
    /// URL to stream the contents from, preferred over `file_path`
    pub stream_source: Option<String>,
    /// MIME type, e.g. `text/plain`
    pub content_type: Option<String>,
    /// `attachment` (default) or `inline`
    pub content_disposition: Option<String>,
    /// User agent for remote fetches
    pub user_agent: Option<String>,
}

fn string_bytes<'de, D>(deserializer: D) -> std::result::Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(Bytes::from))
}

impl AttachmentDescriptor {
    /// Attachment with inline contents
    pub fn from_contents(file_name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            contents: Some(contents.into()),
            ..Self::default()
        }
    }

    /// Attachment read from a path or URL
    pub fn from_path(file_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Set the content type
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the content disposition
    #[must_use]
    pub fn disposition(mut self, disposition: impl Into<String>) -> Self {
        self.content_disposition = Some(disposition.into());
        self
    }

    /// Set a stream source URL
    #[must_use]
    pub fn stream_source(mut self, url: impl Into<String>) -> Self {
        self.stream_source = Some(url.into());
        self
    }

    /// Set the user agent for remote fetches
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Check this attachment; `index` is its position in the list
    pub fn validate(&self, index: usize) -> Result<ValidatedAttachment> {
        let file_name = self
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::attachment(index, "You must include the fileName parameter"))?;

        let source = match (&self.contents, &self.stream_source, &self.file_path) {
            (Some(contents), _, _) => AttachmentSource::Inline(contents.clone()),
            (None, _, None) => {
                return Err(Error::attachment(
                    index,
                    "You must include either the contents or filePath parameter",
                ))
            }
            (None, Some(url), Some(_)) => {
                if !is_remote(url) {
                    return Err(Error::attachment(
                        index,
                        format!("streamSource must be an http(s) URL, got '{url}'"),
                    ));
                }
                AttachmentSource::Remote(url.clone())
            }
            (None, None, Some(path)) if is_remote(path) => AttachmentSource::Remote(path.clone()),
            (None, None, Some(path)) => AttachmentSource::File(PathBuf::from(path)),
        };

        let content_type = self
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let content_type = ContentType::parse(content_type).map_err(|e| {
            Error::attachment(index, format!("invalid content type '{content_type}': {e}"))
        })?;

        let disposition = match self.content_disposition.as_deref() {
            None => Disposition::Attachment,
            Some(value) => Disposition::parse(value).ok_or_else(|| {
                Error::attachment(index, format!("unknown content disposition '{value}'"))
            })?,
        };

        Ok(ValidatedAttachment {
            file_name: file_name.to_string(),
            source,
            content_type,
            disposition,
            user_agent: self.user_agent.clone(),
        })
    }
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Where an attachment's bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Supplied in the descriptor
    Inline(Bytes),
    /// Fetched over HTTP
    Remote(String),
    /// Read from the local filesystem
    File(PathBuf),
}

/// Content-Disposition of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Offered as a download
    #[default]
    Attachment,
    /// Shown in the message body
    Inline,
}

impl Disposition {
    /// Parse `attachment` or `inline`, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "attachment" => Some(Self::Attachment),
            "inline" => Some(Self::Inline),
            _ => None,
        }
    }
}

/// An attachment after validation, ready to be loaded
#[derive(Debug, Clone)]
pub struct ValidatedAttachment {
    /// File name shown to the recipient
    pub file_name: String,
    /// Where the bytes are loaded from
    pub source: AttachmentSource,
    /// MIME type, `application/octet-stream` when not declared
    pub content_type: ContentType,
    /// Attachment or inline
    pub disposition: Disposition,
    /// User agent for remote fetches
    pub user_agent: Option<String>,
}
