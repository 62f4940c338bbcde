//! Tests for the message builder

use super::*;
use crate::error::Error;
use base64::Engine;
use std::io::Write;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn decode(raw: &str) -> String {
    let bytes = base64::engine::general_purpose::STANDARD.decode(raw).unwrap();
    String::from_utf8(bytes).unwrap()
}

fn fields() -> MessageFields {
    MessageFields::new(
        "sender@example.com",
        "recipient@example.com",
        "<div><h1>Testing</h1></div>",
    )
    .subject("Test API Email Send")
}

// ============================================================================
// Field validation
// ============================================================================

#[test]
fn test_required_fields() {
    let mut f = fields();
    f.from = None;
    assert!(matches!(f.validate(), Err(Error::MissingField { ref field }) if field == "from"));

    let mut f = fields();
    f.to = Some("   ".to_string());
    assert!(matches!(f.validate(), Err(Error::MissingField { ref field }) if field == "to"));

    let mut f = fields();
    f.html = None;
    assert!(matches!(f.validate(), Err(Error::MissingField { ref field }) if field == "html"));
}

#[test]
fn test_missing_to_checked_before_attachments() {
    let mut f = fields().attachment(AttachmentDescriptor::default());
    f.to = None;

    let err = f.validate().unwrap_err();
    assert!(matches!(err, Error::MissingField { ref field } if field == "to"));
}

#[test]
fn test_single_recipient_enforced() {
    let mut f = fields();
    f.to = Some("a@example.com, b@example.com".to_string());
    assert!(matches!(
        f.validate(),
        Err(Error::TooManyRecipients { count: 2 })
    ));

    // A trailing comma is not a second recipient
    f.to = Some("a@example.com,".to_string());
    assert_eq!(f.validate().unwrap().to, "a@example.com");

    f.to = Some(",".to_string());
    assert!(matches!(f.validate(), Err(Error::MissingField { .. })));

    // A comma inside a quoted display name does not split the address
    f.to = Some("\"Doe, John\" <john@example.com>".to_string());
    assert_eq!(
        f.validate().unwrap().to,
        "\"Doe, John\" <john@example.com>"
    );

    f.to = Some("\"Doe, John\" <john@example.com>, jane@example.com".to_string());
    assert!(matches!(
        f.validate(),
        Err(Error::TooManyRecipients { count: 2 })
    ));

    f.to = Some("not an address".to_string());
    assert!(matches!(f.validate(), Err(Error::InvalidAddress { ref field, .. }) if field == "to"));
}

#[test]
fn test_optional_fields_passed_through() {
    let validated = fields()
        .cc("cc@example.com")
        .reply_to("reply@example.com")
        .validate()
        .unwrap();

    assert_eq!(validated.subject.as_deref(), Some("Test API Email Send"));
    assert_eq!(validated.cc.as_deref(), Some("cc@example.com"));
    assert_eq!(validated.reply_to.as_deref(), Some("reply@example.com"));
    assert!(validated.bcc.is_none());
    assert!(validated.in_reply_to.is_none());
    assert!(validated.attachments.is_empty());
}

#[test]
fn test_deserialize_camel_case() {
    let f: MessageFields = serde_json::from_value(serde_json::json!({
        "from": "a@example.com",
        "to": "b@example.com",
        "html": "<p>hi</p>",
        "replyTo": "c@example.com",
        "inReplyTo": "<id@example.com>",
        "attachments": [
            {"fileName": "notes.txt", "contents": "hello", "contentType": "text/plain"}
        ]
    }))
    .unwrap();

    assert_eq!(f.reply_to.as_deref(), Some("c@example.com"));
    assert_eq!(f.in_reply_to.as_deref(), Some("<id@example.com>"));
    let attachments = f.attachments.unwrap();
    assert_eq!(attachments[0].file_name.as_deref(), Some("notes.txt"));
    assert_eq!(attachments[0].contents.as_deref(), Some(&b"hello"[..]));
}

#[test]
fn test_attachments_must_be_a_list() {
    let result: std::result::Result<MessageFields, _> = serde_json::from_value(serde_json::json!({
        "from": "a@example.com",
        "to": "b@example.com",
        "html": "<p>hi</p>",
        "attachments": {"fileName": "notes.txt"}
    }));
    assert!(result.is_err());
}

// ============================================================================
// Attachment validation
// ============================================================================

#[test]
fn test_attachment_requires_file_name() {
    let err = AttachmentDescriptor {
        contents: Some("x".into()),
        ..Default::default()
    }
    .validate(0)
    .unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment { index: 0, .. }));
    assert!(err.to_string().contains("fileName"));
}

#[test]
fn test_attachment_requires_contents_or_path() {
    let err = AttachmentDescriptor {
        file_name: Some("a.txt".into()),
        stream_source: Some("https://example.com/a.txt".into()),
        ..Default::default()
    }
    .validate(3)
    .unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment { index: 3, .. }));
    assert!(err.to_string().contains("contents or filePath"));
}

#[test]
fn test_attachment_sources() {
    let inline = AttachmentDescriptor::from_contents("a.txt", "abc").validate(0).unwrap();
    assert_eq!(inline.source, AttachmentSource::Inline("abc".into()));

    let file = AttachmentDescriptor::from_path("a.txt", "/tmp/a.txt").validate(0).unwrap();
    assert_eq!(file.source, AttachmentSource::File("/tmp/a.txt".into()));

    let remote = AttachmentDescriptor::from_path("a.txt", "https://example.com/a.txt")
        .validate(0)
        .unwrap();
    assert_eq!(
        remote.source,
        AttachmentSource::Remote("https://example.com/a.txt".into())
    );

    let streamed = AttachmentDescriptor::from_path("a.txt", "/tmp/a.txt")
        .stream_source("https://example.com/stream")
        .validate(0)
        .unwrap();
    assert_eq!(
        streamed.source,
        AttachmentSource::Remote("https://example.com/stream".into())
    );

    let bad_stream = AttachmentDescriptor::from_path("a.txt", "/tmp/a.txt")
        .stream_source("/not/a/url")
        .validate(0);
    assert!(bad_stream.is_err());
}

#[test]
fn test_attachment_content_type_and_disposition() {
    let a = AttachmentDescriptor::from_contents("a.bin", "x").validate(0).unwrap();
    assert_eq!(a.disposition, Disposition::Attachment);

    let a = AttachmentDescriptor::from_contents("logo.png", "x")
        .content_type("image/png")
        .disposition("INLINE")
        .validate(0)
        .unwrap();
    assert_eq!(a.disposition, Disposition::Inline);

    let err = AttachmentDescriptor::from_contents("a", "x")
        .disposition("sideways")
        .validate(1)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment { index: 1, .. }));

    let err = AttachmentDescriptor::from_contents("a", "x")
        .content_type("not a content type")
        .validate(2)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment { index: 2, .. }));
}

#[test]
fn test_invalid_attachment_index_reported() {
    let f = fields()
        .attachment(AttachmentDescriptor::from_contents("ok.txt", "fine"))
        .attachment(AttachmentDescriptor {
            file_name: Some("broken.txt".into()),
            ..Default::default()
        });

    let err = f.validate().unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment { index: 1, .. }));
}

// ============================================================================
// Composition
// ============================================================================

#[tokio::test]
async fn test_build_html_message() {
    let raw = MessageBuilder::new().build(&fields()).await.unwrap();
    let message = decode(&raw);

    assert!(message.contains("From: sender@example.com"));
    assert!(message.contains("To: recipient@example.com"));
    assert!(message.contains("Subject: Test API Email Send"));
    assert!(message.contains("text/html"));
    assert!(!message.contains("multipart/mixed"));
}

#[tokio::test]
async fn test_build_optional_headers() {
    let f = fields()
        .cc("one@example.com, two@example.com")
        .bcc("hidden@example.com")
        .reply_to("reply@example.com")
        .in_reply_to("<original@example.com>");

    let message = decode(&MessageBuilder::new().build(&f).await.unwrap());

    assert!(message.contains("one@example.com"));
    assert!(message.contains("two@example.com"));
    assert!(message.contains("Bcc: hidden@example.com"));
    assert!(message.contains("Reply-To: reply@example.com"));
    assert!(message.contains("In-Reply-To: <original@example.com>"));
}

#[tokio::test]
async fn test_build_with_text_alternative() {
    let message = decode(
        &MessageBuilder::new()
            .build(&fields().text("plain body"))
            .await
            .unwrap(),
    );
    assert!(message.contains("multipart/alternative"));
    assert!(message.contains("text/plain"));
    assert!(message.contains("plain body"));
}

#[tokio::test]
async fn test_build_with_attachments() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "from disk").unwrap();

    let f = fields()
        .attachment(
            AttachmentDescriptor::from_contents("notes.txt", "inline notes")
                .content_type("text/plain"),
        )
        .attachment(AttachmentDescriptor::from_path(
            "disk.txt",
            file.path().to_string_lossy(),
        ))
        .attachment(
            AttachmentDescriptor::from_contents("logo.png", "png")
                .content_type("image/png")
                .disposition("inline"),
        );

    let message = decode(&MessageBuilder::new().build(&f).await.unwrap());

    assert!(message.contains("multipart/mixed"));
    assert!(message.contains("filename=\"notes.txt\""));
    assert!(message.contains("filename=\"disk.txt\""));
    assert!(message.contains("Content-Disposition: inline"));
    assert!(message.contains("application/octet-stream"));
}

#[tokio::test]
async fn test_build_missing_file() {
    let f = fields().attachment(AttachmentDescriptor::from_path(
        "gone.txt",
        "/nonexistent/dir/gone.txt",
    ));

    let err = MessageBuilder::new().build(&f).await.unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment { index: 0, .. }));
}

#[tokio::test]
async fn test_build_remote_attachment_with_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/report.csv"))
        .and(header("User-Agent", "btag-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a,b\n1,2\n"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let f = fields().attachment(
        AttachmentDescriptor::from_path(
            "report.csv",
            format!("{}/files/report.csv", mock_server.uri()),
        )
        .content_type("text/csv")
        .user_agent("btag-test/1.0"),
    );

    let message = decode(&MessageBuilder::new().build(&f).await.unwrap());
    assert!(message.contains("filename=\"report.csv\""));
}

#[tokio::test]
async fn test_build_remote_attachment_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let f = fields().attachment(AttachmentDescriptor::from_path(
        "missing.csv",
        format!("{}/missing.csv", mock_server.uri()),
    ));

    let err = MessageBuilder::new().build(&f).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn test_build_invalid_address() {
    let f = MessageFields::new("not an address", "b@example.com", "<p>x</p>");
    let err = MessageBuilder::new().build(&f).await.unwrap_err();
    assert!(matches!(err, Error::InvalidAddress { ref field, .. } if field == "from"));
}
