//! Request dispatcher
//!
//! [`BtagClient`] turns `(endpoint, params)` into signed API calls and follows
//! cursor pagination.
//!
//! # Overview
//!
//! Each pass runs the same stages:
//! 1. Validate the parameters (no network on failure)
//! 2. Resolve the HTTP method for the endpoint
//! 3. Resolve the session and sign its cursor-augmented parameters
//! 4. Dispatch through the [`Transport`]
//! 5. Interpret the response envelope and record the paging cursors
//!
//! With [`RequestOptions::get_all_results`] set, another pass is issued after
//! [`ClientConfig::page_delay`] for as long as the cursor is short of the
//! total. Pages of one query are strictly sequential.

mod types;

pub use types::{resolve_method, Page, SendMessage, SEND_ENDPOINT};

use crate::auth::{canonical_query, Signer};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, HttpTransport, Transport};
use crate::message::{MessageBuilder, MessageFields};
use crate::session::{Fingerprint, SessionCache, SharedSession};
use crate::types::{Credentials, Params, RequestOptions};
use crate::validate::validate_params;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Client for the Bananatag API
pub struct BtagClient {
    signer: Signer,
    config: ClientConfig,
    sessions: SessionCache,
    transport: Arc<dyn Transport>,
    messages: MessageBuilder,
}

/// Loop state carried between pages of one query
struct PageLoop {
    params: Params,
    options: RequestOptions,
    /// Held for the whole fetch so the entry cannot be evicted between pages
    session: Option<SharedSession>,
    pages: usize,
}

impl BtagClient {
    /// Create a client with the default configuration
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        Self::with_config(Credentials::new(id, key)?, ClientConfig::default())
    }

    /// Create a client from `BTAG_AUTH_ID`, `BTAG_ACCESS_KEY` and `BTAG_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::with_config(Credentials::from_env()?, ClientConfig::from_env())
    }

    /// Create a client with a custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        let messages = MessageBuilder::with_client(transport.inner().clone());
        Ok(Self::assemble(credentials, config, Arc::new(transport), messages))
    }

    /// Create a client that sends through the given transport
    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self::assemble(credentials, config, transport, MessageBuilder::new())
    }

    fn assemble(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        messages: MessageBuilder,
    ) -> Self {
        let sessions = SessionCache::new(config.base_url.clone(), config.session.clone());
        Self {
            signer: Signer::new(credentials),
            config,
            sessions,
            transport,
            messages,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the session cache
    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Get the message builder
    pub fn message_builder(&self) -> &MessageBuilder {
        &self.messages
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Fetch one page of `endpoint`
    pub async fn request(&self, endpoint: &str, params: &Params) -> Result<Page> {
        self.dispatch(endpoint, params).await
    }

    /// Fetch pages of `endpoint` as a stream.
    ///
    /// Yields a single page unless `options.get_all_results` is set. The
    /// stream ends after the last page, after the first error, or once
    /// `options.cancel` is cancelled.
    pub fn request_pages<'a>(
        &'a self,
        endpoint: &'a str,
        params: Params,
        options: RequestOptions,
    ) -> impl Stream<Item = Result<Page>> + 'a {
        let state = PageLoop {
            params,
            options,
            session: None,
            pages: 0,
        };

        stream::unfold(Some(state), move |state| async move {
            let Some(mut state) = state else {
                return None;
            };

            if state.options.is_cancelled() {
                debug!(endpoint, pages = state.pages, "Pagination cancelled");
                return None;
            }

            let session = if let Some(session) = state.session.clone() {
                if !self.wait_page_delay(&state.options).await {
                    debug!(endpoint, pages = state.pages, "Pagination cancelled");
                    return None;
                }
                session
            } else {
                if let Err(e) = validate_params(&state.params) {
                    return Some((Err(e), None));
                }
                let session = self.sessions.resolve(endpoint, &state.params).await;
                state.session = Some(Arc::clone(&session));
                session
            };

            match self.dispatch_with(&session, endpoint).await {
                Ok(page) => {
                    state.pages += 1;
                    let next = if state.options.get_all_results && page.has_more() {
                        debug!(
                            endpoint,
                            next = ?page.next,
                            total = ?page.total,
                            delay_ms = self.config.page_delay.as_millis() as u64,
                            "Scheduling next page"
                        );
                        Some(state)
                    } else {
                        if state.options.get_all_results {
                            info!(endpoint, pages = state.pages, "Fetched all pages");
                        }
                        None
                    };
                    Some((Ok(page), next))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Fetch pages and collect them, failing on the first error
    pub async fn fetch_all(
        &self,
        endpoint: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Vec<Page>> {
        self.request_pages(endpoint, params, options)
            .try_collect()
            .await
    }

    /// Fetch pages, handing each to `on_page` as it arrives.
    ///
    /// Returns the number of pages delivered.
    pub async fn request_each<F>(
        &self,
        endpoint: &str,
        params: Params,
        options: RequestOptions,
        mut on_page: F,
    ) -> Result<usize>
    where
        F: FnMut(&Page),
    {
        let pages = self.request_pages(endpoint, params, options);
        futures::pin_mut!(pages);

        let mut count = 0;
        while let Some(page) = pages.next().await {
            on_page(&page?);
            count += 1;
        }
        Ok(count)
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Build a message and return it base64-encoded
    pub async fn build_message(&self, fields: &MessageFields) -> Result<String> {
        self.messages.build(fields).await
    }

    /// Submit an encoded message for sending
    pub async fn send_message(&self, message: &SendMessage) -> Result<Page> {
        self.request(SEND_ENDPOINT, &message.to_params()).await
    }

    /// Build a message from `fields` and submit it, sending as `fields.from`
    pub async fn build_and_send(&self, fields: &MessageFields, track: bool) -> Result<Page> {
        let raw = self.build_message(fields).await?;
        let sender = fields
            .from
            .clone()
            .ok_or_else(|| Error::missing_field("from"))?;
        self.send_message(&SendMessage::new(sender, raw).track(track))
            .await
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// One validate → sign → send → interpret pass
    async fn dispatch(&self, endpoint: &str, params: &Params) -> Result<Page> {
        validate_params(params)?;
        let session = self.sessions.resolve(endpoint, params).await;
        self.dispatch_with(&session, endpoint).await
    }

    /// Sign, send and interpret one page of an already resolved session
    async fn dispatch_with(&self, session: &SharedSession, endpoint: &str) -> Result<Page> {
        let method = resolve_method(endpoint);

        let (request, fingerprint): (ApiRequest, Fingerprint) = {
            let mut entry = session.write().await;
            let query = canonical_query(&entry.effective_params());
            let authorization = self.signer.sign_query(&query)?;
            entry.signature = Some(authorization.clone());

            debug!(
                %method,
                endpoint,
                fingerprint = %entry.fingerprint,
                cursor = entry.next,
                "Dispatching request"
            );

            (
                ApiRequest {
                    method,
                    url: entry.url.clone(),
                    query,
                    authorization,
                    timeout: self.config.timeout,
                },
                entry.fingerprint.clone(),
            )
        };

        let body = self.transport.send(request).await?;

        let mut page = Page::from_body(body, fingerprint).map_err(|e| {
            if let Error::Api { code, .. } = &e {
                warn!(endpoint, code, "API returned an error: {e}");
            }
            e
        })?;

        if let Some(paging) = &page.paging {
            let mut entry = session.write().await;
            entry.apply_paging(paging);
            // The stored total survives responses that omit it
            page.total = entry.total;
        }

        Ok(page)
    }

    /// Sleep for the page delay. Returns false if cancelled first.
    async fn wait_page_delay(&self, options: &RequestOptions) -> bool {
        let delay = tokio::time::sleep(self.config.page_delay);
        match &options.cancel {
            Some(token) => {
                tokio::select! {
                    () = token.cancelled() => false,
                    () = delay => true,
                }
            }
            None => {
                delay.await;
                true
            }
        }
    }
}

impl std::fmt::Debug for BtagClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BtagClient")
            .field("auth_id", &self.signer.auth_id())
            .field("config", &self.config)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}
