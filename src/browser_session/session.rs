//! One browser tab per pool worker
//!
//! Each tab owns a Fetch-domain interceptor task that aborts filtered
//! resources and answers proxy authentication challenges. The task lives
//! exactly as long as the session.

use std::future::Future;

use anyhow::{Context, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::fetch::{
    AuthChallengeResponse, AuthChallengeResponseResponse, ContinueRequestParams,
    ContinueWithAuthParams, EnableParams, EventAuthRequired, EventRequestPaused, FailRequestParams,
    RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::ErrorReason;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::proxy::ProxyCredentials;
use super::resource_filter::{ResourceClass, ResourcePredicate};
use crate::fetch_engine::PageSession;
use crate::utils::constants::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// A Chromium tab driven over CDP
pub struct ChromiumSession {
    page: Page,
    interceptor: JoinHandle<()>,
}

impl ChromiumSession {
    /// Open a blank tab with the fixed viewport and request interception
    /// installed.
    ///
    /// # Errors
    /// Fails if the tab cannot be created or a CDP command is rejected.
    pub async fn open(
        browser: &Browser,
        filter: ResourcePredicate,
        proxy: Option<&ProxyCredentials>,
    ) -> Result<Self> {
        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser tab")?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            VIEWPORT_WIDTH,
            VIEWPORT_HEIGHT,
            1.0,
            false,
        ))
        .await
        .context("Failed to set viewport")?;

        // Listeners first so no paused request slips past before the loop runs
        let mut paused = page
            .event_listener::<EventRequestPaused>()
            .await
            .context("Failed to subscribe to paused requests")?;
        let mut auth_required = page
            .event_listener::<EventAuthRequired>()
            .await
            .context("Failed to subscribe to auth challenges")?;

        let credentials = proxy.and_then(ProxyCredentials::auth);

        page.execute(
            EnableParams::builder()
                .pattern(
                    RequestPattern::builder()
                        .url_pattern("*")
                        .request_stage(RequestStage::Request)
                        .build(),
                )
                .handle_auth_requests(credentials.is_some())
                .build(),
        )
        .await
        .context("Failed to enable request interception")?;

        let interceptor_page = page.clone();
        let interceptor = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = paused.next() => {
                        let Some(event) = event else { break };
                        let class = ResourceClass::from(&event.resource_type);
                        let outcome = if filter(class) {
                            interceptor_page
                                .execute(ContinueRequestParams::new(event.request_id.clone()))
                                .await
                                .map(|_| ())
                        } else {
                            trace!("Aborting {class:?} request {}", event.request.url);
                            interceptor_page
                                .execute(FailRequestParams::new(
                                    event.request_id.clone(),
                                    ErrorReason::BlockedByClient,
                                ))
                                .await
                                .map(|_| ())
                        };
                        if let Err(e) = outcome {
                            trace!("Paused request already gone: {e}");
                        }
                    }
                    event = auth_required.next() => {
                        let Some(event) = event else { break };
                        if let Err(e) = answer_auth(&interceptor_page, &event, credentials.as_ref()).await {
                            warn!("Failed to answer proxy auth challenge: {e:#}");
                        }
                    }
                }
            }
            debug!("Request interceptor stopped");
        });

        Ok(Self { page, interceptor })
    }

    /// Close the tab and stop its interceptor
    pub async fn close(self) {
        self.interceptor.abort();
        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close tab: {e}");
        }
    }
}

async fn answer_auth(
    page: &Page,
    event: &EventAuthRequired,
    credentials: Option<&(String, String)>,
) -> Result<()> {
    let response = match credentials {
        Some((username, password)) => AuthChallengeResponse::builder()
            .response(AuthChallengeResponseResponse::ProvideCredentials)
            .username(username.clone())
            .password(password.clone())
            .build(),
        None => AuthChallengeResponse::builder()
            .response(AuthChallengeResponseResponse::CancelAuth)
            .build(),
    }
    .map_err(|e| anyhow::anyhow!("Invalid auth challenge response: {e}"))?;

    page.execute(ContinueWithAuthParams::new(
        event.request_id.clone(),
        response,
    ))
    .await?;
    Ok(())
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.interceptor.abort();
    }
}

impl PageSession for ChromiumSession {
    fn navigate(&self, url: &str) -> impl Future<Output = Result<()>> + Send {
        let url = url.to_string();
        async move {
            self.page
                .goto(url.as_str())
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(())
        }
    }

    fn wait_until_ready(&self) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            Ok(())
        }
    }

    fn content(&self) -> impl Future<Output = Result<String>> + Send {
        async move {
            self.page
                .content()
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))
        }
    }
}
