use std::future::Future;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::config::{Config, USER_AGENT};
use crate::error::{AppError, Result};

/// Fetches fully rendered markup for a profile URL. Implemented by the
/// headless-browser fetcher below; pipeline tests substitute a stub.
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Drives an isolated headless Chromium session per call. No session
/// reuse — a fresh browser fingerprint every time.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    challenge_wait: Duration,
    nav_timeout: Duration,
}

impl BrowserFetcher {
    pub fn new(cfg: &Config) -> Self {
        Self {
            challenge_wait: Duration::from_secs(cfg.challenge_wait_secs),
            nav_timeout: Duration::from_secs(cfg.nav_timeout_secs),
        }
    }

    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>)> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(1920, 1080)
            .args(vec![
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
                "--disable-accelerated-2d-canvas",
                "--disable-gpu",
                // Hides navigator.webdriver and friends from the challenge script
                "--disable-blink-features=AutomationControlled",
            ])
            .build()
            .map_err(AppError::Fetch)?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler must be polled for the CDP connection to make progress.
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    async fn render(&self, page: &Page, url: &str) -> Result<String> {
        page.set_user_agent(USER_AGENT).await?;

        debug!(%url, "navigating");
        tokio::time::timeout(self.nav_timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, AppError>(())
        })
        .await
        .map_err(|_| {
            AppError::Fetch(format!(
                "navigation timed out after {}s",
                self.nav_timeout.as_secs()
            ))
        })??;

        // Let the Cloudflare challenge resolve client-side before capturing.
        debug!(wait_secs = self.challenge_wait.as_secs(), "waiting out bot challenge");
        tokio::time::sleep(self.challenge_wait).await;

        Ok(page.content().await?)
    }
}

impl Fetch for BrowserFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
        async move {
            let (mut browser, handle) = self.launch().await?;

            let result = match browser.new_page("about:blank").await {
                Ok(page) => self.render(&page, url).await,
                Err(e) => Err(AppError::from(e)),
            };

            // Teardown on both paths before returning.
            if let Err(e) = browser.close().await {
                warn!("browser close failed: {e}");
            }
            if let Err(e) = browser.wait().await {
                warn!("browser did not exit cleanly: {e}");
            }
            handle.abort();

            result
        }
    }
}
