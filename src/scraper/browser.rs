//! Browser automation using chromiumoxide.

use anyhow::Result;
use chromiumoxide::browser::{Browser as ChromeBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;

use crate::config::ScraperConfig;

/// A launched browser plus the task pumping its CDP event stream.
struct Engine {
    browser: ChromeBrowser,
    handle: tokio::task::JoinHandle<()>,
}

impl Engine {
    /// Launch a new headless browser instance
    async fn launch(width: u32, height: u32) -> Result<Self> {
        // Find Chrome executable
        let chrome_path = if cfg!(target_os = "macos") {
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"
        } else if cfg!(target_os = "windows") {
            "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe"
        } else {
            "google-chrome"
        };

        // Fixed window size: the event page renders conditionally on viewport
        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .no_sandbox()
            .disable_default_args()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .window_size(width, height)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {}", e))?;

        let (browser, mut handler) = ChromeBrowser::launch(config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to launch browser: {}", e))?;

        // Spawn handler task - must keep running for browser to work
        let handle = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => continue, // Don't break on errors
                    None => break,
                }
            }
        });

        // Wait for browser to be ready
        tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;

        Ok(Self { browser, handle })
    }

    async fn shutdown(mut self) {
        let _ = self.browser.close().await;
        self.handle.abort();
    }
}

/// Shared browser session, launched lazily on first use.
///
/// One browser serves the whole process; every extraction call opens its
/// own page on it. The mutex around the optional engine makes the first
/// launch exactly-once even when requests race on it, and lets a handle
/// observed broken be dropped so the next call relaunches.
pub struct PageSession {
    engine: Mutex<Option<Engine>>,
    viewport: (u32, u32),
}

impl PageSession {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            engine: Mutex::new(None),
            viewport: (config.viewport_width, config.viewport_height),
        }
    }

    /// Open a fresh blank page on the shared browser, launching the browser
    /// if this is the first call or the previous handle was discarded.
    pub async fn acquire_page(&self) -> Result<Page> {
        let mut guard = self.engine.lock().await;
        let engine = match guard.take() {
            Some(engine) => engine,
            None => {
                tracing::info!("Launching shared browser instance");
                Engine::launch(self.viewport.0, self.viewport.1).await?
            }
        };

        match engine.browser.new_page("about:blank").await {
            Ok(page) => {
                *guard = Some(engine);
                Ok(page)
            }
            Err(e) => {
                // the handle is likely dead; drop it so the next call relaunches
                engine.shutdown().await;
                Err(anyhow::anyhow!("Failed to create new page: {}", e))
            }
        }
    }

    /// Close the browser and stop its event loop. Idempotent; safe to call
    /// when the browser was never launched.
    pub async fn close(&self) {
        let mut guard = self.engine.lock().await;
        if let Some(engine) = guard.take() {
            tracing::info!("Closing shared browser instance");
            engine.shutdown().await;
        }
    }
}
