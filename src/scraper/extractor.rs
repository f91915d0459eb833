//! Odds extraction for bookmaker event pages.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::page::Page;
use url::Url;

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::scraper::parsers::RunnerRowParser;
use crate::scraper::{PageSession, BOOKMAKER_HOST};
use crate::types::OddsResponse;

/// Drives a page to an event URL and extracts its runner odds.
pub struct OddsExtractor {
    session: Arc<PageSession>,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl OddsExtractor {
    pub fn new(session: Arc<PageSession>, config: &ScraperConfig) -> Self {
        Self {
            session,
            wait_timeout: Duration::from_secs(config.wait_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Extract runner names and odds for one event.
    ///
    /// All-or-nothing: a classified failure returns no partial rows. Both
    /// URL checks run before any page is opened, so bad input never
    /// touches the browser.
    pub async fn extract(&self, event_url: &str) -> Result<OddsResponse, ScrapeError> {
        let url = Url::parse(event_url)
            .map_err(|_| ScrapeError::InvalidUrl(event_url.to_string()))?;
        if url.host_str() != Some(BOOKMAKER_HOST) {
            return Err(ScrapeError::WrongSite {
                expected: BOOKMAKER_HOST,
            });
        }

        let page = self
            .session
            .acquire_page()
            .await
            .map_err(ScrapeError::Engine)?;

        let result = self.scrape_page(&page, event_url).await;

        // release the page, never the shared browser
        let _ = page.close().await;

        result
    }

    async fn scrape_page(&self, page: &Page, event_url: &str) -> Result<OddsResponse, ScrapeError> {
        tracing::debug!("Navigating to {}", event_url);
        page.goto(event_url)
            .await
            .map_err(|e| ScrapeError::Engine(anyhow::anyhow!("Navigation failed: {}", e)))?;

        self.wait_for_rows(page).await?;

        let html = page
            .content()
            .await
            .map_err(|e| ScrapeError::Engine(anyhow::anyhow!("Failed to get page content: {}", e)))?;

        let horses = RunnerRowParser::parse(&html)?;
        tracing::debug!("Extracted {} runners from {}", horses.len(), event_url);

        Ok(OddsResponse {
            event_url: event_url.to_string(),
            horses,
        })
    }

    /// Poll for the runner-row container until it appears or the wait
    /// budget elapses. Timing out is the signal for events that are in the
    /// past or not offering live odds yet; the two are not distinguished.
    async fn wait_for_rows(&self, page: &Page) -> Result<(), ScrapeError> {
        let deadline = tokio::time::Instant::now() + self.wait_timeout;
        loop {
            if page.find_element(RunnerRowParser::ROW_SELECTOR).await.is_ok() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ScrapeError::EventNotAvailable);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> OddsExtractor {
        let config = ScraperConfig::default();
        OddsExtractor::new(Arc::new(PageSession::new(&config)), &config)
    }

    #[tokio::test]
    async fn malformed_url_fails_before_any_navigation() {
        let err = extractor().extract("not a url").await.unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn relative_url_is_invalid() {
        let err = extractor()
            .extract("horse-racing/event/123")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn foreign_host_fails_before_any_navigation() {
        let err = extractor()
            .extract("https://example.com/horse-racing/event/123")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::WrongSite { .. }));
    }

    #[tokio::test]
    async fn subdomain_of_bookmaker_is_still_the_wrong_site() {
        let err = extractor()
            .extract("https://promo.betmgm.co.uk/horse-racing/event/123")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::WrongSite { .. }));
    }
}
