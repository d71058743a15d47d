use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use favbadge_core::{FavError, FavResult};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::browser::{BrowserDriver, BrowserLauncher, LaunchOptions};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches a local Chrome/Chromium through the DevTools protocol.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    headless: bool,
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
        }
    }
}

impl ChromiumLauncher {
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_head(mut self) -> Self {
        self.headless = false;
        self
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self, options: &LaunchOptions) -> FavResult<ChromiumDriver> {
        let mut builder = BrowserConfig::builder()
            .arg(format!("--lang={}", options.language))
            .arg(format!("--user-agent={}", options.user_agent))
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run");
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        if !self.headless {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|err| FavError::Browser(format!("browser config error: {err}")))?;

        debug!("launching headless browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| FavError::Browser(format!("failed to launch browser: {err}")))?;
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| FavError::Browser(format!("failed to open page: {err}")))?;

        Ok(ChromiumDriver {
            browser,
            page,
            handler,
        })
    }
}

pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromiumDriver {
    async fn wait_for_element(&self, selector: &str) -> Element {
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return element,
                Err(err) => {
                    debug!(selector, "element not ready: {err}");
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> FavResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|err| FavError::Browser(format!("failed to navigate to {url}: {err}")))?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> FavResult<()> {
        let element = self.wait_for_element(selector).await;
        element
            .click()
            .await
            .map_err(|err| FavError::Browser(format!("failed to click {selector}: {err}")))?;
        Ok(())
    }

    async fn read_text(&mut self, selector: &str) -> FavResult<String> {
        let element = self.wait_for_element(selector).await;
        let text = element
            .inner_text()
            .await
            .map_err(|err| FavError::Browser(format!("failed to read text of {selector}: {err}")))?;
        Ok(text.unwrap_or_default())
    }

    async fn read_attribute(&mut self, selector: &str, name: &str) -> FavResult<Option<String>> {
        let element = self.wait_for_element(selector).await;
        element.attribute(name).await.map_err(|err| {
            FavError::Browser(format!("failed to read {name} of {selector}: {err}"))
        })
    }

    async fn close(&mut self) -> FavResult<()> {
        let closed = self
            .browser
            .close()
            .await
            .map_err(|err| FavError::Browser(format!("failed to close browser: {err}")));
        match browser_exit_problem(&self.browser.wait().await) {
            Some(problem) => warn!("{problem}"),
            None => debug!("browser process exited"),
        }
        self.handler.abort();
        closed.map(|_| ())
    }
}

/// Describes a browser teardown that did not end in a clean exit.
fn browser_exit_problem(waited: &io::Result<Option<ExitStatus>>) -> Option<String> {
    match waited {
        Ok(Some(status)) if !status.success() => {
            Some(format!("browser process exited with {status}"))
        }
        Ok(_) => None,
        Err(err) => Some(format!("failed to wait for browser process: {err}")),
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_errors_are_reported() {
        let waited = Err(io::Error::other("no child"));
        let problem = browser_exit_problem(&waited).unwrap();
        assert!(problem.contains("no child"));
    }

    #[test]
    fn already_reaped_browser_is_fine() {
        assert_eq!(browser_exit_problem(&Ok(None)), None);
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_checked() {
        use std::os::unix::process::ExitStatusExt;

        assert_eq!(browser_exit_problem(&Ok(Some(ExitStatus::from_raw(0)))), None);
        assert!(browser_exit_problem(&Ok(Some(ExitStatus::from_raw(1 << 8)))).is_some());
    }
}
