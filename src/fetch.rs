// src/fetch.rs

use crate::error::{CheckError, Result};
use crate::model::RemoteFile;
use std::io::Read;
use std::time::Duration;

const USER_AGENT: &str = concat!("version-checker/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the target site
pub struct Fetcher {
    agent: ureq::Agent,
    base_url: String,
}

impl Fetcher {
    /// `base_url` gets a trailing `/` if it has none.
    pub fn new(base_url: &str, proxy: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut builder = ureq::AgentBuilder::new().timeout(timeout).user_agent(USER_AGENT);
        if let Some(proxy) = proxy {
            let parsed = ureq::Proxy::new(proxy)
                .map_err(|e| CheckError::Proxy(proxy.to_string(), Box::new(e)))?;
            builder = builder.proxy(parsed);
        }
        Ok(Self {
            agent: builder.build(),
            base_url: normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests the base url; anything but 200 is fatal.
    pub fn check_url(&self) -> Result<Vec<u8>> {
        match self.get(&self.base_url)? {
            (200, body) => Ok(body),
            (status, _) => Err(CheckError::UrlStatus {
                url: self.base_url.clone(),
                status,
            }),
        }
    }

    /// Fetches every path relative to the base url. Paths not answering 200
    /// are skipped.
    pub fn fetch_files(&self, paths: &[String]) -> Result<Vec<RemoteFile>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let url = file_url(&self.base_url, path);
            match self.get(&url)? {
                (200, content) => {
                    tracing::info!(file = %path, bytes = content.len(), "file found on server");
                    files.push(RemoteFile::new(path.as_str(), content));
                }
                (status, _) => {
                    tracing::warn!(file = %path, status, "file not found on server, skipped");
                }
            }
        }
        Ok(files)
    }

    fn get(&self, url: &str) -> Result<(u16, Vec<u8>)> {
        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                tracing::debug!(url, status, status_text = response.status_text(), "non-success status");
                return Ok((status, Vec::new()));
            }
            Err(e) => return Err(CheckError::Http(url.to_string(), Box::new(e))),
        };

        let status = response.status();
        let mut body = Vec::new();
        response.into_reader().read_to_end(&mut body)?;
        Ok((status, body))
    }
}

pub fn normalize_base_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn file_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url, path.trim_start_matches('/'))
}
