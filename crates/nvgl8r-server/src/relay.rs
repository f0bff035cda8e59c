use std::time::Duration;

use anyhow::{Result, bail};
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::config::RelayTarget;

/// Forwards uploads to another nvgl8r server instead of storing them.
pub struct Relay {
    client: reqwest::Client,
    upload_url: String,
}

impl Relay {
    pub fn new(target: &RelayTarget) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            upload_url: format!("http://{}/upload", target),
        })
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }

    /// POST the photo upstream, passing the caller's credentials through.
    pub async fn forward(&self, photo: Bytes, authorization: Option<&str>) -> Result<()> {
        let size = photo.len();
        let mut request = self
            .client
            .post(&self.upload_url)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(photo);
        if let Some(auth) = authorization {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        if response.status() != reqwest::StatusCode::OK {
            bail!("Relay failed with status {}", response.status());
        }

        debug!("Relayed {} bytes to {}", size, self.upload_url);
        Ok(())
    }
}
