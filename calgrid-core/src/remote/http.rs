//! HTTP client for the remote event service.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{CalGridError, CalGridResult};
use crate::event::{CalendarEvent, RemoteId};
use crate::remote::RemoteEvents;
use crate::remote::protocol::{self, Envelope, EventRecord, EventUpdate, NewEventRecord};

/// `RemoteEvents` over REST with JSON bodies.
#[derive(Clone)]
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpRemote {
    pub fn new(base_url: &str, timeout: Duration) -> CalGridResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| CalGridError::Config(format!("Invalid server URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CalGridError::Config(format!("Invalid server URL '{base_url}'")));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpRemote { http, base_url })
    }

    pub fn from_config(config: &Config) -> CalGridResult<Self> {
        Self::new(&config.server_url, config.request_timeout())
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so a remote id can never spill into another path segment or the query.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Turn a non-success status into `CalGridError::Status`, keeping the body for context.
    async fn check(resp: reqwest::Response) -> CalGridResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(CalGridError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RemoteEvents for HttpRemote {
    /// GET /calendarEvents
    async fn list(&self) -> CalGridResult<Vec<EventRecord>> {
        let url = self.url(&["calendarEvents"]);
        debug!(%url, "listing events");

        let resp = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let body = Self::check(resp).await?.bytes().await?;
        protocol::decode_listing(&body)
    }

    /// POST /calendarEvents/create
    async fn create(&self, event: &CalendarEvent) -> CalGridResult<()> {
        let url = self.url(&["calendarEvents", "create"]);
        debug!(%url, id = %event.id, "creating event");

        let resp = self
            .http
            .post(url)
            .json(&Envelope::new(NewEventRecord::from(event)))
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    /// PUT /calendarEvents/update/:id
    async fn update(&self, update: &EventUpdate) -> CalGridResult<()> {
        let url = self.url(&["calendarEvents", "update", update.id.as_str()]);
        debug!(%url, "updating event");

        let resp = self
            .http
            .put(url)
            .json(&Envelope::new(update))
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }

    /// DELETE /calendarEvents/delete/:id/
    async fn delete(&self, id: &RemoteId) -> CalGridResult<()> {
        let url = self.url(&["calendarEvents", "delete", id.as_str(), ""]);
        debug!(%url, "deleting event");

        let resp = self
            .http
            .delete(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        Self::check(resp).await?;
        Ok(())
    }
}
