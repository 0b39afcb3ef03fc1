//! reqwest-backed [`ControllerPort`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use pagepilot_core_types::{CommandReport, UserProfile};

use crate::errors::ControllerError;
use crate::model::{decode_reply, ControllerReply, NextCommandRequest, StateReport};
use crate::port::ControllerPort;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpController {
    base: Url,
    http: Client,
}

impl HttpController {
    pub fn new(base_url: &str) -> Result<Self, ControllerError> {
        let base = Url::parse(base_url)
            .map_err(|err| ControllerError::Malformed(format!("base url: {err}")))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ControllerError::Unreachable(err.to_string()))?;
        Ok(Self { base, http })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ControllerError> {
        self.base
            .join(path)
            .map_err(|err| ControllerError::Malformed(format!("endpoint {path}: {err}")))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ControllerError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ControllerError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl ControllerPort for HttpController {
    async fn check_status(&self) -> Result<(), ControllerError> {
        let url = self.endpoint("status")?;
        let response = self.http.get(url).send().await?;
        Self::check(response).await?;
        debug!("controller reachable");
        Ok(())
    }

    async fn generate_profile(&self) -> Result<UserProfile, ControllerError> {
        let url = self.endpoint("generate-email")?;
        let response = Self::check(self.http.post(url).send().await?).await?;
        let profile = response
            .json::<UserProfile>()
            .await
            .map_err(|err| ControllerError::Malformed(err.to_string()))?;
        debug!(email = %profile.email, "profile generated");
        Ok(profile)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ControllerError> {
        let url = self.endpoint("get-user-data")?;
        let response = Self::check(self.http.get(url).send().await?).await?;
        response
            .json::<UserProfile>()
            .await
            .map_err(|err| ControllerError::Malformed(err.to_string()))
    }

    async fn report_state(&self, report: &StateReport) -> Result<(), ControllerError> {
        let url = self.endpoint("report-state")?;
        Self::check(self.http.post(url).json(report).send().await?).await?;
        trace!(url = %report.snapshot.url, "page state reported");
        Ok(())
    }

    async fn next_command(
        &self,
        request: &NextCommandRequest,
    ) -> Result<ControllerReply, ControllerError> {
        let url = self.endpoint("get-next-command")?;
        let response = Self::check(self.http.post(url).json(request).send().await?).await?;
        let text = response
            .text()
            .await
            .map_err(|err| ControllerError::Unreachable(err.to_string()))?;
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(&text)
                    .map_err(|err| ControllerError::Malformed(err.to_string()))?,
            )
        };
        Ok(decode_reply(body))
    }

    async fn report_result(&self, report: &CommandReport) -> Result<(), ControllerError> {
        let url = self.endpoint("report-result")?;
        Self::check(self.http.post(url).json(report).send().await?).await?;
        debug!(
            command = %report.command_id,
            success = report.success,
            "command result reported"
        );
        Ok(())
    }

    async fn report_raw_result(&self, body: Value) -> Result<(), ControllerError> {
        let url = self.endpoint("report-result")?;
        Self::check(self.http.post(url).json(&body).send().await?).await?;
        Ok(())
    }
}
