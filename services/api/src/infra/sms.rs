use anyhow::{Context as _, bail};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::NextSmsConfig;
use crate::domain::repository::SmsSender;

/// NextSMS single-text gateway client.
#[derive(Clone)]
pub struct NextSmsClient {
    http: reqwest::Client,
    url: String,
    username: String,
    password: String,
    sender: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
    reference: String,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<serde_json::Value>,
}

impl NextSmsClient {
    pub fn new(http: reqwest::Client, config: &NextSmsConfig) -> Self {
        Self {
            http,
            url: config.url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            sender: config.sender.clone(),
        }
    }
}

/// The gateway expects the number without its leading `+`.
pub fn normalize_phone_number(phone_number: &str) -> &str {
    phone_number.strip_prefix('+').unwrap_or(phone_number)
}

impl SmsSender for NextSmsClient {
    async fn send(&self, message: &str, phone_number: &str) -> anyhow::Result<()> {
        let reference = Uuid::new_v4().to_string();
        let body = SendRequest {
            from: &self.sender,
            to: normalize_phone_number(phone_number),
            text: message,
            reference: reference.clone(),
        };
        let resp = self
            .http
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .context("send sms request")?;

        let status = resp.status();
        if status != StatusCode::OK {
            bail!("sms gateway responded with {status}");
        }
        let parsed: SendResponse = resp.json().await.context("decode sms gateway response")?;
        tracing::info!(%reference, messages = parsed.messages.len(), "sms accepted by gateway");
        Ok(())
    }
}
