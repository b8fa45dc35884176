//! Slack Web API chat source
//!
//! Resolves the tracked channel by name, fetches its recent history and the
//! workspace user list. History arrives newest-first and is reversed here,
//! so callers always receive an oldest-first batch.

use crate::error::{AdapterError, AdapterResult};
use crate::traits::ChatSource;
use async_trait::async_trait;
use grind_core::{Message, Roster, Timestamp, UserId};
use serde::Deserialize;
use serde_json::Value;

/// Slack Web API base URL
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Default number of history messages fetched per run
pub const DEFAULT_HISTORY_LIMIT: u32 = 200;

const PAGE_SIZE: &str = "200";

/// Chat source backed by the Slack Web API
#[derive(Debug, Clone)]
pub struct SlackSource {
    http: reqwest::Client,
    token: String,
    channel_name: String,
    history_limit: u32,
    base_url: String,
}

impl SlackSource {
    /// Source for `channel_name`, authenticating with a bot token
    pub fn new(token: impl Into<String>, channel_name: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            channel_name: channel_name.into(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            base_url: SLACK_API_BASE.to_string(),
        }
    }

    /// With history limit
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Call a Web API method and check the `ok` flag
    async fn call(&self, method: &str, params: &[(&str, &str)]) -> AdapterResult<Value> {
        let url = format!("{}/{}", self.base_url, method);
        let body: Value = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check_ok(method, body)
    }

    /// Call a cursor-paginated method, collecting `key` arrays from every page
    async fn call_paginated(
        &self,
        method: &str,
        params: &[(&str, &str)],
        key: &str,
    ) -> AdapterResult<Vec<Value>> {
        let mut items = Vec::new();
        let mut cursor = String::new();
        loop {
            let body = {
                let mut page_params = params.to_vec();
                page_params.push(("limit", PAGE_SIZE));
                if !cursor.is_empty() {
                    page_params.push(("cursor", cursor.as_str()));
                }
                self.call(method, &page_params).await?
            };
            let page = body
                .get(key)
                .and_then(Value::as_array)
                .ok_or_else(|| AdapterError::Payload(format!("{method}: missing '{key}'")))?;
            items.extend(page.iter().cloned());

            cursor = next_cursor(&body).unwrap_or_default().to_string();
            if cursor.is_empty() {
                return Ok(items);
            }
        }
    }

    /// Channel id for the configured channel name
    async fn channel_id(&self) -> AdapterResult<String> {
        let channels = self
            .call_paginated("conversations.list", &[], "channels")
            .await?;
        find_channel_id(&channels, &self.channel_name)
            .ok_or_else(|| AdapterError::ChannelNotFound(self.channel_name.clone()))
    }
}

#[async_trait]
impl ChatSource for SlackSource {
    async fn roster(&self) -> AdapterResult<Roster> {
        let members = self.call_paginated("users.list", &[], "members").await?;
        let roster = parse_members(&members);
        tracing::debug!("Fetched roster of {} users", roster.len());
        Ok(roster)
    }

    async fn batch(&self) -> AdapterResult<Vec<Message>> {
        let channel = self.channel_id().await?;
        let limit = self.history_limit.to_string();
        let body = self
            .call(
                "conversations.history",
                &[("channel", channel.as_str()), ("limit", limit.as_str())],
            )
            .await?;
        let batch = parse_history(&body)?;
        tracing::info!(
            "Fetched {} messages from #{}",
            batch.len(),
            self.channel_name
        );
        Ok(batch)
    }
}

fn check_ok(method: &str, body: Value) -> AdapterResult<Value> {
    if body.get("ok").and_then(Value::as_bool) == Some(true) {
        Ok(body)
    } else {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Err(AdapterError::api("slack", method, error))
    }
}

fn next_cursor(body: &Value) -> Option<&str> {
    body.get("response_metadata")?
        .get("next_cursor")?
        .as_str()
}

/// Id of the channel named `name`
#[must_use]
pub fn find_channel_id(channels: &[Value], name: &str) -> Option<String> {
    channels
        .iter()
        .filter_map(|raw| Channel::deserialize(raw).ok())
        .find(|c| c.name == name)
        .map(|c| c.id)
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Member {
    id: Option<String>,
    name: Option<String>,
    profile: Profile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Profile {
    first_name: Option<String>,
    last_name: Option<String>,
    real_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryPage {
    messages: Vec<HistoryMessage>,
}

#[derive(Debug, Deserialize)]
struct HistoryMessage {
    user: Option<String>,
    subtype: Option<String>,
    ts: Option<String>,
    #[serde(default)]
    text: String,
}

/// Build roster from `users.list` members
///
/// Name is `first_name + " " + last_name`, kept exactly as joined so keys
/// match snapshots written by earlier runs. When both parts are empty it
/// falls back to `real_name`, the account name, then the user id.
/// Members without an id are ignored.
#[must_use]
pub fn parse_members(members: &[Value]) -> Roster {
    let mut roster = Roster::new();
    for raw in members {
        let member = match Member::deserialize(raw) {
            Ok(member) => member,
            Err(e) => {
                tracing::warn!("Ignoring malformed member entry: {}", e);
                continue;
            }
        };
        let Some(id) = member.id.as_deref() else {
            continue;
        };
        roster.insert(UserId::new(id), display_name(&member, id));
    }
    roster
}

fn display_name(member: &Member, id: &str) -> String {
    let profile = &member.profile;
    let first = profile.first_name.as_deref().unwrap_or_default();
    let last = profile.last_name.as_deref().unwrap_or_default();
    if !first.is_empty() || !last.is_empty() {
        return format!("{first} {last}");
    }
    [profile.real_name.as_deref(), member.name.as_deref()]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or(id)
        .to_string()
}

/// Messages from a `conversations.history` response, oldest first
///
/// Entries without a `user` (channel joins, bot posts) are skipped.
///
/// # Errors
/// `AdapterError::Payload` if `messages` is missing or a `ts` is malformed
pub fn parse_history(body: &Value) -> AdapterResult<Vec<Message>> {
    let page = HistoryPage::deserialize(body)
        .map_err(|e| AdapterError::Payload(format!("conversations.history: {e}")))?;

    let mut batch = Vec::with_capacity(page.messages.len());
    for raw in page.messages.into_iter().rev() {
        let Some(user) = raw.user else {
            tracing::debug!("Skipping message without user: {:?}", raw.subtype);
            continue;
        };
        let ts: Timestamp = raw
            .ts
            .as_deref()
            .ok_or_else(|| AdapterError::Payload(format!("message by {user} has no ts")))?
            .parse()
            .map_err(|e| AdapterError::Payload(format!("message by {user}: {e}")))?;
        batch.push(Message::new(user.as_str(), raw.text.as_str(), ts));
    }
    Ok(batch)
}
