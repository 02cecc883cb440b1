//! Google Calendar as the event destination.
//!
//! Two OAuth accounts are supported. Work-activity events go to the work
//! account; every other calendar lives on the personal account.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use tokio::sync::Mutex;

use super::oauth::{self, OAuthConfig, OAuthTokens};
use super::traits::CalendarService;
use crate::config::{CalendarsConfig, GoogleAccountConfig, GoogleConfig};
use crate::error::IntegrationError;
use crate::format::{CalendarSelector, EventPayload, EventSpan};

/// Which OAuth account a calendar belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Account {
    Personal,
    Work,
}

impl Account {
    pub fn for_selector(selector: CalendarSelector) -> Self {
        match selector {
            CalendarSelector::WorkActivity => Account::Work,
            CalendarSelector::PersonalActivity
            | CalendarSelector::Fitness
            | CalendarSelector::NormalWakeUp
            | CalendarSelector::SleepIn => Account::Personal,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Account::Personal => "Google Calendar (personal)",
            Account::Work => "Google Calendar (work)",
        }
    }
}

pub struct GoogleCalendarClient {
    http: Client,
    api_base: String,
    accounts: HashMap<Account, OAuthAccount>,
    calendars: HashMap<CalendarSelector, String>,
}

struct OAuthAccount {
    oauth: OAuthConfig,
    refresh_token: String,
    cached: Mutex<Option<OAuthTokens>>,
}

impl OAuthAccount {
    fn new(account: Account, config: &GoogleAccountConfig, token_url: &str) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        Some(Self {
            oauth: OAuthConfig {
                service_name: account.label().to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                token_url: token_url.to_string(),
            },
            refresh_token: config.refresh_token.clone(),
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, refreshing if expired.
    async fn access_token(&self, http: &Client) -> Result<String, IntegrationError> {
        let mut cached = self.cached.lock().await;
        if let Some(tokens) = cached.as_ref() {
            if !oauth::is_expired(tokens) {
                return Ok(tokens.access_token.clone());
            }
        }

        let refreshed = oauth::refresh_token(http, &self.oauth, &self.refresh_token).await?;
        let access = refreshed.access_token.clone();
        *cached = Some(refreshed);
        Ok(access)
    }
}

impl GoogleCalendarClient {
    pub fn new(google: &GoogleConfig, calendar_ids: &CalendarsConfig, http: Client) -> Self {
        let mut accounts = HashMap::new();
        for (account, config) in [
            (Account::Personal, &google.personal),
            (Account::Work, &google.work),
        ] {
            if let Some(oauth_account) = OAuthAccount::new(account, config, &google.token_url) {
                accounts.insert(account, oauth_account);
            }
        }

        let calendars = CalendarSelector::ALL
            .into_iter()
            .filter_map(|selector| {
                let id = calendar_ids.id_for(selector);
                (!id.is_empty()).then(|| (selector, id.to_string()))
            })
            .collect();

        Self {
            http,
            api_base: google.api_base.trim_end_matches('/').to_string(),
            accounts,
            calendars,
        }
    }

    fn account(&self, account: Account) -> Result<&OAuthAccount, IntegrationError> {
        self.accounts
            .get(&account)
            .ok_or_else(|| {
                IntegrationError::NotConfigured(format!("{} credentials", account.label()))
            })
    }

    fn calendar_id(&self, selector: CalendarSelector) -> Result<&str, IntegrationError> {
        self.calendars
            .get(&selector)
            .map(String::as_str)
            .ok_or_else(|| IntegrationError::NotConfigured(format!("calendar id for {selector}")))
    }

    /// Request body for `events.insert`.
    pub fn event_body(event: &EventPayload) -> serde_json::Value {
        let (start, end) = match &event.span {
            EventSpan::AllDay(date) => {
                let date = date.format("%Y-%m-%d").to_string();
                (json!({ "date": date }), json!({ "date": date }))
            }
            EventSpan::Timed { start, end } => (
                json!({ "dateTime": start.to_rfc3339() }),
                json!({ "dateTime": end.to_rfc3339() }),
            ),
        };

        json!({
            "summary": event.title,
            "description": event.description,
            "start": start,
            "end": end,
        })
    }
}

async fn check(resp: Response, service: &str) -> Result<serde_json::Value, IntegrationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| body["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(text);

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(IntegrationError::Auth {
            service: service.to_string(),
            message,
        });
    }
    Err(IntegrationError::Api {
        service: service.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    fn name(&self) -> &str {
        "Google Calendar"
    }

    async fn ping(&self) -> Result<(), IntegrationError> {
        if self.accounts.is_empty() {
            return Err(IntegrationError::NotConfigured(
                "Google Calendar credentials".to_string(),
            ));
        }

        for account in [Account::Personal, Account::Work] {
            let Ok(oauth_account) = self.account(account) else {
                continue;
            };
            let token = oauth_account.access_token(&self.http).await?;
            let resp = self
                .http
                .get(format!("{}/users/me/calendarList", self.api_base))
                .bearer_auth(&token)
                .send()
                .await?;
            let list = check(resp, account.label()).await?;
            let count = list["items"].as_array().map(Vec::len).unwrap_or(0);
            tracing::info!(
                account = account.label(),
                calendars = count,
                "calendar connection successful"
            );
        }
        Ok(())
    }

    async fn insert_event(
        &self,
        calendar: CalendarSelector,
        event: &EventPayload,
    ) -> Result<String, IntegrationError> {
        let calendar_id = self.calendar_id(calendar)?;
        let account = Account::for_selector(calendar);
        let token = self.account(account)?.access_token(&self.http).await?;

        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(calendar_id)
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&Self::event_body(event))
            .send()
            .await?;
        let created = check(resp, account.label()).await?;

        let event_id = created["id"].as_str().ok_or_else(|| {
            IntegrationError::InvalidResponse("missing event ID in response".to_string())
        })?;
        tracing::info!(%calendar, title = %event.title, "created calendar event");
        Ok(event_id.to_string())
    }
}
