//! Notion databases as the records source.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;

use super::traits::RecordSource;
use crate::config::NotionConfig;
use crate::error::IntegrationError;
use crate::period::Window;
use crate::records::{Domain, RawRecord, PROCESSED_PROPERTY};

const NOTION_VERSION: &str = "2022-06-28";
const SERVICE: &str = "Notion";
const PAGE_SIZE: u32 = 100;

pub struct NotionClient {
    http: Client,
    base_url: String,
    token: String,
    activity_db: String,
    exercise_db: String,
    sleep_db: String,
}

impl NotionClient {
    pub fn new(config: &NotionConfig, http: Client) -> Self {
        Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            activity_db: config.activity_database_id.clone(),
            exercise_db: config.exercise_database_id.clone(),
            sleep_db: config.sleep_database_id.clone(),
        }
    }

    fn database_id(&self, domain: Domain) -> Result<&str, IntegrationError> {
        let id = match domain {
            Domain::Activity => &self.activity_db,
            Domain::Exercise => &self.exercise_db,
            Domain::Sleep => &self.sleep_db,
        };
        if id.is_empty() {
            return Err(IntegrationError::NotConfigured(format!(
                "Notion database id for {domain} records"
            )));
        }
        Ok(id)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(%method, %url, "notion request");
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    /// Build the filtered, sorted query body for one page of results.
    pub fn query_body(domain: Domain, window: &Window, cursor: Option<&str>) -> serde_json::Value {
        let date_property = domain.date_property();
        let start = window.start().format("%Y-%m-%d").to_string();
        let end = window.end().format("%Y-%m-%d").to_string();

        let mut body = json!({
            "filter": {
                "and": [
                    { "property": date_property, "date": { "on_or_after": start } },
                    { "property": date_property, "date": { "on_or_before": end } },
                    { "property": PROCESSED_PROPERTY, "checkbox": { "equals": false } },
                ]
            },
            "sorts": [{ "property": date_property, "direction": "ascending" }],
            "page_size": PAGE_SIZE,
        });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        body
    }
}

/// Turn a non-success response into an API error carrying Notion's message.
async fn check(resp: Response) -> Result<serde_json::Value, IntegrationError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| body["message"].as_str().map(str::to_string))
        .unwrap_or(text);

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(IntegrationError::Auth {
            service: SERVICE.to_string(),
            message,
        });
    }
    Err(IntegrationError::Api {
        service: SERVICE.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RecordSource for NotionClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn ping(&self) -> Result<(), IntegrationError> {
        if self.token.is_empty() {
            return Err(IntegrationError::NotConfigured("Notion token".to_string()));
        }

        let database = [Domain::Activity, Domain::Exercise, Domain::Sleep]
            .into_iter()
            .find_map(|domain| self.database_id(domain).ok())
            .ok_or_else(|| IntegrationError::NotConfigured("any Notion database id".to_string()))?;

        let resp = self
            .request(reqwest::Method::GET, &format!("databases/{database}"))
            .send()
            .await?;
        check(resp).await?;
        tracing::info!("Notion connection successful");
        Ok(())
    }

    async fn query_unprocessed(
        &self,
        domain: Domain,
        window: &Window,
    ) -> Result<Vec<RawRecord>, IntegrationError> {
        let database = self.database_id(domain)?;
        let path = format!("databases/{database}/query");

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = Self::query_body(domain, window, cursor.as_deref());
            let resp = self
                .request(reqwest::Method::POST, &path)
                .json(&body)
                .send()
                .await?;
            let page = check(resp).await?;

            let results = page["results"].as_array().ok_or_else(|| {
                IntegrationError::InvalidResponse("query response has no results".to_string())
            })?;

            for result in results {
                let id = result["id"].as_str().ok_or_else(|| {
                    IntegrationError::InvalidResponse("page without id".to_string())
                })?;
                records.push(RawRecord::new(id, result["properties"].clone()));
            }

            cursor = match (page["has_more"].as_bool(), page["next_cursor"].as_str()) {
                (Some(true), Some(next)) => Some(next.to_string()),
                _ => None,
            };
            if cursor.is_none() {
                break;
            }
        }

        tracing::info!(
            %domain,
            count = records.len(),
            start = %window.start(),
            end = %window.end(),
            "found records without calendar events"
        );
        Ok(records)
    }

    async fn set_processed(&self, _domain: Domain, id: &str) -> Result<(), IntegrationError> {
        let body = json!({
            "properties": {
                PROCESSED_PROPERTY: { "checkbox": true }
            }
        });
        let resp = self
            .request(reqwest::Method::PATCH, &format!("pages/{id}"))
            .json(&body)
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }
}
