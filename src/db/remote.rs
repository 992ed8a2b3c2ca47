use crate::db::models::{Record, UPDATED_AT_FIELD, now_timestamp, prepare_insert, record_id};
use crate::db::query::{Direction, FilterOp, Query, check_field};
use crate::db::store::Store;
use crate::error::HubError;
use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const PREFER_REPRESENTATION: &str = "return=representation";

/// Client for the hosted data service's REST dialect (`/rest/v1/{table}?col=eq.v`).
#[derive(Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base: Url,
}

impl RemoteStore {
    /// `base` is the project root, e.g. `https://project.example.co/`.
    pub fn new(base: Url, api_key: &str, timeout: Duration) -> Result<Self, HubError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| HubError::Validation("remote api key is not a valid header".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| HubError::Validation("remote api key is not a valid header".into()))?;
        headers.insert("apikey", key);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .user_agent(concat!("point-art-hub/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { client, base })
    }

    pub fn table_url(&self, table: &str) -> Result<Url, HubError> {
        Ok(self.base.join(&format!("rest/v1/{}", check_field(table)?))?)
    }

    /// Full select URL: filters, `order=` and `limit=` in the service's query syntax.
    pub fn select_url(&self, query: &Query) -> Result<Url, HubError> {
        query.check()?;
        let mut url = self.table_url(&query.table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            let mut neq_groups = Vec::new();
            for f in &query.filters {
                if f.op == FilterOp::Neq && !f.value.is_null() {
                    neq_groups.push(neq_or_null(&f.field, &f.value));
                } else {
                    pairs.append_pair(&f.field, &filter_param(f.op, &f.value));
                }
            }
            if !neq_groups.is_empty() {
                pairs.append_pair("and", &format!("({})", neq_groups.join(",")));
            }
            if !query.order.is_empty() {
                let order = query
                    .order
                    .iter()
                    .map(|o| {
                        let dir = match o.direction {
                            Direction::Asc => "asc",
                            Direction::Desc => "desc",
                        };
                        format!("{}.{dir}.nullslast", o.field)
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                pairs.append_pair("order", &order);
            }
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    fn key_url(&self, table: &str, key: &str, value: &Value) -> Result<Url, HubError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair(check_field(key)?, &filter_param(FilterOp::Eq, value));
        Ok(url)
    }

    async fn read_rows(resp: reqwest::Response) -> Result<Vec<Record>, HubError> {
        let resp = check_status(resp)?;
        Ok(resp.json::<Vec<Record>>().await?)
    }
}

/// Render one filter as the service's `op.value` operand.
pub fn filter_param(op: FilterOp, value: &Value) -> String {
    if value.is_null() {
        return match op {
            FilterOp::Neq => "not.is.null".to_string(),
            _ => "is.null".to_string(),
        };
    }
    let op = match op {
        FilterOp::Eq => "eq",
        FilterOp::Neq => "neq",
        FilterOp::Gt => "gt",
        FilterOp::Gte => "gte",
        FilterOp::Lt => "lt",
        FilterOp::Lte => "lte",
    };
    match value {
        Value::String(s) => format!("{op}.{s}"),
        other => format!("{op}.{other}"),
    }
}

/// `neq` that also keeps null and missing fields, as the local backends do:
/// `or(col.is.null,col.neq."v")`.
pub fn neq_or_null(field: &str, value: &Value) -> String {
    let operand = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let quoted = operand.replace('\\', "\\\\").replace('"', "\\\"");
    format!("or({field}.is.null,{field}.neq.\"{quoted}\")")
}

/// Map a non-success status to the error taxonomy.
pub fn status_error(status: StatusCode) -> HubError {
    match status {
        StatusCode::UNAUTHORIZED => {
            HubError::Unauthorized("data service rejected the credentials".into())
        }
        StatusCode::FORBIDDEN => HubError::Forbidden("data service denied access".into()),
        StatusCode::CONFLICT => HubError::Conflict("data service reported a conflict".into()),
        StatusCode::NOT_FOUND => HubError::NotFound("data service table".into()),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            HubError::Validation("data service rejected the request".into())
        }
        other => HubError::UpstreamStatus(other),
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, HubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    warn!(%status, url = %resp.url(), "data service returned an error status");
    Err(status_error(status))
}

#[async_trait]
impl Store for RemoteStore {
    fn backend(&self) -> &'static str {
        "remote"
    }

    async fn select(&self, query: &Query) -> Result<Vec<Record>, HubError> {
        let url = self.select_url(query)?;
        debug!(%url, "remote select");
        let resp = self.client.get(url).send().await?;
        Self::read_rows(resp).await
    }

    async fn insert(&self, table: &str, record: Record) -> Result<Record, HubError> {
        let record = prepare_insert(record);
        let resp = self
            .client
            .post(self.table_url(table)?)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&record)
            .send()
            .await?;
        Self::read_rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HubError::Unavailable("insert returned no representation".into()))
    }

    async fn update(
        &self,
        table: &str,
        key: &str,
        value: &Value,
        mut patch: Record,
    ) -> Result<Option<Record>, HubError> {
        // The service patches every match; pin the first match by id.
        let first = self
            .select(&Query::table(table).eq(key, value.clone()).limit(1))
            .await?;
        let Some(id) = first.first().and_then(record_id) else {
            return Ok(None);
        };
        patch.remove("id");
        patch.insert(UPDATED_AT_FIELD.to_string(), Value::String(now_timestamp()));

        let resp = self
            .client
            .patch(self.key_url(table, "id", &Value::String(id))?)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&patch)
            .send()
            .await?;
        Ok(Self::read_rows(resp).await?.into_iter().next())
    }

    async fn delete(&self, table: &str, key: &str, value: &Value) -> Result<u64, HubError> {
        let resp = self
            .client
            .delete(self.key_url(table, key, value)?)
            .header("Prefer", PREFER_REPRESENTATION)
            .send()
            .await?;
        Ok(Self::read_rows(resp).await?.len() as u64)
    }

    async fn clear(&self, table: &str) -> Result<u64, HubError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("id", "not.is.null");
        let resp = self
            .client
            .delete(url)
            .header("Prefer", PREFER_REPRESENTATION)
            .send()
            .await?;
        Ok(Self::read_rows(resp).await?.len() as u64)
    }
}
