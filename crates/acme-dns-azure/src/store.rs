//! Azure DNS record set access
//!
//! ## API Reference
//!
//! - Record Sets: https://learn.microsoft.com/rest/api/dns/record-sets
//! - Get:            GET    `{zone}/TXT/{name}?api-version=2018-05-01`
//! - Create/Update:  PUT    `{zone}/TXT/{name}?api-version=2018-05-01`
//! - Delete:         DELETE `{zone}/TXT/{name}?api-version=2018-05-01`

use acme_dns_core::{AccessToken, Error, Result, TxtRecordSet, ZoneStore};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::resource::DnsZoneResourceId;

/// Record set API version
pub const DNS_API_VERSION: &str = "2018-05-01";

/// Maximum length of one TXT character-string
const TXT_CHUNK_LEN: usize = 255;

/// Zone store backed by the Azure Resource Manager DNS API
///
/// Built by lazy initialization once a bearer token is available.
pub struct AzureDnsStore {
    client: reqwest::Client,
    base_url: String,
    resource_id: DnsZoneResourceId,
    zone_name: String,
    /// ⚠️ NEVER log this value
    token: AccessToken,
}

// Custom Debug implementation that hides the access token
impl std::fmt::Debug for AzureDnsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDnsStore")
            .field("base_url", &self.base_url)
            .field("resource_id", &self.resource_id)
            .field("zone_name", &self.zone_name)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl AzureDnsStore {
    /// Create a store for one zone
    ///
    /// # Parameters
    ///
    /// - `client`: HTTP client (timeouts already configured)
    /// - `base_url`: Resource Manager endpoint, without trailing slash
    /// - `resource_id`: Zone resource id
    /// - `zone_name`: Zone apex used to derive record names
    /// - `token`: Bearer token for Resource Manager
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        resource_id: DnsZoneResourceId,
        zone_name: impl Into<String>,
        token: AccessToken,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resource_id,
            zone_name: zone_name.into(),
            token,
        }
    }

    fn record_set_url(&self, name: &str) -> String {
        format!(
            "{}{}/TXT/{}?api-version={}",
            self.base_url,
            self.resource_id.path(),
            name,
            DNS_API_VERSION
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .bearer_auth(self.token.secret())
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider("azure", format!("HTTP request failed: {}", e)))
    }
}

/// Map a non-success Resource Manager response to an error
pub(crate) async fn status_error(response: reqwest::Response, action: &str) -> Error {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Access denied by Azure Resource Manager. Status: {}",
            status
        )),
        404 => Error::not_found(format!("{}: {}", action, error_text)),
        429 => Error::rate_limited(format!(
            "Azure Resource Manager throttled the request. Status: {}",
            status
        )),
        500..=599 => Error::provider(
            "azure",
            format!("Azure server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            "azure",
            format!("{} failed: {} - {}", action, status, error_text),
        ),
    }
}

/// Split a TXT value into character-strings of at most 255 bytes
fn chunk_txt_value(value: &str) -> Vec<String> {
    if value.len() <= TXT_CHUNK_LEN {
        return vec![value.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for c in value.chars() {
        if current.len() + c.len_utf8() > TXT_CHUNK_LEN {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Build the PUT body for a record set
fn record_set_body(record_set: &TxtRecordSet) -> Value {
    let records: Vec<Value> = record_set
        .values
        .iter()
        .map(|value| serde_json::json!({ "value": chunk_txt_value(value) }))
        .collect();

    serde_json::json!({
        "properties": {
            "TTL": record_set.ttl,
            "TXTRecords": records,
        }
    })
}

/// Parse a record set response
fn parse_record_set(name: &str, json: &Value) -> Result<TxtRecordSet> {
    let properties = &json["properties"];

    let ttl = properties["TTL"]
        .as_u64()
        .ok_or_else(|| Error::provider("azure", "Invalid response format: TTL is not a number"))?;

    let values = match properties["TXTRecords"].as_array() {
        Some(records) => records
            .iter()
            .map(|record| {
                record["value"]
                    .as_array()
                    .map(|chunks| chunks.iter().filter_map(Value::as_str).collect::<String>())
                    .ok_or_else(|| {
                        Error::provider("azure", "Invalid response format: TXT value is not an array")
                    })
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(TxtRecordSet {
        name: json["name"].as_str().unwrap_or(name).to_string(),
        ttl: u32::try_from(ttl).unwrap_or(u32::MAX),
        values,
    })
}

#[async_trait]
impl ZoneStore for AzureDnsStore {
    fn zone_name(&self) -> &str {
        &self.zone_name
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<TxtRecordSet>> {
        tracing::debug!("Looking up TXT record set: {}", name);

        let response = self.send(self.client.get(self.record_set_url(name))).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response, "Record set lookup").await);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::provider("azure", format!("Failed to parse response: {}", e)))?;

        parse_record_set(name, &json).map(Some)
    }

    async fn create_or_update_record_set(&self, record_set: &TxtRecordSet) -> Result<()> {
        let request = self
            .client
            .put(self.record_set_url(&record_set.name))
            .json(&record_set_body(record_set));

        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(status_error(response, "Record set update").await);
        }

        tracing::debug!(
            "TXT record set written: {} ({} value(s))",
            record_set.name,
            record_set.values.len()
        );
        Ok(())
    }

    async fn delete_record_set(&self, name: &str) -> Result<()> {
        let response = self
            .send(self.client.delete(self.record_set_url(name)))
            .await?;

        // Already gone counts as deleted
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(status_error(response, "Record set delete").await)
    }

    fn provider_name(&self) -> &'static str {
        "azure"
    }
}
