// # Cloudflare DNS Zone Provider
//
// This crate provides a Cloudflare zone implementation for ACME DNS-01
// challenge provisioning.
//
// ## Behavior
//
// - Nothing touches the network until the first zone operation; lazy
//   initialization then verifies the token and reads the zone name
// - Cloudflare stores one DNS record per TXT value. The "record set" at a
//   name is the list of TXT records sharing that fully qualified name
// - Writes only ever add records; records carrying other values at the name
//   are left alone, even if they appeared after the set was read
// - Reconciliation (validate-first, read-before-write, additive merge) is
//   shared with every other provider through `RecordSetZone`
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Specific error handling for HTTP status codes (401, 403, 404, 429, 5xx)
// - ❌ NO retry logic (owned by the caller)
// - ❌ NO caching of records between calls
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Zone Details: GET `/zones/:zone_id`
// - List DNS Records: GET `/zones/:zone_id/dns_records?type=TXT&name=...`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Delete DNS Record: DELETE `/zones/:zone_id/dns_records/:record_id`

use acme_dns_core::naming::fqdn;
use acme_dns_core::{
    DnsZone, DnsZoneFactory, Error, LazyDnsZone, RecordSetZone, Result, TxtRecordSet, ZoneConfig,
    ZoneFactory, ZoneInitializer, ZoneStore,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for record listings
const RECORDS_PER_PAGE: &str = "100";

/// Authenticated access to the Cloudflare API for one zone
struct CloudflareApi {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,
    zone_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl CloudflareApi {
    fn new(client: reqwest::Client, api_token: &str, zone_id: &str, base_url: &str) -> Self {
        Self {
            api_token: api_token.to_string(),
            zone_id: zone_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn zone_url(&self) -> String {
        format!("{}/zones/{}", self.base_url, self.zone_id)
    }

    fn records_url(&self) -> String {
        format!("{}/dns_records", self.zone_url())
    }

    /// Send a request and return the `result` member of the response envelope
    async fn call(&self, request: reqwest::RequestBuilder, action: &str) -> Result<Value> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        // Handle specific HTTP status codes
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            // Map HTTP status codes to specific errors
            return Err(match status.as_u16() {
                401 | 403 => Error::auth(format!(
                    "Invalid API token or insufficient permissions. Status: {}",
                    status
                )),
                404 => Error::not_found(format!("{}: {}", action, error_text)),
                429 => Error::rate_limited(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                )),
                500..=599 => Error::provider(
                    "cloudflare",
                    format!("Cloudflare server error (transient): {} - {}", status, error_text),
                ),
                _ => Error::provider(
                    "cloudflare",
                    format!("{} failed: {} - {}", action, status, error_text),
                ),
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("Failed to parse response: {}", e)))?;

        if json["success"].as_bool() == Some(false) {
            return Err(Error::provider(
                "cloudflare",
                format!("{} failed: {}", action, api_errors(&json)),
            ));
        }

        Ok(json["result"].clone())
    }

    /// Look up the zone name
    ///
    /// ```http
    /// GET /zones/:zone_id
    /// Authorization: Bearer <token>
    /// ```
    async fn zone_name(&self) -> Result<String> {
        let result = self
            .call(self.client.get(self.zone_url()), "Zone lookup")
            .await?;

        let name = result["name"].as_str().ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: zone.name is not a string")
        })?;

        Ok(name.to_string())
    }

    /// List the TXT records at a fully qualified name
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?type=TXT&name=_acme-challenge.example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn list_txt_records(&self, name: &str) -> Result<Vec<TxtRecord>> {
        let request = self.client.get(self.records_url()).query(&[
            ("type", "TXT"),
            ("name", name),
            ("per_page", RECORDS_PER_PAGE),
        ]);

        let result = self.call(request, "Record lookup").await?;
        let records = result.as_array().ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: result is not an array")
        })?;

        records.iter().map(TxtRecord::from_json).collect()
    }

    async fn create_txt_record(&self, name: &str, content: &str, ttl: u32) -> Result<()> {
        let payload = serde_json::json!({
            "type": "TXT",
            "name": name,
            "content": content,
            "ttl": ttl,
        });

        self.call(
            self.client.post(self.records_url()).json(&payload),
            "Record create",
        )
        .await?;
        Ok(())
    }

    async fn delete_txt_record(&self, record_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.records_url(), record_id);
        match self.call(self.client.delete(url), "Record delete").await {
            // Deleted by someone else in the meantime
            Ok(_) | Err(Error::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Collect the messages of a failed response envelope
fn api_errors(json: &Value) -> String {
    let messages: Vec<String> = json["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    format!(
                        "{} (code {})",
                        e["message"].as_str().unwrap_or("unknown error"),
                        e["code"].as_i64().unwrap_or_default()
                    )
                })
                .collect()
        })
        .unwrap_or_default();

    if messages.is_empty() {
        "unknown error".to_string()
    } else {
        messages.join("; ")
    }
}

/// One Cloudflare TXT record
#[derive(Debug, Clone, PartialEq, Eq)]
struct TxtRecord {
    id: String,
    content: String,
    ttl: u32,
}

impl TxtRecord {
    fn from_json(json: &Value) -> Result<Self> {
        let id = json["id"].as_str().ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: record.id is not a string")
        })?;
        let content = json["content"].as_str().ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: record.content is not a string")
        })?;

        Ok(Self {
            id: id.to_string(),
            content: unquote(content).to_string(),
            ttl: json["ttl"]
                .as_u64()
                .and_then(|ttl| u32::try_from(ttl).ok())
                .unwrap_or(1),
        })
    }
}

/// Strip the quotes Cloudflare may put around TXT content
fn unquote(content: &str) -> &str {
    content
        .strip_prefix('"')
        .and_then(|c| c.strip_suffix('"'))
        .unwrap_or(content)
}

/// Zone store over the Cloudflare API
///
/// Built by lazy initialization once the zone name is known.
pub struct CloudflareStore {
    api: CloudflareApi,
    zone_name: String,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareStore")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.api.zone_id)
            .field("zone_name", &self.zone_name)
            .finish()
    }
}

#[async_trait]
impl ZoneStore for CloudflareStore {
    fn zone_name(&self) -> &str {
        &self.zone_name
    }

    async fn get_record_set(&self, name: &str) -> Result<Option<TxtRecordSet>> {
        let records = self
            .api
            .list_txt_records(&fqdn(name, &self.zone_name))
            .await?;

        let Some(first) = records.first() else {
            return Ok(None);
        };

        Ok(Some(TxtRecordSet {
            name: name.to_string(),
            ttl: first.ttl,
            values: records.iter().map(|r| r.content.clone()).collect(),
        }))
    }

    async fn create_or_update_record_set(&self, record_set: &TxtRecordSet) -> Result<()> {
        let name = fqdn(&record_set.name, &self.zone_name);
        let existing = self.api.list_txt_records(&name).await?;

        // Additive only: records missing from `record_set` may have been
        // written by someone else after it was read
        for value in &record_set.values {
            if !existing.iter().any(|r| &r.content == value) {
                tracing::debug!("Creating TXT record at {}", name);
                self.api
                    .create_txt_record(&name, value, record_set.ttl)
                    .await?;
            }
        }

        Ok(())
    }

    async fn delete_record_set(&self, name: &str) -> Result<()> {
        let name = fqdn(name, &self.zone_name);
        for record in self.api.list_txt_records(&name).await? {
            tracing::debug!("Deleting TXT record {} at {}", record.id, name);
            self.api.delete_txt_record(&record.id).await?;
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Deferred construction of a Cloudflare zone
///
/// Holds only the settings; `initialize` builds the HTTP client and looks up
/// the zone.
pub struct CloudflareZoneInitializer {
    /// ⚠️ NEVER log this value
    api_token: String,
    zone_id: String,
    base_url: String,
}

impl CloudflareZoneInitializer {
    /// Create an initializer
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] if the token or zone id is blank.
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_token = api_token.into();
        let zone_id = zone_id.into();

        // Validate token is not empty
        if api_token.is_empty() {
            return Err(Error::missing_field("cloudflare", "api_token"));
        }
        if zone_id.trim().is_empty() {
            return Err(Error::missing_field("cloudflare", "zone_identifier"));
        }

        Ok(Self {
            api_token,
            zone_id,
            base_url: base_url.into(),
        })
    }
}

impl std::fmt::Debug for CloudflareZoneInitializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareZoneInitializer")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl ZoneInitializer for CloudflareZoneInitializer {
    async fn initialize(&self) -> Result<Box<dyn DnsZone>> {
        tracing::debug!("Looking up Cloudflare zone {}", self.zone_id);

        // Build HTTP client with timeout
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let api = CloudflareApi::new(client, &self.api_token, &self.zone_id, &self.base_url);
        let zone_name = api.zone_name().await?;
        tracing::info!("Cloudflare DNS client ready for zone {}", zone_name);

        Ok(Box::new(RecordSetZone::new(CloudflareStore { api, zone_name })))
    }
}

/// Factory for creating Cloudflare zones
#[derive(Debug, Clone)]
pub struct CloudflareZoneFactory {
    base_url: String,
}

impl CloudflareZoneFactory {
    /// Factory targeting the public Cloudflare API
    pub fn new() -> Self {
        Self::with_base_url(CLOUDFLARE_API_BASE)
    }

    /// Factory targeting another API endpoint (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for CloudflareZoneFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsZoneFactory for CloudflareZoneFactory {
    fn create(&self, config: &ZoneConfig) -> Result<Box<dyn DnsZone>> {
        match config {
            ZoneConfig::Cloudflare {
                api_token,
                zone_identifier,
            } => {
                let initializer = CloudflareZoneInitializer::new(
                    api_token.as_str(),
                    zone_identifier.as_str(),
                    self.base_url.as_str(),
                )?;

                Ok(Box::new(LazyDnsZone::new("cloudflare", Box::new(initializer))))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a zone factory
///
/// This function should be called during initialization to make the
/// Cloudflare provider available.
///
/// # Example
///
/// ```rust
/// use acme_dns_core::ZoneFactory;
///
/// let factory = ZoneFactory::new();
/// acme_dns_cloudflare::register(&factory);
/// assert!(factory.has_provider("cloudflare"));
/// ```
pub fn register(factory: &ZoneFactory) {
    factory.register_provider("cloudflare", Box::new(CloudflareZoneFactory::new()));
}
