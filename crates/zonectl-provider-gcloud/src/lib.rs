// # Google Cloud DNS Provider
//
// This crate provides a Google Cloud DNS provider implementation for zonectl.
//
// ## Behaviour
//
// - One HTTP request per trait call, plus page follow-ups for listings
// - Wire errors are translated into `ProviderError` and returned; no retries
// - HTTP timeout configured (30 seconds)
// - The access token never appears in logs or `Debug` output
//
// Deciding whether an error is fatal, tolerable, or worth a rollback is the
// core's job. This crate only reports what the service said.
//
// ## API Reference
//
// - Cloud DNS v1: https://cloud.google.com/dns/docs/reference/rest/v1
// - List zones: GET `/projects/:project/managedZones`
// - Create zone: POST `/projects/:project/managedZones`
// - Delete zone: DELETE `/projects/:project/managedZones/:zone`
// - List records: GET `/projects/:project/managedZones/:zone/rrsets?name=...&type=...`
// - Change records: POST `/projects/:project/managedZones/:zone/changes`
//
// Cloud DNS has no in-place record update. A change carries `additions` and
// `deletions`, and a deletion must match the stored record set exactly.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use zonectl_core::config::ProviderConfig;
use zonectl_core::model::{Record, RecordData, RecordKey, Zone, ZoneAttributes};
use zonectl_core::traits::{DnsProvider, DnsProviderFactory};
use zonectl_core::{Error, Fqdn, ProviderError};

/// Cloud DNS API base URL
const GOOGLE_CLOUD_DNS_API_BASE: &str = "https://dns.googleapis.com/dns/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Managed zone names are limited to 63 characters
const MAX_ZONE_NAME_LEN: usize = 63;

/// Record types Cloud DNS accepts through this provider
pub const SUPPORTED_RECORD_TYPES: &[&str] = &[
    "A", "AAAA", "CAA", "CNAME", "MX", "NS", "PTR", "SOA", "SPF", "SRV", "TXT",
];

/// Google Cloud DNS provider
///
/// Zones are addressed by their managed zone `name`, which becomes
/// [`Zone::id`].
///
/// # Security
///
/// The Debug implementation does not expose the access token.
pub struct GoogleCloudDnsProvider {
    project_id: String,

    /// OAuth2 bearer token
    /// ⚠️ NEVER log this value
    access_token: String,

    base_url: String,

    client: reqwest::Client,
}

impl std::fmt::Debug for GoogleCloudDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleCloudDnsProvider")
            .field("project_id", &self.project_id)
            .field("access_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GoogleCloudDnsProvider {
    /// Create a new Google Cloud DNS provider
    ///
    /// # Parameters
    ///
    /// - `project_id`: Project that owns the managed zones
    /// - `access_token`: OAuth2 token with the `ndev.clouddns.readwrite` scope
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if either value is empty or the HTTP client cannot be built.
    pub fn new(
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, Error> {
        let project_id = project_id.into();
        let access_token = access_token.into();

        if project_id.trim().is_empty() {
            return Err(Error::config("Google Cloud project ID cannot be empty"));
        }
        if access_token.is_empty() {
            return Err(Error::config("Google Cloud access token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            project_id,
            access_token,
            base_url: GOOGLE_CLOUD_DNS_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at a different API root (emulators, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn zones_url(&self) -> String {
        format!("{}/projects/{}/managedZones", self.base_url, self.project_id)
    }

    fn zone_url(&self, zone_id: &str) -> String {
        format!("{}/{}", self.zones_url(), zone_id)
    }

    /// Send a request and decode the JSON response
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ProviderError> {
        let response = self.execute(request).await?;
        response.json().await.map_err(|e| ProviderError::Other {
            code: None,
            reason: None,
            message: format!("Failed to parse response: {}", e),
        })
    }

    /// Send a request and check the status, discarding the body
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ProviderError> {
        self.execute(request).await.map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ProviderError::Other {
                code: e.status().map(|s| s.as_u16()),
                reason: None,
                message: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        Err(map_error_response(status, &body))
    }

    /// Fetch every page of a listing
    async fn list_all<P, T>(
        &self,
        url: &str,
        filter: &[(&str, &str)],
    ) -> Result<Vec<T>, ProviderError>
    where
        P: DeserializeOwned + Page<Item = T>,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(url).query(filter);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: P = self.send(request).await?;
            let next = page.next_page_token();
            items.extend(page.into_items());

            match next {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(items),
            }
        }
    }

    async fn post_change(&self, zone_id: &str, change: &Change) -> Result<(), ProviderError> {
        let url = format!("{}/changes", self.zone_url(zone_id));
        let _: Change = self.send(self.client.post(&url).json(change)).await?;
        Ok(())
    }
}

#[async_trait]
impl DnsProvider for GoogleCloudDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>, ProviderError> {
        debug!("Listing managed zones in project {}", self.project_id);
        let zones: Vec<ManagedZone> = self
            .list_all::<ManagedZonesListResponse, _>(&self.zones_url(), &[])
            .await?;
        zones.into_iter().map(ManagedZone::into_zone).collect()
    }

    async fn get_record(&self, zone_id: &str, identity: &str) -> Result<Record, ProviderError> {
        let key = RecordKey::parse_identity(identity)
            .map_err(|e| ProviderError::Invalid(e.to_string()))?;

        debug!("Fetching record set {} in managed zone {}", identity, zone_id);
        let url = format!("{}/rrsets", self.zone_url(zone_id));
        let page: ResourceRecordSetsListResponse = self
            .send(
                self.client
                    .get(&url)
                    .query(&[("name", key.name.as_str()), ("type", key.record_type.as_str())]),
            )
            .await?;

        page.rrsets
            .into_iter()
            .find(|rrset| rrset.record_type == key.record_type)
            .ok_or_else(|| ProviderError::NotFound(identity.to_string()))?
            .into_record(zone_id)
    }

    async fn create_record(
        &self,
        zone: &Zone,
        key: &RecordKey,
        data: &RecordData,
    ) -> Result<Record, ProviderError> {
        let rrset = ResourceRecordSet::from_parts(key, data);
        debug!("Adding record set {} to managed zone {}", key, zone.id);

        self.post_change(
            &zone.id,
            &Change {
                additions: vec![rrset],
                deletions: Vec::new(),
            },
        )
        .await?;

        Ok(Record {
            zone_id: zone.id.clone(),
            key: key.clone(),
            data: data.clone(),
        })
    }

    async fn delete_record(&self, record: &Record) -> Result<(), ProviderError> {
        debug!(
            "Removing record set {} from managed zone {}",
            record.key, record.zone_id
        );
        self.post_change(
            &record.zone_id,
            &Change {
                additions: Vec::new(),
                deletions: vec![ResourceRecordSet::from_parts(&record.key, &record.data)],
            },
        )
        .await
    }

    async fn create_zone(
        &self,
        domain: &Fqdn,
        attributes: &ZoneAttributes,
    ) -> Result<Zone, ProviderError> {
        let body = ManagedZone {
            name: managed_zone_name(domain),
            dns_name: domain.to_string(),
            description: attributes.description.clone(),
        };
        debug!("Creating managed zone {} for {}", body.name, domain);

        let created: ManagedZone = self
            .send(self.client.post(self.zones_url()).json(&body))
            .await?;
        created.into_zone()
    }

    async fn delete_zone(&self, zone: &Zone) -> Result<(), ProviderError> {
        debug!("Deleting managed zone {}", zone.id);
        self.send_empty(self.client.delete(self.zone_url(&zone.id)))
            .await
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<Record>, ProviderError> {
        debug!("Listing record sets in managed zone {}", zone.id);
        let url = format!("{}/rrsets", self.zone_url(&zone.id));
        let rrsets: Vec<ResourceRecordSet> = self
            .list_all::<ResourceRecordSetsListResponse, _>(&url, &[])
            .await?;
        rrsets
            .into_iter()
            .map(|rrset| rrset.into_record(&zone.id))
            .collect()
    }

    fn supported_record_types(&self) -> &[&'static str] {
        SUPPORTED_RECORD_TYPES
    }

    fn provider_name(&self) -> &'static str {
        "google_cloud"
    }
}

/// Derive a managed zone name from a domain
///
/// Zone names must start with a letter, contain only lowercase letters,
/// digits and dashes, and fit in 63 characters.
pub fn managed_zone_name(domain: &Fqdn) -> String {
    let mut name: String = domain
        .trimmed()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();

    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        name.insert_str(0, "zone-");
    }
    name.truncate(MAX_ZONE_NAME_LEN);
    name.trim_end_matches('-').to_string()
}

/// Translate an error response into a provider signal
///
/// The first `errors[].reason` decides when present; otherwise 404 and 409
/// map by status and everything else is carried verbatim.
pub fn map_error_response(status: StatusCode, body: &str) -> ProviderError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let reason = envelope
        .as_ref()
        .and_then(|e| e.error.errors.iter().find_map(|item| item.reason.clone()));
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("{} - {}", status, body));

    match reason.as_deref() {
        Some("notFound") => return ProviderError::NotFound(message),
        Some("alreadyExists") => return ProviderError::AlreadyExists(message),
        Some("invalid") => return ProviderError::Invalid(message),
        Some("managedZoneDnsNameNotAvailable") => return ProviderError::ReservedName(message),
        Some("containerNotEmpty") => return ProviderError::NotEmpty(message),
        _ => {}
    }

    match status {
        StatusCode::NOT_FOUND => ProviderError::NotFound(message),
        StatusCode::CONFLICT => ProviderError::AlreadyExists(message),
        _ => ProviderError::Other {
            code: Some(status.as_u16()),
            reason,
            message,
        },
    }
}

trait Page {
    type Item;
    fn next_page_token(&self) -> Option<String>;
    fn into_items(self) -> Vec<Self::Item>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedZone {
    name: String,
    dns_name: String,
    #[serde(default)]
    description: String,
}

impl ManagedZone {
    fn into_zone(self) -> Result<Zone, ProviderError> {
        let domain = Fqdn::new(&self.dns_name).map_err(|e| {
            ProviderError::other(format!("Malformed dnsName in managed zone {}: {}", self.name, e))
        })?;
        Ok(Zone {
            id: self.name,
            domain,
            attributes: ZoneAttributes {
                description: self.description,
            },
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedZonesListResponse {
    #[serde(default)]
    managed_zones: Vec<ManagedZone>,
    next_page_token: Option<String>,
}

impl Page for ManagedZonesListResponse {
    type Item = ManagedZone;

    fn next_page_token(&self) -> Option<String> {
        self.next_page_token.clone()
    }

    fn into_items(self) -> Vec<ManagedZone> {
        self.managed_zones
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ResourceRecordSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default)]
    ttl: u32,
    #[serde(default)]
    rrdatas: Vec<String>,
}

impl ResourceRecordSet {
    fn from_parts(key: &RecordKey, data: &RecordData) -> Self {
        Self {
            name: key.name.to_string(),
            record_type: key.record_type.clone(),
            ttl: data.ttl,
            rrdatas: data.values.clone(),
        }
    }

    fn into_record(self, zone_id: &str) -> Result<Record, ProviderError> {
        let name = Fqdn::new(&self.name).map_err(|e| {
            ProviderError::other(format!("Malformed record set name {}: {}", self.name, e))
        })?;
        Ok(Record {
            zone_id: zone_id.to_string(),
            key: RecordKey::new(self.record_type, name),
            data: RecordData::new(self.ttl, self.rrdatas),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceRecordSetsListResponse {
    #[serde(default)]
    rrsets: Vec<ResourceRecordSet>,
    next_page_token: Option<String>,
}

impl Page for ResourceRecordSetsListResponse {
    type Item = ResourceRecordSet;

    fn next_page_token(&self) -> Option<String> {
        self.next_page_token.clone()
    }

    fn into_items(self) -> Vec<ResourceRecordSet> {
        self.rrsets
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Change {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    additions: Vec<ResourceRecordSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    deletions: Vec<ResourceRecordSet>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    reason: Option<String>,
}

/// Factory for creating Google Cloud DNS providers
pub struct GoogleCloudFactory;

impl DnsProviderFactory for GoogleCloudFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>, Error> {
        match config {
            ProviderConfig::GoogleCloud {
                project_id,
                access_token,
            } => Ok(Box::new(GoogleCloudDnsProvider::new(
                project_id.clone(),
                access_token.clone(),
            )?)),
            _ => Err(Error::config("Invalid config for Google Cloud provider")),
        }
    }
}

/// Register the Google Cloud DNS provider with a registry
///
/// # Example
///
/// ```rust
/// use zonectl_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// zonectl_provider_gcloud::register(&registry);
/// assert!(registry.has_provider("google_cloud"));
/// ```
pub fn register(registry: &zonectl_core::ProviderRegistry) {
    registry.register_provider("google_cloud", Box::new(GoogleCloudFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_body(code: u16, reason: &str, message: &str) -> String {
        serde_json::json!({
            "error": {
                "code": code,
                "message": message,
                "errors": [{"domain": "global", "reason": reason, "message": message}]
            }
        })
        .to_string()
    }

    #[test]
    fn error_reasons_map_to_signals() {
        let cases = [
            (StatusCode::NOT_FOUND, "notFound"),
            (StatusCode::CONFLICT, "alreadyExists"),
            (StatusCode::BAD_REQUEST, "invalid"),
            (StatusCode::BAD_REQUEST, "managedZoneDnsNameNotAvailable"),
            (StatusCode::BAD_REQUEST, "containerNotEmpty"),
        ];

        let mapped: Vec<_> = cases
            .iter()
            .map(|(status, reason)| {
                map_error_response(*status, &error_body(status.as_u16(), reason, "boom"))
            })
            .collect();

        assert_eq!(mapped[0], ProviderError::NotFound("boom".into()));
        assert_eq!(mapped[1], ProviderError::AlreadyExists("boom".into()));
        assert_eq!(mapped[2], ProviderError::Invalid("boom".into()));
        assert_eq!(mapped[3], ProviderError::ReservedName("boom".into()));
        assert_eq!(mapped[4], ProviderError::NotEmpty("boom".into()));
    }

    #[test]
    fn unknown_reasons_fall_back_to_status() {
        let not_found = map_error_response(
            StatusCode::NOT_FOUND,
            &error_body(404, "somethingNew", "gone"),
        );
        assert!(not_found.is_not_found());

        let conflict = map_error_response(StatusCode::CONFLICT, "not json");
        assert!(matches!(conflict, ProviderError::AlreadyExists(_)));

        let forbidden =
            map_error_response(StatusCode::FORBIDDEN, &error_body(403, "forbidden", "denied"));
        assert_eq!(
            forbidden,
            ProviderError::Other {
                code: Some(403),
                reason: Some("forbidden".into()),
                message: "denied".into(),
            }
        );
    }

    #[test]
    fn unparseable_error_body_is_kept() {
        let err = map_error_response(StatusCode::BAD_GATEWAY, "<html>upstream</html>");
        match err {
            ProviderError::Other {
                code,
                reason,
                message,
            } => {
                assert_eq!(code, Some(502));
                assert_eq!(reason, None);
                assert!(message.contains("upstream"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn zone_names_are_derived_from_domains() {
        let name = |d: &str| managed_zone_name(&Fqdn::new(d).unwrap());

        assert_eq!(name("example.com"), "example-com");
        assert_eq!(name("Sub.Example.COM."), "sub-example-com");
        assert_eq!(name("1.0.10.in-addr.arpa"), "zone-1-0-10-in-addr-arpa");
        assert_eq!(name("_tcp.example.com"), "zone--tcp-example-com");

        let long = format!("{}.example.com", "a".repeat(60));
        assert!(name(&long).len() <= MAX_ZONE_NAME_LEN);
        assert!(!name(&long).ends_with('-'));
    }

    #[test]
    fn change_serializes_only_populated_sides() {
        let key = RecordKey::new("A", Fqdn::new("www.example.com").unwrap());
        let data = RecordData::new(300, vec!["1.2.3.4".into()]);
        let change = Change {
            additions: vec![ResourceRecordSet::from_parts(&key, &data)],
            deletions: Vec::new(),
        };

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "additions": [{
                    "name": "www.example.com.",
                    "type": "A",
                    "ttl": 300,
                    "rrdatas": ["1.2.3.4"]
                }]
            })
        );
    }

    #[test]
    fn listings_decode_into_core_types() {
        let zones: ManagedZonesListResponse = serde_json::from_str(
            r#"{
                "managedZones": [
                    {"name": "example-com", "dnsName": "example.com.", "description": "main", "id": "123"}
                ],
                "nextPageToken": "abc"
            }"#,
        )
        .unwrap();
        assert_eq!(zones.next_page_token(), Some("abc".to_string()));
        let zone = zones.into_items().remove(0).into_zone().unwrap();
        assert_eq!(zone.id, "example-com");
        assert_eq!(zone.domain.as_str(), "example.com.");
        assert_eq!(zone.attributes.description, "main");

        let rrsets: ResourceRecordSetsListResponse = serde_json::from_str(
            r#"{"rrsets": [{"kind": "dns#resourceRecordSet", "name": "example.com.",
                "type": "NS", "ttl": 21600, "rrdatas": ["ns-cloud-a1.googledomains.com."]}]}"#,
        )
        .unwrap();
        assert_eq!(rrsets.next_page_token(), None);
        let record = rrsets.into_items().remove(0).into_record("example-com").unwrap();
        assert_eq!(record.key.identity(), "NS:example.com.");
        assert_eq!(record.data.ttl, 21600);
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = GoogleCloudDnsProvider::new("my-project", "ya29.secret_token").unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("ya29.secret_token"));
        assert!(debug_str.contains("GoogleCloudDnsProvider"));
        assert!(debug_str.contains("my-project"));
    }

    #[test]
    fn test_factory() {
        let factory = GoogleCloudFactory;

        let ok = ProviderConfig::GoogleCloud {
            project_id: "my-project".into(),
            access_token: "token".into(),
        };
        let provider = factory.create(&ok).unwrap();
        assert_eq!(provider.provider_name(), "google_cloud");
        assert!(!provider.supported_record_types().contains(&"NAPTR"));

        let missing_token = ProviderConfig::GoogleCloud {
            project_id: "my-project".into(),
            access_token: String::new(),
        };
        assert!(factory.create(&missing_token).is_err());
        assert!(factory.create(&ProviderConfig::Memory { snapshot: None }).is_err());
    }

    #[test]
    fn base_url_override_is_normalized() {
        let provider = GoogleCloudDnsProvider::new("p", "t")
            .unwrap()
            .with_base_url("http://localhost:8080/dns/v1/");
        assert_eq!(
            provider.zone_url("example-com"),
            "http://localhost:8080/dns/v1/projects/p/managedZones/example-com"
        );
    }

    #[tokio::test]
    async fn transport_failure_is_unclassified() {
        // Nothing listens on port 9 locally
        let provider = GoogleCloudDnsProvider::new("p", "t")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = provider.list_zones().await.unwrap_err();
        assert!(matches!(err, ProviderError::Other { code: None, .. }));
    }
}
