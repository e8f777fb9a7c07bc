//! Jolokia Client
//!
//! Talks to a Jolokia agent (JMX over HTTP/JSON) and implements the
//! endpoint traits the dump consumes.

use super::classify::classify;
use super::http::{Credentials, JolokiaHttpClient, DEFAULT_TIMEOUT};
use crate::error::FetchError;
use crate::mbean::endpoint::{Connection, Introspector, ResourceDirectory};
use crate::mbean::value::{AttributeInfo, ManagementValue};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Pattern matching every resource of every domain
const ALL_DOMAINS: &str = "*:*";

/// Status the agent reports for a successful request
const STATUS_OK: u64 = 200;

/// One agent request
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Request<'a> {
    Search {
        mbean: String,
    },
    List {
        path: String,
    },
    Read {
        mbean: &'a str,
        attribute: AttributeSelector<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AttributeSelector<'a> {
    One(&'a str),
    Many(Vec<&'a str>),
}

/// Connection settings
#[derive(Debug, Clone)]
pub struct JolokiaSettings {
    pub url: String,
    pub credentials: Option<Credentials>,
    pub timeout: Duration,
}

impl JolokiaSettings {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Client for one Jolokia agent
#[derive(Clone)]
pub struct JolokiaClient {
    http: JolokiaHttpClient,
    url: Url,
}

impl JolokiaClient {
    /// Create a client for the agent at `settings.url`
    pub fn new(settings: &JolokiaSettings) -> Result<Self, FetchError> {
        let url = parse_agent_url(&settings.url)?;
        let http = JolokiaHttpClient::new(settings.timeout, settings.credentials.clone())?;

        Ok(Self { http, url })
    }

    /// Agent URL requests are posted to
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Send one request and unwrap the `value` of a successful reply
    async fn request(&self, request: &Request<'_>) -> Result<Value, FetchError> {
        let reply = self.http.post(self.url.as_str(), request).await?;
        unwrap_reply(reply)
    }
}

#[async_trait]
impl ResourceDirectory for JolokiaClient {
    async fn list_resources(&self, domain: Option<&str>) -> Result<Vec<String>, FetchError> {
        let mbean = match domain {
            Some(domain) => format!("{}:*", domain),
            None => ALL_DOMAINS.to_string(),
        };
        tracing::debug!("search {}", mbean);

        let value = self.request(&Request::Search { mbean }).await?;
        let Value::Array(items) = value else {
            return Err(FetchError::Malformed("search reply is not a list".to_string()));
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl Introspector for JolokiaClient {
    async fn readable_attributes(&self, resource: &str) -> Result<Vec<AttributeInfo>, FetchError> {
        let path = list_path(resource)?;
        let value = self.request(&Request::List { path }).await?;

        let Some(attributes) = value.get("attr") else {
            return Ok(Vec::new());
        };
        let Value::Object(attributes) = attributes else {
            return Err(FetchError::Malformed(format!("attribute metadata of {}", resource)));
        };

        Ok(attributes
            .iter()
            .map(|(name, info)| {
                AttributeInfo::new(name, info.get("type").and_then(Value::as_str))
            })
            .collect())
    }
}

#[async_trait]
impl Connection for JolokiaClient {
    async fn fetch_batch(
        &self,
        resource: &str,
        attributes: &[AttributeInfo],
    ) -> Result<Vec<(String, Option<ManagementValue>)>, FetchError> {
        let request = Request::Read {
            mbean: resource,
            attribute: AttributeSelector::Many(attributes.iter().map(|a| a.name.as_str()).collect()),
        };
        let value = self.request(&request).await?;

        let Value::Object(mut values) = value else {
            return Err(FetchError::Malformed(format!("bulk read of {}", resource)));
        };

        Ok(attributes
            .iter()
            .filter_map(|attribute| {
                values.remove(&attribute.name).map(|raw| {
                    let value = classify(raw, attribute.type_name.as_deref());
                    (attribute.name.clone(), Some(value))
                })
            })
            .collect())
    }

    async fn fetch_one(
        &self,
        resource: &str,
        attribute: &AttributeInfo,
    ) -> Result<ManagementValue, FetchError> {
        let request = Request::Read {
            mbean: resource,
            attribute: AttributeSelector::One(&attribute.name),
        };
        let value = self.request(&request).await?;
        Ok(classify(value, attribute.type_name.as_deref()))
    }
}

/// Validate the agent URL; a trailing slash is added so the agent path is kept
fn parse_agent_url(raw: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| FetchError::InvalidUrl(format!("{:?}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "scheme must be http or https, got {}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Check the reply status and take its value
fn unwrap_reply(reply: Value) -> Result<Value, FetchError> {
    let status = reply.get("status").and_then(Value::as_u64).unwrap_or(0);
    if status != STATUS_OK {
        let error_type = reply
            .get("error_type")
            .and_then(Value::as_str)
            .map(str::to_string);
        let message = reply
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("no error message")
            .to_string();

        if error_type.as_deref() == Some("java.lang.UnsupportedOperationException") {
            return Err(FetchError::Unsupported(message));
        }
        return Err(FetchError::Remote {
            status: u16::try_from(status).unwrap_or(0),
            error_type,
            message,
        });
    }

    match reply {
        Value::Object(mut map) => Ok(map.remove("value").unwrap_or(Value::Null)),
        _ => Err(FetchError::Malformed("reply is not an object".to_string())),
    }
}

/// `list` path for an object name: `domain/key-properties`, `!`-escaped
fn list_path(resource: &str) -> Result<String, FetchError> {
    let (domain, properties) = resource
        .split_once(':')
        .ok_or_else(|| FetchError::Unsupported(format!("not an object name: {}", resource)))?;
    Ok(format!("{}/{}", escape_path_part(domain), escape_path_part(properties)))
}

fn escape_path_part(part: &str) -> String {
    part.replace('!', "!!").replace('/', "!/")
}
