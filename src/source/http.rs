use log::debug;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::{json, Value};
use std::time::Duration;

use crate::model::RawRecord;
use crate::source::{FailureCause, FetchOutcome, SourceClient, SourceEndpoint, SourceFailure};

/// Record store client speaking the sheet-style REST dialect: `GET` returns a
/// JSON array of flat objects, `POST` appends one object, and
/// `PATCH {url}/{column}/{value}` updates matching rows.
#[derive(Debug, Clone)]
pub struct HttpSourceClient {
    client: Client,
    auth_token: Option<String>,
}

impl HttpSourceClient {
    pub fn new(timeout: Duration, auth_token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, auth_token })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        endpoint: &SourceEndpoint,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, SourceFailure> {
        let response = request
            .send()
            .await
            .map_err(|e| SourceFailure::new(&endpoint.id, FailureCause::Network(e.to_string())))?;

        if !response.status().is_success() {
            return Err(SourceFailure::new(
                &endpoint.id,
                FailureCause::Status(response.status().as_u16()),
            ));
        }
        Ok(response)
    }
}

fn endpoint_url(endpoint: &SourceEndpoint) -> Result<Url, SourceFailure> {
    Url::parse(&endpoint.url)
        .map_err(|e| SourceFailure::new(&endpoint.id, FailureCause::InvalidEndpoint(e.to_string())))
}

/// Build `{url}/{key_label}/{key}` with each segment percent-encoded.
fn keyed_url(endpoint: &SourceEndpoint, key_label: &str, key: &str) -> Result<Url, SourceFailure> {
    let mut url = endpoint_url(endpoint)?;
    url.path_segments_mut()
        .map_err(|_| {
            let message = format!("'{}' cannot take path segments", endpoint.url);
            SourceFailure::new(&endpoint.id, FailureCause::InvalidEndpoint(message))
        })?
        .pop_if_empty()
        .push(key_label)
        .push(key);
    Ok(url)
}

/// Flatten a JSON payload into raw records. Scalars become text and nulls
/// are dropped; anything other than an array of objects is malformed.
pub fn parse_records(payload: Value) -> Result<Vec<RawRecord>, String> {
    let Value::Array(items) = payload else {
        return Err("expected a JSON array of records".to_string());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_record(item).map_err(|e| format!("record {}: {}", index, e)))
        .collect()
}

/// One JSON object as a raw record: scalars become text and nulls are dropped.
pub fn parse_record(item: Value) -> Result<RawRecord, String> {
    match item {
        Value::Object(fields) => Ok(fields
            .into_iter()
            .filter_map(|(label, value)| match value {
                Value::Null => None,
                Value::String(text) => Some((label, text)),
                other => Some((label, other.to_string())),
            })
            .collect()),
        other => Err(format!("not an object: {}", other)),
    }
}

#[async_trait::async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch(&self, endpoint: &SourceEndpoint) -> FetchOutcome {
        let url = endpoint_url(endpoint)?;
        let response = self.send(endpoint, self.request(Method::GET, url)).await?;

        let payload: Value = response.json().await.map_err(|e| {
            SourceFailure::new(&endpoint.id, FailureCause::MalformedPayload(e.to_string()))
        })?;
        let records = parse_records(payload)
            .map_err(|e| SourceFailure::new(&endpoint.id, FailureCause::MalformedPayload(e)))?;

        debug!("Fetched {} record(s) from '{}'", records.len(), endpoint.id);
        Ok(records)
    }

    async fn insert(
        &self,
        endpoint: &SourceEndpoint,
        record: RawRecord,
    ) -> Result<(), SourceFailure> {
        let url = endpoint_url(endpoint)?;
        self.send(endpoint, self.request(Method::POST, url).json(&record))
            .await?;
        Ok(())
    }

    async fn update(
        &self,
        endpoint: &SourceEndpoint,
        key_label: &str,
        key: &str,
        fields: RawRecord,
    ) -> Result<(), SourceFailure> {
        let url = keyed_url(endpoint, key_label, key)?;
        let request = self
            .request(Method::PATCH, url)
            .json(&json!({ "data": fields }));
        self.send(endpoint, request).await?;
        Ok(())
    }
}
