//! Request dispatcher
//!
//! Executes a test case as two dependent HTTP calls: find the endpoint of
//! the first registered client, then send the descriptor's request to it.

use reqwest::Url;
use serde::Deserialize;

use crate::common::{Error, Result};
use crate::table::RequestDescriptor;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::url;

/// A client record from `GET /clients`
///
/// Only the endpoint is required; the rest is shown by `devices` when the
/// server reports it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub endpoint: String,
    #[serde(default)]
    pub registration_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lw_m2m_version: Option<String>,
}

/// Outcome of the discovery phase
#[derive(Debug, Clone)]
pub struct Discovery {
    pub response: HttpResponse,
    pub endpoint: String,
}

/// A completed two-phase execution
#[derive(Debug, Clone)]
pub struct Exchange {
    pub discovery: Discovery,
    pub request: HttpRequest,
    pub response: HttpResponse,
}

/// Sees each message of an execution as it goes out or comes back
///
/// Every method defaults to doing nothing.
pub trait Observer {
    fn discovery_sent(&mut self, _request: &HttpRequest) {}
    fn discovery_received(&mut self, _response: &HttpResponse) {}
    fn endpoint_resolved(&mut self, _endpoint: &str) {}
    fn operation_sent(&mut self, _endpoint: &str, _request: &HttpRequest) {}
    fn operation_received(&mut self, _response: &HttpResponse) {}
}

impl Observer for () {}

/// Drives the server's REST API through a transport
pub struct Dispatcher<T> {
    base_url: Url,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher for `base_url` (the API root, without `/clients`)
    pub fn new(base_url: &str, transport: T) -> Result<Self> {
        Ok(Self {
            base_url: url::normalize_base_url(base_url)?,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The client-list request
    pub fn discovery_request(&self) -> HttpRequest {
        HttpRequest::get(url::clients_url(&self.base_url))
    }

    /// Build the operation request for a resolved endpoint
    pub fn operation_request(&self, endpoint: &str, descriptor: &RequestDescriptor) -> HttpRequest {
        let body = if descriptor.method.carries_body() {
            descriptor.payload.clone()
        } else {
            None
        };

        HttpRequest {
            method: descriptor.method,
            url: url::operation_url(&self.base_url, endpoint, descriptor),
            body,
        }
    }

    async fn send(&self, phase: &str, request: &HttpRequest) -> Result<HttpResponse> {
        tracing::debug!("{}: {}", phase, request);
        self.transport.send(request).await.map_err(|e| {
            tracing::warn!("{} request failed: {}", phase, e);
            e
        })
    }

    /// Fetch and parse every registered client
    pub async fn list_clients(&self) -> Result<Vec<DeviceRecord>> {
        let response = self.send("Discovery", &self.discovery_request()).await?;
        parse_clients(&response)
    }

    /// Resolve the endpoint of the first registered client
    pub async fn discover(&self) -> Result<Discovery> {
        self.discover_observed(&mut ()).await
    }

    async fn discover_observed<O: Observer>(&self, observer: &mut O) -> Result<Discovery> {
        let request = self.discovery_request();
        observer.discovery_sent(&request);
        let response = self.send("Discovery", &request).await?;
        observer.discovery_received(&response);

        let endpoint = resolve_endpoint(&response)?;
        tracing::info!("Resolved device endpoint '{}'", endpoint);
        observer.endpoint_resolved(&endpoint);

        Ok(Discovery { response, endpoint })
    }

    /// Send the descriptor's request to a resolved endpoint
    pub async fn perform(
        &self,
        endpoint: &str,
        descriptor: &RequestDescriptor,
    ) -> Result<(HttpRequest, HttpResponse)> {
        self.perform_observed(endpoint, descriptor, &mut ()).await
    }

    async fn perform_observed<O: Observer>(
        &self,
        endpoint: &str,
        descriptor: &RequestDescriptor,
        observer: &mut O,
    ) -> Result<(HttpRequest, HttpResponse)> {
        let request = self.operation_request(endpoint, descriptor);
        observer.operation_sent(endpoint, &request);
        let response = self.send("Operation", &request).await?;
        observer.operation_received(&response);
        Ok((request, response))
    }

    /// Discover the device, then perform the operation
    ///
    /// Exactly one discovery request is sent, followed by exactly one
    /// operation request if discovery succeeded.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Exchange> {
        self.execute_observed(descriptor, &mut ()).await
    }

    /// [`execute`](Self::execute), reporting each message to `observer`
    pub async fn execute_observed<O: Observer>(
        &self,
        descriptor: &RequestDescriptor,
        observer: &mut O,
    ) -> Result<Exchange> {
        let discovery = self.discover_observed(observer).await?;
        let (request, response) = self
            .perform_observed(&discovery.endpoint, descriptor, observer)
            .await?;
        Ok(Exchange {
            discovery,
            request,
            response,
        })
    }
}

/// The records of a `GET /clients` reply, checked to be a 2xx JSON array
fn client_list(response: &HttpResponse) -> Result<Vec<serde_json::Value>> {
    if !response.is_success() {
        return Err(Error::device_resolution(format!(
            "server answered {} to the client list request",
            response.status
        )));
    }

    let value: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| Error::device_resolution(format!("client list is not valid JSON: {}", e)))?;

    match value {
        serde_json::Value::Array(records) => Ok(records),
        _ => Err(Error::device_resolution("client list is not a JSON array")),
    }
}

/// Parse a `GET /clients` reply into device records
pub fn parse_clients(response: &HttpResponse) -> Result<Vec<DeviceRecord>> {
    client_list(response)?
        .into_iter()
        .map(|record| {
            serde_json::from_value(record)
                .map_err(|e| Error::device_resolution(format!("malformed client record: {}", e)))
        })
        .collect()
}

/// Extract the endpoint of the first client in a `GET /clients` reply
pub fn resolve_endpoint(response: &HttpResponse) -> Result<String> {
    let records = client_list(response)?;
    let first = records
        .first()
        .ok_or_else(|| Error::device_resolution("no client is registered on the server"))?;

    match first.get("endpoint").and_then(|e| e.as_str()) {
        Some(endpoint) if !endpoint.is_empty() => Ok(endpoint.to_string()),
        _ => Err(Error::device_resolution("first client record has no 'endpoint' field")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::transport::mock::RecordingTransport;
    use crate::table::{ContentFormat, Method};
    use serde_json::json;

    const BASE: &str = "http://127.0.0.1:8080/api";

    fn read_device_name() -> RequestDescriptor {
        RequestDescriptor {
            description: None,
            method: Method::Get,
            path: "/3/0/0".to_string(),
            format: ContentFormat::Text,
            payload: None,
            then: None,
        }
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_discovers_then_performs() {
        let transport = RecordingTransport::new()
            .reply(200, r#"[{"endpoint":"dev-42","registrationId":"abc"}]"#)
            .reply(200, r#"{"status":"CONTENT","content":{"id":0,"value":"OMA"}}"#);
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let exchange = dispatcher.execute(&read_device_name()).await.unwrap();
        assert_eq!(exchange.discovery.endpoint, "dev-42");
        assert_eq!(exchange.response.status, 200);

        let requests = dispatcher.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], HttpRequest::get(format!("{}/clients", BASE)));
        assert_eq!(requests[1].method, Method::Get);
        assert_eq!(
            requests[1].url,
            "http://127.0.0.1:8080/api/clients/dev-42/3/0/0?format=Text"
        );
        assert_eq!(requests[1].body, None);
    }

    #[tokio::test]
    async fn test_discover_then_perform() {
        let transport = RecordingTransport::new()
            .reply(200, r#"[{"endpoint":"first"},{"endpoint":"second"}]"#)
            .reply(205, r#"{"status":"CONTENT"}"#);
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let discovery = dispatcher.discover().await.unwrap();
        assert_eq!(discovery.endpoint, "first");
        assert_eq!(discovery.response.status, 200);

        let (request, response) = dispatcher
            .perform(&discovery.endpoint, &read_device_name())
            .await
            .unwrap();
        assert_eq!(request, dispatcher.transport().requests()[1]);
        assert_eq!(response.status, 205);
    }

    #[tokio::test]
    async fn test_empty_client_list_stops_after_discovery() {
        let transport = RecordingTransport::new().reply(200, "[]");
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let err = dispatcher.execute(&read_device_name()).await.unwrap_err();
        assert!(matches!(err, Error::DeviceResolution(_)));
        assert_eq!(dispatcher.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_network_error_in_discovery() {
        let transport = RecordingTransport::new().fail("connection refused");
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let err = dispatcher.execute(&read_device_name()).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(dispatcher.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_network_error_in_operation() {
        let transport = RecordingTransport::new()
            .reply(200, r#"[{"endpoint":"dev"}]"#)
            .fail("connection reset");
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let err = dispatcher.execute(&read_device_name()).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(dispatcher.transport().requests().len(), 2);
    }

    #[tokio::test]
    async fn test_payload_sent_for_put() {
        let payload = json!({"id": "0", "resources": [{"id": 5750, "value": "C02"}]});
        let descriptor = RequestDescriptor {
            description: None,
            method: Method::Put,
            path: "/3300/0".to_string(),
            format: ContentFormat::Json,
            payload: Some(payload.clone()),
            then: None,
        };
        let transport = RecordingTransport::new()
            .reply(200, r#"[{"endpoint":"dev"}]"#)
            .reply(200, r#"{"status":"CHANGED"}"#);
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        dispatcher.execute(&descriptor).await.unwrap();

        let requests = dispatcher.transport().requests();
        assert_eq!(requests[1].method, Method::Put);
        assert_eq!(requests[1].body, Some(payload));
    }

    #[test]
    fn test_payload_dropped_for_delete() {
        let dispatcher = Dispatcher::new(BASE, RecordingTransport::new()).unwrap();
        let descriptor = RequestDescriptor {
            description: None,
            method: Method::Delete,
            path: "/3300/0".to_string(),
            format: ContentFormat::None,
            payload: Some(json!({"id": 1})),
            then: None,
        };

        let request = dispatcher.operation_request("dev", &descriptor);
        assert_eq!(request.body, None);
        assert_eq!(request.url, "http://127.0.0.1:8080/api/clients/dev/3300/0");
    }

    #[tokio::test]
    async fn test_endpoint_with_reserved_characters() {
        let transport = RecordingTransport::new()
            .reply(200, r#"[{"endpoint":"dev#1"}]"#)
            .reply(200, r#"{"status":"CONTENT"}"#);
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let exchange = dispatcher.execute(&read_device_name()).await.unwrap();
        assert_eq!(exchange.discovery.endpoint, "dev#1");

        let url = Url::parse(&dispatcher.transport().requests()[1].url).unwrap();
        assert_eq!(url.path(), "/api/clients/dev%231/3/0/0");
        assert_eq!(url.query(), Some("format=Text"));
        assert_eq!(url.fragment(), None);
    }

    #[derive(Default)]
    struct Log(Vec<String>);

    impl Observer for Log {
        fn discovery_sent(&mut self, request: &HttpRequest) {
            self.0.push(format!("sent {}", request));
        }
        fn discovery_received(&mut self, response: &HttpResponse) {
            self.0.push(format!("received {}", response.status));
        }
        fn endpoint_resolved(&mut self, endpoint: &str) {
            self.0.push(format!("endpoint {}", endpoint));
        }
        fn operation_sent(&mut self, _endpoint: &str, request: &HttpRequest) {
            self.0.push(format!("sent {}", request));
        }
        fn operation_received(&mut self, response: &HttpResponse) {
            self.0.push(format!("received {}", response.status));
        }
    }

    #[tokio::test]
    async fn test_observer_sees_each_message() {
        let transport = RecordingTransport::new()
            .reply(200, r#"[{"endpoint":"dev"}]"#)
            .reply(404, r#"{"status":"NOT_FOUND"}"#);
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let mut log = Log::default();
        dispatcher
            .execute_observed(&read_device_name(), &mut log)
            .await
            .unwrap();

        assert_eq!(
            log.0,
            vec![
                "sent GET http://127.0.0.1:8080/api/clients",
                "received 200",
                "endpoint dev",
                "sent GET http://127.0.0.1:8080/api/clients/dev/3/0/0?format=Text",
                "received 404",
            ]
        );
    }

    #[tokio::test]
    async fn test_observer_sees_reply_that_fails_resolution() {
        let transport = RecordingTransport::new().reply(503, "unavailable");
        let dispatcher = Dispatcher::new(BASE, transport).unwrap();

        let mut log = Log::default();
        let err = dispatcher
            .execute_observed(&read_device_name(), &mut log)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DeviceResolution(_)));
        assert_eq!(
            log.0,
            vec!["sent GET http://127.0.0.1:8080/api/clients", "received 503"]
        );
    }

    #[test]
    fn test_resolve_endpoint_failures() {
        let cases = [
            ok("not json"),
            ok(r#"{"endpoint":"dev"}"#),
            ok("[]"),
            ok(r#"[{"address":"10.0.0.1:5683"}]"#),
            ok(r#"[{"endpoint":""}]"#),
            ok(r#"[{"endpoint":42}]"#),
            HttpResponse {
                status: 500,
                body: r#"[{"endpoint":"dev"}]"#.to_string(),
            },
        ];

        for response in &cases {
            let err = resolve_endpoint(response).unwrap_err();
            assert!(
                matches!(err, Error::DeviceResolution(_)),
                "{:?} -> {:?}",
                response,
                err
            );
        }
    }

    #[test]
    fn test_resolve_endpoint_uses_first_client() {
        let response = ok(r#"[{"endpoint":"first"},{"endpoint":"second"}]"#);
        assert_eq!(resolve_endpoint(&response).unwrap(), "first");
    }

    #[test]
    fn test_parse_clients() {
        let records = json!([{
            "endpoint": "dev",
            "registrationId": "r1",
            "address": "127.0.0.1:5683",
            "lwM2mVersion": "1.0",
            "lastUpdate": "2018-06-14"
        }]);
        let response = ok(&records.to_string());
        let clients = parse_clients(&response).unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].endpoint, "dev");
        assert_eq!(clients[0].registration_id.as_deref(), Some("r1"));
        assert_eq!(clients[0].lw_m2m_version.as_deref(), Some("1.0"));

        assert!(parse_clients(&ok("[]")).unwrap().is_empty());
        assert!(parse_clients(&ok("{}")).is_err());
    }
}
