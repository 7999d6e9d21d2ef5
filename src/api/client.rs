use crate::error::{Result, RockonError};
use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::models::{
    Container, ContainerLabel, Device, InstallRequest, KeyValue, NetworkConnection, Page, Port,
    Rocknet, Rockon, ServiceStatus, Share, UpdateRequest, Volume,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body returned by the appliance on a failed request
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: String,
}

/// Thin client over the appliance REST API
#[derive(Clone)]
pub struct RockonClient {
    client: Client,
    base: Url,
    page_size: u32,
}

impl RockonClient {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        accept_invalid_certs: bool,
        page_size: u32,
    ) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| RockonError::BaseUrl(e.to_string()))?;
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        info!("Using appliance API at {}", base);
        Ok(Self {
            client,
            base,
            page_size,
        })
    }

    /// Host name of the appliance, used to build add-on UI links
    pub fn host(&self) -> String {
        self.base.host_str().unwrap_or("localhost").to_string()
    }

    pub async fn list_rockons(&self) -> Result<Vec<Rockon>> {
        self.get_collection("/api/rockons").await
    }

    pub async fn docker_status(&self) -> Result<ServiceStatus> {
        self.get_json("/api/sm/services/docker").await
    }

    pub async fn volumes(&self, rid: i64) -> Result<Vec<Volume>> {
        self.get_collection(&format!("/api/rockons/volumes/{rid}")).await
    }

    pub async fn ports(&self, rid: i64) -> Result<Vec<Port>> {
        self.get_collection(&format!("/api/rockons/ports/{rid}")).await
    }

    pub async fn custom_config(&self, rid: i64) -> Result<Vec<KeyValue>> {
        self.get_collection(&format!("/api/rockons/customconfig/{rid}")).await
    }

    pub async fn devices(&self, rid: i64) -> Result<Vec<Device>> {
        self.get_collection(&format!("/api/rockons/devices/{rid}")).await
    }

    pub async fn environment(&self, rid: i64) -> Result<Vec<KeyValue>> {
        self.get_collection(&format!("/api/rockons/environment/{rid}")).await
    }

    pub async fn labels(&self, rid: i64) -> Result<Vec<ContainerLabel>> {
        self.get_collection(&format!("/api/rockons/labels/{rid}")).await
    }

    pub async fn containers(&self, rid: i64) -> Result<Vec<Container>> {
        self.get_collection(&format!("/api/rockons/docker/containers/{rid}")).await
    }

    pub async fn rocknets(&self, rid: i64) -> Result<Vec<Rocknet>> {
        self.get_collection(&format!("/api/rockons/networks/{rid}")).await
    }

    pub async fn network_connections(&self) -> Result<Vec<NetworkConnection>> {
        self.get_collection("/api/network/connections").await
    }

    pub async fn shares(&self) -> Result<Vec<Share>> {
        self.get_collection("/api/shares").await
    }

    pub async fn install(&self, rid: i64, request: &InstallRequest) -> Result<()> {
        self.post(&format!("/api/rockons/{rid}/install"), Some(request)).await
    }

    pub async fn uninstall(&self, rid: i64) -> Result<()> {
        self.post::<()>(&format!("/api/rockons/{rid}/uninstall"), None).await
    }

    pub async fn start(&self, rid: i64) -> Result<()> {
        self.post::<()>(&format!("/api/rockons/{rid}/start"), None).await
    }

    pub async fn stop(&self, rid: i64) -> Result<()> {
        self.post::<()>(&format!("/api/rockons/{rid}/stop"), None).await
    }

    pub async fn update_catalog(&self) -> Result<()> {
        self.post::<()>("/api/rockons/update", None).await
    }

    pub async fn update(&self, rid: i64, request: &UpdateRequest) -> Result<()> {
        self.post(&format!("/api/rockons/{rid}/update"), Some(request)).await
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| RockonError::BaseUrl(e.to_string()))
    }

    async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .append_pair("page_size", &self.page_size.to_string());
        let page: Page<T> = self.send(Method::GET, url, None::<&()>).await?;
        Ok(page.into_items())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        self.send(Method::GET, url, None::<&()>).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<()> {
        let url = self.url(path)?;
        let _: serde_json::Value = self.send(Method::POST, url, body).await?;
        Ok(())
    }

    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<T> {
        debug!("Sending request: {} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!("Received response: {} ({} bytes)", status, bytes.len());

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
                .map(|body| body.detail)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).trim().to_string());
            error!("Request failed: {} - {}", status, message);
            return Err(RockonError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Actions may answer with an empty body
        if bytes.is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(url: &str) -> RockonClient {
        RockonClient::new(url, Duration::from_secs(5), false, 100).unwrap()
    }

    #[tokio::test]
    async fn lists_paginated_rockons() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/rockons")
            .match_query(Matcher::UrlEncoded("page_size".into(), "100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"count":1,"results":[{"id":7,"name":"Syncthing","state":"installed","status":"pending_start"}]}"#,
            )
            .create_async()
            .await;

        let rockons = client(&server.url()).list_rockons().await.unwrap();
        mock.assert_async().await;
        assert_eq!(rockons.len(), 1);
        assert!(rockons[0].is_pending());
    }

    #[tokio::test]
    async fn install_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/rockons/7/install")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "ports": {"8384": "8384"},
                "shares": {"sync": "/data"}
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let mut request = InstallRequest::default();
        request.ports.insert("8384".to_string(), "8384".to_string());
        request.shares.insert("sync".to_string(), "/data".to_string());

        client(&server.url()).install(7, &request).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn surfaces_api_detail_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/rockons/7/uninstall")
            .with_status(500)
            .with_body(r#"{"detail":"Rock-on (Syncthing) must be stopped before it can be uninstalled."}"#)
            .create_async()
            .await;

        let err = client(&server.url()).uninstall(7).await.unwrap_err();
        match err {
            RockonError::Api { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("must be stopped"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_action_body_is_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/rockons/update")
            .with_status(200)
            .create_async()
            .await;

        client(&server.url()).update_catalog().await.unwrap();
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(matches!(
            RockonClient::new("not a url", Duration::from_secs(1), false, 10),
            Err(RockonError::BaseUrl(_))
        ));
    }
}
