use crate::domain::model::ImportResponse;
use crate::utils::error::{MigrationError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// 後端 `/api/<family>` 的共用 HTTP 存取層
#[derive(Debug, Clone)]
pub struct ApiHttp {
    client: Client,
    base_url: String,
    headers: HashMap<String, String>,
    timeout: Duration,
}

/// `{origin}/api/{family}`，origin 結尾的 `/` 會被去掉
pub fn api_url(origin: &str, family: &str) -> String {
    format!("{}/api/{}", origin.trim_end_matches('/'), family)
}

impl ApiHttp {
    pub fn new(client: Client, base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            headers: HashMap::new(),
            timeout,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request
            .timeout(self.timeout)
            .header("Accept", "application/json");
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = self.prepare(request).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {} for {}", status, url);

        if !status.is_success() {
            return Err(MigrationError::ApiStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {} {:?}", url, params);
        let request = self.client.get(&url).query(params);
        self.send(request, &url).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);
        self.send(request, &url).await
    }

    /// 觸發類請求：任何失敗都換成 `ERROR` 回應，不會往上拋
    pub async fn post_import(
        &self,
        path: &str,
        body: &serde_json::Value,
        context: &str,
    ) -> ImportResponse {
        match self.post_json::<ImportResponse>(path, body).await {
            Ok(response) => {
                tracing::info!(
                    "✅ {}: {} ({} ok / {} failed)",
                    context,
                    response.status,
                    response.successful_imports,
                    response.failed_imports
                );
                response
            }
            Err(e) => {
                tracing::error!("❌ Failed to {}: {}", context, e);
                ImportResponse::failure(context, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trims_trailing_slash() {
        assert_eq!(
            api_url("http://localhost:8080/data-import/", "incoming-migration"),
            "http://localhost:8080/data-import/api/incoming-migration"
        );
        assert_eq!(
            api_url("http://host", "health"),
            "http://host/api/health"
        );
    }

    #[test]
    fn test_url_joins_paths() {
        let http = ApiHttp::new(
            Client::new(),
            "http://host/api/data-import".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(http.url("users/count"), "http://host/api/data-import/users/count");
        assert_eq!(http.url("/users"), "http://host/api/data-import/users");
        assert_eq!(http.url(""), "http://host/api/data-import");
    }
}
