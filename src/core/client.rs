use crate::core::http::{api_url, ApiHttp};
use crate::domain::model::{CreationStatistics, ImportResponse, MigrationStatistics, PaginatedResponse};
use crate::domain::phase::{Phase, Pipeline};
use crate::domain::ports::{ConfigProvider, DetailQuery, MigrationBackend};
use crate::domain::row::DetailRow;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;

/// 單一遷移管線的 REST 用戶端，base path 為 `{origin}/api/{pipeline}-migration`
#[derive(Debug, Clone)]
pub struct MigrationClient {
    pipeline: Pipeline,
    http: ApiHttp,
}

impl MigrationClient {
    pub fn new<C: ConfigProvider>(config: &C, pipeline: Pipeline) -> Self {
        Self::with_client(Client::new(), config, pipeline)
    }

    /// 多條管線共用同一個連線池
    pub fn with_client<C: ConfigProvider>(client: Client, config: &C, pipeline: Pipeline) -> Self {
        let base_url = api_url(config.api_base_url(), pipeline.path_segment());
        Self {
            pipeline,
            http: ApiHttp::new(client, base_url, config.request_timeout()),
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.http = self.http.with_headers(headers);
        self
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    fn label(&self) -> String {
        self.pipeline.label().to_lowercase()
    }
}

/// 建立明細端點回傳整份清單，可能是純陣列或 `{content, totalElements}`
fn unwrap_listing<R: DetailRow>(value: Value) -> Result<Vec<R>> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(mut map) => match map.remove("content") {
            Some(content @ Value::Array(_)) => Ok(serde_json::from_value(content)?),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

#[async_trait]
impl MigrationBackend for MigrationClient {
    fn pipeline(&self) -> Pipeline {
        self.pipeline
    }

    async fn execute_phase(&self, phase: Phase) -> ImportResponse {
        let context = format!("execute {} {} phase", self.label(), phase.display_name().to_lowercase());
        if let Err(e) = self.pipeline.ensure_supports(phase) {
            return ImportResponse::failure(&context, e);
        }

        tracing::info!("🚀 Executing {} phase for {} pipeline", phase, self.label());
        self.http.post_import(phase.path(), &json!({}), &context).await
    }

    async fn execute_specific(&self, phase: Phase, guids: &[String]) -> ImportResponse {
        let context = format!(
            "execute {} {} for specific records",
            self.label(),
            phase.display_name().to_lowercase()
        );
        if let Err(e) = self.pipeline.ensure_supports(phase) {
            return ImportResponse::failure(&context, e);
        }
        let Some(id_field) = phase.id_field() else {
            return ImportResponse::failure(
                &context,
                format!("phase '{}' cannot be executed for specific records", phase),
            );
        };

        tracing::info!(
            "🎯 Executing {} for {} specific record(s) in {} pipeline",
            phase,
            guids.len(),
            self.label()
        );
        let mut body = serde_json::Map::new();
        body.insert(id_field.to_string(), json!(guids));
        self.http
            .post_import(
                &format!("{}/execute-specific", phase.path()),
                &Value::Object(body),
                &context,
            )
            .await
    }

    async fn retry_failed(&self) -> ImportResponse {
        let context = format!("retry failed {} migrations", self.label());
        tracing::info!("🔁 Retrying failed {} migrations", self.label());
        self.http.post_import("retry-failed", &json!({}), &context).await
    }

    async fn statistics(&self) -> Result<MigrationStatistics> {
        let stats: MigrationStatistics = self.http.get_json("statistics", &[]).await?;
        tracing::debug!("{} statistics: {:?}", self.pipeline.label(), stats);
        Ok(stats)
    }

    async fn creation_statistics(&self) -> Result<CreationStatistics> {
        self.http.get_json("creation/statistics", &[]).await
    }

    async fn details<R: DetailRow>(&self, query: &DetailQuery) -> Result<PaginatedResponse<R>> {
        self.pipeline.ensure_supports(R::PHASE)?;
        let path = format!("{}/details", R::PHASE.path());

        if !R::SERVER_PAGED {
            let raw: Value = self.http.get_json(&path, &[]).await?;
            let rows = unwrap_listing::<R>(raw)?;
            tracing::info!("📋 Loaded {} {} row(s)", rows.len(), R::PHASE);
            return Ok(PaginatedResponse::single_page(rows));
        }

        let page: PaginatedResponse<R> = self.http.get_json(&path, &query.to_params()).await?;
        tracing::info!(
            "📋 Loaded {} {} row(s), page {} of {}",
            page.content.len(),
            R::PHASE,
            page.current_page + 1,
            page.total_pages
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CreationDetail;

    #[test]
    fn test_unwrap_listing_accepts_both_shapes() {
        let bare = json!([{"correspondenceGuid": "A"}, {"correspondenceGuid": "B"}]);
        let wrapped = json!({"content": [{"correspondenceGuid": "C"}], "totalElements": 1});

        let rows: Vec<CreationDetail> = unwrap_listing(bare).unwrap();
        assert_eq!(rows.len(), 2);
        let rows: Vec<CreationDetail> = unwrap_listing(wrapped).unwrap();
        assert_eq!(rows[0].correspondence_guid, "C");
        let rows: Vec<CreationDetail> = unwrap_listing(json!({"unexpected": true})).unwrap();
        assert!(rows.is_empty());
    }
}
