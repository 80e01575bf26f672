use crate::core::http::{api_url, ApiHttp};
use crate::domain::model::{
    CorrespondenceImportStatistics, CorrespondenceImportStatus, EntityCount, HealthStatus,
    ImportResponse,
};
use crate::domain::ports::{ConfigProvider, DataImportBackend};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::collections::HashMap;

/// 基本資料匯入、公文關聯資料匯入與目的端設定的用戶端
#[derive(Debug, Clone)]
pub struct DataImportClient {
    data_import: ApiHttp,
    correspondence_import: ApiHttp,
    import: ApiHttp,
    user_import: ApiHttp,
    root: ApiHttp,
}

impl DataImportClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client<C: ConfigProvider>(client: Client, config: &C) -> Self {
        let origin = config.api_base_url();
        let timeout = config.request_timeout();
        let http = |family: &str| ApiHttp::new(client.clone(), api_url(origin, family), timeout);
        Self {
            data_import: http("data-import"),
            correspondence_import: http("correspondence-import"),
            import: http("import"),
            user_import: http("user-import"),
            root: ApiHttp::new(
                client.clone(),
                format!("{}/api", origin.trim_end_matches('/')),
                timeout,
            ),
        }
    }

    pub fn with_headers(self, headers: HashMap<String, String>) -> Self {
        Self {
            data_import: self.data_import.with_headers(headers.clone()),
            correspondence_import: self.correspondence_import.with_headers(headers.clone()),
            import: self.import.with_headers(headers.clone()),
            user_import: self.user_import.with_headers(headers.clone()),
            root: self.root.with_headers(headers),
        }
    }

    pub fn base_url(&self) -> &str {
        self.data_import.base_url()
    }
}

#[async_trait]
impl DataImportBackend for DataImportClient {
    async fn import_entity(&self, entity: &str) -> ImportResponse {
        tracing::info!("📥 Importing {}", entity);
        self.data_import
            .post_import(entity, &json!({}), &format!("import {}", entity))
            .await
    }

    async fn entity_count(&self, entity: &str) -> u64 {
        match self
            .data_import
            .get_json::<EntityCount>(&format!("{}/count", entity), &[])
            .await
        {
            Ok(count) => count.count,
            Err(e) => {
                tracing::error!("❌ Failed to get {} count: {}", entity, e);
                0
            }
        }
    }

    async fn import_basic_entities(&self) -> ImportResponse {
        tracing::info!("📥 Importing all basic entities");
        self.data_import
            .post_import("basic-entities", &json!({}), "import basic entities")
            .await
    }

    async fn import_related(&self, related_entity: &str, doc_guid: &str) -> ImportResponse {
        self.data_import
            .post_import(
                &format!("{}/{}", related_entity, doc_guid),
                &json!({}),
                &format!("import {} for {}", related_entity, doc_guid),
            )
            .await
    }

    async fn correspondence_import_statistics(&self) -> CorrespondenceImportStatistics {
        match self.correspondence_import.get_json("statistics", &[]).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("❌ Failed to get correspondence import statistics: {}", e);
                CorrespondenceImportStatistics::default()
            }
        }
    }

    async fn correspondence_import_statuses(&self) -> Vec<CorrespondenceImportStatus> {
        match self.correspondence_import.get_json("status", &[]).await {
            Ok(statuses) => statuses,
            Err(e) => {
                tracing::error!("❌ Failed to get correspondence import statuses: {}", e);
                Vec::new()
            }
        }
    }

    async fn import_correspondence_related(&self, correspondence_guid: &str) -> ImportResponse {
        self.correspondence_import
            .post_import(
                &format!("correspondence/{}/related", correspondence_guid),
                &json!({}),
                &format!("import related data for {}", correspondence_guid),
            )
            .await
    }

    async fn retry_failed_correspondence_imports(&self) -> ImportResponse {
        self.correspondence_import
            .post_import(
                "retry-failed",
                &json!({}),
                "retry failed correspondence imports",
            )
            .await
    }

    async fn reset_correspondence_import(&self, correspondence_guid: &str) -> ImportResponse {
        self.correspondence_import
            .post_import(
                &format!("reset/{}", correspondence_guid),
                &json!({}),
                &format!("reset correspondence import for {}", correspondence_guid),
            )
            .await
    }

    async fn import_external_agencies(&self) -> ImportResponse {
        self.import
            .post_import("external-agencies", &json!({}), "import external agencies")
            .await
    }

    async fn import_users_to_destination(&self) -> ImportResponse {
        self.user_import
            .post_import(
                "users-to-destination",
                &json!({}),
                "import users to destination",
            )
            .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.root.get_json("health", &[]).await
    }
}
