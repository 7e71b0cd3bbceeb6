// ==========================================
// 苗圃排苗系统 - 远程服务 HTTP 客户端
// ==========================================
// 职责: SlotBackend 的 REST 实现
// 约定:
// - 响应体可以是裸 JSON,也可以是 { "data": ... } 包装
// - 写请求带 X-Request-Id（uuid v4）便于服务端排查
// - 失败只记录并返回错误,不重试（由用户手动刷新/重试）
// ==========================================

use crate::api::backend::SlotBackend;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ReconcileSettings;
use crate::domain::plant::Plant;
use crate::domain::quota::DealerQuota;
use crate::domain::slot::Slot;
use crate::domain::transfer::{
    OrderRequest, SlotUpdate, SowingEntry, TransferCandidate, TransferRequest,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// 响应体: 裸数据或 { data } 包装
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

// ==========================================
// NurseryClient
// ==========================================
pub struct NurseryClient {
    base_url: Url,
    token: Option<String>,
    http: Client,
}

impl NurseryClient {
    /// 创建客户端
    ///
    /// # 错误
    /// - base_url 无法解析或不能作为基础地址 → ConfigError
    pub fn new(base_url: &str, timeout_secs: u64, token: Option<String>) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::ConfigError(format!("api_base_url 无效: {} ({})", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::ConfigError(format!("api_base_url 不能作为基础地址: {}", base_url)));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("HTTP 客户端初始化失败: {}", e)))?;

        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    pub fn from_settings(settings: &ReconcileSettings) -> ApiResult<Self> {
        Self::new(
            &settings.api_base_url,
            settings.api_timeout_secs,
            settings.api_token.clone(),
        )
    }

    /// 拼接路径（每段单独编码）
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::ConfigError(format!("api_base_url 不能作为基础地址: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 非 2xx 转为 RemoteStatus
    async fn check_status(resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "远程服务返回错误状态");
        Err(ApiError::RemoteStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(segments)?;
        debug!(url = %url, "GET");

        let resp = self
            .request(Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "远程服务请求失败");
                ApiError::from(e)
            })?;
        let resp = Self::check_status(resp).await?;

        let envelope: Envelope<T> = resp.json().await?;
        Ok(envelope.into_inner())
    }

    async fn send_write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> ApiResult<()> {
        let url = self.url(segments)?;
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(url = %url, method = %method, request_id = %request_id, "写请求");

        let resp = self
            .request(method, url)
            .header("X-Request-Id", &request_id)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, request_id = %request_id, "远程服务请求失败");
                ApiError::from(e)
            })?;
        Self::check_status(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl SlotBackend for NurseryClient {
    async fn fetch_plants(&self) -> ApiResult<Vec<Plant>> {
        self.get_json(&["plants"], &[]).await
    }

    async fn fetch_slots(&self, plant_id: &str, subtype_id: &str) -> ApiResult<Vec<Slot>> {
        self.get_json(&["plants", plant_id, "subtypes", subtype_id, "slots"], &[])
            .await
    }

    async fn fetch_transfer_candidates(
        &self,
        slot_id: &str,
        back_days: i64,
        forward_days: i64,
    ) -> ApiResult<Vec<TransferCandidate>> {
        self.get_json(
            &["slots", slot_id, "transfer-candidates"],
            &[
                ("backDays", back_days.to_string()),
                ("forwardDays", forward_days.to_string()),
            ],
        )
        .await
    }

    async fn fetch_dealer_quota(&self, dealer_id: &str, slot_id: &str) -> ApiResult<Option<DealerQuota>> {
        match self.get_json(&["dealers", dealer_id, "quotas", slot_id], &[]).await {
            Ok(quota) => Ok(Some(quota)),
            Err(ApiError::RemoteStatus { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn update_slot(&self, slot_id: &str, update: &SlotUpdate) -> ApiResult<()> {
        if update.is_empty() {
            return Err(ApiError::InvalidInput("批次更新内容为空".to_string()));
        }
        self.send_write(Method::PATCH, &["slots", slot_id], update).await
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> ApiResult<()> {
        self.send_write(Method::POST, &["slots", "transfers"], request).await
    }

    async fn submit_sowing(&self, entry: &SowingEntry) -> ApiResult<()> {
        self.send_write(Method::POST, &["sowing"], entry).await
    }

    async fn submit_order(&self, order: &OrderRequest) -> ApiResult<()> {
        self.send_write(Method::POST, &["orders"], order).await
    }
}
