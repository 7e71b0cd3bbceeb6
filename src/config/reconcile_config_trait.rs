// ==========================================
// 苗圃排苗系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义对账/提醒/调拨所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::SowAnchor;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ReconcileConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReconcileConfigReader: Send + Sync {
    // ===== 提醒配置 =====

    /// 获取提醒窗口天数（全局）
    ///
    /// # 默认值
    /// - 5
    async fn get_reminder_window_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 获取某作物的提醒窗口天数
    ///
    /// 作物级配置缺失时回退到全局配置
    async fn get_reminder_window_days_for_plant(
        &self,
        plant_id: &str,
    ) -> Result<i64, Box<dyn Error>>;

    /// 获取播种锚点
    ///
    /// # 默认值
    /// - START
    async fn get_sow_anchor(&self) -> Result<SowAnchor, Box<dyn Error>>;

    // ===== 调拨配置 =====

    /// 候选批次向前（早于源批次）搜索天数
    ///
    /// # 默认值
    /// - 7
    async fn get_transfer_back_days(&self) -> Result<i64, Box<dyn Error>>;

    /// 候选批次向后（晚于源批次）搜索天数
    ///
    /// # 默认值
    /// - 14
    async fn get_transfer_forward_days(&self) -> Result<i64, Box<dyn Error>>;

    // ===== 远程服务配置 =====

    /// 远程服务基础地址
    async fn get_api_base_url(&self) -> Result<String, Box<dyn Error>>;

    /// 请求超时（秒）
    async fn get_api_timeout_secs(&self) -> Result<u64, Box<dyn Error>>;

    /// 访问令牌（可选）
    async fn get_api_token(&self) -> Result<Option<String>, Box<dyn Error>>;
}
