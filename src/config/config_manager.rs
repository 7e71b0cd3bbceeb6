// ==========================================
// 苗圃排苗系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 作用域: global / plant:{plant_id}（作物级覆写,缺失回退 global）
// ==========================================

use crate::config::reconcile_config_trait::ReconcileConfigReader;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::types::SowAnchor;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ReconcileSettings - 一次性读取的配置快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    pub reminder_window_days: i64,
    pub sow_anchor: SowAnchor,
    pub transfer_back_days: i64,
    pub transfer_forward_days: i64,
    pub api_base_url: String,
    pub api_timeout_secs: u64,
    pub api_token: Option<String>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            reminder_window_days: defaults::REMINDER_WINDOW_DAYS,
            sow_anchor: SowAnchor::Start,
            transfer_back_days: defaults::TRANSFER_BACK_DAYS,
            transfer_forward_days: defaults::TRANSFER_FORWARD_DAYS,
            api_base_url: defaults::API_BASE_URL.to_string(),
            api_timeout_secs: defaults::API_TIMEOUT_SECS,
            api_token: None,
        }
    }
}

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
    Plant { plant_id: String },
}

impl ConfigScope {
    pub fn scope_id(&self) -> String {
        match self {
            ConfigScope::Global => "global".to_string(),
            ConfigScope::Plant { plant_id } => format!("plant:{}", plant_id),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（会自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取指定作用域的配置值
    fn get_scoped_value(&self, scope: &ConfigScope, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope.scope_id(), key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_scoped_value(&ConfigScope::Global, key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取非负整数配置,格式错误时告警并回退默认值
    fn get_non_negative_or_default(&self, key: &str, default: i64) -> Result<i64, Box<dyn Error>> {
        let raw = self.get_config_or_default(key, &default.to_string())?;
        Ok(parse_non_negative(key, &raw).unwrap_or(default))
    }

    /// 写入配置（UPSERT）
    ///
    /// 已知数值键会先校验格式,非法值直接拒绝
    pub fn set_config_value(&self, scope: &ConfigScope, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        validate_config_value(key, value)?;

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![scope.scope_id(), key, value.trim()],
        )?;

        tracing::info!(scope = %scope.scope_id(), key, value, "配置已更新");
        Ok(())
    }

    /// 删除配置（恢复默认/回退上级作用域）
    pub fn remove_config_value(&self, scope: &ConfigScope, key: &str) -> Result<bool, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope.scope_id(), key],
        )?;
        Ok(affected > 0)
    }

    /// 列出某作用域的全部配置（按 key 排序）
    pub fn list_configs(&self, scope: &ConfigScope) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let rows = stmt.query_map(params![scope.scope_id()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            out.insert(key, value);
        }
        Ok(out)
    }

    /// 获取 global 配置快照（JSON）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let config_map = self.list_configs(&ConfigScope::Global)?;
        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复 global 配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 快照中任一值非法则整体回滚
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;
        for (key, value) in &config_map {
            validate_config_value(key, value)?;
        }

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in &config_map {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value],
            )?;
        }
        tx.commit()?;

        Ok(count)
    }

    /// 一次性读取全部对账配置
    pub fn load_settings(&self) -> Result<ReconcileSettings, Box<dyn Error>> {
        let anchor_raw = self.get_config_or_default(config_keys::SOW_ANCHOR, "START")?;
        let sow_anchor = SowAnchor::parse(&anchor_raw).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::SOW_ANCHOR,
                raw_value = %anchor_raw,
                "播种锚点配置无法识别，使用 START"
            );
            SowAnchor::Start
        });

        let timeout = self.get_non_negative_or_default(
            config_keys::API_TIMEOUT_SECS,
            defaults::API_TIMEOUT_SECS as i64,
        )?;

        Ok(ReconcileSettings {
            reminder_window_days: self.get_non_negative_or_default(
                config_keys::REMINDER_WINDOW_DAYS,
                defaults::REMINDER_WINDOW_DAYS,
            )?,
            sow_anchor,
            transfer_back_days: self.get_non_negative_or_default(
                config_keys::TRANSFER_BACK_DAYS,
                defaults::TRANSFER_BACK_DAYS,
            )?,
            transfer_forward_days: self.get_non_negative_or_default(
                config_keys::TRANSFER_FORWARD_DAYS,
                defaults::TRANSFER_FORWARD_DAYS,
            )?,
            api_base_url: self.get_config_or_default(config_keys::API_BASE_URL, defaults::API_BASE_URL)?,
            api_timeout_secs: timeout as u64,
            api_token: self
                .get_global_config_value(config_keys::API_TOKEN)?
                .filter(|t| !t.trim().is_empty()),
        })
    }
}

// ==========================================
// ReconcileConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReconcileConfigReader for ConfigManager {
    async fn get_reminder_window_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_non_negative_or_default(config_keys::REMINDER_WINDOW_DAYS, defaults::REMINDER_WINDOW_DAYS)
    }

    async fn get_reminder_window_days_for_plant(&self, plant_id: &str) -> Result<i64, Box<dyn Error>> {
        let scope = ConfigScope::Plant {
            plant_id: plant_id.to_string(),
        };
        let scoped = self
            .get_scoped_value(&scope, config_keys::REMINDER_WINDOW_DAYS)?
            .and_then(|raw| parse_non_negative(config_keys::REMINDER_WINDOW_DAYS, &raw));

        match scoped {
            Some(v) => Ok(v),
            None => self.get_reminder_window_days().await,
        }
    }

    async fn get_sow_anchor(&self) -> Result<SowAnchor, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::SOW_ANCHOR, "START")?;
        Ok(SowAnchor::parse(&value).unwrap_or(SowAnchor::Start))
    }

    async fn get_transfer_back_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_non_negative_or_default(config_keys::TRANSFER_BACK_DAYS, defaults::TRANSFER_BACK_DAYS)
    }

    async fn get_transfer_forward_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_non_negative_or_default(config_keys::TRANSFER_FORWARD_DAYS, defaults::TRANSFER_FORWARD_DAYS)
    }

    async fn get_api_base_url(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::API_BASE_URL, defaults::API_BASE_URL)
    }

    async fn get_api_timeout_secs(&self) -> Result<u64, Box<dyn Error>> {
        let v = self.get_non_negative_or_default(config_keys::API_TIMEOUT_SECS, defaults::API_TIMEOUT_SECS as i64)?;
        Ok(v as u64)
    }

    async fn get_api_token(&self) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(config_keys::API_TOKEN)?
            .filter(|t| !t.trim().is_empty()))
    }
}

fn parse_non_negative(key: &str, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 0 => Some(v),
        _ => {
            tracing::warn!(config_key = key, raw_value = %raw, "配置值非法，使用默认值");
            None
        }
    }
}

/// 写入前校验已知键的值
fn validate_config_value(key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    match key {
        config_keys::REMINDER_WINDOW_DAYS
        | config_keys::TRANSFER_BACK_DAYS
        | config_keys::TRANSFER_FORWARD_DAYS => match value.trim().parse::<i64>() {
            Ok(v) if (0..=defaults::MAX_DAYS).contains(&v) => Ok(()),
            _ => Err(format!(
                "配置 {} 必须是 0..={} 的整数: {}",
                key,
                defaults::MAX_DAYS,
                value
            )
            .into()),
        },
        config_keys::API_TIMEOUT_SECS => match value.trim().parse::<i64>() {
            Ok(v) if v >= 0 => Ok(()),
            _ => Err(format!("配置 {} 必须是非负整数: {}", key, value).into()),
        },
        config_keys::SOW_ANCHOR => match SowAnchor::parse(value) {
            Some(_) => Ok(()),
            None => Err(format!("配置 {} 只能是 START 或 END: {}", key, value).into()),
        },
        config_keys::API_BASE_URL => {
            let v = value.trim();
            if v.starts_with("http://") || v.starts_with("https://") {
                Ok(())
            } else {
                Err(format!("配置 {} 必须以 http:// 或 https:// 开头: {}", key, value).into())
            }
        }
        _ => Ok(()),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 提醒
    pub const REMINDER_WINDOW_DAYS: &str = "reminder_window_days";
    pub const SOW_ANCHOR: &str = "sow_anchor";

    // 调拨
    pub const TRANSFER_BACK_DAYS: &str = "transfer_back_days";
    pub const TRANSFER_FORWARD_DAYS: &str = "transfer_forward_days";

    // 远程服务
    pub const API_BASE_URL: &str = "api_base_url";
    pub const API_TIMEOUT_SECS: &str = "api_timeout_secs";
    pub const API_TOKEN: &str = "api_token";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const REMINDER_WINDOW_DAYS: i64 = 5;
    pub const TRANSFER_BACK_DAYS: i64 = 7;
    pub const TRANSFER_FORWARD_DAYS: i64 = 14;
    pub const API_BASE_URL: &str = "http://localhost:8080/api";
    pub const API_TIMEOUT_SECS: u64 = 15;

    /// 天数类配置上限
    pub const MAX_DAYS: i64 = 3650;
}

/// 默认配置库路径
///
/// 优先使用环境变量 NURSERY_SLOTS_DB_PATH,其次为用户数据目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("NURSERY_SLOTS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = std::path::PathBuf::from(".");
    if let Some(data_dir) = dirs::data_dir() {
        path = data_dir.join("nursery-slot-planner");
        if let Err(e) = std::fs::create_dir_all(&path) {
            tracing::warn!(error = %e, path = %path.display(), "无法创建数据目录，回退到当前目录");
            path = std::path::PathBuf::from(".");
        }
    }

    path.join("nursery_slots.db").to_string_lossy().to_string()
}
