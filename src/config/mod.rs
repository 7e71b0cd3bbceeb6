// ==========================================
// 苗圃排苗系统 - 配置层
// ==========================================
// 职责: 客户端配置管理,支持作物级覆写
// 存储: 本地 SQLite config_kv 表
// ==========================================

pub mod config_manager;
pub mod reconcile_config_trait;

// 重导出核心配置管理器
pub use config_manager::{
    config_keys, defaults, get_default_db_path, ConfigManager, ConfigScope, ReconcileSettings,
};
pub use reconcile_config_trait::ReconcileConfigReader;
