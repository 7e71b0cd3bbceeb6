// ==========================================
// 苗圃排苗系统 - 核心库
// ==========================================
// 技术栈: Rust + reqwest + SQLite（本地配置）
// 系统定位: 批次对账辅助工具（缺口/播种提醒/调拨建议,人工最终确认）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 对账规则
pub mod engine;

// 配置层 - 本地配置
pub mod config;

// 数据库基础设施（配置库连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 远程服务 + 业务接口
pub mod api;

// CSV 导出
pub mod export;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Priority, SowAnchor};

// 领域实体
pub use domain::{
    DealerQuota, OrderRequest, Plant, Slot, SlotUpdate, SlotWindow, SowingEntry, Subtype,
    TransferCandidate, TransferOption, TransferRequest,
};

// 引擎
pub use engine::{
    BookingGuard, GapCalculator, PriorityClassifier, ReminderEngine, SlotIndex, TransferPlanner,
};

// API
pub use api::{ApiError, ApiResult, NurseryClient, ReconcileApi, SlotBackend};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "苗圃排苗系统";
