// ==========================================
// 苗圃排苗系统 - API 层
// ==========================================
// 职责: 远程服务访问 + 对账业务接口,供命令行调用
// ==========================================

pub mod backend;
pub mod client;
pub mod dto;
pub mod error;
pub mod reconcile_api;

// 重导出核心类型
pub use backend::SlotBackend;
pub use client::NurseryClient;
pub use dto::{DateResolution, SlotOverview, TransferTargetsResponse};
pub use error::{ApiError, ApiResult};
pub use reconcile_api::ReconcileApi;
