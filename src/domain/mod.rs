// ==========================================
// 苗圃排苗系统 - 领域模型层
// ==========================================
// 职责: 定义批次、作物、品种、调拨、配额等实体与类型
// 红线: 不含远程调用逻辑,不含引擎逻辑
// ==========================================

pub mod date;
pub mod plant;
pub mod quota;
pub mod slot;
pub mod transfer;
pub mod types;

// 重导出核心类型
pub use date::{format_day, parse_day, DAY_FORMAT};
pub use plant::{effective_lead_time, Plant, Subtype, SubtypeSlots};
pub use quota::DealerQuota;
pub use slot::{Slot, SlotWindow, UNKNOWN_MONTH};
pub use transfer::{
    OrderRequest, SlotUpdate, SowingEntry, TransferCandidate, TransferOption, TransferRequest,
};
pub use types::{Priority, SowAnchor};
