// ==========================================
// 苗圃排苗系统 - 引擎层
// ==========================================
// 职责: 批次对账规则（日期索引/缺口/优先级/调拨/下单校验）
// 红线: 引擎不发起远程调用,只对快照做同步计算
// ==========================================

pub mod booking;
pub mod gap;
pub mod priority;
pub mod reminder;
pub mod slot_index;
pub mod transfer;

// 重导出核心引擎
pub use booking::{BookingGuard, BookingViolation};
pub use gap::{percent_complete, GapCalculator, GapRollup, SlotGap};
pub use priority::{
    PriorityClassifier, PriorityOutcome, DEFAULT_REMINDER_WINDOW_DAYS, MAX_LEAD_TIME_DAYS,
};
pub use reminder::{actionable, ReminderBatch, ReminderEngine, SlotReminder};
pub use slot_index::{find_slot_for_date, SlotIndex};
pub use transfer::{validate_transfer_quantity, TransferPlanner, TransferViolation};
