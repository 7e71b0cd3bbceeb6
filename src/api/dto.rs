// ==========================================
// 苗圃排苗系统 - API 响应结构
// ==========================================
// 职责: ReconcileApi 对外返回的组合视图
// ==========================================

use crate::engine::gap::GapRollup;
use crate::engine::reminder::SlotReminder;
use crate::domain::transfer::TransferOption;
use serde::Serialize;

// ==========================================
// SlotOverview - 品种批次总览
// ==========================================
/// 某品种下全部批次的缺口 + 优先级 + 月度汇总
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOverview {
    pub plant_id: String,
    pub subtype_id: String,
    pub subtype_name: String,
    pub as_of: String,

    /// 每个批次一行（按开始日期升序）
    pub rows: Vec<SlotReminder>,
    pub months: Vec<GapRollup>,
    /// 品种合计
    pub total: GapRollup,

    /// 日期无效被跳过的批次
    pub skipped_slot_ids: Vec<String>,
}

impl SlotOverview {
    pub fn actionable_count(&self) -> usize {
        self.rows.iter().filter(|r| r.priority.is_actionable()).count()
    }
}

// ==========================================
// TransferTargetsResponse - 调拨目标
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTargetsResponse {
    pub source_slot_id: String,
    /// 源批次可调出数量（来自规范缺口）
    pub source_surplus: i64,
    pub back_days: i64,
    pub forward_days: i64,
    pub options: Vec<TransferOption>,
}

impl TransferTargetsResponse {
    /// 没有可调入批次（正常结果,界面提示即可）
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

// ==========================================
// DateResolution - 日期 → 批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateResolution {
    pub day: String,
    pub slot_id: Option<String>,
}

impl DateResolution {
    pub fn is_selectable(&self) -> bool {
        self.slot_id.is_some()
    }
}
