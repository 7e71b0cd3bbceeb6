// ==========================================
// 苗圃排苗系统 - 批次 (Slot) 领域模型
// ==========================================
// 批次 = 一个固定日期区间的出苗/交付窗口,带预订容量
// 对齐: 远程服务 slot 记录 (camelCase JSON)
// ==========================================

use crate::domain::date::parse_day;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Slot - 批次快照
// ==========================================
// 红线: 只读快照,权威状态在远程服务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,

    // ===== 日期区间 (DD-MM-YYYY,闭区间) =====
    pub start_day: String,
    pub end_day: String,

    /// 月份标签（缺失时由开始日推导）
    #[serde(default)]
    pub month: Option<String>,

    // ===== 数量 =====
    #[serde(default)]
    pub total_plants: i64, // 可供苗数
    #[serde(default)]
    pub total_booked_plants: i64, // 已预订
    #[serde(default)]
    pub primary_sowed: i64, // 主圃已播
    #[serde(default)]
    pub office_sowed: i64, // 办公点已播

    /// 批次级育苗天数覆写（优先于品种默认值）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_ready_days: Option<i64>,
}

/// 解析后的批次日期区间 [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SlotWindow {
    /// 闭区间包含判断（两端都包含）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Slot {
    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_day(&self.start_day)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        parse_day(&self.end_day)
    }

    /// 解析日期区间
    ///
    /// # 返回
    /// - None: 任一日期格式错误,或 start > end（违反区间不变量）
    pub fn window(&self) -> Option<SlotWindow> {
        let start = self.start_date()?;
        let end = self.end_date()?;
        if start > end {
            return None;
        }
        Some(SlotWindow { start, end })
    }

    /// 已播合计（主圃 + 办公点）
    pub fn sowed(&self) -> i64 {
        self.primary_sowed.max(0).saturating_add(self.office_sowed.max(0))
    }

    /// 可接受新订单的数量 max(0, 可供苗数 - 已预订)
    pub fn bookable(&self) -> i64 {
        self.total_plants.max(0).saturating_sub(self.total_booked_plants.max(0)).max(0)
    }

    /// 月份标签
    ///
    /// 规则: 优先使用远程服务给出的 month;
    /// 缺失或空白时按开始日推导（如 "July 2025"）;
    /// 开始日也无法解析时返回 "UNKNOWN"
    pub fn month_label(&self) -> String {
        match self.month.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => self
                .start_date()
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_else(|| UNKNOWN_MONTH.to_string()),
        }
    }
}

/// 无法确定月份时的分组标签
pub const UNKNOWN_MONTH: &str = "UNKNOWN";
