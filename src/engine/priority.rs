// ==========================================
// 苗圃排苗系统 - 播种提醒优先级判定引擎
// ==========================================
// 红线: 优先级是"等级制",顺序执行,命中即返回
// ==========================================
// 职责: 根据缺口、育苗天数、提醒窗口、今天日期判定优先级
// 输入: SlotGap + SlotWindow + 育苗天数 + 提醒窗口
// 输出: Priority + 最晚播种日 + 提醒日 + 原因 JSON
// ==========================================

use crate::domain::date::{format_day, serialize_opt_day};
use crate::domain::slot::{Slot, SlotWindow};
use crate::domain::types::{Priority, SowAnchor};
use crate::engine::gap::{GapCalculator, SlotGap};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::json;

/// 默认提醒窗口（天）
pub const DEFAULT_REMINDER_WINDOW_DAYS: i64 = 5;

/// 育苗天数上限（写入校验用）
pub const MAX_LEAD_TIME_DAYS: i64 = 3650;

/// date - days,超出日期范围返回 None
pub(crate) fn days_before(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_sub_signed(Duration::try_days(days)?)
}

/// date + days,超出日期范围返回 None
pub(crate) fn days_after(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

// ==========================================
// PriorityOutcome - 判定结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOutcome {
    pub priority: Priority,
    #[serde(serialize_with = "serialize_opt_day")]
    pub sow_by_date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_opt_day")]
    pub alert_date: Option<NaiveDate>,
    pub days_until_sow: Option<i64>,
    /// 原因 JSON（primary_reason + factors + details）
    pub reason: String,
}

// ==========================================
// PriorityClassifier - 优先级判定引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityClassifier {
    anchor: SowAnchor,
}

impl PriorityClassifier {
    pub fn new(anchor: SowAnchor) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> SowAnchor {
        self.anchor
    }

    /// 判定优先级
    ///
    /// 规则（顺序执行,命中即返回）:
    /// 1) booked == 0 且 gap <= 0 → NoBooking
    /// 2) gap <= 0 → Complete
    /// 3) 育苗天数缺失或为 0 → MissingLeadTime（不允许落入 Upcoming）
    /// 4) sow_by = 锚点日 - 育苗天数; alert = sow_by - 提醒窗口;
    ///    days_until_sow = sow_by - today
    ///    - days_until_sow < 0 → Overdue
    ///    - today >= alert → Urgent
    ///    - 其他 → Upcoming
    ///
    /// # 返回
    /// - None: 育苗天数或提醒窗口推算出的日期超出日历范围（数据异常,由调用方跳过）
    pub fn classify(
        &self,
        gap: &SlotGap,
        window: SlotWindow,
        lead_time_days: Option<i64>,
        reminder_window_days: i64,
        today: NaiveDate,
    ) -> Option<PriorityOutcome> {
        // 规则1: 无预订
        if gap.booked == 0 && gap.gap <= 0 {
            return Some(Self::without_dates(
                Priority::NoBooking,
                json!({
                    "priority": Priority::NoBooking.to_string(),
                    "primary_reason": "NO_BOOKING",
                    "factors": ["booked=0", format!("gap={}", gap.gap)],
                }),
            ));
        }

        // 规则2: 已播足
        if gap.gap <= 0 {
            return Some(Self::without_dates(
                Priority::Complete,
                json!({
                    "priority": Priority::Complete.to_string(),
                    "primary_reason": "COMPLETE",
                    "factors": [format!("gap={}", gap.gap), format!("surplus={}", gap.surplus)],
                }),
            ));
        }

        // 规则3: 育苗天数缺失（必须单独提示运营人员配置）
        let lead = match lead_time_days {
            Some(days) if days > 0 => days,
            _ => {
                return Some(Self::without_dates(
                    Priority::MissingLeadTime,
                    json!({
                        "priority": Priority::MissingLeadTime.to_string(),
                        "primary_reason": "MISSING_LEAD_TIME",
                        "factors": [format!("gap={}", gap.gap), "plant_ready_days missing or 0"],
                    }),
                ));
            }
        };

        // 规则4: 按日期判定
        let anchor_date = match self.anchor {
            SowAnchor::Start => window.start,
            SowAnchor::End => window.end,
        };
        let window_days = reminder_window_days.max(0);
        let sow_by = days_before(anchor_date, lead)?;
        let alert = days_before(sow_by, window_days)?;
        let days_until_sow = (sow_by - today).num_days();

        let (priority, primary_reason) = if days_until_sow < 0 {
            (Priority::Overdue, "OVERDUE")
        } else if today >= alert {
            (Priority::Urgent, "WITHIN_REMINDER_WINDOW")
        } else {
            (Priority::Upcoming, "BEFORE_REMINDER_WINDOW")
        };

        let reason = json!({
            "priority": priority.to_string(),
            "primary_reason": primary_reason,
            "factors": [
                format!("gap={}", gap.gap),
                format!("plant_ready_days={}", lead),
                format!("reminder_window_days={}", window_days),
            ],
            "details": {
                "anchor": self.anchor.to_string(),
                "anchor_date": format_day(anchor_date),
                "sow_by_date": format_day(sow_by),
                "alert_date": format_day(alert),
                "today": format_day(today),
                "days_until_sow": days_until_sow,
            }
        });

        Some(PriorityOutcome {
            priority,
            sow_by_date: Some(sow_by),
            alert_date: Some(alert),
            days_until_sow: Some(days_until_sow),
            reason: reason.to_string(),
        })
    }

    /// 直接对批次快照判定
    ///
    /// # 返回
    /// - None: 批次日期无效或推算日期越界（数据异常,由调用方跳过）
    pub fn classify_slot(
        &self,
        slot: &Slot,
        lead_time_days: Option<i64>,
        reminder_window_days: i64,
        today: NaiveDate,
    ) -> Option<PriorityOutcome> {
        let window = slot.window()?;
        let gap = GapCalculator::new().compute_gap(slot);
        self.classify(&gap, window, lead_time_days, reminder_window_days, today)
    }

    fn without_dates(priority: Priority, reason: serde_json::Value) -> PriorityOutcome {
        PriorityOutcome {
            priority,
            sow_by_date: None,
            alert_date: None,
            days_until_sow: None,
            reason: reason.to_string(),
        }
    }
}
