// ==========================================
// 苗圃排苗系统 - 播种提醒批量生成
// ==========================================
// 职责: 对某品种下的全部批次批量计算缺口 + 优先级
// 红线: 提醒是读时派生数据,不持久化
// 红线: 单条批次数据异常不阻断其余批次
// ==========================================

use crate::domain::date::serialize_opt_day;
use crate::domain::plant::{effective_lead_time, Subtype};
use crate::domain::slot::Slot;
use crate::domain::types::{Priority, SowAnchor};
use crate::engine::gap::{GapCalculator, SlotGap};
use crate::engine::priority::PriorityClassifier;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{instrument, warn};

// ==========================================
// SlotReminder - 单批次提醒
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotReminder {
    pub slot_id: String,
    pub month: String,
    pub start_day: String,
    pub end_day: String,
    pub gap: SlotGap,
    pub lead_time_days: Option<i64>,
    pub priority: Priority,
    #[serde(serialize_with = "serialize_opt_day")]
    pub sow_by_date: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_opt_day")]
    pub alert_date: Option<NaiveDate>,
    pub days_until_sow: Option<i64>,
    pub reason: String,
}

/// 批量结果: 提醒 + 因数据异常跳过的批次 ID
#[derive(Debug, Clone, Default)]
pub struct ReminderBatch {
    pub reminders: Vec<SlotReminder>,
    pub skipped_slot_ids: Vec<String>,
}

// ==========================================
// ReminderEngine
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ReminderEngine {
    calculator: GapCalculator,
    classifier: PriorityClassifier,
}

impl ReminderEngine {
    pub fn new(anchor: SowAnchor) -> Self {
        Self {
            calculator: GapCalculator::new(),
            classifier: PriorityClassifier::new(anchor),
        }
    }

    /// 批量判定
    ///
    /// 育苗天数: 批次覆写 > 品种默认
    /// 日期无效或推算日期越界的批次计入 skipped_slot_ids
    #[instrument(skip(self, slots, subtype), fields(count = slots.len()))]
    pub fn evaluate_batch(
        &self,
        slots: &[Slot],
        subtype: Option<&Subtype>,
        reminder_window_days: i64,
        today: NaiveDate,
    ) -> ReminderBatch {
        let mut batch = ReminderBatch::default();

        for slot in slots {
            let window = match slot.window() {
                Some(w) => w,
                None => {
                    warn!(slot_id = %slot.id, "批次日期无效,跳过提醒计算");
                    batch.skipped_slot_ids.push(slot.id.clone());
                    continue;
                }
            };

            let gap = self.calculator.compute_gap(slot);
            let lead = effective_lead_time(slot, subtype);
            let outcome = match self
                .classifier
                .classify(&gap, window, lead, reminder_window_days, today)
            {
                Some(o) => o,
                None => {
                    warn!(slot_id = %slot.id, lead_time_days = ?lead, "推算播种日期越界,跳过提醒计算");
                    batch.skipped_slot_ids.push(slot.id.clone());
                    continue;
                }
            };

            batch.reminders.push(SlotReminder {
                slot_id: slot.id.clone(),
                month: slot.month_label(),
                start_day: slot.start_day.clone(),
                end_day: slot.end_day.clone(),
                gap,
                lead_time_days: lead,
                priority: outcome.priority,
                sow_by_date: outcome.sow_by_date,
                alert_date: outcome.alert_date,
                days_until_sow: outcome.days_until_sow,
                reason: outcome.reason,
            });
        }

        batch
    }
}

/// 只保留需要处理的提醒并排序
///
/// 排序: Overdue → Urgent → MissingLeadTime → Upcoming,
/// 同级按距最晚播种日天数升序,再按批次 ID
pub fn actionable(reminders: &[SlotReminder]) -> Vec<SlotReminder> {
    let mut out: Vec<SlotReminder> = reminders
        .iter()
        .filter(|r| r.priority.is_actionable())
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then(
                a.days_until_sow
                    .unwrap_or(i64::MAX)
                    .cmp(&b.days_until_sow.unwrap_or(i64::MAX)),
            )
            .then_with(|| a.slot_id.cmp(&b.slot_id))
    });
    out
}
