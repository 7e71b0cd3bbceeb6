// ==========================================
// 苗圃排苗系统 - 缺口计算引擎
// ==========================================
// 职责: 计算单批次缺口 + 按月份/品种汇总
// 红线: 全系统只有一种带符号缺口口径
// ==========================================
// 口径:
//   sowed     = 主圃已播 + 办公点已播
//   gap       = booked - sowed       (正: 待播, 负: 富余)
//   need      = max(0, gap)
//   surplus   = max(0, -gap)         (可调拨数量只从 gap 推导)
//   bookable  = max(0, 可供苗数 - booked)
// 红线: 可供苗数只影响可订余量,不计入已播
// ==========================================

use crate::domain::plant::SubtypeSlots;
use crate::domain::slot::{Slot, UNKNOWN_MONTH};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

// ==========================================
// SlotGap - 单批次缺口
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotGap {
    pub booked: i64,
    pub sowed: i64,
    /// 可订余量（只用于下单校验）
    pub bookable: i64,
    /// 带符号缺口
    pub gap: i64,
    pub need: i64,
    pub surplus: i64,
}

// ==========================================
// GapRollup - 汇总行（月份或品种）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapRollup {
    pub label: String,
    pub slot_count: usize,
    pub booked: i64,
    pub sowed: i64,
    pub gap: i64,
    pub need: i64,
    pub surplus: i64,
    pub percent_complete: f64,
}

impl GapRollup {
    fn empty(label: String) -> Self {
        Self {
            label,
            slot_count: 0,
            booked: 0,
            sowed: 0,
            gap: 0,
            need: 0,
            surplus: 0,
            percent_complete: 0.0,
        }
    }

    fn add(&mut self, g: &SlotGap) {
        self.slot_count += 1;
        self.booked = self.booked.saturating_add(g.booked);
        self.sowed = self.sowed.saturating_add(g.sowed);
        self.gap = self.gap.saturating_add(g.gap);
        self.need = self.need.saturating_add(g.need);
        self.surplus = self.surplus.saturating_add(g.surplus);
    }

    fn finish(mut self) -> Self {
        self.percent_complete = percent_complete(self.sowed, self.booked);
        self
    }
}

/// 完成率 = sowed / booked × 100; booked 为 0 时返回 0
pub fn percent_complete(sowed: i64, booked: i64) -> f64 {
    if booked <= 0 {
        return 0.0;
    }
    sowed as f64 / booked as f64 * 100.0
}

// ==========================================
// GapCalculator - 缺口计算引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct GapCalculator;

impl GapCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 计算单批次缺口（纯函数,对同一快照幂等）
    pub fn compute_gap(&self, slot: &Slot) -> SlotGap {
        let booked = slot.total_booked_plants.max(0);
        let sowed = slot.sowed();
        let gap = booked.saturating_sub(sowed);

        SlotGap {
            booked,
            sowed,
            bookable: slot.bookable(),
            gap,
            need: gap.max(0),
            surplus: gap.saturating_neg().max(0),
        }
    }

    /// 按月份汇总
    ///
    /// 排序: 按月内最早的批次开始日升序; 无法解析日期的分组排最后
    #[instrument(skip(self, slots), fields(count = slots.len()))]
    pub fn rollup_by_month(&self, slots: &[Slot]) -> Vec<GapRollup> {
        let mut groups: HashMap<String, (Option<NaiveDate>, GapRollup)> = HashMap::new();

        for slot in slots {
            let label = slot.month_label();
            let start = slot.start_date();
            let entry = groups
                .entry(label.clone())
                .or_insert_with(|| (start, GapRollup::empty(label)));

            entry.0 = match (entry.0, start) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            entry.1.add(&self.compute_gap(slot));
        }

        let mut rows: Vec<(Option<NaiveDate>, GapRollup)> = groups.into_values().collect();
        rows.sort_by(|(da, ra), (db, rb)| {
            let unknown_a = ra.label == UNKNOWN_MONTH || da.is_none();
            let unknown_b = rb.label == UNKNOWN_MONTH || db.is_none();
            unknown_a
                .cmp(&unknown_b)
                .then(da.cmp(db))
                .then_with(|| ra.label.cmp(&rb.label))
        });

        rows.into_iter().map(|(_, r)| r.finish()).collect()
    }

    /// 按品种汇总（保持输入顺序）
    pub fn rollup_by_subtype(&self, groups: &[SubtypeSlots]) -> Vec<GapRollup> {
        groups
            .iter()
            .map(|group| {
                let mut rollup = GapRollup::empty(group.subtype.name.clone());
                for slot in &group.slots {
                    rollup.add(&self.compute_gap(slot));
                }
                rollup.finish()
            })
            .collect()
    }
}
