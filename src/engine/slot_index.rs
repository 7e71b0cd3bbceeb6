// ==========================================
// 苗圃排苗系统 - 批次日期索引
// ==========================================
// 职责: 日期 → 所属批次
// 输入: 批次快照列表
// 输出: 命中的批次 / 不可选日期
// ==========================================
// 规则:
// - 批次区间为闭区间（开始日、结束日都包含）
// - 日期格式错误的批次跳过,查询日期格式错误视为未命中
// - 区间重叠时取开始日最早的批次,开始日相同按输入顺序
// ==========================================

use crate::domain::date::parse_day;
use crate::domain::slot::{Slot, SlotWindow};
use chrono::NaiveDate;
use tracing::debug;

// ==========================================
// SlotIndex - 批次日期索引
// ==========================================
pub struct SlotIndex<'a> {
    slots: &'a [Slot],
    // (区间, 原始下标),按 (开始日, 原始下标) 排序
    entries: Vec<(SlotWindow, usize)>,
    skipped: usize,
}

impl<'a> SlotIndex<'a> {
    /// 构建索引
    ///
    /// 日期无法解析或 start > end 的批次会被跳过并计数
    pub fn new(slots: &'a [Slot]) -> Self {
        let mut entries = Vec::with_capacity(slots.len());
        let mut skipped = 0;

        for (idx, slot) in slots.iter().enumerate() {
            match slot.window() {
                Some(window) => entries.push((window, idx)),
                None => {
                    skipped += 1;
                    debug!(
                        slot_id = %slot.id,
                        start_day = %slot.start_day,
                        end_day = %slot.end_day,
                        "批次日期无效,跳过索引"
                    );
                }
            }
        }

        entries.sort_by_key(|(window, idx)| (window.start, *idx));

        Self {
            slots,
            entries,
            skipped,
        }
    }

    /// 被跳过的批次数量
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// 查找包含该日期的批次
    pub fn find_slot_for_date(&self, date: NaiveDate) -> Option<&'a Slot> {
        self.entries
            .iter()
            .find(|(window, _)| window.contains(date))
            .map(|(_, idx)| &self.slots[*idx])
    }

    /// 查找包含该日期字符串（DD-MM-YYYY）的批次
    pub fn find_slot_for_day(&self, day: &str) -> Option<&'a Slot> {
        parse_day(day).and_then(|date| self.find_slot_for_date(date))
    }

    /// 提交前将用户选择的日期解析为批次 ID
    pub fn resolve_slot_id(&self, day: &str) -> Option<&'a str> {
        self.find_slot_for_day(day).map(|slot| slot.id.as_str())
    }

    /// 日历上该日期是否可选
    pub fn is_date_selectable(&self, date: NaiveDate) -> bool {
        self.find_slot_for_date(date).is_some()
    }

    /// [from, to] 内所有不属于任何批次的日期（用于禁用日历）
    pub fn disabled_dates(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        if from > to {
            return Vec::new();
        }
        from.iter_days()
            .take_while(|d| *d <= to)
            .filter(|d| !self.is_date_selectable(*d))
            .collect()
    }
}

/// 单次查询入口
pub fn find_slot_for_date<'a>(day: &str, slots: &'a [Slot]) -> Option<&'a Slot> {
    SlotIndex::new(slots).find_slot_for_day(day)
}
