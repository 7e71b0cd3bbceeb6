// ==========================================
// 苗圃排苗系统 - 富余调拨规划
// ==========================================
// 职责: 为有富余的源批次筛选并排序可接收的目标批次
// 输入: 源批次 + 候选批次 + 向前/向后天数窗口
// 输出: 排序后的 TransferOption（可能为空,空不是错误）
// ==========================================
// 规则:
// - 候选开始日 ∈ [源开始日 - back_days, 源开始日 + forward_days]
// - 候选不能是源批次本身,剩余可接收数量必须 > 0
// - 同品种/同作物匹配由调用方保证（候选列表已按业务规则过滤）
// - 排序: |days_difference| 升序 → gap 降序 → 开始日升序
// ==========================================

use crate::domain::date::parse_day;
use crate::domain::slot::Slot;
use crate::domain::transfer::{TransferCandidate, TransferOption};
use crate::engine::gap::GapCalculator;
use crate::engine::priority::{days_after, days_before};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument};

// ==========================================
// TransferViolation - 调拨数量本地校验失败
// ==========================================
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferViolation {
    #[error("调拨数量必须大于0: quantity={quantity}")]
    NonPositiveQuantity { quantity: i64 },

    #[error("调拨数量超过源批次富余: quantity={quantity}, surplus={surplus}")]
    ExceedsSurplus { quantity: i64, surplus: i64 },

    #[error("调拨数量超过目标批次可接收数量: quantity={quantity}, target_gap={target_gap}")]
    ExceedsTargetGap { quantity: i64, target_gap: i64 },

    #[error("源批次日期无效: slot_id={0}")]
    InvalidSourceDates(String),
}

/// 调拨数量校验（提交前,本地执行）
///
/// 条件: 0 < quantity <= surplus 且 quantity <= target_gap
pub fn validate_transfer_quantity(
    quantity: i64,
    source_surplus: i64,
    target_gap: i64,
) -> Result<(), TransferViolation> {
    if quantity <= 0 {
        return Err(TransferViolation::NonPositiveQuantity { quantity });
    }
    if quantity > source_surplus {
        return Err(TransferViolation::ExceedsSurplus {
            quantity,
            surplus: source_surplus,
        });
    }
    if quantity > target_gap {
        return Err(TransferViolation::ExceedsTargetGap {
            quantity,
            target_gap,
        });
    }
    Ok(())
}

// ==========================================
// TransferPlanner
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferPlanner;

impl TransferPlanner {
    pub fn new() -> Self {
        Self
    }

    /// 由完整批次快照构造候选（剩余可接收数量 = 该批次待播数量）
    pub fn candidate_from_slot(&self, slot: &Slot, subtype_name: Option<&str>) -> TransferCandidate {
        let gap = GapCalculator::new().compute_gap(slot);
        TransferCandidate {
            slot_id: slot.id.clone(),
            start_day: slot.start_day.clone(),
            end_day: slot.end_day.clone(),
            month: Some(slot.month_label()),
            subtype_name: subtype_name.map(str::to_string),
            gap: gap.need,
            days_difference: None,
        }
    }

    /// 查找调拨目标
    ///
    /// # 错误
    /// - 源批次日期无效时返回 InvalidSourceDates（无法确定窗口）
    ///
    /// 候选日期无效的行直接跳过
    #[instrument(skip(self, source, candidates), fields(source = %source.id, count = candidates.len()))]
    pub fn find_transfer_targets(
        &self,
        source: &Slot,
        candidates: &[TransferCandidate],
        back_days: i64,
        forward_days: i64,
    ) -> Result<Vec<TransferOption>, TransferViolation> {
        let source_start = source
            .start_date()
            .ok_or_else(|| TransferViolation::InvalidSourceDates(source.id.clone()))?;
        // 越界时窗口延伸到日历边界
        let earliest = days_before(source_start, back_days.max(0)).unwrap_or(NaiveDate::MIN);
        let latest = days_after(source_start, forward_days.max(0)).unwrap_or(NaiveDate::MAX);

        let mut options: Vec<(NaiveDate, TransferOption)> = Vec::new();
        for candidate in candidates {
            if candidate.slot_id == source.id || candidate.gap <= 0 {
                continue;
            }

            let start = match parse_day(&candidate.start_day) {
                Some(d) => d,
                None => {
                    debug!(slot_id = %candidate.slot_id, "候选批次日期无效,跳过");
                    continue;
                }
            };
            if start < earliest || start > latest {
                continue;
            }

            let month = match candidate.month.as_deref().map(str::trim) {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => start.format("%B %Y").to_string(),
            };

            options.push((
                start,
                TransferOption {
                    slot_id: candidate.slot_id.clone(),
                    start_day: candidate.start_day.clone(),
                    end_day: candidate.end_day.clone(),
                    month,
                    subtype_name: candidate.subtype_name.clone(),
                    gap: candidate.gap,
                    days_difference: (start - source_start).num_days(),
                },
            ));
        }

        options.sort_by(|(sa, a), (sb, b)| {
            a.days_difference
                .abs()
                .cmp(&b.days_difference.abs())
                .then(b.gap.cmp(&a.gap))
                .then(sa.cmp(sb))
        });

        Ok(options.into_iter().map(|(_, o)| o).collect())
    }
}
