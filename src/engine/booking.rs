// ==========================================
// 苗圃排苗系统 - 下单与播种本地校验
// ==========================================
// 职责: 农户下单 / 经销商配额 / 播种登记 的提交前校验
// 红线: 本地只做乐观校验,超卖最终由远程服务拒绝
// ==========================================

use crate::domain::plant::Plant;
use crate::domain::quota::DealerQuota;
use crate::domain::slot::Slot;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingViolation {
    #[error("数量必须大于0: quantity={quantity}")]
    NonPositiveQuantity { quantity: i64 },

    #[error("超过批次可订数量: slot_id={slot_id}, quantity={quantity}, bookable={bookable}")]
    ExceedsSlotCapacity {
        slot_id: String,
        quantity: i64,
        bookable: i64,
    },

    #[error("超过经销商剩余配额: dealer_id={dealer_id}, quantity={quantity}, remaining={remaining}")]
    ExceedsDealerQuota {
        dealer_id: String,
        quantity: i64,
        remaining: i64,
    },

    #[error("配额不属于该批次: quota_slot_id={quota_slot_id}, slot_id={slot_id}")]
    QuotaSlotMismatch {
        quota_slot_id: String,
        slot_id: String,
    },

    #[error("该作物不允许播种: plant_id={0}")]
    SowingNotAllowed(String),
}

// ==========================================
// BookingGuard
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingGuard;

impl BookingGuard {
    pub fn new() -> Self {
        Self
    }

    /// 下单校验
    ///
    /// 规则（顺序执行）:
    /// 1) quantity > 0
    /// 2) quantity <= 批次可订数量 max(0, 可供苗数 - 已预订)
    /// 3) 有经销商配额时: 配额须属于该批次,且 quantity <= 剩余配额
    pub fn check_order(
        &self,
        slot: &Slot,
        quantity: i64,
        quota: Option<&DealerQuota>,
    ) -> Result<(), BookingViolation> {
        if quantity <= 0 {
            return Err(BookingViolation::NonPositiveQuantity { quantity });
        }

        let bookable = slot.bookable();
        if quantity > bookable {
            return Err(BookingViolation::ExceedsSlotCapacity {
                slot_id: slot.id.clone(),
                quantity,
                bookable,
            });
        }

        if let Some(q) = quota {
            if q.slot_id != slot.id {
                return Err(BookingViolation::QuotaSlotMismatch {
                    quota_slot_id: q.slot_id.clone(),
                    slot_id: slot.id.clone(),
                });
            }
            if quantity > q.remaining() {
                return Err(BookingViolation::ExceedsDealerQuota {
                    dealer_id: q.dealer_id.clone(),
                    quantity,
                    remaining: q.remaining(),
                });
            }
        }

        Ok(())
    }

    /// 播种登记校验
    pub fn validate_sowing_entry(&self, plant: &Plant, quantity: i64) -> Result<(), BookingViolation> {
        if !plant.sowing_allowed {
            return Err(BookingViolation::SowingNotAllowed(plant.id.clone()));
        }
        if quantity <= 0 {
            return Err(BookingViolation::NonPositiveQuantity { quantity });
        }
        Ok(())
    }
}
