// ==========================================
// 苗圃排苗系统 - 作物与品种领域模型
// ==========================================

use crate::domain::slot::Slot;
use serde::{Deserialize, Serialize};

// ==========================================
// Subtype - 品种
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtype {
    pub id: String,
    pub name: String,
    /// 默认育苗天数（播种到可出苗）,无默认值,必须显式配置
    #[serde(default)]
    pub plant_ready_days: Option<i64>,
    #[serde(default)]
    pub plant_id: Option<String>,
}

// ==========================================
// Plant - 作物
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sowing_allowed: bool,
    #[serde(default)]
    pub subtypes: Vec<Subtype>,
}

impl Plant {
    pub fn subtype(&self, subtype_id: &str) -> Option<&Subtype> {
        self.subtypes.iter().find(|s| s.id == subtype_id)
    }
}

/// 某品种下的全部批次（按品种汇总的输入）
#[derive(Debug, Clone)]
pub struct SubtypeSlots {
    pub subtype: Subtype,
    pub slots: Vec<Slot>,
}

/// 有效育苗天数
///
/// 规则: 批次覆写 > 品种默认; 0 或负数视为未配置
pub fn effective_lead_time(slot: &Slot, subtype: Option<&Subtype>) -> Option<i64> {
    slot.plant_ready_days
        .filter(|d| *d > 0)
        .or_else(|| subtype.and_then(|s| s.plant_ready_days).filter(|d| *d > 0))
}
