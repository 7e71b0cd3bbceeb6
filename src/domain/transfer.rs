// ==========================================
// 苗圃排苗系统 - 调拨与写入请求模型
// ==========================================
// 读: 远程服务返回的调拨候选批次
// 写: 调拨 / 批次局部更新 / 播种登记 / 下单
// 红线: 批次更新只携带变更字段,不做整体替换
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// TransferCandidate - 调拨候选（远程服务返回）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCandidate {
    pub slot_id: String,
    pub start_day: String,
    pub end_day: String,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub subtype_name: Option<String>,
    /// 剩余可接收数量
    #[serde(default)]
    pub gap: i64,
    /// 相对源批次开始日的偏移（服务端计算,本地会按日期重算）
    #[serde(default)]
    pub days_difference: Option<i64>,
}

// ==========================================
// TransferOption - 排序后的可选调拨目标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOption {
    pub slot_id: String,
    pub start_day: String,
    pub end_day: String,
    pub month: String,
    pub subtype_name: Option<String>,
    pub gap: i64,
    pub days_difference: i64,
}

// ==========================================
// TransferRequest - 调拨提交
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub source_slot_id: String,
    pub target_slot_id: String,
    pub quantity: i64,
}

// ==========================================
// SlotUpdate - 批次局部更新
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_ready_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_plants: Option<i64>,
}

impl SlotUpdate {
    pub fn plant_ready_days(days: i64) -> Self {
        Self {
            plant_ready_days: Some(days),
            ..Self::default()
        }
    }

    pub fn total_plants(total: i64) -> Self {
        Self {
            total_plants: Some(total),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.plant_ready_days.is_none() && self.total_plants.is_none()
    }
}

// ==========================================
// SowingEntry - 播种登记
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SowingEntry {
    pub slot_id: String,
    pub plant_id: String,
    pub subtype_id: String,
    pub quantity: i64,
    /// DD-MM-YYYY
    pub sowing_date: String,
}

// ==========================================
// OrderRequest - 农户下单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub slot_id: String,
    pub plant_id: String,
    pub subtype_id: String,
    pub farmer_name: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_id: Option<String>,
}
