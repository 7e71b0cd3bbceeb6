// ==========================================
// 苗圃排苗系统 - 经销商配额
// ==========================================
// 配额 = 批次容量中为某经销商预留的部分,与普通容量分开统计
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerQuota {
    pub dealer_id: String,
    pub slot_id: String,
    #[serde(default)]
    pub quota: i64,
    #[serde(default)]
    pub booked: i64,
}

impl DealerQuota {
    /// 剩余配额 max(0, quota - booked)
    pub fn remaining(&self) -> i64 {
        self.quota.saturating_sub(self.booked).max(0)
    }
}
