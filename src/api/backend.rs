// ==========================================
// 苗圃排苗系统 - 远程服务接口
// ==========================================
// 职责: 定义对账逻辑依赖的全部远程读写操作
// 实现者: NurseryClient（HTTP）; 测试中使用内存实现
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::plant::Plant;
use crate::domain::quota::DealerQuota;
use crate::domain::slot::Slot;
use crate::domain::transfer::{
    OrderRequest, SlotUpdate, SowingEntry, TransferCandidate, TransferRequest,
};
use async_trait::async_trait;

#[async_trait]
pub trait SlotBackend: Send + Sync {
    /// 作物列表（含品种）
    async fn fetch_plants(&self) -> ApiResult<Vec<Plant>>;

    /// 某品种下的全部批次
    async fn fetch_slots(&self, plant_id: &str, subtype_id: &str) -> ApiResult<Vec<Slot>>;

    /// 调拨候选批次（服务端已按同作物/同品种过滤）
    async fn fetch_transfer_candidates(
        &self,
        slot_id: &str,
        back_days: i64,
        forward_days: i64,
    ) -> ApiResult<Vec<TransferCandidate>>;

    /// 经销商在某批次上的配额（无配额返回 None）
    async fn fetch_dealer_quota(&self, dealer_id: &str, slot_id: &str) -> ApiResult<Option<DealerQuota>>;

    /// 批次局部更新（只发送变更字段）
    async fn update_slot(&self, slot_id: &str, update: &SlotUpdate) -> ApiResult<()>;

    async fn submit_transfer(&self, request: &TransferRequest) -> ApiResult<()>;

    async fn submit_sowing(&self, entry: &SowingEntry) -> ApiResult<()>;

    async fn submit_order(&self, order: &OrderRequest) -> ApiResult<()>;
}
