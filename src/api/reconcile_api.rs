// ==========================================
// 苗圃排苗系统 - 对账 API
// ==========================================
// 职责: 组合远程读写 + 引擎计算,提供界面/命令行所需的全部操作
// 红线1: 调拨/下单/播种先做本地校验,校验失败不发起远程写请求
// 红线2: 远程失败只记录 warn 并返回错误,不自动重试
// 红线3: 计算结果只基于本次读取的快照,不做客户端缓存
// ==========================================

use std::error::Error;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::api::backend::SlotBackend;
use crate::api::dto::{DateResolution, SlotOverview, TransferTargetsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::config::ReconcileConfigReader;
use crate::domain::date::{format_day, parse_day};
use crate::domain::plant::{Plant, Subtype, SubtypeSlots};
use crate::domain::slot::Slot;
use crate::domain::transfer::{OrderRequest, SlotUpdate, SowingEntry, TransferOption, TransferRequest};
use crate::engine::booking::BookingGuard;
use crate::engine::gap::GapCalculator;
use crate::engine::priority::MAX_LEAD_TIME_DAYS;
use crate::engine::reminder::{actionable, ReminderEngine, SlotReminder};
use crate::engine::slot_index::SlotIndex;
use crate::engine::transfer::{validate_transfer_quantity, TransferPlanner};

// ==========================================
// ReconcileApi
// ==========================================

/// 对账API
///
/// 职责：
/// 1. 批次总览（缺口 + 优先级 + 月度汇总）
/// 2. 播种提醒
/// 3. 调拨目标查询与提交
/// 4. 批次育苗天数/可供苗数维护
/// 5. 日期选择 → 批次解析
/// 6. 下单与播种登记
pub struct ReconcileApi {
    backend: Arc<dyn SlotBackend>,
    config: Arc<dyn ReconcileConfigReader>,
    calculator: GapCalculator,
    planner: TransferPlanner,
    guard: BookingGuard,
}

impl ReconcileApi {
    pub fn new(backend: Arc<dyn SlotBackend>, config: Arc<dyn ReconcileConfigReader>) -> Self {
        Self {
            backend,
            config,
            calculator: GapCalculator::new(),
            planner: TransferPlanner::new(),
            guard: BookingGuard::new(),
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 品种批次总览
    ///
    /// # 参数
    /// - today: 判定基准日（由调用方传入,便于复现）
    #[instrument(skip(self))]
    pub async fn slot_overview(
        &self,
        plant_id: &str,
        subtype_id: &str,
        today: NaiveDate,
    ) -> ApiResult<SlotOverview> {
        let ((_, subtype), mut slots) = futures::try_join!(
            self.load_subtype(plant_id, subtype_id),
            self.load_slots(plant_id, subtype_id)
        )?;
        slots.sort_by_key(|s| s.start_date());

        let window = config_value(self.config.get_reminder_window_days_for_plant(plant_id).await)?;
        let anchor = config_value(self.config.get_sow_anchor().await)?;

        let batch = ReminderEngine::new(anchor).evaluate_batch(&slots, Some(&subtype), window, today);
        let months = self.calculator.rollup_by_month(&slots);
        let total = self
            .calculator
            .rollup_by_subtype(&[SubtypeSlots {
                subtype: subtype.clone(),
                slots,
            }])
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Other(anyhow::anyhow!("品种汇总为空")))?;

        Ok(SlotOverview {
            plant_id: plant_id.to_string(),
            subtype_id: subtype_id.to_string(),
            subtype_name: subtype.name,
            as_of: format_day(today),
            rows: batch.reminders,
            months,
            total,
            skipped_slot_ids: batch.skipped_slot_ids,
        })
    }

    /// 需要处理的播种提醒（已排序）
    #[instrument(skip(self))]
    pub async fn reminders(
        &self,
        plant_id: &str,
        subtype_id: &str,
        today: NaiveDate,
    ) -> ApiResult<Vec<SlotReminder>> {
        let overview = self.slot_overview(plant_id, subtype_id, today).await?;
        Ok(actionable(&overview.rows))
    }

    /// 调拨目标查询
    ///
    /// 候选来自服务端（同作物同品种）,窗口/排序在本地按配置再判定一次
    #[instrument(skip(self))]
    pub async fn transfer_targets(
        &self,
        plant_id: &str,
        subtype_id: &str,
        source_slot_id: &str,
    ) -> ApiResult<TransferTargetsResponse> {
        let source = self.get_slot(plant_id, subtype_id, source_slot_id).await?;
        self.transfer_targets_for(&source).await
    }

    /// 基于已读取的源批次快照查询调拨目标（不再重新读取批次列表）
    pub async fn transfer_targets_for(&self, source: &Slot) -> ApiResult<TransferTargetsResponse> {
        let back_days = config_value(self.config.get_transfer_back_days().await)?;
        let forward_days = config_value(self.config.get_transfer_forward_days().await)?;

        let candidates = self
            .backend
            .fetch_transfer_candidates(&source.id, back_days, forward_days)
            .await
            .map_err(|e| remote_failed("fetch_transfer_candidates", e))?;

        let options = self
            .planner
            .find_transfer_targets(source, &candidates, back_days, forward_days)?;

        Ok(TransferTargetsResponse {
            source_slot_id: source.id.clone(),
            source_surplus: self.calculator.compute_gap(source).surplus,
            back_days,
            forward_days,
            options,
        })
    }

    /// 日期 → 批次解析（日期选择器）
    ///
    /// 无法解析的日期返回 slot_id = None,不报错
    pub async fn resolve_date(
        &self,
        plant_id: &str,
        subtype_id: &str,
        day: &str,
    ) -> ApiResult<DateResolution> {
        let slots = self.load_slots(plant_id, subtype_id).await?;
        let index = SlotIndex::new(&slots);
        Ok(DateResolution {
            day: day.trim().to_string(),
            slot_id: index.resolve_slot_id(day).map(str::to_string),
        })
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 提交调拨
    ///
    /// # 参数
    /// - source: 当前快照中的源批次
    /// - target: transfer_targets 返回的目标
    ///
    /// # 红线
    /// - 数量校验失败直接返回,不发起远程调用
    #[instrument(skip(self, source, target), fields(source = %source.id, target = %target.slot_id))]
    pub async fn submit_transfer(
        &self,
        source: &Slot,
        target: &TransferOption,
        quantity: i64,
    ) -> ApiResult<()> {
        if source.id == target.slot_id {
            return Err(ApiError::InvalidInput("源批次与目标批次相同".to_string()));
        }
        let surplus = self.calculator.compute_gap(source).surplus;
        validate_transfer_quantity(quantity, surplus, target.gap)?;

        let request = TransferRequest {
            source_slot_id: source.id.clone(),
            target_slot_id: target.slot_id.clone(),
            quantity,
        };
        self.backend
            .submit_transfer(&request)
            .await
            .map_err(|e| remote_failed("submit_transfer", e))?;

        info!(quantity, "调拨已提交");
        Ok(())
    }

    /// 设置批次育苗天数（1..=MAX_LEAD_TIME_DAYS）
    #[instrument(skip(self))]
    pub async fn set_plant_ready_days(&self, slot_id: &str, days: i64) -> ApiResult<()> {
        if days <= 0 {
            return Err(ApiError::InvalidInput(format!("育苗天数必须大于0: {}", days)));
        }
        if days > MAX_LEAD_TIME_DAYS {
            return Err(ApiError::InvalidInput(format!(
                "育苗天数超出上限 {}: {}",
                MAX_LEAD_TIME_DAYS, days
            )));
        }
        self.update_slot(slot_id, SlotUpdate::plant_ready_days(days)).await
    }

    /// 设置批次可供苗数（必须 >= 0）
    #[instrument(skip(self))]
    pub async fn set_total_plants(&self, slot_id: &str, total: i64) -> ApiResult<()> {
        if total < 0 {
            return Err(ApiError::InvalidInput(format!("可供苗数不能为负数: {}", total)));
        }
        self.update_slot(slot_id, SlotUpdate::total_plants(total)).await
    }

    /// 下单
    ///
    /// 校验顺序: 批次存在 → 经销商配额（如有）→ BookingGuard → 远程提交
    #[instrument(skip(self, order), fields(slot_id = %order.slot_id, quantity = order.quantity))]
    pub async fn place_order(&self, order: &OrderRequest) -> ApiResult<()> {
        if order.farmer_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("农户姓名不能为空".to_string()));
        }
        let slot = self
            .get_slot(&order.plant_id, &order.subtype_id, &order.slot_id)
            .await?;

        let quota = match order.dealer_id.as_deref() {
            Some(dealer_id) => self
                .backend
                .fetch_dealer_quota(dealer_id, &order.slot_id)
                .await
                .map_err(|e| remote_failed("fetch_dealer_quota", e))?,
            None => None,
        };

        self.guard.check_order(&slot, order.quantity, quota.as_ref())?;

        self.backend
            .submit_order(order)
            .await
            .map_err(|e| remote_failed("submit_order", e))?;

        info!("订单已提交");
        Ok(())
    }

    /// 播种登记
    #[instrument(skip(self, entry), fields(slot_id = %entry.slot_id, quantity = entry.quantity))]
    pub async fn record_sowing(&self, entry: &SowingEntry) -> ApiResult<()> {
        if parse_day(&entry.sowing_date).is_none() {
            return Err(ApiError::InvalidInput(format!(
                "播种日期格式无效（应为 DD-MM-YYYY）: {}",
                entry.sowing_date
            )));
        }

        let plants = self.load_plants().await?;
        let plant = plants
            .iter()
            .find(|p| p.id == entry.plant_id)
            .ok_or_else(|| ApiError::NotFound(format!("作物 {}", entry.plant_id)))?;
        if plant.subtype(&entry.subtype_id).is_none() {
            return Err(ApiError::NotFound(format!("品种 {}", entry.subtype_id)));
        }
        self.guard.validate_sowing_entry(plant, entry.quantity)?;

        self.backend
            .submit_sowing(entry)
            .await
            .map_err(|e| remote_failed("submit_sowing", e))?;

        info!("播种登记已提交");
        Ok(())
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    async fn update_slot(&self, slot_id: &str, update: SlotUpdate) -> ApiResult<()> {
        if slot_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("批次ID不能为空".to_string()));
        }
        self.backend
            .update_slot(slot_id, &update)
            .await
            .map_err(|e| remote_failed("update_slot", e))?;
        info!(slot_id, "批次已更新");
        Ok(())
    }

    async fn load_plants(&self) -> ApiResult<Vec<Plant>> {
        self.backend
            .fetch_plants()
            .await
            .map_err(|e| remote_failed("fetch_plants", e))
    }

    async fn load_subtype(&self, plant_id: &str, subtype_id: &str) -> ApiResult<(Plant, Subtype)> {
        let plants = self.load_plants().await?;
        let plant = plants
            .into_iter()
            .find(|p| p.id == plant_id)
            .ok_or_else(|| ApiError::NotFound(format!("作物 {}", plant_id)))?;
        let subtype = plant
            .subtype(subtype_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("品种 {}", subtype_id)))?;
        Ok((plant, subtype))
    }

    async fn load_slots(&self, plant_id: &str, subtype_id: &str) -> ApiResult<Vec<Slot>> {
        self.backend
            .fetch_slots(plant_id, subtype_id)
            .await
            .map_err(|e| remote_failed("fetch_slots", e))
    }

    /// 读取单个批次（不存在返回 NotFound）
    pub async fn get_slot(&self, plant_id: &str, subtype_id: &str, slot_id: &str) -> ApiResult<Slot> {
        self.load_slots(plant_id, subtype_id)
            .await?
            .into_iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| ApiError::NotFound(format!("批次 {}", slot_id)))
    }
}

/// 配置读取错误统一转为 ConfigError
fn config_value<T>(result: Result<T, Box<dyn Error>>) -> ApiResult<T> {
    result.map_err(|e| ApiError::ConfigError(e.to_string()))
}

fn remote_failed(operation: &str, err: ApiError) -> ApiError {
    if !err.is_local_validation() {
        warn!(operation, error = %err, "远程操作失败");
    }
    err
}
