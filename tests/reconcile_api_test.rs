// ==========================================
// ReconcileApi 集成测试
// ==========================================
// 测试目标: 远程读写编排、本地校验先于远程写入、错误分类
// 远程服务: test_helpers::FakeBackend（内存实现）
// ==========================================


use std::sync::Arc;

use chrono::NaiveDate;
use nursery_slot_planner::api::{ApiError, ReconcileApi};
use nursery_slot_planner::config::{config_keys, ConfigManager, ConfigScope};
use nursery_slot_planner::domain::{
    DealerQuota, OrderRequest, Priority, Slot, SlotUpdate, SowingEntry, TransferOption,
};
use nursery_slot_planner::engine::{BookingViolation, TransferViolation};
use test_helpers::{
    in_memory_config, make_candidate, make_plant, make_slot, make_subtype, FakeBackend,
    RecordedWrite,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// P1/ST1 下四个批次:
/// - URG: 超订（可供 100,预订 120）,未播,育苗 10 天 → 20-06 时紧急
/// - SUR: 富余 30
/// - NEAR: 未播（调拨目标,服务端给出可接收 15）
/// - BAD: 日期无效
fn july_slots() -> Vec<Slot> {
    let mut urgent = make_slot("URG", "01-07-2025", "07-07-2025", 100, 120);
    urgent.plant_ready_days = Some(10);
    urgent.month = Some("July 2025".to_string());

    let mut surplus = make_slot("SUR", "08-07-2025", "14-07-2025", 0, 50);
    surplus.primary_sowed = 80;
    surplus.month = Some("July 2025".to_string());

    let near = make_slot("NEAR", "15-07-2025", "21-07-2025", 100, 115);
    let bad = make_slot("BAD", "32-07-2025", "21-07-2025", 10, 10);

    vec![near, surplus, bad, urgent]
}

fn backend() -> FakeBackend {
    FakeBackend::new(vec![make_plant(
        "P1",
        true,
        vec![make_subtype("ST1", None)],
    )])
    .with_slots("P1", "ST1", july_slots())
    .with_candidates(
        "SUR",
        vec![
            make_candidate("NEAR", "15-07-2025", 15),
            make_candidate("URG", "01-07-2025", 20),
            make_candidate("FAR", "30-09-2025", 500),
        ],
    )
}

fn api_with(backend: Arc<FakeBackend>, config: Arc<ConfigManager>) -> ReconcileApi {
    ReconcileApi::new(backend, config)
}

#[tokio::test]
async fn test_slot_overview_rows_and_rollups() {
    let backend = Arc::new(backend());
    let api = api_with(backend.clone(), in_memory_config());

    let overview = api.slot_overview("P1", "ST1", ymd(2025, 6, 20)).await.unwrap();

    assert_eq!(overview.subtype_name, "Subtype ST1");
    assert_eq!(overview.as_of, "20-06-2025");
    assert_eq!(overview.skipped_slot_ids, vec!["BAD".to_string()]);

    // 行按开始日升序
    let ids: Vec<&str> = overview.rows.iter().map(|r| r.slot_id.as_str()).collect();
    assert_eq!(ids, vec!["URG", "SUR", "NEAR"]);

    let urg = &overview.rows[0];
    assert_eq!(urg.gap.gap, 120);
    assert_eq!(urg.gap.bookable, 0);
    assert_eq!(urg.priority, Priority::Urgent);
    assert_eq!(overview.rows[1].priority, Priority::Complete);
    // NEAR 没有育苗天数（品种也没有）
    assert_eq!(overview.rows[2].priority, Priority::MissingLeadTime);
    assert_eq!(overview.actionable_count(), 2);

    assert_eq!(overview.months[0].label, "July 2025");
    assert_eq!(overview.total.slot_count, 4);
    assert!(backend.recorded_writes().is_empty());
}

#[tokio::test]
async fn test_plant_level_reminder_window() {
    let backend = Arc::new(backend());
    let config = in_memory_config();
    config
        .set_config_value(
            &ConfigScope::Plant {
                plant_id: "P1".to_string(),
            },
            config_keys::REMINDER_WINDOW_DAYS,
            "0",
        )
        .unwrap();
    let api = api_with(backend, config);

    // 窗口 0: 提醒日 = 最晚播种日 21-06,20-06 尚未到
    let reminders = api.reminders("P1", "ST1", ymd(2025, 6, 20)).await.unwrap();
    let urg = reminders.iter().find(|r| r.slot_id == "URG").unwrap();
    assert_eq!(urg.priority, Priority::Upcoming);
}

#[tokio::test]
async fn test_reminders_sorted_by_severity() {
    let api = api_with(Arc::new(backend()), in_memory_config());

    let reminders = api.reminders("P1", "ST1", ymd(2025, 6, 25)).await.unwrap();
    let view: Vec<(&str, Priority)> = reminders
        .iter()
        .map(|r| (r.slot_id.as_str(), r.priority))
        .collect();
    assert_eq!(
        view,
        vec![("URG", Priority::Overdue), ("NEAR", Priority::MissingLeadTime)]
    );
}

#[tokio::test]
async fn test_unknown_plant_or_subtype_is_not_found() {
    let api = api_with(Arc::new(backend()), in_memory_config());
    assert!(matches!(
        api.slot_overview("P9", "ST1", ymd(2025, 6, 20)).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        api.slot_overview("P1", "ST9", ymd(2025, 6, 20)).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_transfer_targets_filtered_and_ordered() {
    let api = api_with(Arc::new(backend()), in_memory_config());

    let resp = api.transfer_targets("P1", "ST1", "SUR").await.unwrap();
    assert_eq!(resp.source_surplus, 30);
    assert_eq!((resp.back_days, resp.forward_days), (7, 14));

    let ids: Vec<&str> = resp.options.iter().map(|o| o.slot_id.as_str()).collect();
    // NEAR +7, URG -7: 同距离 gap 大者在前; FAR 超出窗口
    assert_eq!(ids, vec!["URG", "NEAR"]);
    assert!(!resp.is_empty());
}

#[tokio::test]
async fn test_transfer_exceeding_surplus_rejected_before_remote() {
    let backend = Arc::new(backend());
    let api = api_with(backend.clone(), in_memory_config());

    let resp = api.transfer_targets("P1", "ST1", "SUR").await.unwrap();
    let source = api.get_slot("P1", "ST1", "SUR").await.unwrap();
    let target: &TransferOption = &resp.options[0];

    let err = api.submit_transfer(&source, target, 40).await.unwrap_err();
    assert!(err.is_local_validation());
    assert!(matches!(
        err,
        ApiError::TransferRejected(TransferViolation::ExceedsSurplus {
            quantity: 40,
            surplus: 30
        })
    ));
    assert!(backend.recorded_writes().is_empty());

    api.submit_transfer(&source, target, 20).await.unwrap();
    assert_eq!(backend.recorded_writes().len(), 1);
    match &backend.recorded_writes()[0] {
        RecordedWrite::Transfer(req) => {
            assert_eq!(req.source_slot_id, "SUR");
            assert_eq!(req.target_slot_id, "URG");
            assert_eq!(req.quantity, 20);
        }
        other => panic!("unexpected write: {:?}", other),
    }
}

#[tokio::test]
async fn test_transfer_targets_reuse_source_snapshot() {
    let backend = Arc::new(backend());
    let api = api_with(backend.clone(), in_memory_config());

    let source = api.get_slot("P1", "ST1", "SUR").await.unwrap();
    let before = backend.reads();
    let resp = api.transfer_targets_for(&source).await.unwrap();
    // 只读取候选列表
    assert_eq!(backend.reads() - before, 1);
    assert_eq!(resp.source_surplus, 30);

    api.submit_transfer(&source, &resp.options[0], 10).await.unwrap();
    assert_eq!(backend.recorded_writes().len(), 1);
}

#[tokio::test]
async fn test_unsown_capacity_cannot_be_transferred() {
    // 可供 100,预订 80,未播: 没有可调出的苗
    let idle = make_slot("IDLE", "08-07-2025", "14-07-2025", 100, 80);
    let backend = Arc::new(
        FakeBackend::new(vec![make_plant("P1", true, vec![make_subtype("ST1", Some(10))])])
            .with_slots("P1", "ST1", vec![idle])
            .with_candidates("IDLE", vec![make_candidate("NEAR", "10-07-2025", 50)]),
    );
    let api = api_with(backend.clone(), in_memory_config());

    let overview = api.slot_overview("P1", "ST1", ymd(2025, 6, 30)).await.unwrap();
    assert_eq!(overview.rows[0].priority, Priority::Overdue);

    let source = api.get_slot("P1", "ST1", "IDLE").await.unwrap();
    let resp = api.transfer_targets_for(&source).await.unwrap();
    assert_eq!(resp.source_surplus, 0);
    assert!(matches!(
        api.submit_transfer(&source, &resp.options[0], 10).await,
        Err(ApiError::TransferRejected(TransferViolation::ExceedsSurplus { surplus: 0, .. }))
    ));
    assert!(backend.recorded_writes().is_empty());
}

#[tokio::test]
async fn test_transfer_zero_and_target_gap_bounds() {
    let backend = Arc::new(backend());
    let api = api_with(backend.clone(), in_memory_config());
    let source = api.get_slot("P1", "ST1", "SUR").await.unwrap();
    let resp = api.transfer_targets("P1", "ST1", "SUR").await.unwrap();
    let near = resp.options.iter().find(|o| o.slot_id == "NEAR").unwrap();

    assert!(matches!(
        api.submit_transfer(&source, near, 0).await,
        Err(ApiError::TransferRejected(TransferViolation::NonPositiveQuantity { .. }))
    ));
    assert!(matches!(
        api.submit_transfer(&source, near, 16).await,
        Err(ApiError::TransferRejected(TransferViolation::ExceedsTargetGap { .. }))
    ));
    assert!(backend.recorded_writes().is_empty());
}

#[tokio::test]
async fn test_slot_updates_send_only_changed_field() {
    let backend = Arc::new(backend());
    let api = api_with(backend.clone(), in_memory_config());

    assert!(matches!(
        api.set_plant_ready_days("URG", 0).await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.set_plant_ready_days("URG", 200_000_000).await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.set_total_plants("URG", -1).await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(backend.recorded_writes().is_empty());

    api.set_plant_ready_days("URG", 12).await.unwrap();
    api.set_total_plants("NEAR", 0).await.unwrap();

    assert_eq!(
        backend.recorded_writes(),
        vec![
            RecordedWrite::UpdateSlot("URG".to_string(), SlotUpdate::plant_ready_days(12)),
            RecordedWrite::UpdateSlot("NEAR".to_string(), SlotUpdate::total_plants(0)),
        ]
    );
    assert_eq!(
        serde_json::to_value(SlotUpdate::plant_ready_days(12)).unwrap(),
        serde_json::json!({ "plantReadyDays": 12 })
    );
}

#[tokio::test]
async fn test_remote_failure_is_retryable_error() {
    let backend = Arc::new(backend().failing_writes());
    let api = api_with(backend, in_memory_config());

    let err = api.set_plant_ready_days("URG", 12).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(!err.is_local_validation());
}

#[tokio::test]
async fn test_resolve_date() {
    let api = api_with(Arc::new(backend()), in_memory_config());

    let hit = api.resolve_date("P1", "ST1", "07-07-2025").await.unwrap();
    assert_eq!(hit.slot_id.as_deref(), Some("URG"));
    let boundary = api.resolve_date("P1", "ST1", "08-07-2025").await.unwrap();
    assert_eq!(boundary.slot_id.as_deref(), Some("SUR"));

    let miss = api.resolve_date("P1", "ST1", "30-06-2025").await.unwrap();
    assert!(!miss.is_selectable());
    let garbage = api.resolve_date("P1", "ST1", "July 1st").await.unwrap();
    assert!(garbage.slot_id.is_none());
}

#[tokio::test]
async fn test_place_order_checks_capacity_and_quota() {
    let backend = Arc::new(backend().with_quota(DealerQuota {
        dealer_id: "D1".to_string(),
        slot_id: "NEAR".to_string(),
        quota: 40,
        booked: 35,
    }));
    let api = api_with(backend.clone(), in_memory_config());

    let order = |slot: &str, quantity: i64, dealer: Option<&str>| OrderRequest {
        slot_id: slot.to_string(),
        plant_id: "P1".to_string(),
        subtype_id: "ST1".to_string(),
        farmer_name: "Ravi".to_string(),
        quantity,
        dealer_id: dealer.map(|d| d.to_string()),
    };

    // URG 已超订（可订 0）
    assert!(matches!(
        api.place_order(&order("URG", 1, None)).await,
        Err(ApiError::BookingRejected(BookingViolation::ExceedsSlotCapacity { .. }))
    ));
    // NEAR 已超订 → 先撞批次容量
    assert!(matches!(
        api.place_order(&order("NEAR", 6, Some("D1"))).await,
        Err(ApiError::BookingRejected(_))
    ));
    assert!(matches!(
        api.place_order(&order("MISSING", 1, None)).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(backend.recorded_writes().is_empty());
}

#[tokio::test]
async fn test_place_order_within_quota_submits() {
    let mut open = make_slot("OPEN", "01-08-2025", "07-08-2025", 100, 20);
    open.plant_ready_days = Some(10);
    let backend = Arc::new(
        FakeBackend::new(vec![make_plant("P1", true, vec![make_subtype("ST1", Some(10))])])
            .with_slots("P1", "ST1", vec![open])
            .with_quota(DealerQuota {
                dealer_id: "D1".to_string(),
                slot_id: "OPEN".to_string(),
                quota: 30,
                booked: 10,
            }),
    );
    let api = api_with(backend.clone(), in_memory_config());

    let mut order = OrderRequest {
        slot_id: "OPEN".to_string(),
        plant_id: "P1".to_string(),
        subtype_id: "ST1".to_string(),
        farmer_name: "Ravi".to_string(),
        quantity: 21,
        dealer_id: Some("D1".to_string()),
    };
    assert!(matches!(
        api.place_order(&order).await,
        Err(ApiError::BookingRejected(BookingViolation::ExceedsDealerQuota { remaining: 20, .. }))
    ));

    order.quantity = 20;
    api.place_order(&order).await.unwrap();
    assert_eq!(backend.recorded_writes(), vec![RecordedWrite::Order(order)]);
}

#[tokio::test]
async fn test_record_sowing_validation() {
    let backend = Arc::new(
        FakeBackend::new(vec![
            make_plant("P1", true, vec![make_subtype("ST1", Some(10))]),
            make_plant("P2", false, vec![make_subtype("ST2", Some(10))]),
        ])
        .with_slots("P1", "ST1", july_slots()),
    );
    let api = api_with(backend.clone(), in_memory_config());

    let entry = |plant: &str, subtype: &str, quantity: i64, date: &str| SowingEntry {
        slot_id: "URG".to_string(),
        plant_id: plant.to_string(),
        subtype_id: subtype.to_string(),
        quantity,
        sowing_date: date.to_string(),
    };

    assert!(matches!(
        api.record_sowing(&entry("P1", "ST1", 10, "2025-06-20")).await,
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        api.record_sowing(&entry("P2", "ST2", 10, "20-06-2025")).await,
        Err(ApiError::BookingRejected(BookingViolation::SowingNotAllowed(_)))
    ));
    assert!(matches!(
        api.record_sowing(&entry("P1", "ST1", 0, "20-06-2025")).await,
        Err(ApiError::BookingRejected(BookingViolation::NonPositiveQuantity { .. }))
    ));
    assert!(matches!(
        api.record_sowing(&entry("P1", "ST9", 10, "20-06-2025")).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(backend.recorded_writes().is_empty());

    let ok = entry("P1", "ST1", 10, "20-06-2025");
    api.record_sowing(&ok).await.unwrap();
    assert_eq!(backend.recorded_writes(), vec![RecordedWrite::Sowing(ok)]);
}
