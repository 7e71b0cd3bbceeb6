// ==========================================
// 对账引擎集成测试
// ==========================================
// 测试目标: 日期索引 / 缺口 / 优先级 / 调拨规划 / 提醒批量 的组合行为
// ==========================================


use chrono::NaiveDate;
use nursery_slot_planner::domain::{effective_lead_time, Priority, SowAnchor, SubtypeSlots};
use nursery_slot_planner::engine::{
    actionable, find_slot_for_date, validate_transfer_quantity, GapCalculator,
    PriorityClassifier, ReminderEngine, SlotIndex, TransferPlanner, TransferViolation,
};
use test_helpers::{make_candidate, make_slot, make_subtype};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// SlotIndex
// ==========================================

#[test]
fn test_every_day_inside_range_resolves() {
    let slots = vec![
        make_slot("JUL-1", "01-07-2025", "07-07-2025", 100, 0),
        make_slot("JUL-2", "08-07-2025", "14-07-2025", 100, 0),
    ];
    let index = SlotIndex::new(&slots);

    let mut day = ymd(2025, 7, 1);
    while day <= ymd(2025, 7, 7) {
        assert_eq!(index.find_slot_for_date(day).map(|s| s.id.as_str()), Some("JUL-1"));
        day = day.succ_opt().unwrap();
    }
    while day <= ymd(2025, 7, 14) {
        assert_eq!(index.find_slot_for_date(day).map(|s| s.id.as_str()), Some("JUL-2"));
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn test_days_outside_all_ranges_are_disabled() {
    let slots = vec![
        make_slot("A", "01-07-2025", "03-07-2025", 100, 0),
        make_slot("B", "10-07-2025", "12-07-2025", 100, 0),
    ];
    let index = SlotIndex::new(&slots);

    assert!(index.find_slot_for_date(ymd(2025, 6, 30)).is_none());
    assert!(index.find_slot_for_date(ymd(2025, 7, 13)).is_none());
    assert_eq!(
        index.disabled_dates(ymd(2025, 7, 3), ymd(2025, 7, 10)),
        vec![
            ymd(2025, 7, 4),
            ymd(2025, 7, 5),
            ymd(2025, 7, 6),
            ymd(2025, 7, 7),
            ymd(2025, 7, 8),
            ymd(2025, 7, 9),
        ]
    );
}

#[test]
fn test_malformed_records_and_inputs_never_match() {
    let slots = vec![
        make_slot("BAD", "2025-07-01", "07-07-2025", 100, 0),
        make_slot("OK", "01-07-2025", "07-07-2025", 100, 0),
    ];
    assert_eq!(find_slot_for_date("03-07-2025", &slots).map(|s| s.id.as_str()), Some("OK"));
    assert!(find_slot_for_date("31-02-2025", &slots).is_none());
    assert!(find_slot_for_date("", &slots).is_none());
    assert_eq!(SlotIndex::new(&slots).skipped_count(), 1);
}

#[test]
fn test_overlap_resolves_to_earliest_start() {
    let slots = vec![
        make_slot("LATE", "05-07-2025", "15-07-2025", 100, 0),
        make_slot("EARLY", "01-07-2025", "07-07-2025", 100, 0),
    ];
    assert_eq!(
        find_slot_for_date("06-07-2025", &slots).map(|s| s.id.as_str()),
        Some("EARLY")
    );
}

// ==========================================
// GapCalculator
// ==========================================

#[test]
fn test_compute_gap_is_idempotent() {
    let mut slot = make_slot("S1", "01-07-2025", "07-07-2025", 100, 120);
    slot.primary_sowed = 30;
    slot.office_sowed = 5;
    let calc = GapCalculator::new();
    assert_eq!(calc.compute_gap(&slot), calc.compute_gap(&slot));
}

#[test]
fn test_rollups_sum_constituents() {
    let mut a = make_slot("A", "01-07-2025", "07-07-2025", 100, 120);
    a.month = Some("July 2025".to_string());
    let mut b = make_slot("B", "08-07-2025", "14-07-2025", 0, 50);
    b.month = Some("July 2025".to_string());
    b.primary_sowed = 80;
    let mut c = make_slot("C", "01-08-2025", "07-08-2025", 10, 0);
    c.month = Some("August 2025".to_string());

    let slots = vec![c.clone(), a.clone(), b.clone()];
    let calc = GapCalculator::new();
    let months = calc.rollup_by_month(&slots);
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].label, "July 2025");
    assert_eq!(months[0].booked, 170);
    assert_eq!(months[0].sowed, 80);
    assert_eq!(months[0].gap, 120 - 30);
    assert_eq!(months[0].need, 120);
    assert_eq!(months[0].surplus, 30);
    assert_eq!(months[1].label, "August 2025");
    assert_eq!(months[1].percent_complete, 0.0);

    let by_subtype = calc.rollup_by_subtype(&[SubtypeSlots {
        subtype: make_subtype("ST1", Some(10)),
        slots,
    }]);
    assert_eq!(by_subtype[0].slot_count, 3);
    assert_eq!(by_subtype[0].booked, 170);
}

// ==========================================
// PriorityClassifier
// ==========================================

#[test]
fn test_scenario_urgent() {
    let mut slot = make_slot("S1", "01-07-2025", "07-07-2025", 100, 120);
    slot.plant_ready_days = Some(10);

    // 可供苗数不计入已播: 待播 = 预订 120
    let gap = GapCalculator::new().compute_gap(&slot);
    assert_eq!(gap.gap, 120);
    assert_eq!(gap.bookable, 0);

    let outcome = PriorityClassifier::new(SowAnchor::Start)
        .classify_slot(&slot, effective_lead_time(&slot, None), 5, ymd(2025, 6, 20))
        .unwrap();
    assert_eq!(outcome.sow_by_date, Some(ymd(2025, 6, 21)));
    assert_eq!(outcome.alert_date, Some(ymd(2025, 6, 16)));
    assert_eq!(outcome.days_until_sow, Some(1));
    assert_eq!(outcome.priority, Priority::Urgent);
}

#[test]
fn test_scenario_missing_lead_time() {
    let slot = make_slot("S1", "01-07-2025", "07-07-2025", 100, 120);
    let classifier = PriorityClassifier::new(SowAnchor::Start);

    let outcome = classifier
        .classify_slot(&slot, effective_lead_time(&slot, None), 5, ymd(2025, 6, 20))
        .unwrap();
    assert_eq!(outcome.priority, Priority::MissingLeadTime);

    // 0 天视为未配置
    let outcome = classifier.classify_slot(&slot, Some(0), 5, ymd(2025, 6, 20)).unwrap();
    assert_eq!(outcome.priority, Priority::MissingLeadTime);
    assert!(outcome.sow_by_date.is_none());
}

#[test]
fn test_unsown_capacity_is_not_surplus() {
    let mut slot = make_slot("S1", "01-07-2025", "07-07-2025", 100, 80);
    slot.plant_ready_days = Some(10);

    let gap = GapCalculator::new().compute_gap(&slot);
    assert_eq!(gap.gap, 80);
    assert_eq!(gap.surplus, 0);
    assert_eq!(gap.bookable, 20);

    let outcome = PriorityClassifier::new(SowAnchor::Start)
        .classify_slot(&slot, Some(10), 5, ymd(2025, 6, 25))
        .unwrap();
    assert_eq!(outcome.priority, Priority::Overdue);
    assert_eq!(
        validate_transfer_quantity(1, gap.surplus, 50),
        Err(TransferViolation::ExceedsSurplus {
            quantity: 1,
            surplus: 0
        })
    );
}

#[test]
fn test_out_of_range_day_counts_never_panic() {
    let slot = make_slot("S1", "01-07-2025", "07-07-2025", 100, 80);
    let classifier = PriorityClassifier::new(SowAnchor::Start);
    assert!(classifier
        .classify_slot(&slot, Some(200_000_000), 5, ymd(2025, 6, 25))
        .is_none());

    let options = TransferPlanner::new()
        .find_transfer_targets(
            &slot,
            &[make_candidate("NEXT", "08-07-2025", 10)],
            200_000_000,
            200_000_000,
        )
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].days_difference, 7);
}

#[test]
fn test_overdue_whenever_past_sow_by() {
    let mut slot = make_slot("S1", "01-07-2025", "07-07-2025", 100, 120);
    slot.plant_ready_days = Some(10);
    let classifier = PriorityClassifier::new(SowAnchor::Start);

    for window in [0, 5, 30, 365] {
        let outcome = classifier
            .classify_slot(&slot, Some(10), window, ymd(2025, 6, 22))
            .unwrap();
        assert_eq!(outcome.priority, Priority::Overdue, "window={}", window);
        assert_eq!(outcome.days_until_sow, Some(-1));
    }
}

#[test]
fn test_scenario_surplus_complete_then_transfer() {
    let mut source = make_slot("SRC", "01-07-2025", "07-07-2025", 0, 50);
    source.primary_sowed = 80;
    source.plant_ready_days = Some(10);

    let gap = GapCalculator::new().compute_gap(&source);
    assert_eq!(gap.gap, -30);
    assert_eq!(gap.surplus, 30);

    let outcome = PriorityClassifier::new(SowAnchor::Start)
        .classify_slot(&source, Some(10), 5, ymd(2025, 6, 20))
        .unwrap();
    assert_eq!(outcome.priority, Priority::Complete);

    let candidates = vec![
        make_candidate("FAR", "20-07-2025", 100),
        make_candidate("LATER", "05-07-2025", 100),
        make_candidate("AFTER", "03-07-2025", 15),
        make_candidate("BEFORE", "29-06-2025", 40),
        make_candidate("FULL", "02-07-2025", 0),
        make_candidate("SRC", "01-07-2025", 99),
    ];
    let options = TransferPlanner::new()
        .find_transfer_targets(&source, &candidates, 7, 14)
        .unwrap();
    let ids: Vec<&str> = options.iter().map(|o| o.slot_id.as_str()).collect();
    // |dd| 相同（±2）时 gap 大者在前
    assert_eq!(ids, vec!["BEFORE", "AFTER", "LATER"]);
    assert_eq!(options[0].days_difference, -2);
    assert_eq!(options[1].days_difference, 2);
    assert_eq!(options[2].days_difference, 4);

    // 数量上限 = 富余 30
    assert!(validate_transfer_quantity(30, gap.surplus, options[0].gap).is_ok());
    assert_eq!(
        validate_transfer_quantity(40, gap.surplus, options[0].gap),
        Err(TransferViolation::ExceedsSurplus {
            quantity: 40,
            surplus: 30
        })
    );
    assert_eq!(
        validate_transfer_quantity(20, gap.surplus, options[1].gap),
        Err(TransferViolation::ExceedsTargetGap {
            quantity: 20,
            target_gap: 15
        })
    );
}

#[test]
fn test_no_targets_is_empty_not_error() {
    let source = make_slot("SRC", "01-07-2025", "07-07-2025", 0, 0);
    let options = TransferPlanner::new()
        .find_transfer_targets(&source, &[make_candidate("X", "01-09-2025", 50)], 7, 14)
        .unwrap();
    assert!(options.is_empty());
}

// ==========================================
// ReminderEngine
// ==========================================

#[test]
fn test_reminder_batch_uses_subtype_default_and_skips_bad_rows() {
    let mut overridden = make_slot("OVR", "01-07-2025", "07-07-2025", 100, 120);
    overridden.plant_ready_days = Some(30);
    let inherits = make_slot("INH", "15-07-2025", "21-07-2025", 100, 150);
    let mut done = make_slot("DONE", "01-08-2025", "07-08-2025", 100, 80);
    done.primary_sowed = 80;
    let broken = make_slot("BROKEN", "xx", "07-08-2025", 100, 80);
    let subtype = make_subtype("ST1", Some(10));

    let batch = ReminderEngine::new(SowAnchor::Start).evaluate_batch(
        &[overridden, inherits, done, broken],
        Some(&subtype),
        5,
        ymd(2025, 6, 20),
    );
    assert_eq!(batch.skipped_slot_ids, vec!["BROKEN".to_string()]);
    assert_eq!(batch.reminders.len(), 3);

    let by_id = |id: &str| batch.reminders.iter().find(|r| r.slot_id == id).unwrap();
    // 01-07 - 30 = 01-06 → 逾期
    assert_eq!(by_id("OVR").priority, Priority::Overdue);
    assert_eq!(by_id("OVR").lead_time_days, Some(30));
    // 15-07 - 10 = 05-07, 提醒日 30-06 → 尚早
    assert_eq!(by_id("INH").priority, Priority::Upcoming);
    assert_eq!(by_id("INH").lead_time_days, Some(10));
    assert_eq!(by_id("DONE").priority, Priority::Complete);

    let todo = actionable(&batch.reminders);
    let ids: Vec<&str> = todo.iter().map(|r| r.slot_id.as_str()).collect();
    assert_eq!(ids, vec!["OVR", "INH"]);
}
