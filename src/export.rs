// ==========================================
// 苗圃排苗系统 - CSV 导出
// ==========================================
// 职责: 批次总览 / 播种提醒导出为 CSV（供表格软件打开）
// 日期统一输出 DD-MM-YYYY
// ==========================================

use crate::api::dto::SlotOverview;
use crate::domain::date::format_day;
use crate::engine::gap::GapRollup;
use crate::engine::reminder::SlotReminder;
use csv::Writer;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ReminderRow<'a> {
    slot_id: &'a str,
    month: &'a str,
    start_day: &'a str,
    end_day: &'a str,
    booked: i64,
    sowed: i64,
    bookable: i64,
    gap: i64,
    need: i64,
    surplus: i64,
    lead_time_days: Option<i64>,
    priority: String,
    sow_by_date: String,
    alert_date: String,
    days_until_sow: Option<i64>,
}

impl<'a> From<&'a SlotReminder> for ReminderRow<'a> {
    fn from(r: &'a SlotReminder) -> Self {
        Self {
            slot_id: &r.slot_id,
            month: &r.month,
            start_day: &r.start_day,
            end_day: &r.end_day,
            booked: r.gap.booked,
            sowed: r.gap.sowed,
            bookable: r.gap.bookable,
            gap: r.gap.gap,
            need: r.gap.need,
            surplus: r.gap.surplus,
            lead_time_days: r.lead_time_days,
            priority: r.priority.to_string(),
            sow_by_date: r.sow_by_date.map(format_day).unwrap_or_default(),
            alert_date: r.alert_date.map(format_day).unwrap_or_default(),
            days_until_sow: r.days_until_sow,
        }
    }
}

#[derive(Serialize)]
struct RollupRow<'a> {
    month: &'a str,
    slot_count: usize,
    booked: i64,
    sowed: i64,
    gap: i64,
    need: i64,
    surplus: i64,
    percent_complete: String,
}

impl<'a> From<&'a GapRollup> for RollupRow<'a> {
    fn from(r: &'a GapRollup) -> Self {
        Self {
            month: &r.label,
            slot_count: r.slot_count,
            booked: r.booked,
            sowed: r.sowed,
            gap: r.gap,
            need: r.need,
            surplus: r.surplus,
            percent_complete: format!("{:.1}", r.percent_complete),
        }
    }
}

/// 导出提醒（每批次一行）
pub fn write_reminders_csv<W: Write>(reminders: &[SlotReminder], out: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(out);
    for r in reminders {
        wtr.serialize(ReminderRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 导出总览的批次明细
pub fn write_overview_csv<W: Write>(overview: &SlotOverview, out: W) -> Result<(), csv::Error> {
    write_reminders_csv(&overview.rows, out)
}

/// 导出月度汇总（末行为品种合计）
pub fn write_rollup_csv<W: Write>(overview: &SlotOverview, out: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(out);
    for r in overview.months.iter().chain(std::iter::once(&overview.total)) {
        wtr.serialize(RollupRow::from(r))?;
    }
    wtr.flush()?;
    Ok(())
}
