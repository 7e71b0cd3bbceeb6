// ==========================================
// 苗圃排苗系统 - 日期格式
// ==========================================
// 远程服务与前端统一使用 DD-MM-YYYY 字符串
// 红线: 无法解析的日期视为"不匹配",不报错、不 panic
// ==========================================

use chrono::NaiveDate;
use serde::Serializer;

/// 日期格式 DD-MM-YYYY
pub const DAY_FORMAT: &str = "%d-%m-%Y";

/// 解析 DD-MM-YYYY 日期
///
/// # 返回
/// - Some(NaiveDate): 解析成功
/// - None: 空串或格式错误
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT).ok()
}

/// 格式化为 DD-MM-YYYY
pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

/// serde 辅助: 以 DD-MM-YYYY 输出 Option<NaiveDate>
pub fn serialize_opt_day<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(date) => serializer.serialize_str(&format_day(*date)),
        None => serializer.serialize_none(),
    }
}
