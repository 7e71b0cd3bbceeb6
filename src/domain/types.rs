// ==========================================
// 苗圃排苗系统 - 领域类型定义
// ==========================================
// 职责: 提醒优先级、播种锚点等枚举
// 红线: 优先级是"等级制",按判定顺序命中即返回,不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 提醒优先级 (Priority)
// ==========================================
// 判定顺序见 engine::priority
// 序列化格式: SCREAMING_SNAKE_CASE (与远程服务一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    MissingLeadTime, // 缺少育苗天数,无法排期
    Complete,        // 已播足
    Overdue,         // 已过最晚播种日
    Urgent,          // 进入提醒窗口
    Upcoming,        // 尚未进入提醒窗口
    NoBooking,       // 无预订
}

impl Priority {
    /// 提醒列表排序权重（越小越靠前）
    ///
    /// Complete / NoBooking 不进入提醒列表,权重仅用于兜底排序
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Overdue => 0,
            Priority::Urgent => 1,
            Priority::MissingLeadTime => 2,
            Priority::Upcoming => 3,
            Priority::Complete => 4,
            Priority::NoBooking => 5,
        }
    }

    /// 是否需要出现在提醒列表中
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Priority::Complete | Priority::NoBooking)
    }

    /// i18n 文案键
    pub fn i18n_key(&self) -> &'static str {
        match self {
            Priority::MissingLeadTime => "priority.missing_lead_time",
            Priority::Complete => "priority.complete",
            Priority::Overdue => "priority.overdue",
            Priority::Urgent => "priority.urgent",
            Priority::Upcoming => "priority.upcoming",
            Priority::NoBooking => "priority.no_booking",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::MissingLeadTime => write!(f, "MISSING_LEAD_TIME"),
            Priority::Complete => write!(f, "COMPLETE"),
            Priority::Overdue => write!(f, "OVERDUE"),
            Priority::Urgent => write!(f, "URGENT"),
            Priority::Upcoming => write!(f, "UPCOMING"),
            Priority::NoBooking => write!(f, "NO_BOOKING"),
        }
    }
}

// ==========================================
// 播种锚点 (Sow Anchor)
// ==========================================
// 最晚播种日 = 锚点日期 - 育苗天数
// START: 以批次开始日为交付起点（默认）
// END:   以批次结束日为交付终点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SowAnchor {
    #[default]
    Start,
    End,
}

impl fmt::Display for SowAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SowAnchor::Start => write!(f, "START"),
            SowAnchor::End => write!(f, "END"),
        }
    }
}

impl SowAnchor {
    /// 从字符串解析锚点（无法识别时返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "START" => Some(SowAnchor::Start),
            "END" => Some(SowAnchor::End),
            _ => None,
        }
    }

    /// 转换为配置存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SowAnchor::Start => "START",
            SowAnchor::End => "END",
        }
    }
}
