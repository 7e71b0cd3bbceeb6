// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::types::Priority;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use nursery_slot_planner::i18n::t;
/// let msg = t("transfer.no_targets");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use nursery_slot_planner::i18n::t_with_args;
/// let msg = t_with_args("transfer.submitted", &[("quantity", "30")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 优先级显示文本
pub fn priority_label(priority: Priority) -> String {
    t(priority.i18n_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 为避免测试互相干扰，这里对 i18n 相关测试串行化。
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        assert_eq!(current_locale(), "en");

        // 恢复默认语言
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");
    }

    #[test]
    fn test_priority_labels() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(priority_label(Priority::Urgent), "紧急");
        assert_eq!(priority_label(Priority::MissingLeadTime), "缺少育苗天数");

        set_locale("en");
        assert_eq!(priority_label(Priority::Urgent), "Urgent");
        assert_eq!(priority_label(Priority::NoBooking), "No booking");

        set_locale("zh-CN");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        let msg = t_with_args("transfer.submitted", &[("quantity", "30")]);
        assert!(msg.contains("30"));
        assert!(msg.contains("调拨"));

        set_locale("en");
        let msg = t_with_args("transfer.submitted", &[("quantity", "30")]);
        assert!(msg.contains("30"));
        assert!(msg.contains("Transfer"));

        set_locale("zh-CN");
    }

    #[test]
    fn test_order_and_sowing_confirmations() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        let args = [("slot_id", "S1"), ("quantity", "40"), ("date", "20-06-2025")];

        set_locale("zh-CN");
        assert!(t_with_args("order.submitted", &args).contains("订单"));
        assert!(t_with_args("sowing.recorded", &args).contains("20-06-2025"));

        set_locale("en");
        let order = t_with_args("order.submitted", &args);
        let sowing = t_with_args("sowing.recorded", &args);
        assert!(order.starts_with("Order submitted"));
        assert!(sowing.starts_with("Sowing recorded"));
        assert_ne!(order, t_with_args("slot.updated", &args));

        set_locale("zh-CN");
    }
}
