//! 时间工具函数
//!
//! 全栈统一使用 `i64` Unix millis；日期格式化仅用于单号生成。

use chrono::Utc;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    shared::util::now_millis()
}

/// 当前日期字符串 (YYYYMMDD)，用于订单号
pub fn today_compact() -> String {
    Utc::now().format("%Y%m%d").to_string()
}

/// 分钟 → 毫秒
pub fn minutes_to_millis(minutes: i64) -> i64 {
    minutes * 60 * 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_date_has_eight_digits() {
        let d = today_compact();
        assert_eq!(d.len(), 8);
        assert!(d.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn minutes_conversion() {
        assert_eq!(minutes_to_millis(120), 7_200_000);
    }
}
