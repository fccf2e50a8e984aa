//! 时间编解码模块
//!
//! DAISY文档中的时间都以文本形式出现：NCC/SMIL元数据中的累计时长（`hh:mm:ss`），
//! 以及`audio`元素上的剪辑时间戳（`npt=12.500s`）。这里统一解析为精确的十进制秒数，
//! 避免长篇有声书在累加偏移时产生浮点漂移。

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::daisy::error::{DaisyError, Result};

/// 剪辑时间戳的前缀
const NPT_PREFIX: &str = "npt=";

/// 解析冒号分隔的累计时长
///
/// 字段从高位到低位排列（`时:分:秒` 或 `分:秒`），结果为 Σ 字段·60^(从右数的位置)。
///
/// # 参数
/// * `text` - 时长文本，例如 `01:02:03`
///
/// # 返回值
/// * `Result<Decimal>` - 精确的秒数
pub fn parse_elapsed(text: &str) -> Result<Decimal> {
    let fields: Vec<&str> = text.trim().split(':').collect();
    if fields.len() > 3 {
        return Err(DaisyError::TimeFormat(format!("字段过多: '{}'", text)));
    }

    let sixty = Decimal::from(60);
    let mut total = Decimal::ZERO;
    for field in fields {
        let value = parse_non_negative(field, text)?;
        total = total
            .checked_mul(sixty)
            .and_then(|t| t.checked_add(value))
            .ok_or_else(|| DaisyError::TimeFormat(format!("数值溢出: '{}'", text)))?;
    }

    Ok(total)
}

/// 解析SMIL剪辑时间戳
///
/// 接受 `npt=<秒>s` 形式；也接受时钟形式 `npt=0:01:02.5`，此时按累计时长解析。
pub fn parse_clip_timestamp(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let value = trimmed.strip_prefix(NPT_PREFIX).unwrap_or(trimmed);
    let value = value.strip_suffix('s').unwrap_or(value);

    if value.contains(':') {
        parse_elapsed(value)
    } else {
        parse_non_negative(value, text)
    }
}

/// 解析`seq`元素的`dur`属性（`<秒>s`）
pub fn parse_duration(text: &str) -> Result<Decimal> {
    let trimmed = text.trim();
    let value = trimmed.strip_suffix('s').unwrap_or(trimmed);
    parse_non_negative(value, text)
}

/// 将秒数格式化为文本，供CSV和工程文件使用
///
/// 保留原有小数位数，能够经 `Decimal::from_str` 无损还原。
pub fn format_seconds(value: Decimal) -> String {
    value.to_string()
}

fn parse_non_negative(field: &str, original: &str) -> Result<Decimal> {
    let field = field.trim();
    if field.is_empty() || field.starts_with('-') {
        return Err(DaisyError::TimeFormat(format!("无效的时间字段 '{}' (位于 '{}')", field, original)));
    }

    Decimal::from_str(field)
        .map_err(|e| DaisyError::TimeFormat(format!("无效的时间字段 '{}' (位于 '{}'): {}", field, original, e)))
}
