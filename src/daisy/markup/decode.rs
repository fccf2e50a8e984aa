//! 文档文本解码
//!
//! 较早的DAISY 2.02制作常用Latin-1/Windows-1252编码保存NCC和SMIL，
//! 因此先按UTF-8读取，失败时再使用配置的后备编码。

use encoding_rs::Encoding;
use tracing::warn;

use crate::daisy::error::{DaisyError, Result};

/// 将文档字节解码为字符串
///
/// # 参数
/// * `bytes` - 文件原始内容
/// * `fallback_label` - 非UTF-8内容使用的编码标签，例如 `windows-1252`
pub fn decode_text(bytes: &[u8], fallback_label: &str) -> Result<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string());
    }

    let encoding = Encoding::for_label(fallback_label.as_bytes())
        .ok_or_else(|| DaisyError::ConfigError(format!("未知的编码: {}", fallback_label)))?;

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = used.name(), "文档包含无法解码的字节，已替换为U+FFFD");
    }

    Ok(text.into_owned())
}
