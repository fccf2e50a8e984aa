//! 文件名清理

/// 文件系统中不允许出现的字符（另外还有ASCII控制字符0-31）
const DISALLOWED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', '^', '{', '}'];

fn is_disallowed(c: char) -> bool {
    (c as u32) < 32 || DISALLOWED_CHARS.contains(&c)
}

/// 将任意标题转换为可安全用作文件名的字符串
///
/// `": "` 先替换为 `" - "`，其余不允许的字符替换为 `_`，最后去掉末尾的句点和空格。
pub fn make_safe_filename(file_name: &str) -> String {
    let replaced: String = file_name
        .replace(": ", " - ")
        .chars()
        .map(|c| if is_disallowed(c) { '_' } else { c })
        .collect();

    replaced.trim_end_matches(['.', ' ']).to_string()
}
