//! 音频片段数据结构

use rust_decimal::Decimal;

/// 一个`audio`元素对应的音频片段，时间位于整本书的全局时间轴上
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    /// 片段标识：前缀 + `id`属性末尾十六进制数的值
    ///
    /// 前缀由所在章节决定：书为 `"{0} - "`（按章数补零），章为 `"{章标签} - {0} - "`，
    /// 小节为 `"{章标签} - {小节序号} - "`。例如第1章第2小节中 `id="aud_000a"` 的片段为 `"1 - 2 - 10"`。
    pub identifier: String,
    /// 引用的音频文件名（尚未重命名）
    pub source_file_name: String,
    /// 开始时间（秒）
    pub start: Decimal,
    /// 结束时间（秒）
    pub end: Decimal,
}

impl AudioSegment {
    /// 片段时长
    pub fn length(&self) -> Decimal {
        self.end - self.start
    }
}
