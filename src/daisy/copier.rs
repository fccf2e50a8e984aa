//! 音频文件复制

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::daisy::error::Result;
use crate::daisy::timeline::AudioSink;

/// 把音频文件完整复制到书的输出目录
#[derive(Debug, Clone)]
pub struct FileCopier {
    destination: PathBuf,
}

impl FileCopier {
    /// 创建复制器，目标目录不存在时会被创建
    pub fn new(destination: impl Into<PathBuf>) -> Result<Self> {
        let destination = destination.into();
        fs::create_dir_all(&destination)?;
        Ok(Self { destination })
    }

    /// 目标目录
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

impl AudioSink for FileCopier {
    fn copy_audio(&mut self, source: &Path, file_name: &str) -> Result<()> {
        let target = self.destination.join(file_name);
        fs::copy(source, &target).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("无法复制 {} 到 {}: {}", source.display(), target.display(), e),
            )
        })?;
        debug!(source = %source.display(), target = %target.display(), "音频文件已复制");
        Ok(())
    }
}

/// 只记录复制计划而不写入文件（`--dry-run`）
#[derive(Debug, Clone, Default)]
pub struct PlannedCopies {
    /// (源文件, 新文件名)
    pub copies: Vec<(PathBuf, String)>,
}

impl AudioSink for PlannedCopies {
    fn copy_audio(&mut self, source: &Path, file_name: &str) -> Result<()> {
        self.copies.push((source.to_path_buf(), file_name.to_string()));
        Ok(())
    }
}
