//! IO helper: document loading by file extension, JSON writing

use std::{fs::File, io::BufReader, path::Path};

use serde::Serialize;
use serde_json::Value;

use crate::model::data_core::AppError;

/// 支持的文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// 按扩展名判断格式（大小写不敏感）
    pub fn from_path(p: &Path) -> Result<Self, AppError> {
        let ext = p
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yml" | "yaml" => Ok(DocumentFormat::Yaml),
            _ => Err(AppError::UnsupportedFormat(p.display().to_string())),
        }
    }
}

/// 解析文本；YAML 键顺序按文档声明保留
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, AppError> {
    let v = match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
    };
    Ok(v)
}

/// 从文件读取 YAML/JSON 文档
pub fn read_document(p: &Path) -> Result<Value, AppError> {
    let format = DocumentFormat::from_path(p)?;
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: Value = match format {
        DocumentFormat::Json => serde_json::from_reader(rdr)?,
        DocumentFormat::Yaml => serde_yaml::from_reader(rdr)?,
    };
    Ok(v)
}

/// 将数据保存到文件（格式化输出）
pub fn write_json_file<T: Serialize>(p: &Path, value: &T) -> Result<(), AppError> {
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}
