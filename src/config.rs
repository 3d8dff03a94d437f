//! 配置：构建参数与呈现默认值，可从 YAML/JSON 文件加载

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::data_core::AppError;
use crate::model::render::{DisplayMode, HighlightStyle, Layout};
use crate::utils::fs::read_document;

// === 常量定义（消除魔法值） ===
pub const DEFAULT_ROOT_NAME: &str = "root";
/// 直接子节点超过该数量（且存在孙节点）时分组
pub const CLUSTER_THRESHOLD: usize = 10;
pub const CLUSTER_SIZE: usize = 10;
/// 初始渲染时展开的层数；达到该深度的父节点默认折叠
pub const VISIBLE_DEPTH: u32 = 2;

/// 树构建参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub root_name: String,
    pub cluster_threshold: usize,
    pub cluster_size: usize,
    pub visible_depth: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            cluster_threshold: CLUSTER_THRESHOLD,
            cluster_size: CLUSTER_SIZE,
            visible_depth: VISIBLE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildOptions,
    pub highlight: HighlightStyle,
    pub layout: Layout,
    pub display: DisplayMode,
}

impl Config {
    /// 从配置文件加载，按扩展名选择 YAML 或 JSON 解析
    pub fn from_path(p: &Path) -> Result<Self, AppError> {
        let raw = read_document(p)?;
        let config: Config = serde_json::from_value(raw)?;
        config.validate()?;
        tracing::info!("配置已加载: {}", p.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.build.cluster_size == 0 {
            return Err(AppError::State("cluster_size 必须大于 0".into()));
        }
        if self.highlight.width == 0 {
            return Err(AppError::State("highlight.width 必须大于 0".into()));
        }
        Ok(())
    }
}
