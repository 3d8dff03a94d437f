//! AppState：会话核心状态、视图状态机与 JSONPath 回查

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use jsonpath_rust::JsonPath; // 提供 query 扩展
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::model::export::{export_lineage, to_visible_outline, ExportStyle};
use crate::model::lineage::lineage;
use crate::model::mind_tree::{MindTree, NodeId};
use crate::model::render::{DisplayMode, Layout, RenderPayload};
use crate::model::search::{search as run_search, SearchHits, SearchOutcome};
use crate::utils::clipboard::ClipboardError;
use crate::utils::fs::read_document;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("YAML解析失败: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("不支持的文件类型: {0}")]
    UnsupportedFormat(String),
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
    #[error("节点不存在: {0}")]
    NodeNotFound(String),
    #[error("节点引用无效: {0}")]
    InvalidRef(String),
    #[error("状态错误: {0}")]
    State(String),
    #[error("剪贴板错误: {0}")]
    Clipboard(#[from] ClipboardError),
}

/// 外部对节点的引用：稳定 id，或渲染层回调给出的 (标签, 深度)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRef {
    Id(NodeId),
    LabelDepth { label: String, depth: u32 },
}

impl FromStr for NodeRef {
    type Err = AppError;

    /// `#12` / `12` 为 id，`2:label` 为 (深度, 标签)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);
        if let Ok(n) = digits.parse::<usize>() {
            return Ok(NodeRef::Id(NodeId(n)));
        }
        if let Some((depth, label)) = s.split_once(':') {
            if let Ok(depth) = depth.trim().parse::<u32>() {
                return Ok(NodeRef::LabelDepth {
                    label: label.to_string(),
                    depth,
                });
            }
        }
        Err(AppError::InvalidRef(format!("应为 #id 或 深度:标签，得到 {}", s)))
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Id(id) => write!(f, "{}", id),
            NodeRef::LabelDepth { label, depth } => write!(f, "{}:{}", depth, label),
        }
    }
}

/// 聚焦视图：目标及其谱系树
#[derive(Debug, Clone, PartialEq)]
pub struct Focus {
    pub target: NodeId,
    pub tree: MindTree,
}

/// 当前显示哪棵树；搜索会记住进入前的聚焦视图
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    #[default]
    Normal,
    Focused(Focus),
    Searching { base: Option<Focus>, hits: SearchHits },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Normal,
    Searching,
    Focused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchReport {
    Cleared,
    NoMatch,
    Found { total: usize, current: NodeId },
}

#[derive(Debug, Default)]
pub struct AppState {
    pub source_path: Option<PathBuf>,
    pub dom: Option<Value>,
    pub tree: Option<MindTree>,
    pub config: Config,
    view: ViewState,
    layout: Layout,
    display: DisplayMode,
}

fn not_loaded() -> AppError {
    AppError::State("文档尚未加载".into())
}

impl AppState {
    pub fn with_config(config: Config) -> Self {
        Self {
            layout: config.layout,
            display: config.display,
            config,
            ..Self::default()
        }
    }

    /// 加载文档文件并构建导图树；解析失败时保留原有状态
    pub fn load_file(&mut self, p: &Path) -> Result<usize, AppError> {
        let dom = read_document(p)?;
        let count = self.load_value(dom);
        self.source_path = Some(p.to_path_buf());
        Ok(count)
    }

    /// 用已解析的值替换当前文档，返回节点数
    pub fn load_value(&mut self, dom: Value) -> usize {
        let start = Instant::now();
        let tree = MindTree::build(&dom, &self.config.build);
        let count = tree.len();
        self.tree = Some(tree);
        self.dom = Some(dom);
        self.view = ViewState::Normal;
        tracing::info!("导图树构建完成: {} 个节点，耗时: {:.1}ms", count, start.elapsed().as_secs_f64() * 1000.0);
        count
    }

    pub fn is_loaded(&self) -> bool {
        self.tree.is_some()
    }

    pub fn mode(&self) -> ViewMode {
        match self.view {
            ViewState::Normal => ViewMode::Normal,
            ViewState::Focused(_) => ViewMode::Focused,
            ViewState::Searching { .. } => ViewMode::Searching,
        }
    }

    /// 当前显示的树
    pub fn current_view(&self) -> Result<&MindTree, AppError> {
        match &self.view {
            ViewState::Normal => self.tree.as_ref().ok_or_else(not_loaded),
            ViewState::Focused(focus) => Ok(&focus.tree),
            ViewState::Searching { hits, .. } => Ok(&hits.tree),
        }
    }

    fn current_view_mut(&mut self) -> Result<&mut MindTree, AppError> {
        match &mut self.view {
            ViewState::Normal => self.tree.as_mut().ok_or_else(not_loaded),
            ViewState::Focused(focus) => Ok(&mut focus.tree),
            ViewState::Searching { hits, .. } => Ok(&mut hits.tree),
        }
    }

    /// 搜索所基于的树：聚焦视图或原始树，不含上一次搜索的标注
    fn base_view(&self) -> Result<&MindTree, AppError> {
        match &self.view {
            ViewState::Focused(focus) | ViewState::Searching { base: Some(focus), .. } => Ok(&focus.tree),
            _ => self.tree.as_ref().ok_or_else(not_loaded),
        }
    }

    /// 在当前视图中解析节点引用
    pub fn resolve(&self, node: &NodeRef) -> Result<NodeId, AppError> {
        let view = self.current_view()?;
        let found = match node {
            NodeRef::Id(id) => view.contains(*id).then_some(*id),
            NodeRef::LabelDepth { label, depth } => view.find_by_label_depth(label, *depth),
        };
        found.ok_or_else(|| AppError::NodeNotFound(node.to_string()))
    }

    pub fn search(&mut self, query: &str) -> Result<SearchReport, AppError> {
        let start = Instant::now();
        let outcome = run_search(self.base_view()?, query);
        let report = match outcome {
            SearchOutcome::Cleared => {
                self.clear_search();
                SearchReport::Cleared
            }
            SearchOutcome::NoMatch { .. } => SearchReport::NoMatch,
            SearchOutcome::Found(hits) => {
                let total = hits.len();
                let current = hits.current().ok_or_else(|| AppError::State("搜索结果为空".into()))?;
                let base = match std::mem::take(&mut self.view) {
                    ViewState::Normal => None,
                    ViewState::Focused(focus) => Some(focus),
                    ViewState::Searching { base, .. } => base,
                };
                self.view = ViewState::Searching { base, hits };
                SearchReport::Found { total, current }
            }
        };
        tracing::info!("搜索过滤应用: {}，耗时: {:.1}ms", query.trim(), start.elapsed().as_secs_f64() * 1000.0);
        Ok(report)
    }

    /// 退出搜索，回到进入搜索前的视图；不在搜索中返回 `false`
    pub fn clear_search(&mut self) -> bool {
        match std::mem::take(&mut self.view) {
            ViewState::Searching { base, .. } => {
                self.view = base.map(ViewState::Focused).unwrap_or_default();
                true
            }
            other => {
                self.view = other;
                false
            }
        }
    }

    pub fn search_hits(&self) -> Option<&SearchHits> {
        match &self.view {
            ViewState::Searching { hits, .. } => Some(hits),
            _ => None,
        }
    }

    pub fn next_result(&mut self) -> Option<NodeId> {
        match &mut self.view {
            ViewState::Searching { hits, .. } => hits.next(),
            _ => None,
        }
    }

    pub fn previous_result(&mut self) -> Option<NodeId> {
        match &mut self.view {
            ViewState::Searching { hits, .. } => hits.previous(),
            _ => None,
        }
    }

    /// 聚焦：以当前显示的树为准生成目标谱系视图
    pub fn focus_on(&mut self, node: &NodeRef) -> Result<NodeId, AppError> {
        let target = self.resolve(node)?;
        let tree = lineage(self.current_view()?, target);
        tracing::info!("聚焦节点 {}: 保留 {} 个节点", target, tree.len());
        self.view = ViewState::Focused(Focus { target, tree });
        Ok(target)
    }

    pub fn unfocus(&mut self) {
        self.view = ViewState::Normal;
    }

    /// 在原始树上折叠其他分支，只展开到目标的路径
    pub fn reveal(&mut self, node: &NodeRef) -> Result<NodeId, AppError> {
        let target = self.resolve(node)?;
        let tree = self.tree.as_mut().ok_or_else(not_loaded)?;
        if !tree.collapse_ancestors_except(target) {
            return Err(AppError::NodeNotFound(node.to_string()));
        }
        self.view = ViewState::Normal;
        Ok(target)
    }

    /// 对当前视图整体切换展开/折叠，返回操作后的折叠值
    pub fn toggle_expand_all(&mut self) -> Result<bool, AppError> {
        Ok(self.current_view_mut()?.toggle_all())
    }

    pub fn toggle_node(&mut self, node: &NodeRef) -> Result<bool, AppError> {
        let id = self.resolve(node)?;
        self.current_view_mut()?
            .toggle_node(id)
            .ok_or_else(|| AppError::State(format!("叶子节点无法折叠: {}", id)))
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// 布局只影响渲染，不改变树
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    pub fn display(&self) -> DisplayMode {
        self.display
    }

    pub fn set_display(&mut self, display: DisplayMode) {
        self.display = display;
    }

    /// 导出节点谱系文本
    pub fn copy_lineage(&self, node: &NodeRef, style: ExportStyle) -> Result<String, AppError> {
        let target = self.resolve(node)?;
        export_lineage(self.current_view()?, target, style).ok_or_else(|| AppError::NodeNotFound(node.to_string()))
    }

    /// 按节点的 JSONPath 回查源文档，返回 pretty JSON
    pub fn node_value_pretty(&self, node: &NodeRef) -> Result<String, AppError> {
        let id = self.resolve(node)?;
        let path = self
            .current_view()?
            .get(id)
            .and_then(|n| n.path.clone())
            .ok_or_else(|| AppError::State(format!("聚合节点没有对应的源路径: {}", id)))?;
        self.extract_subtree_pretty(&path)
    }

    /// 按 JSONPath 提取第一个匹配节点的 pretty 字符串
    pub fn extract_subtree_pretty(&self, json_path: &str) -> Result<String, AppError> {
        let dom = self.dom.as_ref().ok_or_else(not_loaded)?;
        let hits: Vec<&Value> = dom
            .query(json_path)
            .map_err(|e| AppError::JsonPath(e.to_string()))?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| AppError::JsonPath("未匹配到任何节点".into()))?;
        Ok(serde_json::to_string_pretty(first)?)
    }

    pub fn render_payload(&self) -> Result<RenderPayload, AppError> {
        Ok(RenderPayload::new(
            self.current_view()?,
            self.layout,
            self.display,
            &self.config.highlight,
        ))
    }

    /// 终端可见大纲
    pub fn outline(&self) -> Result<String, AppError> {
        Ok(to_visible_outline(self.current_view()?))
    }
}
