//! 渲染载荷：把当前视图序列化成外部图表库（ECharts tree 系列）可直接消费的 JSON
//!
//! 这里只决定每个节点的数据与样式字段，布局和绘制交给渲染层。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::mind_tree::{MindTree, NodeId};

/// 13 级深度配色，按深度循环使用
pub const PALETTE: [&str; 13] = [
    "#d6dffc", // 根：薰衣草蓝
    "#b8e0d2",
    "#ffe6b8",
    "#a9e2da",
    "#ffd1b3",
    "#c0f1ff",
    "#ffb6b9",
    "#a7d0f2",
    "#ffe8a3",
    "#c7e9c0",
    "#ffcfa8",
    "#b5b3ff",
    "#f7c6e0",
];

const TRANSPARENT: &str = "transparent";

pub fn column_color(depth: u32) -> &'static str {
    PALETTE[depth as usize % PALETTE.len()]
}

/// 命中节点的标签边框样式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub color: String,
    pub width: u32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: "crimson".to_string(),
            width: 2,
        }
    }
}

/// 布局方向；不影响树本身
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "radial")]
    Radial,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LR" | "lr" => Ok(Layout::LeftRight),
            "TB" | "tb" => Ok(Layout::TopBottom),
            "radial" | "RADIAL" => Ok(Layout::Radial),
            other => Err(format!("未知布局: {}（可选 LR / TB / radial）", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Layout::LeftRight => "LR",
            Layout::TopBottom => "TB",
            Layout::Radial => "radial",
        };
        f.write_str(s)
    }
}

/// 连线显示风格
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Default,
    Minimal,
    Enhanced,
    Technical,
}

impl DisplayMode {
    /// (平滑曲线, 连线阴影)
    pub fn line_flags(self) -> (bool, bool) {
        match self {
            DisplayMode::Default | DisplayMode::Enhanced => (true, true),
            DisplayMode::Minimal => (false, false),
            DisplayMode::Technical => (false, true),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(DisplayMode::Default),
            "minimal" => Ok(DisplayMode::Minimal),
            "enhanced" => Ok(DisplayMode::Enhanced),
            "technical" => Ok(DisplayMode::Technical),
            other => Err(format!("未知显示模式: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStyle {
    pub color: String,
    pub border_color: String,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelStyle {
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
}

/// 单个渲染节点；叶子不带 `children` 与 `collapsed`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: NodeId,
    pub name: String,
    pub depth: u32,
    pub is_parent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RenderNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    pub item_style: ItemStyle,
    pub label: LabelStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPayload {
    pub layout: Layout,
    pub display: DisplayMode,
    pub smooth_curves: bool,
    pub line_shadows: bool,
    pub tree: Option<RenderNode>,
}

impl RenderPayload {
    pub fn new(view: &MindTree, layout: Layout, display: DisplayMode, highlight: &HighlightStyle) -> Self {
        let (smooth_curves, line_shadows) = display.line_flags();
        Self {
            layout,
            display,
            smooth_curves,
            line_shadows,
            tree: render_node(view, view.root(), highlight),
        }
    }
}

/// 递归生成以 `id` 为根的渲染节点
pub fn render_node(view: &MindTree, id: NodeId, highlight: &HighlightStyle) -> Option<RenderNode> {
    let node = view.get(id)?;
    let children: Vec<RenderNode> = node
        .children
        .iter()
        .filter_map(|c| render_node(view, *c, highlight))
        .collect();
    let is_parent = !children.is_empty();
    let (border_color, border_width) = if node.highlighted {
        (highlight.color.clone(), highlight.width)
    } else {
        (TRANSPARENT.to_string(), 0)
    };

    Some(RenderNode {
        id: node.id,
        name: node.label.clone(),
        depth: node.depth,
        is_parent,
        collapsed: is_parent.then_some(node.collapsed),
        children: is_parent.then_some(children),
        item_style: ItemStyle {
            color: TRANSPARENT.to_string(),
            border_color: TRANSPARENT.to_string(),
            border_width: 0,
        },
        label: LabelStyle {
            background_color: column_color(node.depth).to_string(),
            border_color,
            border_width,
        },
    })
}
