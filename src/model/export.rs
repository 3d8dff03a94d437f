//! 纯文本导出：树形连线大纲、冒号嵌套文本，以及按折叠状态显示的可见大纲

use std::fmt::Write as _;
use std::str::FromStr;

use crate::model::lineage::lineage;
use crate::model::mind_tree::{MindTree, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportStyle {
    /// `├── ` / `└── ` 连线
    #[default]
    Outline,
    /// 冒号嵌套缩进
    Nested,
}

impl FromStr for ExportStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "outline" | "tree" => Ok(ExportStyle::Outline),
            "nested" | "yaml" => Ok(ExportStyle::Nested),
            other => Err(format!("未知导出格式: {}", other)),
        }
    }
}

pub fn export(view: &MindTree, from: NodeId, style: ExportStyle) -> String {
    match style {
        ExportStyle::Outline => to_outline(view, from),
        ExportStyle::Nested => to_nested_text(view, from),
    }
}

/// 导出目标的谱系（从根开始）；目标不在视图中时返回 `None`
pub fn export_lineage(view: &MindTree, target: NodeId, style: ExportStyle) -> Option<String> {
    if !view.contains(target) {
        return None;
    }
    let reduced = lineage(view, target);
    Some(export(&reduced, reduced.root(), style))
}

/// 每个节点一行，后代带树形连线
pub fn to_outline(view: &MindTree, from: NodeId) -> String {
    let mut out = String::new();
    let Some(node) = view.get(from) else {
        return out;
    };
    let _ = writeln!(out, "{}", node.label);
    outline_children(view, from, "", &mut out);
    out
}

fn outline_children(view: &MindTree, id: NodeId, prefix: &str, out: &mut String) {
    let children: Vec<_> = view.children(id).collect();
    let last = children.len().saturating_sub(1);
    for (idx, child) in children.into_iter().enumerate() {
        let (branch, carry) = if idx == last { ("└── ", "    ") } else { ("├── ", "│   ") };
        let _ = writeln!(out, "{}{}{}", prefix, branch, child.label);
        outline_children(view, child.id, &format!("{}{}", prefix, carry), out);
    }
}

/// 冒号嵌套：父节点以 `:` 结尾，每层缩进两个空格
pub fn to_nested_text(view: &MindTree, from: NodeId) -> String {
    let mut out = String::new();
    nested(view, from, 0, &mut out);
    out
}

fn nested(view: &MindTree, id: NodeId, level: usize, out: &mut String) {
    let Some(node) = view.get(id) else { return };
    let indent = "  ".repeat(level);
    if node.is_parent() {
        let _ = writeln!(out, "{}{}:", indent, node.label);
        for child in &node.children {
            nested(view, *child, level + 1, out);
        }
    } else {
        let _ = writeln!(out, "{}{}", indent, node.label);
    }
}

/// 终端预览：只展开未折叠的父节点，`[+]`/`[-]` 标记折叠状态，`*` 标记高亮，行尾附节点 id
pub fn to_visible_outline(view: &MindTree) -> String {
    let mut out = String::new();
    let mut stack = vec![(view.root(), 0usize)];
    while let Some((id, level)) = stack.pop() {
        let Some(node) = view.get(id) else { continue };
        let marker = match (node.is_parent(), node.collapsed) {
            (false, _) => "   ",
            (true, true) => "[+]",
            (true, false) => "[-]",
        };
        let star = if node.highlighted { "*" } else { " " };
        let _ = writeln!(out, "{}{}{} {}  {}", "  ".repeat(level), star, marker, node.label, node.id);
        if node.is_parent() && !node.collapsed {
            stack.extend(node.children.iter().rev().map(|c| (*c, level + 1)));
        }
    }
    out
}
