//! 导图树（Mind Tree）：把文档值变成分支数有界、带标签的可浏览树
//!
//! 节点存放在按槽位索引的 arena 中，`NodeId` 即槽位下标，构建时分配一次，
//! 之后的折叠、搜索、谱系视图都沿用同一个 id。派生视图是 arena 的克隆，
//! 被裁剪的槽位置为 `None`。

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::BuildOptions;
use crate::model::classify::{classify, display_scalar, has_structure, Shape};

/// 节点标识：arena 槽位下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 节点类型（与渲染解耦）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// 标量或空集合
    Leaf,
    /// 文档中的非空对象/数组
    Branch,
    /// 为限制分支数插入的合成聚合节点
    Cluster,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MindNode {
    pub id: NodeId,
    /// 显示名：叶子为 `键: 值`，结构节点为键名，聚合节点为 `[a - b]`
    pub label: String,
    /// 距根深度，仅用于样式
    pub depth: u32,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// RFC 9535 JSONPath（用于回查源文档）；聚合节点没有
    pub path: Option<String>,
    /// 是否折叠（仅对父节点有意义）
    pub collapsed: bool,
    /// 搜索/谱系高亮
    pub highlighted: bool,
}

impl MindNode {
    pub fn is_parent(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_cluster(&self) -> bool {
        self.kind == NodeKind::Cluster
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MindTree {
    nodes: Vec<Option<MindNode>>,
    root: NodeId,
}

impl MindTree {
    /// 从根值构建整棵树
    pub fn build(root: &Value, options: &BuildOptions) -> Self {
        let mut builder = Builder {
            nodes: Vec::with_capacity(1024),
            options,
        };
        let root_id = builder.walk(root, &options.root_name, "$".to_string(), 0, None);
        Self {
            nodes: builder.nodes,
            root: root_id,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&MindNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut MindNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// 节点是否存在于当前视图
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// 可达节点数量
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &MindNode> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |c| self.get(*c))
    }

    /// 从根开始的前序遍历（深度优先，子节点按原顺序）
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root)
    }

    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else { continue };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// 按 (标签, 深度) 查找第一个前序命中；渲染层回调只提供这两个字段
    pub fn find_by_label_depth(&self, label: &str, depth: u32) -> Option<NodeId> {
        self.preorder().into_iter().find(|id| {
            self.get(*id)
                .map(|n| n.label == label && n.depth == depth)
                .unwrap_or(false)
        })
    }

    /// 只保留 `keep` 命中的节点；断开后不可达的节点一并清除，根始终保留
    pub(crate) fn retain<F>(&mut self, keep: F)
    where
        F: Fn(NodeId) -> bool,
    {
        let root = self.root;
        for slot in self.nodes.iter_mut() {
            if slot.as_ref().is_some_and(|n| n.id != root && !keep(n.id)) {
                *slot = None;
            }
        }
        let live: HashSet<NodeId> = self
            .nodes
            .iter()
            .filter_map(|n| n.as_ref().map(|n| n.id))
            .collect();
        for node in self.nodes.iter_mut().flatten() {
            node.children.retain(|c| live.contains(c));
        }
        let reachable: HashSet<NodeId> = self.preorder().into_iter().collect();
        for slot in self.nodes.iter_mut() {
            if slot.as_ref().is_some_and(|n| !reachable.contains(&n.id)) {
                *slot = None;
            }
        }
    }
}

struct Builder<'o> {
    nodes: Vec<Option<MindNode>>,
    options: &'o BuildOptions,
}

impl Builder<'_> {
    fn push(&mut self, label: String, depth: u32, kind: NodeKind, parent: Option<NodeId>, path: Option<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let collapsed = kind != NodeKind::Leaf && depth >= self.options.visible_depth;
        self.nodes.push(Some(MindNode {
            id,
            label,
            depth,
            kind,
            parent,
            children: Vec::new(),
            path,
            collapsed,
            highlighted: false,
        }));
        id
    }

    fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        if let Some(Some(node)) = self.nodes.get_mut(id.0) {
            node.children = children;
        }
    }

    fn walk(&mut self, v: &Value, name: &str, path: String, depth: u32, parent: Option<NodeId>) -> NodeId {
        let shape = classify(v);
        let ordered = matches!(shape, Shape::Ordered(_));
        let pairs = shape.into_pairs();

        if pairs.is_empty() {
            let label = format!("{}: {}", name, display_scalar(v));
            return self.push(label, depth, NodeKind::Leaf, parent, Some(path));
        }

        let id = self.push(name.to_string(), depth, NodeKind::Branch, parent, Some(path.clone()));
        let child_path = |key: &str| {
            if ordered {
                // 数组键本身就是 `[i]`
                format!("{}{}", path, key)
            } else {
                format!("{}{}", path, name_segment(key))
            }
        };

        let dense = pairs.len() > self.options.cluster_threshold && pairs.iter().any(|(_, c)| has_structure(c));
        let mut children = Vec::new();
        if dense {
            let size = self.options.cluster_size.max(1);
            for (chunk_idx, chunk) in pairs.chunks(size).enumerate() {
                let start = chunk_idx * size;
                let end = start + chunk.len() - 1;
                let cluster = self.push(format!("[{} - {}]", start, end), depth + 1, NodeKind::Cluster, Some(id), None);
                let mut members = Vec::with_capacity(chunk.len());
                for (key, child) in chunk {
                    members.push(self.walk(child, key, child_path(key.as_str()), depth + 2, Some(cluster)));
                }
                self.set_children(cluster, members);
                children.push(cluster);
            }
        } else {
            for (key, child) in &pairs {
                children.push(self.walk(child, key, child_path(key.as_str()), depth + 1, Some(id)));
            }
        }
        self.set_children(id, children);
        id
    }
}

/// 对象键的 JSONPath 片段：合法标识符用 `.key`，否则用单引号 bracket-notation
fn name_segment(key: &str) -> String {
    let mut chars = key.chars();
    let shorthand = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if shorthand {
        return format!(".{}", key);
    }

    let mut out = String::with_capacity(key.len() + 4);
    out.push_str("['");
    for c in key.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push_str("']");
    out
}
