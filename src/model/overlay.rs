//! 状态覆盖层：折叠/展开与高亮，直接修改节点上的呈现字段

use crate::model::mind_tree::{MindTree, NodeId};

impl MindTree {
    /// 对所有可达父节点设置折叠状态，叶子不受影响
    pub fn set_collapsed(&mut self, value: bool) {
        for id in self.preorder() {
            if let Some(node) = self.get_mut(id) {
                if node.is_parent() {
                    node.collapsed = value;
                }
            }
        }
    }

    /// 没有任何可达父节点处于折叠状态
    pub fn is_fully_expanded(&self) -> bool {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.get(id))
            .all(|n| !n.is_parent() || !n.collapsed)
    }

    /// 全部展开时整体折叠，否则整体展开；返回操作后的折叠值
    pub fn toggle_all(&mut self) -> bool {
        let collapse = self.is_fully_expanded();
        self.set_collapsed(collapse);
        collapse
    }

    /// 折叠全部父节点，再只展开根到目标的路径（含目标本身）
    ///
    /// 目标不在当前视图中时不做任何修改并返回 `false`。
    pub fn collapse_ancestors_except(&mut self, target: NodeId) -> bool {
        let Some(path) = self.path_to(target) else {
            return false;
        };
        self.set_collapsed(true);
        self.expand_path(&path);
        true
    }

    /// 展开路径上的每个父节点
    pub fn expand_path(&mut self, path: &[NodeId]) {
        for id in path {
            if let Some(node) = self.get_mut(*id) {
                if node.is_parent() {
                    node.collapsed = false;
                }
            }
        }
    }

    /// 切换单个父节点；返回新的折叠状态，叶子或不存在的节点返回 `None`
    pub fn toggle_node(&mut self, id: NodeId) -> Option<bool> {
        let node = self.get_mut(id)?;
        if !node.is_parent() {
            return None;
        }
        node.collapsed = !node.collapsed;
        Some(node.collapsed)
    }

    pub fn clear_highlights(&mut self) {
        for id in self.preorder() {
            if let Some(node) = self.get_mut(id) {
                node.highlighted = false;
            }
        }
    }

    /// 当前高亮的节点（前序）
    pub fn highlighted(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|n| n.highlighted))
            .collect()
    }
}
