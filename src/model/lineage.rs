//! 谱系提取：根到目标的路径 + 目标完整子树，其余分支全部裁掉

use crate::model::mind_tree::{MindTree, NodeId};
use std::collections::HashSet;

impl MindTree {
    /// 根到目标的节点序列（含两端）；目标不在视图中时返回 `None`
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![target];
        let mut cursor = self.get(target)?.parent;
        while let Some(id) = cursor {
            let node = self.get(id)?;
            path.push(id);
            cursor = node.parent;
        }
        if path.last() != Some(&self.root()) {
            return None;
        }
        path.reverse();
        Some(path)
    }
}

/// 生成目标的谱系视图
///
/// 路径上的节点只保留路径上的子节点，目标保留全部后代。路径整体展开，
/// 目标被高亮。目标不存在时原样返回视图副本。
pub fn lineage(view: &MindTree, target: NodeId) -> MindTree {
    let Some(path) = view.path_to(target) else {
        tracing::warn!("谱系目标不存在: {}", target);
        return view.clone();
    };

    let mut keep: HashSet<NodeId> = path.iter().copied().collect();
    keep.extend(view.preorder_from(target));

    let mut reduced = view.clone();
    reduced.retain(|id| keep.contains(&id));
    reduced.clear_highlights();
    reduced.expand_path(&path);
    if let Some(node) = reduced.get_mut(target) {
        node.highlighted = true;
    }
    reduced
}

/// 以 (标签, 深度) 指定目标；找不到时原样返回
pub fn lineage_by_label(view: &MindTree, label: &str, depth: u32) -> MindTree {
    match view.find_by_label_depth(label, depth) {
        Some(target) => lineage(view, target),
        None => view.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use serde_json::{json, Value};

    fn sample() -> MindTree {
        MindTree::build(
            &json!({
                "server": {"host": "localhost", "tls": {"cert": "a.pem", "key": "a.key"}},
                "client": {"retries": 3},
                "name": "demo"
            }),
            &BuildOptions::default(),
        )
    }

    #[test]
    fn test_path_to() {
        let tree = sample();
        let cert = tree.find_by_label_depth("cert: a.pem", 3).unwrap();
        let labels: Vec<String> = tree
            .path_to(cert)
            .unwrap()
            .into_iter()
            .map(|id| tree.get(id).unwrap().label.clone())
            .collect();
        assert_eq!(labels, vec!["root", "server", "tls", "cert: a.pem"]);
        assert_eq!(tree.path_to(tree.root()), Some(vec![tree.root()]));
        assert_eq!(tree.path_to(NodeId(10_000)), None);
    }

    #[test]
    fn test_lineage_containment() {
        let tree = sample();
        let tls = tree.find_by_label_depth("tls", 2).unwrap();
        let reduced = lineage(&tree, tls);

        let path = tree.path_to(tls).unwrap();
        let subtree: HashSet<NodeId> = tree.preorder_from(tls).into_iter().collect();
        for id in reduced.preorder() {
            assert!(
                path.contains(&id) || subtree.contains(&id),
                "节点 {} 既不在路径上也不是目标后代",
                reduced.get(id).unwrap().label
            );
        }
        assert!(reduced.contains(tls));
        // 目标的全部后代都保留
        assert_eq!(reduced.preorder_from(tls), tree.preorder_from(tls));
    }

    #[test]
    fn test_lineage_drops_siblings() {
        let tree = sample();
        let tls = tree.find_by_label_depth("tls", 2).unwrap();
        let reduced = lineage(&tree, tls);

        let labels: Vec<String> = reduced.preorder().into_iter().map(|id| reduced.get(id).unwrap().label.clone()).collect();
        assert_eq!(labels, vec!["root", "server", "tls", "cert: a.pem", "key: a.key"]);
        assert_eq!(reduced.highlighted(), vec![tls]);
        assert!(!reduced.get(tls).unwrap().collapsed, "目标应展开");
    }

    #[test]
    fn test_lineage_keeps_ids() {
        let tree = sample();
        let server = tree.find_by_label_depth("server", 1).unwrap();
        let reduced = lineage(&tree, server);
        for id in reduced.preorder() {
            assert_eq!(reduced.get(id).unwrap().label, tree.get(id).unwrap().label);
        }
    }

    #[test]
    fn test_lineage_through_cluster() {
        let items: Vec<Value> = (0..15).map(|i| json!({"id": i})).collect();
        let tree = MindTree::build(&json!({"items": items}), &BuildOptions::default());
        let target = tree.find_by_label_depth("[12]", 3).unwrap();
        let reduced = lineage(&tree, target);

        let labels: Vec<String> = reduced.preorder().into_iter().map(|id| reduced.get(id).unwrap().label.clone()).collect();
        assert_eq!(labels, vec!["root", "items", "[10 - 14]", "[12]", "id: 12"]);
    }

    #[test]
    fn test_focus_no_op_for_unknown_target() {
        let tree = sample();
        assert_eq!(lineage(&tree, NodeId(424_242)), tree);
        assert_eq!(lineage_by_label(&tree, "missing", 1), tree);
        // 标签存在但深度不符同样视为不存在
        assert_eq!(lineage_by_label(&tree, "server", 2), tree);
    }

    #[test]
    fn test_lineage_of_root_is_whole_tree() {
        let tree = sample();
        let reduced = lineage(&tree, tree.root());
        assert_eq!(reduced.preorder(), tree.preorder());
    }
}
