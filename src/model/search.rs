//! 搜索：大小写不敏感的标签子串匹配，展开命中路径并维护结果游标

use crate::model::mind_tree::{MindTree, NodeId};

/// 一次有命中的搜索：带标注的视图副本与前序排列的命中列表
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits {
    pub query: String,
    pub matches: Vec<NodeId>,
    pub tree: MindTree,
    cursor: usize,
}

impl SearchHits {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<NodeId> {
        self.matches.get(self.cursor).copied()
    }

    /// 下一个结果，末尾回绕到开头
    pub fn next(&mut self) -> Option<NodeId> {
        if self.matches.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.matches.len();
        self.current()
    }

    /// 上一个结果，开头回绕到末尾
    pub fn previous(&mut self) -> Option<NodeId> {
        if self.matches.is_empty() {
            return None;
        }
        let len = self.matches.len();
        self.cursor = (self.cursor + len - 1) % len;
        self.current()
    }

    /// 命中标签，顺序与 `matches` 一致
    pub fn labels(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter_map(|id| self.tree.get(*id))
            .map(|n| n.label.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// 查询为空：清除高亮，回到未标注的视图
    Cleared,
    /// 查询非空但没有任何命中
    NoMatch { query: String },
    Found(SearchHits),
}

/// 在视图的副本上搜索；输入视图不会被修改
pub fn search(view: &MindTree, query: &str) -> SearchOutcome {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchOutcome::Cleared;
    }

    let mut tree = view.clone();
    let mut matches = Vec::new();
    let root = tree.root();
    mark(&mut tree, root, &needle, &mut matches);

    if matches.is_empty() {
        tracing::warn!("未找到匹配节点: {}", query.trim());
        return SearchOutcome::NoMatch {
            query: query.trim().to_string(),
        };
    }
    tracing::info!("搜索 \"{}\" 命中 {} 个节点", query.trim(), matches.len());
    SearchOutcome::Found(SearchHits {
        query: query.trim().to_string(),
        matches,
        tree,
        cursor: 0,
    })
}

/// 标注 `id` 及其子树，返回子树内（含自身）是否有命中；不在首个命中处短路
fn mark(tree: &mut MindTree, id: NodeId, needle: &str, matches: &mut Vec<NodeId>) -> bool {
    let Some(node) = tree.get_mut(id) else {
        return false;
    };
    let is_match = node.label.to_lowercase().contains(needle);
    node.highlighted = is_match;
    if is_match {
        matches.push(id);
    }
    let children = node.children.clone();

    let mut below = false;
    for child in children {
        below |= mark(tree, child, needle, matches);
    }

    let found = is_match || below;
    if found {
        if let Some(node) = tree.get_mut(id) {
            if node.is_parent() {
                node.collapsed = false;
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use serde_json::{json, Value};

    fn build(v: &Value) -> MindTree {
        MindTree::build(v, &BuildOptions::default())
    }

    fn found(outcome: SearchOutcome) -> SearchHits {
        match outcome {
            SearchOutcome::Found(hits) => hits,
            other => panic!("期望有命中，实际: {:?}", other),
        }
    }

    /// 命中节点的所有祖先都必须展开
    fn assert_reachable(hits: &SearchHits) {
        for id in &hits.matches {
            let mut cursor = hits.tree.get(*id).unwrap().parent;
            while let Some(parent) = cursor {
                let node = hits.tree.get(parent).unwrap();
                assert!(!node.collapsed, "命中节点 {} 的祖先 {} 仍处于折叠状态", id, node.label);
                cursor = node.parent;
            }
        }
    }

    #[test]
    fn test_round_trip_search() {
        let tree = build(&json!({"a": {"b": 1, "c": 2}, "d": [1, 2, 3]}));
        let hits = found(search(&tree, "b"));

        assert_eq!(hits.labels(), vec!["b: 1"]);
        let a = hits.tree.find_by_label_depth("a", 1).unwrap();
        assert!(!hits.tree.get(a).unwrap().collapsed);
        assert_eq!(hits.tree.highlighted(), hits.matches);
    }

    #[test]
    fn test_case_insensitive_and_preorder() {
        let tree = build(&json!({"Alpha": {"alphabet": 1}, "beta": {"ALPHA": 2}}));
        let hits = found(search(&tree, "ALPHA"));
        assert_eq!(hits.labels(), vec!["Alpha", "alphabet: 1", "ALPHA: 2"]);
    }

    #[test]
    fn test_deep_matches_are_reachable() {
        let doc = json!({"l1": {"l2": {"l3": {"l4": {"needle": true}}}}, "other": {"x": {"y": {"needle2": 1}}}});
        let tree = build(&doc);
        let hits = found(search(&tree, "needle"));
        assert_eq!(hits.len(), 2);
        assert_reachable(&hits);
    }

    #[test]
    fn test_matches_inside_clusters_are_reachable() {
        let items: Vec<Value> = (0..35).map(|i| json!({"name": format!("item-{}", i)})).collect();
        let tree = build(&json!({"items": items}));
        let hits = found(search(&tree, "item-33"));
        assert_eq!(hits.labels(), vec!["name: item-33"]);
        assert_reachable(&hits);
    }

    #[test]
    fn test_search_does_not_mutate_input() {
        let tree = build(&json!({"a": {"b": {"c": {"target": 1}}}}));
        let before = tree.clone();
        let _ = search(&tree, "target");
        assert_eq!(tree, before);
    }

    #[test]
    fn test_empty_and_no_match_are_distinct() {
        let tree = build(&json!({"a": 1}));
        assert_eq!(search(&tree, "   "), SearchOutcome::Cleared);
        assert_eq!(search(&tree, "zzz"), SearchOutcome::NoMatch { query: "zzz".to_string() });
    }

    #[test]
    fn test_previous_highlights_are_cleared() {
        let tree = build(&json!({"apple": 1, "banana": 2}));
        let first = found(search(&tree, "apple"));
        let second = found(search(&first.tree, "banana"));
        assert_eq!(second.labels(), vec!["banana: 2"]);
        assert_eq!(second.tree.highlighted(), second.matches);
    }

    #[test]
    fn test_cursor_wraps_both_ways() {
        let tree = build(&json!({"x1": 1, "x2": 2, "x3": 3}));
        let mut hits = found(search(&tree, "x"));
        let all = hits.matches.clone();

        assert_eq!(hits.current(), Some(all[0]));
        assert_eq!(hits.next(), Some(all[1]));
        assert_eq!(hits.next(), Some(all[2]));
        assert_eq!(hits.next(), Some(all[0]), "末尾应回绕到开头");
        assert_eq!(hits.previous(), Some(all[2]), "开头应回绕到末尾");
        assert_eq!(hits.cursor(), 2);
    }
}
