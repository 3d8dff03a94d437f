//! 性能基准测试模块
//!
//! 生成大型嵌套文档，测量导图树构建、搜索与谱系提取的耗时

use std::time::Instant;

use serde_json::{json, Value};

use crate::config::BuildOptions;
use crate::model::lineage::lineage;
use crate::model::mind_tree::MindTree;
use crate::model::search::{search, SearchOutcome};

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试文档
pub fn generate_large_document(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("leaf");
        }

        let mut obj = serde_json::Map::new();

        // 混合各种类型的字段
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 5 {
                0 => json!(format!("value_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!([1, 2, 3, i]),
                _ => create_nested_object(current_depth + 1, max_depth, width / 2),
            };
            obj.insert(key, value);
        }

        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert(
        "metadata".to_string(),
        json!({
            "depth": depth,
            "width": width,
            "description": "synthetic document"
        }),
    );

    root.insert("data".to_string(), create_nested_object(0, depth, width));

    // 大型数组，触发分组
    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("item_{}", i),
                "active": i % 3 == 0
            })
        })
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 测试导图树构建性能
pub fn benchmark_build(doc: &Value, options: &BuildOptions) -> (PerformanceResult, MindTree) {
    let start = Instant::now();
    let tree = MindTree::build(doc, options);
    let duration = start.elapsed();

    let result = PerformanceResult::new(
        "导图树构建",
        duration.as_millis(),
        !tree.is_empty(),
        &format!("构建了 {} 个节点", tree.len()),
    );
    (result, tree)
}

/// 测试搜索性能
pub fn benchmark_search(tree: &MindTree, query: &str) -> PerformanceResult {
    let start = Instant::now();
    let outcome = search(tree, query);
    let duration = start.elapsed();

    let (success, details) = match outcome {
        SearchOutcome::Found(hits) => (true, format!("命中 {} 个节点", hits.len())),
        SearchOutcome::NoMatch { .. } => (true, "无命中".to_string()),
        SearchOutcome::Cleared => (false, "查询为空".to_string()),
    };
    PerformanceResult::new(&format!("搜索: {}", query), duration.as_millis(), success, &details)
}

/// 测试谱系提取性能：以前序最后一个节点（最深分支末端）为目标
pub fn benchmark_lineage(tree: &MindTree) -> PerformanceResult {
    let Some(target) = tree.preorder().last().copied() else {
        return PerformanceResult::new("谱系提取", 0, false, "空树");
    };
    let start = Instant::now();
    let reduced = lineage(tree, target);
    let duration = start.elapsed();

    PerformanceResult::new(
        "谱系提取",
        duration.as_millis(),
        reduced.contains(target),
        &format!("保留 {} / {} 个节点", reduced.len(), tree.len()),
    )
}

/// 运行综合性能测试
pub fn run_performance_suite(options: &BuildOptions) -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    let test_cases = [
        (3, 10), // 小型：深度3，宽度10
        (4, 20), // 中型：深度4，宽度20
        (5, 30), // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        tracing::info!("测试规模：深度{}，宽度{}", depth, width);

        let start = Instant::now();
        let doc = generate_large_document(depth, width);
        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", depth, width),
            start.elapsed().as_millis(),
            true,
            &format!("生成了深度{}宽度{}的文档", depth, width),
        ));

        let (build_result, tree) = benchmark_build(&doc, options);
        results.push(build_result);
        results.push(benchmark_search(&tree, "item_1"));
        results.push(benchmark_lineage(&tree));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_large_document() {
        let doc = generate_large_document(2, 3);
        let obj = doc.as_object().unwrap();
        assert!(obj.contains_key("metadata"));
        assert!(obj.contains_key("data"));
        assert_eq!(obj["items"].as_array().unwrap().len(), 30);
    }

    #[test]
    fn test_benchmarks_succeed() {
        let doc = generate_large_document(3, 8);
        let options = BuildOptions::default();

        let (build_result, tree) = benchmark_build(&doc, &options);
        assert!(build_result.success);
        assert!(build_result.duration_ms < 1000); // 应该在1秒内完成

        // items 有 80 个带结构的元素，应分成 8 组
        let items = tree.find_by_label_depth("items", 1).unwrap();
        assert_eq!(tree.children(items).count(), 8);

        assert!(benchmark_search(&tree, "item_7").success);
        assert!(benchmark_lineage(&tree).success);
    }
}
