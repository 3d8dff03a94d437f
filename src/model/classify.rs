//! 值分类器：把任意文档值归为标量 / 有序集合 / 键值集合，并给出有序子项

use serde_json::Value;

/// 分类结果；集合类携带 (键, 子值) 序列
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<'a> {
    Scalar,
    /// 数组：键为合成的 `[0]`、`[1]`……
    Ordered(Vec<(String, &'a Value)>),
    /// 对象：按文档声明顺序
    Keyed(Vec<(String, &'a Value)>),
}

impl<'a> Shape<'a> {
    /// 子项序列；标量为空
    pub fn into_pairs(self) -> Vec<(String, &'a Value)> {
        match self {
            Shape::Scalar => Vec::new(),
            Shape::Ordered(pairs) | Shape::Keyed(pairs) => pairs,
        }
    }
}

/// 对任意值分类，不会失败
pub fn classify(v: &Value) -> Shape<'_> {
    match v {
        Value::Array(arr) => Shape::Ordered(
            arr.iter()
                .enumerate()
                .map(|(idx, child)| (format!("[{}]", idx), child))
                .collect(),
        ),
        Value::Object(map) => Shape::Keyed(map.iter().map(|(k, child)| (k.clone(), child)).collect()),
        _ => Shape::Scalar,
    }
}

/// 非空数组或非空对象
pub fn has_structure(v: &Value) -> bool {
    match v {
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => false,
    }
}

/// 叶子标签里使用的值文本：字符串不加引号，空集合显示为 `[]` / `{}`
pub fn display_scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) if arr.is_empty() => "[]".to_string(),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        // 非空集合不会作为叶子显示，这里给出紧凑形式兜底
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_have_no_children() {
        for v in [json!(null), json!(true), json!(3.5), json!("文本")] {
            let shape = classify(&v);
            assert_eq!(shape, Shape::Scalar);
            assert!(shape.into_pairs().is_empty());
        }
    }

    #[test]
    fn test_array_keys_are_bracketed_indices() {
        let v = json!(["a", {"b": 1}, []]);
        let keys: Vec<String> = classify(&v).into_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["[0]", "[1]", "[2]"]);
    }

    #[test]
    fn test_object_keeps_declared_order() {
        let v: Value = serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        let keys: Vec<String> = classify(&v).into_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_collections_classify_without_children() {
        let arr = json!([]);
        let obj = json!({});
        assert!(matches!(classify(&arr), Shape::Ordered(ref p) if p.is_empty()));
        assert!(matches!(classify(&obj), Shape::Keyed(ref p) if p.is_empty()));
        assert!(!has_structure(&arr));
        assert!(!has_structure(&obj));
        assert!(has_structure(&json!([0])));
        assert!(!has_structure(&json!("非集合")));
    }

    #[test]
    fn test_display_scalar() {
        assert_eq!(display_scalar(&json!("raw")), "raw");
        assert_eq!(display_scalar(&json!(42)), "42");
        assert_eq!(display_scalar(&json!(false)), "false");
        assert_eq!(display_scalar(&json!(null)), "null");
        assert_eq!(display_scalar(&json!([])), "[]");
        assert_eq!(display_scalar(&json!({})), "{}");
    }
}
