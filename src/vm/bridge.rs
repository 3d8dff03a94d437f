//! VM桥接层：把用户意图（搜索、聚焦、折叠、布局、复制谱系）转换为会话操作
//!
//! 渲染层只需要把意图交给 `ViewModelBridge::dispatch`，再把返回的状态文本
//! 和视图内容显示出来。

use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use crate::model::data_core::{AppError, AppState, NodeRef, SearchReport};
use crate::model::export::ExportStyle;
use crate::model::mind_tree::NodeId;
use crate::model::render::{DisplayMode, Layout};
use crate::utils::clipboard::copy_to_clipboard;

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADED: &str = "文件加载完成";
pub const STATUS_COPIED: &str = "已复制到剪贴板";
pub const STATUS_NO_MATCH: &str = "未找到匹配节点";
pub const STATUS_SEARCH_CLEARED: &str = "已清除搜索";
pub const STATUS_NOT_SEARCHING: &str = "当前没有搜索结果";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

pub const HELP_TEXT: &str = "\
search <文本>          搜索（空文本清除搜索）
next | prev            在搜索结果间循环
clear                  退出搜索
focus <节点>           只显示节点谱系
unfocus                回到完整视图
reveal <节点>          折叠其他分支，展开到节点
toggle-all             整体展开/折叠
toggle <节点>          切换单个节点
layout <LR|TB|radial>  设置布局
display <模式>         default / minimal / enhanced / technical
copy <节点> [--outline|--nested]  复制谱系文本
value <节点>           查看节点对应的源数据
show                   显示当前视图
json                   输出渲染载荷
<节点> 写作 #id 或 深度:标签";

/// 用户意图
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Search(String),
    NextResult,
    PreviousResult,
    ClearSearch,
    FocusOn(NodeRef),
    Unfocus,
    Reveal(NodeRef),
    ToggleExpandAll,
    ToggleNode(NodeRef),
    SetLayout(Layout),
    SetDisplay(DisplayMode),
    CopyLineage(NodeRef, ExportStyle),
    ShowValue(NodeRef),
    Show,
    RenderJson,
    Help,
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let node = |s: &str| s.parse::<NodeRef>().map_err(|e| e.to_string());

        let intent = match cmd {
            "search" | "/" => Intent::Search(rest.to_string()),
            "next" | "n" => Intent::NextResult,
            "prev" | "p" => Intent::PreviousResult,
            "clear" => Intent::ClearSearch,
            "focus" => Intent::FocusOn(node(rest)?),
            "unfocus" => Intent::Unfocus,
            "reveal" => Intent::Reveal(node(rest)?),
            "toggle-all" => Intent::ToggleExpandAll,
            "toggle" => Intent::ToggleNode(node(rest)?),
            "layout" => Intent::SetLayout(rest.parse()?),
            "display" => Intent::SetDisplay(rest.parse()?),
            "copy" => {
                // 导出格式必须带 `--` 前缀，标签里的普通单词不会被误认
                let (target, style) = match rest.rsplit_once(char::is_whitespace) {
                    Some((head, tail)) if tail.starts_with("--") => (head.trim(), tail[2..].parse::<ExportStyle>()?),
                    _ => (rest, ExportStyle::default()),
                };
                Intent::CopyLineage(node(target)?, style)
            }
            "value" => Intent::ShowValue(node(rest)?),
            "show" | "" => Intent::Show,
            "json" => Intent::RenderJson,
            "help" | "?" => Intent::Help,
            other => return Err(format!("未知命令: {}（输入 help 查看帮助）", other)),
        };
        Ok(intent)
    }
}

/// 一次意图处理的结果：状态栏文本与可选的正文
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeReply {
    pub status: String,
    pub body: Option<String>,
}

impl BridgeReply {
    fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            body: None,
        }
    }

    fn with_body(status: impl Into<String>, body: String) -> Self {
        Self {
            status: status.into(),
            body: Some(body),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status.starts_with(STATUS_ERROR_PREFIX)
    }
}

/// VM桥接器：管理意图与会话状态的交互
pub struct ViewModelBridge {
    app_state: AppState,
    /// 复制谱系时是否写入系统剪贴板
    clipboard: bool,
}

impl ViewModelBridge {
    pub fn new(app_state: AppState, clipboard: bool) -> Self {
        Self { app_state, clipboard }
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    /// 加载文件；失败时保留之前的视图
    pub fn load_file(&mut self, p: &Path) -> BridgeReply {
        let start = Instant::now();
        match self.app_state.load_file(p) {
            Ok(count) => {
                tracing::info!("文件加载成功: {} 个节点，耗时: {:.2}ms", count, start.elapsed().as_secs_f64() * 1000.0);
                BridgeReply::status(format!("{}: {} 个节点", STATUS_LOADED, count))
            }
            Err(e) => {
                tracing::error!("文件加载失败: {}", e);
                BridgeReply::status(format!("{}{}", STATUS_ERROR_PREFIX, e))
            }
        }
    }

    /// 处理一个意图；错误转成状态文本，不会中断会话
    pub fn dispatch(&mut self, intent: Intent) -> BridgeReply {
        let start = Instant::now();
        let label = format!("{:?}", intent);
        match self.handle(intent) {
            Ok(reply) => {
                tracing::debug!("意图处理完成: {}，耗时: {:.1}ms", label, start.elapsed().as_secs_f64() * 1000.0);
                reply
            }
            Err(e) => {
                tracing::error!("意图处理失败: {}: {}", label, e);
                BridgeReply::status(format!("{}{}", STATUS_ERROR_PREFIX, e))
            }
        }
    }

    fn handle(&mut self, intent: Intent) -> Result<BridgeReply, AppError> {
        let state = &mut self.app_state;
        let reply = match intent {
            Intent::Search(query) => match state.search(&query)? {
                SearchReport::Cleared => BridgeReply::with_body(STATUS_SEARCH_CLEARED, state.outline()?),
                SearchReport::NoMatch => BridgeReply::status(format!("{}: {}", STATUS_NO_MATCH, query.trim())),
                SearchReport::Found { total, current } => BridgeReply::with_body(
                    format!("找到 {} 个匹配，当前 1/{}: {}", total, total, Self::label_of(state, current)),
                    state.outline()?,
                ),
            },
            Intent::NextResult => {
                let moved = state.next_result();
                Self::cursor_reply(state, moved)
            }
            Intent::PreviousResult => {
                let moved = state.previous_result();
                Self::cursor_reply(state, moved)
            }
            Intent::ClearSearch => {
                if state.clear_search() {
                    BridgeReply::with_body(STATUS_SEARCH_CLEARED, state.outline()?)
                } else {
                    BridgeReply::status(STATUS_NOT_SEARCHING)
                }
            }
            Intent::FocusOn(node) => {
                let id = state.focus_on(&node)?;
                BridgeReply::with_body(format!("已聚焦: {} {}", Self::label_of(state, id), id), state.outline()?)
            }
            Intent::Unfocus => {
                state.unfocus();
                BridgeReply::with_body(STATUS_READY, state.outline()?)
            }
            Intent::Reveal(node) => {
                let id = state.reveal(&node)?;
                BridgeReply::with_body(format!("已定位: {} {}", Self::label_of(state, id), id), state.outline()?)
            }
            Intent::ToggleExpandAll => {
                let collapsed = state.toggle_expand_all()?;
                let action = if collapsed { "全部折叠" } else { "全部展开" };
                BridgeReply::with_body(action, state.outline()?)
            }
            Intent::ToggleNode(node) => {
                let collapsed = state.toggle_node(&node)?;
                let action = if collapsed { "折叠" } else { "展开" };
                tracing::info!("节点{}切换: {}", action, node);
                BridgeReply::with_body(format!("节点已{}: {}", action, node), state.outline()?)
            }
            Intent::SetLayout(layout) => {
                state.set_layout(layout);
                BridgeReply::status(format!("布局: {}", layout))
            }
            Intent::SetDisplay(display) => {
                state.set_display(display);
                BridgeReply::status(format!("显示模式: {:?}", display))
            }
            Intent::CopyLineage(node, style) => {
                let text = state.copy_lineage(&node, style)?;
                let status = if !self.clipboard {
                    "谱系文本".to_string()
                } else {
                    match copy_to_clipboard(&text) {
                        Ok(()) => STATUS_COPIED.to_string(),
                        Err(e) => {
                            tracing::warn!("剪贴板不可用，回退为直接输出: {}", e);
                            format!("剪贴板不可用: {}", e)
                        }
                    }
                };
                BridgeReply::with_body(status, text)
            }
            Intent::ShowValue(node) => BridgeReply::with_body(format!("源数据: {}", node), state.node_value_pretty(&node)?),
            Intent::Show => BridgeReply::with_body(format!("{:?}", state.mode()), state.outline()?),
            Intent::RenderJson => {
                let payload = state.render_payload()?;
                BridgeReply::with_body("渲染载荷", serde_json::to_string_pretty(&payload)?)
            }
            Intent::Help => BridgeReply::with_body(STATUS_READY, HELP_TEXT.to_string()),
        };
        Ok(reply)
    }

    fn cursor_reply(state: &AppState, moved: Option<NodeId>) -> BridgeReply {
        match (moved, state.search_hits()) {
            (Some(id), Some(hits)) => BridgeReply::status(format!(
                "结果 {}/{}: {} {}",
                hits.cursor() + 1,
                hits.len(),
                Self::label_of(state, id),
                id
            )),
            _ => BridgeReply::status(STATUS_NOT_SEARCHING),
        }
    }

    fn label_of(state: &AppState, id: NodeId) -> String {
        state
            .current_view()
            .ok()
            .and_then(|v| v.get(id))
            .map(|n| n.label.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::data_core::ViewMode;
    use serde_json::json;

    fn bridge() -> ViewModelBridge {
        let mut state = AppState::default();
        state.load_value(json!({"a": {"b": 1, "c": 2}, "d": [1, 2, 3]}));
        ViewModelBridge::new(state, false)
    }

    #[test]
    fn test_parse_intents() {
        assert_eq!("search  foo bar ".parse::<Intent>().unwrap(), Intent::Search("foo bar".into()));
        assert_eq!("search".parse::<Intent>().unwrap(), Intent::Search(String::new()));
        assert_eq!("focus #4".parse::<Intent>().unwrap(), Intent::FocusOn(NodeRef::Id(NodeId(4))));
        assert_eq!("layout TB".parse::<Intent>().unwrap(), Intent::SetLayout(Layout::TopBottom));
        assert_eq!(
            "copy 2:b: 1 --nested".parse::<Intent>().unwrap(),
            Intent::CopyLineage(
                NodeRef::LabelDepth {
                    label: "b: 1".into(),
                    depth: 2
                },
                ExportStyle::Nested
            )
        );
        assert_eq!(
            "copy #3".parse::<Intent>().unwrap(),
            Intent::CopyLineage(NodeRef::Id(NodeId(3)), ExportStyle::Outline)
        );
        assert_eq!(
            "copy 1:mode: outline".parse::<Intent>().unwrap(),
            Intent::CopyLineage(
                NodeRef::LabelDepth {
                    label: "mode: outline".into(),
                    depth: 1
                },
                ExportStyle::Outline
            ),
            "标签末尾的普通单词属于节点引用"
        );
        assert!("copy #3 --sideways".parse::<Intent>().is_err());
        assert!("layout sideways".parse::<Intent>().is_err());
        assert!("dance".parse::<Intent>().is_err());
    }

    #[test]
    fn test_search_flow() {
        let mut bridge = bridge();
        let reply = bridge.dispatch(Intent::Search("B".into()));
        assert!(reply.status.contains("找到 1 个匹配"), "状态: {}", reply.status);
        assert!(reply.body.unwrap().contains("*    b: 1"));
        assert_eq!(bridge.app_state().mode(), ViewMode::Searching);

        let reply = bridge.dispatch(Intent::Search("zzz".into()));
        assert!(reply.status.starts_with(STATUS_NO_MATCH));

        let reply = bridge.dispatch(Intent::Search(String::new()));
        assert_eq!(reply.status, STATUS_SEARCH_CLEARED);
        assert_eq!(bridge.app_state().mode(), ViewMode::Normal);
    }

    #[test]
    fn test_next_without_search() {
        let mut bridge = bridge();
        assert_eq!(bridge.dispatch(Intent::NextResult).status, STATUS_NOT_SEARCHING);
    }

    #[test]
    fn test_errors_become_status() {
        let mut bridge = bridge();
        let reply = bridge.dispatch(Intent::FocusOn(NodeRef::Id(NodeId(999))));
        assert!(reply.is_error());
        assert_eq!(bridge.app_state().mode(), ViewMode::Normal);
    }

    #[test]
    fn test_copy_without_clipboard_returns_text() {
        let mut bridge = bridge();
        let reply = bridge.dispatch("copy 1:d".parse().unwrap());
        assert_eq!(reply.body.unwrap(), "root\n└── d\n    ├── [0]: 1\n    ├── [1]: 2\n    └── [2]: 3\n");
    }

    #[test]
    fn test_render_json() {
        let mut bridge = bridge();
        bridge.dispatch(Intent::SetLayout(Layout::Radial));
        let reply = bridge.dispatch(Intent::RenderJson);
        let v: serde_json::Value = serde_json::from_str(&reply.body.unwrap()).unwrap();
        assert_eq!(v["layout"], "radial");
        assert_eq!(v["tree"]["name"], "root");
    }
}
