//! 配置文件导图工具库
//!
//! 把 YAML/JSON 文档转换成分支数有界、可折叠、可搜索的导图树，
//! 并提供谱系聚焦与文本导出。渲染交给外部图表库，这里只负责树与交互状态。

pub mod config;
pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use config::{BuildOptions, Config};
pub use model::data_core::{AppError, AppState, NodeRef, ViewMode};
pub use model::export::ExportStyle;
pub use model::lineage::lineage;
pub use model::mind_tree::{MindNode, MindTree, NodeId, NodeKind};
pub use model::search::{search, SearchHits, SearchOutcome};
