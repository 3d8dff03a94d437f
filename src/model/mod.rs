pub mod classify;
pub mod data_core;
pub mod export;
pub mod lineage;
pub mod mind_tree;
pub mod overlay;
pub mod performance;
pub mod render;
pub mod search;
