//! JSON查看器库
//!
//! 提供JSON/二进制JSON文件加载、展示树构建和文本序列化功能
//! 遵循MVVM架构模式，树的构建是与UI解耦的纯数据变换

pub mod model;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use model::data_core::{AppError, AppState};
pub use model::display_tree::{
    build_display_tree, display_node_for, label_for_value, DisplayNode, TreeRow,
};
