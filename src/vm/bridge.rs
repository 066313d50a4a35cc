//! VM桥接层：连接Slint UI与AppState数据模型
//!
//! 注意：回调绑定的具体实现在main.rs中，因为依赖于Slint生成的类型
//! 这里提供状态栏常量与用户可见的对话框文案

use crate::model::data_core::AppError;

// === 状态栏常量（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADING: &str = "正在加载文件...";
pub const STATUS_LOADED: &str = "文件加载完成";
pub const STATUS_COPIED: &str = "已复制到剪贴板";
pub const STATUS_NO_FILE_SELECTED: &str = "未选择文件";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

// === 错误对话框文案 ===
pub const DIALOG_TITLE_ERROR: &str = "Error";
pub const DIALOG_OPEN_FAILED: &str = "Unable to open file for reading.";
pub const DIALOG_PARSE_FAILED_GENERIC: &str = "An error occurred while parsing the JSON document.";

/// 文本解析失败的对话框文案，带解析器消息与字节偏移
pub fn parse_failed_dialog_text(message: &str, offset: usize) -> String {
    format!(
        "An error occurred while parsing the JSON document: \"{}\" at position {}.",
        message, offset
    )
}

/// 错误对应的对话框文案：IO失败、文本解析失败、其余统一走粗粒度文案
pub fn dialog_text_for(err: &AppError) -> String {
    match err {
        AppError::Io(_) => DIALOG_OPEN_FAILED.to_string(),
        AppError::Parse { message, offset } => parse_failed_dialog_text(message, *offset),
        AppError::InvalidDocument | AppError::Serialize(_) => {
            DIALOG_PARSE_FAILED_GENERIC.to_string()
        }
    }
}
