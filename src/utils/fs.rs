//! IO helper: JSON文本解析与二进制文档解码

use serde_json::Value;

use crate::model::data_core::AppError;

/// 解析文本JSON，失败时带上解析器消息与字节偏移
pub fn parse_json_text(bytes: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(bytes).map_err(|e| AppError::Parse {
        message: parser_message(&e),
        offset: byte_offset(bytes, e.line(), e.column()),
    })
}

/// 解码CBOR编码的二进制JSON文档，任何失败都视为无效文档
pub fn decode_binary_json(bytes: &[u8]) -> Result<Value, AppError> {
    ciborium::de::from_reader::<Value, _>(bytes).map_err(|_| AppError::InvalidDocument)
}

/// 完整的格式化序列化文本，用于文本窗格
pub fn to_pretty_text(v: &Value) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(v)?)
}

/// serde_json 的消息自带 " at line L column C" 后缀，剥掉以免与偏移重复
fn parser_message(err: &serde_json::Error) -> String {
    let msg = err.to_string();
    match msg.rfind(" at line ") {
        Some(idx) => msg[..idx].to_string(),
        None => msg,
    }
}

/// 由行列还原字节偏移：行按 \n 计数，列为行内1基位置
fn byte_offset(bytes: &[u8], line: usize, column: usize) -> usize {
    let mut line_start = 0usize;
    let mut remaining = line.saturating_sub(1);
    for (i, b) in bytes.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        if *b == b'\n' {
            remaining -= 1;
            line_start = i + 1;
        }
    }
    (line_start + column.saturating_sub(1)).min(bytes.len())
}
