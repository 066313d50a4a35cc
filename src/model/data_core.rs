//! AppState：文件加载控制器与当前展示状态

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::model::display_tree::{build_display_tree, toggle_expanded, update_visibility, TreeRow};
use crate::utils::fs::{decode_binary_json, parse_json_text, to_pretty_text};

/// 二进制JSON文档的扩展名（不区分大小写）
const BINARY_JSON_EXT: &str = "jbin";

#[derive(Debug, Default)]
pub struct AppState {
    /// 最近一次成功打开文件的规范路径，用于播种下次文件对话框
    pub last_opened_path: Option<PathBuf>,
    /// 解析后的文档根值
    pub dom: Option<Value>,
    /// 文本窗格展示的完整序列化文本
    pub document_text: String,
    /// 树窗格的扁平行
    pub tree_flat: Vec<TreeRow>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {message} (位置 {offset})")]
    Parse { message: String, offset: usize },
    #[error("文档为空或无法解码")]
    InvalidDocument,
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AppState {
    /// 加载文件：读取字节、按扩展名解析/解码、拒绝空文档，成功后整体替换展示状态
    pub fn load_file(&mut self, path: &Path) -> Result<(), AppError> {
        let bytes = std::fs::read(path)?;

        let is_binary = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(BINARY_JSON_EXT));
        let dom = if is_binary {
            decode_binary_json(&bytes)?
        } else {
            parse_json_text(&bytes)?
        };
        // 空文档与无效文档统一粗粒度上报
        if dom.is_null() {
            return Err(AppError::InvalidDocument);
        }

        let document_text = to_pretty_text(&dom)?;
        let mut tree_flat = build_display_tree(&dom);
        if let Some(root) = tree_flat.first_mut() {
            root.expanded = true;
        }
        update_visibility(&mut tree_flat);

        // 可失败步骤到此全部完成，失败路径不会触碰旧的展示状态
        self.document_text = document_text;
        self.tree_flat = tree_flat;
        self.dom = Some(dom);
        self.last_opened_path = Some(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
        tracing::debug!("文档加载完成: {}，{} 个树行", path.display(), self.tree_flat.len());
        Ok(())
    }

    /// 清空展示状态：空输入不算错误，树与文本保持为空
    pub fn clear(&mut self) {
        self.dom = None;
        self.document_text.clear();
        self.tree_flat.clear();
    }

    /// 最近打开文件所在目录，用作下次文件对话框的起始目录
    pub fn last_opened_dir(&self) -> Option<&Path> {
        self.last_opened_path.as_deref().and_then(Path::parent)
    }

    /// 切换节点的展开状态
    pub fn toggle_node_expanded(&mut self, path: &str) {
        toggle_expanded(&mut self.tree_flat, path);
    }

    /// 指定行当前是否展开
    pub fn is_expanded(&self, path: &str) -> bool {
        self.tree_flat
            .iter()
            .find(|r| r.path == path)
            .map(|r| r.expanded)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// 创建带指定后缀的临时文件用于测试
    fn create_test_file(content: &[u8], suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("创建临时文件失败");
        file.write_all(content).expect("写入临时文件失败");
        file
    }

    /// 将JSON值编码为.jbin文档的字节
    fn jbin_bytes(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(value, &mut buf).expect("CBOR编码失败");
        buf
    }

    #[test]
    fn test_load_text_json() {
        let file = create_test_file(br#"{"a":1,"b":[true,null]}"#, ".json");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("加载应该成功");

        assert!(state.dom.is_some());
        assert_eq!(state.tree_flat.len(), 5, "根、a、b、两个数组元素");
        assert_eq!(state.tree_flat[0].label, "{...}");
        assert!(state.tree_flat[0].expanded, "加载后根行默认展开");
        assert!(!state.document_text.is_empty());
    }

    #[test]
    fn test_document_text_round_trips() {
        let file = create_test_file(r#"{"z":1,"a":{"k":[1,2,3]},"m":"文本"}"#.as_bytes(), ".json");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("加载应该成功");

        let reparsed: Value =
            serde_json::from_str(&state.document_text).expect("文本窗格内容应该可以重新解析");
        assert_eq!(Some(reparsed), state.dom, "重新解析结果与原值结构相等");
    }

    #[test]
    fn test_load_updates_last_opened_path() {
        let file = create_test_file(b"{}", ".json");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("加载应该成功");

        let expected = file.path().canonicalize().expect("临时文件应该可以规范化");
        assert_eq!(state.last_opened_path.as_deref(), Some(expected.as_path()));
        assert_eq!(state.last_opened_dir(), expected.parent());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let mut state = AppState::default();
        let result = state.load_file(Path::new("/不存在/的/文件.json"));

        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(state.dom.is_none());
        assert!(state.tree_flat.is_empty());
        assert!(state.last_opened_path.is_none());
    }

    #[test]
    fn test_parse_error_reports_offset() {
        let file = create_test_file(br#"{"a":}"#, ".json");

        let mut state = AppState::default();
        let result = state.load_file(file.path());

        match result {
            Err(AppError::Parse { message, offset }) => {
                assert_eq!(offset, 5, "偏移指向违规字节 '}}'");
                assert!(!message.is_empty());
                assert!(!message.contains(" at line "), "消息不应重复携带位置信息");
            }
            other => panic!("期望解析错误，得到 {:?}", other),
        }
    }

    #[test]
    fn test_failed_load_keeps_previous_state() {
        let good = create_test_file(br#"{"ok":true}"#, ".json");
        let bad = create_test_file(b"not json", ".json");

        let mut state = AppState::default();
        state.load_file(good.path()).expect("首次加载应该成功");

        let dom_before = state.dom.clone();
        let text_before = state.document_text.clone();
        let rows_before = state.tree_flat.len();
        let path_before = state.last_opened_path.clone();

        assert!(state.load_file(bad.path()).is_err());

        assert_eq!(state.dom, dom_before, "失败的加载不得改变已解析的值");
        assert_eq!(state.document_text, text_before);
        assert_eq!(state.tree_flat.len(), rows_before);
        assert_eq!(state.last_opened_path, path_before, "记忆的路径也保持不变");
    }

    #[test]
    fn test_null_document_rejected() {
        let file = create_test_file(b"null", ".json");

        let mut state = AppState::default();
        let result = state.load_file(file.path());

        assert!(matches!(result, Err(AppError::InvalidDocument)));
        assert!(state.dom.is_none());
    }

    #[test]
    fn test_scalar_root_is_leaf() {
        let file = create_test_file(b"42", ".json");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("标量根应该可以加载");

        assert_eq!(state.tree_flat.len(), 1);
        assert_eq!(state.tree_flat[0].label, "42");
    }

    #[test]
    fn test_other_extension_parsed_as_text() {
        let file = create_test_file(br#"[1,2]"#, ".txt");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("未知扩展名按文本JSON解析");
        assert_eq!(state.tree_flat[0].label, "[...]");
    }

    #[test]
    fn test_load_binary_document() {
        let file = create_test_file(&jbin_bytes(&json!({"a": 1, "b": [true, null]})), ".jbin");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("二进制文档应该可以加载");

        assert_eq!(state.tree_flat.len(), 5);
        assert_eq!(state.tree_flat[0].label, "{...}");
    }

    #[test]
    fn test_load_binary_empty_object() {
        let file = create_test_file(&jbin_bytes(&json!({})), ".jbin");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("空对象文档应该可以加载");

        assert_eq!(state.tree_flat.len(), 1, "空对象是单个叶子行");
        assert_eq!(state.tree_flat[0].label, "{}");
        assert_eq!(state.tree_flat[0].children, 0);
    }

    #[test]
    fn test_corrupt_binary_rejected() {
        let file = create_test_file(&[0xff, 0xff, 0xff, 0x00], ".jbin");

        let mut state = AppState::default();
        let result = state.load_file(file.path());

        assert!(matches!(result, Err(AppError::InvalidDocument)));
        assert!(state.dom.is_none());
    }

    #[test]
    fn test_binary_null_rejected() {
        let file = create_test_file(&jbin_bytes(&json!(null)), ".jbin");

        let mut state = AppState::default();
        assert!(matches!(
            state.load_file(file.path()),
            Err(AppError::InvalidDocument)
        ));
    }

    #[test]
    fn test_clear_empties_display() {
        let file = create_test_file(br#"{"a":1}"#, ".json");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("加载应该成功");
        state.clear();

        assert!(state.dom.is_none());
        assert!(state.document_text.is_empty());
        assert!(state.tree_flat.is_empty());
    }

    #[test]
    fn test_toggle_node_expanded() {
        let file = create_test_file(br#"{"a":{"x":1}}"#, ".json");

        let mut state = AppState::default();
        state.load_file(file.path()).expect("加载应该成功");

        assert!(!state.is_expanded("$.a"));
        state.toggle_node_expanded("$.a");
        assert!(state.is_expanded("$.a"));

        let visible: Vec<&str> = state
            .tree_flat
            .iter()
            .filter(|r| r.visible)
            .map(|r| r.path.as_str())
            .collect();
        assert_eq!(visible, vec!["$", "$.a", "$.a.x"]);
    }
}
