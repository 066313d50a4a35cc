//! 程序入口：初始化日志、加载 Slint UI，并绑定文件加载与树展示回调

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context;
use slint::{ComponentHandle, ModelRc, VecModel};
use tracing_subscriber::fmt::SubscriberBuilder;

slint::include_modules!();

mod model;
mod utils;
mod vm;

use model::data_core::{AppError, AppState};
use model::display_tree::TreeRow;
use vm::bridge::*;

// TreeRowData转换实现
impl From<&TreeRow> for TreeRowData {
    /// 将Rust TreeRow转换为Slint可用的数据结构
    fn from(row: &TreeRow) -> Self {
        Self {
            label: row.label.clone().into(),
            path: row.path.clone().into(),
            depth: row.depth as i32,
            children: row.children as i32,
            expanded: row.expanded,
        }
    }
}

/// VM桥接器：管理UI与数据层的交互
struct ViewModelBridge {
    app_state: Rc<RefCell<AppState>>,
}

impl ViewModelBridge {
    /// 创建新的VM桥接器并绑定所有回调
    fn new(app_window: &AppWindow, app_state: Rc<RefCell<AppState>>) -> Self {
        let bridge = Self { app_state };
        bridge.setup_callbacks(app_window);
        bridge
    }

    /// 设置所有UI回调函数
    fn setup_callbacks(&self, app_window: &AppWindow) {
        let app_state = self.app_state.clone();

        // === 加载文件回调 ===
        {
            let app_state = app_state.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_load_file(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_load_file(&app_window, &app_state);
                }
            });
        }

        // === 节点展开/折叠回调 ===
        {
            let app_state = app_state.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_toggle_node_expanded(move |node_path| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_toggle_node_expanded(&app_window, &app_state, &node_path.to_string());
                }
            });
        }

        // === 复制按钮回调 ===
        {
            let app_state = app_state.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_copy_pressed(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_copy_pressed(&app_window, &app_state);
                }
            });
        }

        // === 消息对话框关闭回调 ===
        {
            let app_window_weak = app_window.as_weak();
            app_window.on_close_message_dialog(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    app_window.set_message_dialog_visible(false);
                }
            });
        }
    }

    /// 初始化UI状态
    fn initialize_ui(&self, app_window: &AppWindow) {
        app_window.set_status_message(STATUS_READY.into());
        app_window.set_current_path("".into());
        app_window.set_document_text("".into());
        app_window.set_message_dialog_visible(false);

        // 设置空的树模型
        let empty_model = ModelRc::new(VecModel::<TreeRowData>::default());
        app_window.set_tree_model(empty_model);
    }

    /// 显示文件选择对话框，起始目录为最近打开文件所在目录
    fn show_file_dialog(app_state: &Rc<RefCell<AppState>>) -> Option<PathBuf> {
        use rfd::FileDialog;

        let mut dialog = FileDialog::new()
            .add_filter("JSON 文件", &["json"])
            .add_filter("JSON 二进制", &["jbin"])
            .add_filter("所有文件", &["*"])
            .set_title("选择要打开的JSON文件");
        let last_dir = app_state.borrow().last_opened_dir().map(Path::to_path_buf);
        if let Some(dir) = last_dir {
            dialog = dialog.set_directory(dir);
        }

        match dialog.pick_file() {
            Some(path) => {
                tracing::info!("用户选择了文件: {}", path.display());
                Some(path)
            }
            None => {
                tracing::info!("用户取消了文件选择");
                None
            }
        }
    }

    /// 处理加载文件操作
    fn handle_load_file(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>) {
        let file_path = match Self::show_file_dialog(app_state) {
            Some(path) => path,
            None => {
                app_window.set_status_message(STATUS_NO_FILE_SELECTED.into());
                return;
            }
        };

        app_window.set_status_message(STATUS_LOADING.into());

        let load_result = app_state.borrow_mut().load_file(&file_path);
        match load_result {
            Ok(()) => {
                let (path_str, text, node_count) = {
                    let state = app_state.borrow();
                    let path_str = state
                        .last_opened_path
                        .as_ref()
                        .map(|p| p.to_string_lossy().to_string())
                        .unwrap_or_default();
                    (path_str, state.document_text.clone(), state.tree_flat.len())
                };

                app_window.set_current_path(path_str.into());
                app_window.set_document_text(text.into());
                Self::refresh_tree_model(app_window, app_state);

                app_window.set_status_message(STATUS_LOADED.into());
                tracing::info!("文件加载成功: {}，共 {} 个树节点", file_path.display(), node_count);
            }
            Err(e) => {
                // 失败时不触碰已展示内容，仅弹出阻塞式错误对话框
                Self::show_error_dialog(app_window, &e);
                app_window.set_status_message(format!("{}{}", STATUS_ERROR_PREFIX, e).into());
                tracing::error!("文件加载失败: {}", e);
            }
        }
    }

    /// 处理节点展开/折叠切换
    fn handle_toggle_node_expanded(
        app_window: &AppWindow,
        app_state: &Rc<RefCell<AppState>>,
        node_path: &str,
    ) {
        app_state.borrow_mut().toggle_node_expanded(node_path);
        Self::refresh_tree_model(app_window, app_state);

        let action = if app_state.borrow().is_expanded(node_path) {
            "展开"
        } else {
            "折叠"
        };
        app_window.set_status_message(format!("{}: {}", action, node_path).into());
        tracing::debug!("节点{}: {}", action, node_path);
    }

    /// 处理复制按钮：复制文本窗格全文
    fn handle_copy_pressed(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>) {
        let text = app_state.borrow().document_text.clone();
        if text.is_empty() {
            app_window.set_status_message(format!("{}没有可复制的内容", STATUS_ERROR_PREFIX).into());
            return;
        }

        match utils::clipboard::copy_to_clipboard(&text) {
            Ok(()) => {
                app_window.set_status_message(STATUS_COPIED.into());
                tracing::info!("文本已复制到剪贴板，长度: {} 字符", text.len());
            }
            Err(e) => {
                app_window.set_status_message(format!("{}{}", STATUS_ERROR_PREFIX, e).into());
                tracing::error!("复制失败: {}", e);
            }
        }
    }

    /// 刷新树模型 - 只包含可见的节点
    fn refresh_tree_model(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>) {
        let tree_data: Vec<TreeRowData> = {
            let state = app_state.borrow();
            state
                .tree_flat
                .iter()
                .filter(|row| row.visible)
                .map(TreeRowData::from)
                .collect()
        };
        let model = ModelRc::new(VecModel::from(tree_data));
        app_window.set_tree_model(model);
    }

    /// 弹出阻塞式错误对话框
    fn show_error_dialog(app_window: &AppWindow, err: &AppError) {
        app_window.set_message_dialog_title(DIALOG_TITLE_ERROR.into());
        app_window.set_message_dialog_text(dialog_text_for(err).into());
        app_window.set_message_dialog_visible(true);
    }
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let app = AppWindow::new().context("UI 初始化失败")?;
    let state = Rc::new(RefCell::new(AppState::default()));

    // 创建VM桥接器并绑定UI回调
    let bridge = ViewModelBridge::new(&app, state.clone());
    bridge.initialize_ui(&app);

    tracing::info!("应用启动成功，UI已初始化");
    app.run().context("UI 事件循环异常退出")?;
    Ok(())
}
