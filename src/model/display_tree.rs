//! 展示树（Display Tree）：将解析后的JSON值递归转换为带标签的节点

use serde_json::Value;

pub const LABEL_OBJ: &str = "{...}";
pub const LABEL_OBJ_EMPTY: &str = "{}";
pub const LABEL_ARR: &str = "[...]";
pub const LABEL_ARR_EMPTY: &str = "[]";
pub const KV_DELIMIT: &str = ": ";

/// 纯数据的展示节点：标签加有序子节点，与UI组件解耦
/// 逻辑根不可见，文档根值是它唯一的可见子节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub label: String,
    pub children: Vec<DisplayNode>,
}

/// 值的标签形式：标量为其显示文本，容器为括号占位
pub fn label_for_value(v: &Value) -> String {
    match v {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Array(a) => if a.is_empty() { LABEL_ARR_EMPTY } else { LABEL_ARR }.to_string(),
        Value::Object(m) => if m.is_empty() { LABEL_OBJ_EMPTY } else { LABEL_OBJ }.to_string(),
    }
}

/// 递归构建展示节点：数组元素不带键前缀，对象成员为 "键: 值标签"
/// 对象成员按文档顺序迭代，不排序
pub fn display_node_for(v: &Value) -> DisplayNode {
    DisplayNode {
        label: label_for_value(v),
        children: children_of(v),
    }
}

fn children_of(v: &Value) -> Vec<DisplayNode> {
    match v {
        Value::Array(arr) => arr.iter().map(display_node_for).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, child)| DisplayNode {
                label: format!("{}{}{}", k, KV_DELIMIT, label_for_value(child)),
                children: children_of(child),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// 扁平化的树行：UI按可见行渲染，path作为行的稳定标识
#[derive(Debug, Clone)]
pub struct TreeRow {
    /// 展示标签（标量文本、括号占位或 "键: 值标签"）
    pub label: String,
    /// 行标识（$ 起始的定位路径，用于展开/折叠寻址）
    pub path: String,
    /// 节点深度（用于UI缩进显示）
    pub depth: u32,
    /// 直接子节点数量（对象字段数 / 数组长度）
    pub children: u32,
    /// 是否展开
    pub expanded: bool,
    /// 是否可见（由父链展开状态决定）
    pub visible: bool,
}

/// 从根值构建全部树行（深度优先，文档顺序）
/// 行0是文档根值本身，即不可见逻辑根下唯一的顶层节点
pub fn build_display_tree(root: &Value) -> Vec<TreeRow> {
    let mut out = Vec::with_capacity(256);

    fn child_count(v: &Value) -> u32 {
        match v {
            Value::Object(m) => m.len() as u32,
            Value::Array(a) => a.len() as u32,
            _ => 0,
        }
    }

    fn push_row(out: &mut Vec<TreeRow>, label: String, path: String, v: &Value, depth: u32) {
        out.push(TreeRow {
            label,
            path,
            depth,
            children: child_count(v),
            expanded: false,
            visible: true,
        });
    }

    fn walk(out: &mut Vec<TreeRow>, v: &Value, path: &str, label: String, depth: u32) {
        push_row(out, label, path.to_string(), v, depth);
        match v {
            Value::Object(map) => {
                for (k, child) in map {
                    // 键含特殊字符时退回 bracket-notation，保证 path 唯一
                    let field_path = if k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        format!("{}.{}", path, k)
                    } else {
                        format!("{}['{}']", path, k.replace('\'', "\\'"))
                    };
                    let child_label = format!("{}{}{}", k, KV_DELIMIT, label_for_value(child));
                    walk(out, child, &field_path, child_label, depth + 1);
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, idx);
                    walk(out, child, &item_path, label_for_value(child), depth + 1);
                }
            }
            _ => {}
        }
    }

    walk(&mut out, root, "$", label_for_value(root), 0);
    out
}

/// 切换指定行的展开状态并重算可见性
pub fn toggle_expanded(rows: &mut [TreeRow], path: &str) {
    if let Some(row) = rows.iter_mut().find(|r| r.path == path) {
        row.expanded = !row.expanded;
    }
    update_visibility(rows);
}

/// 根据展开状态重算可见性：行0总是可见，其余行仅当父链全部展开时可见
pub fn update_visibility(rows: &mut [TreeRow]) {
    for (i, row) in rows.iter_mut().enumerate() {
        row.visible = i == 0;
    }

    // 父行总在子行之前，正向扫描即可传播可见性
    for i in 0..rows.len() {
        if rows[i].expanded && rows[i].visible {
            let parent_depth = rows[i].depth;
            for j in (i + 1)..rows.len() {
                if rows[j].depth == parent_depth + 1 {
                    rows[j].visible = true;
                } else if rows[j].depth <= parent_depth {
                    break;
                }
            }
        }
    }
}
