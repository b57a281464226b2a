// ==========================================
// CSV 导入工作进程 - 行结构描述
// ==========================================
// 职责: 每种行类型的静态元数据（列名 / 必填 / 显示名 / 校验规则）
// 用途: 表头校验器与行校验器共用，构建一次，按数据传递
// ==========================================

use crate::domain::types::ImportTarget;
use serde::de::DeserializeOwned;
use serde::Serialize;

// ==========================================
// FieldRule - 字段附加校验规则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// 邮箱格式
    Email,
    /// 不得与指定参照集合中的值重复（参照集合在批处理开始前加载）
    Unique(&'static str),
}

// ==========================================
// FieldSpec - 单个字段描述
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,        // 字段名（与 field_value 对应）
    pub column: &'static str,      // CSV 列名
    pub required: bool,            // 是否必填（必填列同时是表头必需列）
    pub label_key: &'static str,   // 显示名的 i18n key
    pub rules: &'static [FieldRule],
}

// ==========================================
// RowSchema - 行结构描述
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSchema {
    pub target: ImportTarget,
    pub fields: &'static [FieldSpec],
}

impl RowSchema {
    /// 表头必需列（保持声明顺序）
    pub fn required_columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.column)
            .collect()
    }

    /// 规则中引用到的参照集合名
    pub fn reference_sets(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .flat_map(|f| f.rules.iter())
            .filter_map(|rule| match rule {
                FieldRule::Unique(set) => Some(*set),
                FieldRule::Email => None,
            })
            .collect()
    }
}

// ==========================================
// FieldValue - 行字段取值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Integer(i64),
    Absent,
}

impl FieldValue<'_> {
    /// 空值判定: 缺失 / 空白字符串 / 0
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Integer(n) => *n == 0,
            FieldValue::Absent => true,
        }
    }

    /// 文本形式（用于格式与唯一性校验）
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.trim().to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Absent => None,
        }
    }
}

// ==========================================
// ImportRow Trait
// ==========================================
// 用途: 可被导入管道处理的行类型
// 实现者: UserRow
pub trait ImportRow: DeserializeOwned + Serialize + Send + Sync + 'static {
    /// 行结构描述（静态）
    fn schema() -> &'static RowSchema;

    /// 按字段名取值
    fn field_value(&self, name: &str) -> FieldValue<'_>;
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: RowSchema = RowSchema {
        target: ImportTarget::User,
        fields: &[
            FieldSpec {
                name: "id",
                column: "id",
                required: true,
                label_key: "fields.user.id",
                rules: &[],
            },
            FieldSpec {
                name: "note",
                column: "note",
                required: false,
                label_key: "fields.user.note",
                rules: &[],
            },
            FieldSpec {
                name: "email",
                column: "email",
                required: true,
                label_key: "fields.user.email",
                rules: &[FieldRule::Email, FieldRule::Unique("user.email")],
            },
        ],
    };

    #[test]
    fn test_required_columns_keep_order() {
        assert_eq!(SAMPLE.required_columns(), vec!["id", "email"]);
    }

    #[test]
    fn test_reference_sets() {
        assert_eq!(SAMPLE.reference_sets(), vec!["user.email"]);
    }

    #[test]
    fn test_field_value_blank() {
        assert!(FieldValue::Text("  ").is_blank());
        assert!(FieldValue::Integer(0).is_blank());
        assert!(FieldValue::Absent.is_blank());
        assert!(!FieldValue::Text("a").is_blank());
        assert!(!FieldValue::Integer(-1).is_blank());
    }
}
