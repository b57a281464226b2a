// ==========================================
// CSV 导入工作进程 - 用户行
// ==========================================
// 对象键前缀: user/
// CSV 列: id, name, email（全部必填，email 不得与已有用户重复）
// ==========================================

use crate::domain::row_schema::{FieldRule, FieldSpec, FieldValue, ImportRow, RowSchema};
use crate::domain::types::ImportTarget;
use serde::{Deserialize, Serialize};

/// 已有用户邮箱参照集合名
pub const USER_EMAIL_SET: &str = "user.email";

pub static USER_SCHEMA: RowSchema = RowSchema {
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
            name: "name",
            column: "name",
            required: true,
            label_key: "fields.user.name",
            rules: &[],
        },
        FieldSpec {
            name: "email",
            column: "email",
            required: true,
            label_key: "fields.user.email",
            rules: &[FieldRule::Email, FieldRule::Unique(USER_EMAIL_SET)],
        },
    ],
};

// ==========================================
// UserRow - 用户 CSV 行
// ==========================================
// id 为空时解析为 None，由必填校验拦截
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl ImportRow for UserRow {
    fn schema() -> &'static RowSchema {
        &USER_SCHEMA
    }

    fn field_value(&self, name: &str) -> FieldValue<'_> {
        match name {
            "id" => self.id.map(FieldValue::Integer).unwrap_or(FieldValue::Absent),
            "name" => FieldValue::Text(&self.name),
            "email" => FieldValue::Text(&self.email),
            _ => FieldValue::Absent,
        }
    }
}
