// ==========================================
// CSV 导入工作进程 - 行校验器
// ==========================================
// 规则: 必填 / 邮箱格式 / 参照集合唯一性
// 参照集合（如已有用户邮箱）在批处理开始前加载一次，只读共享
// 消息: 按字段生成本地化文本，多条消息由调用方以逗号连接
// ==========================================

use crate::domain::{FieldRule, FieldSpec, ImportRow, RowSchema};
use crate::i18n;
use crate::importer::error::{ImportError, ImportResult};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use once_cell::sync::Lazy;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("valid email regex")
});

// ==========================================
// ReferenceData - 参照集合
// ==========================================
#[derive(Debug, Default, Clone)]
pub struct ReferenceData {
    sets: HashMap<&'static str, HashSet<String>>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set<I, S>(mut self, name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_set(name, values);
        self
    }

    fn insert_set<I, S>(&mut self, name: &'static str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .entry(name)
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// 确认行结构引用的参照集合均已加载
    pub fn ensure_loaded(&self, schema: &RowSchema) -> ImportResult<()> {
        let missing: Vec<&str> = schema
            .reference_sets()
            .into_iter()
            .filter(|name| !self.sets.contains_key(name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::Config(format!(
                "参照集合未加载: {}",
                missing.join(",")
            )))
        }
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.sets.get(name).is_some_and(|set| set.contains(value))
    }

    pub fn set_len(&self, name: &str) -> usize {
        self.sets.get(name).map_or(0, HashSet::len)
    }
}

// ==========================================
// RowValidator
// ==========================================
#[derive(Debug, Clone)]
pub struct RowValidator {
    reference: Arc<ReferenceData>,
    locale: String,
}

impl RowValidator {
    pub fn new(reference: Arc<ReferenceData>, locale: impl Into<String>) -> Self {
        Self {
            reference,
            locale: locale.into(),
        }
    }

    /// 校验单行
    ///
    /// # 返回
    /// - Ok(()): 全部通过
    /// - Err(RowValidation): 每个失败字段一条消息
    pub fn validate<R: ImportRow>(&self, row: &R) -> ImportResult<()> {
        let messages: Vec<String> = R::schema()
            .fields
            .iter()
            .filter_map(|field| self.check_field(row, field))
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(ImportError::RowValidation { messages })
        }
    }

    /// 单字段校验，返回第一条失败消息
    fn check_field<R: ImportRow>(&self, row: &R, field: &FieldSpec) -> Option<String> {
        let value = row.field_value(field.name);

        if value.is_blank() {
            return field
                .required
                .then(|| self.message("validation.required", field));
        }

        let text = value.as_text()?;
        for rule in field.rules {
            match rule {
                FieldRule::Email if !EMAIL_RE.is_match(&text) => {
                    return Some(self.message("validation.email", field));
                }
                FieldRule::Unique(set) if self.reference.contains(set, &text) => {
                    return Some(self.message("validation.duplicate", field));
                }
                _ => {}
            }
        }
        None
    }

    fn message(&self, key: &str, field: &FieldSpec) -> String {
        let label = i18n::t_in(&self.locale, field.label_key, &[]);
        i18n::t_in(&self.locale, key, &[("field", &label)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserRow, USER_EMAIL_SET};

    fn user(id: Option<i64>, name: &str, email: &str) -> UserRow {
        UserRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    fn validator(locale: &str) -> RowValidator {
        let reference =
            ReferenceData::new().with_set(USER_EMAIL_SET, ["taken@example.com".to_string()]);
        RowValidator::new(Arc::new(reference), locale)
    }

    fn messages(result: ImportResult<()>) -> Vec<String> {
        match result {
            Err(ImportError::RowValidation { messages }) => messages,
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_valid_row() {
        let v = validator("ja");
        assert!(v.validate(&user(Some(1), "山田", "yamada@example.com")).is_ok());
    }

    #[test]
    fn test_missing_name_message_ja() {
        let v = validator("ja");
        let msgs = messages(v.validate(&user(Some(1), "", "yamada@example.com")));
        assert_eq!(msgs, vec!["ユーザ名は必須フィールドです"]);
    }

    #[test]
    fn test_multiple_failures_in_field_order() {
        let v = validator("en");
        let msgs = messages(v.validate(&user(None, "  ", "taken@example.com")));
        assert_eq!(
            msgs,
            vec![
                "ID is a required field",
                "Name is a required field",
                "Email is already registered",
            ]
        );
    }

    #[test]
    fn test_invalid_email_format() {
        let v = validator("en");
        let msgs = messages(v.validate(&user(Some(2), "Taro", "not-an-email")));
        assert_eq!(msgs, vec!["Email must be a valid email address"]);
    }

    #[test]
    fn test_reference_set_lookup() {
        let data = ReferenceData::new().with_set(USER_EMAIL_SET, ["a@example.com"]);
        assert!(data.contains(USER_EMAIL_SET, "a@example.com"));
        assert!(!data.contains(USER_EMAIL_SET, "b@example.com"));
        assert!(!data.contains("unknown.set", "a@example.com"));
        assert_eq!(data.set_len(USER_EMAIL_SET), 1);
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_RE.is_match("taro.yamada+csv@mail.example.co.jp"));
        assert!(!EMAIL_RE.is_match("taro@localhost"));
        assert!(!EMAIL_RE.is_match("@example.com"));
    }

    #[test]
    fn test_ensure_loaded_reports_missing_sets() {
        let schema = UserRow::schema();
        match ReferenceData::new().ensure_loaded(schema) {
            Err(ImportError::Config(message)) => assert!(message.contains(USER_EMAIL_SET)),
            other => panic!("unexpected: {:?}", other),
        }

        let empty = ReferenceData::new().with_set(USER_EMAIL_SET, Vec::<String>::new());
        assert!(empty.ensure_loaded(schema).is_ok());
    }
}
