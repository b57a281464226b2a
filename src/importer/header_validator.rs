// ==========================================
// CSV 导入工作进程 - 表头校验器
// ==========================================
// 只读取首行: 去除 BOM 与双引号，按逗号切分
// 必需列（行结构中的必填列）缺失时返回 Header 错误
// ==========================================

use crate::domain::RowSchema;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderValidator;

impl HeaderValidator {
    pub fn new() -> Self {
        Self
    }

    /// 读取首行列名
    pub fn header_columns(&self, content: &[u8]) -> Vec<String> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let first_line = match content.iter().position(|b| *b == b'\n') {
            Some(end) => &content[..end],
            None => content,
        };

        String::from_utf8_lossy(first_line)
            .trim_end_matches('\r')
            .replace('"', "")
            .split(',')
            .map(|column| column.trim().to_string())
            .filter(|column| !column.is_empty())
            .collect()
    }

    /// 返回缺失的必需列（保持声明顺序）
    pub fn missing_columns(&self, content: &[u8], schema: &RowSchema) -> Vec<String> {
        let present: HashSet<String> = self.header_columns(content).into_iter().collect();
        schema
            .required_columns()
            .into_iter()
            .filter(|column| !present.contains(*column))
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self, content: &[u8], schema: &RowSchema) -> ImportResult<()> {
        let missing = self.missing_columns(content, schema);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::Header { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::USER_SCHEMA;

    #[test]
    fn test_complete_header() {
        let validator = HeaderValidator::new();
        assert!(validator
            .validate(b"id,name,email\n1,a,a@example.com\n", &USER_SCHEMA)
            .is_ok());
    }

    #[test]
    fn test_quoted_header_with_bom_and_crlf() {
        let validator = HeaderValidator::new();
        let content = b"\xEF\xBB\xBF\"id\",\"name\",\"email\"\r\n1,a,b\r\n";
        assert_eq!(validator.header_columns(content), vec!["id", "name", "email"]);
        assert!(validator.validate(content, &USER_SCHEMA).is_ok());
    }

    #[test]
    fn test_missing_columns_reported_in_order() {
        let validator = HeaderValidator::new();
        match validator.validate(b"id,nickname\n1,a\n", &USER_SCHEMA) {
            Err(ImportError::Header { missing }) => assert_eq!(missing, vec!["name", "email"]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_only_first_line_is_inspected() {
        let validator = HeaderValidator::new();
        let missing = validator.missing_columns(b"id\nname,email\n", &USER_SCHEMA);
        assert_eq!(missing, vec!["name", "email"]);
    }

    #[test]
    fn test_empty_file_misses_everything() {
        let validator = HeaderValidator::new();
        assert_eq!(
            validator.missing_columns(b"", &USER_SCHEMA),
            vec!["id", "name", "email"]
        );
    }
}
