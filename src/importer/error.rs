// ==========================================
// CSV 导入工作进程 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类:
// - 可恢复（写入 ImportStatus / ImportDetail）: 编码 / 表头 / 行校验
// - 不可恢复（中止当前文件，由批处理层记录日志）: 前置条件 / 传输 / 持久化 / 解析
// ==========================================

use crate::domain::StatusRuleViolation;
use crate::gateway::GatewayError;
use crate::i18n;
use crate::repository::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 前置条件 =====
    #[error("{file_path} 不是待导入状态 (status={status})，终止导入")]
    Precondition { file_path: String, status: String },

    // ===== 文件级业务错误（可恢复）=====
    #[error("文件字符编码不正确 (检测结果: {detected})")]
    FileFormat { detected: String },

    #[error("文件表头缺失: {}", missing.join(","))]
    Header { missing: Vec<String> },

    // ===== 行级业务错误（可恢复）=====
    #[error("行校验失败: {}", messages.join(","))]
    RowValidation { messages: Vec<String> },

    // ===== 不可恢复错误 =====
    #[error("CSV 解析失败: {0}")]
    Parse(String),

    #[error("传输失败: {0}")]
    Transport(#[from] GatewayError),

    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    #[error("无法识别导入目标: {0}")]
    UnknownTarget(String),

    #[error(transparent)]
    StatusRule(#[from] StatusRuleViolation),

    #[error("配置错误: {0}")]
    Config(String),
}

impl ImportError {
    /// 是否为可写入导入状态的业务错误
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ImportError::FileFormat { .. }
                | ImportError::Header { .. }
                | ImportError::RowValidation { .. }
        )
    }

    /// 写入 ImportDetail 的本地化消息
    pub fn user_message(&self, locale: &str) -> String {
        match self {
            ImportError::FileFormat { .. } => i18n::t_in(locale, "errors.invalid_encoding", &[]),
            ImportError::Header { missing } => {
                let columns = missing.join(",");
                i18n::t_in(locale, "errors.missing_header", &[("columns", &columns)])
            }
            ImportError::RowValidation { messages } => messages.join(","),
            _ => i18n::t_in(locale, "errors.import_aborted", &[]),
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Parse(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(ImportError::FileFormat { detected: "EUC-KR".into() }.is_recoverable());
        assert!(ImportError::Header { missing: vec!["email".into()] }.is_recoverable());
        assert!(ImportError::RowValidation { messages: vec![] }.is_recoverable());

        assert!(!ImportError::Parse("bad".into()).is_recoverable());
        assert!(!ImportError::Transport(GatewayError::Remote("down".into())).is_recoverable());
        assert!(!ImportError::Precondition {
            file_path: "user/a.csv".into(),
            status: "PROCESSING".into(),
        }
        .is_recoverable());
    }

    #[test]
    fn test_user_message_localized() {
        let err = ImportError::FileFormat { detected: "EUC-KR".into() };
        assert_eq!(err.user_message("en"), "file character encoding is invalid");
        assert_eq!(err.user_message("ja"), "CSVファイルの文字コードが不正です");

        let err = ImportError::Header {
            missing: vec!["name".into(), "email".into()],
        };
        assert_eq!(
            err.user_message("en"),
            "CSV file header is missing columns: name,email"
        );

        let err = ImportError::Transport(GatewayError::Remote("down".into()));
        assert_eq!(err.user_message("en"), "file import was aborted");
        assert_eq!(err.user_message("ja"), "CSVファイルの取込処理が中断されました");
    }

    #[test]
    fn test_row_validation_message_is_joined() {
        let err = ImportError::RowValidation {
            messages: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.user_message("ja"), "a,b");
    }
}
