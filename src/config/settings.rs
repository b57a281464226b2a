// ==========================================
// CSV 导入工作进程 - 启动配置
// ==========================================
// 来源: 环境变量（可由 .env 文件预置）
// 职责: 进程启动时一次性读取；运行期配置见 ConfigManager
// ==========================================

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// 默认 AWS 区域
pub const DEFAULT_AWS_REGION: &str = "ap-northeast-1";

/// 默认数据库文件名
pub const DEFAULT_DATABASE_FILE: &str = "csv_import_worker.db";

/// 默认本地存储根目录
pub const DEFAULT_LOCAL_STORAGE_ROOT: &str = "./local/storage";

/// 默认本地队列目录
pub const DEFAULT_LOCAL_QUEUE_DIR: &str = "./local/queues";

/// 启动配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("未知的运行环境: {0}")]
    UnknownAppEnv(String),

    #[error("DATABASE_PATH 不能为空")]
    EmptyDatabasePath,

    #[error("不支持的消息语言: {0}")]
    UnsupportedLocale(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

// ==========================================
// AppEnv - 运行环境
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    /// 本地文件模拟对象存储与队列
    #[default]
    Local,
    /// S3 + SQS
    Aws,
}

impl FromStr for AppEnv {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "" => Ok(AppEnv::Local),
            "aws" | "prod" | "production" => Ok(AppEnv::Aws),
            other => Err(SettingsError::UnknownAppEnv(other.to_string())),
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Local => write!(f, "local"),
            AppEnv::Aws => write!(f, "aws"),
        }
    }
}

// ==========================================
// Settings
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub app_env: AppEnv,
    pub database_path: String,
    pub aws_region: String,
    pub user_queue_url: Option<String>,
    pub local_storage_root: PathBuf,
    pub local_queue_dir: PathBuf,
    pub message_locale: String,
}

impl Settings {
    /// 从进程环境读取
    pub fn from_env() -> SettingsResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取
    pub fn from_lookup<F>(lookup: F) -> SettingsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let app_env = match get("APP_ENV") {
            Some(raw) => raw.parse::<AppEnv>()?,
            None => AppEnv::default(),
        };

        let settings = Settings {
            app_env,
            database_path: get("DATABASE_PATH").unwrap_or_else(default_database_path),
            aws_region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            user_queue_url: get("USER_QUEUE_URL").or_else(|| get("QUEUE_URL")),
            local_storage_root: get("LOCAL_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_STORAGE_ROOT)),
            local_queue_dir: get("LOCAL_QUEUE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_QUEUE_DIR)),
            message_locale: get("MESSAGE_LOCALE")
                .unwrap_or_else(|| crate::i18n::DEFAULT_LOCALE.to_string()),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if self.database_path.is_empty() {
            return Err(SettingsError::EmptyDatabasePath);
        }
        if !crate::i18n::is_supported(&self.message_locale) {
            return Err(SettingsError::UnsupportedLocale(self.message_locale.clone()));
        }
        Ok(())
    }
}

/// 默认数据库路径（用户数据目录下）
fn default_database_path() -> String {
    match dirs::data_local_dir() {
        Some(dir) => dir
            .join("csv-import-worker")
            .join(DEFAULT_DATABASE_FILE)
            .to_string_lossy()
            .to_string(),
        None => format!("./{}", DEFAULT_DATABASE_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> SettingsResult<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.app_env, AppEnv::Local);
        assert_eq!(s.aws_region, DEFAULT_AWS_REGION);
        assert_eq!(s.message_locale, "ja");
        assert!(s.user_queue_url.is_none());
        assert!(s.database_path.ends_with(DEFAULT_DATABASE_FILE));
    }

    #[test]
    fn test_queue_url_fallback() {
        let s = settings(&[("QUEUE_URL", "https://sqs/q")]).unwrap();
        assert_eq!(s.user_queue_url.as_deref(), Some("https://sqs/q"));

        let s = settings(&[("QUEUE_URL", "https://sqs/q"), ("USER_QUEUE_URL", "https://sqs/u")])
            .unwrap();
        assert_eq!(s.user_queue_url.as_deref(), Some("https://sqs/u"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            settings(&[("APP_ENV", "staging")]),
            Err(SettingsError::UnknownAppEnv("staging".to_string()))
        );
        assert_eq!(
            settings(&[("MESSAGE_LOCALE", "fr")]),
            Err(SettingsError::UnsupportedLocale("fr".to_string()))
        );
    }

    #[test]
    fn test_aws_env() {
        let s = settings(&[("APP_ENV", "AWS"), ("AWS_REGION", "us-east-1")]).unwrap();
        assert_eq!(s.app_env, AppEnv::Aws);
        assert_eq!(s.aws_region, "us-east-1");
    }
}
