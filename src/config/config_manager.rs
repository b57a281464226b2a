// ==========================================
// CSV 导入工作进程 - 配置管理器
// ==========================================
// 职责: 运行期配置查询 / 覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::domain::{ImportTarget, UnrecoveredFailurePolicy};
use crate::i18n;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_message_locale(&self, default: &str) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::MESSAGE_LOCALE, default)?;
        let value = value.trim();
        if i18n::is_supported(value) {
            Ok(value.to_string())
        } else {
            warn!(configured = value, fallback = default, "不支持的消息语言，使用默认值");
            Ok(default.to_string())
        }
    }

    async fn get_queue_url(&self, target: ImportTarget) -> ConfigResult<Option<String>> {
        let key = config_keys::queue_url(target);
        Ok(self
            .get_config_value(&key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn get_failure_policy(&self) -> ConfigResult<UnrecoveredFailurePolicy> {
        let default = UnrecoveredFailurePolicy::default();
        let value = self.get_config_or_default(config_keys::FAILURE_POLICY, default.as_str())?;
        match value.parse::<UnrecoveredFailurePolicy>() {
            Ok(policy) => Ok(policy),
            Err(e) => {
                warn!(error = %e, "失败处理策略配置无效，使用默认值");
                Ok(default)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::domain::ImportTarget;

    // 消息语言
    pub const MESSAGE_LOCALE: &str = "message_locale";

    // 未恢复失败处理策略
    pub const FAILURE_POLICY: &str = "unrecovered_failure_policy";

    /// 下游队列 URL: queue_url/<target>
    pub fn queue_url(target: ImportTarget) -> String {
        format!("queue_url/{}", target.directory())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = manager();
        assert_eq!(config.get_message_locale("ja").await.unwrap(), "ja");
        assert_eq!(config.get_queue_url(ImportTarget::User).await.unwrap(), None);
        assert_eq!(
            config.get_failure_policy().await.unwrap(),
            UnrecoveredFailurePolicy::LeaveProcessing
        );
    }

    #[tokio::test]
    async fn test_configured_values() {
        let config = manager();
        config.set_global_config_value(config_keys::MESSAGE_LOCALE, "en").unwrap();
        config
            .set_global_config_value("queue_url/user", "https://sqs/user")
            .unwrap();
        config
            .set_global_config_value(config_keys::FAILURE_POLICY, "MARK_FAILED")
            .unwrap();

        assert_eq!(config.get_message_locale("ja").await.unwrap(), "en");
        assert_eq!(
            config.get_queue_url(ImportTarget::User).await.unwrap().as_deref(),
            Some("https://sqs/user")
        );
        assert_eq!(
            config.get_failure_policy().await.unwrap(),
            UnrecoveredFailurePolicy::MarkFailed
        );
    }

    #[tokio::test]
    async fn test_malformed_values_fall_back() {
        let config = manager();
        config.set_global_config_value(config_keys::MESSAGE_LOCALE, "fr").unwrap();
        config.set_global_config_value(config_keys::FAILURE_POLICY, "RETRY").unwrap();

        assert_eq!(config.get_message_locale("ja").await.unwrap(), "ja");
        assert_eq!(
            config.get_failure_policy().await.unwrap(),
            UnrecoveredFailurePolicy::LeaveProcessing
        );
    }
}
