// ==========================================
// CSV 导入工作进程 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的运行期配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::{ImportTarget, UnrecoveredFailurePolicy};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 写入 ImportDetail 的消息语言
    ///
    /// # 默认值
    /// - 调用方提供的启动配置（MESSAGE_LOCALE）
    /// - 配置值不受支持时同样回退
    async fn get_message_locale(&self, default: &str) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// 指定导入目标的下游队列 URL
    ///
    /// # 返回
    /// - Some(url): config_kv 中存在 queue_url/<target>
    /// - None: 未配置（使用启动配置）
    async fn get_queue_url(
        &self,
        target: ImportTarget,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;

    /// 未恢复失败处理策略
    ///
    /// # 默认值
    /// - LEAVE_PROCESSING
    async fn get_failure_policy(
        &self,
    ) -> Result<UnrecoveredFailurePolicy, Box<dyn Error + Send + Sync>>;
}
