// ==========================================
// CSV 导入工作进程 - 外部协作方网关
// ==========================================
// 职责: 对象存储读取 / 消息队列发送的接口与实现
// 红线: 只做 I/O，不含业务规则
// 说明: 客户端在进程启动时构建一次，由各并发任务共享
// ==========================================

pub mod queue;
pub mod storage;

use async_trait::async_trait;
use thiserror::Error;

pub use queue::{LocalFileQueue, SqsWorkQueue};
pub use storage::{LocalObjectStorage, S3ObjectStorage};

/// 网关层错误类型
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("对象不存在: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("非法对象键: {0}")]
    InvalidKey(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("远程服务调用失败: {0}")]
    Remote(String),
}

/// Result 类型别名
pub type GatewayResult<T> = Result<T, GatewayError>;

// ==========================================
// ObjectStorage Trait
// ==========================================
// 用途: 读取投递的数据文件
// 实现者: S3ObjectStorage, LocalObjectStorage
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 读取对象全部字节
    ///
    /// # 返回
    /// - Err(ObjectNotFound): 对象不存在
    /// - Err(Remote/Io): 读取失败
    async fn get(&self, bucket: &str, key: &str) -> GatewayResult<Vec<u8>>;
}

// ==========================================
// WorkQueue Trait
// ==========================================
// 用途: 向下游工作队列投递校验通过的行
// 实现者: SqsWorkQueue, LocalFileQueue
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// 发送一条消息（JSON 文本）
    async fn send(&self, body: String) -> GatewayResult<()>;
}

/// 加载 AWS SDK 共享配置
pub async fn load_aws_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
