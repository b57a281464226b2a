// ==========================================
// CSV 导入工作进程 - 文件到达通知
// ==========================================
// 职责: 解析消息队列投递的批量事件，提取容器名与对象键
// 格式:
// - 批量事件: {"Records": [{"messageId": "...", "body": "<json>"}]}
// - 消息体:   {"s3": {"bucket": {"name": "..."}, "object": {"key": "..."}}}
// ==========================================

use crate::domain::types::ImportTarget;
use serde::{Deserialize, Serialize};

// ==========================================
// BatchEvent - 批量事件（触发源投递的一批消息）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<QueueMessage>,
}

impl BatchEvent {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

// ==========================================
// QueueMessage - 单条队列消息
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueMessage {
    #[serde(rename = "messageId", default)]
    pub message_id: String,
    #[serde(default)]
    pub body: String,
}

// ==========================================
// Notification - 文件到达通知
// ==========================================
// 仅消费两个字段: 容器名(bucket) / 对象键(key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub bucket: String,
    pub key: String,
}

impl Notification {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// 从队列消息体解析通知
    pub fn from_message(message: &QueueMessage) -> Result<Self, serde_json::Error> {
        let record: StorageEventRecord = serde_json::from_str(&message.body)?;
        Ok(Self {
            bucket: record.s3.bucket.name,
            key: record.s3.object.key,
        })
    }

    /// 导入目标（由对象键首段目录决定）
    pub fn target(&self) -> Option<ImportTarget> {
        ImportTarget::from_key(&self.key)
    }
}

// ===== 存储事件记录（只声明用到的字段）=====

#[derive(Debug, Deserialize)]
struct StorageEventRecord {
    s3: StorageEntity,
}

#[derive(Debug, Deserialize)]
struct StorageEntity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}
