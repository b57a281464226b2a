// ==========================================
// CSV 导入工作进程 - 工作队列实现
// ==========================================
// SqsWorkQueue:   生产环境（aws-sdk-sqs）
// LocalFileQueue: 本地环境（每条消息追加一行 JSON）
// ==========================================

use super::{GatewayError, GatewayResult, WorkQueue};
use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::Client;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

// ==========================================
// SqsWorkQueue
// ==========================================
#[derive(Clone)]
pub struct SqsWorkQueue {
    client: Client,
    queue_url: String,
}

impl SqsWorkQueue {
    pub fn new(config: &aws_config::SdkConfig, queue_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(config),
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl WorkQueue for SqsWorkQueue {
    async fn send(&self, body: String) -> GatewayResult<()> {
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| GatewayError::Remote(DisplayErrorContext(&e).to_string()))?;
        debug!(queue_url = %self.queue_url, "消息发送完成");
        Ok(())
    }
}

// ==========================================
// LocalFileQueue
// ==========================================
// 多个任务并发写同一文件，用互斥锁保证按行追加
pub struct LocalFileQueue {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFileQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl WorkQueue for LocalFileQueue {
    async fn send(&self, body: String) -> GatewayResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // 一条消息一行
        let line = format!("{}\n", body.replace('\n', " "));
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_file_queue_appends_lines() {
        let dir = TempDir::new().unwrap();
        let queue = LocalFileQueue::new(dir.path().join("queues/user.jsonl"));

        queue.send(r#"{"id":1}"#.to_string()).await.unwrap();
        queue.send(r#"{"id":2}"#.to_string()).await.unwrap();

        let content = std::fs::read_to_string(queue.path()).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec![r#"{"id":1}"#, r#"{"id":2}"#]);
    }
}
