// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、导入状态种子数据、内存版存储/队列/投递目标
// ==========================================
#![allow(dead_code)]

use async_trait::async_trait;
use csv_import_worker::db::init_schema;
use csv_import_worker::domain::{BatchEvent, ImportRow, QueueMessage};
use csv_import_worker::gateway::{GatewayError, GatewayResult, ObjectStorage, WorkQueue};
use csv_import_worker::importer::{ImportResult, RowSink};
use csv_import_worker::repository::{ImportStatusRepository, ImportStatusRepositoryImpl};
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = Connection::open(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建导入状态仓储，并登记若干 PENDING 文件
pub async fn create_status_repo(
    db_path: &str,
    pending_files: &[&str],
) -> Arc<ImportStatusRepositoryImpl> {
    let repo = Arc::new(ImportStatusRepositoryImpl::new(db_path).unwrap());
    for file_path in pending_files {
        repo.insert_pending(file_path).await.unwrap();
    }
    repo
}

/// 拼接用户 CSV（首行为表头）
pub fn user_csv(header: &str, rows: &[&str]) -> String {
    let mut content = format!("{}\n", header);
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    content
}

// ==========================================
// RecordingSink - 记录收到的行，可在第 N 次调用时失败
// ==========================================
pub struct RecordingSink<R> {
    rows: Mutex<Vec<R>>,
    calls: Mutex<usize>,
    fail_on_call: Option<usize>,
}

impl<R> RecordingSink<R> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
            fail_on_call: None,
        }
    }

    /// 第 n 次（从 1 开始）调用返回传输错误
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::new()
        }
    }
}

impl<R: Clone> RecordingSink<R> {
    pub fn rows(&self) -> Vec<R> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl<R: ImportRow + Clone> RowSink<R> for RecordingSink<R> {
    async fn import(&self, row: &R) -> ImportResult<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_on_call == Some(call) {
            return Err(GatewayError::Remote("simulated queue failure".to_string()).into());
        }
        self.rows.lock().unwrap().push(row.clone());
        Ok(())
    }
}

// ==========================================
// MemoryQueue - 内存队列，消息体包含指定片段时发送失败
// ==========================================
#[derive(Default)]
pub struct MemoryQueue {
    sent: Mutex<Vec<String>>,
    fail_if_contains: Option<String>,
}

impl MemoryQueue {
    pub fn failing_when_contains(fragment: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_if_contains: Some(fragment.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn send(&self, body: String) -> GatewayResult<()> {
        if let Some(fragment) = &self.fail_if_contains {
            if body.contains(fragment.as_str()) {
                return Err(GatewayError::Remote("simulated queue failure".to_string()));
            }
        }
        self.sent.lock().unwrap().push(body);
        Ok(())
    }
}

// ==========================================
// MemoryStorage - 内存对象存储
// ==========================================
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryStorage {
    pub fn put(&self, bucket: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), content.into());
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn get(&self, bucket: &str, key: &str) -> GatewayResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| GatewayError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}

// ==========================================
// 批量事件构造
// ==========================================

/// 存储事件消息体
pub fn storage_event_body(bucket: &str, key: &str) -> String {
    serde_json::json!({
        "eventSource": "aws:s3",
        "s3": {
            "bucket": { "name": bucket },
            "object": { "key": key, "size": 128 }
        }
    })
    .to_string()
}

/// 由 (bucket, key) 列表构造批量事件
pub fn batch_event(objects: &[(&str, &str)]) -> BatchEvent {
    let records = objects
        .iter()
        .enumerate()
        .map(|(i, (bucket, key))| QueueMessage {
            message_id: format!("msg-{}", i + 1),
            body: storage_event_body(bucket, key),
        })
        .collect();
    BatchEvent { records }
}
