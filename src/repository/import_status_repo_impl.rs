// ==========================================
// CSV 导入工作进程 - 导入状态 Repository 实现
// ==========================================
// 职责: 实现 ImportStatusRepository（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 存储: import_status / import_detail 表（时间以 RFC3339 文本存储）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{ImportDetail, ImportState, ImportStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::import_status_repo::ImportStatusRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

// ==========================================
// ImportStatusRepositoryImpl
// ==========================================
pub struct ImportStatusRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ImportStatusRepositoryImpl {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 Repository 实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn load_details(conn: &Connection, status_id: i64) -> RepositoryResult<Vec<ImportDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, import_status_id, row_number, message, created_at, updated_at
            FROM import_detail
            WHERE import_status_id = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![status_id], |row| {
            Ok(ImportDetail {
                id: Some(row.get(0)?),
                import_status_id: row.get(1)?,
                row_number: row.get::<_, Option<i64>>(2)?.map(|n| n as usize),
                message: row.get(3)?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        })?;

        let mut details = Vec::new();
        for detail in rows {
            details.push(detail?);
        }
        Ok(details)
    }

    /// 在事务中插入尚未落库的明细并回填 id
    ///
    /// 明细只追加不修改，已有 id 的明细跳过
    fn insert_new_details_tx(tx: &Transaction, status: &mut ImportStatus) -> RepositoryResult<()> {
        let status_id = status.id;
        for detail in status.details.iter_mut().filter(|d| d.id.is_none()) {
            detail.import_status_id = status_id;
            tx.execute(
                r#"
                INSERT INTO import_detail (
                    import_status_id, row_number, message, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    detail.import_status_id,
                    detail.row_number.map(|n| n as i64),
                    detail.message,
                    detail.created_at,
                    detail.updated_at,
                ],
            )?;
            detail.id = Some(tx.last_insert_rowid());
        }
        Ok(())
    }
}

/// import_status 原始行（状态字段未解析）
struct StatusRow {
    id: i64,
    file_name: String,
    file_path: String,
    record_count: i64,
    processed_count: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StatusRow {
    fn into_entity(self, details: Vec<ImportDetail>) -> RepositoryResult<ImportStatus> {
        let status = ImportState::from_str(&self.status).map_err(|message| {
            RepositoryError::FieldValueError {
                field: "status".to_string(),
                message,
            }
        })?;

        Ok(ImportStatus {
            id: self.id,
            file_name: self.file_name,
            file_path: self.file_path,
            record_count: self.record_count.max(0) as usize,
            processed_count: self.processed_count.max(0) as usize,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            details,
        })
    }
}

#[async_trait]
impl ImportStatusRepository for ImportStatusRepositoryImpl {
    async fn get_by_file_path(&self, file_path: &str) -> RepositoryResult<ImportStatus> {
        let conn = self.get_conn()?;

        let row = conn
            .query_row(
                r#"
                SELECT id, file_name, file_path, record_count, processed_count,
                       status, created_at, updated_at
                FROM import_status
                WHERE file_path = ?1
                "#,
                params![file_path],
                |row| {
                    Ok(StatusRow {
                        id: row.get(0)?,
                        file_name: row.get(1)?,
                        file_path: row.get(2)?,
                        record_count: row.get(3)?,
                        processed_count: row.get(4)?,
                        status: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "ImportStatus".to_string(),
                key: format!("file_path={}", file_path),
            })?;

        let details = Self::load_details(&conn, row.id)?;
        row.into_entity(details)
    }

    async fn save(&self, status: &mut ImportStatus) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO import_status (
                id, file_name, file_path, record_count, processed_count,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                file_name = excluded.file_name,
                file_path = excluded.file_path,
                record_count = excluded.record_count,
                processed_count = excluded.processed_count,
                status = excluded.status,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
            params![
                if status.id > 0 { Some(status.id) } else { None },
                status.file_name,
                status.file_path,
                status.record_count as i64,
                status.processed_count as i64,
                status.status.as_str(),
                status.created_at,
                status.updated_at,
            ],
        )?;
        if status.id <= 0 {
            status.id = tx.last_insert_rowid();
        }

        Self::insert_new_details_tx(&tx, status)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(
            file_path = %status.file_path,
            status = %status.status,
            processed_count = status.processed_count,
            details = status.details.len(),
            "导入状态已保存"
        );
        Ok(())
    }

    async fn try_begin_processing(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE import_status
            SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            "#,
            params![
                ImportState::Processing.as_str(),
                Utc::now(),
                id,
                ImportState::Pending.as_str(),
            ],
        )?;
        Ok(affected == 1)
    }

    async fn insert_pending(&self, file_path: &str) -> RepositoryResult<i64> {
        let mut status = ImportStatus::new_pending(file_path);
        self.save(&mut status).await?;
        Ok(status.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn repo() -> ImportStatusRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ImportStatusRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_insert_and_load_pending() {
        let repo = repo();
        let id = repo.insert_pending("user/users.csv").await.unwrap();

        let status = repo.get_by_file_path("user/users.csv").await.unwrap();
        assert_eq!(status.id, id);
        assert_eq!(status.file_name, "users.csv");
        assert_eq!(status.status, ImportState::Pending);
        assert!(status.details.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let repo = repo();
        let result = repo.get_by_file_path("user/none.csv").await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_save_backfills_detail_ids_and_keeps_order() {
        let repo = repo();
        repo.insert_pending("user/users.csv").await.unwrap();

        let mut status = repo.get_by_file_path("user/users.csv").await.unwrap();
        status.start_processing().unwrap();
        status.set_record_count(2).unwrap();
        status.append_row_detail(1, "first");
        repo.save(&mut status).await.unwrap();
        let first_id = status.details[0].id.unwrap();

        // 已落库的明细不再写入
        status.details[0].message = "rewritten".to_string();
        status.append_row_detail(2, "second");
        repo.save(&mut status).await.unwrap();
        assert_eq!(status.details[0].id, Some(first_id));
        assert!(status.details[1].id.is_some());

        let loaded = repo.get_by_file_path("user/users.csv").await.unwrap();
        assert_eq!(loaded.status, ImportState::Processing);
        assert_eq!(loaded.record_count, 2);
        let messages: Vec<&str> = loaded.details.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(loaded.details[1].row_number, Some(2));
    }

    #[tokio::test]
    async fn test_try_begin_processing_is_compare_and_set() {
        let repo = repo();
        let id = repo.insert_pending("user/users.csv").await.unwrap();

        assert!(repo.try_begin_processing(id).await.unwrap());
        assert!(!repo.try_begin_processing(id).await.unwrap());

        let status = repo.get_by_file_path("user/users.csv").await.unwrap();
        assert_eq!(status.status, ImportState::Processing);
    }
}
