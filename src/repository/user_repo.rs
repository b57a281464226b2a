// ==========================================
// CSV 导入工作进程 - 用户数据仓储
// ==========================================
// 职责: users 表读写
// - all_emails: 批处理开始前加载唯一性参照集合
// - upsert: 按主键插入或更新全部列
// ==========================================

use crate::domain::UserRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// 用户仓储
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 全部已登记的邮箱
    pub fn all_emails(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT email FROM users ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut emails = Vec::new();
        for email in rows {
            emails.push(email?);
        }
        Ok(emails)
    }

    /// 按主键 upsert 用户
    pub fn upsert(&self, user: &UserRow) -> RepositoryResult<()> {
        let id = user.id.ok_or_else(|| RepositoryError::FieldValueError {
            field: "id".to_string(),
            message: "用户 id 不能为空".to_string(),
        })?;

        let conn = self.get_conn()?;
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO users (id, name, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                updated_at = excluded.updated_at
            "#,
            params![id, user.name, user.email, now],
        )?;
        Ok(())
    }
}
