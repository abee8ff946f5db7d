// ==========================================
// 配方成本核算系统 - 操作日志仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: action_log 表的插入与查询
// ==========================================

use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式（本地时间,秒级）
const ACTION_TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================

/// 操作日志仓储
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 创建新的操作日志仓储实例
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        let conn = Connection::open(&db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入一条操作日志
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let payload_str = log
            .payload_json
            .as_ref()
            .map(|v| v.to_string());

        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, formulation_id, action_type, action_ts,
                actor, payload_json, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                log.action_id,
                log.formulation_id,
                log.action_type,
                log.action_ts.format(ACTION_TS_FORMAT).to_string(),
                log.actor,
                payload_str,
                log.detail,
            ],
        )?;

        Ok(())
    }

    /// 查询配方的最近操作日志（按时间倒序）
    ///
    /// # 参数
    /// - formulation_id: 配方ID
    /// - limit: 返回条数上限
    pub fn find_by_formulation(
        &self,
        formulation_id: &str,
        limit: usize,
    ) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                action_id, formulation_id, action_type, action_ts,
                actor, payload_json, detail
            FROM action_log
            WHERE formulation_id = ?1
            ORDER BY action_ts DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let logs = stmt
            .query_map(params![formulation_id, limit as i64], |row| {
                let ts_str: String = row.get(3)?;
                let payload_str: Option<String> = row.get(5)?;

                Ok(ActionLog {
                    action_id: row.get(0)?,
                    formulation_id: row.get(1)?,
                    action_type: row.get(2)?,
                    action_ts: chrono::NaiveDateTime::parse_from_str(&ts_str, ACTION_TS_FORMAT)
                        .unwrap_or_else(|_| {
                            chrono::DateTime::from_timestamp(0, 0)
                                .expect("epoch timestamp")
                                .naive_utc()
                        }),
                    actor: row.get(4)?,
                    payload_json: payload_str
                        .and_then(|s| serde_json::from_str(&s).ok()),
                    detail: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<ActionLog>>>()?;

        Ok(logs)
    }

    /// 按操作类型统计日志条数
    pub fn count_by_type(&self, action_type: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM action_log WHERE action_type = ?1",
            params![action_type],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
