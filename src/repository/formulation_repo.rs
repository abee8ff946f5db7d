// ==========================================
// 配方成本核算系统 - 配方数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 管理 formulation 表的读写,含成本缓存回写
// ==========================================

use crate::domain::formulation::Formulation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// FormulationRepository - 配方仓储
// ==========================================

/// 配方仓储
/// 职责: formulation 表 CRUD、单位设置写入、成本缓存回写
pub struct FormulationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FormulationRepository {
    /// 创建新的配方仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入新配方
    pub fn create(&self, formulation: &Formulation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO formulation (
                formulation_id, name, unit_pack_size_value, unit_pack_size_unit,
                process_yield_pct, cached_total_cost, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                formulation.formulation_id,
                formulation.name,
                formulation.unit_pack_size_value,
                formulation.unit_pack_size_unit,
                formulation.process_yield_pct,
                formulation.cached_total_cost,
                formulation.created_at,
                formulation.updated_at,
            ],
        )?;

        Ok(())
    }

    /// 按ID查询配方
    ///
    /// # 返回
    /// - Ok(Some(Formulation)): 找到配方
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, formulation_id: &str) -> RepositoryResult<Option<Formulation>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                formulation_id, name, unit_pack_size_value, unit_pack_size_unit,
                process_yield_pct, cached_total_cost, created_at, updated_at
            FROM formulation
            WHERE formulation_id = ?1
            "#,
        )?;

        let formulation = stmt
            .query_row(params![formulation_id], |row| {
                Ok(Formulation {
                    formulation_id: row.get(0)?,
                    name: row.get(1)?,
                    unit_pack_size_value: row.get(2)?,
                    unit_pack_size_unit: row.get(3)?,
                    process_yield_pct: row.get(4)?,
                    cached_total_cost: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            })
            .optional()?;

        Ok(formulation)
    }

    /// 查询全部配方ID（按ID排序,供批量重算使用）
    pub fn list_ids(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT formulation_id
            FROM formulation
            ORDER BY formulation_id
            "#,
        )?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        Ok(ids)
    }

    /// 更新配方单位设置（三个字段整体覆盖）
    ///
    /// # 参数
    /// - formulation_id: 配方ID
    /// - pack_size_value: 单位包装规格数值（可写空）
    /// - pack_size_unit: 单位标签（可写空）
    /// - yield_pct: 工艺收率百分比（可写空）
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示配方不存在）
    pub fn update_unit_settings(
        &self,
        formulation_id: &str,
        pack_size_value: Option<f64>,
        pack_size_unit: Option<&str>,
        yield_pct: Option<f64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            UPDATE formulation
            SET unit_pack_size_value = ?2,
                unit_pack_size_unit = ?3,
                process_yield_pct = ?4,
                updated_at = ?5
            WHERE formulation_id = ?1
            "#,
            params![
                formulation_id,
                pack_size_value,
                pack_size_unit,
                yield_pct,
                Utc::now(),
            ],
        )?;

        Ok(affected)
    }

    /// 回写成本缓存
    ///
    /// 红线: 仅覆盖 cached_total_cost 一个字段,不触碰其他列
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示配方不存在）
    pub fn update_cached_total_cost(
        &self,
        formulation_id: &str,
        total_cost: f64,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            UPDATE formulation
            SET cached_total_cost = ?2
            WHERE formulation_id = ?1
            "#,
            params![formulation_id, total_cost],
        )?;

        Ok(affected)
    }
}
