// ==========================================
// 配方成本核算系统 - 配方行项数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 读取配方的原料行/包材行,JOIN 物料主数据带出名称与成本
// ==========================================

use crate::domain::formulation::{FormulationIngredientLine, FormulationPackagingLine};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

// ==========================================
// FormulationIngredientLineRepository - 原料行仓储
// ==========================================

/// 原料行仓储
/// 职责: formulation_ingredient 表读写,读取时 JOIN ingredient
pub struct FormulationIngredientLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FormulationIngredientLineRepository {
    /// 创建新的原料行仓储实例
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

    /// 查询配方的全部原料行（按持久化展示顺序）
    ///
    /// # 返回
    /// - Ok(Vec<FormulationIngredientLine>): 原料行列表,含 JOIN 带出的名称与成本
    pub fn find_by_formulation(
        &self,
        formulation_id: &str,
    ) -> RepositoryResult<Vec<FormulationIngredientLine>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                fi.formulation_id, fi.ingredient_id, i.name, fi.phase,
                fi.percentage, fi.sort_order, i.cost_per_gram
            FROM formulation_ingredient fi
            JOIN ingredient i ON i.ingredient_id = fi.ingredient_id
            WHERE fi.formulation_id = ?1
            ORDER BY fi.sort_order, fi.rowid
            "#,
        )?;

        let lines = stmt
            .query_map(params![formulation_id], |row| {
                Ok(FormulationIngredientLine {
                    formulation_id: row.get(0)?,
                    ingredient_id: row.get(1)?,
                    ingredient_name: row.get(2)?,
                    phase: row.get(3)?,
                    percentage: row.get(4)?,
                    sort_order: row.get(5)?,
                    cost_per_gram: row.get(6)?,
                })
            })?
            .collect::<SqliteResult<Vec<FormulationIngredientLine>>>()?;

        Ok(lines)
    }

    /// 插入原料行
    ///
    /// # 参数
    /// - formulation_id: 所属配方ID
    /// - ingredient_id: 原料ID
    /// - phase: 工序阶段标签（可空）
    /// - percentage: 成品单件质量占比（%）
    /// - sort_order: 展示顺序
    pub fn insert(
        &self,
        formulation_id: &str,
        ingredient_id: &str,
        phase: Option<&str>,
        percentage: f64,
        sort_order: i32,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO formulation_ingredient (
                formulation_id, ingredient_id, phase, percentage, sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![formulation_id, ingredient_id, phase, percentage, sort_order],
        )?;

        Ok(())
    }

    /// 删除配方的全部原料行
    pub fn delete_by_formulation(&self, formulation_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM formulation_ingredient WHERE formulation_id = ?1",
            params![formulation_id],
        )?;

        Ok(affected)
    }
}

// ==========================================
// FormulationPackagingLineRepository - 包材行仓储
// ==========================================

/// 包材行仓储
/// 职责: formulation_packaging 表读写,读取时 JOIN packaging
pub struct FormulationPackagingLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FormulationPackagingLineRepository {
    /// 创建新的包材行仓储实例
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

    /// 查询配方的全部包材行（按插入顺序稳定迭代）
    pub fn find_by_formulation(
        &self,
        formulation_id: &str,
    ) -> RepositoryResult<Vec<FormulationPackagingLine>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                fp.formulation_id, fp.packaging_id, p.name,
                fp.quantity_per_unit, p.cost_per_unit
            FROM formulation_packaging fp
            JOIN packaging p ON p.packaging_id = fp.packaging_id
            WHERE fp.formulation_id = ?1
            ORDER BY fp.rowid
            "#,
        )?;

        let lines = stmt
            .query_map(params![formulation_id], |row| {
                Ok(FormulationPackagingLine {
                    formulation_id: row.get(0)?,
                    packaging_id: row.get(1)?,
                    packaging_name: row.get(2)?,
                    quantity_per_unit: row.get(3)?,
                    cost_per_unit: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<FormulationPackagingLine>>>()?;

        Ok(lines)
    }

    /// 插入包材行
    pub fn insert(
        &self,
        formulation_id: &str,
        packaging_id: &str,
        quantity_per_unit: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO formulation_packaging (
                formulation_id, packaging_id, quantity_per_unit
            ) VALUES (?1, ?2, ?3)
            "#,
            params![formulation_id, packaging_id, quantity_per_unit],
        )?;

        Ok(())
    }

    /// 删除配方的全部包材行
    pub fn delete_by_formulation(&self, formulation_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            "DELETE FROM formulation_packaging WHERE formulation_id = ?1",
            params![formulation_id],
        )?;

        Ok(affected)
    }
}
