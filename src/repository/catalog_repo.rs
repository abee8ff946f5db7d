// ==========================================
// 配方成本核算系统 - 物料主数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: ingredient / packaging 表的 upsert 与查询,供导入层与配方维护使用
// ==========================================

use crate::domain::catalog::{Ingredient, Packaging};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// TODO: 价格历史表落地后,按生效日期取价替换单值 cost 列

// ==========================================
// IngredientRepository - 原料仓储
// ==========================================

/// 原料仓储
/// 职责: 管理 ingredient 表的 CRUD 操作
pub struct IngredientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl IngredientRepository {
    /// 创建新的原料仓储实例
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

    /// 插入或更新原料（按主键覆盖名称与成本,保留首次创建时间）
    pub fn upsert(&self, ingredient: &Ingredient) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO ingredient (ingredient_id, name, cost_per_gram, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(ingredient_id) DO UPDATE SET
                name = excluded.name,
                cost_per_gram = excluded.cost_per_gram,
                updated_at = excluded.updated_at
            "#,
            params![
                ingredient.ingredient_id,
                ingredient.name,
                ingredient.cost_per_gram,
                ingredient.created_at,
                ingredient.updated_at,
            ],
        )?;

        Ok(())
    }

    /// 按ID查询原料
    pub fn find_by_id(&self, ingredient_id: &str) -> RepositoryResult<Option<Ingredient>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT ingredient_id, name, cost_per_gram, created_at, updated_at
            FROM ingredient
            WHERE ingredient_id = ?1
            "#,
        )?;

        let ingredient = stmt
            .query_row(params![ingredient_id], |row| {
                Ok(Ingredient {
                    ingredient_id: row.get(0)?,
                    name: row.get(1)?,
                    cost_per_gram: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })
            .optional()?;

        Ok(ingredient)
    }

    /// 更新原料成本（NULL 表示成本未知）
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示原料不存在）
    pub fn update_cost(
        &self,
        ingredient_id: &str,
        cost_per_gram: Option<f64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            UPDATE ingredient
            SET cost_per_gram = ?2, updated_at = ?3
            WHERE ingredient_id = ?1
            "#,
            params![ingredient_id, cost_per_gram, Utc::now()],
        )?;

        Ok(affected)
    }
}

// ==========================================
// PackagingRepository - 包材仓储
// ==========================================

/// 包材仓储
/// 职责: 管理 packaging 表的 CRUD 操作
pub struct PackagingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PackagingRepository {
    /// 创建新的包材仓储实例
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

    /// 插入或更新包材（按主键覆盖名称与成本,保留首次创建时间）
    pub fn upsert(&self, packaging: &Packaging) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO packaging (packaging_id, name, cost_per_unit, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(packaging_id) DO UPDATE SET
                name = excluded.name,
                cost_per_unit = excluded.cost_per_unit,
                updated_at = excluded.updated_at
            "#,
            params![
                packaging.packaging_id,
                packaging.name,
                packaging.cost_per_unit,
                packaging.created_at,
                packaging.updated_at,
            ],
        )?;

        Ok(())
    }

    /// 按ID查询包材
    pub fn find_by_id(&self, packaging_id: &str) -> RepositoryResult<Option<Packaging>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT packaging_id, name, cost_per_unit, created_at, updated_at
            FROM packaging
            WHERE packaging_id = ?1
            "#,
        )?;

        let packaging = stmt
            .query_row(params![packaging_id], |row| {
                Ok(Packaging {
                    packaging_id: row.get(0)?,
                    name: row.get(1)?,
                    cost_per_unit: row.get(2)?,
                    created_at: row.get(3)?,
                    updated_at: row.get(4)?,
                })
            })
            .optional()?;

        Ok(packaging)
    }

    /// 更新包材成本（NULL 表示成本未知）
    ///
    /// # 返回
    /// - Ok(usize): 受影响行数（0 表示包材不存在）
    pub fn update_cost(
        &self,
        packaging_id: &str,
        cost_per_unit: Option<f64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;

        let affected = conn.execute(
            r#"
            UPDATE packaging
            SET cost_per_unit = ?2, updated_at = ?3
            WHERE packaging_id = ?1
            "#,
            params![packaging_id, cost_per_unit, Utc::now()],
        )?;

        Ok(affected)
    }
}
