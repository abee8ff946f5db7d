// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

use formulation_costing::api::CostApi;
use formulation_costing::db::open_sqlite_connection;
use formulation_costing::repository::{
    ActionLogRepository, FormulationIngredientLineRepository, FormulationPackagingLineRepository,
    FormulationRepository, IngredientRepository, PackagingRepository,
};
use rusqlite::{params, Connection};
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

    // 初始化 schema
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 初始化数据库 schema
fn init_schema(conn: &Connection) -> Result<(), Box<dyn Error>> {
    // 创建 schema_version 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    conn.execute("INSERT OR IGNORE INTO schema_version (version) VALUES (1)", [])?;

    // 创建 formulation 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS formulation (
            formulation_id TEXT PRIMARY KEY,
            name TEXT,
            unit_pack_size_value REAL,
            unit_pack_size_unit TEXT,
            process_yield_pct REAL,
            cached_total_cost REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 创建 ingredient 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS ingredient (
            ingredient_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            cost_per_gram REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 创建 packaging 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS packaging (
            packaging_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            cost_per_unit REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // 创建 formulation_ingredient 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS formulation_ingredient (
            formulation_id TEXT NOT NULL REFERENCES formulation(formulation_id) ON DELETE CASCADE,
            ingredient_id TEXT NOT NULL REFERENCES ingredient(ingredient_id),
            phase TEXT,
            percentage REAL NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (formulation_id, ingredient_id)
        )
        "#,
        [],
    )?;

    // 创建 formulation_packaging 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS formulation_packaging (
            formulation_id TEXT NOT NULL REFERENCES formulation(formulation_id) ON DELETE CASCADE,
            packaging_id TEXT NOT NULL REFERENCES packaging(packaging_id),
            quantity_per_unit REAL NOT NULL,
            PRIMARY KEY (formulation_id, packaging_id)
        )
        "#,
        [],
    )?;

    // 创建 action_log 表
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS action_log (
            action_id TEXT PRIMARY KEY,
            formulation_id TEXT,
            action_type TEXT NOT NULL,
            action_ts TEXT NOT NULL,
            actor TEXT NOT NULL,
            payload_json TEXT,
            detail TEXT
        )
        "#,
        [],
    )?;

    Ok(())
}

/// 固定审计时间戳（RFC3339,与 rusqlite chrono 读取格式一致）
pub const SEED_TS: &str = "2026-01-01T00:00:00+00:00";

/// 插入测试配方
pub fn insert_formulation(
    conn: &Connection,
    formulation_id: &str,
    name: Option<&str>,
    pack_size_value: Option<f64>,
    pack_size_unit: Option<&str>,
    yield_pct: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO formulation (
            formulation_id, name, unit_pack_size_value, unit_pack_size_unit,
            process_yield_pct, cached_total_cost, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, NULL, ?6, ?6)
        "#,
        params![formulation_id, name, pack_size_value, pack_size_unit, yield_pct, SEED_TS],
    )?;
    Ok(())
}

/// 插入测试原料（cost 为 None 表示成本未知）
pub fn insert_ingredient(
    conn: &Connection,
    ingredient_id: &str,
    name: &str,
    cost_per_gram: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO ingredient (ingredient_id, name, cost_per_gram, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
        params![ingredient_id, name, cost_per_gram, SEED_TS],
    )?;
    Ok(())
}

/// 插入测试包材（cost 为 None 表示成本未知）
pub fn insert_packaging(
    conn: &Connection,
    packaging_id: &str,
    name: &str,
    cost_per_unit: Option<f64>,
) -> Result<(), Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO packaging (packaging_id, name, cost_per_unit, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?4)
        "#,
        params![packaging_id, name, cost_per_unit, SEED_TS],
    )?;
    Ok(())
}

/// 插入配方原料行
pub fn insert_ingredient_line(
    conn: &Connection,
    formulation_id: &str,
    ingredient_id: &str,
    phase: Option<&str>,
    percentage: f64,
    sort_order: i32,
) -> Result<(), Box<dyn Error>> {
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

/// 插入配方包材行
pub fn insert_packaging_line(
    conn: &Connection,
    formulation_id: &str,
    packaging_id: &str,
    quantity_per_unit: f64,
) -> Result<(), Box<dyn Error>> {
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

/// 读取配方的成本缓存字段（验证回写用）
pub fn get_cached_total_cost(
    conn: &Connection,
    formulation_id: &str,
) -> Result<Option<f64>, Box<dyn Error>> {
    let cached: Option<f64> = conn.query_row(
        "SELECT cached_total_cost FROM formulation WHERE formulation_id = ?1",
        params![formulation_id],
        |row| row.get(0),
    )?;
    Ok(cached)
}

/// 基于共享连接构建 CostApi（与应用装配方式一致）
pub fn build_cost_api(db_path: &str) -> Result<(Arc<Mutex<Connection>>, CostApi), Box<dyn Error>> {
    let conn = Arc::new(Mutex::new(open_sqlite_connection(db_path)?));

    let api = CostApi::new(
        Arc::new(FormulationRepository::from_connection(conn.clone())),
        Arc::new(FormulationIngredientLineRepository::from_connection(
            conn.clone(),
        )),
        Arc::new(FormulationPackagingLineRepository::from_connection(
            conn.clone(),
        )),
        Arc::new(ActionLogRepository::from_connection(conn.clone())),
    );

    Ok((conn, api))
}

/// 基于共享连接构建价格清单导入器
pub fn build_price_importer(
    db_path: &str,
) -> Result<
    (
        Arc<Mutex<Connection>>,
        formulation_costing::importer::PriceListImporter,
        Arc<IngredientRepository>,
        Arc<PackagingRepository>,
    ),
    Box<dyn Error>,
> {
    let conn = Arc::new(Mutex::new(open_sqlite_connection(db_path)?));

    let ingredient_repo = Arc::new(IngredientRepository::from_connection(conn.clone()));
    let packaging_repo = Arc::new(PackagingRepository::from_connection(conn.clone()));

    let importer = formulation_costing::importer::PriceListImporter::new(
        ingredient_repo.clone(),
        packaging_repo.clone(),
    );

    Ok((conn, importer, ingredient_repo, packaging_repo))
}
