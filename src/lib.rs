// ==========================================
// 配方成本核算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 生产管理应用的成本核算核心（UI 外壳另行集成）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统策略
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{UnitSettingDefaults, UnitSettings, UNIT_SETTING_DEFAULTS};

// 领域实体
pub use domain::{
    ActionLog, CostBreakdown, Formulation, FormulationIngredientLine, FormulationPackagingLine,
    Ingredient, IngredientCostLine, LineQuantity, Packaging, PackagingCostLine,
};

// 引擎
pub use engine::CostEngine;

// API
pub use api::{ApiError, ApiResult, CostApi};

// 配置
pub use config::{CostPolicy, CASCADE_FAILURE_IS_NON_FATAL};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "配方成本核算系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
