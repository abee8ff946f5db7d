// ==========================================
// 配方成本核算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod catalog;
pub mod cost;
pub mod formulation;
pub mod types;

// 重导出核心类型
pub use action_log::{
    ActionLog, ACTION_IMPORT_PRICE_LIST, ACTION_RECALC_TOTAL_COST, ACTION_UPDATE_UNIT_SETTINGS,
};
pub use catalog::{Ingredient, Packaging};
pub use cost::{CostBreakdown, IngredientCostLine, PackagingCostLine};
pub use formulation::{
    Formulation, FormulationIngredientLine, FormulationPackagingLine, LineQuantity,
};
pub use types::{UnitSettingDefaults, UnitSettings, UNIT_SETTING_DEFAULTS};
