// ==========================================
// 配方成本核算系统 - 配置层
// ==========================================
// 职责: 系统策略与默认值的显式命名
// ==========================================

pub mod cost_policy;

// 重导出核心类型
pub use cost_policy::{CostPolicy, CASCADE_FAILURE_IS_NON_FATAL};
