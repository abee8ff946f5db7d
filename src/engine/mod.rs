// ==========================================
// 配方成本核算系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod cost;

// 重导出核心引擎
pub use cost::CostEngine;
