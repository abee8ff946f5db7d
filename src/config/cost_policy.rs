// ==========================================
// 配方成本核算系统 - 成本核算策略
// ==========================================
// 职责: 将成本核算的行为开关显式命名,避免隐式控制流
// ==========================================

use serde::{Deserialize, Serialize};

/// 级联重算失败是否非致命
///
/// 单位设置写入成功后,级联成本重算失败只告警不回滚:
/// 用户的设置保存始终视为成功,缓存总额留待下次重算刷新。
pub const CASCADE_FAILURE_IS_NON_FATAL: bool = true;

/// 成本核算策略（持久化对象）
///
/// 存储位置：部署配置（JSON）,缺省值即出厂行为
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostPolicy {
    /// 级联重算失败是否非致命（默认 true,见常量说明）
    #[serde(default = "default_cascade_failure_is_non_fatal")]
    pub cascade_failure_is_non_fatal: bool,

    /// 行项/小计金额展示小数位
    #[serde(default = "default_line_cost_decimals")]
    pub line_cost_decimals: usize,

    /// 单件成本展示小数位
    #[serde(default = "default_unit_cost_decimals")]
    pub unit_cost_decimals: usize,
}

fn default_cascade_failure_is_non_fatal() -> bool {
    CASCADE_FAILURE_IS_NON_FATAL
}

fn default_line_cost_decimals() -> usize {
    2
}

fn default_unit_cost_decimals() -> usize {
    3
}

impl Default for CostPolicy {
    fn default() -> Self {
        Self {
            cascade_failure_is_non_fatal: default_cascade_failure_is_non_fatal(),
            line_cost_decimals: default_line_cost_decimals(),
            unit_cost_decimals: default_unit_cost_decimals(),
        }
    }
}

impl CostPolicy {
    /// 格式化行项/小计金额
    pub fn format_line_cost(&self, value: f64) -> String {
        format!("{:.*}", self.line_cost_decimals, value)
    }

    /// 格式化单件成本
    pub fn format_unit_cost(&self, value: f64) -> String {
        format!("{:.*}", self.unit_cost_decimals, value)
    }
}
