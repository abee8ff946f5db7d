// ==========================================
// 配方成本核算系统 - 成本分解输出模型
// ==========================================
// 职责: 定义成本引擎的输出结构（逐行明细 + 汇总 + 警告）
// 说明: 按需计算的瞬态结果,不落库;仅总额回写 formulation.cached_total_cost
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// IngredientCostLine - 原料成本行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCostLine {
    /// 原料ID
    pub ingredient_id: String,

    /// 原料名称
    pub ingredient_name: String,

    /// 工序阶段标签
    pub phase: Option<String>,

    /// 成品单件质量占比（%）
    pub percentage: f64,

    /// 换算后的克数用量
    pub quantity_grams: f64,

    /// 每克成本（NULL=未知）
    pub cost_per_gram: Option<f64>,

    /// 本行成本（成本未知时为 0）
    pub total_cost: f64,

    /// 缺失成本警告（仅成本未知时存在）
    pub warning: Option<String>,
}

// ==========================================
// PackagingCostLine - 包材成本行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagingCostLine {
    /// 包材ID
    pub packaging_id: String,

    /// 包材名称
    pub packaging_name: String,

    /// 成品单件消耗数量
    pub quantity: f64,

    /// 单件成本（NULL=未知）
    pub cost_per_unit: Option<f64>,

    /// 本行成本（成本未知时为 0）
    pub total_cost: f64,

    /// 缺失成本警告（仅成本未知时存在）
    pub warning: Option<String>,
}

// ==========================================
// CostBreakdown - 成本分解结果
// ==========================================
// 用途: 部分成功模式——计算值与非致命警告并存
// 约束: total_ingredients_cost / total_packaging_cost 恒等于各自行项之和
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// 原料成本行（按配方持久化顺序）
    pub ingredients: Vec<IngredientCostLine>,

    /// 包材成本行
    pub packaging: Vec<PackagingCostLine>,

    /// 原料小计
    pub total_ingredients_cost: f64,

    /// 包材小计
    pub total_packaging_cost: f64,

    /// 制造总成本（原料小计 + 包材小计）
    pub total_manufacturing_cost: f64,

    /// 单件成本。现阶段包装即销售单件,与总成本同值,不再二次折算
    pub cost_per_unit: f64,

    /// 缺失成本警告（每条命名一个行项）
    pub warnings: Vec<String>,

    // ===== 单位设置回显（供展示层使用） =====
    pub unit_pack_size_value: f64,
    pub unit_pack_size_unit: String,
    pub process_yield_pct: f64,
}

impl CostBreakdown {
    /// 是否存在缺失成本的行项
    pub fn has_missing_costs(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 行项总数（原料 + 包材）
    pub fn line_count(&self) -> usize {
        self.ingredients.len() + self.packaging.len()
    }
}
