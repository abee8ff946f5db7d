// ==========================================
// 配方成本核算系统 - 配方领域模型
// ==========================================
// 对齐: schema v0.1 formulation / formulation_ingredient / formulation_packaging 表
// 红线: cached_total_cost 仅为缓存,读取前必须强制重算或确认新鲜度
// ==========================================

use crate::domain::types::UnitSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Formulation - 配方（产品版本）
// ==========================================
// 用途: 一个产品版本的配方头记录,持有单位设置与成本缓存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formulation {
    // ===== 主键 =====
    pub formulation_id: String, // 配方唯一标识

    // ===== 基础信息 =====
    pub name: Option<String>, // 配方名称（展示用）

    // ===== 单位设置（原始值,可空） =====
    pub unit_pack_size_value: Option<f64>, // 单位包装规格数值（空按 0 处理）
    pub unit_pack_size_unit: Option<String>, // 单位标签（空按 "g" 处理）
    pub process_yield_pct: Option<f64>,    // 工艺收率百分比（空或 0 按 100 处理）

    // ===== 成本缓存 =====
    // 红线: 非事实来源。行项目变更后会静默过期,只能通过重算刷新
    pub cached_total_cost: Option<f64>,

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl Formulation {
    /// 解析本配方的单位设置（一次性应用默认值表）
    pub fn unit_settings(&self) -> UnitSettings {
        UnitSettings::resolve(
            self.unit_pack_size_value,
            self.unit_pack_size_unit.clone(),
            self.process_yield_pct,
        )
    }
}

// ==========================================
// FormulationIngredientLine - 配方原料行
// ==========================================
// 用途: 配方中一条原料投入,百分比口径为成品单件质量占比
// 说明: ingredient_name / cost_per_gram 由仓储层 JOIN ingredient 带出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulationIngredientLine {
    pub formulation_id: String, // 所属配方（FK）
    pub ingredient_id: String,  // 关联原料（FK,引用不拥有）

    pub ingredient_name: String,    // 原料名称（JOIN 带出）
    pub phase: Option<String>,      // 工序阶段标签（仅展示）
    pub percentage: f64,            // 成品单件质量占比（%）。允许配方合计超 100,损耗由收率另行核算
    pub sort_order: i32,            // 持久化展示顺序
    pub cost_per_gram: Option<f64>, // 每克成本（JOIN 带出,NULL=成本未知）
}

// ==========================================
// FormulationPackagingLine - 配方包材行
// ==========================================
// 用途: 配方中一条包材消耗,按成品单件消耗数量计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulationPackagingLine {
    pub formulation_id: String, // 所属配方（FK）
    pub packaging_id: String,   // 关联包材（FK,引用不拥有）

    pub packaging_name: String,     // 包材名称（JOIN 带出）
    pub quantity_per_unit: f64,     // 成品单件消耗数量
    pub cost_per_unit: Option<f64>, // 单件成本（JOIN 带出,NULL=成本未知）
}

// ==========================================
// Trait: LineQuantity
// ==========================================
// 用途: 成本引擎的用量换算接口
pub trait LineQuantity {
    /// 按单位设置换算本行的克数用量
    fn quantity_grams(&self, settings: &UnitSettings) -> f64;
}

impl LineQuantity for FormulationIngredientLine {
    /// 用量换算: (percentage / 100) * 包装规格 / 收率系数
    ///
    /// # 说明
    /// - 包装规格为 0 时用量退化为 0,不报错
    /// - 收率系数由 `UnitSettings::resolve` 保证恒为正,无除零风险
    /// - 负百分比按算术原样传导,不做校验
    fn quantity_grams(&self, settings: &UnitSettings) -> f64 {
        (self.percentage / 100.0) * settings.pack_size_value / settings.yield_factor()
    }
}
