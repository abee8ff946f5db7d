// ==========================================
// 配方成本核算系统 - 物料主数据领域模型
// ==========================================
// 对齐: schema v0.1 ingredient / packaging 表
// 用途: 导入层写入,成本引擎只读
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// Ingredient - 原料主数据
// ==========================================
// 红线: cost_per_gram 为 NULL 表示成本未知,与 0 成本语义不同
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    // ===== 主键 =====
    pub ingredient_id: String, // 原料唯一标识

    // ===== 基础信息 =====
    pub name: String, // 原料名称（展示用）

    // ===== 成本信息 =====
    pub cost_per_gram: Option<f64>, // 每克成本（NULL=未知,参与核算时记警告按 0 计）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

// ==========================================
// Packaging - 包材主数据
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packaging {
    // ===== 主键 =====
    pub packaging_id: String, // 包材唯一标识

    // ===== 基础信息 =====
    pub name: String, // 包材名称（展示用）

    // ===== 成本信息 =====
    pub cost_per_unit: Option<f64>, // 单件成本（NULL=未知,参与核算时记警告按 0 计）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>, // 记录创建时间
    pub updated_at: DateTime<Utc>, // 记录更新时间
}

impl Ingredient {
    /// 创建新原料（成本未知）
    pub fn new(ingredient_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            ingredient_id,
            name,
            cost_per_gram: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 设置每克成本
    pub fn with_cost_per_gram(mut self, cost: f64) -> Self {
        self.cost_per_gram = Some(cost);
        self
    }
}

impl Packaging {
    /// 创建新包材（成本未知）
    pub fn new(packaging_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            packaging_id,
            name,
            cost_per_unit: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 设置单件成本
    pub fn with_cost_per_unit(mut self, cost: f64) -> Self {
        self.cost_per_unit = Some(cost);
        self
    }
}
