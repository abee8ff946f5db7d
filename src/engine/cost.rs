// ==========================================
// 配方成本核算系统 - 成本核算引擎
// ==========================================
// 红线: 无状态引擎,所有方法都是纯函数,不拼 SQL
// 职责: 配方成本逐行核算与汇总
// 输入: 已解析单位设置 + 原料行 + 包材行
// 输出: CostBreakdown（明细 + 小计 + 总额 + 警告）
// ==========================================

use crate::domain::cost::{CostBreakdown, IngredientCostLine, PackagingCostLine};
use crate::domain::formulation::{
    FormulationIngredientLine, FormulationPackagingLine, LineQuantity,
};
use crate::domain::types::UnitSettings;

// ==========================================
// CostEngine - 成本核算引擎
// ==========================================
pub struct CostEngine;

impl CostEngine {
    /// 创建新的成本核算引擎
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算配方成本分解
    ///
    /// # 参数
    /// - `settings`: 已解析单位设置（默认值已应用,收率恒为正）
    /// - `ingredient_lines`: 原料行（按持久化展示顺序）
    /// - `packaging_lines`: 包材行
    ///
    /// # 返回
    /// 成本分解结果。成本未知的行按 0 计入小计并追加警告;
    /// 零成本与未知成本语义不同,零成本不产生警告。
    pub fn compute_breakdown(
        &self,
        settings: &UnitSettings,
        ingredient_lines: &[FormulationIngredientLine],
        packaging_lines: &[FormulationPackagingLine],
    ) -> CostBreakdown {
        // 1. 原料行逐行核算
        let ingredients: Vec<IngredientCostLine> = ingredient_lines
            .iter()
            .map(|line| self.compute_ingredient_line(line, settings))
            .collect();

        // 2. 包材行逐行核算
        let packaging: Vec<PackagingCostLine> = packaging_lines
            .iter()
            .map(|line| self.compute_packaging_line(line))
            .collect();

        // 3. 汇总
        let total_ingredients_cost: f64 = ingredients.iter().map(|l| l.total_cost).sum();
        let total_packaging_cost: f64 = packaging.iter().map(|l| l.total_cost).sum();
        let total_manufacturing_cost = total_ingredients_cost + total_packaging_cost;

        // 4. 收集警告（保持行项顺序:先原料后包材）
        let warnings: Vec<String> = ingredients
            .iter()
            .filter_map(|l| l.warning.clone())
            .chain(packaging.iter().filter_map(|l| l.warning.clone()))
            .collect();

        CostBreakdown {
            ingredients,
            packaging,
            total_ingredients_cost,
            total_packaging_cost,
            total_manufacturing_cost,
            // 现阶段包装即销售单件,单件成本与总成本同值
            cost_per_unit: total_manufacturing_cost,
            warnings,
            unit_pack_size_value: settings.pack_size_value,
            unit_pack_size_unit: settings.pack_size_unit.clone(),
            process_yield_pct: settings.yield_pct,
        }
    }

    // ==========================================
    // 逐行核算
    // ==========================================

    /// 核算单条原料行
    fn compute_ingredient_line(
        &self,
        line: &FormulationIngredientLine,
        settings: &UnitSettings,
    ) -> IngredientCostLine {
        let quantity_grams = line.quantity_grams(settings);

        let (total_cost, warning) = match line.cost_per_gram {
            Some(cost) => (quantity_grams * cost, None),
            None => (0.0, Some(missing_cost_warning(&line.ingredient_name))),
        };

        IngredientCostLine {
            ingredient_id: line.ingredient_id.clone(),
            ingredient_name: line.ingredient_name.clone(),
            phase: line.phase.clone(),
            percentage: line.percentage,
            quantity_grams,
            cost_per_gram: line.cost_per_gram,
            total_cost,
            warning,
        }
    }

    /// 核算单条包材行
    fn compute_packaging_line(&self, line: &FormulationPackagingLine) -> PackagingCostLine {
        let (total_cost, warning) = match line.cost_per_unit {
            Some(cost) => (line.quantity_per_unit * cost, None),
            None => (0.0, Some(missing_cost_warning(&line.packaging_name))),
        };

        PackagingCostLine {
            packaging_id: line.packaging_id.clone(),
            packaging_name: line.packaging_name.clone(),
            quantity: line.quantity_per_unit,
            cost_per_unit: line.cost_per_unit,
            total_cost,
            warning,
        }
    }
}

/// 缺失成本警告文案（命名行项物料）
fn missing_cost_warning(name: &str) -> String {
    format!("Missing cost for {}", name)
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UnitSettings;

    fn make_settings(
        pack_size: Option<f64>,
        unit: Option<&str>,
        yield_pct: Option<f64>,
    ) -> UnitSettings {
        UnitSettings::resolve(pack_size, unit.map(|s| s.to_string()), yield_pct)
    }

    fn make_ingredient_line(
        id: &str,
        name: &str,
        percentage: f64,
        cost_per_gram: Option<f64>,
        sort_order: i32,
    ) -> FormulationIngredientLine {
        FormulationIngredientLine {
            formulation_id: "F001".to_string(),
            ingredient_id: id.to_string(),
            ingredient_name: name.to_string(),
            phase: Some("A".to_string()),
            percentage,
            sort_order,
            cost_per_gram,
        }
    }

    fn make_packaging_line(
        id: &str,
        name: &str,
        quantity: f64,
        cost_per_unit: Option<f64>,
    ) -> FormulationPackagingLine {
        FormulationPackagingLine {
            formulation_id: "F001".to_string(),
            packaging_id: id.to_string(),
            packaging_name: name.to_string(),
            quantity_per_unit: quantity,
            cost_per_unit,
        }
    }

    #[test]
    fn test_worked_example() {
        // 50g 包装、收率 100%、原料 10% @ 0.02/g、包材 1 件 @ 0.15
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(100.0));

        let ingredient_lines = vec![make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1)];
        let packaging_lines = vec![make_packaging_line("PKG001", "50ml 瓶", 1.0, Some(0.15))];

        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &packaging_lines);

        assert_eq!(breakdown.ingredients[0].quantity_grams, 5.0);
        assert!((breakdown.ingredients[0].total_cost - 0.10).abs() < 1e-9);
        assert!((breakdown.packaging[0].total_cost - 0.15).abs() < 1e-9);
        assert!((breakdown.total_manufacturing_cost - 0.25).abs() < 1e-9);
        assert_eq!(breakdown.cost_per_unit, breakdown.total_manufacturing_cost);
        assert!(breakdown.warnings.is_empty());
    }

    #[test]
    fn test_zero_pack_size_collapses_ingredient_costs() {
        let engine = CostEngine::new();
        let settings = make_settings(Some(0.0), Some("g"), Some(100.0));

        let ingredient_lines = vec![
            make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1),
            make_ingredient_line("ING002", "纯净水", 80.0, Some(0.001), 2),
        ];

        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &[]);

        for line in &breakdown.ingredients {
            assert_eq!(line.quantity_grams, 0.0);
            assert_eq!(line.total_cost, 0.0);
        }
        assert_eq!(breakdown.total_ingredients_cost, 0.0);
        assert!(breakdown.total_manufacturing_cost.is_finite());
    }

    #[test]
    fn test_yield_floor_no_nan_or_infinity() {
        // 收率 0 回退为 100,任何派生字段不得出现 NaN/∞
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(0.0));

        let ingredient_lines = vec![make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1)];
        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &[]);

        assert_eq!(breakdown.process_yield_pct, 100.0);
        assert!(breakdown.ingredients[0].quantity_grams.is_finite());
        assert!(breakdown.total_manufacturing_cost.is_finite());
        assert_eq!(breakdown.ingredients[0].quantity_grams, 5.0);
    }

    #[test]
    fn test_yield_scales_quantity() {
        // 收率 95%: 10% * 50g / 0.95
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(95.0));

        let ingredient_lines = vec![make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1)];
        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &[]);

        let expected = (10.0 / 100.0) * 50.0 / 0.95;
        assert!((breakdown.ingredients[0].quantity_grams - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_cost_warns_and_contributes_zero() {
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(100.0));

        let ingredient_lines = vec![
            make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1),
            make_ingredient_line("ING002", "神秘提取物", 5.0, None, 2),
        ];
        let packaging_lines = vec![make_packaging_line("PKG001", "泵头", 1.0, None)];

        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &packaging_lines);

        // 未知成本行: 按 0 计入,且恰好一条警告命名该物料
        assert_eq!(breakdown.ingredients[1].total_cost, 0.0);
        assert_eq!(breakdown.packaging[0].total_cost, 0.0);
        assert_eq!(breakdown.warnings.len(), 2);
        assert_eq!(breakdown.warnings[0], "Missing cost for 神秘提取物");
        assert_eq!(breakdown.warnings[1], "Missing cost for 泵头");

        // 已知成本行不受影响
        assert!((breakdown.total_manufacturing_cost - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cost_is_not_a_warning() {
        // 零成本与未知成本语义不同:零成本静默计 0
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(100.0));

        let ingredient_lines = vec![make_ingredient_line("ING001", "纯净水", 80.0, Some(0.0), 1)];
        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &[]);

        assert_eq!(breakdown.ingredients[0].total_cost, 0.0);
        assert!(breakdown.warnings.is_empty());
    }

    #[test]
    fn test_aggregation_identity() {
        let engine = CostEngine::new();
        let settings = make_settings(Some(100.0), Some("g"), Some(90.0));

        let ingredient_lines = vec![
            make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1),
            make_ingredient_line("ING002", "乳化剂", 3.5, Some(0.12), 2),
            make_ingredient_line("ING003", "香精", 0.5, None, 3),
        ];
        let packaging_lines = vec![
            make_packaging_line("PKG001", "瓶身", 1.0, Some(0.30)),
            make_packaging_line("PKG002", "外盒", 1.0, Some(0.08)),
        ];

        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &packaging_lines);

        let ing_sum: f64 = breakdown.ingredients.iter().map(|l| l.total_cost).sum();
        let pkg_sum: f64 = breakdown.packaging.iter().map(|l| l.total_cost).sum();

        assert_eq!(breakdown.total_ingredients_cost, ing_sum);
        assert_eq!(breakdown.total_packaging_cost, pkg_sum);
        assert_eq!(
            breakdown.total_manufacturing_cost,
            breakdown.total_ingredients_cost + breakdown.total_packaging_cost
        );
    }

    #[test]
    fn test_line_order_preserved() {
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(100.0));

        let ingredient_lines = vec![
            make_ingredient_line("ING003", "丙", 1.0, Some(0.01), 1),
            make_ingredient_line("ING001", "甲", 2.0, Some(0.01), 2),
            make_ingredient_line("ING002", "乙", 3.0, Some(0.01), 3),
        ];

        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &[]);

        let ids: Vec<&str> = breakdown
            .ingredients
            .iter()
            .map(|l| l.ingredient_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ING003", "ING001", "ING002"]);
    }

    #[test]
    fn test_negative_percentage_propagates() {
        // 负占比不校验,按算术传导（允许冲减行）
        let engine = CostEngine::new();
        let settings = make_settings(Some(50.0), Some("g"), Some(100.0));

        let ingredient_lines = vec![
            make_ingredient_line("ING001", "甘油", 10.0, Some(0.02), 1),
            make_ingredient_line("ING002", "冲减", -2.0, Some(0.02), 2),
        ];

        let breakdown = engine.compute_breakdown(&settings, &ingredient_lines, &[]);

        assert_eq!(breakdown.ingredients[1].quantity_grams, -1.0);
        assert!((breakdown.ingredients[1].total_cost - (-0.02)).abs() < 1e-9);
        assert!(
            (breakdown.total_ingredients_cost - (0.10 - 0.02)).abs() < 1e-9
        );
    }

    #[test]
    fn test_empty_formulation_yields_zero_totals() {
        let engine = CostEngine::new();
        let settings = make_settings(None, None, None);

        let breakdown = engine.compute_breakdown(&settings, &[], &[]);

        assert_eq!(breakdown.line_count(), 0);
        assert_eq!(breakdown.total_manufacturing_cost, 0.0);
        assert!(!breakdown.has_missing_costs());
        // 单位设置回显为默认值
        assert_eq!(breakdown.unit_pack_size_value, 0.0);
        assert_eq!(breakdown.unit_pack_size_unit, "g");
        assert_eq!(breakdown.process_yield_pct, 100.0);
    }
}
