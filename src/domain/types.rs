// ==========================================
// 配方成本核算系统 - 单位设置与默认值
// ==========================================
// 职责: 定义成本核算的单位设置值对象与统一默认值表
// 红线: 默认值只在读取入口处一次性解析,算术过程不再判空
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// UnitSettingDefaults - 单位设置默认值表
// ==========================================
// 用途: 配方字段缺失时的统一回退值
// 约束: yield_pct 默认值兼做除零保护,任何情况下分母不为零
#[derive(Debug, Clone, Copy)]
pub struct UnitSettingDefaults {
    pub pack_size_value: f64,
    pub pack_size_unit: &'static str,
    pub yield_pct: f64,
}

/// 统一默认值表
///
/// - 单位包装规格缺失按 0 处理（所有用量退化为 0,不报错）
/// - 单位标签缺失按克（"g"）处理
/// - 工艺收率缺失或为 0 按 100% 处理
pub const UNIT_SETTING_DEFAULTS: UnitSettingDefaults = UnitSettingDefaults {
    pack_size_value: 0.0,
    pack_size_unit: "g",
    yield_pct: 100.0,
};

// ==========================================
// UnitSettings - 已解析的单位设置
// ==========================================
// 用途: 成本引擎的计算输入,字段均为已回退后的有效值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSettings {
    /// 单位包装规格数值（成品单件大小）
    pub pack_size_value: f64,

    /// 单位包装规格单位标签（如 g / ml）
    pub pack_size_unit: String,

    /// 工艺收率百分比,(0, 100] 有效;解析后恒为正
    pub yield_pct: f64,
}

impl UnitSettings {
    /// 从数据库原始字段解析单位设置,一次性应用默认值表
    ///
    /// # 参数
    /// - `pack_size_value`: 原始包装规格数值（可空）
    /// - `pack_size_unit`: 原始单位标签（可空）
    /// - `yield_pct`: 原始工艺收率（可空）
    ///
    /// # 说明
    /// 收率为空、为 0、为负或 NaN 时一律回退到默认值,
    /// 保证后续除法分母恒为正。
    pub fn resolve(
        pack_size_value: Option<f64>,
        pack_size_unit: Option<String>,
        yield_pct: Option<f64>,
    ) -> Self {
        let resolved_yield = match yield_pct {
            Some(y) if y > 0.0 && y.is_finite() => y,
            _ => UNIT_SETTING_DEFAULTS.yield_pct,
        };

        Self {
            pack_size_value: pack_size_value
                .filter(|v| v.is_finite())
                .unwrap_or(UNIT_SETTING_DEFAULTS.pack_size_value),
            pack_size_unit: pack_size_unit
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| UNIT_SETTING_DEFAULTS.pack_size_unit.to_string()),
            yield_pct: resolved_yield,
        }
    }

    /// 收率系数（yield_pct / 100）,恒为正
    pub fn yield_factor(&self) -> f64 {
        self.yield_pct / 100.0
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_all_absent_falls_back_to_defaults() {
        let settings = UnitSettings::resolve(None, None, None);

        assert_eq!(settings.pack_size_value, 0.0);
        assert_eq!(settings.pack_size_unit, "g");
        assert_eq!(settings.yield_pct, 100.0);
    }

    #[test]
    fn test_resolve_zero_yield_falls_back_to_100() {
        let settings = UnitSettings::resolve(Some(50.0), Some("g".to_string()), Some(0.0));

        assert_eq!(settings.yield_pct, 100.0);
        assert!(settings.yield_factor() > 0.0);
    }

    #[test]
    fn test_resolve_negative_and_nan_yield_fall_back() {
        let negative = UnitSettings::resolve(None, None, Some(-5.0));
        assert_eq!(negative.yield_pct, 100.0);

        let nan = UnitSettings::resolve(None, None, Some(f64::NAN));
        assert_eq!(nan.yield_pct, 100.0);
    }

    #[test]
    fn test_resolve_blank_unit_falls_back() {
        let settings = UnitSettings::resolve(Some(50.0), Some("  ".to_string()), Some(95.0));

        assert_eq!(settings.pack_size_unit, "g");
        assert_eq!(settings.yield_pct, 95.0);
    }

    #[test]
    fn test_resolve_keeps_valid_values() {
        let settings = UnitSettings::resolve(Some(50.0), Some("ml".to_string()), Some(95.0));

        assert_eq!(settings.pack_size_value, 50.0);
        assert_eq!(settings.pack_size_unit, "ml");
        assert_eq!(settings.yield_pct, 95.0);
    }
}
