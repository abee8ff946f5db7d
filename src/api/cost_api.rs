// ==========================================
// 配方成本核算系统 - 成本核算 API
// ==========================================
// 职责: 配方成本计算、缓存回写、单位设置维护
// 红线: 读失败整体中止,绝不返回部分成本分解
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::CostPolicy;
use crate::domain::action_log::{
    ActionLog, ACTION_RECALC_TOTAL_COST, ACTION_UPDATE_UNIT_SETTINGS,
};
use crate::domain::cost::CostBreakdown;
use crate::engine::CostEngine;
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::formulation_repo::FormulationRepository;
use crate::repository::line_repo::{
    FormulationIngredientLineRepository, FormulationPackagingLineRepository,
};

// ==========================================
// CostApi - 成本核算 API
// ==========================================

/// 成本核算API
///
/// 职责：
/// 1. 按需计算配方成本分解（配方不存在返回 None,不报错）
/// 2. 成本缓存回写（仅覆盖 cached_total_cost 一个字段）
/// 3. 单位设置维护（写入后级联重算,级联失败按策略处理）
/// 4. ActionLog记录
pub struct CostApi {
    formulation_repo: Arc<FormulationRepository>,
    ingredient_line_repo: Arc<FormulationIngredientLineRepository>,
    packaging_line_repo: Arc<FormulationPackagingLineRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    engine: CostEngine,
    policy: CostPolicy,
}

impl CostApi {
    /// 创建新的CostApi实例（出厂策略）
    pub fn new(
        formulation_repo: Arc<FormulationRepository>,
        ingredient_line_repo: Arc<FormulationIngredientLineRepository>,
        packaging_line_repo: Arc<FormulationPackagingLineRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self::with_policy(
            formulation_repo,
            ingredient_line_repo,
            packaging_line_repo,
            action_log_repo,
            CostPolicy::default(),
        )
    }

    /// 创建CostApi实例并指定策略
    pub fn with_policy(
        formulation_repo: Arc<FormulationRepository>,
        ingredient_line_repo: Arc<FormulationIngredientLineRepository>,
        packaging_line_repo: Arc<FormulationPackagingLineRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        policy: CostPolicy,
    ) -> Self {
        Self {
            formulation_repo,
            ingredient_line_repo,
            packaging_line_repo,
            action_log_repo,
            engine: CostEngine::new(),
            policy,
        }
    }

    /// 计算配方成本分解
    ///
    /// # 参数
    /// - formulation_id: 配方ID
    ///
    /// # 返回
    /// - Ok(Some(CostBreakdown)): 完整成本分解（可能携带缺失成本警告）
    /// - Ok(None): 配方不存在（调用方按"无成本数据"处理,不是故障）
    /// - Err(ApiError): 数据访问失败,整体中止
    pub fn calculate_formulation_cost(
        &self,
        formulation_id: &str,
    ) -> ApiResult<Option<CostBreakdown>> {
        if formulation_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("配方ID不能为空".to_string()));
        }

        // 1. 配方单位设置
        let formulation = match self.formulation_repo.find_by_id(formulation_id)? {
            Some(f) => f,
            None => return Ok(None),
        };
        let settings = formulation.unit_settings();

        // 2. 原料行（持久化展示顺序,JOIN 带出名称与成本）
        let ingredient_lines = self
            .ingredient_line_repo
            .find_by_formulation(formulation_id)?;

        // 3. 包材行
        let packaging_lines = self
            .packaging_line_repo
            .find_by_formulation(formulation_id)?;

        // 4. 纯计算
        let breakdown = self
            .engine
            .compute_breakdown(&settings, &ingredient_lines, &packaging_lines);

        if breakdown.has_missing_costs() {
            tracing::warn!(
                "配方{}存在{}条缺失成本行项",
                formulation_id,
                breakdown.warnings.len()
            );
        }

        Ok(Some(breakdown))
    }

    /// 重算并回写配方成本缓存
    ///
    /// # 参数
    /// - formulation_id: 配方ID
    /// - operator: 操作人/系统标识
    ///
    /// # 返回
    /// - Ok(true): 重算并回写成功
    /// - Ok(false): 配方不存在,未发生任何写入
    /// - Err(ApiError): 读或写失败
    ///
    /// # 副作用
    /// 仅覆盖一个配方记录的 cached_total_cost 一个字段,不触碰其他实体
    pub fn update_formulation_cost(
        &self,
        formulation_id: &str,
        operator: &str,
    ) -> ApiResult<bool> {
        let breakdown = match self.calculate_formulation_cost(formulation_id)? {
            Some(b) => b,
            None => {
                tracing::warn!("配方{}不存在,跳过成本缓存回写", formulation_id);
                return Ok(false);
            }
        };

        let affected = self
            .formulation_repo
            .update_cached_total_cost(formulation_id, breakdown.total_manufacturing_cost)?;
        if affected == 0 {
            // 读取与回写之间配方被删除
            tracing::warn!("配方{}在重算期间被删除,回写未生效", formulation_id);
            return Ok(false);
        }

        tracing::info!(
            "配方{}成本缓存已回写: total={}",
            formulation_id,
            self.policy.format_line_cost(breakdown.total_manufacturing_cost)
        );

        // 记录ActionLog（审计失败不阻断业务结果）
        let action_log = ActionLog::record(
            Some(formulation_id.to_string()),
            ACTION_RECALC_TOTAL_COST,
            operator,
            Some(serde_json::json!({
                "total_manufacturing_cost": breakdown.total_manufacturing_cost,
                "total_ingredients_cost": breakdown.total_ingredients_cost,
                "total_packaging_cost": breakdown.total_packaging_cost,
                "missing_cost_lines": breakdown.warnings.len(),
            })),
            Some(format!(
                "重算成本缓存: {} = {}",
                formulation_id,
                self.policy.format_line_cost(breakdown.total_manufacturing_cost)
            )),
        );
        if let Err(e) = self.action_log_repo.insert(&action_log) {
            tracing::warn!("记录成本重算操作日志失败: {}", e);
        }

        Ok(true)
    }

    /// 更新配方单位设置并级联重算成本缓存
    ///
    /// # 参数
    /// - formulation_id: 配方ID
    /// - pack_size_value: 单位包装规格数值（可写空）
    /// - pack_size_unit: 单位标签（可写空）
    /// - yield_pct: 工艺收率百分比（可写空）
    /// - operator: 操作人/系统标识
    ///
    /// # 返回
    /// - Ok(true): 设置写入成功（级联重算失败时仍为 true,见策略说明）
    /// - Ok(false): 配方不存在,未发生任何写入
    /// - Err(ApiError): 设置写入失败
    ///
    /// # 说明
    /// 三个设置字段整体覆盖;数值不做范围校验,负值按算术传导。
    /// 设置写入成功后无条件触发成本重算;重算失败按
    /// `CostPolicy::cascade_failure_is_non_fatal` 处理（默认只告警,
    /// 设置保存仍报成功,缓存留待下次重算刷新）。
    pub fn update_formulation_unit_settings(
        &self,
        formulation_id: &str,
        pack_size_value: Option<f64>,
        pack_size_unit: Option<&str>,
        yield_pct: Option<f64>,
        operator: &str,
    ) -> ApiResult<bool> {
        if formulation_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("配方ID不能为空".to_string()));
        }

        let affected = self.formulation_repo.update_unit_settings(
            formulation_id,
            pack_size_value,
            pack_size_unit,
            yield_pct,
        )?;
        if affected == 0 {
            return Ok(false);
        }

        // 记录ActionLog（审计失败不阻断业务结果）
        let action_log = ActionLog::record(
            Some(formulation_id.to_string()),
            ACTION_UPDATE_UNIT_SETTINGS,
            operator,
            Some(serde_json::json!({
                "unit_pack_size_value": pack_size_value,
                "unit_pack_size_unit": pack_size_unit,
                "process_yield_pct": yield_pct,
            })),
            Some(format!("更新单位设置: {}", formulation_id)),
        );
        if let Err(e) = self.action_log_repo.insert(&action_log) {
            tracing::warn!("记录单位设置更新操作日志失败: {}", e);
        }

        // 级联重算成本缓存
        match self.update_formulation_cost(formulation_id, operator) {
            Ok(_) => {}
            Err(e) => {
                if self.policy.cascade_failure_is_non_fatal {
                    tracing::warn!("单位设置更新后级联成本重算失败: {}", e);
                } else {
                    return Err(e);
                }
            }
        }

        Ok(true)
    }
}
