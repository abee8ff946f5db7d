// ==========================================
// 配方成本核算系统 - 操作日志领域模型
// ==========================================
// 职责: 记录所有写操作的审计轨迹
// 红线: 所有操作必须可解释,payload 保留原始参数
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 操作类型常量
// ==========================================
/// 单位设置更新
pub const ACTION_UPDATE_UNIT_SETTINGS: &str = "UPDATE_UNIT_SETTINGS";
/// 成本缓存重算回写
pub const ACTION_RECALC_TOTAL_COST: &str = "RECALC_TOTAL_COST";
/// 价格清单导入
pub const ACTION_IMPORT_PRICE_LIST: &str = "IMPORT_PRICE_LIST";

// ==========================================
// ActionLog - 操作日志
// ==========================================
// 对齐: schema v0.1 action_log 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// 日志ID（UUID v4）
    pub action_id: String,

    /// 关联配方ID（与配方无关的操作为 NULL）
    pub formulation_id: Option<String>,

    /// 操作类型（见本模块常量）
    pub action_type: String,

    /// 操作时间（本地时间）
    pub action_ts: NaiveDateTime,

    /// 操作人/系统标识
    pub actor: String,

    /// 操作参数（JSON,可解释性）
    pub payload_json: Option<serde_json::Value>,

    /// 可读描述
    pub detail: Option<String>,
}

impl ActionLog {
    /// 创建一条新日志（自动生成 ID 与时间戳）
    pub fn record(
        formulation_id: Option<String>,
        action_type: &str,
        actor: &str,
        payload_json: Option<serde_json::Value>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            formulation_id,
            action_type: action_type.to_string(),
            action_ts: chrono::Local::now().naive_local(),
            actor: actor.to_string(),
            payload_json,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_fills_id_and_timestamp() {
        let log = ActionLog::record(
            Some("F001".to_string()),
            ACTION_RECALC_TOTAL_COST,
            "tester",
            Some(serde_json::json!({ "total": 0.25 })),
            None,
        );

        assert!(!log.action_id.is_empty());
        assert_eq!(log.action_type, "RECALC_TOTAL_COST");
        assert_eq!(log.formulation_id.as_deref(), Some("F001"));
    }
}
