// ==========================================
// 配方成本核算系统 - 价格清单导入器
// ==========================================
// 职责: 批量导入原料/包材成本（CSV）
// 流程: 解析 → 行级校验 → upsert → 汇总报告
// 红线: 阻断行绝不部分写入;空成本按"未知成本"导入并记警告
// ==========================================
// CSV 列约定: item_type,item_id,name,cost
//   item_type: INGREDIENT / PACKAGING（不区分大小写）
//   cost: 空单元格 = 成本未知（NULL）
// ==========================================

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{Ingredient, Packaging};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::catalog_repo::{IngredientRepository, PackagingRepository};

// ==========================================
// 行级校验结构
// ==========================================

/// 违规级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationLevel {
    Error,   // 错误（阻断该行）
    Warning, // 警告（允许导入）
}

/// 行级违规记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRowViolation {
    pub row_number: usize,   // 原始文件行号（数据行从 1 计）
    pub level: ViolationLevel,
    pub field: String,       // 违规字段
    pub message: String,     // 违规描述
}

/// 导入汇总报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceImportSummary {
    pub total_rows: usize,   // 总数据行数
    pub success_rows: usize, // 成功导入行数
    pub blocked_rows: usize, // 阻断行数（ERROR）
    pub warning_rows: usize, // 带警告导入行数
    pub violations: Vec<PriceRowViolation>, // 违规明细
}

// ==========================================
// PriceListImporter - 价格清单导入器
// ==========================================

/// 价格清单导入器
pub struct PriceListImporter {
    ingredient_repo: Arc<IngredientRepository>,
    packaging_repo: Arc<PackagingRepository>,
}

impl PriceListImporter {
    /// 创建新的价格清单导入器
    pub fn new(
        ingredient_repo: Arc<IngredientRepository>,
        packaging_repo: Arc<PackagingRepository>,
    ) -> Self {
        Self {
            ingredient_repo,
            packaging_repo,
        }
    }

    /// 从文件导入价格清单
    ///
    /// # 参数
    /// - file_path: CSV 文件路径
    ///
    /// # 返回
    /// - Ok(PriceImportSummary): 导入汇总报告
    /// - Err(ImportError): 文件级或数据库级失败,整体中止
    pub fn import_file(&self, file_path: &str) -> ImportResult<PriceImportSummary> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Err(ImportError::FileNotFound(file_path.to_string()));
        }

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ImportError::UnsupportedFormat(file_path.to_string()));
        }

        let file = std::fs::File::open(path)
            .map_err(|e| ImportError::FileReadError(e.to_string()))?;

        let summary = self.import_reader(file)?;

        tracing::info!(
            "价格清单导入完成: file={}, total={}, success={}, blocked={}",
            file_path,
            summary.total_rows,
            summary.success_rows,
            summary.blocked_rows
        );

        Ok(summary)
    }

    /// 从任意读取器导入价格清单（测试与内存数据复用入口）
    pub fn import_reader<R: Read>(&self, reader: R) -> ImportResult<PriceImportSummary> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut summary = PriceImportSummary {
            total_rows: 0,
            success_rows: 0,
            blocked_rows: 0,
            warning_rows: 0,
            violations: Vec::new(),
        };

        for (idx, record) in csv_reader.records().enumerate() {
            let row_number = idx + 1;
            summary.total_rows += 1;

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    summary.blocked_rows += 1;
                    summary.violations.push(PriceRowViolation {
                        row_number,
                        level: ViolationLevel::Error,
                        field: "*".to_string(),
                        message: format!("CSV 行解析失败: {}", e),
                    });
                    continue;
                }
            };

            match self.import_row(row_number, &record, &mut summary.violations)? {
                RowOutcome::Imported { with_warning } => {
                    summary.success_rows += 1;
                    if with_warning {
                        summary.warning_rows += 1;
                    }
                }
                RowOutcome::Blocked => summary.blocked_rows += 1,
            }
        }

        Ok(summary)
    }

    /// 校验并导入单行;数据库错误向上传播,校验问题记入 violations
    fn import_row(
        &self,
        row_number: usize,
        record: &csv::StringRecord,
        violations: &mut Vec<PriceRowViolation>,
    ) -> ImportResult<RowOutcome> {
        let item_type = record.get(0).unwrap_or("").trim();
        let item_id = record.get(1).unwrap_or("").trim();
        let name = record.get(2).unwrap_or("").trim();
        let cost_raw = record.get(3).unwrap_or("").trim();

        // 主键缺失: 阻断
        if item_id.is_empty() {
            violations.push(PriceRowViolation {
                row_number,
                level: ViolationLevel::Error,
                field: "item_id".to_string(),
                message: "主键缺失: item_id 为空".to_string(),
            });
            return Ok(RowOutcome::Blocked);
        }

        // 物料类型: 阻断
        let kind = match PriceItemKind::parse(item_type) {
            Some(k) => k,
            None => {
                violations.push(PriceRowViolation {
                    row_number,
                    level: ViolationLevel::Error,
                    field: "item_type".to_string(),
                    message: format!(
                        "物料类型无效: {}（期望 INGREDIENT / PACKAGING）",
                        item_type
                    ),
                });
                return Ok(RowOutcome::Blocked);
            }
        };

        let mut with_warning = false;

        // 名称缺失: 警告,以 item_id 代用
        let resolved_name = if name.is_empty() {
            violations.push(PriceRowViolation {
                row_number,
                level: ViolationLevel::Warning,
                field: "name".to_string(),
                message: format!("名称为空,以 item_id 代用: {}", item_id),
            });
            with_warning = true;
            item_id.to_string()
        } else {
            name.to_string()
        };

        // 成本: 空单元格 = 未知成本（NULL）,记警告;无法解析为数值则阻断
        let cost: Option<f64> = if cost_raw.is_empty() {
            violations.push(PriceRowViolation {
                row_number,
                level: ViolationLevel::Warning,
                field: "cost".to_string(),
                message: format!("成本为空,按未知成本导入: {}", item_id),
            });
            with_warning = true;
            None
        } else {
            match cost_raw.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    violations.push(PriceRowViolation {
                        row_number,
                        level: ViolationLevel::Error,
                        field: "cost".to_string(),
                        message: format!("成本无法解析为数值: {}", cost_raw),
                    });
                    return Ok(RowOutcome::Blocked);
                }
            }
        };

        // 落库（数据库错误整体中止导入）
        match kind {
            PriceItemKind::Ingredient => {
                let mut ingredient = Ingredient::new(item_id.to_string(), resolved_name);
                ingredient.cost_per_gram = cost;
                self.ingredient_repo.upsert(&ingredient)?;
            }
            PriceItemKind::Packaging => {
                let mut packaging = Packaging::new(item_id.to_string(), resolved_name);
                packaging.cost_per_unit = cost;
                self.packaging_repo.upsert(&packaging)?;
            }
        }

        Ok(RowOutcome::Imported { with_warning })
    }
}

/// 单行导入结果
enum RowOutcome {
    Imported { with_warning: bool },
    Blocked,
}

// ==========================================
// PriceItemKind - 价格清单物料类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceItemKind {
    Ingredient,
    Packaging,
}

impl PriceItemKind {
    /// 解析物料类型列（不区分大小写）
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "INGREDIENT" => Some(PriceItemKind::Ingredient),
            "PACKAGING" => Some(PriceItemKind::Packaging),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_kind() {
        assert_eq!(
            PriceItemKind::parse("ingredient"),
            Some(PriceItemKind::Ingredient)
        );
        assert_eq!(
            PriceItemKind::parse("PACKAGING"),
            Some(PriceItemKind::Packaging)
        );
        assert_eq!(PriceItemKind::parse("material"), None);
    }
}
