// ==========================================
// 配方成本核算系统 - 导入层
// ==========================================
// 职责: 外部数据导入,生成内部数据
// 支持: CSV 价格清单
// ==========================================

pub mod error;
pub mod price_list_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use price_list_importer::{
    PriceImportSummary, PriceItemKind, PriceListImporter, PriceRowViolation, ViolationLevel,
};
