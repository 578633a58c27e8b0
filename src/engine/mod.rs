// ==========================================
// 订单履约承诺系统 - 引擎层
// ==========================================
// 职责: 实现分配决策引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod evaluator;
pub mod evaluator_core;

// 重导出核心引擎
pub use evaluator::{AllocationEvaluator, EvaluationResult};
pub use evaluator_core::{EvaluatorCore, StageOutcome, StageResult};
