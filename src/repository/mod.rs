// ==========================================
// 订单履约承诺系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod allocation_repo;
pub mod error;
pub mod inventory_repo;
pub mod lock_repo;
pub mod order_repo;
pub mod rule_repo;
pub mod supply_repo;

// 重导出核心仓储
pub use allocation_repo::AllocationCommitter;
pub use error::{RepositoryError, RepositoryResult};
pub use inventory_repo::InventoryRepository;
pub use lock_repo::ReplenishmentLockRepository;
pub use order_repo::OrderRepository;
pub use rule_repo::PolicyRuleRepository;
pub use supply_repo::InboundSupplyRepository;
