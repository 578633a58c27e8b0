// ==========================================
// 订单履约承诺系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod inventory;
pub mod order;
pub mod rule;
pub mod supply;
pub mod types;

// 重导出核心类型
pub use inventory::InventoryPosition;
pub use order::{AllocationDecision, Order};
pub use rule::PolicyRule;
pub use supply::{AvailableSupply, InboundSupply, ReplenishmentLock};
pub use types::{
    FulfillmentSource, OrderStatus, RuleScope, RuleValue, ASN_STATUS_CLOSED,
    ASN_STATUS_IN_TRANSIT,
};
