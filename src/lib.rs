// ==========================================
// 订单履约承诺系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 订单分配决策引擎 (每单唯一终态,副作用原子提交)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问 + 分配提交器
pub mod repository;

// 配置层 - 业务规则解析
pub mod config;

// 引擎层 - 分配策略评估
pub mod engine;

// API 层 - 对外边界操作
pub mod api;

// 应用层 - 状态装配
pub mod app;

// 数据库基础设施(连接初始化/PRAGMA 统一/建库)
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AllocationDecision, AvailableSupply, FulfillmentSource, InboundSupply, InventoryPosition,
    Order, OrderStatus, PolicyRule, ReplenishmentLock, RuleScope, RuleValue,
};

// 引擎
pub use engine::{AllocationEvaluator, EvaluationResult, EvaluatorCore, StageOutcome};

// 配置
pub use config::RuleResolver;

// API
pub use api::{AllocationRequest, AllocationResponse, PromisingApi};

/// 库版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
