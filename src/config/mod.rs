// ==========================================
// 订单履约承诺系统 - 配置层
// ==========================================
// 职责: 策略参数解析(数据库驻留的业务规则)
// ==========================================

pub mod rule_resolver;

// 重导出核心类型
pub use rule_resolver::{
    RuleResolver, DEFAULT_REPLENISH_WINDOW_DAYS, RULE_ALLOW_RISKY_DEPLETION,
    RULE_REPLENISH_WINDOW_DAYS,
};
