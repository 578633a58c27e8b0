// ==========================================
// 订单履约承诺系统 - 业务规则解析器
// ==========================================
// 职责: 按三层优先级解析命名策略参数
// 优先级: 带日期的 ITEM 规则 > 无日期的 ITEM 规则 > GLOBAL 规则
// 红线: 同层多条候选按 rule_id 升序取第一条,保证确定性
// ==========================================

use crate::domain::types::{RuleScope, RuleValue};
use crate::repository::rule_repo::PolicyRuleRepository;
use crate::repository::RepositoryResult;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, instrument};

// ==========================================
// 规则名常量
// ==========================================

/// 补货窗口天数(安全库存借用阶段使用)
pub const RULE_REPLENISH_WINDOW_DAYS: &str = "REPLENISH_WINDOW_DAYS";

/// 是否允许无补货保障的冒险借用
pub const RULE_ALLOW_RISKY_DEPLETION: &str = "ALLOW_RISKY_DEPLETION";

/// 补货窗口默认值(天)
pub const DEFAULT_REPLENISH_WINDOW_DAYS: i64 = 7;

// ==========================================
// RuleResolver - 业务规则解析器
// ==========================================
pub struct RuleResolver {
    rule_repo: Arc<PolicyRuleRepository>,
}

impl RuleResolver {
    /// 创建新的规则解析器
    pub fn new(rule_repo: Arc<PolicyRuleRepository>) -> Self {
        Self { rule_repo }
    }

    /// 按优先级解析规则值
    ///
    /// 三层优先级,首个命中即返回:
    /// 1. ITEM 规则(本 SKU),带至少一个日期边界且窗口包含 today
    ///    (缺失的边界视为开放端)
    /// 2. ITEM 规则(本 SKU),无任何日期边界(无条件生效)
    /// 3. GLOBAL 规则(GLOBAL 规则上的日期字段被忽略)
    ///
    /// # 返回
    /// - Ok(Some(RuleValue)): 命中的规则值(宽松解析)
    /// - Ok(None): 无任何命中,调用方自行取默认值
    #[instrument(skip(self), fields(rule_name = %rule_name, sku = %sku))]
    pub fn resolve(
        &self,
        rule_name: &str,
        sku: &str,
        today: NaiveDate,
    ) -> RepositoryResult<Option<RuleValue>> {
        // 候选已按 rule_id 升序排列
        let candidates = self.rule_repo.find_candidates(rule_name, sku)?;

        // 第一层: 带日期且窗口包含 today 的 ITEM 规则
        for rule in &candidates {
            if rule.scope == RuleScope::Item
                && rule.has_date_bounds()
                && rule.window_contains(today)
            {
                debug!(rule_id = %rule.rule_id, tier = 1, "规则命中");
                return Ok(Some(rule.parsed_value()));
            }
        }

        // 第二层: 无日期的 ITEM 规则
        for rule in &candidates {
            if rule.scope == RuleScope::Item && !rule.has_date_bounds() {
                debug!(rule_id = %rule.rule_id, tier = 2, "规则命中");
                return Ok(Some(rule.parsed_value()));
            }
        }

        // 第三层: GLOBAL 规则(日期字段不参与过滤)
        for rule in &candidates {
            if rule.scope == RuleScope::Global {
                debug!(rule_id = %rule.rule_id, tier = 3, "规则命中");
                return Ok(Some(rule.parsed_value()));
            }
        }

        Ok(None)
    }

    /// 解析补货窗口天数
    ///
    /// 规则缺失或值非整数时回退为默认值 7 天
    pub fn replenish_window_days(&self, sku: &str, today: NaiveDate) -> RepositoryResult<i64> {
        let days = self
            .resolve(RULE_REPLENISH_WINDOW_DAYS, sku, today)?
            .and_then(|v| v.as_int())
            .unwrap_or(DEFAULT_REPLENISH_WINDOW_DAYS);
        Ok(days)
    }

    /// 解析是否允许冒险借用安全库存
    ///
    /// 规则缺失时默认 false
    pub fn allow_risky_depletion(&self, sku: &str, today: NaiveDate) -> RepositoryResult<bool> {
        let allowed = self
            .resolve(RULE_ALLOW_RISKY_DEPLETION, sku, today)?
            .map(|v| v.is_truthy())
            .unwrap_or(false);
        Ok(allowed)
    }
}
