// ==========================================
// 订单履约承诺系统 - 业务规则实体
// ==========================================
// 职责: 规则行定义 + 生效窗口判定
// 红线: 规则对引擎只读
// ==========================================

use crate::domain::types::{RuleScope, RuleValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 业务规则
///
/// 业务身份 = (rule_name, scope, sku); rule_id 为合成主键,
/// 同层多条候选时按 rule_id 升序取第一条,保证决策确定性。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub rule_id: String,
    pub rule_name: String,
    pub scope: RuleScope,
    /// scope = ITEM 时必填,GLOBAL 时为 None
    pub sku: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub value: String,
}

impl PolicyRule {
    /// 创建无日期边界的规则(rule_id 为合成 UUID)
    pub fn new(rule_name: &str, scope: RuleScope, sku: Option<&str>, value: &str) -> Self {
        Self {
            rule_id: Uuid::new_v4().to_string(),
            rule_name: rule_name.to_string(),
            scope,
            sku: sku.map(|s| s.to_string()),
            start_date: None,
            end_date: None,
            value: value.to_string(),
        }
    }

    /// 设置生效窗口(任一边界可缺省,缺省端视为开放)
    pub fn with_window(mut self, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// 是否带有至少一个日期边界
    pub fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// 日期窗口是否包含指定日期
    ///
    /// 缺失的边界视为开放端:
    /// - 仅 start_date: start_date <= today 即永久向后生效
    /// - 仅 end_date: today <= end_date 即永久向前生效
    /// - 两者都有: start_date <= today <= end_date
    pub fn window_contains(&self, today: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if today < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if today > end {
                return false;
            }
        }
        true
    }

    /// 宽松解析规则值
    pub fn parsed_value(&self) -> RuleValue {
        RuleValue::parse(&self.value)
    }
}
