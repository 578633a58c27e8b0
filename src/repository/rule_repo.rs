// ==========================================
// 订单履约承诺系统 - 业务规则仓储
// ==========================================
// 红线: Repository 不含业务逻辑(优先级判定在 RuleResolver)
// 职责: policy_rules 表的候选规则扫描
// ==========================================

use crate::domain::types::RuleScope;
use crate::domain::PolicyRule;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 业务规则仓储
pub struct PolicyRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PolicyRuleRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 扫描候选规则: 指定规则名下,命中该 SKU 的 ITEM 规则 + 全部 GLOBAL 规则
    ///
    /// 按 rule_id 升序返回,同层多条候选时由解析器取第一条,保证确定性。
    pub fn find_candidates(
        &self,
        rule_name: &str,
        sku: &str,
    ) -> RepositoryResult<Vec<PolicyRule>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT rule_id, rule_name, scope, sku, start_date, end_date, value
            FROM policy_rules
            WHERE rule_name = ?1
              AND (scope = 'GLOBAL' OR (scope = 'ITEM' AND sku = ?2))
            ORDER BY rule_id
            "#,
        )?;

        let rows = stmt.query_map(params![rule_name, sku], |row| {
            let scope_raw: String = row.get(2)?;
            let start_raw: Option<String> = row.get(4)?;
            let end_raw: Option<String> = row.get(5)?;

            Ok(PolicyRule {
                rule_id: row.get(0)?,
                rule_name: row.get(1)?,
                scope: RuleScope::from_str(&scope_raw).unwrap_or(RuleScope::Global),
                sku: row.get(3)?,
                start_date: start_raw
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                end_date: end_raw
                    .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
                value: row.get(6)?,
            })
        })?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row?);
        }

        Ok(rules)
    }

    /// 插入业务规则(种子数据与维护入口)
    pub fn insert(&self, rule: &PolicyRule) -> RepositoryResult<()> {
        if rule.scope == RuleScope::Item && rule.sku.is_none() {
            return Err(RepositoryError::FieldValueError {
                field: "sku".to_string(),
                message: "ITEM 作用域的规则必须指定 sku".to_string(),
            });
        }

        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO policy_rules (rule_id, rule_name, scope, sku, start_date, end_date, value)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                rule.rule_id,
                rule.rule_name,
                rule.scope.to_string(),
                rule.sku,
                rule.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
                rule.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
                rule.value,
            ],
        )?;

        Ok(())
    }
}
