// ==========================================
// 订单履约承诺系统 - 分配提交器
// ==========================================
// 职责: 在单个事务内施加分配决策的全部副作用
//       (库存扣减 + 补货锁定 + 订单终态)
// 红线: 副作用要么全部落库,要么全部回滚,绝不部分提交
// 约束: 扣减与锁定均带守卫校验,防止并发订单超分配/超锁定
// ==========================================

use crate::domain::types::OrderStatus;
use crate::domain::{AllocationDecision, ReplenishmentLock};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// 分配提交器
///
/// 分配副作用矩阵:
///
/// | 策略 | 现有量扣减 | 补货锁定 | 订单终态 |
/// |---|---|---|---|
/// | FREE_STOCK | -qty | 无 | ALLOCATED |
/// | SS_RISKY | -qty | 无 | ALLOCATED |
/// | SS_BORROW_WITH_REPLENISH | -qty | qty 锁定至 asn_id | ALLOCATED |
/// | DIRECT_INBOUND | 无 | 无 | ALLOCATED |
pub struct AllocationCommitter {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationCommitter {
    /// 从已有连接创建提交器实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 提交分配决策(原子事务)
    ///
    /// # 参数
    /// - order_id: 订单 ID
    /// - sku: 物料 SKU
    /// - decision: 评估器产出的分配决策
    ///
    /// # 失败语义
    /// 事务内任一步失败即整体回滚并向调用方传播错误,订单保持原状态。
    /// 核心不做重试,重新调用是唯一的恢复路径。
    #[instrument(skip(self, decision), fields(order_id = %order_id, sku = %sku, strategy = %decision.strategy))]
    pub fn commit(
        &self,
        order_id: &str,
        sku: &str,
        decision: &AllocationDecision,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        // === 步骤 1: 库存扣减(带守卫,防止并发超分配) ===
        if decision.strategy.debits_on_hand() {
            let rows = tx.execute(
                r#"
                UPDATE inventory
                SET on_hand_qty = on_hand_qty - ?1
                WHERE sku = ?2 AND on_hand_qty >= ?1
                "#,
                params![decision.qty, sku],
            )?;

            if rows == 0 {
                // 提前返回会 Drop 事务 => 自动回滚
                return Err(RepositoryError::AllocationConflict(format!(
                    "库存扣减失败: sku={}, 需求量={}, 现有量不足或并发订单已占用",
                    sku, decision.qty
                )));
            }
        }

        // === 步骤 2: 补货锁定(带超锁校验) ===
        if decision.strategy.creates_lock() {
            let asn_id = decision.asn_id.as_deref().ok_or_else(|| {
                RepositoryError::FieldValueError {
                    field: "asn_id".to_string(),
                    message: "SS_BORROW_WITH_REPLENISH 必须关联 ASN".to_string(),
                }
            })?;

            let lock_id = ReplenishmentLock::build_lock_id(order_id, asn_id);
            tx.execute(
                r#"
                INSERT INTO replenishment_locks (lock_id, sku, asn_id, qty_locked)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![lock_id, sku, asn_id, decision.qty],
            )?;

            // 写后校验: Σ 锁定量不得超过 ASN 总量
            let (asn_qty, locked_qty): (i64, i64) = tx.query_row(
                r#"
                SELECT a.qty, COALESCE(SUM(l.qty_locked), 0)
                FROM asns a
                LEFT JOIN replenishment_locks l ON l.asn_id = a.asn_id
                WHERE a.asn_id = ?1
                GROUP BY a.qty
                "#,
                params![asn_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            if locked_qty > asn_qty {
                return Err(RepositoryError::AllocationConflict(format!(
                    "锁定量超限: asn_id={}, 总量={}, 锁定合计={}",
                    asn_id, asn_qty, locked_qty
                )));
            }

            debug!(asn_id = %asn_id, qty = decision.qty, "补货锁定已创建");
        }

        // === 步骤 3: 订单终态转换(状态守卫: 仅 NEW 可转换) ===
        let rows = tx.execute(
            r#"
            UPDATE orders
            SET status = ?1, fulfillment_source = ?2
            WHERE order_id = ?3 AND status = ?4
            "#,
            params![
                OrderStatus::Allocated.to_string(),
                decision.strategy.to_string(),
                order_id,
                OrderStatus::New.to_string(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::InvalidStateTransition {
                from: "(not NEW)".to_string(),
                to: OrderStatus::Allocated.to_string(),
            });
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!("分配决策已提交");
        Ok(())
    }
}
