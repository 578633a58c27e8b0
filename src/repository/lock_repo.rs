// ==========================================
// 订单履约承诺系统 - 补货锁定仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: replenishment_locks 表的查询
// 说明: 锁定的写入只发生在分配提交事务内(见 allocation_repo)
// ==========================================

use crate::domain::ReplenishmentLock;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 补货锁定仓储
pub struct ReplenishmentLockRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReplenishmentLockRepository {
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

    /// 查询某 ASN 上的全部锁定
    pub fn list_by_asn(&self, asn_id: &str) -> RepositoryResult<Vec<ReplenishmentLock>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT lock_id, sku, asn_id, qty_locked
            FROM replenishment_locks
            WHERE asn_id = ?1
            ORDER BY lock_id
            "#,
        )?;

        let rows = stmt.query_map(params![asn_id], |row| {
            Ok(ReplenishmentLock {
                lock_id: row.get(0)?,
                sku: row.get(1)?,
                asn_id: row.get(2)?,
                qty_locked: row.get(3)?,
            })
        })?;

        let mut locks = Vec::new();
        for row in rows {
            locks.push(row?);
        }

        Ok(locks)
    }

    /// 查询某 ASN 上的锁定总量
    pub fn locked_qty(&self, asn_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let total: i64 = conn.query_row(
            "SELECT COALESCE(SUM(qty_locked), 0) FROM replenishment_locks WHERE asn_id = ?1",
            params![asn_id],
            |row| row.get(0),
        )?;

        Ok(total)
    }
}
