// ==========================================
// 订单履约承诺系统 - 在途供应仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: asns 表的读写 + 锁定净额视图计算
// ==========================================

use crate::domain::types::ASN_STATUS_CLOSED;
use crate::domain::{AvailableSupply, InboundSupply};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 在途供应仓储
pub struct InboundSupplyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InboundSupplyRepository {
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

    /// 查询 SKU 的可用在途供应(净额视图)
    ///
    /// 规则:
    /// - 排除 CLOSED 状态的 ASN
    /// - available_qty = max(0, qty - Σ 该 ASN 上的锁定量)
    /// - 排除 available_qty = 0 的记录
    /// - 按 eta_date 升序、asn_id 升序排序(评估器依赖该确定性顺序)
    ///
    /// # 返回
    /// - Ok(Vec<AvailableSupply>): 可用在途供应列表
    pub fn find_available_by_sku(&self, sku: &str) -> RepositoryResult<Vec<AvailableSupply>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                a.asn_id,
                a.qty,
                a.eta_date,
                MAX(0, a.qty - COALESCE(SUM(l.qty_locked), 0)) AS available_qty
            FROM asns a
            LEFT JOIN replenishment_locks l ON l.asn_id = a.asn_id
            WHERE a.sku = ?1 AND a.status != ?2
            GROUP BY a.asn_id, a.qty, a.eta_date
            HAVING available_qty > 0
            ORDER BY a.eta_date, a.asn_id
            "#,
        )?;

        let rows = stmt.query_map(params![sku, ASN_STATUS_CLOSED], |row| {
            Ok(AvailableSupply {
                asn_id: row.get(0)?,
                qty: row.get(1)?,
                eta_date: parse_date(&row.get::<_, String>(2)?),
                available_qty: row.get(3)?,
            })
        })?;

        let mut supply = Vec::new();
        for row in rows {
            supply.push(row?);
        }

        Ok(supply)
    }

    /// 按 ASN ID 查询单条在途供应
    pub fn find_by_id(&self, asn_id: &str) -> RepositoryResult<Option<InboundSupply>> {
        let conn = self.get_conn()?;

        let asn = conn
            .query_row(
                "SELECT asn_id, sku, qty, status, eta_date FROM asns WHERE asn_id = ?1",
                params![asn_id],
                |row| {
                    Ok(InboundSupply {
                        asn_id: row.get(0)?,
                        sku: row.get(1)?,
                        qty: row.get(2)?,
                        status: row.get(3)?,
                        eta_date: parse_date(&row.get::<_, String>(4)?),
                    })
                },
            )
            .optional()?;

        Ok(asn)
    }

    /// 插入在途供应(种子数据与维护入口)
    pub fn insert(&self, asn: &InboundSupply) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO asns (asn_id, sku, qty, status, eta_date)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                asn.asn_id,
                asn.sku,
                asn.qty,
                asn.status,
                asn.eta_date.format("%Y-%m-%d").to_string(),
            ],
        )?;

        Ok(())
    }
}

/// 解析 "%Y-%m-%d" 格式的日期,异常值回退为 1970-01-01
fn parse_date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_default()
}
