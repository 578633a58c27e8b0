// ==========================================
// 订单履约承诺系统 - 销售订单仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: orders 表的读写
// 约束: 终态转换必须带状态守卫(status = 'NEW'),保证每单只转换一次
// ==========================================

use crate::domain::types::{FulfillmentSource, OrderStatus};
use crate::domain::Order;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// 销售订单仓储
pub struct OrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OrderRepository {
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

    /// 按订单 ID 查询
    pub fn find_by_id(&self, order_id: &str) -> RepositoryResult<Option<Order>> {
        let conn = self.get_conn()?;

        let order = conn
            .query_row(
                r#"
                SELECT order_id, sku, qty, due_date, status, fulfillment_source
                FROM orders
                WHERE order_id = ?1
                "#,
                params![order_id],
                map_order_row,
            )
            .optional()?;

        Ok(order)
    }

    /// 插入新订单(状态必须为 NEW)
    pub fn insert(&self, order: &Order) -> RepositoryResult<()> {
        if order.status != OrderStatus::New {
            return Err(RepositoryError::InvalidStateTransition {
                from: "(none)".to_string(),
                to: order.status.to_string(),
            });
        }

        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO orders (order_id, sku, qty, due_date, status, fulfillment_source)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                order.order_id,
                order.sku,
                order.qty,
                order.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                order.status.to_string(),
                order.fulfillment_source.to_string(),
            ],
        )?;

        Ok(())
    }

    /// 将订单标记为 BACKORDER(欠交)
    ///
    /// 这是评估器的失败路径终态,无任何库存/锁定副作用。
    /// 状态守卫: 仅 NEW 状态的订单允许转换,否则报告无效转换。
    pub fn mark_backorder(&self, order_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"
            UPDATE orders
            SET status = ?1, fulfillment_source = ?2
            WHERE order_id = ?3 AND status = ?4
            "#,
            params![
                OrderStatus::Backorder.to_string(),
                FulfillmentSource::None.to_string(),
                order_id,
                OrderStatus::New.to_string(),
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::InvalidStateTransition {
                from: "(not NEW)".to_string(),
                to: OrderStatus::Backorder.to_string(),
            });
        }

        Ok(())
    }
}

/// 行映射: orders 表 -> Order
fn map_order_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let due_date_raw: Option<String> = row.get(3)?;
    let status_raw: String = row.get(4)?;
    let source_raw: String = row.get(5)?;

    Ok(Order {
        order_id: row.get(0)?,
        sku: row.get(1)?,
        qty: row.get(2)?,
        due_date: due_date_raw
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        status: OrderStatus::from_str(&status_raw).unwrap_or(OrderStatus::New),
        fulfillment_source: FulfillmentSource::from_str(&source_raw)
            .unwrap_or(FulfillmentSource::None),
    })
}
