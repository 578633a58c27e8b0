// ==========================================
// 订单履约承诺系统 - 库存位置仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: inventory 表的读写,屏蔽数据库细节
// ==========================================

use crate::domain::InventoryPosition;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 库存位置仓储
pub struct InventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryRepository {
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

    /// 按 SKU 查询库存位置
    ///
    /// # 返回
    /// - Ok(Some(InventoryPosition)): 找到库存行
    /// - Ok(None): 未找到
    pub fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<InventoryPosition>> {
        let conn = self.get_conn()?;

        let position = conn
            .query_row(
                "SELECT sku, on_hand_qty, safety_stock_qty FROM inventory WHERE sku = ?1",
                params![sku],
                |row| {
                    Ok(InventoryPosition {
                        sku: row.get(0)?,
                        on_hand_qty: row.get(1)?,
                        safety_stock_qty: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(position)
    }

    /// 查询库存位置,缺失 SKU 返回零值位置(非错误)
    pub fn get_position(&self, sku: &str) -> RepositoryResult<InventoryPosition> {
        Ok(self
            .find_by_sku(sku)?
            .unwrap_or_else(|| InventoryPosition::empty(sku)))
    }

    /// 写入/覆盖库存位置(种子数据与维护入口)
    pub fn upsert(&self, position: &InventoryPosition) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO inventory (sku, on_hand_qty, safety_stock_qty)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(sku) DO UPDATE SET
                on_hand_qty = excluded.on_hand_qty,
                safety_stock_qty = excluded.safety_stock_qty
            "#,
            params![position.sku, position.on_hand_qty, position.safety_stock_qty],
        )?;

        Ok(())
    }
}
