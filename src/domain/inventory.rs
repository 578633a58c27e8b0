// ==========================================
// 订单履约承诺系统 - 库存位置实体
// ==========================================
// 职责: SKU 级库存位置(现有量 + 安全库存量)
// 红线: 现有量仅允许由分配提交器在事务内扣减
// ==========================================

use serde::{Deserialize, Serialize};

/// 库存位置
///
/// 每个 SKU 一行。缺失的 SKU 等价于 {on_hand_qty: 0, safety_stock_qty: 0},
/// 不是错误。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryPosition {
    pub sku: String,
    pub on_hand_qty: i64,
    pub safety_stock_qty: i64,
}

impl InventoryPosition {
    /// 缺失 SKU 的零值位置
    pub fn empty(sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            on_hand_qty: 0,
            safety_stock_qty: 0,
        }
    }

    /// 可承诺量 = 现有量 - 安全库存量
    ///
    /// 不做钳制,允许为负(安全库存已被借用时),比较时由调用方决定语义
    pub fn available_to_promise(&self) -> i64 {
        self.on_hand_qty - self.safety_stock_qty
    }
}
