// ==========================================
// 订单履约承诺系统 - 销售订单实体
// ==========================================
// 职责: 订单主数据 + 决策结果字段
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

use crate::domain::types::{FulfillmentSource, OrderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 销售订单
///
/// 由外部系统以 NEW 状态创建,引擎负责唯一一次终态转换:
/// - ALLOCATED: 由分配提交器写入,并附带履约来源
/// - BACKORDER: 由评估器写入,履约来源为 NONE,无任何库存副作用
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub sku: String,
    pub qty: i64,
    /// 客户期望交付日期。缺省表示客户可接受任意未来到货
    pub due_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub fulfillment_source: FulfillmentSource,
}

impl Order {
    /// 创建一个待决策的新订单
    pub fn new(order_id: &str, sku: &str, qty: i64, due_date: Option<NaiveDate>) -> Self {
        Self {
            order_id: order_id.to_string(),
            sku: sku.to_string(),
            qty,
            due_date,
            status: OrderStatus::New,
            fulfillment_source: FulfillmentSource::None,
        }
    }

    /// 订单是否仍可参与分配决策
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::New
    }
}

/// 分配决策
///
/// 评估器的终态输出,提交器据此施加副作用:
/// - strategy 决定是否扣减现有库存、是否创建补货锁定
/// - asn_id 仅在 SS_BORROW_WITH_REPLENISH / DIRECT_INBOUND 时存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDecision {
    pub strategy: FulfillmentSource,
    pub qty: i64,
    pub asn_id: Option<String>,
}

impl AllocationDecision {
    /// 无 ASN 关联的决策(FREE_STOCK / SS_RISKY)
    pub fn stock_only(strategy: FulfillmentSource, qty: i64) -> Self {
        Self {
            strategy,
            qty,
            asn_id: None,
        }
    }

    /// 关联具体 ASN 的决策(SS_BORROW_WITH_REPLENISH / DIRECT_INBOUND)
    pub fn against_asn(strategy: FulfillmentSource, qty: i64, asn_id: &str) -> Self {
        Self {
            strategy,
            qty,
            asn_id: Some(asn_id.to_string()),
        }
    }
}
