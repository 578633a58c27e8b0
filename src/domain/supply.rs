// ==========================================
// 订单履约承诺系统 - 在途供应与补货锁定实体
// ==========================================
// 职责: ASN(到货通知)与针对 ASN 的补货锁定
// 红线: ASN 创建后除 status 外不可变; 锁定创建后不可变
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 在途供应(ASN, 到货通知)
///
/// status 为开放集合,领域内仅 CLOSED 有硬语义(不参与可承诺量)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundSupply {
    pub asn_id: String,
    pub sku: String,
    pub qty: i64,
    pub status: String,
    pub eta_date: NaiveDate,
}

/// 可用在途供应(净额视图)
///
/// available_qty = max(0, qty - Σ 该 ASN 上的锁定量)
/// 由供应仓储计算,available_qty = 0 的记录不会出现在查询结果中
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSupply {
    pub asn_id: String,
    pub qty: i64,
    pub eta_date: NaiveDate,
    pub available_qty: i64,
}

/// 补货锁定
///
/// 借用安全库存时针对具体 ASN 创建的预留,到货后由外部清算流程"归还"。
/// 仅由分配提交器创建,引擎侧从不修改或删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentLock {
    pub lock_id: String,
    pub sku: String,
    pub asn_id: String,
    pub qty_locked: i64,
}

impl ReplenishmentLock {
    /// 锁定 ID 格式: lock_{order_id}_{asn_id}
    pub fn build_lock_id(order_id: &str, asn_id: &str) -> String {
        format!("lock_{}_{}", order_id, asn_id)
    }
}
