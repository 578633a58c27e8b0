// ==========================================
// 订单履约承诺系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 订单状态 (Order Status)
// ==========================================
// 红线: 每个订单仅允许一次终态转换 (NEW -> ALLOCATED | BACKORDER)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    New,       // 新建,未决策
    Allocated, // 已分配
    Backorder, // 欠交登记
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::Allocated => write!(f, "ALLOCATED"),
            OrderStatus::Backorder => write!(f, "BACKORDER"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(OrderStatus::New),
            "ALLOCATED" => Ok(OrderStatus::Allocated),
            "BACKORDER" => Ok(OrderStatus::Backorder),
            other => Err(format!("未知的订单状态: {}", other)),
        }
    }
}

// ==========================================
// 履约来源 (Fulfillment Source)
// ==========================================
// 策略按业务风险严格排序:
// 自由库存 -> 安全库存借用(有补货) -> 安全库存借用(冒险) -> 在途直接承诺 -> 无
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentSource {
    FreeStock,             // 自由库存
    SsBorrowWithReplenish, // 安全库存借用 + 补货锁定
    SsRisky,               // 安全库存借用(无补货保障)
    DirectInbound,         // 在途供应直接承诺
    None,                  // 未分配(欠交)
}

impl FulfillmentSource {
    /// 该策略是否扣减现有库存
    ///
    /// DIRECT_INBOUND 承诺的是未到货的在途量,实物库存不动
    pub fn debits_on_hand(&self) -> bool {
        matches!(
            self,
            FulfillmentSource::FreeStock
                | FulfillmentSource::SsBorrowWithReplenish
                | FulfillmentSource::SsRisky
        )
    }

    /// 该策略是否创建补货锁定
    pub fn creates_lock(&self) -> bool {
        matches!(self, FulfillmentSource::SsBorrowWithReplenish)
    }
}

impl fmt::Display for FulfillmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FulfillmentSource::FreeStock => write!(f, "FREE_STOCK"),
            FulfillmentSource::SsBorrowWithReplenish => write!(f, "SS_BORROW_WITH_REPLENISH"),
            FulfillmentSource::SsRisky => write!(f, "SS_RISKY"),
            FulfillmentSource::DirectInbound => write!(f, "DIRECT_INBOUND"),
            FulfillmentSource::None => write!(f, "NONE"),
        }
    }
}

impl FromStr for FulfillmentSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE_STOCK" => Ok(FulfillmentSource::FreeStock),
            "SS_BORROW_WITH_REPLENISH" => Ok(FulfillmentSource::SsBorrowWithReplenish),
            "SS_RISKY" => Ok(FulfillmentSource::SsRisky),
            "DIRECT_INBOUND" => Ok(FulfillmentSource::DirectInbound),
            "NONE" => Ok(FulfillmentSource::None),
            other => Err(format!("未知的履约来源: {}", other)),
        }
    }
}

// ==========================================
// 规则作用域 (Rule Scope)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleScope {
    Global, // 全局规则
    Item,   // 物料级规则(需指定 sku)
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleScope::Global => write!(f, "GLOBAL"),
            RuleScope::Item => write!(f, "ITEM"),
        }
    }
}

impl FromStr for RuleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GLOBAL" => Ok(RuleScope::Global),
            "ITEM" => Ok(RuleScope::Item),
            other => Err(format!("未知的规则作用域: {}", other)),
        }
    }
}

// ==========================================
// 规则值 (Rule Value)
// ==========================================
// 规则值以字符串入库,按 布尔字面量 -> 整数 -> 原始字符串 的优先级宽松解析
// 红线: 解析永不失败,无法识别的值原样透传为 Text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl RuleValue {
    /// 宽松解析规则值
    ///
    /// 优先级:
    /// 1. "true"/"false"（忽略大小写）=> Bool
    /// 2. 可解析的 i64 => Int
    /// 3. 其他 => Text（原始字符串）
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_ascii_lowercase();
        if lowered == "true" {
            return RuleValue::Bool(true);
        }
        if lowered == "false" {
            return RuleValue::Bool(false);
        }
        if let Ok(n) = raw.trim().parse::<i64>() {
            return RuleValue::Int(n);
        }
        RuleValue::Text(raw.to_string())
    }

    /// 真值判定
    ///
    /// Bool 取其值; Int 非零为真; Text 非空为真
    pub fn is_truthy(&self) -> bool {
        match self {
            RuleValue::Bool(b) => *b,
            RuleValue::Int(n) => *n != 0,
            RuleValue::Text(s) => !s.is_empty(),
        }
    }

    /// 整数取值（仅 Int 有效,其余返回 None 由调用方取默认值）
    pub fn as_int(&self) -> Option<i64> {
        match self {
            RuleValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Bool(b) => write!(f, "{}", b),
            RuleValue::Int(n) => write!(f, "{}", n),
            RuleValue::Text(s) => write!(f, "{}", s),
        }
    }
}

// ==========================================
// ASN 状态常量
// ==========================================
// ASN 状态为开放集合(上游系统可扩展),领域内仅 CLOSED 具有硬语义:
// CLOSED 的 ASN 不参与可承诺量计算
pub const ASN_STATUS_IN_TRANSIT: &str = "IN_TRANSIT";
pub const ASN_STATUS_CLOSED: &str = "CLOSED";
