// ==========================================
// 订单履约承诺系统 - 分配策略核心(纯函数)
// ==========================================
// 职责: 三个阶段的纯决策逻辑,不触库、不产生副作用
// 红线: 所有阶段必须输出 reason,保证决策可解释
// 输入: 库存位置 + 可用在途供应快照 + 已解析的策略参数
// 输出: StageOutcome (终态决策 | 进入下一阶段) + 决策原因
// ==========================================

use crate::domain::types::FulfillmentSource;
use crate::domain::{AllocationDecision, AvailableSupply, InventoryPosition};
use chrono::{Duration, NaiveDate};

// ==========================================
// 阶段结果
// ==========================================

/// 单个阶段的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// 终态: 产出分配决策,流程终止
    Terminal(AllocationDecision),
    /// 本阶段无法安置订单,移交下一阶段
    Continue,
}

/// 阶段输出 = 判定结果 + 有序决策原因
#[derive(Debug, Clone)]
pub struct StageResult {
    pub outcome: StageOutcome,
    pub reasons: Vec<String>,
}

impl StageResult {
    fn terminal(decision: AllocationDecision, reasons: Vec<String>) -> Self {
        Self {
            outcome: StageOutcome::Terminal(decision),
            reasons,
        }
    }

    fn advance(reasons: Vec<String>) -> Self {
        Self {
            outcome: StageOutcome::Continue,
            reasons,
        }
    }
}

// ==========================================
// EvaluatorCore - 阶段纯函数集合
// ==========================================
pub struct EvaluatorCore;

impl EvaluatorCore {
    /// 阶段 1: 自由库存
    ///
    /// available = on_hand - safety_stock(不钳制,可为负)。
    /// available >= order_qty 时以 FREE_STOCK 全量分配。
    pub fn check_free_stock(position: &InventoryPosition, order_qty: i64) -> StageResult {
        let available = position.available_to_promise();
        let mut reasons = vec![format!(
            "Check Free Stock: OnHand={}, SS={}, Avail={}",
            position.on_hand_qty, position.safety_stock_qty, available
        )];

        if available >= order_qty {
            reasons.push(format!(
                "Allocated from FREE_STOCK. New Available: {}",
                available - order_qty
            ));
            return StageResult::terminal(
                AllocationDecision::stock_only(FulfillmentSource::FreeStock, order_qty),
                reasons,
            );
        }

        reasons.push("Insufficient Free Stock. Proceeding to Safety Stock Check.".to_string());
        StageResult::advance(reasons)
    }

    /// 阶段 2: 安全库存借用
    ///
    /// 守卫: on_hand < order_qty 时实物不足,借用也无法覆盖,直接移交
    /// (不允许把现有量扣成负数)。
    ///
    /// 子步骤 A: 在补货窗口内(eta <= today + window_days)寻找可用量足够的
    /// 首个 ASN(供应快照已按 ETA 升序),命中则 SS_BORROW_WITH_REPLENISH。
    ///
    /// 子步骤 B: 无合格 ASN 时,若允许冒险借用则 SS_RISKY(不创建锁定)。
    pub fn evaluate_safety_stock(
        position: &InventoryPosition,
        order_qty: i64,
        supply: &[AvailableSupply],
        window_days: i64,
        allow_risky: bool,
        today: NaiveDate,
    ) -> StageResult {
        if position.on_hand_qty < order_qty {
            return StageResult::advance(vec![format!(
                "Physical OnHand ({}) < OrderQty ({}). Cannot borrow SS. Proceeding to Direct Inbound.",
                position.on_hand_qty, order_qty
            )]);
        }

        let mut reasons = Vec::new();
        let target_date = today + Duration::days(window_days);
        reasons.push(format!(
            "SS Borrow Check: window={}d, target_date={}",
            window_days, target_date
        ));

        // 子步骤 A: 合格补货扫描(ETA 升序,首个命中即止)
        let qualifying = supply
            .iter()
            .find(|asn| asn.eta_date <= target_date && asn.available_qty >= order_qty);

        if let Some(asn) = qualifying {
            reasons.push(format!(
                "SS Borrow Approved. Locked against ASN {}",
                asn.asn_id
            ));
            return StageResult::terminal(
                AllocationDecision::against_asn(
                    FulfillmentSource::SsBorrowWithReplenish,
                    order_qty,
                    &asn.asn_id,
                ),
                reasons,
            );
        }

        // 子步骤 B: 冒险借用
        reasons.push(format!(
            "No qualifying ASN. Risky Depletion allowed? {}",
            allow_risky
        ));

        if allow_risky {
            reasons.push("SS Risky Borrow Approved.".to_string());
            return StageResult::terminal(
                AllocationDecision::stock_only(FulfillmentSource::SsRisky, order_qty),
                reasons,
            );
        }

        reasons.push("SS Borrow denied. Proceeding to Direct Inbound.".to_string());
        StageResult::advance(reasons)
    }

    /// 阶段 3: 在途直接承诺
    ///
    /// 截止日 = 订单 due_date;缺省表示客户可接受任意未来到货(无上限)。
    /// 按 ETA 升序选择首个 eta <= 截止日 且可用量足够的 ASN,
    /// 不扣库存、不创建锁定(实物尚未到货)。
    ///
    /// 本阶段失败是唯一通向 BACKORDER 的路径。
    pub fn direct_inbound_promising(
        supply: &[AvailableSupply],
        order_qty: i64,
        due_date: Option<NaiveDate>,
    ) -> StageResult {
        let mut reasons = Vec::new();
        match due_date {
            Some(d) => reasons.push(format!("Direct Inbound Check: deadline={}", d)),
            None => reasons.push("Direct Inbound Check: no due date, deadline unbounded".to_string()),
        }

        let found = supply.iter().find(|asn| {
            let within_deadline = match due_date {
                Some(deadline) => asn.eta_date <= deadline,
                None => true,
            };
            within_deadline && asn.available_qty >= order_qty
        });

        if let Some(asn) = found {
            reasons.push(format!(
                "Allocated to Future ASN {} arriving {}",
                asn.asn_id, asn.eta_date
            ));
            return StageResult::terminal(
                AllocationDecision::against_asn(
                    FulfillmentSource::DirectInbound,
                    order_qty,
                    &asn.asn_id,
                ),
                reasons,
            );
        }

        reasons.push("No suitable inventory source found. Backordered.".to_string());
        StageResult::advance(reasons)
    }
}
