// ==========================================
// 订单履约承诺系统 - 分配策略评估器
// ==========================================
// 职责: 按固定顺序驱动三个决策阶段,命中终态即调用提交器
// 阶段顺序(按业务风险严格递增):
//   自由库存 -> 安全库存借用 -> 在途直接承诺 -> {ALLOCATED, BACKORDER}
// 红线: Engine 不拼 SQL;阶段在提交终态决策前不产生任何副作用
// ==========================================

use crate::config::rule_resolver::RuleResolver;
use crate::domain::types::{FulfillmentSource, OrderStatus};
use crate::domain::Order;
use crate::engine::evaluator_core::{EvaluatorCore, StageOutcome};
use crate::repository::{
    AllocationCommitter, InboundSupplyRepository, InventoryRepository, OrderRepository,
    RepositoryError, RepositoryResult,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

// ==========================================
// EvaluationResult - 评估结果
// ==========================================

/// 一次订单评估的终态结果
///
/// logs 为跨阶段累积的有序决策轨迹,供调用方透传给请求侧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: OrderStatus,
    pub strategy: FulfillmentSource,
    pub logs: Vec<String>,
}

// ==========================================
// AllocationEvaluator - 分配策略评估器
// ==========================================
pub struct AllocationEvaluator {
    inventory_repo: Arc<InventoryRepository>,
    supply_repo: Arc<InboundSupplyRepository>,
    order_repo: Arc<OrderRepository>,
    rule_resolver: Arc<RuleResolver>,
    committer: Arc<AllocationCommitter>,
}

impl AllocationEvaluator {
    /// 创建新的评估器实例
    ///
    /// # 参数
    /// - inventory_repo: 库存位置仓储
    /// - supply_repo: 在途供应仓储
    /// - order_repo: 订单仓储(欠交终态写入)
    /// - rule_resolver: 业务规则解析器
    /// - committer: 分配提交器
    pub fn new(
        inventory_repo: Arc<InventoryRepository>,
        supply_repo: Arc<InboundSupplyRepository>,
        order_repo: Arc<OrderRepository>,
        rule_resolver: Arc<RuleResolver>,
        committer: Arc<AllocationCommitter>,
    ) -> Self {
        Self {
            inventory_repo,
            supply_repo,
            order_repo,
            rule_resolver,
            committer,
        }
    }

    /// 评估单个订单并提交唯一的分配终态
    ///
    /// 同步端到端执行,除提交事务外无内部挂起点。
    /// 业务性失败(库存不足、无合格 ASN)不是错误,以 BACKORDER 终态表达;
    /// 只有存储层故障才作为错误向上传播。
    ///
    /// # 参数
    /// - order: 待决策订单(必须为 NEW 状态)
    /// - today: 决策基准日期
    #[instrument(skip(self, order), fields(order_id = %order.order_id, sku = %order.sku, qty = order.qty))]
    pub fn evaluate(&self, order: &Order, today: NaiveDate) -> RepositoryResult<EvaluationResult> {
        if !order.is_pending() {
            return Err(RepositoryError::InvalidStateTransition {
                from: order.status.to_string(),
                to: "(re-evaluation)".to_string(),
            });
        }

        let mut logs: Vec<String> = Vec::new();

        // === 阶段 1: 自由库存 ===
        let position = self.inventory_repo.get_position(&order.sku)?;
        let stage = EvaluatorCore::check_free_stock(&position, order.qty);
        logs.extend(stage.reasons);
        if let StageOutcome::Terminal(decision) = stage.outcome {
            return self.commit_terminal(order, decision, logs);
        }

        // === 阶段 2: 安全库存借用 ===
        let supply = self.supply_repo.find_available_by_sku(&order.sku)?;
        let window_days = self.rule_resolver.replenish_window_days(&order.sku, today)?;
        let allow_risky = self.rule_resolver.allow_risky_depletion(&order.sku, today)?;
        let stage = EvaluatorCore::evaluate_safety_stock(
            &position,
            order.qty,
            &supply,
            window_days,
            allow_risky,
            today,
        );
        logs.extend(stage.reasons);
        if let StageOutcome::Terminal(decision) = stage.outcome {
            return self.commit_terminal(order, decision, logs);
        }

        // === 阶段 3: 在途直接承诺 ===
        // 阶段 1/2 无副作用,重新读取快照结果不变;重读保持各阶段独立取数
        let supply = self.supply_repo.find_available_by_sku(&order.sku)?;
        let stage = EvaluatorCore::direct_inbound_promising(&supply, order.qty, order.due_date);
        logs.extend(stage.reasons);
        if let StageOutcome::Terminal(decision) = stage.outcome {
            return self.commit_terminal(order, decision, logs);
        }

        // === 全部阶段未命中: 欠交登记(仅状态写入,无库存/锁定副作用) ===
        self.order_repo.mark_backorder(&order.order_id)?;
        info!(order_id = %order.order_id, "订单未能安置,已登记欠交");

        Ok(EvaluationResult {
            status: OrderStatus::Backorder,
            strategy: FulfillmentSource::None,
            logs,
        })
    }

    /// 提交终态决策并组装评估结果
    fn commit_terminal(
        &self,
        order: &Order,
        decision: crate::domain::AllocationDecision,
        logs: Vec<String>,
    ) -> RepositoryResult<EvaluationResult> {
        let strategy = decision.strategy;
        self.committer.commit(&order.order_id, &order.sku, &decision)?;
        info!(order_id = %order.order_id, strategy = %strategy, "订单已分配");

        Ok(EvaluationResult {
            status: OrderStatus::Allocated,
            strategy,
            logs,
        })
    }
}
