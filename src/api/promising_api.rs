// ==========================================
// 订单履约承诺系统 - 履约承诺 API
// ==========================================
// 职责: 对外暴露的唯一请求/响应操作(订单分配)
// 红线: 每个订单仅允许一次终态转换;重复请求同一订单视为业务规则违反
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::{FulfillmentSource, OrderStatus};
use crate::domain::Order;
use crate::engine::AllocationEvaluator;
use crate::repository::{OrderRepository, RepositoryError};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// 请求/响应 DTO
// ==========================================

/// 订单分配请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub order_id: String,
    pub sku: String,
    pub qty: i64,
    /// 客户期望交付日期,缺省表示接受任意未来到货
    pub due_date: Option<NaiveDate>,
}

/// 订单分配响应
///
/// logs 为跨阶段累积的有序决策轨迹(人类可读),其余字段回显请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub order_id: String,
    pub sku: String,
    pub qty: i64,
    pub due_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub strategy: FulfillmentSource,
    pub logs: Vec<String>,
}

// ==========================================
// PromisingApi - 履约承诺 API
// ==========================================

/// 履约承诺API
///
/// 职责:
/// 1. 请求校验(非空 ID、正数量)
/// 2. 订单登记(不存在则以 NEW 状态落库)
/// 3. 驱动评估器完成唯一一次终态决策
pub struct PromisingApi {
    order_repo: Arc<OrderRepository>,
    evaluator: Arc<AllocationEvaluator>,
}

impl PromisingApi {
    /// 创建新的PromisingApi实例
    ///
    /// # 参数
    /// - order_repo: 订单仓储
    /// - evaluator: 分配策略评估器
    pub fn new(order_repo: Arc<OrderRepository>, evaluator: Arc<AllocationEvaluator>) -> Self {
        Self {
            order_repo,
            evaluator,
        }
    }

    /// 分配订单(对外边界操作)
    ///
    /// # 参数
    /// - request: 订单分配请求
    ///
    /// # 返回
    /// - Ok(AllocationResponse): 终态结果 + 决策轨迹
    /// - Err(ApiError): 输入无效、订单已决策、或存储层故障
    #[instrument(skip(self, request), fields(order_id = %request.order_id, sku = %request.sku))]
    pub fn allocate_order(&self, request: AllocationRequest) -> ApiResult<AllocationResponse> {
        // 决策基准日期: 本地日历日
        let today = Local::now().date_naive();
        self.allocate_order_on(request, today)
    }

    /// 以指定基准日期分配订单
    ///
    /// 决策日期显式注入,便于确定性测试与回放
    pub fn allocate_order_on(
        &self,
        request: AllocationRequest,
        today: NaiveDate,
    ) -> ApiResult<AllocationResponse> {
        self.validate(&request)?;

        // 订单登记: 不存在则以 NEW 落库;已决策的订单拒绝重复分配
        let order = match self.order_repo.find_by_id(&request.order_id)? {
            Some(existing) => {
                if !existing.is_pending() {
                    warn!(order_id = %existing.order_id, status = %existing.status, "订单已决策,拒绝重复分配");
                    return Err(ApiError::BusinessRuleViolation(format!(
                        "订单 {} 已处于终态 {},不允许重复分配",
                        existing.order_id, existing.status
                    )));
                }
                existing
            }
            None => {
                let order = Order::new(
                    &request.order_id,
                    &request.sku,
                    request.qty,
                    request.due_date,
                );
                self.order_repo.insert(&order)?;
                debug!(order_id = %order.order_id, "订单已登记为 NEW");
                order
            }
        };

        let result = self.evaluator.evaluate(&order, today)?;

        Ok(AllocationResponse {
            order_id: order.order_id,
            sku: order.sku,
            qty: order.qty,
            due_date: order.due_date,
            status: result.status,
            strategy: result.strategy,
            logs: result.logs,
        })
    }

    /// 查询订单当前状态
    pub fn get_order(&self, order_id: &str) -> ApiResult<Order> {
        if order_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单 ID 不能为空".to_string()));
        }

        self.order_repo
            .find_by_id(order_id)?
            .ok_or_else(|| ApiError::from(RepositoryError::NotFound {
                entity: "order".to_string(),
                id: order_id.to_string(),
            }))
    }

    /// 请求参数校验
    fn validate(&self, request: &AllocationRequest) -> ApiResult<()> {
        if request.order_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("订单 ID 不能为空".to_string()));
        }
        if request.sku.trim().is_empty() {
            return Err(ApiError::InvalidInput("SKU 不能为空".to_string()));
        }
        if request.qty <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "订单数量必须为正数: qty={}",
                request.qty
            )));
        }
        Ok(())
    }
}
