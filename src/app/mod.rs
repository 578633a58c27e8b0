// ==========================================
// 订单履约承诺系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::PromisingApi;
use crate::config::rule_resolver::RuleResolver;
use crate::db;
use crate::engine::AllocationEvaluator;
use crate::repository::{
    AllocationCommitter, InboundSupplyRepository, InventoryRepository, OrderRepository,
    PolicyRuleRepository, ReplenishmentLockRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 履约承诺API
    pub promising_api: Arc<PromisingApi>,

    /// 库存位置仓储(用于维护/种子数据入口)
    pub inventory_repo: Arc<InventoryRepository>,

    /// 在途供应仓储(用于维护/种子数据入口)
    pub supply_repo: Arc<InboundSupplyRepository>,

    /// 业务规则仓储(用于维护/种子数据入口)
    pub rule_repo: Arc<PolicyRuleRepository>,

    /// 补货锁定仓储(用于审计查询)
    pub lock_repo: Arc<ReplenishmentLockRepository>,

    /// 订单仓储
    pub order_repo: Arc<OrderRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 说明
    /// 该方法会:
    /// 1. 打开共享数据库连接并应用统一 PRAGMA
    /// 2. 初始化 schema(幂等)
    /// 3. 初始化所有 Repository / Engine / API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState,数据库路径: {}", db_path);

        // 创建数据库连接(共享连接)
        let conn = db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("数据库连接失败: {}", e))?;
        db::init_schema(&conn).map_err(|e| format!("schema 初始化失败: {}", e))?;

        match db::read_schema_version(&conn) {
            Ok(Some(v)) if v != db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema_version 不匹配: 库内={}, 期望={}",
                    v,
                    db::CURRENT_SCHEMA_VERSION
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("schema_version 读取失败: {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // Repository 层
        let inventory_repo = Arc::new(InventoryRepository::from_connection(Arc::clone(&conn)));
        let supply_repo = Arc::new(InboundSupplyRepository::from_connection(Arc::clone(&conn)));
        let lock_repo = Arc::new(ReplenishmentLockRepository::from_connection(Arc::clone(&conn)));
        let order_repo = Arc::new(OrderRepository::from_connection(Arc::clone(&conn)));
        let rule_repo = Arc::new(PolicyRuleRepository::from_connection(Arc::clone(&conn)));
        let committer = Arc::new(AllocationCommitter::from_connection(Arc::clone(&conn)));

        // 配置层 + 引擎层
        let rule_resolver = Arc::new(RuleResolver::new(Arc::clone(&rule_repo)));
        let evaluator = Arc::new(AllocationEvaluator::new(
            Arc::clone(&inventory_repo),
            Arc::clone(&supply_repo),
            Arc::clone(&order_repo),
            rule_resolver,
            committer,
        ));

        // API 层
        let promising_api = Arc::new(PromisingApi::new(Arc::clone(&order_repo), evaluator));

        tracing::info!("AppState初始化成功");

        Ok(Self {
            db_path,
            promising_api,
            inventory_repo,
            supply_repo,
            rule_repo,
            lock_repo,
            order_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用系统数据目录,不可用时回退到当前目录
pub fn get_default_db_path() -> String {
    match dirs::data_dir() {
        Some(dir) => dir
            .join("order-promising")
            .join("order_promising.db")
            .to_string_lossy()
            .to_string(),
        None => "order_promising.db".to_string(),
    }
}
