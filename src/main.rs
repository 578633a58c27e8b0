// ==========================================
// 订单履约承诺系统 - CLI 主入口
// ==========================================
// 用法: order-promising <order_id> <sku> <qty> [due_date]
// 环境: ORDER_PROMISING_DB 指定数据库路径(缺省用系统数据目录)
// ==========================================

use chrono::NaiveDate;
use order_promising::api::AllocationRequest;
use order_promising::app::{get_default_db_path, AppState};
use order_promising::logging;

fn main() {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("订单履约承诺系统 - 库存分配决策引擎");
    tracing::info!("系统版本: {}", order_promising::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("用法: order-promising <order_id> <sku> <qty> [due_date(YYYY-MM-DD)]");
        std::process::exit(2);
    }

    let order_id = args[0].clone();
    let sku = args[1].clone();
    let qty: i64 = match args[2].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("qty 必须为整数: {}", args[2]);
            std::process::exit(2);
        }
    };
    let due_date = match args.get(3) {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                eprintln!("due_date 格式应为 YYYY-MM-DD: {}", raw);
                std::process::exit(2);
            }
        },
        None => None,
    };

    // 获取数据库路径
    let db_path = std::env::var("ORDER_PROMISING_DB").unwrap_or_else(|_| get_default_db_path());
    tracing::info!("使用数据库: {}", db_path);

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("数据目录创建失败 {}: {}", parent.display(), e);
                std::process::exit(1);
            }
        }
    }

    // 创建AppState
    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("AppState 初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    let request = AllocationRequest {
        order_id,
        sku,
        qty,
        due_date,
    };

    match app_state.promising_api.allocate_order(request) {
        Ok(response) => {
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("响应序列化失败: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            eprintln!("分配失败: {}", e);
            std::process::exit(1);
        }
    }
}
