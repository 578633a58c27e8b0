// ==========================================
// 仓储层 集成测试
// ==========================================
// 测试目标: 读取器的净额视图/确定性排序 + 提交器的原子性与守卫
// ==========================================


use chrono::NaiveDate;
use order_promising::domain::types::FulfillmentSource;
use order_promising::domain::{AllocationDecision, Order};
use order_promising::repository::{
    AllocationCommitter, InboundSupplyRepository, InventoryRepository, OrderRepository,
    ReplenishmentLockRepository, RepositoryError,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn shared(conn: Connection) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(conn))
}

// ==========================================
// 库存位置仓储
// ==========================================

#[test]
fn test_missing_sku_reads_as_zero_position() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let repo = InventoryRepository::from_connection(conn);

    // find_by_sku 区分缺失
    assert!(repo.find_by_sku("SKU-MISSING").unwrap().is_none());

    // get_position 缺失按零值处理(非错误)
    let position = repo.get_position("SKU-MISSING").unwrap();
    assert_eq!(position.sku, "SKU-MISSING");
    assert_eq!(position.on_hand_qty, 0);
    assert_eq!(position.safety_stock_qty, 0);
    assert_eq!(position.available_to_promise(), 0);
}

#[test]
fn test_inventory_upsert_overwrites() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let repo = InventoryRepository::from_connection(conn);

    let mut position = order_promising::domain::InventoryPosition {
        sku: "SKU-U".to_string(),
        on_hand_qty: 10,
        safety_stock_qty: 3,
    };
    repo.upsert(&position).unwrap();

    position.on_hand_qty = 42;
    repo.upsert(&position).unwrap();

    let stored = repo.get_position("SKU-U").unwrap();
    assert_eq!(stored.on_hand_qty, 42);
    assert_eq!(stored.safety_stock_qty, 3);
}

// ==========================================
// 在途供应仓储(净额视图)
// ==========================================

#[test]
fn test_available_supply_excludes_closed_asn() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_asn(&seed, "ASN-1", "SKU-S", 10, "IN_TRANSIT", date(2026, 9, 1)).unwrap();
    test_helpers::insert_asn(&seed, "ASN-2", "SKU-S", 10, "CLOSED", date(2026, 8, 25)).unwrap();

    let repo = InboundSupplyRepository::from_connection(shared(seed));
    let supply = repo.find_available_by_sku("SKU-S").unwrap();

    assert_eq!(supply.len(), 1);
    assert_eq!(supply[0].asn_id, "ASN-1");
}

#[test]
fn test_available_supply_nets_out_locks() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_asn(&seed, "ASN-N", "SKU-N", 10, "IN_TRANSIT", date(2026, 9, 1)).unwrap();
    test_helpers::insert_lock(&seed, "lock_O1_ASN-N", "SKU-N", "ASN-N", 3).unwrap();
    test_helpers::insert_lock(&seed, "lock_O2_ASN-N", "SKU-N", "ASN-N", 4).unwrap();

    let repo = InboundSupplyRepository::from_connection(shared(seed));
    let supply = repo.find_available_by_sku("SKU-N").unwrap();

    assert_eq!(supply.len(), 1);
    assert_eq!(supply[0].qty, 10);
    assert_eq!(supply[0].available_qty, 3);
}

#[test]
fn test_fully_locked_asn_is_filtered_out() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_asn(&seed, "ASN-FULL", "SKU-FL", 5, "IN_TRANSIT", date(2026, 9, 1)).unwrap();
    test_helpers::insert_lock(&seed, "lock_O1_ASN-FULL", "SKU-FL", "ASN-FULL", 5).unwrap();

    let repo = InboundSupplyRepository::from_connection(shared(seed));
    assert!(repo.find_available_by_sku("SKU-FL").unwrap().is_empty());
}

#[test]
fn test_available_supply_ordered_by_eta_then_asn_id() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_asn(&seed, "ASN-C", "SKU-O", 5, "IN_TRANSIT", date(2026, 9, 10)).unwrap();
    test_helpers::insert_asn(&seed, "ASN-B", "SKU-O", 5, "IN_TRANSIT", date(2026, 9, 1)).unwrap();
    test_helpers::insert_asn(&seed, "ASN-A", "SKU-O", 5, "IN_TRANSIT", date(2026, 9, 10)).unwrap();

    let repo = InboundSupplyRepository::from_connection(shared(seed));
    let supply = repo.find_available_by_sku("SKU-O").unwrap();

    let ids: Vec<&str> = supply.iter().map(|s| s.asn_id.as_str()).collect();
    // ETA 升序, 同日按 asn_id 升序
    assert_eq!(ids, vec!["ASN-B", "ASN-A", "ASN-C"]);
}

#[test]
fn test_supply_read_is_idempotent() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_asn(&seed, "ASN-I", "SKU-I", 8, "IN_TRANSIT", date(2026, 9, 1)).unwrap();
    test_helpers::insert_lock(&seed, "lock_O1_ASN-I", "SKU-I", "ASN-I", 2).unwrap();

    let repo = InboundSupplyRepository::from_connection(shared(seed));
    let first = repo.find_available_by_sku("SKU-I").unwrap();
    let second = repo.find_available_by_sku("SKU-I").unwrap();

    // 读取无副作用, 重复读取结果一致
    assert_eq!(first, second);
}

// ==========================================
// 补货锁定仓储
// ==========================================

#[test]
fn test_lock_repo_aggregates_by_asn() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_asn(&seed, "ASN-K", "SKU-K", 20, "IN_TRANSIT", date(2026, 9, 1)).unwrap();
    test_helpers::insert_lock(&seed, "lock_O1_ASN-K", "SKU-K", "ASN-K", 3).unwrap();
    test_helpers::insert_lock(&seed, "lock_O2_ASN-K", "SKU-K", "ASN-K", 7).unwrap();

    let repo = ReplenishmentLockRepository::from_connection(shared(seed));
    assert_eq!(repo.locked_qty("ASN-K").unwrap(), 10);
    assert_eq!(repo.list_by_asn("ASN-K").unwrap().len(), 2);
    assert_eq!(repo.locked_qty("ASN-NONE").unwrap(), 0);
}

// ==========================================
// 销售订单仓储
// ==========================================

#[test]
fn test_order_insert_and_find_roundtrip() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let repo = OrderRepository::from_connection(conn);

    let with_due = Order::new("ORD-1", "SKU-1", 5, Some(date(2026, 9, 30)));
    let without_due = Order::new("ORD-2", "SKU-1", 3, None);
    repo.insert(&with_due).unwrap();
    repo.insert(&without_due).unwrap();

    let loaded = repo.find_by_id("ORD-1").unwrap().unwrap();
    assert_eq!(loaded.due_date, Some(date(2026, 9, 30)));
    assert!(loaded.is_pending());

    let loaded = repo.find_by_id("ORD-2").unwrap().unwrap();
    assert_eq!(loaded.due_date, None);

    assert!(repo.find_by_id("ORD-MISSING").unwrap().is_none());
}

#[test]
fn test_mark_backorder_guarded_by_status() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let repo = OrderRepository::from_connection(conn);

    repo.insert(&Order::new("ORD-BO", "SKU-1", 5, None)).unwrap();

    repo.mark_backorder("ORD-BO").unwrap();
    let loaded = repo.find_by_id("ORD-BO").unwrap().unwrap();
    assert!(!loaded.is_pending());
    assert_eq!(loaded.fulfillment_source, FulfillmentSource::None);

    // 终态后二次转换被状态守卫拒绝
    let again = repo.mark_backorder("ORD-BO");
    assert!(matches!(
        again,
        Err(RepositoryError::InvalidStateTransition { .. })
    ));
}

// ==========================================
// 分配提交器(原子性)
// ==========================================

#[test]
fn test_commit_free_stock_debits_and_finalizes() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_inventory(&seed, "SKU-C1", 20, 5).unwrap();

    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let order_repo = OrderRepository::from_connection(Arc::clone(&conn));
    let committer = AllocationCommitter::from_connection(conn);

    order_repo.insert(&Order::new("ORD-C1", "SKU-C1", 8, None)).unwrap();
    committer
        .commit(
            "ORD-C1",
            "SKU-C1",
            &AllocationDecision::stock_only(FulfillmentSource::FreeStock, 8),
        )
        .unwrap();

    assert_eq!(test_helpers::get_on_hand(&seed, "SKU-C1").unwrap(), Some(12));
    assert!(test_helpers::get_locks(&seed).unwrap().is_empty());

    let (status, source) = test_helpers::get_order_terminal(&seed, "ORD-C1").unwrap().unwrap();
    assert_eq!(status, "ALLOCATED");
    assert_eq!(source, "FREE_STOCK");
}

#[test]
fn test_commit_rolls_back_on_insufficient_on_hand() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_inventory(&seed, "SKU-C2", 3, 0).unwrap();

    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let order_repo = OrderRepository::from_connection(Arc::clone(&conn));
    let committer = AllocationCommitter::from_connection(conn);

    order_repo.insert(&Order::new("ORD-C2", "SKU-C2", 5, None)).unwrap();
    let result = committer.commit(
        "ORD-C2",
        "SKU-C2",
        &AllocationDecision::stock_only(FulfillmentSource::FreeStock, 5),
    );

    assert!(matches!(result, Err(RepositoryError::AllocationConflict(_))));

    // 全部回滚: 库存未动, 订单仍为 NEW
    assert_eq!(test_helpers::get_on_hand(&seed, "SKU-C2").unwrap(), Some(3));
    let (status, _) = test_helpers::get_order_terminal(&seed, "ORD-C2").unwrap().unwrap();
    assert_eq!(status, "NEW");
}

#[test]
fn test_commit_ss_borrow_writes_lock_atomically() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_inventory(&seed, "SKU-C3", 10, 10).unwrap();
    test_helpers::insert_asn(&seed, "ASN-C3", "SKU-C3", 50, "IN_TRANSIT", date(2026, 8, 25)).unwrap();

    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let order_repo = OrderRepository::from_connection(Arc::clone(&conn));
    let committer = AllocationCommitter::from_connection(conn);

    order_repo.insert(&Order::new("ORD-C3", "SKU-C3", 6, None)).unwrap();
    committer
        .commit(
            "ORD-C3",
            "SKU-C3",
            &AllocationDecision::against_asn(FulfillmentSource::SsBorrowWithReplenish, 6, "ASN-C3"),
        )
        .unwrap();

    assert_eq!(test_helpers::get_on_hand(&seed, "SKU-C3").unwrap(), Some(4));

    let locks = test_helpers::get_locks(&seed).unwrap();
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].0, "lock_ORD-C3_ASN-C3");
    assert_eq!(locks[0].3, 6);
}

#[test]
fn test_commit_rolls_back_on_over_lock() {
    // ASN 总量 5, 已有 3 件锁定, 再锁 4 件会超限 -> 整体回滚
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_inventory(&seed, "SKU-C4", 10, 10).unwrap();
    test_helpers::insert_asn(&seed, "ASN-C4", "SKU-C4", 5, "IN_TRANSIT", date(2026, 8, 25)).unwrap();
    test_helpers::insert_lock(&seed, "lock_OLD_ASN-C4", "SKU-C4", "ASN-C4", 3).unwrap();

    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let order_repo = OrderRepository::from_connection(Arc::clone(&conn));
    let committer = AllocationCommitter::from_connection(conn);

    order_repo.insert(&Order::new("ORD-C4", "SKU-C4", 4, None)).unwrap();
    let result = committer.commit(
        "ORD-C4",
        "SKU-C4",
        &AllocationDecision::against_asn(FulfillmentSource::SsBorrowWithReplenish, 4, "ASN-C4"),
    );

    assert!(matches!(result, Err(RepositoryError::AllocationConflict(_))));

    // 扣减与锁定均回滚
    assert_eq!(test_helpers::get_on_hand(&seed, "SKU-C4").unwrap(), Some(10));
    let locks = test_helpers::get_locks(&seed).unwrap();
    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].0, "lock_OLD_ASN-C4");

    let (status, _) = test_helpers::get_order_terminal(&seed, "ORD-C4").unwrap().unwrap();
    assert_eq!(status, "NEW");
}

#[test]
fn test_commit_direct_inbound_touches_only_order() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_inventory(&seed, "SKU-C5", 2, 0).unwrap();
    test_helpers::insert_asn(&seed, "ASN-C5", "SKU-C5", 50, "IN_TRANSIT", date(2026, 9, 20)).unwrap();

    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let order_repo = OrderRepository::from_connection(Arc::clone(&conn));
    let committer = AllocationCommitter::from_connection(conn);

    order_repo.insert(&Order::new("ORD-C5", "SKU-C5", 5, None)).unwrap();
    committer
        .commit(
            "ORD-C5",
            "SKU-C5",
            &AllocationDecision::against_asn(FulfillmentSource::DirectInbound, 5, "ASN-C5"),
        )
        .unwrap();

    // 在途承诺: 不扣库存, 不建锁, 仅订单终态
    assert_eq!(test_helpers::get_on_hand(&seed, "SKU-C5").unwrap(), Some(2));
    assert!(test_helpers::get_locks(&seed).unwrap().is_empty());

    let (status, source) = test_helpers::get_order_terminal(&seed, "ORD-C5").unwrap().unwrap();
    assert_eq!(status, "ALLOCATED");
    assert_eq!(source, "DIRECT_INBOUND");
}

#[test]
fn test_commit_borrow_requires_asn_id() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let seed = test_helpers::open_test_connection(&db_path).unwrap();

    test_helpers::insert_inventory(&seed, "SKU-C6", 10, 10).unwrap();

    let conn = shared(test_helpers::open_test_connection(&db_path).unwrap());
    let order_repo = OrderRepository::from_connection(Arc::clone(&conn));
    let committer = AllocationCommitter::from_connection(conn);

    order_repo.insert(&Order::new("ORD-C6", "SKU-C6", 5, None)).unwrap();
    let result = committer.commit(
        "ORD-C6",
        "SKU-C6",
        &AllocationDecision::stock_only(FulfillmentSource::SsBorrowWithReplenish, 5),
    );

    assert!(matches!(
        result,
        Err(RepositoryError::FieldValueError { .. })
    ));

    // 扣减已在错误前发生, 但事务回滚后不可见
    assert_eq!(test_helpers::get_on_hand(&seed, "SKU-C6").unwrap(), Some(10));
}
