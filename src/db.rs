// ==========================================
// 订单履约承诺系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发承诺时的偶发 busy 错误
// - 提供建库入口（库存/在途供应/补货锁定/订单/业务规则）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
///
/// 说明：版本号用于提示/告警（不做自动迁移），避免静默在旧库上运行导致隐性错误。
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 建表:
/// - inventory: 库存位置（现有量 + 安全库存量）
/// - asns: 在途供应（到货通知）
/// - replenishment_locks: 补货锁定（针对具体 ASN 的预留）
/// - orders: 销售订单
/// - policy_rules: 业务规则（GLOBAL / ITEM 两级作用域）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS inventory (
            sku TEXT PRIMARY KEY,
            on_hand_qty INTEGER NOT NULL DEFAULT 0,
            safety_stock_qty INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS asns (
            asn_id TEXT PRIMARY KEY,
            sku TEXT NOT NULL,
            qty INTEGER NOT NULL,
            status TEXT NOT NULL,
            eta_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_asns_sku ON asns(sku);

        CREATE TABLE IF NOT EXISTS replenishment_locks (
            lock_id TEXT PRIMARY KEY,
            sku TEXT NOT NULL,
            asn_id TEXT NOT NULL REFERENCES asns(asn_id),
            qty_locked INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_locks_asn ON replenishment_locks(asn_id);

        CREATE TABLE IF NOT EXISTS orders (
            order_id TEXT PRIMARY KEY,
            sku TEXT NOT NULL,
            qty INTEGER NOT NULL,
            due_date TEXT,
            status TEXT NOT NULL DEFAULT 'NEW',
            fulfillment_source TEXT NOT NULL DEFAULT 'NONE'
        );

        CREATE TABLE IF NOT EXISTS policy_rules (
            rule_id TEXT PRIMARY KEY,
            rule_name TEXT NOT NULL,
            scope TEXT NOT NULL,
            sku TEXT,
            start_date TEXT,
            end_date TEXT,
            value TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_rules_name ON policy_rules(rule_name);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
