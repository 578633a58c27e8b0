// ==========================================
// 订单履约承诺系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供外部调用方(CLI/服务端)使用
// ==========================================

pub mod error;
pub mod promising_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use promising_api::{AllocationRequest, AllocationResponse, PromisingApi};
