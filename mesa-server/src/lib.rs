//! Mesa POS Server - 餐厅销售点后端
//!
//! # 架构概述
//!
//! 单一可信数据源设计：嵌入式 SurrealDB 为权威存储，
//! redb 仅作为活跃订单的快照读缓存（写入数据库确认后才更新，
//! 订单终结时显式失效）。
//!
//! # 模块结构
//!
//! ```text
//! mesa-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SurrealDB 模型与仓储
//! ├── orders/        # 订单生命周期服务 + redb 快照缓存
//! ├── coupons/       # 优惠券折扣引擎（纯函数）
//! ├── tables/        # 桌台占用管理（预订、并台、拆台、过期清扫）
//! ├── export/        # 客户名单 CSV 导出
//! └── utils/         # 错误、日志、时间工具
//! ```

pub mod api;
pub mod core;
pub mod coupons;
pub mod db;
pub mod export;
pub mod orders;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{OrderCache, OrderService};
pub use tables::TableService;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

pub fn print_banner() {
    println!(
        r#"
   __  ___
  /  |/  /__ ___ ___ _
 / /|_/ / -_|_-</ _ `/
/_/  /_/\__/___/\_,_/
    "#
    );
}
