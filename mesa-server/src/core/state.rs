//! 服务器状态
//!
//! ServerState 持有所有共享服务的引用，`Clone` 为浅拷贝。
//!
//! | 字段 | 类型 | 说明 |
//! |------|------|------|
//! | config | Config | 配置项 (不可变) |
//! | db | Surreal<Db> | 嵌入式数据库 (权威存储) |
//! | cache | OrderCache | redb 活跃订单缓存 |
//! | orders | OrderService | 订单生命周期服务 |
//! | tables | TableService | 桌台占用服务 |

use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::DbService;
use crate::orders::{OrderCache, OrderService};
use crate::orders::totals::TaxRates;
use crate::tables::TableService;
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 活跃订单缓存 (redb)
    pub cache: OrderCache,
    /// 订单服务
    pub orders: OrderService,
    /// 桌台服务
    pub tables: TableService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. SurrealDB (work_dir/database/mesa.db)
    /// 3. redb 缓存 (work_dir/database/orders.redb)
    /// 4. 领域服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_dir = config.database_dir();
        let db_service = DbService::new(db_dir.join("mesa.db")).await?;
        let db = db_service.db;

        let cache = OrderCache::open(db_dir.join("orders.redb"))?;

        let rates = TaxRates {
            cgst_rate: config.cgst_rate,
            sgst_rate: config.sgst_rate,
            service_charge_rate: config.service_charge_rate,
        };
        let tables = TableService::new(
            db.clone(),
            cache.clone(),
            config.reservation_expiry_minutes,
        );
        let orders = OrderService::new(db.clone(), cache.clone(), tables.clone(), rates);

        Ok(Self {
            config: config.clone(),
            db,
            cache,
            orders,
            tables,
        })
    }

    /// 启动后台任务
    ///
    /// 返回任务管理器；调用方负责在退出时 `shutdown()`。
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let sweep_interval = Duration::from_secs(self.config.reservation_sweep_secs);
        let table_service = self.tables.clone();
        let token = tasks.shutdown_token();
        tasks.spawn("reservation_sweep", TaskKind::Periodic, async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        match table_service.sweep_expired().await {
                            Ok(0) => {}
                            Ok(n) => tracing::info!(released = n, "Reservation sweep released tables"),
                            Err(err) => tracing::error!(error = %err, "Reservation sweep failed"),
                        }
                    }
                }
            }
        });

        tasks
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
