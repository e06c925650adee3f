use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/mesa | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | CGST_RATE | 2.5 | 中央商品服务税率 (%) |
/// | SGST_RATE | 2.5 | 邦商品服务税率 (%) |
/// | SERVICE_CHARGE_RATE | 0 | 服务费率 (%) |
/// | RESERVATION_EXPIRY_MINUTES | 120 | 桌台预订过期时间 (分钟) |
/// | RESERVATION_SWEEP_SECS | 60 | 预订过期清扫周期 (秒) |
/// | ENVIRONMENT | development | 运行环境 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/mesa HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// CGST 税率 (百分比)
    pub cgst_rate: f64,
    /// SGST 税率 (百分比)
    pub sgst_rate: f64,
    /// 服务费率 (百分比)
    pub service_charge_rate: f64,
    /// 桌台预订过期时间 (分钟)
    pub reservation_expiry_minutes: i64,
    /// 预订过期清扫周期 (秒)
    pub reservation_sweep_secs: u64,
    /// 运行环境: development | staging | production
    pub environment: String,
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/mesa".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            cgst_rate: std::env::var("CGST_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.5),
            sgst_rate: std::env::var("SGST_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.5),
            service_charge_rate: std::env::var("SERVICE_CHARGE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
            reservation_expiry_minutes: std::env::var("RESERVATION_EXPIRY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
            reservation_sweep_secs: std::env::var("RESERVATION_SWEEP_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
