use mesa_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境与配置 (日志目录来自配置，先建目录再初始化日志)
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    init_logger_with_file(None, config.logs_dir().to_str());

    print_banner();
    tracing::info!("Mesa POS Server starting...");

    // 2. 初始化服务器状态 (数据库、缓存、领域服务)
    let state = ServerState::initialize(&config).await?;

    // 3. 启动 HTTP 服务器 (Server::run 会自动启动后台任务)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
