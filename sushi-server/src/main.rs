use sushi_server::{Config, Server, ServerState, api, init_logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境变量 (.env 可选)
    let _ = dotenvy::dotenv();

    // 2. 加载配置
    let config = Config::from_env().map_err(|e| e as Box<dyn std::error::Error>)?;

    // 3. 日志 (guard 须存活到进程结束)
    let _log_guard = init_logger(&config.log_level, config.log_json, config.log_dir.as_deref());
    api::health::mark_started();

    tracing::info!(
        environment = %config.environment,
        "🍣 SushiEats server starting..."
    );

    // 4. 初始化服务器状态并启动 (Server::run 会自动启动后台任务)
    let state = ServerState::initialize(&config).await?;
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
