//! 访客停车值班服务入口。

use domain::now_epoch_ms;
use parking_api::{AppState, build_app};
use pms_clock::{OccupancyClock, spawn_ticker};
use pms_config::AppConfig;
use pms_occupancy::OccupancyService;
use pms_registry::SpotRegistry;
use pms_telemetry::init_tracing;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();
    // 计费配置与管理端提交走同一校验
    let tariff = config.tariff();
    pms_tariff::validate(&tariff)?;

    // 楼宇访客车位：V-01..V-NN
    let registry = SpotRegistry::with_inventory(
        &config.spot_prefix,
        config.visitor_spots,
        config.free_minutes,
    );
    let service = OccupancyService::with_clock(
        config.building(),
        registry,
        tariff,
        OccupancyClock::starting_at(now_epoch_ms()),
    );

    // 计时触发：按墙钟补齐整分钟，错过的间隔由 catch_up 一并吸收
    let ticker = if config.clock_enabled {
        let service = service.clone();
        Some(spawn_ticker(
            Duration::from_secs(config.tick_interval_seconds),
            move || {
                if let Err(err) = service.catch_up(now_epoch_ms()) {
                    warn!(target: "pms.clock", error = %err, "clock_tick_failed");
                }
            },
        ))
    } else {
        info!(target: "pms.clock", "clock_disabled");
        None
    };

    let app = build_app(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        target: "pms.api",
        http_addr = %config.http_addr,
        building_id = %config.building_id,
        visitor_spots = config.visitor_spots,
        "server_started"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(ticker) = ticker {
        ticker.abort();
    }
    info!(target: "pms.api", "server_stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "pms.api", error = %err, "shutdown_signal_failed");
        std::future::pending::<()>().await;
    }
    info!(target: "pms.api", "shutdown_requested");
}
