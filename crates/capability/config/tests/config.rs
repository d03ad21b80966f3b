use pms_config::AppConfig;

// 环境变量为进程级状态，所有断言放在同一个测试中顺序执行。
#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("PMS_BUILDING_ID", "building-1");
        std::env::set_var("PMS_BUILDING_NAME", "Torres del Parque");
        std::env::set_var("PMS_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("PMS_VISITOR_SPOTS", "12");
        std::env::set_var("PMS_OVERTIME_MULTIPLIER", "1.5");
        std::env::set_var("PMS_CLOCK_ENABLED", "off");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.building_id, "building-1");
    assert_eq!(config.visitor_spots, 12);
    assert_eq!(config.spot_prefix, "V");
    assert_eq!(config.free_minutes, 120);
    assert!(!config.clock_enabled);
    assert_eq!(config.tick_interval_seconds, 60);

    let tariff = config.tariff();
    assert_eq!(tariff.hourly_rate, 2000);
    assert_eq!(tariff.overtime_multiplier, 1.5);
    assert_eq!(config.building().building_name, "Torres del Parque");

    unsafe {
        std::env::set_var("PMS_VISITOR_SPOTS", "many");
    }
    let err = AppConfig::from_env().expect_err("invalid spots");
    assert!(err.to_string().contains("PMS_VISITOR_SPOTS"));

    unsafe {
        std::env::set_var("PMS_VISITOR_SPOTS", "12");
        std::env::set_var("PMS_TICK_INTERVAL_SECONDS", "0");
    }
    assert!(AppConfig::from_env().is_err());
}
