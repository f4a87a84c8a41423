//! 配置校验模块
//!
//! 校验规则：
//! - 服务器 host 非空, port != 0
//! - 0.1 <= tick_rate_hz <= 1000, retry_delay_ms > 0
//! - 显示尺寸 > 0
//! - 车辆蓝图过滤模式非空
//! - 随机化属性名非空

use contracts::{ContractError, DriveConfig, SessionConfig, VehicleSpec};

/// 校验 DriveConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &DriveConfig) -> Result<(), ContractError> {
    validate_server(config)?;
    validate_session(config)?;
    validate_display(config)?;
    validate_vehicle("ego", &config.ego)?;
    validate_vehicle("npc", &config.npc.vehicle)?;
    validate_npc_attribute(config)?;
    Ok(())
}

/// 校验服务器地址
fn validate_server(config: &DriveConfig) -> Result<(), ContractError> {
    if config.server.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "server.host",
            "host cannot be empty",
        ));
    }
    if config.server.port == 0 {
        return Err(ContractError::config_validation(
            "server.port",
            "port must be > 0",
        ));
    }
    Ok(())
}

/// 校验会话策略
fn validate_session(config: &DriveConfig) -> Result<(), ContractError> {
    let session = &config.session;

    let range = SessionConfig::TICK_RATE_RANGE_HZ;
    if !range.contains(&session.tick_rate_hz) {
        return Err(ContractError::config_validation(
            "session.tick_rate_hz",
            format!(
                "tick_rate_hz must be within {}..={}, got {}",
                range.start(),
                range.end(),
                session.tick_rate_hz
            ),
        ));
    }

    if session.retry_delay_ms == 0 {
        return Err(ContractError::config_validation(
            "session.retry_delay_ms",
            "retry_delay_ms must be > 0",
        ));
    }

    Ok(())
}

/// 校验显示尺寸
fn validate_display(config: &DriveConfig) -> Result<(), ContractError> {
    let display = &config.display;
    if display.width == 0 || display.height == 0 {
        return Err(ContractError::config_validation(
            "display.width / display.height",
            format!(
                "display size must be non-zero, got {}x{}",
                display.width, display.height
            ),
        ));
    }
    Ok(())
}

/// 校验车辆蓝图选择
fn validate_vehicle(name: &str, spec: &VehicleSpec) -> Result<(), ContractError> {
    if let Some(blueprint) = &spec.blueprint {
        if blueprint.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("{name}.blueprint"),
                "blueprint cannot be empty when set",
            ));
        }
    }
    if spec.blueprint_filter.trim().is_empty() {
        return Err(ContractError::config_validation(
            format!("{name}.blueprint_filter"),
            "blueprint_filter cannot be empty",
        ));
    }
    Ok(())
}

fn validate_npc_attribute(config: &DriveConfig) -> Result<(), ContractError> {
    if config.npc.randomize_attribute.trim().is_empty() {
        return Err(ContractError::config_validation(
            "npc.randomize_attribute",
            "attribute name cannot be empty",
        ));
    }
    Ok(())
}
