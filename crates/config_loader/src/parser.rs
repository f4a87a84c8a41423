//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, DriveConfig};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<DriveConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<DriveConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<DriveConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_sections() {
        let content = r#"
[server]
host = "10.0.0.5"
port = 2002

[session]
autopilot = true

[npc]
blueprint_filter = "vehicle.audi"
randomize_attribute = "color"
[npc.spawn_point.location]
x = 210.0
y = 199.0
z = 40.0
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.server.host, "10.0.0.5");
        assert_eq!(config.server.port, 2002);
        assert!(config.session.autopilot);
        assert_eq!(config.session.retry_delay_ms, 1000);
        assert_eq!(config.npc.vehicle.blueprint_filter, "vehicle.audi");
        assert_eq!(config.npc.vehicle.spawn_point.location.x, 210.0);
        assert_eq!(config.npc.vehicle.spawn_point.rotation.yaw, 0.0);
        // untouched sections keep defaults
        assert_eq!(config.ego.spawn_point.location.x, 180.0);
    }

    #[test]
    fn test_parse_toml_partial_vehicle_tables() {
        let config = parse_toml("[ego]\nblueprint = \"vehicle.audi.tt\"\n").unwrap();
        assert_eq!(config.ego.blueprint.as_deref(), Some("vehicle.audi.tt"));
        assert_eq!(config.ego.spawn_point.location.x, 180.0);

        let config = parse_toml("[npc]\nblueprint_filter = \"vehicle.audi\"\n").unwrap();
        assert_eq!(config.npc.vehicle.blueprint_filter, "vehicle.audi");
        assert_eq!(config.npc.vehicle.spawn_point.location.x, 200.0);
        assert_eq!(config.npc.randomize_attribute, "color");
    }

    #[test]
    fn test_parse_json_camera() {
        let content = r#"{
            "camera": {
                "sensor_type": "depth",
                "transform": { "location": { "x": 1.0, "z": 2.0 } },
                "attributes": { "fov": "110" }
            }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.camera.sensor_type, contracts::SensorType::Depth);
        assert_eq!(config.camera.transform.location.x, 1.0);
        assert_eq!(config.camera.transform.location.y, 0.0);
        assert_eq!(
            config.camera.attributes.get("fov").map(String::as_str),
            Some("110")
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_toml("[server\nport = ");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("TOML"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
