//! Blueprint catalog and spawn request types
//!
//! 描述 simulator 蓝图库、位姿与 spawn 请求。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ActorId;

/// 3D 变换：位置 + 旋转
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 位置 (x, y, z) 单位：米
    pub location: Location,

    /// 旋转 (pitch, yaw, roll) 单位：度
    #[serde(default)]
    pub rotation: Rotation,
}

impl Transform {
    /// 仅包含位置、不旋转的变换
    pub const fn from_location(x: f64, y: f64, z: f64) -> Self {
        Self {
            location: Location { x, y, z },
            rotation: Rotation {
                pitch: 0.0,
                yaw: 0.0,
                roll: 0.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub roll: f64,
}

/// 蓝图库中的一个条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintInfo {
    /// 蓝图名称 (e.g., "vehicle.tesla.model3")
    pub id: String,

    /// 可修改的属性
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
}

impl BlueprintInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
        }
    }

    /// 追加一个带推荐值的属性
    pub fn with_attribute(mut self, id: impl Into<String>, recommended: &[&str]) -> Self {
        self.attributes.push(AttributeInfo {
            id: id.into(),
            recommended_values: recommended.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    /// 按通配模式匹配 (CARLA 风格: "vehicle" 或 "vehicle.*")
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.trim_end_matches('*').trim_end_matches('.');
        self.id == pattern || self.id.starts_with(&format!("{pattern}."))
    }

    pub fn attribute(&self, id: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|attr| attr.id == id)
    }
}

/// 蓝图属性元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub id: String,

    /// 服务器推荐的取值
    #[serde(default)]
    pub recommended_values: Vec<String>,
}

/// Spawn 请求
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    /// 蓝图名称
    pub blueprint: String,

    /// 覆盖的蓝图属性
    pub attributes: HashMap<String, String>,

    /// 初始位姿; 挂载时为相对父 actor 的位姿
    pub transform: Transform,

    /// 父 actor (传感器挂载)
    pub attach_to: Option<ActorId>,
}

impl SpawnRequest {
    pub fn new(blueprint: impl Into<String>, transform: Transform) -> Self {
        Self {
            blueprint: blueprint.into(),
            attributes: HashMap::new(),
            transform,
            attach_to: None,
        }
    }

    pub fn attached_to(mut self, parent: ActorId) -> Self {
        self.attach_to = Some(parent);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
