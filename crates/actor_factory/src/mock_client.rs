//! Mock CARLA 客户端
//!
//! 用于单元测试和离线运行的 mock 实现，支持注入失败场景。
//! 所有 clone 共享同一个模拟世界，测试可以保留一个 clone 观察 runner 的行为。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use contracts::{
    ActorId, BlueprintInfo, SensorSource, SensorType, SpawnRequest, Transform, VehicleCommand,
};
use parking_lot::Mutex;
use tracing::instrument;

use crate::client::CarlaClient;
use crate::error::{ActorFactoryError, Result};
use crate::mock_sensor::{MockSensor, MockSensorConfig};

/// Mock 客户端配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// 蓝图库 (为空时使用 [`default_catalog`])
    pub catalog: Vec<BlueprintInfo>,
    /// 前 N 次 connect 失败
    pub fail_connects: u32,
    /// 蓝图库读取失败
    pub fail_catalog: bool,
    /// 应该拒绝 spawn 的蓝图模式
    pub fail_blueprints: Vec<String>,
    /// 应该失败的 destroy actor IDs
    pub fail_destroy: Vec<ActorId>,
    /// 相机 actor 使用的 mock 传感器配置
    pub sensor: MockSensorConfig,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            catalog: Vec::new(),
            fail_connects: 0,
            fail_catalog: false,
            fail_blueprints: Vec::new(),
            fail_destroy: Vec::new(),
            sensor: MockSensorConfig::default(),
        }
    }
}

/// 默认蓝图库: 三辆车和三种相机
pub fn default_catalog() -> Vec<BlueprintInfo> {
    let colors = ["255,0,0", "0,255,0", "0,0,255", "17,37,103"];
    vec![
        BlueprintInfo::new("vehicle.tesla.model3").with_attribute("color", &colors),
        BlueprintInfo::new("vehicle.audi.tt").with_attribute("color", &colors),
        BlueprintInfo::new("vehicle.lincoln.mkz_2017").with_attribute("color", &colors),
        BlueprintInfo::new("sensor.camera.rgb"),
        BlueprintInfo::new("sensor.camera.depth"),
        BlueprintInfo::new("sensor.camera.semantic_segmentation"),
    ]
}

/// 模拟世界中的一个 actor
#[derive(Clone)]
struct MockActor {
    blueprint: String,
    attributes: HashMap<String, String>,
    transform: Transform,
    parent: Option<ActorId>,
    autopilot: bool,
    sensor: Option<MockSensor>,
}

#[derive(Default)]
struct World {
    actors: HashMap<ActorId, MockActor>,
    destroyed: Vec<ActorId>,
    commands: Vec<(ActorId, VehicleCommand)>,
    autopilot_calls: Vec<(ActorId, bool)>,
}

struct Inner {
    config: MockConfig,
    /// Actor ID 计数器
    next_actor_id: AtomicU32,
    connect_attempts: AtomicU32,
    connected: AtomicBool,
    world: Mutex<World>,
}

/// Mock CARLA 客户端
#[derive(Clone)]
pub struct MockCarlaClient {
    inner: Arc<Inner>,
}

impl MockCarlaClient {
    /// 创建默认 mock 客户端
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用配置创建 mock 客户端
    pub fn with_config(mut config: MockConfig) -> Self {
        if config.catalog.is_empty() {
            config.catalog = default_catalog();
        }
        Self {
            inner: Arc::new(Inner {
                config,
                next_actor_id: AtomicU32::new(1000), // 从 1000 开始，便于识别
                connect_attempts: AtomicU32::new(0),
                connected: AtomicBool::new(false),
                world: Mutex::new(World::default()),
            }),
        }
    }

    /// 获取当前存活的 actor 数量
    pub fn actor_count(&self) -> usize {
        self.inner.world.lock().actors.len()
    }

    /// 获取所有存活的 actor IDs
    pub fn all_actor_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<_> = self.inner.world.lock().actors.keys().copied().collect();
        ids.sort();
        ids
    }

    /// 按销毁顺序返回已销毁的 actor
    pub fn destroyed_actors(&self) -> Vec<ActorId> {
        self.inner.world.lock().destroyed.clone()
    }

    /// 某个 actor 被成功销毁的次数
    pub fn destroy_count(&self, actor_id: ActorId) -> usize {
        self.inner
            .world
            .lock()
            .destroyed
            .iter()
            .filter(|id| **id == actor_id)
            .count()
    }

    /// 已应用到某个 actor 的所有命令
    pub fn applied_commands(&self, actor_id: ActorId) -> Vec<VehicleCommand> {
        self.inner
            .world
            .lock()
            .commands
            .iter()
            .filter(|(id, _)| *id == actor_id)
            .map(|(_, command)| *command)
            .collect()
    }

    /// 所有 set_autopilot 调用 (按顺序)
    pub fn autopilot_calls(&self) -> Vec<(ActorId, bool)> {
        self.inner.world.lock().autopilot_calls.clone()
    }

    /// actor 当前的 autopilot 状态
    pub fn autopilot(&self, actor_id: ActorId) -> Option<bool> {
        self.inner
            .world
            .lock()
            .actors
            .get(&actor_id)
            .map(|actor| actor.autopilot)
    }

    pub fn actor_blueprint(&self, actor_id: ActorId) -> Option<String> {
        self.actor(actor_id).map(|actor| actor.blueprint)
    }

    pub fn actor_attribute(&self, actor_id: ActorId, key: &str) -> Option<String> {
        self.actor(actor_id)
            .and_then(|actor| actor.attributes.get(key).cloned())
    }

    pub fn actor_transform(&self, actor_id: ActorId) -> Option<Transform> {
        self.actor(actor_id).map(|actor| actor.transform)
    }

    pub fn actor_parent(&self, actor_id: ActorId) -> Option<ActorId> {
        self.actor(actor_id).and_then(|actor| actor.parent)
    }

    /// 相机 actor 对应的 mock 传感器 (用于手动投递帧)
    pub fn sensor(&self, actor_id: ActorId) -> Option<MockSensor> {
        self.actor(actor_id).and_then(|actor| actor.sensor)
    }

    /// connect 被调用的次数
    pub fn connect_attempts(&self) -> u32 {
        self.inner.connect_attempts.load(Ordering::SeqCst)
    }

    /// 模拟服务器侧删除 actor (句柄变为 stale)
    pub fn expire_actor(&self, actor_id: ActorId) {
        if let Some(actor) = self.inner.world.lock().actors.remove(&actor_id) {
            if let Some(sensor) = actor.sensor {
                sensor.stop();
            }
        }
    }

    /// 模拟连接断开
    pub fn disconnect(&self) {
        self.inner.connected.store(false, Ordering::SeqCst);
    }

    fn actor(&self, actor_id: ActorId) -> Option<MockActor> {
        self.inner.world.lock().actors.get(&actor_id).cloned()
    }

    fn allocate_actor_id(&self) -> ActorId {
        ActorId::new(self.inner.next_actor_id.fetch_add(1, Ordering::SeqCst))
    }

    fn should_fail_spawn(&self, blueprint: &str) -> bool {
        self.inner
            .config
            .fail_blueprints
            .iter()
            .any(|pattern| BlueprintInfo::new(blueprint).matches(pattern))
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.inner.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ActorFactoryError::connection("not connected"))
        }
    }

    fn with_live_actor<R>(
        &self,
        actor_id: ActorId,
        f: impl FnOnce(&mut World, &mut MockActor) -> R,
    ) -> Result<R> {
        let mut world = self.inner.world.lock();
        let mut actor = world
            .actors
            .remove(&actor_id)
            .ok_or_else(|| ActorFactoryError::stale_actor(actor_id))?;
        let result = f(&mut world, &mut actor);
        world.actors.insert(actor_id, actor);
        Ok(result)
    }
}

impl Default for MockCarlaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CarlaClient for MockCarlaClient {
    #[instrument(name = "mock_carla_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let attempt = self.inner.connect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.inner.config.fail_connects {
            self.inner.connected.store(false, Ordering::SeqCst);
            return Err(ActorFactoryError::connection(format!(
                "mock failure connecting to {host}:{port} (attempt {attempt})"
            )));
        }
        self.inner.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[instrument(name = "mock_carla_blueprint_catalog", skip(self))]
    async fn blueprint_catalog(&self) -> Result<Vec<BlueprintInfo>> {
        self.ensure_connected()?;
        if self.inner.config.fail_catalog {
            return Err(ActorFactoryError::CatalogUnavailable {
                message: "mock blueprint library unavailable".into(),
            });
        }
        Ok(self.inner.config.catalog.clone())
    }

    #[instrument(
        name = "mock_carla_spawn_actor",
        skip(self, request),
        fields(blueprint = %request.blueprint, attach_to = ?request.attach_to)
    )]
    async fn spawn_actor(&self, request: &SpawnRequest) -> Result<ActorId> {
        self.ensure_connected()?;

        if !self
            .inner
            .config
            .catalog
            .iter()
            .any(|bp| bp.id == request.blueprint)
        {
            return Err(ActorFactoryError::SpawnRejected {
                blueprint: request.blueprint.clone(),
                message: "blueprint not found".into(),
            });
        }

        if self.should_fail_spawn(&request.blueprint) {
            return Err(ActorFactoryError::SpawnRejected {
                blueprint: request.blueprint.clone(),
                message: "mock failure".into(),
            });
        }

        let mut world = self.inner.world.lock();

        // 验证 parent 存在
        if let Some(parent) = request.attach_to {
            if !world.actors.contains_key(&parent) {
                return Err(ActorFactoryError::SpawnRejected {
                    blueprint: request.blueprint.clone(),
                    message: format!("parent {parent} not found"),
                });
            }
        }

        let actor_id = self.allocate_actor_id();
        let sensor = SensorType::from_blueprint(&request.blueprint).map(|sensor_type| {
            MockSensor::new(
                format!("{}_{}", sensor_type.tag(), actor_id.raw()),
                sensor_type,
                self.inner.config.sensor.clone(),
            )
        });

        world.actors.insert(
            actor_id,
            MockActor {
                blueprint: request.blueprint.clone(),
                attributes: request.attributes.clone(),
                transform: request.transform,
                parent: request.attach_to,
                autopilot: false,
                sensor,
            },
        );
        Ok(actor_id)
    }

    #[instrument(name = "mock_carla_set_autopilot", skip(self), fields(actor_id = %actor_id))]
    async fn set_autopilot(&self, actor_id: ActorId, enabled: bool) -> Result<()> {
        self.ensure_connected()?;
        self.with_live_actor(actor_id, |world, actor| {
            actor.autopilot = enabled;
            world.autopilot_calls.push((actor_id, enabled));
        })
    }

    #[instrument(
        name = "mock_carla_apply_control",
        skip(self, command),
        fields(actor_id = %actor_id)
    )]
    async fn apply_control(&self, actor_id: ActorId, command: &VehicleCommand) -> Result<()> {
        self.ensure_connected()?;
        self.with_live_actor(actor_id, |world, _| {
            world.commands.push((actor_id, *command));
        })
    }

    #[instrument(name = "mock_carla_destroy_actor", skip(self), fields(actor_id = %actor_id))]
    async fn destroy_actor(&self, actor_id: ActorId) -> Result<()> {
        if self.inner.config.fail_destroy.contains(&actor_id) {
            return Err(ActorFactoryError::DestroyFailed {
                actor_id,
                message: "mock failure".into(),
            });
        }

        let mut world = self.inner.world.lock();
        // 幂等：即使不存在也返回 Ok
        if let Some(actor) = world.actors.remove(&actor_id) {
            if let Some(sensor) = actor.sensor {
                sensor.stop();
            }
            world.destroyed.push(actor_id);
        }
        Ok(())
    }

    fn get_sensor_source(
        &self,
        actor_id: ActorId,
        _sensor_id: String,
        _sensor_type: SensorType,
    ) -> Option<Box<dyn SensorSource>> {
        self.sensor(actor_id)
            .map(|sensor| Box::new(sensor) as Box<dyn SensorSource>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connected_client(config: MockConfig) -> MockCarlaClient {
        let mut client = MockCarlaClient::with_config(config);
        client.connect("localhost", 2000).await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_mock_spawn_vehicle() {
        let client = connected_client(MockConfig::default()).await;

        let actor_id = client
            .spawn_actor(&SpawnRequest::new("vehicle.tesla.model3", Transform::default()))
            .await
            .unwrap();
        assert!(actor_id.raw() >= 1000);
        assert_eq!(client.actor_count(), 1);
        assert!(client.sensor(actor_id).is_none());
    }

    #[tokio::test]
    async fn test_mock_spawn_attached_sensor() {
        let client = connected_client(MockConfig::default()).await;

        let vehicle_id = client
            .spawn_actor(&SpawnRequest::new("vehicle.audi.tt", Transform::default()))
            .await
            .unwrap();
        let sensor_id = client
            .spawn_actor(
                &SpawnRequest::new("sensor.camera.rgb", Transform::default())
                    .attached_to(vehicle_id),
            )
            .await
            .unwrap();

        assert!(sensor_id > vehicle_id);
        assert_eq!(client.actor_parent(sensor_id), Some(vehicle_id));
        assert!(client
            .get_sensor_source(sensor_id, "cam".into(), SensorType::Camera)
            .is_some());
    }

    #[tokio::test]
    async fn test_mock_rejects_missing_parent() {
        let client = connected_client(MockConfig::default()).await;
        let result = client
            .spawn_actor(
                &SpawnRequest::new("sensor.camera.rgb", Transform::default())
                    .attached_to(ActorId::new(42)),
            )
            .await;
        assert!(matches!(result, Err(ActorFactoryError::SpawnRejected { .. })));
    }

    #[tokio::test]
    async fn test_mock_spawn_failure_injection() {
        let client = connected_client(MockConfig {
            fail_blueprints: vec!["sensor.camera".into()],
            ..Default::default()
        })
        .await;

        let result = client
            .spawn_actor(&SpawnRequest::new("sensor.camera.rgb", Transform::default()))
            .await;
        assert!(result.unwrap_err().is_spawn());
        assert_eq!(client.actor_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_connect_failures() {
        let mut client = MockCarlaClient::with_config(MockConfig {
            fail_connects: 2,
            ..Default::default()
        });

        assert!(client.connect("localhost", 2000).await.unwrap_err().is_connection());
        assert!(client.connect("localhost", 2000).await.is_err());
        assert!(client.connect("localhost", 2000).await.is_ok());
        assert_eq!(client.connect_attempts(), 3);
    }

    #[tokio::test]
    async fn test_mock_requires_connection() {
        let client = MockCarlaClient::new();
        let result = client.blueprint_catalog().await;
        assert!(result.unwrap_err().is_connection());
    }

    #[tokio::test]
    async fn test_mock_catalog_failure_injection() {
        let client = connected_client(MockConfig {
            fail_catalog: true,
            ..Default::default()
        })
        .await;
        let err = client.blueprint_catalog().await.unwrap_err();
        assert!(matches!(err, ActorFactoryError::CatalogUnavailable { .. }));
        assert!(!err.is_connection());
    }

    #[tokio::test]
    async fn test_mock_stale_handle() {
        let client = connected_client(MockConfig::default()).await;
        let actor_id = client
            .spawn_actor(&SpawnRequest::new("vehicle.tesla.model3", Transform::default()))
            .await
            .unwrap();

        client
            .apply_control(actor_id, &VehicleCommand::default())
            .await
            .unwrap();
        client.expire_actor(actor_id);

        let err = client
            .apply_control(actor_id, &VehicleCommand::default())
            .await
            .unwrap_err();
        assert!(err.is_command());
        assert_eq!(client.applied_commands(actor_id).len(), 1);
    }

    #[tokio::test]
    async fn test_mock_destroy_idempotent() {
        let client = connected_client(MockConfig::default()).await;

        let actor_id = client
            .spawn_actor(&SpawnRequest::new("vehicle.tesla.model3", Transform::default()))
            .await
            .unwrap();
        client.destroy_actor(actor_id).await.unwrap();
        // Second destroy should also succeed
        client.destroy_actor(actor_id).await.unwrap();
        assert_eq!(client.actor_count(), 0);
        assert_eq!(client.destroy_count(actor_id), 1);
    }

    #[tokio::test]
    async fn test_mock_destroy_stops_sensor() {
        let client = connected_client(MockConfig {
            sensor: MockSensorConfig {
                frequency_hz: 0.0,
                ..Default::default()
            },
            ..Default::default()
        })
        .await;

        let vehicle = client
            .spawn_actor(&SpawnRequest::new("vehicle.audi.tt", Transform::default()))
            .await
            .unwrap();
        let camera = client
            .spawn_actor(
                &SpawnRequest::new("sensor.camera.rgb", Transform::default()).attached_to(vehicle),
            )
            .await
            .unwrap();
        let sensor = client.sensor(camera).unwrap();
        sensor.listen(Arc::new(|_| {}));
        assert!(sensor.is_listening());

        client.destroy_actor(camera).await.unwrap();
        assert!(!sensor.is_listening());
    }
}
