//! Real CARLA client implementation
//!
//! Connects to CARLA server using carla-rust crate.

use std::collections::HashMap;
use std::sync::Arc;

use carla::client::{ActorBase, Client, Sensor, Vehicle, World};
use carla::geom::{Location, Rotation, Transform as CarlaTransform};
use carla::rpc::VehicleControl;
use contracts::{
    ActorId, AttributeInfo, BlueprintInfo, SensorSource, SensorType, SpawnRequest, Transform,
    VehicleCommand,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::carla_camera::CarlaCamera;
use crate::client::CarlaClient;
use crate::error::{ActorFactoryError, Result};

/// Attributes exported in the blueprint catalog
const CATALOG_ATTRIBUTES: &[&str] = &["color"];

/// Real CARLA client
///
/// Wraps carla-rust's Client, implements CarlaClient trait.
/// Uses Mutex for interior mutability, allowing `&self` methods to modify World.
#[derive(Default, Clone)]
pub struct RealCarlaClient {
    client: Arc<Mutex<Option<Client>>>,
    world: Arc<Mutex<Option<World>>>,
    /// Actors spawned through this client
    actors: Arc<Mutex<HashMap<ActorId, ActorKind>>>,
}

#[derive(Clone)]
enum ActorKind {
    Vehicle(Vehicle),
    Sensor(Sensor),
}

impl RealCarlaClient {
    /// Create new client (disconnected state)
    pub fn new() -> Self {
        Self::default()
    }

    fn with_world_mut<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut World) -> Result<R>,
    {
        let mut world_guard = self.world.lock();
        let world = world_guard
            .as_mut()
            .ok_or_else(|| ActorFactoryError::connection("not connected to CARLA server"))?;
        f(world)
    }

    fn vehicle(&self, actor_id: ActorId) -> Result<Vehicle> {
        match self.actors.lock().get(&actor_id) {
            Some(ActorKind::Vehicle(v)) => Ok(v.clone()),
            _ => Err(ActorFactoryError::stale_actor(actor_id)),
        }
    }

    fn spawn_in_world(
        world: &mut World,
        request: &SpawnRequest,
        parent: Option<&Vehicle>,
    ) -> Result<ActorKind> {
        let rejected = |message: String| ActorFactoryError::SpawnRejected {
            blueprint: request.blueprint.clone(),
            message,
        };

        let mut blueprint = world
            .blueprint_library()
            .find(&request.blueprint)
            .ok_or_else(|| rejected("blueprint not found".into()))?;

        for (key, value) in &request.attributes {
            if !blueprint.set_attribute(key, value) {
                warn!(key = %key, value = %value, "failed to set blueprint attribute");
            }
        }

        let transform = to_carla_transform(&request.transform);
        let actor = match parent {
            Some(parent) => world.spawn_actor_attached(&blueprint, &transform, parent, None),
            None => world.spawn_actor(&blueprint, &transform),
        }
        .map_err(|e| rejected(e.to_string()))?;

        if parent.is_some() {
            Sensor::try_from(actor)
                .map(ActorKind::Sensor)
                .map_err(|_| rejected("spawned actor is not a sensor".into()))
        } else {
            Vehicle::try_from(actor)
                .map(ActorKind::Vehicle)
                .map_err(|_| rejected("spawned actor is not a vehicle".into()))
        }
    }

    /// Get underlying CARLA Sensor object
    pub fn get_sensor(&self, actor_id: ActorId) -> Option<Sensor> {
        match self.actors.lock().get(&actor_id) {
            Some(ActorKind::Sensor(sensor)) => Some(sensor.clone()),
            _ => None,
        }
    }
}

/// Convert internal Transform to CARLA Transform
fn to_carla_transform(transform: &Transform) -> CarlaTransform {
    CarlaTransform {
        location: Location {
            x: transform.location.x as f32,
            y: transform.location.y as f32,
            z: transform.location.z as f32,
        },
        rotation: Rotation {
            pitch: transform.rotation.pitch as f32,
            yaw: transform.rotation.yaw as f32,
            roll: transform.rotation.roll as f32,
        },
    }
}

fn to_vehicle_control(command: &VehicleCommand) -> VehicleControl {
    VehicleControl {
        throttle: command.throttle,
        steer: command.steer,
        brake: command.brake,
        hand_brake: command.hand_brake,
        reverse: command.reverse,
        ..Default::default()
    }
}

impl CarlaClient for RealCarlaClient {
    #[instrument(name = "real_carla_connect", skip(self), fields(host = %host, port))]
    async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        let host_owned = host.to_string();
        // carla-rust 在连接失败时 panic，放到阻塞线程里隔离
        let (client, world) = tokio::task::spawn_blocking(move || {
            let client = Client::connect(&host_owned, port, None);
            let world = client.world();
            (client, world)
        })
        .await
        .map_err(|e| ActorFactoryError::connection(format!("{host}:{port}: {e}")))?;

        info!(map = %world.map().name(), "connected to CARLA server");

        *self.client.lock() = Some(client);
        *self.world.lock() = Some(world);
        Ok(())
    }

    #[instrument(name = "real_carla_blueprint_catalog", skip(self))]
    async fn blueprint_catalog(&self) -> Result<Vec<BlueprintInfo>> {
        self.with_world_mut(|world| {
            let catalog = world
                .blueprint_library()
                .iter()
                .map(|bp| {
                    let attributes = CATALOG_ATTRIBUTES
                        .iter()
                        .filter_map(|id| bp.attribute(id))
                        .map(|attr| AttributeInfo {
                            id: attr.id(),
                            recommended_values: attr.recommended_values(),
                        })
                        .collect();
                    BlueprintInfo {
                        id: bp.id(),
                        attributes,
                    }
                })
                .collect::<Vec<_>>();
            if catalog.is_empty() {
                return Err(ActorFactoryError::CatalogUnavailable {
                    message: "server returned an empty blueprint library".into(),
                });
            }
            debug!(blueprints = catalog.len(), "blueprint catalog loaded");
            Ok(catalog)
        })
    }

    #[instrument(
        name = "real_carla_spawn_actor",
        skip(self, request),
        fields(blueprint = %request.blueprint, attach_to = ?request.attach_to)
    )]
    async fn spawn_actor(&self, request: &SpawnRequest) -> Result<ActorId> {
        let parent = match request.attach_to {
            Some(parent_id) => Some(self.vehicle(parent_id).map_err(|_| {
                ActorFactoryError::SpawnRejected {
                    blueprint: request.blueprint.clone(),
                    message: format!("parent {parent_id} not found"),
                }
            })?),
            None => None,
        };

        let actor =
            self.with_world_mut(|world| Self::spawn_in_world(world, request, parent.as_ref()))?;
        let actor_id = ActorId::new(match &actor {
            ActorKind::Vehicle(v) => v.id(),
            ActorKind::Sensor(s) => s.id(),
        });

        debug!(actor_id = %actor_id, "actor spawned");
        self.actors.lock().insert(actor_id, actor);
        Ok(actor_id)
    }

    #[instrument(name = "real_carla_set_autopilot", skip(self), fields(actor_id = %actor_id))]
    async fn set_autopilot(&self, actor_id: ActorId, enabled: bool) -> Result<()> {
        self.vehicle(actor_id)?.set_autopilot(enabled);
        Ok(())
    }

    async fn apply_control(&self, actor_id: ActorId, command: &VehicleCommand) -> Result<()> {
        let vehicle = self.vehicle(actor_id)?;
        if !vehicle.is_alive() {
            self.actors.lock().remove(&actor_id);
            return Err(ActorFactoryError::stale_actor(actor_id));
        }
        vehicle.apply_control(&to_vehicle_control(command));
        Ok(())
    }

    #[instrument(name = "real_carla_destroy_actor", skip(self), fields(actor_id = %actor_id))]
    async fn destroy_actor(&self, actor_id: ActorId) -> Result<()> {
        let Some(actor) = self.actors.lock().remove(&actor_id) else {
            // 幂等
            return Ok(());
        };

        let destroyed = match actor {
            ActorKind::Vehicle(vehicle) => vehicle.destroy(),
            ActorKind::Sensor(sensor) => {
                if sensor.is_listening() {
                    sensor.stop();
                }
                sensor.destroy()
            }
        };

        if !destroyed {
            return Err(ActorFactoryError::DestroyFailed {
                actor_id,
                message: "simulator returned false".into(),
            });
        }
        debug!("actor destroyed");
        Ok(())
    }

    fn get_sensor_source(
        &self,
        actor_id: ActorId,
        sensor_id: String,
        sensor_type: SensorType,
    ) -> Option<Box<dyn SensorSource>> {
        let sensor = self.get_sensor(actor_id)?;
        Some(Box::new(CarlaCamera::new(sensor_id, sensor_type, sensor)))
    }
}
