//! ActorLifecycle 核心实现
//!
//! Spawns the three session actors, forwards commands to the controlled vehicle
//! and releases everything in a fixed order.

use contracts::{
    ActorId, ActorRole, BlueprintInfo, DriveConfig, SensorDataCallback, SessionState,
    SpawnRequest, VehicleCommand, VehicleSpec,
};
use rand::seq::IndexedRandom;
use tracing::{debug, error, info, instrument, warn};

use crate::client::CarlaClient;
use crate::error::{ActorFactoryError, Result};

/// Actor lifecycle manager
///
/// Owns the client; a [`SessionState`] produced by [`spawn_session`](Self::spawn_session)
/// must be handed back to [`teardown`](Self::teardown) on every exit path.
pub struct ActorLifecycle<C: CarlaClient> {
    client: C,
}

impl<C: CarlaClient> ActorLifecycle<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Connect (or reconnect) the underlying client
    pub async fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.client.connect(host, port).await
    }

    /// Spawn the controlled vehicle, the autonomous vehicle and the camera.
    ///
    /// # Atomicity
    /// If any spawn fails, every actor created so far is destroyed before the
    /// error is returned.
    #[instrument(
        name = "actor_lifecycle_spawn_session",
        skip_all,
        fields(mode = ?config.initial_mode())
    )]
    pub async fn spawn_session(
        &self,
        config: &DriveConfig,
        on_frame: SensorDataCallback,
    ) -> Result<SessionState> {
        let mut state = SessionState::new(config.initial_mode());

        match self.spawn_into(config, on_frame, &mut state).await {
            Ok(()) => {
                info!(
                    controlled = ?state.controlled,
                    autonomous = ?state.autonomous,
                    sensor = ?state.sensor,
                    "session actors spawned"
                );
                Ok(state)
            }
            Err(e) => {
                warn!(error = %e, "session spawn failed, rolling back actors");
                self.teardown(state).await;
                Err(e)
            }
        }
    }

    async fn spawn_into(
        &self,
        config: &DriveConfig,
        on_frame: SensorDataCallback,
        state: &mut SessionState,
    ) -> Result<()> {
        let catalog = self.client.blueprint_catalog().await?;
        let (ego_request, npc_request) = plan_vehicles(&catalog, config)?;

        // Controlled vehicle
        let controlled = self.spawn_role(ActorRole::Controlled, &ego_request).await?;
        state.register(ActorRole::Controlled, controlled);
        self.set_autonomous(controlled, state.mode.is_autonomous())
            .await?;

        // Autonomous vehicle, always on autopilot
        let autonomous = self.spawn_role(ActorRole::Autonomous, &npc_request).await?;
        state.register(ActorRole::Autonomous, autonomous);
        self.set_autonomous(autonomous, true).await?;

        // Camera attached to the controlled vehicle
        let sensor_type = config.camera.sensor_type;
        let mut camera_request =
            SpawnRequest::new(sensor_type.blueprint(), config.camera.transform)
                .attached_to(controlled);
        camera_request.attributes = config.camera_attributes();

        let sensor = self.spawn_role(ActorRole::Sensor, &camera_request).await?;
        state.register(ActorRole::Sensor, sensor);

        let source = self
            .client
            .get_sensor_source(sensor, sensor_type.tag().to_string(), sensor_type)
            .ok_or_else(|| {
                ActorFactoryError::spawn(
                    ActorRole::Sensor,
                    sensor_type.blueprint(),
                    "sensor source unavailable",
                )
            })?;
        source.listen(on_frame);
        debug!(actor_id = %sensor, sensor_id = source.sensor_id(), "sensor subscribed");

        Ok(())
    }

    #[instrument(
        name = "actor_lifecycle_spawn_role",
        skip(self, request),
        fields(role = %role, blueprint = %request.blueprint)
    )]
    async fn spawn_role(&self, role: ActorRole, request: &SpawnRequest) -> Result<ActorId> {
        let actor_id = self
            .client
            .spawn_actor(request)
            .await
            .map_err(|e| match e {
                e @ ActorFactoryError::ConnectionFailed { .. } => e,
                other => ActorFactoryError::spawn(role, &request.blueprint, other.to_string()),
            })?;

        info!(actor_id = %actor_id, "actor spawned");
        Ok(actor_id)
    }

    /// Forward a command to the controlled vehicle
    pub async fn apply_command(&self, actor_id: ActorId, command: &VehicleCommand) -> Result<()> {
        self.client.apply_control(actor_id, command).await
    }

    /// Toggle server-side autopilot for a vehicle
    #[instrument(name = "actor_lifecycle_set_autonomous", skip(self), fields(actor_id = %actor_id))]
    pub async fn set_autonomous(&self, actor_id: ActorId, enabled: bool) -> Result<()> {
        self.client.set_autopilot(actor_id, enabled).await?;
        debug!("autopilot updated");
        Ok(())
    }

    /// Destroy every actor of a session: sensor, controlled, autonomous.
    ///
    /// Individual failures are logged and do not stop the remaining destroys.
    /// Consumes the state, so each session is released once.
    #[instrument(
        name = "actor_lifecycle_teardown",
        skip_all,
        fields(
            controlled = ?state.controlled,
            autonomous = ?state.autonomous,
            sensor = ?state.sensor
        )
    )]
    pub async fn teardown(&self, state: SessionState) {
        let actors = state.teardown_order();
        if actors.is_empty() {
            debug!("nothing to tear down");
            return;
        }

        info!(actors = actors.len(), "starting teardown");
        for (role, actor_id) in actors {
            self.destroy_actor_safe(role, actor_id).await;
        }
        info!("teardown completed");
    }

    /// 安全销毁 actor（忽略错误，仅记录日志）
    async fn destroy_actor_safe(&self, role: ActorRole, actor_id: ActorId) {
        debug!(actor_id = %actor_id, role = %role, "destroying actor");

        if let Err(e) = self.client.destroy_actor(actor_id).await {
            error!(
                actor_id = %actor_id,
                role = %role,
                error = %e,
                "failed to destroy actor"
            );
        }
    }
}

/// Resolve the blueprints and attributes of both vehicles.
///
/// Kept synchronous so the thread-local RNG never lives across an await.
fn plan_vehicles(
    catalog: &[BlueprintInfo],
    config: &DriveConfig,
) -> Result<(SpawnRequest, SpawnRequest)> {
    let mut rng = rand::rng();

    let ego = choose_vehicle(catalog, &config.ego, ActorRole::Controlled, &mut rng)?;
    let ego_request = SpawnRequest::new(&ego.id, config.ego.spawn_point);

    let npc = choose_vehicle(catalog, &config.npc.vehicle, ActorRole::Autonomous, &mut rng)?;
    let mut npc_request = SpawnRequest::new(&npc.id, config.npc.vehicle.spawn_point);
    let attribute = &config.npc.randomize_attribute;
    match npc
        .attribute(attribute)
        .and_then(|attr| attr.recommended_values.choose(&mut rng))
    {
        Some(value) => {
            debug!(
                blueprint = %npc.id,
                attribute = %attribute,
                value = %value,
                "randomized appearance"
            );
            npc_request = npc_request.with_attribute(attribute, value);
        }
        None => {
            warn!(
                blueprint = %npc.id,
                attribute = %attribute,
                "attribute has no recommended values, keeping default"
            );
        }
    }

    Ok((ego_request, npc_request))
}

/// Pinned blueprint if configured, otherwise a random match of the filter.
fn choose_vehicle<'a, R: rand::Rng + ?Sized>(
    catalog: &'a [BlueprintInfo],
    spec: &VehicleSpec,
    role: ActorRole,
    rng: &mut R,
) -> Result<&'a BlueprintInfo> {
    if let Some(pinned) = &spec.blueprint {
        return catalog
            .iter()
            .find(|bp| &bp.id == pinned)
            .ok_or_else(|| ActorFactoryError::spawn(role, pinned, "blueprint not in catalog"));
    }

    let candidates: Vec<&BlueprintInfo> = catalog
        .iter()
        .filter(|bp| bp.matches(&spec.blueprint_filter))
        .collect();

    candidates.choose(rng).copied().ok_or_else(|| {
        ActorFactoryError::spawn(
            role,
            &spec.blueprint_filter,
            "no blueprint matches filter",
        )
    })
}
