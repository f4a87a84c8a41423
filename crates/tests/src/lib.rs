//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置解析测试
//! - 模拟 e2e 测试（无需 CARLA）：生成 → 出帧 → 显示 → 回收
//! - 重试与模式切换场景

#[cfg(test)]
mod support {
    use actor_factory::{MockCarlaClient, MockConfig, MockSensorConfig};
    use contracts::{ActorId, DriveConfig};
    use control::{InputDevice, InputSnapshot};
    use presenter::{DisplayPresenter, HeadlessSurface};

    pub const WIDTH: u32 = 8;
    pub const HEIGHT: u32 = 6;

    /// Mock 客户端：传感器不自动出帧，由测试手动投递
    pub fn mock_client(config: MockConfig) -> MockCarlaClient {
        MockCarlaClient::with_config(MockConfig {
            sensor: MockSensorConfig {
                frequency_hz: 0.0,
                image_width: WIDTH,
                image_height: HEIGHT,
            },
            ..config
        })
    }

    pub fn headless_presenter() -> DisplayPresenter<HeadlessSurface> {
        DisplayPresenter::new(HeadlessSurface::new(WIDTH, HEIGHT).unwrap())
    }

    pub fn drive_config() -> DriveConfig {
        let mut config = DriveConfig::default();
        config.display.width = WIDTH;
        config.display.height = HEIGHT;
        config.session.retry_delay_ms = 200;
        config
    }

    /// 当前存活的相机 actor
    pub fn camera_of(client: &MockCarlaClient) -> Option<ActorId> {
        client
            .all_actor_ids()
            .into_iter()
            .find(|id| client.actor_parent(*id).is_some())
    }

    /// 每个 tick 调用一次 hook，参数为 tick 序号 (从 0 开始)
    pub struct HookedInput<F> {
        tick: u64,
        hook: F,
    }

    impl<F: FnMut(u64) -> InputSnapshot> HookedInput<F> {
        pub fn new(hook: F) -> Self {
            Self { tick: 0, hook }
        }
    }

    impl<F: FnMut(u64) -> InputSnapshot> InputDevice for HookedInput<F> {
        fn poll(&mut self) -> InputSnapshot {
            let snapshot = (self.hook)(self.tick);
            self.tick += 1;
            snapshot
        }
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use carla_drive::{resolve_config, Overrides};
    use config_loader::ConfigLoader;
    use contracts::{ControlMode, DriveConfig, SensorType};

    #[test]
    fn test_default_config_is_valid() {
        let config = DriveConfig::default();
        ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.server.port, 2000);
        assert_eq!(config.initial_mode(), ControlMode::Manual);
        assert_eq!(config.camera.sensor_type, SensorType::Camera);
    }

    #[test]
    fn test_config_file_and_cli_overrides() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[server]\nhost = \"10.1.1.1\"\n\n[camera]\nsensor_type = \"depth\""
        )
        .unwrap();

        let overrides = Overrides {
            autopilot: true,
            ..Default::default()
        };
        let config = resolve_config(Some(file.path()), &overrides).unwrap();

        assert_eq!(config.server.host, "10.1.1.1");
        assert_eq!(config.camera.sensor_type, SensorType::Depth);
        assert_eq!(config.initial_mode(), ControlMode::Autonomous);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actor_factory::{ActorLifecycle, MockConfig};
    use carla_drive::{SessionRunner, ShutdownSignal};
    use control::{InputSnapshot, Keys, ScriptedInput};
    use presenter::FrameRecorder;

    use super::support::*;

    /// End-to-end test: spawn -> camera frame -> present -> teardown
    ///
    /// 验证完整的数据流：
    /// 1. 生成受控车辆、自动驾驶车辆和相机
    /// 2. 相机帧经解码进入 mailbox
    /// 3. 下一次 render 显示该帧
    /// 4. 回收时三个 actor 各销毁一次
    #[tokio::test]
    async fn test_e2e_frame_reaches_display() {
        let sim = mock_client(MockConfig::default());
        let mut lifecycle = ActorLifecycle::new(sim.clone());
        let mut presenter = headless_presenter();
        let config = drive_config();

        lifecycle.connect("localhost", 2000).await.unwrap();
        let state = lifecycle
            .spawn_session(&config, presenter.mailbox().sensor_callback(None))
            .await
            .unwrap();
        assert!(state.is_complete());

        let camera = state.sensor.unwrap();
        let sensor = sim.sensor(camera).unwrap();
        assert!(sensor.emit_test_pattern());

        assert!(presenter.render_tick().unwrap());
        // 测试图案 (BGRA): B = x, G = y, R = 帧号
        assert_eq!(presenter.surface().pixel(2, 1), Some([1, 1, 2]));
        assert_eq!(presenter.surface().pixel(WIDTH - 1, HEIGHT - 1), Some([1, 5, 7]));

        let ids = [state.controlled, state.autonomous, state.sensor].map(Option::unwrap);
        lifecycle.teardown(state).await;

        for id in ids {
            assert_eq!(sim.destroy_count(id), 1);
        }
        assert_eq!(sim.actor_count(), 0);
        assert!(!sensor.emit_test_pattern());
    }

    /// 只有最新一帧会被显示，旧帧被覆盖
    #[tokio::test]
    async fn test_e2e_latest_frame_wins() {
        let sim = mock_client(MockConfig::default());
        let mut lifecycle = ActorLifecycle::new(sim.clone());
        let mut presenter = headless_presenter();

        lifecycle.connect("localhost", 2000).await.unwrap();
        let state = lifecycle
            .spawn_session(&drive_config(), presenter.mailbox().sensor_callback(None))
            .await
            .unwrap();
        let sensor = sim.sensor(state.sensor.unwrap()).unwrap();

        for _ in 0..3 {
            sensor.emit_test_pattern();
        }
        assert!(presenter.render_tick().unwrap());
        assert_eq!(presenter.surface().pixel(0, 0), Some([3, 0, 0]));
        assert!(!presenter.render_tick().unwrap());

        let stats = presenter.mailbox().metrics().snapshot();
        assert_eq!(stats.received, 3);
        assert_eq!(stats.overwritten, 2);
        assert_eq!(stats.taken, 1);

        lifecycle.teardown(state).await;
    }

    /// Runner 驱动完整会话：帧在运行中到达并被显示
    #[tokio::test(start_paused = true)]
    async fn test_runner_presents_frames() {
        let sim = mock_client(MockConfig::default());
        let hook_sim = sim.clone();
        let input = HookedInput::new(move |tick| {
            if tick == 2 {
                if let Some(sensor) = camera_of(&hook_sim).and_then(|id| hook_sim.sensor(id)) {
                    sensor.emit_test_pattern();
                }
            }
            if tick >= 4 {
                InputSnapshot::quit()
            } else {
                InputSnapshot::keys(Keys::W)
            }
        });

        let mut runner = SessionRunner::new(
            sim.clone(),
            headless_presenter(),
            input,
            drive_config(),
        );
        let stats = runner.run().await;

        assert_eq!(stats.sessions_started, 1);
        assert_eq!(stats.ticks, 4);
        assert_eq!(stats.frames_presented, 1);
        assert_eq!(runner.presenter().surface().pixel(3, 2), Some([1, 2, 3]));
        assert_eq!(sim.actor_count(), 0);
        assert_eq!(sim.destroyed_actors().len(), 3);
    }

    /// 连接失败不断重试，直到服务器可用
    #[tokio::test(start_paused = true)]
    async fn test_retry_until_server_available() {
        let sim = mock_client(MockConfig {
            fail_connects: 5,
            ..Default::default()
        });
        let mut runner = SessionRunner::new(
            sim.clone(),
            headless_presenter(),
            ScriptedInput::default().then_quit(),
            drive_config(),
        );

        let started = tokio::time::Instant::now();
        let stats = runner.run().await;

        assert_eq!(sim.connect_attempts(), 6);
        assert_eq!(stats.retries, 5);
        assert_eq!(stats.sessions_started, 1);
        assert!(started.elapsed() >= Duration::from_millis(5 * 200));
    }

    /// 受控车辆被服务器删除 → 命令失败 → 回收并重新生成
    #[tokio::test(start_paused = true)]
    async fn test_stale_vehicle_triggers_respawn() {
        let sim = mock_client(MockConfig::default());
        let hook_sim = sim.clone();
        let input = HookedInput::new(move |tick| {
            if tick == 1 {
                // 受控车辆是第一个生成的 actor
                let controlled = hook_sim.all_actor_ids()[0];
                hook_sim.expire_actor(controlled);
            }
            if tick >= 4 {
                InputSnapshot::quit()
            } else {
                InputSnapshot::keys(Keys::UP)
            }
        });

        let mut runner = SessionRunner::new(
            sim.clone(),
            headless_presenter(),
            input,
            drive_config(),
        );
        let stats = runner.run().await;

        assert_eq!(stats.sessions_started, 2);
        assert_eq!(stats.retries, 1);
        assert!(stats.last_error.unwrap().contains("actor_1000"));
        // 第一轮剩下的两个 actor + 第二轮三个
        assert_eq!(sim.destroyed_actors().len(), 5);
        assert_eq!(sim.actor_count(), 0);
    }

    /// 会话中途断线 → 命令失败 → 回收全部 actor，重连后开始新会话
    #[tokio::test(start_paused = true)]
    async fn test_disconnect_mid_session_reconnects() {
        let sim = mock_client(MockConfig::default());
        let hook_sim = sim.clone();
        let input = HookedInput::new(move |tick| {
            if tick == 1 {
                hook_sim.disconnect();
            }
            if tick >= 4 {
                InputSnapshot::quit()
            } else {
                InputSnapshot::keys(Keys::W)
            }
        });

        let mut runner = SessionRunner::new(
            sim.clone(),
            headless_presenter(),
            input,
            drive_config(),
        );
        let stats = runner.run().await;

        assert_eq!(sim.connect_attempts(), 2);
        assert_eq!(stats.sessions_started, 2);
        assert_eq!(stats.retries, 1);
        assert!(stats.last_error.unwrap().contains("failed to connect"));
        // 第一轮: tick 0; 第二轮: tick 2, 3
        assert_eq!(stats.commands_applied, 3);
        // 两轮各三个 actor 全部回收
        assert_eq!(sim.destroyed_actors().len(), 6);
        assert_eq!(sim.actor_count(), 0);
    }

    /// P 切换到自动驾驶后不再发送手动命令，再按 P 恢复
    #[tokio::test(start_paused = true)]
    async fn test_mode_toggle_round_trip() {
        let sim = mock_client(MockConfig::default());
        let input = ScriptedInput::from_keys([
            Keys::W,
            Keys::P,
            Keys::P | Keys::W,
            Keys::W,
            Keys::empty(),
            Keys::P,
            Keys::S,
        ])
        .then_quit();

        let mut runner = SessionRunner::new(
            sim.clone(),
            headless_presenter(),
            input,
            drive_config(),
        );
        let stats = runner.run().await;

        assert_eq!(stats.mode_switches, 2);
        // W; 切回手动的那个 tick (空命令); S
        assert_eq!(stats.commands_applied, 3);

        let calls = sim.autopilot_calls();
        // 生成时: 受控=false, 自动驾驶=true; 之后两次切换
        assert_eq!(calls.len(), 4);
        assert!(calls[2].1);
        assert!(!calls[3].1);
    }

    /// Ctrl-C 在重试等待中也能立即退出
    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_retry_delay() {
        let sim = mock_client(MockConfig {
            fail_connects: u32::MAX,
            ..Default::default()
        });
        let mut config = drive_config();
        config.session.retry_delay_ms = 60_000;

        let shutdown = ShutdownSignal::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.trigger();
        });

        let mut runner = SessionRunner::new(
            sim.clone(),
            headless_presenter(),
            ScriptedInput::default(),
            config,
        )
        .with_shutdown(shutdown);

        let started = tokio::time::Instant::now();
        let stats = runner.run().await;

        assert_eq!(stats.sessions_started, 0);
        assert!(stats.attempts >= 1);
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    /// 保存帧：每个显示的相机帧写出一个 PNG
    #[tokio::test(start_paused = true)]
    async fn test_recorder_writes_frames() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(FrameRecorder::create(dir.path()).unwrap());

        let sim = mock_client(MockConfig::default());
        let hook_sim = sim.clone();
        let input = HookedInput::new(move |tick| {
            if tick < 2 {
                if let Some(sensor) = camera_of(&hook_sim).and_then(|id| hook_sim.sensor(id)) {
                    sensor.emit_test_pattern();
                }
                InputSnapshot::default()
            } else {
                InputSnapshot::quit()
            }
        });

        let mut runner =
            SessionRunner::new(sim, headless_presenter(), input, drive_config())
                .with_recorder(recorder.clone());
        runner.run().await;

        let first = recorder.path_for(1, "camera");
        let second = recorder.path_for(2, "camera");
        assert!(first.exists(), "missing {}", first.display());
        assert!(second.exists(), "missing {}", second.display());

        let img = image::open(&second).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        assert_eq!(img.get_pixel(4, 3).0, [2, 3, 4]);
    }

    /// 非图像数据被丢弃，不影响显示
    #[tokio::test]
    async fn test_malformed_packet_is_dropped() {
        let sim = mock_client(MockConfig::default());
        let mut lifecycle = ActorLifecycle::new(sim.clone());
        let mut presenter = headless_presenter();

        lifecycle.connect("localhost", 2000).await.unwrap();
        let state = lifecycle
            .spawn_session(&drive_config(), presenter.mailbox().sensor_callback(None))
            .await
            .unwrap();
        let sensor = sim.sensor(state.sensor.unwrap()).unwrap();

        assert!(sensor.emit_raw(bytes::Bytes::from_static(&[1, 2, 3])));
        assert!(!presenter.render_tick().unwrap());
        assert_eq!(presenter.mailbox().metrics().snapshot().decode_failed, 1);

        lifecycle.teardown(state).await;
    }
}
