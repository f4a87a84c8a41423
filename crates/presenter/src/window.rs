//! Window surface (winit + pixels)
//!
//! Only compiled when `window` feature is enabled.
//! The event loop is pumped from the control loop once per tick, so it must
//! stay on the thread that created it.

use std::sync::Arc;
use std::time::Duration;

use control::{InputDevice, InputSnapshot, Keys};
use contracts::Frame;
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, info};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use crate::error::SurfaceError;
use crate::surface::{for_each_visible, Surface};

/// Pixel buffer shown in a native window
pub struct WindowSurface {
    // pixels 持有窗口句柄，窗口必须比它活得久
    pixels: Pixels,
    window: Arc<Window>,
    width: u32,
    height: u32,
}

/// Keyboard and close events of the window
pub struct WindowInput {
    event_loop: EventLoop<()>,
    pressed: Keys,
    quit: bool,
}

impl WindowSurface {
    /// Open a `width`×`height` window and its input device
    pub fn open(
        width: u32,
        height: u32,
        title: &str,
    ) -> Result<(Self, WindowInput), SurfaceError> {
        let event_loop = EventLoop::new().map_err(|e| SurfaceError::init(e.to_string()))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(title)
                .with_inner_size(LogicalSize::new(width as f64, height as f64))
                .with_resizable(false)
                .build(&event_loop)
                .map_err(|e| SurfaceError::init(e.to_string()))?,
        );

        let inner = window.inner_size();
        let texture = SurfaceTexture::new(inner.width, inner.height, window.as_ref());
        let pixels =
            Pixels::new(width, height, texture).map_err(|e| SurfaceError::init(e.to_string()))?;

        info!(width, height, title, "display window opened");

        Ok((
            Self {
                pixels,
                window,
                width,
                height,
            },
            WindowInput {
                event_loop,
                pressed: Keys::empty(),
                quit: false,
            },
        ))
    }
}

impl Surface for WindowSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn blit(&mut self, frame: &Frame) -> Result<(), SurfaceError> {
        let width = self.width as usize;
        let buffer = self.pixels.frame_mut();
        for_each_visible(frame, self.width, self.height, |x, y, rgb| {
            let offset = (y * width + x) * 4;
            buffer[offset..offset + 3].copy_from_slice(rgb);
            buffer[offset + 3] = 0xff;
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.window.request_redraw();
        self.pixels
            .render()
            .map_err(|e| SurfaceError::render(e.to_string()))
    }
}

fn key_for(code: KeyCode) -> Option<Keys> {
    let key = match code {
        KeyCode::ArrowLeft => Keys::LEFT,
        KeyCode::ArrowRight => Keys::RIGHT,
        KeyCode::ArrowUp => Keys::UP,
        KeyCode::ArrowDown => Keys::DOWN,
        KeyCode::KeyA => Keys::A,
        KeyCode::KeyD => Keys::D,
        KeyCode::KeyW => Keys::W,
        KeyCode::KeyS => Keys::S,
        KeyCode::Space => Keys::SPACE,
        KeyCode::KeyQ => Keys::Q,
        KeyCode::KeyP => Keys::P,
        KeyCode::Escape => Keys::ESCAPE,
        _ => return None,
    };
    Some(key)
}

impl WindowInput {
    fn handle_key(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = key_for(code) else {
            return;
        };
        self.pressed.set(key, event.state == ElementState::Pressed);
    }
}

impl InputDevice for WindowInput {
    fn poll(&mut self) -> InputSnapshot {
        let mut events = Vec::new();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _| {
                if let Event::WindowEvent { event, .. } = event {
                    events.push(event);
                }
            });

        for event in events {
            match event {
                WindowEvent::CloseRequested => {
                    debug!("window close requested");
                    self.quit = true;
                }
                WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
                WindowEvent::Focused(false) => self.pressed = Keys::empty(),
                _ => {}
            }
        }

        if let PumpStatus::Exit(code) = status {
            debug!(code, "event loop exited");
            self.quit = true;
        }

        InputSnapshot {
            pressed: self.pressed,
            quit: self.quit || self.pressed.contains(Keys::ESCAPE),
        }
    }
}
