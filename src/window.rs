//! SDL2 window host.
//!
//! Owns the window, the ARGB8888 streaming texture the software
//! framebuffer is uploaded into, and the event pump. The texture update
//! inside [`Window::present`] is the lock/unlock boundary around pixel
//! mutation; the renderer itself never touches the surface.

use std::time::Instant;

use sdl2::event::Event;
use sdl2::keyboard::{Keycode, Scancode};
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

pub const WINDOW_WIDTH: u32 = 640;
pub const WINDOW_HEIGHT: u32 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    Resize(u32, u32),
    KeyPress(Key),
}

/// Settings toggles handled by the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Cycle filter mode (hardware path only).
    F,
    /// Toggle software/hardware rendering.
    R,
    /// Toggle transparency.
    T,
    /// Cycle cull mode.
    C,
    /// Print FPS.
    P,
}

/// Per-frame input snapshot for the camera controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    pub mouse_left: bool,
    pub mouse_right: bool,
    /// Relative mouse motion since the previous frame, in pixels.
    pub mouse_delta: (i32, i32),
    /// Strafe axis from A/D or the arrow keys: -1, 0, or 1.
    pub move_x: f32,
    /// Walk axis from W/S or the arrow keys: -1, 0, or 1.
    pub move_y: f32,
    /// Zoom axis from I (in) / O (out): -1, 0, or 1.
    pub zoom: f32,
}

/// Tracks frames per second with once-per-second updates.
pub struct FpsCounter {
    frame_count: u32,
    last_update: Instant,
    fps: f64,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_update: Instant::now(),
            fps: 0.0,
        }
    }

    /// Call once per frame; refreshes the reading once per second.
    pub fn tick(&mut self) {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();
        if elapsed.as_secs() >= 1 {
            self.fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    texture: sdl2::render::Texture<'static>,
    event_pump: sdl2::EventPump,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as
        // Window. Field order guarantees texture drops first.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture_creator,
            texture,
            event_pump,
            width,
            height,
        })
    }

    /// Drain pending events, returning the first one the host must act on.
    pub fn poll_events(&mut self) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => return WindowEvent::Resize(w as u32, h as u32),
                Event::KeyDown {
                    keycode: Some(keycode),
                    ..
                } => {
                    let key = match keycode {
                        Keycode::F => Some(Key::F),
                        Keycode::R => Some(Key::R),
                        Keycode::T => Some(Key::T),
                        Keycode::C => Some(Key::C),
                        Keycode::P => Some(Key::P),
                        _ => None,
                    };
                    if let Some(k) = key {
                        return WindowEvent::KeyPress(k);
                    }
                }
                _ => {}
            }
        }
        WindowEvent::None
    }

    /// Snapshot the keyboard and relative mouse state for this frame.
    pub fn input_state(&mut self) -> InputState {
        let mouse = self.event_pump.relative_mouse_state();
        let keys = self.event_pump.keyboard_state();

        let axis = |negative: bool, positive: bool| -> f32 {
            (positive as i32 - negative as i32) as f32
        };

        InputState {
            mouse_left: mouse.left(),
            mouse_right: mouse.right(),
            mouse_delta: (mouse.x(), mouse.y()),
            move_x: axis(
                keys.is_scancode_pressed(Scancode::A) || keys.is_scancode_pressed(Scancode::Left),
                keys.is_scancode_pressed(Scancode::D) || keys.is_scancode_pressed(Scancode::Right),
            ),
            move_y: axis(
                keys.is_scancode_pressed(Scancode::S) || keys.is_scancode_pressed(Scancode::Down),
                keys.is_scancode_pressed(Scancode::W) || keys.is_scancode_pressed(Scancode::Up),
            ),
            zoom: axis(
                keys.is_scancode_pressed(Scancode::I),
                keys.is_scancode_pressed(Scancode::O),
            ),
        }
    }

    /// Upload the rendered frame and present it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas.copy(
            &self.texture,
            None,
            Some(Rect::new(0, 0, self.width, self.height)),
        )?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        // SAFETY: Same as in new() - texture_creator outlives texture
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
