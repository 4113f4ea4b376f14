//! Input handling for the viewer window
//!
//! Mouse drags and scrolling go straight into the [`CameraController`];
//! keyboard shortcuts are translated into [`ViewerCommand`]s that the
//! application applies to its own state.

use std::collections::HashSet;
use tracing::debug;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, KeyCode, PhysicalKey};

use crate::component::camera::CameraController;
use crate::component::settings::OPACITY_STEP;
use crate::core::config::CameraConfig;

/// Actions triggered by keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    Quit,
    ResetCamera,
    ToggleFullscreen,
    ToggleTexture,
    ToggleWireframe,
    ToggleGrid,
    /// Relative opacity change
    StepOpacity(f32),
    /// Digit key: 1-9 map to 0.1-0.9, 0 maps to 1.0
    SetOpacityDigit(u8),
}

impl ViewerCommand {
    /// Whether holding the key down should repeat the command
    pub fn repeats(&self) -> bool {
        matches!(self, ViewerCommand::StepOpacity(_))
    }
}

/// Maps a key press to a command.
///
/// `text` is the logical character, used so that `+` and `-` work on
/// layouts where they are not on the physical Equal/Minus keys.
pub fn command_for_key(code: Option<KeyCode>, text: Option<&str>) -> Option<ViewerCommand> {
    match text {
        Some("+") | Some("=") => return Some(ViewerCommand::StepOpacity(OPACITY_STEP)),
        Some("-") | Some("_") => return Some(ViewerCommand::StepOpacity(-OPACITY_STEP)),
        _ => {}
    }

    let command = match code? {
        KeyCode::Escape => ViewerCommand::Quit,
        KeyCode::KeyR => ViewerCommand::ResetCamera,
        KeyCode::KeyF => ViewerCommand::ToggleFullscreen,
        KeyCode::KeyT => ViewerCommand::ToggleTexture,
        KeyCode::KeyW => ViewerCommand::ToggleWireframe,
        KeyCode::KeyG => ViewerCommand::ToggleGrid,
        KeyCode::Equal | KeyCode::NumpadAdd => ViewerCommand::StepOpacity(OPACITY_STEP),
        KeyCode::Minus | KeyCode::NumpadSubtract => ViewerCommand::StepOpacity(-OPACITY_STEP),
        other => ViewerCommand::SetOpacityDigit(digit_for(other)?),
    };
    Some(command)
}

fn digit_for(code: KeyCode) -> Option<u8> {
    let digit = match code {
        KeyCode::Digit0 | KeyCode::Numpad0 => 0,
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        _ => return None,
    };
    Some(digit)
}

/// InputSystem tracks pointer state between events
pub struct InputSystem {
    mouse_buttons: HashSet<MouseButton>,
    last_cursor: Option<(f64, f64)>,
    /// Pixels that count as one scroll line for touchpads
    pixels_per_line: f32,
}

impl InputSystem {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            mouse_buttons: HashSet::new(),
            last_cursor: None,
            pixels_per_line: config.pixels_per_line,
        }
    }

    /// Process a window event.
    ///
    /// Camera changes are applied immediately; a keyboard shortcut is
    /// returned for the caller to apply.
    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        camera: &mut CameraController,
    ) -> Option<ViewerCommand> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.on_mouse_button(*button, *state);
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved((position.x, position.y), camera);
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.on_scroll(*delta, camera);
                None
            }
            WindowEvent::Focused(false) | WindowEvent::CursorLeft { .. } => {
                self.reset_mouse();
                None
            }
            _ => None,
        }
    }

    fn on_key(&mut self, event: &KeyEvent) -> Option<ViewerCommand> {
        if event.state != ElementState::Pressed {
            return None;
        }
        let code = match event.physical_key {
            PhysicalKey::Code(code) => Some(code),
            PhysicalKey::Unidentified(_) => None,
        };
        let text = match &event.logical_key {
            Key::Character(s) => Some(s.as_str()),
            _ => None,
        };
        let command = command_for_key(code, text)?;
        if event.repeat && !command.repeats() {
            return None;
        }
        debug!(?command, "Key command");
        Some(command)
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    /// Left drag orbits, right or middle drag pans
    pub fn on_cursor_moved(&mut self, position: (f64, f64), camera: &mut CameraController) {
        let Some(last) = self.last_cursor.replace(position) else {
            return;
        };

        let dx = (position.0 - last.0) as f32;
        // Window y grows downwards, the camera expects y-up deltas
        let dy = -(position.1 - last.1) as f32;

        if self.mouse_buttons.contains(&MouseButton::Left) {
            camera.orbit(dx, dy);
        } else if self.mouse_buttons.contains(&MouseButton::Right)
            || self.mouse_buttons.contains(&MouseButton::Middle)
        {
            camera.pan(dx, dy);
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta, camera: &mut CameraController) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / self.pixels_per_line,
        };
        camera.zoom(lines);
    }

    /// Forget pointer state (focus lost, cursor left the window)
    pub fn reset_mouse(&mut self) {
        self.mouse_buttons.clear();
        self.last_cursor = None;
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_key_bindings() {
        assert_eq!(command_for_key(Some(KeyCode::Escape), None), Some(ViewerCommand::Quit));
        assert_eq!(command_for_key(Some(KeyCode::KeyR), Some("r")), Some(ViewerCommand::ResetCamera));
        assert_eq!(command_for_key(Some(KeyCode::KeyW), Some("w")), Some(ViewerCommand::ToggleWireframe));
        assert_eq!(command_for_key(Some(KeyCode::KeyG), Some("g")), Some(ViewerCommand::ToggleGrid));
        assert_eq!(command_for_key(Some(KeyCode::Digit7), Some("7")), Some(ViewerCommand::SetOpacityDigit(7)));
        assert_eq!(command_for_key(Some(KeyCode::Numpad0), None), Some(ViewerCommand::SetOpacityDigit(0)));
        assert_eq!(command_for_key(Some(KeyCode::KeyQ), Some("q")), None);
        assert_eq!(command_for_key(None, None), None);
    }

    #[test]
    fn test_plus_minus_by_character() {
        // Shifted Equal produces '+'
        assert_eq!(
            command_for_key(Some(KeyCode::Equal), Some("+")),
            Some(ViewerCommand::StepOpacity(OPACITY_STEP))
        );
        assert_eq!(
            command_for_key(Some(KeyCode::Minus), Some("_")),
            Some(ViewerCommand::StepOpacity(-OPACITY_STEP))
        );
        // Layout where '+' sits on another physical key
        assert_eq!(
            command_for_key(Some(KeyCode::BracketRight), Some("+")),
            Some(ViewerCommand::StepOpacity(OPACITY_STEP))
        );
    }

    #[test]
    fn test_left_drag_orbits_with_y_up() {
        let mut input = InputSystem::default();
        let mut camera = CameraController::default();

        input.on_cursor_moved((100.0, 100.0), &mut camera);
        input.on_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.on_cursor_moved((110.0, 90.0), &mut camera);

        assert_relative_eq!(camera.state().rot_y, 35.0);
        assert_relative_eq!(camera.state().rot_x, 25.0);
    }

    #[test]
    fn test_right_drag_pans() {
        let mut input = InputSystem::default();
        let mut camera = CameraController::default();

        input.on_mouse_button(MouseButton::Right, ElementState::Pressed);
        input.on_cursor_moved((0.0, 0.0), &mut camera);
        input.on_cursor_moved((50.0, 20.0), &mut camera);

        assert_relative_eq!(camera.state().pan_x, 0.5);
        assert_relative_eq!(camera.state().pan_y, -0.2);
        assert_eq!(camera.state().rot_y, 30.0);
    }

    #[test]
    fn test_move_without_button_does_nothing() {
        let mut input = InputSystem::default();
        let mut camera = CameraController::default();
        input.on_cursor_moved((0.0, 0.0), &mut camera);
        input.on_cursor_moved((300.0, 300.0), &mut camera);
        assert_eq!(*camera.state(), crate::component::camera::CameraState::default());
    }

    #[test]
    fn test_scroll_lines_and_pixels() {
        let mut input = InputSystem::default();
        let mut camera = CameraController::default();

        input.on_scroll(MouseScrollDelta::LineDelta(0.0, 2.0), &mut camera);
        assert_relative_eq!(camera.state().distance, 4.4);

        input.on_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -80.0)), &mut camera);
        assert_relative_eq!(camera.state().distance, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_reset_mouse_stops_drag() {
        let mut input = InputSystem::default();
        let mut camera = CameraController::default();
        input.on_mouse_button(MouseButton::Left, ElementState::Pressed);
        input.on_cursor_moved((0.0, 0.0), &mut camera);
        input.reset_mouse();
        input.on_cursor_moved((40.0, 0.0), &mut camera);
        assert_eq!(camera.state().rot_y, 30.0);
    }
}
