use winit::event::VirtualKeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    Quit,
}

/// Key-to-action mapping, applied on key press (OS auto-repeat re-delivers
/// presses, so holding a key keeps moving the piece).
pub fn action_for_key(key: VirtualKeyCode) -> Option<InputAction> {
    match key {
        VirtualKeyCode::Q | VirtualKeyCode::Escape => Some(InputAction::Quit),
        VirtualKeyCode::Left => Some(InputAction::MoveLeft),
        VirtualKeyCode::Right => Some(InputAction::MoveRight),
        VirtualKeyCode::Down => Some(InputAction::MoveDown),
        VirtualKeyCode::R => Some(InputAction::Rotate),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_map_to_actions() {
        assert_eq!(
            action_for_key(VirtualKeyCode::Left),
            Some(InputAction::MoveLeft)
        );
        assert_eq!(
            action_for_key(VirtualKeyCode::Right),
            Some(InputAction::MoveRight)
        );
        assert_eq!(
            action_for_key(VirtualKeyCode::Down),
            Some(InputAction::MoveDown)
        );
        assert_eq!(
            action_for_key(VirtualKeyCode::R),
            Some(InputAction::Rotate)
        );
    }

    #[test]
    fn quit_keys() {
        assert_eq!(action_for_key(VirtualKeyCode::Q), Some(InputAction::Quit));
        assert_eq!(
            action_for_key(VirtualKeyCode::Escape),
            Some(InputAction::Quit)
        );
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert_eq!(action_for_key(VirtualKeyCode::Space), None);
        assert_eq!(action_for_key(VirtualKeyCode::Up), None);
    }
}
