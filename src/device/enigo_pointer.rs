// Pointer that synthesizes real mouse input through the OS input system
use super::types::PointerDevice;
use crate::error::{NavError, NavResult};
use crate::template_matching::ActionablePoint;
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};

fn input_error(action: &str, error: impl std::fmt::Display) -> NavError {
    NavError::input(format!("{action}: {error}"))
}

pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    /// Connect to the display's input system
    pub fn new() -> NavResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| input_error("cannot connect to the input system", e))?;
        Ok(Self { enigo })
    }
}

impl PointerDevice for EnigoPointer {
    async fn move_to(&mut self, point: ActionablePoint) -> NavResult<()> {
        log::debug!("🖱️ move to {}", point);
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| input_error(&format!("move to {point} failed"), e))
    }

    async fn click(&mut self) -> NavResult<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| input_error("left click failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[test]
    fn test_input_failures_map_to_input_error() {
        let err = input_error("move to (10, 20) failed", "no display");
        assert_eq!(err.kind(), FailureKind::InputError);
        assert_eq!(
            err.to_string(),
            "Pointer input failed: move to (10, 20) failed: no display"
        );
    }
}
