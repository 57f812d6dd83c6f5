// Pointer that records and logs clicks instead of performing them
use super::types::PointerDevice;
use crate::error::{NavError, NavResult};
use crate::template_matching::ActionablePoint;

#[derive(Debug, Default)]
pub struct DryRunPointer {
    position: Option<ActionablePoint>,
    clicks: Vec<ActionablePoint>,
}

impl DryRunPointer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Option<ActionablePoint> {
        self.position
    }

    /// Every position a click was issued at, in order
    pub fn clicks(&self) -> &[ActionablePoint] {
        &self.clicks
    }
}

impl PointerDevice for DryRunPointer {
    async fn move_to(&mut self, point: ActionablePoint) -> NavResult<()> {
        log::debug!("🖱️ [dry-run] move to {}", point);
        self.position = Some(point);
        Ok(())
    }

    async fn click(&mut self) -> NavResult<()> {
        let Some(point) = self.position else {
            return Err(NavError::input("click issued before the pointer was moved"));
        };
        log::info!("🖱️ [dry-run] click at {}", point);
        self.clicks.push(point);
        Ok(())
    }
}
