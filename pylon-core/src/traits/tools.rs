//! Tool (extruder) change service trait

/// Trait for tool changers
pub trait ToolService {
    /// Number of tools on the machine
    fn count(&self) -> u8;

    /// Switch to a tool and return the previously active index
    fn change_to(&mut self, index: u8) -> u8;
}

impl<T: ToolService + ?Sized> ToolService for &mut T {
    fn count(&self) -> u8 {
        (**self).count()
    }

    fn change_to(&mut self, index: u8) -> u8 {
        (**self).change_to(index)
    }
}

/// Tool service for single-tool machines
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleTool;

impl ToolService for SingleTool {
    fn count(&self) -> u8 {
        1
    }

    fn change_to(&mut self, _index: u8) -> u8 {
        0
    }
}
