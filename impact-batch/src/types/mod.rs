pub mod config;
pub mod enums;
pub mod task;

// Re-export commonly used types for convenience
pub use config::{BatchConfig, HostConfig, PathConfig, PathConfigType};
pub use enums::{LayerKind, TaskStatus};
pub use task::{Extent, ReportPaths, ScenarioTask, Task, TaskKind, ValidationError};
