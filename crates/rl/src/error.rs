use physics::PhysicsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlError {
    #[error("reward sequence is empty")]
    EmptyRewards,
    #[error("discount factor must lie in (0, 1], got {0}")]
    InvalidDiscount(f32),
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("seed list is empty")]
    NoSeeds,
    #[error("action {action} is out of range for {count} actions")]
    InvalidAction { action: usize, count: usize },
    #[error("state has {got} components, expected {expected}")]
    StateDimension { expected: usize, got: usize },
    #[error("policy has {got} actions, environment expects {expected}")]
    ActionCount { expected: usize, got: usize },
    #[error("hidden layer outputs {hidden} values but the head takes {head}")]
    LayerMismatch { hidden: usize, head: usize },
    #[error("trace has {trace} steps but {returns} returns")]
    LengthMismatch { trace: usize, returns: usize },
    #[error("training already finished ({0})")]
    Finished(&'static str),
    #[error("environment failure")]
    Environment(#[from] PhysicsError),
    #[error("gradient computation failed")]
    Autodiff(#[source] anyhow::Error),
    #[error("failed to read config {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T, E = RlError> = std::result::Result<T, E>;
