use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("invalid cart-pole configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("cart-pole stepped after the episode terminated; call reset first")]
    SteppedAfterFailure,
}
