use crate::graph::Node;
use crate::tensor::{Tensor, TensorStore};

/// Sink for the operations performed by tensor ops.
///
/// [`crate::tape::Tape`] keeps every output so it can be differentiated later;
/// [`crate::graph::Graph`] only keeps the node list.
pub trait Recorder {
    fn record(&mut self, node: Node, out: &Tensor, tensors: &mut TensorStore);
    fn nodes(&self) -> &[Node];
}
