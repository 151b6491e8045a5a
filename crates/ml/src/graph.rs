use crate::recorder::Recorder;
use crate::tensor::{Tensor, TensorStore};

/// Operations the autodiff tape knows how to differentiate.
///
/// Variants that need extra data at backward time carry it inline so the tape
/// does not have to look up auxiliary tensors.
#[derive(Clone, Debug, PartialEq)]
pub enum EOp {
    /// `W [out, in] x X [batch, in] -> [batch, out]`
    MatMul,
    /// `A [batch, dim] + b [dim]`
    AddBroadcast,
    Mul,
    MulScalar(f32),
    ReduceSum,
    Relu,
    Tanh,
    /// Row-wise log-softmax over the last dimension.
    LogSoftmax,
    /// Selects one column per row: `out[r] = a[r, index[r]]`.
    Gather(Vec<usize>),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub op: EOp,
    pub a: usize,
    pub b: Option<usize>,
    pub out: usize,
}

/// Inference-mode recorder.
///
/// Keeps the node list for inspection but never stores intermediate tensors,
/// so nothing recorded here can be differentiated.
pub struct Graph {
    nodes: Vec<Node>,
}

impl Recorder for Graph {
    fn record(&mut self, node: Node, _out: &Tensor, _tensors: &mut TensorStore) {
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }
}
