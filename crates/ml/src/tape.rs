use crate::graph::{EOp, Node};
use crate::recorder::Recorder;
use crate::tensor::{Tensor, TensorStore};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;

/// A tape that records operations for automatic differentiation.
///
/// Every recorded output is copied into the caller's [`TensorStore`] so the
/// backward pass can read the forward values back.
pub struct Tape {
    nodes: Vec<Node>,
}

impl Recorder for Tape {
    fn record(&mut self, node: Node, out: &Tensor, tensors: &mut TensorStore) {
        tensors.insert(out.id, out.clone());
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

/// Gradients produced by [`Tape::backward`], keyed by tensor id.
#[derive(Debug, Default)]
pub struct Gradients {
    grads: HashMap<usize, Vec<f32>>,
}

impl Gradients {
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&[f32]> {
        self.grads.get(&id).map(Vec::as_slice)
    }

    /// Gradient with respect to `t`, if `t` contributed to the loss.
    #[must_use]
    pub fn wrt(&self, t: &Tensor) -> Option<&[f32]> {
        self.get(t.id)
    }
}

fn fetch(tensors: &TensorStore, id: usize) -> Result<&Tensor> {
    tensors
        .get(&id)
        .ok_or_else(|| anyhow!("tensor {id} was not recorded in the store"))
}

fn second(node: &Node) -> Result<usize> {
    node.b
        .ok_or_else(|| anyhow!("{:?} node {} has no second operand", node.op, node.out))
}

fn slot(grads: &mut HashMap<usize, Vec<f32>>, id: usize, len: usize) -> &mut Vec<f32> {
    grads.entry(id).or_insert_with(|| vec![0.0; len])
}

impl Tape {
    /// Creates a new, empty tape.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Computes the gradients of a scalar `loss` with respect to every tensor
    /// that contributed to it.
    ///
    /// The recorded operations are traversed in reverse order. Nodes that do
    /// not feed into `loss` are skipped.
    ///
    /// # Errors
    ///
    /// Fails if `loss` is not a single element or if an operand of a recorded
    /// node is missing from `tensors`.
    pub fn backward(&self, loss: &Tensor, tensors: &TensorStore) -> Result<Gradients> {
        if loss.len() != 1 {
            bail!("loss must be a scalar, got shape {:?}", loss.shape);
        }
        let mut grads: HashMap<usize, Vec<f32>> = HashMap::new();
        grads.insert(loss.id, vec![1.0]);

        for node in self.nodes.iter().rev() {
            let Some(out_grad) = grads.get(&node.out).cloned() else {
                continue;
            };
            let a = fetch(tensors, node.a)?;

            match &node.op {
                EOp::MatMul => {
                    let x = fetch(tensors, second(node)?)?;
                    let out_dim = a.shape[0];
                    let in_dim = a.shape[1];
                    let batch = x.shape[0];
                    {
                        let w_grad = slot(&mut grads, a.id, a.len());
                        for i in 0..out_dim {
                            for j in 0..in_dim {
                                for k in 0..batch {
                                    w_grad[i * in_dim + j] +=
                                        out_grad[k * out_dim + i] * x.data[k * in_dim + j];
                                }
                            }
                        }
                    }
                    let x_grad = slot(&mut grads, x.id, x.len());
                    for k in 0..batch {
                        for j in 0..in_dim {
                            for i in 0..out_dim {
                                x_grad[k * in_dim + j] +=
                                    out_grad[k * out_dim + i] * a.data[i * in_dim + j];
                            }
                        }
                    }
                }
                EOp::AddBroadcast => {
                    let b = fetch(tensors, second(node)?)?;
                    let dim = b.len();
                    {
                        let a_grad = slot(&mut grads, a.id, a.len());
                        for (g, og) in a_grad.iter_mut().zip(&out_grad) {
                            *g += og;
                        }
                    }
                    let b_grad = slot(&mut grads, b.id, dim);
                    for row in out_grad.chunks(dim) {
                        for (g, og) in b_grad.iter_mut().zip(row) {
                            *g += og;
                        }
                    }
                }
                EOp::Mul => {
                    let b = fetch(tensors, second(node)?)?;
                    let da: Vec<f32> = b.data.iter().zip(&out_grad).map(|(d, og)| d * og).collect();
                    let db: Vec<f32> = a.data.iter().zip(&out_grad).map(|(d, og)| d * og).collect();
                    for (g, d) in slot(&mut grads, a.id, a.len()).iter_mut().zip(da) {
                        *g += d;
                    }
                    for (g, d) in slot(&mut grads, b.id, b.len()).iter_mut().zip(db) {
                        *g += d;
                    }
                }
                EOp::MulScalar(s) => {
                    let a_grad = slot(&mut grads, a.id, a.len());
                    for (g, og) in a_grad.iter_mut().zip(&out_grad) {
                        *g += s * og;
                    }
                }
                EOp::ReduceSum => {
                    for g in slot(&mut grads, a.id, a.len()).iter_mut() {
                        *g += out_grad[0];
                    }
                }
                EOp::Relu => {
                    let a_grad = slot(&mut grads, a.id, a.len());
                    for (g, (d, og)) in a_grad.iter_mut().zip(a.data.iter().zip(&out_grad)) {
                        if *d > 0.0 {
                            *g += og;
                        }
                    }
                }
                EOp::Tanh => {
                    let out = fetch(tensors, node.out)?;
                    let a_grad = slot(&mut grads, a.id, a.len());
                    for (g, (y, og)) in a_grad.iter_mut().zip(out.data.iter().zip(&out_grad)) {
                        *g += (1.0 - y.powi(2)) * og;
                    }
                }
                EOp::LogSoftmax => {
                    let out = fetch(tensors, node.out)?;
                    let cols = a.shape[a.shape.len() - 1];
                    let a_grad = slot(&mut grads, a.id, a.len());
                    for ((g_row, y_row), og_row) in a_grad
                        .chunks_mut(cols)
                        .zip(out.data.chunks(cols))
                        .zip(out_grad.chunks(cols))
                    {
                        let total: f32 = og_row.iter().sum();
                        for ((g, y), og) in g_row.iter_mut().zip(y_row).zip(og_row) {
                            *g += og - y.exp() * total;
                        }
                    }
                }
                EOp::Gather(index) => {
                    let cols = a.shape[a.shape.len() - 1];
                    let a_grad = slot(&mut grads, a.id, a.len());
                    for (r, (&c, og)) in index.iter().zip(&out_grad).enumerate() {
                        a_grad[r * cols + c] += og;
                    }
                }
            }
        }

        Ok(Gradients { grads })
    }
}
