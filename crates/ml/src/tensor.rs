use crate::graph::{EOp, Node};
use crate::recorder::Recorder;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Tensors addressed by id. Leaf tensors (parameters, inputs) are inserted by
/// the caller; op outputs are inserted by the recorder.
pub type TensorStore = HashMap<usize, Tensor>;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A dense row-major `f32` tensor.
///
/// Clones share the `id`, which is how a parameter and its copy in a
/// [`TensorStore`] are matched up by the tape.
#[derive(Clone, Debug)]
pub struct Tensor {
    pub id: usize,
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the product of `shape`.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { id: next_id(), data, shape }
    }

    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self::from_vec(shape, vec![0.0; len])
    }

    #[must_use]
    pub fn scalar(value: f32) -> Self {
        Self::from_vec(vec![1], vec![value])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Inserts a copy of this tensor into `tensors` so the tape can find it.
    pub fn watch(&self, tensors: &mut TensorStore) {
        tensors.insert(self.id, self.clone());
    }

    fn rows_cols(&self) -> (usize, usize) {
        assert_eq!(self.shape.len(), 2, "expected a 2-d tensor, got {:?}", self.shape);
        (self.shape[0], self.shape[1])
    }

    fn unary(
        &self,
        op: EOp,
        shape: Vec<usize>,
        data: Vec<f32>,
        recorder: &mut impl Recorder,
        tensors: &mut TensorStore,
    ) -> Tensor {
        let out = Tensor::from_vec(shape, data);
        recorder.record(Node { op, a: self.id, b: None, out: out.id }, &out, tensors);
        out
    }

    fn binary(
        &self,
        other: &Tensor,
        op: EOp,
        shape: Vec<usize>,
        data: Vec<f32>,
        recorder: &mut impl Recorder,
        tensors: &mut TensorStore,
    ) -> Tensor {
        let out = Tensor::from_vec(shape, data);
        recorder.record(
            Node { op, a: self.id, b: Some(other.id), out: out.id },
            &out,
            tensors,
        );
        out
    }

    /// `self` is a weight matrix `[out, in]`, `x` a batch `[batch, in]`;
    /// the result is `[batch, out]`.
    pub fn matmul(
        &self,
        x: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut TensorStore,
    ) -> Tensor {
        let (out_dim, in_dim) = self.rows_cols();
        let (batch, x_dim) = x.rows_cols();
        assert_eq!(in_dim, x_dim, "matmul inner dimensions differ");
        let mut data = vec![0.0; batch * out_dim];
        for k in 0..batch {
            let row = &x.data[k * in_dim..(k + 1) * in_dim];
            for i in 0..out_dim {
                let w = &self.data[i * in_dim..(i + 1) * in_dim];
                data[k * out_dim + i] = w.iter().zip(row).map(|(a, b)| a * b).sum();
            }
        }
        self.binary(x, EOp::MatMul, vec![batch, out_dim], data, recorder, tensors)
    }

    /// Adds the vector `bias [dim]` to every row of `self [batch, dim]`.
    pub fn add_broadcast(
        &self,
        bias: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut TensorStore,
    ) -> Tensor {
        let (_, dim) = self.rows_cols();
        assert_eq!(bias.len(), dim, "broadcast bias length differs from row width");
        let data = self
            .data
            .chunks(dim)
            .flat_map(|row| row.iter().zip(&bias.data).map(|(x, b)| x + b))
            .collect();
        self.binary(bias, EOp::AddBroadcast, self.shape.clone(), data, recorder, tensors)
    }

    pub fn mul(&self, other: &Tensor, recorder: &mut impl Recorder, tensors: &mut TensorStore) -> Tensor {
        assert_eq!(self.len(), other.len(), "mul operands differ in length");
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a * b).collect();
        self.binary(other, EOp::Mul, self.shape.clone(), data, recorder, tensors)
    }

    pub fn mul_scalar(&self, s: f32, recorder: &mut impl Recorder, tensors: &mut TensorStore) -> Tensor {
        let data = self.data.iter().map(|v| v * s).collect();
        self.unary(EOp::MulScalar(s), self.shape.clone(), data, recorder, tensors)
    }

    pub fn reduce_sum(&self, recorder: &mut impl Recorder, tensors: &mut TensorStore) -> Tensor {
        let sum = self.data.iter().sum();
        self.unary(EOp::ReduceSum, vec![1], vec![sum], recorder, tensors)
    }

    pub fn relu(&self, recorder: &mut impl Recorder, tensors: &mut TensorStore) -> Tensor {
        let data = self.data.iter().map(|v| v.max(0.0)).collect();
        self.unary(EOp::Relu, self.shape.clone(), data, recorder, tensors)
    }

    pub fn tanh(&self, recorder: &mut impl Recorder, tensors: &mut TensorStore) -> Tensor {
        let data = self.data.iter().map(|v| v.tanh()).collect();
        self.unary(EOp::Tanh, self.shape.clone(), data, recorder, tensors)
    }

    /// Row-wise `x - logsumexp(x)`, computed with the row max subtracted
    /// first so large scores do not overflow.
    pub fn log_softmax(&self, recorder: &mut impl Recorder, tensors: &mut TensorStore) -> Tensor {
        let (_, cols) = self.rows_cols();
        let data = self.data.chunks(cols).flat_map(log_softmax_row).collect();
        self.unary(EOp::LogSoftmax, self.shape.clone(), data, recorder, tensors)
    }

    /// Picks `self[r, index[r]]` for every row `r`.
    pub fn gather(
        &self,
        index: &[usize],
        recorder: &mut impl Recorder,
        tensors: &mut TensorStore,
    ) -> Tensor {
        let (rows, cols) = self.rows_cols();
        assert_eq!(rows, index.len(), "gather needs one index per row");
        let data = index
            .iter()
            .enumerate()
            .map(|(r, &c)| {
                assert!(c < cols, "gather index {c} out of range for {cols} columns");
                self.data[r * cols + c]
            })
            .collect();
        self.unary(EOp::Gather(index.to_vec()), vec![rows], data, recorder, tensors)
    }

    /// Index of the largest element; ties resolve to the lowest index.
    #[must_use]
    pub fn argmax(&self) -> usize {
        self.data
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
            .0
    }
}

/// Numerically stable log-softmax of a single row.
#[must_use]
pub fn log_softmax_row(row: &[f32]) -> Vec<f32> {
    let m = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let lse = m + row.iter().map(|&v| (v - m).exp()).sum::<f32>().ln();
    row.iter().map(|&v| v - lse).collect()
}
