#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Machine learning building blocks
//!
//! Small CPU tensors with tape-based reverse-mode automatic differentiation,
//! a dense layer and the Adam optimizer. This is everything the policy
//! gradient trainer in the `rl` crate needs from a deep learning library.
//!
//! Tensor ops take a [`Recorder`] and a [`TensorStore`]. Record onto a
//! [`Tape`] when gradients are needed and onto a [`Graph`] for plain
//! inference:
//!
//! ```rust
//! use ml::{Tape, Tensor, TensorStore};
//!
//! let w = Tensor::from_vec(vec![1, 2], vec![0.5, -1.0]);
//! let x = Tensor::from_vec(vec![1, 2], vec![2.0, 3.0]);
//! let mut tensors = TensorStore::new();
//! w.watch(&mut tensors);
//! x.watch(&mut tensors);
//!
//! let mut tape = Tape::new();
//! let y = w.matmul(&x, &mut tape, &mut tensors).reduce_sum(&mut tape, &mut tensors);
//! let grads = tape.backward(&y, &tensors).unwrap();
//! assert_eq!(grads.wrt(&w).unwrap(), &[2.0, 3.0]);
//! ```

pub mod graph;
pub mod nn;
pub mod optim;
pub mod recorder;
pub mod tape;
pub mod tensor;

pub use graph::{EOp, Graph, Node};
pub use nn::{Activation, Dense};
pub use optim::Adam;
pub use recorder::Recorder;
pub use tape::{Gradients, Tape};
pub use tensor::{log_softmax_row, Tensor, TensorStore};
