//! __embedqp__ is an embedded operator splitting (ADMM) solver for
//! parametric convex quadratic and second-order cone programs.   It solves
//!
//! $$
//! \begin{array}{rl}
//! \text{minimize} & \frac{1}{2}x^T P x + q^T x\\\\\[2ex\]
//!  \text{subject to} & Ax + s = b \\\\\[1ex\]
//!         & s \in \mathcal{K}
//!  \end{array}
//! $$
//!
//! with decision variables
//! $x \in \mathbb{R}^n$,
//! $s \in \mathbb{R}^m$
//! and data matrices
//! $P=P^\top \succeq 0$,
//! $q \in \mathbb{R}^n$,
//! $A \in \mathbb{R}^{m \times n}$, and
//! $b \in \mathbb{R}^m$.
//! The convex set $\mathcal{K}$ is a product of zero cones, nonnegative
//! orthants and second-order cones.
//!
//! The solver is built for repeated solves of one problem whose numeric
//! data changes between solves.   All memory is allocated when the solver
//! is created.   After that the values of `P`, `q`, `A` and `b` can be
//! overwritten, either directly or through named parameters declared at
//! creation, and the next solve can start from the previous solution.
//!
//! ## Features
//!
//! * __Fixed structure__: the sparsity patterns of `P` and `A` are fixed
//!   and the KKT system is refactored numerically only when its data changes.
//!
//! * __Infeasibility detection__: primal and dual infeasibility are
//!   reported with certificates.
//!
//! * __Solution polishing__: converged solutions to QPs are refined by a
//!   direct solve on the estimated active set.
//!
//! ## Example
//!
//! ```
//! use embedqp::algebra::*;
//! use embedqp::solver::*;
//!
//! // minimize x² subject to x ≥ 1
//! let P = CscMatrix::from(&[[2.0]]);
//! let q = [0.0];
//! let A = CscMatrix::from(&[[-1.0]]);
//! let b = [-1.0];
//! let cones = [NonnegativeConeT(1)];
//!
//! let settings = DefaultSettingsBuilder::default()
//!     .verbose(false)
//!     .build()
//!     .unwrap();
//!
//! let mut solver = DefaultSolver::<f64>::new(&P, &q, &A, &b, &cones, settings).unwrap();
//! solver.solve();
//!
//! let solution = solver.solution().unwrap();
//! assert_eq!(solution.status, SolverStatus::Solved);
//! assert!((solution.x[0] - 1.0).abs() < 1e-5);
//! ```
//!
//! # License
//!
//! Licensed under Apache License, Version 2.0.

//Rust hates greek characters
#![allow(confusable_idents)]

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod io;
pub mod qdldl;
pub mod solver;
pub mod timers;
