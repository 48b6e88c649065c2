//! Curdleproofs: a zero-knowledge argument that a vector of group-element
//! pairs was shuffled — every pair scaled by one secret scalar `k` and the
//! whole vector reordered by one secret permutation.
//!
//! The outer protocol ([`curdleproof`]) composes four sub-arguments over a
//! single Fiat-Shamir transcript:
//!
//! - [`same_permutation_argument`]: two commitments open under the same
//!   secret permutation, reduced to a grand product;
//! - [`grand_product_argument`]: a committed vector multiplies out to a
//!   public value, reduced to an inner product;
//! - [`inner_product_argument`]: the logarithmic-size halving argument both
//!   reductions bottom out in;
//! - [`same_scalar_argument`]: a constant-size sigma protocol for the
//!   shared scalar `k`;
//! - [`same_multiscalar_argument`]: a halving argument tying one scalar
//!   vector to three parallel bases.
//!
//! Verification is cheap on top of being non-interactive: every sub-verifier
//! defers its closing equality to a [`msm_accumulator::MsmAccumulator`], and
//! the whole session settles in one batched multi-scalar multiplication.
//!
//! The core is generic over any prime-order group exposing the
//! [`ark_ec::CurveGroup`] interface. The [`whisk`] module packages the
//! argument for the anonymous leader-election use case over BLS12-381 G1.

pub mod crs;
pub mod curdleproof;
pub mod errors;
pub mod grand_product_argument;
pub mod group_commitment;
pub mod inner_product_argument;
pub mod msm_accumulator;
pub mod same_multiscalar_argument;
pub mod same_permutation_argument;
pub mod same_scalar_argument;
pub mod transcript;
pub mod util;
pub mod whisk;

pub use crs::Crs;
pub use curdleproof::{prove, verify, CurdleproofsProof, N_BLINDERS};
pub use errors::ProofError;
