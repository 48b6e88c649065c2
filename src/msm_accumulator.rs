//! Deferred batching of multi-scalar-multiplication equality claims.
//!
//! Each claim `C == sum_i scalars[i] * bases[i]` is folded into the
//! accumulator under a fresh random weight, so a whole verification session
//! collapses into one final MSM. By Schwartz-Zippel over the scalar field, if
//! any single claim is false the final check passes with probability at most
//! `1 / |F_r|`.

use crate::errors::ProofError;
use crate::util::msm;
use ark_ec::CurveGroup;
use ark_ff::Zero;
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;
use std::collections::HashMap;

pub struct MsmAccumulator<C: CurveGroup> {
    a_c: C,
    base_scalar_map: HashMap<C::Affine, C::ScalarField>,
}

impl<C: CurveGroup> Default for MsmAccumulator<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CurveGroup> MsmAccumulator<C> {
    pub fn new() -> Self {
        Self {
            a_c: C::zero(),
            base_scalar_map: HashMap::new(),
        }
    }

    /// Defers the claim `c == sum_i scalars[i] * bases[i]`.
    ///
    /// Repeated bases are coalesced into a single table entry, the identity
    /// point included, so the final MSM size is the number of distinct bases.
    pub fn accumulate_check<R: RngCore>(
        &mut self,
        c: &C,
        scalars: &[C::ScalarField],
        bases: &[C::Affine],
        rng: &mut R,
    ) -> Result<(), ProofError> {
        if bases.len() != scalars.len() {
            return Err(ProofError::LengthMismatch {
                expected: bases.len(),
                actual: scalars.len(),
            });
        }

        let alpha = C::ScalarField::rand(rng);
        for (base, scalar) in bases.iter().zip(scalars) {
            *self
                .base_scalar_map
                .entry(*base)
                .or_insert_with(C::ScalarField::zero) += alpha * scalar;
        }
        self.a_c += *c * alpha;

        Ok(())
    }

    /// Runs the single batched MSM; true iff every deferred claim held
    /// (except with negligible probability over the accumulated weights).
    pub fn verify(self) -> Result<bool, ProofError> {
        let mut bases = Vec::with_capacity(self.base_scalar_map.len());
        let mut scalars = Vec::with_capacity(self.base_scalar_map.len());
        for (base, scalar) in &self.base_scalar_map {
            bases.push(*base);
            scalars.push(*scalar);
        }
        Ok(msm(&bases, &scalars)? == self.a_c)
    }
}
