//! Common reference string: independently random generators shared by prover
//! and verifier. Created once at setup, immutable afterwards.

use crate::curdleproof::N_BLINDERS;
use crate::util::sum_affine_points;
use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;

#[derive(Clone, Debug, CanonicalSerialize, CanonicalDeserialize)]
pub struct Crs<C: CurveGroup> {
    /// Bases committing to length-`ell` witness vectors.
    pub gs: Vec<C::Affine>,
    /// Blinder bases, `N_BLINDERS` of them.
    pub hs: Vec<C::Affine>,
    /// Inner-product commitment base.
    pub h: C,
    /// Commitment bases for the same-scalar sigma protocol.
    pub g_t: C,
    pub g_u: C,
    /// Precomputed sums of `gs` and `hs` for the verifier.
    pub g_sum: C::Affine,
    pub h_sum: C::Affine,
}

impl<C: CurveGroup> Crs<C> {
    /// Samples a CRS for shuffles of `ell` pairs. `ell + N_BLINDERS` must be
    /// a power of two for the recursive arguments to terminate.
    pub fn generate<R: RngCore>(ell: usize, rng: &mut R) -> Self {
        let gs: Vec<C::Affine> =
            C::normalize_batch(&(0..ell).map(|_| C::rand(rng)).collect::<Vec<_>>());
        let hs: Vec<C::Affine> =
            C::normalize_batch(&(0..N_BLINDERS).map(|_| C::rand(rng)).collect::<Vec<_>>());
        let g_sum = sum_affine_points::<C>(&gs).into_affine();
        let h_sum = sum_affine_points::<C>(&hs).into_affine();

        Self {
            gs,
            hs,
            h: C::rand(rng),
            g_t: C::rand(rng),
            g_u: C::rand(rng),
            g_sum,
            h_sum,
        }
    }

    pub fn ell(&self) -> usize {
        self.gs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Projective;
    use ark_std::test_rng;

    #[test]
    fn test_crs_shape() {
        let mut rng = test_rng();
        let crs = Crs::<G1Projective>::generate(60, &mut rng);
        assert_eq!(crs.ell(), 60);
        assert_eq!(crs.hs.len(), N_BLINDERS);
        assert_eq!(
            sum_affine_points::<G1Projective>(&crs.gs).into_affine(),
            crs.g_sum
        );
        assert_eq!(
            sum_affine_points::<G1Projective>(&crs.hs).into_affine(),
            crs.h_sum
        );
    }
}
