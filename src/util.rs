//! Shared vector and group helpers used across the arguments.

use crate::curdleproof::N_BLINDERS;
use crate::errors::ProofError;
use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, PrimeField, Zero};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;
use rand::seq::SliceRandom;

/// Length-checked multi-scalar multiplication over affine bases.
pub fn msm<A: AffineRepr>(bases: &[A], scalars: &[A::ScalarField]) -> Result<A::Group, ProofError> {
    if bases.len() != scalars.len() {
        return Err(ProofError::LengthMismatch {
            expected: bases.len(),
            actual: scalars.len(),
        });
    }
    Ok(A::Group::msm_unchecked(bases, scalars))
}

/// Batch-normalizing variant for projective bases.
pub fn msm_points<C: CurveGroup>(
    bases: &[C],
    scalars: &[C::ScalarField],
) -> Result<C, ProofError> {
    msm(&C::normalize_batch(bases), scalars)
}

pub fn inner_product<F: Field>(a: &[F], b: &[F]) -> Result<F, ProofError> {
    if a.len() != b.len() {
        return Err(ProofError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b)
        .fold(F::zero(), |acc, (x, y)| acc + *x * y))
}

pub fn generate_blinders<F: PrimeField, R: RngCore>(rng: &mut R, n: usize) -> Vec<F> {
    (0..n).map(|_| F::rand(rng)).collect()
}

/// Fisher-Yates permutation of `{0, .., ell-1}` from the caller's RNG.
pub fn generate_permutation<R: RngCore>(ell: usize, rng: &mut R) -> Vec<u32> {
    let mut permutation: Vec<u32> = (0..ell as u32).collect();
    permutation.shuffle(rng);
    permutation
}

/// Applies a permutation: `out[i] = xs[permutation[i]]`.
pub fn permute_vector<T: Clone>(xs: &[T], permutation: &[u32]) -> Vec<T> {
    permutation.iter().map(|i| xs[*i as usize].clone()).collect()
}

/// Scales every pair `(vec_r[i], vec_s[i])` by `k`, permutes both results by
/// `permutation`, and commits to the permutation as
/// `m = sum_i permutation[i] * gs[i] + sum_j r_m[j] * hs[j]`.
///
/// Prover-side helper: the returned `(ts, us, m, r_m)` are exactly the public
/// outputs and permutation blinders the shuffle argument is later run on.
pub fn shuffle_permute_commit<C: CurveGroup, R: RngCore>(
    crs_gs: &[C::Affine],
    crs_hs: &[C::Affine],
    vec_r: &[C::Affine],
    vec_s: &[C::Affine],
    permutation: &[u32],
    k: &C::ScalarField,
    rng: &mut R,
) -> Result<(Vec<C::Affine>, Vec<C::Affine>, C, Vec<C::ScalarField>), ProofError> {
    if vec_r.len() != vec_s.len() {
        return Err(ProofError::LengthMismatch {
            expected: vec_r.len(),
            actual: vec_s.len(),
        });
    }

    let ts: Vec<C> = vec_r.iter().map(|p| p.mul_bigint(k.into_bigint())).collect();
    let us: Vec<C> = vec_s.iter().map(|p| p.mul_bigint(k.into_bigint())).collect();
    let ts = permute_vector(&C::normalize_batch(&ts), permutation);
    let us = permute_vector(&C::normalize_batch(&us), permutation);

    let range: Vec<C::ScalarField> = (0..crs_gs.len() as u64)
        .map(C::ScalarField::from)
        .collect();
    let permuted_range = permute_vector(&range, permutation);
    let r_m: Vec<C::ScalarField> = generate_blinders(rng, N_BLINDERS);
    let m = msm(crs_gs, &permuted_range)? + msm(crs_hs, &r_m)?;

    Ok((ts, us, m, r_m))
}

/// Sums a slice of affine points.
pub fn sum_affine_points<C: CurveGroup>(points: &[C::Affine]) -> C {
    points.iter().fold(C::zero(), |acc, p| acc + *p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Fr, G1Affine, G1Projective};
    use ark_ff::One;
    use ark_std::{test_rng, UniformRand};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generate_permutation_is_bijective() {
        let mut rng = StdRng::seed_from_u64(42);
        let permutation = generate_permutation(124, &mut rng);
        let mut seen = vec![false; 124];
        for i in &permutation {
            assert!(!seen[*i as usize]);
            seen[*i as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_permute_vector() {
        let xs = vec![10u64, 11, 12, 13];
        let permutation = vec![2u32, 0, 3, 1];
        assert_eq!(permute_vector(&xs, &permutation), vec![12, 10, 13, 11]);
    }

    // prod_i (as[perm[i]] + alpha * perm[i] + beta) is invariant under the
    // permutation, which is what reduces a permutation claim to a grand
    // product claim.
    #[test]
    fn test_permutation_product_invariance() {
        let mut rng = test_rng();
        let ell = 32;
        let vec_a: Vec<Fr> = (0..ell).map(|_| Fr::rand(&mut rng)).collect();
        let alpha = Fr::rand(&mut rng);
        let beta = Fr::rand(&mut rng);
        let permutation = generate_permutation(ell, &mut rng);

        let permuted = permute_vector(&vec_a, &permutation);
        let lhs = permuted
            .iter()
            .zip(&permutation)
            .fold(Fr::one(), |acc, (a, pi)| {
                acc * (*a + alpha * Fr::from(*pi as u64) + beta)
            });
        let rhs = vec_a.iter().enumerate().fold(Fr::one(), |acc, (i, a)| {
            acc * (*a + alpha * Fr::from(i as u64) + beta)
        });
        assert_eq!(lhs, rhs);
    }

    // Pins the permutation commitment formula: the coefficient of gs[i] in
    // `m` is permutation[i], and the outputs are the k-scaled inputs in
    // permuted order.
    #[test]
    fn test_shuffle_permute_commit_output() {
        let mut rng = StdRng::seed_from_u64(42);
        let ell = 4;
        let random_affines = |n: usize, rng: &mut StdRng| -> Vec<G1Affine> {
            (0..n)
                .map(|_| G1Projective::rand(rng).into_affine())
                .collect()
        };
        let gs = random_affines(ell, &mut rng);
        let hs = random_affines(N_BLINDERS, &mut rng);
        let vec_r = random_affines(ell, &mut rng);
        let vec_s = random_affines(ell, &mut rng);
        let k = Fr::rand(&mut rng);
        let permutation = vec![2u32, 0, 3, 1];

        let (ts, us, m, r_m) = shuffle_permute_commit::<G1Projective, _>(
            &gs,
            &hs,
            &vec_r,
            &vec_s,
            &permutation,
            &k,
            &mut rng,
        )
        .unwrap();

        let mut expected_m = G1Projective::zero();
        for (g, pi) in gs.iter().zip(&permutation) {
            expected_m += g.into_group() * Fr::from(*pi as u64);
        }
        for (h_base, r) in hs.iter().zip(&r_m) {
            expected_m += h_base.into_group() * *r;
        }
        assert_eq!(m, expected_m);

        for (i, pi) in permutation.iter().enumerate() {
            assert_eq!(
                ts[i],
                (vec_r[*pi as usize].into_group() * k).into_affine()
            );
            assert_eq!(
                us[i],
                (vec_s[*pi as usize].into_group() * k).into_affine()
            );
        }
    }

    #[test]
    fn test_inner_product_length_discipline() {
        let a = vec![Fr::one(); 4];
        let b = vec![Fr::one(); 3];
        assert!(inner_product(&a, &b).is_err());
        assert_eq!(inner_product(&a, &a).unwrap(), Fr::from(4u64));
    }
}
