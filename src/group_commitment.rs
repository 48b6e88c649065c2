//! Two-element Pedersen-style commitment to a group element.

use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// Commitment `(r * g, t + r * h)` to the point `t` under blinder `r`.
///
/// Hiding under uniform `r`, binding under the discrete log of `h` in `g`.
/// Addition and scalar multiplication act componentwise, so commitments
/// combine homomorphically with their openings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct GroupCommitment<C: CurveGroup> {
    pub t_1: C,
    pub t_2: C,
}

impl<C: CurveGroup> GroupCommitment<C> {
    pub fn new(crs_g: &C, crs_h: &C, t: &C, r: &C::ScalarField) -> Self {
        Self {
            t_1: *crs_g * *r,
            t_2: *t + *crs_h * *r,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        Self {
            t_1: self.t_1 + other.t_1,
            t_2: self.t_2 + other.t_2,
        }
    }

    pub fn mul(&self, scalar: &C::ScalarField) -> Self {
        Self {
            t_1: self.t_1 * *scalar,
            t_2: self.t_2 * *scalar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Fr, G1Projective};
    use ark_std::{test_rng, UniformRand};

    #[test]
    fn test_homomorphism() {
        let mut rng = test_rng();
        let g = G1Projective::rand(&mut rng);
        let h = G1Projective::rand(&mut rng);

        let t_a = G1Projective::rand(&mut rng);
        let t_b = G1Projective::rand(&mut rng);
        let r_a = Fr::rand(&mut rng);
        let r_b = Fr::rand(&mut rng);
        let alpha = Fr::rand(&mut rng);

        let cm_a = GroupCommitment::new(&g, &h, &t_a, &r_a);
        let cm_b = GroupCommitment::new(&g, &h, &t_b, &r_b);

        // Committing to the sum with summed blinders equals adding commitments.
        let cm_sum = GroupCommitment::new(&g, &h, &(t_a + t_b), &(r_a + r_b));
        assert_eq!(cm_a.add(&cm_b), cm_sum);

        // Scalar multiplication distributes over both components.
        let cm_scaled = GroupCommitment::new(&g, &h, &(t_a * alpha), &(r_a * alpha));
        assert_eq!(cm_a.mul(&alpha), cm_scaled);
        assert_eq!(cm_a.mul(&alpha).t_1, cm_a.t_1 * alpha);
    }

    #[test]
    fn test_differing_blinder_differs() {
        let mut rng = test_rng();
        let g = G1Projective::rand(&mut rng);
        let h = G1Projective::rand(&mut rng);
        let t = G1Projective::rand(&mut rng);
        let r = Fr::rand(&mut rng);

        let cm_1 = GroupCommitment::new(&g, &h, &t, &r);
        let cm_2 = GroupCommitment::new(&g, &h, &t, &(r + Fr::from(1u64)));
        assert_ne!(cm_1, cm_2);
    }
}
