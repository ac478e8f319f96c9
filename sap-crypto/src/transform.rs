//! The Shuffle-And-Perturb (SAP) vector transform: a keyed permutation of
//! dimensions followed by additive noise scaled by a perturbation magnitude.

use crate::keystream::{invert_permutation, permutation, uniform_floats, Key, Nonce};

/// Apply SAP to a single plaintext vector, producing the cipher-space vector.
///
/// Order matters: permute first, then add noise. Decrypt must undo these in
/// the opposite order (subtract noise, then invert the permutation) for the
/// transform to be its own exact inverse modulo float rounding.
pub fn encrypt(key: &Key, nonce: &Nonce, beta: f32, values: &[f32]) -> Vec<f32> {
    let dim = values.len();
    let perm = permutation(key, dim);

    let mut out = vec![0.0f32; dim];
    for (i, &p) in perm.iter().enumerate() {
        out[i] = values[p];
    }

    if beta > 0.0 {
        let noise = uniform_floats(key, nonce, dim);
        for (v, u) in out.iter_mut().zip(noise) {
            *v += (u - 0.5) * 2.0 * beta;
        }
    }

    out
}

/// Invert [`encrypt`]: subtract the noise, then undo the permutation.
pub fn decrypt(key: &Key, nonce: &Nonce, beta: f32, cipher: &[f32]) -> Vec<f32> {
    let dim = cipher.len();
    let mut denoised = cipher.to_vec();

    if beta > 0.0 {
        let noise = uniform_floats(key, nonce, dim);
        for (v, u) in denoised.iter_mut().zip(noise) {
            *v -= (u - 0.5) * 2.0 * beta;
        }
    }

    let perm = permutation(key, dim);
    let inverse = invert_permutation(&perm);

    let mut out = vec![0.0f32; dim];
    for (dst, &src) in inverse.iter().enumerate() {
        out[dst] = denoised[src];
    }
    out
}

/// Euclidean distance between two equal-length vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}
