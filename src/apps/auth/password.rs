// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Salted, iterated SHA3-256 password hashes stored as
//! `<salt hex>$<digest hex>`.

use crate::{PlatformError, PlatformResult};
use fastcrypto::encoding::{Encoding, Hex};
use fastcrypto::hash::{HashFunction, Sha3_256};
use rand::RngCore;

pub const MIN_PASSWORD_LEN: usize = 8;
const SALT_LEN: usize = 16;
const ITERATIONS: usize = 10_000;

fn digest(salt: &[u8], password: &str) -> Vec<u8> {
    let mut hasher = Sha3_256::default();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let mut current = hasher.finalize().to_vec();
    for _ in 1..ITERATIONS {
        let mut hasher = Sha3_256::default();
        hasher.update(salt);
        hasher.update(&current);
        current = hasher.finalize().to_vec();
    }
    current
}

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    format!("{}${}", Hex::encode(salt), Hex::encode(digest(&salt, password)))
}

/// False for a wrong password and for any malformed stored hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (Hex::decode(salt_hex), Hex::decode(digest_hex)) else {
        return false;
    };
    let actual = digest(&salt, password);
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn join_error(e: tokio::task::JoinError) -> PlatformError {
    PlatformError::Internal(format!("password hashing task failed: {e}"))
}

/// [`hash_password`] on the blocking pool.
pub async fn hash(password: String) -> PlatformResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(join_error)
}

/// [`verify_password`] on the blocking pool.
pub async fn verify(password: String, stored: String) -> PlatformResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(join_error)
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify_off_runtime() {
        let stored = hash("clave-segura-1".to_string()).await.expect("hash");
        assert!(verify("clave-segura-1".to_string(), stored.clone())
            .await
            .expect("verify"));
        assert!(!verify("clave-segura-2".to_string(), stored)
            .await
            .expect("verify"));
    }

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("s3creta-larga");
        assert!(verify_password("s3creta-larga", &stored));
        assert!(!verify_password("s3creta-largA", &stored));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("misma-clave"), hash_password("misma-clave"));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("x", "no-dollar"));
        assert!(!verify_password("x", "zz$zz"));
        assert!(!verify_password("x", ""));
    }
}
