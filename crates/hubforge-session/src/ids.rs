//! Collision-free game and player id generation.
//!
//! Ids are fixed-length strings of random lowercase letters. At the default
//! 16 letters that is 26^16 ≈ 2^75 candidates, so a collision against any
//! realistic number of live games is vanishingly rare. It is still checked:
//! every candidate is tested against the live registry and redrawn on a hit.
//!
//! The generator owns its RNG. It is seeded once (from the wall clock, or an
//! explicit seed for reproducible tests) and every draw advances it through
//! `&mut self`, so there is no hidden global random state.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::SessionError;

/// Shape and retry policy for generated ids.
#[derive(Debug, Clone)]
pub struct IdConfig {
    /// Letters per id (player ids get one extra `P`).
    pub length: usize,
    /// Candidates to try before giving up with
    /// [`SessionError::IdSpaceExhausted`].
    pub max_attempts: u32,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            length: 16,
            max_attempts: 64,
        }
    }
}

/// Seeded random id source.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
    config: IdConfig,
}

impl IdGenerator {
    /// Seeds from the current wall-clock time.
    pub fn from_clock(config: IdConfig) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(config, seed)
    }

    /// Seeds explicitly. Two generators with the same seed and config
    /// produce the same sequence.
    pub fn with_seed(config: IdConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &IdConfig {
        &self.config
    }

    /// Draws one candidate token, without any collision check.
    pub fn token(&mut self) -> String {
        (0..self.config.length)
            .map(|_| char::from(self.rng.random_range(b'a'..=b'z')))
            .collect()
    }

    /// Draws `prefix + token` until `taken` says the candidate is free.
    ///
    /// # Errors
    /// [`SessionError::IdSpaceExhausted`] after `max_attempts` collisions.
    pub fn fresh(
        &mut self,
        prefix: &str,
        mut taken: impl FnMut(&str) -> bool,
    ) -> Result<String, SessionError> {
        for _ in 0..self.config.max_attempts {
            let candidate = format!("{prefix}{}", self.token());
            if !taken(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(%candidate, "generated id collided, redrawing");
        }
        tracing::error!(
            attempts = self.config.max_attempts,
            length = self.config.length,
            "id space exhausted"
        );
        Err(SessionError::IdSpaceExhausted {
            attempts: self.config.max_attempts,
        })
    }
}
