use crate::config::{AllocatorConfig, DEFAULT_ALPHABET, DEFAULT_KEY_LENGTH};

/// Produces candidate short keys.
///
/// Candidates are not guaranteed to be unique; the allocator resolves
/// collisions against the store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws each symbol uniformly from a fixed alphabet.
#[derive(Debug, Clone)]
pub struct RandomKeyGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl RandomKeyGenerator {
    pub fn new(alphabet: &str, length: usize) -> Self {
        Self {
            alphabet: alphabet.chars().collect(),
            length,
        }
    }

    pub fn from_config(config: &AllocatorConfig) -> Self {
        Self::new(&config.alphabet, config.key_length)
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHABET, DEFAULT_KEY_LENGTH)
    }
}

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&self) -> String {
        nanoid::format(nanoid::rngs::default, &self.alphabet, self.length)
    }
}
