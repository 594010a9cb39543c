//! API key rotation
//!
//! Bounded retry strategy for the oracle: one attempt per key in the pool,
//! rotating on every failure. The rotation cursor is session state, owned by
//! the oracle instance rather than anything global.

use crate::error::{Error, Result};

/// Rotating credential pool
#[derive(Debug, Clone)]
pub struct KeyPool {
    keys: Vec<String>,
    cursor: usize,
}

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            return Err(Error::OracleNoKeys);
        }
        Ok(Self { keys, cursor: 0 })
    }

    /// Build a pool from a comma-separated environment variable
    pub fn from_env(var: &str) -> Result<Self> {
        let raw = std::env::var(var).map_err(|_| Error::MissingEnvVar(var.to_string()))?;
        let keys: Vec<String> = raw
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self::new(keys)
    }

    /// Pool size, which is also the retry budget
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key under the cursor
    pub fn current(&self) -> &str {
        &self.keys[self.cursor]
    }

    /// Advance to the next key, wrapping at the end of the pool
    pub fn rotate(&mut self) -> &str {
        self.cursor = (self.cursor + 1) % self.keys.len();
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_rejected() {
        assert!(matches!(KeyPool::new(vec![]), Err(Error::OracleNoKeys)));
    }

    #[test]
    fn test_rotation_wraps() {
        let mut pool = KeyPool::new(vec!["a".into(), "b".into(), "c".into()]).unwrap();
        assert_eq!(pool.current(), "a");
        assert_eq!(pool.rotate(), "b");
        assert_eq!(pool.rotate(), "c");
        assert_eq!(pool.rotate(), "a");
    }

    #[test]
    fn test_single_key_rotates_to_itself() {
        let mut pool = KeyPool::new(vec!["only".into()]).unwrap();
        assert_eq!(pool.rotate(), "only");
    }

    #[test]
    fn test_from_env_trims_and_filters() {
        std::env::set_var("KEYPOOL_TEST_VAR", " k1 , k2 ,, k3 ");
        let pool = KeyPool::from_env("KEYPOOL_TEST_VAR").unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.current(), "k1");
        std::env::remove_var("KEYPOOL_TEST_VAR");
    }

    #[test]
    fn test_from_env_missing() {
        let err = KeyPool::from_env("KEYPOOL_TEST_MISSING").unwrap_err();
        assert!(matches!(err, Error::MissingEnvVar(_)));
    }
}
