//! Chunkbridge global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the chunkbridge crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// ## Validate Block Starts
///  > default: [`true`]
///
/// If enabled, the block starts reported by an array are checked before a chunk grid is built from them.
/// Block starts must begin at 0, be strictly increasing, and lie within the axis extent.
/// Invalid block starts are an invalid-argument error of [`ChunkManager::chunks`](crate::chunk_manager::ChunkManager::chunks)
/// and [`ChunkManager::store`](crate::chunk_manager::ChunkManager::store).
///
/// If disabled, the reported block starts are used as-is.
///
/// ## Store Validate All Sources
///  > default: [`true`]
///
/// If enabled, [`ChunkManager::store`](crate::chunk_manager::ChunkManager::store) validates every source/target pair before copying any block,
/// so an invalid pair anywhere in the arguments fails without modifying any target.
///
/// If disabled, each pair is validated immediately before it is copied.
/// Pairs preceding an invalid pair are then fully copied when the error is returned.
#[derive(Debug)]
pub struct Config {
    validate_block_starts: bool,
    store_validate_all_sources: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Config {
            validate_block_starts: true,
            store_validate_all_sources: true,
        }
    }
}

impl Config {
    /// Get the [validate block starts](#validate-block-starts) configuration.
    #[must_use]
    pub fn validate_block_starts(&self) -> bool {
        self.validate_block_starts
    }

    /// Set the [validate block starts](#validate-block-starts) configuration.
    pub fn set_validate_block_starts(&mut self, validate_block_starts: bool) {
        self.validate_block_starts = validate_block_starts;
    }

    /// Get the [store validate all sources](#store-validate-all-sources) configuration.
    #[must_use]
    pub fn store_validate_all_sources(&self) -> bool {
        self.store_validate_all_sources
    }

    /// Set the [store validate all sources](#store-validate-all-sources) configuration.
    pub fn set_store_validate_all_sources(&mut self, store_validate_all_sources: bool) {
        self.store_validate_all_sources = store_validate_all_sources;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global chunkbridge configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global chunkbridge configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}
