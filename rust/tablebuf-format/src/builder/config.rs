use tablebuf_common::{Result, verify_arg};

use crate::layout::{DEFAULT_BUFFER_ALIGNMENT, MAX_BUFFER_SIZE};

/// Default size of the builder's initial allocation.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// Configuration for buffer construction.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Size of the initial allocation; the buffer grows on demand.
    pub initial_capacity: usize,
    /// Alignment of the finished buffer's total length. Must be a power of two.
    /// The effective alignment is the larger of this value and the widest
    /// scalar written.
    pub alignment: usize,
    /// Write scalar fields even when they equal their declared default.
    pub force_defaults: bool,
    /// Share one vtable between objects with byte-identical vtables.
    pub dedup_vtables: bool,
    /// Upper bound on the finished buffer size, at most [`MAX_BUFFER_SIZE`].
    pub max_size: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            alignment: DEFAULT_BUFFER_ALIGNMENT,
            force_defaults: false,
            dedup_vtables: true,
            max_size: MAX_BUFFER_SIZE,
        }
    }
}

impl BuilderConfig {
    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(alignment, self.alignment.is_power_of_two());
        verify_arg!(max_size, self.max_size <= MAX_BUFFER_SIZE);
        verify_arg!(initial_capacity, self.initial_capacity <= self.max_size);
        Ok(())
    }

    pub fn with_initial_capacity(&self, initial_capacity: usize) -> Self {
        let mut config = self.clone();
        config.initial_capacity = initial_capacity;
        config
    }

    pub fn with_alignment(&self, alignment: usize) -> Self {
        let mut config = self.clone();
        config.alignment = alignment;
        config
    }

    pub fn with_force_defaults(&self, force_defaults: bool) -> Self {
        let mut config = self.clone();
        config.force_defaults = force_defaults;
        config
    }

    pub fn with_dedup_vtables(&self, dedup_vtables: bool) -> Self {
        let mut config = self.clone();
        config.dedup_vtables = dedup_vtables;
        config
    }

    pub fn with_max_size(&self, max_size: usize) -> Self {
        let mut config = self.clone();
        config.max_size = max_size;
        config
    }
}

#[cfg(test)]
mod tests {
    use tablebuf_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = BuilderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.alignment, 8);
        assert!(config.dedup_vtables);
        assert!(!config.force_defaults);
    }

    #[test]
    fn test_invalid_alignment() {
        for alignment in [0, 3, 12] {
            let e = BuilderConfig::default()
                .with_alignment(alignment)
                .validate()
                .unwrap_err();
            assert!(matches!(e.kind(), ErrorKind::InvalidArgument { name, .. } if name == "alignment"));
        }
    }

    #[test]
    fn test_max_size_ceiling() {
        let config = BuilderConfig::default().with_max_size(MAX_BUFFER_SIZE + 1);
        assert!(config.validate().is_err());

        let config = BuilderConfig::default()
            .with_max_size(64)
            .with_initial_capacity(128);
        assert!(config.validate().is_err());
    }
}
