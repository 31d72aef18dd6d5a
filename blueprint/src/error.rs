use taskforge_store::StoreError;

/// Failures from blueprint loading, placeholder resolution, and generation.
#[derive(Debug, thiserror::Error)]
pub enum BlueprintError {
    /// A required placeholder had no supplied value and no default. Supplied
    /// empty strings count as missing.
    #[error("Missing required placeholder \"{name}\"")]
    MissingPlaceholder { name: String },

    /// Store-level failures (sandbox, mode gate, validation, I/O, parse)
    /// propagate unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}
