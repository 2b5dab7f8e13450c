/// Errors raised by the pure ingestion-side logic.
///
/// Per-archive failures (`CorruptArchive`, `EntryTooLarge`) abort only the
/// archive that raised them; sibling inputs in the same upload batch are
/// unaffected.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("archive structure unreadable: {0}")]
    CorruptArchive(String),

    #[error("archive entry '{name}' is too large to materialize ({size} bytes)")]
    EntryTooLarge { name: String, size: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
