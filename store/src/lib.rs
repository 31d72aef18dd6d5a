//! Sandboxed artifact store: the single choke point through which task and
//! prompt artifacts are read, written, appended, and listed.
//!
//! Guarantees, in enforcement order:
//! - path sandboxing: every relative path must resolve inside the root,
//! - mode gating: a read-only store rejects mutations before any I/O,
//! - pre-write validation through an injected [`WriteValidator`],
//! - atomic writes: temp sibling plus rename, never a partially visible file.

mod error;
mod oplog;
mod store;
mod validate;

pub use error::ErrorCode;
pub use error::OpContext;
pub use error::StoreError;
pub use oplog::OpRecord;
pub use store::AppendOptions;
pub use store::ArtifactStore;
pub use store::JsonWriteOptions;
pub use store::StoreMode;
pub use store::WriteOptions;
pub use validate::ValidationRejection;
pub use validate::ValidationRequest;
pub use validate::WritePayload;
pub use validate::WriteValidator;
