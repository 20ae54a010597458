//! # Kizuna
//!
//! Family history archive with verifiable integrity. Kizuna keeps a family
//! graph of persons, memories, and relationship edges with transactionally
//! enforced invariants, and anchors every committed entity as a canonical
//! content-addressed snapshot on an append-only ledger. Reads recompute the
//! content hash and refuse any snapshot whose bytes no longer match the
//! anchor.
//!
//! ## Quick Start
//!
//! ```rust
//! use kizuna::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Embedded defaults: in-memory content store and ledger.
//!     let kizuna = init_with_defaults().await?;
//!     let actor = ActorId::system();
//!
//!     // Record two people and a parent edge; each commit is archived and
//!     // anchored automatically.
//!     let hanako = kizuna
//!         .graph()
//!         .create_person(&actor, Person::new("Hanako", Gender::Female))
//!         .await?;
//!     let taro = kizuna
//!         .graph()
//!         .create_person(&actor, Person::new("Taro", Gender::Male))
//!         .await?;
//!     kizuna
//!         .graph()
//!         .link_relationship(&actor, RelationshipKind::Parent, &hanako.id, &taro.id)
//!         .await?;
//!
//!     // Read back with integrity verification against the anchor.
//!     let entity = kizuna
//!         .archive()
//!         .read_verified(&EntityId::from(&taro.id))
//!         .await?;
//!     assert_eq!(entity.kind(), "person");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Graph**: persons and memories with bidirectionally mirrored edges,
//!   bounded acyclicity checking, and per-entity lock serialization.
//! - **Archive**: canonical snapshot codec, content addressing, idempotent
//!   pushes to a [`ContentStore`](storage::ContentStore), anchoring on an
//!   [`AnchorLedger`](storage::AnchorLedger), append-only change log.
//! - **Seams**: the store and ledger are async traits; the in-memory backends
//!   are the embedded default, real IPFS/EVM transports plug in behind them.

pub mod addressing;
pub mod archive;
pub mod codec;
pub mod config;
pub mod graph;
pub mod hooks;
pub mod logging;
pub mod models;
pub mod storage;

use crate::archive::ArchiveService;
use crate::graph::FamilyGraph;
use crate::storage::{AnchorLedger, ContentIndex, ContentStore, MemoryContentStore, MemoryLedger};
use std::sync::Arc;
use tracing::info;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{Kizuna, KizunaError, Result, init, init_with_backends, init_with_defaults};

    pub use crate::config::{ConfigBuilder, KizunaConfig, LogFormat, LogLevel, ReanchorPolicy};

    pub use crate::models::{
        ActorId, ArchiveEntity, EntityId, Gender, Memory, MemoryBuilder, MemoryId, Person,
        PersonBuilder, PersonId,
    };

    pub use crate::addressing::ContentId;
    pub use crate::archive::{AnchorReceipt, ArchiveService, ChangeLogEntry, MediaType};
    pub use crate::graph::{FamilyGraph, GraphError, RelationshipKind};
    pub use crate::storage::{
        AnchorLedger, ContentStore, MemoryContentStore, MemoryLedger, StorageError,
    };
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for kizuna operations
#[derive(Debug, thiserror::Error)]
pub enum KizunaError {
    /// Graph command or query failure
    #[error("Graph error: {0}")]
    Graph(#[from] crate::graph::GraphError),

    /// Archive commit, read, or verification failure
    #[error("Archive error: {0}")]
    Archive(#[from] crate::archive::ArchiveError),

    /// Snapshot encoding or decoding failure
    #[error("Codec error: {0}")]
    Codec(#[from] crate::codec::CodecError),

    /// External store or ledger failure
    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),
}

impl From<crate::config::ConfigError> for KizunaError {
    fn from(err: crate::config::ConfigError) -> Self {
        KizunaError::Configuration(err.to_string())
    }
}

/// Result type for kizuna operations
pub type Result<T> = std::result::Result<T, KizunaError>;

/// A fully wired kizuna instance: the family graph with the archive service
/// registered as its commit sink and content index.
#[derive(Debug, Clone)]
pub struct Kizuna {
    graph: Arc<FamilyGraph>,
    archive: Arc<ArchiveService>,
}

impl Kizuna {
    pub fn graph(&self) -> &FamilyGraph {
        &self.graph
    }

    pub fn archive(&self) -> &ArchiveService {
        &self.archive
    }
}

/// Initialize kizuna with default configuration and the embedded in-memory
/// store and ledger.
pub async fn init_with_defaults() -> Result<Kizuna> {
    let config = config::ConfigBuilder::new().build()?;
    init(config).await
}

/// Initialize kizuna with the provided configuration and the embedded
/// in-memory store and ledger.
pub async fn init(config: config::KizunaConfig) -> Result<Kizuna> {
    let store = Arc::new(MemoryContentStore::new());
    let ledger = Arc::new(MemoryLedger::new());
    init_with_backends(config, store, ledger).await
}

/// Initialize kizuna against caller-provided store and ledger backends.
///
/// Wires logging, constructs the archive service, and registers it on the
/// graph's hook registry so every graph commit is archived and anchored.
pub async fn init_with_backends(
    config: config::KizunaConfig,
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn AnchorLedger>,
) -> Result<Kizuna> {
    logging::init(&config.logging)?;

    let archive = Arc::new(ArchiveService::new(store, ledger, config.archive));
    let index: Arc<dyn ContentIndex> = archive.clone();
    let graph = FamilyGraph::new(config.graph).with_content_index(index);
    graph.hooks().register(archive.clone()).await;

    info!(version = VERSION, "💞 Kizuna initialized");
    Ok(Kizuna {
        graph: Arc::new(graph),
        archive,
    })
}
