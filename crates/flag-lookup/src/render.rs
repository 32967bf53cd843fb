//! Ordered flagged-list rendering with stale-render discard

use crate::aliases::AliasTable;
use crate::client::FlagLookup;
use crate::FlagLookupError;
use futures::future::join_all;
use nation_ranker::{ListEntry, RankingLists};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A flag lookup plus the alias table applied in front of it
#[derive(Debug)]
pub struct FlagResolver<L> {
    lookup: L,
    aliases: AliasTable,
}

impl<L: FlagLookup> FlagResolver<L> {
    pub fn new(lookup: L, aliases: AliasTable) -> Self {
        Self { lookup, aliases }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Flag URL for a dataset name, `None` when the lookup fails for any reason
    pub async fn resolve(&self, name: &str) -> Option<String> {
        let query = self.aliases.resolve(name);

        match self.lookup.lookup_flag(query).await {
            Ok(url) => Some(url),
            Err(FlagLookupError::NotFound(_)) => {
                debug!("No flag for {:?} (queried as {:?})", name, query);
                None
            }
            Err(e) => {
                warn!("Flag lookup for {:?} failed: {}", name, e);
                None
            }
        }
    }
}

/// A list entry with its flag, if one was found
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedEntry {
    #[serde(flatten)]
    pub entry: ListEntry,
    pub flag_url: Option<String>,
}

/// Both lists of one completed render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedLists {
    pub generation: u64,
    pub best: Vec<FlaggedEntry>,
    pub worst: Vec<FlaggedEntry>,
}

/// Attach flags to `entries`, all lookups in flight at once.
///
/// Output order always equals input order regardless of which lookup
/// completes first.
pub async fn render_entries<L: FlagLookup>(
    entries: &[ListEntry],
    resolver: &FlagResolver<L>,
) -> Vec<FlaggedEntry> {
    let flags = join_all(entries.iter().map(|e| resolver.resolve(&e.name))).await;

    entries
        .iter()
        .cloned()
        .zip(flags)
        .map(|(entry, flag_url)| FlaggedEntry { entry, flag_url })
        .collect()
}

/// Generation of the render that may publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Holds the last published lists and the current render generation.
///
/// Every weight change calls [`RenderBoard::begin`]; only the holder of the
/// newest ticket can publish.
#[derive(Debug, Default)]
pub struct RenderBoard {
    generation: AtomicU64,
    published: RwLock<Option<FlaggedLists>>,
}

impl RenderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new render, superseding every earlier ticket
    pub fn begin(&self) -> RenderTicket {
        RenderTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.0 == self.current_generation()
    }

    /// Store a finished render if its ticket is still current
    pub async fn publish(
        &self,
        ticket: RenderTicket,
        best: Vec<FlaggedEntry>,
        worst: Vec<FlaggedEntry>,
    ) -> bool {
        let mut published = self.published.write().await;

        if !self.is_current(ticket) {
            debug!(
                "Discarding stale render {} (current {})",
                ticket.0,
                self.current_generation()
            );
            return false;
        }

        *published = Some(FlaggedLists {
            generation: ticket.0,
            best,
            worst,
        });
        true
    }

    /// The last published lists
    pub async fn latest(&self) -> Option<FlaggedLists> {
        self.published.read().await.clone()
    }
}

/// Resolve flags for both lists and publish them under `ticket`.
///
/// Returns `false` when a newer render started before this one finished.
pub async fn render_lists<L: FlagLookup>(
    board: &RenderBoard,
    ticket: RenderTicket,
    lists: &RankingLists,
    resolver: &FlagResolver<L>,
) -> bool {
    if !board.is_current(ticket) {
        debug!("Render {} superseded before start", ticket.0);
        return false;
    }

    let (best, worst) = futures::join!(
        render_entries(&lists.best, resolver),
        render_entries(&lists.worst, resolver)
    );

    let flagged = best.iter().chain(&worst).filter(|e| e.flag_url.is_some()).count();
    let published = board.publish(ticket, best, worst).await;
    if published {
        info!(
            "Published render {}: {} best, {} worst, {} flags",
            ticket.0,
            lists.best.len(),
            lists.worst.len(),
            flagged
        );
    }
    published
}
