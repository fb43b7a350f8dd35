//! Feed aggregation pipeline.
//!
//! One run per request, in strictly sequential stages:
//!
//! 1. Resolve the author key (fail fast if none).
//! 2. Fetch the author's recent text notes and sort them newest first.
//! 3. Collect reply parents we don't have yet, plus every author involved.
//! 4. Fetch the missing parents in one query.
//! 5. Collect mentions again, now including parent content.
//! 6. Fetch profiles for every pending author in one query.
//!
//! Each stage makes at most one fetcher call, so a run is bounded by the
//! number of stages times the relay deadline. The main post order is fixed
//! in stage 2; later stages only add auxiliary records.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use nostr::{EventId, Filter, Kind, PublicKey, Timestamp};
use notefeed_core::{PostRecord, ProfileMetadata, refs};

use crate::error::FeedError;
use crate::fetch::Fetcher;
use crate::identity::{DirectoryLookup, Identity, resolve_identity};
use crate::relay::RelaySource;

/// Everything one page render needs, fully fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedData {
    /// Resolved author key.
    pub author_key: String,
    /// Primary post ids, newest first.
    pub main_ids: Vec<String>,
    /// Primary posts and fetched parents, by id.
    pub posts: HashMap<String, PostRecord>,
    /// Profiles by author key.
    pub profiles: HashMap<String, ProfileMetadata>,
    /// Parent ids that were asked for, whether or not they came back.
    pub requested_parents: BTreeSet<String>,
}

/// The aggregation pipeline for one author.
#[derive(Debug, Clone)]
pub struct Pipeline<S, D> {
    fetcher: Fetcher<S>,
    directory: D,
    identity: Identity,
    page_size: usize,
    lookback: Duration,
}

impl<S: RelaySource, D: DirectoryLookup> Pipeline<S, D> {
    /// Build a pipeline that queries `relays` through `source`.
    ///
    /// `page_size` posts make one page; only posts newer than `lookback`
    /// are asked for.
    pub fn new(
        source: S,
        relays: Arc<[String]>,
        directory: D,
        identity: Identity,
        page_size: usize,
        lookback: Duration,
    ) -> Self {
        Self {
            fetcher: Fetcher::new(source, relays),
            directory,
            identity,
            page_size,
            lookback,
        }
    }

    /// Run every stage for `page` (1-indexed) at unix time `now`.
    ///
    /// The only error is an unresolvable author; in that case no relay is
    /// contacted.
    pub async fn run(&self, page: u32, now: u64) -> Result<FeedData, FeedError> {
        let started = Instant::now();

        let author_key = resolve_identity(&self.identity, &self.directory)
            .await
            .ok_or(FeedError::IdentityUnresolved)?;

        let author = PublicKey::from_hex(&author_key).context("resolved author key is not hex")?;
        let mut data = FeedData {
            author_key,
            ..Default::default()
        };

        let stage = Instant::now();
        self.fetch_primary(&mut data, author, page, now).await;
        tracing::debug!(
            posts = data.main_ids.len(),
            elapsed_ms = stage.elapsed().as_millis() as u64,
            "primary posts fetched"
        );

        // Parents we don't have, and every author seen so far.
        let mut pending_authors = BTreeSet::new();
        let mut pending_parents = BTreeSet::new();
        for post in data.posts.values() {
            let references = refs::extract(post);
            if let Some(parent) = references.parent
                && !data.posts.contains_key(&parent)
            {
                pending_parents.insert(parent);
            }
            pending_authors.extend(references.mentions);
            pending_authors.insert(post.pubkey.clone());
        }

        if !pending_parents.is_empty() {
            let stage = Instant::now();
            let filter =
                Filter::new().ids(pending_parents.iter().filter_map(|id| EventId::from_hex(id).ok()));
            let mut returned = 0usize;
            for record in self.fetcher.fetch(&filter).await {
                if !pending_parents.contains(&record.id) {
                    continue;
                }
                pending_authors.insert(record.pubkey.clone());
                if let Entry::Vacant(slot) = data.posts.entry(record.id.clone()) {
                    slot.insert(record);
                    returned += 1;
                }
            }
            tracing::debug!(
                requested = pending_parents.len(),
                returned,
                elapsed_ms = stage.elapsed().as_millis() as u64,
                "parents fetched"
            );
        }
        data.requested_parents = pending_parents;

        // Parents can mention people too.
        for post in data.posts.values() {
            pending_authors.extend(refs::mentioned_keys(post));
        }

        if !pending_authors.is_empty() {
            let stage = Instant::now();
            let filter = Filter::new().kind(Kind::Metadata).authors(
                pending_authors
                    .iter()
                    .filter_map(|pk| PublicKey::from_hex(pk).ok()),
            );
            for record in self.fetcher.fetch(&filter).await {
                if Kind::from(record.kind) != Kind::Metadata
                    || !pending_authors.contains(&record.pubkey)
                {
                    continue;
                }
                let Entry::Vacant(slot) = data.profiles.entry(record.pubkey.clone()) else {
                    continue;
                };
                match ProfileMetadata::from_json(&record.content) {
                    Some(profile) => {
                        slot.insert(profile);
                    }
                    None => {
                        tracing::debug!(pubkey = %record.pubkey, "skipping unparseable profile");
                    }
                }
            }
            tracing::debug!(
                requested = pending_authors.len(),
                returned = data.profiles.len(),
                elapsed_ms = stage.elapsed().as_millis() as u64,
                "profiles fetched"
            );
        }

        tracing::info!(
            author = %data.author_key,
            page,
            posts = data.main_ids.len(),
            parents = data.requested_parents.len(),
            profiles = data.profiles.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feed aggregated"
        );

        Ok(data)
    }

    /// Stage 2. Every page up to `page` is fetched so the slice is right.
    async fn fetch_primary(&self, data: &mut FeedData, author: PublicKey, page: u32, now: u64) {
        let limit = self.page_size.saturating_mul(page.max(1) as usize);
        let filter = Filter::new()
            .kind(Kind::TextNote)
            .author(author)
            .since(Timestamp::from_secs(now.saturating_sub(self.lookback.as_secs())))
            .limit(limit);

        let mut primary = Vec::new();
        for record in self.fetcher.fetch(&filter).await {
            if Kind::from(record.kind) != Kind::TextNote || record.pubkey != data.author_key {
                continue;
            }
            if let Entry::Vacant(slot) = data.posts.entry(record.id.clone()) {
                primary.push((record.id.clone(), record.created_at));
                slot.insert(record);
            }
        }

        // Stable: equal timestamps keep fetch order.
        primary.sort_by(|a, b| b.1.cmp(&a.1));
        data.main_ids = primary.into_iter().map(|(id, _)| id).collect();
    }
}
