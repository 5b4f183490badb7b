//! Enrichment side-channels: avatar resolution and commit-author email
//! backfill. These are the only parts of normalization that touch the
//! network, so both are bounded (at most [`MAX_IN_FLIGHT`] concurrent
//! fetches), memoized for the process lifetime and allowed to fail
//! silently: a failed fetch leaves the field unset and is not cached, so a
//! later sync cycle may retry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tracing::debug;

use crate::github::models::TimelineEvent;
use crate::timeline::normalizer::for_each_account_mut;

/// Concurrency cap for in-flight avatar fetches.
pub const MAX_IN_FLIGHT: usize = 3;

/// Resolves an avatar URL to an inline representation (a data URI).
/// Implementations must not fail past this boundary; any error is `None`.
#[async_trait]
pub trait AvatarResolver: Send + Sync {
    async fn resolve(&self, avatar_url: &str) -> Option<String>;
}

/// Resolves a commit author's login to an email address. Same contract as
/// [`AvatarResolver`]: errors never cross this boundary.
#[async_trait]
pub trait EmailResolver: Send + Sync {
    async fn resolve(&self, login: &str) -> Option<String>;
}

/// Process-lifetime memoization of resolved values (avatars keyed by URL,
/// emails keyed by login; use one cache per concern). No eviction: the set
/// of distinct keys is small relative to process lifetime. Failed fetches
/// are never inserted, which is the only way an entry stays absent.
pub struct MemoCache {
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, url: &str) -> Option<String> {
        self.cache.read().await.get(url).cloned()
    }

    pub async fn put(&self, url: String, resolved: String) {
        self.cache.write().await.insert(url, resolved);
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }
}

impl Clone for MemoCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl Default for MemoCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace every embedded account's `avatar_url` across a timeline with its
/// resolved form. Distinct URLs are fetched once, at most [`MAX_IN_FLIGHT`]
/// at a time; accounts whose resolution failed keep no avatar rather than a
/// broken one. Never fails the surrounding sync cycle.
pub async fn resolve_timeline_avatars(
    timeline: &mut [TimelineEvent],
    resolver: &dyn AvatarResolver,
    cache: &MemoCache,
) {
    let mut pending: HashSet<String> = HashSet::new();
    for event in timeline.iter_mut() {
        for_each_account_mut(event, |account| {
            if let Some(url) = &account.avatar_url {
                pending.insert(url.clone());
            }
        });
    }

    let mut to_fetch = Vec::new();
    for url in pending {
        if cache.get(&url).await.is_none() {
            to_fetch.push(url);
        }
    }

    let resolved: Vec<(String, Option<String>)> = stream::iter(to_fetch)
        .map(|url| async move {
            let result = resolver.resolve(&url).await;
            (url, result)
        })
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;

    for (url, result) in resolved {
        match result {
            Some(data) => cache.put(url, data).await,
            None => debug!(%url, "avatar resolution failed; leaving unset"),
        }
    }

    for event in timeline.iter_mut() {
        let mut replacements: Vec<(String, Option<String>)> = Vec::new();
        for_each_account_mut(event, |account| {
            if let Some(url) = &account.avatar_url {
                replacements.push((url.clone(), None));
            }
        });
        for (url, slot) in replacements.iter_mut() {
            *slot = cache.get(url).await;
        }
        let mut idx = 0;
        for_each_account_mut(event, |account| {
            if account.avatar_url.is_some() {
                account.avatar_url = replacements[idx].1.clone();
                idx += 1;
            }
        });
    }
}

/// Fill in missing emails on commit authors across a timeline. Only
/// `Committed` events participate; the ghost author (empty login) and
/// authors that already carry a git email are skipped. Distinct logins are
/// resolved once, at most [`MAX_IN_FLIGHT`] at a time; a failed resolution
/// leaves the field unset and uncached.
pub async fn backfill_commit_emails(
    timeline: &mut [TimelineEvent],
    resolver: &dyn EmailResolver,
    cache: &MemoCache,
) {
    let mut pending: HashSet<String> = HashSet::new();
    for event in timeline.iter() {
        if let TimelineEvent::Committed { author, .. } = event {
            if author.email.is_none() && !author.login.is_empty() {
                pending.insert(author.login.clone());
            }
        }
    }

    let mut to_fetch = Vec::new();
    for login in pending {
        if cache.get(&login).await.is_none() {
            to_fetch.push(login);
        }
    }

    let resolved: Vec<(String, Option<String>)> = stream::iter(to_fetch)
        .map(|login| async move {
            let result = resolver.resolve(&login).await;
            (login, result)
        })
        .buffer_unordered(MAX_IN_FLIGHT)
        .collect()
        .await;

    for (login, result) in resolved {
        match result {
            Some(email) => cache.put(login, email).await,
            None => debug!(%login, "email backfill failed; leaving unset"),
        }
    }

    for event in timeline.iter_mut() {
        if let TimelineEvent::Committed { author, .. } = event {
            if author.email.is_none() && !author.login.is_empty() {
                author.email = cache.get(&author.login).await;
            }
        }
    }
}

/// Fetches avatar bytes over HTTP and inlines them as a data URI.
pub struct HttpAvatarResolver {
    client: reqwest::Client,
}

impl HttpAvatarResolver {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpAvatarResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvatarResolver for HttpAvatarResolver {
    async fn resolve(&self, avatar_url: &str) -> Option<String> {
        let response = self.client.get(avatar_url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await.ok()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Some(format!("data:{content_type};base64,{encoded}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::models::{Account, TimelineEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubResolver {
        calls: AtomicUsize,
        fail_for: Option<String>,
    }

    impl StubResolver {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_for: None,
            }
        }
    }

    #[async_trait]
    impl AvatarResolver for StubResolver {
        async fn resolve(&self, avatar_url: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.as_deref() == Some(avatar_url) {
                return None;
            }
            Some(format!("data:resolved,{avatar_url}"))
        }
    }

    fn commit_by(login: &str, avatar: Option<&str>) -> TimelineEvent {
        TimelineEvent::Committed {
            sha: format!("sha-{login}"),
            author: Account {
                login: login.to_string(),
                url: String::new(),
                avatar_url: avatar.map(str::to_string),
                email: None,
                name: None,
            },
            message: String::new(),
            authored_date: None,
            url: None,
        }
    }

    fn avatar_of(event: &TimelineEvent) -> Option<&str> {
        match event {
            TimelineEvent::Committed { author, .. } => author.avatar_url.as_deref(),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_avatars_are_replaced_and_memoized() {
        let mut timeline = vec![
            commit_by("a", Some("https://avatars/a")),
            commit_by("a2", Some("https://avatars/a")),
            commit_by("b", Some("https://avatars/b")),
        ];
        let resolver = StubResolver::new();
        let cache = MemoCache::new();

        resolve_timeline_avatars(&mut timeline, &resolver, &cache).await;

        assert_eq!(avatar_of(&timeline[0]), Some("data:resolved,https://avatars/a"));
        assert_eq!(avatar_of(&timeline[1]), Some("data:resolved,https://avatars/a"));
        assert_eq!(avatar_of(&timeline[2]), Some("data:resolved,https://avatars/b"));
        // Two distinct URLs, two fetches.
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);

        // Second cycle hits the cache only.
        let mut again = vec![commit_by("a", Some("https://avatars/a"))];
        resolve_timeline_avatars(&mut again, &resolver, &cache).await;
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_resolution_leaves_avatar_unset_and_uncached() {
        let mut timeline = vec![commit_by("a", Some("https://avatars/broken"))];
        let resolver = StubResolver {
            calls: AtomicUsize::new(0),
            fail_for: Some("https://avatars/broken".to_string()),
        };
        let cache = MemoCache::new();

        resolve_timeline_avatars(&mut timeline, &resolver, &cache).await;

        assert_eq!(avatar_of(&timeline[0]), None);
        // Not cached, so a later cycle fetches again.
        assert!(cache.is_empty().await);
        let mut retry = vec![commit_by("a", Some("https://avatars/broken"))];
        resolve_timeline_avatars(&mut retry, &resolver, &cache).await;
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_accounts_without_avatars_are_untouched() {
        let mut timeline = vec![commit_by("ghost", None)];
        let resolver = StubResolver::new();
        let cache = MemoCache::new();

        resolve_timeline_avatars(&mut timeline, &resolver, &cache).await;

        assert_eq!(avatar_of(&timeline[0]), None);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    struct StubEmailResolver {
        calls: AtomicUsize,
        known: Option<(String, String)>,
    }

    #[async_trait]
    impl EmailResolver for StubEmailResolver {
        async fn resolve(&self, login: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.known {
                Some((known_login, email)) if known_login == login => Some(email.clone()),
                _ => None,
            }
        }
    }

    fn commit_with_email(login: &str, email: Option<&str>) -> TimelineEvent {
        TimelineEvent::Committed {
            sha: format!("sha-{login}"),
            author: Account {
                login: login.to_string(),
                url: String::new(),
                avatar_url: None,
                email: email.map(str::to_string),
                name: None,
            },
            message: String::new(),
            authored_date: None,
            url: None,
        }
    }

    fn email_of(event: &TimelineEvent) -> Option<&str> {
        match event {
            TimelineEvent::Committed { author, .. } => author.email.as_deref(),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_missing_commit_emails_are_backfilled_and_memoized() {
        let mut timeline = vec![
            commit_with_email("alice", None),
            commit_with_email("alice", None),
        ];
        let resolver = StubEmailResolver {
            calls: AtomicUsize::new(0),
            known: Some(("alice".to_string(), "alice@example.com".to_string())),
        };
        let cache = MemoCache::new();

        backfill_commit_emails(&mut timeline, &resolver, &cache).await;

        assert_eq!(email_of(&timeline[0]), Some("alice@example.com"));
        assert_eq!(email_of(&timeline[1]), Some("alice@example.com"));
        // One login, one lookup.
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_existing_email_and_ghost_author_are_skipped() {
        let mut timeline = vec![
            commit_with_email("bob", Some("bob@git.example")),
            commit_with_email("", None),
        ];
        let resolver = StubEmailResolver {
            calls: AtomicUsize::new(0),
            known: None,
        };
        let cache = MemoCache::new();

        backfill_commit_emails(&mut timeline, &resolver, &cache).await;

        assert_eq!(email_of(&timeline[0]), Some("bob@git.example"));
        assert_eq!(email_of(&timeline[1]), None);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_email_lookup_leaves_field_unset_and_uncached() {
        let mut timeline = vec![commit_with_email("carol", None)];
        let resolver = StubEmailResolver {
            calls: AtomicUsize::new(0),
            known: None,
        };
        let cache = MemoCache::new();

        backfill_commit_emails(&mut timeline, &resolver, &cache).await;

        assert_eq!(email_of(&timeline[0]), None);
        assert!(cache.is_empty().await);

        let mut retry = vec![commit_with_email("carol", None)];
        backfill_commit_emails(&mut retry, &resolver, &cache).await;
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }
}
