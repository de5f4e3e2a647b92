//! Client-side query cache policy.
//!
//! The front-end keeps server state (organizations, spaces, documents,
//! threads) in a query cache. This module states that cache's contract
//! explicitly: which views exist, which views each mutation invalidates,
//! and the refetch/retry defaults. The gateway publishes the rules at
//! `GET /api/cache-policy` so the client does not have to infer them.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// QueryKey
///
/// Identity of one cached view: either a list or a fetch-by-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Organizations,
    Organization(Uuid),
    OrganizationMembers(Uuid),
    Spaces(Uuid),
    Space(Uuid),
    Documents(Uuid),
    Document(Uuid),
    Threads(Uuid),
    Thread(Uuid),
    Messages(Uuid),
    // Space-scoped semantic search results.
    DocumentSearch(Uuid),
    Users,
    User(Uuid),
    Me,
}

impl QueryKey {
    /// Kind name without the id, as published to the front-end.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::Organizations => "organizations",
            QueryKey::Organization(_) => "organization",
            QueryKey::OrganizationMembers(_) => "organization_members",
            QueryKey::Spaces(_) => "spaces",
            QueryKey::Space(_) => "space",
            QueryKey::Documents(_) => "documents",
            QueryKey::Document(_) => "document",
            QueryKey::Threads(_) => "threads",
            QueryKey::Thread(_) => "thread",
            QueryKey::Messages(_) => "messages",
            QueryKey::DocumentSearch(_) => "document_search",
            QueryKey::Users => "users",
            QueryKey::User(_) => "user",
            QueryKey::Me => "me",
        }
    }
}

/// Mutation
///
/// Every write the front-end performs, carrying the ids needed to name the
/// views it affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateOrganization,
    UpdateOrganization { id: Uuid },
    DeleteOrganization { id: Uuid },
    AddOrganizationMember { organization_id: Uuid },
    RemoveOrganizationMember { organization_id: Uuid },
    CreateSpace { organization_id: Uuid },
    UpdateSpace { id: Uuid, organization_id: Uuid },
    DeleteSpace { id: Uuid, organization_id: Uuid },
    UploadDocument { space_id: Uuid },
    DeleteDocument { id: Uuid, space_id: Uuid },
    CreateThread { space_id: Uuid },
    UpdateThread { id: Uuid, space_id: Uuid },
    DeleteThread { id: Uuid, space_id: Uuid },
    SendMessage { thread_id: Uuid },
    CreateUser,
    UpdateUser { id: Uuid },
    DeleteUser { id: Uuid },
    UpdateProfile,
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::CreateOrganization => "create_organization",
            Mutation::UpdateOrganization { .. } => "update_organization",
            Mutation::DeleteOrganization { .. } => "delete_organization",
            Mutation::AddOrganizationMember { .. } => "add_organization_member",
            Mutation::RemoveOrganizationMember { .. } => "remove_organization_member",
            Mutation::CreateSpace { .. } => "create_space",
            Mutation::UpdateSpace { .. } => "update_space",
            Mutation::DeleteSpace { .. } => "delete_space",
            Mutation::UploadDocument { .. } => "upload_document",
            Mutation::DeleteDocument { .. } => "delete_document",
            Mutation::CreateThread { .. } => "create_thread",
            Mutation::UpdateThread { .. } => "update_thread",
            Mutation::DeleteThread { .. } => "delete_thread",
            Mutation::SendMessage { .. } => "send_message",
            Mutation::CreateUser => "create_user",
            Mutation::UpdateUser { .. } => "update_user",
            Mutation::DeleteUser { .. } => "delete_user",
            Mutation::UpdateProfile => "update_profile",
        }
    }

    /// invalidates
    ///
    /// Postcondition of a successful mutation: every returned view must be
    /// treated as stale and refetched before it is shown again.
    pub fn invalidates(&self) -> Vec<QueryKey> {
        use QueryKey as K;
        match *self {
            Mutation::CreateOrganization => vec![K::Organizations],
            Mutation::UpdateOrganization { id } => vec![K::Organizations, K::Organization(id)],
            Mutation::DeleteOrganization { id } => vec![
                K::Organizations,
                K::Organization(id),
                K::OrganizationMembers(id),
                K::Spaces(id),
            ],
            Mutation::AddOrganizationMember { organization_id }
            | Mutation::RemoveOrganizationMember { organization_id } => vec![
                K::OrganizationMembers(organization_id),
                K::Organization(organization_id),
            ],
            Mutation::CreateSpace { organization_id } => vec![K::Spaces(organization_id)],
            Mutation::UpdateSpace { id, organization_id } => {
                vec![K::Spaces(organization_id), K::Space(id)]
            }
            Mutation::DeleteSpace { id, organization_id } => vec![
                K::Spaces(organization_id),
                K::Space(id),
                K::Documents(id),
                K::Threads(id),
                K::DocumentSearch(id),
            ],
            // Document counts live on the space view.
            Mutation::UploadDocument { space_id } => vec![
                K::Documents(space_id),
                K::Space(space_id),
                K::DocumentSearch(space_id),
            ],
            Mutation::DeleteDocument { id, space_id } => vec![
                K::Documents(space_id),
                K::Document(id),
                K::Space(space_id),
                K::DocumentSearch(space_id),
            ],
            Mutation::CreateThread { space_id } => vec![K::Threads(space_id)],
            Mutation::UpdateThread { id, space_id } => vec![K::Threads(space_id), K::Thread(id)],
            Mutation::DeleteThread { id, space_id } => {
                vec![K::Threads(space_id), K::Thread(id), K::Messages(id)]
            }
            Mutation::SendMessage { thread_id } => vec![K::Messages(thread_id), K::Thread(thread_id)],
            Mutation::CreateUser => vec![K::Users],
            Mutation::UpdateUser { id } | Mutation::DeleteUser { id } => vec![K::Users, K::User(id)],
            Mutation::UpdateProfile => vec![K::Me],
        }
    }

    /// One representative of every mutation kind, ids zeroed. Used to
    /// publish the invalidation table.
    pub fn catalog() -> Vec<Mutation> {
        let id = Uuid::nil();
        vec![
            Mutation::CreateOrganization,
            Mutation::UpdateOrganization { id },
            Mutation::DeleteOrganization { id },
            Mutation::AddOrganizationMember { organization_id: id },
            Mutation::RemoveOrganizationMember { organization_id: id },
            Mutation::CreateSpace { organization_id: id },
            Mutation::UpdateSpace { id, organization_id: id },
            Mutation::DeleteSpace { id, organization_id: id },
            Mutation::UploadDocument { space_id: id },
            Mutation::DeleteDocument { id, space_id: id },
            Mutation::CreateThread { space_id: id },
            Mutation::UpdateThread { id, space_id: id },
            Mutation::DeleteThread { id, space_id: id },
            Mutation::SendMessage { thread_id: id },
            Mutation::CreateUser,
            Mutation::UpdateUser { id },
            Mutation::DeleteUser { id },
            Mutation::UpdateProfile,
        ]
    }
}

/// RetryPolicy
///
/// Exponential backoff budget for failed fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[ts(type = "number")]
    pub base_delay_ms: u64,
    #[ts(type = "number")]
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Budget for regular queries.
    pub const QUERY: RetryPolicy = RetryPolicy {
        max_retries: 3,
        base_delay_ms: 1_000,
        max_delay_ms: 30_000,
    };

    /// Budget for streaming thread queries, which the user is watching live.
    pub const STREAMING: RetryPolicy = RetryPolicy {
        max_retries: 2,
        base_delay_ms: 500,
        max_delay_ms: 5_000,
    };

    /// `attempt` counts failures so far, starting at 0.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// `min(base * 2^attempt, max)`.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// QueryDefaults
///
/// Defaults the front-end query client is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefaults {
    pub stale_time: Duration,
    pub gc_time: Duration,
    pub retry: RetryPolicy,
    pub streaming_retry: RetryPolicy,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(5 * 60),
            retry: RetryPolicy::QUERY,
            streaming_retry: RetryPolicy::STREAMING,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: serde_json::Value,
    fetched_at: Instant,
    invalidated: bool,
}

/// QueryCache
///
/// Explicitly constructed cache of fetched views. Owned by whoever holds it;
/// there is no process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    defaults: QueryDefaults,
    entries: HashMap<QueryKey, Entry>,
}

impl QueryCache {
    pub fn new(defaults: QueryDefaults) -> Self {
        Self {
            defaults,
            entries: HashMap::new(),
        }
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn put(&mut self, key: QueryKey, value: serde_json::Value, now: Instant) {
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: now,
                invalidated: false,
            },
        );
    }

    /// Returns the cached value only while it is fresh: not invalidated and
    /// younger than `stale_time`.
    pub fn get(&self, key: &QueryKey, now: Instant) -> Option<&serde_json::Value> {
        self.entries
            .get(key)
            .filter(|entry| !entry.invalidated)
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.defaults.stale_time)
            .map(|entry| &entry.value)
    }

    /// True if the key has an entry that must be refetched before use.
    pub fn is_stale(&self, key: &QueryKey, now: Instant) -> bool {
        self.entries.contains_key(key) && self.get(key, now).is_none()
    }

    /// apply
    ///
    /// Enforces the mutation's invalidation postcondition. Returns how many
    /// cached entries were marked stale.
    pub fn apply(&mut self, mutation: &Mutation) -> usize {
        let mut touched = 0;
        for key in mutation.invalidates() {
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.invalidated = true;
                touched += 1;
            }
        }
        tracing::debug!(mutation = mutation.kind(), touched, "query cache invalidated");
        touched
    }

    pub fn remove(&mut self, key: &QueryKey) -> Option<serde_json::Value> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Drops entries older than `gc_time`. Returns the number dropped.
    pub fn collect_garbage(&mut self, now: Instant) -> usize {
        let gc_time = self.defaults.gc_time;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < gc_time);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
