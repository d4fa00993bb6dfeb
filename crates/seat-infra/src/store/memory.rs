//! In-memory store implementations - used as fallback when MongoDB is not
//! configured, and as the store under test.
//!
//! Every conditional mutation runs inside one write-lock critical section,
//! giving the same observable semantics as the MongoDB adapter's atomic
//! conditional updates. Note: data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use seat_core::domain::{Comment, Post, User, VoteOutcome};
use seat_core::error::StoreError;
use seat_core::ports::{Page, PostStore, UserStore, UserUpdate};

/// In-memory post store backed by a HashMap with an async RwLock.
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    async fn sorted_by_date(&self) -> Vec<Post> {
        let posts = self.posts.read().await;
        let mut items: Vec<Post> = posts.values().cloned().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

fn page_of(items: Vec<Post>, page: u64, limit: u64) -> Page<Post> {
    let total_count = items.len() as u64;
    let skip = page.saturating_sub(1) * limit;
    let items: Vec<Post> = items
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect();

    Page {
        has_more: (skip + items.len() as u64) < total_count,
        total_count,
        items,
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn insert(&self, post: Post) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        posts.insert(post.id, post);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.get(&id).cloned())
    }

    async fn list(&self, page: u64, limit: u64) -> Result<Page<Post>, StoreError> {
        Ok(page_of(self.sorted_by_date().await, page, limit))
    }

    async fn list_by_owner(
        &self,
        email: &str,
        page: u64,
        limit: u64,
    ) -> Result<Page<Post>, StoreError> {
        let mut items = self.sorted_by_date().await;
        items.retain(|p| p.user_email == email);
        Ok(page_of(items, page, limit))
    }

    async fn search_by_title(&self, query: &str) -> Result<Vec<Post>, StoreError> {
        let needle = query.to_lowercase();
        let mut items = self.sorted_by_date().await;
        items.retain(|p| p.title.to_lowercase().contains(&needle));
        Ok(items)
    }

    async fn top_rated(&self, page: u64, limit: u64) -> Result<Page<Post>, StoreError> {
        let posts = self.posts.read().await;
        let mut items: Vec<Post> = posts.values().cloned().collect();
        items.sort_by(|a, b| b.votes.cmp(&a.votes).then(b.date.cmp(&a.date)));
        Ok(page_of(items, page, limit))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.len() as u64)
    }

    async fn update_content(
        &self,
        id: Uuid,
        owner_email: &str,
        title: &str,
        description: &str,
    ) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&id) {
            Some(post) if post.user_email == owner_email => {
                post.title = title.to_string();
                post.description = description.to_string();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, owner_email: &str) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        match posts.get(&id) {
            Some(post) if post.user_email == owner_email => {
                posts.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post_id) {
            Some(post) => {
                post.comments.push(comment);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_reply(
        &self,
        post_id: Uuid,
        parent_id: Uuid,
        comment: Comment,
    ) -> Result<bool, StoreError> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post_id) {
            Some(post) if post.comment(parent_id).is_some() => {
                post.comments.push(comment);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn toggle_post_vote(
        &self,
        post_id: Uuid,
        voter: &str,
    ) -> Result<Option<VoteOutcome>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&post_id).map(|post| post.toggle_vote(voter)))
    }

    async fn toggle_comment_vote(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        voter: &str,
    ) -> Result<Option<VoteOutcome>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .get_mut(&post_id)
            .and_then(|post| post.comment_mut(comment_id))
            .map(|comment| comment.toggle_vote(voter)))
    }
}

/// In-memory user store keyed by email.
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, current_email: &str, changes: UserUpdate) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.remove(current_email) {
            Some(mut user) => {
                user.name = changes.name;
                user.email = changes.email;
                user.profile_image = changes.profile_image;
                if let Some(hash) = changes.password_hash {
                    user.password_hash = hash;
                }
                user.updated_at = chrono::Utc::now();
                users.insert(user.email.clone(), user);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    async fn seeded_post(store: &InMemoryPostStore, owner: &str) -> Post {
        let post = Post::new("Solar kiosk".into(), "Off-grid charging".into(), owner.into());
        store.insert(post.clone()).await.unwrap();
        post
    }

    #[tokio::test]
    async fn toggle_parity_through_the_store() {
        let store = InMemoryPostStore::new();
        let post = seeded_post(&store, "owner@x.com").await;

        let first = store.toggle_post_vote(post.id, "a@x.com").await.unwrap();
        assert_eq!(first, Some(VoteOutcome::Cast));

        let second = store.toggle_post_vote(post.id, "a@x.com").await.unwrap();
        assert_eq!(second, Some(VoteOutcome::Withdrawn));

        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.votes, 0);
        assert!(stored.voters.is_empty());
    }

    #[tokio::test]
    async fn vote_count_matches_voter_set_after_every_toggle() {
        let store = InMemoryPostStore::new();
        let post = seeded_post(&store, "owner@x.com").await;

        for voter in ["a@x.com", "b@x.com", "a@x.com", "c@x.com"] {
            store.toggle_post_vote(post.id, voter).await.unwrap();
            let stored = store.find_by_id(post.id).await.unwrap().unwrap();
            assert_eq!(stored.votes as usize, stored.voters.len());
        }
    }

    #[tokio::test]
    async fn toggle_on_missing_post_is_none_and_mutates_nothing() {
        let store = InMemoryPostStore::new();
        let post = seeded_post(&store, "owner@x.com").await;

        let result = store
            .toggle_post_vote(Uuid::new_v4(), "a@x.com")
            .await
            .unwrap();
        assert_eq!(result, None);

        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.votes, 0);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_toggles_by_distinct_voters_both_land() {
        let store = Arc::new(InMemoryPostStore::new());
        let post = seeded_post(&store, "owner@x.com").await;

        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.toggle_post_vote(post.id, "a@x.com").await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.toggle_post_vote(post.id, "b@x.com").await })
        };

        assert_eq!(a.await.unwrap().unwrap(), Some(VoteOutcome::Cast));
        assert_eq!(b.await.unwrap().unwrap(), Some(VoteOutcome::Cast));

        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.votes, 2);
        assert_eq!(stored.voters.len(), 2);
    }

    #[tokio::test]
    async fn comment_toggle_never_touches_siblings() {
        let store = InMemoryPostStore::new();
        let post = seeded_post(&store, "owner@x.com").await;

        let first = Comment::new("a@x.com".into(), "too expensive".into());
        let second = Comment::new("b@x.com".into(), "what about rain".into());
        store.add_comment(post.id, first.clone()).await.unwrap();
        store.add_comment(post.id, second.clone()).await.unwrap();

        let outcome = store
            .toggle_comment_vote(post.id, first.id, "c@x.com")
            .await
            .unwrap();
        assert_eq!(outcome, Some(VoteOutcome::Cast));

        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.comment(first.id).unwrap().votes, 1);
        assert_eq!(stored.comment(second.id).unwrap().votes, 0);
        assert_eq!(stored.votes, 0);

        let missing = store
            .toggle_comment_vote(post.id, Uuid::new_v4(), "c@x.com")
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn reply_requires_an_existing_parent() {
        let store = InMemoryPostStore::new();
        let post = seeded_post(&store, "owner@x.com").await;

        let parent = Comment::new("a@x.com".into(), "root".into());
        store.add_comment(post.id, parent.clone()).await.unwrap();

        let orphan = Comment::reply(Uuid::new_v4(), "b@x.com".into(), "lost".into());
        let added = store
            .add_reply(post.id, orphan.parent_id.unwrap(), orphan)
            .await
            .unwrap();
        assert!(!added);

        let reply = Comment::reply(parent.id, "b@x.com".into(), "agreed".into());
        let added = store.add_reply(post.id, parent.id, reply.clone()).await.unwrap();
        assert!(added);

        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.comments.len(), 2);
        assert_eq!(stored.comment(reply.id).unwrap().parent_id, Some(parent.id));
    }

    #[tokio::test]
    async fn owner_check_collapses_missing_and_forbidden() {
        let store = InMemoryPostStore::new();
        let post = seeded_post(&store, "owner@x.com").await;

        let updated = store
            .update_content(post.id, "intruder@x.com", "hijacked", "nope")
            .await
            .unwrap();
        assert!(!updated);

        let missing = store
            .update_content(Uuid::new_v4(), "owner@x.com", "t", "d")
            .await
            .unwrap();
        assert!(!missing);

        let stored = store.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Solar kiosk");

        assert!(!store.delete(post.id, "intruder@x.com").await.unwrap());
        assert!(store.find_by_id(post.id).await.unwrap().is_some());

        assert!(store.delete(post.id, "owner@x.com").await.unwrap());
        assert!(store.find_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pagination_reports_has_more_and_total() {
        let store = InMemoryPostStore::new();
        for i in 0..5 {
            let mut post = Post::new(format!("Post {i}"), "d".into(), "owner@x.com".into());
            post.date = chrono::Utc::now() + chrono::Duration::seconds(i);
            store.insert(post).await.unwrap();
        }

        let first = store.list(1, 2).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more);
        assert_eq!(first.total_count, 5);
        // Newest first.
        assert_eq!(first.items[0].title, "Post 4");

        let last = store.list(3, 2).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(!last.has_more);
    }

    #[tokio::test]
    async fn top_rated_sorts_by_votes_then_recency() {
        let store = InMemoryPostStore::new();

        let mut old_popular = Post::new("old popular".into(), "d".into(), "o@x.com".into());
        old_popular.date = chrono::Utc::now() - chrono::Duration::days(2);
        let mut fresh_popular = Post::new("fresh popular".into(), "d".into(), "o@x.com".into());
        fresh_popular.date = chrono::Utc::now();
        let quiet = Post::new("quiet".into(), "d".into(), "o@x.com".into());

        store.insert(old_popular.clone()).await.unwrap();
        store.insert(fresh_popular.clone()).await.unwrap();
        store.insert(quiet).await.unwrap();

        for voter in ["a@x.com", "b@x.com"] {
            store.toggle_post_vote(old_popular.id, voter).await.unwrap();
            store.toggle_post_vote(fresh_popular.id, voter).await.unwrap();
        }

        let page = store.top_rated(1, 10).await.unwrap();
        let titles: Vec<&str> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["fresh popular", "old popular", "quiet"]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = InMemoryPostStore::new();
        store
            .insert(Post::new("Solar Kiosk".into(), "d".into(), "o@x.com".into()))
            .await
            .unwrap();
        store
            .insert(Post::new("Rain shelter".into(), "d".into(), "o@x.com".into()))
            .await
            .unwrap();

        let hits = store.search_by_title("solar").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Solar Kiosk");

        assert!(store.search_by_title("bike").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn user_update_rekeys_on_email_change() {
        let store = InMemoryUserStore::new();
        let user = User::new("Ada".into(), "ada@x.com".into(), "hash".into(), None);
        store.insert(user).await.unwrap();

        let changed = store
            .update(
                "ada@x.com",
                UserUpdate {
                    name: "Ada L.".into(),
                    email: "ada@y.com".into(),
                    profile_image: None,
                    password_hash: None,
                },
            )
            .await
            .unwrap();
        assert!(changed);

        assert!(store.find_by_email("ada@x.com").await.unwrap().is_none());
        let moved = store.find_by_email("ada@y.com").await.unwrap().unwrap();
        assert_eq!(moved.name, "Ada L.");
        assert_eq!(moved.password_hash, "hash");

        let ghost = store
            .update(
                "ghost@x.com",
                UserUpdate {
                    name: "G".into(),
                    email: "g@x.com".into(),
                    profile_image: None,
                    password_hash: None,
                },
            )
            .await
            .unwrap();
        assert!(!ghost);
    }
}
