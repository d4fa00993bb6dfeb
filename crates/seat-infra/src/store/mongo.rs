//! MongoDB store implementations.
//!
//! Vote toggles run as a two-phase conditional update: first try the
//! "withdraw" update scoped to documents where the voter is present, then
//! the "cast" update scoped to documents where the voter is absent. Each
//! phase is a single atomic `update_one`, so there is no read-then-write
//! window and a voter can never be counted twice. Comment-level updates
//! address the embedded array element through an `arrayFilters` binding.

use futures::TryStreamExt;
use mongodb::bson::{Document, doc};
use mongodb::options::UpdateOptions;
use mongodb::{Client, Collection};
use uuid::Uuid;

use async_trait::async_trait;

use seat_core::domain::{Comment, Post, User, VoteOutcome};
use seat_core::error::StoreError;
use seat_core::ports::{Page, PostStore, UserStore, UserUpdate};

use super::document::{CommentDocument, PostDocument, UserDocument};

/// MongoDB connection settings.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Shared client plus the typed collection handles.
pub struct MongoConnections {
    pub posts: MongoPostStore,
    pub users: MongoUserStore,
}

impl MongoConnections {
    /// Connect and verify the server is reachable.
    pub async fn init(config: &MongoConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        tracing::info!(database = %config.database, "Connected to MongoDB");

        Ok(Self {
            posts: MongoPostStore {
                collection: db.collection("posts"),
            },
            users: MongoUserStore {
                collection: db.collection("users"),
            },
        })
    }
}

/// MongoDB post store.
pub struct MongoPostStore {
    collection: Collection<PostDocument>,
}

/// MongoDB user store.
pub struct MongoUserStore {
    collection: Collection<UserDocument>,
}

fn query_err(e: mongodb::error::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn decode_err(e: uuid::Error) -> StoreError {
    StoreError::Serialization(e.to_string())
}

impl MongoPostStore {
    async fn find_page(
        &self,
        filter: Document,
        sort: Document,
        page: u64,
        limit: u64,
    ) -> Result<Page<Post>, StoreError> {
        let skip = page.saturating_sub(1) * limit;

        let docs: Vec<PostDocument> = self
            .collection
            .find(filter.clone())
            .sort(sort)
            .skip(skip)
            .limit(limit as i64)
            .await
            .map_err(query_err)?
            .try_collect()
            .await
            .map_err(query_err)?;

        let total_count = self
            .collection
            .count_documents(filter)
            .await
            .map_err(query_err)?;

        let items: Vec<Post> = docs
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()
            .map_err(decode_err)?;

        Ok(Page {
            has_more: (skip + items.len() as u64) < total_count,
            total_count,
            items,
        })
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn insert(&self, post: Post) -> Result<(), StoreError> {
        let id = post.id;
        self.collection
            .insert_one(PostDocument::from(post))
            .await
            .map_err(query_err)?;
        tracing::debug!(post_id = %id, "Post inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let doc = self
            .collection
            .find_one(doc! { "_id": id.to_string() })
            .await
            .map_err(query_err)?;

        doc.map(Post::try_from).transpose().map_err(decode_err)
    }

    async fn list(&self, page: u64, limit: u64) -> Result<Page<Post>, StoreError> {
        self.find_page(doc! {}, doc! { "date": -1 }, page, limit)
            .await
    }

    async fn list_by_owner(
        &self,
        email: &str,
        page: u64,
        limit: u64,
    ) -> Result<Page<Post>, StoreError> {
        self.find_page(doc! { "user_email": email }, doc! { "date": -1 }, page, limit)
            .await
    }

    async fn search_by_title(&self, query: &str) -> Result<Vec<Post>, StoreError> {
        let docs: Vec<PostDocument> = self
            .collection
            .find(doc! { "title": { "$regex": query, "$options": "i" } })
            .sort(doc! { "date": -1 })
            .await
            .map_err(query_err)?
            .try_collect()
            .await
            .map_err(query_err)?;

        docs.into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()
            .map_err(decode_err)
    }

    async fn top_rated(&self, page: u64, limit: u64) -> Result<Page<Post>, StoreError> {
        self.find_page(doc! {}, doc! { "votes": -1, "date": -1 }, page, limit)
            .await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(query_err)
    }

    async fn update_content(
        &self,
        id: Uuid,
        owner_email: &str,
        title: &str,
        description: &str,
    ) -> Result<bool, StoreError> {
        // The owner constraint lives in the filter, so a non-owner request
        // is indistinguishable from a missing post.
        let result = self
            .collection
            .update_one(
                doc! { "_id": id.to_string(), "user_email": owner_email },
                doc! { "$set": { "title": title, "description": description } },
            )
            .await
            .map_err(query_err)?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: Uuid, owner_email: &str) -> Result<bool, StoreError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.to_string(), "user_email": owner_email })
            .await
            .map_err(query_err)?;

        Ok(result.deleted_count > 0)
    }

    async fn add_comment(&self, post_id: Uuid, comment: Comment) -> Result<bool, StoreError> {
        let comment_doc = mongodb::bson::to_bson(&CommentDocument::from(comment))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": post_id.to_string() },
                doc! { "$push": { "comments": comment_doc } },
            )
            .await
            .map_err(query_err)?;

        Ok(result.matched_count > 0)
    }

    async fn add_reply(
        &self,
        post_id: Uuid,
        parent_id: Uuid,
        comment: Comment,
    ) -> Result<bool, StoreError> {
        let comment_doc = mongodb::bson::to_bson(&CommentDocument::from(comment))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Filtering on the parent comment id makes the parent-existence
        // check part of the same atomic update.
        let result = self
            .collection
            .update_one(
                doc! {
                    "_id": post_id.to_string(),
                    "comments.id": parent_id.to_string(),
                },
                doc! { "$push": { "comments": comment_doc } },
            )
            .await
            .map_err(query_err)?;

        Ok(result.matched_count > 0)
    }

    async fn toggle_post_vote(
        &self,
        post_id: Uuid,
        voter: &str,
    ) -> Result<Option<VoteOutcome>, StoreError> {
        let id = post_id.to_string();

        // Phase 1: withdraw, conditioned on the voter being present.
        let withdraw = self
            .collection
            .update_one(
                doc! { "_id": &id, "voters": voter },
                doc! { "$pull": { "voters": voter }, "$inc": { "votes": -1 } },
            )
            .await
            .map_err(query_err)?;

        if withdraw.modified_count > 0 {
            return Ok(Some(VoteOutcome::Withdrawn));
        }

        // Phase 2: cast, conditioned on the voter being absent.
        let cast = self
            .collection
            .update_one(
                doc! { "_id": &id, "voters": { "$ne": voter } },
                doc! { "$addToSet": { "voters": voter }, "$inc": { "votes": 1 } },
            )
            .await
            .map_err(query_err)?;

        if cast.modified_count > 0 {
            Ok(Some(VoteOutcome::Cast))
        } else {
            // Neither phase matched: the post is gone.
            Ok(None)
        }
    }

    async fn toggle_comment_vote(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        voter: &str,
    ) -> Result<Option<VoteOutcome>, StoreError> {
        let id = post_id.to_string();
        let cid = comment_id.to_string();

        let scope = UpdateOptions::builder()
            .array_filters(vec![doc! { "c.id": &cid }])
            .build();

        let withdraw = self
            .collection
            .update_one(
                doc! {
                    "_id": &id,
                    "comments": { "$elemMatch": { "id": &cid, "voters": voter } },
                },
                doc! {
                    "$pull": { "comments.$[c].voters": voter },
                    "$inc": { "comments.$[c].votes": -1 },
                },
            )
            .with_options(scope.clone())
            .await
            .map_err(query_err)?;

        if withdraw.modified_count > 0 {
            return Ok(Some(VoteOutcome::Withdrawn));
        }

        let cast = self
            .collection
            .update_one(
                doc! {
                    "_id": &id,
                    "comments": { "$elemMatch": { "id": &cid, "voters": { "$ne": voter } } },
                },
                doc! {
                    "$addToSet": { "comments.$[c].voters": voter },
                    "$inc": { "comments.$[c].votes": 1 },
                },
            )
            .with_options(scope)
            .await
            .map_err(query_err)?;

        if cast.modified_count > 0 {
            Ok(Some(VoteOutcome::Cast))
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let doc = self
            .collection
            .find_one(doc! { "email": email })
            .await
            .map_err(query_err)?;

        doc.map(User::try_from).transpose().map_err(decode_err)
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        self.collection
            .insert_one(UserDocument::from(user.clone()))
            .await
            .map_err(query_err)?;
        Ok(user)
    }

    async fn update(&self, current_email: &str, changes: UserUpdate) -> Result<bool, StoreError> {
        let mut set = doc! {
            "name": &changes.name,
            "email": &changes.email,
            "profile_image": changes.profile_image.as_deref(),
            "updated_at": mongodb::bson::DateTime::now(),
        };
        if let Some(hash) = &changes.password_hash {
            set.insert("password_hash", hash);
        }

        let result = self
            .collection
            .update_one(doc! { "email": current_email }, doc! { "$set": set })
            .await
            .map_err(query_err)?;

        Ok(result.matched_count > 0)
    }
}

// Mask email for logging to avoid PII in logs. The first character of the
// local part may be multi-byte, so never slice by byte offset.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at) => {
            let mut local = email[..at].chars();
            match local.next() {
                Some(first) if local.next().is_some() => {
                    format!("{first}***{}", &email[at..])
                }
                _ => format!("***{}", &email[at..]),
            }
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn masks_local_part() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[test]
    fn masks_multibyte_local_part_without_panicking() {
        assert_eq!(mask_email("élise@example.com"), "é***@example.com");
        assert_eq!(mask_email("é@example.com"), "***@example.com");
        assert_eq!(mask_email("日本@example.jp"), "日***@example.jp");
    }
}
