//! BSON persistence models for the MongoDB store.
//!
//! Ids are stored as their canonical hyphenated string form so documents
//! stay readable in the shell and portable across drivers; timestamps use
//! native BSON datetimes.

use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use seat_core::domain::{Comment, Post, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub user_email: String,
    pub date: BsonDateTime,
    pub votes: i64,
    pub voters: Vec<String>,
    pub comments: Vec<CommentDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDocument {
    pub id: String,
    pub parent_id: Option<String>,
    pub user_email: String,
    pub text: String,
    pub date: BsonDateTime,
    pub votes: i64,
    pub voters: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl From<Post> for PostDocument {
    fn from(post: Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            description: post.description,
            user_email: post.user_email,
            date: BsonDateTime::from_chrono(post.date),
            votes: post.votes,
            voters: post.voters,
            comments: post.comments.into_iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<PostDocument> for Post {
    type Error = uuid::Error;

    fn try_from(doc: PostDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&doc.id)?,
            title: doc.title,
            description: doc.description,
            user_email: doc.user_email,
            date: doc.date.to_chrono(),
            votes: doc.votes,
            voters: doc.voters,
            comments: doc
                .comments
                .into_iter()
                .map(Comment::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<Comment> for CommentDocument {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            parent_id: comment.parent_id.map(|p| p.to_string()),
            user_email: comment.user_email,
            text: comment.text,
            date: BsonDateTime::from_chrono(comment.date),
            votes: comment.votes,
            voters: comment.voters,
        }
    }
}

impl TryFrom<CommentDocument> for Comment {
    type Error = uuid::Error;

    fn try_from(doc: CommentDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&doc.id)?,
            parent_id: doc.parent_id.as_deref().map(Uuid::parse_str).transpose()?,
            user_email: doc.user_email,
            text: doc.text,
            date: doc.date.to_chrono(),
            votes: doc.votes,
            voters: doc.voters,
        })
    }
}

impl From<User> for UserDocument {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            profile_image: user.profile_image,
            created_at: BsonDateTime::from_chrono(user.created_at),
            updated_at: BsonDateTime::from_chrono(user.updated_at),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = uuid::Error;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&doc.id)?,
            name: doc.name,
            email: doc.email,
            password_hash: doc.password_hash,
            profile_image: doc.profile_image,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
        })
    }
}
