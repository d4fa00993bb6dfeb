//! Data Transfer Objects - request/response types for the API.
//!
//! Field names stay camelCase on the wire to match the existing clients.

use serde::{Deserialize, Serialize};

use seat_core::domain::{CommentNode, Post, User};

/// Request to sign up a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to update a profile. `current_email` identifies the user;
/// a `None` password keeps the existing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
    pub current_email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// A user's public information - everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            profile_image: user.profile_image,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub description: String,
    pub user_email: String,
}

/// Response after creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub post_id: String,
}

/// Request to update a post; `user_email` must match the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: String,
    pub description: String,
    pub user_email: String,
}

/// Body carrying only the acting user, for votes and deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEmailRequest {
    pub user_email: String,
}

/// Request to add a comment or a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub user_email: String,
    pub text: String,
}

/// Result of a vote toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResponse {
    pub upvoted: bool,
}

/// One page of posts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPageResponse {
    pub posts: Vec<Post>,
    pub has_more: bool,
    pub total_count: u64,
}

/// Title search results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub posts: Vec<Post>,
    pub total_count: u64,
}

/// A single post plus its threaded comment tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub post: Post,
    pub comment_tree: Vec<CommentNode>,
}

/// Total post count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}
