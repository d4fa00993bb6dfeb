//! Domain entities - the core business objects.

mod comment_tree;
mod post;
mod user;

pub use comment_tree::{CommentNode, REPLY_COLLAPSE_DEPTH, build_comment_tree};
pub use post::{Comment, Post, VoteOutcome};
pub use user::User;
