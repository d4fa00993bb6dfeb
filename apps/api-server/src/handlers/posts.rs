//! Post, comment and vote handlers.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use seat_core::domain::{Comment, Post, build_comment_tree};
use seat_shared::ApiResponse;
use seat_shared::dto::{
    CommentRequest, CountResponse, CreatePostRequest, CreatePostResponse, PostDetailResponse,
    PostPageResponse, SearchResponse, UpdatePostRequest, UserEmailRequest, VoteResponse,
};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyPostsQuery {
    pub user_email: String,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SingleQuery {
    pub id: Uuid,
}

fn page_response(page: seat_core::ports::Page<Post>) -> PostPageResponse {
    PostPageResponse {
        posts: page.items,
        has_more: page.has_more,
        total_count: page.total_count,
    }
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.title.is_empty() || req.description.is_empty() || req.user_email.is_empty() {
        return Err(AppError::BadRequest(
            "Title, description, and user email are required".to_string(),
        ));
    }

    let post = Post::new(req.title, req.description, req.user_email);
    let post_id = post.id;
    state.posts.insert(post).await?;

    tracing::debug!(post_id = %post_id, "Post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        CreatePostResponse {
            post_id: post_id.to_string(),
        },
        "Post created successfully",
    )))
}

/// GET /api/posts?page=1
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list(query.page(), query.limit()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page_response(page))))
}

/// GET /api/posts/count
pub async fn count_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let count = state.posts.count().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(CountResponse { count })))
}

/// GET /api/posts/my-posts?userEmail=&page=
pub async fn my_posts(
    state: web::Data<AppState>,
    query: web::Query<MyPostsQuery>,
) -> AppResult<HttpResponse> {
    if query.user_email.is_empty() {
        return Err(AppError::BadRequest("User email is required".to_string()));
    }

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let result = state
        .posts
        .list_by_owner(&query.user_email, page, limit)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(page_response(result))))
}

/// GET /api/posts/search?q=
pub async fn search_posts(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let q = match query.q.as_deref() {
        Some(q) if !q.is_empty() => q,
        _ => return Err(AppError::BadRequest("Search query is required".to_string())),
    };

    let posts = state.posts.search_by_title(q).await?;
    let total_count = posts.len() as u64;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse { posts, total_count })))
}

/// GET /api/posts/single?id=
pub async fn single_post(
    state: web::Data<AppState>,
    query: web::Query<SingleQuery>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(query.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comment_tree = build_comment_tree(&post.comments);

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostDetailResponse { post, comment_tree })))
}

/// GET /api/posts/top-rated?page=1
pub async fn top_rated(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = state.posts.top_rated(query.page(), query.limit()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(page_response(page))))
}

/// POST /api/posts/{id}/upvote
pub async fn toggle_post_vote(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UserEmailRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if req.user_email.is_empty() {
        return Err(AppError::BadRequest("User email is required".to_string()));
    }

    let outcome = state
        .posts
        .toggle_post_vote(post_id, &req.user_email)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let upvoted = outcome.upvoted();
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        VoteResponse { upvoted },
        if upvoted {
            "Post upvoted successfully"
        } else {
            "Post vote removed"
        },
    )))
}

/// POST /api/posts/{post_id}/comments
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if req.user_email.is_empty() || req.text.is_empty() {
        return Err(AppError::BadRequest(
            "User email and text are required".to_string(),
        ));
    }

    let comment = Comment::new(req.user_email, req.text);
    let added = state.posts.add_comment(post_id, comment).await?;

    if !added {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::ok_with_message(
        (),
        "Comment added successfully",
    )))
}

/// POST /api/posts/{post_id}/comments/{comment_id}/upvote
pub async fn toggle_comment_vote(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<UserEmailRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let req = body.into_inner();

    if req.user_email.is_empty() {
        return Err(AppError::BadRequest("User email is required".to_string()));
    }

    let outcome = state
        .posts
        .toggle_comment_vote(post_id, comment_id, &req.user_email)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    let upvoted = outcome.upvoted();
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        VoteResponse { upvoted },
        if upvoted {
            "Comment upvoted successfully"
        } else {
            "Comment vote removed"
        },
    )))
}

/// POST /api/posts/{post_id}/comments/{comment_id}/replies
pub async fn add_reply(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let (post_id, parent_id) = path.into_inner();
    let req = body.into_inner();

    if req.user_email.is_empty() || req.text.is_empty() {
        return Err(AppError::BadRequest(
            "User email and text are required".to_string(),
        ));
    }

    let reply = Comment::reply(parent_id, req.user_email, req.text);
    let added = state.posts.add_reply(post_id, parent_id, reply).await?;

    if !added {
        return Err(AppError::NotFound("Post or comment not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::ok_with_message(
        (),
        "Reply added successfully",
    )))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if req.title.is_empty() || req.description.is_empty() || req.user_email.is_empty() {
        return Err(AppError::BadRequest(
            "Title, description, and user email are required".to_string(),
        ));
    }

    let updated = state
        .posts
        .update_content(post_id, &req.user_email, &req.title, &req.description)
        .await?;

    if !updated {
        return Err(AppError::NotFound(
            "Post not found or you don't have permission to edit".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::ok_with_message(
        (),
        "Post updated successfully",
    )))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UserEmailRequest>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let req = body.into_inner();

    if req.user_email.is_empty() {
        return Err(AppError::BadRequest("User email is required".to_string()));
    }

    let deleted = state.posts.delete(post_id, &req.user_email).await?;

    if !deleted {
        return Err(AppError::NotFound(
            "Post not found or you don't have permission to delete".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::ok_with_message(
        (),
        "Post deleted successfully",
    )))
}
