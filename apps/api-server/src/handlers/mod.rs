//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/update", web::put().to(auth::update_profile)),
            )
            // Post routes - literal paths registered before `{id}` captures
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("", web::get().to(posts::list_posts))
                    .route("/count", web::get().to(posts::count_posts))
                    .route("/my-posts", web::get().to(posts::my_posts))
                    .route("/search", web::get().to(posts::search_posts))
                    .route("/single", web::get().to(posts::single_post))
                    .route("/top-rated", web::get().to(posts::top_rated))
                    .route("/{id}/upvote", web::post().to(posts::toggle_post_vote))
                    .route("/{post_id}/comments", web::post().to(posts::add_comment))
                    .route(
                        "/{post_id}/comments/{comment_id}/upvote",
                        web::post().to(posts::toggle_comment_vote),
                    )
                    .route(
                        "/{post_id}/comments/{comment_id}/replies",
                        web::post().to(posts::add_reply),
                    )
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    );
}
