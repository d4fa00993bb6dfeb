//! Authentication handlers.

use actix_web::{HttpResponse, web};

use seat_core::domain::User;
use seat_core::ports::UserUpdate;
use seat_shared::ApiResponse;
use seat_shared::dto::{LoginRequest, SignupRequest, UpdateProfileRequest, UserResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let password_hash = state.passwords.hash(&req.password)?;
    let user = User::new(req.name, req.email, password_hash, req.profile_image);
    let saved = state.users.insert(user).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        UserResponse::from(saved),
        "User created successfully",
    )))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // A missing user and a bad password produce the same response, so
    // login cannot be used to probe which emails exist.
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = state.passwords.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        UserResponse::from(user),
        "Login successful",
    )))
}

/// PUT /api/auth/update
pub async fn update_profile(
    state: web::Data<AppState>,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.name.is_empty() || req.email.is_empty() {
        return Err(AppError::BadRequest("Name and email are required".to_string()));
    }

    if state
        .users
        .find_by_email(&req.current_email)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if req.email != req.current_email
        && state.users.find_by_email(&req.email).await?.is_some()
    {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let password_hash = match req.password.as_deref() {
        Some(password) if !password.is_empty() => Some(state.passwords.hash(password)?),
        _ => None,
    };

    let updated = state
        .users
        .update(
            &req.current_email,
            UserUpdate {
                name: req.name,
                email: req.email,
                profile_image: req.profile_image,
                password_hash,
            },
        )
        .await?;

    if !updated {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::ok_with_message(
        (),
        "Profile updated successfully",
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};

    use crate::handlers::configure_routes;
    use crate::state::AppState;

    #[actix_web::test]
    async fn duplicate_signup_is_rejected_with_conflict() {
        let state = AppState::new(None).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure_routes),
        )
        .await;

        let body = serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "devils-advocate-9",
        });

        let first = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&body)
            .send_request(&app)
            .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(&body)
            .send_request(&app)
            .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        // The login path still authenticates the original account.
        let login = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({
                "email": "ada@example.com",
                "password": "devils-advocate-9",
            }))
            .send_request(&app)
            .await;
        assert_eq!(login.status(), StatusCode::OK);
    }
}
