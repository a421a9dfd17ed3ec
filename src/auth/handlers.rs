use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::validation::DATE_FORMAT;
use crate::db::models::{Sex, User};
use crate::error::AppError;
use crate::AppState;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_USER_PATH: &str = "/user/register";
pub const GET_USER_PATH: &str = "/user/get/{id}";

// Missing fields decode as empty strings so validation can name them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub sex: String,
    pub biography: String,
    pub city: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserIdResponse {
    pub user_id: String,
}

/// Public profile; the password hash is never part of it.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub sex: Sex,
    pub biography: String,
    pub city: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date.format(DATE_FORMAT).to_string(),
            sex: user.sex,
            biography: user.biography,
            city: user.city,
        }
    }
}

/// Undecodable JSON bodies are reported as invalid input.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route(LOGIN_PATH, web::post().to(login))
        .route(REGISTER_USER_PATH, web::post().to(register_user))
        .route(GET_USER_PATH, web::get().to(get_user));
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let token = state.auth_service.login(&req).await?;
    info!("Login successful for user {}", req.id);
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

pub async fn register_user(
    req: web::Json<RegisterUserRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = state.auth_service.register(&req).await?;
    Ok(HttpResponse::Ok().json(UserIdResponse {
        user_id: user_id.to_string(),
    }))
}

pub async fn get_user(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.get_user(&path).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn user_response_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            sex: Sex::Female,
            biography: "bio".into(),
            city: "NYC".into(),
            password_hash: "$argon2id$secret".into(),
        };
        let id = user.id.to_string();

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["id"], id);
        assert_eq!(json["birth_date"], "1990-01-01");
        assert_eq!(json["sex"], "female");
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn missing_request_fields_decode_as_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(req.id, "abc");
        assert!(req.password.is_empty());
    }
}
