use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::handlers::{LoginRequest, RegisterUserRequest};
use crate::db::models::Sex;
use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Registration fields after validation; the password is still plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub biography: String,
    pub city: String,
    pub password: String,
}

fn required(value: &str, name: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", name)));
    }
    Ok(())
}

pub fn validate_login_request(req: &LoginRequest) -> Result<(), AppError> {
    required(&req.id, "id")?;
    required(&req.password, "password")?;
    Ok(())
}

/// Non-UUID ids can not belong to any user.
pub fn parse_user_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| user_not_found(id))
}

pub fn user_not_found(id: &str) -> AppError {
    AppError::UserNotFound(format!("user with id={} not found", id))
}

/// Accepts exactly `YYYY-MM-DD`: four-digit year, zero-padded month and day, nothing around it.
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, AppError> {
    // chrono's parser tolerates short years, signs, padding and whitespace; the
    // round trip through the formatter rejects all of them.
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == value)
        .ok_or_else(|| AppError::InvalidInput("birth date is invalid, format is YYYY-MM-DD".into()))
}

pub fn validate_register_request(req: &RegisterUserRequest) -> Result<NewUser, AppError> {
    required(&req.first_name, "first name")?;
    required(&req.last_name, "last name")?;

    let birth_date = parse_birth_date(&req.birth_date)?;

    let sex = req
        .sex
        .parse::<Sex>()
        .map_err(|_| AppError::InvalidInput("sex possible values: male, female".into()))?;

    required(&req.biography, "biography")?;
    required(&req.city, "city")?;
    required(&req.password, "password")?;

    Ok(NewUser {
        first_name: req.first_name.clone(),
        last_name: req.last_name.clone(),
        birth_date,
        sex,
        biography: req.biography.clone(),
        city: req.city.clone(),
        password: req.password.clone(),
    })
}
