use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::roles::Role;

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(
        length(min = 6, max = 20, message = "Password must be 6 to 20 characters long"),
        custom(function = "strong_password")
    )]
    pub password: String,
    /// Role id, defaults to seller.
    #[serde(default = "default_role")]
    pub role: i32,
}

fn default_role() -> i32 {
    Role::Seller.id()
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is missing."))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: i32,
    pub kind: TokenKind,
    pub exp: usize,
}

/// At least one lowercase letter, one uppercase letter, one digit and one symbol.
fn strong_password(password: &str) -> Result<(), ValidationError> {
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    if has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        let mut err = ValidationError::new("weak_password");
        err.message = Some(
            "Password needs an uppercase letter, a lowercase letter, a number and a symbol".into(),
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_strong_password() {
        let weak = RegisterRequest {
            email: "shopper@example.com".into(),
            password: "password".into(),
            role: 3,
        };
        let errors = weak.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let strong = RegisterRequest {
            email: "shopper@example.com".into(),
            password: "Secr3t!x".into(),
            role: 3,
        };
        assert!(strong.validate().is_ok());
    }

    #[test]
    fn register_rejects_bad_email_and_long_password() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            password: "Aa1!Aa1!Aa1!Aa1!Aa1!Aa1!".into(),
            role: 2,
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn role_defaults_to_seller() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"Secr3t!x"}"#).unwrap();
        assert_eq!(req.role, Role::Seller.id());
    }
}
