//! JWT issuance and verification.
//!
//! Tenant and admin tokens are signed with different secrets and carry a
//! `typ` claim, so one can never be replayed as the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, SECONDS_PER_HOUR, TOKEN_AUDIENCE_ADMIN, TOKEN_AUDIENCE_TENANT, TOKEN_TYPE_BEARER,
};
use crate::errors::{AppError, AppResult};
use policy::Role;

/// Claims of a tenant user token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub tenant_id: Uuid,
    pub email: String,
    pub role: Role,
    pub typ: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims of a platform admin token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: Uuid,
    pub email: String,
    pub typ: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Signs and verifies both token families.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Config,
}

impl TokenIssuer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn issue_tenant(&self, user_id: Uuid, tenant_id: Uuid, email: &str, role: Role) -> AppResult<TokenResponse> {
        let (iat, exp) = self.window();
        let claims = Claims {
            sub: user_id,
            tenant_id,
            email: email.to_string(),
            role,
            typ: TOKEN_AUDIENCE_TENANT.to_string(),
            exp,
            iat,
        };
        self.sign(&claims, self.config.jwt_secret_bytes())
    }

    pub fn issue_admin(&self, admin_id: Uuid, email: &str) -> AppResult<TokenResponse> {
        let (iat, exp) = self.window();
        let claims = AdminClaims {
            sub: admin_id,
            email: email.to_string(),
            typ: TOKEN_AUDIENCE_ADMIN.to_string(),
            exp,
            iat,
        };
        self.sign(&claims, self.config.admin_jwt_secret_bytes())
    }

    pub fn verify_tenant(&self, token: &str) -> AppResult<Claims> {
        let claims: Claims = verify(token, self.config.jwt_secret_bytes())?;
        if claims.typ != TOKEN_AUDIENCE_TENANT {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    pub fn verify_admin(&self, token: &str) -> AppResult<AdminClaims> {
        let claims: AdminClaims = verify(token, self.config.admin_jwt_secret_bytes())?;
        if claims.typ != TOKEN_AUDIENCE_ADMIN {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }

    fn window(&self) -> (i64, i64) {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);
        (now.timestamp(), expires_at.timestamp())
    }

    fn sign<T: Serialize>(&self, claims: &T, secret: &[u8]) -> AppResult<TokenResponse> {
        let token = encode(&Header::default(), claims, &EncodingKey::from_secret(secret))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
        })
    }
}

fn verify<T: for<'de> Deserialize<'de>>(token: &str, secret: &[u8]) -> AppResult<T> {
    let data = decode::<T>(token, &DecodingKey::from_secret(secret), &Validation::default())?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(Config::local("sqlite::memory:"))
    }

    #[test]
    fn test_tenant_token_round_trip() {
        let issuer = issuer();
        let (user, tenant) = (Uuid::new_v4(), Uuid::new_v4());
        let token = issuer
            .issue_tenant(user, tenant, "owner@acme.test", Role::Owner)
            .unwrap();

        let claims = issuer.verify_tenant(&token.access_token).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.tenant_id, tenant);
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(token.token_type, "Bearer");
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let issuer = issuer();
        let admin = issuer.issue_admin(Uuid::new_v4(), "ops@bizhub.local").unwrap();
        assert!(issuer.verify_tenant(&admin.access_token).is_err());

        let tenant = issuer
            .issue_tenant(Uuid::new_v4(), Uuid::new_v4(), "a@b.test", Role::Staff)
            .unwrap();
        assert!(issuer.verify_admin(&tenant.access_token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(issuer().verify_tenant("not-a-jwt"), Err(AppError::Jwt(_))));
    }
}
