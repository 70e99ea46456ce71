use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::model::{AuthenticatedUser, Claims};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;

/// Verifies HS256 bearer tokens signed with the configured secret
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();
        validation.validate_nbf = true;

        // iss/aud are only compared when present, so configured ones must be required
        let mut required = vec!["exp"];
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Unauthorized(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Unauthorized(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{issue_token, test_auth_config, TEST_JWT_SECRET};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::Duration;

    #[test]
    fn test_accepts_valid_staff_token() {
        let validator = JwtValidator::new(&test_auth_config());
        let token = issue_token("7", true, &[]);

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.sub, "7");
        assert!(user.is_staff_member());
    }

    #[test]
    fn test_rejects_token_signed_with_other_secret() {
        let validator = JwtValidator::new(&test_auth_config());
        let claims = Claims {
            sub: "7".to_string(),
            exp: chrono::Utc::now().timestamp() as u64 + 3600,
            iss: None,
            username: None,
            is_staff: true,
            roles: vec![],
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_rejects_expired_token() {
        let mut config = test_auth_config();
        config.jwt_leeway = Duration::from_secs(0);
        let validator = JwtValidator::new(&config);

        let claims = Claims {
            sub: "7".to_string(),
            exp: chrono::Utc::now().timestamp() as u64 - 120,
            iss: None,
            username: None,
            is_staff: true,
            roles: vec![],
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap();

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_checks_issuer_when_configured() {
        let mut config = test_auth_config();
        config.issuer = Some("https://auth.example.com".to_string());
        let validator = JwtValidator::new(&config);

        // Token without iss
        let token = issue_token("7", true, &[]);
        assert!(validator.validate_token(&token).is_err());

        let claims = Claims {
            sub: "7".to_string(),
            exp: chrono::Utc::now().timestamp() as u64 + 3600,
            iss: Some("https://auth.example.com".to_string()),
            username: None,
            is_staff: true,
            roles: vec![],
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap();
        assert!(validator.validate_token(&token).is_ok());

        let claims = Claims {
            iss: Some("https://evil.example.com".to_string()),
            ..claims
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap();
        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_requires_audience_when_configured() {
        let mut config = test_auth_config();
        config.audience = Some("showroom".to_string());
        let validator = JwtValidator::new(&config);

        // Token without aud
        let token = issue_token("7", true, &[]);
        assert!(validator.validate_token(&token).is_err());

        let claims = serde_json::json!({
            "sub": "7",
            "exp": chrono::Utc::now().timestamp() + 3600,
            "aud": "showroom",
            "is_staff": true,
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        )
        .unwrap();
        assert!(validator.validate_token(&token).is_ok());
    }

    #[test]
    fn test_rejects_garbage() {
        let validator = JwtValidator::new(&test_auth_config());
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}
