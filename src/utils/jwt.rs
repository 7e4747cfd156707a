use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型: "access" 或 "refresh"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

impl Claims {
    /// 解析 subject 中的用户 ID
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse::<i64>().ok()
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    // 使用指定密钥签发 Token（令牌由认证服务签发，这里主要用于测试与运维工具）
    pub fn generate_token_with_secret(
        secret: &str,
        user_id: i64,
        role: &str,
        token_type: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: token_type.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        encode(&Header::default(), &claims, &encoding_key)
    }

    // 使用指定密钥验证 token 并检查类型
    pub fn verify_token_with_secret(
        secret: &str,
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map(|token_data| token_data.claims)?;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_with_secret(&Self::get_secret(), token, "access")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_access_token_roundtrip() {
        let token = JwtUtils::generate_token_with_secret(
            SECRET,
            42,
            "instructor",
            "access",
            chrono::Duration::minutes(5),
        )
        .unwrap();
        let claims = JwtUtils::verify_token_with_secret(SECRET, &token, "access").unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role, "instructor");
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let token = JwtUtils::generate_token_with_secret(
            SECRET,
            42,
            "student",
            "refresh",
            chrono::Duration::minutes(5),
        )
        .unwrap();
        assert!(JwtUtils::verify_token_with_secret(SECRET, &token, "access").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtUtils::generate_token_with_secret(
            SECRET,
            1,
            "admin",
            "access",
            chrono::Duration::minutes(5),
        )
        .unwrap();
        assert!(JwtUtils::verify_token_with_secret("other", &token, "access").is_err());
    }
}
