//! Request-context extractors: caller business unit and operator identity.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Header carrying the caller's business-unit id.
pub const BIZ_ID_HEADER: &str = "X-Biz-Id";

/// Header carrying the operator (login name) acting on the request.
pub const OPERATOR_HEADER: &str = "X-User";

/// Caller's business-unit id from `X-Biz-Id`. None when absent or not a
/// number; 0 conventionally means "no business unit".
#[derive(Clone, Copy, Debug)]
pub struct BizId(pub Option<i64>);

impl BizId {
    /// Id used for default tenant scoping.
    pub fn or_unscoped(self) -> i64 {
        self.0.unwrap_or(0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BizId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(BIZ_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok());
        Ok(BizId(value))
    }
}

/// Operator identity from `X-User`; empty when the gateway did not set it.
#[derive(Clone, Debug)]
pub struct Operator(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for Operator
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(OPERATOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        Ok(Operator(value))
    }
}
