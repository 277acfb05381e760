use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
    pub admin: bool,
}

/// Authenticated request identity, produced by the bearer-token extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);
