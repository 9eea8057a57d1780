//! Wire DTOs shared with the canteen backend and the persisted favorites.
//!
//! DESIGN
//! ======
//! Field names mirror the backend's JSON (camelCase plus a few Portuguese
//! Laravel columns such as `ativo`) so persisted favorites written by the
//! browser client load unchanged. Ids arrive as strings or numbers depending
//! on the endpoint; both are normalized to `String`.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend could not be reached or the connection failed mid-request.
    #[error("API request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success HTTP status.
    #[error("API response error: status {status}")]
    Status { status: u16, body: String },

    /// The request URL could not be built, e.g. from an unusable user id.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// The response body did not have the expected shape.
    #[error("malformed API response: {0}")]
    MalformedResponse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// USER
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Aluno,
    Responsavel,
    Admin,
    Cantina,
    Escola,
    #[serde(other)]
    Unknown,
}

/// Signed-in identity. Only `id` drives the session lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "wallet_id", deserialize_with = "deserialize_opt_id")]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    /// Wallet balance in reais.
    #[serde(default)]
    pub balance: f64,
    #[serde(default, alias = "school_id", deserialize_with = "deserialize_opt_id")]
    pub school_id: Option<String>,
    #[serde(default, alias = "canteen_id", deserialize_with = "deserialize_opt_id")]
    pub canteen_id: Option<String>,
    /// Dependants of a guardian account.
    #[serde(default)]
    pub students: Vec<User>,
    #[serde(default, rename = "telefone")]
    pub phone: Option<String>,
    #[serde(default, rename = "data_nascimento")]
    pub birth_date: Option<String>,
    #[serde(default = "default_true", rename = "ativo")]
    pub active: bool,
    #[serde(default, rename = "student_code")]
    pub student_code: Option<String>,
}

fn default_role() -> Role {
    Role::Unknown
}

fn default_true() -> bool {
    true
}

// =============================================================================
// PRODUCT
// =============================================================================

/// Menu section. Names this client does not know are kept verbatim so they
/// survive a load/save cycle of the persisted favorites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Salgado,
    Doce,
    Bebida,
    Almoco,
    Other(String),
}

impl Default for Category {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Salgado" => Self::Salgado,
            "Doce" => Self::Doce,
            "Bebida" => Self::Bebida,
            "Almoço" => Self::Almoco,
            _ => Self::Other(name),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Salgado => "Salgado".to_owned(),
            Category::Doce => "Doce".to_owned(),
            Category::Bebida => "Bebida".to_owned(),
            Category::Almoco => "Almoço".to_owned(),
            Category::Other(name) => name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_hint: String,
    #[serde(default)]
    pub description: String,
}

/// A catalog item as listed and favorited by the front-end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub canteen_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_true", rename = "ativo")]
    pub active: bool,
    #[serde(default)]
    pub image: ProductImage,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub popular: bool,
}

// =============================================================================
// AUTH
// =============================================================================

/// Body of `POST login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub device_name: String,
}

/// Payload of a successful login, after envelope unwrapping.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AuthSuccess {
    pub user: User,
    pub token: String,
}

// =============================================================================
// ID HELPERS
// =============================================================================

fn id_from_value<E: serde::de::Error>(value: serde_json::Value) -> Result<String, E> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!("expected string or number id, got {other}"))),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    id_from_value(value)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    id_from_value(value).map(Some)
}
