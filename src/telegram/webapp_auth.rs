use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::HashMap;
use thiserror::Error;

use crate::core::config::init_data::MAX_AGE_SECS;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum InitDataError {
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    #[error("Invalid hash - data may be tampered")]
    InvalidHash,

    #[error("Init data is too old ({0} seconds)")]
    Expired(i64),

    #[error("Failed to parse user JSON: {0}")]
    InvalidUser(#[from] serde_json::Error),

    #[error("Invalid HMAC key")]
    InvalidKey,
}

/// The `user` object Telegram passes to a Mini App.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl WebAppUser {
    /// Account document id (the numeric id, string-encoded)
    pub fn account_id(&self) -> String {
        self.id.to_string()
    }
}

/// Parses the query-string form into decoded key/value pairs.
fn parse_params(init_data: &str) -> HashMap<String, String> {
    init_data
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) => {
                    let decoded_value = urlencoding::decode(value).ok()?;
                    Some((key.to_string(), decoded_value.to_string()))
                }
                _ => None,
            }
        })
        .collect()
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, InitDataError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| InitDataError::InvalidKey)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Hash Telegram would put into `hash` for these params.
fn expected_hash(params: &HashMap<String, String>, bot_token: &str) -> Result<String, InitDataError> {
    // data_check_string: every field except hash, sorted by key, joined by \n
    let mut check_pairs: Vec<String> = params
        .iter()
        .filter(|(key, _)| key.as_str() != "hash")
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    check_pairs.sort();
    let data_check_string = check_pairs.join("\n");

    // secret_key = HMAC_SHA256(key = "WebAppData", data = bot_token)
    let secret_key = hmac_sha256(b"WebAppData", bot_token.as_bytes())?;
    let hash = hmac_sha256(&secret_key, data_check_string.as_bytes())?;
    Ok(hex::encode(hash))
}

fn user_from_params(params: &HashMap<String, String>) -> Result<WebAppUser, InitDataError> {
    let user_json = params.get("user").ok_or(InitDataError::MissingParameter("user"))?;
    Ok(serde_json::from_str(user_json)?)
}

/// Validates Telegram Mini App init data and returns the signed user.
///
/// Telegram signs the data with HMAC-SHA256 using a key derived from the bot
/// token. `auth_date` older than 24 hours is rejected.
///
/// # Arguments
/// * `init_data` - Query-string formatted parameters from `Telegram.WebApp.initData`
/// * `bot_token` - Bot token
/// * `now` - Current unix time in seconds
pub fn validate_init_data(init_data: &str, bot_token: &str, now: i64) -> Result<WebAppUser, InitDataError> {
    let params = parse_params(init_data);

    let received_hash = params.get("hash").ok_or(InitDataError::MissingParameter("hash"))?;
    let calculated_hash = expected_hash(&params, bot_token)?;
    if calculated_hash != *received_hash {
        return Err(InitDataError::InvalidHash);
    }

    if let Some(auth_date) = params.get("auth_date").and_then(|raw| raw.parse::<i64>().ok()) {
        let age_seconds = now - auth_date;
        if age_seconds > MAX_AGE_SECS {
            return Err(InitDataError::Expired(age_seconds));
        }
    }

    user_from_params(&params)
}

/// Extracts the user from init data WITHOUT checking the signature.
///
/// Only for development setups where validation is switched off.
pub fn extract_user_unverified(init_data: &str) -> Result<WebAppUser, InitDataError> {
    user_from_params(&parse_params(init_data))
}

/// Builds signed init data. Used by tests and the terminal host to fake a launch.
pub fn sign_init_data(user: &WebAppUser, auth_date: i64, bot_token: &str) -> Result<String, InitDataError> {
    let user_json = serde_json::to_string(user)?;
    let mut params = HashMap::new();
    params.insert("auth_date".to_string(), auth_date.to_string());
    params.insert("user".to_string(), user_json.clone());
    let hash = expected_hash(&params, bot_token)?;

    Ok(format!(
        "auth_date={}&user={}&hash={}",
        auth_date,
        urlencoding::encode(&user_json),
        hash
    ))
}
