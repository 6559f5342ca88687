//! OAuth2 helpers: the browser authorization URL and the code exchange.

use presence_common::RpcError;
use serde::Deserialize;
use tracing::debug;

pub const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
pub const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

/// URL a user opens to grant the application its scopes.
pub fn authorization_url(client_id: &str, redirect_uri: &str, scopes: &[String]) -> String {
    format!(
        "{AUTHORIZE_URL}?client_id={client_id}&response_type=code&redirect_uri={}&scope={}",
        urlencoding::encode(redirect_uri),
        scopes.join("%20"),
    )
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Trade an authorization code for an access token.
pub async fn exchange_code(
    http: &reqwest::Client,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<String, RpcError> {
    let form = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", redirect_uri),
    ];

    let response = http
        .post(TOKEN_URL)
        .form(&form)
        .send()
        .await
        .map_err(|e| RpcError::Authorization(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RpcError::Authorization(format!(
            "token exchange returned {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| RpcError::Authorization(format!("malformed token response: {e}")))?;

    debug!("Exchanged authorization code for access token");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_encodes_redirect_and_joins_scopes() {
        let url = authorization_url(
            "1323427133393076315",
            "https://fisidi-discord-rpc.vercel.app/callback",
            &["rpc".to_string(), "activities.write".to_string()],
        );
        assert_eq!(
            url,
            "https://discord.com/oauth2/authorize?client_id=1323427133393076315\
             &response_type=code\
             &redirect_uri=https%3A%2F%2Ffisidi-discord-rpc.vercel.app%2Fcallback\
             &scope=rpc%20activities.write"
        );
    }

    #[test]
    fn authorization_url_without_scopes() {
        let url = authorization_url("1", "http://localhost", &[]);
        assert!(url.ends_with("&scope="));
    }
}
