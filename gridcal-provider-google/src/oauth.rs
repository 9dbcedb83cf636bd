//! Browser consent and token refresh for Google accounts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_calendar::Client;
use gridcal_core::{AuthError, Credential, OAuthFlow};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::debug;

use crate::app_config::ClientCredentials;

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

const REDIRECT_PORT: u16 = 8085;

/// Assumed token lifetime when Google doesn't say.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

pub fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    credentials: ClientCredentials,
}

impl GoogleOAuth {
    pub fn new(credentials: ClientCredentials) -> Self {
        GoogleOAuth { credentials }
    }

    fn client(&self, access_token: String, refresh_token: String) -> Client {
        Client::new(
            self.credentials.client_id.clone(),
            self.credentials.client_secret.clone(),
            redirect_uri(),
            access_token,
            refresh_token,
        )
    }

    async fn run_consent(&self) -> Result<Credential> {
        let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();
        let mut client = self.client(String::new(), String::new());

        let auth_url = client.user_consent_url(&scopes);

        eprintln!("\nOpen this URL in your browser to sign in to Google Calendar:\n");
        eprintln!("{}\n", auth_url);

        // Try to open the browser automatically
        if open::that(&auth_url).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        let (code, state) = wait_for_callback().await?;

        debug!("Received authorization code, exchanging for tokens");

        let token = client
            .get_access_token(&code, &state)
            .await
            .context("Failed to exchange authorization code")?;

        Ok(Credential::from_tokens(
            token.access_token,
            token.refresh_token,
            expires_in(token.expires_in),
        ))
    }

    async fn run_refresh(&self, credential: &Credential) -> Result<Credential> {
        let client = self.client(
            credential.access_token.clone(),
            credential.refresh_token.clone(),
        );

        let token = client
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        Ok(Credential::from_tokens(
            token.access_token,
            token.refresh_token,
            expires_in(token.expires_in),
        ))
    }
}

#[async_trait]
impl OAuthFlow for GoogleOAuth {
    async fn consent(&self) -> Result<Credential, AuthError> {
        self.run_consent()
            .await
            .map_err(|e| AuthError::Consent(format!("{:#}", e)))
    }

    async fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        self.run_refresh(credential)
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("{:#}", e)))
    }
}

fn expires_in(seconds: i64) -> i64 {
    if seconds > 0 {
        seconds
    } else {
        DEFAULT_EXPIRES_IN_SECS
    }
}

async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    answer_callback(&listener).await
}

/// Accept one browser redirect on `listener`, reply to it, and return its `code` and `state`.
async fn answer_callback(listener: &TcpListener) -> Result<(String, String)> {
    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    // Drain the headers so closing the socket doesn't reset the connection
    let mut header = String::new();
    loop {
        header.clear();
        let read = reader
            .read_line(&mut header)
            .await
            .context("Failed to read OAuth callback headers")?;
        if read == 0 || header.trim().is_empty() {
            break;
        }
    }

    let parsed = parse_callback(&request_line);

    let body = match &parsed {
        Ok(_) => "<h1>Signed in!</h1><p>You can close this window and return to gridcal.</p>",
        Err(_) => "<h1>Sign-in failed</h1><p>Return to gridcal for details.</p>",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>{}</body></html>",
        body
    );

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    parsed
}

/// Pull `code` and `state` out of a `GET /callback?...` request line.
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    if let Some((_, error)) = url.query_pairs().find(|(k, _)| k == "error") {
        anyhow::bail!("Google returned an error: {}", error);
    }

    let code = url
        .query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No code in callback"))?;

    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.to_string())
        .ok_or_else(|| anyhow::anyhow!("No state in callback"))?;

    Ok((code, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_yields_code_and_state() {
        let (code, state) =
            parse_callback("GET /callback?state=xyz&code=4%2F0Ab&scope=cal HTTP/1.1\r\n").unwrap();
        assert_eq!(code, "4/0Ab");
        assert_eq!(state, "xyz");
    }

    #[test]
    fn denied_consent_is_an_error() {
        let err = parse_callback("GET /callback?error=access_denied&state=xyz HTTP/1.1").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn malformed_request_is_an_error() {
        assert!(parse_callback("").is_err());
        assert!(parse_callback("GET /callback?state=only HTTP/1.1").is_err());
    }

    async fn redirect(listener: &TcpListener, request: &str) -> (Result<(String, String)>, String) {
        let address = listener.local_addr().unwrap();
        let browser = async {
            let mut stream = tokio::net::TcpStream::connect(address).await.unwrap();
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut page = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut page)
                .await
                .unwrap();
            page
        };

        tokio::join!(answer_callback(listener), browser)
    }

    #[tokio::test]
    async fn browser_redirect_is_answered_and_parsed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (parsed, page) = redirect(
            &listener,
            "GET /callback?code=abc&state=xyz HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await;

        assert_eq!(parsed.unwrap(), ("abc".to_string(), "xyz".to_string()));
        assert!(page.starts_with("HTTP/1.1 200 OK"));
        assert!(page.contains("Signed in!"));
    }

    #[tokio::test]
    async fn denied_redirect_still_gets_a_page() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (parsed, page) = redirect(
            &listener,
            "GET /callback?error=access_denied HTTP/1.1\r\n\r\n",
        )
        .await;

        assert!(parsed.is_err());
        assert!(page.contains("Sign-in failed"));
    }

    #[test]
    fn missing_lifetime_gets_default() {
        assert_eq!(expires_in(0), DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(expires_in(1799), 1799);
    }
}
