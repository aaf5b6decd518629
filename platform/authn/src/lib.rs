//! OIDC authentication: discovery, authorization redirects and code exchange.
//!
//! Authentication stays delegated to the configured identity providers; this
//! crate only hands back a verified email/profile, which the caller maps to a
//! local user record and session.

use std::collections::HashMap;

use openidconnect::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl, Nonce, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest::async_http_client,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("invalid provider configuration for {id}: {detail}")]
    InvalidConfig { id: String, detail: String },
    #[error("provider discovery failed for {id}: {detail}")]
    Discovery { id: String, detail: String },
    #[error("token exchange failed: {0}")]
    Exchange(String),
    #[error("identity token rejected: {0}")]
    IdToken(String),
    #[error("identity has no email claim")]
    MissingEmail,
}

/// Static settings for one identity provider, usually parsed from env.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub id: String,
    pub issuer: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

/// Verified identity returned by a completed code exchange.
#[derive(Clone, Debug)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Per-login state carried in a short-lived cookie between the redirect to
/// the provider and the callback: CSRF token, nonce and PKCE verifier.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TempLoginState {
    pub provider: String,
    pub csrf: String,
    nonce: String,
    pkce_verifier: String,
}

impl TempLoginState {
    pub fn verifier(&self) -> PkceCodeVerifier {
        PkceCodeVerifier::new(self.pkce_verifier.clone())
    }

    pub fn nonce(&self) -> Nonce {
        Nonce::new(self.nonce.clone())
    }
}

pub struct Provider {
    pub id: String,
    client: CoreClient,
}

impl Provider {
    pub async fn discover(config: &ProviderConfig) -> Result<Self, AuthnError> {
        let issuer = IssuerUrl::new(config.issuer.clone()).map_err(|err| {
            AuthnError::InvalidConfig {
                id: config.id.clone(),
                detail: err.to_string(),
            }
        })?;
        let redirect = RedirectUrl::new(config.redirect_url.clone()).map_err(|err| {
            AuthnError::InvalidConfig {
                id: config.id.clone(),
                detail: err.to_string(),
            }
        })?;
        let metadata = CoreProviderMetadata::discover_async(issuer, async_http_client)
            .await
            .map_err(|err| AuthnError::Discovery {
                id: config.id.clone(),
                detail: err.to_string(),
            })?;
        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
        )
        .set_redirect_uri(redirect);
        info!(provider = %config.id, "OIDC provider discovered");
        Ok(Self {
            id: config.id.clone(),
            client,
        })
    }

    /// Build the authorization redirect and the state to stash client-side.
    pub fn authorize(&self) -> (String, TempLoginState) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf, nonce) = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .add_scope(Scope::new("email".to_string()))
            .add_scope(Scope::new("profile".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();
        let state = TempLoginState {
            provider: self.id.clone(),
            csrf: csrf.secret().clone(),
            nonce: nonce.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };
        (auth_url.to_string(), state)
    }

    /// Exchange the callback code, verify the id token against the saved
    /// nonce, and pull the identity claims out.
    pub async fn exchange(
        &self,
        code: AuthorizationCode,
        pkce_verifier: PkceCodeVerifier,
        nonce: Nonce,
    ) -> Result<UserInfo, AuthnError> {
        let token_response = self
            .client
            .exchange_code(code)
            .set_pkce_verifier(pkce_verifier)
            .request_async(async_http_client)
            .await
            .map_err(|err| AuthnError::Exchange(err.to_string()))?;
        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthnError::IdToken("provider returned no id token".into()))?;
        let claims = id_token
            .claims(&self.client.id_token_verifier(), &nonce)
            .map_err(|err| AuthnError::IdToken(err.to_string()))?;

        let email = claims
            .email()
            .map(|email| email.as_str().to_owned())
            .ok_or(AuthnError::MissingEmail)?;
        let name = claims
            .name()
            .and_then(|localized| localized.get(None))
            .map(|name| name.as_str().to_owned());
        let avatar_url = claims
            .picture()
            .and_then(|localized| localized.get(None))
            .map(|url| url.as_str().to_owned());
        Ok(UserInfo {
            email,
            name,
            avatar_url,
        })
    }
}

/// All configured providers, discovered once at startup.
#[derive(Default)]
pub struct AuthRegistry {
    providers: HashMap<String, Provider>,
}

impl AuthRegistry {
    pub async fn from_config(
        configs: &HashMap<String, ProviderConfig>,
    ) -> Result<Self, AuthnError> {
        let mut providers = HashMap::new();
        for (id, config) in configs {
            providers.insert(id.clone(), Provider::discover(config).await?);
        }
        Ok(Self { providers })
    }

    pub fn get(&self, id: &str) -> Option<&Provider> {
        self.providers.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_state_round_trips_through_json() {
        let state = TempLoginState {
            provider: "example".into(),
            csrf: "csrf-token".into(),
            nonce: "nonce-value".into(),
            pkce_verifier: "verifier".into(),
        };
        let encoded = serde_json::to_string(&state).unwrap();
        let decoded: TempLoginState = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.provider, "example");
        assert_eq!(decoded.csrf, "csrf-token");
        assert_eq!(decoded.nonce().secret(), "nonce-value");
        assert_eq!(decoded.verifier().secret(), "verifier");
    }
}
