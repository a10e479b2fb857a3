use std::time::Duration;

use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const CONFIRMATION_SUBJECT: &str = "Referral Confirmation";

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to exchange the refresh token for an access token")]
    TokenExchange(#[from] reqwest::Error),
    #[error("invalid email address")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build the email message")]
    Message(#[from] lettre::error::Error),
    #[error("smtp relay rejected the email")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Long-lived OAuth2 client credentials used to mint access tokens.
#[derive(Debug)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub refresh_token: SecretString,
}

#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct AccessTokenResponse {
    access_token: SecretString,
}

#[derive(Debug)]
pub struct EmailClient {
    http_client: reqwest::Client,
    token_url: String,
    smtp_host: String,
    smtp_port: u16,
    sender: String,
    credentials: OAuthCredentials,
    timeout: Duration,
}

impl EmailClient {
    pub fn new(
        token_url: String,
        smtp_host: String,
        smtp_port: u16,
        sender: String,
        credentials: OAuthCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("failed to build email client"),
            token_url,
            smtp_host,
            smtp_port,
            sender,
            credentials,
            timeout,
        }
    }

    #[tracing::instrument(name = "exchange refresh token for an access token", skip_all)]
    pub async fn access_token(&self) -> Result<SecretString, reqwest::Error> {
        let request_body = RefreshTokenRequest {
            client_id: &self.credentials.client_id,
            client_secret: self.credentials.client_secret.expose_secret(),
            refresh_token: self.credentials.refresh_token.expose_secret(),
            grant_type: "refresh_token",
        };
        let response: AccessTokenResponse = self
            .http_client
            .post(&self.token_url)
            .form(&request_body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.access_token)
    }

    pub fn referral_confirmation(&self, name: &str, recipient: &str) -> Result<Message, MailError> {
        let message = Message::builder()
            .from(self.sender.parse::<Mailbox>()?)
            .to(recipient.parse::<Mailbox>()?)
            .subject(CONFIRMATION_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(confirmation_text(name))?;

        Ok(message)
    }

    /// One token exchange and one send attempt, never retried.
    #[tracing::instrument(
        name = "send referral confirmation email",
        skip_all,
        fields(recipient = %recipient)
    )]
    pub async fn send_referral_confirmation(
        &self,
        name: &str,
        recipient: &str,
    ) -> Result<(), MailError> {
        let message = self.referral_confirmation(name, recipient)?;
        let access_token = self.access_token().await?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.smtp_host)?
            .port(self.smtp_port)
            .credentials(Credentials::new(
                self.sender.clone(),
                access_token.expose_secret().to_owned(),
            ))
            .authentication(vec![Mechanism::Xoauth2])
            .timeout(Some(self.timeout))
            .build();

        let response = transport.send(message).await?;
        tracing::info!(code = %response.code(), "referral email sent successfully");

        Ok(())
    }
}

fn confirmation_text(name: &str) -> String {
    format!(
        "Hi {name},\n\nThank you for submitting a referral! We will process it shortly.\n\nBest regards,\nReferral Team"
    )
}
