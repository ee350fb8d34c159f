//! Confirmation requests delivered as signed links.

use async_trait::async_trait;
use authkit_apptoken::TokenSettings;
use authkit_core::{BoxError, Confirmer, StoreError, StoreResult, UserStore};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers confirmation messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), BoxError>;
}

/// Writes messages to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), BoxError> {
        info!(to = %message.to, subject = %message.subject, "{}", message.body);
        Ok(())
    }
}

/// [`Confirmer`] that mails links carrying an email token.
///
/// The token embeds the current password hash of the user, so a link stops working
/// once the password changes.
pub struct LinkConfirmer {
    tokens: TokenSettings,
    link_lifespan: Duration,
    base_url: Url,
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
}

impl LinkConfirmer {
    pub fn new(
        tokens: TokenSettings,
        link_lifespan: Duration,
        base_url: Url,
        users: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            tokens,
            link_lifespan,
            base_url,
            users,
            mailer,
        }
    }

    fn link(&self, path: &str, token: &str) -> StoreResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| StoreError::RequestConfirmation(e.into()))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    async fn deliver(
        &self,
        login: &str,
        email: &str,
        password_hash: &str,
        path: &str,
        subject: &str,
        greeting: String,
    ) -> StoreResult<()> {
        let token = self
            .tokens
            .new_email_token(login, email, password_hash, self.link_lifespan)
            .map_err(|e| StoreError::RequestConfirmation(e.into()))?;
        let link = self.link(path, &token)?;

        let message = MailMessage {
            to: email.to_string(),
            subject: subject.to_string(),
            body: format!("{greeting}\n\n{link}\n"),
        };
        self.mailer
            .send(&message)
            .await
            .map_err(StoreError::RequestConfirmation)?;
        debug!("Sent '{}' to {} for {}", subject, email, login);
        Ok(())
    }
}

fn addressee(name: &str, login: &str) -> String {
    if name.is_empty() {
        login.to_string()
    } else {
        name.to_string()
    }
}

#[async_trait]
impl Confirmer for LinkConfirmer {
    async fn request_email_confirmation(
        &self,
        login: &str,
        email: &str,
        name: &str,
    ) -> StoreResult<()> {
        let user = self.users.user(login).await?;
        self.deliver(
            login,
            email,
            &user.password_hash,
            "confirm-email",
            "Confirm your email address",
            format!(
                "Hello {}, please follow the link below to confirm your email address.",
                addressee(name, login)
            ),
        )
        .await
    }

    async fn request_password_change_confirmation(
        &self,
        login: &str,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<()> {
        self.deliver(
            login,
            email,
            password_hash,
            "change-password",
            "Change your password",
            format!(
                "Hello {}, follow the link below to choose a new password.",
                addressee(name, login)
            ),
        )
        .await
    }
}
