use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::EmailConfig,
    error::{AppError, Result},
};

/// Outbound SMTP mail. Every send is fire-and-forget: the message is
/// handed to a background task and failures are logged, never surfaced
/// to the request that triggered them.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| AppError::Internal(format!("Invalid SMTP configuration: {}", e)))?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    pub fn send(&self, to: &str, subject: &str, body: &str) {
        let to_mailbox = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                tracing::warn!("Not sending email, invalid recipient {}: {}", to, e);
                return;
            }
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string());

        match message {
            Ok(message) => {
                let transport = self.transport.clone();
                let recipient = to.to_string();
                tokio::spawn(async move {
                    if let Err(e) = transport.send(message).await {
                        tracing::warn!("Failed to send email to {}: {}", recipient, e);
                    }
                });
            }
            Err(e) => tracing::warn!("Failed to build email to {}: {}", to, e),
        }
    }

    /// New signups get their generated username mailed to them.
    pub fn send_username_email(&self, to: &str, username: &str) {
        self.send(
            to,
            "Your Vidyasetu Username",
            &format!("Your username is: {username}\nPlease keep it safe."),
        );
    }

    /// Welcome mail for accounts an admin created on someone's behalf.
    pub fn send_admin_added_user_email(
        &self,
        to: &str,
        full_name: &str,
        username: &str,
        admin_name: &str,
    ) {
        let body = format!(
            "Hello {full_name},\n\n\
             An account has been created for you on Vidyasetu by our admin, {admin_name}.\n\n\
             Your username is: {username}\n\n\
             You can log in to your account and start learning.\n\n\
             Welcome aboard!\n\n\
             Best regards,\n\
             The Vidyasetu Team"
        );
        self.send(to, "Welcome to Vidyasetu!", &body);
    }
}
