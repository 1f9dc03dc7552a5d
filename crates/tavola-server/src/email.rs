//! Outbound email: verification codes and password-reset codes.
//!
//! Email delivery is a best-effort side channel — callers log failures and
//! keep going. Without an SMTP host configured the mailer runs in disabled
//! mode and logs the message instead, which is what the test setup uses.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use tavola_core::{TvError, TvResult};

use crate::config::SmtpConfig;

pub struct Mailer {
    from: Mailbox,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> TvResult<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|err| TvError::Validation(format!("invalid smtp from address: {err}")))?;

        let transport = match config.host.as_deref() {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|err| TvError::Email(format!("invalid SMTP relay host {host}: {err}")))?
                    .port(config.port);
                if let (Some(username), Some(password)) =
                    (config.username.clone(), config.password.clone())
                {
                    builder = builder.credentials(SmtpCredentials::new(username, password));
                }
                Some(builder.build())
            }
            None => {
                tracing::info!("SMTP host not configured, outbound email disabled");
                None
            }
        };

        Ok(Self { from, transport })
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> TvResult<()> {
        let transport = match &self.transport {
            Some(transport) => transport,
            None => {
                tracing::info!(to, subject, "email delivery disabled, message dropped");
                return Ok(());
            }
        };

        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|err| TvError::Validation(format!("invalid email recipient: {err}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to_mailbox)
            .subject(subject)
            .body(body.to_string())
            .map_err(|err| TvError::Email(format!("failed building SMTP message: {err}")))?;

        transport
            .send(email)
            .await
            .map_err(|err| TvError::Email(format!("SMTP send failed: {err}")))?;

        Ok(())
    }

    pub async fn send_verification_code(&self, to: &str, code: &str) -> TvResult<()> {
        self.send(
            to,
            "Your Tavola verification code",
            &format!("Your verification code is {code}. It expires in 10 minutes."),
        )
        .await
    }

    pub async fn send_reset_code(&self, to: &str, code: &str) -> TvResult<()> {
        self.send(
            to,
            "Your Tavola password reset code",
            &format!("Your password reset code is {code}. It expires in 10 minutes."),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn disabled_mailer_swallows_sends() {
        let mailer = Mailer::from_config(&Config::default().smtp).unwrap();
        mailer
            .send_verification_code("guest@example.com", "123456")
            .await
            .unwrap();
    }

    #[test]
    fn invalid_from_address_is_rejected() {
        let mut smtp = Config::default().smtp;
        smtp.from = "not an address".into();
        assert!(Mailer::from_config(&smtp).is_err());
    }
}
