use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::{Mail, MailCredentials};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid mailbox address '{address}': {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },
    #[error("failed to assemble report email: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("SMTP relay {0} did not accept the connection check")]
    Unreachable(String),
}

/// Transport confirmation for a delivered report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub positive: bool,
    pub detail: String,
}

/// Seam between the pipeline and the mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        document: &[u8],
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

/// Report delivery over an authenticated SMTP relay.
///
/// Recipients, attachment name, and credentials are fixed at construction
/// from configuration; an invalid address fails construction rather than the
/// send.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    from: Mailbox,
    recipients: Vec<Mailbox>,
    attachment_name: String,
}

impl SmtpMailer {
    pub fn new(
        mail: &Mail,
        attachment_name: &str,
        creds: &MailCredentials,
    ) -> Result<Self, DeliveryError> {
        let from = parse_mailbox(&creds.user)?;
        let recipients = mail
            .effective_recipients()
            .iter()
            .map(|addr| parse_mailbox(addr))
            .collect::<Result<Vec<_>, _>>()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&mail.smtp_host)?
            .credentials(SmtpCredentials::new(creds.user.clone(), creds.pass.clone()))
            .build();
        Ok(Self {
            transport,
            host: mail.smtp_host.clone(),
            from,
            recipients,
            attachment_name: attachment_name.to_string(),
        })
    }

    fn build_message(
        &self,
        document: &[u8],
        subject: &str,
        body: &str,
    ) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder().from(self.from.clone()).subject(subject);
        for to in &self.recipients {
            builder = builder.to(to.clone());
        }
        let attachment = Attachment::new(self.attachment_name.clone()).body(
            document.to_vec(),
            ContentType::parse("application/pdf").expect("valid pdf media type"),
        );
        let text = SinglePart::builder()
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string());
        let message =
            builder.multipart(MultiPart::mixed().singlepart(text).singlepart(attachment))?;
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        document: &[u8],
        subject: &str,
        body: &str,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        // Probe first so connectivity and auth problems surface as a clear
        // diagnostic instead of a failure buried inside the send.
        match self.transport.test_connection().await {
            Ok(true) => {}
            Ok(false) => return Err(DeliveryError::Unreachable(self.host.clone())),
            Err(err) => return Err(DeliveryError::Transport(err)),
        }

        let message = self.build_message(document, subject, body)?;
        let response = self.transport.send(message).await?;
        let receipt = DeliveryReceipt {
            positive: response.is_positive(),
            detail: response.message().collect::<Vec<_>>().join(" "),
        };
        info!(
            recipients = self.recipients.len(),
            detail = %receipt.detail,
            "report email accepted by relay"
        );
        Ok(receipt)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address.parse().map_err(|source| DeliveryError::Address {
        address: address.to_string(),
        source,
    })
}
