use std::sync::Arc;

use chrono::Local;

use crate::config::Config;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderId, OrderReceipt, OrderSubmission};
use crate::domain::order_email::{render_order_email, ORDER_EMAIL_SUBJECT};
use crate::domain::ports::{MailDispatcher, OutgoingMail};

pub struct OrderService {
    admin_email: String,
    escape_html: bool,
    /// `None` runs the pipeline in dry-run mode: nothing is sent.
    mailer: Option<Arc<dyn MailDispatcher>>,
}

impl OrderService {
    pub fn new(config: &Config, mailer: Option<Arc<dyn MailDispatcher>>) -> Self {
        Self {
            admin_email: config.admin_email.clone(),
            escape_html: config.escape_html,
            mailer,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.mailer.is_none()
    }

    /// Render the order and relay it to the administrator.
    ///
    /// Any dispatcher failure fails the whole submission; nothing is retried.
    pub async fn submit(&self, order: OrderSubmission) -> Result<OrderReceipt, DomainError> {
        let html_body = render_order_email(&order, &Local::now().naive_local(), self.escape_html);

        let mail_sent = match &self.mailer {
            Some(mailer) => {
                let mail = OutgoingMail {
                    to: self.admin_email.clone(),
                    subject: ORDER_EMAIL_SUBJECT.to_string(),
                    html_body,
                };
                mailer.send(&mail).await?;
                true
            }
            None => false,
        };

        let order_id = OrderId::at(&Local::now().naive_local());
        log::info!(
            "Accepted order {} with {} item(s), mail {}",
            order_id,
            order.items().len(),
            if mail_sent { "sent" } else { "skipped (dry run)" }
        );

        Ok(OrderReceipt {
            order_id,
            mail_sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpSettings;
    use crate::domain::order::{Amount, LineItem};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl MailDispatcher for RecordingMailer {
        async fn send(&self, mail: &OutgoingMail) -> Result<(), DomainError> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl MailDispatcher for FailingMailer {
        async fn send(&self, _mail: &OutgoingMail) -> Result<(), DomainError> {
            Err(DomainError::MailTransport("535 authentication failed".to_string()))
        }
    }

    fn config() -> Config {
        Config {
            admin_email: "admin@shop.ru".to_string(),
            smtp: SmtpSettings {
                host: "smtp.example.com".to_string(),
                port: 587,
                user: String::new(),
                password: String::new(),
            },
            escape_html: false,
        }
    }

    fn order() -> OrderSubmission {
        OrderSubmission::new(
            "Ivan".to_string(),
            "ivan@x.ru".to_string(),
            "+7900".to_string(),
            String::new(),
            vec![LineItem {
                name: "Magnet".to_string(),
                quantity: Amount::from(2),
                price: Amount::from(150),
                total: Amount::from(300),
            }],
            Amount::from(300),
        )
        .unwrap()
    }

    fn assert_order_id_shape(id: &OrderId) {
        let stamp = id.as_str().strip_prefix("ORD-").unwrap();
        let (date, time) = stamp.split_once('-').unwrap();
        assert_eq!(date.len(), 8);
        assert_eq!(time.len(), 6);
        assert!(date.chars().chain(time.chars()).all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn dry_run_accepts_without_sending() {
        let service = OrderService::new(&config(), None);
        assert!(service.is_dry_run());

        let receipt = service.submit(order()).await.unwrap();
        assert!(!receipt.mail_sent);
        assert_order_id_shape(&receipt.order_id);
    }

    #[tokio::test]
    async fn sends_rendered_order_to_admin() {
        let mailer = Arc::new(RecordingMailer::default());
        let service =
            OrderService::new(&config(), Some(mailer.clone() as Arc<dyn MailDispatcher>));

        let receipt = service.submit(order()).await.unwrap();
        assert!(receipt.mail_sent);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@shop.ru");
        assert_eq!(sent[0].subject, ORDER_EMAIL_SUBJECT);
        assert!(sent[0].html_body.contains(">Magnet</td>"));
        assert!(sent[0].html_body.contains("Итого: 300 ₽"));
    }

    #[tokio::test]
    async fn dispatcher_failure_fails_the_submission() {
        let service = OrderService::new(
            &config(),
            Some(Arc::new(FailingMailer) as Arc<dyn MailDispatcher>),
        );

        let err = service.submit(order()).await.unwrap_err();
        assert!(
            matches!(err, DomainError::MailTransport(ref msg) if msg == "535 authentication failed")
        );
    }
}
