// Transactional email delivery via the Brevo v3 SMTP API.
// https://developers.brevo.com/reference/sendtransacemail

pub mod models;

use reqwest::{header, Client};

use crate::models::{EmailAddress, SendEmailBody, SendEmailResponse};

#[derive(Debug, Clone)]
pub struct MailerOptions {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MailerService {
    options: MailerOptions,
}

impl MailerService {
    pub fn new(options: MailerOptions) -> Self {
        Self { options }
    }

    /// Send a single transactional email.
    ///
    /// At least one of `html` / `text` should be provided; Brevo rejects
    /// bodies with neither.
    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        html: Option<String>,
        text: Option<String>,
    ) -> Result<SendEmailResponse, &'static str> {
        let url = "https://api.brevo.com/v3/smtp/email";

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            self.options
                .api_key
                .parse()
                .map_err(|_| "API key is not a valid header value")?,
        );
        headers.insert(
            "Content-Type",
            "application/json"
                .parse()
                .expect("Header value should parse correctly"),
        );
        headers.insert(
            "Accept",
            "application/json"
                .parse()
                .expect("Header value should parse correctly"),
        );

        let body = SendEmailBody {
            sender: EmailAddress {
                email: self.options.sender_email.clone(),
                name: self.options.sender_name.clone(),
            },
            to: vec![EmailAddress {
                email: recipient.to_string(),
                name: None,
            }],
            subject: subject.to_string(),
            html_content: html,
            text_content: text,
        };

        let client = Client::new();
        let res = client.post(url).headers(headers).json(&body).send().await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Brevo error ({}): {}", status, error_body);
                    return Err("Brevo returned an error");
                }

                match response.json::<SendEmailResponse>().await {
                    Ok(data) => Ok(data),
                    Err(e) => {
                        eprintln!("Failed to parse Brevo response: {}", e);
                        Err("Error parsing send response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to Brevo failed: {}", e);
                Err("Error sending email")
            }
        }
    }
}
