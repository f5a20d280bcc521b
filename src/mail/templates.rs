use anyhow::Result;
use tera::{Context, Tera};

use crate::mail::OutgoingEmail;
use crate::web::models::Inquiry;

const INQUIRY: &str = include_str!("templates/inquiry.txt");
const CONFIRMATION: &str = include_str!("templates/confirmation.txt");

const PLACEHOLDER: &str = "—";

pub const CONFIRMATION_SUBJECT: &str = "We received your project inquiry";

/// Plain-text email bodies, compiled into the binary.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("inquiry.txt", INQUIRY),
            ("confirmation.txt", CONFIRMATION),
        ])?;
        Ok(Self { tera })
    }

    /// The notification sent to the agency; replies go to the submitter.
    pub fn inquiry_email(&self, inquiry: &Inquiry, from: &str, to: &str) -> Result<OutgoingEmail> {
        let mut context = Context::new();
        context.insert("name", &inquiry.name);
        context.insert("business", or_placeholder(&inquiry.business));
        context.insert("email", &inquiry.email);
        context.insert("project_type", or_placeholder(&inquiry.project_type));
        context.insert("budget", or_placeholder(&inquiry.budget));
        context.insert("existing_site", inquiry.existing_site.as_deref().unwrap_or(""));
        context.insert("details", &inquiry.details);

        Ok(OutgoingEmail {
            from: from.to_string(),
            to: to.to_string(),
            subject: inquiry_subject(inquiry),
            text: self.render("inquiry.txt", &context)?,
            reply_to: Some(inquiry.email.clone()),
        })
    }

    /// The courtesy receipt sent back to the submitter. It carries none of
    /// the submitted details, only the name.
    pub fn confirmation_email(
        &self,
        inquiry: &Inquiry,
        from: &str,
        contact_email: &str,
    ) -> Result<OutgoingEmail> {
        let mut context = Context::new();
        context.insert("name", &inquiry.name);
        context.insert("contact_email", contact_email);

        Ok(OutgoingEmail {
            from: from.to_string(),
            to: inquiry.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            text: self.render("confirmation.txt", &context)?,
            reply_to: Some(contact_email.to_string()),
        })
    }

    fn render(&self, name: &str, context: &Context) -> Result<String> {
        let text = self.tera.render(name, context)?;
        Ok(text.trim_end().to_string())
    }
}

pub fn inquiry_subject(inquiry: &Inquiry) -> String {
    match &inquiry.business {
        Some(business) => format!("New project inquiry from {} ({})", inquiry.name, business),
        None => format!("New project inquiry from {}", inquiry.name),
    }
}

fn or_placeholder(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(PLACEHOLDER)
}
