//! Lead capture: student enquiries, college partnership leads and newsletter
//! sign-ups. Unlike the listing, these writes surface every failure.

use crate::error::StoreError;
use crate::source::{COLLEGE_LEADS_TABLE, ENQUIRIES_TABLE, NEWSLETTER_TABLE, RecordStore};
use regex::Regex;
use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

pub const MIN_PHONE_DIGITS: usize = 10;

/// PostgreSQL unique-violation code, returned when an email is already subscribed.
const UNIQUE_VIOLATION: &str = "23505";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, thiserror::Error)]
pub enum EnquiryError {
    #[error("{0}")]
    Validation(String),
    #[error("this email is already subscribed")]
    AlreadySubscribed,
    #[error("lead capture is unavailable: record store is not configured")]
    Unconfigured,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EnquiryError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unconfigured => Self::Unconfigured,
            other => Self::Store(other),
        }
    }
}

/// A student's request for a callback.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct StudentEnquiry {
    /// Student name
    pub name: String,
    /// Phone number; any formatting is stripped
    pub phone: String,
    /// Course of interest
    #[serde(default)]
    pub course: Option<String>,
    /// Student's city
    #[serde(default)]
    pub city: Option<String>,
}

/// Row written to the enquiries table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnquiryRow {
    pub name: String,
    pub phone: String,
    pub course: Option<String>,
    pub city: Option<String>,
}

impl StudentEnquiry {
    pub fn validate(&self) -> Result<EnquiryRow, EnquiryError> {
        let name = self.name.trim();
        let phone: String = self.phone.chars().filter(char::is_ascii_digit).collect();
        if name.is_empty() {
            return Err(EnquiryError::Validation("name is required".into()));
        }
        if phone.len() < MIN_PHONE_DIGITS {
            return Err(EnquiryError::Validation(format!(
                "phone must contain at least {} digits",
                MIN_PHONE_DIGITS
            )));
        }
        Ok(EnquiryRow {
            name: name.to_string(),
            phone,
            course: trimmed_or_null(self.course.as_deref()),
            city: trimmed_or_null(self.city.as_deref()),
        })
    }
}

/// A college asking to be listed.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CollegeLead {
    /// Name of the college
    pub college_name: String,
    /// Contact phone number
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegeLeadRow {
    pub college_name: String,
    pub phone: String,
}

impl CollegeLead {
    pub fn validate(&self) -> Result<CollegeLeadRow, EnquiryError> {
        let college_name = self.college_name.trim();
        let phone = self.phone.trim();
        if college_name.is_empty() || phone.is_empty() {
            return Err(EnquiryError::Validation(
                "college name and phone are both required".into(),
            ));
        }
        Ok(CollegeLeadRow {
            college_name: college_name.to_string(),
            phone: phone.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewsletterSignup {
    /// Email address to subscribe
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsletterRow {
    pub email: String,
}

impl NewsletterSignup {
    pub fn validate(&self) -> Result<NewsletterRow, EnquiryError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(EnquiryError::Validation("email is required".into()));
        }
        if !EMAIL.is_match(email) {
            return Err(EnquiryError::Validation(format!("'{}' is not a valid email", email)));
        }
        Ok(NewsletterRow {
            email: email.to_string(),
        })
    }
}

fn trimmed_or_null(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Submits validated leads to the store.
#[derive(Debug, Clone, Copy)]
pub struct LeadWriter<'a> {
    store: Option<&'a dyn RecordStore>,
}

impl<'a> LeadWriter<'a> {
    pub fn new(store: Option<&'a dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn submit_enquiry(&self, enquiry: &StudentEnquiry) -> Result<(), EnquiryError> {
        let row = enquiry.validate()?;
        self.write(ENQUIRIES_TABLE, &row).await
    }

    pub async fn submit_college_lead(&self, lead: &CollegeLead) -> Result<(), EnquiryError> {
        let row = lead.validate()?;
        self.write(COLLEGE_LEADS_TABLE, &row).await
    }

    pub async fn subscribe(&self, signup: &NewsletterSignup) -> Result<(), EnquiryError> {
        let row = signup.validate()?;
        self.write(NEWSLETTER_TABLE, &row).await.map_err(|e| match e {
            EnquiryError::Store(StoreError::Status { status, body, .. })
                if status == 409 || body.contains(UNIQUE_VIOLATION) =>
            {
                EnquiryError::AlreadySubscribed
            }
            other => other,
        })
    }

    async fn write<T: Serialize>(&self, table: &str, row: &T) -> Result<(), EnquiryError> {
        let store = self.store.ok_or(EnquiryError::Unconfigured)?;
        let payload: Value = serde_json::to_value(row)
            .map_err(|e| EnquiryError::Validation(format!("could not encode row: {}", e)))?;
        store.insert(table, payload).await.map_err(|e| {
            tracing::error!("Insert into {} failed: {}", table, e);
            EnquiryError::from(e)
        })?;
        tracing::info!("Recorded new row in {}", table);
        Ok(())
    }
}
