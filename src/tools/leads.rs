//! Lead-capture handlers.

use crate::enquiry::{CollegeLead, NewsletterSignup, StudentEnquiry};
use crate::state::DirectoryState;
use std::sync::Arc;

pub async fn handle_submit_enquiry(
    state: &Arc<DirectoryState>,
    request: StudentEnquiry,
) -> Result<String, String> {
    state
        .leads()
        .submit_enquiry(&request)
        .await
        .map_err(|e| e.to_string())?;
    Ok("Thanks! A counsellor will call you back shortly.".to_string())
}

pub async fn handle_submit_college_lead(
    state: &Arc<DirectoryState>,
    request: CollegeLead,
) -> Result<String, String> {
    state
        .leads()
        .submit_college_lead(&request)
        .await
        .map_err(|e| e.to_string())?;
    Ok(format!(
        "Thanks! We'll contact {} about listing.",
        request.college_name.trim()
    ))
}

pub async fn handle_subscribe_newsletter(
    state: &Arc<DirectoryState>,
    request: NewsletterSignup,
) -> Result<String, String> {
    state
        .leads()
        .subscribe(&request)
        .await
        .map_err(|e| e.to_string())?;
    Ok(format!("Subscribed {} to the newsletter.", request.email.trim()))
}
