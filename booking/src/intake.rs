//! Booking intake validation.
//!
//! Validates attendee identity, ticket selection, and dynamic form answers
//! in order, failing fast on the first violation, and produces a normalized
//! intent ready for pricing and persistence. The validator performs no I/O;
//! form-field definitions are supplied by the caller.

use std::collections::{BTreeMap, HashSet};

use crate::error::{BookingError, Result};
use crate::types::{Attendee, BookingMode, FieldKind, FormAnswer, FormField, FormResponse, TicketId};

/// Raw booking input, as decoded at the API boundary
#[derive(Clone, Debug)]
pub struct BookingDraft {
    /// Attendee name
    pub first_name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Requested quantities per ticket tier
    pub tickets_bought: BTreeMap<TicketId, u32>,
    /// Submitted custom form answers
    pub form_response: FormResponse,
}

/// Normalized booking input that passed intake validation
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BookingIntent {
    /// Trimmed attendee contact details
    pub attendee: Attendee,
    /// Requested quantities with zero entries dropped
    pub tickets_bought: BTreeMap<TicketId, u32>,
    /// Submitted custom form answers, passed through as given
    pub form_response: FormResponse,
}

/// Validates a draft for the given booking mode.
///
/// Checks run in order: attendee identity, ticket selection (skipped in
/// waitlist mode), then required answers over the visible field set.
///
/// # Errors
///
/// Returns `Validation` for identity and selection problems and
/// `RequiredFieldMissing` naming the field label for blank required
/// answers.
pub fn validate(draft: BookingDraft, mode: BookingMode, fields: &[FormField]) -> Result<BookingIntent> {
    let first_name = draft.first_name.trim().to_string();
    if first_name.is_empty() {
        return Err(BookingError::validation("first_name cannot be empty"));
    }

    let email = draft.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(BookingError::validation("email is not a valid email address"));
    }

    let phone = draft.phone.trim().to_string();
    if !is_valid_phone(&phone) {
        return Err(BookingError::validation("phone must be exactly 10 digits"));
    }

    let tickets_bought: BTreeMap<TicketId, u32> = draft
        .tickets_bought
        .into_iter()
        .filter(|&(_, quantity)| quantity > 0)
        .collect();
    if mode == BookingMode::Payment && tickets_bought.is_empty() {
        return Err(BookingError::validation("tickets_bought cannot be empty"));
    }

    let visible = visible_field_names(fields, &draft.form_response);
    for field in fields {
        if !field.required || !visible.contains(field.name.as_str()) {
            continue;
        }
        let blank = draft
            .form_response
            .get(&field.name)
            .is_none_or(FormAnswer::is_blank);
        if blank {
            return Err(BookingError::RequiredFieldMissing {
                label: field.label.clone(),
            });
        }
    }

    Ok(BookingIntent {
        attendee: Attendee {
            first_name,
            email,
            phone,
        },
        tickets_bought,
        form_response: draft.form_response,
    })
}

/// Computes the set of currently visible field names.
///
/// All non-hidden fields are visible; a dropdown answer matching an option
/// with `triggers` adds each triggered name to the set.
#[must_use]
pub fn visible_field_names(fields: &[FormField], response: &FormResponse) -> HashSet<String> {
    let mut visible: HashSet<String> = fields
        .iter()
        .filter(|field| !field.hidden)
        .map(|field| field.name.clone())
        .collect();

    for field in fields {
        let FieldKind::Dropdown { options } = &field.kind else {
            continue;
        };
        let Some(answer) = response.get(&field.name) else {
            continue;
        };
        let Some(selected) = answer.as_text() else {
            continue;
        };
        if let Some(option) = options.iter().find(|option| option.value == selected) {
            for trigger in &option.triggers {
                visible.insert(trigger.clone());
            }
        }
    }

    visible
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // The domain needs at least one dot with non-empty labels either side
    domain.contains('.') && domain.split('.').all(|label| !label.is_empty())
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}
