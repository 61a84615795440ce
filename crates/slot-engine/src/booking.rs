//! Booking request validation, e-mail payload and submission status.
//!
//! The e-mail relay is an external collaborator driven by the host page: it
//! sends the clinic notification first and, only if that succeeds, the client
//! confirmation. This module prepares what gets sent and turns the outcome into
//! the message shown to the visitor.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::locale::Locale;
use crate::table::AvailabilityTable;

/// Placeholder sent when no slot was chosen (locations without a calendar).
pub const NO_SLOT_SELECTED: &str = "Sem horário selecionado";

/// What the visitor filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub birthday: String,
    pub contact: String,
    /// Specialty display name, as shown in the form.
    pub specialty: String,
    pub location: String,
    pub selected_slot: Option<String>,
    pub notes: Option<String>,
}

/// Template parameters sent to the e-mail relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailPayload {
    pub name: String,
    pub email: String,
    pub birthday: String,
    pub contact: String,
    pub specialty: String,
    pub location: String,
    pub selected_slot: String,
    pub notes: String,
}

impl BookingRequest {
    /// Check the request before dispatch.
    ///
    /// `specialty_index` is the position of the chosen specialty in the form,
    /// which keys the availability table. A slot is required whenever a
    /// calendar exists for the location and specialty.
    ///
    /// # Errors
    /// `SlotError::MissingField` for an empty name, e-mail or contact;
    /// `SlotError::SlotRequired` when a calendar exists but no slot was chosen.
    pub fn validate(&self, table: &AvailabilityTable, specialty_index: u32) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("email", &self.email),
            ("contact", &self.contact),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(SlotError::MissingField(*field));
        }

        let has_slot = self
            .selected_slot
            .as_deref()
            .is_some_and(|slot| !slot.trim().is_empty());
        if !has_slot && table.schedule(&self.location, specialty_index).is_some() {
            return Err(SlotError::SlotRequired {
                location: self.location.clone(),
                specialty: specialty_index,
            });
        }
        Ok(())
    }

    /// Build the relay payload, filling the defaults for optional fields.
    pub fn to_payload(&self) -> EmailPayload {
        let selected_slot = self
            .selected_slot
            .as_deref()
            .map(str::trim)
            .filter(|slot| !slot.is_empty())
            .unwrap_or(NO_SLOT_SELECTED)
            .to_string();

        EmailPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            birthday: self.birthday.clone(),
            contact: self.contact.trim().to_string(),
            specialty: self.specialty.clone(),
            location: self.location.clone(),
            selected_slot,
            notes: self.notes.clone().unwrap_or_default(),
        }
    }
}

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Both e-mails were sent.
    Confirmed,
    /// The clinic notification failed; the client e-mail was not attempted.
    ClinicFailed,
    /// The clinic was notified but the client confirmation failed.
    ClientFailed,
}

impl SubmissionOutcome {
    /// Combine the two dispatch results. `client` is `None` when it was never sent.
    pub fn from_dispatch(clinic_ok: bool, client_ok: Option<bool>) -> Self {
        match (clinic_ok, client_ok) {
            (false, _) => SubmissionOutcome::ClinicFailed,
            (true, Some(true)) => SubmissionOutcome::Confirmed,
            (true, _) => SubmissionOutcome::ClientFailed,
        }
    }

    pub fn status_message(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SubmissionOutcome::Confirmed, Locale::Pt) => {
                "Pedido de agendamento enviado com sucesso! Pendente de confirmação."
            }
            (SubmissionOutcome::Confirmed, Locale::En) => {
                "Appointment request successfully submitted! Pending confirmation."
            }
            (SubmissionOutcome::Confirmed, Locale::Es) => {
                "¡Solicitud de cita enviada correctamente! Pendiente de confirmación."
            }
            (SubmissionOutcome::ClinicFailed, Locale::Pt) => {
                "Erro ao enviar o e-mail. Por favor tente novamente."
            }
            (SubmissionOutcome::ClinicFailed, Locale::En) => {
                "Error sending email. Please try again."
            }
            (SubmissionOutcome::ClinicFailed, Locale::Es) => {
                "Error al enviar el correo electrónico. Por favor, inténtalo de nuevo."
            }
            (SubmissionOutcome::ClientFailed, Locale::Pt) => {
                "Erro ao enviar o e-mail de confirmação. Por favor tente novamente."
            }
            (SubmissionOutcome::ClientFailed, Locale::En) => {
                "Error sending confirmation email. Please try again."
            }
            (SubmissionOutcome::ClientFailed, Locale::Es) => {
                "Error al enviar el correo electrónico de confirmación. Por favor, inténtalo de nuevo."
            }
        }
    }

    /// The form goes back to its first step after every submission.
    pub fn resets_form(self) -> bool {
        true
    }

    /// Only a confirmed submission clears the visitor's input.
    pub fn clears_form(self) -> bool {
        self == SubmissionOutcome::Confirmed
    }
}
