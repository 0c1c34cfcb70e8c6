//! Appointment lifecycle management.
//!
//! This module owns the appointment collection and its status lifecycle:
//!
//! ```text
//! pending ──► approved ──► completed
//!    │
//!    └─────► declined
//! ```
//!
//! Every status change loads the record, validates the transition against
//! [`records::AppointmentStatus::can_transition_to`], and rewrites the
//! record. Illegal transitions (a stale UI re-submitting, two doctor actions
//! racing) are rejected and leave the record unchanged.
//!
//! Attachment bookkeeping lives here too: stored file bytes are handled by
//! `carebook_files::AttachmentStore`, while the metadata entries live on the
//! appointment record. Appending preserves upload order and performs no
//! deduplication; removing matches by `file_url` and rewrites the list minus
//! the removed entry.
//!
//! ## Storage layout
//!
//! ```text
//! appointments/
//!   <s1>/<s2>/<uuid>/
//!     appointment.yaml
//!     files/                  # stored attachments
//! ```

use crate::config::CoreConfig;
use crate::constants::APPOINTMENT_FILE_NAME;
use crate::error::{CareError, CareResult};
use crate::repositories::users::UserService;
use crate::store::{create_unique_record_dir, read_record, walk_record_dirs, write_record};
use carebook_files::{AttachmentMetadata, AttachmentStore, FilesError};
use carebook_types::NonEmptyText;
use carebook_uuid::ShardableUuid;
use chrono::{DateTime, Utc};
use records::{
    Appointment, AppointmentData, AppointmentStatus, AttachmentEntry, Role,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for managing the appointment lifecycle.
#[derive(Clone, Debug)]
pub struct AppointmentService {
    cfg: Arc<CoreConfig>,
}

impl AppointmentService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Creates a new appointment request with status `pending`.
    ///
    /// Both parties are validated against the user store: the patient must
    /// be a patient account, the doctor a doctor account that has been
    /// approved by an admin.
    ///
    /// # Errors
    ///
    /// Returns `CareError` if:
    /// - either account does not exist or has the wrong role,
    /// - the doctor is not approved,
    /// - the record cannot be written.
    pub fn request(
        &self,
        patient_id: &ShardableUuid,
        doctor_id: &ShardableUuid,
        scheduled_at: DateTime<Utc>,
        reason: NonEmptyText,
    ) -> CareResult<AppointmentData> {
        let users = UserService::new(self.cfg.clone());

        let patient = users.get(patient_id)?;
        if patient.role != Role::Patient {
            return Err(CareError::InvalidInput(format!(
                "account {} is not a patient",
                patient_id
            )));
        }

        let doctor = users.get(doctor_id)?;
        if doctor.role != Role::Doctor {
            return Err(CareError::InvalidInput(format!(
                "account {} is not a doctor",
                doctor_id
            )));
        }
        if doctor.approved != Some(true) {
            return Err(CareError::InvalidInput(format!(
                "doctor {} has not been approved",
                doctor_id
            )));
        }

        let (id, record_dir) = create_unique_record_dir(&self.cfg.appointments_dir())?;
        let now = Utc::now();

        let data = AppointmentData {
            id,
            patient_id: patient_id.clone(),
            doctor_id: doctor_id.clone(),
            scheduled_at,
            reason: reason.into_string(),
            status: AppointmentStatus::Pending,
            notes: None,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        write_record(
            &record_dir.join(APPOINTMENT_FILE_NAME),
            &Appointment::render(&data)?,
        )?;

        tracing::info!(appointment = %data.id, patient = %patient_id, doctor = %doctor_id,
            "appointment requested");
        Ok(data)
    }

    /// Loads an appointment by identifier.
    pub fn get(&self, id: &ShardableUuid) -> CareResult<AppointmentData> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Err(CareError::AppointmentNotFound(id.to_string()));
        }

        Ok(Appointment::parse(&read_record(&path)?)?)
    }

    /// Lists a patient's appointments, soonest first.
    pub fn list_for_patient(&self, patient_id: &ShardableUuid) -> CareResult<Vec<AppointmentData>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|a| &a.patient_id == patient_id)
            .collect())
    }

    /// Lists a doctor's appointments, soonest first.
    pub fn list_for_doctor(&self, doctor_id: &ShardableUuid) -> CareResult<Vec<AppointmentData>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|a| &a.doctor_id == doctor_id)
            .collect())
    }

    /// Lists every appointment, soonest first.
    pub fn list_all(&self) -> CareResult<Vec<AppointmentData>> {
        let mut appointments = Vec::new();

        for (_, dir) in walk_record_dirs(&self.cfg.appointments_dir()) {
            let path = dir.join(APPOINTMENT_FILE_NAME);
            if !path.is_file() {
                continue;
            }

            match Appointment::parse(&read_record(&path)?) {
                Ok(appointment) => appointments.push(appointment),
                Err(e) => {
                    tracing::warn!("failed to parse appointment record {}: {e}", path.display());
                }
            }
        }

        appointments.sort_by_key(|a| a.scheduled_at);
        Ok(appointments)
    }

    /// Moves a pending appointment to `approved`.
    pub fn approve(&self, id: &ShardableUuid) -> CareResult<AppointmentData> {
        self.transition(id, AppointmentStatus::Approved)
    }

    /// Moves a pending appointment to `declined`.
    pub fn decline(&self, id: &ShardableUuid) -> CareResult<AppointmentData> {
        self.transition(id, AppointmentStatus::Declined)
    }

    /// Completes an approved appointment, persisting the doctor's notes.
    ///
    /// Notes are required non-empty at the type level; there is no path to a
    /// completed appointment without them.
    pub fn complete(&self, id: &ShardableUuid, notes: NonEmptyText) -> CareResult<AppointmentData> {
        let mut appointment = self.get(id)?;

        if !appointment
            .status
            .can_transition_to(AppointmentStatus::Completed)
        {
            return Err(CareError::InvalidStatusTransition {
                from: appointment.status,
                to: AppointmentStatus::Completed,
            });
        }

        appointment.status = AppointmentStatus::Completed;
        appointment.notes = Some(notes.into_string());
        appointment.updated_at = Utc::now();

        self.write(&appointment)?;
        tracing::info!(appointment = %id, "appointment completed");
        Ok(appointment)
    }

    /// Cancels (removes) a pending appointment request.
    ///
    /// Only the pending state is cancellable; an approved or concluded
    /// appointment must go through the doctor. Removal deletes the record
    /// directory including any stored files.
    pub fn cancel(&self, id: &ShardableUuid) -> CareResult<()> {
        let appointment = self.get(id)?;

        if appointment.status != AppointmentStatus::Pending {
            return Err(CareError::NotCancellable);
        }

        let dir = id.sharded_dir(&self.cfg.appointments_dir());
        fs::remove_dir_all(&dir).map_err(CareError::RecordRemoval)?;

        tracing::info!(appointment = %id, "appointment cancelled");
        Ok(())
    }

    /// Stores an uploaded file and appends its metadata to the record.
    ///
    /// Allowed only while the appointment is approved or completed. The new
    /// entry is appended after all existing entries; nothing is deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `CareError::AttachmentsNotAllowed` for pending or declined
    /// appointments, and propagates storage failures. A failure after the
    /// file is stored but before the record is rewritten leaves the file
    /// orphaned on disk; the record stays consistent.
    pub fn add_attachment(
        &self,
        id: &ShardableUuid,
        file_name: &str,
        bytes: &[u8],
    ) -> CareResult<(AppointmentData, AttachmentMetadata)> {
        let mut appointment = self.get(id)?;

        if !appointment.status.accepts_attachments() {
            return Err(CareError::AttachmentsNotAllowed(appointment.status));
        }

        let store = AttachmentStore::new(&self.cfg.appointments_dir(), id.clone())?;
        let metadata = store.store(file_name, bytes)?;

        appointment.attachments.push(AttachmentEntry {
            file_name: metadata.file_name.clone(),
            file_url: metadata.file_url.clone(),
            storage_path: Some(metadata.storage_path.clone()),
            uploaded_at: metadata.uploaded_at,
        });
        appointment.updated_at = Utc::now();

        self.write(&appointment)?;
        tracing::info!(appointment = %id, file = %metadata.stored_name, "attachment added");
        Ok((appointment, metadata))
    }

    /// Removes the attachment entry matching `file_url` and deletes the
    /// stored file when the entry carries a storage path.
    ///
    /// An entry without a storage path is removed from the record and the
    /// missing file is logged, never an error — matching the source
    /// system's silent behaviour. A storage path whose file has already
    /// vanished is likewise logged and the record still updated.
    pub fn remove_attachment(
        &self,
        id: &ShardableUuid,
        file_url: &str,
    ) -> CareResult<AppointmentData> {
        let mut appointment = self.get(id)?;

        let position = appointment
            .attachments
            .iter()
            .position(|entry| entry.file_url == file_url)
            .ok_or_else(|| CareError::AttachmentNotFound(file_url.to_string()))?;

        let entry = appointment.attachments.remove(position);

        match &entry.storage_path {
            Some(storage_path) => {
                let store = AttachmentStore::new(&self.cfg.appointments_dir(), id.clone())?;
                match store.remove(storage_path) {
                    Ok(()) => {}
                    Err(FilesError::NotFound(_)) => {
                        tracing::warn!(appointment = %id, path = %storage_path,
                            "stored file already absent during attachment removal");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            None => {
                tracing::warn!(appointment = %id, url = %file_url,
                    "attachment entry has no storage path; removing metadata only");
            }
        }

        appointment.updated_at = Utc::now();
        self.write(&appointment)?;

        tracing::info!(appointment = %id, url = %file_url, "attachment removed");
        Ok(appointment)
    }

    /// Reads a stored attachment's bytes by its stored object name.
    pub fn read_attachment(&self, id: &ShardableUuid, stored_name: &str) -> CareResult<Vec<u8>> {
        // Existence check doubles as the not-found error for the record
        self.get(id)?;

        let store = AttachmentStore::new(&self.cfg.appointments_dir(), id.clone())?;
        Ok(store.read(stored_name)?)
    }

    fn transition(
        &self,
        id: &ShardableUuid,
        to: AppointmentStatus,
    ) -> CareResult<AppointmentData> {
        let mut appointment = self.get(id)?;

        if !appointment.status.can_transition_to(to) {
            return Err(CareError::InvalidStatusTransition {
                from: appointment.status,
                to,
            });
        }

        appointment.status = to;
        appointment.updated_at = Utc::now();

        self.write(&appointment)?;
        tracing::info!(appointment = %id, status = %to, "appointment status changed");
        Ok(appointment)
    }

    fn record_path(&self, id: &ShardableUuid) -> PathBuf {
        id.sharded_dir(&self.cfg.appointments_dir())
            .join(APPOINTMENT_FILE_NAME)
    }

    fn write(&self, appointment: &AppointmentData) -> CareResult<()> {
        write_record(
            &self.record_path(&appointment.id),
            &Appointment::render(appointment)?,
        )
    }
}
