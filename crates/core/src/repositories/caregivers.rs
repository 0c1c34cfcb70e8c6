//! Caregiver requests and links.
//!
//! A patient asks a caregiver to look after them; the caregiver approves or
//! rejects. Approval grants the caregiver access to the patient's daily
//! measures via a link document.
//!
//! ## Storage layout
//!
//! ```text
//! caregivers/
//!   <s1>/<s2>/<caregiver-uuid>/
//!     requests/<patient-uuid>.yaml    # request with decision state
//!     patients/<patient-uuid>.yaml    # link, written on approval
//! ```
//!
//! Requests are keyed by patient, so a patient has at most one live request
//! towards a given caregiver.

use crate::config::CoreConfig;
use crate::constants::{LINKED_PATIENTS_DIR_NAME, REQUESTS_DIR_NAME};
use crate::error::{CareError, CareResult};
use crate::repositories::users::UserService;
use crate::store::{read_record, write_record};
use carebook_uuid::ShardableUuid;
use chrono::Utc;
use records::{CaregiverLinkData, CaregiverRequest, CaregiverRequestData, LinkStatus, Role};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for managing caregiver requests and links.
#[derive(Clone, Debug)]
pub struct CaregiverService {
    cfg: Arc<CoreConfig>,
}

impl CaregiverService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Creates a pending request from a patient towards a caregiver.
    ///
    /// # Errors
    ///
    /// Returns `CareError::InvalidInput` when either party has the wrong
    /// role, or when a pending or approved request already exists for this
    /// pair. A rejected request may be re-made.
    pub fn request_link(
        &self,
        patient_id: &ShardableUuid,
        caregiver_id: &ShardableUuid,
    ) -> CareResult<CaregiverRequestData> {
        let users = UserService::new(self.cfg.clone());

        if users.get(patient_id)?.role != Role::Patient {
            return Err(CareError::InvalidInput(format!(
                "account {} is not a patient",
                patient_id
            )));
        }
        if users.get(caregiver_id)?.role != Role::Caregiver {
            return Err(CareError::InvalidInput(format!(
                "account {} is not a caregiver",
                caregiver_id
            )));
        }

        let request_path = self.request_path(caregiver_id, patient_id);
        if request_path.is_file() {
            let existing = CaregiverRequest::parse(&read_record(&request_path)?)?;
            if existing.status != LinkStatus::Rejected {
                return Err(CareError::InvalidInput(format!(
                    "a {} request already exists for this caregiver",
                    existing.status
                )));
            }
        }

        let data = CaregiverRequestData {
            patient_id: patient_id.clone(),
            caregiver_id: caregiver_id.clone(),
            status: LinkStatus::Pending,
            requested_at: Utc::now(),
            decided_at: None,
        };

        write_record(&request_path, &CaregiverRequest::render(&data)?)?;

        tracing::info!(patient = %patient_id, caregiver = %caregiver_id,
            "caregiver link requested");
        Ok(data)
    }

    /// Lists the requests addressed to a caregiver, newest first.
    pub fn list_requests(
        &self,
        caregiver_id: &ShardableUuid,
    ) -> CareResult<Vec<CaregiverRequestData>> {
        let dir = self
            .caregiver_dir(caregiver_id)
            .join(REQUESTS_DIR_NAME);

        let mut requests = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(it) => it,
            Err(_) => return Ok(requests),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            match CaregiverRequest::parse(&read_record(&path)?) {
                Ok(request) => requests.push(request),
                Err(e) => {
                    tracing::warn!("failed to parse caregiver request {}: {e}", path.display());
                }
            }
        }

        requests.sort_by_key(|r| std::cmp::Reverse(r.requested_at));
        Ok(requests)
    }

    /// Approves a pending request and writes the link document.
    pub fn approve(
        &self,
        caregiver_id: &ShardableUuid,
        patient_id: &ShardableUuid,
    ) -> CareResult<CaregiverRequestData> {
        let request = self.decide(caregiver_id, patient_id, LinkStatus::Approved)?;

        let link = CaregiverLinkData {
            patient_id: patient_id.clone(),
            caregiver_id: caregiver_id.clone(),
            linked_at: request.decided_at.unwrap_or_else(Utc::now),
        };
        write_record(
            &self.link_path(caregiver_id, patient_id),
            &CaregiverRequest::render_link(&link)?,
        )?;

        tracing::info!(patient = %patient_id, caregiver = %caregiver_id, "caregiver link approved");
        Ok(request)
    }

    /// Rejects a pending request.
    pub fn reject(
        &self,
        caregiver_id: &ShardableUuid,
        patient_id: &ShardableUuid,
    ) -> CareResult<CaregiverRequestData> {
        let request = self.decide(caregiver_id, patient_id, LinkStatus::Rejected)?;
        tracing::info!(patient = %patient_id, caregiver = %caregiver_id, "caregiver link rejected");
        Ok(request)
    }

    /// Lists the patients linked to a caregiver.
    pub fn list_patients(
        &self,
        caregiver_id: &ShardableUuid,
    ) -> CareResult<Vec<CaregiverLinkData>> {
        let dir = self
            .caregiver_dir(caregiver_id)
            .join(LINKED_PATIENTS_DIR_NAME);

        let mut links = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(it) => it,
            Err(_) => return Ok(links),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            match CaregiverRequest::parse_link(&read_record(&path)?) {
                Ok(link) => links.push(link),
                Err(e) => {
                    tracing::warn!("failed to parse caregiver link {}: {e}", path.display());
                }
            }
        }

        links.sort_by_key(|l| l.linked_at);
        Ok(links)
    }

    /// Whether an approved link exists between a caregiver and a patient.
    pub fn is_linked(&self, caregiver_id: &ShardableUuid, patient_id: &ShardableUuid) -> bool {
        self.link_path(caregiver_id, patient_id).is_file()
    }

    fn decide(
        &self,
        caregiver_id: &ShardableUuid,
        patient_id: &ShardableUuid,
        decision: LinkStatus,
    ) -> CareResult<CaregiverRequestData> {
        let path = self.request_path(caregiver_id, patient_id);
        if !path.is_file() {
            return Err(CareError::RequestNotFound(patient_id.to_string()));
        }

        let mut request = CaregiverRequest::parse(&read_record(&path)?)?;

        if request.status != LinkStatus::Pending {
            return Err(CareError::InvalidInput(format!(
                "request has already been {}",
                request.status
            )));
        }

        request.status = decision;
        request.decided_at = Some(Utc::now());

        write_record(&path, &CaregiverRequest::render(&request)?)?;
        Ok(request)
    }

    fn caregiver_dir(&self, caregiver_id: &ShardableUuid) -> PathBuf {
        caregiver_id.sharded_dir(&self.cfg.caregivers_dir())
    }

    fn request_path(&self, caregiver_id: &ShardableUuid, patient_id: &ShardableUuid) -> PathBuf {
        self.caregiver_dir(caregiver_id)
            .join(REQUESTS_DIR_NAME)
            .join(format!("{patient_id}.yaml"))
    }

    fn link_path(&self, caregiver_id: &ShardableUuid, patient_id: &ShardableUuid) -> PathBuf {
        self.caregiver_dir(caregiver_id)
            .join(LINKED_PATIENTS_DIR_NAME)
            .join(format!("{patient_id}.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebook_types::{EmailAddress, NonEmptyText};
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        caregivers: CaregiverService,
        patient: ShardableUuid,
        caregiver: ShardableUuid,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf()).unwrap());
        let users = UserService::new(cfg.clone());
        let caregivers = CaregiverService::new(cfg);

        let patient = users
            .register(
                EmailAddress::new("pat@example.com").unwrap(),
                "pw",
                NonEmptyText::new("Pat").unwrap(),
                Role::Patient,
            )
            .unwrap()
            .id;
        let caregiver = users
            .register(
                EmailAddress::new("care@example.com").unwrap(),
                "pw",
                NonEmptyText::new("Cara").unwrap(),
                Role::Caregiver,
            )
            .unwrap()
            .id;

        Fixture {
            _temp: temp,
            caregivers,
            patient,
            caregiver,
        }
    }

    #[test]
    fn request_approve_creates_link() {
        let fx = fixture();

        let request = fx
            .caregivers
            .request_link(&fx.patient, &fx.caregiver)
            .expect("request");
        assert_eq!(request.status, LinkStatus::Pending);
        assert!(!fx.caregivers.is_linked(&fx.caregiver, &fx.patient));

        let approved = fx
            .caregivers
            .approve(&fx.caregiver, &fx.patient)
            .expect("approve");
        assert_eq!(approved.status, LinkStatus::Approved);
        assert!(approved.decided_at.is_some());
        assert!(fx.caregivers.is_linked(&fx.caregiver, &fx.patient));

        let patients = fx.caregivers.list_patients(&fx.caregiver).unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].patient_id, fx.patient);
    }

    #[test]
    fn reject_leaves_no_link_and_allows_retry() {
        let fx = fixture();

        fx.caregivers
            .request_link(&fx.patient, &fx.caregiver)
            .unwrap();
        let rejected = fx
            .caregivers
            .reject(&fx.caregiver, &fx.patient)
            .expect("reject");
        assert_eq!(rejected.status, LinkStatus::Rejected);
        assert!(!fx.caregivers.is_linked(&fx.caregiver, &fx.patient));

        // A rejected request can be re-made
        let again = fx
            .caregivers
            .request_link(&fx.patient, &fx.caregiver)
            .expect("retry after rejection");
        assert_eq!(again.status, LinkStatus::Pending);
    }

    #[test]
    fn duplicate_pending_request_is_rejected() {
        let fx = fixture();

        fx.caregivers
            .request_link(&fx.patient, &fx.caregiver)
            .unwrap();
        assert!(matches!(
            fx.caregivers.request_link(&fx.patient, &fx.caregiver),
            Err(CareError::InvalidInput(_))
        ));
    }

    #[test]
    fn decision_requires_pending_request() {
        let fx = fixture();

        assert!(matches!(
            fx.caregivers.approve(&fx.caregiver, &fx.patient),
            Err(CareError::RequestNotFound(_))
        ));

        fx.caregivers
            .request_link(&fx.patient, &fx.caregiver)
            .unwrap();
        fx.caregivers.approve(&fx.caregiver, &fx.patient).unwrap();

        assert!(matches!(
            fx.caregivers.reject(&fx.caregiver, &fx.patient),
            Err(CareError::InvalidInput(_))
        ));
    }

    #[test]
    fn request_validates_roles() {
        let fx = fixture();

        assert!(matches!(
            fx.caregivers.request_link(&fx.caregiver, &fx.patient),
            Err(CareError::InvalidInput(_))
        ));
    }

    #[test]
    fn listings_for_unknown_caregiver_are_empty() {
        let fx = fixture();
        let other = ShardableUuid::new();

        assert!(fx.caregivers.list_requests(&other).unwrap().is_empty());
        assert!(fx.caregivers.list_patients(&other).unwrap().is_empty());
    }
}
