//! Daily measures.
//!
//! Vitals recorded once per patient per calendar date, stored as one
//! document per date under the patient's record directory:
//!
//! ```text
//! users/<s1>/<s2>/<patient-uuid>/daily_measures/<YYYY-MM-DD>.yaml
//! ```
//!
//! Writing a date that already exists replaces that day's document; across
//! dates the collection only grows. Entries may be recorded by the patient
//! or by a caregiver holding an approved link.

use crate::config::CoreConfig;
use crate::constants::MEASURES_DIR_NAME;
use crate::error::{CareError, CareResult};
use crate::repositories::caregivers::CaregiverService;
use crate::repositories::users::UserService;
use crate::store::{read_record, write_record};
use carebook_uuid::ShardableUuid;
use chrono::{NaiveDate, Utc};
use records::{DailyMeasure, DailyMeasureData, Role, Vitals};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for recording and reading daily measures.
#[derive(Clone, Debug)]
pub struct MeasureService {
    cfg: Arc<CoreConfig>,
}

impl MeasureService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Records (or replaces) a day's measures for a patient.
    ///
    /// # Errors
    ///
    /// Returns `CareError` if:
    /// - the target account does not exist or is not a patient,
    /// - `added_by` is neither the patient nor a linked caregiver,
    /// - the vitals carry no reading at all,
    /// - the record cannot be written.
    pub fn record(
        &self,
        patient_id: &ShardableUuid,
        date: NaiveDate,
        vitals: Vitals,
        added_by: &ShardableUuid,
    ) -> CareResult<DailyMeasureData> {
        let users = UserService::new(self.cfg.clone());
        if users.get(patient_id)?.role != Role::Patient {
            return Err(CareError::InvalidInput(format!(
                "account {} is not a patient",
                patient_id
            )));
        }

        if added_by != patient_id {
            let caregivers = CaregiverService::new(self.cfg.clone());
            if !caregivers.is_linked(added_by, patient_id) {
                return Err(CareError::NotAuthorised("recording measures"));
            }
        }

        if vitals.is_empty() {
            return Err(CareError::InvalidInput(
                "a daily measure needs at least one reading".into(),
            ));
        }

        let data = DailyMeasureData {
            date,
            vitals,
            added_by: added_by.clone(),
            recorded_at: Utc::now(),
        };

        write_record(
            &self.measure_path(patient_id, date),
            &DailyMeasure::render(&data)?,
        )?;

        tracing::info!(patient = %patient_id, date = %date, by = %added_by, "daily measure recorded");
        Ok(data)
    }

    /// Loads one day's measures.
    pub fn get(
        &self,
        patient_id: &ShardableUuid,
        date: NaiveDate,
    ) -> CareResult<Option<DailyMeasureData>> {
        let path = self.measure_path(patient_id, date);
        if !path.is_file() {
            return Ok(None);
        }

        Ok(Some(DailyMeasure::parse(&read_record(&path)?)?))
    }

    /// Lists every recorded day for a patient, oldest first.
    pub fn list(&self, patient_id: &ShardableUuid) -> CareResult<Vec<DailyMeasureData>> {
        let dir = self.measures_dir(patient_id);

        let mut measures = Vec::new();
        let entries = match fs::read_dir(&dir) {
            Ok(it) => it,
            Err(_) => return Ok(measures),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            match DailyMeasure::parse(&read_record(&path)?) {
                Ok(measure) => measures.push(measure),
                Err(e) => {
                    tracing::warn!("failed to parse daily measure {}: {e}", path.display());
                }
            }
        }

        measures.sort_by_key(|m| m.date);
        Ok(measures)
    }

    fn measures_dir(&self, patient_id: &ShardableUuid) -> PathBuf {
        patient_id
            .sharded_dir(&self.cfg.users_dir())
            .join(MEASURES_DIR_NAME)
    }

    fn measure_path(&self, patient_id: &ShardableUuid, date: NaiveDate) -> PathBuf {
        self.measures_dir(patient_id)
            .join(format!("{}.yaml", date.format("%Y-%m-%d")))
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
        measures: MeasureService,
        patient: ShardableUuid,
        caregiver: ShardableUuid,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let cfg = Arc::new(CoreConfig::new(temp.path().to_path_buf()).unwrap());
        let users = UserService::new(cfg.clone());

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
            caregivers: CaregiverService::new(cfg.clone()),
            measures: MeasureService::new(cfg),
            patient,
            caregiver,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn some_vitals() -> Vitals {
        Vitals {
            systolic_bp: Some(124),
            diastolic_bp: Some(80),
            ..Vitals::default()
        }
    }

    #[test]
    fn patient_records_and_reads_back() {
        let fx = fixture();
        let date = day("2026-03-01");

        let recorded = fx
            .measures
            .record(&fx.patient, date, some_vitals(), &fx.patient)
            .expect("record");
        assert_eq!(recorded.added_by, fx.patient);

        let loaded = fx
            .measures
            .get(&fx.patient, date)
            .expect("get")
            .expect("present");
        assert_eq!(loaded.vitals.systolic_bp, Some(124));

        assert!(fx.measures.get(&fx.patient, day("2026-03-02")).unwrap().is_none());
    }

    #[test]
    fn rerecording_a_date_replaces_it() {
        let fx = fixture();
        let date = day("2026-03-01");

        fx.measures
            .record(&fx.patient, date, some_vitals(), &fx.patient)
            .unwrap();

        let corrected = Vitals {
            systolic_bp: Some(118),
            ..Vitals::default()
        };
        fx.measures
            .record(&fx.patient, date, corrected, &fx.patient)
            .unwrap();

        let all = fx.measures.list(&fx.patient).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].vitals.systolic_bp, Some(118));
        assert_eq!(all[0].vitals.diastolic_bp, None);
    }

    #[test]
    fn unlinked_caregiver_cannot_record() {
        let fx = fixture();

        assert!(matches!(
            fx.measures
                .record(&fx.patient, day("2026-03-01"), some_vitals(), &fx.caregiver),
            Err(CareError::NotAuthorised(_))
        ));
    }

    #[test]
    fn linked_caregiver_can_record() {
        let fx = fixture();

        fx.caregivers
            .request_link(&fx.patient, &fx.caregiver)
            .unwrap();
        fx.caregivers.approve(&fx.caregiver, &fx.patient).unwrap();

        let recorded = fx
            .measures
            .record(&fx.patient, day("2026-03-01"), some_vitals(), &fx.caregiver)
            .expect("linked caregiver records");
        assert_eq!(recorded.added_by, fx.caregiver);
    }

    #[test]
    fn empty_vitals_are_rejected() {
        let fx = fixture();

        assert!(matches!(
            fx.measures
                .record(&fx.patient, day("2026-03-01"), Vitals::default(), &fx.patient),
            Err(CareError::InvalidInput(_))
        ));
    }

    #[test]
    fn list_sorts_by_date() {
        let fx = fixture();

        fx.measures
            .record(&fx.patient, day("2026-03-05"), some_vitals(), &fx.patient)
            .unwrap();
        fx.measures
            .record(&fx.patient, day("2026-03-01"), some_vitals(), &fx.patient)
            .unwrap();
        fx.measures
            .record(&fx.patient, day("2026-03-03"), some_vitals(), &fx.patient)
            .unwrap();

        let dates: Vec<String> = fx
            .measures
            .list(&fx.patient)
            .unwrap()
            .into_iter()
            .map(|m| m.date.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(dates, ["2026-03-01", "2026-03-03", "2026-03-05"]);
    }
}
