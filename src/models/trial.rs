//! Clinical-trial documents and the raw-study flattening.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::json::{pointer_array, pointer_str, pointer_str_list, pointer_u64};

/// Sponsoring organization of a study
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub full_name: Option<String>,
    pub class: Option<String>,
}

/// Flattened projection of one ClinicalTrials.gov study.
///
/// List-valued source fields (conditions, phases, intervention names) keep
/// only their first element. That is a deliberate single-value policy carried
/// over from the consumers of these documents, not an omission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialOverview {
    pub record_id: String,
    pub doctor_name: String,
    pub nct_id: Option<String>,
    pub organization: Organization,
    pub brief_title: Option<String>,
    pub official_title: Option<String>,
    pub status_verified_date: Option<String>,
    pub start_date: Option<String>,
    pub primary_completion_date: Option<String>,
    pub completion_date: Option<String>,
    pub brief_summary: Option<String>,
    pub primary_investigator_name: Option<String>,
    pub primary_investigator_title: Option<String>,
    pub primary_investigator_affiliation: Option<String>,
    pub lead_sponsor_name: Option<String>,
    pub keywords: Vec<String>,
    pub condition: Option<String>,
    pub study_type: Option<String>,
    pub phase: Option<String>,
    pub intervention_name: Option<String>,
    pub enrollment_count: Option<u64>,
    /// Raw pass-through lists from the contacts/locations module
    pub central_contacts: Vec<Value>,
    pub overall_officials: Vec<Value>,
    pub locations: Vec<Value>,
}

impl TrialOverview {
    /// Flatten the `protocolSection` of a raw study. Pure; any missing
    /// intermediate key yields the field's default.
    pub fn from_protocol(protocol: &Value, record_id: &str, doctor_name: &str) -> Self {
        Self {
            record_id: record_id.to_string(),
            doctor_name: doctor_name.to_string(),
            nct_id: pointer_str(protocol, "/identificationModule/nctId"),
            organization: Organization {
                full_name: pointer_str(protocol, "/identificationModule/organization/fullName"),
                class: pointer_str(protocol, "/identificationModule/organization/class"),
            },
            brief_title: pointer_str(protocol, "/identificationModule/briefTitle"),
            official_title: pointer_str(protocol, "/identificationModule/officialTitle"),
            status_verified_date: pointer_str(protocol, "/statusModule/statusVerifiedDate"),
            start_date: pointer_str(protocol, "/statusModule/startDateStruct/date"),
            primary_completion_date: pointer_str(
                protocol,
                "/statusModule/primaryCompletionDateStruct/date",
            ),
            completion_date: pointer_str(protocol, "/statusModule/completionDateStruct/date"),
            brief_summary: pointer_str(protocol, "/descriptionModule/briefSummary"),
            primary_investigator_name: pointer_str(
                protocol,
                "/sponsorCollaboratorsModule/responsibleParty/investigatorFullName",
            ),
            primary_investigator_title: pointer_str(
                protocol,
                "/sponsorCollaboratorsModule/responsibleParty/investigatorTitle",
            ),
            primary_investigator_affiliation: pointer_str(
                protocol,
                "/sponsorCollaboratorsModule/responsibleParty/investigatorAffiliation",
            ),
            lead_sponsor_name: pointer_str(protocol, "/sponsorCollaboratorsModule/leadSponsor/name"),
            keywords: pointer_str_list(protocol, "/conditionsModule/keywords"),
            condition: pointer_str(protocol, "/conditionsModule/conditions/0"),
            study_type: pointer_str(protocol, "/designModule/studyType"),
            phase: pointer_str(protocol, "/designModule/phases/0"),
            intervention_name: pointer_str(
                protocol,
                "/armsInterventionsModule/armGroups/0/interventionNames/0",
            ),
            enrollment_count: pointer_u64(protocol, "/designModule/enrollmentInfo/count"),
            central_contacts: pointer_array(protocol, "/contactsLocationsModule/centralContacts"),
            overall_officials: pointer_array(protocol, "/contactsLocationsModule/overallOfficials"),
            locations: pointer_array(protocol, "/contactsLocationsModule/locations"),
        }
    }
}

/// One trial inside a physician's document: the flattened overview plus the
/// untouched original study payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub overview: TrialOverview,
    pub raw: Value,
}

/// Per-physician trials document, keyed by the external record identifier.
///
/// At most one document exists per `record_id`, and a given NCT id appears at
/// most once in `trials`; re-encountering it replaces the entry in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorTrialsDocument {
    pub record_id: String,
    pub full_name: String,
    pub trials: Vec<TrialRecord>,
}
