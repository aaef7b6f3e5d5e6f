//! Built-in catalog and level table.
//!
//! Covers the segments that turn up in everyday order, result, admission,
//! staff master file and acknowledgement messages, plus two site-defined
//! `Z` segments. Field names are lower snake case; composite data
//! types are shared between segments through the helper constructors below.
//!
//! Every segment layout starts with a `segment` leaf holding the element code
//! itself, since the code is the first field-delimited token of its line.

use std::sync::LazyLock;

use crate::{
    levels::LevelTable,
    schema::{SchemaCatalog, SchemaSpec},
    value::SemanticType,
};

static CATALOG: LazyLock<SchemaCatalog> =
    LazyLock::new(|| SchemaCatalog::new(segments()).expect("built-in catalog is valid"));

static LEVELS: LazyLock<LevelTable> =
    LazyLock::new(|| LevelTable::from_levels(LEVELS_BY_CODE).expect("built-in levels are positive"));

const LEVELS_BY_CODE: [(&str, i64); 20] = [
    ("MSH", 1),
    ("MFI", 1),
    ("MFE", 1),
    ("STF", 1),
    ("PRA", 1),
    ("ZPS", 1),
    ("IN2", 1),
    ("ZBI", 1),
    ("EVN", 1),
    ("PID", 1),
    ("PD1", 1),
    ("NK1", 1),
    ("PV1", 1),
    ("IN1", 1),
    ("GT1", 1),
    ("ORC", 1),
    ("MSA", 1),
    ("FTS", 1),
    ("OBR", 2),
    ("OBX", 3),
];

/// The shared built-in schema catalog.
pub fn catalog() -> &'static SchemaCatalog {
    &CATALOG
}

/// The shared built-in level table. `NTE` is the annotation code.
pub fn levels() -> &'static LevelTable {
    &LEVELS
}

fn s(code: &str) -> SchemaSpec {
    SchemaSpec::leaf(code, SemanticType::String)
}

fn num(code: &str) -> SchemaSpec {
    SchemaSpec::leaf(code, SemanticType::Number)
}

fn date(code: &str) -> SchemaSpec {
    SchemaSpec::leaf(code, SemanticType::Date)
}

fn ts(code: &str) -> SchemaSpec {
    SchemaSpec::leaf(code, SemanticType::Timestamp)
}

fn composite(code: &str, children: Vec<SchemaSpec>) -> SchemaSpec {
    SchemaSpec::composite(code, children)
}

fn segment(code: &str, mut fields: Vec<SchemaSpec>) -> SchemaSpec {
    fields.insert(0, s("segment"));
    SchemaSpec::composite(code, fields)
}

// Composite data types

/// Hierarchic designator.
fn hd(code: &str) -> SchemaSpec {
    composite(
        code,
        vec![s("namespace_id"), s("universal_id"), s("universal_id_type")],
    )
}

/// Coded element.
fn ce(code: &str) -> SchemaSpec {
    composite(code, vec![s("code"), s("label"), s("system_name")])
}

/// Extended composite id.
fn cx(code: &str) -> SchemaSpec {
    composite(
        code,
        vec![
            s("id"),
            s("check_digit"),
            s("check_digit_scheme"),
            s("assigning_authority"),
            s("id_type"),
        ],
    )
}

/// Entity identifier.
fn ei(code: &str) -> SchemaSpec {
    composite(code, vec![s("entity_id"), s("namespace_id")])
}

/// Person name.
fn xpn(code: &str) -> SchemaSpec {
    composite(
        code,
        vec![
            s("family_name"),
            s("given_name"),
            s("middle_name"),
            s("suffix"),
            s("prefix"),
        ],
    )
}

/// Person name with an identifier in front.
fn xcn(code: &str) -> SchemaSpec {
    composite(
        code,
        vec![
            s("id"),
            s("family_name"),
            s("given_name"),
            s("middle_name"),
            s("suffix"),
            s("prefix"),
        ],
    )
}

/// Address.
fn xad(code: &str) -> SchemaSpec {
    composite(
        code,
        vec![
            s("street"),
            s("other"),
            s("city"),
            s("state"),
            s("zip"),
            s("country"),
        ],
    )
}

/// Person location.
fn pl(code: &str) -> SchemaSpec {
    composite(
        code,
        vec![s("point_of_care"), s("room"), s("bed"), s("facility")],
    )
}

fn segments() -> Vec<SchemaSpec> {
    vec![
        segment(
            "MSH",
            vec![
                s("encoding_chars"),
                hd("sending_app"),
                hd("sending_facility"),
                hd("receiving_app"),
                hd("receiving_facility"),
                ts("msg_dttm"),
                s("security"),
                composite("msg_type", vec![s("message_code"), s("event_code")]),
                s("msg_control_id"),
                s("processing_id"),
                s("version_id"),
            ],
        ),
        segment(
            "EVN",
            vec![
                s("event_type_code"),
                ts("recorded_dttm"),
                ts("planned_event_dttm"),
                s("event_reason_code"),
                xcn("operator_id"),
                ts("event_occurred"),
            ],
        ),
        segment(
            "PID",
            vec![
                num("set_id"),
                cx("patient_id"),
                cx("patient_id_list"),
                cx("alt_patient_id"),
                xpn("pat_name"),
                xpn("mothers_maiden_name"),
                date("dob"),
                s("sex"),
                xpn("patient_alias"),
                s("race"),
                xad("address"),
                s("county_code"),
                s("phone_home"),
                s("phone_business"),
                s("primary_language"),
                s("marital_status"),
                s("religion"),
                cx("patient_account_number"),
                s("ssn"),
                s("drivers_license"),
            ],
        ),
        segment(
            "PD1",
            vec![
                s("living_dependency"),
                s("living_arrangement"),
                s("primary_facility"),
                xcn("primary_care_provider"),
                s("student_indicator"),
                s("handicap"),
                s("living_will"),
                s("organ_donor"),
                s("separate_bill"),
                s("duplicate_patient"),
                s("publicity_code"),
                s("protection_indicator"),
            ],
        ),
        segment(
            "NK1",
            vec![
                num("set_id"),
                xpn("name"),
                ce("relationship"),
                xad("address"),
                s("phone_number"),
                s("business_phone"),
                ce("contact_role"),
                date("start_date"),
                date("end_date"),
            ],
        ),
        segment(
            "PV1",
            vec![
                num("set_id"),
                s("patient_class"),
                pl("assigned_location"),
                s("admission_type"),
                s("preadmit_number"),
                pl("prior_location"),
                xcn("attending_doctor"),
                xcn("referring_doctor"),
                xcn("consulting_doctor"),
                s("hospital_service"),
                pl("temporary_location"),
                s("preadmit_test_indicator"),
                s("readmission_indicator"),
                s("admit_source"),
                s("ambulatory_status"),
                s("vip_indicator"),
                xcn("admitting_doctor"),
                s("patient_type"),
                cx("visit_number"),
                s("financial_class"),
            ],
        ),
        segment(
            "IN1",
            vec![
                num("set_id"),
                ce("plan_id"),
                cx("company_id"),
                s("company_name"),
                xad("company_address"),
                xpn("company_contact_name"),
                s("company_phone"),
                s("group_number"),
                s("group_name"),
                s("group_employer_id"),
                s("group_employer_name"),
                date("plan_effective_date"),
                date("plan_expiration_date"),
                s("authorization_info"),
                s("plan_type"),
                xpn("name_of_insured"),
                ce("insured_relationship"),
                date("insured_dob"),
                xad("insured_address"),
            ],
        ),
        segment(
            "IN2",
            vec![
                cx("insured_employee_id"),
                s("insured_ssn"),
                xcn("insured_employer_name"),
                s("employer_information_data"),
                s("mail_claim_party"),
                s("medicare_health_ins_card_number"),
                xpn("medicaid_case_name"),
                s("medicaid_case_number"),
            ],
        ),
        segment(
            "GT1",
            vec![
                num("set_id"),
                cx("guarantor_number"),
                xpn("guarantor_name"),
                xpn("guarantor_spouse_name"),
                xad("guarantor_address"),
                s("guarantor_phone_home"),
                s("guarantor_phone_business"),
                date("guarantor_dob"),
                s("guarantor_sex"),
                s("guarantor_type"),
                ce("guarantor_relationship"),
                s("guarantor_ssn"),
            ],
        ),
        segment(
            "ORC",
            vec![
                s("order_control"),
                ei("placer_order_number"),
                ei("filler_order_number"),
                ei("placer_group_number"),
                s("order_status"),
                s("response_flag"),
                s("quantity_timing"),
                s("parent"),
                ts("trans_date_time"),
                xcn("entered_by"),
                xcn("verified_by"),
                xcn("ordering_provider"),
                pl("enterers_location"),
                s("callback_phone"),
            ],
        ),
        segment(
            "OBR",
            vec![
                num("set_id"),
                ei("placer_order_number"),
                ei("filler_order_number"),
                ce("universal_service_id"),
                s("priority"),
                ts("requested_dttm"),
                ts("obs_dttm"),
                ts("obs_end_dttm"),
                s("collection_volume"),
                xcn("collector_id"),
                s("specimen_action_code"),
                s("danger_code"),
                s("clinical_info"),
                ts("specimen_received_dttm"),
                s("specimen_source"),
                xcn("ordering_provider"),
                s("order_callback_phone"),
                s("placer_field_1"),
                s("placer_field_2"),
                s("filler_field_1"),
                s("filler_field_2"),
                ts("results_rpt_status_chng_dttm"),
                s("charge_to_practice"),
                s("diagnostic_serv_sect_id"),
                s("result_status"),
            ],
        ),
        segment(
            "OBX",
            vec![
                num("set_id"),
                s("value_type"),
                ce("obs_id"),
                s("obs_sub_id"),
                s("obs_results"),
                s("units"),
                s("reference_range"),
                s("abnormal_flags"),
                s("probability"),
                s("nature_of_abnormal_test"),
                s("obs_result_status"),
                date("last_obs_normal_va_date"),
                s("usr_def_access_chk"),
                ts("obs_dttm"),
                s("producer_id"),
            ],
        ),
        segment("NTE", vec![num("set_id"), s("source"), s("comment")]),
        segment(
            "MSA",
            vec![
                s("ack_code"),
                s("msg_control_id"),
                s("text_message"),
                num("expected_sequence_number"),
                s("delayed_ack_type"),
                ce("error_condition"),
            ],
        ),
        segment("FTS", vec![num("batch_message_count"), s("trailer_comment")]),
        segment(
            "MFI",
            vec![
                ce("master_file_id"),
                hd("master_file_application_id"),
                s("file_level_event_code"),
                ts("entered_dttm"),
                ts("effective_dttm"),
                s("response_level_code"),
            ],
        ),
        segment(
            "MFE",
            vec![
                s("record_level_event_code"),
                s("mfn_control_id"),
                ts("effective_dttm"),
                ce("primary_key_value"),
                s("primary_key_value_type"),
            ],
        ),
        segment(
            "STF",
            vec![
                ce("primary_key_value"),
                cx("staff_id_code"),
                xpn("staff_name"),
                s("staff_type"),
                s("sex"),
                date("dob"),
                s("active_inactive_flag"),
                ce("department"),
                ce("hospital_service"),
                s("phone"),
                xad("office_home_address"),
            ],
        ),
        segment(
            "PRA",
            vec![
                ce("primary_key_value"),
                ce("practitioner_group"),
                s("practitioner_category"),
                s("provider_billing"),
                ce("specialty"),
                cx("practitioner_id_numbers"),
                s("privileges"),
                date("date_entered_practice"),
            ],
        ),
        // Site-defined segments
        segment(
            "ZPS",
            vec![
                num("set_id"),
                s("facility_mnemonic"),
                s("facility_name"),
                xad("facility_address"),
                s("facility_phone"),
                xcn("facility_director"),
            ],
        ),
        segment(
            "ZBI",
            vec![
                num("set_id"),
                s("billing_info"),
                ce("billing_code"),
                num("billed_amount"),
            ],
        ),
    ]
}
