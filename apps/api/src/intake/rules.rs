//! Declarative field rules for the intake document.
//!
//! One table describes every field once. The same table drives both modes:
//! - `Mode::Draft` (every step save): all fields optional, formats checked on
//!   whatever is present, unknown keys dropped.
//! - `Mode::Submit` (final submission): fields marked `required` must be present.
//!
//! Conditional rules (insurance name, copay amount, benefit amounts, "Other"
//! status text) run afterwards over the coerced output, so they behave the same
//! in both modes: they fire only when their trigger fields are set.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_path: String,
    pub message: String,
}

impl FieldError {
    fn new(path: &[String], message: impl Into<String>) -> Self {
        FieldError {
            field_path: path.join("."),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Draft,
    Submit,
}

#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Text,
    /// Single character.
    Initial,
    /// At least two characters.
    State,
    Email,
    Zip,
    Phone,
    /// Non-negative amount, coerced from number or numeric string.
    Currency,
    Year,
    /// Non-negative whole number.
    Count,
    Flag,
    OneOf(&'static [&'static str]),
    Group(&'static [Field]),
    List {
        item: &'static [Field],
        max: usize,
    },
    Fixed {
        item: &'static [Field],
        len: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: Kind,
    /// Enforced in `Mode::Submit` only.
    pub required: bool,
}

const fn optional(name: &'static str, label: &'static str, kind: Kind) -> Field {
    Field {
        name,
        label,
        kind,
        required: false,
    }
}

const fn required(name: &'static str, label: &'static str, kind: Kind) -> Field {
    Field {
        name,
        label,
        kind,
        required: true,
    }
}

pub const LUPUS_TYPES: &[&str] = &["Discoid", "Systemic", "Both", "Unknown"];
pub const COVERAGE_TYPES: &[&str] = &["Medicaid", "Medicare", "Private", "None"];
pub const RX_COVERAGE: &[&str] = &["Yes", "No", "Copay"];
pub const EMPLOYMENT_STATUSES: &[&str] = &["Full-Time", "Part-Time", "Other", "Unemployed"];

const APPLICANT: &[Field] = &[
    required("firstName", "First name", Kind::Text),
    optional("middleInitial", "Middle initial", Kind::Initial),
    required("lastName", "Last name", Kind::Text),
    required("email", "Email", Kind::Email),
    required("dob", "Date of birth", Kind::Text),
    required("address1", "Address", Kind::Text),
    required("city", "City", Kind::Text),
    required("state", "State", Kind::State),
    required("zip", "ZIP code", Kind::Zip),
    required("county", "County", Kind::Text),
    optional("phoneHome", "Home phone", Kind::Phone),
    optional("phoneCell", "Cell phone", Kind::Phone),
];

const REQUEST: &[Field] = &[
    required("assistanceFor", "Assistance type", Kind::Text),
    required("approximateCost", "Approximate cost", Kind::Currency),
];

const MEDICAL_HISTORY: &[Field] = &[
    optional("diagnosisYear", "Diagnosis year", Kind::Year),
    optional("lupusType", "Lupus type", Kind::OneOf(LUPUS_TYPES)),
    optional("physicianName", "Physician name", Kind::Text),
    optional("physicianPhone", "Physician phone", Kind::Phone),
];

const MEDICAL_COVERAGE: &[Field] = &[
    required("hasInsurance", "Insurance status", Kind::Flag),
    optional("coverageType", "Coverage type", Kind::OneOf(COVERAGE_TYPES)),
    optional("privateInsuranceName", "Private insurance name", Kind::Text),
    optional("rxCoverage", "Prescription coverage", Kind::OneOf(RX_COVERAGE)),
    optional("copayAmount", "Copay amount", Kind::Currency),
];

const BENEFITS: &[Field] = &[
    optional("ssdi", "SSDI", Kind::Flag),
    optional("ssi", "SSI", Kind::Flag),
    optional("monthlyAmount", "Monthly amount", Kind::Currency),
];

const UNEMPLOYMENT: &[Field] = &[
    optional("receiving", "Receiving unemployment", Kind::Flag),
    optional("amount", "Unemployment amount", Kind::Currency),
];

const INCOME: &[Field] = &[
    optional("appliedDisability", "Applied for disability", Kind::Flag),
    optional("receives", "Benefits", Kind::Group(BENEFITS)),
    optional("currentlyEmployed", "Currently employed", Kind::Flag),
    optional("unemployment", "Unemployment", Kind::Group(UNEMPLOYMENT)),
    optional("otherIncome", "Other income", Kind::Text),
];

const EMPLOYMENT: &[Field] = &[
    optional("employerName", "Employer name", Kind::Text),
    optional("status", "Employment status", Kind::OneOf(EMPLOYMENT_STATUSES)),
    optional("otherStatusText", "Employment status description", Kind::Text),
    optional("grossIncome", "Gross income", Kind::Currency),
];

const SPOUSE: &[Field] = &[
    optional("name", "Spouse name", Kind::Text),
    optional("phone", "Spouse phone", Kind::Phone),
    optional("employerName", "Employer name", Kind::Text),
    optional("status", "Employment status", Kind::OneOf(EMPLOYMENT_STATUSES)),
    optional("otherStatusText", "Employment status description", Kind::Text),
    optional("grossTaxableIncome", "Gross taxable income", Kind::Currency),
];

const DEPENDENTS: &[Field] = &[
    optional("count", "Number of dependents", Kind::Count),
    optional("agesText", "Dependent ages", Kind::Text),
];

const RESOURCE: &[Field] = &[
    optional("nameOrAgency", "Name or agency", Kind::Text),
    optional("outcome", "Outcome", Kind::Text),
];

const VENDOR: &[Field] = &[
    optional("vendorName", "Vendor name", Kind::Text),
    optional("contactPerson", "Contact person", Kind::Text),
    optional("address", "Address", Kind::Text),
    optional("city", "City", Kind::Text),
    optional("state", "State", Kind::Text),
    optional("zip", "ZIP code", Kind::Text),
    optional("telephone", "Telephone", Kind::Phone),
    optional("fax", "Fax", Kind::Phone),
    optional("email", "Email", Kind::Text),
    optional("totalAmountOwed", "Total amount owed", Kind::Currency),
    optional("amountRequesting", "Amount requesting", Kind::Currency),
];

const CERTIFICATION: &[Field] = &[
    required("applicantSignatureTyped", "Signature", Kind::Text),
    required("dateSigned", "Date signed", Kind::Text),
];

pub const MAX_RESOURCES: usize = 4;
pub const VENDOR_SLOTS: usize = 3;

/// The whole application document, in form order.
pub const DOCUMENT: &[Field] = &[
    optional("guardianName", "Guardian name", Kind::Text),
    optional("applicant", "Applicant", Kind::Group(APPLICANT)),
    optional("request", "Request", Kind::Group(REQUEST)),
    optional("medicalHistory", "Medical history", Kind::Group(MEDICAL_HISTORY)),
    optional("medicalCoverage", "Medical coverage", Kind::Group(MEDICAL_COVERAGE)),
    optional("income", "Income", Kind::Group(INCOME)),
    optional("employmentApplicant", "Employment", Kind::Group(EMPLOYMENT)),
    optional("spouse", "Spouse", Kind::Group(SPOUSE)),
    optional("dependents", "Dependents", Kind::Group(DEPENDENTS)),
    optional("residencyGA", "Georgia residency", Kind::Flag),
    optional(
        "resourcesContacted",
        "Resources contacted",
        Kind::List {
            item: RESOURCE,
            max: MAX_RESOURCES,
        },
    ),
    required("natureOfRequest", "Nature of request", Kind::Text),
    required(
        "vendors",
        "Vendors",
        Kind::Fixed {
            item: VENDOR,
            len: VENDOR_SLOTS,
        },
    ),
    optional("certification", "Certification", Kind::Group(CERTIFICATION)),
];

/// Sections exposed for inline (single-section) validation.
pub const INLINE_SECTIONS: &[&str] = &["applicant", "medicalCoverage", "income"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zip pattern compiles"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-()]+$").expect("phone pattern compiles"));

const EARLIEST_DIAGNOSIS_YEAR: i64 = 1900;

/// Validates the given top-level sections of a step body leniently.
/// Returns the coerced partial document (only keys that were sent).
pub fn validate_draft(sections: &[&str], body: &Map<String, Value>) -> Result<Value, Vec<FieldError>> {
    let fields: Vec<Field> = DOCUMENT
        .iter()
        .filter(|field| sections.contains(&field.name))
        .copied()
        .collect();

    let mut errors = Vec::new();
    let coerced = check_fields(&fields, body, Mode::Draft, &mut Vec::new(), &mut errors);
    conditional_rules(&coerced, &mut errors);

    if errors.is_empty() {
        Ok(Value::Object(coerced))
    } else {
        Err(errors)
    }
}

/// Full-document validation applied at final submission.
pub fn validate_submission(document: &Map<String, Value>) -> Result<Value, Vec<FieldError>> {
    let mut errors = Vec::new();
    let coerced = check_fields(DOCUMENT, document, Mode::Submit, &mut Vec::new(), &mut errors);
    conditional_rules(&coerced, &mut errors);
    submission_rules(&coerced, &mut errors);

    if errors.is_empty() {
        Ok(Value::Object(coerced))
    } else {
        Err(errors)
    }
}

/// Inline validation of one section's contents. `None` for an unknown section.
pub fn validate_section(section: &str, contents: &Map<String, Value>) -> Option<Vec<FieldError>> {
    if !INLINE_SECTIONS.contains(&section) {
        return None;
    }
    let mut body = Map::new();
    body.insert(section.to_string(), Value::Object(contents.clone()));
    Some(validate_draft(&[section], &body).err().unwrap_or_default())
}

fn check_fields(
    fields: &[Field],
    input: &Map<String, Value>,
    mode: Mode,
    path: &mut Vec<String>,
    errors: &mut Vec<FieldError>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields {
        path.push(field.name.to_string());
        let value = input.get(field.name).filter(|v| !v.is_null());
        if let Some(coerced) = check_field(field, value, mode, path, errors) {
            out.insert(field.name.to_string(), coerced);
        }
        path.pop();
    }
    out
}

fn check_field(
    field: &Field,
    value: Option<&Value>,
    mode: Mode,
    path: &mut Vec<String>,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let enforce = mode == Mode::Submit && field.required;

    match field.kind {
        Kind::Group(children) => match value {
            Some(Value::Object(map)) => Some(Value::Object(check_fields(
                children, map, mode, path, errors,
            ))),
            Some(_) => {
                errors.push(FieldError::new(path, format!("{} must be an object", field.label)));
                None
            }
            // Missing sections are checked as empty so submit mode reports each
            // required leaf by its own path.
            None if mode == Mode::Submit => {
                let empty = Map::new();
                check_fields(children, &empty, mode, path, errors);
                None
            }
            None => None,
        },
        Kind::List { item, max } => {
            let items = list_items(field, value, enforce, path, errors)?;
            if items.len() > max {
                errors.push(FieldError::new(
                    path,
                    format!("At most {max} entries are allowed"),
                ));
                return None;
            }
            Some(check_items(item, items, mode, path, errors))
        }
        Kind::Fixed { item, len } => {
            let items = list_items(field, value, enforce, path, errors)?;
            if items.len() != len {
                errors.push(FieldError::new(
                    path,
                    format!("Exactly {len} entries are required"),
                ));
                return None;
            }
            Some(check_items(item, items, mode, path, errors))
        }
        _ => {
            let Some(value) = value else {
                if enforce {
                    errors.push(required_error(field, path));
                }
                return None;
            };
            match coerce_scalar(field, value) {
                Ok(Scalar::Value(coerced)) => Some(coerced),
                Ok(Scalar::Blank(original)) => {
                    if enforce {
                        errors.push(required_error(field, path));
                        None
                    } else if matches!(field.kind, Kind::Flag) {
                        None
                    } else {
                        Some(original)
                    }
                }
                Err(message) => {
                    errors.push(FieldError::new(path, message));
                    None
                }
            }
        }
    }
}

fn list_items<'a>(
    field: &Field,
    value: Option<&'a Value>,
    enforce: bool,
    path: &[String],
    errors: &mut Vec<FieldError>,
) -> Option<&'a Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            errors.push(FieldError::new(path, format!("{} must be a list", field.label)));
            None
        }
        None => {
            if enforce {
                errors.push(required_error(field, path));
            }
            None
        }
    }
}

fn check_items(
    item: &'static [Field],
    items: &[Value],
    mode: Mode,
    path: &mut Vec<String>,
    errors: &mut Vec<FieldError>,
) -> Value {
    let mut out = Vec::with_capacity(items.len());
    for (index, entry) in items.iter().enumerate() {
        path.push(index.to_string());
        match entry {
            Value::Object(map) => {
                out.push(Value::Object(check_fields(item, map, mode, path, errors)));
            }
            _ => errors.push(FieldError::new(path, "Each entry must be an object")),
        }
        path.pop();
    }
    Value::Array(out)
}

fn required_error(field: &Field, path: &[String]) -> FieldError {
    FieldError::new(path, format!("{} is required", field.label))
}

enum Scalar {
    Value(Value),
    /// Empty or whitespace-only string; kept verbatim on optional fields.
    Blank(Value),
}

fn coerce_scalar(field: &Field, value: &Value) -> Result<Scalar, String> {
    if let Value::String(s) = value {
        if s.trim().is_empty() {
            return Ok(Scalar::Blank(value.clone()));
        }
    }

    let coerced = match field.kind {
        Kind::Text => Value::String(text(field, value)?.to_string()),
        Kind::Initial => {
            let s = text(field, value)?;
            if s.chars().count() > 1 {
                return Err(format!("{} must be a single character", field.label));
            }
            value.clone()
        }
        Kind::State => {
            if text(field, value)?.trim().chars().count() < 2 {
                return Err(format!("{} is required", field.label));
            }
            value.clone()
        }
        Kind::Email => pattern(field, value, &EMAIL_RE, "Invalid email address")?,
        Kind::Zip => pattern(field, value, &ZIP_RE, "Invalid ZIP code")?,
        Kind::Phone => pattern(field, value, &PHONE_RE, "Invalid phone number")?,
        Kind::Currency => currency(field, value)?,
        Kind::Year => year(field, value)?,
        Kind::Count => count(field, value)?,
        Kind::Flag => flag(field, value)?,
        Kind::OneOf(choices) => {
            let s = text(field, value)?;
            if !choices.contains(&s) {
                return Err(format!(
                    "{} must be one of: {}",
                    field.label,
                    choices.join(", ")
                ));
            }
            value.clone()
        }
        Kind::Group(_) | Kind::List { .. } | Kind::Fixed { .. } => value.clone(),
    };
    Ok(Scalar::Value(coerced))
}

fn text<'a>(field: &Field, value: &'a Value) -> Result<&'a str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("{} must be text", field.label))
}

fn pattern(field: &Field, value: &Value, re: &Regex, message: &str) -> Result<Value, String> {
    let s = text(field, value)?;
    if re.is_match(s.trim()) {
        Ok(Value::String(s.trim().to_string()))
    } else {
        Err(message.to_string())
    }
}

/// Parses a number or numeric string. Integral strings stay integers so `"0"`
/// and `0` coerce to the same JSON value.
fn numeric(value: &Value) -> Option<Number> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<u64>() {
                return Some(Number::from(n));
            }
            if let Ok(n) = s.parse::<i64>() {
                return Some(Number::from(n));
            }
            s.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    }
}

fn currency(field: &Field, value: &Value) -> Result<Value, String> {
    let number = numeric(value).ok_or_else(|| format!("{} must be a number", field.label))?;
    match number.as_f64() {
        Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(Value::Number(number)),
        Some(amount) if amount.is_finite() => {
            Err(format!("{} cannot be negative", field.label))
        }
        _ => Err(format!("{} must be a number", field.label)),
    }
}

fn whole_number(field: &Field, value: &Value) -> Result<i64, String> {
    let number = numeric(value).ok_or_else(|| format!("{} must be a whole number", field.label))?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        _ => Err(format!("{} must be a whole number", field.label)),
    }
}

fn year(field: &Field, value: &Value) -> Result<Value, String> {
    let year = whole_number(field, value)?;
    let current = i64::from(Utc::now().year());
    if !(EARLIEST_DIAGNOSIS_YEAR..=current).contains(&year) {
        return Err(format!(
            "{} must be between {EARLIEST_DIAGNOSIS_YEAR} and {current}",
            field.label
        ));
    }
    Ok(Value::from(year))
}

fn count(field: &Field, value: &Value) -> Result<Value, String> {
    let n = whole_number(field, value)?;
    if n < 0 {
        return Err(format!("{} cannot be negative", field.label));
    }
    Ok(Value::from(n))
}

fn flag(field: &Field, value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "on" => Ok(Value::Bool(true)),
            "false" | "off" => Ok(Value::Bool(false)),
            _ => Err(format!("{} must be true or false", field.label)),
        },
        _ => Err(format!("{} must be true or false", field.label)),
    }
}

fn lookup<'a>(doc: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = doc.get(*first)?;
    for key in rest {
        current = match current {
            Value::Object(map) => map.get(*key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn is_true(doc: &Map<String, Value>, path: &[&str]) -> bool {
    matches!(lookup(doc, path), Some(Value::Bool(true)))
}

fn equals(doc: &Map<String, Value>, path: &[&str], expected: &str) -> bool {
    lookup(doc, path).and_then(Value::as_str) == Some(expected)
}

/// Present means set to something other than null or a blank string. Zero counts.
fn is_present(doc: &Map<String, Value>, path: &[&str]) -> bool {
    match lookup(doc, path) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn require(
    doc: &Map<String, Value>,
    path: &[&str],
    message: &str,
    errors: &mut Vec<FieldError>,
) {
    if !is_present(doc, path) {
        errors.push(FieldError {
            field_path: path.join("."),
            message: message.to_string(),
        });
    }
}

fn conditional_rules(doc: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    if is_true(doc, &["medicalCoverage", "hasInsurance"])
        && equals(doc, &["medicalCoverage", "coverageType"], "Private")
    {
        require(
            doc,
            &["medicalCoverage", "privateInsuranceName"],
            "Private insurance name is required",
            errors,
        );
    }
    if equals(doc, &["medicalCoverage", "rxCoverage"], "Copay") {
        require(
            doc,
            &["medicalCoverage", "copayAmount"],
            "Copay amount is required",
            errors,
        );
    }

    if is_true(doc, &["income", "receives", "ssdi"])
        || is_true(doc, &["income", "receives", "ssi"])
    {
        require(
            doc,
            &["income", "receives", "monthlyAmount"],
            "Monthly amount is required",
            errors,
        );
    }
    if is_true(doc, &["income", "unemployment", "receiving"]) {
        require(
            doc,
            &["income", "unemployment", "amount"],
            "Unemployment amount is required",
            errors,
        );
    }

    for section in ["employmentApplicant", "spouse"] {
        if equals(doc, &[section, "status"], "Other") {
            require(
                doc,
                &[section, "otherStatusText"],
                "Please describe the employment status",
                errors,
            );
        }
    }
}

fn submission_rules(doc: &Map<String, Value>, errors: &mut Vec<FieldError>) {
    require(doc, &["vendors", "0", "vendorName"], "Vendor 1 name is required", errors);
    require(
        doc,
        &["vendors", "0", "amountRequesting"],
        "Vendor 1 amount requesting is required",
        errors,
    );
    if !is_true(doc, &["residencyGA"]) {
        errors.push(FieldError {
            field_path: "residencyGA".to_string(),
            message: "Georgia residency is required".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::intake::fixtures::valid_document;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test body is an object")
    }

    fn submit_errors(doc: Value) -> Vec<String> {
        match validate_submission(&obj(doc)) {
            Ok(_) => vec![],
            Err(errors) => errors.into_iter().map(|e| e.field_path).collect(),
        }
    }

    fn draft_errors(sections: &[&str], body: Value) -> Vec<String> {
        match validate_draft(sections, &obj(body)) {
            Ok(_) => vec![],
            Err(errors) => errors.into_iter().map(|e| e.field_path).collect(),
        }
    }

    fn remove(doc: &mut Value, section: &str, key: &str) {
        doc[section].as_object_mut().unwrap().remove(key);
    }

    #[test]
    fn test_valid_document_passes_submission() {
        assert_eq!(submit_errors(valid_document()), Vec::<String>::new());
    }

    #[test]
    fn test_missing_signature_fails_submission() {
        let mut doc = valid_document();
        remove(&mut doc, "certification", "applicantSignatureTyped");
        assert_eq!(
            submit_errors(doc),
            vec!["certification.applicantSignatureTyped"]
        );
    }

    #[test]
    fn test_missing_certification_reports_both_fields() {
        let mut doc = valid_document();
        doc.as_object_mut().unwrap().remove("certification");
        let errors = submit_errors(doc);
        assert!(errors.contains(&"certification.applicantSignatureTyped".to_string()));
        assert!(errors.contains(&"certification.dateSigned".to_string()));
    }

    #[test]
    fn test_residency_must_be_true() {
        let mut doc = valid_document();
        doc["residencyGA"] = json!(false);
        assert_eq!(submit_errors(doc), vec!["residencyGA"]);
    }

    #[test]
    fn test_private_insurance_requires_name() {
        let mut doc = valid_document();
        doc["medicalCoverage"] = json!({ "hasInsurance": true, "coverageType": "Private" });
        assert_eq!(
            submit_errors(doc.clone()),
            vec!["medicalCoverage.privateInsuranceName"]
        );

        doc["medicalCoverage"]["privateInsuranceName"] = json!("Blue Cross");
        assert_eq!(submit_errors(doc), Vec::<String>::new());
    }

    #[test]
    fn test_private_coverage_without_insurance_needs_no_name() {
        let mut doc = valid_document();
        doc["medicalCoverage"] = json!({ "hasInsurance": false, "coverageType": "Private" });
        assert_eq!(submit_errors(doc), Vec::<String>::new());
    }

    #[test]
    fn test_copay_requires_amount_and_zero_counts() {
        let mut doc = valid_document();
        doc["medicalCoverage"]["rxCoverage"] = json!("Copay");
        assert_eq!(
            submit_errors(doc.clone()),
            vec!["medicalCoverage.copayAmount"]
        );

        doc["medicalCoverage"]["copayAmount"] = json!(0);
        assert_eq!(submit_errors(doc), Vec::<String>::new());
    }

    #[test]
    fn test_ssdi_requires_monthly_amount_and_zero_counts() {
        let mut doc = valid_document();
        doc["income"]["receives"] = json!({ "ssdi": true });
        assert_eq!(
            submit_errors(doc.clone()),
            vec!["income.receives.monthlyAmount"]
        );

        doc["income"]["receives"]["monthlyAmount"] = json!(0);
        assert_eq!(submit_errors(doc), Vec::<String>::new());
    }

    #[test]
    fn test_ssi_also_requires_monthly_amount() {
        let mut doc = valid_document();
        doc["income"]["receives"] = json!({ "ssi": true, "monthlyAmount": "" });
        assert_eq!(submit_errors(doc), vec!["income.receives.monthlyAmount"]);
    }

    #[test]
    fn test_unemployment_requires_amount() {
        let mut doc = valid_document();
        doc["income"]["unemployment"] = json!({ "receiving": true });
        assert_eq!(submit_errors(doc), vec!["income.unemployment.amount"]);
    }

    #[test]
    fn test_other_employment_status_requires_description() {
        let mut doc = valid_document();
        doc["spouse"] = json!({ "status": "Other" });
        assert_eq!(submit_errors(doc), vec!["spouse.otherStatusText"]);
    }

    #[test]
    fn test_first_vendor_name_and_amount_required() {
        let mut doc = valid_document();
        doc["vendors"][0] = json!({});
        let errors = submit_errors(doc);
        assert_eq!(
            errors,
            vec!["vendors.0.vendorName", "vendors.0.amountRequesting"]
        );
    }

    #[test]
    fn test_vendor_list_must_have_three_slots() {
        let mut doc = valid_document();
        doc["vendors"].as_array_mut().unwrap().pop();
        assert!(submit_errors(doc).contains(&"vendors".to_string()));
    }

    #[test]
    fn test_missing_applicant_reports_each_required_field() {
        let mut doc = valid_document();
        doc.as_object_mut().unwrap().remove("applicant");
        let errors = submit_errors(doc);
        for field in ["firstName", "lastName", "email", "dob", "zip", "county"] {
            assert!(
                errors.contains(&format!("applicant.{field}")),
                "missing {field} in {errors:?}"
            );
        }
        assert!(!errors.contains(&"applicant.phoneHome".to_string()));
    }

    #[test]
    fn test_blank_required_text_fails_submission() {
        let mut doc = valid_document();
        doc["natureOfRequest"] = json!("   ");
        assert_eq!(submit_errors(doc), vec!["natureOfRequest"]);
    }

    #[test]
    fn test_required_messages_use_labels() {
        let mut doc = valid_document();
        remove(&mut doc, "applicant", "firstName");
        let errors = validate_submission(&obj(doc)).unwrap_err();
        assert_eq!(errors[0].message, "First name is required");
    }

    #[test]
    fn test_zip_formats() {
        for zip in ["30301", "30301-1234"] {
            let body = json!({ "applicant": { "zip": zip } });
            assert!(draft_errors(&["applicant"], body).is_empty(), "{zip}");
        }
        for zip in ["123", "303011", "30301-12", "ABCDE"] {
            let body = json!({ "applicant": { "zip": zip } });
            assert_eq!(draft_errors(&["applicant"], body), vec!["applicant.zip"], "{zip}");
        }
    }

    #[test]
    fn test_email_formats() {
        let ok = json!({ "applicant": { "email": "john.doe+fund@example.co" } });
        assert!(draft_errors(&["applicant"], ok).is_empty());
        for bad in ["invalid-email", "a@b", "@example.com", "a..b@example.com"] {
            let body = json!({ "applicant": { "email": bad } });
            assert_eq!(draft_errors(&["applicant"], body), vec!["applicant.email"], "{bad}");
        }
    }

    #[test]
    fn test_phone_and_initial_formats() {
        let body = json!({ "applicant": { "phoneHome": "(404) 555-0100", "middleInitial": "D" } });
        assert!(draft_errors(&["applicant"], body).is_empty());

        let body = json!({ "applicant": { "phoneCell": "call me", "middleInitial": "DJ" } });
        assert_eq!(
            draft_errors(&["applicant"], body),
            vec!["applicant.middleInitial", "applicant.phoneCell"]
        );
    }

    #[test]
    fn test_draft_allows_empty_optional_strings() {
        let body = json!({
            "applicant": { "middleInitial": "", "phoneHome": "", "email": "", "zip": "" }
        });
        let coerced = validate_draft(&["applicant"], &obj(body)).unwrap();
        assert_eq!(coerced["applicant"]["email"], json!(""));
        assert_eq!(coerced["applicant"]["zip"], json!(""));
    }

    #[test]
    fn test_currency_coerces_strings_and_rejects_negatives() {
        let body = json!({ "request": { "approximateCost": " 1250.50 " } });
        let coerced = validate_draft(&["request"], &obj(body)).unwrap();
        assert_eq!(coerced["request"]["approximateCost"], json!(1250.5));

        let body = json!({ "request": { "approximateCost": "0" } });
        let coerced = validate_draft(&["request"], &obj(body)).unwrap();
        assert_eq!(coerced["request"]["approximateCost"], json!(0));

        let body = json!({ "request": { "approximateCost": -5 } });
        assert_eq!(
            draft_errors(&["request"], body),
            vec!["request.approximateCost"]
        );

        let body = json!({ "request": { "approximateCost": "lots" } });
        assert_eq!(
            draft_errors(&["request"], body),
            vec!["request.approximateCost"]
        );
    }

    #[test]
    fn test_year_bounds() {
        let current = Utc::now().year();
        let body = json!({ "medicalHistory": { "diagnosisYear": current.to_string() } });
        let coerced = validate_draft(&["medicalHistory"], &obj(body)).unwrap();
        assert_eq!(coerced["medicalHistory"]["diagnosisYear"], json!(current));

        for bad in [json!(1899), json!(current + 1), json!("2001.5")] {
            let body = json!({ "medicalHistory": { "diagnosisYear": bad } });
            assert_eq!(
                draft_errors(&["medicalHistory"], body),
                vec!["medicalHistory.diagnosisYear"]
            );
        }
    }

    #[test]
    fn test_choice_fields_reject_unknown_values() {
        let body = json!({ "medicalHistory": { "lupusType": "Chronic" } });
        let errors = validate_draft(&["medicalHistory"], &obj(body)).unwrap_err();
        assert_eq!(errors[0].field_path, "medicalHistory.lupusType");
        assert!(errors[0].message.contains("Discoid"));
    }

    #[test]
    fn test_flags_accept_form_strings() {
        let body = json!({ "residencyGA": "on", "dependents": { "count": "2" } });
        let coerced = validate_draft(&["residencyGA", "dependents"], &obj(body)).unwrap();
        assert_eq!(coerced["residencyGA"], json!(true));
        assert_eq!(coerced["dependents"]["count"], json!(2));

        let body = json!({ "residencyGA": "maybe" });
        assert_eq!(draft_errors(&["residencyGA"], body), vec!["residencyGA"]);
    }

    #[test]
    fn test_draft_drops_unknown_keys_and_other_sections() {
        let body = json!({
            "applicant": { "firstName": "Ada", "favouriteColour": "green" },
            "natureOfRequest": "not part of step one",
            "isAdmin": true
        });
        let coerced = validate_draft(&["guardianName", "applicant", "request"], &obj(body)).unwrap();
        assert_eq!(coerced, json!({ "applicant": { "firstName": "Ada" } }));
    }

    #[test]
    fn test_draft_drops_nulls() {
        let body = json!({ "applicant": { "firstName": null, "lastName": "Doe" } });
        let coerced = validate_draft(&["applicant"], &obj(body)).unwrap();
        assert_eq!(coerced, json!({ "applicant": { "lastName": "Doe" } }));
    }

    #[test]
    fn test_draft_applies_conditional_rules_when_triggered() {
        let body = json!({ "medicalCoverage": { "hasInsurance": true, "coverageType": "Private" } });
        assert_eq!(
            draft_errors(&["medicalHistory", "medicalCoverage"], body),
            vec!["medicalCoverage.privateInsuranceName"]
        );

        let body = json!({ "medicalCoverage": { "coverageType": "Medicare" } });
        assert!(draft_errors(&["medicalHistory", "medicalCoverage"], body).is_empty());
    }

    #[test]
    fn test_draft_does_not_require_anything() {
        assert!(draft_errors(&["certification"], json!({ "certification": {} })).is_empty());
        assert!(draft_errors(&["natureOfRequest", "vendors"], json!({})).is_empty());
    }

    #[test]
    fn test_resources_limited_to_four() {
        let five: Vec<Value> = (0..5)
            .map(|i| json!({ "nameOrAgency": format!("Agency {i}") }))
            .collect();
        let body = json!({ "resourcesContacted": five });
        assert_eq!(
            draft_errors(&["resourcesContacted"], body),
            vec!["resourcesContacted"]
        );
    }

    #[test]
    fn test_list_entries_report_indexed_paths() {
        let body = json!({
            "vendors": [
                {},
                { "amountRequesting": "-1" },
                { "telephone": "nope" }
            ]
        });
        assert_eq!(
            draft_errors(&["vendors"], body),
            vec!["vendors.1.amountRequesting", "vendors.2.telephone"]
        );
    }

    #[test]
    fn test_wrong_shapes_are_reported() {
        let body = json!({ "applicant": "Ada", "vendors": {} });
        assert_eq!(
            draft_errors(&["applicant", "vendors"], body),
            vec!["applicant", "vendors"]
        );
    }

    #[test]
    fn test_inline_section_validation() {
        let errors = validate_section("applicant", &obj(json!({ "zip": "12" }))).unwrap();
        assert_eq!(errors[0].field_path, "applicant.zip");

        let errors = validate_section("income", &obj(json!({ "receives": { "ssdi": true } }))).unwrap();
        assert_eq!(errors[0].field_path, "income.receives.monthlyAmount");

        assert_eq!(
            validate_section("medicalCoverage", &obj(json!({ "hasInsurance": false }))),
            Some(vec![])
        );
        assert!(validate_section("vendors", &Map::new()).is_none());
    }
}
