use serde_json::{json, Value};

/// A complete document that passes submission validation.
pub fn valid_document() -> Value {
    json!({
        "guardianName": "",
        "applicant": {
            "firstName": "Jane",
            "middleInitial": "Q",
            "lastName": "Smith",
            "email": "jane@example.com",
            "dob": "1990-05-15",
            "address1": "456 Oak Ave",
            "city": "Savannah",
            "state": "GA",
            "zip": "31401",
            "county": "Chatham",
            "phoneHome": "",
            "phoneCell": "912-555-0101"
        },
        "request": {
            "assistanceFor": "Prescription costs",
            "approximateCost": 450
        },
        "medicalHistory": {
            "diagnosisYear": 2015,
            "lupusType": "Systemic",
            "physicianName": "Dr. Rivera",
            "physicianPhone": "(404) 555-0199"
        },
        "medicalCoverage": {
            "hasInsurance": true,
            "coverageType": "Medicare",
            "rxCoverage": "Yes"
        },
        "income": {
            "appliedDisability": true,
            "receives": { "ssdi": false, "ssi": false },
            "currentlyEmployed": false,
            "unemployment": { "receiving": false },
            "otherIncome": ""
        },
        "employmentApplicant": {
            "status": "Unemployed"
        },
        "spouse": {},
        "dependents": { "count": 1, "agesText": "12" },
        "residencyGA": true,
        "resourcesContacted": [
            { "nameOrAgency": "County DFCS", "outcome": "Waitlisted" }
        ],
        "natureOfRequest": "Help covering two months of medication.",
        "vendors": [
            { "vendorName": "Savannah Pharmacy", "amountRequesting": 300 },
            {},
            {}
        ],
        "certification": {
            "applicantSignatureTyped": "Jane Q Smith",
            "dateSigned": "2026-10-01"
        }
    })
}
