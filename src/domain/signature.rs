use super::company::default_version;
use crate::constants::{REFERENCE_TYPE_COMPANY, REFERENCE_TYPE_USER};
use crate::types::parse_or_now;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signature_id: String,
    pub signature_project_id: String,
    pub signature_reference_id: String,
    #[serde(default)]
    pub signature_reference_name: String,
    pub signature_reference_type: String,
    #[serde(default = "default_signature_type")]
    pub signature_type: String,
    #[serde(default)]
    pub signature_signed: bool,
    #[serde(default)]
    pub signature_approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_user_ccla_company_id: Option<String>,
    #[serde(default)]
    pub signature_acl: Vec<String>,
    #[serde(default)]
    pub signature_document_major_version: i64,
    #[serde(default)]
    pub signature_document_minor_version: i64,
    #[serde(default)]
    pub email_whitelist: Vec<String>,
    #[serde(default)]
    pub domain_whitelist: Vec<String>,
    #[serde(default)]
    pub github_whitelist: Vec<String>,
    #[serde(default)]
    pub github_org_whitelist: Vec<String>,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_signature_type() -> String {
    "cla".to_string()
}

impl SignatureRecord {
    /// Signed and approved signatures are the only ones that count
    pub fn is_effective(&self) -> bool {
        self.signature_signed && self.signature_approved
    }

    /// Corporate CLA signed on behalf of a company
    pub fn is_ccla(&self) -> bool {
        self.signature_reference_type == REFERENCE_TYPE_COMPANY
    }

    /// Individual CLA signed by a user with no company affiliation
    pub fn is_icla(&self) -> bool {
        self.signature_reference_type == REFERENCE_TYPE_USER
            && self.signature_user_ccla_company_id.is_none()
    }

    /// Employee acknowledgement signed by a user under a company's CCLA
    pub fn is_employee(&self) -> bool {
        self.signature_reference_type == REFERENCE_TYPE_USER
            && self.signature_user_ccla_company_id.is_some()
    }

    pub fn to_model(&self) -> Signature {
        Signature {
            signature_id: self.signature_id.clone(),
            project_id: self.signature_project_id.clone(),
            signature_reference_id: self.signature_reference_id.clone(),
            signature_reference_name: self.signature_reference_name.clone(),
            signature_reference_type: self.signature_reference_type.clone(),
            signature_type: self.signature_type.clone(),
            signature_signed: self.signature_signed,
            signature_approved: self.signature_approved,
            signature_user_ccla_company_id: self
                .signature_user_ccla_company_id
                .clone()
                .unwrap_or_default(),
            signature_acl: self.signature_acl.clone(),
            signature_major_version: self.signature_document_major_version,
            signature_minor_version: self.signature_document_minor_version,
            email_approval_list: self.email_whitelist.clone(),
            domain_approval_list: self.domain_whitelist.clone(),
            github_username_approval_list: self.github_whitelist.clone(),
            github_org_approval_list: self.github_org_whitelist.clone(),
            signature_created: parse_or_now(&self.date_created, "date_created", &self.signature_id),
            signature_modified: parse_or_now(
                &self.date_modified,
                "date_modified",
                &self.signature_id,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    #[serde(rename = "signatureID")]
    pub signature_id: String,
    #[serde(rename = "projectID")]
    pub project_id: String,
    #[serde(rename = "signatureReferenceID")]
    pub signature_reference_id: String,
    #[serde(rename = "signatureReferenceName")]
    pub signature_reference_name: String,
    #[serde(rename = "signatureReferenceType")]
    pub signature_reference_type: String,
    #[serde(rename = "signatureType")]
    pub signature_type: String,
    #[serde(rename = "signatureSigned")]
    pub signature_signed: bool,
    #[serde(rename = "signatureApproved")]
    pub signature_approved: bool,
    #[serde(rename = "signatureUserCompanyID")]
    pub signature_user_ccla_company_id: String,
    #[serde(rename = "signatureACL")]
    pub signature_acl: Vec<String>,
    #[serde(rename = "signatureMajorVersion")]
    pub signature_major_version: i64,
    #[serde(rename = "signatureMinorVersion")]
    pub signature_minor_version: i64,
    #[serde(rename = "emailApprovalList")]
    pub email_approval_list: Vec<String>,
    #[serde(rename = "domainApprovalList")]
    pub domain_approval_list: Vec<String>,
    #[serde(rename = "githubUsernameApprovalList")]
    pub github_username_approval_list: Vec<String>,
    #[serde(rename = "githubOrgApprovalList")]
    pub github_org_approval_list: Vec<String>,
    #[serde(rename = "signatureCreated")]
    pub signature_created: DateTime<Utc>,
    #[serde(rename = "signatureModified")]
    pub signature_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signatures {
    pub result_count: i64,
    pub total_count: i64,
    pub last_key_scanned: String,
    pub signatures: Vec<Signature>,
}

/// Additions and removals applied to a signature's approval lists
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalListUpdate {
    #[serde(default)]
    pub add_email_approval_list: Vec<String>,
    #[serde(default)]
    pub remove_email_approval_list: Vec<String>,
    #[serde(default)]
    pub add_domain_approval_list: Vec<String>,
    #[serde(default)]
    pub remove_domain_approval_list: Vec<String>,
    #[serde(default)]
    pub add_github_username_approval_list: Vec<String>,
    #[serde(default)]
    pub remove_github_username_approval_list: Vec<String>,
    #[serde(default)]
    pub add_github_org_approval_list: Vec<String>,
    #[serde(default)]
    pub remove_github_org_approval_list: Vec<String>,
}

impl ApprovalListUpdate {
    pub fn is_empty(&self) -> bool {
        self.add_email_approval_list.is_empty()
            && self.remove_email_approval_list.is_empty()
            && self.add_domain_approval_list.is_empty()
            && self.remove_domain_approval_list.is_empty()
            && self.add_github_username_approval_list.is_empty()
            && self.remove_github_username_approval_list.is_empty()
            && self.add_github_org_approval_list.is_empty()
            && self.remove_github_org_approval_list.is_empty()
    }
}

/// Apply additions then removals, keeping first-seen order and dropping duplicates
pub fn merge_list(current: &[String], add: &[String], remove: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(current.len() + add.len());
    for value in current.iter().chain(add.iter()) {
        let value = value.trim();
        if value.is_empty() || out.iter().any(|v| v == value) {
            continue;
        }
        if remove.iter().any(|r| r.trim() == value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_list() {
        let merged = merge_list(
            &strings(&["a@x.org", "b@x.org"]),
            &strings(&["c@x.org", "a@x.org", " "]),
            &strings(&["b@x.org"]),
        );
        assert_eq!(merged, strings(&["a@x.org", "c@x.org"]));
    }

    #[test]
    fn test_signature_kinds() {
        let mut sig: SignatureRecord = serde_json::from_value(serde_json::json!({
            "signature_id": "s1",
            "signature_project_id": "p1",
            "signature_reference_id": "u1",
            "signature_reference_type": "user",
            "signature_signed": true,
            "signature_approved": true,
        }))
        .unwrap();
        assert!(sig.is_icla());
        assert!(!sig.is_employee());
        assert!(sig.is_effective());
        assert_eq!(sig.signature_type, "cla");

        sig.signature_user_ccla_company_id = Some("c1".into());
        assert!(sig.is_employee());
        assert!(!sig.is_icla());
    }
}
