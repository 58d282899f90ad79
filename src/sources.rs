use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::errors::SetupError;

pub const GITHUB_DOTCOM_HOST: &str = "github.com";

/// Reads the target GitHub host from a file, trimming whitespace and a
/// leading `api.` prefix. Anything other than `github.com` is treated as a
/// GitHub Enterprise Server host by the caller.
pub fn load_github_host(path: impl AsRef<Path>) -> Result<String, SetupError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SetupError::InputValidation(format!("failed to read {}: {e}", path.display()))
    })?;

    let trimmed = raw.trim();
    let host = trimmed.strip_prefix("api.").unwrap_or(trimmed);
    if host.is_empty() {
        return Err(SetupError::InputValidation(format!(
            "{} does not name a GitHub host",
            path.display()
        )));
    }
    Ok(host.to_string())
}

#[derive(Debug, Deserialize)]
struct Membership {
    role: String,
    state: String,
    organization: MembershipOrg,
}

#[derive(Debug, Deserialize)]
struct MembershipOrg {
    id: u64,
    login: String,
}

/// Parses an organization membership dump (the `gh api user/memberships/orgs`
/// shape) and keeps only active admin memberships, since only an org admin
/// can install the app. Returns login -> numeric org id.
pub fn load_organizations(path: impl AsRef<Path>) -> Result<BTreeMap<String, u64>, SetupError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        SetupError::InputValidation(format!("failed to read {}: {e}", path.display()))
    })?;

    let memberships: Vec<Membership> = serde_json::from_str(&raw).map_err(|e| {
        SetupError::InputValidation(format!("failed to parse {}: {e}", path.display()))
    })?;

    Ok(memberships
        .into_iter()
        .filter(|m| m.role == "admin" && m.state == "active")
        .map(|m| (m.organization.login, m.organization.id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn host_is_trimmed_and_api_prefix_stripped() {
        let file = file_with("  api.github.com\n");
        assert_eq!(load_github_host(file.path()).unwrap(), "github.com");
    }

    #[test]
    fn plain_enterprise_host_passes_through() {
        let file = file_with("github.example.com\n");
        assert_eq!(load_github_host(file.path()).unwrap(), "github.example.com");
    }

    #[test]
    fn empty_host_file_is_rejected() {
        let file = file_with("   \n");
        assert!(matches!(
            load_github_host(file.path()),
            Err(SetupError::InputValidation(_))
        ));
    }

    #[test]
    fn organizations_keep_only_active_admin_memberships() {
        let file = file_with(
            r#"[
                {"role": "admin", "state": "active", "organization": {"id": 77, "login": "acme"}},
                {"role": "member", "state": "active", "organization": {"id": 78, "login": "passenger"}},
                {"role": "admin", "state": "pending", "organization": {"id": 79, "login": "not-yet"}}
            ]"#,
        );
        let orgs = load_organizations(file.path()).unwrap();
        assert_eq!(orgs, BTreeMap::from([("acme".to_string(), 77)]));
    }

    #[test]
    fn unparsable_membership_dump_is_rejected() {
        let file = file_with("not json");
        assert!(matches!(
            load_organizations(file.path()),
            Err(SetupError::InputValidation(_))
        ));
    }
}
