use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const APP_HOMEPAGE: &str =
    "https://github.com/actions-runner-controller/actions-runner-controller";
pub const APP_DESCRIPTION: &str = "Autocreated Actions Runner Controller Application";

/// Webhook events the provisioned app subscribes to.
pub const DEFAULT_EVENTS: [&str; 2] = ["workflow_job", "check_run"];

/// Permissions the provisioned app requests on the target organization.
pub fn default_permissions() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "organization_self_hosted_runners".to_string(),
            "write".to_string(),
        ),
        ("actions".to_string(), "read".to_string()),
        ("checks".to_string(), "read".to_string()),
    ])
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookAttributes {
    pub url: String,
    pub active: bool,
}

/// GitHub App manifest, serialized exactly as GitHub's manifest flow expects.
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppManifest {
    pub name: String,
    pub url: String,
    pub hook_attributes: HookAttributes,
    pub redirect_url: String,
    pub callback_urls: Vec<String>,
    pub description: String,
    pub public: bool,
    pub default_events: Vec<String>,
    pub default_permissions: BTreeMap<String, String>,
}

/// Body of the relay `/start` request: the manifest plus the descriptor of
/// where the app should be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub target_type: String,
    pub target_slug: String,
    pub host: String,
    pub manifest: AppManifest,
}

pub fn build_manifest(app_name: &str, webhook_url: &str) -> AppManifest {
    AppManifest {
        name: app_name.to_string(),
        url: APP_HOMEPAGE.to_string(),
        hook_attributes: HookAttributes {
            url: webhook_url.to_string(),
            active: true,
        },
        redirect_url: String::new(),
        callback_urls: Vec::new(),
        description: APP_DESCRIPTION.to_string(),
        public: false,
        default_events: DEFAULT_EVENTS.iter().map(|e| e.to_string()).collect(),
        default_permissions: default_permissions(),
    }
}

pub fn build_session_payload(
    app_name: &str,
    organization: &str,
    github_host: &str,
    webhook_url: &str,
) -> SessionPayload {
    SessionPayload {
        target_type: "org".to_string(),
        target_slug: organization.to_string(),
        host: github_host.to_string(),
        manifest: build_manifest(app_name, webhook_url),
    }
}

/// App names must be unique per run; a random 8-byte hex suffix avoids
/// collisions with apps left behind by earlier runs.
pub fn random_app_name(prefix: &str) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..8).map(|_| format!("{:02x}", rng.random::<u8>())).collect();
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_manifest_is_deterministic() {
        let a = build_manifest("arc-setup-abc123", "https://example.test/webhook");
        let b = build_manifest("arc-setup-abc123", "https://example.test/webhook");
        assert_eq!(a, b);
    }

    #[test]
    fn manifest_carries_fixed_defaults() {
        let manifest = build_manifest("arc-setup-abc123", "https://example.test/webhook");

        assert_eq!(manifest.default_events, vec!["workflow_job", "check_run"]);
        assert_eq!(
            manifest.default_permissions.get("organization_self_hosted_runners"),
            Some(&"write".to_string())
        );
        assert_eq!(
            manifest.default_permissions.get("actions"),
            Some(&"read".to_string())
        );
        assert_eq!(
            manifest.default_permissions.get("checks"),
            Some(&"read".to_string())
        );
        assert_eq!(manifest.default_permissions.len(), 3);
        assert!(!manifest.public);
        assert!(manifest.hook_attributes.active);
    }

    #[test]
    fn session_payload_serializes_to_wire_format() {
        let payload =
            build_session_payload("arc-setup-abc123", "acme", "github.com", "https://example.test/webhook");
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["target_type"], json!("org"));
        assert_eq!(value["target_slug"], json!("acme"));
        assert_eq!(value["host"], json!("github.com"));
        assert_eq!(value["manifest"]["name"], json!("arc-setup-abc123"));
        assert_eq!(
            value["manifest"]["hook_attributes"]["url"],
            json!("https://example.test/webhook")
        );
        assert_eq!(value["manifest"]["hook_attributes"]["active"], json!(true));
        assert_eq!(value["manifest"]["callback_urls"], json!([]));
    }

    #[test]
    fn random_app_name_has_prefix_and_varies() {
        let a = random_app_name("arc-setup");
        let b = random_app_name("arc-setup");
        assert!(a.starts_with("arc-setup-"));
        assert_eq!(a.len(), "arc-setup-".len() + 16);
        assert_ne!(a, b);
    }
}
