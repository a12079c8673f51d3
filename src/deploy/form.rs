//! Multipart form construction for deploy requests.

use reqwest::multipart::{Form, Part};

use crate::domain::{DeployTarget, ProjectRef};
use crate::export::SITE_ARCHIVE_NAME;

fn flag(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// Text fields accompanying the archive, in submission order.
///
/// Connection parameters are only sent for the `vps` variant. `domain` and
/// `email` are omitted when unset or blank.
pub fn form_fields(
    target: &DeployTarget,
    project: Option<ProjectRef>,
) -> Vec<(&'static str, String)> {
    let mut fields = vec![("deploy_type", target.deploy_type().to_string())];

    if let DeployTarget::Vps(vps) = target {
        fields.push(("host", vps.host.clone()));
        fields.push(("port", vps.port.to_string()));
        fields.push(("username", vps.username.clone()));
        fields.push(("password", vps.password.clone()));
        fields.push(("deploy_path", vps.remote_path.clone()));
        if let Some(domain) = vps.domain.as_deref().filter(|d| !d.trim().is_empty()) {
            fields.push(("domain", domain.to_string()));
        }
        if let Some(email) = vps.cert_email.as_deref().filter(|e| !e.trim().is_empty()) {
            fields.push(("email", email.to_string()));
        }
        fields.push(("nginx_config", flag(vps.configure_proxy)));
        fields.push(("enable_ssl", flag(vps.enable_tls)));
    }

    if let Some(project) = project {
        fields.push(("project_id", project.to_string()));
    }

    fields
}

/// Builds the multipart payload: `site_zip` plus the text fields.
pub fn build_form(
    archive: Vec<u8>,
    fields: Vec<(&'static str, String)>,
) -> Result<Form, reqwest::Error> {
    let part = Part::bytes(archive)
        .file_name(SITE_ARCHIVE_NAME)
        .mime_str("application/zip")?;

    Ok(fields
        .into_iter()
        .fold(Form::new().part("site_zip", part), |form, (name, value)| {
            form.text(name, value)
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VpsTarget;
    use pretty_assertions::assert_eq;

    fn names(fields: &[(&'static str, String)]) -> Vec<&'static str> {
        fields.iter().map(|(n, _)| *n).collect()
    }

    #[test]
    fn managed_sends_only_discriminator() {
        let fields = form_fields(&DeployTarget::Managed, None);
        assert_eq!(fields, vec![("deploy_type", "builder_vps".to_string())]);
    }

    #[test]
    fn vps_sends_connection_parameters() {
        let mut vps = VpsTarget::new("203.0.113.10", "deploy", "pw");
        vps.domain = Some("example.com".into());
        vps.cert_email = Some("ops@example.com".into());
        vps.configure_proxy = true;

        let fields = form_fields(&DeployTarget::Vps(vps), Some(ProjectRef::new(42)));

        assert_eq!(
            names(&fields),
            vec![
                "deploy_type",
                "host",
                "port",
                "username",
                "password",
                "deploy_path",
                "domain",
                "email",
                "nginx_config",
                "enable_ssl",
                "project_id"
            ]
        );
        let get = |name: &str| {
            fields
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("deploy_type"), Some("vps"));
        assert_eq!(get("port"), Some("22"));
        assert_eq!(get("deploy_path"), Some("/var/www/my-site"));
        assert_eq!(get("nginx_config"), Some("true"));
        assert_eq!(get("enable_ssl"), Some("false"));
        assert_eq!(get("project_id"), Some("42"));
    }

    #[test]
    fn missing_domain_and_email_are_omitted() {
        let mut vps = VpsTarget::new("h", "u", "p");
        vps.domain = Some("  ".into());
        let fields = form_fields(&DeployTarget::Vps(vps), None);

        assert!(!names(&fields).contains(&"email"));
        assert!(!names(&fields).contains(&"domain"));
        assert!(!names(&fields).contains(&"project_id"));
        assert!(names(&fields).contains(&"deploy_path"));
    }

    #[test]
    fn form_builds() {
        let form = build_form(vec![0x50, 0x4b], form_fields(&DeployTarget::Managed, None));
        assert!(form.is_ok());
    }
}
