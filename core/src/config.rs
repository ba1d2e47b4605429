//! Site-wide settings shared by notification builders.

use serde::{Deserialize, Serialize};

/// Public site settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL of the public site, with trailing slash.
    pub site_url: String,
    /// Sender address for customer emails.
    pub contact_email: String,
    /// Sender address for talent emails.
    pub staff_email: String,
}

impl SiteConfig {
    /// Creates the settings, normalising the trailing slash of `site_url`.
    #[must_use]
    pub fn new(site_url: impl Into<String>, contact_email: impl Into<String>, staff_email: impl Into<String>) -> Self {
        let mut site_url = site_url.into();
        if !site_url.ends_with('/') {
            site_url.push('/');
        }
        Self {
            site_url,
            contact_email: contact_email.into(),
            staff_email: staff_email.into(),
        }
    }

    /// Talent dashboard page.
    #[must_use]
    pub fn dashboard_url(&self) -> String {
        format!("{}dashboard/", self.site_url)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000/", "contato@localhost", "staff@localhost")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_url_gets_trailing_slash() {
        let site = SiteConfig::new("https://viggio.com.br", "a@b", "c@d");
        assert_eq!(site.site_url, "https://viggio.com.br/");
        assert_eq!(site.dashboard_url(), "https://viggio.com.br/dashboard/");
    }
}
