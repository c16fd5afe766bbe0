//! Sunny Portal endpoint layout.
//!
//! All URLs the scraper talks to live here, so tests (and self-hosted
//! proxies) can point the whole client at another origin.

use reqwest::Url;

use crate::error::{Result, SunnyError};

/// Origin of the classic Sunny Portal.
pub const DEFAULT_PORTAL_BASE: &str = "https://www.sunnyportal.com";

/// OpenID-connect authorization URL of the SMA identity provider.
pub const DEFAULT_LOGIN_URL: &str = "https://login.sma.energy/auth/realms/SMA/protocol/openid-connect/auth?response_type=code&client_id=SunnyPortalClassic&redirect_uri=https%3a%2f%2fsunnyportal.com%2fTemplates%2fStart.aspx";

/// Path of the login entry page relative to an identity provider origin.
pub const LOGIN_ENTRY_PATH: &str = "/auth/realms/SMA/protocol/openid-connect/auth";

pub const ENERGY_OVERVIEW_PATH: &str = "/FixedPages/HoManEnergyRedesign.aspx";
pub const CHART_API_PATH: &str = "/PortalCharts/Core/PortalChartsAPI.aspx";
pub const CHART_EXPORT_PATH: &str = "/Templates/DownloadDiagram.aspx";
pub const DASHBOARD_PATH: &str = "/Dashboard";

/// Identifier of the chart widget on the energy overview page.
pub const CHART_ID: &str = "mainChart";

/// Export flavour matching the energy overview chart.
pub const EXPORT_TYPE: &str = "homanEnergyRedesign";

/// Name attribute of the login form on the identity provider page.
pub const LOGIN_FORM_NAME: &str = "loginForm";

/// Resolved portal URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    pub login_entry: Url,
    pub energy_overview: Url,
    pub chart_api: Url,
    pub chart_export: Url,
    pub dashboard: Url,
}

impl PortalEndpoints {
    /// Endpoints of the public Sunny Portal.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in constants; the `Result` comes from URL parsing.
    pub fn sunny_portal() -> Result<Self> {
        Self::new(DEFAULT_PORTAL_BASE, DEFAULT_LOGIN_URL)
    }

    /// Endpoints for a portal at `portal_base` and a login page at `login_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if either URL does not parse.
    pub fn new(portal_base: &str, login_url: &str) -> Result<Self> {
        let base = parse("portal.base_url", portal_base)?;
        let login_entry = parse("portal.login_url", login_url)?;
        let at = |path: &str| {
            base.join(path).map_err(|e| SunnyError::ConfigInvalid {
                key: "portal.base_url".to_string(),
                message: e.to_string(),
            })
        };

        Ok(Self {
            energy_overview: at(ENERGY_OVERVIEW_PATH)?,
            chart_api: at(CHART_API_PATH)?,
            chart_export: at(CHART_EXPORT_PATH)?,
            dashboard: at(DASHBOARD_PATH)?,
            login_entry,
        })
    }

    /// Endpoints with both the portal and the identity provider served from one origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if `origin` does not parse.
    pub fn single_origin(origin: &str) -> Result<Self> {
        let login = format!(
            "{}{LOGIN_ENTRY_PATH}?response_type=code&client_id=SunnyPortalClassic",
            origin.trim_end_matches('/')
        );
        Self::new(origin, &login)
    }

    /// Whether `url` is the login entry page, i.e. the portal bounced a request back to login.
    #[must_use]
    pub fn is_login_page(&self, url: &Url) -> bool {
        url.host_str() == self.login_entry.host_str()
            && url.port_or_known_default() == self.login_entry.port_or_known_default()
            && url.path() == self.login_entry.path()
    }
}

fn parse(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| SunnyError::ConfigInvalid {
        key: key.to_string(),
        message: format!("{raw}: {e}"),
    })
}
