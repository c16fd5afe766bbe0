//! A wiremock stand-in for the Sunny Portal and its identity provider.
//!
//! Both live on one origin: the login entry page, the credential form target
//! and the portal callback, plus the chart, export and dashboard endpoints.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use sunny_scrape::core::portal::{
    CHART_API_PATH, CHART_EXPORT_PATH, DASHBOARD_PATH, ENERGY_OVERVIEW_PATH, LOGIN_ENTRY_PATH,
};
use sunny_scrape::core::PortalEndpoints;
use sunny_scrape::util::time::local_midnight;

pub const AUTHENTICATE_PATH: &str = "/auth/realms/SMA/login-actions/authenticate";
pub const CALLBACK_PATH: &str = "/Templates/Start.aspx";
pub const SESSION_COOKIE: &str = "portal_session=abc123; Path=/";

pub const USERNAME: &str = "alice@example.com";
pub const PASSWORD: &str = "s3cret-Pa55word";

/// Minimal export body with the portal's BOM, `;` separators and trailing blanks.
pub const SAMPLE_CSV: &str =
    "\u{feff}Time;PV generation [W];Total consumption [W]\r\n00:15;0,000  ;312,000\r\n00:30;0,000  ;298,500\r\n\r\n";

pub struct MockPortal {
    pub server: MockServer,
}

impl MockPortal {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn login_url(&self) -> String {
        format!(
            "{}{LOGIN_ENTRY_PATH}?response_type=code&client_id=SunnyPortalClassic",
            self.uri()
        )
    }

    pub fn endpoints(&self) -> PortalEndpoints {
        PortalEndpoints::single_origin(&self.uri()).expect("mock endpoints")
    }

    /// Login page containing the form the client must discover.
    pub fn login_page(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html><head><title>Sign in to SMA</title></head>
<body>
  <form id="kc-form-login" name="loginForm" method="post"
        action="{}{AUTHENTICATE_PATH}?session_code=abc&amp;execution=e1&amp;client_id=SunnyPortalClassic">
    <input name="username" type="text"/>
    <input name="password" type="password"/>
    <input name="credentialId" type="hidden" value=""/>
  </form>
</body></html>"#,
            self.uri()
        )
    }

    /// Entry page, credential POST redirecting to the callback, and the callback itself.
    pub async fn mount_login(&self) {
        self.mount_login_page().await;

        Mock::given(method("POST"))
            .and(path(AUTHENTICATE_PATH))
            .and(body_string_contains("credentialId="))
            .respond_with(self.callback_redirect())
            .mount(&self.server)
            .await;

        self.mount_callback().await;
    }

    pub async fn mount_login_page(&self) {
        Mock::given(method("GET"))
            .and(path(LOGIN_ENTRY_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(self.login_page(), "text/html; charset=utf-8"),
            )
            .mount(&self.server)
            .await;
    }

    /// The credential POST redirects to the portal callback with an auth code.
    pub fn callback_redirect(&self) -> ResponseTemplate {
        ResponseTemplate::new(302)
            .insert_header(
                "Location",
                format!("{}{CALLBACK_PATH}?state=st1&code=XYZ", self.uri()),
            )
            .insert_header("Set-Cookie", SESSION_COOKIE)
    }

    pub async fn mount_callback(&self) {
        Mock::given(method("GET"))
            .and(path(CALLBACK_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>redirecting</html>"))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(CALLBACK_PATH))
            .and(body_string_contains("code=XYZ"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>portal</html>"))
            .mount(&self.server)
            .await;
    }

    /// Credential POST answered with the login page again: wrong password.
    pub async fn mount_login_rejected(&self) {
        self.mount_login_page().await;

        Mock::given(method("POST"))
            .and(path(AUTHENTICATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(self.login_page(), "text/html; charset=utf-8"),
            )
            .mount(&self.server)
            .await;
    }

    /// Overview page, chart API (cold and ranged) and the CSV export.
    pub async fn mount_chart(&self, csv: &str) {
        Mock::given(method("GET"))
            .and(path(ENERGY_OVERVIEW_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>energy</html>"))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(CHART_API_PATH))
            .and(query_param("id", "mainChart"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"state":"ok"}"#))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(CHART_EXPORT_PATH))
            .and(query_param("down", "homanEnergyRedesign"))
            .and(query_param("chartId", "mainChart"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(csv.as_bytes().to_vec(), "text/csv"),
            )
            .mount(&self.server)
            .await;
    }

    /// Make the ranged chart request for `day` fail with `status`.
    pub async fn fail_ranged_chart_on(&self, day: NaiveDate, status: u16) {
        Mock::given(method("GET"))
            .and(path(CHART_API_PATH))
            .and(query_param("xf", local_midnight(day).timestamp().to_string()))
            .respond_with(ResponseTemplate::new(status))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Make the export bounce to the login page, as an expired session does.
    pub async fn expire_session_on_export(&self) {
        Mock::given(method("GET"))
            .and(path(CHART_EXPORT_PATH))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", self.login_url()))
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    pub async fn mount_dashboard(&self, body: &str) {
        Mock::given(method("GET"))
            .and(path(DASHBOARD_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.as_bytes().to_vec(), "application/json"),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .expect("request recording enabled")
    }

    /// Paths of all portal-side requests, in order, excluding the login handshake.
    pub async fn portal_paths(&self) -> Vec<String> {
        self.requests()
            .await
            .into_iter()
            .map(|r| r.url.path().to_string())
            .filter(|p| p != LOGIN_ENTRY_PATH && p != AUTHENTICATE_PATH && p != CALLBACK_PATH)
            .collect()
    }

    /// Number of credential submissions, i.e. login attempts.
    pub async fn login_count(&self) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() == "POST" && r.url.path() == AUTHENTICATE_PATH)
            .count()
    }

    /// Write a JSON config file pointing at this portal.
    pub fn write_config(&self, dir: &Path) -> PathBuf {
        let config = serde_json::json!({
            "username": USERNAME,
            "password": PASSWORD,
            "portal": {
                "base_url": self.uri(),
                "login_url": self.login_url(),
            },
            "batch": { "timeout_secs": 5 }
        });
        let file = dir.join(".config.json");
        std::fs::write(&file, serde_json::to_string_pretty(&config).unwrap()).unwrap();
        file
    }
}

pub fn query_value(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
