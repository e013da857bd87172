//! Directory API client: personnel listing and per-person office lookup.
//!
//! Two endpoints are involved. The personnel query endpoint returns JSON with a
//! `data` array of people; the profile search page returns HTML from which the
//! office code is scraped (see [`extract_office`]).

mod extract;

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use despachos_shared::{
    DespachosError, DirectoryConfig, OfficeLookup, PersonRecord, PersonnelResponse,
    ResolvedEntry, Result,
};

pub use extract::{extract_office, is_office_code};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User-Agent string for directory requests.
const USER_AGENT: &str = concat!("Despachos/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A person that made it through the lookup stage.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The name/office pair to emit.
    pub entry: ResolvedEntry,
    /// How the office was obtained.
    pub lookup: OfficeLookup,
}

/// The email to look a person up by, or `None` if the record should be skipped.
///
/// Records with a blank name or no emails are skipped. Only the first email is
/// ever used.
pub fn lookup_email(person: &PersonRecord) -> Option<&str> {
    if person.name.trim().is_empty() {
        return None;
    }
    person.emails.first().map(String::as_str)
}

// ---------------------------------------------------------------------------
// DirectoryClient
// ---------------------------------------------------------------------------

/// HTTP client for the personnel API and the profile search page.
pub struct DirectoryClient {
    client: Client,
    api_url: Url,
    profile_url: Url,
    unit: String,
    affiliations: Vec<String>,
    limit: u32,
}

impl DirectoryClient {
    /// Create a client from the `[directory]` config section.
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url).map_err(|e| {
            DespachosError::validation(format!("invalid api_url '{}': {e}", config.api_url))
        })?;
        let profile_url = Url::parse(&config.profile_url).map_err(|e| {
            DespachosError::validation(format!(
                "invalid profile_url '{}': {e}",
                config.profile_url
            ))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DespachosError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            profile_url,
            unit: config.unit.clone(),
            affiliations: config.affiliations.clone(),
            limit: config.limit,
        })
    }

    /// URL of the personnel query, with unit, affiliation and limit filters.
    pub fn personnel_url(&self) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("UNIDADES", &self.unit)
            .append_pair("FILIACION", &self.affiliations.join("|"))
            .append_pair("limit", &self.limit.to_string());
        url
    }

    /// URL of the profile search page for `email`.
    pub fn profile_url(&self, email: &str) -> Url {
        let mut url = self.profile_url.clone();
        url.query_pairs_mut()
            .append_pair("usuario", "")
            .append_pair("lang", "0")
            .append_pair("vista", "unidades")
            .append_pair("search", &format!("${email}"));
        url
    }

    /// Fetch the personnel list. Any failure here is fatal to the run.
    #[instrument(skip_all)]
    pub async fn fetch_personnel(&self) -> Result<Vec<PersonRecord>> {
        let url = self.personnel_url();
        info!(%url, "fetching personnel list");

        let body = self.get_text(&url).await?;
        let parsed: PersonnelResponse = serde_json::from_str(&body)
            .map_err(|e| DespachosError::parse(format!("{url}: invalid personnel JSON: {e}")))?;

        info!(people = parsed.data.len(), "personnel list fetched");
        Ok(parsed.data)
    }

    /// Look up one person's office by email.
    ///
    /// Network failures are logged and reported as [`OfficeLookup::Failed`];
    /// this never aborts the run.
    #[instrument(skip(self))]
    pub async fn lookup_office(&self, email: &str) -> OfficeLookup {
        let url = self.profile_url(email);

        match self.get_text(&url).await {
            Ok(html) => {
                let office = extract_office(&html);
                debug!(office, "office resolved");
                OfficeLookup::Resolved(office.to_string())
            }
            Err(e) => {
                warn!(%url, error = %e, "failed to download profile page");
                OfficeLookup::Failed {
                    url: url.to_string(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Resolve a person to a name/office pair, or `None` if the record is skipped.
    pub async fn resolve(&self, person: &PersonRecord) -> Option<Resolution> {
        let Some(email) = lookup_email(person) else {
            debug!(name = %person.name, "skipping record without name or email");
            return None;
        };

        let lookup = self.lookup_office(email).await;
        let entry = ResolvedEntry::new(person.name.trim(), lookup.office());
        Some(Resolution { entry, lookup })
    }

    /// GET `url` and return the body, treating non-2xx statuses as errors.
    async fn get_text(&self, url: &Url) -> Result<String> {
        debug!(%url, "GET");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DespachosError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DespachosError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| DespachosError::Network(format!("{url}: failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn person(name: &str, emails: &[&str]) -> PersonRecord {
        PersonRecord {
            name: name.into(),
            emails: emails.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn config_for(server: &MockServer) -> DirectoryConfig {
        DirectoryConfig {
            api_url: format!("{}/fichas/api/query/users/", server.uri()),
            profile_url: format!("{}/atica/directorio/", server.uri()),
            timeout_secs: 5,
            ..DirectoryConfig::default()
        }
    }

    #[test]
    fn lookup_email_skips_incomplete_records() {
        assert_eq!(lookup_email(&person("", &["a@um.es"])), None);
        assert_eq!(lookup_email(&person("   \t", &["a@um.es"])), None);
        assert_eq!(lookup_email(&person("Ana", &[])), None);
        assert_eq!(
            lookup_email(&person("Ana", &["first@um.es", "second@um.es"])),
            Some("first@um.es")
        );
    }

    #[test]
    fn personnel_url_carries_filters() {
        let client = DirectoryClient::new(&DirectoryConfig::default()).unwrap();
        let url = client.personnel_url();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.host_str(), Some("telematica.um.es"));
        assert_eq!(url.path(), "/fichas/api/query/users/");
        assert!(pairs.contains(&("UNIDADES".into(), "a002b031".into())));
        assert!(pairs.contains(&("FILIACION".into(), "a004|a007".into())));
        assert!(pairs.contains(&("limit".into(), "200".into())));
    }

    #[test]
    fn profile_url_embeds_email_as_search_term() {
        let client = DirectoryClient::new(&DirectoryConfig::default()).unwrap();
        let url = client.profile_url("ana@um.es");
        let search = url
            .query_pairs()
            .find(|(k, _)| k == "search")
            .map(|(_, v)| v.into_owned());

        assert_eq!(url.path(), "/atica/directorio/");
        assert_eq!(search.as_deref(), Some("$ana@um.es"));
    }

    #[test]
    fn invalid_urls_are_rejected() {
        let config = DirectoryConfig {
            api_url: "not a url".into(),
            ..DirectoryConfig::default()
        };
        assert!(matches!(
            DirectoryClient::new(&config),
            Err(DespachosError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn fetch_personnel_returns_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/fichas/api/query/users/"))
            .and(query_param("UNIDADES", "a002b031"))
            .and(query_param("FILIACION", "a004|a007"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"cn":"Ana García","mail":["ana@um.es"]},{"cn":"Bob","mail":[]}]}"#,
            ))
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        let people = client.fetch_personnel().await.unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "Ana García");
    }

    #[tokio::test]
    async fn fetch_personnel_without_data_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"total":0}"#))
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        assert!(client.fetch_personnel().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_personnel_fails_on_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        let err = client.fetch_personnel().await.unwrap_err();
        assert!(matches!(err, DespachosError::Network(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn fetch_personnel_fails_on_bad_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        let err = client.fetch_personnel().await.unwrap_err();
        assert!(matches!(err, DespachosError::Parse { .. }));
    }

    #[tokio::test]
    async fn lookup_office_extracts_code() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/atica/directorio/"))
            .and(query_param("search", "$ana@um.es"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<tr><td>Despacho:</td>\n<td><a href=\"#\">B1.3.012</a></td></tr>",
            ))
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        let lookup = client.lookup_office("ana@um.es").await;
        assert_eq!(lookup, OfficeLookup::Resolved("B1.3.012".into()));
    }

    #[tokio::test]
    async fn lookup_office_failure_falls_back_to_placeholder() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/atica/directorio/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        let lookup = client.lookup_office("bob@um.es").await;

        match &lookup {
            OfficeLookup::Failed { url, error } => {
                assert!(url.contains("/atica/directorio/"));
                assert!(error.contains("500"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(lookup.office(), despachos_shared::PLACEHOLDER_OFFICE);
    }

    #[tokio::test]
    async fn resolve_uses_first_email_and_trims_name() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/atica/directorio/"))
            .and(query_param("search", "$first@um.es"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>B1.3.300</p>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        let resolution = client
            .resolve(&person("  Carmen Ruiz ", &["first@um.es", "second@um.es"]))
            .await
            .expect("resolved");

        assert_eq!(resolution.entry, ResolvedEntry::new("Carmen Ruiz", "B1.3.300"));
        assert!(!resolution.lookup.is_failed());
    }

    #[tokio::test]
    async fn resolve_skips_without_requesting() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = DirectoryClient::new(&config_for(&server)).unwrap();
        assert!(client.resolve(&person("", &["x@um.es"])).await.is_none());
        assert!(client.resolve(&person("Dana", &[])).await.is_none());
    }
}
