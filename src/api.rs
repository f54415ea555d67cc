//! Remote directory service contract.
//!
//! The RadioReference directory is consumed through a small fixed set of
//! request/response operations, modeled by the [`Directory`] trait. The
//! response DTOs default every descriptive field that may be absent; only
//! entity identifiers are required, so a record missing its id fails
//! decoding (and the run) instead of producing a half-formed entity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::{AuthConfig, ClientConfig};
use crate::error::{Error, Result};

/// State (region) info: counties plus state-level system and agency lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateInfo {
    #[serde(default)]
    pub state_name: String,
    #[serde(default)]
    pub county_list: Vec<CountyRef>,
    #[serde(default)]
    pub trs_list: Vec<TrsRef>,
    #[serde(default)]
    pub agency_list: Vec<AgencyRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyRef {
    pub ctid: i64,
    #[serde(default)]
    pub county_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrsRef {
    pub sid: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgencyRef {
    pub aid: i64,
}

/// County info: the system and agency lists reachable through this county.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyInfo {
    #[serde(default)]
    pub trs_list: Vec<TrsRef>,
    #[serde(default)]
    pub agency_list: Vec<AgencyRef>,
}

/// Trunked system detail: name plus the type/flavor classification codes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrsDetails {
    #[serde(default)]
    pub s_name: String,
    #[serde(default)]
    pub s_type: i64,
    #[serde(default)]
    pub s_flavor: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkgroupRecord {
    pub tg_dec: i64,
    #[serde(default)]
    pub tg_descr: String,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRef {
    pub tag_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub sid: i64,
    #[serde(default)]
    pub site_descr: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    #[serde(default)]
    pub range: f64,
    #[serde(default)]
    pub site_freqs: Vec<SiteFreq>,
}

/// One site frequency. A present textual `use` value marks a control
/// frequency; anything else is a voice channel.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteFreq {
    pub freq: f64,
    #[serde(rename = "use", default)]
    pub use_field: Option<String>,
}

/// Agency detail: owning county id and the category/subcategory tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyInfo {
    #[serde(default)]
    pub ctid: i64,
    #[serde(default)]
    pub cats: Vec<Category>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub subcats: Vec<Subcategory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub scid: i64,
    #[serde(default)]
    pub sc_name: String,
}

/// One conventional frequency record of a subcategory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubcatFreq {
    #[serde(default)]
    pub descr: String,
    /// Output frequency in MHz; records without one are not materialized.
    #[serde(default)]
    pub out: Option<f64>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub mode: i64,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

/// The fixed set of directory operations the pipeline consumes.
///
/// Implemented by [`RadioReferenceClient`] for the live service and by
/// in-memory fakes in tests.
pub trait Directory {
    async fn get_state_info(&self, stid: i64) -> Result<StateInfo>;
    async fn get_county_info(&self, ctid: i64) -> Result<CountyInfo>;
    async fn get_trs_details(&self, sid: i64) -> Result<TrsDetails>;
    async fn get_trs_talkgroups(&self, sid: i64) -> Result<Vec<TalkgroupRecord>>;
    async fn get_trs_sites(&self, sid: i64) -> Result<Vec<SiteRecord>>;
    async fn get_agency_info(&self, aid: i64) -> Result<AgencyInfo>;
    async fn get_subcat_freqs(&self, scid: i64) -> Result<Vec<SubcatFreq>>;
}

/// Credentials block sent with every request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthInfo {
    app_key: String,
    username: String,
    password: String,
    version: String,
    style: String,
}

impl AuthInfo {
    fn from_config(auth: &AuthConfig) -> Self {
        AuthInfo {
            app_key: auth.app_key.clone(),
            username: auth.username.clone(),
            password: auth.password.clone(),
            version: auth.version.clone(),
            style: "rpc".to_string(),
        }
    }
}

/// HTTP client for the RadioReference directory service.
///
/// Credentials are an explicit configuration value passed at construction,
/// not ambient state. All calls are sequential; the caller decides pacing.
pub struct RadioReferenceClient {
    http: reqwest::Client,
    endpoint: String,
    auth: AuthInfo,
}

impl RadioReferenceClient {
    pub fn new(client: &ClientConfig, auth: &AuthConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(client.timeout_secs))
            .build()
            .map_err(|source| Error::RemoteCall { call: "buildClient", entity: 0, source })?;
        Ok(RadioReferenceClient {
            http,
            endpoint: client.endpoint.clone(),
            auth: AuthInfo::from_config(auth),
        })
    }

    /// Issue one directory operation and decode its JSON response.
    async fn call<T: DeserializeOwned>(
        &self,
        call: &'static str,
        entity: i64,
        params: serde_json::Value,
    ) -> Result<T> {
        debug!(call, entity, "directory request");
        let mut body = json!({
            "request": call,
            "authInfo": self.auth,
        });
        if let (Some(body), Some(params)) = (body.as_object_mut(), params.as_object()) {
            for (k, v) in params {
                body.insert(k.clone(), v.clone());
            }
        }

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|source| Error::RemoteCall { call, entity, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteStatus { call, entity, status });
        }

        let text = response
            .text()
            .await
            .map_err(|source| Error::RemoteCall { call, entity, source })?;
        serde_json::from_str(&text).map_err(|source| Error::MalformedResponse {
            call,
            entity,
            source,
        })
    }
}

impl Directory for RadioReferenceClient {
    async fn get_state_info(&self, stid: i64) -> Result<StateInfo> {
        self.call("getStateInfo", stid, json!({ "stid": stid })).await
    }

    async fn get_county_info(&self, ctid: i64) -> Result<CountyInfo> {
        self.call("getCountyInfo", ctid, json!({ "ctid": ctid })).await
    }

    async fn get_trs_details(&self, sid: i64) -> Result<TrsDetails> {
        self.call("getTrsDetails", sid, json!({ "sid": sid })).await
    }

    async fn get_trs_talkgroups(&self, sid: i64) -> Result<Vec<TalkgroupRecord>> {
        self.call("getTrsTalkgroups", sid, json!({ "sid": sid })).await
    }

    async fn get_trs_sites(&self, sid: i64) -> Result<Vec<SiteRecord>> {
        self.call("getTrsSites", sid, json!({ "sid": sid })).await
    }

    async fn get_agency_info(&self, aid: i64) -> Result<AgencyInfo> {
        self.call("getAgencyInfo", aid, json!({ "aid": aid })).await
    }

    async fn get_subcat_freqs(&self, scid: i64) -> Result<Vec<SubcatFreq>> {
        self.call("getSubcatFreqs", scid, json!({ "scid": scid })).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_default() {
        // Only the id is required; everything else defaults.
        let site: SiteRecord = serde_json::from_str(r#"{"sid": 42}"#).unwrap();
        assert_eq!(site.sid, 42);
        assert_eq!(site.site_descr, "");
        assert!(site.site_freqs.is_empty());

        let state: StateInfo = serde_json::from_str("{}").unwrap();
        assert!(state.county_list.is_empty());
        assert!(state.trs_list.is_empty());
    }

    #[test]
    fn test_missing_identifier_is_a_shape_error() {
        assert!(serde_json::from_str::<SiteRecord>(r#"{"siteDescr": "North"}"#).is_err());
        assert!(serde_json::from_str::<Subcategory>(r#"{"scName": "Fire"}"#).is_err());
        assert!(serde_json::from_str::<TalkgroupRecord>(r#"{"tgDescr": "Ops"}"#).is_err());
    }

    #[test]
    fn test_site_freq_use_marker() {
        let freqs: Vec<SiteFreq> = serde_json::from_str(
            r#"[{"freq": 851.0125, "use": "a"}, {"freq": 852.3375}]"#,
        )
        .unwrap();
        assert_eq!(freqs[0].use_field.as_deref(), Some("a"));
        assert!(freqs[1].use_field.is_none());
    }

    #[test]
    fn test_subcat_freq_shapes() {
        let freq: SubcatFreq = serde_json::from_str(
            r#"{"descr": "Fire Dispatch", "out": 154.265, "tone": "151.4 PL",
                "mode": 1, "tags": [{"tagId": 3}]}"#,
        )
        .unwrap();
        assert_eq!(freq.out, Some(154.265));
        assert_eq!(freq.tags[0].tag_id, 3);

        // No output value at all is a valid record (and later skipped).
        let freq: SubcatFreq = serde_json::from_str(r#"{"descr": "input only"}"#).unwrap();
        assert_eq!(freq.out, None);
    }
}
