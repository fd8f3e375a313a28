use crate::domain::constants::{
    LONG_TEXTURE_BLOB_THRESHOLD, SKIN_WRAPPER_PREFIX, SKIN_WRAPPER_SUFFIX,
};
use crate::domain::errors::ResolveError;
use crate::domain::models::Identity;
use crate::services::http::HttpGet;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

/// Where a texture blob came from. Each source has its own decoding path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSource {
    /// `textures` property value returned by the session service.
    ApiFetched,
    /// Short value pasted into the panel file.
    ConfigLiteral,
}

impl TextureSource {
    /// Length heuristic for blobs whose origin is not known.
    pub fn infer(blob: &str) -> Self {
        if blob.trim().len() > LONG_TEXTURE_BLOB_THRESHOLD {
            TextureSource::ApiFetched
        } else {
            TextureSource::ConfigLiteral
        }
    }
}

#[derive(Deserialize)]
struct ProfileBody {
    #[serde(default)]
    properties: Vec<ProfileProperty>,
}

#[derive(Deserialize)]
struct ProfileProperty {
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Deserialize)]
struct TexturePayload {
    textures: TextureMap,
}

#[derive(Deserialize)]
struct TextureMap {
    #[serde(rename = "SKIN")]
    skin: Option<SkinTexture>,
}

#[derive(Deserialize)]
struct SkinTexture {
    url: String,
}

pub struct TextureResolver {
    http: Arc<dyn HttpGet>,
    api_base: String,
}

impl TextureResolver {
    pub fn new(http: Arc<dyn HttpGet>, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the raw `textures` property for an identity.
    pub fn resolve_texture(&self, identity: &Identity) -> Result<String, ResolveError> {
        let url = format!("{}/session/minecraft/profile/{}", self.api_base, identity);
        let unavailable = |why: String| {
            warn!(%identity, reason = %why, "unable to get skin");
            ResolveError::Unavailable(why)
        };
        let resp = self
            .http
            .get(&url)
            .map_err(|e| unavailable(e.to_string()))?;
        if resp.status != 200 {
            return Err(unavailable(format!("status {}", resp.status)));
        }
        let body: ProfileBody =
            serde_json::from_str(&resp.body).map_err(|e| unavailable(e.to_string()))?;
        body.properties
            .into_iter()
            .find(|p| p.name == "textures")
            .map(|p| p.value)
            .ok_or_else(|| unavailable("profile has no textures property".to_string()))
    }
}

/// Decode a blob of unknown origin, picking the path by length.
pub fn decode_texture_url(blob: &str) -> Result<String, ResolveError> {
    decode_texture_url_from(blob, TextureSource::infer(blob))
}

pub fn decode_texture_url_from(blob: &str, source: TextureSource) -> Result<String, ResolveError> {
    let decoded = STANDARD
        .decode(blob.trim())
        .map_err(|e| ResolveError::Malformed(format!("base64: {}", e)))?;
    let text = String::from_utf8(decoded)
        .map_err(|e| ResolveError::Malformed(format!("utf-8: {}", e)))?;
    match source {
        TextureSource::ApiFetched => skin_url_from_json(&text),
        TextureSource::ConfigLiteral => skin_url_from_wrapper(&text),
    }
}

fn skin_url_from_json(text: &str) -> Result<String, ResolveError> {
    let payload: TexturePayload = serde_json::from_str(text)
        .map_err(|e| ResolveError::Malformed(format!("json: {}", e)))?;
    match payload.textures.skin {
        Some(skin) => Ok(skin.url),
        None => {
            error!("texture payload has no SKIN entry");
            Err(ResolveError::Malformed("no SKIN texture".to_string()))
        }
    }
}

// Config literals are stripped positionally; anything that does not carry the
// exact wrapper goes through the JSON path instead.
fn skin_url_from_wrapper(text: &str) -> Result<String, ResolveError> {
    match text
        .strip_prefix(SKIN_WRAPPER_PREFIX)
        .and_then(|rest| rest.strip_suffix(SKIN_WRAPPER_SUFFIX))
    {
        Some(url) if !url.is_empty() && !url.contains('"') => Ok(url.to_string()),
        _ => skin_url_from_json(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::http::fake::FakeHttp;

    const URL: &str =
        "http://textures.minecraft.net/texture/9631597dce4e4051e8d5a543641966ab54fbf25a0ed6047f11e6140d88bf48f";

    fn encode(s: &str) -> String {
        STANDARD.encode(s.as_bytes())
    }

    fn api_blob(url: &str) -> String {
        encode(&format!(
            r#"{{"timestamp":1700000000000,"profileId":"069a79f444e94726a5befca90e38aaf5","profileName":"Notch","textures":{{"SKIN":{{"url":"{}"}},"CAPE":{{"url":"http://textures.minecraft.net/texture/cape"}}}}}}"#,
            url
        ))
    }

    #[test]
    fn long_api_blob_decodes_nested_url() {
        let blob = api_blob(URL);
        assert!(blob.len() > LONG_TEXTURE_BLOB_THRESHOLD);
        assert_eq!(decode_texture_url(&blob).unwrap(), URL);
    }

    #[test]
    fn short_config_literal_strips_wrapper() {
        let blob = encode(&format!(r#"{{"textures":{{"SKIN":{{"url":"{}"}}}}}}"#, "http://t/x"));
        assert!(blob.len() <= LONG_TEXTURE_BLOB_THRESHOLD);
        assert_eq!(TextureSource::infer(&blob), TextureSource::ConfigLiteral);
        assert_eq!(decode_texture_url(&blob).unwrap(), "http://t/x");
    }

    #[test]
    fn tagged_config_literal_tolerates_whitespace() {
        let blob = encode(r#"{ "textures": { "SKIN": { "url": "http://t/y" } } }"#);
        assert_eq!(
            decode_texture_url_from(&blob, TextureSource::ConfigLiteral).unwrap(),
            "http://t/y"
        );
    }

    #[test]
    fn missing_skin_and_bad_base64_are_malformed() {
        let no_skin = encode(r#"{"textures":{"CAPE":{"url":"http://t/c"}}}"#);
        assert!(matches!(
            decode_texture_url_from(&no_skin, TextureSource::ApiFetched),
            Err(ResolveError::Malformed(_))
        ));
        assert!(matches!(
            decode_texture_url("!!not base64!!"),
            Err(ResolveError::Malformed(_))
        ));
    }

    #[test]
    fn resolve_texture_picks_textures_property() {
        let id = Identity::parse("069a79f444e94726a5befca90e38aaf5").unwrap();
        let http = FakeHttp::default().route(
            &format!("http://session.test/session/minecraft/profile/{}", id),
            200,
            r#"{"id":"069a79f444e94726a5befca90e38aaf5","name":"Notch","properties":[{"name":"other","value":"x"},{"name":"textures","value":"BLOB"}]}"#,
        );
        let r = TextureResolver::new(Arc::new(http), "http://session.test");
        assert_eq!(r.resolve_texture(&id).unwrap(), "BLOB");
    }

    #[test]
    fn resolve_texture_without_property_is_unavailable() {
        let id = Identity::parse("069a79f444e94726a5befca90e38aaf5").unwrap();
        let url = format!("http://session.test/session/minecraft/profile/{}", id);
        let http = FakeHttp::default().route(&url, 200, r#"{"properties":[]}"#);
        let r = TextureResolver::new(Arc::new(http), "http://session.test");
        assert!(matches!(
            r.resolve_texture(&id),
            Err(ResolveError::Unavailable(_))
        ));

        let down = TextureResolver::new(
            Arc::new(FakeHttp::default().route(&url, 500, "")),
            "http://session.test",
        );
        assert!(matches!(
            down.resolve_texture(&id),
            Err(ResolveError::Unavailable(_))
        ));
    }
}
