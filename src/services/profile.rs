use crate::domain::errors::ResolveError;
use crate::domain::models::{Identity, UserId};
use crate::services::http::HttpGet;
use parking_lot::RwLock;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Directory of users currently connected to the host.
pub trait PlayerDirectory: Send + Sync {
    /// Case-insensitive exact match on the display name.
    fn find_by_name(&self, name: &str) -> Option<Identity>;

    /// The connected user behind a display name, matched like `find_by_name`.
    fn find_user(&self, name: &str) -> Option<UserId>;
}

#[derive(Default)]
pub struct OnlineDirectory {
    by_name: RwLock<HashMap<String, (UserId, Identity)>>,
}

impl OnlineDirectory {
    pub fn join(&self, user: UserId, name: &str, identity: Identity) {
        self.by_name
            .write()
            .insert(name.to_lowercase(), (user, identity));
    }

    pub fn leave(&self, user: &UserId) {
        self.by_name.write().retain(|_, (u, _)| u != user);
    }

    pub fn len(&self) -> usize {
        self.by_name.read().len()
    }
}

impl PlayerDirectory for OnlineDirectory {
    fn find_by_name(&self, name: &str) -> Option<Identity> {
        self.by_name
            .read()
            .get(&name.to_lowercase())
            .map(|(_, id)| id.clone())
    }

    fn find_user(&self, name: &str) -> Option<UserId> {
        self.by_name
            .read()
            .get(&name.to_lowercase())
            .map(|(user, _)| user.clone())
    }
}

#[derive(Deserialize)]
struct NameLookupBody {
    id: String,
}

pub struct ProfileResolver {
    directory: Arc<dyn PlayerDirectory>,
    http: Arc<dyn HttpGet>,
    api_base: String,
}

impl ProfileResolver {
    pub fn new(directory: Arc<dyn PlayerDirectory>, http: Arc<dyn HttpGet>, api_base: &str) -> Self {
        Self {
            directory,
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// The name is a single percent-encoded path segment, so `/`, `?` or `#`
    /// in it cannot change the request target.
    fn lookup_url(&self, name: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("api base cannot carry a path"))?
            .pop_if_empty()
            .extend(["users", "profiles", "minecraft", name]);
        Ok(url)
    }

    pub fn resolve_identity(&self, name: &str) -> Result<Identity, ResolveError> {
        if let Some(identity) = self.directory.find_by_name(name) {
            debug!(name, %identity, "identity resolved from live directory");
            return Ok(identity);
        }

        let not_found = || ResolveError::NotFound(name.to_string());
        let url = self.lookup_url(name).map_err(|e| {
            warn!(name, api_base = %self.api_base, error = %e, "cannot build identity lookup url");
            not_found()
        })?;
        let resp = self.http.get(url.as_str()).map_err(|e| {
            warn!(name, error = %e, "identity lookup failed");
            not_found()
        })?;
        if resp.status != 200 {
            warn!(name, status = resp.status, "identity lookup not OK");
            return Err(not_found());
        }
        let body: NameLookupBody = serde_json::from_str(&resp.body).map_err(|e| {
            warn!(name, error = %e, "could not parse identity response");
            not_found()
        })?;
        Identity::parse(&body.id).ok_or_else(|| {
            warn!(name, id = %body.id, "identity response carried a malformed id");
            not_found()
        })
    }
}
