use crate::domain::constants::FALLBACK_ICON;
use crate::domain::errors::{IconUnavailable, ResolveError};
use crate::domain::models::{IconSpec, ResolvedTexture, Tile, TileIcon};
use crate::services::profile::ProfileResolver;
use crate::services::texture::{decode_texture_url_from, TextureResolver, TextureSource};
use std::collections::BTreeMap;
use tracing::warn;

pub struct IconBuilder {
    profiles: ProfileResolver,
    textures: TextureResolver,
}

impl IconBuilder {
    pub fn new(profiles: ProfileResolver, textures: TextureResolver) -> Self {
        Self { profiles, textures }
    }

    /// Name → identity → texture property → skin URL. No caching: every
    /// call goes through the lookups again.
    pub fn resolve_player(&self, name: &str) -> Result<ResolvedTexture, ResolveError> {
        let identity = self.profiles.resolve_identity(name)?;
        let blob = self.textures.resolve_texture(&identity)?;
        let direct_image_url = decode_texture_url_from(&blob, TextureSource::ApiFetched)?;
        Ok(ResolvedTexture {
            identity,
            direct_image_url,
        })
    }

    fn visual(&self, spec: &IconSpec) -> Result<TileIcon, ResolveError> {
        match spec {
            IconSpec::Static { icon } => Ok(TileIcon::Static { icon: icon.clone() }),
            IconSpec::Player { name } => {
                let resolved = self.resolve_player(name)?;
                Ok(TileIcon::Skin {
                    url: resolved.direct_image_url,
                    owner: Some(resolved.identity),
                })
            }
            IconSpec::Texture { value } => Ok(TileIcon::Skin {
                url: decode_texture_url_from(value, TextureSource::ConfigLiteral)?,
                owner: None,
            }),
        }
    }

    pub fn build(
        &self,
        spec: &IconSpec,
        display_name: &str,
        description_lines: &[String],
        metadata: BTreeMap<String, String>,
    ) -> Result<Tile, IconUnavailable> {
        let icon = self.visual(spec).map_err(|cause| IconUnavailable {
            entry: display_name.to_string(),
            cause,
        })?;
        Ok(Tile::new(
            icon,
            display_name,
            description_lines.to_vec(),
            metadata,
        ))
    }

    /// Like `build`, but an unresolvable visual degrades to the fallback icon
    /// so the rest of the page still renders.
    pub fn build_or_fallback(
        &self,
        spec: &IconSpec,
        display_name: &str,
        description_lines: &[String],
        metadata: BTreeMap<String, String>,
    ) -> Tile {
        match self.build(spec, display_name, description_lines, metadata.clone()) {
            Ok(tile) => tile,
            Err(e) => {
                warn!(error = %e, "falling back to default icon");
                self.fallback_tile(display_name, description_lines, metadata)
            }
        }
    }

    pub fn fallback_tile(
        &self,
        display_name: &str,
        description_lines: &[String],
        metadata: BTreeMap<String, String>,
    ) -> Tile {
        Tile::new(
            TileIcon::Static {
                icon: FALLBACK_ICON.to_string(),
            },
            display_name,
            description_lines.to_vec(),
            metadata,
        )
    }
}
