use crate::*;

pub fn handle_lookup_commands(cli: &Cli, settings: &PanelSettings) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Resolve { name } => {
            let http = http_client(settings)?;
            let icons = IconBuilder::new(
                ProfileResolver::new(
                    Arc::new(OnlineDirectory::default()),
                    http.clone(),
                    &settings.profile_api_base,
                ),
                TextureResolver::new(http, &settings.session_api_base),
            );
            let resolved = icons.resolve_player(name)?;
            let report = ResolveReport {
                name: name.clone(),
                identity: resolved.identity,
                texture_url: resolved.direct_image_url,
            };
            print_one(cli.json, report, |r| {
                format!("{}\t{}\t{}", r.name, r.identity, r.texture_url)
            })?;
        }
        Commands::Decode { blob, source } => {
            let url = match source {
                BlobSource::Auto => decode_texture_url(blob)?,
                BlobSource::Api => decode_texture_url_from(blob, TextureSource::ApiFetched)?,
                BlobSource::Config => {
                    decode_texture_url_from(blob, TextureSource::ConfigLiteral)?
                }
            };
            print_one(cli.json, url, |u| u.clone())?;
        }
        _ => return Ok(false),
    }
    Ok(true)
}
