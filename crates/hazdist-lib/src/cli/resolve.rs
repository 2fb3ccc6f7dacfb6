use crate::cli::ResolveParams;
use crate::error::HazDistError;
use crate::http::build_client;
use crate::version::resolve_version;

pub async fn run_resolve(params: ResolveParams) -> Result<String, HazDistError> {
    let ResolveParams {
        base_url,
        version_timeout,
        ..
    } = params;

    let client = build_client()?;
    let version = resolve_version(&client, &base_url, version_timeout).await?;

    println!("{version}");
    Ok(version)
}
