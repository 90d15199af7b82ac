use crate::cli::commands::ValidateArgs;
use crate::config::credentials::redact_credentials;
use crate::config::parse_config;
use crate::errors::RoofdeskError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), RoofdeskError> {
    let config = parse_config(&args.config).await?;

    let secrets: Vec<&str> = [config.server.api_token.as_deref(), config.geocoding.api_key.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let effective = serde_yaml::to_string(&config)?;

    println!("Configuration is valid: {}", args.config.display());
    println!("{}", redact_credentials(&effective, &secrets));
    Ok(())
}
