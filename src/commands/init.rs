use anyhow::Result;
use revstrata::config::Config;
use std::path::PathBuf;

/// Write a starter configuration file and create the results directory.
pub async fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("revstrata.toml");

    let toml_content = format!(
        r#"# Revstrata configuration

[credentials]
# api_key = "..."        # falls back to SCRAPINGBEE_API_KEY
# cookies = "..."        # falls back to AMAZON_COOKIES

[fetch]
endpoint = "{}"
request_timeout_secs = {}
block_resources = {}

[sampling]
review_pages = {}
max_bucket_pages = {}
main_page_delay_ms = {}
bucket_page_delay_ms = {}
review_url_template = "{}"

[enrich]
endpoint = "{}"
model = "{}"
# api_key = "..."        # falls back to OPENAI_API_KEY

[output]
results_dir = "{}"

[logging]
format = "text"
level = "info"
"#,
        config.fetch.endpoint,
        config.fetch.request_timeout_secs,
        config.fetch.block_resources,
        config.sampling.review_pages,
        config.sampling.max_bucket_pages,
        config.sampling.main_page_delay_ms,
        config.sampling.bucket_page_delay_ms,
        config.sampling.review_url_template,
        config.enrich.endpoint,
        config.enrich.model,
        config.output.results_dir.display(),
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    let results_dir = path.join(&config.output.results_dir);
    std::fs::create_dir_all(&results_dir)?;
    println!("Created results directory: {}", results_dir.display());

    Ok(())
}
