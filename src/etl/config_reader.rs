use crate::args::Args;
use crate::etl::*;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const URL_2024: &str =
    "https://www.data.gouv.fr/fr/datasets/r/27345cbc-7e49-4050-8cfc-be3ad1865890";
pub const URL_2022: &str =
    "https://www.data.gouv.fr/fr/datasets/r/33705a8a-7024-4311-a3f9-988063b0e10e";
pub const DEFAULT_DATABASE: &str = "legislatives.sqlite";
pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "url2024")]
    pub url_2024: Option<String>,
    #[serde(rename = "url2022")]
    pub url_2022: Option<String>,
    #[serde(rename = "path2024")]
    pub path_2024: Option<String>,
    #[serde(rename = "path2022")]
    pub path_2022: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub path: Option<String>,
    #[serde(rename = "replaceTables")]
    pub replace_tables: Option<bool>,
}

/// The content of the JSON configuration file. Every entry is optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sources: Option<SourceSettings>,
    pub database: Option<DatabaseSettings>,
    #[serde(rename = "batchSize")]
    pub batch_size: Option<usize>,
    #[serde(rename = "fetchTimeoutSecs")]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(rename = "swapCandidateYearTags")]
    pub swap_candidate_year_tags: Option<bool>,
}

pub fn read_config(path: &str) -> EtlResult<PipelineConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: PipelineConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

/// The settings of a run, once the command line, the configuration file and
/// the defaults have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub url_2024: String,
    pub url_2022: String,
    pub path_2024: Option<String>,
    pub path_2022: Option<String>,
    pub database_path: String,
    pub replace_tables: bool,
    pub batch_size: usize,
    pub fetch_timeout: Duration,
    pub swap_candidate_year_tags: bool,
}

impl Settings {
    pub fn resolve(config: &PipelineConfig, args: &Args) -> EtlResult<Settings> {
        let sources = config.sources.clone().unwrap_or_default();
        let database = config.database.clone().unwrap_or_default();

        let batch_size = args
            .batch_size
            .or(config.batch_size)
            .unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            whatever!("The batch size must be at least 1");
        }
        let timeout_secs = config
            .fetch_timeout_secs
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        if timeout_secs == 0 {
            whatever!("The fetch timeout must be at least 1 second");
        }

        Ok(Settings {
            url_2024: sources.url_2024.unwrap_or_else(|| URL_2024.to_string()),
            url_2022: sources.url_2022.unwrap_or_else(|| URL_2022.to_string()),
            path_2024: args.input_2024.clone().or(sources.path_2024),
            path_2022: args.input_2022.clone().or(sources.path_2022),
            database_path: args
                .database
                .clone()
                .or(database.path)
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            replace_tables: database.replace_tables.unwrap_or(true),
            batch_size,
            fetch_timeout: Duration::from_secs(timeout_secs),
            swap_candidate_year_tags: config.swap_candidate_year_tags.unwrap_or(false),
        })
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            swap_candidate_year_tags: self.swap_candidate_year_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(flags: &[&str]) -> Args {
        let mut all = vec!["legiscrape"];
        all.extend_from_slice(flags);
        Args::parse_from(all)
    }

    #[test]
    fn defaults() {
        let s = Settings::resolve(&PipelineConfig::default(), &args(&[])).unwrap();
        assert_eq!(s.url_2024, URL_2024);
        assert_eq!(s.url_2022, URL_2022);
        assert_eq!(s.path_2024, None);
        assert_eq!(s.database_path, DEFAULT_DATABASE);
        assert!(s.replace_tables);
        assert_eq!(s.batch_size, 1000);
        assert_eq!(s.fetch_timeout, Duration::from_secs(120));
        assert!(!s.swap_candidate_year_tags);
    }

    #[test]
    fn parse_config_file_content() {
        let js = r#"{
            "sources": { "url2024": "http://localhost/2024.xlsx", "path2022": "/tmp/2022.xlsx" },
            "database": { "path": "out.sqlite", "replaceTables": false },
            "batchSize": 250,
            "fetchTimeoutSecs": 30,
            "swapCandidateYearTags": true
        }"#;
        let config: PipelineConfig = serde_json::from_str(js).unwrap();
        let s = Settings::resolve(&config, &args(&[])).unwrap();
        assert_eq!(s.url_2024, "http://localhost/2024.xlsx");
        assert_eq!(s.url_2022, URL_2022);
        assert_eq!(s.path_2022, Some("/tmp/2022.xlsx".to_string()));
        assert_eq!(s.database_path, "out.sqlite");
        assert!(!s.replace_tables);
        assert_eq!(s.batch_size, 250);
        assert_eq!(s.fetch_timeout, Duration::from_secs(30));
        assert!(s.assembly_options().swap_candidate_year_tags);
    }

    #[test]
    fn command_line_overrides_config() {
        let config = PipelineConfig {
            database: Some(DatabaseSettings {
                path: Some("config.sqlite".to_string()),
                replace_tables: None,
            }),
            batch_size: Some(10),
            ..Default::default()
        };
        let s = Settings::resolve(
            &config,
            &args(&["-d", "cli.sqlite", "--batch-size", "20", "--input-2024", "a.xlsx"]),
        )
        .unwrap();
        assert_eq!(s.database_path, "cli.sqlite");
        assert_eq!(s.batch_size, 20);
        assert_eq!(s.path_2024, Some("a.xlsx".to_string()));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let res = Settings::resolve(&PipelineConfig::default(), &args(&["--batch-size", "0"]));
        assert!(res.is_err());
    }

    #[test]
    fn missing_config_file() {
        let res = read_config("/nonexistent/legiscrape.json");
        assert!(matches!(res, Err(EtlError::OpeningJson { .. })));
    }
}
