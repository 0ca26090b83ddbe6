//! Command-line interface definitions.
//!
//! Credentials can be given as flags or through the environment, and take
//! precedence over the values in the configuration file.

use crate::config::CredentialOverrides;
use crate::tools::FetchNewsInput;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Aggregate news search results by category and publish them as a page.
///
/// # Examples
///
/// ```sh
/// # Print today's results as JSON
/// news_to_notion fetch --categories AI,경제 --count 5
///
/// # Publish previously fetched results
/// news_to_notion fetch > results.json
/// news_to_notion publish --title "Morning digest" < results.json
///
/// # Both in one run
/// news_to_notion digest --template compact
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to config.yaml
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Naver API client id
    #[arg(long, env = "NAVER_CLIENT_ID", hide_env_values = true)]
    pub naver_client_id: Option<String>,

    /// Naver API client secret
    #[arg(long, env = "NAVER_CLIENT_SECRET", hide_env_values = true)]
    pub naver_client_secret: Option<String>,

    /// Notion integration token
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
    pub notion_api_key: Option<String>,

    /// Page new pages are created under
    #[arg(long, env = "NOTION_PARENT_PAGE_ID")]
    pub notion_parent_page_id: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate news and print the results as JSON
    Fetch {
        #[command(flatten)]
        selection: Selection,

        /// Also write the JSON results to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Publish stdin as a page: fetched JSON results or markdown text
    Publish {
        /// Page title
        #[arg(short, long)]
        title: String,

        /// Template used for JSON results (default, compact)
        #[arg(long)]
        template: Option<String>,
    },

    /// Aggregate news and publish it in one run
    Digest {
        #[command(flatten)]
        selection: Selection,

        /// Page title, defaults to today's digest title
        #[arg(short, long)]
        title: Option<String>,

        /// Page template (default, compact)
        #[arg(long)]
        template: Option<String>,
    },
}

/// Which news to aggregate. Anything left out comes from the configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct Selection {
    /// Comma-separated categories
    #[arg(long, value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Articles per category (1-100)
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Keep only articles written in Korean (`--only-korean false` to disable)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub only_korean: Option<bool>,
}

impl Cli {
    pub fn credential_overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            naver_client_id: self.naver_client_id.clone(),
            naver_client_secret: self.naver_client_secret.clone(),
            notion_api_key: self.notion_api_key.clone(),
            notion_parent_page_id: self.notion_parent_page_id.clone(),
        }
    }
}

impl From<Selection> for FetchNewsInput {
    fn from(selection: Selection) -> Self {
        Self {
            categories: selection.categories,
            count_per_category: selection.count,
            only_korean: selection.only_korean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_parsing() {
        let cli = Cli::parse_from([
            "news_to_notion",
            "fetch",
            "--categories",
            "AI,경제",
            "--count",
            "5",
            "--only-korean",
            "false",
            "-o",
            "out/results.json",
        ]);

        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        let Command::Fetch { selection, output } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(
            selection.categories,
            Some(vec!["AI".to_string(), "경제".to_string()])
        );
        assert_eq!(selection.count, Some(5));
        assert_eq!(selection.only_korean, Some(false));
        assert_eq!(output.as_deref(), Some("out/results.json"));
    }

    #[test]
    fn test_fetch_defaults_come_from_config() {
        let cli = Cli::parse_from(["news_to_notion", "--config", "/etc/news.yaml", "fetch"]);

        assert_eq!(cli.config, PathBuf::from("/etc/news.yaml"));
        let Command::Fetch { selection, .. } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(FetchNewsInput::from(selection), FetchNewsInput::default());
    }

    #[test]
    fn test_publish_requires_title() {
        assert!(Cli::try_parse_from(["news_to_notion", "publish"]).is_err());

        let cli = Cli::parse_from([
            "news_to_notion",
            "publish",
            "--title",
            "Morning",
            "--template",
            "compact",
        ]);
        let Command::Publish { title, template } = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(title, "Morning");
        assert_eq!(template.as_deref(), Some("compact"));
    }

    #[test]
    fn test_credential_flags_become_overrides() {
        let cli = Cli::parse_from([
            "news_to_notion",
            "--naver-client-id",
            "id",
            "--notion-parent-page-id",
            "page",
            "digest",
            "-n",
            "3",
            "--only-korean",
        ]);

        let overrides = cli.credential_overrides();
        assert_eq!(overrides.naver_client_id.as_deref(), Some("id"));
        assert_eq!(overrides.notion_parent_page_id.as_deref(), Some("page"));
        assert!(matches!(
            cli.command,
            Command::Digest {
                selection: Selection {
                    count: Some(3),
                    only_korean: Some(true),
                    ..
                },
                title: None,
                ..
            }
        ));
    }
}
