pub mod domain;
pub mod ingest;
pub mod llm;
pub mod ranking;
pub mod storage;
pub mod time;

pub mod config {
    use std::path::PathBuf;
    use std::str::FromStr;

    /// Which output schema a run produces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum Variant {
        /// Top-30 overall, flat string lists for transfers.
        #[default]
        Flat,
        /// Per-position groups, transfers keyed by position with 1/4/5/2 picks.
        Positional,
    }

    impl Variant {
        pub fn as_str(self) -> &'static str {
            match self {
                Variant::Flat => "flat",
                Variant::Positional => "positional",
            }
        }

        /// Where the presentation layer expects this variant's file.
        pub fn default_output_path(self) -> PathBuf {
            match self {
                Variant::Flat => PathBuf::from("data/picks.json"),
                Variant::Positional => PathBuf::from("public/picks.json"),
            }
        }
    }

    impl FromStr for Variant {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "flat" => Ok(Variant::Flat),
                "positional" | "position" => Ok(Variant::Positional),
                other => Err(format!(
                    "unknown picks variant {other:?} (expected \"flat\" or \"positional\")"
                )),
            }
        }
    }

    impl std::fmt::Display for Variant {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub groq_api_key: Option<String>,
        pub groq_model: Option<String>,
        pub groq_base_url: Option<String>,
        pub groq_timeout_secs: Option<u64>,
        pub fpl_base_url: Option<String>,
        pub fpl_timeout_secs: Option<u64>,
        pub picks_variant: Option<String>,
        pub picks_output_path: Option<PathBuf>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                groq_api_key: non_empty_var("GROQ_API_KEY"),
                groq_model: non_empty_var("GROQ_MODEL"),
                groq_base_url: non_empty_var("GROQ_BASE_URL"),
                groq_timeout_secs: parsed_var("GROQ_TIMEOUT_SECS")?,
                fpl_base_url: non_empty_var("FPL_BASE_URL"),
                fpl_timeout_secs: parsed_var("FPL_TIMEOUT_SECS")?,
                picks_variant: non_empty_var("PICKS_VARIANT"),
                picks_output_path: non_empty_var("PICKS_OUTPUT_PATH").map(PathBuf::from),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn variant(&self) -> anyhow::Result<Variant> {
            match self.picks_variant.as_deref() {
                Some(s) => s.parse::<Variant>().map_err(anyhow::Error::msg),
                None => Ok(Variant::default()),
            }
        }
    }

    // An empty GROQ_API_KEY= line in .env counts as "not configured".
    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T: FromStr>(key: &str) -> anyhow::Result<Option<T>> {
        match non_empty_var(key) {
            Some(s) => s
                .parse::<T>()
                .map(Some)
                .map_err(|_| anyhow::anyhow!("{key} has an invalid value: {s:?}")),
            None => Ok(None),
        }
    }

}
