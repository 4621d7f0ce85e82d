pub mod defaults;

use crate::cli::BuildArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use serde::Deserialize;
use simreport::core::io::pdf::style::{FontFamily, PageFormat, Rgb, Theme};
use simreport::core::plot::PlotImageFormat;
use simreport::engine::config::{ReportConfig, ReportConfigBuilder};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    temp_dir: Option<PathBuf>,
    verbose_console: Option<bool>,
    isolate_temp: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialLayoutConfig {
    columns: Option<usize>,
    page: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPlottingConfig {
    timeout_secs: Option<u64>,
    image_format: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialThemeConfig {
    family: Option<String>,
    accent: Option<String>,
}

/// Report settings as read from a TOML file, before CLI overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialReportConfig {
    output: Option<PartialOutputConfig>,
    layout: Option<PartialLayoutConfig>,
    plotting: Option<PartialPlottingConfig>,
    theme: Option<PartialThemeConfig>,
}

impl PartialReportConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the config file named by `args` (if any) and applies its `-S` overrides.
    pub fn for_build(args: &BuildArgs) -> Result<Self> {
        let mut partial = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.apply_set_values(&args.set_values)?;
        Ok(partial)
    }

    pub fn verbose_console(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.verbose_console)
            .unwrap_or(DefaultsConfig::default().verbose_console)
    }

    /// Resolves every setting, preferring CLI flags over the file and the file
    /// over built-in defaults.
    pub fn merge_with_cli(self, args: &BuildArgs) -> Result<ReportConfig> {
        let defaults = DefaultsConfig::default();
        let verbose = self.verbose_console();

        let output = self.output.unwrap_or_default();
        let layout = self.layout.unwrap_or_default();
        let plotting = self.plotting.unwrap_or_default();
        let theme_config = self.theme.unwrap_or_default();

        let temp_dir = args
            .temp_dir
            .clone()
            .or(output.temp_dir)
            .unwrap_or_else(defaults::default_temp_dir);
        let isolate_temp =
            args.isolate_temp || output.isolate_temp.unwrap_or(defaults.isolate_temp);
        let columns = args
            .columns
            .or(layout.columns)
            .unwrap_or(defaults.columns);
        let timeout_secs = args
            .plot_timeout
            .or(plotting.timeout_secs)
            .unwrap_or(defaults.plot_timeout_secs);
        let plot_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let page = match layout.page {
            Some(p) => parse_named::<PageFormat>("layout.page", &p)?,
            None => defaults.page,
        };
        let image_format = match plotting.image_format {
            Some(f) => parse_named::<PlotImageFormat>("plotting.image-format", &f)?,
            None => defaults.image_format,
        };

        let mut theme = Theme::default();
        if let Some(family) = theme_config.family {
            theme = theme.with_family(parse_named::<FontFamily>("theme.family", &family)?);
        }
        if let Some(accent) = theme_config.accent {
            let color = Rgb::from_hex(&accent).ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid value for theme.accent: '{}' (expected #rrggbb)",
                    accent
                ))
            })?;
            theme = theme.with_accent(color);
        }

        ReportConfigBuilder::new()
            .temp_dir(temp_dir)
            .isolate_temp(isolate_temp)
            .columns(columns)
            .plot_timeout(plot_timeout)
            .plot_format(image_format)
            .verbose(verbose)
            .page(page)
            .theme(theme)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "output.temp-dir" => {
                    self.output.get_or_insert_with(Default::default).temp_dir =
                        Some(PathBuf::from(value_str));
                }
                "output.verbose-console" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .verbose_console = Some(parse_value(key, value_str, "boolean")?);
                }
                "output.isolate-temp" => {
                    self.output.get_or_insert_with(Default::default).isolate_temp =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                "layout.columns" => {
                    self.layout.get_or_insert_with(Default::default).columns =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "layout.page" => {
                    self.layout.get_or_insert_with(Default::default).page =
                        Some(value_str.to_string());
                }
                "plotting.timeout-secs" => {
                    self.plotting
                        .get_or_insert_with(Default::default)
                        .timeout_secs = Some(parse_value(key, value_str, "integer")?);
                }
                "plotting.image-format" => {
                    self.plotting
                        .get_or_insert_with(Default::default)
                        .image_format = Some(value_str.to_string());
                }
                "theme.family" => {
                    self.theme.get_or_insert_with(Default::default).family =
                        Some(value_str.to_string());
                }
                "theme.accent" => {
                    self.theme.get_or_insert_with(Default::default).accent =
                        Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn parse_named<T: FromStr<Err = String>>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
}
