use std::path::PathBuf;

use clap::Parser;

/// geoscii — render GeoJSON geometries as ASCII art.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// GeoJSON files (FeatureCollection, Feature, geometry or array); `-` reads stdin.
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Nombre de colonnes de sortie.
    #[arg(short, long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Background character.
    #[arg(short, long)]
    pub fill: Option<String>,

    /// Character for covered cells; repeat once per input when stacking.
    #[arg(short, long)]
    pub value: Vec<String>,

    /// Cover every cell a geometry touches.
    #[arg(long, default_value_t = false)]
    pub all_touched: bool,

    /// Explicit extent shared by every layer.
    #[arg(
        long,
        num_args = 4,
        value_names = ["XMIN", "YMIN", "XMAX", "YMAX"],
        allow_negative_numbers = true
    )]
    pub bbox: Option<Vec<f64>>,

    /// Une page par feature au lieu d'un seul rendu.
    #[arg(long, default_value_t = false)]
    pub paginate: bool,

    /// Comma-separated properties tabulated above each page.
    #[arg(long, value_delimiter = ',')]
    pub properties: Option<Vec<String>>,

    /// Fichier de configuration TOML.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Check option combinations clap cannot express.
    ///
    /// # Errors
    /// Returns an error if `--properties` is given without `--paginate`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.properties.is_some() && !self.paginate {
            anyhow::bail!("--properties only applies with --paginate");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "geoscii",
            "--width",
            "20",
            "-v",
            "a",
            "-v",
            "b",
            "--bbox",
            "-10",
            "-5",
            "10",
            "5",
            "roads.geojson",
            "lakes.geojson",
        ])
        .unwrap();
        assert_eq!(cli.width, Some(20));
        assert_eq!(cli.value, ["a", "b"]);
        assert_eq!(cli.bbox, Some(vec![-10.0, -5.0, 10.0, 5.0]));
        assert_eq!(cli.inputs, ["roads.geojson", "lakes.geojson"]);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn properties_split_on_commas() {
        let cli = Cli::try_parse_from(["geoscii", "--paginate", "--properties", "NAME,AREA", "-"])
            .unwrap();
        assert_eq!(cli.properties, Some(vec!["NAME".to_string(), "AREA".to_string()]));
    }

    #[test]
    fn properties_require_paginate() {
        let cli = Cli::try_parse_from(["geoscii", "--properties", "NAME", "-"]).unwrap();
        assert!(cli.validate().is_err());
    }

    #[test]
    fn negative_width_reaches_the_renderer() {
        let cli = Cli::try_parse_from(["geoscii", "--width", "-3", "-"]).unwrap();
        assert_eq!(cli.width, Some(-3));
    }

    #[test]
    fn at_least_one_input_is_required() {
        assert!(Cli::try_parse_from(["geoscii"]).is_err());
    }
}
