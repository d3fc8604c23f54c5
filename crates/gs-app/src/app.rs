use std::io::Write;

use anyhow::{Result, bail, ensure};
use gs_ascii::{paginate, render, render_layer, stack_grids};
use gs_core::bounds::{Bounds, union_bounds};
use gs_core::config::RenderConfig;
use gs_core::error::single_char;
use gs_core::geometry::Feature;

use crate::cli::Cli;

/// Merge command-line overrides over the loaded configuration.
///
/// `--fill` sets both the single-render and the stacked background.
///
/// # Errors
/// Returns an error if `--bbox` does not carry four values.
pub fn apply_overrides(cli: &Cli, config: &mut RenderConfig) -> Result<()> {
    if let Some(width) = cli.width {
        config.render.width = width;
    }
    if let Some(ref fill) = cli.fill {
        config.render.fill.clone_from(fill);
        config.stack.fill.clone_from(fill);
    }
    if let Some(value) = cli.value.first() {
        config.render.value.clone_from(value);
    }
    if cli.all_touched {
        config.render.all_touched = true;
    }
    if let Some(ref bbox) = cli.bbox {
        let &[x_min, y_min, x_max, y_max] = bbox.as_slice() else {
            bail!("--bbox takes four values, got {}", bbox.len());
        };
        config.render.bbox = Some(Bounds::new(x_min, y_min, x_max, y_max));
    }
    if cli.properties.is_some() {
        config.properties.clone_from(&cli.properties);
    }
    Ok(())
}

/// Value characters for `layers` stacked layers.
///
/// Explicit values are used in order, otherwise the ramp; either cycles
/// when there are more layers than characters.
///
/// # Errors
/// Returns an error if no value is given and the ramp is empty.
pub fn layer_values(explicit: &[String], ramp: &str, layers: usize) -> Result<Vec<String>> {
    let pool: Vec<String> = if explicit.is_empty() {
        ramp.chars().map(String::from).collect()
    } else {
        explicit.to_vec()
    };
    ensure!(!pool.is_empty(), "stack ramp is empty");
    if pool.len() < layers {
        log::warn!("{layers} layers for {} values, reusing values", pool.len());
    }
    Ok(pool.into_iter().cycle().take(layers).collect())
}

/// Render every input and write the result.
///
/// One input is rendered directly; several are rendered against a shared
/// extent and stacked, first input at the bottom. With `paginate`, each
/// feature of each input gets its own page.
///
/// # Errors
/// Any read, render or stack error.
pub fn run(
    layers: Vec<Vec<Feature>>,
    values: &[String],
    paginate_features: bool,
    config: &RenderConfig,
    out: &mut impl Write,
) -> Result<()> {
    if paginate_features {
        for features in layers {
            for page in paginate(features, config.properties.clone(), config.render.clone()) {
                out.write_all(page?.as_bytes())?;
            }
        }
        return Ok(());
    }

    if layers.len() == 1 {
        if values.len() > 1 {
            log::warn!("single input, ignoring {} extra values", values.len() - 1);
        }
        let features: Vec<Feature> = layers.into_iter().flatten().collect();
        out.write_all(render(features, &config.render)?.as_bytes())?;
        return Ok(());
    }

    let bbox = match config.render.bbox {
        Some(bbox) => bbox,
        None => union_bounds(layers.iter().flatten().map(|f| &f.geometry))?,
    };
    let fill = single_char("fill value", &config.stack.fill)?;
    let values = layer_values(values, &config.stack.ramp, layers.len())?;
    log::debug!("stacking {} layers over {bbox:?}", layers.len());

    let grids = layers
        .into_iter()
        .zip(values)
        .map(|(features, value)| {
            let options = config
                .render
                .clone()
                .with_bbox(bbox)
                .with_symbols(" ", &value);
            render_layer(features, &options)
        })
        .collect::<gs_core::Result<Vec<_>>>()?;
    out.write_all(stack_grids(&grids, fill)?.to_text().as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use gs_core::geometry::Geometry;

    fn run_to_string(layers: Vec<Vec<Feature>>, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut config = RenderConfig::default();
        apply_overrides(&cli, &mut config)?;
        let mut out = Vec::new();
        run(layers, &cli.value, cli.paginate, &config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn point(x: f64, y: f64) -> Vec<Feature> {
        vec![Feature::new(Geometry::point(x, y))]
    }

    #[test]
    fn single_input_is_rendered() {
        let square = vec![Feature::new(Geometry::rectangle(0.0, 0.0, 3.0, 3.0))];
        let text = run_to_string(vec![square], &["geoscii", "-w", "3", "-v", "*", "-"]).unwrap();
        assert_eq!(text, "* * *\n* * *\n* * *\n");
    }

    #[test]
    fn several_inputs_share_extent_and_ramp() {
        let text = run_to_string(
            vec![point(0.0, 0.0), point(3.0, 3.0)],
            &["geoscii", "-w", "4", "-f", ".", "a", "b"],
        )
        .unwrap();
        assert_eq!(text, ". . . 1\n. . . .\n. . . .\n0 . . .\n");
    }

    #[test]
    fn explicit_values_follow_input_order() {
        let text = run_to_string(
            vec![point(0.0, 0.0), point(3.0, 3.0)],
            &["geoscii", "-w", "4", "-f", ".", "-v", "x", "-v", "y", "a", "b"],
        )
        .unwrap();
        assert_eq!(text, ". . . y\n. . . .\n. . . .\nx . . .\n");
    }

    #[test]
    fn pages_carry_property_tables() {
        let features = vec![
            Feature::new(Geometry::point(0.0, 0.0)).with_property("NAME", "a"),
            Feature::new(Geometry::point(1.0, 1.0)).with_property("NAME", "b"),
        ];
        let text = run_to_string(
            vec![features],
            &["geoscii", "-w", "1", "--paginate", "--properties", "NAME", "-"],
        )
        .unwrap();
        assert_eq!(
            text,
            concat!(
                "+------+---+\n| NAME | a |\n+------+---+\n+\n\n",
                "+------+---+\n| NAME | b |\n+------+---+\n+\n\n",
            )
        );
    }

    #[test]
    fn render_errors_surface() {
        assert!(run_to_string(vec![point(0.0, 0.0)], &["geoscii", "-w", "0", "-"]).is_err());
        assert!(run_to_string(vec![Vec::new()], &["geoscii", "-"]).is_err());
    }

    #[test]
    fn ramp_cycles_past_its_end() {
        let values = layer_values(&[], "ab", 5).unwrap();
        assert_eq!(values, ["a", "b", "a", "b", "a"]);
        assert!(layer_values(&[], "", 1).is_err());
    }
}
