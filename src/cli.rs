use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::AreaBounds;
use crate::error::OverlayError;
use crate::overlay::OverlayKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "seachart")]
#[command(about = "Maritime routes, hazards and traffic on a terminal world map")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Backend
    /// Base URL of the routing backend
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub api_url: String,

    /// HTTP request timeout (seconds)
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// How long catalog lookups stay cached (seconds)
    #[arg(long, default_value = "86400")]
    pub catalog_ttl_secs: u64,

    // Display
    /// Overlay group to hide at startup (repeatable, e.g. `--hide piracy`)
    #[arg(long = "hide", value_name = "GROUP")]
    pub hidden: Vec<String>,

    /// Print results instead of starting the terminal UI
    #[arg(long)]
    pub no_tui: bool,

    // Debug
    /// Custom cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Calculate a route between two ports and show its hazards
    Route {
        /// Origin port code (e.g. CNSHA)
        origin: String,
        /// Destination port code (e.g. USLAX)
        destination: String,
    },

    /// Track vessels in an ocean region or bounding box
    Vessels {
        /// Named ocean region (see `regions`)
        #[arg(long, conflicts_with = "bbox")]
        region: Option<String>,

        /// Custom box as `sw_lat,sw_lon,ne_lat,ne_lon`
        #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true)]
        bbox: Option<AreaBounds>,

        /// Maximum number of vessels to load
        #[arg(long, default_value = "500")]
        limit: u32,
    },

    /// Browse water bodies, their countries and ports
    Catalog {
        water_body: Option<String>,
        country: Option<String>,
    },

    /// List the ocean regions available for vessel tracking
    Regions,

    /// Current weather and forecast at a position
    Weather {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

impl Args {
    /// Groups named by `--hide`
    pub fn hidden_groups(&self) -> Result<Vec<OverlayKind>, OverlayError> {
        self.hidden.iter().map(|name| name.parse()).collect()
    }

    /// Whether this invocation draws on the terminal map
    pub fn wants_tui(&self) -> bool {
        !self.no_tui
            && matches!(
                self.command,
                None | Some(Command::Route { .. }) | Some(Command::Vessels { .. })
            )
    }
}

/// Parse `sw_lat,sw_lon,ne_lat,ne_lon`
fn parse_bbox(s: &str) -> Result<AreaBounds, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;

    let [sw_lat, sw_lon, ne_lat, ne_lon] = parts[..] else {
        return Err(format!("expected 4 comma-separated numbers, got {}", parts.len()));
    };
    if !(-90.0..=90.0).contains(&sw_lat) || !(-90.0..=90.0).contains(&ne_lat) {
        return Err("latitude must be within -90..90".to_string());
    }
    if sw_lat >= ne_lat {
        return Err("south-west latitude must be below north-east latitude".to_string());
    }

    Ok(AreaBounds {
        sw_lat,
        sw_lon,
        ne_lat,
        ne_lon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox() {
        let bbox = parse_bbox("54,10,-56 ,14").unwrap_err();
        assert!(bbox.contains("below"));

        let bbox = parse_bbox("-10.5,170,5,-170").unwrap();
        assert_eq!(bbox.sw_lat, -10.5);
        assert_eq!(bbox.ne_lon, -170.0);

        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("a,2,3,4").is_err());
    }

    #[test]
    fn test_hidden_groups() {
        let args = Args::parse_from(["seachart", "--hide", "piracy", "--hide", "port_ships"]);
        assert_eq!(
            args.hidden_groups().unwrap(),
            vec![OverlayKind::Piracy, OverlayKind::PortShips]
        );

        let args = Args::parse_from(["seachart", "--hide", "weather"]);
        assert_eq!(
            args.hidden_groups().unwrap_err(),
            OverlayError::UnknownGroup("weather".to_string())
        );
    }

    #[test]
    fn test_subcommands() {
        let args = Args::parse_from(["seachart", "--no-tui", "route", "CNSHA", "USLAX"]);
        assert!(matches!(
            args.command,
            Some(Command::Route { ref origin, .. }) if origin == "CNSHA"
        ));
        assert!(!args.wants_tui());

        let args = Args::parse_from(["seachart", "weather", "-33.9", "18.4"]);
        assert!(matches!(args.command, Some(Command::Weather { lat, .. }) if lat == -33.9));
        assert!(!args.wants_tui());

        let args = Args::parse_from(["seachart", "vessels", "--region", "Baltic Sea"]);
        assert!(args.wants_tui());
        assert_eq!(args.timeout_secs, 30);
    }
}
