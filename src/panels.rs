//! Detail panel builders for backend records.

use crate::api::{
    AreaProperties, Chokepoint, Collision, Disaster, PiracyIncident, PortInfo, Ship, Weather,
};
use crate::geo::LatLon;
use crate::overlay::DetailPanel;

/// `CARGO_SHIP` -> `Cargo Ship`
fn title_case(raw: &str) -> String {
    raw.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn coords(point: LatLon) -> String {
    format!("{:.4}, {:.4}", point.lat, point.lon)
}

pub fn ship(ship: &Ship) -> DetailPanel {
    let size = match (ship.length_meters, ship.width_meters) {
        (Some(l), Some(w)) => Some(format!("{l:.0} x {w:.0} m")),
        _ => None,
    };

    let mut panel = DetailPanel::new(ship.display_name());
    if let Some(kind) = ship.vessel_type.as_deref() {
        panel = panel.subtitle(title_case(kind));
    }

    panel
        .row_opt("MMSI", ship.mmsi.as_deref())
        .row_opt("IMO", ship.imo.as_deref())
        .row_opt("Flag", ship.country.as_deref())
        .row_opt(
            "Destination",
            ship.destination_name.as_deref().filter(|d| !d.trim().is_empty()),
        )
        .row_opt("Speed", ship.speed_kmh.map(|s| format!("{s:.1} km/h")))
        .row_opt("Bearing", ship.bearing_deg.map(|b| format!("{b:.0}°")))
        .row_opt("Draught", ship.draught_meters.map(|d| format!("{d:.1} m")))
        .row_opt("Size", size)
        .row_opt("Position", ship.position().map(coords))
}

pub fn disaster(disaster: &Disaster) -> DetailPanel {
    let mut panel = DetailPanel::new(disaster.display_title());
    if let Some(kind) = disaster.event_type.as_deref() {
        panel = panel.subtitle(kind.to_string());
    }

    let status = disaster
        .is_current
        .map(|current| if current { "Ongoing" } else { "Past" });

    panel
        .row("Alert", disaster.alert_level.as_deref().unwrap_or("Unknown"))
        .row_opt("Status", status)
        .row_opt("From", disaster.from_date.as_deref())
        .row_opt("To", disaster.to_date.as_deref())
        .row_opt("GDACS", disaster.gdacs_id.as_deref())
        .row_opt("Position", disaster.position().map(coords))
        .row_opt("Link", disaster.link.as_deref())
}

pub fn disaster_area(disaster: &Disaster) -> DetailPanel {
    DetailPanel::new(format!("Disaster Area: {}", disaster.display_title()))
        .row("Alert", disaster.alert_level.as_deref().unwrap_or("Unknown"))
        .row_opt("Type", disaster.event_type.as_deref())
}

pub fn port(port: &PortInfo, is_origin: bool) -> DetailPanel {
    let mut panel = DetailPanel::new(port.display_name())
        .subtitle(if is_origin { "Origin port" } else { "Destination port" })
        .row_opt("Code", port.display_code())
        .row_opt("Harbor size", port.harbor_size.as_deref())
        .row_opt("Harbor type", port.harbor_type.as_deref())
        .row_opt("Position", port.position().map(coords));

    if let Some(congestion) = &port.congestion {
        let state = if congestion.congested { "Congested" } else { "Normal" };
        panel = panel.row("Traffic", state).row_opt(
            "Ships nearby",
            congestion.ship_count.map(|count| match congestion.radius_km {
                Some(radius) => format!("{count} within {radius:.0} km"),
                None => count.to_string(),
            }),
        );
    }
    panel
}

pub fn collision(collision: &Collision) -> DetailPanel {
    let a = &collision.vessel_a;
    let b = &collision.vessel_b;

    DetailPanel::new("Collision Alert")
        .subtitle(collision.risk_level.clone())
        .row("Vessel A", a.display_name())
        .row_opt("MMSI A", a.mmsi.as_deref())
        .row("Vessel B", b.display_name())
        .row_opt("MMSI B", b.mmsi.as_deref())
        .row(
            "CPA",
            format!("{:.3} km ({:.3} NM)", collision.cpa_km, collision.cpa_nm()),
        )
        .row("TCPA", format!("{:.1} min", collision.tcpa_minutes))
}

pub fn piracy(incident: &PiracyIncident) -> DetailPanel {
    let title = incident
        .incident_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("Piracy incident");

    DetailPanel::new(title)
        .row_opt(
            "Date",
            incident.incident_date.as_deref().or(incident.date.as_deref()),
        )
        .row_opt("Incident", incident.incident_number.as_deref().filter(|n| !n.is_empty()))
        .row_opt("Location", incident.location_desc.as_deref().filter(|l| !l.is_empty()))
        .row_opt("Address", incident.address.as_deref())
        .row_opt("Sitrep", incident.sitrep.as_deref().filter(|s| !s.is_empty()))
}

pub fn chokepoint(chokepoint: &Chokepoint, ship_count: usize) -> DetailPanel {
    DetailPanel::new(chokepoint.name.clone())
        .subtitle("Chokepoint")
        .row("Ships", format!("{ship_count} in chokepoint area"))
        .row("Position", coords(LatLon::new(chokepoint.lat, chokepoint.lon)))
}

pub fn protected_area(properties: &AreaProperties) -> DetailPanel {
    let kind = properties.area_type.as_deref().unwrap_or("Protected");
    DetailPanel::new(format!("{kind} Area"))
        .row_opt("Name", properties.clean_name())
        .row_opt("Description", properties.description.as_deref())
}

pub fn weather(weather: &Weather, at: LatLon) -> DetailPanel {
    let mut panel = DetailPanel::new("Weather").subtitle(coords(at));

    if let Some(current) = &weather.current {
        panel = panel
            .row_opt("Current temp", current.temperature_2m.map(|t| format!("{t}°C")))
            .row_opt("Wind speed", current.wind_speed_10m.map(|w| format!("{w} km/h")));
    }

    for day in &weather.forecast {
        let name = day
            .day_name
            .as_deref()
            .or(day.date.as_deref())
            .unwrap_or("?");
        let temp = day.avg_temp.map_or("-".to_string(), |t| format!("{t}°C"));
        let wind = day.avg_wind.map_or("-".to_string(), |w| format!("{w} km/h"));
        panel = panel.row(name, format!("{temp}, {wind}"));
    }
    panel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("CARGO_SHIP"), "Cargo Ship");
        assert_eq!(title_case("TANKER"), "Tanker");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_ship_panel() {
        let ship: Ship = serde_json::from_str(
            r#"{"boatName": "STENA GOTHICA", "mmsi": 265000000, "vesselType": "CARGO_SHIP",
                "destinationName": "", "speedKmh": 25.0, "lengthMeters": 188, "widthMeters": 29,
                "point": {"latitude": 57.7, "longitude": 11.9}}"#,
        )
        .unwrap();
        let panel = super::ship(&ship);

        assert_eq!(panel.title, "STENA GOTHICA");
        assert_eq!(panel.subtitle.as_deref(), Some("Cargo Ship"));
        assert_eq!(panel.value("Speed"), Some("25.0 km/h"));
        assert_eq!(panel.value("Size"), Some("188 x 29 m"));
        assert_eq!(panel.value("Destination"), None);
        assert_eq!(panel.value("Position"), Some("57.7000, 11.9000"));
    }

    #[test]
    fn test_collision_panel_units() {
        let collision: Collision = serde_json::from_str(
            r#"{"vessel_a": {"name": "A", "lat": 1.0, "lon": 2.0},
                "vessel_b": {"name": "B", "lat": 1.0, "lon": 2.0},
                "cpa_km": 0.5, "tcpa_minutes": 7.24, "risk_level": "CRITICAL"}"#,
        )
        .unwrap();
        let panel = super::collision(&collision);
        assert_eq!(panel.value("CPA"), Some("0.500 km (0.270 NM)"));
        assert_eq!(panel.value("TCPA"), Some("7.2 min"));
    }

    #[test]
    fn test_weather_panel_lists_forecast() {
        let weather: Weather = serde_json::from_str(
            r#"{"current": {"temperature_2m": 14.2, "wind_speed_10m": 22.1},
                "forecast": [{"day_name": "Monday", "avg_temp": 13.5, "avg_wind": 18.0},
                             {"day_name": "Tuesday"}]}"#,
        )
        .unwrap();
        let panel = super::weather(&weather, LatLon::new(51.9, 4.1));
        assert_eq!(panel.value("Current temp"), Some("14.2°C"));
        assert_eq!(panel.value("Monday"), Some("13.5°C, 18 km/h"));
        assert_eq!(panel.value("Tuesday"), Some("-, -"));
    }
}
