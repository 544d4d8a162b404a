//! Text rendering for weather reports.

use crate::types::{CurrentConditions, Place};
use std::time::Duration;

const WIDTH: usize = 60;

fn value(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(v) => format!("{}{}", v, unit),
        None => "N/A".to_string(),
    }
}

/// Render the framed report shown for a lookup.
pub fn render_report(query: &str, place: &Place, current: &CurrentConditions) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "─".repeat(WIDTH);

    format!(
        "{heavy}\n\
         \x20 WEATHER REPORT: {title}\n\
         {heavy}\n\n\
         📍 Location: {location}\n\
         🕐 Time: {time}\n\n\
         {light}\n\
         \x20 CURRENT CONDITIONS\n\
         {light}\n\n\
         {icon} {description}\n\n\
         🌡️  Temperature:        {temperature}\n\
         🤚 Feels Like:         {feels_like}\n\
         💧 Humidity:           {humidity}\n\
         💨 Wind Speed:         {wind_speed}\n\
         🧭 Wind Direction:     {wind_direction}\n\
         🌧️  Precipitation:      {precipitation} mm\n\
         ☁️  Cloud Cover:        {cloud_cover}\n\
         \n{heavy}\n",
        title = query.trim().to_uppercase(),
        location = place.display_name,
        time = current.time.as_deref().unwrap_or("N/A"),
        icon = current.condition().icon(),
        description = current.description(),
        temperature = value(current.temperature, "°C"),
        feels_like = value(current.feels_like, "°C"),
        humidity = value(current.humidity, "%"),
        wind_speed = value(current.wind_speed, " km/h"),
        wind_direction = value(current.wind_direction, "°"),
        precipitation = current.precipitation,
        cloud_cover = value(current.cloud_cover, "%"),
    )
}

fn minutes_label(d: Duration) -> String {
    let mins = d.as_secs() / 60;
    if mins == 1 {
        "1 min".to_string()
    } else {
        format!("{} min", mins)
    }
}

/// Note shown under a report served from the cache.
pub fn cache_annotation(age: Duration, fresh_for: Duration) -> String {
    let cached = if age < Duration::from_secs(60) {
        "cached just now".to_string()
    } else {
        format!("cached {} ago", minutes_label(age))
    };

    // Round the remaining time up so "0 min" is never shown for a live entry
    let remaining = Duration::from_secs(fresh_for.as_secs().div_ceil(60) * 60);
    format!("({}, refreshes in {})", cached, minutes_label(remaining))
}
