//! Display-only panels: the current-weather grid and the forecast strip.
//! They render whatever data they are handed and hold no state of their own
//! beyond the per-day highlight toggles owned by the caller.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use egui::TextureHandle;
use weather_core::{ForecastDay, Units, WeatherSnapshot};

pub fn fmt_temp(value: f64, units: Units) -> String {
    format!("{value:.1} {}", units.temperature_suffix())
}

pub fn fmt_wind(value: f64, units: Units) -> String {
    format!("{value:.1} {}", units.wind_suffix())
}

pub fn fmt_clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Current conditions as a 3x3 label grid next to the condition icon,
/// mirroring the layout of the original window: city/sunrise/sunset,
/// description/temperature/feels-like, humidity/clouds/wind.
pub fn current_panel(
    ui: &mut egui::Ui,
    snapshot: &WeatherSnapshot,
    units: Units,
    texture: Option<&TextureHandle>,
) {
    ui.horizontal(|ui| {
        if let Some(tex) = texture {
            ui.add(egui::Image::new(tex).fit_to_exact_size(egui::vec2(64.0, 64.0)));
        }

        egui::Grid::new("current-weather")
            .num_columns(3)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.strong(&snapshot.city);
                ui.label(&snapshot.description);
                ui.label(format!("humidity: {}%", snapshot.humidity_pct));
                ui.end_row();

                ui.label(format!("sunrise: {}", fmt_clock(snapshot.sunrise)));
                ui.label(format!("temp: {}", fmt_temp(snapshot.temperature, units)));
                ui.label(format!("clouds: {}%", snapshot.clouds_pct));
                ui.end_row();

                ui.label(format!("sunset: {}", fmt_clock(snapshot.sunset)));
                ui.label(format!(
                    "feels like: {}",
                    fmt_temp(snapshot.feels_like, units)
                ));
                ui.label(format!("wind: {}", fmt_wind(snapshot.wind_speed, units)));
                ui.end_row();
            });
    });
}

/// One sub-panel per forecast day. Clicking a day toggles its highlight.
pub fn forecast_strip(
    ui: &mut egui::Ui,
    days: &[ForecastDay],
    units: Units,
    highlighted: &mut [bool],
    textures: &HashMap<String, TextureHandle>,
) {
    ui.horizontal(|ui| {
        for (i, day) in days.iter().enumerate() {
            let on = highlighted.get(i).copied().unwrap_or(false);
            let fill = if on {
                ui.visuals().selection.bg_fill
            } else {
                ui.visuals().faint_bg_color
            };

            let response = egui::Frame::group(ui.style())
                .fill(fill)
                .show(ui, |ui| {
                    ui.vertical(|ui| {
                        ui.label(day.date.format("%a %d %b").to_string());
                        if let Some(tex) = textures.get(&day.icon) {
                            ui.add(egui::Image::new(tex).fit_to_exact_size(egui::vec2(40.0, 40.0)));
                        }
                        ui.label(&day.description);
                        ui.label(format!(
                            "{} / {}",
                            fmt_temp(day.temp_max, units),
                            fmt_temp(day.temp_min, units)
                        ));
                    });
                })
                .response;

            if response.interact(egui::Sense::click()).clicked() {
                if let Some(flag) = highlighted.get_mut(i) {
                    *flag = !*flag;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperatures_carry_the_unit_suffix() {
        assert_eq!(fmt_temp(15.25, Units::Metric), "15.2 °C");
        assert_eq!(fmt_temp(-3.0, Units::Metric), "-3.0 °C");
        assert_eq!(fmt_temp(60.0, Units::Imperial), "60.0 °F");
    }

    #[test]
    fn wind_speed_carries_the_unit_suffix() {
        assert_eq!(fmt_wind(3.14, Units::Metric), "3.1 m/s");
        assert_eq!(fmt_wind(7.0, Units::Imperial), "7.0 mph");
    }

    #[test]
    fn clock_renders_hours_and_minutes() {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let rendered = fmt_clock(at);
        assert_eq!(rendered.len(), 5);
        assert_eq!(rendered.as_bytes()[2], b':');
    }
}
