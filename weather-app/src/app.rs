//! Application state and the main window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use egui::TextureHandle;
use tokio::runtime::Handle;
use weather_core::config::{API_KEY_FILE, HISTORY_FILE};
use weather_core::{
    Credentials, ForecastDay, History, IconCache, Units, WeatherClient, WeatherSnapshot,
};

use crate::fetch::{self, FetchDone, LatestGate};
use crate::panels;

/// Whether the Submit control is enabled: a usable API key must exist and
/// the input must be non-blank. Kept as a free function so the rule is
/// testable without a window.
pub fn can_submit(has_client: bool, input: &str) -> bool {
    has_client && !input.trim().is_empty()
}

pub struct WeatherApp {
    runtime: Handle,

    /// `None` until a key is available; submission stays disabled meanwhile.
    client: Option<Arc<WeatherClient>>,
    icons: IconCache,

    history: History,
    history_path: PathBuf,

    input: String,
    units: Units,
    status: String,
    /// Buffer for the inline key prompt shown when the key file was
    /// unreadable.
    key_entry: String,

    snapshot: Option<WeatherSnapshot>,
    forecast: Vec<ForecastDay>,
    highlighted: Vec<bool>,
    textures: HashMap<String, TextureHandle>,

    gate: LatestGate,
    tx: Sender<FetchDone>,
    rx: Receiver<FetchDone>,
}

impl WeatherApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, runtime: Handle) -> Self {
        let (tx, rx) = channel();

        let history = History::load(HISTORY_FILE);
        let input = history.most_recent().unwrap_or_default().to_string();

        let (client, status) = match Credentials::load(API_KEY_FILE) {
            Ok(creds) => match WeatherClient::new(creds.api_key()) {
                Ok(client) => (Some(Arc::new(client)), String::new()),
                Err(err) => (None, format!("could not build HTTP client: {err}")),
            },
            Err(err) => {
                tracing::warn!(%err, "no API key file, prompting in-window");
                (None, format!("{err}: paste a key below"))
            }
        };

        Self {
            runtime,
            client,
            icons: IconCache::new(),
            history,
            history_path: PathBuf::from(HISTORY_FILE),
            input,
            units: Units::default(),
            status,
            key_entry: String::new(),
            snapshot: None,
            forecast: Vec::new(),
            highlighted: Vec::new(),
            textures: HashMap::new(),
            gate: LatestGate::default(),
            tx,
            rx,
        }
    }

    fn submit(&mut self, ctx: &egui::Context) {
        let Some(client) = self.client.clone() else {
            return;
        };
        let city = self.input.trim().to_string();
        if city.is_empty() {
            return;
        }

        self.history.push(&city);
        let seq = self.gate.issue();
        self.status = format!("Fetching weather for {city}...");

        fetch::spawn_fetch(
            &self.runtime,
            self.tx.clone(),
            ctx.clone(),
            client,
            self.icons.clone(),
            city,
            self.units,
            seq,
        );
    }

    /// Apply finished fetches on the UI thread, newest-submission-only.
    fn drain_completions(&mut self, ctx: &egui::Context) {
        while let Ok(done) = self.rx.try_recv() {
            if !self.gate.admit(done.seq) {
                tracing::debug!(seq = done.seq, city = %done.city, "dropping stale result");
                continue;
            }

            match done.result {
                Ok(result) => {
                    for (icon_id, bytes) in &result.icons {
                        self.upload_icon(ctx, icon_id, bytes);
                    }
                    self.highlighted = vec![false; result.forecast.len()];
                    self.snapshot = Some(result.snapshot);
                    self.forecast = result.forecast;
                    self.status = format!("Updated {}", done.city);
                }
                Err(err) => {
                    self.status = err.to_string();
                }
            }
        }
    }

    fn upload_icon(&mut self, ctx: &egui::Context, icon_id: &str, bytes: &[u8]) {
        if self.textures.contains_key(icon_id) {
            return;
        }

        match image::load_from_memory(bytes) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                let tex = ctx.load_texture(
                    format!("icon-{icon_id}"),
                    color,
                    egui::TextureOptions::LINEAR,
                );
                self.textures.insert(icon_id.to_string(), tex);
            }
            Err(err) => {
                tracing::warn!(icon_id, %err, "could not decode icon image");
            }
        }
    }

    fn key_prompt(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("API key:");
            ui.text_edit_singleline(&mut self.key_entry);
            if ui.button("Use key").clicked() {
                match Credentials::from_entry(&self.key_entry) {
                    Some(creds) => match WeatherClient::new(creds.api_key()) {
                        Ok(client) => {
                            self.client = Some(Arc::new(client));
                            self.status = String::new();
                        }
                        Err(err) => {
                            self.status = format!("could not build HTTP client: {err}");
                        }
                    },
                    None => {
                        self.status = "API key must not be blank".to_string();
                    }
                }
            }
        });
    }

    fn input_row(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.label("City:");

            let edit = ui.text_edit_singleline(&mut self.input);
            let submit_on_enter =
                edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            egui::ComboBox::from_id_salt("history")
                .selected_text("History")
                .show_ui(ui, |ui| {
                    let mut chosen = None;
                    for entry in self.history.entries() {
                        if ui.selectable_label(false, entry).clicked() {
                            chosen = Some(entry.clone());
                        }
                    }
                    if let Some(city) = chosen {
                        self.input = city;
                    }
                });

            egui::ComboBox::from_id_salt("units")
                .selected_text(self.units.to_string())
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.units, Units::Metric, "metric");
                    ui.selectable_value(&mut self.units, Units::Imperial, "imperial");
                });

            let enabled = can_submit(self.client.is_some(), &self.input);
            let clicked = ui
                .add_enabled(enabled, egui::Button::new("Submit"))
                .clicked();

            if enabled && (clicked || submit_on_enter) {
                self.submit(ctx);
            }
        });
    }
}

impl eframe::App for WeatherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_completions(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.client.is_none() {
                self.key_prompt(ui);
            }

            self.input_row(ui, ctx);

            if !self.status.is_empty() {
                ui.label(&self.status);
            }

            if let Some(snapshot) = &self.snapshot {
                ui.separator();
                panels::current_panel(ui, snapshot, self.units, self.textures.get(&snapshot.icon));
            }

            if !self.forecast.is_empty() {
                ui.separator();
                panels::forecast_strip(
                    ui,
                    &self.forecast,
                    self.units,
                    &mut self.highlighted,
                    &self.textures,
                );
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.history.save(&self.history_path) {
            tracing::warn!(%err, "failed to save search history");
        }
    }
}
