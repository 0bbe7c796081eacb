//! Blocking egui chart window, compiled with the `gui` feature.

use eframe::egui;
use egui_plot::{Legend, Line, Plot};

use super::{ChartData, ChartRenderer};
use crate::error::{LeakError, Result};
use crate::spectral::Spectrogram;

const WINDOW_SIZE: [f32; 2] = [1100.0, 750.0];
const PLOT_HEIGHT: f32 = 240.0;
const SPECTROGRAM_HEIGHT: f32 = 260.0;
const ORIGINAL_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 200, 255);
const FILTERED_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 200, 50);

/// Opens a chart window and blocks until it is closed.
///
/// The windowing event loop can only be created once per process, so a
/// second render reports the failure through the menu instead of opening
/// another window.
#[derive(Debug, Default)]
pub struct ChartViewer;

impl ChartRenderer for ChartViewer {
    fn render(&mut self, data: &ChartData) -> Result<()> {
        let title = format!("leakscope - {}", data.source_name);
        let native_options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(WINDOW_SIZE)
                .with_min_inner_size([800.0, 500.0])
                .with_title(title),
            ..Default::default()
        };

        let app_data = data.clone();
        eframe::run_native(
            "leakscope charts",
            native_options,
            Box::new(move |_cc| Ok(Box::new(ChartApp::new(app_data)))),
        )
        .map_err(|e| LeakError::Config(format!("chart window failed: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChartView {
    Waveform,
    Spectrum,
    Psd,
    Spectrogram,
}

struct ChartApp {
    data: ChartData,
    view: ChartView,
    spectrogram_textures: Option<(egui::TextureHandle, egui::TextureHandle)>,
}

impl ChartApp {
    fn new(data: ChartData) -> Self {
        Self {
            data,
            view: ChartView::Waveform,
            spectrogram_textures: None,
        }
    }

    fn ensure_spectrogram_textures(&mut self, ctx: &egui::Context) {
        if self.spectrogram_textures.is_none() {
            let original =
                spectrogram_texture(ctx, "spectrogram_original", &self.data.spectrogram_original);
            let filtered =
                spectrogram_texture(ctx, "spectrogram_filtered", &self.data.spectrogram_filtered);
            self.spectrogram_textures = Some((original, filtered));
        }
    }

    fn draw_waveforms(&self, ui: &mut egui::Ui) {
        let link = ui.id().with("waveform_x_link");

        ui.label(
            egui::RichText::new("Original")
                .color(egui::Color32::LIGHT_GRAY)
                .small(),
        );
        Plot::new("waveform_original")
            .height(PLOT_HEIGHT)
            .y_axis_label("amplitude")
            .y_axis_min_width(60.0)
            .link_axis(link, [true, false])
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Original", self.data.waveform_original.clone())
                        .color(ORIGINAL_COLOR),
                );
            });

        ui.add_space(4.0);
        ui.label(
            egui::RichText::new("Filtered")
                .color(egui::Color32::LIGHT_GRAY)
                .small(),
        );
        Plot::new("waveform_filtered")
            .height(PLOT_HEIGHT)
            .x_axis_label("s")
            .y_axis_label("amplitude")
            .y_axis_min_width(60.0)
            .link_axis(link, [true, false])
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Filtered", self.data.waveform_filtered.clone())
                        .color(FILTERED_COLOR),
                );
            });
    }

    fn draw_spectrum(&self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("Magnitude spectrum")
                .color(egui::Color32::LIGHT_GRAY)
                .small(),
        );
        Plot::new("spectrum_plot")
            .height(2.0 * PLOT_HEIGHT)
            .x_axis_label("Hz")
            .y_axis_label("magnitude")
            .y_axis_min_width(60.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Original", self.data.spectrum_original.clone())
                        .color(ORIGINAL_COLOR),
                );
                plot_ui.line(
                    Line::new("Filtered", self.data.spectrum_filtered.clone())
                        .color(FILTERED_COLOR),
                );
            });
    }

    fn draw_psd(&self, ui: &mut egui::Ui) {
        ui.label(
            egui::RichText::new("Welch power spectral density")
                .color(egui::Color32::LIGHT_GRAY)
                .small(),
        );
        Plot::new("psd_plot")
            .height(2.0 * PLOT_HEIGHT)
            .x_axis_label("Hz")
            .y_axis_label("dB")
            .y_axis_min_width(60.0)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("Original", self.data.psd_original.clone()).color(ORIGINAL_COLOR),
                );
                plot_ui.line(
                    Line::new("Filtered", self.data.psd_filtered.clone()).color(FILTERED_COLOR),
                );
            });
    }

    fn draw_spectrograms(&self, ui: &mut egui::Ui) {
        let Some((original, filtered)) = &self.spectrogram_textures else {
            return;
        };
        draw_spectrogram_pane(ui, "Original", original, &self.data.spectrogram_original);
        ui.add_space(8.0);
        draw_spectrogram_pane(ui, "Filtered", filtered, &self.data.spectrogram_filtered);
    }
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.ensure_spectrogram_textures(ctx);

        egui::TopBottomPanel::top("view_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.view, ChartView::Waveform, "Waveform");
                ui.selectable_value(&mut self.view, ChartView::Spectrum, "Spectrum");
                ui.selectable_value(&mut self.view, ChartView::Psd, "PSD");
                ui.selectable_value(&mut self.view, ChartView::Spectrogram, "Spectrogram");
                ui.separator();
                ui.label(
                    egui::RichText::new(format!(
                        "{} @ {} Hz",
                        self.data.source_name, self.data.sample_rate
                    ))
                    .color(egui::Color32::LIGHT_GRAY),
                );
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.view {
                ChartView::Waveform => self.draw_waveforms(ui),
                ChartView::Spectrum => self.draw_spectrum(ui),
                ChartView::Psd => self.draw_psd(ui),
                ChartView::Spectrogram => self.draw_spectrograms(ui),
            });
        });
    }
}

fn draw_spectrogram_pane(
    ui: &mut egui::Ui,
    label: &str,
    texture: &egui::TextureHandle,
    spec: &Spectrogram,
) {
    ui.label(
        egui::RichText::new(label)
            .color(egui::Color32::LIGHT_GRAY)
            .small(),
    );
    let size = egui::vec2(ui.available_width(), SPECTROGRAM_HEIGHT);
    ui.add(egui::Image::from_texture(texture).fit_to_exact_size(size));

    let max_time = spec.times.last().copied().unwrap_or(0.0);
    let max_freq = spec.frequencies.last().copied().unwrap_or(0.0);
    let (lo, hi) = spec.db_range();
    ui.label(
        egui::RichText::new(format!(
            "0 to {:.2} s, 0 to {:.0} Hz, {:.0} to {:.0} dB",
            max_time, max_freq, lo, hi
        ))
        .color(egui::Color32::GRAY)
        .small(),
    );
}

/// Renders dB frames into an RGB texture, low frequencies at the bottom.
fn spectrogram_texture(
    ctx: &egui::Context,
    name: &str,
    spec: &Spectrogram,
) -> egui::TextureHandle {
    let width = spec.num_frames();
    let height = spec.frequencies.len();
    let (lo, hi) = spec.db_range();
    let span = (hi - lo).max(1.0);

    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let bin = height - 1 - y;
        for frame in spec.power_db.iter() {
            let norm = (frame[bin] - lo) / span;
            rgb.extend_from_slice(&heat_rgb(norm));
        }
    }

    let image = egui::ColorImage::from_rgb([width, height], &rgb);
    ctx.load_texture(name, image, egui::TextureOptions::LINEAR)
}

/// Black through red and yellow to white, for dB power in `[0, 1]`.
fn heat_rgb(norm: f32) -> [u8; 3] {
    let v = norm.clamp(0.0, 1.0);
    let r = (v * 3.0).clamp(0.0, 1.0);
    let g = (v * 3.0 - 1.0).clamp(0.0, 1.0);
    let b = (v * 3.0 - 2.0).clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}
