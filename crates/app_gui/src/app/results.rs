use super::UiApp;
use eframe::egui;
use skin_core::present::{ConfidenceTier, DISCLAIMER, ResultView};

impl UiApp {
    /// Session errors win over local I/O status; both render in the same alert.
    pub(super) fn render_error_alert(&self, ui: &mut egui::Ui) {
        let message = match (&self.session.state().error, self.status.is_empty()) {
            (Some(err), _) => err.to_string(),
            (None, false) => self.status.clone(),
            (None, true) => return,
        };
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            let color = ui.visuals().error_fg_color;
            ui.colored_label(color, format!("⚠ {message}"));
        });
        ui.add_space(12.0);
    }

    pub(super) fn render_result_card(&self, ui: &mut egui::Ui) {
        let Some(result) = self.session.state().result.as_ref() else {
            return;
        };
        let view = ResultView::from_result(result);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("✔ Hasil Analisis Jenis Kulit");
            ui.label("Hasil analisis menggunakan Random Forest Algorithm");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(view.title).size(20.0).strong());
                    ui.label(&view.confidence_text);
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    tier_badge(ui, view.tier);
                });
            });
            ui.add_space(4.0);
            ui.small(&view.processed_at);
            ui.add_space(6.0);
            ui.label(format!("💡 Rekomendasi: {}", view.recommendation));
            ui.add_space(6.0);
            let warn = ui.visuals().warn_fg_color;
            ui.colored_label(warn, DISCLAIMER);
            ui.add_space(6.0);
            ui.label(egui::RichText::new(format!("Catatan: {}", view.note)).italics());
        });
        ui.add_space(12.0);
    }

    pub(super) fn render_info_card(&self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new("Tentang Sistem").size(16.0).strong());
            ui.add_space(6.0);
            ui.columns(2, |cols| {
                cols[0].label(egui::RichText::new("Algoritma").strong());
                cols[0].label(
                    "Menggunakan Algoritma Random Forest Classifier dengan akurasi tinggi \
                     untuk klasifikasi jenis kulit wajah (kering, normal, berminyak).",
                );
                cols[1].label(egui::RichText::new("Keamanan Data").strong());
                cols[1].label(
                    "Foto hanya disimpan di memori selama sesi berjalan dan dihapus \
                     saat direset atau aplikasi ditutup.",
                );
            });
            ui.add_space(6.0);
            let config = self.session.config();
            ui.small(format!(
                "Versi aplikasi: {} · interval progres {} ms · waktu analisis {} ms",
                self.app_version, config.tick_interval_ms, config.compute_delay_ms
            ));
        });
    }
}

fn tier_badge(ui: &mut egui::Ui, tier: ConfidenceTier) {
    let visuals = ui.visuals();
    let (fill, text) = match tier {
        ConfidenceTier::High => (visuals.selection.bg_fill, visuals.selection.stroke.color),
        ConfidenceTier::Medium => (visuals.faint_bg_color, visuals.text_color()),
    };
    ui.label(
        egui::RichText::new(format!(" {} ", tier.label()))
            .strong()
            .color(text)
            .background_color(fill),
    );
}
