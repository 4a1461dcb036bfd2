//! Upload card: drop zone until a photo is chosen, then preview and run controls.

use super::UiApp;
use anyhow::{Context, Result};
use eframe::egui;
use rfd::FileDialog;
use skin_core::CandidateFile;
use skin_core::present::{file_size_text, progress_status, trigger_label};
use skin_core::upload::sniff_media_type;
use std::path::Path;

const DROP_ZONE_HEIGHT: f32 = 180.0;
const PREVIEW_MAX_WIDTH: f32 = 420.0;
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];

impl UiApp {
    pub(super) fn render_upload_card(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Upload Foto Pasien");
            ui.label(
                "Unggah foto wajah pasien untuk analisis jenis kulit (kering, normal, \
                 berminyak) menggunakan algoritma Random Forest",
            );
            ui.add_space(8.0);
            if self.session.state().image.is_none() {
                self.render_drop_zone(ui);
            } else {
                self.render_selected_image(ui);
            }
        });
    }

    fn render_drop_zone(&mut self, ui: &mut egui::Ui) {
        let hovering_files = ui.ctx().input(|i| !i.raw.hovered_files.is_empty());
        let size = egui::vec2(ui.available_width(), DROP_ZONE_HEIGHT);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());

        let visuals = ui.visuals();
        let border = if hovering_files || response.hovered() {
            visuals.selection.bg_fill
        } else {
            visuals.widgets.noninteractive.bg_stroke.color
        };
        let strong = visuals.text_color();
        let weak = visuals.weak_text_color();

        let painter = ui.painter();
        painter.rect_stroke(
            rect,
            8.0,
            egui::Stroke::new(2.0, border),
            egui::StrokeKind::Inside,
        );
        let center = rect.center();
        painter.text(
            center - egui::vec2(0.0, 28.0),
            egui::Align2::CENTER_CENTER,
            "Seret dan lepas foto di sini",
            egui::FontId::proportional(18.0),
            strong,
        );
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "atau klik untuk memilih file",
            egui::FontId::proportional(14.0),
            weak,
        );
        painter.text(
            center + egui::vec2(0.0, 28.0),
            egui::Align2::CENTER_CENTER,
            "Format: JPG, PNG, GIF (Maksimal 10MB)",
            egui::FontId::proportional(12.0),
            weak,
        );

        if response.clicked() {
            self.pick_file();
        }
    }

    fn render_selected_image(&mut self, ui: &mut egui::Ui) {
        let state = self.session.state();
        let Some(image) = state.image.as_ref() else {
            return;
        };
        let running = state.is_running();
        let progress = state.progress;
        let name = image.name.clone();
        let size = image.size();
        let preview = image.preview;

        let mut reset_clicked = false;
        let mut trigger_clicked = false;
        ui.vertical_centered(|ui| {
            match self.session.previews().texture(preview) {
                Some(texture) => {
                    ui.add(egui::Image::new(texture).max_width(PREVIEW_MAX_WIDTH));
                }
                None => {
                    ui.label("Pratinjau tidak tersedia");
                }
            }
            if ui
                .button("✕ Hapus")
                .on_hover_text("Hapus foto dan mulai ulang")
                .clicked()
            {
                reset_clicked = true;
            }

            ui.add_space(6.0);
            ui.label(format!("File: {name}"));
            ui.small(file_size_text(size));

            if running {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(progress_status(progress));
                    ui.label(format!("{progress}%"));
                });
                ui.add(egui::ProgressBar::new(f32::from(progress) / 100.0));
            }

            ui.add_space(6.0);
            if ui
                .add_enabled(!running, egui::Button::new(trigger_label(running)))
                .clicked()
            {
                trigger_clicked = true;
            }
        });

        if reset_clicked {
            self.session.reset();
            self.status.clear();
        }
        if trigger_clicked {
            self.session.trigger();
        }
    }

    fn pick_file(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Gambar", &IMAGE_EXTENSIONS)
            .set_directory(".")
            .pick_file()
        else {
            return;
        };
        match CandidateFile::from_path(&path) {
            Ok(file) => self.offer(file),
            Err(e) => self.report_io_error(e),
        }
    }
}

/// Turn a dropped file into a candidate. Web drops carry bytes and a declared
/// type; native drops only carry a path.
pub(super) fn candidate_from_drop(file: &egui::DroppedFile) -> Result<CandidateFile> {
    if let Some(bytes) = &file.bytes {
        let media_type = if file.mime.is_empty() {
            sniff_media_type(Path::new(&file.name), bytes)
        } else {
            file.mime.clone()
        };
        return Ok(CandidateFile::new(file.name.clone(), media_type, bytes.clone()));
    }
    let path = file
        .path
        .as_ref()
        .with_context(|| format!("file yang dilepas tidak memiliki data: {}", file.name))?;
    CandidateFile::from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn dropped(name: &str, mime: &str, bytes: Option<&[u8]>) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes: bytes.map(Arc::from),
            ..Default::default()
        }
    }

    #[rstest]
    #[case("foto.png", "", "image/png")]
    #[case("foto.bin", "image/webp", "image/webp")]
    #[case("catatan.txt", "text/plain", "text/plain")]
    fn dropped_bytes_keep_declared_or_sniffed_type(
        #[case] name: &str,
        #[case] mime: &str,
        #[case] expected: &str,
    ) {
        let file = candidate_from_drop(&dropped(name, mime, Some(PNG_MAGIC))).unwrap();
        assert_eq!(file.name, name);
        assert_eq!(file.media_type, expected);
        assert_eq!(file.size(), PNG_MAGIC.len() as u64);
    }

    #[test]
    fn drop_without_bytes_or_path_is_an_error() {
        assert!(candidate_from_drop(&dropped("kosong.png", "", None)).is_err());
    }
}
