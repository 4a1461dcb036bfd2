//! Main window: one operator session rendered as a column of cards.

mod previews;
mod results;
mod upload;

use eframe::{App, Frame, egui};
use previews::TexturePreviews;
use skin_core::{CandidateFile, EngineConfig, MockClassifier, Session};
use std::time::{Duration, Instant};

const REPAINT_WHILE_RUNNING: Duration = Duration::from_millis(50);

pub struct UiApp {
    session: Session<MockClassifier, TexturePreviews>,
    /// Origin of the session's virtual clock.
    started: Instant,
    /// Problems outside the session itself, e.g. a file that could not be read.
    status: String,
    app_version: &'static str,
}

impl UiApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: EngineConfig) -> Self {
        let session = Session::new(
            config,
            MockClassifier::default(),
            TexturePreviews::new(cc.egui_ctx.clone()),
        );
        tracing::info!(
            "session ready (tick {:?}, delay {:?})",
            session.config().tick_interval(),
            session.config().compute_delay()
        );
        Self {
            session,
            started: Instant::now(),
            status: String::new(),
            app_version: env!("JIABAO_VERSION"),
        }
    }

    /// Feed wall-clock time into the session and keep frames coming while a run
    /// is in flight.
    fn pump_clock(&mut self, ctx: &egui::Context) {
        self.session.advance_to(self.started.elapsed());
        if self.session.state().is_running() {
            ctx.request_repaint_after(REPAINT_WHILE_RUNNING);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        // The drop zone is only shown while no photo is loaded.
        if self.session.state().image.is_some() {
            tracing::debug!("ignoring drop while a photo is loaded");
            return;
        }
        if dropped.len() > 1 {
            tracing::debug!("{} files dropped, using the first", dropped.len());
        }
        match upload::candidate_from_drop(&dropped[0]) {
            Ok(file) => {
                if self.session.drop_files([file]).is_ok() {
                    self.status.clear();
                }
            }
            Err(e) => self.report_io_error(e),
        }
    }

    fn offer(&mut self, file: CandidateFile) {
        if self.session.select(file).is_ok() {
            self.status.clear();
        }
    }

    fn report_io_error(&mut self, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.status = format!("{err:#}");
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.pump_clock(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Jiabao Klinik");
            ui.label("Sistem Klasifikasi Jenis Kulit dengan Random Forest");
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    self.render_upload_card(ui);
                    ui.add_space(12.0);
                    self.render_error_alert(ui);
                    self.render_result_card(ui);
                    self.render_info_card(ui);
                });
        });
    }
}
