use crate::api::http::HttpBackend;
use crate::api::{dispatch, Request, Response};
use crate::controller::{Action, DraftController, NoticeLevel, ValidationError};
use crate::render::LogsView;
use eframe::egui;
use egui::{Align2, Color32, Margin, RichText, Vec2, Visuals};
use std::sync::mpsc;
use tokio::runtime::Runtime;

pub struct DraftDeskApp {
    controller: DraftController,

    // Background Communication
    backend: HttpBackend,
    tokio_rt: Runtime,
    receiver: mpsc::Receiver<Response>,
    sender: mpsc::Sender<Response>,
    egui_ctx: egui::Context,
}

impl DraftDeskApp {
    pub fn new(cc: &eframe::CreationContext<'_>, backend: HttpBackend, tokio_rt: Runtime) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.visuals = Visuals::light();
        style.visuals.panel_fill = Color32::from_rgb(0xFC, 0xFC, 0xFC);
        style.visuals.window_fill = Color32::from_rgb(0xFC, 0xFC, 0xFC);
        style.visuals.widgets.inactive.bg_fill = Color32::from_rgb(0xF3, 0xF4, 0xF5);
        style.visuals.override_text_color = Some(Color32::from_rgb(0x5C, 0x67, 0x73));
        style.visuals.window_corner_radius = 10.into();
        style.visuals.button_frame = true;
        cc.egui_ctx.set_style(style);
        cc.egui_ctx.set_theme(egui::Theme::Light);

        let (sender, receiver) = mpsc::channel();
        let mut app = Self {
            controller: DraftController::new(),
            backend,
            tokio_rt,
            receiver,
            sender,
            egui_ctx: cc.egui_ctx.clone(),
        };

        // Initial page load
        let entries = app.controller.load_entries();
        app.send(entries);
        let logs = app.controller.load_logs();
        app.send(logs);
        app
    }

    /// Runs `request` on the tokio runtime; the response comes back through
    /// the channel and is applied on the UI thread in `update`.
    fn send(&self, request: Request) {
        let backend = self.backend.clone();
        let sender = self.sender.clone();
        let ctx = self.egui_ctx.clone();
        self.tokio_rt.spawn(async move {
            let response = dispatch(&backend, request).await;
            sender.send(response).ok();
            ctx.request_repaint();
        });
    }

    fn trigger(&mut self, result: Result<Request, ValidationError>) {
        match result {
            Ok(request) => self.send(request),
            Err(e) => log::debug!("Trigger refused: {}", e),
        }
    }

    fn ui_entries(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Pending Entries");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("⟳").on_hover_text("Reload entries").clicked() {
                    let request = self.controller.load_entries();
                    self.send(request);
                }
            });
        });
        ui.add_space(5.0);

        let selected_id = self.controller.selected_entry_id().map(str::to_string);
        let selected_text = self
            .controller
            .entry_options()
            .iter()
            .find(|o| Some(&o.value) == selected_id.as_ref())
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "(No pending entries)".to_string());

        let mut picked = None;
        egui::ComboBox::from_id_salt("entry_select")
            .selected_text(selected_text)
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for option in self.controller.entry_options() {
                    let is_selected = Some(&option.value) == selected_id.as_ref();
                    if ui.selectable_label(is_selected, &option.label).clicked() {
                        picked = Some(option.value.clone());
                    }
                }
            });
        if let Some(page_id) = picked {
            self.controller.select_entry(&page_id);
        }

        if let Some(entry) = self.controller.selected_entry() {
            if !entry.job_description.is_empty() {
                ui.add_space(5.0);
                ui.label(RichText::new(&entry.job_description).italics());
            }
        }
        ui.add_space(10.0);

        ui.label("Prompt:");
        ui.add(
            egui::TextEdit::multiline(&mut self.controller.prompt_input)
                .hint_text("e.g. Write a friendly follow-up")
                .desired_width(f32::INFINITY)
                .desired_rows(4),
        );
        ui.add_space(8.0);

        let generate_button =
            egui::Button::new("✉ Generate Draft").min_size(Vec2::new(ui.available_width(), 30.0));
        let enabled = !self.controller.is_in_flight(Action::Generate);
        if ui.add_enabled(enabled, generate_button).clicked() {
            let result = self.controller.generate_draft();
            self.trigger(result);
        }
    }

    fn ui_draft(&mut self, ui: &mut egui::Ui) {
        ui.heading("Draft");
        ui.add_space(5.0);

        if let Some(draft) = self.controller.current_draft() {
            egui::Grid::new("draft_header_grid")
                .num_columns(2)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    ui.label("To:");
                    ui.label(format!("{} ({})", draft.recipient, draft.category));
                    ui.end_row();

                    ui.label("Subject:");
                    ui.label(RichText::new(&draft.subject).strong())
                        .on_hover_text(&draft.job_description);
                    ui.end_row();
                });
            ui.add_space(5.0);
        }

        // Refinements go through the chat; the surface itself is read-only.
        let mut body = self.controller.draft_surface();
        egui::ScrollArea::vertical()
            .id_salt("draft_scroll")
            .max_height(260.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut body)
                        .hint_text("Generate a draft to see it here.")
                        .desired_width(f32::INFINITY)
                        .desired_rows(10),
                );
            });
        ui.add_space(8.0);

        ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
            let approve_button = egui::Button::new("🚀 Approve & Send")
                .min_size(Vec2::new(ui.available_width() * 0.5, 30.0));
            let enabled =
                self.controller.has_draft() && !self.controller.is_in_flight(Action::Approve);
            if ui.add_enabled(enabled, approve_button).clicked() {
                let result = self.controller.approve_draft();
                self.trigger(result);
            }
        });
    }

    fn ui_chat(&mut self, ui: &mut egui::Ui) {
        ui.heading("Refine");
        ui.add_space(5.0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("chat_scroll")
                .max_height(200.0)
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for exchange in self.controller.transcript() {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(RichText::new("You:").strong());
                            ui.label(&exchange.user_text);
                        });
                        ui.label(RichText::new("GPT:").strong());
                        for line in &exchange.response_lines {
                            ui.label(line);
                        }
                        ui.add_space(6.0);
                    }
                    if self.controller.transcript().is_empty() {
                        ui.label("(No refinements yet)");
                    }
                });
        });
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            let enabled = !self.controller.is_in_flight(Action::Refine);
            let input = ui.add_enabled(
                enabled,
                egui::TextEdit::singleline(&mut self.controller.chat_input)
                    .hint_text("e.g. Make it shorter")
                    .desired_width(ui.available_width() - 70.0),
            );
            let submitted =
                input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let clicked = ui
                .add_enabled(enabled, egui::Button::new("Send").min_size(Vec2::new(60.0, 25.0)))
                .clicked();
            if submitted || clicked {
                let result = self.controller.refine_draft();
                self.trigger(result);
            }
        });
    }

    fn ui_logs(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Sent Logs");
            if ui.button("⟳").on_hover_text("Reload logs").clicked() {
                let request = self.controller.load_logs();
                self.send(request);
            }
        });
        ui.add_space(5.0);

        match self.controller.logs() {
            LogsView::Table(rows) => {
                egui::ScrollArea::vertical()
                    .id_salt("logs_scroll")
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        egui::Grid::new("logs_grid")
                            .num_columns(4)
                            .striped(true)
                            .spacing([16.0, 6.0])
                            .show(ui, |ui| {
                                ui.label(RichText::new("Date Sent").strong());
                                ui.label(RichText::new("Recipient").strong());
                                ui.label(RichText::new("Subject").strong());
                                ui.label(RichText::new("Final Draft").strong());
                                ui.end_row();

                                for row in rows {
                                    ui.label(&row.date_sent);
                                    ui.label(&row.recipient);
                                    ui.label(&row.subject);
                                    ui.vertical(|ui| {
                                        for line in &row.body_lines {
                                            ui.label(line);
                                        }
                                    });
                                    ui.end_row();
                                }
                            });
                    });
            }
            other => {
                if let Some(text) = other.placeholder() {
                    ui.label(text);
                }
            }
        }
    }

    fn ui_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };
        let (title, color) = match notice.level {
            NoticeLevel::Info => ("Notice", Color32::from_rgb(0x5C, 0x67, 0x73)),
            NoticeLevel::Error => ("Error", Color32::DARK_RED),
        };

        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(RichText::new(&notice.text).color(color));
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });
        if dismissed {
            self.controller.dismiss_notice();
        }
    }
}

impl eframe::App for DraftDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply finished requests and send whatever they trigger
        while let Ok(response) = self.receiver.try_recv() {
            for follow_up in self.controller.apply(response) {
                self.send(follow_up);
            }
        }

        // Status bar at the bottom
        egui::TopBottomPanel::bottom("status_panel")
            .frame(egui::Frame::new().inner_margin(Margin::symmetric(10, 5)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if self.controller.is_busy() {
                        ui.add(egui::Spinner::new().size(14.0));
                        ui.add_space(5.0);
                    }
                    ui.label(self.controller.status_message());
                });
            });

        egui::TopBottomPanel::bottom("logs_panel")
            .resizable(true)
            .default_height(220.0)
            .frame(egui::Frame::new().inner_margin(Margin::same(15)))
            .show(ctx, |ui| {
                self.ui_logs(ui);
            });

        egui::SidePanel::left("entries_panel")
            .resizable(true)
            .default_width(300.0)
            .width_range(250.0..=450.0)
            .frame(egui::Frame::new().inner_margin(Margin::same(15)))
            .show(ctx, |ui| {
                self.ui_entries(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().inner_margin(Margin::same(15)))
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("central_scroll")
                    .show(ui, |ui| {
                        self.ui_draft(ui);
                        ui.add_space(15.0);
                        self.ui_chat(ui);
                    });
            });

        self.ui_notice(ctx);

        if self.controller.is_busy() {
            ctx.request_repaint();
        }
    }
}
