use shared::domain::{Announcement, Screen};

use crate::controller::events::{UiAction, UiError};
use crate::controller::orchestration::dispatch_action;
use crate::controller::session::SessionController;

pub struct BoardApp {
    controller: SessionController,
    notice: Option<UiError>,
}

impl BoardApp {
    pub fn new(controller: SessionController) -> Self {
        Self {
            controller,
            notice: None,
        }
    }

    fn apply(&mut self, actions: Vec<UiAction>) {
        for action in actions {
            if let Err(err) = dispatch_action(&mut self.controller, action) {
                self.notice = Some(err);
                break;
            }
        }
    }

    fn show_login_screen(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let enabled = self.notice.is_none();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space((ui.available_height() * 0.2).clamp(16.0, 120.0));
                    ui.heading("Choose a user:");
                    ui.add_space(10.0);

                    let mut choice = self.controller.selected_author().to_string();
                    egui::ComboBox::from_id_salt("login_author")
                        .selected_text(choice.clone())
                        .width(200.0)
                        .show_ui(ui, |ui| {
                            for author in self.controller.allowed_authors() {
                                ui.selectable_value(&mut choice, author.clone(), author.as_str());
                            }
                        });
                    if choice != self.controller.selected_author() {
                        actions.push(UiAction::SelectUser(choice));
                    }

                    ui.add_space(10.0);
                    let enter_pressed = enabled && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.button("Continue").clicked() || enter_pressed {
                        actions.push(UiAction::EnterMain);
                    }

                    ui.add_space(16.0);
                    ui.small(egui::RichText::new(self.controller.status()).weak());
                });
            });
        });
    }

    fn show_main_screen(&mut self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let enabled = self.notice.is_none();

        egui::TopBottomPanel::top("board_header").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "Logged in as: {}",
                            self.controller.selected_author()
                        ))
                        .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Log out").clicked() {
                            actions.push(UiAction::Logout);
                        }
                        if ui.button("Refresh").clicked() {
                            actions.push(UiAction::Refresh);
                        }
                    });
                });
            });
        });

        egui::TopBottomPanel::bottom("board_forms").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label("New message:");
                    let form = self.controller.form_mut();
                    let msg_resp = ui.add(
                        egui::TextEdit::singleline(&mut form.new_msg)
                            .hint_text("Type an announcement")
                            .desired_width(360.0),
                    );
                    if ui.button("Send").clicked() || submitted(ui, &msg_resp) {
                        actions.push(UiAction::AddAnnouncement);
                    }
                });

                ui.horizontal(|ui| {
                    ui.label("ID to update:");
                    let form = self.controller.form_mut();
                    let id_resp = ui.add(
                        egui::TextEdit::singleline(&mut form.update_id).desired_width(60.0),
                    );
                    ui.label("New message:");
                    let msg_resp = ui.add(
                        egui::TextEdit::singleline(&mut form.update_msg).desired_width(260.0),
                    );
                    if ui.button("Update").clicked()
                        || submitted(ui, &id_resp)
                        || submitted(ui, &msg_resp)
                    {
                        actions.push(UiAction::UpdateAnnouncement);
                    }
                });

                ui.add_space(4.0);
                ui.small(egui::RichText::new(self.controller.status()).weak());
                ui.add_space(4.0);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            announcement_table(ui, self.controller.announcements());
        });
    }

    fn show_error_modal(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new(notice.title())
            .id(egui::Id::new("board_error_modal"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(notice.message());
                ui.add_space(8.0);
                let escape_pressed = ui.input(|i| i.key_pressed(egui::Key::Escape));
                if ui.button("OK").clicked() || escape_pressed {
                    dismissed = true;
                }
            });

        if dismissed {
            self.notice = None;
        }
    }
}

fn submitted(ui: &egui::Ui, response: &egui::Response) -> bool {
    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter))
}

fn announcement_table(ui: &mut egui::Ui, rows: &[Announcement]) {
    if rows.is_empty() {
        ui.weak("No announcements yet.");
        return;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("announcement_table")
                .striped(true)
                .num_columns(4)
                .spacing([18.0, 6.0])
                .show(ui, |ui| {
                    for heading in ["id", "author", "date", "msg"] {
                        ui.strong(heading);
                    }
                    ui.end_row();

                    for row in rows {
                        ui.label(row.id.to_string());
                        ui.label(row.author.as_str());
                        ui.label(row.display_date());
                        ui.label(row.msg.as_str());
                        ui.end_row();
                    }
                });
        });
}

impl eframe::App for BoardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();
        match self.controller.screen() {
            Screen::Login => self.show_login_screen(ctx, &mut actions),
            Screen::Main => self.show_main_screen(ctx, &mut actions),
        }
        self.show_error_modal(ctx);
        self.apply(actions);
    }
}
