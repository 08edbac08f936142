//! src/view/components/modal.rs
//! ============================================================================
//! # ModalDialog: Shared Overlay for Every Workflow
//!
//! One modal surface renders whichever [`Workflow`] is pending: confirm
//! text, prompt input, select list, plugin form, media preview card, or
//! progress list. Preview and progress have no footer and close only via
//! the dismiss gesture. The dialog owns only the footer focus; all content
//! comes from the workflow record each frame.

use std::rc::Rc;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::controller::events::ModalButton;
use crate::model::workflow::{FieldKind, FormState, ProgressStatus, Workflow};
use crate::view::theme;

pub struct ModalDialog {
    focus: ModalButton,
}

impl Default for ModalDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalDialog {
    pub fn new() -> Self {
        Self {
            focus: ModalButton::Confirm,
        }
    }

    /// Reset footer focus; called whenever a new workflow opens.
    pub fn reset(&mut self) {
        self.focus = ModalButton::Confirm;
    }

    pub fn focused_button(&self) -> ModalButton {
        self.focus
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ModalButton::Cancel => ModalButton::Confirm,
            ModalButton::Confirm => ModalButton::Cancel,
        };
    }

    pub fn render(&self, frame: &mut Frame<'_>, workflow: &Workflow, area: Rect) {
        let overlay = Self::centered_rect(50, 55, area);
        frame.render_widget(Clear, overlay);

        let (title, confirm_label) = match workflow {
            Workflow::Confirm { title, .. } | Workflow::Prompt { title, .. } => {
                (title.clone(), "Confirm".to_string())
            }
            Workflow::Select { title, .. } => (title.clone(), "Confirm".to_string()),
            Workflow::PluginForm { mode, .. } => {
                let label = if mode.confirm_text.is_empty() {
                    "Confirm".to_string()
                } else {
                    mode.confirm_text.to_string()
                };
                (mode.button_text.to_string(), label)
            }
            Workflow::Preview { item } => (item.name.to_string(), String::new()),
            Workflow::Progress { title, .. } => (title.clone(), String::new()),
        };

        let block = Block::default()
            .title(Span::styled(title, theme::title()))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(theme::border_active());
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let chunks: Rc<[Rect]> = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if workflow.has_footer() {
                vec![Constraint::Min(1), Constraint::Length(1)]
            } else {
                vec![Constraint::Min(1)]
            })
            .split(inner);

        match workflow {
            Workflow::Confirm { prompt, .. } => {
                let para = Paragraph::new(prompt.as_str())
                    .wrap(Wrap { trim: true })
                    .alignment(Alignment::Center);
                frame.render_widget(para, chunks[0]);
            }
            Workflow::Prompt { prompt, input, .. } => {
                let lines = vec![
                    Line::from(prompt.as_str()),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled(format!(" {input}"), theme::border_active()),
                        Span::styled("█", theme::cursor()),
                    ]),
                ];
                frame.render_widget(Paragraph::new(Text::from(lines)), chunks[0]);
            }
            Workflow::Select {
                prompt,
                options,
                cursor,
                ..
            } => {
                let mut rows = vec![ListItem::new(prompt.as_str()), ListItem::new("")];
                rows.extend(options.iter().enumerate().map(|(i, opt)| {
                    let style = if i == *cursor {
                        theme::selected()
                    } else {
                        Style::default()
                    };
                    ListItem::new(Span::styled(format!("  {}", opt.name), style))
                }));
                frame.render_widget(List::new(rows), chunks[0]);
            }
            Workflow::PluginForm { form, .. } => {
                Self::render_form(frame, form, chunks[0]);
            }
            Workflow::Preview { item } => {
                let lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(item.kind.icon(), theme::title())),
                    Line::from(""),
                    Line::from(item.name.as_str()),
                    Line::from(Span::styled(item.media_url.as_str(), theme::dim())),
                    Line::from(""),
                    Line::from(Span::styled("Esc to close", theme::dim())),
                ];
                let para = Paragraph::new(Text::from(lines)).alignment(Alignment::Center);
                frame.render_widget(para, chunks[0]);
            }
            Workflow::Progress { entries, .. } => {
                let rows: Vec<ListItem<'_>> = entries
                    .iter()
                    .map(|entry| {
                        let (glyph, style) = match &entry.status {
                            ProgressStatus::Queued => ("…", theme::dim()),
                            ProgressStatus::Running => ("⠿", theme::info()),
                            ProgressStatus::Done => ("✓", theme::success()),
                            ProgressStatus::Failed(_) => ("✗", theme::error()),
                        };
                        let mut spans = vec![
                            Span::styled(glyph, style),
                            Span::raw(" "),
                            Span::raw(entry.label.to_string()),
                        ];
                        if let ProgressStatus::Failed(message) = &entry.status {
                            spans.push(Span::styled(format!("  {message}"), theme::error()));
                        }
                        ListItem::new(Line::from(spans))
                    })
                    .collect();
                frame.render_widget(List::new(rows), chunks[0]);
            }
        }

        if workflow.has_footer() {
            self.render_footer(frame, &confirm_label, chunks[1]);
        }
    }

    fn render_form(frame: &mut Frame<'_>, form: &FormState, area: Rect) {
        let mut lines: Vec<Line<'_>> = Vec::new();
        for (i, field) in form.fields.iter().enumerate() {
            if field.schema.kind == FieldKind::Hidden {
                continue;
            }
            let focused = i == form.focus;
            let label_style = if focused {
                theme::border_active()
            } else {
                theme::dim()
            };
            lines.push(Line::from(Span::styled(
                format!("{}:", field.schema.label),
                label_style,
            )));
            let value_line = match field.schema.kind {
                FieldKind::Select => {
                    let label = field
                        .schema
                        .options
                        .get(field.option_index)
                        .map(|o| o.label.as_str())
                        .unwrap_or("-");
                    Line::from(Span::styled(
                        format!("  ◀ {label} ▶"),
                        if focused { theme::selected() } else { Style::default() },
                    ))
                }
                _ => {
                    let mut spans = vec![Span::raw(format!("  {}", field.value))];
                    if focused {
                        spans.push(Span::styled("█", theme::cursor()));
                    }
                    Line::from(spans)
                }
            };
            lines.push(value_line);
            lines.push(Line::from(""));
        }
        frame.render_widget(Paragraph::new(Text::from(lines)), area);
    }

    fn render_footer(&self, frame: &mut Frame<'_>, confirm_label: &str, area: Rect) {
        let style_for = |button: ModalButton| {
            if self.focus == button {
                theme::button_focused()
            } else {
                theme::button()
            }
        };
        let line = Line::from(vec![
            Span::styled(" Cancel ", style_for(ModalButton::Cancel)),
            Span::raw("  "),
            Span::styled(format!(" {confirm_label} "), style_for(ModalButton::Confirm)),
        ]);
        frame.render_widget(
            Paragraph::new(line).alignment(Alignment::Center),
            area,
        );
    }

    fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let vertical: Rc<[Rect]> = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        let horizontal: Rc<[Rect]> = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1]);

        horizontal[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    use crate::model::item::{Item, MediaKind};
    use crate::model::workflow::PendingAction;

    fn draw(workflow: &Workflow) -> ratatui::buffer::Buffer {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let dialog = ModalDialog::new();
        terminal
            .draw(|frame| dialog.render(frame, workflow, frame.area()))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn confirm_modal_shows_prompt_and_footer() {
        let text = buffer_text(&draw(&Workflow::Confirm {
            title: "Delete".into(),
            prompt: "Delete 2 items?".into(),
            action: PendingAction::DeleteItems { items: vec![] },
        }));
        assert!(text.contains("Delete 2 items?"));
        assert!(text.contains("Cancel"));
        assert!(text.contains("Confirm"));
    }

    #[test]
    fn preview_modal_has_no_footer_buttons() {
        let text = buffer_text(&draw(&Workflow::Preview {
            item: Item::new(1, "Mountain.jpg", MediaKind::Image),
        }));
        assert!(text.contains("Mountain.jpg"));
        assert!(!text.contains("Cancel"));
    }

    #[test]
    fn footer_focus_toggles() {
        let mut dialog = ModalDialog::new();
        assert_eq!(dialog.focused_button(), ModalButton::Confirm);
        dialog.toggle_focus();
        assert_eq!(dialog.focused_button(), ModalButton::Cancel);
    }
}
