//! src/controller/event_loop.rs
//! ============================================================================
//! # EventLoop: Terminal Wiring
//!
//! Single-task cooperative loop: `tokio::select!` over the crossterm event
//! stream, the inbound notification channel, and a tick timer for toast
//! expiry. Raw key events are mapped to typed widget events here; the
//! widgets and the orchestrator never see the terminal.

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, warn};

use crate::controller::actions::PanelAction;
use crate::controller::events::{GalleryNotification, ModalEvent, NavEvent};
use crate::controller::orchestrator::Gallery;
use crate::error::GalleryError;
use crate::view::components::modal::ModalDialog;
use crate::view::components::items_grid::ItemsGrid;
use crate::view::components::navigation_list::NavigationList;
use crate::view::components::toast::ToastOverlay;
use crate::view::components::toolbar::Toolbar;
use crate::view::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Grid,
    Toolbar,
    Nav,
}

pub struct EventLoop {
    gallery: Gallery,
    toolbar: Toolbar,
    grid: ItemsGrid,
    nav: NavigationList,
    modal: ModalDialog,
    notifications_tx: mpsc::UnboundedSender<GalleryNotification>,
    notifications_rx: mpsc::UnboundedReceiver<GalleryNotification>,
    focus: Focus,
    modal_was_open: bool,
    should_quit: bool,
}

impl EventLoop {
    pub fn new(gallery: Gallery) -> Self {
        let (notifications_tx, notifications_rx) = mpsc::unbounded_channel();
        let toolbar = Toolbar::new(gallery.config().toolbar.clone());
        let grid = ItemsGrid::new(gallery.config().grid.clone());
        Self {
            gallery,
            toolbar,
            grid,
            nav: NavigationList::new(),
            modal: ModalDialog::new(),
            notifications_tx,
            notifications_rx,
            focus: Focus::Grid,
            modal_was_open: false,
            should_quit: false,
        }
    }

    /// Sender for external systems pushing notifications into the loop.
    pub fn notification_sender(&self) -> mpsc::UnboundedSender<GalleryNotification> {
        self.notifications_tx.clone()
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), GalleryError> {
        let mut events = EventStream::new();
        let mut tick = interval(std::time::Duration::from_millis(250));
        self.sync();

        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(TermEvent::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key).await;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => warn!(%err, "Terminal event stream error"),
                        None => break,
                    }
                    self.sync();
                }
                Some(notification) = self.notifications_rx.recv() => {
                    self.gallery.notify(notification).await;
                    self.sync();
                }
                _ = tick.tick() => {
                    let ttl = self.gallery.config().toast.ttl;
                    // Toast mutation happens inside the gallery state; the
                    // next draw picks it up.
                    self.gallery.expire_toasts(ttl);
                }
            }
        }
        Ok(())
    }

    /// Push orchestrator state into the widgets. The toolbar item list is
    /// only replaced when it actually changed, so overflow-menu state
    /// survives unrelated events.
    fn sync(&mut self) {
        let items = self.gallery.toolbar_items();
        if items != self.toolbar.items() {
            self.toolbar.set_items(items);
        }

        self.grid.set_entries(self.gallery.grid_entries());
        let state = self.gallery.state();
        self.grid
            .set_loading(state.loading, state.loading_message.clone());
        self.grid.set_error(state.load_error.clone());
        self.nav
            .set_folders(state.folders.clone(), state.current_folder_id());

        let modal_open = state.workflow.is_active();
        if modal_open && !self.modal_was_open {
            self.modal.reset();
        }
        self.modal_was_open = modal_open;

        if !self.gallery.panel_visible() && self.focus == Focus::Nav {
            self.focus = Focus::Grid;
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.gallery.state().workflow.is_active() {
            self.handle_modal_key(key).await;
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Grid => Focus::Toolbar,
                    Focus::Toolbar if self.gallery.panel_visible() => Focus::Nav,
                    Focus::Toolbar => Focus::Grid,
                    Focus::Nav => Focus::Grid,
                };
                return;
            }
            _ => {}
        }

        let result = match self.focus {
            Focus::Grid => self.handle_grid_key(key).await,
            Focus::Toolbar => self.handle_toolbar_key(key).await,
            Focus::Nav => self.handle_nav_key(key).await,
        };
        if let Err(err) = result {
            debug!(%err, "Event rejected");
            // Guard errors (workflow already active) surface as toasts.
            self.gallery.toast_info(err.user_message());
        }
    }

    async fn handle_modal_key(&mut self, key: KeyEvent) {
        let event = match key.code {
            KeyCode::Esc => Some(ModalEvent::Dismiss),
            KeyCode::Enter => Some(ModalEvent::Button(self.modal.focused_button())),
            KeyCode::Left | KeyCode::Right => {
                let has_footer = self
                    .gallery
                    .state()
                    .workflow
                    .active()
                    .map(|w| w.has_footer())
                    .unwrap_or(false);
                if has_footer {
                    self.modal.toggle_focus();
                }
                None
            }
            KeyCode::Tab => Some(ModalEvent::FocusNext),
            KeyCode::BackTab => Some(ModalEvent::FocusPrev),
            KeyCode::Up => Some(ModalEvent::CursorUp),
            KeyCode::Down => Some(ModalEvent::CursorDown),
            KeyCode::Backspace => Some(ModalEvent::Backspace),
            KeyCode::Char(ch) => Some(ModalEvent::Insert(ch)),
            _ => None,
        };
        if let Some(event) = event {
            if let Err(err) = self.gallery.handle_modal_event(event).await {
                debug!(%err, "Modal event rejected");
            }
        }
    }

    async fn handle_grid_key(&mut self, key: KeyEvent) -> Result<(), GalleryError> {
        let event = match key.code {
            KeyCode::Up => {
                self.grid.move_up();
                None
            }
            KeyCode::Down => {
                self.grid.move_down();
                None
            }
            KeyCode::Left => {
                self.grid.move_left();
                None
            }
            KeyCode::Right => {
                self.grid.move_right();
                None
            }
            KeyCode::Enter => self.grid.click(false),
            KeyCode::Char(' ') => self.grid.click(true),
            KeyCode::Char('o') => self.grid.open(),
            KeyCode::Char(ch @ '1'..='9') => {
                let index = ch as usize - '1' as usize;
                self.grid.action(index)
            }
            _ => None,
        };
        match event {
            Some(event) => self.gallery.handle_grid_event(event).await,
            None => Ok(()),
        }
    }

    async fn handle_toolbar_key(&mut self, key: KeyEvent) -> Result<(), GalleryError> {
        if self.toolbar.search_focused() {
            match key.code {
                KeyCode::Backspace => {
                    self.toolbar.search_backspace();
                    return Ok(());
                }
                KeyCode::Char(ch) => {
                    self.toolbar.search_insert(ch);
                    return Ok(());
                }
                _ => {}
            }
        }
        match key.code {
            KeyCode::Left => {
                self.toolbar.focus_prev();
                Ok(())
            }
            KeyCode::Right => {
                self.toolbar.focus_next();
                Ok(())
            }
            KeyCode::Up | KeyCode::Down if self.toolbar.overflow_open() => {
                if key.code == KeyCode::Up {
                    self.toolbar.focus_prev();
                } else {
                    self.toolbar.focus_next();
                }
                Ok(())
            }
            KeyCode::Esc => {
                self.toolbar.close_overflow();
                Ok(())
            }
            KeyCode::Enter => match self.toolbar.press() {
                Some(event) => self.gallery.handle_toolbar_event(event).await,
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    async fn handle_nav_key(&mut self, key: KeyEvent) -> Result<(), GalleryError> {
        let event = match key.code {
            KeyCode::Up => {
                self.nav.move_up();
                None
            }
            KeyCode::Down => {
                self.nav.move_down();
                None
            }
            KeyCode::Enter => self.nav.select(),
            KeyCode::Char('n') => Some(NavEvent::Panel(PanelAction::CreateFolder)),
            KeyCode::Char('r') => Some(NavEvent::Panel(PanelAction::RenameFolder)),
            KeyCode::Char('d') | KeyCode::Delete => Some(NavEvent::Panel(PanelAction::DeleteFolder)),
            _ => None,
        };
        match event {
            Some(event) => self.gallery.handle_nav_event(event).await,
            None => Ok(()),
        }
    }

    fn draw(&mut self, frame: &mut Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(frame.area());

        self.draw_title(frame, chunks[0]);
        self.toolbar.render(frame, chunks[1]);

        let body = chunks[2];
        let grid_area = if self.gallery.panel_visible() {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(24), Constraint::Min(1)])
                .split(body);
            self.nav.render(frame, split[0]);
            split[1]
        } else {
            body
        };
        self.grid.render(frame, grid_area);

        if let Some(workflow) = self.gallery.state().workflow.active() {
            self.modal.render(frame, workflow, frame.area());
        }

        ToastOverlay::render(
            frame,
            &self.gallery.state().toasts,
            self.gallery.config().toast.max_visible,
            frame.area(),
        );
    }

    fn draw_title(&self, frame: &mut Frame<'_>, area: Rect) {
        let state = self.gallery.state();
        let mut spans = vec![Span::styled(state.title.to_string(), theme::title())];
        let selected = state.selection.len();
        if selected > 0 {
            spans.push(Span::styled(
                format!("  {selected} selected"),
                theme::info(),
            ));
        }
        if state.generations.active_count() > 0 {
            spans.push(Span::styled("  generating…", theme::dim()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
