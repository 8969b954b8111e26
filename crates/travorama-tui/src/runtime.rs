//! TUI runtime - owns the terminal and runs the event loop.
//!
//! Terminal input goes through `update` and becomes login flow events for the
//! controller. Login answers arrive on the controller's inbox, which is
//! drained every iteration so the screen never blocks on the network.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use travorama_core::flow::{Exit, LoginController, LoginEffect};

use crate::state::ScreenState;
use crate::{render, terminal, update};

/// Tick cadence while a login request is in flight (spinner animation).
pub const FRAME_DURATION: Duration = Duration::from_millis(80);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(250);

/// Full-screen login runtime. Restores the terminal on drop.
pub struct LoginRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    screen: ScreenState,
    controller: LoginController,
    last_tick: Instant,
}

impl LoginRuntime {
    /// Enters the alternate screen. Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(controller: LoginController) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        Ok(Self {
            terminal,
            screen: ScreenState::new(),
            controller,
            last_tick: Instant::now(),
        })
    }

    /// How the screen ended, once `run` has returned.
    pub fn exit(&self) -> Option<Exit> {
        self.controller.exit()
    }

    /// Runs until the user quits or logs in.
    ///
    /// # Errors
    /// Returns an error if drawing or reading terminal input fails.
    pub fn run(&mut self) -> Result<()> {
        let view = self.controller.mount();
        self.apply_view_effects(&view);

        let result = self.event_loop();
        self.controller.teardown();
        result
    }

    /// Restores the terminal, then waits for the controller's background
    /// effects. Returns how the screen ended.
    pub async fn shutdown(&mut self) -> Option<Exit> {
        let _ = terminal::restore_terminal();
        self.controller.shutdown().await;
        self.controller.exit()
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.screen.should_quit {
            let (applied, view) = self.controller.drain_inbox();
            self.apply_view_effects(&view);
            dirty |= applied;

            if self.controller.exit().is_some() {
                break;
            }

            if dirty {
                let screen = &self.screen;
                let form = self.controller.state();
                self.terminal
                    .draw(|frame| render::render(screen, form, frame))?;
                dirty = false;
            }

            let tick_interval = if self.controller.state().is_submitting() {
                FRAME_DURATION
            } else {
                IDLE_POLL_DURATION
            };
            let poll_duration = tick_interval.saturating_sub(self.last_tick.elapsed());

            if event::poll(poll_duration)? {
                self.handle_terminal_event(event::read()?);
                while event::poll(Duration::ZERO)? {
                    self.handle_terminal_event(event::read()?);
                }
                dirty = true;
            }

            if self.last_tick.elapsed() >= tick_interval {
                dirty |= update::tick(&mut self.screen, self.controller.state());
                self.last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn handle_terminal_event(&mut self, term_event: event::Event) {
        let events =
            update::handle_terminal_event(&mut self.screen, self.controller.state(), term_event);
        for event in events {
            let view = self.controller.dispatch(event);
            self.apply_view_effects(&view);
        }
    }

    fn apply_view_effects(&mut self, effects: &[LoginEffect]) {
        for effect in effects {
            update::apply_view_effect(&mut self.screen, effect);
        }
    }
}

impl Drop for LoginRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
