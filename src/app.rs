use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use timer_core::{tick, Mode, TimerState, WaveFrame, WaveRenderer};

use crate::config::AppConfig;
use crate::picker::PresetPicker;
use crate::pump::Pump;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Screen {
    /// Preset row, no wave.
    Selector,
    /// Wave and remaining time, running or paused.
    Countdown,
    /// Reset was pressed; the wave drains before the selector comes back.
    Draining,
}

pub struct TimerApp {
    pub config: AppConfig,
    pub timer: TimerState,
    pub wave: WaveRenderer,
    pub picker: PresetPicker,
    pub screen: Screen,
    pub help_visible: bool,
    pub confirm_exit: bool,
    pub should_quit: bool,
    pump: Pump,
    /// Time shown while draining; the timer itself is already reset.
    drained_time_left_ms: u64,
}

impl TimerApp {
    pub fn new(config: AppConfig, pump: Pump, now_ms: u64) -> Self {
        let picker = PresetPicker::new(config.default_preset);
        let wave = WaveRenderer::new(config.color, now_ms);
        Self {
            config,
            timer: TimerState::new(),
            wave,
            picker,
            screen: Screen::Selector,
            help_visible: false,
            confirm_exit: false,
            should_quit: false,
            pump,
            drained_time_left_ms: 0,
        }
    }

    pub fn shutdown(&mut self) {
        if self.pump.is_running() {
            log::debug!("pump still running at shutdown");
        }
        self.pump.quit();
    }

    /// Remaining time to print on screen.
    pub fn time_left_ms(&self) -> u64 {
        match self.screen {
            Screen::Draining => self.drained_time_left_ms,
            _ => self.timer.time_left_ms,
        }
    }

    /// Progress the countdown itself reports, before any easing.
    pub fn live_progress(&self) -> f32 {
        match self.screen {
            Screen::Countdown => self.timer.progress(),
            _ => 0.0,
        }
    }

    pub fn wave_frame(&self, width: f32, height: f32, now_ms: u64) -> WaveFrame {
        self.wave.frame(self.live_progress(), width, height, now_ms)
    }

    pub fn handle_pump(&mut self, now_ms: u64) {
        match self.screen {
            Screen::Countdown => {
                let prev = self.timer;
                self.timer = tick(prev, now_ms);
                self.wave.advance(now_ms);
                if prev.mode == Mode::Running && self.timer.mode == Mode::Selecting {
                    log::info!("countdown of {}s expired", prev.initial_time_ms / 1000);
                    self.wave.set_running(false, now_ms);
                    self.confirm_exit = false;
                    self.show_selector();
                }
            }
            Screen::Draining => {
                self.wave.advance(now_ms);
                if !self.wave.progress_in_flight(now_ms) {
                    self.show_selector();
                }
            }
            Screen::Selector => self.pump.stop(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now_ms: u64) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Help overlay swallows the next key
        if self.help_visible {
            self.help_visible = false;
            return;
        }

        if self.confirm_exit {
            match key.code {
                KeyCode::Char('y') => self.should_quit = true,
                KeyCode::Char('n') | KeyCode::Esc => self.confirm_exit = false,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('?') => {
                self.help_visible = true;
                return;
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.request_quit();
                return;
            }
            _ => {}
        }

        match self.screen {
            Screen::Selector => self.handle_key_selector(key.code, now_ms),
            Screen::Countdown => self.handle_key_countdown(key.code, now_ms),
            Screen::Draining => {}
        }
    }

    fn request_quit(&mut self) {
        if self.screen == Screen::Countdown && self.timer.is_running() {
            self.confirm_exit = true;
        } else {
            self.should_quit = true;
        }
    }

    fn handle_key_selector(&mut self, code: KeyCode, now_ms: u64) {
        match code {
            KeyCode::Left | KeyCode::Char('h') => {
                self.picker.prev();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.picker.next();
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.start_countdown(now_ms),
            _ => {}
        }
    }

    fn handle_key_countdown(&mut self, code: KeyCode, now_ms: u64) {
        match code {
            KeyCode::Char(' ') | KeyCode::Char('p') => self.toggle_pause(now_ms),
            KeyCode::Char('r') => self.reset(now_ms),
            _ => {}
        }
    }

    pub fn start_countdown(&mut self, now_ms: u64) {
        let seconds = self.picker.selected_seconds();
        self.timer = self.timer.select_duration(seconds, now_ms);
        if self.timer.mode != Mode::Running {
            return;
        }
        log::info!("countdown of {}s started", seconds);
        self.wave.on_duration_selected(&self.timer, now_ms);
        self.wave.set_running(true, now_ms);
        self.screen = Screen::Countdown;
        self.pump.start();
    }

    pub fn toggle_pause(&mut self, now_ms: u64) {
        match self.timer.mode {
            Mode::Running => {
                self.timer = self.timer.pause();
                self.wave.set_running(false, now_ms);
                log::info!("paused with {}ms left", self.timer.time_left_ms);
            }
            Mode::Paused => {
                self.timer = self.timer.resume(now_ms);
                self.wave.set_running(true, now_ms);
                log::info!("resumed with {}ms left", self.timer.total_time_ms);
            }
            Mode::Selecting => {}
        }
    }

    pub fn reset(&mut self, now_ms: u64) {
        if self.timer.mode == Mode::Selecting {
            return;
        }
        let live = self.timer.progress();
        self.drained_time_left_ms = self.timer.time_left_ms;
        self.timer = self.timer.reset();
        log::info!("reset with {}ms left", self.drained_time_left_ms);

        self.wave.set_running(false, now_ms);
        self.wave.on_reset(live, now_ms);
        self.confirm_exit = false;
        self.screen = Screen::Draining;
    }

    fn show_selector(&mut self) {
        self.screen = Screen::Selector;
        self.pump.stop();
    }
}
