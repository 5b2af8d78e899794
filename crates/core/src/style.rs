//! The shared stylesheet and its instance-counted registry.
//!
//! Every live viewer holds a [`StyleLease`]. The stylesheet is installed
//! when the first lease is taken and uninstalled when the last one is
//! dropped, so hosts that embed several viewers share one set of chrome
//! colors and can tear it down once nothing uses it.

use std::cell::RefCell;
use std::rc::Rc;

use icicle_protocol::{Color, ThemeToken};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

/// Chrome colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stylesheet {
    pub mode: ThemeMode,
}

impl Stylesheet {
    pub fn new(mode: ThemeMode) -> Self {
        Self { mode }
    }

    pub fn resolve(&self, token: ThemeToken) -> Color {
        match self.mode {
            ThemeMode::Dark => resolve_dark(token),
            ThemeMode::Light => resolve_light(token),
        }
    }
}

fn resolve_dark(token: ThemeToken) -> Color {
    // Catppuccin Mocha palette
    use ThemeToken::*;
    match token {
        Background => Color::rgb(17.0, 17.0, 27.0),   // Crust
        HoverBorder => Color::rgb(205.0, 214.0, 244.0), // Text

        TextPrimary => Color::rgb(205.0, 214.0, 244.0), // Text
        TextMuted => Color::rgb(166.0, 173.0, 200.0),   // Subtext0

        TooltipBackground => Color::rgb(30.0, 30.0, 46.0), // Base
        TooltipBorder => Color::rgb(69.0, 71.0, 90.0),     // Surface1
        TooltipText => Color::rgb(205.0, 214.0, 244.0),

        ToolbarBackground => Color::rgb(24.0, 24.0, 37.0), // Mantle
        ToolbarText => Color::rgb(205.0, 214.0, 244.0),
        ToolbarBorder => Color::rgb(68.0, 68.0, 68.0),
    }
}

fn resolve_light(token: ThemeToken) -> Color {
    use ThemeToken::*;
    match token {
        Background => Color::rgb(255.0, 255.0, 255.0),
        HoverBorder => Color::rgb(20.0, 20.0, 30.0),

        TextPrimary => Color::rgb(20.0, 20.0, 30.0),
        TextMuted => Color::rgb(100.0, 100.0, 110.0),

        TooltipBackground => Color::rgb(221.0, 221.0, 221.0),
        TooltipBorder => Color::rgb(0.0, 0.0, 0.0),
        TooltipText => Color::rgb(20.0, 20.0, 30.0),

        ToolbarBackground => Color::rgb(248.0, 248.0, 250.0),
        ToolbarText => Color::rgb(40.0, 40.0, 50.0),
        ToolbarBorder => Color::rgb(68.0, 68.0, 68.0),
    }
}

#[derive(Debug)]
struct RegistryState {
    mode: ThemeMode,
    installed: Option<Stylesheet>,
    references: usize,
}

/// Owner of the shared stylesheet. Clones share the same state.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new(ThemeMode::default())
    }
}

impl StyleRegistry {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState {
                mode,
                installed: None,
                references: 0,
            })),
        }
    }

    /// Take a reference, installing the stylesheet if none is live.
    pub fn acquire(&self) -> StyleLease {
        let mut state = self.state.borrow_mut();
        if state.installed.is_none() {
            state.installed = Some(Stylesheet::new(state.mode));
            log::debug!("stylesheet installed ({:?})", state.mode);
        }
        state.references += 1;
        StyleLease {
            state: Rc::clone(&self.state),
        }
    }

    /// Switch the theme of the installed (and any future) stylesheet.
    pub fn restyle(&self, mode: ThemeMode) {
        let mut state = self.state.borrow_mut();
        state.mode = mode;
        if let Some(sheet) = state.installed.as_mut() {
            sheet.mode = mode;
        }
    }

    pub fn is_installed(&self) -> bool {
        self.state.borrow().installed.is_some()
    }

    /// Number of live leases.
    pub fn references(&self) -> usize {
        self.state.borrow().references
    }

    pub fn stylesheet(&self) -> Option<Stylesheet> {
        self.state.borrow().installed
    }
}

/// One viewer's hold on the shared stylesheet. Dropping it releases the
/// reference.
#[derive(Debug)]
pub struct StyleLease {
    state: Rc<RefCell<RegistryState>>,
}

impl StyleLease {
    pub fn stylesheet(&self) -> Stylesheet {
        let state = self.state.borrow();
        state.installed.unwrap_or(Stylesheet::new(state.mode))
    }
}

impl Drop for StyleLease {
    fn drop(&mut self) {
        let mut state = self.state.borrow_mut();
        state.references = state.references.saturating_sub(1);
        if state.references == 0 {
            state.installed = None;
            log::debug!("stylesheet removed");
        }
    }
}
