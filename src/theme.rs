//! Theme mode and the change-notification signal.
//!
//! Light/dark mode is a cross-cutting concern: image visibility and code
//! block colors both depend on it. Rather than a mutable global that
//! components poll, the mode lives in an explicit [`ThemeSignal`] passed down
//! at construction. Components subscribe with a callback and are notified
//! synchronously when the mode changes; a [`Subscription`] unhooks its
//! callback when dropped, so a discarded page stops receiving updates.
//!
//! The per-callout-type style table (icon, border, background tint) also
//! lives here, with one column per mode.

use crate::directive::CalloutKind;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// The two display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    /// Case-insensitive lookup; `None` for anything but "light"/"dark".
    pub fn from_name(name: &str) -> Option<ThemeMode> {
        match name.to_ascii_lowercase().as_str() {
            "light" => Some(ThemeMode::Light),
            "dark" => Some(ThemeMode::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn other(self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Callback = Rc<dyn Fn(ThemeMode)>;

struct SignalState {
    mode: ThemeMode,
    next_id: u64,
    subscribers: Vec<(u64, Callback)>,
}

/// Single-owner theme state with push notification.
///
/// Cloning the signal shares the underlying state; all clones observe the
/// same mode. Not `Send` — the pipeline is single-threaded by design.
#[derive(Clone)]
pub struct ThemeSignal {
    inner: Rc<RefCell<SignalState>>,
}

impl ThemeSignal {
    pub fn new(mode: ThemeMode) -> Self {
        ThemeSignal {
            inner: Rc::new(RefCell::new(SignalState {
                mode,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> ThemeMode {
        self.inner.borrow().mode
    }

    /// Set the mode and notify every subscriber synchronously.
    ///
    /// Setting the current mode again is a no-op (handlers are idempotent,
    /// but there is nothing to reflect). Callbacks run without the state
    /// borrowed, so a handler may read the signal or drop its subscription.
    pub fn set(&self, mode: ThemeMode) {
        let callbacks: Vec<Callback> = {
            let mut state = self.inner.borrow_mut();
            if state.mode == mode {
                return;
            }
            state.mode = mode;
            state.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback(mode);
        }
    }

    pub fn toggle(&self) {
        self.set(self.get().other());
    }

    /// Register a callback invoked on every mode change. The callback stays
    /// registered for the lifetime of the returned [`Subscription`].
    #[must_use = "dropping the subscription unregisters the callback"]
    pub fn subscribe(&self, callback: impl Fn(ThemeMode) + 'static) -> Subscription {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push((id, Rc::new(callback)));
        Subscription {
            id,
            state: Rc::downgrade(&self.inner),
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl Default for ThemeSignal {
    fn default() -> Self {
        ThemeSignal::new(ThemeMode::Light)
    }
}

/// Handle to a registered theme callback; unregisters on drop.
pub struct Subscription {
    id: u64,
    state: Weak<RefCell<SignalState>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

// =============================================================================
// Callout styling
// =============================================================================

/// Visual treatment for one callout type under one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalloutStyle {
    /// Icon class rendered before the callout body.
    pub icon: &'static str,
    /// Border accent color.
    pub border: &'static str,
    /// Background tint.
    pub tint: &'static str,
}

/// Fixed per-type style table.
pub fn callout_style(kind: CalloutKind, mode: ThemeMode) -> CalloutStyle {
    let (icon, border, light_tint, dark_tint) = match kind {
        CalloutKind::Note => ("bi bi-pencil-fill", "#757575", "#f5f5f5", "#26262b"),
        CalloutKind::Info => ("bi bi-info-circle-fill", "#2196f3", "#e3f2fd", "#0d2a42"),
        CalloutKind::Tip => ("bi bi-lightbulb-fill", "#00bcd4", "#e0f7fa", "#0b3337"),
        CalloutKind::Warning => ("bi bi-exclamation-triangle-fill", "#ff9800", "#fff3e0", "#3d2c12"),
        CalloutKind::Caution => ("bi bi-cone-striped", "#f44336", "#ffebee", "#3c1a1a"),
        CalloutKind::Error => ("bi bi-exclamation-circle-fill", "#d32f2f", "#ffebee", "#3c1414"),
        CalloutKind::Success => ("bi bi-check-circle-fill", "#4caf50", "#e8f5e9", "#16301a"),
    };
    CalloutStyle {
        icon,
        border,
        tint: match mode {
            ThemeMode::Light => light_tint,
            ThemeMode::Dark => dark_tint,
        },
    }
}

/// Generate CSS custom properties for every callout type, with dark-mode
/// overrides keyed off the `data-theme` attribute the theme script toggles.
pub fn generate_callout_css() -> String {
    let mut css = String::new();
    for (selector, mode) in [(":root", ThemeMode::Light), ("[data-theme=\"dark\"]", ThemeMode::Dark)] {
        css.push_str(selector);
        css.push_str(" {\n");
        for kind in CalloutKind::ALL {
            let style = callout_style(kind, mode);
            css.push_str(&format!(
                "    --callout-{name}-border: {border};\n    --callout-{name}-tint: {tint};\n",
                name = kind.name(),
                border = style.border,
                tint = style.tint,
            ));
        }
        css.push_str("}\n\n");
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn mode_round_trips_through_name() {
        assert_eq!(ThemeMode::from_name("light"), Some(ThemeMode::Light));
        assert_eq!(ThemeMode::from_name("DARK"), Some(ThemeMode::Dark));
        assert_eq!(ThemeMode::from_name("sepia"), None);
        assert_eq!(ThemeMode::Dark.to_string(), "dark");
    }

    #[test]
    fn set_notifies_subscribers() {
        let signal = ThemeSignal::new(ThemeMode::Light);
        let seen = Rc::new(Cell::new(None));
        let seen_in_cb = Rc::clone(&seen);
        let _sub = signal.subscribe(move |mode| seen_in_cb.set(Some(mode)));

        signal.set(ThemeMode::Dark);
        assert_eq!(seen.get(), Some(ThemeMode::Dark));
        assert_eq!(signal.get(), ThemeMode::Dark);
    }

    #[test]
    fn setting_same_mode_does_not_notify() {
        let signal = ThemeSignal::new(ThemeMode::Light);
        let count = Rc::new(Cell::new(0));
        let count_in_cb = Rc::clone(&count);
        let _sub = signal.subscribe(move |_| count_in_cb.set(count_in_cb.get() + 1));

        signal.set(ThemeMode::Light);
        assert_eq!(count.get(), 0);
        signal.set(ThemeMode::Dark);
        signal.set(ThemeMode::Dark);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dropped_subscription_unregisters() {
        let signal = ThemeSignal::new(ThemeMode::Light);
        let sub = signal.subscribe(|_| {});
        assert_eq!(signal.subscriber_count(), 1);
        drop(sub);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn toggle_flips_mode() {
        let signal = ThemeSignal::new(ThemeMode::Light);
        signal.toggle();
        assert_eq!(signal.get(), ThemeMode::Dark);
        signal.toggle();
        assert_eq!(signal.get(), ThemeMode::Light);
    }

    #[test]
    fn clones_share_state() {
        let signal = ThemeSignal::new(ThemeMode::Light);
        let clone = signal.clone();
        clone.set(ThemeMode::Dark);
        assert_eq!(signal.get(), ThemeMode::Dark);
    }

    #[test]
    fn style_table_covers_all_kinds_and_modes() {
        for kind in CalloutKind::ALL {
            for mode in [ThemeMode::Light, ThemeMode::Dark] {
                let style = callout_style(kind, mode);
                assert!(style.border.starts_with('#'));
                assert!(style.tint.starts_with('#'));
                assert!(!style.icon.is_empty());
            }
        }
    }

    #[test]
    fn callout_css_has_dark_overrides() {
        let css = generate_callout_css();
        assert!(css.contains("--callout-warning-border"));
        assert!(css.contains("[data-theme=\"dark\"]"));
    }
}
