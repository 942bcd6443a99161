//! Reactive theme state and variant styles.
//!
//! A single active `Theme` lives behind a signal. Variant colors are bound
//! into color slots as *getters*, so swapping the theme re-triggers every
//! dependent without touching the components themselves.

use spark_signals::{signal, Signal};

use crate::types::Rgba;

// =============================================================================
// Types
// =============================================================================

/// Style pair a variant resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantStyle {
    pub fg: Rgba,
    pub bg: Rgba,
}

/// Color roles for the running application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub fg: Rgba,
    pub bg: Rgba,
    pub primary: VariantStyle,
    pub secondary: VariantStyle,
    pub success: VariantStyle,
    pub warning: VariantStyle,
    pub danger: VariantStyle,
    pub muted: VariantStyle,
}

/// Shortcut prop mapping a component onto a theme role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Default,
    Primary,
    Secondary,
    Success,
    Warning,
    Danger,
    Muted,
}

impl Theme {
    /// Resolve a variant to its style pair.
    pub fn variant_style(&self, variant: Variant) -> VariantStyle {
        match variant {
            Variant::Default => VariantStyle {
                fg: self.fg,
                bg: self.bg,
            },
            Variant::Primary => self.primary,
            Variant::Secondary => self.secondary,
            Variant::Success => self.success,
            Variant::Warning => self.warning,
            Variant::Danger => self.danger,
            Variant::Muted => self.muted,
        }
    }
}

/// The default theme: terminal colors with ANSI accents.
pub fn terminal() -> Theme {
    Theme {
        fg: Rgba::TERMINAL_DEFAULT,
        bg: Rgba::TERMINAL_DEFAULT,
        primary: VariantStyle {
            fg: Rgba::ansi(4),
            bg: Rgba::TERMINAL_DEFAULT,
        },
        secondary: VariantStyle {
            fg: Rgba::ansi(6),
            bg: Rgba::TERMINAL_DEFAULT,
        },
        success: VariantStyle {
            fg: Rgba::ansi(2),
            bg: Rgba::TERMINAL_DEFAULT,
        },
        warning: VariantStyle {
            fg: Rgba::ansi(3),
            bg: Rgba::TERMINAL_DEFAULT,
        },
        danger: VariantStyle {
            fg: Rgba::ansi(1),
            bg: Rgba::TERMINAL_DEFAULT,
        },
        muted: VariantStyle {
            fg: Rgba::ansi(8),
            bg: Rgba::TERMINAL_DEFAULT,
        },
    }
}

// =============================================================================
// Reactive state
// =============================================================================

thread_local! {
    static ACTIVE_THEME: Signal<Theme> = signal(terminal());
}

/// Current theme (reactive read).
pub fn active_theme() -> Theme {
    ACTIVE_THEME.with(|s| s.get())
}

/// Swap the active theme; every variant getter re-evaluates.
pub fn set_theme(theme: Theme) {
    ACTIVE_THEME.with(|s| s.set(theme));
}

/// Variant foreground at read time.
pub fn variant_fg(variant: Variant) -> Rgba {
    active_theme().variant_style(variant).fg
}

/// Variant background at read time.
pub fn variant_bg(variant: Variant) -> Rgba {
    active_theme().variant_style(variant).bg
}

/// Reset to the default theme (tests).
pub fn reset_theme_state() {
    set_theme(terminal());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_variant_uses_theme_colors() {
        reset_theme_state();

        let style = active_theme().variant_style(Variant::Default);
        assert!(style.fg.is_terminal_default());
    }

    #[test]
    fn test_set_theme_changes_variant_colors() {
        reset_theme_state();

        let mut theme = terminal();
        theme.primary.fg = Rgba::rgb(10, 20, 30);
        set_theme(theme);

        assert_eq!(variant_fg(Variant::Primary), Rgba::rgb(10, 20, 30));
        reset_theme_state();
    }
}
