//! Theme color tokens and the theme context
//!
//! The token table is static. `ThemeContext` is the single owner of the active
//! theme; consumers subscribe for change notifications instead of watching
//! global style state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeTokens {
    pub card: Rgb,
    pub border: Rgb,
    pub glow: Rgb,
    pub background: Rgb,
    pub text: Rgb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeId {
    #[default]
    Midnight,
    Aurora,
    Ember,
    Forest,
    Mono,
}

impl ThemeId {
    pub const ALL: [ThemeId; 5] = [
        ThemeId::Midnight,
        ThemeId::Aurora,
        ThemeId::Ember,
        ThemeId::Forest,
        ThemeId::Mono,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeId::Midnight => "midnight",
            ThemeId::Aurora => "aurora",
            ThemeId::Ember => "ember",
            ThemeId::Forest => "forest",
            ThemeId::Mono => "mono",
        }
    }

    pub fn tokens(self) -> &'static ThemeTokens {
        match self {
            ThemeId::Midnight => &MIDNIGHT,
            ThemeId::Aurora => &AURORA,
            ThemeId::Ember => &EMBER,
            ThemeId::Forest => &FOREST,
            ThemeId::Mono => &MONO,
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme '{0}'")]
pub struct UnknownTheme(pub String);

impl FromStr for ThemeId {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

const MIDNIGHT: ThemeTokens = ThemeTokens {
    card: Rgb(0x12, 0x16, 0x2b),
    border: Rgb(0x4f, 0x8c, 0xff),
    glow: Rgb(0x7a, 0xa8, 0xff),
    background: Rgb(0x0b, 0x0d, 0x17),
    text: Rgb(0xe6, 0xec, 0xff),
};

const AURORA: ThemeTokens = ThemeTokens {
    card: Rgb(0x10, 0x22, 0x2a),
    border: Rgb(0x2d, 0xe3, 0xb5),
    glow: Rgb(0xa0, 0x7b, 0xff),
    background: Rgb(0x06, 0x14, 0x18),
    text: Rgb(0xe0, 0xff, 0xf6),
};

const EMBER: ThemeTokens = ThemeTokens {
    card: Rgb(0x2a, 0x12, 0x0e),
    border: Rgb(0xff, 0x6a, 0x2b),
    glow: Rgb(0xff, 0xb3, 0x47),
    background: Rgb(0x14, 0x08, 0x06),
    text: Rgb(0xff, 0xee, 0xe2),
};

const FOREST: ThemeTokens = ThemeTokens {
    card: Rgb(0x13, 0x24, 0x17),
    border: Rgb(0x5c, 0xc9, 0x6b),
    glow: Rgb(0xc8, 0xf5, 0x8a),
    background: Rgb(0x08, 0x12, 0x0a),
    text: Rgb(0xea, 0xf7, 0xe6),
};

const MONO: ThemeTokens = ThemeTokens {
    card: Rgb(0x1c, 0x1c, 0x1c),
    border: Rgb(0xd0, 0xd0, 0xd0),
    glow: Rgb(0xff, 0xff, 0xff),
    background: Rgb(0x0a, 0x0a, 0x0a),
    text: Rgb(0xf5, 0xf5, 0xf5),
};

// =============================================================================
// Context
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(ThemeId, &ThemeTokens) + Send>;

pub struct ThemeContext {
    current: ThemeId,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl ThemeContext {
    pub fn new(initial: ThemeId) -> Self {
        Self {
            current: initial,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> ThemeId {
        self.current
    }

    pub fn tokens(&self) -> &'static ThemeTokens {
        self.current.tokens()
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(ThemeId, &ThemeTokens) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Switch themes; listeners run only when the theme actually changes
    pub fn set_theme(&mut self, theme: ThemeId) -> bool {
        if theme == self.current {
            return false;
        }
        self.current = theme;
        tracing::info!(target: "card::theme", %theme, "theme changed");
        let tokens = theme.tokens();
        for (_, listener) in self.listeners.iter_mut() {
            listener(theme, tokens);
        }
        true
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(ThemeId::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn parses_theme_names() {
        assert_eq!("aurora".parse::<ThemeId>().unwrap(), ThemeId::Aurora);
        assert_eq!(" Ember ".parse::<ThemeId>().unwrap(), ThemeId::Ember);
        let err = "neon".parse::<ThemeId>().unwrap_err();
        assert_eq!(err, UnknownTheme("neon".to_string()));
        assert_eq!(err.to_string(), "unknown theme 'neon'");
        for id in ThemeId::ALL {
            assert_eq!(id.to_string().parse::<ThemeId>().unwrap(), id);
        }
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(Rgb(0x4f, 0x8c, 0xff).to_hex(), "#4f8cff");
        assert_eq!(Rgb(0, 0, 0).to_hex(), "#000000");
    }

    #[test]
    fn every_theme_has_distinct_tokens() {
        for (i, a) in ThemeId::ALL.iter().enumerate() {
            for b in &ThemeId::ALL[i + 1..] {
                assert_ne!(a.tokens(), b.tokens());
            }
        }
    }

    #[test]
    fn listeners_fire_on_change_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ctx = ThemeContext::default();
        let sink = seen.clone();
        ctx.subscribe(move |id, tokens| sink.lock().unwrap().push((id, tokens.border)));

        assert!(!ctx.set_theme(ThemeId::Midnight));
        assert!(ctx.set_theme(ThemeId::Forest));
        assert_eq!(ctx.current(), ThemeId::Forest);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(ThemeId::Forest, ThemeId::Forest.tokens().border)]
        );
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let count = Arc::new(Mutex::new(0));
        let mut ctx = ThemeContext::default();
        let sink = count.clone();
        let id = ctx.subscribe(move |_, _| *sink.lock().unwrap() += 1);

        ctx.set_theme(ThemeId::Mono);
        assert!(ctx.unsubscribe(id));
        assert!(!ctx.unsubscribe(id));
        ctx.set_theme(ThemeId::Aurora);
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
