//! CSS-ready render parameters
//!
//! The webview can paint the card itself from these strings instead of (or on
//! top of) the Bevy frames.

use serde::{Deserialize, Serialize};

use super::gating::{EffectGates, TransitionMode};
use super::theme::ThemeTokens;
use super::tilt::TiltState;

const PERSPECTIVE_PX: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderParams {
    pub transform: String,
    pub transition: String,
    pub glow_gradient: String,
    pub glow_visible: bool,
    pub background_glow_visible: bool,
    pub electric_border: bool,
}

impl RenderParams {
    pub fn from_state(state: &TiltState, gates: &EffectGates, tokens: &ThemeTokens) -> Self {
        let transform = format!(
            "perspective({PERSPECTIVE_PX}px) rotateX({:.2}deg) rotateY({:.2}deg) rotateZ({:.2}deg)",
            state.rotate_x, state.rotate_y, state.rotate_z
        );
        let transition = match gates.transition_for(state) {
            TransitionMode::Eased(d) => format!("transform {}ms ease-out", d.as_millis()),
            TransitionMode::Instant => "none".to_string(),
        };
        let glow_gradient = format!(
            "radial-gradient(circle at {:.1}% {:.1}%, {}66 0%, transparent 60%)",
            state.glow_x,
            state.glow_y,
            tokens.glow.to_hex()
        );

        Self {
            transform,
            transition,
            glow_gradient,
            glow_visible: gates.glow_visible(state),
            background_glow_visible: gates.background_glow_visible(state),
            electric_border: gates.electric_border,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::theme::ThemeId;

    #[test]
    fn resting_card_eases_back() {
        let params = RenderParams::from_state(
            &TiltState::default(),
            &EffectGates::default(),
            ThemeId::Midnight.tokens(),
        );
        assert_eq!(
            params.transform,
            "perspective(1000px) rotateX(15.00deg) rotateY(-20.00deg) rotateZ(5.00deg)"
        );
        assert_eq!(params.transition, "transform 300ms ease-out");
        assert!(!params.glow_visible);
    }

    #[test]
    fn hovered_card_snaps_and_glows() {
        let state = TiltState {
            glow_x: 25.0,
            glow_y: 75.0,
            is_hovered: true,
            ..TiltState::default()
        };
        let params =
            RenderParams::from_state(&state, &EffectGates::default(), ThemeId::Mono.tokens());
        assert_eq!(params.transition, "none");
        assert!(params.glow_visible);
        assert_eq!(
            params.glow_gradient,
            "radial-gradient(circle at 25.0% 75.0%, #ffffff66 0%, transparent 60%)"
        );
    }
}
