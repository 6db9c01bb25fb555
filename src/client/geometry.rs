use std::fmt;

use wayland_protocols::xdg::shell::client::xdg_toplevel;

/// Size proposed by a toplevel configure, after zero dimensions were resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToplevelGeometry {
    pub width: i32,
    pub height: i32,
}

impl ToplevelGeometry {
    /// Substituted for any dimension the compositor leaves to the client.
    pub const FALLBACK: i32 = 100;

    pub fn resolve(width: i32, height: i32) -> Self {
        let pick = |v: i32| if v <= 0 { Self::FALLBACK } else { v };
        Self {
            width: pick(width),
            height: pick(height),
        }
    }
}

impl fmt::Display for ToplevelGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One entry of the toplevel's presented state array. Informational only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentedState {
    Maximized,
    Fullscreen,
    Resizing,
    Activated,
    TiledLeft,
    TiledRight,
    TiledTop,
    TiledBottom,
    Other(u32),
}

impl From<u32> for PresentedState {
    fn from(raw: u32) -> Self {
        match xdg_toplevel::State::try_from(raw) {
            Ok(xdg_toplevel::State::Maximized) => PresentedState::Maximized,
            Ok(xdg_toplevel::State::Fullscreen) => PresentedState::Fullscreen,
            Ok(xdg_toplevel::State::Resizing) => PresentedState::Resizing,
            Ok(xdg_toplevel::State::Activated) => PresentedState::Activated,
            Ok(xdg_toplevel::State::TiledLeft) => PresentedState::TiledLeft,
            Ok(xdg_toplevel::State::TiledRight) => PresentedState::TiledRight,
            Ok(xdg_toplevel::State::TiledTop) => PresentedState::TiledTop,
            Ok(xdg_toplevel::State::TiledBottom) => PresentedState::TiledBottom,
            _ => PresentedState::Other(raw),
        }
    }
}

impl fmt::Display for PresentedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PresentedState::Maximized => "maximized",
            PresentedState::Fullscreen => "fullscreen",
            PresentedState::Resizing => "resizing",
            PresentedState::Activated => "activated",
            PresentedState::TiledLeft => "tiled-left",
            PresentedState::TiledRight => "tiled-right",
            PresentedState::TiledTop => "tiled-top",
            PresentedState::TiledBottom => "tiled-bottom",
            PresentedState::Other(raw) => return write!(f, "{}", raw),
        };
        f.write_str(name)
    }
}

/// Decodes the `wl_array` of native-endian u32 states from a toplevel configure.
pub fn presented_states(raw: &[u8]) -> Vec<PresentedState> {
    raw.chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .map(PresentedState::from)
        .collect()
}

pub fn describe_states(states: &[PresentedState]) -> String {
    let names: Vec<String> = states.iter().map(ToString::to_string).collect();
    format!("{{{}}}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(states: &[u32]) -> Vec<u8> {
        states.iter().flat_map(|s| s.to_ne_bytes()).collect()
    }

    #[test]
    fn zero_dimensions_fall_back_independently() {
        assert_eq!(ToplevelGeometry::resolve(0, 480), ToplevelGeometry { width: 100, height: 480 });
        assert_eq!(ToplevelGeometry::resolve(640, 0), ToplevelGeometry { width: 640, height: 100 });
        assert_eq!(ToplevelGeometry::resolve(0, 0), ToplevelGeometry { width: 100, height: 100 });
        assert_eq!(ToplevelGeometry::resolve(300, 200), ToplevelGeometry { width: 300, height: 200 });
    }

    #[test]
    fn negative_dimensions_are_treated_as_unspecified() {
        assert_eq!(ToplevelGeometry::resolve(-5, 20), ToplevelGeometry { width: 100, height: 20 });
    }

    #[test]
    fn decodes_known_and_unknown_states() {
        let states = presented_states(&encode(&[1, 4, 5, 8, 77]));
        assert_eq!(
            states,
            vec![
                PresentedState::Maximized,
                PresentedState::Activated,
                PresentedState::TiledLeft,
                PresentedState::TiledBottom,
                PresentedState::Other(77),
            ]
        );
        assert_eq!(describe_states(&states), "{maximized, activated, tiled-left, tiled-bottom, 77}");
    }

    #[test]
    fn trailing_partial_entry_is_dropped() {
        let mut raw = encode(&[2]);
        raw.push(0xff);
        assert_eq!(presented_states(&raw), vec![PresentedState::Fullscreen]);
        assert_eq!(describe_states(&[]), "{}");
    }
}
