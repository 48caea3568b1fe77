//! Supported celestial bodies.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ndastro_errors::NdastroError;

/// The nine bodies handled by the engine: the two luminaries, the five
/// classical planets and the two lunar nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    /// Ascending lunar node.
    Rahu,
    /// Descending lunar node.
    Kethu,
}

impl Body {
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Rahu,
        Body::Kethu,
    ];

    /// Rahu and Kethu are computed points, not physical bodies.
    pub fn is_node(&self) -> bool {
        matches!(self, Body::Rahu | Body::Kethu)
    }

    /// Bodies whose geocentric longitude can decrease: the planets and the
    /// lunar nodes. The Sun and the Moon always move forward.
    pub fn can_retrograde(&self) -> bool {
        !matches!(self, Body::Sun | Body::Moon)
    }

    /// Mercury and Venus orbit inside the Earth's orbit.
    pub fn is_inner_planet(&self) -> bool {
        matches!(self, Body::Mercury | Body::Venus)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Rahu => "Rahu",
            Body::Kethu => "Kethu",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = NdastroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Body::Sun),
            "moon" => Ok(Body::Moon),
            "mercury" => Ok(Body::Mercury),
            "venus" => Ok(Body::Venus),
            "mars" => Ok(Body::Mars),
            "jupiter" => Ok(Body::Jupiter),
            "saturn" => Ok(Body::Saturn),
            "rahu" => Ok(Body::Rahu),
            "kethu" | "ketu" => Ok(Body::Kethu),
            _ => Err(NdastroError::UnsupportedBody(s.to_string())),
        }
    }
}

#[cfg(test)]
mod bodies_test {
    use super::*;

    #[test]
    fn test_parse_body() {
        assert_eq!("Sun".parse::<Body>().unwrap(), Body::Sun);
        assert_eq!("  MERCURY ".parse::<Body>().unwrap(), Body::Mercury);
        assert_eq!("ketu".parse::<Body>().unwrap(), Body::Kethu);
        assert_eq!("Kethu".parse::<Body>().unwrap(), Body::Kethu);

        assert_eq!(
            "Pluto".parse::<Body>(),
            Err(NdastroError::UnsupportedBody("Pluto".to_string()))
        );
    }

    #[test]
    fn test_display_round_trip() {
        for body in Body::ALL {
            assert_eq!(body.to_string().parse::<Body>().unwrap(), body);
        }
    }

    #[test]
    fn test_classification() {
        assert!(Body::Rahu.is_node() && Body::Kethu.is_node());
        assert!(!Body::Moon.is_node());
        assert!(!Body::Sun.can_retrograde());
        assert!(!Body::Moon.can_retrograde());
        assert!(Body::Saturn.can_retrograde());
        assert!(Body::Rahu.can_retrograde() && Body::Kethu.can_retrograde());
        assert!(Body::Venus.is_inner_planet());
        assert!(!Body::Mars.is_inner_planet());
    }
}
