//! Canned talk tracks and avoid lists keyed by the buyer's dominant
//! archetype. Any missing lookup degrades to generic copy; lead creation
//! never fails for want of text.

use crate::models::Archetype;
use tracing::warn;

const GENERIC_TRACK: &str = "This buyer is still exploring. Ask what drew them to the listing \
                             and let them talk before pitching a direction.";

fn pitch(archetype: Archetype) -> Option<&'static str> {
    let pitch = match archetype {
        Archetype::Monarch => {
            "Lead with exclusivity and finish quality. Highlight statement lighting, \
             dark palettes and the pieces that photograph expensively."
        }
        Archetype::Industrialist => {
            "Point out the honest materials: exposed brick, steel, concrete. \
             Frame imperfections as character, not work."
        }
        Archetype::Purist => {
            "Keep the pitch quiet. Emphasize light, storage and clean sight lines; \
             let the empty space sell itself."
        }
        Archetype::Naturalist => {
            "Open with the garden, the light and the air. Talk plants, natural \
             materials and how the rooms connect to the outdoors."
        }
        Archetype::Futurist => {
            "Demo the tech first: wiring, smart fittings, lighting scenes. \
             Precision and newness close this buyer."
        }
        Archetype::Curator => {
            "Sell the walls. Talk display space, bold color potential and the \
             rooms as a backdrop for a collection."
        }
        Archetype::Nomad => {
            "Tell the story of the spaces. Warm textures, low seating, the \
             corners that feel collected rather than decorated."
        }
        Archetype::Classicist => {
            "Stress provenance and permanence: mouldings, hardwood, symmetry. \
             Established beats novel for this buyer."
        }
        Archetype::Unclassified => return None,
    };
    Some(pitch)
}

fn avoid(archetype: Archetype) -> &'static [&'static str] {
    match archetype {
        Archetype::Monarch => &[
            "Don't pitch budget finishes or DIY potential.",
            "Avoid calling dark rooms a drawback.",
        ],
        Archetype::Industrialist => &[
            "Don't suggest drywalling over brick or painting steel.",
            "Avoid polished, showroom-style staging talk.",
        ],
        Archetype::Purist => &[
            "Don't fill the silence; clutter kills this pitch.",
            "Avoid bold color or ornament suggestions.",
        ],
        Archetype::Naturalist => &[
            "Don't lead with synthetic materials or sealed windows.",
            "Avoid proposing to pave the garden.",
        ],
        Archetype::Futurist => &[
            "Don't romanticize period features or patina.",
            "Avoid 'needs rewiring someday' framing; be exact.",
        ],
        Archetype::Curator => &[
            "Don't pitch neutral, play-it-safe palettes.",
            "Avoid minimalism as a selling point.",
        ],
        Archetype::Nomad => &[
            "Don't push formal layouts or matching sets.",
            "Avoid sterile, hotel-like staging language.",
        ],
        Archetype::Classicist => &[
            "Don't propose ripping out original detail.",
            "Avoid trend-led arguments; stress longevity.",
        ],
        Archetype::Unclassified => &[],
    }
}

/// Talk track for a buyer's top archetype. Cold start (no top archetype) or
/// an archetype without copy falls back to the generic track, which
/// deliberately names no archetype.
pub fn talk_track_for(top: Option<Archetype>) -> String {
    match top {
        Some(archetype) => match pitch(archetype) {
            Some(copy) => format!("{} buyer: {}", archetype, copy),
            None => {
                warn!(archetype = %archetype, "No talk track copy, using generic fallback");
                GENERIC_TRACK.to_string()
            }
        },
        None => GENERIC_TRACK.to_string(),
    }
}

/// Archetype-specific cautions; empty when there is no top archetype.
pub fn avoid_list_for(top: Option<Archetype>) -> Vec<String> {
    top.map(|archetype| avoid(archetype).iter().map(|s| s.to_string()).collect())
        .unwrap_or_default()
}
